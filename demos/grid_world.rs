/***
# Grid World Example

* Trains the actor-critic agent on a 5x5 grid:
  - Start in the bottom-left corner, goal in the top-right
  - Two obstacles end the episode with a penalty
  - Every other step costs a little, reaching the goal pays +10
***/

use ddpg_discrete::{
    agent::AgentBuilder,
    environment::{Environment, GridWorld},
    training::Trainer,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Grid World Actor-Critic Demo ===\n");

    let mut env = GridWorld::new((5, 5), (0, 0), (4, 4), vec![(2, 2), (3, 1)])?;
    let mut agent = AgentBuilder::new(env.state_dim(), env.action_dim())
        .seed(42)
        .build()?;

    println!("Agent configuration:");
    println!("{}\n", agent.config().to_json()?);

    let mut trainer = Trainer::new(100);
    let episodes = 200;

    for episode in 0..episodes {
        let summary = trainer.run_episode(&mut agent, &mut env)?;

        if episode % 20 == 0 || episode == episodes - 1 {
            let critic_loss = summary
                .last_stats
                .map_or_else(|| "-".to_string(), |s| format!("{:.4}", s.critic_loss));
            println!(
                "Episode {:3}: reward {:7.2}, steps {:3}, {}, critic loss {}, avg reward (20) {:.2}",
                episode,
                summary.total_reward,
                summary.steps,
                if summary.terminated { "terminated" } else { "timed out " },
                critic_loss,
                trainer.tracker().avg_episode_reward(20).unwrap_or(0.0),
            );
        }
    }

    println!("\nGreedy rollout from the start:");
    let mut state = env.reset();
    for step in 0..20 {
        let action = agent.select_action(state.view(), false)?;
        let outcome = env.step(action)?;
        println!(
            "  step {:2}: action {} -> position {:?}, reward {:.1}",
            step,
            action,
            env.position(),
            outcome.reward
        );
        state = outcome.next_state;
        if outcome.done {
            break;
        }
    }

    println!("\nTraining steps taken: {}", agent.train_steps());
    Ok(())
}
