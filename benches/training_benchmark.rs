//! Throughput of the agent's hot paths at the default network size
//!
//! Run with `cargo bench --bench training_benchmark`

use ddpg_discrete::agent::{Agent, AgentBuilder};
use ddpg_discrete::environment::{Environment, GridWorld};
use ddpg_discrete::training::Trainer;
use ndarray::Array1;
use std::time::Instant;

const STATE_DIM: usize = 8;
const ACTION_DIM: usize = 4;

fn filled_agent(transitions: usize) -> Agent {
    let mut agent = AgentBuilder::new(STATE_DIM, ACTION_DIM).seed(0).build().unwrap();
    for i in 0..transitions {
        let state = Array1::from_shape_fn(STATE_DIM, |j| ((i * STATE_DIM + j) as f32 * 0.37).sin());
        let next_state = state.mapv(|x| x * 0.9);
        agent
            .add_to_replay_buffer(state.view(), next_state.view(), i % ACTION_DIM, (i % 7) as f32 - 3.0, i % 50 == 0)
            .unwrap();
    }
    agent
}

fn bench_select_action(iterations: usize) {
    let mut agent = filled_agent(0);
    let state = Array1::linspace(-1.0, 1.0, STATE_DIM);

    let start = Instant::now();
    for _ in 0..iterations {
        agent.select_action(state.view(), true).unwrap();
    }
    let elapsed = start.elapsed();
    println!(
        "select_action: {} calls in {:.2?} ({:.1} µs/call)",
        iterations,
        elapsed,
        elapsed.as_secs_f64() * 1e6 / iterations as f64
    );
}

fn bench_train(iterations: usize) {
    let mut agent = filled_agent(10_000);

    let start = Instant::now();
    let mut last_loss = 0.0;
    for _ in 0..iterations {
        if let Some(stats) = agent.train().unwrap() {
            last_loss = stats.critic_loss;
        }
    }
    let elapsed = start.elapsed();
    println!(
        "train (batch 64, 128x128): {} steps in {:.2?} ({:.2} ms/step), final critic loss {:.4}",
        iterations,
        elapsed,
        elapsed.as_secs_f64() * 1e3 / iterations as f64,
        last_loss
    );
}

fn bench_grid_world_episodes(episodes: usize) {
    let mut env = GridWorld::new((5, 5), (0, 0), (4, 4), vec![(2, 2), (1, 3)]).unwrap();
    let mut agent = AgentBuilder::new(env.state_dim(), env.action_dim()).seed(1).build().unwrap();
    let mut trainer = Trainer::new(100);

    let start = Instant::now();
    let summaries = trainer.run(&mut agent, &mut env, episodes).unwrap();
    let elapsed = start.elapsed();

    let steps: usize = summaries.iter().map(|s| s.steps).sum();
    println!(
        "grid world: {} episodes, {} steps in {:.2?}, avg reward (last 10) {:.2}",
        episodes,
        steps,
        elapsed,
        trainer.tracker().avg_episode_reward(10).unwrap_or(0.0)
    );
}

fn main() {
    println!("=== Training Benchmark ===\n");
    bench_select_action(10_000);
    bench_train(200);
    bench_grid_world_episodes(50);
}
