use ndarray::{array, Array1};
use crate::agent::{Agent, AgentBuilder, Device, TransitionBatch};
use crate::error::AgentError;
use crate::estimators::{argmax_rows, one_hot};
use crate::optimizer::OptimizerWrapper;

fn small_agent(seed: u64, batch_size: usize) -> Agent {
    AgentBuilder::new(2, 4)
        .hidden_sizes(&[16, 16])
        .batch_size(batch_size)
        .buffer_capacity(1000)
        .seed(seed)
        .build()
        .unwrap()
}

fn fill(agent: &mut Agent, count: usize, reward: f32, done: bool) {
    for i in 0..count {
        let x = i as f32 / count as f32;
        let state = array![x, 0.5];
        let next_state = array![x, 0.6];
        agent
            .add_to_replay_buffer(state.view(), next_state.view(), i % 4, reward, done)
            .unwrap();
    }
}

fn whole_buffer(agent: &Agent) -> TransitionBatch {
    let transitions: Vec<_> = agent.replay_buffer().iter().collect();
    TransitionBatch::from_transitions(&transitions, agent.action_dim()).unwrap()
}

fn adam_steps(optimizer: &OptimizerWrapper) -> usize {
    match optimizer {
        OptimizerWrapper::Adam(adam) => adam.t,
        OptimizerWrapper::SGD(_) => panic!("expected Adam"),
    }
}

#[test]
fn test_default_hyperparameters() {
    let agent = Agent::new(2, 4, 1.0, Device::Cpu).unwrap();
    let config = agent.config();
    assert_eq!(config.hidden_sizes, vec![128, 128]);
    assert_eq!(config.actor_learning_rate, 1e-3);
    assert_eq!(config.critic_learning_rate, 1e-3);
    assert_eq!(config.batch_size, 64);
    assert_eq!(config.discount, 0.99);
    assert_eq!(config.tau, 0.005);
    assert_eq!(agent.epsilon(), 0.2);
    assert_eq!(agent.replay_buffer().capacity(), 100_000);
    assert_eq!(agent.max_action(), 1.0);
    assert_eq!(agent.device(), Device::Cpu);

    assert_eq!(agent.policy().network().layers.len(), 3);
    assert_eq!(agent.value().network().input_size(), 6);
    assert_eq!(agent.value().network().output_size(), 1);
    assert_eq!(agent.targets().policy, *agent.policy());
    assert_eq!(agent.targets().value, *agent.value());
}

#[test]
fn test_selected_actions_in_range() {
    let mut agent = small_agent(1, 8);
    let state = array![0.3, -1.2];
    for explore in [true, false] {
        for _ in 0..200 {
            let action = agent.select_action(state.view(), explore).unwrap();
            assert!(action < 4);
        }
    }
}

#[test]
fn test_full_exploration_is_uniform() {
    let mut agent = AgentBuilder::new(2, 4)
        .hidden_sizes(&[8])
        .epsilon(1.0)
        .batch_size(1)
        .seed(3)
        .build()
        .unwrap();

    let state = array![0.0, 0.0];
    let mut counts = [0usize; 4];
    for _ in 0..4000 {
        counts[agent.select_action(state.view(), true).unwrap()] += 1;
    }
    for count in counts {
        assert!((800..1200).contains(&count), "counts: {:?}", counts);
    }
}

#[test]
fn test_action_probabilities_form_distribution() {
    let agent = small_agent(2, 8);
    let probabilities = agent.action_probabilities(array![1.0, 2.0].view()).unwrap();
    assert_eq!(probabilities.len(), 4);
    assert!(probabilities.iter().all(|&p| p > 0.0));
    assert!((probabilities.sum() - 1.0).abs() < 1e-5);
}

#[test]
fn test_wrong_state_length_rejected() {
    let mut agent = small_agent(0, 8);
    let state = array![0.0, 0.0, 0.0];
    assert!(matches!(
        agent.select_action(state.view(), true),
        Err(AgentError::ShapeMismatch { .. })
    ));
    let good = array![0.0, 0.0];
    assert!(matches!(
        agent.add_to_replay_buffer(good.view(), state.view(), 0, 0.0, false),
        Err(AgentError::ShapeMismatch { .. })
    ));
    assert!(agent.replay_buffer().is_empty());
}

#[test]
fn test_out_of_range_action_rejected() {
    let mut agent = small_agent(0, 8);
    let state = array![0.0, 0.0];
    assert_eq!(
        agent.add_to_replay_buffer(state.view(), state.view(), 4, 0.0, false),
        Err(AgentError::InvalidAction { action: 4, action_dim: 4 })
    );
}

#[test]
fn test_underfilled_buffer_train_is_noop() {
    let mut agent = small_agent(4, 64);
    fill(&mut agent, 10, 1.0, false);

    let policy = agent.policy().clone();
    let value = agent.value().clone();
    let targets = agent.targets().clone();

    assert!(agent.train().unwrap().is_none());

    assert_eq!(*agent.policy(), policy);
    assert_eq!(*agent.value(), value);
    assert_eq!(*agent.targets(), targets);
    assert_eq!(agent.train_steps(), 0);
    assert_eq!(adam_steps(agent.policy_optimizer()), 0);
    assert_eq!(adam_steps(agent.value_optimizer()), 0);
}

#[test]
fn test_tau_zero_freezes_targets() {
    let mut agent = AgentBuilder::new(2, 4)
        .hidden_sizes(&[16])
        .batch_size(8)
        .tau(0.0)
        .seed(5)
        .build()
        .unwrap();
    fill(&mut agent, 8, 1.0, false);
    let targets = agent.targets().clone();

    for _ in 0..3 {
        agent.train().unwrap().unwrap();
    }

    assert_eq!(*agent.targets(), targets);
    assert_ne!(agent.targets().value, *agent.value());
}

#[test]
fn test_tau_one_copies_live_estimators() {
    let mut agent = AgentBuilder::new(2, 4)
        .hidden_sizes(&[16])
        .batch_size(8)
        .tau(1.0)
        .seed(6)
        .build()
        .unwrap();
    fill(&mut agent, 8, 1.0, false);
    let initial_value = agent.value().clone();

    agent.train().unwrap().unwrap();

    assert_ne!(*agent.value(), initial_value);
    assert_eq!(agent.targets().value, *agent.value());
    assert_eq!(agent.targets().policy, *agent.policy());
}

#[test]
fn test_terminal_transitions_target_reward_only() {
    let mut agent = small_agent(7, 8);
    for i in 0..8 {
        let state = array![i as f32, 1.0];
        agent
            .add_to_replay_buffer(state.view(), state.view(), i % 4, i as f32 - 3.0, true)
            .unwrap();
    }

    let batch = whole_buffer(&agent);
    let targets = agent.td_targets(&batch).unwrap();
    assert_eq!(targets, batch.rewards);
}

#[test]
fn test_bootstrapped_targets_use_target_networks() {
    let mut agent = small_agent(8, 8);
    fill(&mut agent, 8, 0.5, false);

    let batch = whole_buffer(&agent);
    let targets = agent.td_targets(&batch).unwrap();

    let next_probabilities = agent.targets().policy.forward_batch(batch.next_states.view()).unwrap();
    let next_onehot = one_hot(&argmax_rows(next_probabilities.view()), 4).unwrap();
    let next_q = agent
        .targets()
        .value
        .forward_batch(batch.next_states.view(), next_onehot.view())
        .unwrap();

    for i in 0..batch.len() {
        let expected = 0.5 + 0.99 * next_q[[i, 0]];
        assert!((targets[[i, 0]] - expected).abs() < 1e-5);
    }
}

#[test]
fn test_single_terminal_transition_target() {
    let mut agent = small_agent(9, 1);
    let state = array![0.2, 0.4];
    let next_state = array![0.3, 0.4];
    agent
        .add_to_replay_buffer(state.view(), next_state.view(), 2, 10.0, true)
        .unwrap();

    let batch = whole_buffer(&agent);
    assert_eq!(agent.td_targets(&batch).unwrap()[[0, 0]], 10.0);

    let stats = agent.train().unwrap().unwrap();
    assert_eq!(stats.mean_target, 10.0);
}

#[test]
fn test_terminal_target_ignores_extreme_next_state() {
    let mut agent = small_agent(10, 1);
    let state = array![0.0, 0.0];
    let next_state = array![3e37, -3e37];
    agent
        .add_to_replay_buffer(state.view(), next_state.view(), 1, 10.0, true)
        .unwrap();

    let batch = whole_buffer(&agent);
    assert_eq!(agent.td_targets(&batch).unwrap(), array![[10.0]]);
}

#[test]
fn test_critic_loss_decreases_with_training() {
    let mut agent = AgentBuilder::new(2, 4).seed(11).build().unwrap();
    fill(&mut agent, 64, 1.0, false);

    let batch = whole_buffer(&agent);
    let initial_loss = agent.critic_loss(&batch).unwrap();

    for _ in 0..50 {
        agent.train().unwrap().unwrap();
    }

    let final_loss = agent.critic_loss(&batch).unwrap();
    assert!(
        final_loss < initial_loss,
        "critic loss went from {} to {}",
        initial_loss,
        final_loss
    );
    assert_eq!(agent.train_steps(), 50);
}

#[test]
fn test_actor_receives_no_gradient_through_greedy_action() {
    let mut agent = small_agent(12, 8);
    fill(&mut agent, 8, 1.0, false);
    let policy = agent.policy().clone();

    for _ in 0..5 {
        agent.train().unwrap().unwrap();
    }

    assert_eq!(agent.policy().network(), policy.network());
    assert_eq!(adam_steps(agent.policy_optimizer()), 5);
    assert_eq!(adam_steps(agent.value_optimizer()), 5);
}

#[test]
fn test_same_seed_reproduces_run() {
    let run = |seed: u64| {
        let mut agent = small_agent(seed, 4);
        let mut state = array![0.0, 0.0];
        let mut actions = Vec::new();
        for step in 0..12 {
            let action = agent.select_action(state.view(), true).unwrap();
            let next_state: Array1<f32> = array![step as f32 * 0.1, action as f32];
            agent
                .add_to_replay_buffer(state.view(), next_state.view(), action, -0.1, false)
                .unwrap();
            agent.train().unwrap();
            actions.push(action);
            state = next_state;
        }
        (actions, agent.value().clone(), agent.targets().clone())
    };

    let (actions_a, value_a, targets_a) = run(21);
    let (actions_b, value_b, targets_b) = run(21);
    assert_eq!(actions_a, actions_b);
    assert_eq!(value_a, value_b);
    assert_eq!(targets_a, targets_b);

    let (_, value_c, _) = run(22);
    assert_ne!(value_a, value_c);
}

#[test]
fn test_set_epsilon_clamps() {
    let mut agent = small_agent(0, 8);
    agent.set_epsilon(1.5);
    assert_eq!(agent.epsilon(), 1.0);
    agent.set_epsilon(-0.5);
    assert_eq!(agent.epsilon(), 0.0);
}
