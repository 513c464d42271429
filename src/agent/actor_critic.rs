use log::{debug, trace, warn};
use ndarray::{s, Array1, Array2, ArrayView1};
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Serialize, Deserialize};

use crate::error::{AgentError, Result};
use crate::estimators::{argmax_one_hot_backward, argmax_rows, one_hot, PolicyEstimator, ValueEstimator};
use crate::layers::WeightInit;
use crate::loss::{Loss, MSE};
use crate::optimizer::{Optimizer, OptimizerKind, OptimizerWrapper};
use crate::replay_buffer::{ReplayBuffer, Transition};
use crate::target::TargetPair;
use super::batch::TransitionBatch;
use super::config::{AgentConfig, Device};

/// Off-policy actor-critic agent for discrete actions.
///
/// The actor is a softmax policy, the critic scores (state, one-hot action)
/// pairs, and both have slowly tracking target copies that provide the
/// bootstrap term of the TD target.
///
/// # Example
///
/// ```rust
/// use ddpg_discrete::agent::AgentBuilder;
/// use ndarray::array;
///
/// let mut agent = AgentBuilder::new(2, 4)
///     .batch_size(2)
///     .seed(42)
///     .build()
///     .unwrap();
///
/// let state = array![0.0, 0.0];
/// let action = agent.select_action(state.view(), true).unwrap();
/// assert!(action < 4);
///
/// // After the environment step...
/// let next_state = array![0.0, 1.0];
/// agent.add_to_replay_buffer(state.view(), next_state.view(), action, -0.1, false).unwrap();
///
/// // Under-filled buffer: training is a no-op
/// assert!(agent.train().unwrap().is_none());
///
/// agent.add_to_replay_buffer(next_state.view(), state.view(), 1, -0.1, false).unwrap();
/// let stats = agent.train().unwrap().expect("buffer holds a full batch");
/// assert!(stats.critic_loss.is_finite());
/// ```
pub struct Agent {
    policy: PolicyEstimator,
    value: ValueEstimator,
    targets: TargetPair,
    policy_optimizer: OptimizerWrapper,
    value_optimizer: OptimizerWrapper,
    replay_buffer: ReplayBuffer,
    config: AgentConfig,
    state_dim: usize,
    action_dim: usize,
    train_steps: usize,
    rng: StdRng,
}

/// Summary of one completed training step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainStats {
    /// Critic MSE against the TD targets, before the critic step
    pub critic_loss: f32,
    /// Negated mean critic value of the actor's greedy actions
    pub actor_loss: f32,
    /// Mean critic estimate for the stored actions, before the critic step
    pub mean_q: f32,
    /// Mean TD target of the batch
    pub mean_target: f32,
}

impl Agent {
    /// Create an agent with the default hyperparameters.
    pub fn new(state_dim: usize, action_dim: usize, max_action: f32, device: Device) -> Result<Self> {
        let config = AgentConfig {
            max_action,
            device,
            ..AgentConfig::default()
        };
        Self::with_config(state_dim, action_dim, config)
    }

    /// Create an agent from an explicit configuration.
    pub fn with_config(state_dim: usize, action_dim: usize, config: AgentConfig) -> Result<Self> {
        if state_dim == 0 {
            return Err(AgentError::invalid_parameter("state_dim", "must be positive"));
        }
        if action_dim == 0 {
            return Err(AgentError::invalid_parameter("action_dim", "must be positive"));
        }
        config.validate()?;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let policy = PolicyEstimator::new(state_dim, action_dim, &config.hidden_sizes, &config.weight_init, &mut rng)?;
        let value = ValueEstimator::new(state_dim, action_dim, &config.hidden_sizes, &config.weight_init, &mut rng)?;
        let targets = TargetPair::from_live(&policy, &value);

        let policy_optimizer = OptimizerWrapper::new(config.optimizer, &policy.network().layers);
        let value_optimizer = OptimizerWrapper::new(config.optimizer, &value.network().layers);

        debug!(
            "Created agent: state_dim={}, action_dim={}, actor params={}, critic params={}, device={:?}",
            state_dim,
            action_dim,
            policy.network().parameter_count(),
            value.network().parameter_count(),
            config.device,
        );

        Ok(Agent {
            policy,
            value,
            targets,
            policy_optimizer,
            value_optimizer,
            replay_buffer: ReplayBuffer::new(config.buffer_capacity),
            config,
            state_dim,
            action_dim,
            train_steps: 0,
            rng,
        })
    }

    /// Pick an action for `state`.
    ///
    /// When `explore` is set, a uniformly random action is taken with
    /// probability `epsilon`. Otherwise the action is drawn from the
    /// policy's distribution; this branch is stochastic too, never argmax.
    pub fn select_action(&mut self, state: ArrayView1<f32>, explore: bool) -> Result<usize> {
        self.check_state(state)?;

        if explore && self.rng.gen::<f32>() < self.config.epsilon {
            return Ok(self.rng.gen_range(0..self.action_dim));
        }

        let probabilities = self.policy.forward(state)?;
        let distribution = WeightedIndex::new(probabilities.iter())
            .map_err(|e| AgentError::NumericalError(format!("cannot sample from policy output: {}", e)))?;
        Ok(distribution.sample(&mut self.rng))
    }

    /// The policy's action distribution for `state`.
    pub fn action_probabilities(&self, state: ArrayView1<f32>) -> Result<Array1<f32>> {
        self.check_state(state)?;
        self.policy.forward(state)
    }

    /// Store one transition for replay.
    pub fn add_to_replay_buffer(
        &mut self,
        state: ArrayView1<f32>,
        next_state: ArrayView1<f32>,
        action: usize,
        reward: f32,
        done: bool,
    ) -> Result<()> {
        self.check_state(state)?;
        self.check_state(next_state)?;
        if action >= self.action_dim {
            return Err(AgentError::InvalidAction {
                action,
                action_dim: self.action_dim,
            });
        }

        self.replay_buffer.push(Transition::new(
            state.to_owned(),
            next_state.to_owned(),
            action,
            reward,
            done,
        ));
        Ok(())
    }

    /// One training step on a freshly sampled batch.
    ///
    /// Returns `Ok(None)` without touching any parameter while the buffer
    /// holds fewer than `batch_size` transitions.
    pub fn train(&mut self) -> Result<Option<TrainStats>> {
        let batch_size = self.config.batch_size;
        if self.replay_buffer.len() < batch_size {
            trace!(
                "Skipping training: {} of {} transitions stored",
                self.replay_buffer.len(),
                batch_size
            );
            return Ok(None);
        }

        let batch = {
            let transitions = self.replay_buffer.sample(batch_size, &mut self.rng)?;
            TransitionBatch::from_transitions(&transitions, self.action_dim)?
        };

        let targets = self.td_targets(&batch)?;
        let (critic_loss, mean_q) = self.update_critic(&batch, &targets)?;
        let actor_loss = self.update_actor(&batch)?;
        self.soft_update_targets()?;
        self.train_steps += 1;

        if !critic_loss.is_finite() || !actor_loss.is_finite() {
            warn!(
                "Non-finite loss at training step {}: critic={}, actor={}",
                self.train_steps, critic_loss, actor_loss
            );
        }
        debug!(
            "Training step {}: critic_loss={:.6}, actor_loss={:.6}, mean_q={:.4}",
            self.train_steps, critic_loss, actor_loss, mean_q
        );

        Ok(Some(TrainStats {
            critic_loss,
            actor_loss,
            mean_q,
            mean_target: targets.mean().unwrap_or(0.0),
        }))
    }

    /// TD targets `r + (1 - done) · γ · Q_target(s', onehot(argmax π_target(s')))`.
    ///
    /// Only the target networks are read, so the result is a constant for
    /// the critic update. Returned as a `[batch, 1]` column.
    pub fn td_targets(&self, batch: &TransitionBatch) -> Result<Array2<f32>> {
        let next_probabilities = self.targets.policy.forward_batch(batch.next_states.view())?;
        let next_actions = argmax_rows(next_probabilities.view());
        let next_onehot = one_hot(&next_actions, self.action_dim)?;
        let target_q = self
            .targets
            .value
            .forward_batch(batch.next_states.view(), next_onehot.view())?;

        Ok(batch.bootstrap(target_q.view(), self.config.discount))
    }

    /// Mean squared error of the live critic against the current TD targets.
    pub fn critic_loss(&self, batch: &TransitionBatch) -> Result<f32> {
        let targets = self.td_targets(batch)?;
        let current_q = self
            .value
            .forward_batch(batch.states.view(), batch.actions_onehot.view())?;
        Ok(MSE.compute_batch(current_q.view(), targets.view()))
    }

    /// Move both target networks one Polyak step toward the live ones.
    pub fn soft_update_targets(&mut self) -> Result<()> {
        self.targets.track(&self.policy, &self.value, self.config.tau)
    }

    fn update_critic(&mut self, batch: &TransitionBatch, targets: &Array2<f32>) -> Result<(f32, f32)> {
        let (current_q, trace) = self
            .value
            .forward_traced(batch.states.view(), batch.actions_onehot.view())?;
        let loss = MSE.compute_batch(current_q.view(), targets.view());
        let output_errors = MSE.gradient_batch(current_q.view(), targets.view());

        let (_, gradients) = self.value.backward(&trace, output_errors.view());
        self.value_optimizer.step(
            &mut self.value.network_mut().layers,
            &gradients,
            self.config.critic_learning_rate,
        );

        Ok((loss, current_q.mean().unwrap_or(0.0)))
    }

    // The greedy action is one-hot encoded before it reaches the critic, so
    // the actor receives an identically zero gradient from this loss. The
    // optimizer step still runs.
    fn update_actor(&mut self, batch: &TransitionBatch) -> Result<f32> {
        let (probabilities, policy_trace) = self.policy.forward_traced(batch.states.view())?;
        let greedy = argmax_rows(probabilities.view());
        let greedy_onehot = one_hot(&greedy, self.action_dim)?;

        let (q_values, value_trace) = self
            .value
            .forward_traced(batch.states.view(), greedy_onehot.view())?;
        let loss = -q_values.mean().unwrap_or(0.0);

        let value_errors = Array2::from_elem(q_values.raw_dim(), -1.0 / q_values.len() as f32);
        let (input_errors, _) = self.value.backward(&value_trace, value_errors.view());
        let onehot_errors = input_errors.slice(s![.., self.state_dim..]);
        let probability_errors = argmax_one_hot_backward(onehot_errors);

        let gradients = self.policy.backward(&policy_trace, probability_errors.view());
        self.policy_optimizer.step(
            &mut self.policy.network_mut().layers,
            &gradients,
            self.config.actor_learning_rate,
        );

        Ok(loss)
    }

    fn check_state(&self, state: ArrayView1<f32>) -> Result<()> {
        if state.len() != self.state_dim {
            return Err(AgentError::shape_mismatch(
                format!("state of length {}", self.state_dim),
                format!("state of length {}", state.len()),
            ));
        }
        Ok(())
    }

    pub fn policy(&self) -> &PolicyEstimator {
        &self.policy
    }

    pub fn value(&self) -> &ValueEstimator {
        &self.value
    }

    pub fn targets(&self) -> &TargetPair {
        &self.targets
    }

    pub fn policy_optimizer(&self) -> &OptimizerWrapper {
        &self.policy_optimizer
    }

    pub fn value_optimizer(&self) -> &OptimizerWrapper {
        &self.value_optimizer
    }

    pub fn replay_buffer(&self) -> &ReplayBuffer {
        &self.replay_buffer
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn state_dim(&self) -> usize {
        self.state_dim
    }

    pub fn action_dim(&self) -> usize {
        self.action_dim
    }

    pub fn max_action(&self) -> f32 {
        self.config.max_action
    }

    pub fn device(&self) -> Device {
        self.config.device
    }

    /// Number of completed (non no-op) training steps.
    pub fn train_steps(&self) -> usize {
        self.train_steps
    }

    pub fn epsilon(&self) -> f32 {
        self.config.epsilon
    }

    /// Update the exploration rate, clamped to `[0, 1]`.
    pub fn set_epsilon(&mut self, epsilon: f32) {
        self.config.epsilon = epsilon.clamp(0.0, 1.0);
    }
}

/// Builder pattern for [`Agent`]
pub struct AgentBuilder {
    state_dim: usize,
    action_dim: usize,
    config: AgentConfig,
}

impl AgentBuilder {
    pub fn new(state_dim: usize, action_dim: usize) -> Self {
        AgentBuilder {
            state_dim,
            action_dim,
            config: AgentConfig::default(),
        }
    }

    /// Replace every hyperparameter at once.
    pub fn config(mut self, config: AgentConfig) -> Self {
        self.config = config;
        self
    }

    pub fn hidden_sizes(mut self, sizes: &[usize]) -> Self {
        self.config.hidden_sizes = sizes.to_vec();
        self
    }

    /// Same learning rate for actor and critic.
    pub fn learning_rate(mut self, learning_rate: f32) -> Self {
        self.config.actor_learning_rate = learning_rate;
        self.config.critic_learning_rate = learning_rate;
        self
    }

    pub fn actor_learning_rate(mut self, learning_rate: f32) -> Self {
        self.config.actor_learning_rate = learning_rate;
        self
    }

    pub fn critic_learning_rate(mut self, learning_rate: f32) -> Self {
        self.config.critic_learning_rate = learning_rate;
        self
    }

    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.config.batch_size = batch_size;
        self
    }

    pub fn discount(mut self, discount: f32) -> Self {
        self.config.discount = discount;
        self
    }

    pub fn tau(mut self, tau: f32) -> Self {
        self.config.tau = tau;
        self
    }

    pub fn epsilon(mut self, epsilon: f32) -> Self {
        self.config.epsilon = epsilon;
        self
    }

    pub fn buffer_capacity(mut self, capacity: usize) -> Self {
        self.config.buffer_capacity = capacity;
        self
    }

    pub fn weight_init(mut self, init: WeightInit) -> Self {
        self.config.weight_init = init;
        self
    }

    pub fn optimizer(mut self, optimizer: OptimizerKind) -> Self {
        self.config.optimizer = optimizer;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    pub fn device(mut self, device: Device) -> Self {
        self.config.device = device;
        self
    }

    pub fn max_action(mut self, max_action: f32) -> Self {
        self.config.max_action = max_action;
        self
    }

    pub fn build(self) -> Result<Agent> {
        Agent::with_config(self.state_dim, self.action_dim, self.config)
    }
}
