use std::collections::VecDeque;
use serde::{Serialize, Deserialize};

use crate::agent::TrainStats;

/// Stores training metrics over time
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainingMetrics {
    /// Critic losses per training step
    pub critic_losses: VecDeque<f32>,

    /// Actor losses per training step
    pub actor_losses: VecDeque<f32>,

    /// Mean critic estimates per training step
    pub q_values: VecDeque<f32>,

    /// Rewards per episode
    pub episode_rewards: VecDeque<f32>,

    /// Episode lengths
    pub episode_lengths: VecDeque<usize>,
}

impl TrainingMetrics {
    pub fn new(history_size: usize) -> Self {
        TrainingMetrics {
            critic_losses: VecDeque::with_capacity(history_size),
            actor_losses: VecDeque::with_capacity(history_size),
            q_values: VecDeque::with_capacity(history_size),
            episode_rewards: VecDeque::with_capacity(history_size),
            episode_lengths: VecDeque::with_capacity(history_size),
        }
    }
}

/// Tracks metrics during training, keeping the most recent `history_size` values of each series
pub struct MetricsTracker {
    metrics: TrainingMetrics,
    history_size: usize,

    current_episode_reward: f32,
    current_episode_length: usize,
    episode_count: usize,

    total_steps: usize,
}

fn push_bounded<T>(series: &mut VecDeque<T>, value: T, history_size: usize) {
    if series.len() >= history_size {
        series.pop_front();
    }
    series.push_back(value);
}

fn tail_mean(series: &VecDeque<f32>, window: usize) -> Option<f32> {
    if series.is_empty() || window == 0 {
        return None;
    }
    let n = window.min(series.len());
    let sum: f32 = series.iter().rev().take(n).sum();
    Some(sum / n as f32)
}

impl MetricsTracker {
    pub fn new(history_size: usize) -> Self {
        MetricsTracker {
            metrics: TrainingMetrics::new(history_size),
            history_size: history_size.max(1),
            current_episode_reward: 0.0,
            current_episode_length: 0,
            episode_count: 0,
            total_steps: 0,
        }
    }

    /// Record the outcome of one training step
    pub fn record_train_stats(&mut self, stats: &TrainStats) {
        push_bounded(&mut self.metrics.critic_losses, stats.critic_loss, self.history_size);
        push_bounded(&mut self.metrics.actor_losses, stats.actor_loss, self.history_size);
        push_bounded(&mut self.metrics.q_values, stats.mean_q, self.history_size);
    }

    /// Start a new episode
    pub fn start_episode(&mut self) {
        self.current_episode_reward = 0.0;
        self.current_episode_length = 0;
    }

    /// Record a step within an episode
    pub fn step(&mut self, reward: f32) {
        self.current_episode_reward += reward;
        self.current_episode_length += 1;
        self.total_steps += 1;
    }

    /// End the current episode
    pub fn end_episode(&mut self) {
        push_bounded(&mut self.metrics.episode_rewards, self.current_episode_reward, self.history_size);
        push_bounded(&mut self.metrics.episode_lengths, self.current_episode_length, self.history_size);
        self.episode_count += 1;
    }

    pub fn metrics(&self) -> &TrainingMetrics {
        &self.metrics
    }

    pub fn episode_count(&self) -> usize {
        self.episode_count
    }

    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    /// Mean of the last `window` critic losses
    pub fn avg_critic_loss(&self, window: usize) -> Option<f32> {
        tail_mean(&self.metrics.critic_losses, window)
    }

    /// Mean of the last `window` episode rewards
    pub fn avg_episode_reward(&self, window: usize) -> Option<f32> {
        tail_mean(&self.metrics.episode_rewards, window)
    }

    pub fn clear(&mut self) {
        self.metrics = TrainingMetrics::new(self.history_size);
        self.current_episode_reward = 0.0;
        self.current_episode_length = 0;
        self.episode_count = 0;
        self.total_steps = 0;
    }

    /// Serialize the recorded series as JSON
    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(&self.metrics)?)
    }
}

impl Default for MetricsTracker {
    fn default() -> Self {
        Self::new(1000)
    }
}
