//! Episode driver connecting an [`Environment`] to an [`Agent`].
//!
//! Every environment step is stored in the replay buffer and followed by a
//! training call (every `train_every` steps). Training calls made while the
//! buffer is under-filled are no-ops, so the first episodes only collect
//! experience.

use log::info;

use crate::agent::{Agent, TrainStats};
use crate::environment::Environment;
use crate::error::{AgentError, Result};
use crate::metrics::MetricsTracker;

/// What happened during one episode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeSummary {
    pub total_reward: f32,
    pub steps: usize,
    /// The environment reported `done` before the step budget ran out
    pub terminated: bool,
    /// Stats of the last training step that actually ran
    pub last_stats: Option<TrainStats>,
}

pub struct Trainer {
    max_steps_per_episode: usize,
    train_every: usize,
    tracker: MetricsTracker,
}

impl Trainer {
    pub fn new(max_steps_per_episode: usize) -> Self {
        Trainer {
            max_steps_per_episode,
            train_every: 1,
            tracker: MetricsTracker::default(),
        }
    }

    /// Call `Agent::train` once every `steps` environment steps.
    pub fn train_every(mut self, steps: usize) -> Self {
        self.train_every = steps.max(1);
        self
    }

    pub fn tracker(&self) -> &MetricsTracker {
        &self.tracker
    }

    /// Play one episode with exploration enabled, training as it goes.
    pub fn run_episode<E: Environment>(&mut self, agent: &mut Agent, env: &mut E) -> Result<EpisodeSummary> {
        if env.state_dim() != agent.state_dim() {
            return Err(AgentError::shape_mismatch(
                format!("environment with state_dim {}", agent.state_dim()),
                format!("environment with state_dim {}", env.state_dim()),
            ));
        }
        if env.action_dim() != agent.action_dim() {
            return Err(AgentError::shape_mismatch(
                format!("environment with action_dim {}", agent.action_dim()),
                format!("environment with action_dim {}", env.action_dim()),
            ));
        }

        let mut state = env.reset();
        let mut summary = EpisodeSummary {
            total_reward: 0.0,
            steps: 0,
            terminated: false,
            last_stats: None,
        };
        self.tracker.start_episode();

        while summary.steps < self.max_steps_per_episode {
            let action = agent.select_action(state.view(), true)?;
            let step = env.step(action)?;
            agent.add_to_replay_buffer(state.view(), step.next_state.view(), action, step.reward, step.done)?;

            summary.steps += 1;
            summary.total_reward += step.reward;
            self.tracker.step(step.reward);

            if summary.steps % self.train_every == 0 {
                if let Some(stats) = agent.train()? {
                    self.tracker.record_train_stats(&stats);
                    summary.last_stats = Some(stats);
                }
            }

            state = step.next_state;
            if step.done {
                summary.terminated = true;
                break;
            }
        }

        self.tracker.end_episode();
        Ok(summary)
    }

    /// Run `episodes` episodes back to back.
    pub fn run<E: Environment>(&mut self, agent: &mut Agent, env: &mut E, episodes: usize) -> Result<Vec<EpisodeSummary>> {
        let mut summaries = Vec::with_capacity(episodes);
        for episode in 0..episodes {
            let summary = self.run_episode(agent, env)?;
            info!(
                "Episode {}: reward={:.2}, steps={}, terminated={}, critic_loss={}",
                episode,
                summary.total_reward,
                summary.steps,
                summary.terminated,
                summary
                    .last_stats
                    .map_or_else(|| "-".to_string(), |s| format!("{:.4}", s.critic_loss)),
            );
            summaries.push(summary);
        }
        Ok(summaries)
    }
}
