use ndarray::Array1;
use rand::Rng;

use crate::error::{AgentError, Result};

/// One environment step, as stored for replay.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    pub state: Array1<f32>,
    pub next_state: Array1<f32>,
    pub action: usize,
    pub reward: f32,
    pub done: bool,
}

impl Transition {
    pub fn new(state: Array1<f32>, next_state: Array1<f32>, action: usize, reward: f32, done: bool) -> Self {
        Transition {
            state,
            next_state,
            action,
            reward,
            done,
        }
    }
}

/// Fixed-capacity ring buffer of transitions with uniform sampling.
///
/// Storage grows up to `capacity` and is never reallocated afterwards:
/// once full, each push overwrites the slot at `head`, which always holds
/// the oldest transition.
#[derive(Clone, Debug)]
pub struct ReplayBuffer {
    buffer: Vec<Transition>,
    capacity: usize,
    head: usize,
}

impl ReplayBuffer {
    pub fn new(capacity: usize) -> Self {
        ReplayBuffer {
            buffer: Vec::with_capacity(capacity),
            capacity,
            head: 0,
        }
    }

    /// Append a transition, evicting the oldest one when full.
    pub fn push(&mut self, transition: Transition) {
        if self.capacity == 0 {
            return;
        }
        if self.buffer.len() < self.capacity {
            self.buffer.push(transition);
        } else {
            self.buffer[self.head] = transition;
            self.head = (self.head + 1) % self.capacity;
        }
    }

    /// Draw `batch_size` distinct transitions uniformly at random.
    pub fn sample<R: Rng + ?Sized>(&self, batch_size: usize, rng: &mut R) -> Result<Vec<&Transition>> {
        if batch_size > self.buffer.len() {
            return Err(AgentError::InsufficientData {
                requested: batch_size,
                available: self.buffer.len(),
            });
        }

        let indices = rand::seq::index::sample(rng, self.buffer.len(), batch_size);
        Ok(indices.into_iter().map(|i| &self.buffer[i]).collect())
    }

    /// The `index`-th stored transition counted from the oldest.
    pub fn get(&self, index: usize) -> Option<&Transition> {
        if index >= self.buffer.len() {
            return None;
        }
        self.buffer.get((self.head + index) % self.buffer.len())
    }

    /// Iterate from the oldest to the newest transition.
    pub fn iter(&self) -> impl Iterator<Item = &Transition> + '_ {
        let (newer, older) = self.buffer.split_at(self.head);
        older.iter().chain(newer.iter())
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.head = 0;
    }
}
