use ndarray::{array, Array1};

use crate::error::{AgentError, Result};
use super::{Environment, Step};

/// The four moves of the grid world, indexed as the agent sees them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GridAction {
    Up,
    Down,
    Left,
    Right,
}

impl GridAction {
    pub const COUNT: usize = 4;

    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(GridAction::Up),
            1 => Some(GridAction::Down),
            2 => Some(GridAction::Left),
            3 => Some(GridAction::Right),
            _ => None,
        }
    }
}

/// Deterministic navigation on a `width × height` grid.
///
/// The observation is the `[x, y]` position. `Up` increases `y`; moves
/// that would leave the grid keep the agent in place. Entering an obstacle
/// ends the episode with -1, reaching the goal ends it with +10, and every
/// other step costs 0.1.
#[derive(Clone, Debug)]
pub struct GridWorld {
    width: usize,
    height: usize,
    start: (usize, usize),
    goal: (usize, usize),
    obstacles: Vec<(usize, usize)>,
    position: (usize, usize),
}

pub const GOAL_REWARD: f32 = 10.0;
pub const OBSTACLE_REWARD: f32 = -1.0;
pub const STEP_REWARD: f32 = -0.1;

impl GridWorld {
    pub fn new(
        grid_size: (usize, usize),
        start: (usize, usize),
        goal: (usize, usize),
        obstacles: Vec<(usize, usize)>,
    ) -> Result<Self> {
        let (width, height) = grid_size;
        if width == 0 || height == 0 {
            return Err(AgentError::invalid_parameter("grid_size", "both sides must be positive"));
        }
        let inside = |(x, y): (usize, usize)| x < width && y < height;
        if !inside(start) {
            return Err(AgentError::invalid_parameter("start", "must lie inside the grid"));
        }
        if !inside(goal) {
            return Err(AgentError::invalid_parameter("goal", "must lie inside the grid"));
        }
        if obstacles.contains(&start) {
            return Err(AgentError::invalid_parameter("start", "must not be an obstacle"));
        }

        Ok(GridWorld {
            width,
            height,
            start,
            goal,
            obstacles,
            position: start,
        })
    }

    pub fn position(&self) -> (usize, usize) {
        self.position
    }

    pub fn goal(&self) -> (usize, usize) {
        self.goal
    }

    fn observation(&self) -> Array1<f32> {
        array![self.position.0 as f32, self.position.1 as f32]
    }
}

impl Environment for GridWorld {
    type Info = ();

    fn state_dim(&self) -> usize {
        2
    }

    fn action_dim(&self) -> usize {
        GridAction::COUNT
    }

    fn reset(&mut self) -> Array1<f32> {
        self.position = self.start;
        self.observation()
    }

    fn step(&mut self, action: usize) -> Result<Step> {
        let grid_action = GridAction::from_index(action).ok_or(AgentError::InvalidAction {
            action,
            action_dim: GridAction::COUNT,
        })?;

        let (mut x, mut y) = self.position;
        match grid_action {
            GridAction::Up if y + 1 < self.height => y += 1,
            GridAction::Down if y > 0 => y -= 1,
            GridAction::Left if x > 0 => x -= 1,
            GridAction::Right if x + 1 < self.width => x += 1,
            _ => {}
        }
        self.position = (x, y);

        let (reward, done) = if self.obstacles.contains(&self.position) {
            (OBSTACLE_REWARD, true)
        } else if self.position == self.goal {
            (GOAL_REWARD, true)
        } else {
            (STEP_REWARD, false)
        };

        Ok(Step {
            next_state: self.observation(),
            reward,
            done,
            info: (),
        })
    }
}
