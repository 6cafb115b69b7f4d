//! Ground-truth world simulation for headless episodes.
//! This module exists so the agent can be exercised end to end without a game server.
//! It does not own any decision making; the world only answers sensor reads and executes actions.

use crate::state::{ActionEffect, AgentState, Bounds, GridMap};
use crate::types::*;
use crate::window::{SensorWindow, WINDOW_RADIUS, WINDOW_SIZE};

mod episode;
mod generator;
mod world;

pub use episode::{EpisodeResult, EpisodeStopReason, run_episode, run_episode_observed};
pub use generator::TerrainMix;
pub use world::{StepOutcome, World, WorldParseError};
