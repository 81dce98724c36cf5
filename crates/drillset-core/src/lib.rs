//! drillset-core — adaptive question selection for timed drills.
//!
//! This crate holds the session model and the logic that decides which
//! questions are drilled: mastery classification, target-time calibration,
//! working-set rotation and question picking. Persistence, configuration and
//! the console-driven session loop build on top of it.

pub mod bank;
pub mod calibrator;
pub mod classifier;
pub mod config;
pub mod engine;
pub mod error;
pub mod mock;
pub mod model;
pub mod picker;
pub mod session;
pub mod store;
pub mod traits;

pub use error::DrillError;
pub use model::{AnswerEvent, MasteryState, Question, SessionState, WORKING_SET_SIZE};
