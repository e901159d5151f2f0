//! Side-effecting collaborators for the planning loop.

pub mod config;
pub mod console;
pub mod model;
pub mod process;
pub mod prompt;
pub mod steps;
