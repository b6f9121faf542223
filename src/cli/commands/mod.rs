//! Command execution functions for the two build phases.

mod compile;
mod setup;

pub use compile::compile;
pub use setup::setup;
