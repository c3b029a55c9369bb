//! Patchscope Watcher: audio backends and the poll loop

pub mod backend;
pub mod cycle;
pub mod service;

#[cfg(test)]
pub mod tests;

pub use backend::{AudioBackend, BackendError, PactlBackend, ReplayBackend};
pub use cycle::{CycleOutcome, Pipeline, View};
pub use service::PollService;
