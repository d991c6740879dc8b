mod atomic_io;
pub(crate) mod bootstrap;
mod config;
mod error;
pub(crate) mod loop_runner;
mod scenario;
mod snapshot;

pub(crate) use config::DemoConfig;
pub(crate) use error::DemoError;
pub(crate) use scenario::{RunSummary, Scenario};
pub(crate) use snapshot::SnapshotSurface;
