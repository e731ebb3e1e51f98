use super::Pid;
use std::{io, path::PathBuf};
use thiserror::Error;

/// Failures at the edges of the visualizer. Scheduling itself cannot fail.
#[derive(Error, Debug)]
pub enum VisualizerError {
    #[error("no processes to schedule, add at least one process")]
    EmptyInput,

    #[error("process id {0} is used more than once")]
    DuplicateProcessId(Pid),

    #[error("unknown scheduling algorithm `{0}` (expected fcfs, sjf, priority or rr)")]
    UnknownAlgorithm(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("failed to read workload {}: {source}", path.display())]
    ReadWorkload {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to open log file {}: {source}", path.display())]
    OpenLog {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse workload: {0}")]
    ParseWorkload(#[from] serde_json::Error),

    #[error("terminal error: {0}")]
    Terminal(#[from] io::Error),
}
