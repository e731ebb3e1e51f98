mod animation;
mod config;
mod display;
mod error;
mod fcfs;
mod non_preemptive;
mod priority;
mod process;
mod report;
mod round_robin;
mod runner;
mod schedule;
mod sjf;
mod timeline;
mod workload;

use serde::{Deserialize, Serialize};
use std::{fmt, num::NonZeroU32, str::FromStr};
use tracing::{debug, instrument};

pub use animation::{AnimationState, Animator};
pub use config::{init_tracing, Options};
pub use error::VisualizerError;
pub use fcfs::FirstComeFirstServed;
pub use priority::PriorityScheduler;
pub use process::{Pid, Process, Ticks};
pub use report::render_report;
pub use round_robin::RoundRobinScheduler;
pub use runner::{ScheduleRunner, Simulation};
pub use schedule::{ExecutionSlice, ScheduleResult};
pub use sjf::ShortestJobFirst;
pub use timeline::{timeline, Segment};
pub use workload::{coerce_quantum, Field, ProcessTable, Workload};

/// A scheduling policy. Implementations are pure: the same processes always
/// produce the same schedule, and the input is never modified.
pub trait Scheduler {
    const NAME: &'static str;

    fn schedule(&self, processes: &[Process]) -> ScheduleResult;
}

pub fn fcfs(processes: &[Process]) -> ScheduleResult {
    FirstComeFirstServed.schedule(processes)
}

pub fn sjf(processes: &[Process]) -> ScheduleResult {
    ShortestJobFirst.schedule(processes)
}

pub fn priority(processes: &[Process]) -> ScheduleResult {
    PriorityScheduler.schedule(processes)
}

pub fn round_robin(processes: &[Process], quantum: NonZeroU32) -> ScheduleResult {
    RoundRobinScheduler::new(quantum).schedule(processes)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    #[default]
    Fcfs,
    Sjf,
    Priority,
    #[serde(rename = "rr")]
    RoundRobin,
}

impl Algorithm {
    pub const ALL: [Algorithm; 4] = [
        Algorithm::Fcfs,
        Algorithm::Sjf,
        Algorithm::Priority,
        Algorithm::RoundRobin,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::Fcfs => FirstComeFirstServed::NAME,
            Algorithm::Sjf => ShortestJobFirst::NAME,
            Algorithm::Priority => PriorityScheduler::NAME,
            Algorithm::RoundRobin => RoundRobinScheduler::NAME,
        }
    }

    /// The quantum is only consulted by round robin.
    #[instrument(level = "debug", skip_all, fields(algorithm = %self, processes = processes.len()))]
    pub fn run(&self, processes: &[Process], quantum: NonZeroU32) -> ScheduleResult {
        let result = match self {
            Algorithm::Fcfs => fcfs(processes),
            Algorithm::Sjf => sjf(processes),
            Algorithm::Priority => priority(processes),
            Algorithm::RoundRobin => round_robin(processes, quantum),
        };
        debug!(
            slices = result.process_order.len(),
            average_waiting = result.average_waiting_time,
            average_turnaround = result.average_turnaround_time,
            "schedule computed"
        );
        result
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let short = match self {
            Algorithm::Fcfs => "fcfs",
            Algorithm::Sjf => "sjf",
            Algorithm::Priority => "priority",
            Algorithm::RoundRobin => "rr",
        };
        f.write_str(short)
    }
}

impl FromStr for Algorithm {
    type Err = VisualizerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fcfs" => Ok(Algorithm::Fcfs),
            "sjf" => Ok(Algorithm::Sjf),
            "priority" => Ok(Algorithm::Priority),
            "rr" | "round-robin" | "round_robin" => Ok(Algorithm::RoundRobin),
            _ => Err(VisualizerError::UnknownAlgorithm(s.to_owned())),
        }
    }
}
