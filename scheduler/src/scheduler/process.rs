use serde::Serialize;

pub type Pid = u32;
pub type Ticks = u64;

/// A process as entered by the user. The engine only ever reads these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Process {
    pid: Pid,
    name: String,
    arrival_time: Ticks,
    burst_time: Ticks,
    priority: u32,
}

impl Process {
    pub const DEFAULT_PRIORITY: u32 = 1;
    /// Upper bound for arrival and burst times. Any realistic number of
    /// processes at this bound still sums well inside `Ticks`.
    pub const MAX_TIME: Ticks = 1_000_000;

    pub fn new(pid: Pid, burst_time: Ticks) -> Self {
        Process::named(pid, &format!("P{pid}"), 0, burst_time)
    }

    pub fn named(pid: Pid, name: &str, arrival_time: Ticks, burst_time: Ticks) -> Self {
        Process::with_priority(
            pid,
            name,
            arrival_time,
            burst_time,
            Process::DEFAULT_PRIORITY,
        )
    }

    /// Burst time and priority are clamped to at least 1, arrival and burst
    /// time to at most [`Process::MAX_TIME`].
    pub fn with_priority(
        pid: Pid,
        name: &str,
        arrival_time: Ticks,
        burst_time: Ticks,
        priority: u32,
    ) -> Self {
        Self {
            pid,
            name: name.to_owned(),
            arrival_time: arrival_time.min(Process::MAX_TIME),
            burst_time: burst_time.clamp(1, Process::MAX_TIME),
            priority: priority.max(1),
        }
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arrival_time(&self) -> Ticks {
        self.arrival_time
    }

    pub fn burst_time(&self) -> Ticks {
        self.burst_time
    }

    /// Lower values are scheduled first.
    pub fn priority(&self) -> u32 {
        self.priority
    }
}
