use super::process::{Pid, Process, Ticks};
use serde::Serialize;
use std::collections::BTreeMap;

/// One contiguous interval during which a single process holds the CPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExecutionSlice {
    pub pid: Pid,
    pub start_time: Ticks,
    pub end_time: Ticks,
}

impl ExecutionSlice {
    pub fn new(pid: Pid, start_time: Ticks, end_time: Ticks) -> Self {
        Self {
            pid,
            start_time,
            end_time,
        }
    }

    pub fn duration(&self) -> Ticks {
        self.end_time - self.start_time
    }
}

/// The outcome of one scheduling run. Superseded as a whole by the next run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleResult {
    pub process_order: Vec<ExecutionSlice>,
    pub waiting_time: BTreeMap<Pid, Ticks>,
    pub turnaround_time: BTreeMap<Pid, Ticks>,
    pub average_waiting_time: f64,
    pub average_turnaround_time: f64,
}

impl ScheduleResult {
    /// Derives the per-process metrics from the emitted slices.
    ///
    /// The completion time of a process is the end of its last slice. A process
    /// with no slice at all gets no metrics entry.
    pub fn from_slices(processes: &[Process], process_order: Vec<ExecutionSlice>) -> Self {
        let mut completion: BTreeMap<Pid, Ticks> = BTreeMap::new();
        for slice in &process_order {
            let end = completion.entry(slice.pid).or_insert(slice.end_time);
            *end = (*end).max(slice.end_time);
        }

        let mut waiting_time = BTreeMap::new();
        let mut turnaround_time = BTreeMap::new();
        for process in processes {
            if let Some(&completed_at) = completion.get(&process.pid()) {
                let turnaround = completed_at - process.arrival_time();
                turnaround_time.insert(process.pid(), turnaround);
                waiting_time.insert(process.pid(), turnaround - process.burst_time());
            }
        }

        let average_waiting_time = average(waiting_time.values(), processes.len());
        let average_turnaround_time = average(turnaround_time.values(), processes.len());

        Self {
            process_order,
            waiting_time,
            turnaround_time,
            average_waiting_time,
            average_turnaround_time,
        }
    }

    pub fn completion_time(&self, pid: Pid) -> Option<Ticks> {
        self.process_order
            .iter()
            .filter(|slice| slice.pid == pid)
            .map(|slice| slice.end_time)
            .max()
    }

    /// End of the last slice, or 0 for an empty schedule.
    pub fn makespan(&self) -> Ticks {
        self.process_order
            .iter()
            .map(|slice| slice.end_time)
            .max()
            .unwrap_or(0)
    }

    /// Percentage of the makespan during which the CPU was busy.
    pub fn cpu_utilization(&self, processes: &[Process]) -> f64 {
        let makespan = self.makespan();
        if makespan == 0 {
            return 0.0;
        }
        let busy: Ticks = processes.iter().map(Process::burst_time).sum();
        busy as f64 / makespan as f64 * 100.0
    }
}

fn average<'a>(values: impl Iterator<Item = &'a Ticks>, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    values.sum::<Ticks>() as f64 / count as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn metrics_follow_the_last_slice_of_each_process() {
        let processes = vec![Process::named(1, "A", 0, 4), Process::named(2, "B", 0, 2)];
        let result = ScheduleResult::from_slices(
            &processes,
            vec![
                ExecutionSlice::new(1, 0, 2),
                ExecutionSlice::new(2, 2, 4),
                ExecutionSlice::new(1, 4, 6),
            ],
        );

        assert_eq!(result.turnaround_time, BTreeMap::from([(1, 6), (2, 4)]));
        assert_eq!(result.waiting_time, BTreeMap::from([(1, 2), (2, 2)]));
        assert_eq!(result.average_waiting_time, 2.0);
        assert_eq!(result.average_turnaround_time, 5.0);
        assert_eq!(result.completion_time(1), Some(6));
        assert_eq!(result.completion_time(3), None);
    }

    #[test]
    fn utilization_accounts_for_idle_gaps() {
        let processes = vec![Process::named(1, "A", 0, 2), Process::named(2, "B", 6, 2)];
        let result = ScheduleResult::from_slices(
            &processes,
            vec![ExecutionSlice::new(1, 0, 2), ExecutionSlice::new(2, 6, 8)],
        );

        assert_eq!(result.makespan(), 8);
        assert_eq!(result.cpu_utilization(&processes), 50.0);
    }

    #[test]
    fn empty_schedule_has_zero_averages() {
        let result = ScheduleResult::from_slices(&[], Vec::new());
        assert_eq!(result.average_waiting_time, 0.0);
        assert_eq!(result.makespan(), 0);
        assert_eq!(result.cpu_utilization(&[]), 0.0);
    }
}
