use super::{ExecutionSlice, Process, ScheduleResult};
use tracing::trace;

/// Runs every process to completion, picking among the arrived ones the
/// process with the smallest `key`. Ties go to the earliest process in the
/// remaining list, which keeps the input order.
pub(super) fn schedule_by<K, F>(processes: &[Process], key: F) -> ScheduleResult
where
    K: Ord,
    F: Fn(&Process) -> K,
{
    let mut remaining: Vec<&Process> = processes.iter().collect();
    let mut process_order = Vec::with_capacity(processes.len());
    let mut current_time = 0;

    while !remaining.is_empty() {
        let selected = remaining
            .iter()
            .enumerate()
            .filter(|(_, process)| process.arrival_time() <= current_time)
            .min_by_key(|&(_, &process)| key(process))
            .map(|(index, _)| index);

        let Some(index) = selected else {
            // Nothing has arrived yet, skip ahead to the next arrival
            if let Some(next_arrival) = remaining.iter().map(|p| p.arrival_time()).min() {
                trace!(from = current_time, to = next_arrival, "cpu idle");
                current_time = next_arrival;
            }
            continue;
        };

        let process = remaining.remove(index);
        let end_time = current_time + process.burst_time();
        process_order.push(ExecutionSlice::new(process.pid(), current_time, end_time));
        current_time = end_time;
    }

    ScheduleResult::from_slices(processes, process_order)
}
