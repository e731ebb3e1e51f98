use super::{ExecutionSlice, Process, ScheduleResult, Scheduler};
use tracing::trace;

pub struct FirstComeFirstServed;

impl Scheduler for FirstComeFirstServed {
    const NAME: &'static str = "First-Come-First-Served";

    fn schedule(&self, processes: &[Process]) -> ScheduleResult {
        // Stable: equal arrivals keep their input order
        let mut queue = processes.to_vec();
        queue.sort_by_key(Process::arrival_time);

        let mut current_time = 0;
        let mut process_order = Vec::with_capacity(queue.len());
        for process in &queue {
            // The CPU idles until the process shows up
            current_time = current_time.max(process.arrival_time());

            let end_time = current_time + process.burst_time();
            trace!(pid = process.pid(), start = current_time, end = end_time, "fcfs slice");
            process_order.push(ExecutionSlice::new(process.pid(), current_time, end_time));
            current_time = end_time;
        }

        ScheduleResult::from_slices(processes, process_order)
    }
}
