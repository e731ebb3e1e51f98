use super::{ExecutionSlice, Pid, Process, ScheduleResult, Scheduler, Ticks};
use std::num::NonZeroU32;
use tracing::trace;

struct Burst {
    pid: Pid,
    arrival_time: Ticks,
    remaining: Ticks,
}

pub struct RoundRobinScheduler {
    quantum: NonZeroU32,
}

impl RoundRobinScheduler {
    pub const DEFAULT_QUANTUM: NonZeroU32 = match NonZeroU32::new(2) {
        Some(quantum) => quantum,
        None => unreachable!(),
    };

    pub fn new(quantum: NonZeroU32) -> Self {
        Self { quantum }
    }

    /// Lowest arrival among the unfinished processes that have not arrived yet.
    fn next_arrival(queue: &[Burst], current_time: Ticks) -> Option<Ticks> {
        queue
            .iter()
            .filter(|burst| burst.remaining > 0 && burst.arrival_time > current_time)
            .map(|burst| burst.arrival_time)
            .min()
    }
}

impl Scheduler for RoundRobinScheduler {
    const NAME: &'static str = "Round Robin Scheduler";

    /// Each round walks the arrival-sorted list once in the same fixed order.
    /// A process that arrives mid-round runs in that round if its position
    /// comes after the one currently served; nothing is re-queued at a tail.
    fn schedule(&self, processes: &[Process]) -> ScheduleResult {
        let quantum = Ticks::from(self.quantum.get());

        let mut queue: Vec<Burst> = processes
            .iter()
            .map(|process| Burst {
                pid: process.pid(),
                arrival_time: process.arrival_time(),
                remaining: process.burst_time(),
            })
            .collect();
        queue.sort_by_key(|burst| burst.arrival_time);

        let mut process_order = Vec::new();
        let mut current_time = 0;
        while queue.iter().any(|burst| burst.remaining > 0) {
            let mut executed = false;

            for burst in queue.iter_mut() {
                if burst.arrival_time > current_time || burst.remaining == 0 {
                    continue;
                }
                executed = true;

                let run_time = quantum.min(burst.remaining);
                let start_time = current_time;
                burst.remaining -= run_time;
                current_time += run_time;
                process_order.push(ExecutionSlice::new(burst.pid, start_time, current_time));

                if burst.remaining == 0 {
                    trace!(pid = burst.pid, completed = current_time, "process finished");
                }
            }

            if !executed {
                match RoundRobinScheduler::next_arrival(&queue, current_time) {
                    Some(next_arrival) => current_time = next_arrival,
                    None => break,
                }
            }
        }

        ScheduleResult::from_slices(processes, process_order)
    }
}

#[cfg(test)]
mod tests {
    use super::super::round_robin;
    use super::*;
    use pretty_assertions::assert_eq;

    fn quantum(value: u32) -> NonZeroU32 {
        NonZeroU32::new(value).unwrap()
    }

    #[test]
    fn alternates_between_ready_processes() {
        let result = round_robin(
            &[Process::named(1, "P1", 0, 4), Process::named(2, "P2", 0, 2)],
            quantum(2),
        );

        assert_eq!(
            result.process_order,
            vec![
                ExecutionSlice::new(1, 0, 2),
                ExecutionSlice::new(2, 2, 4),
                ExecutionSlice::new(1, 4, 6),
            ]
        );
        assert_eq!(result.completion_time(1), Some(6));
        assert_eq!(result.completion_time(2), Some(4));
    }

    #[test]
    fn late_arrival_joins_by_list_position() {
        // P2 arrives at 1 and is served right after P1 in the first pass,
        // while P3 arriving at 5 waits for the second pass.
        let result = round_robin(
            &[
                Process::named(1, "P1", 0, 3),
                Process::named(3, "P3", 5, 2),
                Process::named(2, "P2", 1, 3),
            ],
            quantum(2),
        );

        assert_eq!(
            result.process_order,
            vec![
                ExecutionSlice::new(1, 0, 2),
                ExecutionSlice::new(2, 2, 4),
                ExecutionSlice::new(1, 4, 5),
                ExecutionSlice::new(2, 5, 6),
                ExecutionSlice::new(3, 6, 8),
            ]
        );
    }

    #[test]
    fn jumps_over_idle_gaps() {
        let result = round_robin(
            &[Process::named(1, "P1", 0, 1), Process::named(2, "P2", 7, 3)],
            quantum(2),
        );

        assert_eq!(
            result.process_order,
            vec![
                ExecutionSlice::new(1, 0, 1),
                ExecutionSlice::new(2, 7, 9),
                ExecutionSlice::new(2, 9, 10),
            ]
        );
        assert_eq!(result.waiting_time[&2], 0);
    }
}
