use super::{non_preemptive, Process, ScheduleResult, Scheduler};

/// Non-preemptive shortest job first.
pub struct ShortestJobFirst;

impl Scheduler for ShortestJobFirst {
    const NAME: &'static str = "Shortest Job First";

    fn schedule(&self, processes: &[Process]) -> ScheduleResult {
        non_preemptive::schedule_by(processes, Process::burst_time)
    }
}

#[cfg(test)]
mod tests {
    use super::super::{sjf, ExecutionSlice};
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    #[test]
    fn only_arrived_jobs_are_eligible() {
        let result = sjf(&[Process::named(1, "P1", 0, 8), Process::named(2, "P2", 1, 4)]);

        assert_eq!(
            result.process_order,
            vec![ExecutionSlice::new(1, 0, 8), ExecutionSlice::new(2, 8, 12)]
        );
        assert_eq!(result.waiting_time, BTreeMap::from([(1, 0), (2, 7)]));
    }

    #[test]
    fn shortest_available_job_runs_next() {
        let result = sjf(&[
            Process::named(1, "P1", 0, 5),
            Process::named(2, "P2", 1, 3),
            Process::named(3, "P3", 2, 8),
            Process::named(4, "P4", 3, 2),
        ]);

        let order: Vec<_> = result.process_order.iter().map(|slice| slice.pid).collect();
        assert_eq!(order, vec![1, 4, 2, 3]);
        assert_eq!(result.average_waiting_time, 4.0);
    }

    #[test]
    fn equal_bursts_keep_input_order() {
        let result = sjf(&[
            Process::named(1, "P1", 0, 1),
            Process::named(3, "P3", 0, 4),
            Process::named(2, "P2", 0, 4),
        ]);

        let order: Vec<_> = result.process_order.iter().map(|slice| slice.pid).collect();
        assert_eq!(order, vec![1, 3, 2]);
    }

    #[test]
    fn skips_idle_time_before_late_arrivals() {
        let result = sjf(&[Process::named(1, "P1", 4, 2), Process::named(2, "P2", 10, 1)]);

        assert_eq!(
            result.process_order,
            vec![ExecutionSlice::new(1, 4, 6), ExecutionSlice::new(2, 10, 11)]
        );
    }
}
