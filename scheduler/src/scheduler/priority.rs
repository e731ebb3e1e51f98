use super::{non_preemptive, Process, ScheduleResult, Scheduler};

/// Non-preemptive priority scheduling, lowest value first.
pub struct PriorityScheduler;

impl Scheduler for PriorityScheduler {
    const NAME: &'static str = "Priority Scheduler";

    fn schedule(&self, processes: &[Process]) -> ScheduleResult {
        non_preemptive::schedule_by(processes, Process::priority)
    }
}
