use super::{timeline, Algorithm, ExecutionSlice, Process, ScheduleResult, Segment, Ticks};
use std::fmt::Write;

pub(super) const UNIT_WIDTH: usize = 3;
/// Longer segments are drawn at this many time units; the axis still shows
/// their real end time.
pub(super) const MAX_SEGMENT_UNITS: Ticks = 20;

/// Plain text rendering of a finished schedule, for non-interactive use.
pub fn render_report(
    algorithm: Algorithm,
    processes: &[Process],
    result: &ScheduleResult,
) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", algorithm.name());
    let _ = writeln!(
        out,
        "{:<12} {:>7} {:>5} {:>8} {:>10} {:>10} {:>7}",
        "Process", "Arrival", "Burst", "Priority", "Completion", "Turnaround", "Waiting"
    );
    for process in processes {
        let pid = process.pid();
        let _ = writeln!(
            out,
            "{:<12} {:>7} {:>5} {:>8} {:>10} {:>10} {:>7}",
            process.name(),
            process.arrival_time(),
            process.burst_time(),
            process.priority(),
            result.completion_time(pid).unwrap_or(0),
            result.turnaround_time.get(&pid).copied().unwrap_or(0),
            result.waiting_time.get(&pid).copied().unwrap_or(0),
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Average waiting time:    {:.2}", result.average_waiting_time);
    let _ = writeln!(
        out,
        "Average turnaround time: {:.2}",
        result.average_turnaround_time
    );
    let _ = writeln!(
        out,
        "CPU utilization:         {:.2}%",
        result.cpu_utilization(processes)
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", gantt_bar(processes, result));
    let _ = writeln!(out, "{}", gantt_axis(&result.process_order));

    out
}

fn gantt_bar(processes: &[Process], result: &ScheduleResult) -> String {
    let mut bar = String::from("|");
    for segment in timeline(&result.process_order) {
        let width = segment_width(&segment) - 1;
        let label = match segment {
            Segment::Run(slice) => processes
                .iter()
                .find(|process| process.pid() == slice.pid)
                .map_or_else(|| slice.pid.to_string(), |process| process.name().to_owned()),
            Segment::Idle { .. } => String::new(),
        };
        let fill = if matches!(segment, Segment::Idle { .. }) { '.' } else { ' ' };
        let label: String = label.chars().take(width).collect();
        let padding = width - label.chars().count();
        bar.push_str(&label);
        bar.extend(std::iter::repeat(fill).take(padding));
        bar.push('|');
    }
    bar
}

/// Time markers under each segment boundary.
pub(super) fn gantt_axis(slices: &[ExecutionSlice]) -> String {
    let mut axis = String::from("0");
    let mut column = 0;
    for segment in timeline(slices) {
        let marker = segment.end().to_string();
        column += segment_width(&segment);
        // Markers of capped segments may collide; keep them apart
        let pad = column.saturating_sub(axis.chars().count()).max(1);
        axis.extend(std::iter::repeat(' ').take(pad));
        axis.push_str(&marker);
    }
    axis
}

/// Columns a segment takes in the chart, including its closing border.
pub(super) fn segment_width(segment: &Segment) -> usize {
    segment.duration().min(MAX_SEGMENT_UNITS) as usize * UNIT_WIDTH
}
