use super::{ExecutionSlice, Ticks};

/// A piece of the Gantt chart: either a slice or a stretch of idle CPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Run(ExecutionSlice),
    Idle { start: Ticks, end: Ticks },
}

impl Segment {
    pub fn start(&self) -> Ticks {
        match self {
            Segment::Run(slice) => slice.start_time,
            Segment::Idle { start, .. } => *start,
        }
    }

    pub fn end(&self) -> Ticks {
        match self {
            Segment::Run(slice) => slice.end_time,
            Segment::Idle { end, .. } => *end,
        }
    }

    pub fn duration(&self) -> Ticks {
        match self {
            Segment::Run(slice) => slice.duration(),
            Segment::Idle { start, end } => end - start,
        }
    }
}

/// Makes the idle gaps between time-ordered slices explicit, starting at 0.
pub fn timeline(slices: &[ExecutionSlice]) -> Vec<Segment> {
    let mut segments = Vec::with_capacity(slices.len());
    let mut cursor = 0;
    for slice in slices {
        if slice.start_time > cursor {
            segments.push(Segment::Idle {
                start: cursor,
                end: slice.start_time,
            });
        }
        segments.push(Segment::Run(*slice));
        cursor = slice.end_time;
    }
    segments
}
