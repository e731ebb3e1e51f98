use super::{Algorithm, Pid, Process, RoundRobinScheduler, Ticks, VisualizerError};
use serde::Deserialize;
use std::{collections::BTreeSet, fs, num::NonZeroU32, path::Path};
use tracing::{info, warn};

/// A process entry exactly as written in a workload file. Every field is
/// optional and may be out of range; see [`Workload::process_table`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProcessEntry {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub arrival_time: Option<i64>,
    pub burst_time: Option<i64>,
    pub priority: Option<i64>,
}

impl ProcessEntry {
    fn sample(id: i64, arrival_time: i64, burst_time: i64, priority: i64) -> Self {
        Self {
            id: Some(id),
            name: Some(format!("P{id}")),
            arrival_time: Some(arrival_time),
            burst_time: Some(burst_time),
            priority: Some(priority),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Workload {
    pub algorithm: Algorithm,
    pub time_quantum: Option<i64>,
    pub speed: Option<i64>,
    pub processes: Vec<ProcessEntry>,
}

impl Default for Workload {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Fcfs,
            time_quantum: None,
            speed: None,
            processes: vec![
                ProcessEntry::sample(1, 0, 5, 2),
                ProcessEntry::sample(2, 1, 3, 1),
                ProcessEntry::sample(3, 2, 8, 4),
                ProcessEntry::sample(4, 3, 2, 3),
            ],
        }
    }
}

impl Workload {
    pub fn load(path: &Path) -> Result<Self, VisualizerError> {
        let contents = fs::read_to_string(path).map_err(|source| VisualizerError::ReadWorkload {
            path: path.to_owned(),
            source,
        })?;
        let workload: Workload = serde_json::from_str(&contents)?;
        info!(
            path = %path.display(),
            processes = workload.processes.len(),
            "loaded workload"
        );
        Ok(workload)
    }

    /// Builds the process list, coercing out-of-range fields to the nearest
    /// valid value. Duplicate or negative ids are rejected.
    pub fn process_table(&self) -> Result<ProcessTable, VisualizerError> {
        let mut processes = Vec::with_capacity(self.processes.len());
        let mut seen = BTreeSet::new();

        // Explicit ids first, so generated ids never collide with them
        for entry in &self.processes {
            if let Some(id) = entry.id {
                let pid = parse_pid(id)?;
                if !seen.insert(pid) {
                    return Err(VisualizerError::DuplicateProcessId(pid));
                }
            }
        }

        for entry in &self.processes {
            let pid = match entry.id {
                Some(id) => parse_pid(id)?,
                None => {
                    let pid = next_free_pid(&seen).ok_or_else(|| {
                        VisualizerError::InvalidArgument("no free process id left".to_owned())
                    })?;
                    seen.insert(pid);
                    pid
                }
            };
            let name = entry.name.clone().unwrap_or_else(|| format!("P{pid}"));
            let arrival_time = coerce_field(pid, Field::ArrivalTime, entry.arrival_time);
            let burst_time = coerce_field(pid, Field::BurstTime, entry.burst_time);
            let priority = coerce_field(pid, Field::Priority, entry.priority);

            processes.push(Process::with_priority(
                pid,
                &name,
                arrival_time,
                burst_time,
                u32::try_from(priority).unwrap_or(u32::MAX),
            ));
        }

        Ok(ProcessTable::with_processes(processes))
    }
}

/// A missing or non-positive quantum falls back to the default of 2.
pub fn coerce_quantum(quantum: Option<i64>) -> NonZeroU32 {
    match quantum {
        None => RoundRobinScheduler::DEFAULT_QUANTUM,
        Some(value) => u32::try_from(value)
            .ok()
            .and_then(NonZeroU32::new)
            .unwrap_or_else(|| {
                warn!(
                    quantum = value,
                    default = RoundRobinScheduler::DEFAULT_QUANTUM.get(),
                    "invalid time quantum, using default"
                );
                RoundRobinScheduler::DEFAULT_QUANTUM
            }),
    }
}

fn parse_pid(id: i64) -> Result<Pid, VisualizerError> {
    Pid::try_from(id).map_err(|_| {
        VisualizerError::InvalidArgument(format!(
            "process id {id} is outside 0..={}",
            Pid::MAX
        ))
    })
}

/// One past the highest id in use, or the lowest unused id once that would
/// overflow.
fn next_free_pid(used: &BTreeSet<Pid>) -> Option<Pid> {
    match used.iter().next_back() {
        None => Some(1),
        Some(max) => max
            .checked_add(1)
            .or_else(|| (1..=Pid::MAX).chain([0]).find(|pid| !used.contains(pid))),
    }
}

fn coerce_field(pid: Pid, field: Field, value: Option<i64>) -> Ticks {
    let (minimum, maximum) = field.bounds();
    match value {
        Some(value) if value < minimum as i64 => {
            warn!(pid, field = field.key(), value, minimum, "value below minimum, coerced");
            minimum
        }
        Some(value) if value as Ticks > maximum => {
            warn!(pid, field = field.key(), value, maximum, "value above maximum, coerced");
            maximum
        }
        Some(value) => value as Ticks,
        None => {
            warn!(pid, field = field.key(), minimum, "missing value, using minimum");
            minimum
        }
    }
}

/// An editable column of the process table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    ArrivalTime,
    BurstTime,
    Priority,
}

impl Field {
    pub const ALL: [Field; 4] = [
        Field::Name,
        Field::ArrivalTime,
        Field::BurstTime,
        Field::Priority,
    ];

    /// The key used for this field in workload files.
    pub fn key(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::ArrivalTime => "arrival_time",
            Field::BurstTime => "burst_time",
            Field::Priority => "priority",
        }
    }

    /// Inclusive range a numeric field is coerced into.
    fn bounds(&self) -> (Ticks, Ticks) {
        match self {
            Field::Name => (0, 0),
            Field::ArrivalTime => (0, Process::MAX_TIME),
            Field::BurstTime => (1, Process::MAX_TIME),
            Field::Priority => (1, Ticks::from(u32::MAX)),
        }
    }

    pub fn next(&self) -> Field {
        let index = Field::ALL.iter().position(|field| field == self).unwrap_or(0);
        Field::ALL[(index + 1) % Field::ALL.len()]
    }

    pub fn previous(&self) -> Field {
        let index = Field::ALL.iter().position(|field| field == self).unwrap_or(0);
        Field::ALL[(index + Field::ALL.len() - 1) % Field::ALL.len()]
    }

    /// The current value of this field, as the user would type it.
    pub fn value_of(&self, process: &Process) -> String {
        match self {
            Field::Name => process.name().to_owned(),
            Field::ArrivalTime => process.arrival_time().to_string(),
            Field::BurstTime => process.burst_time().to_string(),
            Field::Priority => process.priority().to_string(),
        }
    }
}

/// The caller-owned, editable process list. The scheduler only ever sees
/// borrowed snapshots of it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessTable {
    processes: Vec<Process>,
}

impl ProcessTable {
    const NEW_BURST_TIME: Ticks = 5;

    pub fn with_processes(processes: Vec<Process>) -> Self {
        Self { processes }
    }

    pub fn processes(&self) -> &[Process] {
        &self.processes
    }

    /// Appends a process with the next free id and default timings.
    pub fn add_process(&mut self) -> Result<Pid, VisualizerError> {
        let used: BTreeSet<Pid> = self.processes.iter().map(Process::pid).collect();
        let pid = next_free_pid(&used).ok_or_else(|| {
            VisualizerError::InvalidArgument("no free process id left".to_owned())
        })?;
        self.processes
            .push(Process::new(pid, ProcessTable::NEW_BURST_TIME));
        Ok(pid)
    }

    /// Replaces one field of a process with typed user input. Numbers are
    /// coerced like workload entries; text that is not a number counts as
    /// missing. An empty name falls back to the default one.
    pub fn edit(&mut self, pid: Pid, field: Field, input: &str) -> Option<&Process> {
        let process = self
            .processes
            .iter_mut()
            .find(|process| process.pid() == pid)?;
        let input = input.trim();

        let mut name = process.name().to_owned();
        let mut arrival_time = process.arrival_time();
        let mut burst_time = process.burst_time();
        let mut priority = process.priority();
        match field {
            Field::Name if input.is_empty() => name = format!("P{pid}"),
            Field::Name => name = input.to_owned(),
            Field::ArrivalTime => arrival_time = coerce_field(pid, field, input.parse().ok()),
            Field::BurstTime => burst_time = coerce_field(pid, field, input.parse().ok()),
            Field::Priority => {
                let value = coerce_field(pid, field, input.parse().ok());
                priority = u32::try_from(value).unwrap_or(u32::MAX);
            }
        }

        *process = Process::with_priority(pid, &name, arrival_time, burst_time, priority);
        Some(&*process)
    }

    pub fn remove_process(&mut self, pid: Pid) -> Option<Process> {
        self.processes
            .iter()
            .position(|process| process.pid() == pid)
            .map(|index| self.processes.remove(index))
    }

    /// The list to hand to a scheduler; an empty list is refused here so the
    /// engine never sees one.
    pub fn snapshot(&self) -> Result<&[Process], VisualizerError> {
        if self.processes.is_empty() {
            return Err(VisualizerError::EmptyInput);
        }
        Ok(&self.processes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_workload_has_four_sample_processes() {
        let table = Workload::default().process_table().unwrap();
        let pids: Vec<_> = table.processes().iter().map(Process::pid).collect();
        assert_eq!(pids, vec![1, 2, 3, 4]);
        assert_eq!(
            table.processes()[2],
            Process::with_priority(3, "P3", 2, 8, 4)
        );
    }

    #[test]
    fn malformed_fields_are_coerced() {
        let workload: Workload = serde_json::from_str(
            r#"{
                "algorithm": "sjf",
                "processes": [
                    { "id": 4, "name": "editor", "arrival_time": -3, "burst_time": 0, "priority": -1 },
                    { "arrival_time": 2 }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(workload.algorithm, Algorithm::Sjf);
        let table = workload.process_table().unwrap();
        assert_eq!(
            table.processes(),
            &[
                Process::with_priority(4, "editor", 0, 1, 1),
                Process::with_priority(5, "P5", 2, 1, 1),
            ]
        );
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let workload: Workload =
            serde_json::from_str(r#"{ "processes": [ { "id": 1 }, { "id": 1 } ] }"#).unwrap();
        assert!(matches!(
            workload.process_table(),
            Err(VisualizerError::DuplicateProcessId(1))
        ));
    }

    #[test]
    fn invalid_quantum_falls_back_to_default() {
        assert_eq!(coerce_quantum(None).get(), 2);
        assert_eq!(coerce_quantum(Some(0)).get(), 2);
        assert_eq!(coerce_quantum(Some(-4)).get(), 2);
        assert_eq!(coerce_quantum(Some(3)).get(), 3);
    }

    #[test]
    fn added_process_takes_the_next_id() {
        let mut table = ProcessTable::with_processes(vec![Process::new(1, 2), Process::new(7, 2)]);
        assert_eq!(table.add_process().unwrap(), 8);
        assert_eq!(table.processes()[2], Process::named(8, "P8", 0, 5));

        assert_eq!(table.remove_process(7).map(|p| p.pid()), Some(7));
        assert_eq!(table.remove_process(7), None);
    }

    #[test]
    fn added_process_after_the_largest_id_takes_a_free_one() {
        let mut table = ProcessTable::with_processes(vec![
            Process::new(1, 2),
            Process::new(Pid::MAX, 2),
        ]);
        assert_eq!(table.add_process().unwrap(), 2);
        assert_eq!(table.add_process().unwrap(), 3);
    }

    #[test]
    fn generated_id_after_the_largest_id_takes_a_free_one() {
        let workload: Workload = serde_json::from_str(
            r#"{ "processes": [ { "id": 4294967295 }, { "arrival_time": 1 } ] }"#,
        )
        .unwrap();

        let table = workload.process_table().unwrap();
        let pids: Vec<_> = table.processes().iter().map(Process::pid).collect();
        assert_eq!(pids, vec![Pid::MAX, 1]);
    }

    #[test]
    fn out_of_range_ids_are_rejected() {
        for id in ["-1", "-2", "4294967296"] {
            let workload: Workload =
                serde_json::from_str(&format!(r#"{{ "processes": [ {{ "id": {id} }} ] }}"#))
                    .unwrap();
            assert!(matches!(
                workload.process_table(),
                Err(VisualizerError::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn huge_times_are_capped_at_the_boundary() {
        let workload: Workload = serde_json::from_str(&format!(
            r#"{{ "processes": [ {{ "id": 1, "arrival_time": {max}, "burst_time": {max} }} ] }}"#,
            max = i64::MAX
        ))
        .unwrap();

        let table = workload.process_table().unwrap();
        let process = &table.processes()[0];
        assert_eq!(process.arrival_time(), Process::MAX_TIME);
        assert_eq!(process.burst_time(), Process::MAX_TIME);

        let result = super::super::fcfs(table.snapshot().unwrap());
        assert_eq!(result.makespan(), 2 * Process::MAX_TIME);
    }

    #[test]
    fn edits_are_coerced_like_workload_entries() {
        let mut table = ProcessTable::with_processes(vec![Process::new(1, 2)]);

        table.edit(1, Field::Name, "  shell ");
        table.edit(1, Field::ArrivalTime, "-4");
        table.edit(1, Field::BurstTime, "abc");
        table.edit(1, Field::Priority, "3");
        assert_eq!(
            table.processes()[0],
            Process::with_priority(1, "shell", 0, 1, 3)
        );

        table.edit(1, Field::BurstTime, "99999999999");
        assert_eq!(table.processes()[0].burst_time(), Process::MAX_TIME);
        table.edit(1, Field::Name, "");
        assert_eq!(table.processes()[0].name(), "P1");
        assert!(table.edit(9, Field::Name, "ghost").is_none());
    }

    #[test]
    fn fields_cycle_in_column_order() {
        assert_eq!(Field::Priority.next(), Field::Name);
        assert_eq!(Field::Name.previous(), Field::Priority);
        assert_eq!(Field::ArrivalTime.next(), Field::BurstTime);
        assert_eq!(Field::BurstTime.value_of(&Process::new(1, 6)), "6");
    }

    #[test]
    fn empty_table_is_refused() {
        let mut table = ProcessTable::default();
        assert!(matches!(table.snapshot(), Err(VisualizerError::EmptyInput)));
        assert_eq!(table.add_process().unwrap(), 1);
        assert_eq!(table.snapshot().unwrap().len(), 1);
    }
}
