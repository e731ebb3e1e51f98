use super::{
    coerce_quantum, display::DisplayTerminal, Algorithm, Animator, ExecutionSlice, Field,
    Pid, Process, ProcessTable, ScheduleResult, VisualizerError,
};
use std::num::NonZeroU32;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerEvent {
    Quit,
    TogglePlay,
    Step,
    Reset,
    Faster,
    Slower,
    Select(Algorithm),
    AddProcess,
    RemoveProcess,
    SelectPrevious,
    SelectNext,
    PreviousField,
    NextField,
    StartEdit,
    EditInput(char),
    EditBackspace,
    CommitEdit,
    CancelEdit,
    QuantumUp,
    QuantumDown,
    Rerun,
    None,
}

/// Text being typed into one cell of the process table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellEdit {
    pub pid: Pid,
    pub field: Field,
    pub input: String,
}

/// Everything the user can change between runs, plus the snapshot computed
/// from it and the playback over that snapshot.
pub struct Simulation {
    table: ProcessTable,
    algorithm: Algorithm,
    quantum: NonZeroU32,
    result: Option<ScheduleResult>,
    animator: Animator,
    message: Option<String>,
    selected: usize,
    field: Field,
    edit: Option<CellEdit>,
}

impl Simulation {
    pub fn new(table: ProcessTable, algorithm: Algorithm, quantum: NonZeroU32, speed: u8) -> Self {
        let mut simulation = Self {
            table,
            algorithm,
            quantum,
            result: None,
            animator: Animator::with_speed(0, speed),
            message: None,
            selected: 0,
            field: Field::Name,
            edit: None,
        };
        simulation.rerun();
        simulation
    }

    pub fn table(&self) -> &ProcessTable {
        &self.table
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn quantum(&self) -> NonZeroU32 {
        self.quantum
    }

    pub fn result(&self) -> Option<&ScheduleResult> {
        self.result.as_ref()
    }

    pub fn animator(&self) -> &Animator {
        &self.animator
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Index of the highlighted row in the process table.
    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn field(&self) -> Field {
        self.field
    }

    pub fn edit(&self) -> Option<&CellEdit> {
        self.edit.as_ref()
    }

    fn selected_process(&self) -> Option<&Process> {
        self.table.processes().get(self.selected)
    }

    fn select(&mut self, index: usize) {
        let len = self.table.processes().len();
        self.selected = index.min(len.saturating_sub(1));
    }

    fn set_quantum(&mut self, quantum: i64) {
        self.quantum = coerce_quantum(Some(quantum.max(1)));
        info!(quantum = self.quantum.get(), "time quantum changed");
        self.rerun();
    }

    /// The slices revealed so far by the animation.
    pub fn visible_slices(&self) -> &[ExecutionSlice] {
        match &self.result {
            Some(result) => &result.process_order[..self.animator.current_step()],
            None => &[],
        }
    }

    /// Recomputes the schedule from the current inputs and rewinds playback.
    pub fn rerun(&mut self) {
        let speed = self.animator.speed();
        match self.table.snapshot() {
            Ok(processes) => {
                let result = self.algorithm.run(processes, self.quantum);
                self.animator = Animator::with_speed(result.process_order.len(), speed);
                self.result = Some(result);
                self.message = None;
            }
            Err(err) => {
                warn!(%err, "simulation not run");
                self.animator = Animator::with_speed(0, speed);
                self.result = None;
                self.message = Some(err.to_string());
            }
        }
    }

    pub fn tick(&mut self) -> bool {
        self.animator.update()
    }

    // Returns false if the program should quit
    pub fn handle(&mut self, event: RunnerEvent) -> bool {
        match event {
            RunnerEvent::Quit => return false,
            RunnerEvent::TogglePlay => self.animator.toggle(),
            RunnerEvent::Step => self.animator.step(),
            RunnerEvent::Reset => self.animator.reset(),
            RunnerEvent::Faster => self.animator.faster(),
            RunnerEvent::Slower => self.animator.slower(),
            RunnerEvent::Select(algorithm) => {
                info!(%algorithm, "algorithm selected");
                self.algorithm = algorithm;
                self.rerun();
            }
            RunnerEvent::AddProcess => match self.table.add_process() {
                Ok(pid) => {
                    info!(pid, "process added");
                    self.select(self.table.processes().len() - 1);
                    self.rerun();
                }
                Err(err) => {
                    warn!(%err, "process not added");
                    self.message = Some(err.to_string());
                }
            },
            RunnerEvent::RemoveProcess => {
                let selected = self.selected_process().map(Process::pid);
                if let Some(process) = selected.and_then(|pid| self.table.remove_process(pid)) {
                    info!(pid = process.pid(), "process removed");
                }
                self.select(self.selected);
                self.rerun();
            }
            RunnerEvent::SelectPrevious => self.select(self.selected.saturating_sub(1)),
            RunnerEvent::SelectNext => self.select(self.selected + 1),
            RunnerEvent::PreviousField => self.field = self.field.previous(),
            RunnerEvent::NextField => self.field = self.field.next(),
            RunnerEvent::StartEdit => {
                self.edit = self.selected_process().map(|process| CellEdit {
                    pid: process.pid(),
                    field: self.field,
                    input: self.field.value_of(process),
                });
            }
            RunnerEvent::EditInput(c) => {
                if let Some(edit) = &mut self.edit {
                    edit.input.push(c);
                }
            }
            RunnerEvent::EditBackspace => {
                if let Some(edit) = &mut self.edit {
                    edit.input.pop();
                }
            }
            RunnerEvent::CommitEdit => {
                if let Some(edit) = self.edit.take() {
                    if let Some(process) = self.table.edit(edit.pid, edit.field, &edit.input) {
                        info!(pid = process.pid(), field = edit.field.key(), "process edited");
                    }
                    self.rerun();
                }
            }
            RunnerEvent::CancelEdit => self.edit = None,
            RunnerEvent::QuantumUp => self.set_quantum(i64::from(self.quantum.get()) + 1),
            RunnerEvent::QuantumDown => self.set_quantum(i64::from(self.quantum.get()) - 1),
            RunnerEvent::Rerun => self.rerun(),
            RunnerEvent::None => {}
        }
        true
    }
}

pub struct ScheduleRunner {
    terminal: DisplayTerminal,
    simulation: Simulation,
}

impl ScheduleRunner {
    pub fn new(simulation: Simulation) -> Result<Self, VisualizerError> {
        let terminal = DisplayTerminal::new()?;
        info!(algorithm = %simulation.algorithm(), "runner started");

        Ok(Self {
            terminal,
            simulation,
        })
    }

    // Returns false if the program should quit
    pub fn run(&mut self) -> Result<bool, VisualizerError> {
        self.simulation.tick();
        self.terminal.draw(&self.simulation)?;

        let event = self.terminal.get_input(self.simulation.edit().is_some())?;
        Ok(self.simulation.handle(event))
    }
}
