use super::{
    report::{gantt_axis, segment_width},
    runner::{RunnerEvent, Simulation},
    timeline, Algorithm, AnimationState, Field, Pid, Process, Segment,
};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::{
    io::{self, Stdout},
    sync::mpsc::{self, Receiver},
    thread,
    time::{Duration, Instant},
};
use tracing::error;
use tui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table},
    Terminal,
};

pub enum DisplayEvent {
    Input(KeyEvent),
    Tick,
}

// Fast enough for the quickest animation speed
const TICK_RATE: Duration = Duration::from_millis(50);

const PALETTE: [Color; 8] = [
    Color::Blue,
    Color::Green,
    Color::Yellow,
    Color::Magenta,
    Color::LightMagenta,
    Color::Cyan,
    Color::Red,
    Color::LightRed,
];

const HELP: &str = "p/space play-pause | s step | r reset | +/- speed | [/] quantum | 1-4 algorithm | enter re-run | q quit";
const EDIT_HELP: &str =
    "up/down select | left/right column | e edit | a add | x remove selected";
const EDITING_HELP: &str = "type a value | enter save | esc cancel";

pub struct DisplayTerminal {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    input_rx: Receiver<DisplayEvent>,
}

impl DisplayTerminal {
    pub fn new() -> Result<Self, io::Error> {
        enable_raw_mode()?;
        let terminal = restore_on_error(DisplayTerminal::setup, || {
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
            let _ = disable_raw_mode();
        })?;

        // Set up the input handling thread
        let (input_tx, input_rx) = mpsc::channel();
        thread::spawn(move || {
            let mut last_tick = Instant::now();
            loop {
                let timeout = TICK_RATE
                    .checked_sub(last_tick.elapsed())
                    .unwrap_or(Duration::ZERO);

                match event::poll(timeout) {
                    Ok(true) => match event::read() {
                        Ok(Event::Key(key)) => {
                            if input_tx.send(DisplayEvent::Input(key)).is_err() {
                                break;
                            }
                        }
                        Ok(_) => {}
                        Err(err) => {
                            error!(%err, "failed to read terminal events");
                            break;
                        }
                    },
                    Ok(false) => {}
                    Err(err) => {
                        error!(%err, "failed to poll terminal events");
                        break;
                    }
                }

                if last_tick.elapsed() >= TICK_RATE {
                    if input_tx.send(DisplayEvent::Tick).is_err() {
                        break;
                    }
                    last_tick = Instant::now();
                }
            }
        });

        Ok(Self { terminal, input_rx })
    }

    // Everything after raw mode that can fail
    fn setup() -> Result<Terminal<CrosstermBackend<Stdout>>, io::Error> {
        execute!(io::stdout(), EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = Terminal::new(backend)?;
        terminal.hide_cursor()?;
        Ok(terminal)
    }

    pub fn draw(&mut self, simulation: &Simulation) -> Result<(), io::Error> {
        let processes = simulation.table().processes();
        let animator = simulation.animator();

        self.terminal.draw(|f| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .margin(1)
                .constraints([
                    Constraint::Length(3),
                    Constraint::Length(5),
                    Constraint::Min(5),
                    Constraint::Length(5),
                ])
                .split(f.size());

            let quantum = match simulation.algorithm() {
                Algorithm::RoundRobin => format!(" | Quantum: {}", simulation.quantum()),
                _ => format!(" | Quantum: {} (round robin only)", simulation.quantum()),
            };
            let state = match animator.state() {
                AnimationState::Idle => "Idle",
                AnimationState::Playing => "Playing",
                AnimationState::Paused => "Paused",
            };
            let status = Paragraph::new(format!(
                "{}{} | Step {}/{} | {} | Speed {}",
                simulation.algorithm().name(),
                quantum,
                animator.current_step(),
                animator.total_steps(),
                state,
                animator.speed(),
            ))
            .style(
                Style::default()
                    .add_modifier(Modifier::BOLD)
                    .fg(Color::LightBlue),
            )
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Simulation")
                    .border_type(BorderType::Rounded),
            );

            f.render_widget(status, chunks[0]);

            let slices = simulation.visible_slices();
            let gantt = Paragraph::new(vec![
                gantt_spans(processes, &timeline(slices)),
                Spans::from(gantt_axis(slices)),
            ])
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Gantt Chart"),
            );

            f.render_widget(gantt, chunks[1]);

            let result = simulation.result();
            let items = processes.iter().enumerate().map(|(index, process)| {
                let pid = process.pid();
                let selected = index == simulation.selected();
                let metric = |value: Option<u64>| {
                    Cell::from(value.map_or_else(|| "-".to_owned(), |v| v.to_string()))
                };
                let input = |field: Field, style: Style| {
                    let editing = simulation
                        .edit()
                        .filter(|edit| edit.pid == pid && edit.field == field);
                    match editing {
                        Some(edit) => Cell::from(format!("{}_", edit.input))
                            .style(style.add_modifier(Modifier::UNDERLINED)),
                        None if selected && simulation.field() == field => {
                            Cell::from(field.value_of(process))
                                .style(style.add_modifier(Modifier::REVERSED))
                        }
                        None => Cell::from(field.value_of(process)).style(style),
                    }
                };
                let row = Row::new(vec![
                    input(
                        Field::Name,
                        Style::default()
                            .fg(color_for(index))
                            .add_modifier(Modifier::BOLD),
                    ),
                    Cell::from("|"),
                    input(Field::ArrivalTime, Style::default()),
                    input(Field::BurstTime, Style::default()),
                    input(Field::Priority, Style::default()),
                    Cell::from("|"),
                    metric(result.and_then(|r| r.completion_time(pid))),
                    metric(result.and_then(|r| r.turnaround_time.get(&pid).copied())),
                    metric(result.and_then(|r| r.waiting_time.get(&pid).copied())),
                ]);
                if selected {
                    row.style(Style::default().add_modifier(Modifier::BOLD))
                } else {
                    row
                }
            });

            let table = Table::new(items)
                .header(
                    Row::new(vec![
                        "Process", "|", "Arrival", "Burst", "Priority", "|", "Completion",
                        "Turnaround", "Waiting",
                    ])
                    .style(Style::default().add_modifier(Modifier::BOLD)),
                )
                .widths(&[
                    Constraint::Length(12),
                    Constraint::Length(1),
                    Constraint::Length(7),
                    Constraint::Length(5),
                    Constraint::Length(8),
                    Constraint::Length(1),
                    Constraint::Length(10),
                    Constraint::Length(10),
                    Constraint::Length(7),
                ])
                .block(Block::default().title("Processes").borders(Borders::ALL))
                .style(Style::default().fg(Color::LightGreen))
                .column_spacing(1);

            f.render_widget(table, chunks[2]);

            let summary = match (result, simulation.message()) {
                (Some(result), _) => format!(
                    "Average waiting time: {:.2} | Average turnaround time: {:.2} | CPU utilization: {:.2}%",
                    result.average_waiting_time,
                    result.average_turnaround_time,
                    result.cpu_utilization(processes),
                ),
                (None, Some(message)) => message.to_owned(),
                (None, None) => String::new(),
            };
            let summary = Paragraph::new(vec![
                Spans::from(Span::styled(
                    summary,
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Spans::from(Span::styled(HELP, Style::default().fg(Color::DarkGray))),
                Spans::from(Span::styled(
                    if simulation.edit().is_some() { EDITING_HELP } else { EDIT_HELP },
                    Style::default().fg(Color::DarkGray),
                )),
            ])
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Results")
                    .border_type(BorderType::Rounded),
            );

            f.render_widget(summary, chunks[3]);
        })?;

        Ok(())
    }

    pub fn get_input(&self, editing: bool) -> Result<RunnerEvent, io::Error> {
        // Get the user's input and return a matching event
        let event = self.input_rx.recv().map_err(|_| {
            io::Error::new(io::ErrorKind::BrokenPipe, "terminal input thread stopped")
        })?;

        Ok(match event {
            DisplayEvent::Input(key) => key_event(key, editing),
            DisplayEvent::Tick => RunnerEvent::None,
        })
    }
}

fn key_event(key: KeyEvent, editing: bool) -> RunnerEvent {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => RunnerEvent::Quit,
            _ => RunnerEvent::None,
        };
    }
    if key.modifiers.contains(KeyModifiers::ALT) {
        return RunnerEvent::None;
    }

    if editing {
        return match key.code {
            KeyCode::Enter => RunnerEvent::CommitEdit,
            KeyCode::Esc => RunnerEvent::CancelEdit,
            KeyCode::Backspace => RunnerEvent::EditBackspace,
            KeyCode::Char(c) => RunnerEvent::EditInput(c),
            _ => RunnerEvent::None,
        };
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => RunnerEvent::Quit,
        KeyCode::Char('p') | KeyCode::Char(' ') => RunnerEvent::TogglePlay,
        KeyCode::Char('s') => RunnerEvent::Step,
        KeyCode::Char('r') => RunnerEvent::Reset,
        KeyCode::Char('+') | KeyCode::Char('=') => RunnerEvent::Faster,
        KeyCode::Char('-') => RunnerEvent::Slower,
        KeyCode::Char(']') => RunnerEvent::QuantumUp,
        KeyCode::Char('[') => RunnerEvent::QuantumDown,
        KeyCode::Char(digit @ '1'..='4') => {
            let index = digit as usize - '1' as usize;
            RunnerEvent::Select(Algorithm::ALL[index])
        }
        KeyCode::Char('a') => RunnerEvent::AddProcess,
        KeyCode::Char('x') | KeyCode::Delete => RunnerEvent::RemoveProcess,
        KeyCode::Up => RunnerEvent::SelectPrevious,
        KeyCode::Down => RunnerEvent::SelectNext,
        KeyCode::Left | KeyCode::BackTab => RunnerEvent::PreviousField,
        KeyCode::Right | KeyCode::Tab => RunnerEvent::NextField,
        KeyCode::Char('e') => RunnerEvent::StartEdit,
        KeyCode::Enter => RunnerEvent::Rerun,
        _ => RunnerEvent::None,
    }
}

/// Runs `setup`, calling `restore` before handing back its error.
fn restore_on_error<T>(
    setup: impl FnOnce() -> Result<T, io::Error>,
    restore: impl FnOnce(),
) -> Result<T, io::Error> {
    setup().map_err(|err| {
        restore();
        err
    })
}

impl Drop for DisplayTerminal {
    fn drop(&mut self) {
        // Best effort, the process is exiting anyway
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

fn color_for(index: usize) -> Color {
    PALETTE[index % PALETTE.len()]
}

fn gantt_spans(processes: &[Process], segments: &[Segment]) -> Spans<'static> {
    let mut spans = vec![Span::raw("|")];
    for segment in segments {
        let width = segment_width(segment) - 1;
        let span = match segment {
            Segment::Run(slice) => {
                let (name, color) = match position_of(processes, slice.pid) {
                    Some(index) => (processes[index].name().to_owned(), color_for(index)),
                    None => (slice.pid.to_string(), Color::Gray),
                };
                let label: String = name.chars().take(width).collect();
                Span::styled(
                    format!("{label:<width$}"),
                    Style::default()
                        .bg(color)
                        .fg(Color::Black)
                        .add_modifier(Modifier::BOLD),
                )
            }
            Segment::Idle { .. } => {
                Span::styled("·".repeat(width), Style::default().fg(Color::DarkGray))
            }
        };
        spans.push(span);
        spans.push(Span::raw("|"));
    }
    Spans::from(spans)
}

fn position_of(processes: &[Process], pid: Pid) -> Option<usize> {
    processes.iter().position(|process| process.pid() == pid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::ExecutionSlice;
    use pretty_assertions::assert_eq;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn help_lists_the_rerun_and_quantum_keys() {
        assert!(HELP.contains("enter re-run"));
        assert!(HELP.contains("[/] quantum"));
        assert_eq!(key_event(key(KeyCode::Enter), false), RunnerEvent::Rerun);
        assert_eq!(key_event(key(KeyCode::Char('[')), false), RunnerEvent::QuantumDown);
        assert_eq!(key_event(key(KeyCode::Char(']')), false), RunnerEvent::QuantumUp);
    }

    #[test]
    fn editing_captures_typed_keys() {
        assert_eq!(key_event(key(KeyCode::Char('q')), true), RunnerEvent::EditInput('q'));
        assert_eq!(key_event(key(KeyCode::Enter), true), RunnerEvent::CommitEdit);
        assert_eq!(key_event(key(KeyCode::Esc), true), RunnerEvent::CancelEdit);
        assert_eq!(key_event(key(KeyCode::Char('e')), false), RunnerEvent::StartEdit);
        assert_eq!(key_event(key(KeyCode::Down), false), RunnerEvent::SelectNext);
        assert_eq!(
            key_event(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL), true),
            RunnerEvent::Quit
        );
    }

    #[test]
    fn failed_setup_restores_the_terminal() {
        let restored = std::cell::Cell::new(false);
        let result: Result<(), io::Error> = restore_on_error(
            || Err(io::Error::new(io::ErrorKind::Other, "no tty")),
            || restored.set(true),
        );
        assert!(result.is_err());
        assert!(restored.get());

        restored.set(false);
        assert_eq!(restore_on_error(|| Ok(3), || restored.set(true)).unwrap(), 3);
        assert!(!restored.get());
    }

    #[test]
    fn long_idle_gaps_are_drawn_at_a_capped_width() {
        let processes = [Process::new(1, 1)];
        let slice = ExecutionSlice::new(1, Process::MAX_TIME, Process::MAX_TIME + 1);
        let segments = timeline(&[slice]);
        let spans = gantt_spans(&processes, &segments);
        assert!(spans.width() < 100);
    }
}
