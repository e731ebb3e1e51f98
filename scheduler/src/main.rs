mod scheduler;

use scheduler::{
    init_tracing, render_report, Animator, Options, ScheduleRunner, Simulation,
    VisualizerError, Workload,
};
use std::env;
use tracing::info;

fn main() -> Result<(), VisualizerError> {
    let options = Options::from_args(env::args().skip(1))?;
    init_tracing(options.log_file.as_deref(), options.report)?;

    let workload = match &options.workload {
        Some(path) => Workload::load(path)?,
        None => Workload::default(),
    };
    let algorithm = options.algorithm.unwrap_or(workload.algorithm);
    let quantum = scheduler::coerce_quantum(options.quantum.or(workload.time_quantum));
    let speed = options
        .speed
        .or(workload.speed)
        .map_or(Animator::DEFAULT_SPEED, |speed| {
            speed.clamp(Animator::MIN_SPEED.into(), Animator::MAX_SPEED.into()) as u8
        });
    let table = workload.process_table()?;

    if options.report {
        let processes = table.snapshot()?;
        let result = algorithm.run(processes, quantum);
        print!("{}", render_report(algorithm, processes, &result));
        return Ok(());
    }

    info!(%algorithm, quantum = quantum.get(), speed, "starting visualizer");
    let mut runner = ScheduleRunner::new(Simulation::new(table, algorithm, quantum, speed))?;

    while runner.run()? {}

    Ok(())
}
