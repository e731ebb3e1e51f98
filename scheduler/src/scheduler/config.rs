use super::{Algorithm, VisualizerError};
use std::{
    fs::File,
    io,
    path::{Path, PathBuf},
    sync::Mutex,
};
use tracing_subscriber::{fmt, EnvFilter};

pub const USAGE: &str = "usage: scheduling-visualizer [--report] [--algorithm fcfs|sjf|priority|rr] \
[--quantum N] [--speed 1-10] [--log-file PATH] [WORKLOAD.json]";

/// Command line options. Anything given here overrides the workload file.
#[derive(Debug, Default, PartialEq)]
pub struct Options {
    pub report: bool,
    pub algorithm: Option<Algorithm>,
    pub quantum: Option<i64>,
    pub speed: Option<i64>,
    pub log_file: Option<PathBuf>,
    pub workload: Option<PathBuf>,
}

impl Options {
    pub fn from_args<I>(args: I) -> Result<Self, VisualizerError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut options = Options::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--report" => options.report = true,
                "--algorithm" | "-a" => {
                    options.algorithm = Some(value(&arg, args.next())?.parse()?);
                }
                "--quantum" | "-q" => options.quantum = Some(number(&arg, args.next())?),
                "--speed" => options.speed = Some(number(&arg, args.next())?),
                "--log-file" => options.log_file = Some(value(&arg, args.next())?.into()),
                flag if flag.starts_with('-') => {
                    return Err(VisualizerError::InvalidArgument(format!(
                        "unknown flag `{flag}`\n{USAGE}"
                    )));
                }
                path if options.workload.is_none() => options.workload = Some(path.into()),
                extra => {
                    return Err(VisualizerError::InvalidArgument(format!(
                        "unexpected argument `{extra}`\n{USAGE}"
                    )));
                }
            }
        }

        Ok(options)
    }
}

fn value(flag: &str, value: Option<String>) -> Result<String, VisualizerError> {
    value.ok_or_else(|| VisualizerError::InvalidArgument(format!("`{flag}` needs a value")))
}

fn number(flag: &str, raw: Option<String>) -> Result<i64, VisualizerError> {
    let raw = value(flag, raw)?;
    raw.parse().map_err(|_| {
        VisualizerError::InvalidArgument(format!("`{flag}` expects a number, got `{raw}`"))
    })
}

/// Installs the global subscriber. The terminal UI owns stdout, so events are
/// written to `log_file` when given, to stderr when `to_stderr` is set, and
/// dropped otherwise. `RUST_LOG` controls the filter (default: info).
pub fn init_tracing(log_file: Option<&Path>, to_stderr: bool) -> Result<(), VisualizerError> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match log_file {
        Some(path) => {
            let file = File::create(path).map_err(|source| VisualizerError::OpenLog {
                path: path.to_owned(),
                source,
            })?;
            fmt()
                .with_env_filter(env_filter)
                .with_ansi(false)
                .with_target(true)
                .with_writer(Mutex::new(file))
                .init();
        }
        None if to_stderr => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(io::stderr)
                .init();
        }
        None => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|arg| arg.to_string()).collect()
    }

    #[test]
    fn parses_flags_and_workload_path() {
        let options = Options::from_args(args(&[
            "--algorithm",
            "rr",
            "-q",
            "3",
            "--report",
            "jobs.json",
        ]))
        .unwrap();

        assert_eq!(
            options,
            Options {
                report: true,
                algorithm: Some(Algorithm::RoundRobin),
                quantum: Some(3),
                speed: None,
                log_file: None,
                workload: Some(PathBuf::from("jobs.json")),
            }
        );
    }

    #[test]
    fn no_arguments_means_defaults() {
        assert_eq!(Options::from_args(Vec::new()).unwrap(), Options::default());
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(
            Options::from_args(args(&["--verbose"])),
            Err(VisualizerError::InvalidArgument(_))
        ));
        assert!(matches!(
            Options::from_args(args(&["--quantum", "two"])),
            Err(VisualizerError::InvalidArgument(_))
        ));
        assert!(matches!(
            Options::from_args(args(&["--algorithm"])),
            Err(VisualizerError::InvalidArgument(_))
        ));
        assert!(matches!(
            Options::from_args(args(&["--algorithm", "lottery"])),
            Err(VisualizerError::UnknownAlgorithm(_))
        ));
        assert!(matches!(
            Options::from_args(args(&["a.json", "b.json"])),
            Err(VisualizerError::InvalidArgument(_))
        ));
    }
}
