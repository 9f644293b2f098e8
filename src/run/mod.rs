//! Run orchestration: selection, evaluation and dispatch.
//!
//! A run evaluates the selected applications concurrently, re-sequences the
//! verdicts to declaration order, and hands the failing ones to one sink.

use std::time::Instant;

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use log::{info, warn};

use crate::check::{Application, CheckVerdict, HttpProbe, Probe};
use crate::config::{load_applications, Config};
use crate::error_handling::RunError;
use crate::initialization::{init_probe_client, init_sink_client};
use crate::sink::{ReportSink, Sink};

/// Results of a completed run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Number of applications evaluated
    pub evaluated: usize,
    /// Failing verdicts, in declaration order
    pub failures: Vec<CheckVerdict>,
    /// Elapsed time in seconds
    pub elapsed_seconds: f64,
}

impl RunReport {
    /// True when every evaluated application passed.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Picks the applications to evaluate.
///
/// With a target, only the first application with exactly that name is
/// selected. An empty target selects everything.
fn select<'a>(
    applications: &'a [Application],
    target: Option<&str>,
) -> Result<Vec<&'a Application>, RunError> {
    match target.filter(|name| !name.is_empty()) {
        None => Ok(applications.iter().collect()),
        Some(name) => applications
            .iter()
            .find(|app| app.name == name)
            .map(|app| vec![app])
            .ok_or_else(|| RunError::TargetNotFound(name.to_string())),
    }
}

/// Evaluates `applications` with `probe` and reports failures to `sink`.
///
/// At most `max_concurrency` probes are in flight; verdicts are handled in
/// declaration order regardless of completion order. The sink is only asked
/// to dispatch when at least one verdict failed.
///
/// # Errors
///
/// Returns `RunError::TargetNotFound` before any evaluation if `target` names
/// no application, and `RunError::Dispatch` if the sink fails.
pub async fn run_checks<P, S>(
    applications: &[Application],
    target: Option<&str>,
    probe: &P,
    sink: &S,
    max_concurrency: usize,
) -> Result<RunReport, RunError>
where
    P: Probe,
    S: Sink,
{
    let start = Instant::now();
    let selected = select(applications, target)?;
    let evaluated = selected.len();
    info!("Evaluating {} application(s)", evaluated);

    let mut verdicts = stream::iter(selected)
        .map(|app| probe.check(app))
        .buffered(max_concurrency.max(1));

    let mut failures = Vec::new();
    while let Some(verdict) = verdicts.next().await {
        if verdict.is_success() {
            info!("[{}] passed: {}", verdict.application.name, verdict);
        } else {
            warn!("[{}] failed: {}", verdict.application.name, verdict);
            sink.record_failure(&verdict);
            failures.push(verdict);
        }
    }

    if failures.is_empty() {
        info!("No failed tests");
    } else {
        sink.dispatch(&failures).await?;
    }

    Ok(RunReport {
        evaluated,
        failures,
        elapsed_seconds: start.elapsed().as_secs_f64(),
    })
}

/// Runs the checks described by `config`.
///
/// This is the main entry point for the library. It loads the applications
/// file, builds the HTTP probe and the configured sink, and calls
/// [`run_checks`].
///
/// # Errors
///
/// This function will return an error if:
/// - The applications file cannot be loaded or is invalid
/// - The HTTP clients cannot be initialized
/// - The target application is not declared
/// - The sink fails to dispatch
///
/// # Example
///
/// ```no_run
/// use synthetic_checks::{run, Config};
/// use std::path::PathBuf;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Config {
///     config: PathBuf::from("config/dev.applications.yml"),
///     ..Default::default()
/// };
/// let report = run(config).await?;
/// println!("{} failing check(s)", report.failures.len());
/// # Ok(())
/// # }
/// ```
pub async fn run(config: Config) -> Result<RunReport> {
    let applications = load_applications(&config.config, config.skip_allowlist_check)
        .with_context(|| format!("Failed to load applications from {}", config.config.display()))?;

    if let Some(cluster) = config.cluster_info.as_deref().filter(|c| !c.is_empty()) {
        info!("Cluster: {}", cluster);
    }
    info!("Environment: {}", config.environment);

    let probe_client =
        init_probe_client(&config.user_agent).context("Failed to initialize probe HTTP client")?;
    let sink_client =
        init_sink_client(&config.user_agent).context("Failed to initialize sink HTTP client")?;

    let probe = HttpProbe::new(probe_client, config.report_options());
    let sink = ReportSink::from_config(&config, sink_client);
    info!("Reporting failures to the {} sink", sink.name());

    let report = run_checks(
        &applications,
        config.target.as_deref(),
        &probe,
        &sink,
        config.max_concurrency,
    )
    .await?;
    Ok(report)
}

#[cfg(test)]
mod tests;
