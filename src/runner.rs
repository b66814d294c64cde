//! Session runner analyzes every driver of a session in parallel
//!
//! Drivers are independent, so each one is a unit of work on the tokio
//! blocking pool. At most `max_concurrency` units run at once. Results are
//! keyed by driver in a `BTreeMap`, which makes the output identical no
//! matter which unit finishes first.

use futures::StreamExt;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::AnalysisConfig;
use crate::ingest::SessionLaps;
use crate::insights::StrategyReport;
use crate::types::DriverLaps;
use crate::Result;

/// Analyze a single driver on its own.
///
/// This is the unit of work the runner schedules.
pub fn analyze_driver(laps: &DriverLaps, config: &AnalysisConfig) -> Result<StrategyReport> {
    StrategyReport::build(laps, None, config)
}

/// Called with the driver id each time a driver's analysis finishes.
pub type DriverFinishedCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Per-driver results of a session run.
#[derive(Debug)]
pub struct SessionAnalysis {
    /// One entry per driver that was analyzed before cancellation
    pub drivers: BTreeMap<String, Result<StrategyReport>>,
    /// The run was cancelled before every driver was analyzed
    pub cancelled: bool,
}

impl SessionAnalysis {
    pub fn get(&self, driver: &str) -> Option<&Result<StrategyReport>> {
        self.drivers.get(driver)
    }

    /// Reports of drivers that were analyzed successfully.
    pub fn reports(&self) -> impl Iterator<Item = &StrategyReport> {
        self.drivers.values().filter_map(|result| result.as_ref().ok())
    }

    /// Drivers whose analysis failed, with the failure.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &crate::StrategyError)> {
        self.drivers
            .iter()
            .filter_map(|(driver, result)| result.as_ref().err().map(|e| (driver.as_str(), e)))
    }
}

/// Runs per-driver analysis across a session
pub struct SessionRunner {
    config: Arc<AnalysisConfig>,
    cancel: CancellationToken,
    on_finished: Option<DriverFinishedCallback>,
}

impl SessionRunner {
    /// Create a runner after validating `config`.
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config: Arc::new(config), cancel: CancellationToken::new(), on_finished: None })
    }

    /// Use an externally owned cancellation token.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Report each driver as its analysis finishes, failed or not.
    pub fn with_progress(mut self, on_finished: DriverFinishedCallback) -> Self {
        self.on_finished = Some(on_finished);
        self
    }

    /// Token that stops the run before further drivers start.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze every driver of `session`.
    ///
    /// A driver whose laps fail validation gets an `Err` entry; the other
    /// drivers are unaffected. After cancellation no new driver starts and a
    /// driver still running is left out of the result; `cancelled` is set
    /// only if some driver was left out.
    pub async fn run(&self, session: &SessionLaps) -> SessionAnalysis {
        let max_concurrency = self.config.max_concurrency.max(1);
        info!(
            session = ?session.session,
            drivers = session.drivers.len(),
            max_concurrency,
            "Session analysis started"
        );

        let units = session.drivers.iter().cloned().map(|laps| {
            let config = Arc::clone(&self.config);
            let cancel = self.cancel.clone();
            let on_finished = self.on_finished.clone();
            async move { Self::run_unit(laps, config, cancel, on_finished).await }
        });

        let outcomes: Vec<Option<(String, Result<StrategyReport>)>> =
            futures::stream::iter(units).buffer_unordered(max_concurrency).collect().await;

        let cancelled = outcomes.iter().any(Option::is_none);
        let drivers: BTreeMap<String, Result<StrategyReport>> = outcomes.into_iter().flatten().collect();
        let failed = drivers.values().filter(|result| result.is_err()).count();
        info!(analyzed = drivers.len(), failed, cancelled, "Session analysis ended");

        SessionAnalysis { drivers, cancelled }
    }

    /// Analyze one driver, or `None` if cancelled before finishing.
    async fn run_unit(
        laps: DriverLaps,
        config: Arc<AnalysisConfig>,
        cancel: CancellationToken,
        on_finished: Option<DriverFinishedCallback>,
    ) -> Option<(String, Result<StrategyReport>)> {
        let driver = laps.driver.clone();
        if cancel.is_cancelled() {
            debug!(driver = %driver, "Skipping driver after cancellation");
            return None;
        }

        let handle = tokio::task::spawn_blocking(move || analyze_driver(&laps, &config));
        let result = tokio::select! {
            _ = cancel.cancelled() => {
                debug!(driver = %driver, "Driver analysis cancelled while running");
                return None;
            }
            joined = handle => match joined {
                Ok(report) => report,
                Err(e) => Err(e.into()),
            },
        };

        match &result {
            Ok(report) => debug!(
                driver = %driver,
                stints = report.stints.len(),
                insights = report.insights.len(),
                "Driver analysis finished"
            ),
            Err(e) => warn!(driver = %driver, error = %e, "Driver analysis failed"),
        }
        if let Some(on_finished) = &on_finished {
            on_finished(&driver);
        }
        Some((driver, result))
    }
}
