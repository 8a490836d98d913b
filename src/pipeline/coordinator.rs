//! Pipeline coordinator - fetch-then-notify orchestration
//!
//! This module drives a whole run:
//! - Building the shared HTTP client, fetcher and notifier
//! - Admitting topics through a fixed-width concurrency gate
//! - Forwarding every fetched summary to the notifier
//! - Tallying terminal outcomes for the final report

use crate::config::{Config, TelegramCredentials};
use crate::notify::{NotificationMessage, TelegramNotifier};
use crate::pipeline::fetcher::{build_http_client, FetchOutcome, SummaryFetcher};
use crate::topics::{load_topics, Topic};
use crate::RelayError;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Count of terminal outcomes in a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub found: usize,
    pub not_found: usize,
    pub exhausted: usize,
}

impl RunSummary {
    pub fn record(&mut self, outcome: &FetchOutcome) {
        match outcome {
            FetchOutcome::Success(_) => self.found += 1,
            FetchOutcome::NotFound => self.not_found += 1,
            FetchOutcome::ExhaustedRetries => self.exhausted += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.found + self.not_found + self.exhausted
    }
}

impl<'a> FromIterator<&'a FetchOutcome> for RunSummary {
    fn from_iter<I: IntoIterator<Item = &'a FetchOutcome>>(iter: I) -> Self {
        let mut summary = RunSummary::default();
        for outcome in iter {
            summary.record(outcome);
        }
        summary
    }
}

/// Runs `work` once per item with at most `limit` runs in flight
///
/// A gate slot is acquired *before* each task is spawned and released when
/// that task finishes, so the loop itself blocks once the gate is full. Items
/// are admitted in order; results come back in completion order. A task that
/// panics is logged and contributes no result.
pub async fn run_bounded<T, F, Fut, R>(items: Vec<T>, limit: usize, work: F) -> Vec<R>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = R> + Send + 'static,
    R: Send + 'static,
{
    let gate = Arc::new(Semaphore::new(limit.max(1)));
    let mut tasks = JoinSet::new();
    let mut results = Vec::with_capacity(items.len());

    for item in items {
        // The gate is never closed, so acquisition only fails if that changes
        let Ok(permit) = Arc::clone(&gate).acquire_owned().await else {
            tracing::error!("Concurrency gate closed, admitting no further work");
            break;
        };

        let unit = work(item);
        tasks.spawn(async move {
            let result = unit.await;
            drop(permit);
            result
        });

        // Collect whatever has already finished so results don't pile up
        while let Some(joined) = tasks.try_join_next() {
            collect(joined, &mut results);
        }
    }

    while let Some(joined) = tasks.join_next().await {
        collect(joined, &mut results);
    }

    results
}

fn collect<R>(joined: Result<R, tokio::task::JoinError>, results: &mut Vec<R>) {
    match joined {
        Ok(result) => results.push(result),
        Err(e) => tracing::error!("Worker task failed: {}", e),
    }
}

/// Main pipeline coordinator structure
pub struct Coordinator {
    fetcher: Arc<SummaryFetcher>,
    notifier: Arc<TelegramNotifier>,
    concurrency: usize,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The run configuration
    /// * `credentials` - Telegram secrets, required when `telegram_enabled` is set
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(RelayError)` - Failed to build the client, fetcher or notifier
    pub fn new(
        config: &Config,
        credentials: Option<TelegramCredentials>,
    ) -> Result<Self, RelayError> {
        let client = build_http_client()?;
        let fetcher = SummaryFetcher::new(client.clone(), config)?;
        let notifier = TelegramNotifier::new(client, config, credentials)?;
        Ok(Self::from_parts(fetcher, notifier, config.concurrency))
    }

    /// Assembles a coordinator from already-built parts
    pub fn from_parts(
        fetcher: SummaryFetcher,
        notifier: TelegramNotifier,
        concurrency: usize,
    ) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            notifier: Arc::new(notifier),
            concurrency,
        }
    }

    /// Fetches every topic and notifies each success
    ///
    /// Completes once every topic has reached a terminal outcome, however
    /// many of them were not found or ran out of attempts.
    pub async fn run(&self, topics: Vec<Topic>) -> RunSummary {
        let start_time = std::time::Instant::now();
        tracing::info!(
            "Starting run: {} topics, concurrency {}, notifications {}",
            topics.len(),
            self.concurrency,
            if self.notifier.is_enabled() {
                "on"
            } else {
                "off"
            }
        );

        let outcomes = run_bounded(topics, self.concurrency, |topic| {
            let fetcher = Arc::clone(&self.fetcher);
            let notifier = Arc::clone(&self.notifier);
            async move {
                let outcome = fetcher.fetch(&topic).await;
                if let FetchOutcome::Success(summary) = &outcome {
                    notifier
                        .notify(&NotificationMessage::from_summary(summary))
                        .await;
                }
                outcome
            }
        })
        .await;

        let summary: RunSummary = outcomes.iter().collect();
        tracing::info!(
            "Run completed in {:?}: {} found, {} not found, {} failed",
            start_time.elapsed(),
            summary.found,
            summary.not_found,
            summary.exhausted
        );
        summary
    }
}

/// Runs the whole pipeline from a configuration
///
/// This function:
///
/// 1. Reads the full topic list from `config.topics_file`
/// 2. Builds the shared HTTP client, fetcher and notifier
/// 3. Fetches all topics behind the concurrency gate
/// 4. Notifies each fetched summary
///
/// # Returns
///
/// * `Ok(RunSummary)` - Every topic reached a terminal outcome
/// * `Err(RelayError)` - The topic list or a pipeline component could not be set up
///
/// # Example
///
/// ```no_run
/// use wiki_relay::config::{credentials_for, load_config};
/// use wiki_relay::pipeline::run_pipeline;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let credentials = credentials_for(&config)?;
/// run_pipeline(&config, credentials).await?;
/// # Ok(())
/// # }
/// ```
pub async fn run_pipeline(
    config: &Config,
    credentials: Option<TelegramCredentials>,
) -> Result<RunSummary, RelayError> {
    let topics = load_topics(&config.topics_file)?;
    tracing::info!(
        "Loaded {} topics from {}",
        topics.len(),
        config.topics_file.display()
    );

    let coordinator = Coordinator::new(config, credentials)?;
    Ok(coordinator.run(topics).await)
}
