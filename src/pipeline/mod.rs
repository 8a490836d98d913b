//! Pipeline module for fetching summaries and forwarding them
//!
//! This module contains the core run logic, including:
//! - Summary fetching with bounded retries
//! - The concurrency gate every topic passes through
//! - Overall run coordination and outcome reporting

mod coordinator;
mod fetcher;

pub use coordinator::{run_bounded, run_pipeline, Coordinator, RunSummary};
pub use fetcher::{
    build_http_client, summary_url, FetchOutcome, SummaryFetcher, SummaryResult, ATTEMPT_TIMEOUT,
    CLIENT_TIMEOUT,
};
