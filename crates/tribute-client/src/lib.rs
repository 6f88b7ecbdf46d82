//! # tribute-client
//!
//! Client logic of the memorial pages: anonymous device identity, the local
//! like ledger, like/comment reconciliation against the backend, the public
//! memorial read paths and visitor submissions.

pub mod client;
pub mod comments;
pub mod config;
pub mod error;
pub mod flight;
pub mod identity;
pub mod ledger;
pub mod memorial;
pub mod reconciler;
pub mod rest;

#[cfg(test)]
mod testing;

use tracing_subscriber::{fmt, EnvFilter};

pub use client::Tribute;
pub use config::ClientConfig;
pub use error::{ClientError, EngagementError, ValidationError};
pub use reconciler::{Engagement, EngagementReconciler, StoryCounts, ToggleOutcome};

/// Install the global `tracing` subscriber. `RUST_LOG` overrides the
/// default filter.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("tribute_client=debug,tribute_store=info,tribute_cli=info,warn")
    });

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .init();
}
