#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Terminal plumbing shared by the borehole map binaries.
//!
//! [`init_logger`] routes `log` records through `indicatif-log-bridge`, and
//! [`RowSpinner`] shows dataset loading as a spinner on the same
//! [`MultiProgress`], so log lines never tear the spinner.

use std::sync::Arc;
use std::time::Duration;

use borehole_map_dataset::progress::LoadProgress;
use indicatif::{ProgressBar, ProgressStyle};

pub use indicatif::MultiProgress;

const SPINNER_TEMPLATE: &str = "{spinner:.cyan} {msg} [{pos} rows, {elapsed}]";

/// Spinner counting CSV records as they are read.
pub struct RowSpinner {
    spinner: ProgressBar,
}

impl RowSpinner {
    /// Attaches a new spinner to `multi`.
    #[must_use]
    pub fn attach(multi: &MultiProgress) -> Arc<dyn LoadProgress> {
        let spinner = multi.add(ProgressBar::new_spinner());
        if let Ok(style) = ProgressStyle::with_template(SPINNER_TEMPLATE) {
            spinner.set_style(style);
        }
        spinner.enable_steady_tick(Duration::from_millis(120));

        Arc::new(Self { spinner })
    }
}

impl LoadProgress for RowSpinner {
    fn started(&self, dataset: &str) {
        self.spinner.set_message(format!("Reading {dataset}"));
    }

    fn record_read(&self) {
        self.spinner.inc(1);
    }

    fn finished(&self, kept: usize, skipped: usize) {
        self.spinner
            .finish_with_message(format!("{kept} samples loaded, {skipped} rows skipped"));
    }
}

/// Installs `pretty_env_logger` (driven by `RUST_LOG`) behind the
/// indicatif bridge.
///
/// Every progress bar the binary creates must be added to the returned
/// [`MultiProgress`].
#[must_use]
pub fn init_logger() -> MultiProgress {
    let multi = MultiProgress::new();

    let logger = pretty_env_logger::formatted_builder()
        .parse_env("RUST_LOG")
        .build();
    let max_level = logger.filter();

    if indicatif_log_bridge::LogWrapper::new(multi.clone(), logger)
        .try_init()
        .is_ok()
    {
        log::set_max_level(max_level);
    }

    multi
}
