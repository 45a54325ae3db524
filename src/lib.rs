#![doc(test(attr(deny(warnings))))]

//! Prequal Core implements the lead prequalification wizard: a five-section
//! form with per-section validation whose finished answers are delivered
//! through a pluggable notifier (EmailJS by default).

pub mod cli;
pub mod config;
pub mod domain;
pub mod errors;
pub mod notify;
pub mod utils;
pub mod wizard;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup debug log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::debug!("Prequal Core tracing initialized.");
    });
}
