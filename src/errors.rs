use std::result::Result as StdResult;
use std::time::Duration;

use thiserror::Error;

use crate::domain::{FieldId, Section};

/// Precondition violations raised by the wizard. These never come from a
/// well-behaved UI; callers should treat them as bugs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WizardError {
    #[error("Section {0} is out of range (expected 1..={max})", max = Section::COUNT)]
    SectionOutOfRange(u8),
    #[error("Unknown field `{name}`{}", suggestion_suffix(.suggestion))]
    UnknownField {
        name: String,
        suggestion: Option<&'static str>,
    },
    #[error("`{value}` is not a valid option for {field}")]
    UnknownOption { field: FieldId, value: String },
    #[error("Field {field} does not accept this kind of value")]
    FieldTypeMismatch { field: FieldId },
    #[error("Cannot jump forward from section {from} to section {to}")]
    ForwardJump { from: Section, to: Section },
    #[error("A submission is already in flight")]
    SubmissionInFlight,
}

fn suggestion_suffix(suggestion: &Option<&'static str>) -> String {
    match suggestion {
        Some(candidate) => format!(" (did you mean `{candidate}`?)"),
        None => String::new(),
    }
}

/// Failures reported by a [`crate::notify::Notifier`]. The wizard treats
/// every variant the same way.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("Notifier credentials are not configured")]
    NotConfigured,
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Delivery rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("Delivery timed out after {0:?}")]
    Timeout(Duration),
}

/// Configuration persistence failures.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// User-facing CLI error wrapper.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Wizard(#[from] WizardError),
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Prompt failed: {0}")]
    Prompt(String),
    #[error("Invalid input: {0}")]
    Input(String),
}

impl From<dialoguer::Error> for CliError {
    fn from(err: dialoguer::Error) -> Self {
        CliError::Prompt(err.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Input(err.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::Input(err.to_string())
    }
}

pub type WizardResult<T> = StdResult<T, WizardError>;
pub type CliResult<T> = StdResult<T, CliError>;
