pub mod commands;
pub mod io;
pub mod output;
pub mod runner;

pub use commands::{execute, Command, Invocation, USAGE};
pub use runner::{FieldEdit, NavAction, RunOutcome, WizardPrompter, WizardRunner};
