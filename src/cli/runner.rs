//! Drives a [`FormWizard`] through a [`WizardPrompter`].

use std::time::Duration;

use tracing::info;

use crate::cli::output;
use crate::domain::{Draft, FieldId, FieldUpdate, MultiChoice, Section, SectionSpec};
use crate::errors::{CliResult, DeliveryError};
use crate::notify::Notifier;
use crate::wizard::{FormWizard, SectionState, SubmissionReceipt, SubmitOutcome};

pub const SUCCESS_MESSAGE: &str =
    "¡Gracias por tu información! Nos pondremos en contacto pronto.";
pub const FAILURE_MESSAGE: &str =
    "Hubo un error al enviar tu solicitud. Por favor, inténtalo de nuevo.";
pub const INCOMPLETE_MESSAGE: &str =
    "Por favor, completa todos los campos requeridos antes de enviar.";

/// Answer to a single field prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldEdit {
    Update(FieldUpdate),
    /// Multi-select changes as `(option, included)` pairs.
    Toggle(Vec<(MultiChoice, bool)>),
    Keep,
}

/// Navigation picked after a section's fields were answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavAction {
    Next,
    Back,
    JumpTo(Section),
    /// Re-prompt the fields of the active section.
    Stay,
    Submit,
    Cancel,
}

/// How an interactive session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Delivered(SubmissionReceipt),
    /// Delivery failed and the user declined to retry.
    Abandoned(DeliveryError),
    Cancelled,
}

/// Interaction surface used by [`WizardRunner`]. The terminal implementation
/// lives in [`crate::cli::io`]; tests script their own.
pub trait WizardPrompter {
    fn show_section(
        &mut self,
        section: Section,
        spec: &SectionSpec,
        states: &[(Section, SectionState)],
    );

    fn edit_field(
        &mut self,
        field: FieldId,
        draft: &Draft,
        error: Option<&str>,
    ) -> CliResult<FieldEdit>;

    fn choose_action(&mut self, current: Section, visited: &[Section]) -> CliResult<NavAction>;

    fn confirm_retry(&mut self, error: &DeliveryError) -> CliResult<bool>;
}

pub struct WizardRunner<'a> {
    wizard: FormWizard,
    notifier: &'a dyn Notifier,
    timeout: Duration,
}

impl<'a> WizardRunner<'a> {
    pub fn new(wizard: FormWizard, notifier: &'a dyn Notifier, timeout: Duration) -> Self {
        Self {
            wizard,
            notifier,
            timeout,
        }
    }

    pub fn wizard(&self) -> &FormWizard {
        &self.wizard
    }

    pub async fn run<P: WizardPrompter>(&mut self, prompter: &mut P) -> CliResult<RunOutcome> {
        let mut edit_fields = true;

        loop {
            let current = self.wizard.current();
            if edit_fields {
                self.edit_section(prompter, current)?;
            }
            edit_fields = true;

            let visited: Vec<Section> =
                Section::all().filter(|section| *section < current).collect();
            match prompter.choose_action(current, &visited)? {
                NavAction::Next => {
                    if !self.wizard.advance()? {
                        self.report_errors();
                    }
                }
                NavAction::Back => {
                    self.wizard.retreat()?;
                }
                NavAction::JumpTo(section) => {
                    self.wizard.jump_to(section)?;
                }
                NavAction::Stay => {}
                NavAction::Submit => {
                    if let Some(outcome) = self.submit(prompter).await? {
                        return Ok(outcome);
                    }
                    // Blocked on the last section: back to the action menu.
                    edit_fields = self.wizard.current() != current;
                }
                NavAction::Cancel => {
                    info!("Wizard cancelled by user");
                    output::info("Formulario cancelado.");
                    return Ok(RunOutcome::Cancelled);
                }
            }
        }
    }

    fn edit_section<P: WizardPrompter>(
        &mut self,
        prompter: &mut P,
        section: Section,
    ) -> CliResult<()> {
        let spec = self.wizard.schema().section(section).clone();
        prompter.show_section(section, &spec, &self.wizard.section_states());

        for field in &spec.fields {
            let error = self.wizard.errors().get(*field);
            match prompter.edit_field(*field, self.wizard.draft(), error)? {
                FieldEdit::Update(update) => {
                    self.wizard.set_field(update)?;
                }
                FieldEdit::Toggle(changes) => {
                    for (choice, included) in changes {
                        self.wizard.toggle_multi_value(choice, included)?;
                    }
                }
                FieldEdit::Keep => {}
            }
        }
        Ok(())
    }

    /// Returns `Some` when the session is over.
    async fn submit<P: WizardPrompter>(
        &mut self,
        prompter: &mut P,
    ) -> CliResult<Option<RunOutcome>> {
        loop {
            match self.wizard.submit(self.notifier, self.timeout).await {
                SubmitOutcome::Delivered(receipt) => {
                    output::success(SUCCESS_MESSAGE);
                    return Ok(Some(RunOutcome::Delivered(receipt)));
                }
                SubmitOutcome::Failed(err) => {
                    output::error(FAILURE_MESSAGE);
                    if !prompter.confirm_retry(&err)? {
                        return Ok(Some(RunOutcome::Abandoned(err)));
                    }
                }
                SubmitOutcome::Incomplete { .. } => {
                    output::warning(INCOMPLETE_MESSAGE);
                    self.report_errors();
                    return Ok(None);
                }
                SubmitOutcome::Ignored => return Ok(None),
            }
        }
    }

    fn report_errors(&self) {
        for (field, message) in self.wizard.errors().iter() {
            output::warning(format!("{}: {}", field.label(), message));
        }
    }
}
