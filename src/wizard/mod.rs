//! Multi-step prequalification wizard.
//!
//! [`FormWizard`] owns the answers collected so far, the active section, the
//! inline validation messages and the delivery status. Every mutation goes
//! through its methods; delivery is delegated to a [`Notifier`].

mod validation;

use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::{Draft, FieldId, FieldUpdate, FormSchema, MultiChoice, Section};
use crate::errors::{DeliveryError, WizardError, WizardResult};
use crate::notify::{Notifier, TemplateParams};

pub use validation::ValidationErrors;

/// Lifecycle of the delivery of one draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionStatus {
    #[default]
    Idle,
    InFlight,
    Succeeded,
    Failed,
}

/// Position of a section relative to the active one, as shown by the step
/// indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionState {
    /// Already passed; can be jumped back to.
    Visited,
    Current,
    Upcoming,
}

/// Proof of a delivered submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub id: Uuid,
    pub submitted_at: DateTime<Utc>,
    pub attempts: u32,
}

/// Payload of a submission that passed validation and is now in flight.
#[derive(Debug, Clone)]
pub struct PendingSubmission {
    pub id: Uuid,
    pub params: TemplateParams,
}

/// Result of a submit attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Delivered(SubmissionReceipt),
    /// Delivery failed; the draft is kept for a retry.
    Failed(DeliveryError),
    /// Validation blocked the attempt. `section` is where the wizard now sits.
    Incomplete { section: Section },
    /// A submission was already in flight.
    Ignored,
}

pub struct FormWizard {
    schema: FormSchema,
    draft: Draft,
    current: Section,
    errors: ValidationErrors,
    status: SubmissionStatus,
    pending: Option<Uuid>,
    attempts: u32,
}

impl Default for FormWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl FormWizard {
    pub fn new() -> Self {
        Self::with_schema(FormSchema::default())
    }

    pub fn with_schema(schema: FormSchema) -> Self {
        Self {
            schema,
            draft: Draft::default(),
            current: Section::FIRST,
            errors: ValidationErrors::default(),
            status: SubmissionStatus::Idle,
            pending: None,
            attempts: 0,
        }
    }

    /// Starts from previously collected answers, e.g. loaded from a file.
    pub fn with_draft(mut self, draft: Draft) -> Self {
        self.draft = draft;
        self
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn current(&self) -> Section {
        self.current
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn status(&self) -> SubmissionStatus {
        self.status
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    /// Overwrites one field. When the field is required in the active
    /// section, its inline message is refreshed.
    pub fn set_field(&mut self, update: FieldUpdate) -> WizardResult<&Draft> {
        self.ensure_idle()?;
        let field = update.field();
        self.draft.apply(update);
        debug!(field = %field, section = %self.current, "Field updated");
        self.revalidate_field(field);
        Ok(&self.draft)
    }

    /// Parses `raw` for `field` and applies it.
    pub fn set_field_raw(&mut self, field: FieldId, raw: &str) -> WizardResult<&Draft> {
        let update = FieldUpdate::parse(field, raw)?;
        self.set_field(update)
    }

    /// Adds (`included`) or removes one option of a multi-select field.
    /// Returns whether the set changed.
    pub fn toggle_multi_value(
        &mut self,
        choice: MultiChoice,
        included: bool,
    ) -> WizardResult<bool> {
        self.ensure_idle()?;
        let changed = self.draft.toggle(choice, included);
        if changed {
            debug!(field = %choice.field(), option = choice.label(), included, "Option toggled");
            self.revalidate_field(choice.field());
        }
        Ok(changed)
    }

    pub fn toggle_multi_value_raw(
        &mut self,
        field: FieldId,
        option: &str,
        included: bool,
    ) -> WizardResult<bool> {
        let choice = MultiChoice::parse(field, option)?;
        self.toggle_multi_value(choice, included)
    }

    /// Checks every required field of `section` and replaces the inline
    /// messages with exactly the failures found.
    pub fn validate_section(&mut self, section: Section) -> bool {
        self.errors = ValidationErrors::collect(&self.schema, section, &self.draft);
        if !self.errors.is_empty() {
            warn!(
                section = %section,
                missing = self.errors.len(),
                "Section has unanswered required fields"
            );
        }
        self.errors.is_empty()
    }

    /// Moves to the next section when the active one validates. Returns
    /// whether validation passed.
    pub fn advance(&mut self) -> WizardResult<bool> {
        self.ensure_idle()?;
        if !self.validate_section(self.current) {
            return Ok(false);
        }
        let next = self.current.next();
        if next != self.current {
            info!(from = %self.current, to = %next, "Advancing to next section");
        }
        self.current = next;
        Ok(true)
    }

    /// Moves back one section without validating.
    pub fn retreat(&mut self) -> WizardResult<Section> {
        self.ensure_idle()?;
        self.current = self.current.prev();
        Ok(self.current)
    }

    /// Returns to an already visited section.
    pub fn jump_to(&mut self, section: Section) -> WizardResult<Section> {
        self.ensure_idle()?;
        if section >= self.current {
            return Err(WizardError::ForwardJump {
                from: self.current,
                to: section,
            });
        }
        info!(from = %self.current, to = %section, "Jumping back to section");
        self.current = section;
        Ok(section)
    }

    pub fn section_states(&self) -> Vec<(Section, SectionState)> {
        Section::all()
            .map(|section| {
                let state = match section.cmp(&self.current) {
                    std::cmp::Ordering::Less => SectionState::Visited,
                    std::cmp::Ordering::Equal => SectionState::Current,
                    std::cmp::Ordering::Greater => SectionState::Upcoming,
                };
                (section, state)
            })
            .collect()
    }

    /// Validates the final section, then every earlier one. When an earlier
    /// section fails the wizard moves there and shows its messages.
    pub fn validate_all(&mut self) -> bool {
        if !self.validate_section(Section::LAST) {
            return false;
        }

        let failing = Section::all()
            .filter(|section| !section.is_last())
            .find(|section| {
                !ValidationErrors::collect(&self.schema, *section, &self.draft).is_empty()
            });
        match failing {
            Some(section) => {
                self.current = section;
                self.validate_section(section)
            }
            None => true,
        }
    }

    /// Validates and flattens the draft, moving the status to in-flight.
    pub fn begin_submit(&mut self) -> Result<PendingSubmission, SubmitOutcome> {
        if self.status == SubmissionStatus::InFlight {
            warn!("Ignoring submit while a delivery is in flight");
            return Err(SubmitOutcome::Ignored);
        }

        if !self.validate_all() {
            return Err(SubmitOutcome::Incomplete {
                section: self.current,
            });
        }

        let id = Uuid::new_v4();
        self.status = SubmissionStatus::InFlight;
        self.pending = Some(id);
        self.attempts += 1;
        info!(submission = %id, attempt = self.attempts, "Submitting prequalification");
        Ok(PendingSubmission {
            id,
            params: TemplateParams::from(&self.draft),
        })
    }

    /// Records the notifier's answer for the in-flight submission.
    pub fn finish_submit(&mut self, result: Result<(), DeliveryError>) -> SubmitOutcome {
        let Some(id) = self.pending.take() else {
            return SubmitOutcome::Ignored;
        };

        match result {
            Ok(()) => {
                let receipt = SubmissionReceipt {
                    id,
                    submitted_at: Utc::now(),
                    attempts: self.attempts,
                };
                info!(submission = %id, attempts = self.attempts, "Submission delivered");
                self.draft = Draft::default();
                self.current = Section::FIRST;
                self.errors.clear();
                self.status = SubmissionStatus::Succeeded;
                self.attempts = 0;
                SubmitOutcome::Delivered(receipt)
            }
            Err(err) => {
                warn!(submission = %id, error = %err, "Submission failed; draft kept for retry");
                self.status = SubmissionStatus::Failed;
                SubmitOutcome::Failed(err)
            }
        }
    }

    /// Runs a full submit: validation, delivery bounded by `timeout`, and the
    /// resulting state transition.
    pub async fn submit(&mut self, notifier: &dyn Notifier, timeout: Duration) -> SubmitOutcome {
        let pending = match self.begin_submit() {
            Ok(pending) => pending,
            Err(outcome) => return outcome,
        };

        let result = match tokio::time::timeout(timeout, notifier.send(&pending.params)).await {
            Ok(result) => result,
            Err(_) => Err(DeliveryError::Timeout(timeout)),
        };
        self.finish_submit(result)
    }

    /// Discards every answer and starts over.
    pub fn reset(&mut self) -> WizardResult<()> {
        self.ensure_idle()?;
        self.draft = Draft::default();
        self.current = Section::FIRST;
        self.errors.clear();
        self.status = SubmissionStatus::Idle;
        self.attempts = 0;
        Ok(())
    }

    fn ensure_idle(&self) -> WizardResult<()> {
        if self.status == SubmissionStatus::InFlight {
            Err(WizardError::SubmissionInFlight)
        } else {
            Ok(())
        }
    }

    fn revalidate_field(&mut self, field: FieldId) {
        if let Some(rule) = self.schema.rule(self.current, field) {
            if self.draft.is_blank(field) {
                self.errors.insert(field, rule.message);
            } else {
                self.errors.remove(field);
            }
        }
    }
}
