use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use prequal_core::domain::{
    DigitalPresence, Draft, FieldId, FieldUpdate, FormSchema, Goal, MultiChoice, RequiredField,
    Section, Urgency,
};
use prequal_core::errors::{DeliveryError, WizardError};
use prequal_core::notify::{Notifier, TemplateParams};
use prequal_core::wizard::{FormWizard, SubmissionStatus, SubmitOutcome};

const TIMEOUT: Duration = Duration::from_secs(2);

struct QueueNotifier {
    results: Mutex<VecDeque<Result<(), DeliveryError>>>,
    sent: Mutex<Vec<TemplateParams>>,
}

impl QueueNotifier {
    fn new(results: Vec<Result<(), DeliveryError>>) -> Self {
        Self {
            results: Mutex::new(results.into()),
            sent: Mutex::new(Vec::new()),
        }
    }

    fn sent(&self) -> Vec<TemplateParams> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for QueueNotifier {
    async fn send(&self, params: &TemplateParams) -> Result<(), DeliveryError> {
        self.sent.lock().unwrap().push(params.clone());
        self.results.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }
}

fn section(index: u8) -> Section {
    Section::new(index).unwrap()
}

fn fill_required(wizard: &mut FormWizard) {
    wizard
        .set_field(FieldUpdate::FullName("Ana Ruiz".into()))
        .unwrap();
    wizard
        .set_field(FieldUpdate::Phone("+52 228 000 0000".into()))
        .unwrap();
    wizard
        .set_field(FieldUpdate::Email("ana@example.com".into()))
        .unwrap();
    wizard
        .set_field(FieldUpdate::Location("Xalapa, Veracruz".into()))
        .unwrap();
    wizard
        .set_field(FieldUpdate::BusinessType("Panadería".into()))
        .unwrap();
}

fn walk_to_last(wizard: &mut FormWizard) {
    for _ in 1..Section::COUNT {
        assert!(wizard.advance().unwrap());
    }
    assert_eq!(wizard.current(), Section::LAST);
}

#[test]
fn last_write_wins_for_every_kind_of_field() {
    let mut wizard = FormWizard::new();
    wizard.set_field(FieldUpdate::FullName("Ana".into())).unwrap();
    wizard
        .set_field(FieldUpdate::FullName("Ana Ruiz".into()))
        .unwrap();
    wizard.set_field(FieldUpdate::Urgency(Urgency::High)).unwrap();
    wizard.set_field_raw(FieldId::Urgency, "2").unwrap();

    assert_eq!(wizard.draft().full_name, "Ana Ruiz");
    assert_eq!(wizard.draft().urgency, Urgency::Medium);
}

#[test]
fn toggles_are_idempotent() {
    let mut wizard = FormWizard::new();
    let social = MultiChoice::DigitalPresence(DigitalPresence::SocialMedia);

    assert!(wizard.toggle_multi_value(social, true).unwrap());
    assert!(!wizard.toggle_multi_value(social, true).unwrap());
    assert_eq!(
        wizard.draft().digital_presence,
        vec![DigitalPresence::SocialMedia]
    );

    assert!(wizard.toggle_multi_value(social, false).unwrap());
    assert!(!wizard.toggle_multi_value(social, false).unwrap());
    assert!(wizard.draft().digital_presence.is_empty());
}

#[test]
fn blocked_advance_reports_exactly_the_missing_fields() {
    let mut wizard = FormWizard::new();
    wizard.set_field(FieldUpdate::FullName("Ana".into())).unwrap();
    wizard.set_field(FieldUpdate::Phone("   ".into())).unwrap();

    assert!(!wizard.advance().unwrap());
    assert_eq!(wizard.current(), Section::FIRST);
    assert_eq!(
        wizard.errors().fields(),
        vec![FieldId::Phone, FieldId::Email, FieldId::Location]
    );
    assert_eq!(wizard.errors().get(FieldId::Phone), Some("Teléfono requerido"));
    assert_eq!(wizard.errors().get(FieldId::Location), Some("Ubicación requerida"));
    assert_eq!(wizard.errors().get(FieldId::FullName), None);
}

#[test]
fn editing_a_required_field_clears_its_message() {
    let mut wizard = FormWizard::new();
    assert!(!wizard.advance().unwrap());
    assert_eq!(wizard.errors().len(), 4);

    wizard
        .set_field(FieldUpdate::Email("ana@example.com".into()))
        .unwrap();
    assert_eq!(wizard.errors().len(), 3);
    assert_eq!(wizard.errors().get(FieldId::Email), None);
}

#[test]
fn advancing_through_every_section_clamps_at_the_last() {
    let mut wizard = FormWizard::new();
    fill_required(&mut wizard);
    walk_to_last(&mut wizard);

    assert!(wizard.advance().unwrap());
    assert_eq!(wizard.current(), Section::LAST);
}

#[test]
fn retreat_at_first_section_stays_put() {
    let mut wizard = FormWizard::new();
    assert_eq!(wizard.retreat().unwrap(), Section::FIRST);

    fill_required(&mut wizard);
    wizard.advance().unwrap();
    wizard.advance().unwrap();
    assert_eq!(wizard.retreat().unwrap(), section(2));
}

#[test]
fn jumps_only_go_backwards() {
    let mut wizard = FormWizard::new();
    fill_required(&mut wizard);
    wizard.advance().unwrap();
    wizard.advance().unwrap();

    assert_eq!(
        wizard.jump_to(section(4)),
        Err(WizardError::ForwardJump {
            from: section(3),
            to: section(4)
        })
    );
    assert_eq!(wizard.jump_to(section(1)).unwrap(), Section::FIRST);
}

#[tokio::test]
async fn incomplete_final_section_blocks_submit() {
    let schema = FormSchema::prequalification().clone().with_required(
        Section::LAST,
        vec![RequiredField::new(
            FieldId::ValuePerception,
            "Cuéntanos qué valor esperas",
        )],
    );
    let mut wizard = FormWizard::with_schema(schema);
    fill_required(&mut wizard);
    walk_to_last(&mut wizard);
    let notifier = QueueNotifier::new(vec![]);

    let outcome = wizard.submit(&notifier, TIMEOUT).await;
    assert_eq!(
        outcome,
        SubmitOutcome::Incomplete {
            section: Section::LAST
        }
    );
    assert_eq!(wizard.status(), SubmissionStatus::Idle);
    assert_eq!(
        wizard.errors().get(FieldId::ValuePerception),
        Some("Cuéntanos qué valor esperas")
    );
    assert!(notifier.sent().is_empty());
}

#[tokio::test]
async fn earlier_gaps_send_the_wizard_back() {
    let mut draft = Draft::default();
    draft.apply(FieldUpdate::FullName("Ana Ruiz".into()));
    draft.apply(FieldUpdate::Phone("+52 228 000 0000".into()));
    draft.apply(FieldUpdate::Location("Xalapa, Veracruz".into()));
    draft.apply(FieldUpdate::BusinessType("Panadería".into()));

    let mut wizard = FormWizard::new().with_draft(draft);
    let notifier = QueueNotifier::new(vec![]);
    let outcome = wizard.submit(&notifier, TIMEOUT).await;

    assert_eq!(
        outcome,
        SubmitOutcome::Incomplete {
            section: Section::FIRST
        }
    );
    assert_eq!(wizard.errors().fields(), vec![FieldId::Email]);
    assert_eq!(wizard.status(), SubmissionStatus::Idle);
    assert!(notifier.sent().is_empty());
}

#[tokio::test]
async fn successful_submit_resets_the_form() {
    let mut wizard = FormWizard::new();
    fill_required(&mut wizard);
    wizard
        .toggle_multi_value(MultiChoice::Goal(Goal::MoreLeads), true)
        .unwrap();
    walk_to_last(&mut wizard);
    let notifier = QueueNotifier::new(vec![Ok(())]);

    let outcome = wizard.submit(&notifier, TIMEOUT).await;
    let SubmitOutcome::Delivered(receipt) = outcome else {
        panic!("expected a delivered submission");
    };
    assert_eq!(receipt.attempts, 1);
    assert_eq!(wizard.status(), SubmissionStatus::Succeeded);
    assert_eq!(wizard.current(), Section::FIRST);
    assert_eq!(wizard.draft(), &Draft::default());
    assert!(wizard.errors().is_empty());

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].get("fullName"), Some("Ana Ruiz"));
    assert_eq!(sent[0].get("goals"), Some("Generar más prospectos o ventas"));
}

#[tokio::test]
async fn failed_submit_keeps_the_draft_for_a_retry() {
    let mut wizard = FormWizard::new();
    fill_required(&mut wizard);
    walk_to_last(&mut wizard);
    let notifier = QueueNotifier::new(vec![
        Err(DeliveryError::Transport("connection reset".into())),
        Ok(()),
    ]);

    let outcome = wizard.submit(&notifier, TIMEOUT).await;
    assert_eq!(
        outcome,
        SubmitOutcome::Failed(DeliveryError::Transport("connection reset".into()))
    );
    assert_eq!(wizard.status(), SubmissionStatus::Failed);
    assert_eq!(wizard.current(), Section::LAST);
    assert_eq!(wizard.draft().full_name, "Ana Ruiz");

    let outcome = wizard.submit(&notifier, TIMEOUT).await;
    let SubmitOutcome::Delivered(receipt) = outcome else {
        panic!("expected a delivered submission");
    };
    assert_eq!(receipt.attempts, 2);
    assert_eq!(notifier.sent().len(), 2);
    assert_eq!(notifier.sent()[0], notifier.sent()[1]);
}

#[test]
fn in_flight_submission_freezes_the_draft() {
    let mut wizard = FormWizard::new();
    fill_required(&mut wizard);
    walk_to_last(&mut wizard);

    let pending = wizard.begin_submit().unwrap();
    assert_eq!(wizard.status(), SubmissionStatus::InFlight);
    assert_eq!(pending.params.get("businessType"), Some("Panadería"));

    assert_eq!(
        wizard.set_field(FieldUpdate::FullName("Otra".into())),
        Err(WizardError::SubmissionInFlight)
    );
    assert_eq!(wizard.retreat(), Err(WizardError::SubmissionInFlight));
    assert!(matches!(wizard.begin_submit(), Err(SubmitOutcome::Ignored)));

    let refused = DeliveryError::Transport("connection refused".into());
    let outcome = wizard.finish_submit(Err(refused));
    assert!(matches!(outcome, SubmitOutcome::Failed(_)));
    assert_eq!(wizard.finish_submit(Ok(())), SubmitOutcome::Ignored);
    assert_eq!(wizard.draft().full_name, "Ana Ruiz");
}

#[test]
fn toggling_options_in_and_out_keeps_only_the_remaining_one() {
    let mut wizard = FormWizard::new();
    wizard
        .toggle_multi_value_raw(FieldId::DigitalPresence, "Sitio web", true)
        .unwrap();
    wizard
        .toggle_multi_value_raw(FieldId::DigitalPresence, "Redes sociales", true)
        .unwrap();
    wizard
        .toggle_multi_value_raw(FieldId::DigitalPresence, "Sitio web", false)
        .unwrap();

    assert_eq!(
        wizard.draft().digital_presence,
        vec![DigitalPresence::SocialMedia]
    );
    let params = TemplateParams::from(wizard.draft());
    assert_eq!(params.get("digitalPresence"), Some("Redes sociales"));
}

#[tokio::test]
async fn multi_select_reaches_the_payload_as_labels() {
    let mut wizard = FormWizard::new();
    fill_required(&mut wizard);
    wizard.advance().unwrap();
    wizard
        .toggle_multi_value_raw(FieldId::DigitalPresence, "redes sociales", true)
        .unwrap();
    assert_eq!(
        wizard.draft().digital_presence,
        vec![DigitalPresence::SocialMedia]
    );
    walk_to_last_from_current(&mut wizard);

    let notifier = QueueNotifier::new(vec![Ok(())]);
    wizard.submit(&notifier, TIMEOUT).await;
    assert_eq!(
        notifier.sent()[0].get("digitalPresence"),
        Some("Redes sociales")
    );
}

fn walk_to_last_from_current(wizard: &mut FormWizard) {
    while wizard.current() != Section::LAST {
        assert!(wizard.advance().unwrap());
    }
}
