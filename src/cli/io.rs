//! Terminal prompts for the interactive wizard, built on dialoguer.

use dialoguer::{theme::ColorfulTheme, Confirm, Input, MultiSelect, Select};

use crate::cli::output;
use crate::cli::runner::{FieldEdit, NavAction, WizardPrompter};
use crate::domain::{Draft, FieldId, FieldKind, FieldUpdate, MultiChoice, Section, SectionSpec};
use crate::errors::{CliResult, DeliveryError};
use crate::wizard::SectionState;

const NO_SELECTION: &str = "Selecciona una opción";

/// [`WizardPrompter`] that talks to a real terminal.
pub struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }

    fn prompt_text(&self, field: FieldId, current: &str) -> CliResult<FieldEdit> {
        let value = Input::<String>::with_theme(&self.theme)
            .with_prompt(field.label())
            .with_initial_text(current)
            .allow_empty(true)
            .interact_text()?;
        if value == current {
            return Ok(FieldEdit::Keep);
        }
        Ok(FieldEdit::Update(FieldUpdate::parse(field, &value)?))
    }

    fn prompt_single(
        &self,
        field: FieldId,
        current: &str,
        optional: bool,
    ) -> CliResult<FieldEdit> {
        let mut items: Vec<&str> = Vec::new();
        if optional {
            items.push(NO_SELECTION);
        }
        items.extend(field.options());
        let default = items.iter().position(|item| *item == current).unwrap_or(0);

        let index = Select::with_theme(&self.theme)
            .with_prompt(field.label())
            .items(&items)
            .default(default)
            .interact()?;
        if index == default {
            return Ok(FieldEdit::Keep);
        }
        let raw = if optional && index == 0 { "" } else { items[index] };
        Ok(FieldEdit::Update(FieldUpdate::parse(field, raw)?))
    }

    fn prompt_multi(&self, field: FieldId, draft: &Draft) -> CliResult<FieldEdit> {
        let options = field.options();
        let mut choices = Vec::with_capacity(options.len());
        for option in &options {
            choices.push(MultiChoice::parse(field, option)?);
        }
        let checked: Vec<bool> = choices.iter().map(|choice| draft.contains(*choice)).collect();

        let selected = MultiSelect::with_theme(&self.theme)
            .with_prompt(field.label())
            .items(&options)
            .defaults(&checked)
            .interact()?;

        let toggles = choices
            .into_iter()
            .enumerate()
            .filter_map(|(idx, choice)| {
                let included = selected.contains(&idx);
                (included != checked[idx]).then_some((choice, included))
            })
            .collect::<Vec<_>>();
        if toggles.is_empty() {
            Ok(FieldEdit::Keep)
        } else {
            Ok(FieldEdit::Toggle(toggles))
        }
    }
}

impl WizardPrompter for TerminalPrompter {
    fn show_section(
        &mut self,
        section: Section,
        spec: &SectionSpec,
        states: &[(Section, SectionState)],
    ) {
        let indicator = states
            .iter()
            .map(|(step, state)| match state {
                SectionState::Current => format!("[{step}]"),
                SectionState::Visited => format!("{step}✓"),
                SectionState::Upcoming => step.to_string(),
            })
            .collect::<Vec<_>>()
            .join(" · ");
        output::section(format!(
            "Sección {} de {} – {}",
            section,
            Section::COUNT,
            spec.title
        ));
        output::detail(indicator);
    }

    fn edit_field(
        &mut self,
        field: FieldId,
        draft: &Draft,
        error: Option<&str>,
    ) -> CliResult<FieldEdit> {
        if let Some(message) = error {
            output::warning(message);
        }
        let current = draft.display_value(field);
        match field.kind() {
            FieldKind::Text | FieldKind::LongText => self.prompt_text(field, &current),
            FieldKind::SingleSelect => self.prompt_single(field, &current, false),
            FieldKind::OptionalSelect => self.prompt_single(field, &current, true),
            FieldKind::MultiSelect => self.prompt_multi(field, draft),
        }
    }

    fn choose_action(&mut self, current: Section, visited: &[Section]) -> CliResult<NavAction> {
        let mut actions = Vec::new();
        if current.is_last() {
            actions.push(("Enviar", NavAction::Submit));
        } else {
            actions.push(("Siguiente", NavAction::Next));
        }
        if current != Section::FIRST {
            actions.push(("Anterior", NavAction::Back));
        }
        let jump_labels: Vec<String> = visited
            .iter()
            .map(|section| format!("Ir a la sección {section}"))
            .collect();
        for (label, section) in jump_labels.iter().zip(visited) {
            actions.push((label.as_str(), NavAction::JumpTo(*section)));
        }
        actions.push(("Editar esta sección", NavAction::Stay));
        actions.push(("Cancelar", NavAction::Cancel));

        let labels: Vec<&str> = actions.iter().map(|(label, _)| *label).collect();
        let index = Select::with_theme(&self.theme)
            .with_prompt("¿Qué deseas hacer?")
            .items(&labels)
            .default(0)
            .interact()?;
        Ok(actions[index].1)
    }

    fn confirm_retry(&mut self, error: &DeliveryError) -> CliResult<bool> {
        output::detail(error);
        let retry = Confirm::with_theme(&self.theme)
            .with_prompt("¿Intentar de nuevo?")
            .default(true)
            .interact()?;
        Ok(retry)
    }
}
