use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::choices::{
    Budget, ChoiceSet, DigitalPresence, Employees, Goal, PreviousExperience, SolutionType,
    Urgency,
};
use crate::domain::fields::{FieldId, FieldKind};
use crate::errors::{WizardError, WizardResult};

/// In-progress answers of one prospect. Every field always holds a value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct Draft {
    // Datos de contacto
    pub full_name: String,
    pub phone: String,
    pub email: String,
    pub business_name: String,
    pub location: String,

    // Situación actual
    pub business_type: String,
    pub employees: Employees,
    pub digital_presence: Vec<DigitalPresence>,

    // Necesidad y urgencia
    #[serde(deserialize_with = "blank_as_none")]
    pub solution_type: Option<SolutionType>,
    pub main_problem: String,
    pub urgency: Urgency,

    // Inversión y experiencia
    pub previous_experience: PreviousExperience,
    pub budget: Budget,

    // Objetivos
    pub goals: Vec<Goal>,
    pub value_perception: String,
}

/// Typed write to a single field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate {
    FullName(String),
    Phone(String),
    Email(String),
    BusinessName(String),
    Location(String),
    BusinessType(String),
    Employees(Employees),
    DigitalPresence(Vec<DigitalPresence>),
    SolutionType(Option<SolutionType>),
    MainProblem(String),
    Urgency(Urgency),
    PreviousExperience(PreviousExperience),
    Budget(Budget),
    Goals(Vec<Goal>),
    ValuePerception(String),
}

/// One option of one multi-select field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultiChoice {
    DigitalPresence(DigitalPresence),
    Goal(Goal),
}

impl FieldUpdate {
    pub fn field(&self) -> FieldId {
        match self {
            FieldUpdate::FullName(_) => FieldId::FullName,
            FieldUpdate::Phone(_) => FieldId::Phone,
            FieldUpdate::Email(_) => FieldId::Email,
            FieldUpdate::BusinessName(_) => FieldId::BusinessName,
            FieldUpdate::Location(_) => FieldId::Location,
            FieldUpdate::BusinessType(_) => FieldId::BusinessType,
            FieldUpdate::Employees(_) => FieldId::Employees,
            FieldUpdate::DigitalPresence(_) => FieldId::DigitalPresence,
            FieldUpdate::SolutionType(_) => FieldId::SolutionType,
            FieldUpdate::MainProblem(_) => FieldId::MainProblem,
            FieldUpdate::Urgency(_) => FieldId::Urgency,
            FieldUpdate::PreviousExperience(_) => FieldId::PreviousExperience,
            FieldUpdate::Budget(_) => FieldId::Budget,
            FieldUpdate::Goals(_) => FieldId::Goals,
            FieldUpdate::ValuePerception(_) => FieldId::ValuePerception,
        }
    }

    /// Builds an update from user-typed text.
    ///
    /// Text fields take the input verbatim. Selects accept an option label
    /// (case-insensitive) or its 1-based index; the optional select also
    /// accepts a blank answer. Multi-selects take a comma separated list.
    pub fn parse(field: FieldId, raw: &str) -> WizardResult<Self> {
        let unknown = || WizardError::UnknownOption {
            field,
            value: raw.trim().to_string(),
        };

        let update = match field {
            FieldId::FullName => FieldUpdate::FullName(raw.to_string()),
            FieldId::Phone => FieldUpdate::Phone(raw.to_string()),
            FieldId::Email => FieldUpdate::Email(raw.to_string()),
            FieldId::BusinessName => FieldUpdate::BusinessName(raw.to_string()),
            FieldId::Location => FieldUpdate::Location(raw.to_string()),
            FieldId::BusinessType => FieldUpdate::BusinessType(raw.to_string()),
            FieldId::MainProblem => FieldUpdate::MainProblem(raw.to_string()),
            FieldId::ValuePerception => FieldUpdate::ValuePerception(raw.to_string()),
            FieldId::Employees => {
                FieldUpdate::Employees(Employees::parse_choice(raw).ok_or_else(unknown)?)
            }
            FieldId::Urgency => {
                FieldUpdate::Urgency(Urgency::parse_choice(raw).ok_or_else(unknown)?)
            }
            FieldId::PreviousExperience => FieldUpdate::PreviousExperience(
                PreviousExperience::parse_choice(raw).ok_or_else(unknown)?,
            ),
            FieldId::Budget => FieldUpdate::Budget(Budget::parse_choice(raw).ok_or_else(unknown)?),
            FieldId::SolutionType => {
                if raw.trim().is_empty() {
                    FieldUpdate::SolutionType(None)
                } else {
                    FieldUpdate::SolutionType(Some(
                        SolutionType::parse_choice(raw).ok_or_else(unknown)?,
                    ))
                }
            }
            FieldId::DigitalPresence => FieldUpdate::DigitalPresence(parse_list(field, raw)?),
            FieldId::Goals => FieldUpdate::Goals(parse_list(field, raw)?),
        };
        Ok(update)
    }
}

impl MultiChoice {
    pub fn field(self) -> FieldId {
        match self {
            MultiChoice::DigitalPresence(_) => FieldId::DigitalPresence,
            MultiChoice::Goal(_) => FieldId::Goals,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MultiChoice::DigitalPresence(option) => option.label(),
            MultiChoice::Goal(option) => option.label(),
        }
    }

    /// Resolves `option` against the option set of a multi-select field.
    pub fn parse(field: FieldId, option: &str) -> WizardResult<Self> {
        let unknown = || WizardError::UnknownOption {
            field,
            value: option.trim().to_string(),
        };
        match field {
            FieldId::DigitalPresence => DigitalPresence::parse_choice(option)
                .map(MultiChoice::DigitalPresence)
                .ok_or_else(unknown),
            FieldId::Goals => Goal::parse_choice(option)
                .map(MultiChoice::Goal)
                .ok_or_else(unknown),
            _ => Err(WizardError::FieldTypeMismatch { field }),
        }
    }
}

impl Draft {
    pub fn apply(&mut self, update: FieldUpdate) {
        match update {
            FieldUpdate::FullName(value) => self.full_name = value,
            FieldUpdate::Phone(value) => self.phone = value,
            FieldUpdate::Email(value) => self.email = value,
            FieldUpdate::BusinessName(value) => self.business_name = value,
            FieldUpdate::Location(value) => self.location = value,
            FieldUpdate::BusinessType(value) => self.business_type = value,
            FieldUpdate::Employees(value) => self.employees = value,
            FieldUpdate::DigitalPresence(values) => self.digital_presence = dedup(values),
            FieldUpdate::SolutionType(value) => self.solution_type = value,
            FieldUpdate::MainProblem(value) => self.main_problem = value,
            FieldUpdate::Urgency(value) => self.urgency = value,
            FieldUpdate::PreviousExperience(value) => self.previous_experience = value,
            FieldUpdate::Budget(value) => self.budget = value,
            FieldUpdate::Goals(values) => self.goals = dedup(values),
            FieldUpdate::ValuePerception(value) => self.value_perception = value,
        }
    }

    /// Adds or removes one option of a multi-select field. Returns whether
    /// the set changed.
    pub fn toggle(&mut self, choice: MultiChoice, included: bool) -> bool {
        match choice {
            MultiChoice::DigitalPresence(option) => {
                toggle_member(&mut self.digital_presence, option, included)
            }
            MultiChoice::Goal(option) => toggle_member(&mut self.goals, option, included),
        }
    }

    pub fn contains(&self, choice: MultiChoice) -> bool {
        match choice {
            MultiChoice::DigitalPresence(option) => self.digital_presence.contains(&option),
            MultiChoice::Goal(option) => self.goals.contains(&option),
        }
    }

    /// Text value of a free-text field, `None` for selects.
    pub fn text(&self, field: FieldId) -> Option<&str> {
        let value = match field {
            FieldId::FullName => &self.full_name,
            FieldId::Phone => &self.phone,
            FieldId::Email => &self.email,
            FieldId::BusinessName => &self.business_name,
            FieldId::Location => &self.location,
            FieldId::BusinessType => &self.business_type,
            FieldId::MainProblem => &self.main_problem,
            FieldId::ValuePerception => &self.value_perception,
            _ => return None,
        };
        Some(value.as_str())
    }

    /// Whether a field counts as unanswered for required-field checks.
    /// Text made only of whitespace is blank.
    pub fn is_blank(&self, field: FieldId) -> bool {
        match field.kind() {
            FieldKind::Text | FieldKind::LongText => {
                self.text(field).map_or(true, |value| value.trim().is_empty())
            }
            FieldKind::OptionalSelect => self.solution_type.is_none(),
            FieldKind::MultiSelect => match field {
                FieldId::DigitalPresence => self.digital_presence.is_empty(),
                _ => self.goals.is_empty(),
            },
            FieldKind::SingleSelect => false,
        }
    }

    /// Renders a field the way it is displayed and sent: multi-selects are
    /// joined with `", "` and an unset optional select is blank.
    pub fn display_value(&self, field: FieldId) -> String {
        if let Some(text) = self.text(field) {
            return text.to_string();
        }
        match field {
            FieldId::Employees => self.employees.label().to_string(),
            FieldId::DigitalPresence => join_labels(&self.digital_presence),
            FieldId::SolutionType => self
                .solution_type
                .map(|choice| choice.label().to_string())
                .unwrap_or_default(),
            FieldId::Urgency => self.urgency.label().to_string(),
            FieldId::PreviousExperience => self.previous_experience.label().to_string(),
            FieldId::Budget => self.budget.label().to_string(),
            FieldId::Goals => join_labels(&self.goals),
            _ => String::new(),
        }
    }
}

const MULTI_VALUE_SEPARATOR: &str = ", ";

fn join_labels<T: ChoiceSet>(values: &[T]) -> String {
    values
        .iter()
        .map(|value| value.label())
        .collect::<Vec<_>>()
        .join(MULTI_VALUE_SEPARATOR)
}

fn toggle_member<T: PartialEq + Copy>(set: &mut Vec<T>, option: T, included: bool) -> bool {
    let present = set.contains(&option);
    match (included, present) {
        (true, false) => {
            set.push(option);
            true
        }
        (false, true) => {
            set.retain(|existing| *existing != option);
            true
        }
        _ => false,
    }
}

fn dedup<T: PartialEq + Copy>(values: Vec<T>) -> Vec<T> {
    let mut unique = Vec::with_capacity(values.len());
    for value in values {
        if !unique.contains(&value) {
            unique.push(value);
        }
    }
    unique
}

fn parse_list<T: ChoiceSet>(field: FieldId, raw: &str) -> WizardResult<Vec<T>> {
    let mut values = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|part| !part.is_empty()) {
        let value = T::parse_choice(part).ok_or_else(|| WizardError::UnknownOption {
            field,
            value: part.to_string(),
        })?;
        values.push(value);
    }
    Ok(dedup(values))
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<SolutionType>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(label) => SolutionType::parse_choice(label)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown solutionType `{label}`"))),
    }
}
