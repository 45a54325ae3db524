use std::fmt;
use std::str::FromStr;

use crate::errors::WizardError;

/// Identifies every question of the prequalification form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldId {
    FullName,
    Phone,
    Email,
    BusinessName,
    Location,
    BusinessType,
    Employees,
    DigitalPresence,
    SolutionType,
    MainProblem,
    Urgency,
    PreviousExperience,
    Budget,
    Goals,
    ValuePerception,
}

/// Shape of the value a field accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// Free text rendered as a multi-line area.
    LongText,
    SingleSelect,
    /// Single select whose default is "nothing chosen yet".
    OptionalSelect,
    MultiSelect,
}

impl FieldId {
    pub const ALL: [FieldId; 15] = [
        FieldId::FullName,
        FieldId::Phone,
        FieldId::Email,
        FieldId::BusinessName,
        FieldId::Location,
        FieldId::BusinessType,
        FieldId::Employees,
        FieldId::DigitalPresence,
        FieldId::SolutionType,
        FieldId::MainProblem,
        FieldId::Urgency,
        FieldId::PreviousExperience,
        FieldId::Budget,
        FieldId::Goals,
        FieldId::ValuePerception,
    ];

    /// Key used in the JSON answers file and in the email template.
    pub fn key(self) -> &'static str {
        match self {
            FieldId::FullName => "fullName",
            FieldId::Phone => "phone",
            FieldId::Email => "email",
            FieldId::BusinessName => "businessName",
            FieldId::Location => "location",
            FieldId::BusinessType => "businessType",
            FieldId::Employees => "employees",
            FieldId::DigitalPresence => "digitalPresence",
            FieldId::SolutionType => "solutionType",
            FieldId::MainProblem => "mainProblem",
            FieldId::Urgency => "urgency",
            FieldId::PreviousExperience => "previousExperience",
            FieldId::Budget => "budget",
            FieldId::Goals => "goals",
            FieldId::ValuePerception => "valuePerception",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FieldId::FullName => "Nombre completo",
            FieldId::Phone => "Teléfono (preferente WhatsApp)",
            FieldId::Email => "Correo electrónico",
            FieldId::BusinessName => "Nombre del negocio (si aplica)",
            FieldId::Location => "Ciudad / Estado",
            FieldId::BusinessType => "¿Cuál es tu giro o actividad principal?",
            FieldId::Employees => "¿Cuántas personas trabajan actualmente en tu negocio?",
            FieldId::DigitalPresence => {
                "¿Tienes actualmente alguna presencia digital activa? (Puedes marcar varias)"
            }
            FieldId::SolutionType => "¿Qué tipo de solución estás buscando?",
            FieldId::MainProblem => {
                "¿Cuál es el mayor problema que tienes hoy en tu negocio relacionado con tu operación digital?"
            }
            FieldId::Urgency => "¿Qué tan urgente es resolver este problema?",
            FieldId::PreviousExperience => "¿Has invertido antes en desarrollo web o sistemas?",
            FieldId::Budget => "¿Cuál es tu presupuesto aproximado para este proyecto?",
            FieldId::Goals => "¿Qué esperas lograr con este proyecto?",
            FieldId::ValuePerception => {
                "¿Qué te haría sentir que esta inversión realmente valió la pena?"
            }
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            FieldId::FullName
            | FieldId::Phone
            | FieldId::Email
            | FieldId::BusinessName
            | FieldId::Location => FieldKind::Text,
            FieldId::BusinessType | FieldId::MainProblem | FieldId::ValuePerception => {
                FieldKind::LongText
            }
            FieldId::Employees
            | FieldId::Urgency
            | FieldId::PreviousExperience
            | FieldId::Budget => FieldKind::SingleSelect,
            FieldId::SolutionType => FieldKind::OptionalSelect,
            FieldId::DigitalPresence | FieldId::Goals => FieldKind::MultiSelect,
        }
    }

    /// Labels offered by select fields; empty for free text.
    pub fn options(self) -> Vec<&'static str> {
        use crate::domain::choices::*;

        match self {
            FieldId::Employees => Employees::labels(),
            FieldId::DigitalPresence => DigitalPresence::labels(),
            FieldId::SolutionType => SolutionType::labels(),
            FieldId::Urgency => Urgency::labels(),
            FieldId::PreviousExperience => PreviousExperience::labels(),
            FieldId::Budget => Budget::labels(),
            FieldId::Goals => Goal::labels(),
            _ => Vec::new(),
        }
    }

    /// Returns the closest known key when `name` is a plausible typo.
    pub fn suggest(name: &str) -> Option<&'static str> {
        let lowered = name.to_ascii_lowercase();
        FieldId::ALL
            .iter()
            .map(|field| {
                let key = field.key();
                (key, strsim::jaro_winkler(&lowered, &key.to_ascii_lowercase()))
            })
            .filter(|(_, score)| *score >= 0.8)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(key, _)| key)
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for FieldId {
    type Err = WizardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        FieldId::ALL
            .iter()
            .copied()
            .find(|field| field.key().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| WizardError::UnknownField {
                name: trimmed.to_string(),
                suggestion: FieldId::suggest(trimmed),
            })
    }
}
