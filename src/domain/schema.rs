use std::fmt;

use once_cell::sync::Lazy;

use crate::domain::fields::FieldId;
use crate::errors::{WizardError, WizardResult};

/// 1-based index of a form section. Always within `1..=Section::COUNT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Section(u8);

impl Section {
    pub const COUNT: u8 = 5;
    pub const FIRST: Section = Section(1);
    pub const LAST: Section = Section(Self::COUNT);

    pub fn new(index: u8) -> WizardResult<Self> {
        if (1..=Self::COUNT).contains(&index) {
            Ok(Section(index))
        } else {
            Err(WizardError::SectionOutOfRange(index))
        }
    }

    pub fn index(self) -> u8 {
        self.0
    }

    /// Next section, clamped at the last one.
    pub fn next(self) -> Section {
        Section((self.0 + 1).min(Self::COUNT))
    }

    /// Previous section, clamped at the first one.
    pub fn prev(self) -> Section {
        Section(self.0.saturating_sub(1).max(1))
    }

    pub fn is_last(self) -> bool {
        self == Self::LAST
    }

    pub fn all() -> impl Iterator<Item = Section> {
        (1..=Self::COUNT).map(Section)
    }
}

impl TryFrom<u8> for Section {
    type Error = WizardError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Section::new(value)
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A field that blocks progress while blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredField {
    pub field: FieldId,
    pub message: &'static str,
}

impl RequiredField {
    pub const fn new(field: FieldId, message: &'static str) -> Self {
        Self { field, message }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionSpec {
    pub title: &'static str,
    pub fields: Vec<FieldId>,
    pub required: Vec<RequiredField>,
}

/// Static layout of the form: which fields each section shows and which of
/// them are required.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSchema {
    sections: Vec<SectionSpec>,
}

static PREQUALIFICATION: Lazy<FormSchema> = Lazy::new(|| FormSchema {
    sections: vec![
        SectionSpec {
            title: "Datos de contacto",
            fields: vec![
                FieldId::FullName,
                FieldId::Phone,
                FieldId::Email,
                FieldId::BusinessName,
                FieldId::Location,
            ],
            required: vec![
                RequiredField::new(FieldId::FullName, "Nombre completo requerido"),
                RequiredField::new(FieldId::Phone, "Teléfono requerido"),
                RequiredField::new(FieldId::Email, "Email requerido"),
                RequiredField::new(FieldId::Location, "Ubicación requerida"),
            ],
        },
        SectionSpec {
            title: "Situación actual del negocio",
            fields: vec![
                FieldId::BusinessType,
                FieldId::Employees,
                FieldId::DigitalPresence,
            ],
            required: vec![RequiredField::new(
                FieldId::BusinessType,
                "Giro del negocio requerido",
            )],
        },
        SectionSpec {
            title: "Necesidad y urgencia",
            fields: vec![FieldId::SolutionType, FieldId::MainProblem, FieldId::Urgency],
            required: Vec::new(),
        },
        SectionSpec {
            title: "Inversión y experiencia previa",
            fields: vec![FieldId::PreviousExperience, FieldId::Budget],
            required: Vec::new(),
        },
        SectionSpec {
            title: "Objetivos y percepción de valor",
            fields: vec![FieldId::Goals, FieldId::ValuePerception],
            required: Vec::new(),
        },
    ],
});

impl FormSchema {
    /// The canonical prequalification layout.
    pub fn prequalification() -> &'static FormSchema {
        &PREQUALIFICATION
    }

    /// Copy of the canonical layout with a different required-field list for
    /// one section.
    pub fn with_required(mut self, section: Section, required: Vec<RequiredField>) -> Self {
        self.sections[usize::from(section.index() - 1)].required = required;
        self
    }

    pub fn section(&self, section: Section) -> &SectionSpec {
        &self.sections[usize::from(section.index() - 1)]
    }

    pub fn required(&self, section: Section) -> &[RequiredField] {
        &self.section(section).required
    }

    /// Required-field rule for `field` when it is required in `section`.
    pub fn rule(&self, section: Section, field: FieldId) -> Option<&RequiredField> {
        self.required(section).iter().find(|rule| rule.field == field)
    }
}

impl Default for FormSchema {
    fn default() -> Self {
        PREQUALIFICATION.clone()
    }
}
