//! Fixed option sets offered by the single- and multi-select questions.
//!
//! Labels are the exact strings shown to the prospect and forwarded in the
//! email payload, so they stay in Spanish.

use std::fmt;

/// Common contract for enumerations backed by a fixed list of labels.
pub trait ChoiceSet: Copy + Eq + fmt::Debug + 'static {
    /// Every option, in display order.
    const ALL: &'static [Self];

    fn label(self) -> &'static str;

    /// Resolves a label (case-insensitive) or a 1-based menu index.
    fn parse_choice(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        if let Ok(index) = trimmed.parse::<usize>() {
            return index.checked_sub(1).and_then(|idx| Self::ALL.get(idx).copied());
        }
        let normalized = trimmed.to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|candidate| candidate.label().to_lowercase() == normalized)
    }

    fn labels() -> Vec<&'static str> {
        Self::ALL.iter().map(|choice| choice.label()).collect()
    }
}

macro_rules! choice_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($variant:ident => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(into = "String", try_from = "String")]
        pub enum $name {
            $($variant),+
        }

        impl ChoiceSet for $name {
            const ALL: &'static [Self] = &[$($name::$variant),+];

            fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.label().to_string()
            }
        }

        impl TryFrom<String> for $name {
            type Error = String;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                <$name as ChoiceSet>::parse_choice(&value).ok_or_else(|| {
                    format!(
                        "`{}` is not one of: {}",
                        value,
                        <$name as ChoiceSet>::labels().join(", ")
                    )
                })
            }
        }
    };
}

choice_enum! {
    /// Headcount bracket of the prospect's business.
    pub enum Employees {
        JustMe => "Solo yo",
        TwoToFive => "2 a 5 personas",
        SixToTen => "6 a 10 personas",
        MoreThanTen => "Más de 10",
    }
}

choice_enum! {
    /// Digital channels the business already runs.
    pub enum DigitalPresence {
        Website => "Sitio web",
        SocialMedia => "Redes sociales",
        SalesPage => "Página de ventas / e-commerce",
        InternalSystem => "CRM o sistema interno",
        Nothing => "Ninguno",
    }
}

choice_enum! {
    pub enum SolutionType {
        NewWebsite => "Sitio web nuevo",
        Redesign => "Rediseño de sitio web",
        InternalSystem => "Sistema interno (CRM, inventarios, pedidos, etc.)",
        Automation => "Automatización / Integración",
        NeedsGuidance => "No estoy seguro, necesito orientación",
    }
}

choice_enum! {
    pub enum Urgency {
        High => "Alta urgencia (menos de 30 días)",
        Medium => "Mediana urgencia (1 a 3 meses)",
        Exploring => "Estoy explorando opciones, sin prisa",
    }
}

choice_enum! {
    /// Whether the prospect has paid for web or systems work before.
    pub enum PreviousExperience {
        Good => "Sí, con buen resultado",
        Bad => "Sí, pero fue una mala experiencia",
        FirstTime => "No, sería la primera vez",
    }
}

choice_enum! {
    pub enum Budget {
        UnderFiveThousand => "Menos de $5,000 MXN",
        FiveToTenThousand => "Entre $5,000 y $10,000 MXN",
        OverTenThousand => "Más de $10,000 MXN",
        Unsure => "No estoy seguro",
    }
}

choice_enum! {
    /// Outcomes the prospect expects from the project.
    pub enum Goal {
        DigitalPresence => "Mejorar presencia digital",
        MoreLeads => "Generar más prospectos o ventas",
        InternalProcesses => "Mejorar procesos internos",
        Automation => "Ahorrar tiempo y automatizar tareas",
        Unsure => "No estoy seguro",
    }
}

impl Default for Employees {
    fn default() -> Self {
        Employees::JustMe
    }
}

impl Default for Urgency {
    fn default() -> Self {
        Urgency::Exploring
    }
}

impl Default for PreviousExperience {
    fn default() -> Self {
        PreviousExperience::FirstTime
    }
}

impl Default for Budget {
    fn default() -> Self {
        Budget::Unsure
    }
}
