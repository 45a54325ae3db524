//! Form model: questions, option sets, the answer record and the section
//! layout.

pub mod choices;
pub mod draft;
pub mod fields;
pub mod schema;

pub use choices::{
    Budget, ChoiceSet, DigitalPresence, Employees, Goal, PreviousExperience, SolutionType,
    Urgency,
};
pub use draft::{Draft, FieldUpdate, MultiChoice};
pub use fields::{FieldId, FieldKind};
pub use schema::{FormSchema, RequiredField, Section, SectionSpec};
