use std::collections::BTreeMap;

use crate::domain::{Draft, FieldId, FormSchema, Section};

/// Inline messages keyed by field, in form order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    entries: BTreeMap<FieldId, &'static str>,
}

impl ValidationErrors {
    /// Messages for every required field of `section` that is blank.
    pub fn collect(schema: &FormSchema, section: Section, draft: &Draft) -> Self {
        let entries = schema
            .required(section)
            .iter()
            .filter(|rule| draft.is_blank(rule.field))
            .map(|rule| (rule.field, rule.message))
            .collect();
        Self { entries }
    }

    pub fn get(&self, field: FieldId) -> Option<&'static str> {
        self.entries.get(&field).copied()
    }

    pub fn fields(&self) -> Vec<FieldId> {
        self.entries.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldId, &'static str)> + '_ {
        self.entries.iter().map(|(field, message)| (*field, *message))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn insert(&mut self, field: FieldId, message: &'static str) {
        self.entries.insert(field, message);
    }

    pub(crate) fn remove(&mut self, field: FieldId) {
        self.entries.remove(&field);
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}
