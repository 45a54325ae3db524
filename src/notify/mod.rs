//! Delivery port for finished submissions.
//!
//! The wizard only knows the [`Notifier`] trait; the EmailJS adapter lives in
//! [`emailjs`].

pub mod emailjs;

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::{Draft, FieldId};
use crate::errors::DeliveryError;

pub use emailjs::{EmailJsCredentials, EmailJsNotifier, DEFAULT_ENDPOINT};

/// Flat string map handed to the notifier. Keys are the field wire keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TemplateParams(BTreeMap<String, String>);

impl TemplateParams {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }
}

impl From<&Draft> for TemplateParams {
    fn from(draft: &Draft) -> Self {
        TemplateParams(
            FieldId::ALL
                .iter()
                .map(|field| (field.key().to_string(), draft.display_value(*field)))
                .collect(),
        )
    }
}

/// Sends a completed submission somewhere a human will read it.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, params: &TemplateParams) -> Result<(), DeliveryError>;
}
