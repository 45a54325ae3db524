use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::DeliveryError;
use crate::notify::{Notifier, TemplateParams};

/// Public EmailJS REST endpoint for sending a template.
pub const DEFAULT_ENDPOINT: &str = "https://api.emailjs.com/api/v1.0/email/send";

/// Identifiers issued by EmailJS. Treated as opaque strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailJsCredentials {
    pub service_id: String,
    pub template_id: String,
    pub public_key: String,
}

impl EmailJsCredentials {
    pub fn is_complete(&self) -> bool {
        !self.service_id.trim().is_empty()
            && !self.template_id.trim().is_empty()
            && !self.public_key.trim().is_empty()
    }
}

#[derive(Serialize)]
struct SendRequest<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    template_params: &'a TemplateParams,
    #[serde(rename = "accessToken", skip_serializing_if = "Option::is_none")]
    access_token: Option<&'a str>,
}

/// [`Notifier`] backed by the EmailJS `email/send` endpoint.
pub struct EmailJsNotifier {
    client: reqwest::Client,
    endpoint: String,
    credentials: EmailJsCredentials,
    access_token: Option<String>,
}

impl EmailJsNotifier {
    pub fn new(credentials: EmailJsCredentials) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            credentials,
            access_token: None,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Private key for accounts that require strict API access.
    pub fn with_access_token(mut self, token: Option<String>) -> Self {
        self.access_token = token.filter(|value| !value.trim().is_empty());
        self
    }

    fn request_body<'a>(&'a self, params: &'a TemplateParams) -> SendRequest<'a> {
        SendRequest {
            service_id: &self.credentials.service_id,
            template_id: &self.credentials.template_id,
            user_id: &self.credentials.public_key,
            template_params: params,
            access_token: self.access_token.as_deref(),
        }
    }
}

#[async_trait]
impl Notifier for EmailJsNotifier {
    async fn send(&self, params: &TemplateParams) -> Result<(), DeliveryError> {
        if !self.credentials.is_complete() {
            return Err(DeliveryError::NotConfigured);
        }

        debug!(endpoint = %self.endpoint, fields = params.len(), "Sending EmailJS request");
        let response = self
            .client
            .post(&self.endpoint)
            .json(&self.request_body(params))
            .send()
            .await
            .map_err(|err| DeliveryError::Transport(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), body = %body, "EmailJS rejected the request");
        Err(DeliveryError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}
