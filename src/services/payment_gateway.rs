//! Card payment gateway boundary. [`StripeGateway`] talks to the Stripe REST API.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum IntentStatus {
    Succeeded,
    Pending,
    Failed,
}

impl IntentStatus {
    /// Collapse Stripe's intent states onto the three the engine acts on.
    pub fn from_stripe(status: &str, has_payment_error: bool) -> Self {
        match status {
            "succeeded" => IntentStatus::Succeeded,
            "canceled" => IntentStatus::Failed,
            "requires_payment_method" if has_payment_error => IntentStatus::Failed,
            _ => IntentStatus::Pending,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            IntentStatus::Succeeded => "succeeded",
            IntentStatus::Pending => "pending",
            IntentStatus::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntent {
    pub intent_id: String,
    pub client_secret: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_intent(
        &self,
        amount_cents: i64,
        currency: &str,
        metadata: &BTreeMap<String, String>,
    ) -> AppResult<PaymentIntent>;

    async fn get_status(&self, intent_id: &str) -> AppResult<IntentStatus>;
}

#[derive(Debug, Clone)]
pub struct StripeGateway {
    client: reqwest::Client,
    secret_key: String,
    api_base: String,
}

#[derive(Debug, Deserialize)]
struct StripeIntent {
    id: String,
    status: String,
    client_secret: Option<String>,
    last_payment_error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorEnvelope {
    error: StripeErrorBody,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    message: Option<String>,
}

impl StripeGateway {
    pub fn new(secret_key: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            secret_key: secret_key.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    fn ensure_configured(&self) -> AppResult<()> {
        if self.secret_key.is_empty() {
            return Err(AppError::Gateway("card payments are not configured".into()));
        }
        Ok(())
    }

    async fn read_intent(response: reqwest::Response) -> AppResult<StripeIntent> {
        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<StripeErrorEnvelope>()
                .await
                .ok()
                .and_then(|e| e.error.message)
                .unwrap_or_else(|| format!("gateway responded with {status}"));
            return Err(AppError::Gateway(message));
        }
        response
            .json::<StripeIntent>()
            .await
            .map_err(|e| AppError::Gateway(format!("unreadable gateway response: {e}")))
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_intent(
        &self,
        amount_cents: i64,
        currency: &str,
        metadata: &BTreeMap<String, String>,
    ) -> AppResult<PaymentIntent> {
        self.ensure_configured()?;
        if amount_cents <= 0 {
            return Err(AppError::Validation("amount must be positive".into()));
        }

        let mut form: Vec<(String, String)> = vec![
            ("amount".into(), amount_cents.to_string()),
            ("currency".into(), currency.to_lowercase()),
            ("automatic_payment_methods[enabled]".into(), "true".into()),
        ];
        for (key, value) in metadata {
            form.push((format!("metadata[{key}]"), value.clone()));
        }

        let response = self
            .client
            .post(format!("{}/v1/payment_intents", self.api_base))
            .basic_auth(&self.secret_key, None::<&str>)
            .form(&form)
            .send()
            .await
            .map_err(|e| AppError::Gateway(e.to_string()))?;

        let intent = Self::read_intent(response).await?;
        let client_secret = intent
            .client_secret
            .ok_or_else(|| AppError::Gateway("intent has no client secret".into()))?;

        Ok(PaymentIntent {
            intent_id: intent.id,
            client_secret,
        })
    }

    async fn get_status(&self, intent_id: &str) -> AppResult<IntentStatus> {
        self.ensure_configured()?;
        let response = self
            .client
            .get(format!("{}/v1/payment_intents/{intent_id}", self.api_base))
            .basic_auth(&self.secret_key, None::<&str>)
            .send()
            .await
            .map_err(|e| AppError::Gateway(e.to_string()))?;

        let intent = Self::read_intent(response).await?;
        Ok(IntentStatus::from_stripe(
            &intent.status,
            intent.last_payment_error.is_some_and(|e| !e.is_null()),
        ))
    }
}
