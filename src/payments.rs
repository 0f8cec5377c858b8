use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

// 1. PaymentGateway Contract
/// PaymentGateway
///
/// Defines the abstract contract for all interactions with the payment provider.
/// This trait allows us to swap the concrete implementation—from the real
/// Stripe-compatible client (StripeGateway) in production to the in-memory Mock
/// (MockPaymentGateway) during testing—without affecting the calling handlers.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Requests a payment intent for `amount` minor units (e.g. cents) in the given
    /// currency, returning the client secret the frontend needs to confirm the
    /// payment.
    async fn create_payment_intent(&self, amount: i64, currency: &str) -> Result<String, String>;
}

/// PaymentIntentBody
///
/// Minimal struct to deserialize the provider's payment-intent response,
/// capturing only the client secret.
#[derive(Deserialize)]
struct PaymentIntentBody {
    client_secret: String,
}

// 2. The Real Implementation (Stripe-compatible API)
/// StripeGateway
///
/// The concrete implementation using the provider's HTTP API. The base URL is
/// configurable so local stacks can point at a stub server.
#[derive(Clone)]
pub struct StripeGateway {
    client: reqwest::Client,
    api_base: String,
    secret_key: String,
}

impl StripeGateway {
    /// new
    ///
    /// Constructs the gateway client using the API base and secret key from AppConfig.
    pub fn new(api_base: &str, secret_key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            secret_key: secret_key.to_string(),
        }
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    /// create_payment_intent
    ///
    /// POSTs the form-encoded intent request to `/v1/payment_intents` with the
    /// secret key as a bearer credential, and extracts the client secret from the
    /// response body.
    async fn create_payment_intent(&self, amount: i64, currency: &str) -> Result<String, String> {
        let url = format!("{}/v1/payment_intents", self.api_base);

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.secret_key)
            .form(&[
                ("amount", amount.to_string()),
                ("currency", currency.to_string()),
                ("payment_method_types[]", "card".to_string()),
            ])
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !response.status().is_success() {
            return Err(format!(
                "payment provider rejected intent creation: {}",
                response.status()
            ));
        }

        let body = response
            .json::<PaymentIntentBody>()
            .await
            .map_err(|e| e.to_string())?;

        Ok(body.client_secret)
    }
}

// 3. The Mock Implementation (For Unit Tests)
/// MockPaymentGateway
///
/// A mock implementation of `PaymentGateway` used exclusively for unit and
/// integration testing. This allows us to test the payment-intent handler logic
/// without a network connection to the provider, isolating the test boundary.
#[derive(Clone)]
pub struct MockPaymentGateway {
    /// When true, all operations return a simulated failure.
    pub should_fail: bool,
}

impl MockPaymentGateway {
    pub fn new() -> Self {
        Self { should_fail: false }
    }

    pub fn new_failing() -> Self {
        Self { should_fail: true }
    }
}

impl Default for MockPaymentGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_payment_intent(&self, amount: i64, currency: &str) -> Result<String, String> {
        if self.should_fail {
            return Err("Mock Payment Error: Simulation requested".to_string());
        }

        // Deterministic secret so tests can assert on the amount that was forwarded.
        Ok(format!("pi_mock_{}_{}_secret_test", amount, currency))
    }
}

/// PaymentState
///
/// The concrete type used to share the payment gateway access across the application state.
pub type PaymentState = Arc<dyn PaymentGateway>;
