use anyhow::Context;
use axum::async_trait;
use serde::Deserialize;

/// External payment processor: charge an amount against a client-side
/// card token. One call, no retries; failures surface to the caller.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn charge(
        &self,
        amount_cents: i64,
        description: &str,
        source: &str,
    ) -> anyhow::Result<String>;
}

/// Stripe charges API over plain HTTPS form posts.
pub struct StripeGateway {
    http: reqwest::Client,
    api_base: String,
    secret_key: String,
}

impl StripeGateway {
    pub fn new(api_base: &str, secret_key: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            secret_key: secret_key.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChargeResponse {
    status: String,
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn charge(
        &self,
        amount_cents: i64,
        description: &str,
        source: &str,
    ) -> anyhow::Result<String> {
        let amount = amount_cents.to_string();
        let form = [
            ("amount", amount.as_str()),
            ("currency", "eur"),
            ("description", description),
            ("source", source),
        ];

        let resp = self
            .http
            .post(format!("{}/v1/charges", self.api_base))
            .basic_auth(&self.secret_key, None::<&str>)
            .form(&form)
            .send()
            .await
            .context("stripe charge request")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("stripe rejected charge ({}): {}", status, body);
        }

        let parsed: ChargeResponse = resp.json().await.context("stripe charge response")?;
        Ok(parsed.status)
    }
}

/// Major currency units to cents, the unit the charges API expects.
pub fn amount_to_cents(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_major_units_to_cents() {
        assert_eq!(amount_to_cents(12.0), 1200);
        assert_eq!(amount_to_cents(0.99), 99);
        assert_eq!(amount_to_cents(19.99), 1999);
    }

    #[test]
    fn charge_response_deserializes_status() {
        let parsed: ChargeResponse =
            serde_json::from_str(r#"{"id":"ch_1","status":"succeeded","amount":1200}"#).unwrap();
        assert_eq!(parsed.status, "succeeded");
    }
}
