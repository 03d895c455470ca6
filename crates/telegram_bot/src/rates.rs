//! HTTP client for the currency-rate provider (exchangerate.host shapes).
//!
//! Every failure mode here — transport error, explicit `success: false`,
//! payload that decodes but carries no usable number — surfaces as a
//! distinct [`RateError`] variant so callers can log them apart, but they
//! all map to the same recovery: the stored-rate fallback or manual entry.

use std::collections::HashMap;

use reqwest::Client;
use serde::Deserialize;

#[derive(Clone, Debug)]
pub(crate) struct RateClient {
    client: Client,
    base_url: String,
    access_key: String,
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum RateError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("provider failure: {0}")]
    Failure(String),
    #[error("malformed provider response")]
    Malformed,
}

#[derive(Debug, Deserialize)]
struct ConvertResponse {
    success: bool,
    result: Option<f64>,
    info: Option<ConvertInfo>,
    error: Option<ProviderError>,
}

#[derive(Debug, Deserialize)]
struct ConvertInfo {
    quote: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    info: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    success: bool,
    currencies: Option<HashMap<String, String>>,
}

impl RateClient {
    pub(crate) fn new(client: Client, base_url: String, access_key: String) -> Self {
        Self {
            client,
            base_url,
            access_key,
        }
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn convert_raw(
        &self,
        amount: f64,
        from: &str,
        to: &str,
    ) -> Result<ConvertResponse, RateError> {
        let raw = self
            .client
            .get(self.url("convert"))
            .query(&[
                ("access_key", self.access_key.as_str()),
                ("from", from),
                ("to", to),
            ])
            .query(&[("amount", amount)])
            .send()
            .await?
            .text()
            .await?;

        serde_json::from_str(&raw).map_err(|_| RateError::Malformed)
    }

    /// Converts `amount` from `from` to `to` using the live rate.
    pub(crate) async fn convert(&self, amount: f64, from: &str, to: &str) -> Result<f64, RateError> {
        let body = self.convert_raw(amount, from, to).await?;
        converted_amount(&body, amount)
    }

    /// Live unit rate for `1 from` in `to`.
    pub(crate) async fn unit_rate(&self, from: &str, to: &str) -> Result<f64, RateError> {
        let body = self.convert_raw(1.0, from, to).await?;
        quoted_rate(&body)
    }

    /// Currency code → display name, as the provider knows them.
    pub(crate) async fn currencies(&self) -> Result<HashMap<String, String>, RateError> {
        let raw = self
            .client
            .get(self.url("list"))
            .query(&[("access_key", self.access_key.as_str())])
            .send()
            .await?
            .text()
            .await?;

        let body: ListResponse = serde_json::from_str(&raw).map_err(|_| RateError::Malformed)?;
        if !body.success {
            return Err(RateError::Failure(provider_error(body_error(&raw))));
        }
        body.currencies.ok_or(RateError::Malformed)
    }
}

/// Picks the converted amount out of a `/convert` payload: the direct
/// `result` field first, then `info.quote * amount`.
fn converted_amount(body: &ConvertResponse, amount: f64) -> Result<f64, RateError> {
    check_success(body)?;
    body.result
        .or_else(|| body.info.as_ref().and_then(|i| i.quote).map(|q| q * amount))
        .filter(|v| v.is_finite() && *v > 0.0)
        .ok_or(RateError::Malformed)
}

/// Picks the unit rate out of a `/convert` payload for amount 1:
/// `info.quote` first, then the unit `result`.
fn quoted_rate(body: &ConvertResponse) -> Result<f64, RateError> {
    check_success(body)?;
    body.info
        .as_ref()
        .and_then(|i| i.quote)
        .or(body.result)
        .filter(|v| v.is_finite() && *v > 0.0)
        .ok_or(RateError::Malformed)
}

fn check_success(body: &ConvertResponse) -> Result<(), RateError> {
    if body.success {
        return Ok(());
    }
    Err(RateError::Failure(provider_error(
        body.error.as_ref().and_then(|e| e.info.clone()),
    )))
}

fn provider_error(info: Option<String>) -> String {
    info.unwrap_or_else(|| "unspecified provider error".to_string())
}

fn body_error(raw: &str) -> Option<String> {
    let body: ConvertResponse = serde_json::from_str(raw).ok()?;
    body.error.and_then(|e| e.info)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> ConvertResponse {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn convert_prefers_the_direct_result() {
        let body = parse(r#"{"success": true, "result": 550.25, "info": {"quote": 0.0110}}"#);
        assert_eq!(converted_amount(&body, 50_000.0).unwrap(), 550.25);
    }

    #[test]
    fn convert_falls_back_to_quote_times_amount() {
        let body = parse(r#"{"success": true, "info": {"quote": 0.011}}"#);
        assert_eq!(converted_amount(&body, 100.0).unwrap(), 1.1);
    }

    #[test]
    fn unit_rate_prefers_the_quote_field() {
        let body = parse(r#"{"success": true, "result": 0.0111, "info": {"quote": 0.0110}}"#);
        assert_eq!(quoted_rate(&body).unwrap(), 0.011);
    }

    #[test]
    fn unit_rate_accepts_a_result_only_payload() {
        let body = parse(r#"{"success": true, "result": 0.0111}"#);
        assert_eq!(quoted_rate(&body).unwrap(), 0.0111);
    }

    #[test]
    fn explicit_failure_carries_the_provider_message() {
        let body = parse(r#"{"success": false, "error": {"info": "access key invalid"}}"#);
        let err = quoted_rate(&body).unwrap_err();
        assert!(matches!(err, RateError::Failure(ref msg) if msg == "access key invalid"));
    }

    #[test]
    fn success_without_any_number_is_malformed() {
        let body = parse(r#"{"success": true}"#);
        assert!(matches!(quoted_rate(&body), Err(RateError::Malformed)));
        assert!(matches!(
            converted_amount(&body, 10.0),
            Err(RateError::Malformed)
        ));
    }

    #[test]
    fn non_positive_rates_are_rejected() {
        let body = parse(r#"{"success": true, "info": {"quote": 0.0}}"#);
        assert!(matches!(quoted_rate(&body), Err(RateError::Malformed)));
    }
}
