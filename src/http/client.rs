//! Shared HTTP client construction and response decoding.
//!
//! Every outbound client (metadata, transcript, AI) is built here so they agree
//! on connect timeout, user-agent, compression and proxy handling.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use reqwest::{Client, ClientBuilder, Proxy, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{trace, warn};

use crate::user_agent;

use super::error::ApiError;

const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Builds an HTTP client with the shared project policy.
///
/// `request_timeout` bounds each whole request, including the body read.
///
/// # Errors
///
/// Returns [`ApiError::ClientBuild`] when the client cannot be constructed.
pub fn build_http_client(request_timeout: Duration) -> Result<Client, ApiError> {
    match try_build_client(request_timeout, false) {
        Ok(client) => Ok(client),
        Err(BuildClientFailure::Panic) => {
            // Some sandboxed environments panic when querying system proxy
            // settings. Retry with env proxies only.
            warn!("HTTP client hit system proxy panic; using env-proxy fallback builder");
            match try_build_client(request_timeout, true) {
                Ok(client) => Ok(client),
                Err(BuildClientFailure::Panic) => Err(ApiError::client_build(
                    "builder panicked while initializing networking",
                )),
                Err(BuildClientFailure::Build(error)) => {
                    Err(ApiError::client_build(error.to_string()))
                }
            }
        }
        Err(BuildClientFailure::Build(error)) => Err(ApiError::client_build(error.to_string())),
    }
}

enum BuildClientFailure {
    Panic,
    Build(reqwest::Error),
}

fn try_build_client(
    request_timeout: Duration,
    disable_system_proxy_lookup: bool,
) -> Result<Client, BuildClientFailure> {
    catch_unwind(AssertUnwindSafe(move || {
        let mut builder = base_builder(request_timeout);
        if disable_system_proxy_lookup {
            builder = apply_env_proxy_fallback(builder.no_proxy());
        }
        builder.build().map_err(BuildClientFailure::Build)
    }))
    .map_err(|_| BuildClientFailure::Panic)?
}

fn base_builder(request_timeout: Duration) -> ClientBuilder {
    Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .timeout(request_timeout)
        .user_agent(user_agent::default_user_agent())
        .gzip(true)
}

fn apply_env_proxy_fallback(mut builder: ClientBuilder) -> ClientBuilder {
    if let Some(proxy) = env_proxy_for_scheme("https")
        && let Ok(resolved) = Proxy::https(&proxy)
    {
        builder = builder.proxy(resolved);
    }
    if let Some(proxy) = env_proxy_for_scheme("http")
        && let Ok(resolved) = Proxy::http(&proxy)
    {
        builder = builder.proxy(resolved);
    }
    builder
}

fn env_proxy_for_scheme(scheme: &str) -> Option<String> {
    match scheme {
        "https" => find_first_proxy_var(&["HTTPS_PROXY", "https_proxy", "ALL_PROXY", "all_proxy"]),
        "http" => find_first_proxy_var(&["HTTP_PROXY", "http_proxy", "ALL_PROXY", "all_proxy"]),
        _ => None,
    }
}

fn find_first_proxy_var(names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| {
        std::env::var(name)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    })
}

/// Sends `request` and returns the body text of a 2xx response.
///
/// `url` is the label used in errors. Callers pass the endpoint without its
/// query string so API keys never reach logs.
///
/// # Errors
///
/// Returns [`ApiError::HttpStatus`] for non-2xx responses (with the API's
/// reason code when the error body carries one) and [`ApiError::Network`] or
/// [`ApiError::Timeout`] for transport failures.
pub async fn send_text(request: RequestBuilder, url: &str) -> Result<String, ApiError> {
    let response = request
        .send()
        .await
        .map_err(|e| ApiError::network(url, e))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| ApiError::network(url, e))?;

    if !status.is_success() {
        let reason = error_reason(&body);
        trace!(url, status = status.as_u16(), reason = ?reason, "non-success response");
        return Err(ApiError::http_status_with_reason(
            url,
            status.as_u16(),
            reason,
        ));
    }

    Ok(body)
}

/// Sends `request` and decodes a 2xx JSON body into `T`.
///
/// # Errors
///
/// Everything [`send_text`] returns, plus [`ApiError::Decode`] when the body
/// does not match `T`.
pub async fn send_json<T: DeserializeOwned>(
    request: RequestBuilder,
    url: &str,
) -> Result<T, ApiError> {
    let body = send_text(request, url).await?;
    serde_json::from_str(&body).map_err(|e| ApiError::decode(url, e.to_string()))
}

/// Extracts the machine-readable reason from a Google-style error body:
/// `{"error": {"errors": [{"reason": "quotaExceeded"}]}}`.
fn error_reason(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let error = value.get("error")?;
    error
        .get("errors")
        .and_then(Value::as_array)
        .and_then(|errors| errors.first())
        .and_then(|first| first.get("reason"))
        .or_else(|| error.get("status"))
        .and_then(Value::as_str)
        .map(str::to_string)
}
