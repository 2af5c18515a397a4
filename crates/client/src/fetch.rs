use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::task::AbortHandle;

use crate::error::FetchError;

/// Retry/backoff configuration for a fetcher.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts per fetch, including the first.
    pub max_attempts: u32,
    /// Backoff before attempt n is `base_delay * 2^(n-1)`.
    pub base_delay: Duration,
    /// Per-attempt request timeout.
    pub request_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(200),
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// Data fetcher with bounded retry and last-started-wins cancellation.
///
/// Cheap to clone; clones share the in-flight table, so cancellation works
/// across clones fetching the same logical resource.
#[derive(Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
    policy: RetryPolicy,
    in_flight: Arc<Mutex<HashMap<String, (u64, AbortHandle)>>>,
    generation: Arc<AtomicU64>,
}

impl Fetcher {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            token: None,
            policy: RetryPolicy::default(),
            in_flight: Arc::new(Mutex::new(HashMap::new())),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Fetch a JSON resource.
    ///
    /// `resource` is the logical identity used for cancellation: starting a
    /// new fetch for the same resource aborts the in-flight one, whose caller
    /// observes [`FetchError::Cancelled`].
    pub async fn fetch_json(&self, resource: &str, path: &str) -> Result<Value, FetchError> {
        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;

        let client = self.client.clone();
        let url = format!("{}{}", self.base_url, path);
        let token = self.token.clone();
        let policy = self.policy.clone();

        let task =
            tokio::spawn(async move { fetch_with_retries(&client, &url, &token, &policy).await });

        // Register ourselves, aborting whatever was in flight for this
        // resource. The generation decides the winner, not registration
        // order: if a newer fetch got there first, this one is the stale
        // request and is the one cancelled.
        {
            let mut in_flight = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(loser) =
                register_fetch(&mut in_flight, resource, generation, task.abort_handle())
            {
                loser.abort();
            }
        }

        let outcome = task.await;

        // Deregister, but only if the entry is still ours.
        {
            let mut in_flight = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
            if in_flight.get(resource).is_some_and(|(g, _)| *g == generation) {
                in_flight.remove(resource);
            }
        }

        match outcome {
            Ok(result) => result,
            Err(join) if join.is_cancelled() => Err(FetchError::Cancelled),
            Err(join) => std::panic::resume_unwind(join.into_panic()),
        }
    }
}

/// Decide which fetch survives for a resource. Returns the abort handle of
/// the loser: the previously registered fetch when `generation` is newer, or
/// `handle` itself when a newer fetch is already registered.
fn register_fetch(
    in_flight: &mut HashMap<String, (u64, AbortHandle)>,
    resource: &str,
    generation: u64,
    handle: AbortHandle,
) -> Option<AbortHandle> {
    match in_flight.get(resource) {
        Some((existing, _)) if *existing > generation => Some(handle),
        _ => in_flight
            .insert(resource.to_string(), (generation, handle))
            .map(|(_, previous)| previous),
    }
}

async fn fetch_with_retries(
    client: &reqwest::Client,
    url: &str,
    token: &Option<String>,
    policy: &RetryPolicy,
) -> Result<Value, FetchError> {
    let mut last_err = FetchError::Network("no attempts made".to_string());

    for attempt in 1..=policy.max_attempts.max(1) {
        if attempt > 1 {
            let backoff = policy.base_delay * 2u32.pow(attempt - 2);
            tracing::debug!(%url, attempt, ?backoff, "retrying fetch");
            tokio::time::sleep(backoff).await;
        }

        match single_attempt(client, url, token, policy.request_timeout).await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() => last_err = err,
            Err(err) => return Err(err),
        }
    }

    Err(last_err)
}

async fn single_attempt(
    client: &reqwest::Client,
    url: &str,
    token: &Option<String>,
    request_timeout: Duration,
) -> Result<Value, FetchError> {
    let mut request = client.get(url).timeout(request_timeout);
    if let Some(token) = token {
        request = request.bearer_auth(token);
    }

    let response = request.send().await.map_err(|e| {
        if e.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Network(e.to_string())
        }
    })?;

    let status = response.status();
    if status.is_success() {
        return response
            .json::<Value>()
            .await
            .map_err(|e| FetchError::Network(e.to_string()));
    }

    // Error bodies are { "error": code, "message": text }; tolerate absence.
    let body: Value = response.json().await.unwrap_or(Value::Null);
    let code = body["error"].as_str().unwrap_or_default().to_string();
    let message = body["message"]
        .as_str()
        .unwrap_or("request failed")
        .to_string();

    if status.as_u16() == 401 {
        return Err(FetchError::Unauthenticated);
    }
    if code == "needs_setup" {
        return Err(FetchError::NeedsSetup);
    }
    if status.is_server_error() {
        return Err(FetchError::Server {
            status: status.as_u16(),
            message,
        });
    }
    Err(FetchError::Rejected {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending_handle() -> AbortHandle {
        tokio::spawn(std::future::pending::<()>()).abort_handle()
    }

    #[tokio::test]
    async fn newer_generation_replaces_older() {
        let mut in_flight = HashMap::new();

        assert!(register_fetch(&mut in_flight, "wells", 1, pending_handle()).is_none());
        let loser = register_fetch(&mut in_flight, "wells", 2, pending_handle());

        assert!(loser.is_some());
        assert_eq!(in_flight["wells"].0, 2);
    }

    #[tokio::test]
    async fn older_generation_loses_even_when_it_registers_last() {
        let mut in_flight = HashMap::new();

        assert!(register_fetch(&mut in_flight, "wells", 2, pending_handle()).is_none());
        let loser = register_fetch(&mut in_flight, "wells", 1, pending_handle());

        // The straggler is the one cancelled; the newer fetch stays registered.
        assert!(loser.is_some());
        assert_eq!(in_flight["wells"].0, 2);
    }

    #[tokio::test]
    async fn distinct_resources_do_not_interfere() {
        let mut in_flight = HashMap::new();

        assert!(register_fetch(&mut in_flight, "wells", 1, pending_handle()).is_none());
        assert!(register_fetch(&mut in_flight, "owners", 2, pending_handle()).is_none());
        assert_eq!(in_flight.len(), 2);
    }
}
