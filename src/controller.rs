use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{ debug, info, trace };

use crate::backend::AnalyzeBackend;
use crate::model::AnalysisResult;
use crate::validator;

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum ErrorCause {
    EmptyInput,
    NetworkFailure,
    ServerError,
    ParseFailure,
}

/// User-visible failure of one submission. These are terminal view states,
/// not process errors; the user retries by submitting again.
#[derive(PartialEq, Clone, Debug)]
pub struct ErrorInfo {
    pub message: String,
    pub cause: ErrorCause,
}

impl ErrorInfo {
    pub fn network(message: String) -> Self {
        let message = if message.is_empty() {
            "network request failed".to_string()
        } else {
            message
        };
        ErrorInfo { message, cause: ErrorCause::NetworkFailure }
    }

    /// Non-2xx response. The message comes from the body's `detail` field
    /// when one can be parsed out, otherwise a generic status line.
    pub fn server(status: u16, body: &str) -> Self {
        let detail = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("detail").and_then(|d| d.as_str().map(|s| s.to_string())));
        let message = detail.unwrap_or_else(|| format!("Request failed with status {}", status));
        ErrorInfo { message, cause: ErrorCause::ServerError }
    }

    pub fn parse(err: serde_json::Error) -> Self {
        ErrorInfo {
            message: format!("cannot parse analysis response: {}", err),
            cause: ErrorCause::ParseFailure,
        }
    }
}

/// Lifecycle of the single current request. One writer (the controller),
/// any number of readers through current()/subscribe().
#[derive(Clone, Debug)]
pub enum RequestState {
    Idle,
    Validating,
    InFlight,
    Succeeded(AnalysisResult),
    Failed(ErrorInfo),
}

pub struct RequestController {
    backend: Arc<dyn AnalyzeBackend>,
    // monotonic submission token, compared at resolution time so that a
    // slow superseded request can never clobber a newer outcome
    seq: Mutex<u64>,
    state_tx: watch::Sender<RequestState>,
}

impl RequestController {
    pub fn new(backend: Arc<dyn AnalyzeBackend>) -> Self {
        let (state_tx, _) = watch::channel(RequestState::Idle);
        RequestController { backend, seq: Mutex::new(0), state_tx }
    }

    pub fn current(&self) -> RequestState {
        self.state_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<RequestState> {
        self.state_tx.subscribe()
    }

    /// Runs one submission to completion. The InFlight transition happens
    /// synchronously before the network call so readers never see a stale
    /// result while a newer request is pending.
    pub async fn submit(&self, raw: &str) {
        self.state_tx.send_replace(RequestState::Validating);
        let addr = match validator::validate(raw) {
            Ok(v) => v,
            Err(e) => {
                self.fail_validation(e);
                return;
            }
        };
        let token = self.begin(&addr);
        let outcome = self.backend.analyze(&addr).await;
        self.resolve(token, outcome);
    }

    fn begin(&self, addr: &str) -> u64 {
        let mut seq = self.seq.lock();
        *seq += 1;
        info!(token = *seq, "analyzing {}", addr);
        self.state_tx.send_replace(RequestState::InFlight);
        *seq
    }

    // rejected input still supersedes whatever was pending, so the token
    // advances here too
    fn fail_validation(&self, e: ErrorInfo) {
        let mut seq = self.seq.lock();
        *seq += 1;
        debug!(token = *seq, "rejected input: {}", e.message);
        self.state_tx.send_replace(RequestState::Failed(e));
    }

    fn resolve(&self, token: u64, outcome: Result<AnalysisResult, ErrorInfo>) {
        let seq = self.seq.lock();
        if token != *seq {
            trace!(token, current = *seq, "discarding response of superseded request");
            return;
        }
        let next = match outcome {
            Ok(result) => {
                debug!(token, "request succeeded for {}", result.ip);
                RequestState::Succeeded(result)
            }
            Err(e) => {
                debug!(token, "request failed: {}", e.message);
                RequestState::Failed(e)
            }
        };
        self.state_tx.send_replace(next);
    }
}
