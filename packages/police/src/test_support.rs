//! Scripted in-memory transport for session tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::PoliceApiError;
use crate::transport::HttpTransport;

/// A request seen by [`ScriptedTransport`].
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub url: String,
    pub params: Vec<(String, String)>,
    pub timeout: Duration,
    pub at: Instant,
}

/// Replays a fixed list of responses, one per call, and records each call.
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<serde_json::Value, PoliceApiError>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedTransport {
    pub fn new(responses: Vec<Result<serde_json::Value, PoliceApiError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn server_error() -> PoliceApiError {
        PoliceApiError::Status {
            status: 500,
            url: "https://data.police.uk/api/crimes-street/all-crime".to_string(),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Time elapsed between consecutive calls.
    pub fn gaps(&self) -> Vec<Duration> {
        self.calls()
            .windows(2)
            .map(|pair| pair[1].at.duration_since(pair[0].at))
            .collect()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn get_json(
        &self,
        url: &str,
        params: &[(&str, String)],
        timeout: Duration,
    ) -> Result<serde_json::Value, PoliceApiError> {
        self.calls.lock().unwrap().push(RecordedCall {
            url: url.to_string(),
            params: params
                .iter()
                .map(|(k, v)| ((*k).to_string(), v.clone()))
                .collect(),
            timeout,
            at: Instant::now(),
        });

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("ScriptedTransport ran out of responses")
    }
}
