//! Shared fixtures for integration tests.

#![allow(dead_code)]

pub mod mock_server;

use async_trait::async_trait;
use lifeguard_ai::drivers::{GenerateContentRequest, GenerateContentResponse};
use lifeguard_ai::transport::GenerateEndpoint;
use lifeguard_ai::{Error, Result};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub const FIRE_JSON: &str = r#"{"type":"Fire or Smoke","dangerLevel":"HIGH","actions":["Evacuate","Call emergency services"],"warning":"Stay low under smoke","reasoning":"Visible flames"}"#;

/// One scripted endpoint reply.
#[derive(Debug, Clone)]
pub enum Step {
    /// Google-style error envelope with this HTTP status.
    Status(u16),
    /// Remote failure with an explicit status, provider class and message.
    Remote(u16, &'static str, &'static str),
    /// RPC failure with a numeric code.
    Rpc(i32, &'static str),
    /// Model text.
    Text(&'static str),
}

/// In-memory endpoint replaying a fixed script; the last step repeats once the script runs out.
pub struct ScriptedEndpoint {
    steps: Mutex<VecDeque<Step>>,
    last: Step,
    calls: AtomicUsize,
    requests: Mutex<Vec<GenerateContentRequest>>,
}

impl ScriptedEndpoint {
    pub fn new(steps: Vec<Step>) -> Self {
        let last = steps.last().cloned().unwrap_or(Step::Text(""));
        Self {
            steps: Mutex::new(steps.into()),
            last,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn always(step: Step) -> Self {
        Self::new(vec![step])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<GenerateContentRequest> {
        self.requests.lock().unwrap().clone()
    }
}

fn status_class(status: u16) -> &'static str {
    match status {
        400 => "INVALID_ARGUMENT",
        401 => "UNAUTHENTICATED",
        403 => "PERMISSION_DENIED",
        429 => "RESOURCE_EXHAUSTED",
        503 => "UNAVAILABLE",
        _ => "INTERNAL",
    }
}

#[async_trait]
impl GenerateEndpoint for ScriptedEndpoint {
    async fn generate_content(
        &self,
        req: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(req.clone());
        let step = self
            .steps
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.last.clone());
        match step {
            Step::Status(status) => Err(Error::Remote {
                status,
                class: status_class(status).to_string(),
                message: match status {
                    401 => "Request had invalid authentication credentials.".to_string(),
                    503 => "The model is overloaded. Please try again later.".to_string(),
                    _ => format!("upstream returned {}", status),
                },
            }),
            Step::Remote(status, class, message) => Err(Error::Remote {
                status,
                class: class.to_string(),
                message: message.to_string(),
            }),
            Step::Rpc(code, message) => Err(Error::Rpc {
                code,
                message: message.to_string(),
            }),
            Step::Text(text) => Ok(GenerateContentResponse::from_text(text)),
        }
    }
}
