use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::session::{AdvisoryAnnex, Domain};

pub const NARRATION_DWELL: Duration = Duration::from_millis(800);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct AdvisorConfig {
    /// Full URL of the chat operation, e.g. `http://127.0.0.1:8000/api/chat`.
    pub endpoint: String,
    pub request_timeout: Duration,
    pub narration_dwell: Duration,
    /// Headless callers skip the staged narration entirely.
    pub narrate: bool,
}

impl AdvisorConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            narration_dwell: NARRATION_DWELL,
            narrate: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AdvisorEvent {
    /// Cosmetic phase label. Carries the turn id so stale narration from a
    /// settled turn can be discarded.
    Narration { turn: u64, label: String },
    /// Terminal outcome of a turn. Sent exactly once per `send_query`.
    Settled {
        turn: u64,
        outcome: Result<AdvisoryAnswer, TurnError>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdvisoryAnswer {
    pub content: String,
    /// True when neither `summary` nor `response` was usable and `content`
    /// is a serialization of the whole payload.
    pub fallback_serialized: bool,
    pub annex: AdvisoryAnnex,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TurnError {
    #[error("could not reach the advisory service: {0}")]
    Transport(String),
    #[error("Server Error {status}: {detail}")]
    Protocol { status: u16, detail: String },
    #[error("unreadable response from the advisory service: {0}")]
    Malformed(String),
}

#[derive(Debug, Serialize)]
struct ChatRequestBody<'a> {
    query: &'a str,
    domain: &'a str,
}

/// Ordered extraction result for the backend's loosely-shaped payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractedText {
    Primary(String),
    FallbackSerialized(String),
}

pub struct AdvisorAdapter {
    config: AdvisorConfig,
    event_tx: Sender<AdvisorEvent>,
    event_rx: Receiver<AdvisorEvent>,
}

impl AdvisorAdapter {
    pub fn with_config(config: AdvisorConfig) -> Self {
        let (event_tx, event_rx) = mpsc::channel();
        Self {
            config,
            event_tx,
            event_rx,
        }
    }

    /// Issue the single outbound request for one turn. Narration runs on its
    /// own timer thread and never gates the request; the request thread
    /// always emits exactly one `Settled` event.
    pub fn send_query(&self, turn: u64, query: String, domain: Domain) {
        if self.config.narrate {
            let tx = self.event_tx.clone();
            let dwell = self.config.narration_dwell;
            let phases = narration_phases(domain);
            thread::spawn(move || {
                for label in phases {
                    if tx.send(AdvisorEvent::Narration { turn, label }).is_err() {
                        return;
                    }
                    thread::sleep(dwell);
                }
            });
        }

        let tx = self.event_tx.clone();
        let config = self.config.clone();
        thread::spawn(move || {
            let outcome = perform_chat_request(&config, &query, domain);
            let _ = tx.send(AdvisorEvent::Settled { turn, outcome });
        });
    }

    pub fn drain_events_limited(&self, max_events: usize) -> Vec<AdvisorEvent> {
        let mut events = Vec::new();
        if max_events == 0 {
            return events;
        }
        while events.len() < max_events {
            let Ok(event) = self.event_rx.try_recv() else {
                break;
            };
            events.push(event);
        }
        events
    }
}

pub fn narration_phases(domain: Domain) -> Vec<String> {
    vec![
        "Searching global databases...".to_string(),
        format!("Accessing {} repository...", domain.id()),
        "Reading source material...".to_string(),
        "Checking cross-references...".to_string(),
        "Formulating compliance advice...".to_string(),
    ]
}

fn perform_chat_request(
    config: &AdvisorConfig,
    query: &str,
    domain: Domain,
) -> Result<AdvisoryAnswer, TurnError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(config.request_timeout)
        .build()
        .map_err(|err| TurnError::Transport(err.to_string()))?;
    let response = client
        .post(&config.endpoint)
        .json(&ChatRequestBody {
            query,
            domain: domain.id(),
        })
        .send()
        .map_err(|err| TurnError::Transport(err.to_string()))?;

    let status = response.status();
    let body = response
        .text()
        .map_err(|err| TurnError::Transport(err.to_string()))?;
    if !status.is_success() {
        let detail = if body.trim().is_empty() {
            "No details provided".to_string()
        } else {
            body
        };
        return Err(TurnError::Protocol {
            status: status.as_u16(),
            detail,
        });
    }

    let payload: Value =
        serde_json::from_str(&body).map_err(|err| TurnError::Malformed(err.to_string()))?;
    Ok(answer_from_payload(&payload))
}

/// Try `summary`, then `response`, then fall back to serializing the whole
/// payload so the user always sees something.
pub fn extract_primary_text(payload: &Value) -> ExtractedText {
    for field in ["summary", "response"] {
        if let Some(text) = payload.get(field).and_then(Value::as_str)
            && !text.trim().is_empty()
        {
            return ExtractedText::Primary(text.to_string());
        }
    }
    ExtractedText::FallbackSerialized(payload.to_string())
}

fn answer_from_payload(payload: &Value) -> AdvisoryAnswer {
    let (content, fallback_serialized) = match extract_primary_text(payload) {
        ExtractedText::Primary(text) => (text, false),
        ExtractedText::FallbackSerialized(text) => (text, true),
    };
    AdvisoryAnswer {
        content,
        fallback_serialized,
        annex: AdvisoryAnnex::from_payload(payload),
    }
}

#[cfg(test)]
#[path = "../tests/unit/advisor_tests.rs"]
mod tests;
