use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Narration label seeded the moment a turn begins, before the staged
/// phases take over.
pub const INITIAL_NARRATION: &str = "Initializing agent...";

const AUDIT_EXCERPT_CHARS: usize = 50;

/// The closed set of selectable regulatory domains, in switcher order.
pub const DOMAINS: [Domain; 4] = [Domain::Gdpr, Domain::Fda, Domain::Ccpa, Domain::Global];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    Gdpr,
    Fda,
    Ccpa,
    /// Aggregate cross-jurisdiction workspace. Selectable, but submissions
    /// are refused while it is marked unavailable.
    Global,
}

impl Domain {
    pub fn from_id(id: &str) -> Option<Self> {
        match id.trim().to_ascii_uppercase().as_str() {
            "GDPR" => Some(Self::Gdpr),
            "FDA" => Some(Self::Fda),
            "CCPA" => Some(Self::Ccpa),
            "GLOBAL" => Some(Self::Global),
            _ => None,
        }
    }

    pub fn id(self) -> &'static str {
        match self {
            Self::Gdpr => "GDPR",
            Self::Fda => "FDA",
            Self::Ccpa => "CCPA",
            Self::Global => "GLOBAL",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Gdpr => "GDPR (EU)",
            Self::Fda => "FDA (US)",
            Self::Ccpa => "CCPA (CA)",
            Self::Global => "Global (aggregate)",
        }
    }

    pub fn is_available(self) -> bool {
        !matches!(self, Self::Global)
    }

    pub fn next(self) -> Self {
        match self {
            Self::Gdpr => Self::Fda,
            Self::Fda => Self::Ccpa,
            Self::Ccpa => Self::Global,
            Self::Global => Self::Gdpr,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown compliance domain id: {0}")]
pub struct InvalidDomain(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// One entry in the conversation log. `role` and `content` are fixed at
/// creation; the log itself is append-only for the life of the session.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub annex: Option<AdvisoryAnnex>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            annex: None,
        }
    }

    pub fn assistant(content: impl Into<String>, annex: Option<AdvisoryAnnex>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            annex,
        }
    }
}

/// Structured fields the backend may attach to an answer. Every field is
/// optional on the wire; the raw payload is kept alongside the typed
/// extractions so the renderer can surface anything the backend sent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdvisoryAnnex {
    pub risk_level: Option<String>,
    pub confidence_score: Option<f64>,
    pub reasoning_map: Vec<ReasoningStep>,
    pub raw: Value,
}

impl AdvisoryAnnex {
    pub fn from_payload(payload: &Value) -> Self {
        let risk_level = payload
            .get("risk_level")
            .and_then(Value::as_str)
            .map(ToString::to_string);
        let confidence_score = payload.get("confidence_score").and_then(Value::as_f64);
        let reasoning_map = payload
            .get("reasoning_map")
            .and_then(Value::as_array)
            .map(|steps| {
                steps
                    .iter()
                    .filter_map(|step| serde_json::from_value(step.clone()).ok())
                    .collect()
            })
            .unwrap_or_default();
        Self {
            risk_level,
            confidence_score,
            reasoning_map,
            raw: payload.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReasoningStep {
    pub fact: String,
    pub legal_meaning: String,
    pub subsection: String,
    pub justification: String,
}

/// The turn currently awaiting its answer. Domain and query are captured at
/// submission time; switching domains mid-flight does not touch them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InFlightTurn {
    pub turn: u64,
    pub query: String,
    pub domain: Domain,
}

/// One governance-vault record, written when a turn settles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    pub query: String,
    pub domain: Domain,
    pub logged_at_epoch_secs: u64,
    pub response_excerpt: String,
}

pub fn response_excerpt(content: &str) -> String {
    let excerpt: String = content.chars().take(AUDIT_EXCERPT_CHARS).collect();
    if content.chars().count() > AUDIT_EXCERPT_CHARS {
        format!("{excerpt}...")
    } else {
        excerpt
    }
}

pub fn now_epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Process-local conversation state. Created empty at startup, mutated only
/// through the operations below, discarded when the session ends.
#[derive(Debug)]
pub struct Session {
    messages: Vec<Message>,
    draft_input: String,
    is_processing: bool,
    progress_narration: String,
    active_domain: Domain,
    in_flight: Option<InFlightTurn>,
    audit_log: Vec<AuditEntry>,
    turn_seq: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            messages: Vec::new(),
            draft_input: String::new(),
            is_processing: false,
            progress_narration: String::new(),
            active_domain: Domain::Gdpr,
            in_flight: None,
            audit_log: Vec::new(),
            turn_seq: 0,
        }
    }
}

impl Session {
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn append_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn draft_input(&self) -> &str {
        &self.draft_input
    }

    pub fn set_draft_input(&mut self, text: impl Into<String>) {
        self.draft_input = text.into();
    }

    pub fn is_processing(&self) -> bool {
        self.is_processing
    }

    pub fn progress_narration(&self) -> &str {
        &self.progress_narration
    }

    pub fn set_progress_narration(&mut self, label: impl Into<String>) {
        if !self.is_processing {
            return;
        }
        self.progress_narration = label.into();
    }

    pub fn active_domain(&self) -> Domain {
        self.active_domain
    }

    /// Switching domains changes routing for future turns only; the message
    /// log is untouched.
    pub fn set_active_domain(&mut self, domain: Domain) {
        self.active_domain = domain;
    }

    pub fn set_active_domain_by_id(&mut self, id: &str) -> Result<(), InvalidDomain> {
        match Domain::from_id(id) {
            Some(domain) => {
                self.active_domain = domain;
                Ok(())
            }
            None => Err(InvalidDomain(id.trim().to_string())),
        }
    }

    pub fn next_turn_id(&mut self) -> u64 {
        self.turn_seq = self.turn_seq.saturating_add(1);
        self.turn_seq
    }

    pub fn begin_processing(&mut self, turn: InFlightTurn) {
        self.is_processing = true;
        self.progress_narration = INITIAL_NARRATION.to_string();
        self.in_flight = Some(turn);
    }

    pub fn end_processing(&mut self) {
        self.is_processing = false;
        self.progress_narration.clear();
        self.in_flight = None;
    }

    pub fn in_flight(&self) -> Option<&InFlightTurn> {
        self.in_flight.as_ref()
    }

    pub fn audit_log(&self) -> &[AuditEntry] {
        &self.audit_log
    }

    pub fn append_audit_entry(&mut self, entry: AuditEntry) {
        self.audit_log.push(entry);
    }

    pub fn latest_annex(&self) -> Option<&AdvisoryAnnex> {
        self.messages
            .iter()
            .rev()
            .find_map(|message| message.annex.as_ref())
    }
}

#[cfg(test)]
#[path = "../tests/unit/session_tests.rs"]
mod tests;
