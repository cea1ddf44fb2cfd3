use crate::advisor::{AdvisorAdapter, AdvisorEvent};
use crate::app::App;
use crate::session::{AuditEntry, InFlightTurn, Message, now_epoch_secs, response_excerpt};

/// Why a submission did not start a turn. Refusals mutate nothing: no log
/// entries, no processing flag, and (except for consuming nothing) no draft
/// changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitRefusal {
    EmptyInput,
    DomainUnavailable,
    TurnInFlight,
}

/// One request/response cycle: validate, stage, transmit, commit. The
/// contract is that every started turn ends with exactly one terminal
/// assistant message and `is_processing` back at false.
pub trait AdvisoryTurnService {
    fn begin_turn(
        &self,
        app: &mut App,
        adapter: &AdvisorAdapter,
    ) -> Result<InFlightTurn, SubmitRefusal>;

    /// Commit one adapter event to the session. Returns true when the
    /// visible chat state changed.
    fn apply_advisor_event(&self, app: &mut App, event: AdvisorEvent) -> bool;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultAdvisoryTurnService;

impl AdvisoryTurnService for DefaultAdvisoryTurnService {
    fn begin_turn(
        &self,
        app: &mut App,
        adapter: &AdvisorAdapter,
    ) -> Result<InFlightTurn, SubmitRefusal> {
        if app.session().is_processing() {
            return Err(SubmitRefusal::TurnInFlight);
        }
        let domain = app.session().active_domain();
        if !domain.is_available() {
            return Err(SubmitRefusal::DomainUnavailable);
        }
        let Some(query) = app.consume_draft_trimmed() else {
            return Err(SubmitRefusal::EmptyInput);
        };

        let session = app.session_mut();
        session.append_message(Message::user(query.clone()));
        let turn = session.next_turn_id();
        let started = InFlightTurn {
            turn,
            query,
            domain,
        };
        session.begin_processing(started.clone());
        adapter.send_query(turn, started.query.clone(), domain);
        Ok(started)
    }

    fn apply_advisor_event(&self, app: &mut App, event: AdvisorEvent) -> bool {
        let session = app.session_mut();
        match event {
            AdvisorEvent::Narration { turn, label } => {
                let current = session.in_flight().is_some_and(|t| t.turn == turn);
                if !current {
                    return false;
                }
                session.set_progress_narration(label);
                true
            }
            AdvisorEvent::Settled { turn, outcome } => {
                let Some(in_flight) = session.in_flight().cloned() else {
                    return false;
                };
                if in_flight.turn != turn {
                    return false;
                }

                let message = match outcome {
                    Ok(answer) => Message::assistant(answer.content, Some(answer.annex)),
                    Err(err) => Message::assistant(format!("Connection Error: {err}"), None),
                };
                let excerpt = response_excerpt(&message.content);
                session.append_message(message);
                session.append_audit_entry(AuditEntry {
                    query: in_flight.query,
                    domain: in_flight.domain,
                    logged_at_epoch_secs: now_epoch_secs(),
                    response_excerpt: excerpt,
                });
                session.end_processing();
                true
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/services_tests.rs"]
mod tests;
