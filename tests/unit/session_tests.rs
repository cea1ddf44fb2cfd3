use super::*;
use serde_json::json;

#[test]
fn domain_ids_parse_case_insensitively() {
    assert_eq!(Domain::from_id("GDPR"), Some(Domain::Gdpr));
    assert_eq!(Domain::from_id("gdpr"), Some(Domain::Gdpr));
    assert_eq!(Domain::from_id("  Fda "), Some(Domain::Fda));
    assert_eq!(Domain::from_id("ccpa"), Some(Domain::Ccpa));
    assert_eq!(Domain::from_id("global"), Some(Domain::Global));
    assert_eq!(Domain::from_id("HIPAA"), None);
    assert_eq!(Domain::from_id(""), None);
}

#[test]
fn domain_cycle_covers_the_whole_set_and_wraps() {
    let mut seen = Vec::new();
    let mut domain = Domain::Gdpr;
    for _ in 0..DOMAINS.len() {
        seen.push(domain);
        domain = domain.next();
    }
    assert_eq!(seen, DOMAINS.to_vec());
    assert_eq!(domain, Domain::Gdpr);
}

#[test]
fn only_the_global_workspace_is_unavailable() {
    assert!(Domain::Gdpr.is_available());
    assert!(Domain::Fda.is_available());
    assert!(Domain::Ccpa.is_available());
    assert!(!Domain::Global.is_available());
}

#[test]
fn set_active_domain_by_id_rejects_unknown_ids_without_switching() {
    let mut session = Session::default();
    session.set_active_domain(Domain::Fda);

    let err = session
        .set_active_domain_by_id("OSHA")
        .expect_err("unknown id should be rejected");
    assert_eq!(err, InvalidDomain("OSHA".to_string()));
    assert_eq!(session.active_domain(), Domain::Fda);

    session
        .set_active_domain_by_id("ccpa")
        .expect("known id should switch");
    assert_eq!(session.active_domain(), Domain::Ccpa);
}

#[test]
fn switching_domains_keeps_the_message_log() {
    let mut session = Session::default();
    session.append_message(Message::user("What is Article 83?"));
    session.append_message(Message::assistant("Administrative fines.", None));

    session.set_active_domain(Domain::Fda);

    assert_eq!(session.messages().len(), 2);
    assert_eq!(session.messages()[0].content, "What is Article 83?");
    assert_eq!(session.messages()[1].content, "Administrative fines.");
}

#[test]
fn append_message_is_safe_while_processing() {
    let mut session = Session::default();
    session.begin_processing(InFlightTurn {
        turn: 1,
        query: "q".to_string(),
        domain: Domain::Gdpr,
    });
    session.append_message(Message::assistant("mid-flight", None));
    assert_eq!(session.messages().len(), 1);
    assert!(session.is_processing());
}

#[test]
fn begin_processing_seeds_narration_and_end_clears_it() {
    let mut session = Session::default();
    assert!(!session.is_processing());
    assert!(session.progress_narration().is_empty());

    session.begin_processing(InFlightTurn {
        turn: 1,
        query: "q".to_string(),
        domain: Domain::Gdpr,
    });
    assert!(session.is_processing());
    assert_eq!(session.progress_narration(), INITIAL_NARRATION);
    assert_eq!(session.in_flight().map(|t| t.turn), Some(1));

    session.end_processing();
    assert!(!session.is_processing());
    assert!(session.progress_narration().is_empty());
    assert!(session.in_flight().is_none());
}

#[test]
fn narration_updates_are_ignored_while_idle() {
    let mut session = Session::default();
    session.set_progress_narration("Searching global databases...");
    assert!(session.progress_narration().is_empty());

    session.begin_processing(InFlightTurn {
        turn: 1,
        query: "q".to_string(),
        domain: Domain::Gdpr,
    });
    session.set_progress_narration("Searching global databases...");
    assert_eq!(session.progress_narration(), "Searching global databases...");
}

#[test]
fn turn_ids_are_monotonic() {
    let mut session = Session::default();
    assert_eq!(session.next_turn_id(), 1);
    assert_eq!(session.next_turn_id(), 2);
    assert_eq!(session.next_turn_id(), 3);
}

#[test]
fn annex_parses_typed_fields_from_a_full_payload() {
    let payload = json!({
        "summary": "Article 83 concerns administrative fines.",
        "risk_level": "HIGH",
        "confidence_score": 0.8,
        "reasoning_map": [
            {
                "fact": "Processing without a legal basis",
                "legal_meaning": "Infringement of basic principles",
                "subsection": "Art 83(5)(a)",
                "justification": "Basic-principle infringements carry the higher fine tier."
            }
        ]
    });
    let annex = AdvisoryAnnex::from_payload(&payload);
    assert_eq!(annex.risk_level.as_deref(), Some("HIGH"));
    assert_eq!(annex.confidence_score, Some(0.8));
    assert_eq!(annex.reasoning_map.len(), 1);
    assert_eq!(annex.reasoning_map[0].subsection, "Art 83(5)(a)");
    assert_eq!(annex.raw, payload);
}

#[test]
fn annex_tolerates_missing_and_mistyped_fields() {
    let empty = AdvisoryAnnex::from_payload(&json!({"summary": "text only"}));
    assert!(empty.risk_level.is_none());
    assert!(empty.confidence_score.is_none());
    assert!(empty.reasoning_map.is_empty());

    let mistyped = AdvisoryAnnex::from_payload(&json!({
        "risk_level": 3,
        "confidence_score": "high",
        "reasoning_map": "not a list"
    }));
    assert!(mistyped.risk_level.is_none());
    assert!(mistyped.confidence_score.is_none());
    assert!(mistyped.reasoning_map.is_empty());
}

#[test]
fn reasoning_steps_default_absent_fields_to_empty() {
    let annex = AdvisoryAnnex::from_payload(&json!({
        "reasoning_map": [{"fact": "only a fact"}]
    }));
    assert_eq!(annex.reasoning_map.len(), 1);
    assert_eq!(annex.reasoning_map[0].fact, "only a fact");
    assert!(annex.reasoning_map[0].legal_meaning.is_empty());
    assert!(annex.reasoning_map[0].justification.is_empty());
}

#[test]
fn response_excerpt_truncates_long_answers() {
    let short = response_excerpt("brief answer");
    assert_eq!(short, "brief answer");

    let long_input = "x".repeat(80);
    let excerpt = response_excerpt(&long_input);
    assert_eq!(excerpt.chars().count(), 53);
    assert!(excerpt.ends_with("..."));
}

#[test]
fn latest_annex_skips_user_messages_and_plain_answers() {
    let mut session = Session::default();
    assert!(session.latest_annex().is_none());

    let annex = AdvisoryAnnex::from_payload(&json!({"risk_level": "LOW"}));
    session.append_message(Message::user("first"));
    session.append_message(Message::assistant("annotated", Some(annex)));
    session.append_message(Message::user("second"));
    session.append_message(Message::assistant("Connection Error: offline", None));

    let latest = session.latest_annex().expect("annex should be found");
    assert_eq!(latest.risk_level.as_deref(), Some("LOW"));
}
