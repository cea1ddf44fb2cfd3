use super::*;
use crate::session::{AdvisoryAnnex, AuditEntry, Domain, InFlightTurn, Message};
use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::buffer::Buffer;
use serde_json::json;

fn render_text(app: &App, width: u16, height: u16) -> String {
    let backend = TestBackend::new(width, height);
    let mut terminal = Terminal::new(backend).expect("test terminal should initialize");
    let theme = Theme::default();
    terminal
        .draw(|frame| render(frame, app, &theme))
        .expect("render should succeed");
    buffer_to_string(terminal.backend().buffer())
}

fn buffer_to_string(buffer: &Buffer) -> String {
    let mut text = String::new();
    for y in 0..buffer.area.height {
        for x in 0..buffer.area.width {
            text.push_str(buffer[(x, y)].symbol());
        }
        text.push('\n');
    }
    text
}

fn in_flight(turn: u64) -> InFlightTurn {
    InFlightTurn {
        turn,
        query: "q".to_string(),
        domain: Domain::Gdpr,
    }
}

#[test]
fn render_shows_both_panes_and_the_active_domain() {
    let app = App::default();
    let text = render_text(&app, 120, 30);
    assert!(text.contains("Agent Chat"));
    assert!(text.contains("Governance Vault"));
    assert!(text.contains("Domain: GDPR (EU)"));
    assert!(text.contains("Ctrl+N domain"));
}

#[test]
fn empty_sessions_show_starter_prompts() {
    let app = App::default();
    let text = render_text(&app, 120, 30);
    assert!(text.contains("Ask a compliance question to get started."));
    assert!(text.contains("data breach under GDPR"));
}

#[test]
fn messages_render_with_role_labels() {
    let mut app = App::default();
    app.session_mut()
        .append_message(Message::user("What is Article 83?"));
    app.session_mut()
        .append_message(Message::assistant("Administrative fines.", None));

    let text = render_text(&app, 120, 30);
    assert!(text.contains("You: What is Article 83?"));
    assert!(text.contains("Agent: Administrative fines."));
    assert!(!text.contains("Ask a compliance question to get started."));
}

#[test]
fn processing_turns_show_the_working_bubble_and_status_dots() {
    let mut app = App::default();
    app.session_mut()
        .append_message(Message::user("What is Article 83?"));
    app.session_mut().begin_processing(in_flight(1));
    app.session_mut()
        .set_progress_narration("Reading source material...");

    let text = render_text(&app, 120, 30);
    assert!(text.contains("Agent is thinking"));
    assert!(text.contains("Reading source material..."));
    assert!(text.contains("Agent working"));
}

#[test]
fn annex_badges_follow_the_assistant_message() {
    let mut app = App::default();
    let annex = AdvisoryAnnex::from_payload(&json!({
        "risk_level": "high",
        "confidence_score": 0.8
    }));
    app.session_mut().append_message(Message::user("q"));
    app.session_mut()
        .append_message(Message::assistant("X", Some(annex)));

    let text = render_text(&app, 120, 30);
    assert!(text.contains("Risk: HIGH | Confidence: 80%"));
}

#[test]
fn vault_pane_shows_annex_detail_and_audit_entries() {
    let mut app = App::default();
    let annex = AdvisoryAnnex::from_payload(&json!({
        "risk_level": "low",
        "confidence_score": 0.93,
        "reasoning_map": [{
            "fact": "IP address",
            "legal_meaning": "personal information",
            "subsection": "1798.140(v)(1)",
            "justification": "Enumerated identifier."
        }]
    }));
    app.session_mut().append_message(Message::user("q"));
    app.session_mut()
        .append_message(Message::assistant("X", Some(annex)));
    app.session_mut().append_audit_entry(AuditEntry {
        query: "Is an IP address personal information?".to_string(),
        domain: Domain::Ccpa,
        logged_at_epoch_secs: 45_296,
        response_excerpt: "X".to_string(),
    });

    let text = render_text(&app, 140, 40);
    assert!(text.contains("Latest advisory annex"));
    assert!(text.contains("Risk level: LOW"));
    assert!(text.contains("Confidence: 93%"));
    assert!(text.contains("Reasoning map:"));
    assert!(text.contains("[12:34:56]"));
    assert!(text.contains("CCPA"));
    assert!(text.contains("Q: Is an IP address personal"));
}

#[test]
fn vault_pane_reports_when_nothing_is_logged() {
    let app = App::default();
    let text = render_text(&app, 120, 30);
    assert!(text.contains("No advisory annex yet."));
    assert!(text.contains("No turns logged yet."));
}

#[test]
fn unavailable_domains_disable_the_input_affordance() {
    let mut app = App::default();
    app.session_mut().set_active_domain(Domain::Global);
    let text = render_text(&app, 120, 30);
    assert!(text.contains("Global (aggregate)"));
    assert!(text.contains("not yet available"));
}

#[test]
fn chat_title_tracks_the_selected_domain() {
    let mut app = App::default();
    app.session_mut().set_active_domain(Domain::Fda);
    let text = render_text(&app, 120, 30);
    assert!(text.contains("Agent Chat - FDA (US)"));
    assert!(text.contains("Domain: FDA (US)"));
}

#[test]
fn format_clock_wraps_at_midnight() {
    assert_eq!(format_clock(0), "00:00:00");
    assert_eq!(format_clock(45_296), "12:34:56");
    assert_eq!(format_clock(86_399), "23:59:59");
    assert_eq!(format_clock(86_400), "00:00:00");
}

#[test]
fn working_dots_animate_over_ticks() {
    let first = working_dots(0);
    let mut changed = false;
    for ticks in 1..12 {
        if working_dots(ticks) != first {
            changed = true;
        }
    }
    assert!(changed);
}

#[test]
fn risk_colors_map_severity_levels() {
    let theme = Theme::default();
    assert_eq!(risk_color("low", &theme), Color::Rgb(80, 190, 100));
    assert_eq!(risk_color("MEDIUM", &theme), Color::Rgb(235, 180, 60));
    assert_eq!(risk_color("high", &theme), Color::Rgb(225, 80, 80));
    assert_eq!(risk_color("critical", &theme), Color::Rgb(225, 80, 80));
    assert_eq!(risk_color("unheard-of", &theme), theme.muted_fg);
}

#[test]
fn input_box_metrics_caps_height_and_scrolls_past_the_cap() {
    let (height, scroll) = input_box_metrics(1, 0, 20);
    assert_eq!(height, 1 + TEXT_PADDING * 2);
    assert_eq!(scroll, 0);

    let (height, scroll) = input_box_metrics(9, 8, 20);
    assert_eq!(height, MAX_INPUT_TEXT_LINES + TEXT_PADDING * 2);
    assert!(scroll > 0);
}

#[test]
fn input_box_metrics_respects_small_available_height() {
    let (height, _) = input_box_metrics(4, 0, 2);
    assert_eq!(height, 2);
}

#[test]
fn pane_at_splits_clicks_between_chat_and_vault() {
    let screen = Rect::new(0, 0, 100, 30);
    assert_eq!(pane_at(screen, 0), Pane::Chat);
    assert_eq!(pane_at(screen, 40), Pane::Chat);
    assert_eq!(pane_at(screen, 70), Pane::Vault);
    assert_eq!(pane_at(screen, 99), Pane::Vault);
}

#[test]
fn chat_max_scroll_grows_with_history() {
    let screen = Rect::new(0, 0, 100, 20);
    let mut app = App::default();
    assert_eq!(chat_max_scroll(screen, &app), 0);

    for idx in 0..30 {
        app.session_mut()
            .append_message(Message::user(format!("question {idx}")));
        app.session_mut()
            .append_message(Message::assistant(format!("answer {idx}"), None));
    }
    assert!(chat_max_scroll(screen, &app) > 0);
}
