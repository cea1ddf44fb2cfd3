use super::*;
use crate::session::{DOMAINS, Domain};

#[test]
fn typing_inserts_at_the_cursor() {
    let mut app = App::default();
    for c in "GDPR".chars() {
        app.input_char(c);
    }
    app.move_cursor_left();
    app.move_cursor_left();
    app.input_char('x');
    assert_eq!(app.session().draft_input(), "GDxPR");
}

#[test]
fn typing_handles_multibyte_characters() {
    let mut app = App::default();
    for c in "é§83".chars() {
        app.input_char(c);
    }
    assert_eq!(app.session().draft_input(), "é§83");
    app.backspace_input();
    app.backspace_input();
    assert_eq!(app.session().draft_input(), "é§");
}

#[test]
fn backspace_removes_before_the_cursor_and_stops_at_zero() {
    let mut app = App::default();
    for c in "abc".chars() {
        app.input_char(c);
    }
    app.move_cursor_left();
    app.backspace_input();
    assert_eq!(app.session().draft_input(), "ac");

    app.move_cursor_left();
    app.backspace_input();
    app.backspace_input();
    assert_eq!(app.session().draft_input(), "c");
}

#[test]
fn cursor_movement_clamps_to_the_draft_bounds() {
    let mut app = App::default();
    for c in "ab".chars() {
        app.input_char(c);
    }
    app.move_cursor_right();
    app.move_cursor_right();
    app.input_char('!');
    assert_eq!(app.session().draft_input(), "ab!");

    app.move_cursor_left();
    app.move_cursor_left();
    app.move_cursor_left();
    app.move_cursor_left();
    app.input_char('>');
    assert_eq!(app.session().draft_input(), ">ab!");
}

#[test]
fn cursor_moves_between_wrapped_lines() {
    let mut app = App::default();
    app.set_draft_text("hello world");

    // Width 6 wraps as "hello " / "world"; the cursor starts at the end.
    assert_eq!(app.draft_cursor_line_col(6).0, 1);
    app.move_cursor_up(6);
    assert_eq!(app.draft_cursor_line_col(6).0, 0);
    app.move_cursor_down(6);
    assert_eq!(app.draft_cursor_line_col(6).0, 1);
}

#[test]
fn pane_focus_toggles_between_chat_and_vault() {
    let mut app = App::default();
    assert_eq!(app.active_pane, Pane::Chat);
    app.next_pane();
    assert_eq!(app.active_pane, Pane::Vault);
    app.next_pane();
    assert_eq!(app.active_pane, Pane::Chat);
    app.prev_pane();
    assert_eq!(app.active_pane, Pane::Vault);
}

#[test]
fn cycling_walks_every_domain_and_wraps() {
    let mut app = App::default();
    let mut seen = vec![app.session().active_domain()];
    for _ in 1..DOMAINS.len() {
        app.cycle_domain();
        seen.push(app.session().active_domain());
    }
    assert_eq!(seen, DOMAINS.to_vec());
    app.cycle_domain();
    assert_eq!(app.session().active_domain(), Domain::Gdpr);
}

#[test]
fn consume_draft_trims_and_clears() {
    let mut app = App::default();
    app.set_draft_text("  What is Article 83?  ");
    assert_eq!(
        app.consume_draft_trimmed().as_deref(),
        Some("What is Article 83?")
    );
    assert!(app.session().draft_input().is_empty());
    assert_eq!(app.consume_draft_trimmed(), None);
}

#[test]
fn consume_draft_leaves_whitespace_only_drafts_alone() {
    let mut app = App::default();
    app.set_draft_text("   ");
    assert_eq!(app.consume_draft_trimmed(), None);
    assert_eq!(app.session().draft_input(), "   ");
}

#[test]
fn set_draft_text_places_the_cursor_at_the_end() {
    let mut app = App::default();
    app.set_draft_text("Art 83");
    app.input_char('?');
    assert_eq!(app.session().draft_input(), "Art 83?");
}

#[test]
fn submit_is_only_disabled_for_unavailable_domains() {
    let mut app = App::default();
    assert!(app.submit_disabled_reason().is_none());

    app.session_mut().set_active_domain(Domain::Global);
    let reason = app
        .submit_disabled_reason()
        .expect("global workspace should disable submissions");
    assert!(reason.contains("not yet available"));

    app.session_mut().set_active_domain(Domain::Ccpa);
    assert!(app.submit_disabled_reason().is_none());
}

#[test]
fn chat_scroll_clamps_to_bounds() {
    let mut app = App::default();
    app.scroll_chat_up();
    assert_eq!(app.chat_scroll(), 0);

    for _ in 0..5 {
        app.scroll_chat_down(3);
    }
    assert_eq!(app.chat_scroll(), 3);
    app.scroll_chat_up();
    assert_eq!(app.chat_scroll(), 2);
}

#[test]
fn vault_scroll_clamps_to_bounds() {
    let mut app = App::default();
    app.scroll_vault_up(5);
    assert_eq!(app.vault_scroll(), 0);

    app.scroll_vault_down(5, 7);
    app.scroll_vault_down(5, 7);
    assert_eq!(app.vault_scroll(), 7);
    app.scroll_vault_up(2);
    assert_eq!(app.vault_scroll(), 5);
}

#[test]
fn focused_pane_scrolling_targets_the_active_pane() {
    let mut app = App::default();
    app.scroll_focused_pane_down(4, 9);
    assert_eq!(app.chat_scroll(), 1);
    assert_eq!(app.vault_scroll(), 0);

    app.next_pane();
    app.scroll_focused_pane_down(4, 9);
    assert_eq!(app.chat_scroll(), 1);
    assert_eq!(app.vault_scroll(), 1);
    app.scroll_focused_pane_up();
    assert_eq!(app.vault_scroll(), 0);
}
