use ratatui::prelude::*;
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Padding, Paragraph};

use crate::app::{App, Pane};
use crate::session::{AuditEntry, Role};
use crate::text_layout::wrap_word_with_positions;
use crate::theme::Theme;

const MAX_INPUT_TEXT_LINES: u16 = 5;
const TEXT_PADDING: u16 = 1;
const STATUS_HEIGHT: u16 = 3;
const TITLE_BAR_HEIGHT: u16 = 3;
const ACTIVE_TITLE_BG: Color = Color::Rgb(90, 145, 200);
const ACTIVE_TITLE_FG: Color = Color::Black;
const STATUS_HELP_TEXT: &str = "Tab focus | Ctrl+N domain | Shift+Up/Down chat scroll | Ctrl+C quit";

pub fn render(frame: &mut Frame, app: &App, theme: &Theme) {
    let [body, status] = Layout::vertical([Constraint::Min(0), Constraint::Length(STATUS_HEIGHT)])
        .areas(frame.area());
    let [chat, vault] =
        Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)]).areas(body);

    render_chat_pane(frame, chat, app, app.active_pane == Pane::Chat, theme);
    render_vault_pane(frame, vault, app, app.active_pane == Pane::Vault, theme);

    frame.render_widget(
        Block::default().style(Style::default().bg(theme.status_bg)),
        status,
    );
    let help = Paragraph::new(status_line_text(app))
        .style(Style::default().bg(theme.status_bg).fg(theme.muted_fg))
        .block(
            Block::default()
                .style(Style::default().bg(theme.status_bg))
                .padding(Padding::uniform(TEXT_PADDING)),
        );
    frame.render_widget(help, status);
}

/// Which pane a mouse click at `col` lands in, given the current layout.
pub fn pane_at(screen: Rect, col: u16) -> Pane {
    let [body, _status] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(STATUS_HEIGHT)]).areas(screen);
    let [_chat, vault] =
        Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)]).areas(body);
    if col >= vault.x { Pane::Vault } else { Pane::Chat }
}

pub fn chat_input_text_width(screen: Rect) -> u16 {
    let content = chat_content_area(screen);
    content.width.saturating_sub(TEXT_PADDING * 2).max(1)
}

pub fn chat_max_scroll(screen: Rect, app: &App) -> u16 {
    let content = chat_content_area(screen);
    if content.width < 1 || content.height < 2 {
        return 0;
    }

    let input_text_width = content.width.saturating_sub(TEXT_PADDING * 2).max(1);
    let input_text_lines =
        wrap_word_with_positions(app.session().draft_input(), input_text_width).line_count;
    let max_input_height = content.height.saturating_sub(1).max(1);
    let (input_height, _) = input_box_metrics(input_text_lines, 0, max_input_height);

    let [messages_area, _input_area] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(input_height)]).areas(content);
    let text_width = messages_area.width.saturating_sub(TEXT_PADDING * 2).max(1);
    let line_count = chat_display_lines(app, text_width).len() as u16;
    let visible = messages_area.height.saturating_sub(TEXT_PADDING * 2).max(1);
    line_count.saturating_sub(visible)
}

pub fn vault_max_scroll(screen: Rect, app: &App) -> u16 {
    let [body, _status] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(STATUS_HEIGHT)]).areas(screen);
    let [_chat, vault] =
        Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)]).areas(body);
    let [_title, content] =
        Layout::vertical([Constraint::Length(TITLE_BAR_HEIGHT), Constraint::Min(0)]).areas(vault);
    let text_width = content.width.saturating_sub(TEXT_PADDING * 2).max(1);
    let line_count = vault_lines(app, text_width, &Theme::default()).len() as u16;
    let visible = content.height.saturating_sub(TEXT_PADDING * 2).max(1);
    line_count.saturating_sub(visible)
}

fn chat_content_area(screen: Rect) -> Rect {
    let [body, _status] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(STATUS_HEIGHT)]).areas(screen);
    let [chat, _vault] =
        Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)]).areas(body);
    let [_title, content] =
        Layout::vertical([Constraint::Length(TITLE_BAR_HEIGHT), Constraint::Min(0)]).areas(chat);
    content
}

fn render_chat_pane(frame: &mut Frame, area: Rect, app: &App, active: bool, theme: &Theme) {
    let [title_area, content] =
        Layout::vertical([Constraint::Length(TITLE_BAR_HEIGHT), Constraint::Min(0)]).areas(area);
    let title_bg = title_bar_bg(theme.chat_bg, active);
    let title_fg = if active {
        ACTIVE_TITLE_FG
    } else {
        theme.muted_fg
    };
    frame.render_widget(
        Block::default().style(Style::default().bg(title_bg)),
        title_area,
    );
    frame.render_widget(
        Paragraph::new(format!(
            "Agent Chat - {}",
            app.session().active_domain().label()
        ))
        .style(Style::default().bg(title_bg).fg(title_fg))
        .block(
            Block::default()
                .style(Style::default().bg(title_bg))
                .padding(Padding::uniform(TEXT_PADDING)),
        ),
        title_area,
    );

    frame.render_widget(
        Block::default().style(Style::default().bg(theme.chat_bg)),
        content,
    );
    if content.width < 1 || content.height < 2 {
        return;
    }

    let input_text_width = content.width.saturating_sub(TEXT_PADDING * 2).max(1);
    let wrapped_input_layout =
        wrap_word_with_positions(app.session().draft_input(), input_text_width);
    let (cursor_line, cursor_col) = app.draft_cursor_line_col(input_text_width);
    let max_input_height = content.height.saturating_sub(1).max(1);
    let (input_height, input_scroll) =
        input_box_metrics(wrapped_input_layout.line_count, cursor_line, max_input_height);

    let [messages_area, input_area] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(input_height)]).areas(content);

    let text_width = messages_area.width.saturating_sub(TEXT_PADDING * 2).max(1);
    let message_lines = chat_display_lines(app, text_width);
    let messages = Paragraph::new(chat_text(&message_lines, theme))
        .scroll((app.chat_scroll().min(chat_max_scroll(frame.area(), app)), 0))
        .style(Style::default().bg(theme.chat_bg).fg(theme.text_fg))
        .block(
            Block::default()
                .style(Style::default().bg(theme.chat_bg))
                .padding(Padding::uniform(TEXT_PADDING)),
        );
    frame.render_widget(messages, messages_area);

    if let Some(reason) = app.submit_disabled_reason() {
        let notice = Paragraph::new(reason)
            .style(
                Style::default()
                    .bg(theme.input_bg)
                    .fg(theme.muted_fg)
                    .add_modifier(Modifier::DIM),
            )
            .block(
                Block::default()
                    .style(Style::default().bg(theme.input_bg))
                    .padding(Padding::uniform(TEXT_PADDING)),
            );
        frame.render_widget(notice, input_area);
        return;
    }

    let input = Paragraph::new(wrapped_input_layout.rendered)
        .block(
            Block::default()
                .style(Style::default().bg(theme.input_bg))
                .padding(Padding::uniform(TEXT_PADDING)),
        )
        .style(Style::default().bg(theme.input_bg).fg(theme.text_fg))
        .scroll((input_scroll, 0));
    frame.render_widget(input, input_area);

    if active {
        let input_inner = input_area.inner(Margin {
            horizontal: TEXT_PADDING,
            vertical: TEXT_PADDING,
        });
        if input_inner.width > 0 && input_inner.height > 0 {
            let visible_cursor_line = cursor_line.saturating_sub(input_scroll);
            if visible_cursor_line < input_inner.height {
                frame.set_cursor_position((
                    input_inner
                        .x
                        .saturating_add(cursor_col.min(input_inner.width.saturating_sub(1))),
                    input_inner.y.saturating_add(visible_cursor_line),
                ));
            }
        }
    }
}

fn render_vault_pane(frame: &mut Frame, area: Rect, app: &App, active: bool, theme: &Theme) {
    let [title_area, content] =
        Layout::vertical([Constraint::Length(TITLE_BAR_HEIGHT), Constraint::Min(0)]).areas(area);
    let title_bg = title_bar_bg(theme.vault_bg, active);
    let title_fg = if active {
        ACTIVE_TITLE_FG
    } else {
        theme.muted_fg
    };
    frame.render_widget(
        Block::default().style(Style::default().bg(title_bg)),
        title_area,
    );
    frame.render_widget(
        Paragraph::new("Governance Vault")
            .style(Style::default().bg(title_bg).fg(title_fg))
            .block(
                Block::default()
                    .style(Style::default().bg(title_bg))
                    .padding(Padding::uniform(TEXT_PADDING)),
            ),
        title_area,
    );

    let text_width = content.width.saturating_sub(TEXT_PADDING * 2).max(1);
    let lines = vault_lines(app, text_width, theme);
    let paragraph = Paragraph::new(Text::from(lines))
        .scroll((app.vault_scroll().min(vault_max_scroll(frame.area(), app)), 0))
        .style(Style::default().bg(theme.vault_bg).fg(theme.text_fg))
        .block(
            Block::default()
                .style(Style::default().bg(theme.vault_bg))
                .padding(Padding::uniform(TEXT_PADDING)),
        );
    frame.render_widget(paragraph, content);
}

fn vault_lines(app: &App, width: u16, theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let session = app.session();

    lines.push(Line::from(Span::styled(
        "Latest advisory annex".to_string(),
        Style::default()
            .fg(theme.active_fg)
            .add_modifier(Modifier::BOLD),
    )));
    match session.latest_annex() {
        Some(annex) => {
            let risk_label = annex.risk_level.as_deref().unwrap_or("-");
            lines.push(Line::from(vec![
                Span::styled("Risk level: ".to_string(), Style::default().fg(theme.muted_fg)),
                Span::styled(
                    risk_label.to_uppercase(),
                    Style::default().fg(risk_color(risk_label, theme)),
                ),
            ]));
            let confidence = annex
                .confidence_score
                .map(|score| format!("{:.0}%", score * 100.0))
                .unwrap_or_else(|| "-".to_string());
            lines.push(Line::from(vec![
                Span::styled("Confidence: ".to_string(), Style::default().fg(theme.muted_fg)),
                Span::raw(confidence),
            ]));
            if !annex.reasoning_map.is_empty() {
                lines.push(Line::from(Span::styled(
                    "Reasoning map:".to_string(),
                    Style::default().fg(theme.muted_fg),
                )));
                for (idx, step) in annex.reasoning_map.iter().enumerate() {
                    let head = format!(
                        "{}. {} -> {} [{}]",
                        idx + 1,
                        step.fact,
                        step.legal_meaning,
                        step.subsection
                    );
                    for part in wrap_text_lines(&head, width) {
                        lines.push(Line::from(Span::raw(part)));
                    }
                    if !step.justification.trim().is_empty() {
                        for part in wrap_text_lines(&step.justification, width.saturating_sub(3).max(1)) {
                            lines.push(Line::from(Span::styled(
                                format!("   {part}"),
                                Style::default().fg(theme.muted_fg),
                            )));
                        }
                    }
                }
            }
        }
        None => {
            lines.push(Line::from(Span::styled(
                "No advisory annex yet.".to_string(),
                Style::default().fg(theme.muted_fg),
            )));
        }
    }

    lines.push(Line::from(Span::raw(String::new())));
    lines.push(Line::from(Span::styled(
        "Audit log".to_string(),
        Style::default()
            .fg(theme.active_fg)
            .add_modifier(Modifier::BOLD),
    )));
    if session.audit_log().is_empty() {
        lines.push(Line::from(Span::styled(
            "No turns logged yet.".to_string(),
            Style::default().fg(theme.muted_fg),
        )));
    } else {
        for entry in session.audit_log().iter().rev() {
            lines.extend(audit_entry_lines(entry, width, theme));
        }
    }
    lines
}

fn audit_entry_lines(entry: &AuditEntry, width: u16, theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    lines.push(Line::from(vec![
        Span::styled(
            format!("[{}] ", format_clock(entry.logged_at_epoch_secs)),
            Style::default().fg(theme.muted_fg),
        ),
        Span::styled(
            entry.domain.id().to_string(),
            Style::default().fg(theme.accent_fg),
        ),
    ]));
    for part in wrap_text_lines(&format!("Q: {}", entry.query), width) {
        lines.push(Line::from(Span::raw(part)));
    }
    for part in wrap_text_lines(&format!("A: {}", entry.response_excerpt), width) {
        lines.push(Line::from(Span::styled(
            part,
            Style::default().fg(theme.muted_fg),
        )));
    }
    lines.push(Line::from(Span::raw(String::new())));
    lines
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChatPrefix {
    You,
    Agent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChatLineKind {
    Normal,
    Separator,
    Annex,
    Working,
    Hint,
}

#[derive(Debug, Clone)]
struct ChatDisplayLine {
    prefix: Option<ChatPrefix>,
    body: String,
    show_label: bool,
    kind: ChatLineKind,
}

fn chat_display_lines(app: &App, width: u16) -> Vec<ChatDisplayLine> {
    let width = width.max(1);
    let session = app.session();
    let mut out = Vec::new();

    if session.messages().is_empty() && !session.is_processing() {
        for hint in [
            "Ask a compliance question to get started.",
            "",
            "Try: How do we report a data breach under GDPR?",
            "Try: Is an IP address personal information under CCPA?",
            "Try: What does 21 CFR Part 11 require for records?",
        ] {
            for line in wrap_text_lines(hint, width) {
                out.push(ChatDisplayLine {
                    prefix: None,
                    body: line,
                    show_label: false,
                    kind: ChatLineKind::Hint,
                });
            }
        }
        return out;
    }

    for (idx, message) in session.messages().iter().enumerate() {
        let prefix = match message.role {
            Role::User => ChatPrefix::You,
            Role::Assistant => ChatPrefix::Agent,
        };
        let label = prefix_label(prefix);
        let prefix_width = label.chars().count() + 1;
        let body_width = (width as usize).saturating_sub(prefix_width).max(1) as u16;
        let wrapped = wrap_text_lines(&message.content, body_width);
        if let Some((first, rest)) = wrapped.split_first() {
            out.push(ChatDisplayLine {
                prefix: Some(prefix),
                body: first.clone(),
                show_label: true,
                kind: ChatLineKind::Normal,
            });
            for line in rest {
                out.push(ChatDisplayLine {
                    prefix: Some(prefix),
                    body: line.clone(),
                    show_label: false,
                    kind: ChatLineKind::Normal,
                });
            }
        }

        if let Some(annex) = &message.annex
            && annex.risk_level.is_some()
        {
            let confidence = annex
                .confidence_score
                .map(|score| format!("{:.0}%", score * 100.0))
                .unwrap_or_else(|| "-".to_string());
            out.push(ChatDisplayLine {
                prefix: Some(prefix),
                body: format!(
                    "Risk: {} | Confidence: {confidence}",
                    annex.risk_level.as_deref().unwrap_or("-").to_uppercase()
                ),
                show_label: false,
                kind: ChatLineKind::Annex,
            });
        }

        if idx + 1 < session.messages().len() || session.is_processing() {
            out.push(ChatDisplayLine {
                prefix: None,
                body: "─".repeat(width as usize),
                show_label: false,
                kind: ChatLineKind::Separator,
            });
        }
    }

    if session.is_processing() {
        let body = format!(
            "Agent is thinking {} {}",
            working_dots(app.ticks),
            session.progress_narration()
        );
        for line in wrap_text_lines(&body, width) {
            out.push(ChatDisplayLine {
                prefix: None,
                body: line,
                show_label: false,
                kind: ChatLineKind::Working,
            });
        }
    }

    out
}

fn chat_text(lines: &[ChatDisplayLine], theme: &Theme) -> Text<'static> {
    let mut out_lines = Vec::with_capacity(lines.len());
    for line in lines {
        match line.kind {
            ChatLineKind::Separator => {
                out_lines.push(Line::from(Span::styled(
                    line.body.clone(),
                    Style::default().fg(chat_separator_color(theme)),
                )));
            }
            ChatLineKind::Working => {
                out_lines.push(Line::from(Span::styled(
                    line.body.clone(),
                    Style::default().fg(theme.accent_fg),
                )));
            }
            ChatLineKind::Hint => {
                out_lines.push(Line::from(Span::styled(
                    line.body.clone(),
                    Style::default().fg(theme.muted_fg),
                )));
            }
            ChatLineKind::Annex => {
                let indent = line
                    .prefix
                    .map(|prefix| prefix_label(prefix).chars().count() + 1)
                    .unwrap_or(0);
                let risk = line.body.clone();
                let color = annex_line_color(&risk, theme);
                out_lines.push(Line::from(vec![
                    Span::raw(" ".repeat(indent)),
                    Span::styled(risk, Style::default().fg(color)),
                ]));
            }
            ChatLineKind::Normal => {
                let Some(prefix) = line.prefix else {
                    out_lines.push(Line::from(Span::raw(line.body.clone())));
                    continue;
                };
                let label = prefix_label(prefix);
                let label_style = match prefix {
                    ChatPrefix::You => Style::default().fg(Color::Rgb(80, 190, 100)),
                    ChatPrefix::Agent => Style::default().fg(theme.accent_fg),
                };
                if line.show_label {
                    out_lines.push(Line::from(vec![
                        Span::styled(label.to_string(), label_style),
                        Span::raw(" "),
                        Span::raw(line.body.clone()),
                    ]));
                } else {
                    out_lines.push(Line::from(vec![
                        Span::raw(" ".repeat(label.chars().count() + 1)),
                        Span::raw(line.body.clone()),
                    ]));
                }
            }
        }
    }
    Text::from(out_lines)
}

fn prefix_label(prefix: ChatPrefix) -> &'static str {
    match prefix {
        ChatPrefix::You => "You:",
        ChatPrefix::Agent => "Agent:",
    }
}

fn annex_line_color(body: &str, theme: &Theme) -> Color {
    for level in ["critical", "high", "medium", "low"] {
        if body.to_lowercase().contains(level) {
            return risk_color(level, theme);
        }
    }
    theme.muted_fg
}

fn risk_color(risk: &str, theme: &Theme) -> Color {
    match risk.trim().to_lowercase().as_str() {
        "low" => Color::Rgb(80, 190, 100),
        "medium" => Color::Rgb(235, 180, 60),
        "high" | "critical" => Color::Rgb(225, 80, 80),
        _ => theme.muted_fg,
    }
}

fn wrap_text_lines(text: &str, width: u16) -> Vec<String> {
    let rendered = wrap_word_with_positions(text, width.max(1)).rendered;
    let lines: Vec<String> = rendered.lines().map(ToString::to_string).collect();
    if lines.is_empty() {
        vec![String::new()]
    } else {
        lines
    }
}

fn status_line_text(app: &App) -> String {
    let mut status = format!(
        "{STATUS_HELP_TEXT} | Domain: {}",
        app.session().active_domain().label()
    );
    if app.session().is_processing() {
        status.push_str(&format!(" | Agent working {}", working_dots(app.ticks)));
    }
    status
}

fn working_dots(ticks: u64) -> &'static str {
    const FRAMES: [&str; 6] = ["[   ]", "[.  ]", "[.. ]", "[...]", "[ ..]", "[  .]"];
    FRAMES[((ticks / 2) as usize) % FRAMES.len()]
}

pub fn format_clock(epoch_secs: u64) -> String {
    let day_secs = epoch_secs % 86_400;
    format!(
        "{:02}:{:02}:{:02}",
        day_secs / 3600,
        (day_secs % 3600) / 60,
        day_secs % 60
    )
}

fn input_box_metrics(input_text_lines: u16, cursor_line: u16, max_input_height: u16) -> (u16, u16) {
    let capped_text_lines = input_text_lines.clamp(1, MAX_INPUT_TEXT_LINES);
    let desired_height = capped_text_lines.saturating_add(TEXT_PADDING * 2);
    let input_height = desired_height.clamp(1, max_input_height.max(1));
    let visible_text_lines = input_height.saturating_sub(TEXT_PADDING * 2).max(1);
    let max_scroll = input_text_lines.saturating_sub(visible_text_lines);
    let middle_line = visible_text_lines / 2;
    let input_scroll = cursor_line.saturating_sub(middle_line).min(max_scroll);
    (input_height, input_scroll)
}

fn title_bar_bg(base: Color, active: bool) -> Color {
    if active {
        return ACTIVE_TITLE_BG;
    }
    match base {
        Color::Rgb(r, g, b) => {
            let delta = -12;
            Color::Rgb(
                adjust_channel(r, delta),
                adjust_channel(g, delta),
                adjust_channel(b, delta),
            )
        }
        _ => base,
    }
}

fn chat_separator_color(theme: &Theme) -> Color {
    match theme.chat_bg {
        Color::Rgb(r, g, b) => Color::Rgb(
            r.saturating_add(12),
            g.saturating_add(12),
            b.saturating_add(12),
        ),
        _ => theme.muted_fg,
    }
}

fn adjust_channel(channel: u8, delta: i16) -> u8 {
    let value = channel as i16 + delta;
    value.clamp(0, 255) as u8
}

#[cfg(test)]
#[path = "../tests/unit/ui_tests.rs"]
mod tests;
