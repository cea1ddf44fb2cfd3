use crate::session::Session;
use crate::text_layout::wrap_word_with_positions;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    Chat,
    Vault,
}

/// Everything the renderer reads: the conversation session plus view-only
/// state (focus, scroll offsets, input cursor). Mutation happens through the
/// methods below and through `session_mut`.
#[derive(Debug)]
pub struct App {
    pub running: bool,
    pub ticks: u64,
    pub active_pane: Pane,
    session: Session,
    chat_scroll: u16,
    vault_scroll: u16,
    draft_cursor: usize,
    draft_cursor_goal_col: Option<u16>,
}

impl Default for App {
    fn default() -> Self {
        Self {
            running: true,
            ticks: 0,
            active_pane: Pane::Chat,
            session: Session::default(),
            chat_scroll: 0,
            vault_scroll: 0,
            draft_cursor: 0,
            draft_cursor_goal_col: None,
        }
    }
}

impl App {
    pub fn on_tick(&mut self) {
        self.ticks = self.ticks.saturating_add(1);
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn next_pane(&mut self) {
        self.active_pane = match self.active_pane {
            Pane::Chat => Pane::Vault,
            Pane::Vault => Pane::Chat,
        };
    }

    pub fn prev_pane(&mut self) {
        // Two panes, so the cycle is its own inverse.
        self.next_pane();
    }

    pub fn cycle_domain(&mut self) {
        let next = self.session.active_domain().next();
        self.session.set_active_domain(next);
    }

    pub fn input_char(&mut self, c: char) {
        let byte_idx = char_to_byte_idx(self.session.draft_input(), self.draft_cursor);
        let mut draft = self.session.draft_input().to_string();
        draft.insert(byte_idx, c);
        self.session.set_draft_input(draft);
        self.draft_cursor = self.draft_cursor.saturating_add(1);
        self.draft_cursor_goal_col = None;
    }

    pub fn backspace_input(&mut self) {
        if self.draft_cursor == 0 {
            return;
        }

        let start = char_to_byte_idx(self.session.draft_input(), self.draft_cursor - 1);
        let end = char_to_byte_idx(self.session.draft_input(), self.draft_cursor);
        let mut draft = self.session.draft_input().to_string();
        draft.drain(start..end);
        self.session.set_draft_input(draft);
        self.draft_cursor -= 1;
        self.draft_cursor_goal_col = None;
    }

    pub fn move_cursor_left(&mut self) {
        self.draft_cursor = self.draft_cursor.saturating_sub(1);
        self.draft_cursor_goal_col = None;
    }

    pub fn move_cursor_right(&mut self) {
        let char_len = self.session.draft_input().chars().count();
        self.draft_cursor = (self.draft_cursor + 1).min(char_len);
        self.draft_cursor_goal_col = None;
    }

    pub fn move_cursor_up(&mut self, width: u16) {
        let positions = wrap_word_with_positions(self.session.draft_input(), width.max(1)).positions;
        let (line, col) = positions[self.draft_cursor];
        if line == 0 {
            return;
        }
        let goal_col = self.draft_cursor_goal_col.unwrap_or(col);
        self.draft_cursor = nearest_index_for_line_col(&positions, line - 1, goal_col);
        self.draft_cursor_goal_col = Some(goal_col);
    }

    pub fn move_cursor_down(&mut self, width: u16) {
        let positions = wrap_word_with_positions(self.session.draft_input(), width.max(1)).positions;
        let (line, col) = positions[self.draft_cursor];
        let max_line = positions.iter().map(|(l, _)| *l).max().unwrap_or(0);
        if line >= max_line {
            return;
        }
        let goal_col = self.draft_cursor_goal_col.unwrap_or(col);
        self.draft_cursor = nearest_index_for_line_col(&positions, line + 1, goal_col);
        self.draft_cursor_goal_col = Some(goal_col);
    }

    pub fn draft_cursor_line_col(&self, width: u16) -> (u16, u16) {
        let positions = wrap_word_with_positions(self.session.draft_input(), width.max(1)).positions;
        positions[self.draft_cursor]
    }

    /// Replace the draft wholesale (startup `--send-file` path), leaving the
    /// cursor at the end.
    pub fn set_draft_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.draft_cursor = text.chars().count();
        self.draft_cursor_goal_col = None;
        self.session.set_draft_input(text);
    }

    /// Take the trimmed draft for submission. Empty or whitespace-only
    /// drafts are left untouched and yield `None`.
    pub fn consume_draft_trimmed(&mut self) -> Option<String> {
        let message = self.session.draft_input().trim().to_string();
        if message.is_empty() {
            return None;
        }
        self.session.set_draft_input("");
        self.draft_cursor = 0;
        self.draft_cursor_goal_col = None;
        Some(message)
    }

    /// Why the input affordance renders disabled, when it does.
    pub fn submit_disabled_reason(&self) -> Option<String> {
        let domain = self.session.active_domain();
        if !domain.is_available() {
            return Some(format!(
                "The {} workspace is not yet available. Press Ctrl+N to switch domain.",
                domain.label()
            ));
        }
        None
    }

    pub fn chat_scroll(&self) -> u16 {
        self.chat_scroll
    }

    pub fn set_chat_scroll(&mut self, scroll: u16) {
        self.chat_scroll = scroll;
    }

    pub fn scroll_chat_up(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_sub(1);
    }

    pub fn scroll_chat_down(&mut self, max_scroll: u16) {
        self.chat_scroll = (self.chat_scroll + 1).min(max_scroll);
    }

    pub fn vault_scroll(&self) -> u16 {
        self.vault_scroll
    }

    pub fn scroll_vault_up(&mut self, lines: u16) {
        self.vault_scroll = self.vault_scroll.saturating_sub(lines);
    }

    pub fn scroll_vault_down(&mut self, lines: u16, max_scroll: u16) {
        self.vault_scroll = self.vault_scroll.saturating_add(lines).min(max_scroll);
    }

    pub fn scroll_focused_pane_up(&mut self) {
        match self.active_pane {
            Pane::Chat => self.scroll_chat_up(),
            Pane::Vault => self.scroll_vault_up(1),
        }
    }

    pub fn scroll_focused_pane_down(&mut self, chat_max: u16, vault_max: u16) {
        match self.active_pane {
            Pane::Chat => self.scroll_chat_down(chat_max),
            Pane::Vault => self.scroll_vault_down(1, vault_max),
        }
    }
}

fn char_to_byte_idx(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(byte_idx, _)| byte_idx)
        .unwrap_or(s.len())
}

fn nearest_index_for_line_col(positions: &[(u16, u16)], target_line: u16, goal_col: u16) -> usize {
    let mut best: Option<(usize, u16)> = None;
    let mut fallback: Option<usize> = None;

    for (idx, (line, col)) in positions.iter().copied().enumerate() {
        if line != target_line {
            continue;
        }
        if fallback.is_none() {
            fallback = Some(idx);
        }
        if col <= goal_col {
            best = match best {
                Some((_, best_col)) if best_col >= col => best,
                _ => Some((idx, col)),
            };
        }
    }

    if let Some((idx, _)) = best {
        idx
    } else {
        fallback.unwrap_or(positions.len().saturating_sub(1))
    }
}

#[cfg(test)]
#[path = "../tests/unit/app_tests.rs"]
mod tests;
