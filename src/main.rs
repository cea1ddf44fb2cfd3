use std::io;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use clap::{Parser, Subcommand};
use crossterm::cursor::SetCursorStyle;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::prelude::*;

mod advisor;
mod app;
mod config;
mod events;
mod services;
mod session;
mod text_layout;
mod theme;
mod ui;

use advisor::{AdvisorAdapter, AdvisorConfig, AdvisorEvent};
use app::{App, Pane};
use config::BackendConfig;
use events::AppEvent;
use services::{AdvisoryTurnService, DefaultAdvisoryTurnService};
use session::Domain;
use theme::Theme;

const MAX_ADAPTER_EVENTS_PER_LOOP: usize = 128;
const VAULT_SCROLL_LINES: u16 = 5;
const HEADLESS_POLL: Duration = Duration::from_millis(20);

#[derive(Debug, Parser)]
#[command(
    name = "complianceos",
    version,
    about = "Terminal client for the ComplianceOS compliance-advisory service"
)]
struct LaunchOptions {
    /// Submit this file's contents as the first query after startup.
    #[arg(long, value_name = "PATH")]
    send_file: Option<PathBuf>,
    /// Domain to select at startup (GDPR, FDA, CCPA, GLOBAL).
    #[arg(long, value_name = "ID")]
    domain: Option<String>,
    /// Override the advisory service base URL.
    #[arg(long, value_name = "URL")]
    api_url: Option<String>,
    #[command(subcommand)]
    command: Option<LaunchCommand>,
}

#[derive(Debug, Subcommand)]
enum LaunchCommand {
    /// Run one advisory turn without the TUI and print the answer.
    Ask {
        query: String,
        /// Domain to query (GDPR, FDA, CCPA).
        #[arg(long, value_name = "ID")]
        domain: Option<String>,
        /// Print the full response payload as JSON instead of the text.
        #[arg(long)]
        json: bool,
    },
}

fn main() -> io::Result<()> {
    let options = LaunchOptions::parse();
    let backend = BackendConfig::resolve(options.api_url.as_deref())?;

    if let Some(LaunchCommand::Ask {
        query,
        domain,
        json,
    }) = options.command
    {
        let domain = resolve_domain(domain.as_deref().or(options.domain.as_deref()))?;
        return run_ask(&backend, &query, domain, json);
    }

    let startup_domain = resolve_domain(options.domain.as_deref())?;
    let startup_message = if let Some(path) = options.send_file {
        Some(std::fs::read_to_string(path)?)
    } else {
        None
    };

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        SetCursorStyle::SteadyBar
    )?;

    let backend_terminal = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend_terminal)?;
    terminal.clear()?;
    let theme = Theme::load_or_default("theme.toml");
    let mut advisor_config = AdvisorConfig::new(backend.chat_endpoint());
    advisor_config.request_timeout = backend.request_timeout();
    let advisor = AdvisorAdapter::with_config(advisor_config);
    let mut app = App::default();
    app.session_mut().set_active_domain(startup_domain);

    let result = run_app(
        &mut terminal,
        app,
        &theme,
        &advisor,
        startup_message.as_deref(),
    );

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        SetCursorStyle::DefaultUserShape,
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}

fn resolve_domain(id: Option<&str>) -> io::Result<Domain> {
    match id {
        None => Ok(Domain::Gdpr),
        Some(id) => Domain::from_id(id).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("unknown compliance domain id: {id}"),
            )
        }),
    }
}

fn run_ask(backend: &BackendConfig, query: &str, domain: Domain, json: bool) -> io::Result<()> {
    if !domain.is_available() {
        eprintln!("The {} workspace is not yet available.", domain.label());
        std::process::exit(2);
    }
    let trimmed = query.trim();
    if trimmed.is_empty() {
        eprintln!("Nothing to ask: the query is empty.");
        std::process::exit(2);
    }

    let mut advisor_config = AdvisorConfig::new(backend.chat_endpoint());
    advisor_config.request_timeout = backend.request_timeout();
    advisor_config.narrate = false;
    let adapter = AdvisorAdapter::with_config(advisor_config);
    adapter.send_query(1, trimmed.to_string(), domain);

    loop {
        for event in adapter.drain_events_limited(MAX_ADAPTER_EVENTS_PER_LOOP) {
            let AdvisorEvent::Settled { outcome, .. } = event else {
                continue;
            };
            match outcome {
                Ok(answer) => {
                    if json {
                        println!(
                            "{}",
                            serde_json::to_string_pretty(&answer.annex.raw)
                                .map_err(io::Error::other)?
                        );
                    } else {
                        println!("{}", answer.content);
                    }
                    return Ok(());
                }
                Err(err) => {
                    eprintln!("Connection Error: {err}");
                    std::process::exit(1);
                }
            }
        }
        thread::sleep(HEADLESS_POLL);
    }
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut app: App,
    theme: &Theme,
    advisor: &AdvisorAdapter,
    startup_message: Option<&str>,
) -> io::Result<()> {
    let turn_service = DefaultAdvisoryTurnService;

    if let Some(message) = startup_message {
        app.set_draft_text(message.trim());
        let _ = turn_service.begin_turn(&mut app, advisor);
    }

    while app.running {
        let mut chat_updated = false;
        for event in advisor.drain_events_limited(MAX_ADAPTER_EVENTS_PER_LOOP) {
            if turn_service.apply_advisor_event(&mut app, event) {
                chat_updated = true;
            }
        }
        if chat_updated {
            let screen = screen_rect(terminal)?;
            let max_scroll = ui::chat_max_scroll(screen, &app);
            app.set_chat_scroll(max_scroll);
        }

        terminal.draw(|frame| ui::render(frame, &app, theme))?;

        match events::next_event()? {
            AppEvent::Tick => app.on_tick(),
            AppEvent::Quit => app.quit(),
            AppEvent::NextPane => app.next_pane(),
            AppEvent::PrevPane => app.prev_pane(),
            AppEvent::NextDomain => app.cycle_domain(),
            AppEvent::InputChar(c) => {
                if app.active_pane == Pane::Chat {
                    app.input_char(c);
                } else if c == 'j' {
                    let screen = screen_rect(terminal)?;
                    let max_scroll = ui::vault_max_scroll(screen, &app);
                    app.scroll_vault_down(1, max_scroll);
                } else if c == 'k' {
                    app.scroll_vault_up(1);
                }
            }
            AppEvent::Backspace => {
                if app.active_pane == Pane::Chat {
                    app.backspace_input();
                }
            }
            AppEvent::CursorLeft => {
                if app.active_pane == Pane::Chat {
                    app.move_cursor_left();
                }
            }
            AppEvent::CursorRight => {
                if app.active_pane == Pane::Chat {
                    app.move_cursor_right();
                }
            }
            AppEvent::MoveUp => {
                if app.active_pane == Pane::Chat {
                    let screen = screen_rect(terminal)?;
                    app.move_cursor_up(ui::chat_input_text_width(screen));
                } else {
                    app.scroll_vault_up(1);
                }
            }
            AppEvent::MoveDown => {
                if app.active_pane == Pane::Chat {
                    let screen = screen_rect(terminal)?;
                    app.move_cursor_down(ui::chat_input_text_width(screen));
                } else {
                    let screen = screen_rect(terminal)?;
                    let max_scroll = ui::vault_max_scroll(screen, &app);
                    app.scroll_vault_down(1, max_scroll);
                }
            }
            AppEvent::ScrollChatUp => app.scroll_chat_up(),
            AppEvent::ScrollChatDown => {
                let screen = screen_rect(terminal)?;
                let max_scroll = ui::chat_max_scroll(screen, &app);
                app.scroll_chat_down(max_scroll);
            }
            AppEvent::ScrollVaultUp => app.scroll_vault_up(VAULT_SCROLL_LINES),
            AppEvent::ScrollVaultDown => {
                let screen = screen_rect(terminal)?;
                let max_scroll = ui::vault_max_scroll(screen, &app);
                app.scroll_vault_down(VAULT_SCROLL_LINES, max_scroll);
            }
            AppEvent::MouseScrollUp => app.scroll_focused_pane_up(),
            AppEvent::MouseScrollDown => {
                let screen = screen_rect(terminal)?;
                let chat_max = ui::chat_max_scroll(screen, &app);
                let vault_max = ui::vault_max_scroll(screen, &app);
                app.scroll_focused_pane_down(chat_max, vault_max);
            }
            AppEvent::MouseLeftClick(col, _row) => {
                let screen = screen_rect(terminal)?;
                app.active_pane = ui::pane_at(screen, col);
            }
            AppEvent::Submit => {
                if app.active_pane == Pane::Chat
                    && turn_service.begin_turn(&mut app, advisor).is_ok()
                {
                    let screen = screen_rect(terminal)?;
                    let max_scroll = ui::chat_max_scroll(screen, &app);
                    app.set_chat_scroll(max_scroll);
                }
            }
        }
    }

    Ok(())
}

fn screen_rect(terminal: &Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<Rect> {
    let size = terminal.size()?;
    Ok(Rect::new(0, 0, size.width, size.height))
}
