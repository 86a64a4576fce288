//! Interactive drive UI using ratatui + crossterm.
//!
//! Shows the account creation form, the wallet's storage accounts, the local
//! upload selection and the files of the selected account, plus a notice log.

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use shdw::Wallet;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::DriveConfig;
use crate::effects::Executor;
use crate::error::DriveError;
use crate::files::parse_paths;
use crate::session::{ClientFactory, ShdwFactory};
use crate::view::{account_label, DriveView, Effect, FileStatus, NoticeLevel};

/// Target render interval (10 FPS).
const RENDER_INTERVAL: Duration = Duration::from_millis(100);

/// Frames of the pending-row spinner.
const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

// ---------------------------------------------------------------------------
// Input state
// ---------------------------------------------------------------------------

/// Panel receiving navigation keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Accounts,
    Local,
    Remote,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Focus::Accounts => Focus::Local,
            Focus::Local => Focus::Remote,
            Focus::Remote => Focus::Accounts,
        }
    }
}

/// Line editor currently capturing keystrokes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    AccountName,
    Paths(String),
}

/// Cursor and input state that lives outside the drive view.
#[derive(Debug)]
pub struct UiState {
    pub focus: Focus,
    pub account_cursor: usize,
    pub local_cursor: usize,
    pub remote_cursor: usize,
    pub input: Option<Input>,
    pub quit: bool,
    tick: usize,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            focus: Focus::Accounts,
            account_cursor: 0,
            local_cursor: 0,
            remote_cursor: 0,
            input: None,
            quit: false,
            tick: 0,
        }
    }
}

impl UiState {
    /// Apply one key press, returning the effects it triggered.
    pub fn handle_key(
        &mut self,
        view: &mut DriveView,
        code: KeyCode,
        wallet: Option<&Wallet>,
    ) -> Vec<Effect> {
        match self.input.take() {
            Some(Input::AccountName) => {
                match code {
                    KeyCode::Char(c) => {
                        view.form.name.push(c);
                        self.input = Some(Input::AccountName);
                    }
                    KeyCode::Backspace => {
                        view.form.name.pop();
                        self.input = Some(Input::AccountName);
                    }
                    KeyCode::Enter => return view.create_account(),
                    _ => {}
                }
                Vec::new()
            }
            Some(Input::Paths(mut buf)) => match code {
                KeyCode::Char(c) => {
                    buf.push(c);
                    self.input = Some(Input::Paths(buf));
                    Vec::new()
                }
                KeyCode::Backspace => {
                    buf.pop();
                    self.input = Some(Input::Paths(buf));
                    Vec::new()
                }
                KeyCode::Enter => view.open_files(parse_paths(&buf)),
                _ => Vec::new(),
            },
            None => self.handle_command(view, code, wallet),
        }
    }

    fn handle_command(
        &mut self,
        view: &mut DriveView,
        code: KeyCode,
        wallet: Option<&Wallet>,
    ) -> Vec<Effect> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.quit = true;
                Vec::new()
            }
            KeyCode::Char('c') => match wallet {
                Some(wallet) => view.connect(wallet.clone()),
                None => {
                    view.error("no wallet configured (set PRIVATE_KEY or KEYPAIR_PATH)");
                    Vec::new()
                }
            },
            KeyCode::Char('x') => {
                view.disconnect();
                self.account_cursor = 0;
                self.remote_cursor = 0;
                Vec::new()
            }
            KeyCode::Char('n') => {
                self.input = Some(Input::AccountName);
                Vec::new()
            }
            KeyCode::Char('s') => {
                view.form.cycle_size();
                Vec::new()
            }
            KeyCode::Char('v') => {
                view.form.cycle_version();
                Vec::new()
            }
            KeyCode::Char('a') => view.create_account(),
            KeyCode::Char('o') => {
                self.input = Some(Input::Paths(String::new()));
                Vec::new()
            }
            KeyCode::Char('u') => view.submit_files(),
            KeyCode::Char('r') => {
                let mut effects = view.refresh_accounts();
                effects.extend(view.refresh_files());
                effects
            }
            KeyCode::Char('d') => match self.focus {
                Focus::Accounts => view.delete_account(),
                Focus::Remote => match view.remote_files().get(self.remote_cursor).cloned() {
                    Some(url) => view.delete_file(&url),
                    None => Vec::new(),
                },
                Focus::Local => Vec::new(),
            },
            KeyCode::Enter if self.focus == Focus::Accounts => {
                let key = view.accounts().get(self.account_cursor).map(|a| a.public_key);
                match key {
                    Some(key) => {
                        self.remote_cursor = 0;
                        view.select_account(key)
                    }
                    None => Vec::new(),
                }
            }
            KeyCode::Tab => {
                self.focus = self.focus.next();
                Vec::new()
            }
            KeyCode::Up => {
                let cursor = self.cursor_mut();
                *cursor = cursor.saturating_sub(1);
                Vec::new()
            }
            KeyCode::Down => {
                let len = match self.focus {
                    Focus::Accounts => view.accounts().len(),
                    Focus::Local => view.local_files().len(),
                    Focus::Remote => view.remote_files().len(),
                };
                let cursor = self.cursor_mut();
                if *cursor + 1 < len {
                    *cursor += 1;
                }
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn cursor_mut(&mut self) -> &mut usize {
        match self.focus {
            Focus::Accounts => &mut self.account_cursor,
            Focus::Local => &mut self.local_cursor,
            Focus::Remote => &mut self.remote_cursor,
        }
    }

    /// Keep cursors inside lists that shrank underneath them.
    fn clamp(&mut self, view: &DriveView) {
        let clamp = |cursor: &mut usize, len: usize| {
            if *cursor >= len {
                *cursor = len.saturating_sub(1);
            }
        };
        clamp(&mut self.account_cursor, view.accounts().len());
        clamp(&mut self.local_cursor, view.local_files().len());
        clamp(&mut self.remote_cursor, view.remote_files().len());
    }
}

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Run the drive UI until the user quits or `cancel` fires.
///
/// Connects the configured wallet on startup when one is available.
///
/// # Errors
///
/// Returns [`DriveError::Terminal`] if the terminal cannot be set up.
pub async fn run_ui(config: DriveConfig, cancel: CancellationToken) -> Result<(), DriveError> {
    let factory: Arc<dyn ClientFactory> = Arc::new(ShdwFactory {
        config: config.shdw_config(),
    });
    let (executor, mut completions) = Executor::new(factory);

    let mut view = DriveView::new(config.version, config.cluster.clone());
    let mut ui = UiState::default();

    let wallet = match config.load_wallet() {
        Ok(wallet) => Some(wallet),
        Err(e) => {
            view.error(format!("{e}; press 'c' after configuring a wallet"));
            None
        }
    };
    if let Some(wallet) = &wallet {
        let effects = view.connect(wallet.clone());
        executor.dispatch(&view, effects);
    }

    info!(endpoint = %config.endpoint, "starting drive ui");

    let mut terminal = setup_terminal()?;

    let mut render_interval = tokio::time::interval(RENDER_INTERVAL);

    let result: Result<(), DriveError> = loop {
        if ui.quit {
            break Ok(());
        }

        tokio::select! {
            Some(completion) = completions.recv() => {
                let effects = view.apply(completion);
                executor.dispatch(&view, effects);
                ui.clamp(&view);
            }

            // Render tick, also polls keyboard input.
            _ = render_interval.tick() => {
                while event::poll(Duration::ZERO).unwrap_or(false) {
                    if let Ok(Event::Key(key)) = event::read() {
                        if key.kind == KeyEventKind::Press {
                            let effects = ui.handle_key(&mut view, key.code, wallet.as_ref());
                            executor.dispatch(&view, effects);
                            ui.clamp(&view);
                        }
                    }
                }

                if !ui.quit {
                    ui.tick = ui.tick.wrapping_add(1);
                    if let Err(e) = terminal.draw(|frame| render_ui(frame, &view, &ui)) {
                        break Err(DriveError::Terminal(format!("draw failed: {e}")));
                    }
                }
            }

            _ = cancel.cancelled() => {
                break Ok(());
            }
        }
    };

    restore_terminal(&mut terminal);
    result
}

/// Enter raw mode and the alternate screen, undoing both if a later step fails.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>, DriveError> {
    enable_raw_mode().map_err(|e| DriveError::Terminal(format!("failed to enable raw mode: {e}")))?;
    if let Err(e) = io::stdout().execute(EnterAlternateScreen) {
        let _ = disable_raw_mode();
        return Err(DriveError::Terminal(format!("failed to enter alternate screen: {e}")));
    }
    Terminal::new(CrosstermBackend::new(io::stdout())).map_err(|e| {
        let _ = disable_raw_mode();
        let _ = io::stdout().execute(LeaveAlternateScreen);
        DriveError::Terminal(format!("failed to create terminal: {e}"))
    })
}

/// Restore terminal to normal mode.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) {
    let _ = terminal.show_cursor();
    let _ = disable_raw_mode();
    let _ = io::stdout().execute(LeaveAlternateScreen);
}

// ---------------------------------------------------------------------------
// UI rendering
// ---------------------------------------------------------------------------

fn panel(title: &str, focused: bool) -> Block<'static> {
    let color = if focused { Color::Yellow } else { Color::Cyan };
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(format!(" {title} "))
}

/// Render the full frame.
fn render_ui(frame: &mut Frame, view: &DriveView, ui: &UiState) {
    let area = frame.area();

    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),       // header
            Constraint::Percentage(35), // form + accounts
            Constraint::Percentage(35), // local + remote files
            Constraint::Min(4),          // log
            Constraint::Length(1),       // key hints
        ])
        .split(area);

    render_header(frame, main_layout[0], view);

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(main_layout[1]);
    render_form(frame, top[0], view, ui);
    render_accounts(frame, top[1], view, ui);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(main_layout[2]);
    render_local_files(frame, middle[0], view, ui);
    render_remote_files(frame, middle[1], view, ui);

    render_log(frame, main_layout[3], view);

    let hints = match &ui.input {
        Some(Input::AccountName) => " typing account name | Enter create | Esc done".to_string(),
        Some(Input::Paths(buf)) => format!(" files: {buf}_"),
        None => " c connect | x disconnect | n name | s size | v version | a create | Tab focus \
                 | Enter select | d delete | o open | u upload | r refresh | q quit"
            .to_string(),
    };
    frame.render_widget(
        Paragraph::new(hints).style(Style::default().fg(Color::DarkGray)),
        main_layout[4],
    );
}

fn render_header(frame: &mut Frame, area: Rect, view: &DriveView) {
    let state = view.session().state().label();
    let status = match view.session().identity() {
        Some(identity) => format!("{state} {identity}"),
        None => state.to_string(),
    };
    let header = Paragraph::new(format!(" SHADOW DRIVE | {status}"))
        .style(Style::default().fg(Color::White).bg(Color::Blue).bold())
        .alignment(Alignment::Center);
    frame.render_widget(header, area);
}

fn render_form(frame: &mut Frame, area: Rect, view: &DriveView, ui: &UiState) {
    let editing = ui.input == Some(Input::AccountName);
    let cursor = if editing { "_" } else { "" };

    let mut lines = vec![
        Line::from(format!(" Name     {}{cursor}", view.form.name)),
        Line::from(format!(" Size     {}", view.form.size)),
        Line::from(format!(" Version  {}", view.form.version)),
        Line::from(""),
    ];
    if view.is_loading() {
        lines.push(Line::styled(
            " Creating account...",
            Style::default().fg(Color::Yellow),
        ));
    }
    if let (Some(tx), Some(url)) = (view.last_tx_short(), view.last_tx_url()) {
        lines.push(Line::from(format!(" Tx {tx}")));
        lines.push(Line::styled(
            format!(" {url}"),
            Style::default().fg(Color::DarkGray),
        ));
    }

    let paragraph = Paragraph::new(lines)
        .block(panel("Create Storage Account", editing))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_accounts(frame: &mut Frame, area: Rect, view: &DriveView, ui: &UiState) {
    let focused = ui.focus == Focus::Accounts && ui.input.is_none();
    let lines: Vec<Line> = view
        .accounts()
        .iter()
        .enumerate()
        .map(|(i, account)| {
            let marker = if view.selected() == Some(account.public_key) {
                "*"
            } else {
                " "
            };
            let text = format!(" {marker} {}  {}", account_label(account), account.public_key.short());
            if focused && i == ui.account_cursor {
                Line::styled(text, Style::default().add_modifier(Modifier::REVERSED))
            } else {
                Line::from(text)
            }
        })
        .collect();

    frame.render_widget(
        Paragraph::new(lines).block(panel("Storage Accounts", focused)),
        area,
    );
}

fn render_local_files(frame: &mut Frame, area: Rect, view: &DriveView, ui: &UiState) {
    let focused = ui.focus == Focus::Local && ui.input.is_none();
    let spinner = SPINNER[ui.tick % SPINNER.len()];
    let lines: Vec<Line> = view
        .file_rows()
        .into_iter()
        .map(|row| {
            let (status, color) = match &row.status {
                FileStatus::Pending => ("pending".to_string(), Color::DarkGray),
                FileStatus::Uploading => (format!("{spinner} uploading"), Color::Yellow),
                FileStatus::Uploaded(location) => (location.clone(), Color::Green),
                FileStatus::Failed(err) => (format!("failed: {err}"), Color::Red),
            };
            let mut line = Line::from(vec![
                Span::raw(format!(" {:>2}. {}  ", row.index + 1, row.name)),
                Span::styled(status, Style::default().fg(color)),
            ]);
            if focused && row.index == ui.local_cursor {
                line = line.style(Style::default().add_modifier(Modifier::REVERSED));
            }
            line
        })
        .collect();

    let title = match (view.selected(), view.is_uploading()) {
        (Some(account), true) => format!("Uploading to {}", account.short()),
        (Some(account), false) => format!("Upload to {}", account.short()),
        (None, _) => "Upload (select an account)".to_string(),
    };
    frame.render_widget(Paragraph::new(lines).block(panel(&title, focused)), area);
}

fn render_remote_files(frame: &mut Frame, area: Rect, view: &DriveView, ui: &UiState) {
    let focused = ui.focus == Focus::Remote && ui.input.is_none();
    let lines: Vec<Line> = view
        .remote_rows()
        .into_iter()
        .enumerate()
        .map(|(i, (name, url))| {
            let line = Line::from(vec![
                Span::raw(format!(" {name}  ")),
                Span::styled(url.to_string(), Style::default().fg(Color::DarkGray)),
            ]);
            if focused && i == ui.remote_cursor {
                line.style(Style::default().add_modifier(Modifier::REVERSED))
            } else {
                line
            }
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(panel("Files", focused)), area);
}

/// Render the notice log, newest at the bottom.
fn render_log(frame: &mut Frame, area: Rect, view: &DriveView) {
    let visible = area.height.saturating_sub(2) as usize;
    let notices = view.notices();
    let lines: Vec<Line> = notices
        .iter()
        .skip(notices.len().saturating_sub(visible))
        .map(|n| match n.level {
            NoticeLevel::Info => Line::from(format!(" {}", n.message)),
            NoticeLevel::Error => Line::styled(
                format!(" error: {}", n.message),
                Style::default().fg(Color::Red),
            ),
        })
        .collect();

    let paragraph = Paragraph::new(lines)
        .block(panel("Log", false))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}
