//! Terminal host for the transcript (impure shell)

pub mod constants;
mod styles;
pub mod transcript;
pub mod wrap;

pub use styles::{ColorConfig, TranscriptStyles};
pub use transcript::{Transcript, TranscriptEntry, WrapCache};

use crate::config::ResolvedConfig;
use crate::model::InputError;
use crate::source::ReplaySource;
use constants::{FALLBACK_WIDTH, FRAME_INTERVAL, STATUS_BAR_HEIGHT};
use crossterm::{
    ExecutableCommand,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Layout},
    text::{Line, Text},
    widgets::Paragraph,
};
use std::io::{self, Stdout};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur during TUI operations
#[derive(Debug, Error)]
pub enum TuiError {
    /// IO error during terminal operations
    #[error("Terminal IO error: {0}")]
    Io(#[from] io::Error),

    /// Input source error
    #[error("Input error: {0}")]
    Input(#[from] InputError),
}

/// Replay viewer application
///
/// Generic over backend to support testing with TestBackend
pub struct TranscriptApp<B>
where
    B: Backend,
{
    terminal: Terminal<B>,
    transcript: Transcript,
    source: ReplaySource,
    cache: WrapCache,
    styles: TranscriptStyles,
}

impl TranscriptApp<CrosstermBackend<Stdout>> {
    /// Create the application on the real terminal
    ///
    /// Sets up terminal in raw mode with alternate screen
    pub fn new(source: ReplaySource, config: &ResolvedConfig) -> Result<Self, TuiError> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        stdout.execute(EnterAlternateScreen)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self::with_terminal(terminal, source, config))
    }

    /// Run the event loop until the user quits (q or Ctrl+C)
    ///
    /// Wakes every frame interval to poll the replay and deliver reveal
    /// ticks; keys and resizes are handled as they arrive.
    pub fn run(&mut self) -> Result<(), TuiError> {
        self.draw()?;

        loop {
            if event::poll(FRAME_INTERVAL)? {
                match event::read()? {
                    Event::Key(key) if key.kind != KeyEventKind::Release => {
                        if self.handle_key(key) {
                            return Ok(());
                        }
                    }
                    Event::Resize(width, height) => {
                        debug!(width, height, "Terminal resized");
                    }
                    _ => {}
                }
            }
            self.step(Instant::now())?;
        }
    }
}

impl<B> TranscriptApp<B>
where
    B: Backend,
{
    /// Build the application on an existing terminal.
    pub fn with_terminal(terminal: Terminal<B>, source: ReplaySource, config: &ResolvedConfig) -> Self {
        info!(messages = source.message_count(), "Starting replay");
        Self {
            terminal,
            transcript: Transcript::new(config),
            source,
            cache: WrapCache::from_config(&config.cache),
            styles: TranscriptStyles::default(),
        }
    }

    /// One host frame: pull due replay events, deliver due reveal ticks,
    /// then redraw.
    pub fn step(&mut self, now: Instant) -> Result<(), TuiError> {
        let events = self.source.poll(now);
        if !events.is_empty() {
            self.transcript.apply(events);
        }
        self.transcript.tick(now);
        self.draw()
    }

    /// Handle a key press. Returns true when the app should quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return true;
        }

        let page = (self.transcript.list().viewport().extent - 1.0).max(1.0);
        match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Up | KeyCode::Char('k') => self.transcript.scroll_by(-1.0),
            KeyCode::Down | KeyCode::Char('j') => self.transcript.scroll_by(1.0),
            KeyCode::PageUp => self.transcript.scroll_by(-page),
            KeyCode::PageDown => self.transcript.scroll_by(page),
            KeyCode::Home | KeyCode::Char('g') => self.transcript.scroll_to_top(),
            KeyCode::End | KeyCode::Char('G') => self.transcript.scroll_to_end(),
            _ => {}
        }
        false
    }

    /// Render the visible part of the transcript and the status bar.
    pub fn draw(&mut self) -> Result<(), TuiError> {
        let size = self.terminal.size()?;
        let width = if size.width == 0 { FALLBACK_WIDTH } else { size.width };
        let body_height = size.height.saturating_sub(STATUS_BAR_HEIGHT);

        self.transcript.set_extent(f64::from(body_height));
        self.transcript.measure(width, &mut self.cache);
        let lines = self.transcript.visible_lines(width, &mut self.cache);
        let status = self.status_line();
        let styles = self.styles;

        self.terminal.draw(|frame| {
            let [body_area, status_area] =
                Layout::vertical([Constraint::Min(0), Constraint::Length(STATUS_BAR_HEIGHT)])
                    .areas(frame.area());

            let body = Text::from(lines.into_iter().map(Line::from).collect::<Vec<_>>())
                .style(styles.finished);
            frame.render_widget(Paragraph::new(body), body_area);
            frame.render_widget(Paragraph::new(status).style(styles.status), status_area);
        })?;
        Ok(())
    }

    fn status_line(&self) -> String {
        let list = self.transcript.list();
        let state = if self.transcript.is_complete() {
            "done"
        } else if self.transcript.is_streaming() {
            "streaming"
        } else {
            "waiting"
        };
        let mut parts = vec![
            format!("{}/{} messages", list.len(), self.source.message_count()),
            state.to_string(),
        ];
        if list.is_sticky() {
            parts.push("FOLLOW".to_string());
        }
        parts.push(format!("cache {} hits", self.cache.stats().hits));
        parts.join(" | ")
    }

    /// The transcript being shown.
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// The terminal, for inspecting a TestBackend buffer.
    pub fn terminal(&self) -> &Terminal<B> {
        &self.terminal
    }
}

/// Run the viewer over `source` on the real terminal.
///
/// Restores the terminal whether the event loop succeeds or fails.
/// Logging must be initialized by the caller.
pub fn run_with_source(source: ReplaySource, config: &ResolvedConfig) -> Result<(), TuiError> {
    let mut app = TranscriptApp::new(source, config)?;

    let result = app.run();

    restore_terminal()?;

    result
}

/// Restore terminal to normal state
fn restore_terminal() -> Result<(), TuiError> {
    disable_raw_mode()?;
    io::stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}
