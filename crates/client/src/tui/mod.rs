mod screens;

use std::io;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableFocusChange, EnableFocusChange, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
    PushKeyboardEnhancementFlags,
};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use mirra::HostEvent;

use crate::debug::DebugStats;
use crate::game::Session;
use crate::net::NetworkClient;

pub use screens::BoardView;

/// Terminals without release reporting only repeat presses, so held keys are
/// released after this long without one.
const LEGACY_RELEASE_AFTER: Duration = Duration::from_millis(600);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    None,
    Quit,
    ToggleDebug,
}

pub struct Tui {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    release_events: bool,
    last_press: Option<Instant>,
}

impl Tui {
    pub fn new() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, cursor::Hide, EnableFocusChange)?;

        let release_events = terminal::supports_keyboard_enhancement().unwrap_or(false);
        if release_events {
            execute!(
                stdout,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
        } else {
            log::info!("Terminal does not report key releases, releasing held keys on timeout");
        }

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            release_events,
            last_press: None,
        })
    }

    /// Runs the board until the user quits.
    pub fn run(
        &mut self,
        session: &mut Session,
        mut client: Option<&mut NetworkClient>,
        frame_rate: u32,
    ) -> io::Result<()> {
        let frame_time = Duration::from_secs_f64(1.0 / f64::from(frame_rate.max(1)));
        let mut stats = DebugStats::new();

        loop {
            let started = Instant::now();

            if let Some(client) = client.as_deref_mut() {
                for message in client.poll() {
                    if let Some(state) = message.game_state() {
                        session.apply_game_state(state);
                        stats.record_snapshot();
                    }
                }
            }

            while event::poll(Duration::ZERO)? {
                match self.handle_event(session, event::read()?) {
                    Action::Quit => return Ok(()),
                    Action::ToggleDebug => {
                        session.handle_host_event(HostEvent::DebugModeToggled { enabled: None });
                    }
                    Action::None => {}
                }
            }

            if !self.release_events
                && self
                    .last_press
                    .is_some_and(|at| at.elapsed() >= LEGACY_RELEASE_AFTER)
            {
                self.last_press = None;
                session.release_keys();
            }

            session.frame();
            stats.record_frame();

            for intent in session.drain_intents() {
                if let Some(client) = client.as_deref_mut() {
                    if client.send_intent(&intent) {
                        stats.record_intent();
                    }
                }
            }

            let connection = client.as_deref().map(|c| c.state());
            let view = BoardView {
                session,
                stats: &stats,
                connection,
            };
            self.terminal.draw(|frame| screens::render(frame, &view))?;

            if let Some(remaining) = frame_time.checked_sub(started.elapsed()) {
                thread::sleep(remaining);
            }
        }
    }

    fn handle_event(&mut self, session: &mut Session, event: Event) -> Action {
        match event {
            Event::Key(key) => self.handle_key(session, key),
            Event::FocusLost => {
                session.release_keys();
                Action::None
            }
            _ => Action::None,
        }
    }

    fn handle_key(&mut self, session: &mut Session, key: KeyEvent) -> Action {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Action::Quit;
        }

        match (key.code, key.kind) {
            (KeyCode::Esc, KeyEventKind::Press) => Action::Quit,
            (KeyCode::F(3), KeyEventKind::Press) => Action::ToggleDebug,
            (KeyCode::Char(c), KeyEventKind::Press) => {
                let repeat = !self.release_events && session.is_key_held(c);
                self.last_press = Some(Instant::now());
                session.key_down(c, repeat);
                Action::None
            }
            (KeyCode::Char(c), KeyEventKind::Repeat) => {
                session.key_down(c, true);
                Action::None
            }
            (KeyCode::Char(c), KeyEventKind::Release) => {
                session.key_up(c);
                Action::None
            }
            _ => Action::None,
        }
    }

    pub fn restore_terminal(&mut self) -> io::Result<()> {
        if self.release_events {
            execute!(self.terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
        }
        terminal::disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            DisableFocusChange,
            LeaveAlternateScreen,
            cursor::Show
        )?;
        Ok(())
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        let _ = self.restore_terminal();
    }
}

pub fn run_board(
    session: &mut Session,
    client: Option<&mut NetworkClient>,
    frame_rate: u32,
) -> io::Result<()> {
    let mut tui = Tui::new()?;
    let result = tui.run(session, client, frame_rate);
    tui.restore_terminal()?;
    result
}
