use std::time::{Duration, Instant};

use anyhow::Context;
use crossterm::event::Event;
use dragontris_engine::{GameSession, SessionConfig, SessionState, SkipZeroScore};
use ratatui::{
    Frame,
    layout::{Constraint, Layout},
};

use crate::{
    input::{self, KeyAction},
    results::JsonLinesSink,
    tui::App,
    view::widgets::{KeyBinding, KeyBindingDisplay, SessionDisplay},
};

const PLAYING_KEYS: &[KeyBinding] = &[
    (&["←", "→"], "Move"),
    (&["↓"], "Drop"),
    (&["↑"], "Rotate"),
    (&["G"], "Ghost"),
    (&["P"], "Pause"),
    (&["Q"], "Quit"),
];
const PAUSED_KEYS: &[KeyBinding] = &[(&["P"], "Resume"), (&["G"], "Ghost"), (&["Q"], "Quit")];
const LEVEL_UP_KEYS: &[KeyBinding] = &[
    (&["Enter"], "Continue"),
    (&["G"], "Ghost"),
    (&["Q"], "Quit"),
];
const GAME_OVER_KEYS: &[KeyBinding] = &[(&["R"], "Restart"), (&["Q"], "Quit")];

#[derive(Debug)]
pub struct PlayApp {
    session: GameSession,
    sink: Option<SkipZeroScore<JsonLinesSink>>,
    started: Instant,
    is_exiting: bool,
    error: Option<anyhow::Error>,
}

impl PlayApp {
    pub fn new(
        config: SessionConfig,
        sink: Option<SkipZeroScore<JsonLinesSink>>,
    ) -> anyhow::Result<Self> {
        let mut session = GameSession::new(config);
        session
            .start(Duration::ZERO)
            .context("Failed to start session")?;
        Ok(Self {
            session,
            sink,
            started: Instant::now(),
            is_exiting: false,
            error: None,
        })
    }

    /// Session clock: time since the app was created.
    fn now(&self) -> Duration {
        self.started.elapsed()
    }

    /// Returns the first error hit while the terminal was in use.
    pub fn finish(self) -> anyhow::Result<()> {
        self.error.map_or(Ok(()), Err)
    }

    fn report_result(&mut self) {
        let Some(sink) = &mut self.sink else {
            return;
        };
        if let Err(err) = self.session.report_result(sink) {
            log::error!("failed to save result: {err:#}");
            self.error.get_or_insert(err);
            self.is_exiting = true;
        }
    }

    fn restart(&mut self) {
        let now = self.now();
        if let Err(err) = self.session.start(now) {
            log::warn!("restart rejected: {err}");
        }
    }
}

impl App for PlayApp {
    fn should_exit(&self) -> bool {
        self.is_exiting
    }

    fn handle_event(&mut self, event: Event) {
        let Some(key) = event.as_key_event() else {
            return;
        };
        let debug = self.session.config().debug_commands;
        match input::key_action(key, debug) {
            Some(KeyAction::Command(command)) => {
                let now = self.now();
                if let Err(err) = self.session.apply(command, now) {
                    log::trace!("{command:?} rejected: {err}");
                }
            }
            Some(KeyAction::Restart) if self.session.session_state().is_game_over() => {
                self.restart();
            }
            Some(KeyAction::Quit) => self.is_exiting = true,
            Some(KeyAction::Restart) | None => {}
        }
    }

    fn draw(&self, frame: &mut Frame) {
        let snapshot = self.session.snapshot();
        let bindings = match snapshot.session_state {
            SessionState::NotStarted | SessionState::Playing => PLAYING_KEYS,
            SessionState::Paused => PAUSED_KEYS,
            SessionState::LevelUp => LEVEL_UP_KEYS,
            SessionState::GameOver => GAME_OVER_KEYS,
        };

        let [main_area, help_area] =
            Layout::vertical([Constraint::Length(24), Constraint::Length(1)])
                .areas::<2>(frame.area());
        frame.render_widget(SessionDisplay::new(&snapshot), main_area);
        frame.render_widget(KeyBindingDisplay::new(bindings), help_area);
    }

    fn update(&mut self) {
        let now = self.now();
        self.session.tick(now);
        if self.session.session_state().is_game_over() {
            self.report_result();
        }
    }
}
