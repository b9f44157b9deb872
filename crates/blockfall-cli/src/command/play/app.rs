use blockfall_engine::{GameState, RandomPieceSupplier};
use crossterm::event::{Event, KeyCode};
use ratatui::{
    Frame,
    layout::{Constraint, Layout},
};

use crate::{
    tui::{App, Runtime},
    ui::widgets::{GameDisplay, KeyBinding, KeyBindingDisplay},
};

const PLAYING_BINDINGS: &[KeyBinding] = &[
    (&["←", "→"], "Move"),
    (&["↓"], "Soft Drop"),
    (&["↑", "Space"], "Hard Drop"),
    (&["Z", "X"], "Rotate"),
    (&["P"], "Pause"),
    (&["Q"], "Quit"),
];

const PAUSED_BINDINGS: &[KeyBinding] = &[(&["P"], "Resume"), (&["Q"], "Quit")];

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
enum PlayState {
    Playing,
    Paused,
}

#[derive(Debug)]
pub struct PlayApp {
    game: GameState<RandomPieceSupplier>,
    state: PlayState,
    fps: u32,
    is_exiting: bool,
}

impl PlayApp {
    pub fn new(game: GameState<RandomPieceSupplier>, fps: u32) -> Self {
        Self {
            game,
            state: PlayState::Playing,
            fps,
            is_exiting: false,
        }
    }

    fn is_playing(&self) -> bool {
        !self.is_exiting && self.state.is_playing()
    }

    fn toggle_pause(&mut self) {
        self.state = match self.state {
            PlayState::Playing => PlayState::Paused,
            PlayState::Paused => PlayState::Playing,
        };
    }
}

impl App for PlayApp {
    fn init(&mut self, runtime: &mut Runtime) {
        runtime.set_tick_rate(Some(f64::from(self.fps)));
    }

    fn should_exit(&self) -> bool {
        self.is_exiting
    }

    fn handle_event(&mut self, _runtime: &mut Runtime, event: &Event) {
        let is_playing = self.is_playing();

        if let Some(event) = event.as_key_press_event() {
            match event.code {
                KeyCode::Left if is_playing => _ = self.game.move_left(),
                KeyCode::Right if is_playing => _ = self.game.move_right(),
                KeyCode::Down if is_playing => _ = self.game.soft_drop(),
                KeyCode::Up | KeyCode::Char(' ') if is_playing => _ = self.game.hard_drop(),
                KeyCode::Char('z' | 'x') if is_playing => _ = self.game.rotate(),
                KeyCode::Char('p') => self.toggle_pause(),
                KeyCode::Char('q') => self.is_exiting = true,
                _ => {}
            }
        }
    }

    fn draw(&self, frame: &mut Frame) {
        let game_display = GameDisplay::new(&self.game).paused(self.state.is_paused());
        let bindings = match self.state {
            PlayState::Playing => PLAYING_BINDINGS,
            PlayState::Paused => PAUSED_BINDINGS,
        };

        let [main_area, help_area] = Layout::vertical([
            Constraint::Length(game_display.height()),
            Constraint::Length(1),
        ])
        .areas(frame.area());
        frame.render_widget(game_display, main_area);
        frame.render_widget(KeyBindingDisplay::new(bindings), help_area);
    }

    fn update(&mut self, _runtime: &mut Runtime) {
        if self.is_playing() {
            self.game.update();
        }
    }
}
