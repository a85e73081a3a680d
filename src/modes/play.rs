use anyhow::{Context, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Frame, Terminal, backend::CrosstermBackend, layout::Rect};
use std::io::{Stderr, stderr};
use std::time::Duration;
use tokio::time::interval;
use tracing::{info, warn};

use crate::coach::TrainerConfig;
use crate::game::{Direction, GameConfig, SnakeColor};
use crate::input::{InputHandler, KeyAction};
use crate::metrics::GameMetrics;
use crate::render::Renderer;
use crate::session::{GameSession, SessionPaths, ShutdownReport};

/// Settings for an interactive run
#[derive(Debug, Clone)]
pub struct PlayConfig {
    pub game: GameConfig,
    pub paths: SessionPaths,
    /// Ticks the coach looks ahead
    pub lookahead: u32,
    /// Used by the retrain at shutdown
    pub trainer: TrainerConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Start { selected: usize },
    Playing,
    GameOver { score: i32 },
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stderr>>> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stderr = stderr();
    execute!(stderr, EnterAlternateScreen, EnableMouseCapture)
        .context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stderr);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
    terminal.hide_cursor().context("Failed to hide cursor")?;
    terminal.clear().context("Failed to clear terminal")?;
    Ok(terminal)
}

/// Undo `setup_terminal` without a `Terminal`, for when setup failed midway
fn restore_terminal() -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(stderr(), DisableMouseCapture, LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    Ok(())
}

pub struct PlayMode {
    session: GameSession,
    screen: Screen,
    metrics: GameMetrics,
    renderer: Renderer,
    input_handler: InputHandler,
    tick_millis: u64,
    /// Last drawn frame area, for mouse hit-testing
    frame_area: Rect,
    should_quit: bool,
}

impl PlayMode {
    pub fn new(config: PlayConfig) -> Self {
        let tick_millis = config.game.tick_millis;
        let session = GameSession::open(
            config.game,
            SnakeColor::SELECTABLE[0],
            config.paths,
            config.lookahead,
            config.trainer,
        );

        Self {
            session,
            screen: Screen::Start { selected: 0 },
            metrics: GameMetrics::new(),
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            tick_millis,
            frame_area: Rect::default(),
            should_quit: false,
        }
    }

    /// Run until the player quits, then save the session's data and retrain.
    ///
    /// The shutdown runs after the terminal is restored, whether the loop
    /// ended normally or with an error.
    pub async fn run(&mut self) -> Result<ShutdownReport> {
        let result = match setup_terminal() {
            Ok(mut terminal) => {
                let result = self.run_game_loop(&mut terminal).await;
                let cleanup = self.cleanup_terminal(&mut terminal);
                result.and(cleanup)
            }
            Err(err) => {
                // raw mode or the alternate screen may already be on
                if let Err(restore_err) = restore_terminal() {
                    warn!(%restore_err, "failed to restore terminal after setup error");
                }
                Err(err)
            }
        };

        self.finish(result)
    }

    /// Save and retrain, then pass on how the interactive part ended
    fn finish(&mut self, result: Result<()>) -> Result<ShutdownReport> {
        println!("Saving game data and retraining the AI coach...");
        let report = self.session.shutdown();
        for line in report.summary_lines() {
            println!("{line}");
        }

        result.map(|()| report)
    }

    async fn run_game_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();
        let mut tick_timer = interval(Duration::from_millis(self.tick_millis));
        // ~30 FPS
        let mut render_timer = interval(Duration::from_millis(33));

        loop {
            tokio::select! {
                maybe_event = event_stream.next() => {
                    if let Some(Ok(event)) = maybe_event {
                        self.handle_event(event);
                    }
                }

                _ = tick_timer.tick() => {
                    if self.screen == Screen::Playing {
                        self.update_game();
                    }
                }

                _ = render_timer.tick() => {
                    if self.screen == Screen::Playing {
                        self.metrics.update();
                    }
                    terminal.draw(|frame| self.draw(frame)).context("Failed to draw frame")?;
                }

                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn draw(&mut self, frame: &mut Frame) {
        self.frame_area = frame.area();
        match self.screen {
            Screen::Start { selected } => self.renderer.render_start(frame, selected),
            Screen::Playing => self.renderer.render_play(frame, &self.session, &self.metrics),
            Screen::GameOver { score } => self.renderer.render_game_over(frame, score, &self.metrics),
        }
    }

    fn handle_event(&mut self, event: Event) {
        let action = match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.input_handler.handle_key_event(key),
            Event::Mouse(mouse) => self.input_handler.handle_mouse_event(mouse),
            _ => KeyAction::None,
        };
        self.apply(action);
    }

    fn apply(&mut self, action: KeyAction) {
        if action == KeyAction::Quit {
            self.should_quit = true;
            return;
        }

        match self.screen {
            Screen::Start { selected } => {
                let options = SnakeColor::SELECTABLE.len();
                let next = match action {
                    KeyAction::Move(Direction::Up) => Some((selected + options - 1) % options),
                    KeyAction::Move(Direction::Down) => Some((selected + 1) % options),
                    KeyAction::SelectColor(index) if index < options => Some(index),
                    KeyAction::Click { column, row } => {
                        Renderer::color_option_at(self.frame_area, column, row)
                    }
                    KeyAction::Confirm => {
                        self.start_game(SnakeColor::SELECTABLE[selected]);
                        None
                    }
                    _ => None,
                };
                if let Some(selected) = next {
                    self.screen = Screen::Start { selected };
                }
            }
            Screen::Playing => {
                if let KeyAction::Move(direction) = action {
                    self.session.queue_direction(direction);
                }
            }
            Screen::GameOver { .. } => {
                if action == KeyAction::Confirm {
                    self.session.restart();
                    self.metrics.on_game_start();
                    self.screen = Screen::Playing;
                }
            }
        }
    }

    fn start_game(&mut self, color: SnakeColor) {
        info!(color = color.name(), "game started");
        self.session.restart_with(color);
        self.metrics.on_game_start();
        self.screen = Screen::Playing;
    }

    fn update_game(&mut self) {
        let result = self.session.tick();
        self.metrics.on_tick(self.session.warning().is_some());

        if result.terminated && !self.session.state().is_alive {
            let score = self.session.state().score();
            info!(score, collision = ?result.info.collision_type, "game over");
            self.metrics.on_game_over(score.max(0) as u32);
            self.screen = Screen::GameOver { score };
        }
    }

    fn cleanup_terminal(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(terminal.backend_mut(), DisableMouseCapture, LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}
