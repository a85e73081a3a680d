use std::time::{Duration, Instant};

/// Per-run play statistics shown in the header and on the game-over screen
pub struct GameMetrics {
    pub game_started: Instant,
    pub elapsed_time: Duration,
    pub high_score: u32,
    pub games_played: u32,
    /// Ticks in which the coach was showing a warning, this game
    pub warned_ticks: u32,
    /// Warnings that appeared, across the whole run
    pub warnings_raised: u32,
    was_warning: bool,
}

impl GameMetrics {
    pub fn new() -> Self {
        Self {
            game_started: Instant::now(),
            elapsed_time: Duration::ZERO,
            high_score: 0,
            games_played: 0,
            warned_ticks: 0,
            warnings_raised: 0,
            was_warning: false,
        }
    }

    pub fn update(&mut self) {
        self.elapsed_time = self.game_started.elapsed();
    }

    pub fn on_game_start(&mut self) {
        self.game_started = Instant::now();
        self.elapsed_time = Duration::ZERO;
        self.warned_ticks = 0;
        self.was_warning = false;
    }

    /// Track the coach state after a tick; a warning counts once until it clears
    pub fn on_tick(&mut self, warning_shown: bool) {
        if warning_shown {
            self.warned_ticks += 1;
            if !self.was_warning {
                self.warnings_raised += 1;
            }
        }
        self.was_warning = warning_shown;
    }

    pub fn on_game_over(&mut self, final_score: u32) {
        self.update();
        self.games_played += 1;
        self.high_score = self.high_score.max(final_score);
    }

    pub fn format_time(&self) -> String {
        let total_secs = self.elapsed_time.as_secs();
        format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
    }
}

impl Default for GameMetrics {
    fn default() -> Self {
        Self::new()
    }
}
