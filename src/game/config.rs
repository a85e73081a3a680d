use serde::{Deserialize, Serialize};

/// Configuration for the game board and timings.
///
/// All geometry is in pixels; every cell is `cell_size` square and the
/// playable band sits below a `top_margin` reserved for the status line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Playable width
    pub board_width: i32,
    /// Playable height (excluding the top margin)
    pub board_height: i32,
    /// Rows of pixels reserved above the board
    pub top_margin: i32,
    /// Edge length of one grid cell
    pub cell_size: i32,
    /// Ticks a collected power-up stays active
    pub power_up_duration: u32,
    /// Rejection-sampling attempts before falling back to a grid scan
    pub max_spawn_attempts: usize,
    /// Milliseconds per simulation tick
    pub tick_millis: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            board_width: 750,
            board_height: 750,
            top_margin: 50,
            cell_size: 50,
            power_up_duration: 20,
            max_spawn_attempts: 1000,
            tick_millis: 200,
        }
    }
}

impl GameConfig {
    /// Number of columns on the board
    pub fn columns(&self) -> i32 {
        self.board_width / self.cell_size
    }

    /// Number of rows on the board
    pub fn rows(&self) -> i32 {
        self.board_height / self.cell_size
    }

    /// Lowest playable y coordinate
    pub fn min_y(&self) -> i32 {
        self.top_margin
    }

    /// One past the highest playable y coordinate
    pub fn max_y(&self) -> i32 {
        self.top_margin + self.board_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GameConfig::default();
        assert_eq!(config.board_width, 750);
        assert_eq!(config.board_height, 750);
        assert_eq!(config.top_margin, 50);
        assert_eq!(config.cell_size, 50);
        assert_eq!(config.power_up_duration, 20);
    }

    #[test]
    fn test_grid_dimensions() {
        let config = GameConfig::default();
        assert_eq!(config.columns(), 15);
        assert_eq!(config.rows(), 15);
        assert_eq!(config.min_y(), 50);
        assert_eq!(config.max_y(), 800);
    }
}
