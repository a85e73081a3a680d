use rand::Rng;
use tracing::warn;

use super::config::GameConfig;
use super::state::Position;

/// Picks grid-aligned cells for food and power-ups.
///
/// Cells are drawn uniformly and rejected while they land on a blocked cell.
/// After `max_attempts` rejections the board is scanned row by row and the
/// first free cell is used, so placement always terminates.
#[derive(Debug, Clone)]
pub struct Spawner {
    max_attempts: usize,
}

impl Spawner {
    pub fn new(max_attempts: usize) -> Self {
        Self { max_attempts }
    }

    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(config.max_spawn_attempts)
    }

    /// Returns a free cell, or `None` when every cell is blocked
    pub fn spawn<R: Rng>(
        &self,
        rng: &mut R,
        config: &GameConfig,
        blocked: &[Position],
    ) -> Option<Position> {
        for _ in 0..self.max_attempts {
            let pos = random_cell(rng, config);
            if !blocked.contains(&pos) {
                return Some(pos);
            }
        }

        warn!(
            attempts = self.max_attempts,
            "random placement exhausted, scanning for a free cell"
        );
        scan_free_cell(config, blocked)
    }
}

fn random_cell<R: Rng>(rng: &mut R, config: &GameConfig) -> Position {
    let column = rng.gen_range(0..config.columns());
    let row = rng.gen_range(0..config.rows());
    Position::new(
        column * config.cell_size,
        config.top_margin + row * config.cell_size,
    )
}

fn scan_free_cell(config: &GameConfig, blocked: &[Position]) -> Option<Position> {
    (0..config.rows())
        .flat_map(|row| (0..config.columns()).map(move |column| (column, row)))
        .map(|(column, row)| {
            Position::new(
                column * config.cell_size,
                config.top_margin + row * config.cell_size,
            )
        })
        .find(|pos| !blocked.contains(pos))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::obstacle_layout;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_spawns_never_hit_obstacles() {
        let config = GameConfig::default();
        let obstacles = obstacle_layout(&config);
        let spawner = Spawner::from_config(&config);
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..10_000 {
            let pos = spawner.spawn(&mut rng, &config, &obstacles).unwrap();
            assert!(!obstacles.contains(&pos));
        }
    }

    #[test]
    fn test_spawns_are_aligned_and_in_bounds() {
        let config = GameConfig::default();
        let spawner = Spawner::from_config(&config);
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..1_000 {
            let pos = spawner.spawn(&mut rng, &config, &[]).unwrap();
            assert_eq!(pos.x % config.cell_size, 0);
            assert_eq!(pos.y % config.cell_size, 0);
            assert!(pos.x >= 0 && pos.x < config.board_width);
            assert!(pos.y >= config.min_y() && pos.y < config.max_y());
        }
    }

    #[test]
    fn test_fallback_scan_finds_last_free_cell() {
        let config = GameConfig::default();
        let free = Position::new(700, 750);
        let blocked: Vec<Position> = (0..config.rows())
            .flat_map(|row| (0..config.columns()).map(move |column| (column, row)))
            .map(|(c, r)| Position::new(c * 50, 50 + r * 50))
            .filter(|pos| *pos != free)
            .collect();

        let spawner = Spawner::new(3);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(spawner.spawn(&mut rng, &config, &blocked), Some(free));
    }

    #[test]
    fn test_full_board_yields_none() {
        let config = GameConfig::default();
        let blocked: Vec<Position> = (0..config.rows())
            .flat_map(|row| (0..config.columns()).map(move |column| (column, row)))
            .map(|(c, r)| Position::new(c * 50, 50 + r * 50))
            .collect();

        let spawner = Spawner::new(10);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(spawner.spawn(&mut rng, &config, &blocked), None);
    }
}
