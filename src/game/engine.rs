use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::debug;

use super::{
    action::Action,
    config::GameConfig,
    spawn::Spawner,
    state::{CollisionType, GameState, Position, PowerUp, Snake, SnakeColor, obstacle_layout},
};
use crate::coach::FeatureRecord;

/// Information about a step
#[derive(Debug, Clone, PartialEq)]
pub struct StepInfo {
    /// Whether the snake ate food this step
    pub ate_food: bool,
    /// Whether a power-up was picked up this step
    pub collected_power_up: bool,
    /// First collision found, if any
    pub collision_type: Option<CollisionType>,
}

/// Result of a game step
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    /// Feature record for this tick; `None` only when the game was already over
    pub record: Option<FeatureRecord>,
    /// Whether the game has terminated
    pub terminated: bool,
    pub info: StepInfo,
}

/// Owns the board rules and the random source used for spawning
pub struct GameEngine {
    config: GameConfig,
    spawner: Spawner,
    obstacles: Vec<Position>,
    rng: StdRng,
}

impl GameEngine {
    pub fn new(config: GameConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Engine with a fixed seed, for reproducible games
    pub fn seeded(config: GameConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: GameConfig, rng: StdRng) -> Self {
        Self {
            spawner: Spawner::from_config(&config),
            obstacles: obstacle_layout(&config),
            config,
            rng,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Fresh game: new snake, new food, no power-up
    pub fn reset(&mut self, color: SnakeColor) -> GameState {
        let snake = Snake::spawn(&self.config, color);
        let food = self
            .spawn_cell()
            .unwrap_or(Position::new(0, self.config.top_margin));
        GameState::new(snake, food, self.obstacles.clone())
    }

    /// Execute one tick.
    ///
    /// Collisions are checked on the current head before it moves, in the
    /// order obstacle, self, wall. Exactly one feature record is produced per
    /// simulated tick; a dead snake is left where it is.
    pub fn step(&mut self, state: &mut GameState, action: Action) -> StepResult {
        if !state.is_alive {
            return StepResult {
                record: None,
                terminated: true,
                info: StepInfo {
                    ate_food: false,
                    collected_power_up: false,
                    collision_type: None,
                },
            };
        }

        if let Action::Move(direction) = action {
            state.snake.turn(direction);
        }

        let collision_type = self.check_collision(state);
        let record = FeatureRecord::new(
            state.snake.head,
            state.snake.direction,
            state.food,
            collision_type.is_some(),
        );
        state.ticks += 1;

        if let Some(kind) = collision_type {
            state.is_alive = false;
            debug!(?kind, score = state.score(), "snake died");
            return StepResult {
                record: Some(record),
                terminated: true,
                info: StepInfo {
                    ate_food: false,
                    collected_power_up: false,
                    collision_type,
                },
            };
        }

        state.snake.advance(self.config.cell_size);
        state.snake.tick_power_up();

        self.update_power_up(state);
        let collected_power_up = self.collect_power_up(state);
        let ate_food = self.eat_food(state);

        StepResult {
            record: Some(record),
            terminated: false,
            info: StepInfo {
                ate_food,
                collected_power_up,
                collision_type: None,
            },
        }
    }

    /// Check whether the current head position is fatal
    fn check_collision(&self, state: &GameState) -> Option<CollisionType> {
        let head = state.snake.head;

        if !state.snake.powered_up && state.is_obstacle(head) {
            return Some(CollisionType::Obstacle);
        }

        if state.snake.collides_with_body(head) {
            return Some(CollisionType::SelfCollision);
        }

        let in_x = head.x >= 0 && head.x < self.config.board_width;
        let in_y = head.y >= self.config.min_y() && head.y < self.config.max_y();
        if !in_x || !in_y {
            return Some(CollisionType::Wall);
        }

        None
    }

    /// Place a power-up when the score schedule calls for one
    fn update_power_up(&mut self, state: &mut GameState) {
        let score = state.score();
        if !state.power_up.is_due(score) {
            return;
        }
        if let Some(pos) = self.spawn_cell() {
            state.power_up.place(pos);
            debug!(score, x = pos.x, y = pos.y, "power-up spawned");
        }
    }

    fn collect_power_up(&mut self, state: &mut GameState) -> bool {
        if !state.power_up.active || state.snake.head != state.power_up.position {
            return false;
        }
        state
            .snake
            .activate_power_up(self.config.power_up_duration);
        state.power_up = PowerUp::inactive(state.score());
        true
    }

    fn eat_food(&mut self, state: &mut GameState) -> bool {
        if state.snake.head != state.food {
            return false;
        }
        state.snake.grow();
        if let Some(pos) = self.spawn_cell() {
            state.food = pos;
        }
        true
    }

    fn spawn_cell(&mut self) -> Option<Position> {
        self.spawner
            .spawn(&mut self.rng, &self.config, &self.obstacles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Direction;
    use std::collections::VecDeque;

    fn engine() -> GameEngine {
        GameEngine::seeded(GameConfig::default(), 42)
    }

    fn snake_at(head: Position, direction: Direction, body: &[Position]) -> Snake {
        let mut snake = Snake::new(head, direction, 50, SnakeColor::Green);
        snake.body = body.iter().copied().collect();
        snake
    }

    #[test]
    fn test_reset() {
        let mut engine = engine();
        let state = engine.reset(SnakeColor::Orange);

        assert!(state.is_alive);
        assert_eq!(state.score(), 0);
        assert_eq!(state.ticks, 0);
        assert_eq!(state.snake.color, SnakeColor::Orange);
        assert_eq!(state.obstacles.len(), 5);
        assert!(!state.is_obstacle(state.food));
        assert!(!state.power_up.active);
    }

    #[test]
    fn test_basic_movement() {
        let mut engine = engine();
        let mut state = engine.reset(SnakeColor::Green);
        state.food = Position::new(700, 750);

        let result = engine.step(&mut state, Action::Continue);

        assert!(!result.terminated);
        assert_eq!(state.snake.head, Position::new(100, 100));
        assert_eq!(state.snake.body, VecDeque::from([Position::new(50, 100)]));
        let record = result.record.unwrap();
        assert_eq!((record.head_x, record.head_y), (50, 100));
        assert_eq!(record.collision, 0);
    }

    #[test]
    fn test_wall_collision_at_right_edge() {
        let mut engine = engine();
        let body = [Position::new(650, 50)];
        let snake = snake_at(Position::new(700, 50), Direction::Right, &body);
        let mut state = GameState::new(snake, Position::new(0, 750), obstacle_layout(&GameConfig::default()));

        let first = engine.step(&mut state, Action::Continue);
        assert!(!first.terminated);
        assert_eq!(state.snake.head, Position::new(750, 50));
        let body_before = state.snake.body.clone();

        let second = engine.step(&mut state, Action::Continue);
        assert!(second.terminated);
        assert!(!state.is_alive);
        assert_eq!(second.info.collision_type, Some(CollisionType::Wall));
        let record = second.record.unwrap();
        assert_eq!((record.head_x, record.head_y), (750, 50));
        assert_eq!(record.collision, 1);
        assert_eq!(state.snake.head, Position::new(750, 50));
        assert_eq!(state.snake.body, body_before);
    }

    #[test]
    fn test_top_margin_is_a_wall() {
        let mut engine = engine();
        let snake = snake_at(Position::new(300, 0), Direction::Up, &[Position::new(300, 50)]);
        let mut state = GameState::new(snake, Position::new(0, 750), vec![]);

        let result = engine.step(&mut state, Action::Continue);
        assert_eq!(result.info.collision_type, Some(CollisionType::Wall));
    }

    #[test]
    fn test_one_record_when_several_collisions_match() {
        let mut engine = engine();
        let head = Position::new(350, 400);
        let snake = snake_at(head, Direction::Right, &[Position::new(300, 400), head]);
        let mut state = GameState::new(snake, Position::new(0, 750), obstacle_layout(&GameConfig::default()));

        let result = engine.step(&mut state, Action::Continue);

        assert!(result.terminated);
        assert_eq!(result.info.collision_type, Some(CollisionType::Obstacle));
        assert_eq!(result.record.map(|r| r.collision), Some(1));
        assert_eq!(state.ticks, 1);
    }

    #[test]
    fn test_self_collision() {
        let mut engine = engine();
        let body = [
            Position::new(200, 200),
            Position::new(250, 200),
            Position::new(250, 250),
        ];
        let snake = snake_at(Position::new(250, 200), Direction::Up, &body);
        let mut state = GameState::new(snake, Position::new(0, 750), vec![]);

        let result = engine.step(&mut state, Action::Continue);
        assert_eq!(result.info.collision_type, Some(CollisionType::SelfCollision));
    }

    #[test]
    fn test_powered_up_snake_passes_obstacles() {
        let mut engine = engine();
        let mut snake = snake_at(Position::new(350, 400), Direction::Right, &[Position::new(300, 400)]);
        snake.activate_power_up(5);
        let mut state = GameState::new(snake, Position::new(0, 750), obstacle_layout(&GameConfig::default()));

        let result = engine.step(&mut state, Action::Continue);
        assert!(!result.terminated);
        assert_eq!(result.record.map(|r| r.collision), Some(0));
        assert_eq!(state.snake.power_up_timer, 4);
    }

    #[test]
    fn test_power_up_expires_and_restores_color() {
        let mut engine = engine();
        let mut state = engine.reset(SnakeColor::Yellow);
        state.food = Position::new(700, 750);
        state.snake.activate_power_up(1);

        engine.step(&mut state, Action::Continue);
        assert!(!state.snake.powered_up);
        assert_eq!(state.snake.color, SnakeColor::Yellow);
    }

    #[test]
    fn test_food_consumption() {
        let mut engine = engine();
        let mut state = engine.reset(SnakeColor::Green);
        state.food = Position::new(100, 100);
        let initial_length = state.snake.len();

        let result = engine.step(&mut state, Action::Continue);

        assert!(result.info.ate_food);
        assert_eq!(state.snake.len(), initial_length + 1);
        assert_eq!(state.score(), state.snake.len() as i32 - 1);
        assert_eq!(state.score(), 1);
        assert!(!state.is_obstacle(state.food));
    }

    #[test]
    fn test_direct_reversal_ignored() {
        let mut engine = engine();
        let mut state = engine.reset(SnakeColor::Green);
        state.food = Position::new(700, 750);

        let result = engine.step(&mut state, Action::Move(Direction::Left));

        assert!(!result.terminated);
        assert_eq!(state.snake.direction, Direction::Right);
        assert_eq!(result.record.map(|r| r.xdirection), Some(1));
    }

    #[test]
    fn test_turn_recorded_in_same_tick() {
        let mut engine = engine();
        let mut state = engine.reset(SnakeColor::Green);
        state.food = Position::new(700, 750);

        let result = engine.step(&mut state, Action::Move(Direction::Down));
        let record = result.record.unwrap();
        assert_eq!((record.xdirection, record.ydirection), (0, 1));
        assert_eq!(state.snake.head, Position::new(50, 150));
    }

    #[test]
    fn test_power_up_never_spawns_at_zero_score() {
        let mut engine = engine();
        let mut state = engine.reset(SnakeColor::Green);

        engine.update_power_up(&mut state);
        assert!(!state.power_up.active);
        assert_eq!(state.power_up.position, PowerUp::OFF_GRID);
    }

    #[test]
    fn test_power_up_schedule_across_collection() {
        let mut engine = engine();
        let mut state = engine.reset(SnakeColor::Green);
        for _ in 0..3 {
            state.snake.grow();
        }

        engine.update_power_up(&mut state);
        assert!(state.power_up.active);
        let placed = state.power_up.position;
        assert!(!state.is_obstacle(placed));

        // an uncollected power-up is never replaced
        engine.update_power_up(&mut state);
        assert_eq!(state.power_up.position, placed);

        state.snake.head = placed;
        assert!(engine.collect_power_up(&mut state));
        assert!(state.snake.powered_up);
        assert_eq!(state.snake.power_up_timer, 20);
        assert_eq!(state.power_up.last_collected_at, 3);

        engine.update_power_up(&mut state);
        assert!(!state.power_up.active);

        for _ in 0..3 {
            state.snake.grow();
        }
        engine.update_power_up(&mut state);
        assert!(state.power_up.active);
    }

    #[test]
    fn test_terminated_game_no_update() {
        let mut engine = engine();
        let mut state = engine.reset(SnakeColor::Green);
        state.is_alive = false;
        let ticks_before = state.ticks;

        let result = engine.step(&mut state, Action::Continue);

        assert!(result.terminated);
        assert!(result.record.is_none());
        assert_eq!(state.ticks, ticks_before);
    }
}
