use std::collections::VecDeque;

use super::action::Direction;
use super::config::GameConfig;

/// A position on the board in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Move position by delta
    pub fn moved_by(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Move `steps` cells of `cell_size` pixels in a direction
    pub fn moved_in_direction(&self, direction: Direction, cell_size: i32, steps: i32) -> Self {
        let (dx, dy) = direction.delta();
        self.moved_by(dx * cell_size * steps, dy * cell_size * steps)
    }
}

/// Colors the snake can be drawn in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnakeColor {
    Green,
    Orange,
    Yellow,
    Purple,
    /// Shown while a power-up is active
    Blue,
}

impl SnakeColor {
    /// Colors offered on the start screen, in display order
    pub const SELECTABLE: [SnakeColor; 4] = [
        SnakeColor::Green,
        SnakeColor::Orange,
        SnakeColor::Yellow,
        SnakeColor::Purple,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SnakeColor::Green => "Green",
            SnakeColor::Orange => "Orange",
            SnakeColor::Yellow => "Yellow",
            SnakeColor::Purple => "Purple",
            SnakeColor::Blue => "Blue",
        }
    }

    pub fn rgb(&self) -> (u8, u8, u8) {
        match self {
            SnakeColor::Green => (0, 255, 0),
            SnakeColor::Orange => (255, 165, 0),
            SnakeColor::Yellow => (255, 255, 0),
            SnakeColor::Purple => (160, 32, 240),
            SnakeColor::Blue => (0, 0, 255),
        }
    }
}

/// The player's snake.
///
/// `body` runs from the tail (front) to the segment behind the head (back);
/// the head itself is never stored in `body`.
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    pub head: Position,
    pub body: VecDeque<Position>,
    pub direction: Direction,
    pub powered_up: bool,
    pub power_up_timer: u32,
    pub color: SnakeColor,
    /// Color restored when a power-up expires
    pub base_color: SnakeColor,
}

impl Snake {
    /// Create a snake with one body segment trailing one cell behind the head.
    ///
    /// A still snake trails to the left, so the tail never shares the head's cell.
    pub fn new(head: Position, direction: Direction, cell_size: i32, color: SnakeColor) -> Self {
        let trailing = match direction {
            Direction::Still => Direction::Right,
            moving => moving,
        };
        let tail = head.moved_in_direction(trailing, cell_size, -1);
        Self {
            head,
            body: VecDeque::from([tail]),
            direction,
            powered_up: false,
            power_up_timer: 0,
            color,
            base_color: color,
        }
    }

    /// Starting snake for a board: head one cell in from the top-left corner
    pub fn spawn(config: &GameConfig, color: SnakeColor) -> Self {
        let head = Position::new(config.cell_size, config.cell_size + config.top_margin);
        Self::new(head, Direction::Right, config.cell_size, color)
    }

    /// Score shown to the player
    pub fn score(&self) -> i32 {
        self.body.len() as i32 - 1
    }

    /// Number of body segments, head excluded
    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Try to change direction; returns whether the turn was accepted
    pub fn turn(&mut self, next: Direction) -> bool {
        if self.direction.can_turn_to(next) {
            self.direction = next;
            true
        } else {
            false
        }
    }

    pub fn collides_with_body(&self, pos: Position) -> bool {
        self.body.contains(&pos)
    }

    /// Shift every segment one place toward the head and move the head one cell
    pub fn advance(&mut self, cell_size: i32) {
        self.body.push_back(self.head);
        self.body.pop_front();
        self.head = self.head.moved_in_direction(self.direction, cell_size, 1);
    }

    /// Add a segment at the tail end; it separates from the tail on the next advance
    pub fn grow(&mut self) {
        let tail = self.body.front().copied().unwrap_or(self.head);
        self.body.push_front(tail);
    }

    pub fn activate_power_up(&mut self, duration: u32) {
        self.powered_up = true;
        self.power_up_timer = duration;
        self.color = SnakeColor::Blue;
    }

    /// Count down an active power-up, restoring the base color when it runs out
    pub fn tick_power_up(&mut self) {
        if !self.powered_up {
            return;
        }
        self.power_up_timer = self.power_up_timer.saturating_sub(1);
        if self.power_up_timer == 0 {
            self.powered_up = false;
            self.color = self.base_color;
        }
    }
}

/// Collectible that makes the snake immune to obstacles for a while
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerUp {
    pub position: Position,
    pub active: bool,
    /// Score at which the previous power-up was collected
    pub last_collected_at: i32,
}

impl PowerUp {
    /// Parking spot used while no power-up is on the board
    pub const OFF_GRID: Position = Position { x: -1000, y: -1000 };

    /// `last_collected_at` for a game where nothing has been collected yet
    pub const NEVER_COLLECTED: i32 = -999;

    pub fn inactive(last_collected_at: i32) -> Self {
        Self {
            position: Self::OFF_GRID,
            active: false,
            last_collected_at,
        }
    }

    /// Whether a new power-up should appear at this score
    pub fn is_due(&self, score: i32) -> bool {
        !self.active && score > 0 && score % 3 == 0 && score >= self.last_collected_at + 3
    }

    pub fn place(&mut self, position: Position) {
        self.position = position;
        self.active = true;
    }
}

impl Default for PowerUp {
    fn default() -> Self {
        Self::inactive(Self::NEVER_COLLECTED)
    }
}

/// The fixed obstacle set: board center plus the four quadrant centers.
///
/// Coordinates are computed over the full window height (margin included)
/// and snapped down to the cell grid.
pub fn obstacle_layout(config: &GameConfig) -> Vec<Position> {
    let c = config.cell_size;
    let w = config.board_width;
    let h = config.board_height + config.top_margin;
    let snap = |v: i32| v / c * c;

    vec![
        Position::new(snap(w / 2), snap(h / 2)),
        Position::new(snap(w / 4), snap(h / 4)),
        Position::new(snap(3 * w / 4), snap(h / 4)),
        Position::new(snap(w / 4), snap(3 * h / 4)),
        Position::new(snap(3 * w / 4), snap(3 * h / 4)),
    ]
}

/// Type of collision that ended a game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionType {
    /// Snake ran into an obstacle without a power-up
    Obstacle,
    /// Snake hit itself
    SelfCollision,
    /// Snake left the board
    Wall,
}

/// Complete game state
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub snake: Snake,
    pub food: Position,
    pub power_up: PowerUp,
    pub obstacles: Vec<Position>,
    pub ticks: u32,
    pub is_alive: bool,
}

impl GameState {
    pub fn new(snake: Snake, food: Position, obstacles: Vec<Position>) -> Self {
        Self {
            snake,
            food,
            power_up: PowerUp::default(),
            obstacles,
            ticks: 0,
            is_alive: true,
        }
    }

    pub fn score(&self) -> i32 {
        self.snake.score()
    }

    pub fn is_obstacle(&self, pos: Position) -> bool {
        self.obstacles.contains(&pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_movement() {
        let pos = Position::new(100, 100);
        assert_eq!(pos.moved_in_direction(Direction::Right, 50, 1), Position::new(150, 100));
        assert_eq!(pos.moved_in_direction(Direction::Up, 50, 2), Position::new(100, 0));
        assert_eq!(pos.moved_in_direction(Direction::Left, 50, -1), Position::new(150, 100));
        assert_eq!(pos.moved_in_direction(Direction::Still, 50, 5), pos);
    }

    #[test]
    fn test_snake_spawn() {
        let snake = Snake::spawn(&GameConfig::default(), SnakeColor::Green);
        assert_eq!(snake.head, Position::new(50, 100));
        assert_eq!(snake.body, VecDeque::from([Position::new(0, 100)]));
        assert_eq!(snake.direction, Direction::Right);
        assert_eq!(snake.score(), 0);
        assert!(!snake.collides_with_body(snake.head));
    }

    #[test]
    fn test_still_snake_tail_is_left_of_head() {
        let snake = Snake::new(Position::new(200, 300), Direction::Still, 50, SnakeColor::Green);
        assert_eq!(snake.body, VecDeque::from([Position::new(150, 300)]));
        assert!(!snake.collides_with_body(snake.head));
        assert_eq!(snake.direction, Direction::Still);
    }

    #[test]
    fn test_snake_advance_keeps_length() {
        let mut snake = Snake::spawn(&GameConfig::default(), SnakeColor::Green);
        snake.grow();
        snake.grow();
        let len = snake.len();

        snake.advance(50);
        assert_eq!(snake.len(), len);
        assert_eq!(snake.head, Position::new(100, 100));
        assert_eq!(snake.body.back(), Some(&Position::new(50, 100)));
        assert!(!snake.body.contains(&snake.head));
    }

    #[test]
    fn test_grow_adds_one_segment() {
        let mut snake = Snake::spawn(&GameConfig::default(), SnakeColor::Green);
        let before = snake.len();
        snake.grow();
        assert_eq!(snake.len(), before + 1);
        assert_eq!(snake.score(), 1);

        // the duplicate tail peels off after one move
        snake.advance(50);
        assert_eq!(
            snake.body,
            VecDeque::from([Position::new(0, 100), Position::new(50, 100)])
        );
    }

    #[test]
    fn test_turn_rule() {
        let mut snake = Snake::spawn(&GameConfig::default(), SnakeColor::Green);
        assert!(!snake.turn(Direction::Left));
        assert_eq!(snake.direction, Direction::Right);
        assert!(snake.turn(Direction::Down));
        assert!(!snake.turn(Direction::Up));
        assert_eq!(snake.direction, Direction::Down);
    }

    #[test]
    fn test_power_up_countdown() {
        let mut snake = Snake::spawn(&GameConfig::default(), SnakeColor::Purple);
        snake.activate_power_up(2);
        assert!(snake.powered_up);
        assert_eq!(snake.color, SnakeColor::Blue);

        snake.tick_power_up();
        assert!(snake.powered_up);
        snake.tick_power_up();
        assert!(!snake.powered_up);
        assert_eq!(snake.color, SnakeColor::Purple);
    }

    #[test]
    fn test_power_up_schedule() {
        let fresh = PowerUp::default();
        assert!(!fresh.is_due(0));
        assert!(!fresh.is_due(1));
        assert!(fresh.is_due(3));
        assert!(fresh.is_due(6));

        let collected = PowerUp::inactive(3);
        assert!(!collected.is_due(3));
        assert!(!collected.is_due(4));
        assert!(collected.is_due(6));

        let mut placed = PowerUp::default();
        placed.place(Position::new(0, 50));
        assert!(!placed.is_due(3));
    }

    #[test]
    fn test_obstacle_layout() {
        let obstacles = obstacle_layout(&GameConfig::default());
        assert_eq!(
            obstacles,
            vec![
                Position::new(350, 400),
                Position::new(150, 200),
                Position::new(550, 200),
                Position::new(150, 600),
                Position::new(550, 600),
            ]
        );
    }
}
