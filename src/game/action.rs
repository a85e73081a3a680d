/// Direction the snake is heading
///
/// `Still` is the zero vector. The snake never starts still and player input
/// cannot produce it, but the dataset format allows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    Still,
}

impl Direction {
    /// Returns the unit vector (dx, dy) for this direction, y growing downward
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::Still => (0, 0),
        }
    }

    /// Whether a turn from `self` to `next` is allowed.
    ///
    /// A change on the x axis is only accepted while the current x component
    /// is zero, and symmetrically for y. This rules out direct reversal and
    /// also makes re-pressing the current direction a no-op.
    pub fn can_turn_to(&self, next: Direction) -> bool {
        let (dx, dy) = self.delta();
        match next {
            Direction::Left | Direction::Right => dx == 0,
            Direction::Up | Direction::Down => dy == 0,
            Direction::Still => false,
        }
    }
}

/// Action that can be applied on a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Try to turn to a new direction
    Move(Direction),
    /// Keep the current direction
    Continue,
}

impl From<Direction> for Action {
    fn from(direction: Direction) -> Self {
        Action::Move(direction)
    }
}

impl From<Option<Direction>> for Action {
    fn from(direction: Option<Direction>) -> Self {
        direction.map(Action::Move).unwrap_or(Action::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Direction; 5] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
        Direction::Still,
    ];

    #[test]
    fn test_direction_delta() {
        assert_eq!(Direction::Up.delta(), (0, -1));
        assert_eq!(Direction::Down.delta(), (0, 1));
        assert_eq!(Direction::Left.delta(), (-1, 0));
        assert_eq!(Direction::Right.delta(), (1, 0));
        assert_eq!(Direction::Still.delta(), (0, 0));
    }

    #[test]
    fn test_no_direct_reversal() {
        assert!(!Direction::Right.can_turn_to(Direction::Left));
        assert!(!Direction::Left.can_turn_to(Direction::Right));
        assert!(!Direction::Up.can_turn_to(Direction::Down));
        assert!(!Direction::Down.can_turn_to(Direction::Up));
    }

    #[test]
    fn test_same_axis_turns_rejected() {
        assert!(!Direction::Right.can_turn_to(Direction::Right));
        assert!(!Direction::Up.can_turn_to(Direction::Up));
    }

    #[test]
    fn test_perpendicular_turns_accepted() {
        assert!(Direction::Right.can_turn_to(Direction::Up));
        assert!(Direction::Right.can_turn_to(Direction::Down));
        assert!(Direction::Up.can_turn_to(Direction::Left));
        assert!(Direction::Down.can_turn_to(Direction::Right));
    }

    #[test]
    fn test_still_accepts_any_move() {
        for next in [Direction::Up, Direction::Down, Direction::Left, Direction::Right] {
            assert!(Direction::Still.can_turn_to(next));
        }
    }

    #[test]
    fn test_directions_stay_orthogonal() {
        for current in ALL {
            for next in ALL {
                if current.can_turn_to(next) {
                    let (dx, dy) = next.delta();
                    assert!(dx == 0 || dy == 0);
                    // an accepted turn never moves along the axis already in use
                    let (cx, cy) = current.delta();
                    assert!(!(cx != 0 && dx != 0) && !(cy != 0 && dy != 0));
                }
            }
        }
    }
}
