use std::fmt;

use serde::Deserialize;

/// Axis direction between two grid cells. `Up` points at the row above (y - 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[serde(alias = "top")]
    Up,
    Left,
    Right,
    #[serde(alias = "bot", alias = "bottom")]
    Down,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Left,
        Direction::Right,
        Direction::Down,
    ];

    pub fn inverse(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// `(dx, dy)` step towards the neighbor in this direction.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::Down => (0, 1),
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Direction::Up => 0,
            Direction::Left => 1,
            Direction::Right => 2,
            Direction::Down => 3,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Direction::Up => "up",
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Down => "down",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverse_is_an_involution() {
        for direction in Direction::ALL {
            assert_eq!(direction.inverse().inverse(), direction);
            let (dx, dy) = direction.offset();
            let (ix, iy) = direction.inverse().offset();
            assert_eq!((dx + ix, dy + iy), (0, 0));
        }
    }

    #[test]
    fn parses_legacy_aliases() {
        let parsed: Vec<Direction> =
            serde_json::from_str(r#"["top", "left", "right", "bot", "down"]"#).unwrap();
        assert_eq!(
            parsed,
            vec![
                Direction::Up,
                Direction::Left,
                Direction::Right,
                Direction::Down,
                Direction::Down
            ]
        );
    }
}
