//! Core game vocabulary shared by the server and the client

use std::fmt;

/// Identifier assigned to a player by the server, starting from 1.
pub type PlayerId = u32;

/// Numeric game identifier, drawn from a 21-digit decimal range.
pub type GameId = u128;

/// Opaque bearer token identifying a connected player across requests.
pub type Cookie = Vec<u8>;

/// A cell mark. `Blank` doubles as "no winner yet" in game status and as
/// "no preference" when a joining player asks for a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    Blank,
    Cross,
    Nought,
}

impl Symbol {
    /// The opposing side. Blank has no opponent and maps to itself.
    pub fn opponent(self) -> Symbol {
        match self {
            Symbol::Cross => Symbol::Nought,
            Symbol::Nought => Symbol::Cross,
            Symbol::Blank => Symbol::Blank,
        }
    }

    pub fn as_byte(self) -> u8 {
        match self {
            Symbol::Blank => 0,
            Symbol::Cross => 1,
            Symbol::Nought => 2,
        }
    }

    pub fn from_byte(byte: u8) -> Option<Symbol> {
        match byte {
            0 => Some(Symbol::Blank),
            1 => Some(Symbol::Cross),
            2 => Some(Symbol::Nought),
            _ => None,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Symbol::Blank => "blank",
            Symbol::Cross => "cross",
            Symbol::Nought => "nought",
        };
        write!(f, "{}", name)
    }
}

/// A board coordinate. The axes are excluded: both components are non-zero,
/// so every position falls strictly inside one of the four quadrants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    x: i32,
    y: i32,
}

impl Position {
    /// Returns None when either component is zero.
    pub fn new(x: i32, y: i32) -> Option<Position> {
        if x == 0 || y == 0 {
            return None;
        }
        Some(Position { x, y })
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    /// Quadrant index (0..4) plus the cell coordinates inside that quadrant.
    /// Quadrants are ordered (+,+), (-,+), (-,-), (+,-); cells are
    /// (|x|-1, |y|-1).
    pub fn cell_index(&self) -> (usize, usize, usize) {
        let quadrant = match (self.x > 0, self.y > 0) {
            (true, true) => 0,
            (false, true) => 1,
            (false, false) => 2,
            (true, false) => 3,
        };
        let i = self.x.unsigned_abs() as usize - 1;
        let j = self.y.unsigned_abs() as usize - 1;
        (quadrant, i, j)
    }

    /// Smallest board radius that contains this position.
    pub fn reach(&self) -> usize {
        self.x.unsigned_abs().max(self.y.unsigned_abs()) as usize
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_byte_roundtrip() {
        for symbol in [Symbol::Blank, Symbol::Cross, Symbol::Nought] {
            assert_eq!(Symbol::from_byte(symbol.as_byte()), Some(symbol));
        }
        assert_eq!(Symbol::from_byte(3), None);
        assert_eq!(Symbol::from_byte(255), None);
    }

    #[test]
    fn test_symbol_opponent() {
        assert_eq!(Symbol::Cross.opponent(), Symbol::Nought);
        assert_eq!(Symbol::Nought.opponent(), Symbol::Cross);
        assert_eq!(Symbol::Blank.opponent(), Symbol::Blank);
    }

    #[test]
    fn test_position_rejects_axes() {
        assert!(Position::new(0, 1).is_none());
        assert!(Position::new(1, 0).is_none());
        assert!(Position::new(0, 0).is_none());
        assert!(Position::new(-1, 1).is_some());
    }

    #[test]
    fn test_position_quadrants() {
        assert_eq!(Position::new(1, 1).unwrap().cell_index(), (0, 0, 0));
        assert_eq!(Position::new(-1, 1).unwrap().cell_index(), (1, 0, 0));
        assert_eq!(Position::new(-1, -1).unwrap().cell_index(), (2, 0, 0));
        assert_eq!(Position::new(1, -1).unwrap().cell_index(), (3, 0, 0));
        assert_eq!(Position::new(3, -7).unwrap().cell_index(), (3, 2, 6));
    }

    #[test]
    fn test_position_reach() {
        assert_eq!(Position::new(1, 1).unwrap().reach(), 1);
        assert_eq!(Position::new(-2, 5).unwrap().reach(), 5);
        assert_eq!(Position::new(-9, -4).unwrap().reach(), 9);
    }
}
