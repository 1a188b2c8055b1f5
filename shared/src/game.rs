//! Match state: turn order, move legality and win detection

use crate::board::Board;
use crate::model::{PlayerId, Position, Symbol};
use thiserror::Error;

/// Rejection reasons for a single move attempt.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MoveError {
    #[error("it is not this player's turn")]
    WrongTeam,
    #[error("the target cell is already occupied")]
    WrongPlace,
    #[error("a blank symbol cannot be played")]
    WrongSymbol,
    #[error("the game is already over")]
    GameAlreadyOver,
}

impl MoveError {
    pub fn code(&self) -> u16 {
        match self {
            MoveError::WrongTeam => 1,
            MoveError::WrongPlace => 2,
            MoveError::WrongSymbol => 3,
            MoveError::GameAlreadyOver => 4,
        }
    }

    pub fn from_code(code: u16) -> Option<MoveError> {
        match code {
            1 => Some(MoveError::WrongTeam),
            2 => Some(MoveError::WrongPlace),
            3 => Some(MoveError::WrongSymbol),
            4 => Some(MoveError::GameAlreadyOver),
            _ => None,
        }
    }
}

/// Scans a board for a straight run of identical marks.
///
/// The scan visits every cell of the occupied span in all four orientations
/// (horizontal, vertical, both diagonals) but only walks runs from their
/// first cell, so each run is counted once. Axis positions read as blank
/// and therefore break runs that would otherwise cross them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WinDetector {
    win_length: usize,
}

impl Default for WinDetector {
    fn default() -> WinDetector {
        WinDetector::new(crate::WIN_LENGTH)
    }
}

impl WinDetector {
    pub fn new(win_length: usize) -> WinDetector {
        WinDetector { win_length }
    }

    /// Returns the winning symbol if any run reaches the detector's length.
    pub fn detect(&self, board: &Board) -> Option<Symbol> {
        const DIRECTIONS: [(i64, i64); 4] = [(1, 0), (0, 1), (1, 1), (1, -1)];
        let radius = board.radius() as i64;
        for (dx, dy) in DIRECTIONS {
            for y in -radius..=radius {
                for x in -radius..=radius {
                    let symbol = board.symbol_at(x, y);
                    if symbol == Symbol::Blank {
                        continue;
                    }
                    // Not the start of a run in this direction.
                    if board.symbol_at(x - dx, y - dy) == symbol {
                        continue;
                    }
                    let mut run = 1;
                    let (mut cx, mut cy) = (x + dx, y + dy);
                    while board.symbol_at(cx, cy) == symbol {
                        run += 1;
                        cx += dx;
                        cy += dy;
                    }
                    if run >= self.win_length {
                        return Some(symbol);
                    }
                }
            }
        }
        None
    }
}

/// A single match between two players.
///
/// Cross always moves first. After the first winning run appears the status
/// becomes that symbol and every further move is rejected.
#[derive(Debug, Clone)]
pub struct Game {
    players: Vec<PlayerId>,
    board: Board,
    current_turn: Symbol,
    status: Symbol,
    detector: WinDetector,
}

impl Game {
    pub fn new(initial_radius: usize, detector: WinDetector) -> Game {
        Game {
            players: Vec::new(),
            board: Board::new(initial_radius),
            current_turn: Symbol::Cross,
            status: Symbol::Blank,
            detector,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Player ids attached to this game, in join order.
    pub fn players(&self) -> &[PlayerId] {
        &self.players
    }

    pub fn add_player(&mut self, id: PlayerId) {
        self.players.push(id);
    }

    pub fn current_turn(&self) -> Symbol {
        self.current_turn
    }

    /// Blank while the game is running, otherwise the winner's symbol.
    pub fn status(&self) -> Symbol {
        self.status
    }

    pub fn is_over(&self) -> bool {
        self.status != Symbol::Blank
    }

    /// Attempts one move. The checks run in a fixed order: finished game,
    /// turn ownership, cell availability, symbol validity. On success the
    /// mark is placed, the turn flips and the board is scanned for a win.
    pub fn make_move(&mut self, pos: Position, symbol: Symbol) -> Result<(), MoveError> {
        if self.is_over() {
            return Err(MoveError::GameAlreadyOver);
        }
        if symbol != self.current_turn {
            return Err(MoveError::WrongTeam);
        }
        self.board.ensure_fits(pos);
        if self.board.get(pos) != Symbol::Blank {
            return Err(MoveError::WrongPlace);
        }
        if symbol == Symbol::Blank {
            return Err(MoveError::WrongSymbol);
        }
        self.board.set(pos, symbol);
        self.current_turn = self.current_turn.opponent();
        if let Some(winner) = self.detector.detect(&self.board) {
            self.status = winner;
        }
        Ok(())
    }
}
