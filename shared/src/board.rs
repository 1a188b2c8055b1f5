//! Unbounded quadrant-addressed board with an incremental content hash
//!
//! The board covers every position with |x|,|y| <= radius and grows on
//! demand. Storage is four square quadrant arrays selected by the signs of
//! x and y; the axes themselves hold no cells. Every cell write also updates
//! a running XOR hash so callers can compare board states without shipping
//! the full contents. The hash is an integrity checksum, not a
//! collision-resistant digest.

use crate::model::{Position, Symbol};
use thiserror::Error;

const QUADRANT_COUNT: usize = 4;

/// Failures when rebuilding a board from its byte dump.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BoardBytesError {
    #[error("board dump is too short to hold any cells")]
    Empty,
    #[error("invalid cell byte {0:#04x} in board dump")]
    BadCell(u8),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    quadrants: [Vec<Vec<Symbol>>; QUADRANT_COUNT],
    hash: u64,
}

impl Board {
    pub fn new(radius: usize) -> Board {
        Board {
            quadrants: std::array::from_fn(|_| vec![vec![Symbol::Blank; radius]; radius]),
            hash: 0,
        }
    }

    pub fn radius(&self) -> usize {
        self.quadrants[0].len()
    }

    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// True when `pos` is already covered without growing.
    pub fn fits(&self, pos: Position) -> bool {
        pos.reach() <= self.radius()
    }

    /// Grows every quadrant to the given radius, keeping existing cell
    /// values at their original positions. Shrinking is not possible:
    /// a radius at or below the current one is a no-op.
    pub fn grow(&mut self, radius: usize) {
        if radius <= self.radius() {
            return;
        }
        for quadrant in &mut self.quadrants {
            for row in quadrant.iter_mut() {
                row.resize(radius, Symbol::Blank);
            }
            quadrant.resize_with(radius, || vec![Symbol::Blank; radius]);
        }
    }

    /// Grows exactly enough for `pos` to be in bounds.
    pub fn ensure_fits(&mut self, pos: Position) {
        let need = pos.reach();
        if need > self.radius() {
            self.grow(need);
        }
    }

    /// Returns blank for positions outside the current bounds without
    /// growing the board.
    pub fn get(&self, pos: Position) -> Symbol {
        if !self.fits(pos) {
            return Symbol::Blank;
        }
        let (q, i, j) = pos.cell_index();
        self.quadrants[q][i][j]
    }

    /// Writes a cell, growing to fit if needed, and folds the change into
    /// the running hash.
    pub fn set(&mut self, pos: Position, symbol: Symbol) {
        self.ensure_fits(pos);
        let (q, i, j) = pos.cell_index();
        self.set_cell(q, i, j, symbol);
    }

    /// Tolerant accessor for line scans: axis positions and positions
    /// outside the current bounds read as blank.
    pub fn symbol_at(&self, x: i64, y: i64) -> Symbol {
        let radius = self.radius() as i64;
        if x.abs() > radius || y.abs() > radius {
            return Symbol::Blank;
        }
        match Position::new(x as i32, y as i32) {
            Some(pos) => {
                let (q, i, j) = pos.cell_index();
                self.quadrants[q][i][j]
            }
            None => Symbol::Blank,
        }
    }

    /// Row-major flatten of the four quadrants, one byte per cell.
    pub fn to_bytes(&self) -> Vec<u8> {
        let radius = self.radius();
        let mut bytes = Vec::with_capacity(QUADRANT_COUNT * radius * radius);
        for quadrant in &self.quadrants {
            for row in quadrant {
                for &cell in row {
                    bytes.push(cell.as_byte());
                }
            }
        }
        bytes
    }

    /// Rebuilds a board from its dump. The radius is inferred as
    /// floor(sqrt(len))/2; bytes beyond the inferred 4*r*r cells are
    /// ignored. The hash is rebuilt through the same incremental write
    /// path used by `set`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Board, BoardBytesError> {
        let side = (bytes.len() as f64).sqrt() as usize;
        let radius = side / 2;
        if radius == 0 {
            return Err(BoardBytesError::Empty);
        }
        let mut board = Board::new(radius);
        for q in 0..QUADRANT_COUNT {
            for i in 0..radius {
                for j in 0..radius {
                    let byte = bytes[(q * radius + i) * radius + j];
                    let symbol =
                        Symbol::from_byte(byte).ok_or(BoardBytesError::BadCell(byte))?;
                    if symbol != Symbol::Blank {
                        board.set_cell(q, i, j, symbol);
                    }
                }
            }
        }
        Ok(board)
    }

    fn set_cell(&mut self, q: usize, i: usize, j: usize, symbol: Symbol) {
        let old = self.quadrants[q][i][j];
        self.hash ^= Self::contribution(q, i, j, old);
        self.hash ^= Self::contribution(q, i, j, symbol);
        self.quadrants[q][i][j] = symbol;
    }

    /// Per-cell hash contribution: symbol * quadrant^2 * i * j, with
    /// quadrants numbered 1..=4 and zero-based cell coordinates.
    fn contribution(q: usize, i: usize, j: usize, symbol: Symbol) -> u64 {
        let quadrant = q as u64 + 1;
        symbol.as_byte() as u64 * quadrant * quadrant * i as u64 * j as u64
    }
}
