pub mod board;
pub mod game;
pub mod model;
pub mod protocol;

pub use board::{Board, BoardBytesError};
pub use game::{Game, MoveError, WinDetector};
pub use model::{Cookie, GameId, PlayerId, Position, Symbol};
pub use protocol::{
    DecodeError, MakeMoveError, ProcessError, Request, RequestHeader, RequestKind,
    ResponseHeader, StatusReport, TransportCode,
};

/// Marks in an unbroken line needed to win a game.
pub const WIN_LENGTH: usize = 5;
