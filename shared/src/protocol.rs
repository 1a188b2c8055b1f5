//! Wire format shared by the server and the client
//!
//! Every exchange is one framed request followed by one framed response.
//! A request frame is `[type:2][payload length:8][payload]`; a response
//! frame is `[type:2][transport code:2][payload length:8][payload]`. All
//! multi-byte integers are big-endian. The functions here work purely on
//! byte buffers; reading and writing sockets is the caller's business.

use crate::board::{Board, BoardBytesError};
use crate::game::MoveError;
use crate::model::{Cookie, GameId, Position, Symbol};
use thiserror::Error;

pub const REQUEST_HEADER_SIZE: usize = 10;
pub const RESPONSE_HEADER_SIZE: usize = 12;

/// Game ids travel as minimal big-endian byte strings, never longer than
/// a full u128.
pub const GAME_ID_MAX_BYTES: usize = 16;

/// Request type discriminants as they appear on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    InitConnection = 1,
    MakeGame = 2,
    JoinGame = 3,
    MakeMove = 4,
    GameStatus = 5,
    LoadBoard = 6,
}

impl RequestKind {
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }

    pub fn from_u16(value: u16) -> Option<RequestKind> {
        match value {
            1 => Some(RequestKind::InitConnection),
            2 => Some(RequestKind::MakeGame),
            3 => Some(RequestKind::JoinGame),
            4 => Some(RequestKind::MakeMove),
            5 => Some(RequestKind::GameStatus),
            6 => Some(RequestKind::LoadBoard),
            _ => None,
        }
    }
}

/// Transport outcome carried in the response header, separate from any
/// domain verdict inside the payload. `TimedOut` and `InvalidAnswer` are
/// produced only by client-side classification; `Forbidden` is reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportCode {
    Success = 0,
    BadRequest = 1,
    TimedOut = 2,
    Forbidden = 3,
    InvalidAnswer = 4,
}

impl TransportCode {
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }

    pub fn from_u16(value: u16) -> Option<TransportCode> {
        match value {
            0 => Some(TransportCode::Success),
            1 => Some(TransportCode::BadRequest),
            2 => Some(TransportCode::TimedOut),
            3 => Some(TransportCode::Forbidden),
            4 => Some(TransportCode::InvalidAnswer),
            _ => None,
        }
    }
}

/// Session-level rejections, shared across every request type.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ProcessError {
    #[error("cookie not recognized")]
    CookieNotFound,
    #[error("no game with that id")]
    GameNotFound,
    #[error("player has not joined a game")]
    PlayerNotInGame,
    #[error("symbol or seat already in use")]
    AlreadyInUse,
    #[error("server is at capacity")]
    Overloaded,
}

impl ProcessError {
    pub fn code(&self) -> u16 {
        match self {
            ProcessError::CookieNotFound => 1,
            ProcessError::GameNotFound => 2,
            ProcessError::PlayerNotInGame => 3,
            ProcessError::AlreadyInUse => 4,
            ProcessError::Overloaded => 5,
        }
    }

    pub fn from_code(code: u16) -> Option<ProcessError> {
        match code {
            1 => Some(ProcessError::CookieNotFound),
            2 => Some(ProcessError::GameNotFound),
            3 => Some(ProcessError::PlayerNotInGame),
            4 => Some(ProcessError::AlreadyInUse),
            5 => Some(ProcessError::Overloaded),
            _ => None,
        }
    }
}

/// A move request can fail in either the session domain or the move
/// domain; the response carries a leading byte telling them apart.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MakeMoveError {
    #[error(transparent)]
    Process(#[from] ProcessError),
    #[error(transparent)]
    Move(#[from] MoveError),
}

impl MakeMoveError {
    pub fn domain(&self) -> u8 {
        match self {
            MakeMoveError::Process(_) => 0,
            MakeMoveError::Move(_) => 1,
        }
    }

    pub fn code(&self) -> u16 {
        match self {
            MakeMoveError::Process(err) => err.code(),
            MakeMoveError::Move(err) => err.code(),
        }
    }
}

/// Post-move snapshot: the board's content hash and the game status byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusReport {
    pub hash: u64,
    pub status: Symbol,
}

/// Why a byte buffer could not be decoded. Any of these on the server
/// side becomes a `BadRequest` transport response; on the client side an
/// `InvalidAnswer` classification.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    #[error("truncated payload: needed {need} more byte(s), {have} left")]
    Truncated { need: usize, have: usize },
    #[error("{0} trailing byte(s) after the declared layout")]
    Trailing(usize),
    #[error("unknown request type {0}")]
    UnknownRequest(u16),
    #[error("unknown verdict code {0}")]
    UnknownVerdict(u16),
    #[error("unknown error domain {0}")]
    UnknownDomain(u8),
    #[error("invalid symbol value {0}")]
    BadSymbol(u16),
    #[error("a game cannot start with radius zero")]
    ZeroRadius,
    #[error("move coordinates must be non-zero")]
    ZeroCoordinate,
    #[error("game id of {0} bytes does not fit in 16")]
    GameIdTooLong(usize),
    #[error("text field is not valid UTF-8")]
    BadText,
    #[error(transparent)]
    BadBoard(#[from] BoardBytesError),
}

/// Fixed 10-byte request header. The type field stays a raw u16 here so
/// the server can echo unknown types back in its transport error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestHeader {
    pub kind: u16,
    pub payload_len: u64,
}

impl RequestHeader {
    pub const SIZE: usize = REQUEST_HEADER_SIZE;

    pub fn from_bytes(bytes: [u8; REQUEST_HEADER_SIZE]) -> RequestHeader {
        let mut len = [0u8; 8];
        len.copy_from_slice(&bytes[2..10]);
        RequestHeader {
            kind: u16::from_be_bytes([bytes[0], bytes[1]]),
            payload_len: u64::from_be_bytes(len),
        }
    }

    pub fn to_bytes(&self) -> [u8; REQUEST_HEADER_SIZE] {
        let mut bytes = [0u8; REQUEST_HEADER_SIZE];
        bytes[0..2].copy_from_slice(&self.kind.to_be_bytes());
        bytes[2..10].copy_from_slice(&self.payload_len.to_be_bytes());
        bytes
    }
}

/// Fixed 12-byte response header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseHeader {
    pub kind: u16,
    pub code: u16,
    pub payload_len: u64,
}

impl ResponseHeader {
    pub const SIZE: usize = RESPONSE_HEADER_SIZE;

    pub fn from_bytes(bytes: [u8; RESPONSE_HEADER_SIZE]) -> ResponseHeader {
        let mut len = [0u8; 8];
        len.copy_from_slice(&bytes[4..12]);
        ResponseHeader {
            kind: u16::from_be_bytes([bytes[0], bytes[1]]),
            code: u16::from_be_bytes([bytes[2], bytes[3]]),
            payload_len: u64::from_be_bytes(len),
        }
    }

    pub fn to_bytes(&self) -> [u8; RESPONSE_HEADER_SIZE] {
        let mut bytes = [0u8; RESPONSE_HEADER_SIZE];
        bytes[0..2].copy_from_slice(&self.kind.to_be_bytes());
        bytes[2..4].copy_from_slice(&self.code.to_be_bytes());
        bytes[4..12].copy_from_slice(&self.payload_len.to_be_bytes());
        bytes
    }
}

/// One decoded client request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    InitConnection { name: String },
    MakeGame { init_radius: u16 },
    JoinGame { cookie: Cookie, game_id: GameId, symbol: Symbol },
    MakeMove { cookie: Cookie, position: Position },
    GameStatus { cookie: Cookie },
    LoadBoard { cookie: Cookie },
}

impl Request {
    pub fn kind(&self) -> RequestKind {
        match self {
            Request::InitConnection { .. } => RequestKind::InitConnection,
            Request::MakeGame { .. } => RequestKind::MakeGame,
            Request::JoinGame { .. } => RequestKind::JoinGame,
            Request::MakeMove { .. } => RequestKind::MakeMove,
            Request::GameStatus { .. } => RequestKind::GameStatus,
            Request::LoadBoard { .. } => RequestKind::LoadBoard,
        }
    }

    /// Encodes the complete frame, header included.
    pub fn encode(&self) -> Vec<u8> {
        let payload = self.encode_payload();
        let header = RequestHeader {
            kind: self.kind().as_u16(),
            payload_len: payload.len() as u64,
        };
        let mut frame = Vec::with_capacity(REQUEST_HEADER_SIZE + payload.len());
        frame.extend_from_slice(&header.to_bytes());
        frame.extend_from_slice(&payload);
        frame
    }

    fn encode_payload(&self) -> Vec<u8> {
        match self {
            Request::InitConnection { name } => name.as_bytes().to_vec(),
            Request::MakeGame { init_radius } => init_radius.to_be_bytes().to_vec(),
            Request::JoinGame { cookie, game_id, symbol } => {
                let id = encode_game_id(*game_id);
                let mut payload = Vec::with_capacity(2 + cookie.len() + 2 + id.len() + 2);
                write_cookie(&mut payload, cookie);
                payload.extend_from_slice(&(id.len() as u16).to_be_bytes());
                payload.extend_from_slice(&id);
                payload.extend_from_slice(&(symbol.as_byte() as u16).to_be_bytes());
                payload
            }
            Request::MakeMove { cookie, position } => {
                let mut payload = Vec::with_capacity(2 + cookie.len() + 8);
                write_cookie(&mut payload, cookie);
                payload.extend_from_slice(&position.x().to_be_bytes());
                payload.extend_from_slice(&position.y().to_be_bytes());
                payload
            }
            Request::GameStatus { cookie } | Request::LoadBoard { cookie } => {
                let mut payload = Vec::with_capacity(2 + cookie.len());
                write_cookie(&mut payload, cookie);
                payload
            }
        }
    }

    /// Decodes a request from the raw type field and its payload. The
    /// payload must match the declared layout exactly; leftover bytes are
    /// an error.
    pub fn decode(kind: u16, payload: &[u8]) -> Result<Request, DecodeError> {
        let kind = RequestKind::from_u16(kind).ok_or(DecodeError::UnknownRequest(kind))?;
        let mut reader = Reader::new(payload);
        let request = match kind {
            RequestKind::InitConnection => {
                let name = std::str::from_utf8(reader.rest())
                    .map_err(|_| DecodeError::BadText)?
                    .to_owned();
                Request::InitConnection { name }
            }
            RequestKind::MakeGame => {
                let init_radius = reader.u16()?;
                if init_radius == 0 {
                    return Err(DecodeError::ZeroRadius);
                }
                Request::MakeGame { init_radius }
            }
            RequestKind::JoinGame => {
                let cookie = read_cookie(&mut reader)?;
                let id_len = reader.u16()? as usize;
                if id_len > GAME_ID_MAX_BYTES {
                    return Err(DecodeError::GameIdTooLong(id_len));
                }
                let game_id = decode_game_id(reader.take(id_len)?);
                let raw = reader.u16()?;
                let symbol = u8::try_from(raw)
                    .ok()
                    .and_then(Symbol::from_byte)
                    .ok_or(DecodeError::BadSymbol(raw))?;
                Request::JoinGame { cookie, game_id, symbol }
            }
            RequestKind::MakeMove => {
                let cookie = read_cookie(&mut reader)?;
                let x = reader.i32()?;
                let y = reader.i32()?;
                let position = Position::new(x, y).ok_or(DecodeError::ZeroCoordinate)?;
                Request::MakeMove { cookie, position }
            }
            RequestKind::GameStatus => Request::GameStatus { cookie: read_cookie(&mut reader)? },
            RequestKind::LoadBoard => Request::LoadBoard { cookie: read_cookie(&mut reader)? },
        };
        reader.finish()?;
        Ok(request)
    }
}

/// Frames a response. `kind` stays raw so transport failures can echo
/// whatever type field the request carried.
pub fn encode_response(kind: u16, code: TransportCode, payload: &[u8]) -> Vec<u8> {
    let header = ResponseHeader {
        kind,
        code: code.as_u16(),
        payload_len: payload.len() as u64,
    };
    let mut frame = Vec::with_capacity(RESPONSE_HEADER_SIZE + payload.len());
    frame.extend_from_slice(&header.to_bytes());
    frame.extend_from_slice(&payload);
    frame
}

/// Minimal big-endian encoding: leading zero bytes stripped, id zero is
/// an empty string.
pub fn encode_game_id(id: GameId) -> Vec<u8> {
    let bytes = id.to_be_bytes();
    let first = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    bytes[first..].to_vec()
}

/// Inverse of `encode_game_id`. The caller checks the length bound.
pub fn decode_game_id(bytes: &[u8]) -> GameId {
    bytes.iter().fold(0, |acc, &b| (acc << 8) | b as GameId)
}

// Reply payload builders (server side). Every reply leads with a 2-byte
// verdict; MakeMove additionally leads with its domain byte. Move and
// status replies keep a fixed size, zero-filling the report on failure.

pub fn encode_init_reply(result: &Result<Cookie, ProcessError>) -> Vec<u8> {
    match result {
        Ok(cookie) => {
            let mut payload = Vec::with_capacity(2 + cookie.len());
            payload.extend_from_slice(&0u16.to_be_bytes());
            payload.extend_from_slice(cookie);
            payload
        }
        Err(err) => err.code().to_be_bytes().to_vec(),
    }
}

pub fn encode_make_game_reply(result: Result<GameId, ProcessError>) -> Vec<u8> {
    match result {
        Ok(id) => {
            let id = encode_game_id(id);
            let mut payload = Vec::with_capacity(2 + id.len());
            payload.extend_from_slice(&0u16.to_be_bytes());
            payload.extend_from_slice(&id);
            payload
        }
        Err(err) => err.code().to_be_bytes().to_vec(),
    }
}

pub fn encode_join_reply(result: &Result<(Vec<u8>, Symbol), ProcessError>) -> Vec<u8> {
    match result {
        Ok((board, symbol)) => {
            let mut payload = Vec::with_capacity(2 + board.len() + 1);
            payload.extend_from_slice(&0u16.to_be_bytes());
            payload.extend_from_slice(board);
            payload.push(symbol.as_byte());
            payload
        }
        Err(err) => err.code().to_be_bytes().to_vec(),
    }
}

pub fn encode_make_move_reply(result: Result<StatusReport, MakeMoveError>) -> Vec<u8> {
    let mut payload = Vec::with_capacity(12);
    match result {
        Ok(report) => {
            payload.push(0);
            payload.extend_from_slice(&0u16.to_be_bytes());
            payload.extend_from_slice(&report.hash.to_be_bytes());
            payload.push(report.status.as_byte());
        }
        Err(err) => {
            payload.push(err.domain());
            payload.extend_from_slice(&err.code().to_be_bytes());
            payload.extend_from_slice(&0u64.to_be_bytes());
            payload.push(0);
        }
    }
    payload
}

pub fn encode_status_reply(result: Result<StatusReport, ProcessError>) -> Vec<u8> {
    let mut payload = Vec::with_capacity(11);
    match result {
        Ok(report) => {
            payload.extend_from_slice(&0u16.to_be_bytes());
            payload.extend_from_slice(&report.hash.to_be_bytes());
            payload.push(report.status.as_byte());
        }
        Err(err) => {
            payload.extend_from_slice(&err.code().to_be_bytes());
            payload.extend_from_slice(&0u64.to_be_bytes());
            payload.push(0);
        }
    }
    payload
}

pub fn encode_board_reply(result: &Result<Vec<u8>, ProcessError>) -> Vec<u8> {
    match result {
        Ok(board) => {
            let mut payload = Vec::with_capacity(2 + board.len());
            payload.extend_from_slice(&0u16.to_be_bytes());
            payload.extend_from_slice(board);
            payload
        }
        Err(err) => err.code().to_be_bytes().to_vec(),
    }
}

// Reply payload parsers (client side). The outer result is a decode
// failure, the inner one the server's domain verdict. Variable-size
// replies end at the verdict word on failure.

pub fn parse_init_reply(payload: &[u8]) -> Result<Result<Cookie, ProcessError>, DecodeError> {
    let mut reader = Reader::new(payload);
    if let Some(err) = read_verdict(&mut reader)? {
        reader.finish()?;
        return Ok(Err(err));
    }
    Ok(Ok(reader.rest().to_vec()))
}

pub fn parse_make_game_reply(payload: &[u8]) -> Result<Result<GameId, ProcessError>, DecodeError> {
    let mut reader = Reader::new(payload);
    if let Some(err) = read_verdict(&mut reader)? {
        reader.finish()?;
        return Ok(Err(err));
    }
    let id = reader.rest();
    if id.len() > GAME_ID_MAX_BYTES {
        return Err(DecodeError::GameIdTooLong(id.len()));
    }
    Ok(Ok(decode_game_id(id)))
}

pub fn parse_join_reply(
    payload: &[u8],
) -> Result<Result<(Board, Symbol), ProcessError>, DecodeError> {
    let mut reader = Reader::new(payload);
    if let Some(err) = read_verdict(&mut reader)? {
        reader.finish()?;
        return Ok(Err(err));
    }
    let rest = reader.rest();
    let (last, board_bytes) = match rest.split_last() {
        Some(split) => split,
        None => return Err(DecodeError::Truncated { need: 1, have: 0 }),
    };
    let symbol = Symbol::from_byte(*last).ok_or(DecodeError::BadSymbol(*last as u16))?;
    Ok(Ok((Board::from_bytes(board_bytes)?, symbol)))
}

pub fn parse_make_move_reply(
    payload: &[u8],
) -> Result<Result<StatusReport, MakeMoveError>, DecodeError> {
    let mut reader = Reader::new(payload);
    let domain = reader.u8()?;
    let verdict = reader.u16()?;
    let report = read_report(&mut reader)?;
    reader.finish()?;
    if verdict == 0 {
        return Ok(Ok(report));
    }
    let err = match domain {
        0 => ProcessError::from_code(verdict)
            .map(MakeMoveError::Process)
            .ok_or(DecodeError::UnknownVerdict(verdict))?,
        1 => MoveError::from_code(verdict)
            .map(MakeMoveError::Move)
            .ok_or(DecodeError::UnknownVerdict(verdict))?,
        other => return Err(DecodeError::UnknownDomain(other)),
    };
    Ok(Err(err))
}

pub fn parse_status_reply(
    payload: &[u8],
) -> Result<Result<StatusReport, ProcessError>, DecodeError> {
    let mut reader = Reader::new(payload);
    let verdict = read_verdict(&mut reader)?;
    let report = read_report(&mut reader)?;
    reader.finish()?;
    Ok(match verdict {
        Some(err) => Err(err),
        None => Ok(report),
    })
}

pub fn parse_board_reply(payload: &[u8]) -> Result<Result<Board, ProcessError>, DecodeError> {
    let mut reader = Reader::new(payload);
    if let Some(err) = read_verdict(&mut reader)? {
        reader.finish()?;
        return Ok(Err(err));
    }
    Ok(Ok(Board::from_bytes(reader.rest())?))
}

fn write_cookie(payload: &mut Vec<u8>, cookie: &[u8]) {
    payload.extend_from_slice(&(cookie.len() as u16).to_be_bytes());
    payload.extend_from_slice(cookie);
}

fn read_cookie(reader: &mut Reader) -> Result<Cookie, DecodeError> {
    let len = reader.u16()? as usize;
    Ok(reader.take(len)?.to_vec())
}

/// Reads the leading verdict word. `None` means success.
fn read_verdict(reader: &mut Reader) -> Result<Option<ProcessError>, DecodeError> {
    let verdict = reader.u16()?;
    if verdict == 0 {
        return Ok(None);
    }
    ProcessError::from_code(verdict)
        .map(Some)
        .ok_or(DecodeError::UnknownVerdict(verdict))
}

fn read_report(reader: &mut Reader) -> Result<StatusReport, DecodeError> {
    let hash = reader.u64()?;
    let status = reader.u8()?;
    let status = Symbol::from_byte(status).ok_or(DecodeError::BadSymbol(status as u16))?;
    Ok(StatusReport { hash, status })
}

/// Cursor over a payload slice. Every read is bounds-checked and reports
/// exactly how much was missing.
struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Reader<'a> {
        Reader { bytes, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        if self.remaining() < n {
            return Err(DecodeError::Truncated { need: n, have: self.remaining() });
        }
        let slice = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn rest(&mut self) -> &'a [u8] {
        let slice = &self.bytes[self.pos..];
        self.pos = self.bytes.len();
        slice
    }

    fn u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16, DecodeError> {
        let bytes = self.take(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    fn i32(&mut self) -> Result<i32, DecodeError> {
        let bytes = self.take(4)?;
        Ok(i32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn u64(&mut self) -> Result<u64, DecodeError> {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(self.take(8)?);
        Ok(u64::from_be_bytes(buf))
    }

    fn finish(self) -> Result<(), DecodeError> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(DecodeError::Trailing(n)),
        }
    }
}
