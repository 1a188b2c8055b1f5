//! One-shot request client for the game server.
//!
//! Every operation opens a fresh TCP connection, writes one framed
//! request, reads one framed response under a fixed timeout, then drops
//! the connection. Identity across calls is carried entirely by the
//! session cookie, never by the socket.

use log::debug;
use shared::protocol::{
    parse_board_reply, parse_init_reply, parse_join_reply, parse_make_game_reply,
    parse_make_move_reply, parse_status_reply,
};
use shared::{
    Board, Cookie, DecodeError, GameId, MakeMoveError, MoveError, Position, ProcessError,
    Request, ResponseHeader, StatusReport, Symbol, TransportCode,
};
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

/// Read timeout applied when none is configured.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(4);

/// Upper bound on a response payload the client will buffer.
pub const MAX_RESPONSE_PAYLOAD: u64 = 16 * 1024 * 1024;

/// How a request can fail from the caller's point of view. Server
/// verdicts keep their own types; everything else falls into the
/// timed-out or invalid-answer classifications.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server understood the request and refused it.
    #[error(transparent)]
    Process(#[from] ProcessError),
    /// The server judged the move illegal.
    #[error(transparent)]
    Move(#[from] MoveError),
    /// The server reported a transport-level failure.
    #[error("request rejected with transport code {0:?}")]
    Transport(TransportCode),
    /// No complete response arrived within the read timeout.
    #[error("timed out waiting for the server")]
    TimedOut,
    /// The response payload does not decode as an answer.
    #[error("invalid answer: {0}")]
    InvalidAnswer(#[from] DecodeError),
    /// The response answers a different request type.
    #[error("invalid answer: a type {got} reply to a type {sent} request")]
    MismatchedReply { sent: u16, got: u16 },
    /// The response declares more payload than any reply carries.
    #[error("invalid answer: response declares {0} payload bytes")]
    OversizedReply(u64),
    /// The response carries a transport code outside the protocol.
    #[error("invalid answer: unknown transport code {0}")]
    UnknownTransportCode(u16),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<MakeMoveError> for ClientError {
    fn from(err: MakeMoveError) -> ClientError {
        match err {
            MakeMoveError::Process(err) => ClientError::Process(err),
            MakeMoveError::Move(err) => ClientError::Move(err),
        }
    }
}

/// Client for the game server.
///
/// Holds only the server address and a read timeout, so one instance is
/// cheap to keep around and can serve any number of sequential requests.
pub struct GameClient {
    addr: String,
    read_timeout: Duration,
}

impl GameClient {
    pub fn new(addr: &str) -> GameClient {
        GameClient {
            addr: addr.to_string(),
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    /// Replaces the timeout applied while reading each response.
    pub fn with_read_timeout(mut self, read_timeout: Duration) -> GameClient {
        self.read_timeout = read_timeout;
        self
    }

    /// Registers a player under the given display name. The returned
    /// cookie is the bearer credential for every later request.
    pub async fn init_connection(&self, name: &str) -> Result<Cookie, ClientError> {
        let request = Request::InitConnection {
            name: name.to_string(),
        };
        let reply = self.round_trip(&request).await?;
        let verdict = parse_init_reply(&reply)?;
        Ok(verdict?)
    }

    /// Creates a game with the given starting radius and returns its id.
    pub async fn make_game(&self, init_radius: u16) -> Result<GameId, ClientError> {
        let reply = self.round_trip(&Request::MakeGame { init_radius }).await?;
        let verdict = parse_make_game_reply(&reply)?;
        Ok(verdict?)
    }

    /// Takes a seat in a game. Requesting `Symbol::Blank` lets the
    /// server pick; the reply carries the current board and the symbol
    /// actually assigned.
    pub async fn join_game(
        &self,
        cookie: &Cookie,
        game_id: GameId,
        symbol: Symbol,
    ) -> Result<(Board, Symbol), ClientError> {
        let request = Request::JoinGame {
            cookie: cookie.clone(),
            game_id,
            symbol,
        };
        let reply = self.round_trip(&request).await?;
        let verdict = parse_join_reply(&reply)?;
        Ok(verdict?)
    }

    /// Places the caller's mark and returns the post-move report.
    pub async fn make_move(
        &self,
        cookie: &Cookie,
        position: Position,
    ) -> Result<StatusReport, ClientError> {
        let request = Request::MakeMove {
            cookie: cookie.clone(),
            position,
        };
        let reply = self.round_trip(&request).await?;
        let verdict = parse_make_move_reply(&reply)?;
        Ok(verdict?)
    }

    /// Reads the hash and status of the caller's current game.
    pub async fn game_status(&self, cookie: &Cookie) -> Result<StatusReport, ClientError> {
        let request = Request::GameStatus {
            cookie: cookie.clone(),
        };
        let reply = self.round_trip(&request).await?;
        let verdict = parse_status_reply(&reply)?;
        Ok(verdict?)
    }

    /// Fetches the full board of the caller's current game.
    pub async fn load_board(&self, cookie: &Cookie) -> Result<Board, ClientError> {
        let request = Request::LoadBoard {
            cookie: cookie.clone(),
        };
        let reply = self.round_trip(&request).await?;
        let verdict = parse_board_reply(&reply)?;
        Ok(verdict?)
    }

    /// One full exchange on a fresh connection. Returns the reply
    /// payload once the frame passes the transport checks.
    async fn round_trip(&self, request: &Request) -> Result<Vec<u8>, ClientError> {
        let kind = request.kind().as_u16();
        debug!("Sending type {} request to {}", kind, self.addr);

        let mut stream = TcpStream::connect(&self.addr).await?;
        stream.write_all(&request.encode()).await?;

        let (header, payload) = timeout(self.read_timeout, read_response(&mut stream))
            .await
            .map_err(|_| ClientError::TimedOut)??;

        debug!(
            "Response: type {}, transport code {}, {} payload byte(s)",
            header.kind,
            header.code,
            payload.len()
        );

        if header.kind != kind {
            return Err(ClientError::MismatchedReply {
                sent: kind,
                got: header.kind,
            });
        }
        match TransportCode::from_u16(header.code) {
            Some(TransportCode::Success) => Ok(payload),
            Some(code) => Err(ClientError::Transport(code)),
            None => Err(ClientError::UnknownTransportCode(header.code)),
        }
    }
}

async fn read_response(stream: &mut TcpStream) -> Result<(ResponseHeader, Vec<u8>), ClientError> {
    let mut header = [0u8; ResponseHeader::SIZE];
    stream.read_exact(&mut header).await?;
    let header = ResponseHeader::from_bytes(header);

    if header.payload_len > MAX_RESPONSE_PAYLOAD {
        return Err(ClientError::OversizedReply(header.payload_len));
    }

    let mut payload = vec![0u8; header.payload_len as usize];
    stream.read_exact(&mut payload).await?;
    Ok((header, payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::protocol::{encode_init_reply, encode_make_move_reply, encode_response};
    use shared::{RequestHeader, RequestKind};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serves exactly one connection: reads one request frame, writes
    /// the canned response, and hands back the captured request bytes.
    async fn canned_server(response: Vec<u8>) -> (String, JoinHandle<Vec<u8>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut header = [0u8; RequestHeader::SIZE];
            stream.read_exact(&mut header).await.unwrap();
            let parsed = RequestHeader::from_bytes(header);
            let mut payload = vec![0u8; parsed.payload_len as usize];
            stream.read_exact(&mut payload).await.unwrap();
            stream.write_all(&response).await.unwrap();
            let mut frame = header.to_vec();
            frame.extend_from_slice(&payload);
            frame
        });
        (addr, handle)
    }

    #[tokio::test]
    async fn test_init_connection_returns_the_cookie() {
        let cookie = vec![9u8; 16];
        let reply = encode_response(
            RequestKind::InitConnection.as_u16(),
            TransportCode::Success,
            &encode_init_reply(&Ok(cookie.clone())),
        );
        let (addr, sent) = canned_server(reply).await;

        let client = GameClient::new(&addr);
        let got = client.init_connection("alice").await.unwrap();

        assert_eq!(got, cookie);
        let frame = sent.await.unwrap();
        let expected = Request::InitConnection {
            name: "alice".to_string(),
        };
        assert_eq!(frame, expected.encode());
    }

    #[tokio::test]
    async fn test_make_move_returns_the_status_report() {
        let report = StatusReport {
            hash: 0xdead_beef,
            status: Symbol::Blank,
        };
        let reply = encode_response(
            RequestKind::MakeMove.as_u16(),
            TransportCode::Success,
            &encode_make_move_reply(Ok(report)),
        );
        let (addr, sent) = canned_server(reply).await;

        let client = GameClient::new(&addr);
        let cookie = vec![4u8; 8];
        let position = Position::new(-2, 5).unwrap();
        let got = client.make_move(&cookie, position).await.unwrap();

        assert_eq!(got, report);
        let frame = sent.await.unwrap();
        assert_eq!(frame, Request::MakeMove { cookie, position }.encode());
    }

    #[tokio::test]
    async fn test_domain_verdict_surfaces_as_a_process_error() {
        let reply = encode_response(
            RequestKind::InitConnection.as_u16(),
            TransportCode::Success,
            &encode_init_reply(&Err(ProcessError::Overloaded)),
        );
        let (addr, _sent) = canned_server(reply).await;

        let client = GameClient::new(&addr);
        let err = client.init_connection("alice").await.unwrap_err();

        assert!(matches!(err, ClientError::Process(ProcessError::Overloaded)));
    }

    #[tokio::test]
    async fn test_bad_request_code_surfaces_as_a_transport_error() {
        let reply = encode_response(RequestKind::MakeGame.as_u16(), TransportCode::BadRequest, &[]);
        let (addr, _sent) = canned_server(reply).await;

        let client = GameClient::new(&addr);
        let err = client.make_game(10).await.unwrap_err();

        assert!(matches!(
            err,
            ClientError::Transport(TransportCode::BadRequest)
        ));
    }

    #[tokio::test]
    async fn test_reply_type_must_match_the_request_type() {
        let reply = encode_response(
            RequestKind::GameStatus.as_u16(),
            TransportCode::Success,
            &encode_init_reply(&Ok(vec![1, 2, 3])),
        );
        let (addr, _sent) = canned_server(reply).await;

        let client = GameClient::new(&addr);
        let err = client.init_connection("alice").await.unwrap_err();

        assert!(matches!(
            err,
            ClientError::MismatchedReply { sent: 1, got: 5 }
        ));
    }

    #[tokio::test]
    async fn test_undecodable_payload_is_an_invalid_answer() {
        // A successful make-move reply is exactly 12 bytes, not 3.
        let reply = encode_response(
            RequestKind::MakeMove.as_u16(),
            TransportCode::Success,
            &[1, 2, 3],
        );
        let (addr, _sent) = canned_server(reply).await;

        let client = GameClient::new(&addr);
        let cookie = vec![4u8; 8];
        let position = Position::new(1, 1).unwrap();
        let err = client.make_move(&cookie, position).await.unwrap_err();

        assert!(matches!(err, ClientError::InvalidAnswer(_)));
    }

    #[tokio::test]
    async fn test_unknown_transport_code_is_an_invalid_answer() {
        let reply = ResponseHeader {
            kind: RequestKind::GameStatus.as_u16(),
            code: 9,
            payload_len: 0,
        }
        .to_bytes()
        .to_vec();
        let (addr, _sent) = canned_server(reply).await;

        let client = GameClient::new(&addr);
        let err = client.game_status(&vec![1u8; 4]).await.unwrap_err();

        assert!(matches!(err, ClientError::UnknownTransportCode(9)));
    }

    #[tokio::test]
    async fn test_silent_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        tokio::spawn(async move {
            // Hold the connection open without ever answering.
            let (_stream, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let client = GameClient::new(&addr).with_read_timeout(Duration::from_millis(50));
        let err = client.game_status(&vec![0u8; 8]).await.unwrap_err();

        assert!(matches!(err, ClientError::TimedOut));
    }
}
