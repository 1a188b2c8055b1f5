//! Integration tests for the five-in-a-row client and server
//!
//! These tests drive full request cycles over real TCP sockets: the
//! client crate encodes, the server crate decides, and every assertion
//! looks at what came back over the wire.

use client::network::{ClientError, GameClient};
use server::network::Server;
use server::session::{SessionConfig, SessionProcess};
use shared::{MoveError, Position, ProcessError, Symbol};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// FULL GAME SCENARIO TESTS
mod full_game_tests {
    use super::*;

    /// Plays a complete game between two players, from registration to
    /// the diagonal that ends it
    #[tokio::test]
    async fn complete_game_over_tcp() {
        let (addr, _session) = start_server(SessionConfig::default()).await;
        let client = GameClient::new(&addr);

        let cross_cookie = client.init_connection("ada").await.expect("init failed");
        let nought_cookie = client.init_connection("grace").await.expect("init failed");

        let game_id = client.make_game(10).await.expect("make_game failed");

        let (board, seat) = client
            .join_game(&cross_cookie, game_id, Symbol::Cross)
            .await
            .expect("first join failed");
        assert_eq!(seat, Symbol::Cross);
        assert_eq!(board.radius(), 10);

        let (_, seat) = client
            .join_game(&nought_cookie, game_id, Symbol::Blank)
            .await
            .expect("second join failed");
        assert_eq!(seat, Symbol::Nought);

        // Cross builds a diagonal while nought fills a short row on its
        // own side of the board.
        let cross_moves = [(1, 1), (2, 2), (3, 3), (4, 4)];
        let nought_moves = [(-1, -1), (-2, -1), (-3, -1), (-4, -1)];
        for round in 0..4 {
            let (x, y) = cross_moves[round];
            let report = client
                .make_move(&cross_cookie, pos(x, y))
                .await
                .expect("cross move failed");
            assert_eq!(report.status, Symbol::Blank);

            let (x, y) = nought_moves[round];
            let report = client
                .make_move(&nought_cookie, pos(x, y))
                .await
                .expect("nought move failed");
            assert_eq!(report.status, Symbol::Blank);
        }

        // The fifth diagonal mark completes the line.
        let report = client
            .make_move(&cross_cookie, pos(5, 5))
            .await
            .expect("winning move failed");
        assert_eq!(report.status, Symbol::Cross);

        // Both seats observe the same terminal state.
        let cross_view = client
            .game_status(&cross_cookie)
            .await
            .expect("status failed");
        let nought_view = client
            .game_status(&nought_cookie)
            .await
            .expect("status failed");
        assert_eq!(cross_view.status, Symbol::Cross);
        assert_eq!(cross_view.hash, report.hash);
        assert_eq!(nought_view.hash, report.hash);

        // The dumped board matches what was played, hash included.
        let board = client
            .load_board(&nought_cookie)
            .await
            .expect("load_board failed");
        assert_eq!(board.radius(), 10);
        assert_eq!(board.get(pos(3, 3)), Symbol::Cross);
        assert_eq!(board.get(pos(-2, -1)), Symbol::Nought);
        assert_eq!(board.get(pos(5, -5)), Symbol::Blank);
        assert_eq!(board.hash(), report.hash);

        // No more moves once the game is over.
        let err = client
            .make_move(&nought_cookie, pos(-5, -1))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Move(MoveError::GameAlreadyOver)));
    }

    /// Verifies turn and cell rules come back as typed move errors
    #[tokio::test]
    async fn move_rules_surface_as_typed_errors() {
        let (addr, _session) = start_server(SessionConfig::default()).await;
        let client = GameClient::new(&addr);

        let first = client.init_connection("a").await.expect("init failed");
        let second = client.init_connection("b").await.expect("init failed");
        let game_id = client.make_game(5).await.expect("make_game failed");
        client
            .join_game(&first, game_id, Symbol::Cross)
            .await
            .expect("join failed");
        client
            .join_game(&second, game_id, Symbol::Blank)
            .await
            .expect("join failed");

        // Nought cannot open the game.
        let err = client.make_move(&second, pos(1, 1)).await.unwrap_err();
        assert!(matches!(err, ClientError::Move(MoveError::WrongTeam)));

        client
            .make_move(&first, pos(1, 1))
            .await
            .expect("opening move failed");

        // Cross cannot move twice in a row.
        let err = client.make_move(&first, pos(2, 2)).await.unwrap_err();
        assert!(matches!(err, ClientError::Move(MoveError::WrongTeam)));

        // The occupied cell is refused for the player on turn.
        let err = client.make_move(&second, pos(1, 1)).await.unwrap_err();
        assert!(matches!(err, ClientError::Move(MoveError::WrongPlace)));
    }

    /// A move beyond the current radius grows the board server-side
    #[tokio::test]
    async fn boards_grow_to_fit_outlying_moves() {
        let (addr, _session) = start_server(SessionConfig::default()).await;
        let client = GameClient::new(&addr);

        let first = client.init_connection("a").await.expect("init failed");
        let second = client.init_connection("b").await.expect("init failed");
        let game_id = client.make_game(2).await.expect("make_game failed");
        client
            .join_game(&first, game_id, Symbol::Cross)
            .await
            .expect("join failed");
        client
            .join_game(&second, game_id, Symbol::Blank)
            .await
            .expect("join failed");

        let report = client
            .make_move(&first, pos(7, -1))
            .await
            .expect("outlying move failed");

        let board = client.load_board(&first).await.expect("load_board failed");
        assert_eq!(board.radius(), 7);
        assert_eq!(board.get(pos(7, -1)), Symbol::Cross);
        assert_eq!(board.hash(), report.hash);
    }
}

/// SESSION RULE TESTS
mod session_rule_tests {
    use super::*;

    /// A cookie the server never issued is rejected on every operation
    #[tokio::test]
    async fn unknown_cookies_are_not_found() {
        let (addr, _session) = start_server(SessionConfig::default()).await;
        let client = GameClient::new(&addr);

        let bogus = vec![42u8; 16];
        let err = client.game_status(&bogus).await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Process(ProcessError::CookieNotFound)
        ));

        let err = client.join_game(&bogus, 4217, Symbol::Blank).await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Process(ProcessError::CookieNotFound)
        ));
    }

    /// Game operations need a seat, and seats need an existing game
    #[tokio::test]
    async fn seatless_players_get_precise_verdicts() {
        let (addr, _session) = start_server(SessionConfig::default()).await;
        let client = GameClient::new(&addr);

        let cookie = client.init_connection("drifter").await.expect("init failed");

        let err = client.game_status(&cookie).await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Process(ProcessError::PlayerNotInGame)
        ));

        let err = client
            .join_game(&cookie, 4217, Symbol::Blank)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::Process(ProcessError::GameNotFound)
        ));
    }

    /// Symbols and seats cannot be claimed twice
    #[tokio::test]
    async fn taken_seats_are_already_in_use() {
        let (addr, _session) = start_server(SessionConfig::default()).await;
        let client = GameClient::new(&addr);

        let first = client.init_connection("a").await.expect("init failed");
        let second = client.init_connection("b").await.expect("init failed");
        let third = client.init_connection("c").await.expect("init failed");
        let game_id = client.make_game(4).await.expect("make_game failed");

        client
            .join_game(&first, game_id, Symbol::Nought)
            .await
            .expect("join failed");

        // Requesting a specific symbol only works in an empty game.
        let err = client
            .join_game(&second, game_id, Symbol::Cross)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::Process(ProcessError::AlreadyInUse)
        ));

        // A blank request still completes the pair.
        let (_, seat) = client
            .join_game(&second, game_id, Symbol::Blank)
            .await
            .expect("join failed");
        assert_eq!(seat, Symbol::Cross);

        // The game is now full.
        let err = client
            .join_game(&third, game_id, Symbol::Blank)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::Process(ProcessError::AlreadyInUse)
        ));
    }

    /// The game limit refuses creation without touching existing games
    #[tokio::test]
    async fn game_limit_overloads_gracefully() {
        let config = SessionConfig {
            game_limit: 1,
            ..SessionConfig::default()
        };
        let (addr, _session) = start_server(config).await;
        let client = GameClient::new(&addr);

        let cookie = client.init_connection("maker").await.expect("init failed");

        // The limit is checked with strict greater-than, so a limit of
        // one admits a second game before refusing.
        let first_game = client.make_game(3).await.expect("first game failed");
        client.make_game(3).await.expect("second game failed");
        let err = client.make_game(3).await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Process(ProcessError::Overloaded)
        ));

        // Existing games are unaffected by the refusal.
        let (board, _) = client
            .join_game(&cookie, first_game, Symbol::Cross)
            .await
            .expect("join failed");
        assert_eq!(board.radius(), 3);
    }

    /// Swept cookies stop resolving while their games live on
    #[tokio::test]
    async fn expired_cookies_are_swept() {
        let config = SessionConfig {
            cookie_ttl: Duration::from_millis(250),
            ..SessionConfig::default()
        };
        let (addr, session) = start_server(config).await;
        let client = GameClient::new(&addr);

        let cookie = client.init_connection("ghost").await.expect("init failed");
        let game_id = client.make_game(4).await.expect("make_game failed");
        client
            .join_game(&cookie, game_id, Symbol::Cross)
            .await
            .expect("join failed");

        tokio::time::sleep(Duration::from_millis(400)).await;
        let swept = session.write().await.sweep_expired_cookies();
        assert_eq!(swept, 1);

        let err = client.game_status(&cookie).await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Process(ProcessError::CookieNotFound)
        ));

        // A fresh cookie can still reach the surviving game.
        let replacement = client.init_connection("ghost").await.expect("init failed");
        client
            .join_game(&replacement, game_id, Symbol::Blank)
            .await
            .expect("the game should have outlived the cookie");
    }
}

// HELPER FUNCTIONS

async fn start_server(config: SessionConfig) -> (String, Arc<RwLock<SessionProcess>>) {
    let server = Server::bind("127.0.0.1:0", SessionProcess::new(config))
        .await
        .expect("failed to bind test server");
    let addr = server
        .local_addr()
        .expect("failed to read server address")
        .to_string();
    let session = server.session();
    tokio::spawn(async move {
        let _ = server.run().await;
    });
    (addr, session)
}

fn pos(x: i32, y: i32) -> Position {
    Position::new(x, y).expect("test positions are off the axes")
}
