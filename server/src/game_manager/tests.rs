use super::*;
use crate::game_manager::{clock::TURN_SECONDS, session::MatchPhase};
use gomoku_core::{Board, Symbol, BOARD_SIZE};
use shared::{ErrorKind, Outcome, PlayerProfile, ServerMessage};
use std::{sync::Arc, time::Duration};
use tokio::sync::mpsc;

type Rx = mpsc::UnboundedReceiver<ServerMessage>;

fn profile(name: &str) -> PlayerProfile {
    PlayerProfile {
        username: name.to_string(),
        avatar: format!("{name}.png"),
    }
}

fn connect(state: &AppState, id: &str) -> Rx {
    let (tx, rx) = mpsc::unbounded_channel();
    state.add_player(id.to_string(), tx);
    rx
}

// Everything queued so far, without waiting
fn drain(rx: &mut Rx) -> Vec<ServerMessage> {
    let mut out = Vec::new();
    while let Ok(msg) = rx.try_recv() {
        out.push(msg);
    }
    out
}

fn skips(msgs: &[ServerMessage]) -> usize {
    msgs.iter()
        .filter(|m| matches!(m, ServerMessage::TurnSkipped { .. }))
        .count()
}

fn errors(msgs: &[ServerMessage]) -> Vec<ErrorKind> {
    msgs.iter()
        .filter_map(|m| match m {
            ServerMessage::Error { kind, .. } => Some(*kind),
            _ => None,
        })
        .collect()
}

async fn current_turn(state: &AppState, player_id: &str) -> Option<String> {
    let (_, session) = state.registry.lookup(player_id)?;
    let game = session.lock().await;
    game.current_turn().map(|p| p.player_id.clone())
}

/// Two connected players seated in `room`, setup messages drained.
async fn start_match(state: &AppState, room: &str) -> (Rx, Rx) {
    let mut rx1 = connect(state, "p1");
    let mut rx2 = connect(state, "p2");
    state.join_room("p1", room, profile("ann")).await;
    state.join_room("p2", room, profile("bob")).await;
    drain(&mut rx1);
    drain(&mut rx2);
    (rx1, rx2)
}

#[tokio::test(start_paused = true)]
async fn test_two_players_get_ready_with_roster() {
    let state = AppState::new();
    let mut rx1 = connect(&state, "p1");
    let mut rx2 = connect(&state, "p2");

    state.join_room("p1", "r1", profile("ann")).await;
    assert_eq!(
        drain(&mut rx1),
        vec![ServerMessage::Waiting {
            message: "Waiting for other players!".to_string()
        }]
    );

    state.join_room("p2", "r1", profile("bob")).await;

    for rx in [&mut rx1, &mut rx2] {
        let msgs = drain(rx);
        match msgs.first() {
            Some(ServerMessage::GameReady { players, .. }) => {
                let roster: Vec<_> = players
                    .iter()
                    .map(|p| (p.username.as_str(), p.avatar.as_str(), p.symbol))
                    .collect();
                assert_eq!(
                    roster,
                    vec![("ann", "ann.png", Symbol::X), ("bob", "bob.png", Symbol::O)]
                );
            }
            other => panic!("expected GameReady, got {other:?}"),
        }
        assert_eq!(
            msgs.get(1),
            Some(&ServerMessage::TurnUpdate {
                time_left: TURN_SECONDS,
                current_player: Symbol::X
            })
        );
    }

    assert_eq!(current_turn(&state, "p1").await.as_deref(), Some("p1"));
}

#[tokio::test(start_paused = true)]
async fn test_moves_alternate_and_reach_both_players() {
    let state = AppState::new();
    let (mut rx1, mut rx2) = start_match(&state, "r1").await;

    state.handle_move("p1", 112).await;
    let expected = ServerMessage::Move {
        index: 112,
        symbol: Symbol::X,
    };
    assert_eq!(drain(&mut rx1).first(), Some(&expected));
    assert_eq!(drain(&mut rx2).first(), Some(&expected));
    assert_eq!(current_turn(&state, "p1").await.as_deref(), Some("p2"));

    // X may not move again before O
    state.handle_move("p1", 0).await;
    assert_eq!(errors(&drain(&mut rx1)), vec![ErrorKind::NotYourTurn]);
    assert!(errors(&drain(&mut rx2)).is_empty());

    state.handle_move("p2", 113).await;
    assert_eq!(
        drain(&mut rx1).first(),
        Some(&ServerMessage::Move {
            index: 113,
            symbol: Symbol::O
        })
    );
    assert_eq!(current_turn(&state, "p1").await.as_deref(), Some("p1"));
}

#[tokio::test(start_paused = true)]
async fn test_invalid_moves_leave_match_unchanged() {
    let state = AppState::new();
    let (mut rx1, mut rx2) = start_match(&state, "r1").await;

    state.handle_move("p1", 112).await;
    drain(&mut rx1);
    drain(&mut rx2);

    state.handle_move("p2", 112).await;
    state.handle_move("p2", 225).await;
    assert_eq!(
        errors(&drain(&mut rx2)),
        vec![ErrorKind::InvalidMove, ErrorKind::InvalidMove]
    );
    assert!(drain(&mut rx1).is_empty());
    assert_eq!(current_turn(&state, "p2").await.as_deref(), Some("p2"));

    let (_, session) = state.registry.lookup("p2").unwrap();
    assert_eq!(session.lock().await.game.board.filled_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_negative_index_is_invalid_move() {
    let state = AppState::new();
    let (mut rx1, mut rx2) = start_match(&state, "r1").await;

    state.handle_move("p1", -1).await;
    assert_eq!(errors(&drain(&mut rx1)), vec![ErrorKind::InvalidMove]);
    assert!(drain(&mut rx2).is_empty());

    let (_, session) = state.registry.lookup("p1").unwrap();
    let game = session.lock().await;
    assert_eq!(game.game.board.filled_count(), 0);
    assert_eq!(game.current_turn().map(|p| p.player_id.as_str()), Some("p1"));
}

#[tokio::test(start_paused = true)]
async fn test_negative_index_out_of_turn_is_not_your_turn() {
    let state = AppState::new();
    let (_rx1, mut rx2) = start_match(&state, "r1").await;

    state.handle_move("p2", -5).await;
    assert_eq!(errors(&drain(&mut rx2)), vec![ErrorKind::NotYourTurn]);
}

#[tokio::test(start_paused = true)]
async fn test_tick_waiting_on_lock_is_dropped_after_move() {
    let state = AppState::new();
    let (mut rx1, _rx2) = start_match(&state, "r1").await;
    let (_, session) = state.registry.lookup("p1").unwrap();

    {
        let mut game = session.lock().await;
        // The first tick fires at 1s and blocks on the lock held here.
        tokio::time::sleep(Duration::from_millis(1_500)).await;
        assert!(game.apply_move("p1", 112).is_ok());
    }
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(
        drain(&mut rx1),
        vec![
            ServerMessage::Move {
                index: 112,
                symbol: Symbol::X
            },
            ServerMessage::TurnUpdate {
                time_left: TURN_SECONDS,
                current_player: Symbol::O
            },
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_five_in_a_row_wins_and_closes_room() {
    let state = AppState::new();
    let (mut rx1, mut rx2) = start_match(&state, "r1").await;

    for (x, o) in [(0, 30), (1, 31), (2, 60), (3, 61)] {
        state.handle_move("p1", x).await;
        state.handle_move("p2", o).await;
    }
    drain(&mut rx1);
    drain(&mut rx2);

    state.handle_move("p1", 4).await;

    for rx in [&mut rx1, &mut rx2] {
        let msgs = drain(rx);
        assert_eq!(
            msgs.first(),
            Some(&ServerMessage::Move {
                index: 4,
                symbol: Symbol::X
            })
        );
        match msgs.get(1) {
            Some(ServerMessage::GameOver {
                outcome: Outcome::Win,
                symbol: Some(Symbol::X),
                cells: Some(cells),
                ..
            }) => {
                let mut cells = cells.clone();
                cells.sort_unstable();
                assert_eq!(cells, vec![0, 1, 2, 3, 4]);
            }
            other => panic!("expected a win, got {other:?}"),
        }
        // No clock after the game ends
        assert_eq!(msgs.len(), 2);
    }

    assert_eq!(state.registry.len(), 0);
    assert!(state.registry.lookup("p1").is_none());

    state.handle_move("p2", 100).await;
    assert_eq!(errors(&drain(&mut rx2)), vec![ErrorKind::NoActiveMatch]);

    // Nothing ticks once the match is gone
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert!(drain(&mut rx1).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_full_board_without_five_is_a_draw() {
    let state = AppState::new();
    let (mut rx1, _rx2) = start_match(&state, "r1").await;

    let mut xs = Vec::new();
    let mut os = Vec::new();
    for row in 0..BOARD_SIZE {
        for col in 0..BOARD_SIZE {
            let index = Board::coord_to_index(row, col);
            if (col + 2 * row) % 4 < 2 {
                xs.push(index);
            } else {
                os.push(index);
            }
        }
    }

    for (i, &x) in xs.iter().enumerate() {
        state.handle_move("p1", x as i64).await;
        if let Some(&o) = os.get(i) {
            state.handle_move("p2", o as i64).await;
        }
    }

    let msgs = drain(&mut rx1);
    assert!(errors(&msgs).is_empty());
    let overs: Vec<_> = msgs
        .iter()
        .filter(|m| matches!(m, ServerMessage::GameOver { .. }))
        .collect();
    assert_eq!(overs.len(), 1);
    assert!(matches!(
        overs.first(),
        Some(ServerMessage::GameOver {
            outcome: Outcome::Draw,
            symbol: None,
            cells: None,
            ..
        })
    ));
    assert_eq!(state.registry.len(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_move_before_cancel_never_skips() {
    let state = AppState::new();
    let (mut rx1, _rx2) = start_match(&state, "r1").await;

    tokio::time::sleep(Duration::from_millis(9_500)).await;
    state.handle_move("p1", 112).await;

    // 9.5s into O's fresh turn
    tokio::time::sleep(Duration::from_millis(9_500)).await;
    let msgs = drain(&mut rx1);
    assert_eq!(skips(&msgs), 0);
    assert_eq!(
        msgs.last(),
        Some(&ServerMessage::TurnUpdate {
            time_left: 1,
            current_player: Symbol::O
        })
    );
    assert_eq!(current_turn(&state, "p1").await.as_deref(), Some("p2"));
}

#[tokio::test(start_paused = true)]
async fn test_timeout_skips_once_and_restarts() {
    let state = AppState::new();
    let (mut rx1, mut rx2) = start_match(&state, "r1").await;

    tokio::time::sleep(Duration::from_millis(10_500)).await;

    let msgs = drain(&mut rx1);
    assert_eq!(skips(&msgs), 1);
    let countdown: Vec<u32> = msgs
        .iter()
        .filter_map(|m| match m {
            ServerMessage::TurnUpdate { time_left, .. } => Some(*time_left),
            _ => None,
        })
        .collect();
    assert_eq!(countdown, vec![9, 8, 7, 6, 5, 4, 3, 2, 1, 0, TURN_SECONDS]);
    assert_eq!(
        msgs.last(),
        Some(&ServerMessage::TurnUpdate {
            time_left: TURN_SECONDS,
            current_player: Symbol::O
        })
    );
    assert_eq!(skips(&drain(&mut rx2)), 1);
    assert_eq!(current_turn(&state, "p1").await.as_deref(), Some("p2"));

    state.handle_move("p1", 112).await;
    assert_eq!(errors(&drain(&mut rx1)), vec![ErrorKind::NotYourTurn]);

    // Skips keep coming with no cap
    tokio::time::sleep(Duration::from_secs(20)).await;
    assert_eq!(skips(&drain(&mut rx1)), 2);
    assert_eq!(current_turn(&state, "p1").await.as_deref(), Some("p2"));
}

#[tokio::test(start_paused = true)]
async fn test_disconnect_ends_match_and_frees_room() {
    let state = AppState::new();
    let (mut rx1, mut rx2) = start_match(&state, "r1").await;

    state.remove_player("p1").await;

    let msgs = drain(&mut rx2);
    assert_eq!(
        msgs,
        vec![ServerMessage::GameOver {
            outcome: Outcome::Disconnect,
            symbol: None,
            cells: None,
            message: "Opponent disconnected!".to_string(),
        }]
    );
    assert!(drain(&mut rx1).is_empty());
    assert_eq!(state.registry.len(), 0);

    // Clock is gone with the match
    tokio::time::sleep(Duration::from_secs(15)).await;
    assert!(drain(&mut rx2).is_empty());

    // A later join to the same room starts from scratch
    let mut rx3 = connect(&state, "p3");
    state.join_room("p3", "r1", profile("cat")).await;
    assert!(matches!(
        drain(&mut rx3).as_slice(),
        [ServerMessage::Waiting { .. }]
    ));
    let session = state.registry.get("r1").unwrap();
    let game = session.lock().await;
    assert_eq!(game.phase, MatchPhase::WaitingForPlayers);
    assert_eq!(game.participants.len(), 1);
    assert_eq!(game.game.board.filled_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_waiting_player_leaving_removes_room() {
    let state = AppState::new();
    let _rx1 = connect(&state, "p1");
    state.join_room("p1", "r1", profile("ann")).await;
    assert_eq!(state.registry.len(), 1);

    state.remove_player("p1").await;
    assert_eq!(state.registry.len(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_third_player_gets_room_full() {
    let state = AppState::new();
    let (mut rx1, mut rx2) = start_match(&state, "r1").await;
    let mut rx3 = connect(&state, "p3");

    state.join_room("p3", "r1", profile("cat")).await;
    assert_eq!(errors(&drain(&mut rx3)), vec![ErrorKind::RoomFull]);
    assert!(drain(&mut rx1).is_empty());
    assert!(drain(&mut rx2).is_empty());
    assert!(state.registry.lookup("p3").is_none());
}

#[tokio::test(start_paused = true)]
async fn test_rejoin_and_early_moves_are_rejected() {
    let state = AppState::new();
    let mut rx1 = connect(&state, "p1");

    state.handle_move("p1", 0).await;
    assert_eq!(errors(&drain(&mut rx1)), vec![ErrorKind::NoActiveMatch]);

    state.join_room("p1", "r1", profile("ann")).await;
    drain(&mut rx1);

    state.handle_move("p1", 0).await;
    state.join_room("p1", "r1", profile("ann")).await;
    state.join_room("p1", "r2", profile("ann")).await;
    assert_eq!(
        errors(&drain(&mut rx1)),
        vec![
            ErrorKind::NotYourTurn,
            ErrorKind::AlreadyInRoom,
            ErrorKind::AlreadyInRoom
        ]
    );
    assert_eq!(state.registry.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_racing_moves_resolve_by_turn() {
    let state = Arc::new(AppState::new());
    let (mut rx1, mut rx2) = start_match(&state, "r1").await;

    let (a, b) = (Arc::clone(&state), Arc::clone(&state));
    let first = tokio::spawn(async move { a.handle_move("p2", 7).await });
    let second = tokio::spawn(async move { b.handle_move("p1", 7).await });
    let _ = tokio::join!(first, second);

    assert_eq!(errors(&drain(&mut rx2)), vec![ErrorKind::NotYourTurn]);
    assert!(errors(&drain(&mut rx1)).is_empty());

    let (_, session) = state.registry.lookup("p1").unwrap();
    let game = session.lock().await;
    assert_eq!(game.game.board.filled_count(), 1);
    assert_eq!(game.game.turn, Symbol::O);
}

#[tokio::test(start_paused = true)]
async fn test_matches_are_independent() {
    let state = AppState::new();
    let (mut rx1, _rx2) = start_match(&state, "r1").await;

    let mut rx3 = connect(&state, "p3");
    let mut rx4 = connect(&state, "p4");
    state.join_room("p3", "r2", profile("cat")).await;
    state.join_room("p4", "r2", profile("dan")).await;
    drain(&mut rx3);
    drain(&mut rx4);

    state.remove_player("p3").await;
    assert_eq!(state.registry.len(), 1);
    assert_eq!(drain(&mut rx4).len(), 1);

    state.handle_move("p1", 112).await;
    assert_eq!(
        drain(&mut rx1).first(),
        Some(&ServerMessage::Move {
            index: 112,
            symbol: Symbol::X
        })
    );
}
