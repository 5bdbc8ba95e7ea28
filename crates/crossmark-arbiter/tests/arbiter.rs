//! Integration tests for the arbiter against the in-memory store.

use crossmark_arbiter::{Arbiter, ArbiterError};
use crossmark_board::{Cell, Outcome, evaluate};
use crossmark_game::{Game, GameSnapshot, GameState, Intent, RuleError, Rules};
use crossmark_protocol::{GameId, PlayerId, Revision};
use crossmark_store::{Collection, MemoryStore, Storage, StoreError};

// =========================================================================
// Helpers
// =========================================================================

fn alice() -> PlayerId {
    PlayerId::from("alice")
}

fn bob() -> PlayerId {
    PlayerId::from("bob")
}

fn setup() -> (MemoryStore, Arbiter<MemoryStore>) {
    let store = MemoryStore::new();
    let arbiter = Arbiter::new(store.clone(), Rules::default());
    (store, arbiter)
}

/// Creates a game between alice and bob and has bob accept it.
async fn started(arbiter: &Arbiter<MemoryStore>) -> GameSnapshot {
    let invite = arbiter
        .create(Game::challenge(alice(), bob()).unwrap())
        .await
        .unwrap();
    arbiter
        .apply(&invite.id, &Intent::accept(bob()), invite.revision)
        .await
        .unwrap()
}

/// Plays `cells` alternately starting with alice, each from the previous
/// committed revision.
async fn play(
    arbiter: &Arbiter<MemoryStore>,
    mut snapshot: GameSnapshot,
    cells: &[usize],
) -> GameSnapshot {
    for (i, &cell) in cells.iter().enumerate() {
        let actor = if i % 2 == 0 { alice() } else { bob() };
        snapshot = arbiter
            .apply(&snapshot.id, &Intent::play(actor, cell), snapshot.revision)
            .await
            .unwrap();
    }
    snapshot
}

async fn raw(store: &MemoryStore, id: &GameId) -> (Revision, Vec<u8>) {
    let doc = store.get(Collection::Games, id.as_str()).await.unwrap();
    (doc.revision, doc.data)
}

// =========================================================================
// create / current
// =========================================================================

#[tokio::test]
async fn test_create_stores_invite_at_initial_revision() {
    let (_, arbiter) = setup();

    let invite = arbiter
        .create(Game::challenge(alice(), bob()).unwrap())
        .await
        .unwrap();

    assert_eq!(invite.revision, Revision::INITIAL);
    assert_eq!(invite.record.state, GameState::Invite);
    assert_eq!(arbiter.current(&invite.id).await.unwrap(), invite);
}

#[tokio::test]
async fn test_current_unknown_game_returns_not_found() {
    let (_, arbiter) = setup();

    let result = arbiter.current(&GameId::from("nope")).await;

    assert!(matches!(result, Err(ArbiterError::NotFound(_))));
}

#[tokio::test]
async fn test_current_undecodable_record_is_corrupt() {
    let (store, arbiter) = setup();
    let (id, _) = store
        .insert(Collection::Games, br#"{"gameBoard":[]}"#.to_vec())
        .await
        .unwrap();

    let result = arbiter.current(&GameId::from(id)).await;

    assert!(matches!(result, Err(ArbiterError::Corrupt { .. })));
}

#[tokio::test]
async fn test_apply_refuses_inconsistent_record() {
    let (store, arbiter) = setup();
    // Decodes fine, but claims player 2 to move on an empty board.
    let mut game = Game::challenge(alice(), bob()).unwrap();
    game.state = GameState::Player2Turn;
    let data = serde_json::to_vec(&game).unwrap();
    let (id, rev) = store.insert(Collection::Games, data).await.unwrap();
    let id = GameId::from(id);

    let result = arbiter.apply(&id, &Intent::play(bob(), 0), rev).await;

    assert!(matches!(result, Err(ArbiterError::Corrupt { .. })));
    assert_eq!(raw(&store, &id).await.0, rev);
}

// =========================================================================
// apply
// =========================================================================

#[tokio::test]
async fn test_apply_accept_moves_to_player1_turn_and_bumps_revision() {
    let (_, arbiter) = setup();

    let game = started(&arbiter).await;

    assert_eq!(game.record.state, GameState::Player1Turn);
    assert_eq!(game.revision, Revision(2));
}

#[tokio::test]
async fn test_apply_diagonal_scenario_player1_wins() {
    let (_, arbiter) = setup();
    let game = started(&arbiter).await;

    // alice 0, bob 1, alice 4, bob 2, alice 8
    let game = play(&arbiter, game, &[0, 1, 4, 2, 8]).await;

    assert_eq!(evaluate(&game.record.board), Outcome::WinnerA);
    assert_eq!(game.record.state, GameState::Player1Won);
    assert_eq!(game.revision, Revision(7));
    assert_eq!(arbiter.current(&game.id).await.unwrap(), game);
}

#[tokio::test]
async fn test_apply_full_board_scenario_is_draw() {
    let (_, arbiter) = setup();
    let game = started(&arbiter).await;

    let game = play(&arbiter, game, &[0, 1, 2, 4, 3, 5, 7, 6, 8]).await;

    use Cell::{A, B};
    assert_eq!(game.record.board.cells(), &[A, B, A, A, B, B, B, A, A]);
    assert_eq!(game.record.state, GameState::Draw);
}

#[tokio::test]
async fn test_apply_out_of_turn_leaves_stored_bytes_unchanged() {
    let (store, arbiter) = setup();
    let game = started(&arbiter).await;
    let before = raw(&store, &game.id).await;

    let result = arbiter
        .apply(&game.id, &Intent::play(bob(), 0), game.revision)
        .await;

    assert!(matches!(
        result,
        Err(ArbiterError::Rule(RuleError::NotYourTurn(p))) if p == bob()
    ));
    assert_eq!(raw(&store, &game.id).await, before);
}

#[tokio::test]
async fn test_apply_occupied_cell_is_illegal_for_both_players() {
    let (store, arbiter) = setup();
    let game = play(&arbiter, started(&arbiter).await, &[4]).await;
    let before = raw(&store, &game.id).await;

    for actor in [alice(), bob()] {
        let result = arbiter
            .apply(&game.id, &Intent::play(actor, 4), game.revision)
            .await;
        assert!(matches!(
            result,
            Err(ArbiterError::Rule(RuleError::IllegalMove(_)))
        ));
    }
    assert_eq!(raw(&store, &game.id).await, before);
}

#[tokio::test]
async fn test_apply_after_win_returns_game_over_and_keeps_revision() {
    let (store, arbiter) = setup();
    let game = play(&arbiter, started(&arbiter).await, &[0, 1, 4, 2, 8]).await;

    for actor in [alice(), bob()] {
        let result = arbiter
            .apply(&game.id, &Intent::play(actor, 5), game.revision)
            .await;
        assert!(matches!(
            result,
            Err(ArbiterError::Rule(RuleError::GameOver(GameState::Player1Won)))
        ));
    }
    assert_eq!(raw(&store, &game.id).await.0, game.revision);
}

#[tokio::test]
async fn test_apply_stale_revision_returns_conflict_without_validating() {
    let (store, arbiter) = setup();
    let game = started(&arbiter).await;
    let stale = game.revision;
    let game = play(&arbiter, game, &[0]).await;

    // Bob's move would be legal against the fresh snapshot, but he
    // computed it from the old one.
    let result = arbiter.apply(&game.id, &Intent::play(bob(), 1), stale).await;

    match result {
        Err(ArbiterError::Conflict {
            expected, actual, ..
        }) => {
            assert_eq!(expected, stale);
            assert_eq!(actual, game.revision);
        }
        other => panic!("expected conflict, got {other:?}"),
    }
    assert_eq!(raw(&store, &game.id).await.0, game.revision);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_apply_concurrent_moves_from_same_revision_exactly_one_commits() {
    let (store, arbiter) = setup();
    let game = started(&arbiter).await;

    // A double-tap: the same player sends moves to different cells, all
    // computed from the same snapshot.
    let mut tasks = Vec::new();
    for cell in 0..9 {
        let arbiter = arbiter.clone();
        let id = game.id.clone();
        let rev = game.revision;
        tasks.push(tokio::spawn(async move {
            arbiter.apply(&id, &Intent::play(alice(), cell), rev).await
        }));
    }

    let mut committed = Vec::new();
    let mut conflicts = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(snapshot) => committed.push(snapshot),
            Err(ArbiterError::Conflict { .. }) => conflicts += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(committed.len(), 1);
    assert_eq!(conflicts, 8);
    let winner = &committed[0];
    assert_eq!(winner.revision, game.revision.next());
    assert_eq!(winner.record.board.count(crossmark_board::Mark::A), 1);
    assert_eq!(raw(&store, &game.id).await.0, winner.revision);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_apply_racing_accepts_commit_once() {
    let (_, arbiter) = setup();
    let invite = arbiter
        .create(Game::challenge(alice(), bob()).unwrap())
        .await
        .unwrap();

    let a = {
        let arbiter = arbiter.clone();
        let id = invite.id.clone();
        tokio::spawn(async move { arbiter.apply(&id, &Intent::accept(bob()), Revision::INITIAL).await })
    };
    let b = {
        let arbiter = arbiter.clone();
        let id = invite.id.clone();
        tokio::spawn(async move { arbiter.apply(&id, &Intent::accept(bob()), Revision::INITIAL).await })
    };

    let results = [a.await.unwrap(), b.await.unwrap()];
    let ok = results.iter().filter(|r| r.is_ok()).count();
    let conflict = results
        .iter()
        .filter(|r| matches!(r, Err(ArbiterError::Conflict { .. })))
        .count();
    assert_eq!((ok, conflict), (1, 1));
}

#[tokio::test]
async fn test_apply_unknown_game_returns_not_found() {
    let (_, arbiter) = setup();

    let result = arbiter
        .apply(&GameId::from("ghost"), &Intent::accept(bob()), Revision::INITIAL)
        .await;

    assert!(matches!(result, Err(ArbiterError::NotFound(_))));
}

#[tokio::test]
async fn test_apply_while_store_offline_returns_unavailable() {
    let (store, arbiter) = setup();
    let game = started(&arbiter).await;

    store.set_available(false);
    let result = arbiter
        .apply(&game.id, &Intent::play(alice(), 0), game.revision)
        .await;
    store.set_available(true);

    assert!(matches!(
        result,
        Err(ArbiterError::Store(StoreError::Unavailable(_)))
    ));
    assert_eq!(arbiter.current(&game.id).await.unwrap(), game);
}

#[tokio::test]
async fn test_apply_ready_gate_blocks_moves_until_both_ready() {
    let store = MemoryStore::new();
    let arbiter = Arbiter::new(store, Rules { require_ready: true });
    let game = started(&arbiter).await;

    let blocked = arbiter
        .apply(&game.id, &Intent::play(alice(), 0), game.revision)
        .await;
    assert!(matches!(
        blocked,
        Err(ArbiterError::Rule(RuleError::NotReady))
    ));

    let game = arbiter
        .apply(&game.id, &Intent::ready(alice()), game.revision)
        .await
        .unwrap();
    let game = arbiter
        .apply(&game.id, &Intent::ready(bob()), game.revision)
        .await
        .unwrap();
    let game = arbiter
        .apply(&game.id, &Intent::play(alice(), 0), game.revision)
        .await
        .unwrap();

    assert_eq!(game.record.state, GameState::Player2Turn);
    assert!(game.record.both_ready());
}
