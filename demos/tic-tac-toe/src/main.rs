//! Two hosts, one store: a scripted game of tic-tac-toe.
//!
//! Each host only ever looks at its own cache and submits moves when the
//! cache says it is its turn, the way two phones sharing a database would.
//! Run with `RUST_LOG=debug` to see every transition the arbiter commits.

use crossmark::prelude::*;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

// ---------------------------------------------------------------------------
// A scripted player
// ---------------------------------------------------------------------------

/// Cells to try, in order of preference. Falls back to the first free cell
/// once the preferences run out.
fn script(preferred: &[usize]) -> Vec<usize> {
    preferred.iter().copied().chain(0..crossmark::board::CELLS).collect()
}

/// Plays `game_id` as the host's player until the game ends.
async fn play(host: Coordinator<MemoryStore>, game_id: GameId, script: Vec<usize>) -> Result<GameSnapshot, BoxError> {
    let mut games = host.games();
    loop {
        let current = games.borrow_and_update().get(&game_id).cloned();
        if let Some(game) = current {
            if game.record.state.is_terminal() {
                return Ok(game);
            }
            let my_turn = game.record.state.turn().map(|seat| game.record.player(seat)) == Some(host.player_id());
            if my_turn {
                let board = &game.record.board;
                let cell = script
                    .iter()
                    .copied()
                    .find(|&c| board.get(c) == Some(Cell::Empty))
                    .ok_or("no free cell on an undecided board")?;
                match host.submit_move(&game_id, cell).await {
                    Ok(_) => {}
                    // Cache was behind; it has been refreshed, look again.
                    Err(e) if e.kind() == ErrorKind::Conflict => continue,
                    Err(e) => return Err(e.into()),
                }
                continue;
            }
        }
        games.changed().await?;
    }
}

fn name_of(host: &Coordinator<MemoryStore>, id: &PlayerId) -> String {
    host.player(id)
        .map(|p| p.record.name)
        .unwrap_or_else(|| id.to_string())
}

/// Runs one full game on `store` and returns the final snapshot.
async fn run(store: MemoryStore, ada_script: &[usize], bob_script: &[usize]) -> Result<GameSnapshot, BoxError> {
    let ada = Coordinator::builder().register(store.clone(), "Ada").await?;
    let bob = Coordinator::builder().register(store, "Bob").await?;

    let invite = ada.submit_challenge(bob.player_id()).await?;
    tracing::info!(game_id = %invite.id, "challenge sent");

    bob.games().wait_for(|games| games.contains_key(&invite.id)).await?;
    bob.submit_accept(&invite.id).await?;

    let a = tokio::spawn(play(ada, invite.id.clone(), script(ada_script)));
    let b = tokio::spawn(play(bob, invite.id.clone(), script(bob_script)));
    let (a, b) = (a.await??, b.await??);

    // Both hosts end on the same committed snapshot.
    if a != b {
        return Err(format!("hosts diverged at {} and {}", a.revision, b.revision).into());
    }
    Ok(a)
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    crossmark::logging::init();

    let store = MemoryStore::new();
    let game = run(store.clone(), &[4, 0, 8], &[1, 2]).await?;
    let ada_view = Coordinator::builder().start(store, game.record.player1_id.clone()).await?;

    println!("{}", game.record.board);
    println!(
        "{} vs {}: {} at {}",
        name_of(&ada_view, &game.record.player1_id),
        name_of(&ada_view, &game.record.player2_id),
        game.record.state,
        game.revision
    );
    Ok(())
}
