use chess_game::{Game, GameConfig, MoveOutcome, PieceType, Recommendation};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const MAX_PLIES: usize = 300;

/// Stand-in for the recommendation service: any legal move, random score.
fn recommend(game: &Game, rng: &mut StdRng) -> Option<String> {
    let moves = game.board().legal_moves_for(game.side_to_move());
    let mv = moves.choose(rng)?;
    // Leave the promotion kind out now and then to drive the two-step flow.
    let promotion = match mv.promotion {
        Some(_) if rng.gen_bool(0.5) => None,
        other => other,
    };
    let json = serde_json::json!({
        "recommendedMove": { "from": mv.from, "to": mv.to, "promotion": promotion },
        "evaluationScore": rng.gen_range(-3.0..3.0),
    });
    Some(json.to_string())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let seed: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(1);
    let config = match args.next() {
        Some(path) => match GameConfig::load(&path) {
            Ok(c) => c,
            Err(e) => {
                error!(%path, error = %e, "could not load config");
                std::process::exit(2);
            }
        },
        None => GameConfig::default(),
    };

    let mut game = match Game::with_config(&config) {
        Ok(g) => g,
        Err(e) => {
            error!(error = %e, "could not start game");
            std::process::exit(2);
        }
    };
    game.subscribe(|snapshot| {
        if snapshot.check.in_check {
            info!(ply = snapshot.ticket.ply, fen = %snapshot.board, "check");
        }
    });

    let mut rng = StdRng::seed_from_u64(seed);
    while !game.is_game_over() && game.history_length() < MAX_PLIES {
        let request = game.oracle_request();
        let Some(response) = recommend(&game, &mut rng) else {
            break;
        };
        let outcome = Recommendation::from_json(&response)
            .and_then(|rec| game.apply_recommendation(request.ticket, &rec));
        match outcome {
            Ok(MoveOutcome::Applied(_)) => {}
            Ok(MoveOutcome::PendingPromotion(p)) => {
                info!(from = %p.from, to = %p.to, "promoting to queen");
                if let Err(e) = game.choose_promotion(PieceType::Queen) {
                    error!(error = %e, "promotion failed");
                    break;
                }
            }
            Err(e) => {
                error!(error = %e, "oracle move rejected");
                break;
            }
        }
    }

    info!(
        plies = game.history_length(),
        status = %game.status(),
        fen = %game.position_as_notation(),
        captured_white = game.captured(chess_game::Color::White).len(),
        captured_black = game.captured(chess_game::Color::Black).len(),
        "selfplay finished"
    );
}
