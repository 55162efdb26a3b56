use std::sync::Arc;

use anyhow::Result;
use rand::{rngs::StdRng, SeedableRng};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wordshift::{
    Config, Dictionary, GameSession, GameState, GameStatus, Player, TurnEngine, WordList,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wordshift=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting wordshift...");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded");

    // Load dictionary
    let dictionary: Arc<dyn Dictionary> = match WordList::load(&config.dictionary_path).await {
        Ok(dict) => {
            tracing::info!("Dictionary loaded successfully");
            Arc::new(dict)
        }
        Err(e) => {
            tracing::warn!("Failed to load dictionary: {:#}. Using empty dictionary.", e);
            tracing::warn!(
                "Download a word list to {} for full functionality",
                config.dictionary_path
            );
            Arc::new(WordList::empty())
        }
    };

    let rng = match config.rng_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let engine = TurnEngine::with_rng(config.game.clone(), config.bot.clone(), dictionary, rng);
    let session = GameSession::new(engine);
    session.with_engine(|engine| engine.start_game()).await?;

    println!("Change the word by adding, removing or rearranging letters.");
    println!("Commands: /pass, /state, /quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let state = session.state().await;
        if state.game_status == GameStatus::Finished {
            let ranking = session.with_engine(|engine| engine.final_scores()).await;
            print_final_scores(&state, &ranking);
            break;
        }
        let Some(player) = state.current_player().cloned() else {
            break;
        };

        if player.is_bot {
            match session.make_bot_move().await {
                Some(bot_move) => println!(
                    "{} plays {} for {} points",
                    player.name, bot_move.word, bot_move.breakdown.total_score
                ),
                None => println!("{} passes", player.name),
            }
            continue;
        }

        print_turn(&state, &player);

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match line.trim() {
            "" => {}
            "/quit" => break,
            "/state" => println!("{}", serde_json::to_string_pretty(&state)?),
            "/pass" => {
                if let Err(e) = session.with_engine(|engine| engine.pass_turn()).await {
                    println!("Cannot pass: {}", e);
                }
            }
            word => {
                let word = word.to_string();
                let player_id = player.id.clone();
                let result = session
                    .with_engine(move |engine| engine.submit_move(&player_id, &word))
                    .await;
                match result {
                    Ok(record) => println!(
                        "{} -> {}: +{} (add {}, remove {}, rearrange {}, key {})",
                        record.previous_word,
                        record.new_word,
                        record.score,
                        record.breakdown.add_points,
                        record.breakdown.remove_points,
                        record.breakdown.rearrange_points,
                        record.breakdown.key_letter_points
                    ),
                    Err(e) => println!("Rejected [{}]: {}", e.code(), e),
                }
            }
        }
    }

    Ok(())
}

fn print_turn(state: &GameState, player: &Player) {
    let letters = |set: &[char]| -> String {
        if set.is_empty() {
            "-".to_string()
        } else {
            set.iter().collect()
        }
    };

    println!();
    println!(
        "Turn {}/{}  word: {}  key: {}  locked: {}",
        state.current_turn,
        state.max_turns,
        state.current_word,
        letters(&state.key_letters),
        letters(&state.locked_key_letters)
    );
    for p in &state.players {
        println!("  {:<12} {}", p.name, p.score);
    }
    println!("{}> ", player.name);
}

fn print_final_scores(state: &GameState, ranking: &[Player]) {
    println!();
    println!("Game over after {} turns", state.turn_history.len());
    for p in ranking {
        println!("  {:<12} {}", p.name, p.score);
    }
    match state.winner.as_deref().and_then(|id| state.player(id)) {
        Some(winner) => println!("{} wins!", winner.name),
        None => println!("It's a tie."),
    }
}
