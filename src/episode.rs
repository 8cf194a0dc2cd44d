//! Drives one episode of the game through its turn state machine.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::action::PlayerId;
use crate::bot::{Bot, Transition};
use crate::error::GameError;
use crate::game::Game;
use crate::ml::{AgentConfig, Algorithm, Trainer, TrainerConfig};
use crate::state::{PlayerSummary, TurnPhase};
use crate::visualize::{describe_action, describe_state};

/// Result of a finished episode.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeOutcome {
    pub players: Vec<PlayerSummary>,
    pub winner: PlayerId,
    pub draws: usize,
}

impl EpisodeOutcome {
    pub fn winner_name(&self) -> &str {
        &self.players[self.winner].name
    }

    pub fn scores(&self) -> Vec<i64> {
        self.players.iter().map(|player| player.score).collect()
    }
}

/// Plays `game` to the end with one bot per seat.
///
/// Each decision is reported to its bot before the game applies it, and
/// every bot is told when the episode is over. If the episode fails midway
/// every bot is told to abort instead.
pub fn run_episode(game: &mut Game, bots: &mut [&mut dyn Bot]) -> Result<EpisodeOutcome, GameError> {
    if bots.len() != game.num_players() {
        return Err(GameError::InvalidConfiguration(
            "exactly one bot per seat is required",
        ));
    }
    if let Err(err) = play_to_end(game, bots) {
        warn!("episode aborted after {} draw(s): {err}", game.draws());
        for bot in bots.iter_mut() {
            bot.abort_episode();
        }
        return Err(err);
    }
    let players = game.summaries();
    for player in &players {
        debug!("{} has a final score of {}", player.name, player.score);
    }
    let winner = game.winner().ok_or(GameError::GameOver)?;
    Ok(EpisodeOutcome {
        players,
        winner,
        draws: game.draws(),
    })
}

fn play_to_end(game: &mut Game, bots: &mut [&mut dyn Bot]) -> Result<(), GameError> {
    loop {
        match game.phase() {
            TurnPhase::AwaitingDraw(_) => {
                game.draw()?;
            }
            TurnPhase::AwaitingDecision(seat) => {
                let state = game.state_view(seat)?;
                let mask = game.action_mask(seat)?;
                let bot = &mut bots[seat];
                let action = bot.select_action(&state, mask)?;
                let transition = if game.ends_episode(action) {
                    Transition::Terminal
                } else {
                    Transition::Continue
                };
                debug!(
                    "{}: {} -> {}",
                    game.player_name(seat)?,
                    describe_state(&state),
                    describe_action(&state, action)
                );
                bot.observe(&state, action, transition)?;
                game.apply_action(seat, action)?;
            }
            TurnPhase::Terminal => break,
        }
    }
    for bot in bots.iter_mut() {
        bot.finish_episode()?;
    }
    Ok(())
}

/// Plays a single episode with a freshly initialised learner in seat 0
/// against two random opponents.
pub fn play_episode(
    names: [&str; 3],
    algorithm: Algorithm,
    config: AgentConfig,
    seed: u64,
) -> Result<EpisodeOutcome, GameError> {
    let trainer_config = TrainerConfig::new(names, algorithm, config).with_seed(seed);
    let mut trainer = Trainer::new(trainer_config, None)?;
    let outcome = trainer.run_episode()?;
    info!("{} has won", outcome.winner_name());
    Ok(outcome)
}
