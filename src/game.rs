use std::collections::BTreeSet;

use log::debug;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::action::{Action, ActionMask, PlayerId};
use crate::card::{Card, full_deck};
use crate::error::GameError;
use crate::score::final_score;
use crate::state::{GameSettings, PlayerSummary, Pool, State, TurnPhase};

const DEFAULT_SEED: u64 = 0x5EED_5EED_5EED_5EED;

/// Builder that enables deterministic deck injection for testing and RL experiments.
pub struct GameBuilder {
    names: Vec<String>,
    settings: GameSettings,
    seed: u64,
    deck: Option<Vec<Card>>,
}

impl GameBuilder {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let settings = GameSettings {
            num_players: names.len(),
            ..GameSettings::default()
        };
        Self {
            names,
            settings,
            seed: DEFAULT_SEED,
            deck: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Replaces the card universe, deck size and starting chips. The player
    /// count always follows the supplied names.
    pub fn with_settings(mut self, settings: GameSettings) -> Self {
        self.settings = GameSettings {
            num_players: self.names.len(),
            ..settings
        };
        self
    }

    /// Uses `deck` as-is; the last element is the top card.
    pub fn with_deck(mut self, deck: Vec<Card>) -> Self {
        self.deck = Some(deck);
        self
    }

    pub fn build(self) -> Result<Game, GameError> {
        Game::from_builder(self)
    }
}

#[derive(Clone, Debug)]
struct PlayerState {
    name: String,
    hand: BTreeSet<Card>,
    chips: u32,
}

/// One episode of the card game, driven as an explicit turn state machine.
pub struct Game {
    players: Vec<PlayerState>,
    deck: Vec<Card>,
    pool: Pool,
    phase: TurnPhase,
    draws: usize,
}

impl Game {
    pub fn builder<I, S>(names: I) -> GameBuilder
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        GameBuilder::new(names)
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    pub fn pool(&self) -> Pool {
        self.pool
    }

    pub fn deck_len(&self) -> usize {
        self.deck.len()
    }

    /// Number of cards drawn so far.
    pub fn draws(&self) -> usize {
        self.draws
    }

    pub fn num_players(&self) -> usize {
        self.players.len()
    }

    pub fn player_name(&self, player: PlayerId) -> Result<&str, GameError> {
        self.players
            .get(player)
            .map(|p| p.name.as_str())
            .ok_or(GameError::InvalidPlayer(player))
    }

    pub fn chips(&self, player: PlayerId) -> Result<u32, GameError> {
        self.players
            .get(player)
            .map(|p| p.chips)
            .ok_or(GameError::InvalidPlayer(player))
    }

    pub fn hand(&self, player: PlayerId) -> Result<&BTreeSet<Card>, GameError> {
        self.players
            .get(player)
            .map(|p| &p.hand)
            .ok_or(GameError::InvalidPlayer(player))
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase, TurnPhase::Terminal)
    }

    /// Moves the top card of the deck into the pool.
    pub fn draw(&mut self) -> Result<Card, GameError> {
        let seat = match self.phase {
            TurnPhase::AwaitingDraw(seat) => seat,
            TurnPhase::AwaitingDecision(_) => return Err(GameError::NotPlayersTurn),
            TurnPhase::Terminal => return Err(GameError::GameOver),
        };
        let card = self.deck.pop().ok_or(GameError::DeckExhausted)?;
        self.draws += 1;
        self.pool.open_card = Some(card);
        self.phase = TurnPhase::AwaitingDecision(seat);
        debug!("{} draws the number {card}", self.players[seat].name);
        Ok(card)
    }

    /// State as seen by `player` while it holds the decision.
    pub fn state_view(&self, player: PlayerId) -> Result<State, GameError> {
        let seat = self.deciding_seat(player)?;
        let open_card = self.pool.open_card.ok_or(GameError::NoOpenCard)?;
        let player_state = &self.players[seat];
        Ok(State {
            open_card,
            open_chips: self.pool.chips,
            player_chips: player_state.chips,
            hand: player_state.hand.clone(),
        })
    }

    pub fn action_mask(&self, player: PlayerId) -> Result<ActionMask, GameError> {
        let seat = self.deciding_seat(player)?;
        Ok(ActionMask::for_chips(self.players[seat].chips))
    }

    /// Whether `action` by the deciding seat would end the episode.
    pub fn ends_episode(&self, action: Action) -> bool {
        matches!(self.phase, TurnPhase::AwaitingDecision(_))
            && action == Action::Take
            && self.deck.is_empty()
    }

    pub fn apply_action(&mut self, player: PlayerId, action: Action) -> Result<(), GameError> {
        let seat = self.deciding_seat(player)?;
        if !ActionMask::for_chips(self.players[seat].chips).allows(action) {
            return Err(GameError::IllegalAction(action));
        }
        let card = self.pool.open_card.ok_or(GameError::NoOpenCard)?;
        match action {
            Action::Take => {
                let chips = std::mem::take(&mut self.pool.chips);
                let player_state = &mut self.players[seat];
                player_state.hand.insert(card);
                player_state.chips += chips;
                self.pool.open_card = None;
                debug!("{} takes the {card} and {chips} chip(s)", player_state.name);
                self.phase = if self.deck.is_empty() {
                    TurnPhase::Terminal
                } else {
                    TurnPhase::AwaitingDraw(seat)
                };
            }
            Action::Pass => {
                let player_state = &mut self.players[seat];
                player_state.chips -= 1;
                self.pool.chips += 1;
                debug!("{} passes the {card} and loses a chip", player_state.name);
                // the open card stays in the pool, so the next seat decides without drawing
                self.phase = TurnPhase::AwaitingDecision((seat + 1) % self.players.len());
            }
        }
        Ok(())
    }

    /// Score of every seat: card points minus chips.
    pub fn summaries(&self) -> Vec<PlayerSummary> {
        self.players
            .iter()
            .enumerate()
            .map(|(id, player)| PlayerSummary {
                id,
                name: player.name.clone(),
                hand: player.hand.clone(),
                chips: player.chips,
                score: final_score(&player.hand, player.chips),
            })
            .collect()
    }

    /// Lowest final score wins; ties go to the earliest seat.
    pub fn winner(&self) -> Option<PlayerId> {
        if !self.is_finished() {
            return None;
        }
        self.summaries()
            .iter()
            .min_by_key(|summary| (summary.score, summary.id))
            .map(|summary| summary.id)
    }

    fn deciding_seat(&self, player: PlayerId) -> Result<PlayerId, GameError> {
        if player >= self.players.len() {
            return Err(GameError::InvalidPlayer(player));
        }
        match self.phase {
            TurnPhase::AwaitingDecision(seat) if seat == player => Ok(seat),
            TurnPhase::Terminal => Err(GameError::GameOver),
            _ => Err(GameError::NotPlayersTurn),
        }
    }

    fn from_builder(builder: GameBuilder) -> Result<Self, GameError> {
        let GameBuilder {
            names,
            settings,
            seed,
            deck,
        } = builder;
        settings.validate()?;
        let deck = match deck {
            Some(deck) => {
                validate_deck(&settings, &deck)?;
                deck
            }
            None => {
                let mut rng = StdRng::seed_from_u64(seed);
                let mut deck = full_deck(&settings);
                deck.shuffle(&mut rng);
                deck.truncate(settings.deck_size);
                debug!("the deck has been shuffled");
                deck
            }
        };
        let players = names
            .into_iter()
            .map(|name| PlayerState {
                name,
                hand: BTreeSet::new(),
                chips: settings.starting_chips,
            })
            .collect();
        Ok(Game {
            players,
            deck,
            pool: Pool::default(),
            phase: TurnPhase::AwaitingDraw(0),
            draws: 0,
        })
    }
}

fn validate_deck(settings: &GameSettings, deck: &[Card]) -> Result<(), GameError> {
    if deck.len() != settings.deck_size {
        return Err(GameError::InvalidConfiguration(
            "injected deck does not match the configured deck size",
        ));
    }
    if !deck.iter().all(|&card| settings.in_universe(card)) {
        return Err(GameError::InvalidConfiguration(
            "injected deck holds a card outside the universe",
        ));
    }
    let distinct: BTreeSet<Card> = deck.iter().copied().collect();
    if distinct.len() != deck.len() {
        return Err(GameError::InvalidConfiguration(
            "injected deck holds duplicate cards",
        ));
    }
    Ok(())
}
