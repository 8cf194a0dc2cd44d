use rand::SeedableRng;
use rand::rngs::StdRng;

use nothanksbot::ml::{TableEntry, UpdateKind};
use nothanksbot::{
    Action, ActionMask, AgentConfig, Algorithm, BincodeFileStore, Bot, Card, GameBuilder,
    GameError, GameSettings, MemoryStore, MonteCarloAgent, OpponentPolicy, QLearningAgent, State,
    StateActionSpace, StoreError, TableSnapshot, TableStore, Trainer, TrainerConfig, Transition,
    play_episode, run_episode,
};

const NAMES: [&str; 3] = ["Alice", "Bob", "Claire"];

fn small_settings() -> GameSettings {
    GameSettings {
        num_players: 3,
        min_card: 3,
        max_card: 11,
        deck_size: 9,
        starting_chips: 3,
    }
}

fn trainer_config(algorithm: Algorithm) -> TrainerConfig {
    let agent = AgentConfig::new(0.2, 0.1).expect("config");
    TrainerConfig::new(NAMES, algorithm, agent)
        .with_settings(small_settings())
        .with_seed(99)
}

#[test]
fn tables_accumulate_across_episodes() -> Result<(), GameError> {
    for algorithm in [Algorithm::MonteCarlo, Algorithm::QLearning] {
        let mut trainer = Trainer::new(trainer_config(algorithm), None)?;
        trainer.train(5)?;
        let early_visits = trainer.learner().visits().total();
        let early_entries = trainer.learner().table().len();
        assert!(early_visits > 0, "{algorithm}");
        assert!(early_entries > 0, "{algorithm}");

        trainer.train(50)?;
        assert!(trainer.learner().visits().total() > early_visits, "{algorithm}");
        assert!(trainer.learner().table().len() >= early_entries, "{algorithm}");
        assert_eq!(trainer.episodes(), 55);
    }
    Ok(())
}

#[test]
fn report_counts_every_episode() -> Result<(), GameError> {
    let mut trainer = Trainer::new(trainer_config(Algorithm::QLearning), None)?;
    let report = trainer.train(40)?;
    assert_eq!(report.episodes, 40);
    assert_eq!(report.wins.iter().sum::<usize>(), 40);
    assert!((0.0..=1.0).contains(&report.learner_win_rate()));
    Ok(())
}

#[test]
fn training_is_reproducible_for_a_seed() -> Result<(), GameError> {
    let mut first = Trainer::new(trainer_config(Algorithm::MonteCarlo), None)?;
    let mut second = Trainer::new(trainer_config(Algorithm::MonteCarlo), None)?;
    assert_eq!(first.train(30)?, second.train(30)?);
    assert_eq!(first.snapshot(), second.snapshot());
    Ok(())
}

#[test]
fn learner_can_sit_in_any_seat() -> Result<(), GameError> {
    let config = trainer_config(Algorithm::QLearning).with_learner_seat(2);
    let mut trainer = Trainer::new(config, None)?;
    let report = trainer.train(10)?;
    assert_eq!(report.learner_seat, 2);
    assert!(trainer.learner().visits().total() > 0);

    let bad = trainer_config(Algorithm::QLearning).with_learner_seat(3);
    assert!(matches!(
        Trainer::new(bad, None),
        Err(GameError::InvalidPlayer(3))
    ));
    Ok(())
}

#[test]
fn invalid_agent_config_is_rejected_before_any_episode() {
    let agent = AgentConfig {
        exploration_rate: 1.5,
        learning_rate: 0.1,
        resume: false,
    };
    let config = TrainerConfig::new(NAMES, Algorithm::MonteCarlo, agent);
    assert!(matches!(
        Trainer::new(config, None),
        Err(GameError::InvalidConfiguration(_))
    ));
}

#[test]
fn resume_restores_the_saved_table() -> Result<(), GameError> {
    let mut trainer = Trainer::new(
        trainer_config(Algorithm::QLearning),
        Some(Box::new(MemoryStore::new())),
    )?;
    trainer.train(20)?;
    let saved = trainer.snapshot();
    assert!(!saved.is_empty());

    let mut config = trainer_config(Algorithm::QLearning);
    config.agent = config.agent.resuming();
    let resumed = Trainer::new(config, Some(Box::new(MemoryStore::with_snapshot(saved.clone()))))?;
    assert_eq!(resumed.snapshot(), saved);
    Ok(())
}

#[test]
fn resume_needs_a_matching_stored_table() {
    let mut config = trainer_config(Algorithm::MonteCarlo);
    config.agent = config.agent.resuming();

    assert!(matches!(
        Trainer::new(config.clone(), None),
        Err(GameError::InvalidConfiguration(_))
    ));
    assert!(matches!(
        Trainer::new(config.clone(), Some(Box::new(MemoryStore::new()))),
        Err(GameError::Store(StoreError::Missing))
    ));

    let foreign = TableSnapshot {
        algorithm: Algorithm::QLearning,
        entries: Vec::new(),
    };
    assert!(matches!(
        Trainer::new(config, Some(Box::new(MemoryStore::with_snapshot(foreign)))),
        Err(GameError::Store(StoreError::AlgorithmMismatch { .. }))
    ));
}

#[test]
fn file_store_survives_a_training_restart() -> Result<(), GameError> {
    let path = std::env::temp_dir().join(format!("nothanksbot-ml-{}.bin", std::process::id()));
    let mut trainer = Trainer::new(
        trainer_config(Algorithm::MonteCarlo),
        Some(Box::new(BincodeFileStore::new(&path))),
    )?;
    trainer.train(10)?;
    trainer.save()?;

    let mut store = BincodeFileStore::new(&path);
    let loaded = store.load()?.expect("saved table");
    assert_eq!(loaded, trainer.snapshot());
    std::fs::remove_file(&path).map_err(StoreError::from)?;
    Ok(())
}

#[test]
fn restoring_states_outside_the_domain_fails() {
    let foreign = TableSnapshot {
        algorithm: Algorithm::QLearning,
        entries: vec![TableEntry {
            state: nothanksbot::State::new(30, 0, 0, []),
            action: Action::Take,
            value: 1.0,
            visits: 1,
        }],
    };
    let mut config = trainer_config(Algorithm::QLearning);
    config.agent = config.agent.resuming();
    assert!(matches!(
        Trainer::new(config, Some(Box::new(MemoryStore::with_snapshot(foreign)))),
        Err(GameError::InvalidState(_))
    ));
}

#[test]
fn play_episode_reports_every_seat() -> Result<(), GameError> {
    let config = AgentConfig::new(0.1, 0.1)?;
    for algorithm in [Algorithm::MonteCarlo, Algorithm::QLearning] {
        let outcome = play_episode(NAMES, algorithm, config, 7)?;
        assert_eq!(outcome.players.len(), 3);
        assert_eq!(outcome.draws, 24);
        let names: Vec<&str> = outcome.players.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, NAMES);
        assert!(NAMES.contains(&outcome.winner_name()));
        let cards: usize = outcome.players.iter().map(|p| p.hand.len()).sum();
        assert_eq!(cards, 24);
        let chips: u32 = outcome.players.iter().map(|p| p.chips).sum();
        assert_eq!(chips, 33);
    }
    Ok(())
}

#[test]
fn q_learner_settles_its_last_pair_every_episode() -> Result<(), GameError> {
    let space = StateActionSpace::new(small_settings())?;
    let config = AgentConfig::new(0.3, 0.5)?;
    let mut agent = QLearningAgent::new(space, config, StdRng::seed_from_u64(4))?;
    let mut opponents = [
        nothanksbot::RandomBot::new(StdRng::seed_from_u64(5)),
        nothanksbot::RandomBot::new(StdRng::seed_from_u64(6)),
    ];
    for seed in 0..5 {
        let mut game = GameBuilder::new(NAMES)
            .with_settings(small_settings())
            .with_seed(seed)
            .build()?;
        let [b, c] = &mut opponents;
        let mut seats: [&mut dyn Bot; 3] = [&mut agent, b, c];
        run_episode(&mut game, &mut seats)?;
        assert!(agent.previous().is_none());
    }
    // a fresh episode starts without bootstrapping from the last one
    let state = nothanksbot::State::new(5, 0, 3, []);
    assert_eq!(
        agent.reinforce(&state, Action::Pass, Transition::Continue)?,
        UpdateKind::NoPrevious
    );
    Ok(())
}

#[test]
fn threshold_opponents_can_fill_every_other_seat() -> Result<(), GameError> {
    let lineup = [
        OpponentPolicy::Threshold { chip_value: 5 },
        OpponentPolicy::Threshold { chip_value: 6 },
    ];
    let config = || trainer_config(Algorithm::MonteCarlo).with_opponents(lineup);
    let mut first = Trainer::new(config(), None)?;
    let mut second = Trainer::new(config(), None)?;
    assert_eq!(first.config().opponents, lineup);
    let report = first.train(25)?;
    assert_eq!(report.wins.iter().sum::<usize>(), 25);
    assert_eq!(report, second.train(25)?);

    let mixed = trainer_config(Algorithm::QLearning)
        .with_opponents([OpponentPolicy::Random, OpponentPolicy::Threshold { chip_value: 4 }]);
    assert_eq!(Trainer::new(mixed, None)?.train(10)?.episodes, 10);
    Ok(())
}

#[test]
fn opponent_lineup_must_cover_every_other_seat() {
    let short = trainer_config(Algorithm::MonteCarlo).with_opponents([OpponentPolicy::Random]);
    assert!(matches!(
        Trainer::new(short, None),
        Err(GameError::InvalidConfiguration(_))
    ));
    let long = trainer_config(Algorithm::MonteCarlo)
        .with_opponents([OpponentPolicy::Random; 3]);
    assert!(matches!(
        Trainer::new(long, None),
        Err(GameError::InvalidConfiguration(_))
    ));
}

#[test]
fn overflowing_chip_total_fails_trainer_setup() {
    let settings = GameSettings {
        starting_chips: u32::MAX / 2,
        ..small_settings()
    };
    let config = trainer_config(Algorithm::QLearning).with_settings(settings);
    assert!(matches!(
        Trainer::new(config, None),
        Err(GameError::InvalidConfiguration(_))
    ));
}

/// Errors on every decision it is asked for.
struct Walkout;

impl Bot for Walkout {
    fn select_action(&mut self, _state: &State, _mask: ActionMask) -> Result<Action, GameError> {
        Err(GameError::InvalidConfiguration("seat walked out"))
    }
}

/// Seat 0 passes the first card (11) on to a seat that fails.
fn aborted_episode(learner: &mut dyn Bot) -> Result<(), GameError> {
    let deck: Vec<Card> = (3..=11).collect();
    let mut game = GameBuilder::new(NAMES)
        .with_settings(small_settings())
        .with_deck(deck)
        .build()?;
    let (mut b, mut c) = (Walkout, Walkout);
    let mut seats: [&mut dyn Bot; 3] = [learner, &mut b, &mut c];
    let result = run_episode(&mut game, &mut seats);
    assert!(matches!(result, Err(GameError::InvalidConfiguration(_))));
    Ok(())
}

#[test]
fn failed_episode_clears_the_q_learner_pending_pair() -> Result<(), GameError> {
    let space = StateActionSpace::new(small_settings())?;
    let config = AgentConfig::new(0.0, 0.5)?;
    let mut agent = QLearningAgent::new(space, config, StdRng::seed_from_u64(8))?;
    let first = State::new(11, 0, 3, []);
    agent.table_mut().set(&first, Action::Pass, 10.0)?;

    aborted_episode(&mut agent)?;
    assert!(agent.previous().is_none());
    assert_eq!(
        agent.reinforce(&State::new(5, 0, 3, []), Action::Take, Transition::Continue)?,
        UpdateKind::NoPrevious
    );
    assert_eq!(agent.table().value(&first, Action::Pass)?, 10.0);
    Ok(())
}

#[test]
fn failed_episode_clears_the_monte_carlo_trace() -> Result<(), GameError> {
    let space = StateActionSpace::new(small_settings())?;
    let config = AgentConfig::new(0.0, 0.5)?;
    let mut agent = MonteCarloAgent::new(space, config, StdRng::seed_from_u64(8))?;
    let first = State::new(11, 0, 3, []);
    agent.table_mut().set(&first, Action::Pass, 10.0)?;

    aborted_episode(&mut agent)?;
    assert!(agent.trace().is_empty());
    assert_eq!(agent.visits().get(&first, Action::Pass), 1);
    Ok(())
}
