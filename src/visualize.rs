use std::fmt::Write;

use crate::action::Action;
use crate::score::{card_points, collapse};
use crate::state::{PlayerSummary, State};

/// One-line description of a decision point.
pub fn describe_state(state: &State) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        "card {} ({} chip(s) on it), holding {} chip(s)",
        state.open_card, state.open_chips, state.player_chips
    );
    if state.hand.is_empty() {
        out.push_str(", no cards");
    } else {
        let cards: Vec<String> = state.hand.iter().map(|c| c.to_string()).collect();
        let _ = write!(
            out,
            ", cards [{}] worth {}",
            cards.join(" "),
            card_points(&state.hand)
        );
    }
    out
}

pub fn describe_action(state: &State, action: Action) -> String {
    match action {
        Action::Take => format!(
            "takes the {} and {} chip(s)",
            state.open_card, state.open_chips
        ),
        Action::Pass => format!("passes the {} and loses a chip", state.open_card),
    }
}

/// Final table of every seat, lowest score first.
pub fn render_summary(players: &[PlayerSummary]) -> String {
    let mut rows: Vec<&PlayerSummary> = players.iter().collect();
    rows.sort_by_key(|player| (player.score, player.id));
    let mut out = String::new();
    for player in rows {
        let counted: Vec<String> = collapse(&player.hand)
            .iter()
            .map(|c| c.to_string())
            .collect();
        let _ = writeln!(
            out,
            "{:<12} score {:>4}  chips {:>3}  counted [{}]",
            player.name,
            player.score,
            player.chips,
            counted.join(" ")
        );
    }
    out
}
