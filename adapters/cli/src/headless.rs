//! Windowless play where only the enemies act.

use fog_tactics_core::Faction;
use fog_tactics_system_turn::TurnController;
use fog_tactics_world::query;
use tracing::info;

/// Result of a headless session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct HeadlessSummary {
    pub(crate) rounds_played: u32,
    pub(crate) players_left: usize,
    pub(crate) enemies_left: usize,
}

/// Ends the player phase `rounds` times, stopping early once a side is wiped out.
pub(crate) fn run(controller: &mut TurnController, rounds: u32) -> HeadlessSummary {
    let mut rounds_played = 0;
    while rounds_played < rounds && both_sides_standing(controller) {
        let report = controller.next_round();
        let _ = controller.drain_events();
        rounds_played += 1;

        let attacks = report
            .decisions
            .iter()
            .filter(|decision| decision.attacked)
            .count();
        info!(
            round = report.round,
            attacks,
            fallen = ?report.fallen_players(),
            "headless round finished"
        );
    }

    let world = controller.world();
    let summary = HeadlessSummary {
        rounds_played,
        players_left: query::living_units(world, Faction::Player).len(),
        enemies_left: query::living_units(world, Faction::Enemy).len(),
    };
    info!(
        rounds = summary.rounds_played,
        players = summary.players_left,
        enemies = summary.enemies_left,
        "headless session finished"
    );
    summary
}

fn both_sides_standing(controller: &TurnController) -> bool {
    let world = controller.world();
    !query::living_units(world, Faction::Player).is_empty()
        && !query::living_units(world, Faction::Enemy).is_empty()
}
