#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that turns attack intents into fixed-damage commands.

use fog_tactics_core::{Command, Event, Faction, UnitId, UnitSnapshot};

/// Damage dealt by a player attack unless configured otherwise.
pub const DEFAULT_PLAYER_DAMAGE: u32 = 20;

/// Damage dealt by an enemy attack unless configured otherwise.
pub const DEFAULT_ENEMY_DAMAGE: u32 = 10;

/// Resolves attacks by emitting `Command::Attack` with the attacker's fixed damage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CombatResolver {
    player_damage: u32,
    enemy_damage: u32,
}

impl CombatResolver {
    /// Creates a resolver with explicit per-faction damage.
    #[must_use]
    pub const fn new(player_damage: u32, enemy_damage: u32) -> Self {
        Self {
            player_damage,
            enemy_damage,
        }
    }

    /// Damage dealt by attackers of the faction.
    #[must_use]
    pub const fn damage_for(&self, faction: Faction) -> u32 {
        match faction {
            Faction::Player => self.player_damage,
            Faction::Enemy => self.enemy_damage,
        }
    }

    /// Queues an attack from `attacker` against `target`.
    ///
    /// Legality (range, factions, round flags) is enforced by the world when
    /// the command is applied.
    pub fn attack(&self, attacker: &UnitSnapshot, target: &UnitSnapshot, out: &mut Vec<Command>) {
        out.push(Command::Attack {
            attacker: attacker.id,
            target: target.id,
            damage: self.damage_for(attacker.faction),
        });
    }

    /// Reads the result of an attack on `target` back from an event batch.
    #[must_use]
    pub fn outcome(events: &[Event], target: UnitId) -> Option<AttackOutcome> {
        let (damage, health_after) = events.iter().rev().find_map(|event| match event {
            Event::UnitDamaged {
                unit,
                damage,
                health_after,
                ..
            } if *unit == target => Some((*damage, *health_after)),
            _ => None,
        })?;

        let died = events
            .iter()
            .any(|event| matches!(event, Event::UnitDied { unit, .. } if *unit == target));

        Some(AttackOutcome {
            target,
            damage,
            target_health_after: health_after,
            died,
        })
    }
}

impl Default for CombatResolver {
    fn default() -> Self {
        Self::new(DEFAULT_PLAYER_DAMAGE, DEFAULT_ENEMY_DAMAGE)
    }
}

/// Result of a resolved attack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttackOutcome {
    /// Unit that was attacked.
    pub target: UnitId,
    /// Damage that was requested.
    pub damage: u32,
    /// Health left on the target, never below zero.
    pub target_health_after: u32,
    /// Whether the target was removed.
    pub died: bool,
}
