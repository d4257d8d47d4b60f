// src/combat/src/lib.rs
//! Melee exchange arithmetic. Nothing here knows about maps or entities;
//! callers remove the dead and signal game over.

pub mod combatant;

pub use crate::combatant::{Combatant, Fighter};

use serde::Deserialize;
use strum_macros::Display;

/// Whether a defender killed by the blow still strikes back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RetaliationPolicy {
    /// 防御者即使死亡也会反击
    #[default]
    Always,
    /// 只有存活的防御者会反击
    SurvivorsOnly,
}

/// Handles combat interactions between beings
pub struct Combat;

impl Combat {
    /// One attack plus the optional counter-blow.
    ///
    /// Damage is `attack - defence` with no clamping, so a well-armoured
    /// defender can gain health. Retaliation only happens when the attacker
    /// is not the player and uses the defender's stats from before the blow.
    pub fn exchange<A: Combatant, D: Combatant>(
        attacker: &mut A,
        defender: &mut D,
        policy: RetaliationPolicy,
    ) -> CombatReport {
        let mut report = CombatReport::default();

        let counter_attack = defender.attack_value();
        let damage = attacker.attack_value() - defender.defence_value();
        defender.take_damage(damage);
        report.damage = damage;
        report.log(format!(
            "{} strikes {} for {} damage!",
            attacker.name(),
            defender.name(),
            damage
        ));

        report.defender_died = !defender.is_alive();
        if report.defender_died {
            report.log(format!("{} kills {}!", attacker.name(), defender.name()));
        }

        let retaliates = match policy {
            RetaliationPolicy::Always => true,
            RetaliationPolicy::SurvivorsOnly => !report.defender_died,
        };
        if !attacker.is_player() && retaliates {
            let counter = counter_attack - attacker.defence_value();
            attacker.take_damage(counter);
            report.retaliation = Some(counter);
            report.log(format!(
                "{} strikes back at {} for {} damage!",
                defender.name(),
                attacker.name(),
                counter
            ));

            report.attacker_died = !attacker.is_alive();
            if report.attacker_died {
                report.log(format!("{} kills {}!", defender.name(), attacker.name()));
            }
        }

        report.player_died = (report.defender_died && defender.is_player())
            || (report.attacker_died && attacker.is_player());
        report
    }
}

/// What happened in one exchange.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CombatReport {
    /// Amount subtracted from the defender.
    pub damage: i32,
    /// Amount subtracted from the attacker, if it was hit back.
    pub retaliation: Option<i32>,
    pub defender_died: bool,
    pub attacker_died: bool,
    pub player_died: bool,
    pub logs: Vec<String>,
}

impl CombatReport {
    pub fn log(&mut self, message: String) {
        self.logs.push(message);
    }
}
