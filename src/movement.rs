//! Movement and melee resolution for beings on a `Map`.
//!
//! Walking into an empty walkable cell moves; walking into an occupied cell
//! fights instead and never moves the attacker. Depth changes go through the
//! same path but need the matching stairs under the mover.

use hecs::Entity;
use rand::Rng;
use tracing::{debug, info};

use combat::{Combat, CombatReport, Fighter, RetaliationPolicy};
use dungeon::{Tile, TileMap};
use items::Item;

use crate::ecs::{
    Attacker, Being, CorpseDropper, Destructible, FoodConsumer, Map, Position, Renderable,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The target cell was free; `try_move` has put the mover there.
    Moved,
    /// The target held a destructible being and a fight happened instead.
    Attacked(CombatReport),
    /// Wall, static occupant, missing stairs and so on.
    Blocked,
}

impl MoveOutcome {
    pub fn is_free(&self) -> bool {
        matches!(self, MoveOutcome::Moved)
    }

    pub fn player_died(&self) -> bool {
        matches!(self, MoveOutcome::Attacked(report) if report.player_died)
    }
}

/// Try to move `mover` onto `target`, fighting whatever stands there.
pub fn try_move<R: Rng>(
    map: &mut Map,
    mover: Entity,
    target: Position,
    policy: RetaliationPolicy,
    rng: &mut R,
) -> MoveOutcome {
    let Some(from) = map.position_of(mover) else {
        return MoveOutcome::Blocked;
    };

    if target.z != from.z {
        return change_depth(map, mover, from, target);
    }

    let outcome = resolve_move(map, mover, target, policy, rng);
    if outcome.is_free() {
        move_to(map, mover, target);
    }
    outcome
}

/// Decide what happens when `mover` steps onto `target` without moving it.
///
/// Combat is carried out here as a side effect. `Moved` only says the cell
/// can be occupied; callers do the position update with [`move_to`].
pub fn resolve_move<R: Rng>(
    map: &mut Map,
    mover: Entity,
    target: Position,
    policy: RetaliationPolicy,
    rng: &mut R,
) -> MoveOutcome {
    match map.entity_at(target) {
        Some(occupant) if occupant != mover => {
            let can_fight = map.has::<Attacker>(mover)
                && map.being(mover).is_some()
                && map.has::<Destructible>(occupant)
                && map.being(occupant).is_some();
            if !can_fight {
                return MoveOutcome::Blocked;
            }
            MoveOutcome::Attacked(fight(map, mover, occupant, policy, rng))
        }
        Some(_) => MoveOutcome::Blocked,
        None if map.is_walkable(target) => MoveOutcome::Moved,
        None => MoveOutcome::Blocked,
    }
}

/// Update the mover's position. The renderer redraws the whole frame, so
/// the old cell shows its tile again on the next draw.
pub fn move_to(map: &mut Map, mover: Entity, target: Position) {
    map.set_position(mover, target);
}

fn change_depth(map: &mut Map, mover: Entity, from: Position, target: Position) -> MoveOutcome {
    let stairs = match target.z - from.z {
        1 => Tile::StairsDown,
        -1 => Tile::StairsUp,
        _ => return MoveOutcome::Blocked,
    };
    if map.tile(from) != stairs || target.x != from.x || target.y != from.y {
        return MoveOutcome::Blocked;
    }
    if !map.is_walkable(target) || map.entity_at(target).is_some() {
        return MoveOutcome::Blocked;
    }
    move_to(map, mover, target);
    debug!(from = from.z, to = target.z, "depth_changed");
    MoveOutcome::Moved
}

fn fighter_of(map: &Map, entity: Entity, being: Being) -> Fighter {
    let fighter = Fighter::new(map.name_of(entity), being.health, being.attack, being.defence);
    if map.is_player(entity) {
        fighter.player()
    } else {
        fighter
    }
}

fn fight<R: Rng>(
    map: &mut Map,
    attacker: Entity,
    defender: Entity,
    policy: RetaliationPolicy,
    rng: &mut R,
) -> CombatReport {
    let (Some(a), Some(d)) = (map.being(attacker), map.being(defender)) else {
        return CombatReport::default();
    };
    let mut a_fighter = fighter_of(map, attacker, a);
    let mut d_fighter = fighter_of(map, defender, d);

    let report = Combat::exchange(&mut a_fighter, &mut d_fighter, policy);
    write_health(map, attacker, a_fighter.health);
    write_health(map, defender, d_fighter.health);

    info!(
        attacker = %a_fighter.name,
        defender = %d_fighter.name,
        damage = report.damage,
        retaliation = ?report.retaliation,
        defender_died = report.defender_died,
        attacker_died = report.attacker_died,
        "combat_exchange"
    );

    for line in &report.logs {
        map.send_message(attacker, line.clone());
        map.send_message(defender, line.clone());
    }

    if report.defender_died {
        kill(map, defender, rng);
    }
    if report.attacker_died {
        kill(map, attacker, rng);
    }
    report
}

fn write_health(map: &mut Map, entity: Entity, health: i32) {
    if let Ok(mut being) = map.world.get::<&mut Being>(entity) {
        being.health = health;
    }
}

/// Remove a dead being from the map, maybe leaving a corpse behind.
///
/// Returns `false` when the entity was already gone; nothing happens then.
pub fn kill<R: Rng>(map: &mut Map, entity: Entity, rng: &mut R) -> bool {
    if !map.contains(entity) {
        return false;
    }
    let name = map.name_of(entity);
    let pos = map.position_of(entity);
    let dropper = map.world.get::<&CorpseDropper>(entity).ok().map(|d| *d);
    let colour = map
        .world
        .get::<&Renderable>(entity)
        .ok()
        .map(|r| r.fg_color);

    if let (Some(pos), Some(dropper), Some(colour)) = (pos, dropper, colour) {
        if rng.random_range(0..100) < dropper.rate {
            map.add_item(pos, Item::corpse(&name, colour));
        }
    }

    let removed = map.remove_entity(entity);
    if removed {
        info!(entity = %name, "entity_removed");
    }
    removed
}

/// Burn food for one step. Returns `true` when the holder starved to death.
pub fn deplete_fullness<R: Rng>(map: &mut Map, entity: Entity, rng: &mut R) -> bool {
    let starved = match map.world.get::<&mut FoodConsumer>(entity) {
        Ok(mut food) => {
            food.fullness -= food.depletion_rate;
            food.fullness <= 0
        }
        Err(_) => false,
    };
    if starved {
        if let Ok(mut being) = map.world.get::<&mut Being>(entity) {
            being.health = 0;
        }
        map.send_message(entity, "You have died of starvation!");
        kill(map, entity, rng);
    }
    starved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::{Actor, Faction, MessageRecipient, PlayerActor};
    use dungeon::{Color, Level};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn corridor() -> Map {
        Map::new(Level::from_layers(&[&["#######", "#.....#", "#######"]]))
    }

    fn being(map: &mut Map, name: &str, pos: Position, health: i32, attack: i32) -> Entity {
        map.world.spawn((
            pos,
            Actor {
                name: name.to_string(),
                faction: Faction::Enemy,
            },
            Renderable {
                symbol: 'x',
                fg_color: Color::White,
                bg_color: Color::Black,
            },
            Being {
                health,
                max_health: health,
                attack,
                defence: 0,
            },
            Attacker,
            Destructible,
        ))
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn step(map: &mut Map, mover: Entity, target: Position) -> MoveOutcome {
        try_move(map, mover, target, RetaliationPolicy::Always, &mut rng())
    }

    #[test]
    fn free_cell_moves_without_fighting() {
        let mut map = corridor();
        let kobold = being(&mut map, "kobold", Position::new(1, 1, 0), 40, 10);

        let outcome = step(&mut map, kobold, Position::new(2, 1, 0));

        assert_eq!(outcome, MoveOutcome::Moved);
        assert_eq!(map.position_of(kobold), Some(Position::new(2, 1, 0)));
        assert_eq!(map.being(kobold).unwrap().health, 40);
    }

    #[test]
    fn walls_block_silently() {
        let mut map = corridor();
        let kobold = being(&mut map, "kobold", Position::new(1, 1, 0), 40, 10);

        let outcome = step(&mut map, kobold, Position::new(1, 0, 0));

        assert_eq!(outcome, MoveOutcome::Blocked);
        assert_eq!(map.position_of(kobold), Some(Position::new(1, 1, 0)));
    }

    #[test]
    fn attacking_never_moves_the_attacker() {
        let mut map = corridor();
        let kobold = being(&mut map, "kobold", Position::new(1, 1, 0), 40, 10);
        let bat = being(&mut map, "bat", Position::new(2, 1, 0), 5, 4);
        map.world.insert_one(bat, CorpseDropper { rate: 100 }).unwrap();

        let outcome = step(&mut map, kobold, Position::new(2, 1, 0));

        assert!(!outcome.is_free());
        assert_eq!(map.position_of(kobold), Some(Position::new(1, 1, 0)));
        assert!(!map.contains(bat));
        assert_eq!(map.being(kobold).unwrap().health, 36);
        assert_eq!(map.items_at(Position::new(2, 1, 0))[0].name, "bat corpse");
    }

    #[test]
    fn static_occupant_blocks_without_combat() {
        let mut map = corridor();
        let kobold = being(&mut map, "kobold", Position::new(1, 1, 0), 40, 10);
        map.world.spawn((Position::new(2, 1, 0),));

        let outcome = step(&mut map, kobold, Position::new(2, 1, 0));
        assert_eq!(outcome, MoveOutcome::Blocked);
    }

    #[test]
    fn messages_reach_recipients() {
        let mut map = corridor();
        let player = being(&mut map, "player", Position::new(1, 1, 0), 40, 10);
        map.world
            .insert(player, (PlayerActor, MessageRecipient::default()))
            .unwrap();
        let newt = being(&mut map, "newt", Position::new(2, 1, 0), 30, 2);

        step(&mut map, player, Position::new(2, 1, 0));

        let messages = map.world.get::<&MessageRecipient>(player).unwrap().messages.clone();
        assert_eq!(messages, vec!["player strikes newt for 10 damage!".to_string()]);
        assert_eq!(map.being(newt).unwrap().health, 20);
    }

    #[test]
    fn stairs_are_needed_to_change_depth() {
        let mut map = Map::new(Level::from_layers(&[
            &["###", "#>#", "#.#"],
            &["###", "#<#", "#.#"],
        ]));
        let mover = being(&mut map, "player", Position::new(1, 2, 0), 10, 1);

        let up = step(&mut map, mover, Position::new(1, 2, 1));
        assert_eq!(up, MoveOutcome::Blocked);

        map.set_position(mover, Position::new(1, 1, 0));
        let down = step(&mut map, mover, Position::new(1, 1, 1));
        assert_eq!(down, MoveOutcome::Moved);
        assert_eq!(map.position_of(mover), Some(Position::new(1, 1, 1)));
    }

    #[test]
    fn starving_kills_once() {
        let mut map = corridor();
        let player = being(&mut map, "player", Position::new(1, 1, 0), 10, 1);
        map.world
            .insert_one(
                player,
                FoodConsumer {
                    fullness: 1,
                    max_fullness: 100,
                    depletion_rate: 1,
                },
            )
            .unwrap();

        let mut rng = rng();
        assert!(deplete_fullness(&mut map, player, &mut rng));
        assert!(!map.contains(player));
        assert!(!kill(&mut map, player, &mut rng));
    }
}
