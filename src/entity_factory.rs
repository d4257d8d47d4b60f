use std::sync::Arc;

use hecs::{Entity, EntityBuilder};
use tracing::debug;

use crate::capability::CapabilityRegistry;
use crate::ecs::{Actor, Being, Faction, Map, Position, Renderable};
use crate::template::{Template, TemplateRegistry};
use error::GameResult;

/// Being stats used when neither the template nor a module set them.
pub const DEFAULT_HEALTH: i32 = 3;
pub const DEFAULT_ATTACK: i32 = 1;
pub const DEFAULT_DEFENCE: i32 = 0;

/// 实体工厂，根据模板和能力模块组装实体
#[derive(Debug, Clone)]
pub struct EntityFactory {
    templates: Arc<TemplateRegistry>,
    capabilities: Arc<CapabilityRegistry>,
}

impl EntityFactory {
    pub fn new(templates: Arc<TemplateRegistry>, capabilities: Arc<CapabilityRegistry>) -> Self {
        Self {
            templates,
            capabilities,
        }
    }

    /// Assemble the components for `key` at `pos` without spawning.
    ///
    /// Every module name is resolved before anything is built, so a bad
    /// template never yields a half-built entity.
    pub fn builder(&self, key: &str, pos: Position) -> GameResult<EntityBuilder> {
        let template = self.templates.get(key)?;
        let modules = self.capabilities.resolve(key, template)?;

        let mut resolved = template.clone();
        for module in &modules {
            module.fill_defaults(&mut resolved);
        }

        let mut builder = base_components(&resolved, pos);
        for module in &modules {
            module.attach(&resolved, &mut builder)?;
        }

        let faction = if resolved.capabilities.iter().any(|c| c == "player_actor") {
            Faction::Player
        } else if resolved.capabilities.iter().any(|c| c == "task_actor") {
            Faction::Enemy
        } else {
            Faction::Neutral
        };
        builder.add(Actor {
            name: resolved.name.clone(),
            faction,
        });
        Ok(builder)
    }

    /// Build and place an entity on the map.
    pub fn spawn(&self, map: &mut Map, key: &str, pos: Position) -> GameResult<Entity> {
        let mut builder = self.builder(key, pos)?;
        let entity = map.spawn(&mut builder);
        debug!(template = key, x = pos.x, y = pos.y, z = pos.z, "entity_spawned");
        Ok(entity)
    }
}

fn base_components(template: &Template, pos: Position) -> EntityBuilder {
    let mut builder = EntityBuilder::new();
    builder.add(pos).add(Renderable {
        symbol: template.character,
        fg_color: template.foreground,
        bg_color: template.background,
    });

    if template.is_health_bearing() {
        let max_health = template.max_hp.unwrap_or(DEFAULT_HEALTH);
        builder.add(Being {
            health: max_health,
            max_health,
            attack: template.attack_value.unwrap_or(DEFAULT_ATTACK),
            defence: template.defense_value.unwrap_or(DEFAULT_DEFENCE),
        });
    }
    builder
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::{Attacker, CorpseDropper, InventoryHolder, PlayerActor, TaskActor, Task};
    use dungeon::{Level, Tile};
    use error::GameError;

    fn factory() -> EntityFactory {
        EntityFactory::new(
            Arc::new(TemplateRegistry::builtin().unwrap()),
            Arc::new(CapabilityRegistry::with_builtin()),
        )
    }

    fn factory_with(registry: TemplateRegistry) -> EntityFactory {
        EntityFactory::new(Arc::new(registry), Arc::new(CapabilityRegistry::with_builtin()))
    }

    fn open_map() -> Map {
        Map::new(Level::new(5, 5, 1, Tile::Floor))
    }

    #[test]
    fn player_gets_every_listed_module() {
        let mut map = open_map();
        let player = factory().spawn(&mut map, "player", Position::new(1, 1, 0)).unwrap();

        let being = map.being(player).unwrap();
        assert_eq!(being.health, 40);
        assert_eq!(being.attack, 10);
        assert_eq!(being.defence, 0);
        assert!(map.has::<PlayerActor>(player));
        assert!(map.has::<Attacker>(player));
        assert_eq!(map.world.get::<&InventoryHolder>(player).unwrap().slots, 22);
        assert!(!map.has::<TaskActor>(player));
    }

    #[test]
    fn shared_module_lists_give_shared_behaviour() {
        let mut map = open_map();
        let f = factory();
        let bat = f.spawn(&mut map, "bat", Position::new(1, 1, 0)).unwrap();
        let newt = f.spawn(&mut map, "newt", Position::new(2, 1, 0)).unwrap();

        for e in [bat, newt] {
            assert!(map.has::<Attacker>(e));
            assert!(map.has::<CorpseDropper>(e));
            assert_eq!(map.world.get::<&TaskActor>(e).unwrap().tasks, vec![Task::Wander]);
        }
    }

    #[test]
    fn empty_module_list_is_a_static_entity() {
        let mut registry = TemplateRegistry::new();
        registry.define("statue", Template::new("statue", '&')).unwrap();
        let f = factory_with(registry);
        let mut map = open_map();

        let statue = f.spawn(&mut map, "statue", Position::new(2, 2, 0)).unwrap();
        assert!(map.being(statue).is_none());
        assert_eq!(map.entity_at(Position::new(2, 2, 0)), Some(statue));
    }

    #[test]
    fn destructible_default_health_applies_when_template_is_silent() {
        let mut registry = TemplateRegistry::new();
        registry
            .define("dummy", Template::new("dummy", 'D').with_capabilities(["destructible"]))
            .unwrap();
        let f = factory_with(registry);
        let mut map = open_map();

        let dummy = f.spawn(&mut map, "dummy", Position::new(0, 0, 0)).unwrap();
        let being = map.being(dummy).unwrap();
        assert_eq!(being.health, 10);
        assert_eq!(being.attack, DEFAULT_ATTACK);
    }

    #[test]
    fn unknown_module_aborts_without_spawning() {
        let mut registry = TemplateRegistry::new();
        registry
            .define("wisp", Template::new("wisp", 'w').with_capabilities(["attacker", "glowing"]))
            .unwrap();
        let f = factory_with(registry);
        let mut map = open_map();

        let err = f.spawn(&mut map, "wisp", Position::new(0, 0, 0)).unwrap_err();
        assert!(matches!(err, GameError::UnknownCapability { .. }));
        assert_eq!(map.world.len(), 0);
    }

    #[test]
    fn factions_follow_the_actor_module() {
        let mut registry = TemplateRegistry::builtin().unwrap();
        registry.define("statue", Template::new("statue", '&')).unwrap();
        let f = factory_with(registry);
        let mut map = open_map();

        let player = f.spawn(&mut map, "player", Position::new(1, 1, 0)).unwrap();
        let bat = f.spawn(&mut map, "bat", Position::new(2, 1, 0)).unwrap();
        let statue = f.spawn(&mut map, "statue", Position::new(3, 1, 0)).unwrap();

        let faction = |e| map.world.get::<&Actor>(e).unwrap().faction;
        assert_eq!(faction(player), Faction::Player);
        assert_eq!(faction(bat), Faction::Enemy);
        assert_eq!(faction(statue), Faction::Neutral);
        assert_eq!(map.hostile_count(), 1);
    }

    #[test]
    fn unknown_template_is_reported() {
        let mut map = open_map();
        let err = factory().spawn(&mut map, "dragon", Position::default()).unwrap_err();
        assert!(matches!(err, GameError::UnknownTemplate(_)));
    }
}
