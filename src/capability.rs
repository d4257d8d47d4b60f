//! Capability modules: named, composable bundles of attributes and behaviour.
//!
//! A module does two things when an entity is built from a template. First it
//! fills in any attribute the template left empty, then it attaches the
//! components that make the behaviour happen. Systems pick those components
//! up later (the scheduler runs `TaskActor`, movement checks `Attacker`, and
//! so on), so two templates listing the same modules behave the same.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use hecs::EntityBuilder;

use crate::ecs::{
    ACTION_COST, Attacker, CorpseDropper, Destructible, Energy, FoodConsumer, InventoryHolder,
    MessageRecipient, PlayerActor, Sight, Task, TaskActor,
};
use crate::template::Template;
use error::{GameError, GameResult};

pub trait Capability: Send + Sync {
    /// Registry key, as written in templates.
    fn name(&self) -> &'static str;

    /// Set default-valued attributes the template did not provide.
    fn fill_defaults(&self, template: &mut Template) {
        let _ = template;
    }

    /// Add this module's components to the entity under construction.
    fn attach(&self, template: &Template, builder: &mut EntityBuilder) -> GameResult<()>;
}

/// Modules by key.
#[derive(Default, Clone)]
pub struct CapabilityRegistry {
    modules: HashMap<&'static str, Arc<dyn Capability>>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(PlayerActorCapability);
        registry.register(TaskActorCapability);
        registry.register(AttackerCapability);
        registry.register(DestructibleCapability);
        registry.register(SightCapability);
        registry.register(InventoryHolderCapability);
        registry.register(MessageRecipientCapability);
        registry.register(FoodConsumerCapability);
        registry.register(CorpseDropperCapability);
        registry
    }

    /// Later registrations under the same key replace earlier ones.
    pub fn register<C: Capability + 'static>(&mut self, capability: C) {
        self.modules.insert(capability.name(), Arc::new(capability));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Capability>> {
        self.modules.get(name).cloned()
    }

    /// Look up every module a template lists, failing on the first unknown key.
    pub fn resolve(
        &self,
        template_key: &str,
        template: &Template,
    ) -> GameResult<Vec<Arc<dyn Capability>>> {
        template
            .capabilities
            .iter()
            .map(|name| {
                self.get(name).ok_or_else(|| GameError::UnknownCapability {
                    template: template_key.to_string(),
                    capability: name.clone(),
                })
            })
            .collect()
    }
}

impl std::fmt::Debug for CapabilityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<_> = self.modules.keys().collect();
        keys.sort();
        f.debug_struct("CapabilityRegistry").field("modules", &keys).finish()
    }
}

/// 默认速度：每回合行动一次
pub const DEFAULT_SPEED: u32 = ACTION_COST;

pub struct PlayerActorCapability;

impl Capability for PlayerActorCapability {
    fn name(&self) -> &'static str {
        "player_actor"
    }

    fn fill_defaults(&self, template: &mut Template) {
        template.speed.get_or_insert(DEFAULT_SPEED);
    }

    fn attach(&self, template: &Template, builder: &mut EntityBuilder) -> GameResult<()> {
        builder.add(PlayerActor).add(Energy {
            current: 0,
            speed: template.speed.unwrap_or(DEFAULT_SPEED),
        });
        Ok(())
    }
}

pub struct TaskActorCapability;

impl Capability for TaskActorCapability {
    fn name(&self) -> &'static str {
        "task_actor"
    }

    fn fill_defaults(&self, template: &mut Template) {
        template.speed.get_or_insert(DEFAULT_SPEED);
        if template.tasks.is_empty() {
            template.tasks.push(Task::Wander.to_string());
        }
    }

    fn attach(&self, template: &Template, builder: &mut EntityBuilder) -> GameResult<()> {
        let tasks = template
            .tasks
            .iter()
            .map(|t| {
                Task::from_str(t).map_err(|_| GameError::InvalidTemplate {
                    key: template.name.clone(),
                    reason: format!("unknown task '{}'", t),
                })
            })
            .collect::<GameResult<Vec<_>>>()?;
        builder.add(TaskActor { tasks }).add(Energy {
            current: 0,
            speed: template.speed.unwrap_or(DEFAULT_SPEED),
        });
        Ok(())
    }
}

pub struct AttackerCapability;

impl Capability for AttackerCapability {
    fn name(&self) -> &'static str {
        "attacker"
    }

    fn fill_defaults(&self, template: &mut Template) {
        template.attack_value.get_or_insert(1);
    }

    fn attach(&self, _template: &Template, builder: &mut EntityBuilder) -> GameResult<()> {
        builder.add(Attacker);
        Ok(())
    }
}

pub struct DestructibleCapability;

impl Capability for DestructibleCapability {
    fn name(&self) -> &'static str {
        "destructible"
    }

    fn fill_defaults(&self, template: &mut Template) {
        template.max_hp.get_or_insert(10);
        template.defense_value.get_or_insert(0);
    }

    fn attach(&self, _template: &Template, builder: &mut EntityBuilder) -> GameResult<()> {
        builder.add(Destructible);
        Ok(())
    }
}

pub struct SightCapability;

impl Capability for SightCapability {
    fn name(&self) -> &'static str {
        "sight"
    }

    fn fill_defaults(&self, template: &mut Template) {
        template.sight_radius.get_or_insert(5);
    }

    fn attach(&self, template: &Template, builder: &mut EntityBuilder) -> GameResult<()> {
        builder.add(Sight {
            radius: template.sight_radius.unwrap_or(5),
        });
        Ok(())
    }
}

pub struct InventoryHolderCapability;

impl Capability for InventoryHolderCapability {
    fn name(&self) -> &'static str {
        "inventory_holder"
    }

    fn fill_defaults(&self, template: &mut Template) {
        template.inventory_slots.get_or_insert(10);
    }

    fn attach(&self, template: &Template, builder: &mut EntityBuilder) -> GameResult<()> {
        // 字母 a-z 是选择列表的上限
        let slots = template.inventory_slots.unwrap_or(10).min(26);
        builder.add(InventoryHolder::new(slots));
        Ok(())
    }
}

pub struct MessageRecipientCapability;

impl Capability for MessageRecipientCapability {
    fn name(&self) -> &'static str {
        "message_recipient"
    }

    fn attach(&self, _template: &Template, builder: &mut EntityBuilder) -> GameResult<()> {
        builder.add(MessageRecipient::default());
        Ok(())
    }
}

pub struct FoodConsumerCapability;

impl Capability for FoodConsumerCapability {
    fn name(&self) -> &'static str {
        "food_consumer"
    }

    fn fill_defaults(&self, template: &mut Template) {
        let max = *template.max_fullness.get_or_insert(1000);
        template.fullness.get_or_insert(max / 2);
        template.fullness_depletion_rate.get_or_insert(1);
    }

    fn attach(&self, template: &Template, builder: &mut EntityBuilder) -> GameResult<()> {
        let max_fullness = template.max_fullness.unwrap_or(1000);
        builder.add(FoodConsumer {
            fullness: template.fullness.unwrap_or(max_fullness / 2).min(max_fullness),
            max_fullness,
            depletion_rate: template.fullness_depletion_rate.unwrap_or(1),
        });
        Ok(())
    }
}

pub struct CorpseDropperCapability;

impl Capability for CorpseDropperCapability {
    fn name(&self) -> &'static str {
        "corpse_dropper"
    }

    fn fill_defaults(&self, template: &mut Template) {
        template.corpse_drop_rate.get_or_insert(100);
    }

    fn attach(&self, template: &Template, builder: &mut EntityBuilder) -> GameResult<()> {
        builder.add(CorpseDropper {
            rate: template.corpse_drop_rate.unwrap_or(100).min(100),
        });
        Ok(())
    }
}
