// src/combat/src/combatant.rs

/// 表示可以参加战斗的活体
pub trait Combatant {
    /// 获取名称
    fn name(&self) -> &str;

    /// 当前生命值，可以为负
    fn health(&self) -> i32;

    /// 获取基础攻击力
    fn attack_value(&self) -> i32;

    /// 获取防御力
    fn defence_value(&self) -> i32;

    /// Whether this is the human-controlled being. The player never takes
    /// retaliation for attacks it starts.
    fn is_player(&self) -> bool;

    /// Subtract `amount` from health as-is. Negative amounts heal.
    fn take_damage(&mut self, amount: i32);

    /// 是否存活
    fn is_alive(&self) -> bool {
        self.health() > 0
    }
}

/// Plain stat block, handy when the stats live in several components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fighter {
    pub name: String,
    pub health: i32,
    pub attack: i32,
    pub defence: i32,
    pub is_player: bool,
}

impl Fighter {
    pub fn new(name: impl Into<String>, health: i32, attack: i32, defence: i32) -> Self {
        Self {
            name: name.into(),
            health,
            attack,
            defence,
            is_player: false,
        }
    }

    pub fn player(mut self) -> Self {
        self.is_player = true;
        self
    }
}

impl Combatant for Fighter {
    fn name(&self) -> &str {
        &self.name
    }

    fn health(&self) -> i32 {
        self.health
    }

    fn attack_value(&self) -> i32 {
        self.attack
    }

    fn defence_value(&self) -> i32 {
        self.defence
    }

    fn is_player(&self) -> bool {
        self.is_player
    }

    fn take_damage(&mut self, amount: i32) {
        self.health -= amount;
    }
}
