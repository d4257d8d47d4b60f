//! Turn gate and energy-driven scheduler for non-player beings.
//!
//! The gate sits between the screen layer and the scheduler. Screens may
//! only unlock it after a valid player action; the scheduler advances every
//! `TaskActor` once the gate is open and locks it again when it needs the
//! player. Cancelling the gate is final: no round runs afterwards.

use hecs::Entity;
use rand::Rng;
use tracing::{debug, info};

use combat::RetaliationPolicy;
use dungeon::TileMap;

use crate::ecs::{ACTION_COST, Being, Energy, Map, Position, Sight, Task, TaskActor};
use crate::movement::{self, MoveOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum GateState {
    #[default]
    Locked,
    Unlocked,
    Cancelled,
}

/// 回合闸门：玩家有效行动后才放行世界模拟
#[derive(Debug, Clone, Default)]
pub struct TurnGate {
    state: GateState,
}

impl TurnGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Let the world advance. Has no effect once cancelled.
    pub fn unlock(&mut self) {
        if self.state == GateState::Locked {
            self.state = GateState::Unlocked;
            debug!("turn_gate_unlocked");
        }
    }

    fn lock(&mut self) {
        if self.state == GateState::Unlocked {
            self.state = GateState::Locked;
            debug!("turn_gate_locked");
        }
    }

    /// Stop all further turn advancement.
    pub fn cancel(&mut self) {
        if self.state != GateState::Cancelled {
            self.state = GateState::Cancelled;
            info!("turn_gate_cancelled");
        }
    }

    pub fn is_locked(&self) -> bool {
        self.state != GateState::Unlocked
    }

    pub fn is_cancelled(&self) -> bool {
        self.state == GateState::Cancelled
    }
}

/// Summary of one scheduler run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoundReport {
    /// Actions taken by non-player beings.
    pub actions: usize,
    pub player_died: bool,
}

/// Advances non-player beings whenever the gate is open.
#[derive(Debug, Default)]
pub struct TurnScheduler {
    started: bool,
    rounds: u64,
}

impl TurnScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin scheduling. The first round waits for the player.
    pub fn start(&mut self, gate: &mut TurnGate) {
        self.started = true;
        gate.lock();
        info!("scheduler_started");
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn rounds(&self) -> u64 {
        self.rounds
    }

    /// Run one round if the gate is open, then lock it again.
    ///
    /// Each actor gains its speed in energy and acts once per
    /// [`ACTION_COST`] it holds. The round stops as soon as the player dies.
    pub fn run<R: Rng>(
        &mut self,
        map: &mut Map,
        gate: &mut TurnGate,
        policy: RetaliationPolicy,
        rng: &mut R,
    ) -> RoundReport {
        let mut report = RoundReport::default();
        if !self.started || gate.is_locked() {
            return report;
        }
        self.rounds += 1;

        let actors: Vec<Entity> = map
            .world
            .query::<(&TaskActor, &Energy)>()
            .iter()
            .map(|(entity, _)| entity)
            .collect();

        'actors: for actor in actors {
            if let Ok(mut energy) = map.world.get::<&mut Energy>(actor) {
                energy.current = energy.current.saturating_add(energy.speed);
            }
            loop {
                if gate.is_cancelled() || !map.contains(actor) {
                    break;
                }
                let ready = match map.world.get::<&mut Energy>(actor) {
                    Ok(mut energy) if energy.current >= ACTION_COST => {
                        energy.current -= ACTION_COST;
                        true
                    }
                    _ => false,
                };
                if !ready {
                    break;
                }

                report.actions += 1;
                if act(map, actor, policy, rng) || !player_alive(map) {
                    report.player_died = true;
                    info!(round = self.rounds, "player_died");
                    gate.cancel();
                    break 'actors;
                }
            }
        }

        gate.lock();
        debug!(round = self.rounds, actions = report.actions, "round_finished");
        report
    }
}

fn player_alive(map: &Map) -> bool {
    map.player()
        .and_then(|p| map.being(p))
        .is_some_and(|b| b.is_alive())
}

/// Perform the first task the actor is able to do. Returns whether the
/// player died from it.
fn act<R: Rng>(map: &mut Map, actor: Entity, policy: RetaliationPolicy, rng: &mut R) -> bool {
    let tasks = match map.world.get::<&TaskActor>(actor) {
        Ok(task_actor) => task_actor.tasks.clone(),
        Err(_) => return false,
    };

    for task in tasks {
        let outcome = match task {
            Task::Hunt => match hunt_step(map, actor) {
                Some(target) => movement::try_move(map, actor, target, policy, rng),
                None => continue,
            },
            Task::Wander => {
                let target = wander_step(map, actor, rng);
                match target {
                    Some(target) => movement::try_move(map, actor, target, policy, rng),
                    None => MoveOutcome::Blocked,
                }
            }
        };
        return outcome.player_died();
    }
    false
}

/// Next cell toward the player when it is in sight on the same depth.
fn hunt_step(map: &Map, hunter: Entity) -> Option<Position> {
    let radius = map.world.get::<&Sight>(hunter).ok()?.radius;
    let from = map.position_of(hunter)?;
    let player = map.player()?;
    map.being(player).filter(Being::is_alive)?;
    let to = map.position_of(player)?;

    let distance = from.distance_to(&to)?;
    if distance > radius {
        return None;
    }
    if from.is_cardinal_neighbour(&to) {
        return Some(to);
    }

    let dx = (to.x - from.x).signum();
    let dy = (to.y - from.y).signum();
    let horizontal = from.offset(dx, 0, 0);
    let vertical = from.offset(0, dy, 0);
    let (first, second) = if (to.x - from.x).abs() >= (to.y - from.y).abs() {
        (horizontal, vertical)
    } else {
        (vertical, horizontal)
    };
    [first, second]
        .into_iter()
        .filter(|p| *p != from)
        .find(|p| map.is_walkable(*p) && map.entity_at(*p).is_none())
}

fn wander_step<R: Rng>(map: &Map, actor: Entity, rng: &mut R) -> Option<Position> {
    let from = map.position_of(actor)?;
    let (dx, dy) = match rng.random_range(0..4) {
        0 => (-1, 0),
        1 => (1, 0),
        2 => (0, -1),
        _ => (0, 1),
    };
    Some(from.offset(dx, dy, 0))
}
