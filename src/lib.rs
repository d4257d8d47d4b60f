pub mod capability;
pub mod config;
pub mod ecs;
pub mod entity_factory;
pub mod input;
pub mod movement;
pub mod renderer;
pub mod screens;
pub mod session;
pub mod template;
pub mod turn_system;

pub use combat;
pub use dungeon;
pub use error;
pub use items;
