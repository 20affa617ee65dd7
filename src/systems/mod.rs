//! The Entity-Component-System (ECS) module.
//!
//! Components, resources, and the systems that make up one fixed simulation step.

pub mod collision;
pub mod components;
pub mod difficulty;
pub mod factory;
pub mod input;
pub mod lifetime;
pub mod mission;
pub mod motion;
pub mod player;
pub mod profiling;
pub mod spawn;
pub mod state;
pub mod step;

pub use self::collision::*;
pub use self::components::*;
pub use self::factory::*;
pub use self::input::*;
pub use self::lifetime::*;
pub use self::mission::*;
pub use self::motion::*;
pub use self::player::*;
pub use self::profiling::*;
pub use self::spawn::*;
pub use self::state::*;
pub use self::step::*;
