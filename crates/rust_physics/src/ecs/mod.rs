//! Entity model and world container
//!
//! The physics core only needs a narrow view of the game's entities: a
//! transform, an optional volume and body, a handful of flags and a layer
//! mask. [`GameObject`] carries exactly that and [`World`] keeps them in
//! stable id order together with constraints and event handlers.

mod entity;
mod game_object;
mod world;

pub use entity::Entity;
pub use game_object::GameObject;
pub use world::{index_of, pair_mut, World};
