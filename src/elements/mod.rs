//! Rotor building blocks: materials, layers and stacks

mod layer;
mod material;
mod stack;

pub use layer::Layer;
pub use material::{DerivedConstants, Material, MaterialProperties};
pub use stack::Stack;
