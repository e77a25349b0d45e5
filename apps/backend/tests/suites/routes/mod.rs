pub mod error_shape;
pub mod packs;
pub mod public_state;
