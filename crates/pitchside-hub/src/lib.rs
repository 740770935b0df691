pub mod emitter;
pub mod hub;

pub use emitter::Emitter;
pub use hub::{Hub, Outbound};
