pub mod envelope;
pub mod events;
pub mod frames;
