pub mod events;
pub mod push;
