//! Domain events.
//!
//! Events are facts emitted by aggregates after a command was accepted.

pub mod event;

pub use event::Event;
