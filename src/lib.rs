//! Arena Engine: phase-driven simulation of multi-agent debate events.
//!
//! Takes a roster of configured agent personas and produces a timed,
//! append-only stream of canned utterances with a running scoreboard,
//! without any language model behind it.

pub mod core;
pub mod schema;
