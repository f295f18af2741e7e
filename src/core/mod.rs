pub mod config;
pub mod phase;
pub mod pools;
pub mod scoreboard;
pub mod simulation;
