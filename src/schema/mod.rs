pub mod agent;
pub mod event;
pub mod event_type;
pub mod step;
