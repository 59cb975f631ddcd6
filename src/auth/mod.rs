//! Auth orchestration — the session lifecycle state machine

mod actor;

pub use actor::{AuthHandle, AuthOrchestrator};
