//! Session domain module

mod payload;
mod state;

pub use payload::{AssemblyError, AudioPayload, FragmentBuffer};
pub use state::{InvalidStateTransition, SessionLifecycle, SessionState};
