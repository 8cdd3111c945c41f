pub use self::state::{CallStatus, ChatMessage, State, StoreConnectionStatus};
pub use self::state_store::StateStore;

pub mod action;
mod call_requests;
#[cfg(test)]
mod fake_store;
mod state;
#[allow(clippy::module_inception)]
mod state_store;
mod store_requests;
