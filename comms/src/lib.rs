/// Room configuration record and room naming rules shared by the store and its clients
pub mod room;
/// Set of commands which the room store can receive and process
pub mod command;
/// Set of replies the room store sends back, one for each command
pub mod reply;
/// Implementation of reply and command transportation over TCP Streams.
/// Requires 'server' or 'client' features to be enabled and will bring in tokio dependency alongside with other dependencies
pub mod transport;
/// Typed request/reply client for the room store
#[cfg(feature = "client")]
pub mod client;
