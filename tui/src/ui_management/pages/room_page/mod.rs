pub use self::room_page::RoomPage;

mod components;
#[allow(clippy::module_inception)]
mod room_page;
