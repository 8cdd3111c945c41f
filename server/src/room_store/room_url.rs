/// [RoomUrlResolver] derives the join URL of a room from its name alone.
///
/// The URL is never stored, the same name always resolves to the same URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomUrlResolver {
    base: String,
}

impl RoomUrlResolver {
    pub fn new(base: &str) -> Self {
        RoomUrlResolver {
            base: String::from(base.trim_end_matches('/')),
        }
    }

    pub fn resolve(&self, room_name: &str) -> String {
        format!("{}/{}", self.base, room_name)
    }
}
