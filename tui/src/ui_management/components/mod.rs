pub use self::component::{Component, ComponentRender};

mod component;
pub mod input_box;
pub mod section;
pub mod status_bar;
pub mod usage;
