/// Widgets of a page that take over the keyboard while they are active
pub trait SectionActivation {
    fn activate(&mut self);
    fn deactivate(&mut self);
}
