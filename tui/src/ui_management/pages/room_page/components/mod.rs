pub mod config_toggle_list;
pub mod form_field;
