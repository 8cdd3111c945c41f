pub mod chat_panel;
