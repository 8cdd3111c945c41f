pub use self::call_page::CallPage;

#[allow(clippy::module_inception)]
mod call_page;
mod components;
