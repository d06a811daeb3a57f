pub mod com;
pub mod context_menu;
pub mod launcher;
pub mod registration;
