pub mod chat;
pub mod feed;
pub mod input_bar;
pub mod login;
pub mod profile;
pub mod sidebar;
