pub mod admin;
pub mod auth;
pub mod clipboard;
pub mod files;
pub mod folders;
