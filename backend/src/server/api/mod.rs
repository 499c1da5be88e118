pub mod admin;
pub mod cache;
pub mod content;
pub mod portfolio;
