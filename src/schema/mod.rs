pub mod auth;
pub mod common;
pub mod profile;
pub mod project;
pub mod upload;
