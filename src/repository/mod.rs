pub mod attachment;
pub mod profile;
pub mod project;
pub mod user_identity;
