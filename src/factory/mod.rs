pub mod project;
pub mod user_identity;
