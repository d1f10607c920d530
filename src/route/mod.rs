pub mod auth;
pub mod profile;
pub mod project;
pub mod project_detail;
#[cfg(test)]
mod project_test;
pub mod upload;
#[cfg(test)]
mod upload_test;
