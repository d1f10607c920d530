pub mod caller;
pub mod classifier;
pub mod db;
pub mod security;
pub mod session;
pub mod sqlx_utils;
pub mod test_utils;
pub mod upload;
pub mod utils;
