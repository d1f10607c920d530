use std::env;

use serde::Deserialize;
use tracing::info;

#[derive(Clone, Deserialize, Debug)]
pub struct Config {
    pub env: String, // file / server
    pub host: String,
    pub port: u16,
    pub prefix: Option<String>,
    pub database_url: String,
    pub redis_url: String,
    pub jwt_secret: String,
    /// access token lifetime in minutes
    pub jwt_exp: u16,
    /// refresh token lifetime in minutes
    pub jwt_refresh_exp: u16,
    /// HS256 secret shared with the identity provider that signs login assertions
    pub identity_secret: String,
    pub cloudinary_cloud_name: String,
    pub cloudinary_upload_preset: String,
    #[serde(default = "default_cloudinary_folder")]
    pub cloudinary_folder: String,
    #[serde(default)]
    pub enforce_project_ownership: bool,
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
}

fn default_cloudinary_folder() -> String {
    "jornalista360".to_string()
}

fn default_log_dir() -> String {
    "./logs".to_string()
}

pub fn get_config() -> Config {
    let env_var = env::var("env").unwrap_or("file".to_string());
    if env_var == "file" {
        info!("using .env file as environtment variable");
        let _ = dotenvy::dotenv();
    } else {
        info!("using server environtment as environtment variable");
    }
    envy::from_env::<Config>().expect("invalid environment configuration")
}
