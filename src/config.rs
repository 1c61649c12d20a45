use dotenvy::dotenv;
use once_cell::sync::Lazy;
use std::env;

pub static CONFIG: Lazy<Config> = Lazy::new(|| {
    dotenv().ok(); // Load .env file if present
    Config {
        mongo_uri: env::var("MONGO_URI").ok(),
        mongo_db_name: get_env_or_default("MONGO_DB_NAME", "advocates"),
        bind_addr: get_env_or_default("BIND_ADDR", "0.0.0.0:3000"),
        static_dir: get_env_or_default("STATIC_DIR", "static"),
    }
});

pub struct Config {
    /// Only required by the MongoDB backend; fixture mode runs without it.
    pub mongo_uri: Option<String>,
    pub mongo_db_name: String,
    pub bind_addr: String,
    pub static_dir: String,
}

impl Config {
    pub fn require_mongo_uri(&self) -> anyhow::Result<&str> {
        self.mongo_uri
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("Missing required environment variable: MONGO_URI"))
    }
}

fn get_env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
