use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use crate::error::{AppError, Result};

const DEFAULT_ALLOWED_ORIGINS: &[&str] = &[
    "http://localhost:9002",
    "https://surveyai.rosystems.net",
];

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: SocketAddr,
    pub openai: OpenAiConfig,
    pub database: DatabaseConfig,
    pub allowed_origins: Vec<String>,
}

#[derive(Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

#[derive(Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
}

const REDACTED: &str = "<redacted>";

impl fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &REDACTED)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &REDACTED)
            .field("name", &self.name)
            .finish()
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        // Hosted deployments inject their environment; only local runs read .env
        if env::var("VERCEL").is_err() {
            dotenv::dotenv().ok();
        }

        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key).ok_or_else(|| AppError::Config(format!("{} is not set", key)))
        };

        let openai = OpenAiConfig {
            api_key: required("OPENAI_API_KEY")?,
            model: lookup("OPENAI_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_string()),
            base_url: lookup("OPENAI_BASE_URL")
                .unwrap_or_else(|| "https://api.openai.com/v1".to_string())
                .trim_end_matches('/')
                .to_string(),
        };

        let db_port = lookup("DB_PORT").unwrap_or_else(|| "3306".to_string());
        let database = DatabaseConfig {
            host: required("DB_HOST")?,
            port: db_port
                .parse::<u16>()
                .map_err(|e| AppError::Config(format!("Invalid DB_PORT: {}", e)))?,
            user: required("DB_USER")?,
            password: required("DB_PASSWORD")?,
            name: required("DB_NAME")?,
        };

        let allowed_origins = match lookup("ALLOWED_ORIGINS") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(String::from)
                .collect(),
            None => DEFAULT_ALLOWED_ORIGINS.iter().map(|o| o.to_string()).collect(),
        };

        // Load server configuration with defaults
        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = lookup("PORT").unwrap_or_else(|| "3000".to_string());
        let port = port.parse::<u16>().map_err(|e| AppError::Config(format!("Invalid port: {}", e)))?;
        let ip = IpAddr::from_str(&host).map_err(|e| AppError::Config(format!("Invalid host address: {}", e)))?;

        Ok(Config {
            server_addr: SocketAddr::new(ip, port),
            openai,
            database,
            allowed_origins,
        })
    }
}
