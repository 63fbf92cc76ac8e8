use std::path::PathBuf;

/// Which browser origins may call the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedOrigins {
    /// `*`: any origin.
    Any,
    /// Exact-match allow-list.
    List(Vec<String>),
}

#[derive(Clone)]
pub struct Config {
    pub port: u16,
    pub allowed_origins: AllowedOrigins,
    /// Shared secret for admin routes; `None` disables them.
    pub admin_key: Option<String>,
    /// SQLite file backing the survey store.
    pub db_path: PathBuf,
    /// Take the client address from `X-Forwarded-For` / `X-Real-IP`.
    pub trust_proxy: bool,
}

// Hand-written so the admin key never ends up in logs.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("allowed_origins", &self.allowed_origins)
            .field("admin_key", &self.admin_key.as_ref().map(|_| "<set>"))
            .field("db_path", &self.db_path)
            .field("trust_proxy", &self.trust_proxy)
            .finish()
    }
}

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DB_PATH: &str = "./data/surveys.db";

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self::from_vars(|key| std::env::var(key).ok())?;

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Server Port: {}", config.port);
        tracing::debug!("Database path: {}", config.db_path.display());
        tracing::debug!("Allowed origins: {:?}", config.allowed_origins);
        tracing::debug!("Trust proxy headers: {}", config.trust_proxy);
        if config.admin_key.is_none() {
            tracing::warn!("ADMIN_KEY not set; admin routes will answer 501");
        }

        Ok(config)
    }

    /// Builds the configuration from a variable lookup, applying defaults.
    pub fn from_vars<F>(var: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            port: match non_blank("PORT") {
                Some(port) => port
                    .trim()
                    .parse()
                    .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
                None => DEFAULT_PORT,
            },
            allowed_origins: parse_origins(non_blank("ALLOWED_ORIGINS").as_deref()),
            admin_key: non_blank("ADMIN_KEY"),
            db_path: non_blank("DB_PATH")
                .map(|p| PathBuf::from(p.trim()))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH)),
            trust_proxy: match non_blank("TRUST_PROXY") {
                Some(flag) => parse_flag(&flag)
                    .ok_or_else(|| anyhow::anyhow!("TRUST_PROXY must be true or false"))?,
                None => false,
            },
        })
    }
}

/// `None` or `*` means any origin; otherwise a comma-separated list.
fn parse_origins(raw: Option<&str>) -> AllowedOrigins {
    let Some(raw) = raw else {
        return AllowedOrigins::Any;
    };
    if raw.trim() == "*" {
        return AllowedOrigins::Any;
    }

    AllowedOrigins::List(
        raw.split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect(),
    )
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
