use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    /// Missing secret is not fatal at startup: the auth gate answers 500 instead.
    pub jwt_secret: Option<String>,
    pub jwt_expiry_seconds: u64,
    pub host: String,
    pub port: u16,
    pub app_env: String,
    pub cors_origin: Option<String>,
    pub selection_cutoff_hour: u32,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let selection_cutoff_hour: u32 = env::var("SELECTION_CUTOFF_HOUR")
            .unwrap_or_else(|_| "22".into())
            .parse()?;
        anyhow::ensure!(
            selection_cutoff_hour < 24,
            "SELECTION_CUTOFF_HOUR must be between 0 and 23, got {selection_cutoff_hour}"
        );

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            redis_url: env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".into()),
            jwt_secret: env::var("JWT_SECRET").ok().filter(|s| !s.is_empty()),
            jwt_expiry_seconds: env::var("JWT_EXPIRY_SECONDS")
                .unwrap_or_else(|_| "3600".into())
                .parse()?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "5000".into())
                .parse()?,
            app_env: env::var("APP_ENV").unwrap_or_else(|_| "development".into()),
            cors_origin: env::var("CORS_ORIGIN").ok().filter(|s| !s.is_empty()),
            selection_cutoff_hour,
        })
    }

    pub fn is_production(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("production")
    }
}

fn required(key: &str) -> anyhow::Result<String> {
    env::var(key).map_err(|_| anyhow::anyhow!("Missing required env var: {}", key))
}
