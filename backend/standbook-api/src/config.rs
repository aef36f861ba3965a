use std::env;
use std::path::PathBuf;

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub admin_username: String,
    pub admin_password: String,
    pub seed_file: Option<PathBuf>,
    pub bcrypt_cost: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8000,
            jwt_secret: "your-secret-key-change-in-production".to_string(),
            jwt_expiration: 3600,
            admin_username: "muhasebe".to_string(),
            admin_password: "1234".to_string(),
            seed_file: None,
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();
        let (admin_username, admin_password) = admin_credentials(
            env::var("ADMIN_USERNAME").ok(),
            env::var("ADMIN_PASSWORD").ok(),
            &defaults,
        );
        Ok(Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            jwt_secret: env::var("JWT_SECRET").unwrap_or(defaults.jwt_secret),
            jwt_expiration: env::var("JWT_EXPIRATION")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.jwt_expiration),
            admin_username,
            admin_password,
            seed_file: env::var("SEED_FILE").ok().filter(|s| !s.is_empty()).map(PathBuf::from),
            bcrypt_cost: env::var("BCRYPT_COST")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.bcrypt_cost),
        })
    }
}

/// Login user from the environment. Missing values fall back to the development account, loudly.
fn admin_credentials(username: Option<String>, password: Option<String>, defaults: &Config) -> (String, String) {
    let username = username.filter(|u| !u.trim().is_empty());
    let password = password.filter(|p| !p.is_empty());
    if username.is_none() || password.is_none() {
        tracing::warn!(
            "ADMIN_USERNAME/ADMIN_PASSWORD not set, falling back to the development login; set both outside local use"
        );
    }
    (
        username.unwrap_or_else(|| defaults.admin_username.clone()),
        password.unwrap_or_else(|| defaults.admin_password.clone()),
    )
}
