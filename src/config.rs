use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

/// Settings for the remote document store that mirrors plans and users.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteConfig {
    pub base_url: String,
    pub plans_collection: String,
    pub users_collection: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub catalog_csv: String,
    pub jwt: JwtConfig,
    pub remote: RemoteConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://smartwellness.db".into());
        let catalog_csv = std::env::var("CATALOG_CSV")
            .unwrap_or_else(|_| "./assets/lebensmittelliste.csv".into());
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "smartwellness".into()),
            audience: std::env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| "smartwellness-users".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60),
            refresh_ttl_minutes: std::env::var("JWT_REFRESH_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24 * 14),
        };
        let remote = RemoteConfig {
            base_url: std::env::var("REMOTE_BASE_URL")?,
            plans_collection: std::env::var("REMOTE_PLANS_COLLECTION")
                .unwrap_or_else(|_| "tagesplaene".into()),
            users_collection: std::env::var("REMOTE_USERS_COLLECTION")
                .unwrap_or_else(|_| "users".into()),
        };
        Ok(Self {
            database_url,
            catalog_csv,
            jwt,
            remote,
        })
    }
}
