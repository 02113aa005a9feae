use std::env;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub store: StoreBackend,
    pub database: Option<DatabaseConfig>,
    pub swagger: SwaggerConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub max_request_body_size: usize,
}

/// Which catalog store backs the services
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        let store = env::var("CATALOG_STORE")
            .unwrap_or_else(|_| "postgres".to_string())
            .parse::<StoreBackend>()?;

        let database = match store {
            StoreBackend::Postgres => Some(DatabaseConfig::from_env()?),
            StoreBackend::Memory => None,
        };

        Ok(Config {
            app: AppConfig::from_env()?,
            store,
            database,
            swagger: SwaggerConfig::from_env()?,
        })
    }
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(StoreBackend::Postgres),
            "memory" | "mem" => Ok(StoreBackend::Memory),
            other => Err(format!(
                "CATALOG_STORE must be 'postgres' or 'memory', got '{}'",
                other
            )),
        }
    }
}

impl AppConfig {
    const DEFAULT_MAX_REQUEST_BODY_SIZE: usize = 10 * 1024 * 1024; // 10MB

    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        let cors_allowed_origins = parse_origins(
            &env::var("CORS_ALLOWED_ORIGINS").unwrap_or_else(|_| "*".to_string()),
        );

        let max_request_body_size = env::var("MAX_REQUEST_BODY_SIZE")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_REQUEST_BODY_SIZE.to_string())
            .parse::<usize>()
            .map_err(|_| "MAX_REQUEST_BODY_SIZE must be a valid number".to_string())?;

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
            max_request_body_size,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Split a comma-separated origin list, dropping blanks
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl DatabaseConfig {
    // Default values for database connection pool (conservative defaults for small-medium apps)
    const DEFAULT_MAX_CONNECTIONS: u32 = 10;
    const DEFAULT_MIN_CONNECTIONS: u32 = 1;
    const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
    const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600; // 10 minutes
    const DEFAULT_MAX_LIFETIME_SECS: u64 = 1800; // 30 minutes

    pub fn from_env() -> Result<Self, String> {
        let url = env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set".to_string())?;

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MAX_CONNECTIONS must be a valid number".to_string())?;

        let min_connections = env::var("DB_MIN_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MIN_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MIN_CONNECTIONS must be a valid number".to_string())?;

        let acquire_timeout_secs = env::var("DB_ACQUIRE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_ACQUIRE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_ACQUIRE_TIMEOUT_SECS must be a valid number".to_string())?;

        let idle_timeout_secs = env::var("DB_IDLE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_IDLE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_IDLE_TIMEOUT_SECS must be a valid number".to_string())?;

        let max_lifetime_secs = env::var("DB_MAX_LIFETIME_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_LIFETIME_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_MAX_LIFETIME_SECS must be a valid number".to_string())?;

        Ok(Self {
            url,
            max_connections,
            min_connections,
            acquire_timeout_secs,
            idle_timeout_secs,
            max_lifetime_secs,
        })
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        // Only use credentials if they are non-empty
        let username = env::var("SWAGGER_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("SWAGGER_PASSWORD").ok().filter(|s| !s.is_empty());
        let title = env::var("SWAGGER_TITLE").unwrap_or_else(|_| "Doc Catalog API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION")
            .unwrap_or_else(|_| "UI component documentation catalog".to_string());

        Ok(Self {
            username,
            password,
            title,
            version,
            description,
        })
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_backend_parse() {
        assert_eq!("postgres".parse::<StoreBackend>(), Ok(StoreBackend::Postgres));
        assert_eq!(" PG ".parse::<StoreBackend>(), Ok(StoreBackend::Postgres));
        assert_eq!("memory".parse::<StoreBackend>(), Ok(StoreBackend::Memory));
        assert!("sqlite".parse::<StoreBackend>().is_err());
    }

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            parse_origins("http://a.test, http://b.test,,"),
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
        assert_eq!(parse_origins("*"), vec!["*".to_string()]);
    }

    #[test]
    fn test_swagger_credentials_need_both_parts() {
        let mut swagger = SwaggerConfig {
            username: Some("admin".to_string()),
            password: None,
            title: String::new(),
            version: String::new(),
            description: String::new(),
        };
        assert_eq!(swagger.credentials(), None);

        swagger.password = Some("secret".to_string());
        assert_eq!(swagger.credentials(), Some("admin:secret".to_string()));
    }
}
