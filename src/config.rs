//! Environment-driven configuration
use anyhow::Context;

#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub auth: AuthProviderSettings,
    /// Shared secret guarding the internal admin endpoints; unset means those
    /// endpoints refuse all requests
    pub internal_api_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

/// Credentials and endpoints for the GoTrue-compatible auth provider
#[derive(Debug, Clone)]
pub struct AuthProviderSettings {
    pub base_url: String,
    pub anon_key: String,
    pub service_role_key: String,
    /// Fallback OAuth redirect target when the request supplies none
    pub default_redirect_url: Option<String>,
}

impl Settings {
    pub fn load() -> anyhow::Result<Self> {
        #[cfg(debug_assertions)]
        dotenvy::dotenv().ok();

        Self::from_env()
    }

    pub fn from_env() -> anyhow::Result<Self> {
        let server = ServerSettings {
            host: std::env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("SERVER_PORT must be a port number")?,
        };

        let database = DatabaseSettings {
            url: std::env::var("DATABASE_URL").context("DATABASE_URL is required")?,
            max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("DATABASE_MAX_CONNECTIONS must be a number")?,
            acquire_timeout_secs: std::env::var("DATABASE_ACQUIRE_TIMEOUT_SECS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .context("DATABASE_ACQUIRE_TIMEOUT_SECS must be a number")?,
        };

        let auth = AuthProviderSettings {
            base_url: std::env::var("AUTH_BASE_URL").context("AUTH_BASE_URL is required")?,
            anon_key: std::env::var("AUTH_ANON_KEY").context("AUTH_ANON_KEY is required")?,
            service_role_key: std::env::var("AUTH_SERVICE_ROLE_KEY")
                .context("AUTH_SERVICE_ROLE_KEY is required")?,
            default_redirect_url: std::env::var("AUTH_DEFAULT_REDIRECT_URL").ok(),
        };

        Ok(Self {
            server,
            database,
            auth,
            internal_api_key: std::env::var("INTERNAL_API_KEY").ok(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn set_required_vars() {
        std::env::set_var("DATABASE_URL", "postgres://localhost/accounts");
        std::env::set_var("AUTH_BASE_URL", "https://auth.example.test/auth/v1");
        std::env::set_var("AUTH_ANON_KEY", "anon");
        std::env::set_var("AUTH_SERVICE_ROLE_KEY", "service");
    }

    fn clear_vars() {
        for key in [
            "SERVER_HOST",
            "SERVER_PORT",
            "DATABASE_URL",
            "DATABASE_MAX_CONNECTIONS",
            "DATABASE_ACQUIRE_TIMEOUT_SECS",
            "AUTH_BASE_URL",
            "AUTH_ANON_KEY",
            "AUTH_SERVICE_ROLE_KEY",
            "AUTH_DEFAULT_REDIRECT_URL",
            "INTERNAL_API_KEY",
        ] {
            std::env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn defaults_fill_the_optional_fields() {
        clear_vars();
        set_required_vars();

        let settings = Settings::from_env().unwrap();
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.database.max_connections, 10);
        assert!(settings.internal_api_key.is_none());
        assert!(settings.auth.default_redirect_url.is_none());

        clear_vars();
    }

    #[test]
    #[serial]
    fn missing_database_url_is_an_error() {
        clear_vars();
        std::env::set_var("AUTH_BASE_URL", "https://auth.example.test/auth/v1");
        std::env::set_var("AUTH_ANON_KEY", "anon");
        std::env::set_var("AUTH_SERVICE_ROLE_KEY", "service");

        let err = Settings::from_env().unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));

        clear_vars();
    }

    #[test]
    #[serial]
    fn explicit_values_override_the_defaults() {
        clear_vars();
        set_required_vars();
        std::env::set_var("SERVER_PORT", "9001");
        std::env::set_var("INTERNAL_API_KEY", "secret");

        let settings = Settings::from_env().unwrap();
        assert_eq!(settings.server.port, 9001);
        assert_eq!(settings.internal_api_key.as_deref(), Some("secret"));

        clear_vars();
    }
}
