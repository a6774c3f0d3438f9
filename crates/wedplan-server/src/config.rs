//! Server configuration loaded from `WEDPLAN_*` environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;

use wedplan_auth::AuthConfig;
use wedplan_db::DbConfig;

use crate::upload::UploadConfig;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name}: {message}")]
    Invalid { name: &'static str, message: String },

    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} failed to read {path}: {source}")]
    Read {
        name: &'static str,
        path: String,
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub http_addr: SocketAddr,
    pub db: DbConfig,
    pub auth: AuthConfig,
    pub upload: UploadConfig,
    pub log_format: LogFormat,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            db: DbConfig::default(),
            auth: AuthConfig::default(),
            upload: UploadConfig::default(),
            log_format: LogFormat::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but cannot be parsed, or
    /// if no JWT key pair is configured.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to
    /// its raw value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(lookup);
        let mut config = Self::default();

        if let Some(addr) = env.string("WEDPLAN_HTTP_ADDR") {
            config.http_addr = addr.parse().map_err(|e| ConfigError::Invalid {
                name: "WEDPLAN_HTTP_ADDR",
                message: format!("must be host:port: {e}"),
            })?;
        }

        if let Some(url) = env.string("WEDPLAN_DB_URL") {
            config.db.url = url;
        }
        if let Some(namespace) = env.string("WEDPLAN_DB_NAMESPACE") {
            config.db.namespace = namespace;
        }
        if let Some(database) = env.string("WEDPLAN_DB_DATABASE") {
            config.db.database = database;
        }
        if let Some(username) = env.string("WEDPLAN_DB_USERNAME") {
            config.db.username = username;
        }
        if let Some(password) = env.string("WEDPLAN_DB_PASSWORD") {
            config.db.password = password;
        }

        config.auth.jwt_private_key_pem = env
            .pem("WEDPLAN_JWT_PRIVATE_KEY_PEM", "WEDPLAN_JWT_PRIVATE_KEY_PATH")?
            .ok_or(ConfigError::Missing("WEDPLAN_JWT_PRIVATE_KEY_PEM"))?;
        config.auth.jwt_public_key_pem = env
            .pem("WEDPLAN_JWT_PUBLIC_KEY_PEM", "WEDPLAN_JWT_PUBLIC_KEY_PATH")?
            .ok_or(ConfigError::Missing("WEDPLAN_JWT_PUBLIC_KEY_PEM"))?;
        if let Some(issuer) = env.string("WEDPLAN_JWT_ISSUER") {
            config.auth.jwt_issuer = issuer;
        }
        if let Some(secs) = env.u64("WEDPLAN_TOKEN_LIFETIME_SECS")? {
            config.auth.token_lifetime_secs = secs;
        }
        config.auth.pepper = env.string("WEDPLAN_PASSWORD_PEPPER");
        if let Some(allow) = env.bool("WEDPLAN_ALLOW_ADMIN_REGISTRATION")? {
            config.auth.allow_admin_registration = allow;
        }

        if let Some(dir) = env.string("WEDPLAN_UPLOAD_DIR") {
            config.upload.dir = PathBuf::from(dir);
        }
        if let Some(max) = env.u64("WEDPLAN_MAX_UPLOAD_BYTES")? {
            config.upload.max_bytes = usize::try_from(max).map_err(|_| ConfigError::Invalid {
                name: "WEDPLAN_MAX_UPLOAD_BYTES",
                message: "does not fit in memory".into(),
            })?;
        }

        if let Some(format) = env.string("WEDPLAN_LOG_FORMAT") {
            config.log_format = parse_log_format(&format)?;
        }

        Ok(config)
    }
}

struct Env<F>(F);

impl<F: Fn(&str) -> Option<String>> Env<F> {
    fn string(&self, name: &str) -> Option<String> {
        (self.0)(name).and_then(|v| {
            let trimmed = v.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
    }

    fn u64(&self, name: &'static str) -> Result<Option<u64>, ConfigError> {
        let Some(v) = self.string(name) else {
            return Ok(None);
        };
        v.parse::<u64>().map(Some).map_err(|e| ConfigError::Invalid {
            name,
            message: format!("must be a u64: {e}"),
        })
    }

    fn bool(&self, name: &'static str) -> Result<Option<bool>, ConfigError> {
        let Some(v) = self.string(name) else {
            return Ok(None);
        };
        parse_bool(name, &v).map(Some)
    }

    /// Inline PEM wins over a path; setting both is an error.
    fn pem(
        &self,
        inline_name: &'static str,
        path_name: &'static str,
    ) -> Result<Option<String>, ConfigError> {
        let inline = self.string(inline_name).map(|pem| normalize_pem(&pem));
        let Some(path) = self.string(path_name) else {
            return Ok(inline);
        };
        if inline.is_some() {
            return Err(ConfigError::Invalid {
                name: path_name,
                message: format!("cannot be set with {inline_name}"),
            });
        }
        let pem = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            name: path_name,
            path,
            source,
        })?;
        Ok(Some(normalize_pem(&pem)))
    }
}

/// Accept PEMs whose newlines were escaped to fit in one variable.
fn normalize_pem(pem: &str) -> String {
    pem.replace("\\n", "\n")
}

fn parse_bool(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => Ok(true),
        "false" | "0" | "no" | "n" => Ok(false),
        _ => Err(ConfigError::Invalid {
            name,
            message: "must be a boolean (true/false/1/0)".into(),
        }),
    }
}

fn parse_log_format(value: &str) -> Result<LogFormat, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "json" => Ok(LogFormat::Json),
        "pretty" => Ok(LogFormat::Pretty),
        other => Err(ConfigError::Invalid {
            name: "WEDPLAN_LOG_FORMAT",
            message: format!("must be json or pretty (got {other})"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    const KEYS: [(&str, &str); 2] = [
        ("WEDPLAN_JWT_PRIVATE_KEY_PEM", "private"),
        ("WEDPLAN_JWT_PUBLIC_KEY_PEM", "public"),
    ];

    #[test]
    fn defaults_apply_when_only_keys_are_set() {
        let config = ServerConfig::from_lookup(lookup(&KEYS)).unwrap();

        assert_eq!(config.http_addr.port(), 3000);
        assert_eq!(config.db.namespace, "wedplan");
        assert_eq!(config.auth.token_lifetime_secs, 31_536_000);
        assert_eq!(config.auth.min_password_length, 8);
        assert!(!config.auth.allow_admin_registration);
        assert_eq!(config.upload.max_bytes, 5 * 1024 * 1024);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn variables_override_defaults() {
        let mut pairs = KEYS.to_vec();
        pairs.extend([
            ("WEDPLAN_HTTP_ADDR", "127.0.0.1:8080"),
            ("WEDPLAN_DB_URL", "mem://"),
            ("WEDPLAN_TOKEN_LIFETIME_SECS", "3600"),
            ("WEDPLAN_PASSWORD_PEPPER", "  lada  "),
            ("WEDPLAN_ALLOW_ADMIN_REGISTRATION", "yes"),
            ("WEDPLAN_UPLOAD_DIR", "/var/lib/wedplan/uploads"),
            ("WEDPLAN_LOG_FORMAT", "Pretty"),
        ]);
        let config = ServerConfig::from_lookup(lookup(&pairs)).unwrap();

        assert_eq!(config.http_addr, "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(config.db.url, "mem://");
        assert_eq!(config.auth.token_lifetime_secs, 3600);
        assert_eq!(config.auth.pepper.as_deref(), Some("lada"));
        assert!(config.auth.allow_admin_registration);
        assert_eq!(config.upload.dir, PathBuf::from("/var/lib/wedplan/uploads"));
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn missing_keys_are_reported() {
        let err = ServerConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("WEDPLAN_JWT_PRIVATE_KEY_PEM")));
    }

    #[test]
    fn inline_pem_and_path_conflict() {
        let mut pairs = KEYS.to_vec();
        pairs.push(("WEDPLAN_JWT_PUBLIC_KEY_PATH", "/etc/wedplan/public.pem"));
        assert!(matches!(
            ServerConfig::from_lookup(lookup(&pairs)),
            Err(ConfigError::Invalid { name: "WEDPLAN_JWT_PUBLIC_KEY_PATH", .. })
        ));
    }

    #[test]
    fn escaped_newlines_in_pem_are_restored() {
        let pairs = [
            ("WEDPLAN_JWT_PRIVATE_KEY_PEM", "-----BEGIN-----\\nabc\\n-----END-----"),
            ("WEDPLAN_JWT_PUBLIC_KEY_PEM", "public"),
        ];
        let config = ServerConfig::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(config.auth.jwt_private_key_pem, "-----BEGIN-----\nabc\n-----END-----");
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        let mut pairs = KEYS.to_vec();
        pairs.push(("WEDPLAN_MAX_UPLOAD_BYTES", "five megabytes"));
        assert!(ServerConfig::from_lookup(lookup(&pairs)).is_err());
    }

    #[test]
    fn parse_bool_accepts_common_spellings() {
        assert!(parse_bool("TEST", "TRUE").unwrap());
        assert!(parse_bool("TEST", "1").unwrap());
        assert!(!parse_bool("TEST", "no").unwrap());
        assert!(parse_bool("TEST", "maybe").is_err());
    }
}
