use anyhow::Context;
use zeroize::Zeroizing;

/// Process-wide settings, read once at startup and passed into constructors.
pub struct Config {
    /// Server secret used to salt secret-link signatures. Never logged.
    pub secret: Zeroizing<String>,
    pub database_url: String,
    pub search: SearchCredentials,
    /// Scheme used when building absolute links (`http` or `https`).
    pub protocol: String,
}

/// What `export-pages` needs: the page store and the search service.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub database_url: String,
    pub search: SearchCredentials,
}

/// Credentials for the hosted search service.
#[derive(Clone, Default)]
pub struct SearchCredentials {
    pub app_id: Option<String>,
    /// Admin key used for index writes. Server side only.
    pub api_key: Option<String>,
    /// Search-only key handed to browsers for the search bar. Nothing in
    /// this crate reads it; the HTTP layer passes it to page templates.
    pub search_key: Option<String>,
}

impl SearchCredentials {
    /// Returns `(app_id, api_key)` when both are configured and non-empty.
    pub fn admin(&self) -> Option<(&str, &str)> {
        match (self.app_id.as_deref(), self.api_key.as_deref()) {
            (Some(app), Some(key)) if !app.is_empty() && !key.is_empty() => Some((app, key)),
            _ => None,
        }
    }

    /// Returns `(app_id, search_key)` for client-side search. Safe to expose
    /// to browsers, unlike [`SearchCredentials::admin`].
    pub fn public(&self) -> Option<(&str, &str)> {
        match (self.app_id.as_deref(), self.search_key.as_deref()) {
            (Some(app), Some(key)) if !app.is_empty() && !key.is_empty() => Some((app, key)),
            _ => None,
        }
    }
}

impl std::fmt::Debug for SearchCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchCredentials")
            .field("app_id", &self.app_id)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("search_key", &self.search_key)
            .finish()
    }
}

impl Config {
    /// Base URL for links sent by email, e.g. `https://example.org`.
    pub fn base_url(&self, host: &str) -> String {
        format!("{}://{}", self.protocol, host)
    }
}

pub fn load() -> anyhow::Result<Config> {
    dotenvy::dotenv().ok();
    from_lookup(|key| std::env::var(key).ok())
}

/// Settings for the index export only. Does not require `SECRET`.
pub fn load_export() -> ExportConfig {
    dotenvy::dotenv().ok();
    export_from_lookup(|key| std::env::var(key).ok())
}

/// Build a [`Config`] from an arbitrary key lookup. `load()` uses the process
/// environment; tests pass a map.
pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    // the secret is a KDF salt and is used byte for byte, never trimmed
    let secret = lookup("SECRET")
        .filter(|v| !v.trim().is_empty())
        .context("SECRET is not set; secret links cannot be signed without it")?;

    let protocol = trimmed(&lookup, "PROTOCOL").unwrap_or_else(|| "https".into());
    let ExportConfig {
        database_url,
        search,
    } = export_from_lookup(lookup);

    Ok(Config {
        secret: Zeroizing::new(secret),
        database_url,
        search,
        protocol,
    })
}

pub fn export_from_lookup<F>(lookup: F) -> ExportConfig
where
    F: Fn(&str) -> Option<String>,
{
    let search = SearchCredentials {
        app_id: trimmed(&lookup, "ALGOLIASEARCH_APPLICATION_ID"),
        api_key: trimmed(&lookup, "ALGOLIASEARCH_API_KEY"),
        search_key: trimmed(&lookup, "ALGOLIASEARCH_SEARCH_KEY"),
    };
    if search.admin().is_none() {
        tracing::warn!("Algolia credentials not set, search index sync is disabled");
    }

    ExportConfig {
        database_url: trimmed(&lookup, "DATABASE_URL")
            .unwrap_or_else(|| "postgres://localhost/directory".into()),
        search,
    }
}

fn trimmed<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_missing_secret_is_an_error() {
        let err = from_lookup(lookup(&[("DATABASE_URL", "postgres://db/x")])).err().unwrap();
        assert!(err.to_string().contains("SECRET"));
    }

    #[test]
    fn test_blank_secret_is_an_error() {
        assert!(from_lookup(lookup(&[("SECRET", "   ")])).is_err());
    }

    #[test]
    fn test_secret_is_kept_byte_for_byte() {
        let cfg = from_lookup(lookup(&[("SECRET", "  s3cr3t\t")])).unwrap();
        assert_eq!(cfg.secret.as_str(), "  s3cr3t\t");
    }

    #[test]
    fn test_export_settings_without_secret() {
        let cfg = export_from_lookup(lookup(&[
            ("DATABASE_URL", " postgres://db/directory "),
            ("ALGOLIASEARCH_APPLICATION_ID", "APP123"),
            ("ALGOLIASEARCH_API_KEY", "admin-key"),
        ]));
        assert_eq!(cfg.database_url, "postgres://db/directory");
        assert_eq!(cfg.search.admin(), Some(("APP123", "admin-key")));
    }

    #[test]
    fn test_defaults() {
        let cfg = from_lookup(lookup(&[("SECRET", "s3cr3t")])).unwrap();
        assert_eq!(cfg.secret.as_str(), "s3cr3t");
        assert_eq!(cfg.protocol, "https");
        assert_eq!(cfg.database_url, "postgres://localhost/directory");
        assert!(cfg.search.admin().is_none());
        assert_eq!(cfg.base_url("example.org"), "https://example.org");
    }

    #[test]
    fn test_search_credentials() {
        let cfg = from_lookup(lookup(&[
            ("SECRET", "s3cr3t"),
            ("ALGOLIASEARCH_APPLICATION_ID", "APP123"),
            ("ALGOLIASEARCH_API_KEY", "admin-key"),
            ("ALGOLIASEARCH_SEARCH_KEY", "search-key"),
        ]))
        .unwrap();
        assert_eq!(cfg.search.admin(), Some(("APP123", "admin-key")));
        assert_eq!(cfg.search.public(), Some(("APP123", "search-key")));
    }

    #[test]
    fn test_partial_credentials_disable_admin() {
        let creds = SearchCredentials {
            app_id: Some("APP123".into()),
            api_key: None,
            search_key: None,
        };
        assert!(creds.admin().is_none());
    }

    #[test]
    fn test_debug_redacts_admin_key() {
        let creds = SearchCredentials {
            app_id: Some("APP123".into()),
            api_key: Some("super-secret-admin".into()),
            search_key: None,
        };
        let dbg = format!("{:?}", creds);
        assert!(!dbg.contains("super-secret-admin"));
        assert!(dbg.contains("<redacted>"));
    }
}
