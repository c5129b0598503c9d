//! Runtime settings: API key and upstream endpoints.

use tracing::{debug, warn};

/// Environment variable holding the Elsevier API key
pub const API_KEY_ENV: &str = "SCOPUS_API_KEY";

/// Placeholder key used when the environment does not provide one
pub const DEFAULT_API_KEY: &str = "secret";

/// Elsevier API host (search and serial title endpoints)
pub const ELSEVIER_API_URL: &str = "https://api.elsevier.com";

/// SCImago Journal Rank site
pub const SJR_URL: &str = "https://www.scimagojr.com";

/// Crossref REST API host
pub const CROSSREF_API_URL: &str = "https://api.crossref.org";

/// Base URLs of every upstream service.
///
/// Production hosts by default; tests point all of them at a mock server.
#[derive(Debug, Clone)]
pub struct Endpoints {
    /// Scopus search API host
    pub scopus: String,
    /// Serial title (CiteScore) API host
    pub elsevier: String,
    /// SJR site root
    pub sjr: String,
    /// Crossref API host
    pub crossref: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            scopus: ELSEVIER_API_URL.to_string(),
            elsevier: ELSEVIER_API_URL.to_string(),
            sjr: SJR_URL.to_string(),
            crossref: CROSSREF_API_URL.to_string(),
        }
    }
}

impl Endpoints {
    /// Route every service to one base URL
    pub fn single(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/').to_string();
        Self {
            scopus: base.clone(),
            elsevier: base.clone(),
            sjr: base.clone(),
            crossref: base,
        }
    }
}

/// Settings resolved at startup
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: String,
    pub endpoints: Endpoints,
}

impl Settings {
    /// Load settings from the process environment.
    ///
    /// A `.env` file in the working directory is read first if present.
    pub fn from_env() -> Self {
        match dotenvy::dotenv() {
            Ok(path) => debug!(path = %path.display(), "Loaded .env file"),
            Err(e) if e.not_found() => debug!("No .env file found"),
            Err(e) => warn!(error = %e, "Failed to read .env file"),
        }

        let api_key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .unwrap_or_else(|| {
                warn!("{} not set, using placeholder key", API_KEY_ENV);
                DEFAULT_API_KEY.to_string()
            });

        Self {
            api_key,
            endpoints: Endpoints::default(),
        }
    }
}
