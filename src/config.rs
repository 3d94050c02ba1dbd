use std::env;
use std::path::PathBuf;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_DAILY_LIMIT: u32 = 50;
pub const DEFAULT_STORE_PATH: &str = ".photomagic/store.json";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub base_url: String,
    pub image_model: String,
    pub text_model: String,
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        GeminiConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl GeminiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        GeminiConfig {
            base_url: env::var("GEMINI_BASE_URL").unwrap_or(defaults.base_url),
            image_model: env::var("GEMINI_IMAGE_MODEL").unwrap_or(defaults.image_model),
            text_model: env::var("GEMINI_TEXT_MODEL").unwrap_or(defaults.text_model),
            timeout_secs: env::var("PMK_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.timeout_secs),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_models(
        mut self,
        image_model: impl Into<String>,
        text_model: impl Into<String>,
    ) -> Self {
        self.image_model = image_model.into();
        self.text_model = text_model.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub gemini: GeminiConfig,
    /// Key used when nothing has been saved in the store.
    pub default_api_key: Option<String>,
    /// Advisory ceiling; `None` turns the counter off.
    pub daily_limit: Option<u32>,
    pub store_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            gemini: GeminiConfig::default(),
            default_api_key: None,
            daily_limit: Some(DEFAULT_DAILY_LIMIT),
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let default_api_key = env::var("GEMINI_API_KEY")
            .or_else(|_| env::var("API_KEY"))
            .ok()
            .filter(|k| !k.trim().is_empty());

        let daily_limit = match env::var("PMK_DAILY_LIMIT").ok().and_then(|s| s.parse().ok()) {
            Some(0) => None,
            Some(limit) => Some(limit),
            None => Some(DEFAULT_DAILY_LIMIT),
        };

        let store_path = env::var("PMK_STORE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_STORE_PATH));

        Config {
            gemini: GeminiConfig::from_env(),
            default_api_key,
            daily_limit,
            store_path,
        }
    }

    pub fn with_gemini(mut self, config: GeminiConfig) -> Self {
        self.gemini = config;
        self
    }

    pub fn with_default_api_key(mut self, key: impl Into<String>) -> Self {
        self.default_api_key = Some(key.into());
        self
    }

    pub fn with_daily_limit(mut self, limit: Option<u32>) -> Self {
        self.daily_limit = limit;
        self
    }

    pub fn with_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_path = path.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_gemini() {
        let config = Config::new();
        assert_eq!(config.gemini.image_model, DEFAULT_IMAGE_MODEL);
        assert_eq!(config.gemini.text_model, DEFAULT_TEXT_MODEL);
        assert_eq!(config.daily_limit, Some(DEFAULT_DAILY_LIMIT));
        assert!(config.default_api_key.is_none());
    }

    #[test]
    fn builders_override_fields() {
        let config = Config::new()
            .with_default_api_key("AIza-test")
            .with_daily_limit(None)
            .with_gemini(GeminiConfig::new().with_base_url("http://localhost:9999").with_timeout(5));
        assert_eq!(config.default_api_key.as_deref(), Some("AIza-test"));
        assert_eq!(config.daily_limit, None);
        assert_eq!(config.gemini.base_url, "http://localhost:9999");
        assert_eq!(config.gemini.timeout_secs, 5);
    }
}
