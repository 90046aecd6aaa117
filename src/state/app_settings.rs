use crate::route::Route;
use log::LevelFilter;
use tourney_api::client::DEFAULT_BASE_URL;

pub const API_URL_ENV: &str = "TOURNEY_API_URL";
pub const LOG_LEVEL_ENV: &str = "TOURNEY_LOG";

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub api_base_url: String,
    pub full_screen: bool,
    pub log_level: LevelFilter,
    pub start_route: Route,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            full_screen: false,
            log_level: LevelFilter::Info,
            start_route: Route::default(),
        }
    }
}

impl AppSettings {
    /// Defaults overridden by the environment.
    pub fn load() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = Self::default();
        if let Some(url) = lookup(API_URL_ENV).filter(|url| !url.trim().is_empty()) {
            settings.api_base_url = url.trim().to_string();
        }
        if let Some(level) = lookup(LOG_LEVEL_ENV).and_then(|raw| raw.trim().parse().ok()) {
            settings.log_level = level;
        }
        settings
    }
}
