//! Site configuration — storage key names and timing constants.
//!
//! Defaults match the keys the static site has always written to
//! `localStorage`, so existing visitors keep their preferences. Pages may
//! override any field by posting a JSON object to `/api/config`.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;

/// Errors raised while parsing a configuration document.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid site config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("flash delay must be greater than zero")]
    ZeroFlashDelay,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Storage key for the theme preference.
    pub theme_key: String,
    /// Storage key for the font-size preference.
    pub font_key: String,
    /// Storage key for the learned-experiment list.
    pub learned_key: String,
    /// How long a wrong step-order chip stays flagged before reverting.
    pub flash_delay_ms: u64,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            theme_key: "chem_theme".to_string(),
            font_key: "chem_fontsize".to_string(),
            learned_key: "chem_learned".to_string(),
            flash_delay_ms: 500,
        }
    }
}

impl SiteConfig {
    /// Parse a (possibly partial) JSON configuration. Missing fields keep
    /// their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SiteConfig = serde_json::from_str(json)?;
        if config.flash_delay_ms == 0 {
            return Err(ConfigError::ZeroFlashDelay);
        }
        Ok(config)
    }
}

thread_local! {
    static CONFIG: RefCell<SiteConfig> = RefCell::new(SiteConfig::default());
}

/// Snapshot of the active configuration.
pub fn current() -> SiteConfig {
    CONFIG.with(|c| c.borrow().clone())
}

/// Replace the active configuration.
pub fn replace(config: SiteConfig) {
    log::info!("site config replaced: {:?}", config);
    CONFIG.with(|c| *c.borrow_mut() = config);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_site_keys() {
        let c = SiteConfig::default();
        assert_eq!(c.theme_key, "chem_theme");
        assert_eq!(c.font_key, "chem_fontsize");
        assert_eq!(c.learned_key, "chem_learned");
        assert_eq!(c.flash_delay_ms, 500);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let c = SiteConfig::from_json(r#"{"flash_delay_ms":750}"#).unwrap();
        assert_eq!(c.flash_delay_ms, 750);
        assert_eq!(c.theme_key, "chem_theme");
    }

    #[test]
    fn rejects_zero_delay() {
        let err = SiteConfig::from_json(r#"{"flash_delay_ms":0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroFlashDelay));
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            SiteConfig::from_json("not json"),
            Err(ConfigError::Json(_))
        ));
    }
}
