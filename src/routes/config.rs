//! `/api/config` — runtime site configuration.

use crate::config::{self, SiteConfig};
use crate::prefs::state;
use crate::routes::util::error_span;
use crate::store;

/// Handle GET /api/config — the active configuration as JSON.
pub fn handle_config_get(_query: &str) -> String {
    serde_json::to_string(&config::current()).unwrap_or_else(|_| "{}".to_string())
}

/// Handle POST /api/config
/// Body is a JSON object; omitted fields keep their defaults. Preferences
/// are reloaded so renamed storage keys take effect immediately. A new
/// `flash_delay_ms` applies to the next wrong click in every game, including
/// games created before the change.
pub fn handle_config_post(body: &str) -> String {
    match SiteConfig::from_json(body) {
        Ok(new_config) => {
            config::replace(new_config);
            state::replace_store(store::default_store());
            r#"<span class="text-ok">Configuration applied</span>"#.to_string()
        }
        Err(e) => {
            log::warn!("rejected site config: {}", e);
            error_span(&format!("Invalid configuration: {}", e))
        }
    }
}
