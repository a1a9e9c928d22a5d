//! Chemistry-site in-browser WASM server.
//!
//! Exports `handle_request(method, path, query, body)` for the page bridge
//! to call. Uses `matchit` for URL routing — the same router engine that
//! powers Axum. Every handler returns an HTML fragment for HTMX to swap in.
//!
//! Preferences (theme, font size, learned experiments) persist through
//! `localStorage`; step-order games, quiz mode and equation practice live in
//! WASM memory for the lifetime of the page.

use wasm_bindgen::prelude::*;

pub mod config;
pub mod game;
pub mod prefs;
pub mod routes;
pub mod store;
pub mod study;

/// Module start: route `log` records to the browser console and report
/// panics there too.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
}

/// Process an HTTP-like request and return an HTML fragment.
///
/// Called from JavaScript via wasm-bindgen.
///
/// # Arguments
/// * `method` — HTTP method (e.g., "GET", "POST")
/// * `path`   — URL path (e.g., "/api/prefs/theme")
/// * `query`  — Query string (e.g., "?total=8")
/// * `body`   — Request body (POST form data, or JSON for `/api/config`).
///   Empty string for GET requests.
#[wasm_bindgen]
pub fn handle_request(method: &str, path: &str, query: &str, body: &str) -> String {
    // Build the router. matchit compiles route patterns into a radix tree.
    let mut router = matchit::Router::new();

    router.insert("/api/config", "config").ok();

    // Preferences
    router.insert("/api/prefs/init", "prefs_init").ok();
    router.insert("/api/prefs/theme", "prefs_theme").ok();
    router.insert("/api/prefs/font", "prefs_font").ok();

    // Learning progress
    router.insert("/api/learned/progress", "learned_progress").ok();
    router.insert("/api/learned/badge", "learned_badge").ok();
    router.insert("/api/learned/button", "learned_button").ok();
    router.insert("/api/learned/toggle", "learned_toggle").ok();

    // Step-ordering game
    router.insert("/api/step-order/init", "step_init").ok();
    router.insert("/api/step-order/board", "step_board").ok();
    router.insert("/api/step-order/click", "step_click").ok();
    router.insert("/api/step-order/tick", "step_tick").ok();
    router.insert("/api/step-order/reset", "step_reset").ok();
    router.insert("/api/step-order/why", "step_why").ok();

    // Study modes
    router.insert("/api/quiz", "quiz").ok();
    router.insert("/api/equation", "equation").ok();
    router.insert("/api/equation/register", "equation_register").ok();
    router.insert("/api/equation/button", "equation_button").ok();

    match router.at(path) {
        Ok(matched) => match (*matched.value, method) {
            ("config", "GET") => routes::config::handle_config_get(query),
            ("config", "POST") => routes::config::handle_config_post(body),

            ("prefs_init", "GET") => routes::prefs::handle_init_get(query),
            ("prefs_theme", "GET") => routes::prefs::handle_theme_get(query),
            ("prefs_theme", "POST") => routes::prefs::handle_theme_post(body),
            ("prefs_font", "GET") => routes::prefs::handle_font_get(query),
            ("prefs_font", "POST") => routes::prefs::handle_font_post(body),

            ("learned_progress", "GET") => routes::learned::handle_progress_get(query),
            ("learned_badge", "GET") => routes::learned::handle_badge_get(query),
            ("learned_button", "GET") => routes::learned::handle_button_get(query),
            ("learned_toggle", "POST") => routes::learned::handle_toggle_post(body),

            ("step_init", "POST") => routes::step_order::handle_init_post(body),
            ("step_board", "GET") => routes::step_order::handle_board_get(query),
            ("step_click", "POST") => routes::step_order::handle_click_post(body),
            ("step_tick", "POST") => routes::step_order::handle_tick_post(body),
            ("step_reset", "POST") => routes::step_order::handle_reset_post(body),
            ("step_why", "POST") => routes::step_order::handle_why_post(body),

            ("quiz", "GET") => routes::study::handle_quiz_get(query),
            ("quiz", "POST") => routes::study::handle_quiz_post(body),
            ("equation", "POST") => routes::study::handle_equation_post(body),
            ("equation_register", "POST") => routes::study::handle_register_post(body),
            ("equation_button", "GET") => routes::study::handle_button_get(query),

            _ => method_not_allowed(),
        },
        Err(_) => not_found(),
    }
}

fn not_found() -> String {
    r#"<span class="text-error">404 — route not found</span>"#.to_string()
}

fn method_not_allowed() -> String {
    r#"<span class="text-error">405 — method not allowed</span>"#.to_string()
}
