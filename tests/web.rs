//! Browser tests: run with `wasm-pack test --headless --firefox`.

#![cfg(target_arch = "wasm32")]

use chem_site_server::handle_request;
use chem_site_server::prefs::state;
use chem_site_server::store::{BrowserStore, KeyValueStore};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn theme_persists_to_local_storage() {
    state::replace_store(Box::new(BrowserStore));
    handle_request("POST", "/api/prefs/theme", "", "theme=light");
    assert_eq!(
        BrowserStore.get("chem_theme").unwrap().as_deref(),
        Some("light")
    );
    handle_request("POST", "/api/prefs/theme", "", "theme=dark");
    assert_eq!(
        BrowserStore.get("chem_theme").unwrap().as_deref(),
        Some("dark")
    );
}

#[wasm_bindgen_test]
fn corrupt_learned_list_is_ignored() {
    let mut store = BrowserStore;
    store.set("chem_learned", "{not a list").unwrap();
    state::replace_store(Box::new(BrowserStore));
    let html = handle_request("GET", "/api/learned/progress", "?total=5", "");
    assert!(html.contains("已学习 0 / 5 个实验"));
    // The corrupt value is left alone until the next mutation.
    assert_eq!(
        store.get("chem_learned").unwrap().as_deref(),
        Some("{not a list")
    );
    handle_request("POST", "/api/learned/toggle", "", "id=exp-1");
    assert_eq!(
        store.get("chem_learned").unwrap().as_deref(),
        Some(r#"["exp-1"]"#)
    );
    store.set("chem_learned", "[]").unwrap();
}

#[wasm_bindgen_test]
fn step_game_runs_in_browser() {
    let html = handle_request(
        "POST",
        "/api/step-order/init",
        "",
        "id=web-game&correct=%5B%22a%22%2C%22b%22%5D&seed=9",
    );
    assert_eq!(html.matches("step-chip").count(), 2);
}
