//! `/api/step-order/*` routes — the step-ordering game board.
//!
//! Each response re-renders the whole board for one game. Effects that
//! reach outside the board (the follow-up "why" questions next to it) are
//! applied by a trailing inline script. While reverts are pending the board
//! carries a hidden element that posts `tick` once the next one is due.

use crate::game::session::{self, GameSession};
use crate::game::step_order::{Effect, Event, TokenState};
use crate::routes::util::{error_span, escape_html, get_param, is_safe_id, parse_form_body, parse_query};

type Params = Vec<(String, String)>;

fn game_id(params: &Params) -> Result<&str, String> {
    match get_param(params, "id") {
        Some(id) if is_safe_id(id) => Ok(id),
        Some(_) => Err(error_span("Invalid game id")),
        None => Err(error_span("Missing game id")),
    }
}

fn now_ms(params: &Params) -> u64 {
    get_param(params, "now")
        .and_then(|s| s.parse().ok())
        .unwrap_or(0)
}

/// Run `event` against game `id` and render the board.
fn dispatch(id: &str, event: Event, now: u64) -> String {
    session::with_session_mut(id, |s| {
        let effects = s.handle(event, now);
        render_board(id, s, now, &effects)
    })
    .unwrap_or_else(|| unknown_game(id))
}

fn unknown_game(id: &str) -> String {
    error_span(&format!("Unknown step game: {}", id))
}

// ── POST /api/step-order/init ──────────────────────────────────────

/// Handle POST /api/step-order/init
/// Body params:
///   - id={element id}
///   - correct={JSON list}  → the page's `data-correct` attribute
///   - seed={u64}           → optional; a fresh seed is drawn when absent
pub fn handle_init_post(body: &str) -> String {
    let params = parse_form_body(body);
    let id = match game_id(&params) {
        Ok(id) => id,
        Err(html) => return html,
    };
    let correct = get_param(&params, "correct").unwrap_or("");
    let seed = get_param(&params, "seed")
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(session::next_seed);

    if let Err(e) = session::create(id, correct, seed) {
        log::error!("step game {} not created: {}", id, e);
        return error_span(&format!("Invalid step sequence: {}", e));
    }
    session::with_session(id, |s| render_board(id, s, 0, &[Effect::HideSuccess]))
        .unwrap_or_else(|| unknown_game(id))
}

// ── GET /api/step-order/board ──────────────────────────────────────

pub fn handle_board_get(query: &str) -> String {
    let params = parse_query(query);
    let id = match game_id(&params) {
        Ok(id) => id,
        Err(html) => return html,
    };
    let now = now_ms(&params);
    session::with_session(id, |s| render_board(id, s, now, &[]))
        .unwrap_or_else(|| unknown_game(id))
}

// ── POST /api/step-order/click ─────────────────────────────────────

/// Handle POST /api/step-order/click
/// Body params: id, token={token id}, now={ms timestamp}
pub fn handle_click_post(body: &str) -> String {
    let params = parse_form_body(body);
    let id = match game_id(&params) {
        Ok(id) => id,
        Err(html) => return html,
    };
    let token: usize = match get_param(&params, "token").and_then(|s| s.parse().ok()) {
        Some(t) => t,
        None => return error_span("Missing or invalid token parameter"),
    };
    dispatch(id, Event::Click(token), now_ms(&params))
}

// ── POST /api/step-order/tick ──────────────────────────────────────

/// Handle POST /api/step-order/tick
/// Body params: id, now. Clears every wrong-flash whose delay has elapsed.
pub fn handle_tick_post(body: &str) -> String {
    let params = parse_form_body(body);
    let id = match game_id(&params) {
        Ok(id) => id,
        Err(html) => return html,
    };
    let now = now_ms(&params);
    session::with_session_mut(id, |s| {
        let effects = s.tick(now);
        render_board(id, s, now, &effects)
    })
    .unwrap_or_else(|| unknown_game(id))
}

// ── POST /api/step-order/reset ─────────────────────────────────────

pub fn handle_reset_post(body: &str) -> String {
    let params = parse_form_body(body);
    match game_id(&params) {
        Ok(id) => dispatch(id, Event::Reset, now_ms(&params)),
        Err(html) => html,
    }
}

// ── POST /api/step-order/why ───────────────────────────────────────

/// Handle POST /api/step-order/why
/// Body params: id, index={follow-up answer index}
pub fn handle_why_post(body: &str) -> String {
    let params = parse_form_body(body);
    let id = match game_id(&params) {
        Ok(id) => id,
        Err(html) => return html,
    };
    let index: usize = match get_param(&params, "index").and_then(|s| s.parse().ok()) {
        Some(i) => i,
        None => return error_span("Missing or invalid index parameter"),
    };
    dispatch(id, Event::ToggleAnswer(index), now_ms(&params))
}

// ── Rendering ──────────────────────────────────────────────────────

/// Render the board for one game, plus the follow-up script for `effects`.
pub fn render_board(id: &str, session: &GameSession, now: u64, effects: &[Effect]) -> String {
    let game = &session.game;
    let mut html = String::with_capacity(2048);

    html.push_str(&format!(r#"<div id="{id}-board" class="step-order-board">"#));

    // Answer row, in click order
    html.push_str(r#"<div class="step-order-answer">"#);
    for label in game.selected() {
        html.push_str(&format!(
            r#"<span class="step-placed">{}</span>"#,
            escape_html(label)
        ));
    }
    html.push_str("</div>");

    // Choice chips, in shuffled order
    html.push_str(r#"<div class="step-order-choices">"#);
    for (token, chip) in game.tokens_in_order() {
        let state_class = match chip.state {
            TokenState::Available => "",
            TokenState::Used => " used step-correct",
            TokenState::WrongFlash => " step-wrong",
        };
        html.push_str(&format!(
            r##"<button type="button" class="step-chip{state_class}" data-label="{label}" data-token="{token}" hx-post="/api/step-order/click" hx-vals='js:{{id: "{id}", token: {token}, now: Date.now()}}' hx-target="#{id}-board" hx-swap="outerHTML">{label}</button>"##,
            label = escape_html(&chip.label),
        ));
    }
    html.push_str("</div>");

    let success_display = if game.is_completed() { "block" } else { "none" };
    html.push_str(&format!(
        r#"<div class="step-order-success" style="display: {success_display}">✓ 顺序正确！</div>"#
    ));

    html.push_str(&format!(
        r##"<button type="button" class="step-reset-btn" hx-post="/api/step-order/reset" hx-vals='js:{{id: "{id}", now: Date.now()}}' hx-target="#{id}-board" hx-swap="outerHTML">重新排序</button>"##
    ));

    if let Some(due) = session.reverts.next_due() {
        let delay = due.saturating_sub(now).min(session.flash_delay_ms());
        html.push_str(&format!(
            r##"<span class="step-tick" hidden hx-post="/api/step-order/tick" hx-trigger="load delay:{delay}ms" hx-vals='js:{{id: "{id}", now: Date.now()}}' hx-target="#{id}-board" hx-swap="outerHTML"></span>"##
        ));
    }

    html.push_str(&followup_script(id, effects));
    html.push_str("</div>");
    html
}

/// Inline script applying the effects that touch the `.step-why-questions`
/// block next to the game. Empty when no such effect is present.
fn followup_script(id: &str, effects: &[Effect]) -> String {
    let mut body = String::new();
    for effect in effects {
        match effect {
            Effect::RevealSuccess => body.push_str("w.style.display='';"),
            Effect::HideSuccess => body.push_str("w.style.display='none';"),
            Effect::CollapseAnswers => body.push_str(
                "w.querySelectorAll('.why-a').forEach(function(a){a.classList.remove('revealed')});",
            ),
            Effect::SetAnswer { index, revealed } => body.push_str(&format!(
                "var a{index}=w.querySelectorAll('.why-a')[{index}];if(a{index})a{index}.classList.toggle('revealed',{revealed});"
            )),
            // Board-internal effects are covered by the re-render.
            Effect::PlaceToken { .. }
            | Effect::FlashWrong { .. }
            | Effect::ScheduleRevert { .. }
            | Effect::ClearFlash { .. }
            | Effect::ClearAnswer
            | Effect::Reshuffle { .. } => {}
        }
    }
    if body.is_empty() {
        return String::new();
    }
    format!(
        "<script>(function(){{var g=document.getElementById('{id}');var w=g&&g.parentElement.querySelector('.step-why-questions');if(!w)return;{body}}})();</script>"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEQ: &str = "%5B%22a%22%2C%22b%22%2C%22c%22%5D"; // ["a","b","c"]

    fn init(id: &str) -> String {
        handle_init_post(&format!("id={}&correct={}&seed=7", id, SEQ))
    }

    fn token_of(id: &str, label: &str) -> usize {
        session::with_session(id, |s| {
            s.game.correct().iter().position(|l| l == label).unwrap()
        })
        .unwrap()
    }

    #[test]
    fn init_renders_all_chips() {
        let html = init("g1");
        assert_eq!(html.matches("class=\"step-chip\"").count(), 3);
        assert!(html.contains("display: none"));
        assert!(html.contains("w.style.display='none'"));
        session::remove("g1");
    }

    #[test]
    fn init_rejects_malformed_sequence() {
        let html = handle_init_post("id=g2&correct=%5Boops");
        assert!(html.contains("Invalid step sequence"));
        assert!(handle_board_get("?id=g2").contains("Unknown step game"));
    }

    #[test]
    fn init_rejects_unsafe_id() {
        assert!(handle_init_post("id=a%27b&correct=%5B%22a%22%5D").contains("Invalid game id"));
        assert!(handle_init_post("correct=%5B%22a%22%5D").contains("Missing game id"));
    }

    #[test]
    fn correct_clicks_complete_the_game() {
        init("g3");
        let mut html = String::new();
        for label in ["a", "b", "c"] {
            let t = token_of("g3", label);
            html = handle_click_post(&format!("id=g3&token={}&now=100", t));
        }
        assert_eq!(html.matches("step-placed").count(), 3);
        assert!(html.contains("display: block"));
        assert!(html.contains("w.style.display=''"));
        session::remove("g3");
    }

    #[test]
    fn wrong_click_flashes_then_ticks_back() {
        init("g4");
        let wrong = token_of("g4", "c");
        let html = handle_click_post(&format!("id=g4&token={}&now=1000", wrong));
        assert!(html.contains("step-wrong"));
        assert!(html.contains("load delay:500ms"));
        assert!(!html.contains("step-placed"));

        let early = handle_tick_post("id=g4&now=1200");
        assert!(early.contains("step-wrong"));
        assert!(early.contains("load delay:300ms"));

        let html = handle_tick_post("id=g4&now=1500");
        assert!(!html.contains("step-wrong"));
        assert!(!html.contains("step-tick"));
        session::remove("g4");
    }

    #[test]
    fn used_chip_double_click() {
        init("g5");
        let a = token_of("g5", "a");
        handle_click_post(&format!("id=g5&token={}", a));
        let html = handle_click_post(&format!("id=g5&token={}", a));
        assert_eq!(html.matches("step-placed").count(), 1);
        session::remove("g5");
    }

    #[test]
    fn reset_restores_board_and_collapses_answers() {
        init("g6");
        for label in ["a", "b", "c"] {
            let t = token_of("g6", label);
            handle_click_post(&format!("id=g6&token={}", t));
        }
        let why = handle_why_post("id=g6&index=1");
        assert!(why.contains("classList.toggle('revealed',true)"));

        let html = handle_reset_post("id=g6");
        assert!(!html.contains("step-placed"));
        assert!(!html.contains("used"));
        assert!(html.contains("display: none"));
        assert!(html.contains("classList.remove('revealed')"));
        session::remove("g6");
    }

    #[test]
    fn click_requires_token() {
        init("g7");
        assert!(handle_click_post("id=g7").contains("Missing or invalid token"));
        session::remove("g7");
    }

    #[test]
    fn labels_are_escaped() {
        let body = "id=g8&correct=%5B%22%3Cb%3E%22%5D&seed=1"; // ["<b>"]
        let html = handle_init_post(body);
        assert!(html.contains("&lt;b&gt;"));
        assert!(!html.contains("<b>"));
        session::remove("g8");
    }
}
