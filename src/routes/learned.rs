//! `/api/learned/*` routes — learned-experiment tracking and progress.

use crate::prefs::model::Progress;
use crate::prefs::state::{with_prefs, with_prefs_mut};
use crate::routes::util::{error_span, escape_html, get_param, parse_form_body, parse_query};

/// Handle GET /api/learned/progress?total={n}
/// `total` is the number of experiment cards on the page. Empty when the
/// page lists none.
pub fn handle_progress_get(query: &str) -> String {
    let params = parse_query(query);
    match with_prefs(|p| p.progress(total_param(&params))) {
        Some(progress) => render_progress(progress),
        None => String::new(),
    }
}

/// Handle GET /api/learned/badge?id={experiment}
/// Contents of a card's `#badge-{id}` slot: the badge, or nothing when not
/// learned.
pub fn handle_badge_get(query: &str) -> String {
    let params = parse_query(query);
    match get_param(&params, "id") {
        Some(id) => render_badge(with_prefs(|p| p.is_learned(id))),
        None => String::new(),
    }
}

/// Handle GET /api/learned/button?id={experiment}
pub fn handle_button_get(query: &str) -> String {
    let params = parse_query(query);
    match get_param(&params, "id") {
        Some(id) if !id.is_empty() => render_learned_button(id, with_prefs(|p| p.is_learned(id))),
        _ => error_span("Missing experiment id"),
    }
}

/// Handle POST /api/learned/toggle
/// Body params:
///   - id={experiment}
///   - total={n}  → optional card count; when non-zero the progress block
///     is swapped out-of-band as well
///
/// Returns the updated button plus the card's badge slot, out-of-band.
pub fn handle_toggle_post(body: &str) -> String {
    let params = parse_form_body(body);
    let id = match get_param(&params, "id") {
        Some(id) if !id.is_empty() => id,
        _ => return error_span("Missing experiment id"),
    };
    let (learned, progress) = with_prefs_mut(|p| {
        let learned = p.toggle_learned(id);
        (learned, p.progress(total_param(&params)))
    });
    log::debug!("experiment {} learned={}", id, learned);

    let mut html = render_learned_button(id, learned);
    html.push_str(&format!(
        r#"<span id="badge-{id}" hx-swap-oob="innerHTML">{badge}</span>"#,
        id = escape_html(id),
        badge = render_badge(learned),
    ));
    if let Some(progress) = progress {
        html.push_str(&format!(
            r#"<div id="progressInfo" class="progress-info" hx-swap-oob="true">{info}</div><div id="progressFill" class="progress-fill" style="width: {percent}%" hx-swap-oob="true"></div>"#,
            info = progress_text(progress),
            percent = progress.percent,
        ));
    }
    html
}

fn total_param(params: &[(String, String)]) -> usize {
    get_param(params, "total")
        .and_then(|s| s.parse().ok())
        .unwrap_or(0)
}

fn progress_text(progress: Progress) -> String {
    format!("已学习 {} / {} 个实验", progress.count, progress.total)
}

pub fn render_progress(progress: Progress) -> String {
    format!(
        r#"<div id="progressInfo" class="progress-info">{info}</div><div class="progress-bar"><div id="progressFill" class="progress-fill" style="width: {percent}%"></div></div>"#,
        info = progress_text(progress),
        percent = progress.percent,
    )
}

pub fn render_badge(learned: bool) -> String {
    if learned {
        r#"<span class="learned-badge">已学习</span>"#.to_string()
    } else {
        String::new()
    }
}

pub fn render_learned_button(id: &str, learned: bool) -> String {
    let (class, label) = if learned {
        ("learned-btn is-learned", "已学习 ✓")
    } else {
        ("learned-btn", "标记为已学习")
    };
    let id_attr = escape_html(id);
    format!(
        r#"<button id="markLearned" class="{class}" data-exp-id="{id}" hx-post="/api/learned/toggle" hx-vals='js:{{id: this.dataset.expId, total: document.querySelectorAll(".exp-link[data-exp-id]").length}}' hx-swap="outerHTML">{label}</button>"#,
        class = class,
        id = id_attr,
        label = label,
    )
}
