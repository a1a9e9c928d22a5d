//! `/api/prefs/*` routes — theme and font-size preferences.
//!
//! Every response carries the control's HTML plus an inline script that
//! applies the preference to `<html>` in the same turn, so a page never
//! shows a control that disagrees with the document.

use crate::prefs::model::{FontSize, PrefKey, Theme};
use crate::prefs::state::{self, with_prefs, with_prefs_mut};
use crate::routes::util::{get_param, parse_form_body};
use crate::study::{equation, quiz};

// ── GET /api/prefs/init ────────────────────────────────────────────

/// Handle GET /api/prefs/init
/// Re-reads every preference from storage and returns the theme toggle
/// followed by the font buttons. Called once per page load, before the page
/// content registers anything, so quiz mode and equation blanks left over
/// from the previous page are dropped here.
pub fn handle_init_get(_query: &str) -> String {
    state::reload();
    quiz::reset_quiz();
    equation::reset_practice();
    let (theme, font) = with_prefs(|p| (p.theme(), p.font_size()));
    let mut html = render_theme(theme);
    html.push_str(&render_font_buttons(font));
    html
}

// ── /api/prefs/theme ───────────────────────────────────────────────

pub fn handle_theme_get(_query: &str) -> String {
    render_theme(with_prefs(|p| p.theme()))
}

/// Handle POST /api/prefs/theme
/// Body params:
///   - action=toggle        → flip light/dark
///   - theme=light|dark     → set explicitly (anything else is ignored)
pub fn handle_theme_post(body: &str) -> String {
    let params = parse_form_body(body);
    let theme = with_prefs_mut(|p| {
        if get_param(&params, "action") == Some("toggle") {
            p.toggle_theme();
        } else if let Some(raw) = get_param(&params, "theme") {
            if !p.set(PrefKey::Theme, raw) {
                log::debug!("ignoring invalid theme {:?}", raw);
            }
        }
        p.theme()
    });
    render_theme(theme)
}

pub fn render_theme(theme: Theme) -> String {
    format!(
        r#"<button id="themeToggle" class="theme-toggle" aria-label="切换主题" hx-post="/api/prefs/theme" hx-vals='{{"action":"toggle"}}' hx-swap="outerHTML">{label}</button><script>document.documentElement.setAttribute('data-theme','{theme}');</script>"#,
        label = theme.button_label(),
        theme = theme.as_str(),
    )
}

// ── /api/prefs/font ────────────────────────────────────────────────

pub fn handle_font_get(_query: &str) -> String {
    render_font_buttons(with_prefs(|p| p.font_size()))
}

/// Handle POST /api/prefs/font
/// Body params: font=font-sm|font-md|font-lg (anything else is ignored).
pub fn handle_font_post(body: &str) -> String {
    let params = parse_form_body(body);
    let font = with_prefs_mut(|p| {
        if let Some(raw) = get_param(&params, "font") {
            if !p.set(PrefKey::FontSize, raw) {
                log::debug!("ignoring invalid font size {:?}", raw);
            }
        }
        p.font_size()
    });
    render_font_buttons(font)
}

pub fn render_font_buttons(active: FontSize) -> String {
    let mut html = String::with_capacity(768);
    html.push_str(r#"<div id="fontButtons" class="font-buttons">"#);
    for font in FontSize::ALL {
        let class = if font == active { "font-btn active" } else { "font-btn" };
        html.push_str(&format!(
            r##"<button class="{class}" data-font="{name}" hx-post="/api/prefs/font" hx-vals='{{"font":"{name}"}}' hx-target="#fontButtons" hx-swap="outerHTML">{label}</button>"##,
            class = class,
            name = font.class_name(),
            label = font.label(),
        ));
    }
    html.push_str("</div>");

    // Exactly one font class on the root element.
    html.push_str("<script>(function(){var r=document.documentElement.classList;");
    for font in FontSize::ALL {
        html.push_str(&format!("r.remove('{}');", font.class_name()));
    }
    html.push_str(&format!("r.add('{}');}})();</script>", active.class_name()));
    html
}
