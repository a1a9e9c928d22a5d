//! `/api/quiz` and `/api/equation/*` routes — per-page study modes.

use crate::routes::util::{error_span, escape_html, get_param, is_safe_id, parse_form_body};
use crate::study::equation::{self, Blank};
use crate::study::quiz;

// ── /api/quiz ──────────────────────────────────────────────────────

pub fn handle_quiz_get(_query: &str) -> String {
    quiz::with_quiz(|q| render_quiz_button(q.is_active(), q.button_label()))
}

/// Handle POST /api/quiz
/// Body params:
///   - action=toggle              → enter/leave quiz mode
///   - action=reveal&item={id}    → flip one list item (quiz mode only)
pub fn handle_quiz_post(body: &str) -> String {
    let params = parse_form_body(body);
    match get_param(&params, "action").unwrap_or("") {
        "toggle" => {
            let (active, label) = quiz::with_quiz_mut(|q| (q.toggle(), q.button_label()));
            let mut html = render_quiz_button(active, label);
            html.push_str(&format!(
                "<script>(function(){{var p=document.querySelector('.page')||document.body;p.classList.toggle('quiz-mode',{active});"
            ));
            if active {
                html.push_str(
                    "document.querySelectorAll('.block-list li.revealed').forEach(function(li){li.classList.remove('revealed')});",
                );
            }
            html.push_str("})();</script>");
            html
        }
        "reveal" => {
            let item = match get_param(&params, "item") {
                Some(item) if is_safe_id(item) => item,
                _ => return error_span("Missing or invalid item"),
            };
            match quiz::with_quiz_mut(|q| q.reveal(item)) {
                Some(revealed) => format!(
                    "<script>(function(){{var li=document.getElementById('{item}');if(li)li.classList.toggle('revealed',{revealed});}})();</script>"
                ),
                None => String::new(),
            }
        }
        _ => error_span("Unknown quiz action"),
    }
}

pub fn render_quiz_button(active: bool, label: &str) -> String {
    let class = if active { "quiz-btn active" } else { "quiz-btn" };
    format!(
        r#"<button id="quizMode" class="{class}" hx-post="/api/quiz" hx-vals='{{"action":"toggle"}}' hx-swap="outerHTML">{label}</button>"#
    )
}

// ── /api/equation ──────────────────────────────────────────────────

/// Handle GET /api/equation/button
/// The practice toggle, hidden when the page declared no blanks.
pub fn handle_button_get(_query: &str) -> String {
    equation::with_practice(|p| render_practice_button(p.is_active(), p.has_blanks(), p.button_label()))
}

/// Handle POST /api/equation/register
/// Body params: id, choices={comma list}, answer
pub fn handle_register_post(body: &str) -> String {
    let params = parse_form_body(body);
    let id = match get_param(&params, "id") {
        Some(id) if is_safe_id(id) => id,
        _ => return error_span("Missing or invalid blank id"),
    };
    let choices = get_param(&params, "choices").unwrap_or("");
    let answer = get_param(&params, "answer").unwrap_or("");
    let blank = Blank::from_attr(choices, answer);
    let html = render_blank(id, &blank);
    equation::with_practice_mut(|p| p.register(id, blank));
    html
}

/// Handle POST /api/equation
/// Body params:
///   - action=toggle          → enter/leave practice (leaving resets blanks)
///   - action=cycle&id={id}   → advance one blank to its next choice
pub fn handle_equation_post(body: &str) -> String {
    let params = parse_form_body(body);
    match get_param(&params, "action").unwrap_or("") {
        "toggle" => {
            let (active, label) = equation::with_practice_mut(|p| {
                let active = p.toggle();
                (active, p.button_label())
            });
            let mut html = render_practice_button(active, true, label);
            let (display, interactive) = if active { ("none", "inline") } else { ("", "none") };
            html.push_str(&format!(
                "<script>(function(){{document.querySelectorAll('.chem-eq-display').forEach(function(el){{el.style.display='{display}'}});document.querySelectorAll('.chem-eq-interactive').forEach(function(el){{el.style.display='{interactive}'}});"
            ));
            if !active {
                html.push_str(&format!(
                    "document.querySelectorAll('.cond-blank, .symbol-blank').forEach(function(el){{el.textContent='{}';el.classList.remove('cond-correct')}});",
                    equation::PLACEHOLDER
                ));
            }
            html.push_str("})();</script>");
            html
        }
        "cycle" => {
            let id = match get_param(&params, "id") {
                Some(id) if is_safe_id(id) => id,
                _ => return error_span("Missing or invalid blank id"),
            };
            equation::with_practice_mut(|p| {
                if let Some(blank) = p.cycle(id) {
                    return render_blank(id, blank);
                }
                p.blank(id)
                    .map(|b| render_blank(id, b))
                    .unwrap_or_default()
            })
        }
        _ => error_span("Unknown equation action"),
    }
}

pub fn render_practice_button(active: bool, has_blanks: bool, label: &str) -> String {
    let class = if active { "eq-btn active" } else { "eq-btn" };
    let hidden = if has_blanks { "" } else { r#" style="display: none""# };
    format!(
        r#"<button id="eqPractice" class="{class}"{hidden} hx-post="/api/equation" hx-vals='{{"action":"toggle"}}' hx-swap="outerHTML">{label}</button>"#
    )
}

pub fn render_blank(id: &str, blank: &Blank) -> String {
    let correct = if blank.is_correct() { " cond-correct" } else { "" };
    format!(
        r#"<span id="{id}" class="cond-blank{correct}" data-choices="{choices}" data-answer="{answer}" hx-post="/api/equation" hx-vals='{{"action":"cycle","id":"{id}"}}' hx-swap="outerHTML">{text}</span>"#,
        choices = escape_html(&blank.choices.join(",")),
        answer = escape_html(&blank.answer),
        text = escape_html(blank.text()),
    )
}
