//! Quiz (self-test) mode.
//!
//! While active, list items on the experiment page are covered and the
//! visitor clicks each one to reveal it. Entering the mode always starts
//! with everything covered again.

use std::cell::RefCell;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuizMode {
    active: bool,
    revealed: BTreeSet<String>,
}

impl QuizMode {
    /// Enter or leave quiz mode. Returns the new `active` flag.
    pub fn toggle(&mut self) -> bool {
        self.active = !self.active;
        if self.active {
            self.revealed.clear();
        }
        self.active
    }

    /// Flip one item's reveal. Ignored outside quiz mode; returns the item's
    /// new revealed state, or `None` when ignored.
    pub fn reveal(&mut self, item: &str) -> Option<bool> {
        if !self.active {
            return None;
        }
        if self.revealed.remove(item) {
            Some(false)
        } else {
            self.revealed.insert(item.to_string());
            Some(true)
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_revealed(&self, item: &str) -> bool {
        self.revealed.contains(item)
    }

    pub fn button_label(&self) -> &'static str {
        if self.active { "退出自测" } else { "自测模式" }
    }
}

thread_local! {
    static QUIZ: RefCell<QuizMode> = RefCell::new(QuizMode::default());
}

pub fn with_quiz<F, R>(f: F) -> R
where
    F: FnOnce(&QuizMode) -> R,
{
    QUIZ.with(|q| f(&q.borrow()))
}

pub fn with_quiz_mut<F, R>(f: F) -> R
where
    F: FnOnce(&mut QuizMode) -> R,
{
    QUIZ.with(|q| f(&mut q.borrow_mut()))
}

pub fn reset_quiz() {
    QUIZ.with(|q| *q.borrow_mut() = QuizMode::default());
}
