//! Equation practice mode.
//!
//! Static equations get swapped for versions with blanks (reaction
//! conditions, state symbols). Each click on a blank cycles it to the next
//! declared choice; a blank is correct while its current choice is the
//! answer. Leaving practice mode puts every blank back to `?`.

use std::cell::RefCell;
use std::collections::BTreeMap;

pub const PLACEHOLDER: &str = "?";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blank {
    pub choices: Vec<String>,
    pub answer: String,
    /// Index into `choices`; `None` shows the placeholder.
    pub current: Option<usize>,
}

impl Blank {
    /// Build from the page's comma-separated `data-choices` attribute.
    pub fn from_attr(choices: &str, answer: &str) -> Self {
        Self {
            choices: choices.split(',').map(str::to_string).collect(),
            answer: answer.to_string(),
            current: None,
        }
    }

    pub fn text(&self) -> &str {
        self.current
            .and_then(|i| self.choices.get(i))
            .map(String::as_str)
            .unwrap_or(PLACEHOLDER)
    }

    pub fn is_correct(&self) -> bool {
        self.current.is_some() && self.text() == self.answer
    }

    /// Advance to the next choice, wrapping; the placeholder counts as the
    /// position before the first choice.
    fn cycle(&mut self) {
        if self.choices.is_empty() {
            return;
        }
        let next = match self.current {
            Some(i) => (i + 1) % self.choices.len(),
            None => 0,
        };
        self.current = Some(next);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EquationPractice {
    active: bool,
    blanks: BTreeMap<String, Blank>,
}

impl EquationPractice {
    /// Declare a blank. Re-registering an id replaces it.
    pub fn register(&mut self, id: &str, blank: Blank) {
        self.blanks.insert(id.to_string(), blank);
    }

    pub fn has_blanks(&self) -> bool {
        !self.blanks.is_empty()
    }

    /// Enter or leave practice. Leaving resets every blank. Returns the new
    /// `active` flag.
    pub fn toggle(&mut self) -> bool {
        self.active = !self.active;
        if !self.active {
            for blank in self.blanks.values_mut() {
                blank.current = None;
            }
        }
        self.active
    }

    /// Cycle a blank. `None` when practice is off or the id is unknown.
    pub fn cycle(&mut self, id: &str) -> Option<&Blank> {
        if !self.active {
            return None;
        }
        let blank = self.blanks.get_mut(id)?;
        blank.cycle();
        Some(blank)
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn blank(&self, id: &str) -> Option<&Blank> {
        self.blanks.get(id)
    }

    pub fn button_label(&self) -> &'static str {
        if self.active { "退出练习" } else { "方程式练习" }
    }
}

thread_local! {
    static PRACTICE: RefCell<EquationPractice> = RefCell::new(EquationPractice::default());
}

pub fn with_practice<F, R>(f: F) -> R
where
    F: FnOnce(&EquationPractice) -> R,
{
    PRACTICE.with(|p| f(&p.borrow()))
}

pub fn with_practice_mut<F, R>(f: F) -> R
where
    F: FnOnce(&mut EquationPractice) -> R,
{
    PRACTICE.with(|p| f(&mut p.borrow_mut()))
}

pub fn reset_practice() {
    PRACTICE.with(|p| *p.borrow_mut() = EquationPractice::default());
}
