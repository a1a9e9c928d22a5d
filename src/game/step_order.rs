//! Step-ordering game — pure state machine.
//!
//! The visitor is shown the steps of an experiment as shuffled chips and has
//! to click them in the correct order. A correct click moves the chip into
//! the answer row; a wrong click flashes the chip and changes nothing else.
//!
//! Everything here is a pure transition: [`StepOrderGame::transition`] takes
//! the current game and an [`Event`] and returns the next game plus the
//! [`Effect`]s a renderer should apply. Timers and rendering live elsewhere
//! (`game::reverts`, `routes::step_order`).

use std::collections::BTreeSet;

use rand::Rng;

/// Fatal problems with a game's declared correct sequence.
#[derive(Debug, thiserror::Error)]
pub enum GameConfigError {
    #[error("correct sequence is not a JSON list of strings: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("correct sequence is empty")]
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenState {
    Available,
    Used,
    /// Transient: set by a wrong click, cleared by a later `RevertFlash`.
    WrongFlash,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    InProgress,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub label: String,
    pub state: TokenState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Chip with this token id was clicked.
    Click(usize),
    /// The wrong-flash delay for this token elapsed.
    RevertFlash(usize),
    Reset,
    /// Show or hide the follow-up answer at this index.
    ToggleAnswer(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Mark the chip used and append its label to the answer row.
    PlaceToken { token: usize, label: String },
    FlashWrong { token: usize },
    /// Ask the caller to send `RevertFlash(token)` after the flash delay.
    ScheduleRevert { token: usize },
    ClearFlash { token: usize },
    /// Show the success indicator and the follow-up questions.
    RevealSuccess,
    ClearAnswer,
    Reshuffle { order: Vec<usize> },
    /// Hide the success indicator and the follow-up questions.
    HideSuccess,
    CollapseAnswers,
    SetAnswer { index: usize, revealed: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOrderGame {
    correct: Vec<String>,
    /// Indexed by token id; ids follow the declared sequence.
    tokens: Vec<Token>,
    /// Rendered chip order, a permutation of token ids.
    order: Vec<usize>,
    /// Always a prefix of `correct`.
    selected: Vec<String>,
    revealed_answers: BTreeSet<usize>,
}

impl StepOrderGame {
    /// Build a game from the JSON list found in the page's `data-correct`
    /// attribute, shuffling the chips once.
    pub fn from_json<R: Rng>(raw: &str, rng: &mut R) -> Result<Self, GameConfigError> {
        let correct: Vec<String> = serde_json::from_str(raw)?;
        Self::new(correct, rng)
    }

    pub fn new<R: Rng>(correct: Vec<String>, rng: &mut R) -> Result<Self, GameConfigError> {
        if correct.is_empty() {
            return Err(GameConfigError::Empty);
        }
        let tokens = correct
            .iter()
            .map(|label| Token {
                label: label.clone(),
                state: TokenState::Available,
            })
            .collect();
        let mut order: Vec<usize> = (0..correct.len()).collect();
        shuffle(&mut order, rng);
        Ok(Self {
            correct,
            tokens,
            order,
            selected: Vec::new(),
            revealed_answers: BTreeSet::new(),
        })
    }

    /// `(state, event) -> (state, effects)`.
    pub fn transition<R: Rng>(mut self, event: Event, rng: &mut R) -> (Self, Vec<Effect>) {
        let effects = self.dispatch(event, rng);
        (self, effects)
    }

    /// In-place form of [`transition`](StepOrderGame::transition).
    pub fn dispatch<R: Rng>(&mut self, event: Event, rng: &mut R) -> Vec<Effect> {
        match event {
            Event::Click(token) => self.click(token),
            Event::RevertFlash(token) => self.revert_flash(token),
            Event::Reset => self.reset(rng),
            Event::ToggleAnswer(index) => self.toggle_answer(index),
        }
    }

    fn click(&mut self, id: usize) -> Vec<Effect> {
        if self.is_completed() {
            return Vec::new();
        }
        let expected = &self.correct[self.selected.len()];
        let Some(token) = self.tokens.get_mut(id) else {
            return Vec::new();
        };
        if token.state == TokenState::Used {
            return Vec::new();
        }

        if token.label == *expected {
            token.state = TokenState::Used;
            let label = token.label.clone();
            self.selected.push(label.clone());
            let mut effects = vec![Effect::PlaceToken { token: id, label }];
            if self.is_completed() {
                effects.push(Effect::RevealSuccess);
            }
            effects
        } else {
            token.state = TokenState::WrongFlash;
            vec![
                Effect::FlashWrong { token: id },
                Effect::ScheduleRevert { token: id },
            ]
        }
    }

    /// Idempotent: only a chip still flashing goes back to available.
    fn revert_flash(&mut self, id: usize) -> Vec<Effect> {
        match self.tokens.get_mut(id) {
            Some(token) if token.state == TokenState::WrongFlash => {
                token.state = TokenState::Available;
                vec![Effect::ClearFlash { token: id }]
            }
            _ => Vec::new(),
        }
    }

    fn reset<R: Rng>(&mut self, rng: &mut R) -> Vec<Effect> {
        self.selected.clear();
        for token in &mut self.tokens {
            token.state = TokenState::Available;
        }
        shuffle(&mut self.order, rng);
        self.revealed_answers.clear();
        vec![
            Effect::ClearAnswer,
            Effect::Reshuffle {
                order: self.order.clone(),
            },
            Effect::HideSuccess,
            Effect::CollapseAnswers,
        ]
    }

    /// Follow-up answers are only reachable once the game is complete.
    fn toggle_answer(&mut self, index: usize) -> Vec<Effect> {
        if !self.is_completed() {
            return Vec::new();
        }
        let revealed = if self.revealed_answers.remove(&index) {
            false
        } else {
            self.revealed_answers.insert(index);
            true
        };
        vec![Effect::SetAnswer { index, revealed }]
    }

    pub fn phase(&self) -> Phase {
        if self.is_completed() {
            Phase::Completed
        } else {
            Phase::InProgress
        }
    }

    pub fn is_completed(&self) -> bool {
        self.selected.len() == self.correct.len()
    }

    pub fn correct(&self) -> &[String] {
        &self.correct
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    pub fn order(&self) -> &[usize] {
        &self.order
    }

    pub fn token(&self, id: usize) -> Option<&Token> {
        self.tokens.get(id)
    }

    /// Tokens in rendered order, paired with their ids.
    pub fn tokens_in_order(&self) -> impl Iterator<Item = (usize, &Token)> + '_ {
        self.order.iter().map(move |&id| (id, &self.tokens[id]))
    }

    pub fn revealed_answers(&self) -> &BTreeSet<usize> {
        &self.revealed_answers
    }
}

/// Fisher–Yates: every permutation of `items` is equally likely.
pub fn shuffle<T, R: Rng>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashMap;

    fn labels(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn game(seed: u64) -> (StepOrderGame, StdRng) {
        let mut rng = StdRng::seed_from_u64(seed);
        let g = StepOrderGame::new(labels(&["检查气密性", "装药品", "加热", "收集"]), &mut rng).unwrap();
        (g, rng)
    }

    fn id_of(g: &StepOrderGame, label: &str) -> usize {
        g.correct().iter().position(|l| l == label).unwrap()
    }

    #[test]
    fn malformed_config_fails_fast() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            StepOrderGame::from_json("[\"a\",", &mut rng),
            Err(GameConfigError::Malformed(_))
        ));
        assert!(matches!(
            StepOrderGame::from_json("[1,2]", &mut rng),
            Err(GameConfigError::Malformed(_))
        ));
        assert!(matches!(
            StepOrderGame::from_json("[]", &mut rng),
            Err(GameConfigError::Empty)
        ));
        assert!(StepOrderGame::from_json(r#"["a","b"]"#, &mut rng).is_ok());
    }

    #[test]
    fn pool_is_a_permutation_of_sequence() {
        let (g, _) = game(7);
        let mut order = g.order().to_vec();
        order.sort_unstable();
        assert_eq!(order, vec![0, 1, 2, 3]);
    }

    #[test]
    fn correct_order_completes_after_n_clicks() {
        let (mut g, mut rng) = game(3);
        let n = g.correct().len();
        for i in 0..n {
            assert_eq!(g.phase(), Phase::InProgress);
            let effects = g.dispatch(Event::Click(i), &mut rng);
            assert!(matches!(effects[0], Effect::PlaceToken { token, .. } if token == i));
            assert!(!effects.iter().any(|e| matches!(e, Effect::FlashWrong { .. })));
            assert_eq!(g.selected().len(), i + 1);
        }
        assert_eq!(g.phase(), Phase::Completed);
        assert_eq!(g.selected(), g.correct());
    }

    #[test]
    fn completion_reveals_success_once() {
        let (mut g, mut rng) = game(3);
        let mut reveals = 0;
        for i in 0..4 {
            reveals += g
                .dispatch(Event::Click(i), &mut rng)
                .iter()
                .filter(|e| **e == Effect::RevealSuccess)
                .count();
        }
        assert_eq!(reveals, 1);
    }

    #[test]
    fn wrong_click_flashes_without_progress() {
        let (g, mut rng) = game(11);
        let wrong = id_of(&g, "加热");
        let (g, effects) = g.transition(Event::Click(wrong), &mut rng);
        assert_eq!(
            effects,
            vec![
                Effect::FlashWrong { token: wrong },
                Effect::ScheduleRevert { token: wrong }
            ]
        );
        assert!(g.selected().is_empty());
        assert_eq!(g.phase(), Phase::InProgress);
        assert_eq!(g.token(wrong).unwrap().state, TokenState::WrongFlash);

        let (g, effects) = g.transition(Event::RevertFlash(wrong), &mut rng);
        assert_eq!(effects, vec![Effect::ClearFlash { token: wrong }]);
        assert_eq!(g.token(wrong).unwrap().state, TokenState::Available);
    }

    #[test]
    fn revert_is_idempotent() {
        let (mut g, mut rng) = game(5);
        g.dispatch(Event::Click(2), &mut rng);
        g.dispatch(Event::RevertFlash(2), &mut rng);
        assert!(g.dispatch(Event::RevertFlash(2), &mut rng).is_empty());
        assert!(g.dispatch(Event::RevertFlash(99), &mut rng).is_empty());
        assert_eq!(g.token(2).unwrap().state, TokenState::Available);
    }

    #[test]
    fn revert_never_touches_used_token() {
        let (mut g, mut rng) = game(5);
        // Flash token 1, then make it used before the revert fires.
        g.dispatch(Event::Click(1), &mut rng);
        g.dispatch(Event::Click(0), &mut rng);
        g.dispatch(Event::Click(1), &mut rng);
        assert_eq!(g.token(1).unwrap().state, TokenState::Used);
        assert!(g.dispatch(Event::RevertFlash(1), &mut rng).is_empty());
        assert_eq!(g.token(1).unwrap().state, TokenState::Used);
    }

    #[test]
    fn used_token_click_is_ignored() {
        let (mut g, mut rng) = game(9);
        g.dispatch(Event::Click(0), &mut rng);
        assert!(g.dispatch(Event::Click(0), &mut rng).is_empty());
        assert_eq!(g.selected(), &["检查气密性".to_string()]);
    }

    #[test]
    fn duplicate_labels_accept_either_token() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut g = StepOrderGame::new(labels(&["stir", "heat", "stir"]), &mut rng).unwrap();
        g.dispatch(Event::Click(2), &mut rng);
        g.dispatch(Event::Click(1), &mut rng);
        g.dispatch(Event::Click(2), &mut rng);
        assert_eq!(g.selected().len(), 2);
        g.dispatch(Event::Click(0), &mut rng);
        assert!(g.is_completed());
    }

    #[test]
    fn reset_after_completion() {
        let (mut g, mut rng) = game(21);
        for i in 0..4 {
            g.dispatch(Event::Click(i), &mut rng);
        }
        g.dispatch(Event::ToggleAnswer(0), &mut rng);
        assert!(g.is_completed());

        let effects = g.dispatch(Event::Reset, &mut rng);
        assert_eq!(g.phase(), Phase::InProgress);
        assert!(g.selected().is_empty());
        assert!(g.revealed_answers().is_empty());
        assert!(effects.contains(&Effect::HideSuccess));
        assert!(effects.contains(&Effect::CollapseAnswers));
        for id in 0..4 {
            assert_eq!(g.token(id).unwrap().state, TokenState::Available);
        }
    }

    #[test]
    fn reset_clears_flash_in_progress() {
        let (mut g, mut rng) = game(4);
        g.dispatch(Event::Click(0), &mut rng);
        g.dispatch(Event::Click(3), &mut rng);
        g.dispatch(Event::Reset, &mut rng);
        assert_eq!(g.token(3).unwrap().state, TokenState::Available);
        assert_eq!(g.token(0).unwrap().state, TokenState::Available);
    }

    #[test]
    fn answers_toggle_only_when_completed() {
        let (mut g, mut rng) = game(8);
        assert!(g.dispatch(Event::ToggleAnswer(1), &mut rng).is_empty());
        for i in 0..4 {
            g.dispatch(Event::Click(i), &mut rng);
        }
        assert_eq!(
            g.dispatch(Event::ToggleAnswer(1), &mut rng),
            vec![Effect::SetAnswer { index: 1, revealed: true }]
        );
        assert_eq!(
            g.dispatch(Event::ToggleAnswer(1), &mut rng),
            vec![Effect::SetAnswer { index: 1, revealed: false }]
        );
    }

    #[test]
    fn reset_shuffle_is_uniform() {
        let mut rng = StdRng::seed_from_u64(0xC0FFEE);
        let mut g = StepOrderGame::new(labels(&["a", "b", "c"]), &mut rng).unwrap();
        let trials = 6000;
        let mut counts: HashMap<Vec<usize>, usize> = HashMap::new();
        for _ in 0..trials {
            g.dispatch(Event::Reset, &mut rng);
            *counts.entry(g.order().to_vec()).or_default() += 1;
        }
        assert_eq!(counts.len(), 6);
        // Expected 1000 each; 150 is more than five standard deviations.
        for (perm, n) in &counts {
            assert!((850..=1150).contains(n), "{:?} drawn {} times", perm, n);
        }
    }
}
