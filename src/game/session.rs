//! Step-order game sessions, keyed by the game element's id.
//!
//! A page can host several games; each one gets its own [`GameSession`]
//! holding the state machine, its pending reverts and its own seeded RNG,
//! so no state is shared between games. Sessions live in a `thread_local!`
//! registry for the lifetime of the WASM module.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config;
use crate::game::reverts::RevertQueue;
use crate::game::step_order::{Effect, Event, GameConfigError, StepOrderGame};

pub struct GameSession {
    pub game: StepOrderGame,
    pub reverts: RevertQueue,
    rng: StdRng,
}

impl GameSession {
    /// Parse the declared sequence and shuffle with an RNG seeded from `seed`.
    pub fn new(correct_json: &str, seed: u64) -> Result<Self, GameConfigError> {
        let mut rng = StdRng::seed_from_u64(seed);
        let game = StepOrderGame::from_json(correct_json, &mut rng)?;
        Ok(Self {
            game,
            reverts: RevertQueue::new(),
            rng,
        })
    }

    /// Run one event through the game, turning `ScheduleRevert` effects into
    /// queue entries due `flash_delay_ms` after `now_ms`. The delay is read
    /// from the active site config at scheduling time.
    pub fn handle(&mut self, event: Event, now_ms: u64) -> Vec<Effect> {
        let effects = self.game.dispatch(event, &mut self.rng);
        let delay = self.flash_delay_ms();
        for effect in &effects {
            if let Effect::ScheduleRevert { token } = effect {
                self.reverts.schedule(*token, now_ms, delay);
            }
        }
        effects
    }

    /// Fire every revert that is due at `now_ms`.
    pub fn tick(&mut self, now_ms: u64) -> Vec<Effect> {
        let mut effects = Vec::new();
        for token in self.reverts.take_due(now_ms) {
            effects.extend(self.game.dispatch(Event::RevertFlash(token), &mut self.rng));
        }
        effects
    }

    pub fn flash_delay_ms(&self) -> u64 {
        config::current().flash_delay_ms
    }
}

thread_local! {
    static SESSIONS: RefCell<HashMap<String, GameSession>> = RefCell::new(HashMap::new());
    static SEED_COUNTER: Cell<u64> = const { Cell::new(0) };
}

/// Fallback seed for pages that do not send one. Distinct per call.
pub fn next_seed() -> u64 {
    SEED_COUNTER.with(|c| {
        let n = c.get().wrapping_add(1);
        c.set(n);
        n.wrapping_mul(0x9E37_79B9_7F4A_7C15)
    })
}

/// Create (or recreate) the session for game `id`.
pub fn create(id: &str, correct_json: &str, seed: u64) -> Result<(), GameConfigError> {
    let session = GameSession::new(correct_json, seed)?;
    log::debug!(
        "step game {} created with {} steps",
        id,
        session.game.correct().len()
    );
    SESSIONS.with(|s| s.borrow_mut().insert(id.to_string(), session));
    Ok(())
}

/// Execute a closure with read access to a session. `None` if unknown.
pub fn with_session<F, R>(id: &str, f: F) -> Option<R>
where
    F: FnOnce(&GameSession) -> R,
{
    SESSIONS.with(|s| s.borrow().get(id).map(f))
}

/// Execute a closure with mutable access to a session. `None` if unknown.
pub fn with_session_mut<F, R>(id: &str, f: F) -> Option<R>
where
    F: FnOnce(&mut GameSession) -> R,
{
    SESSIONS.with(|s| s.borrow_mut().get_mut(id).map(f))
}

pub fn remove(id: &str) -> bool {
    SESSIONS.with(|s| s.borrow_mut().remove(id).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::step_order::{Phase, TokenState};

    const SEQ: &str = r#"["称量","溶解","过滤","蒸发"]"#;

    #[test]
    fn wrong_click_schedules_and_tick_reverts() {
        let mut s = GameSession::new(SEQ, 42).unwrap();
        s.handle(Event::Click(2), 1_000);
        assert_eq!(s.reverts.len(), 1);
        assert_eq!(s.game.token(2).unwrap().state, TokenState::WrongFlash);

        assert!(s.tick(1_400).is_empty());
        assert_eq!(s.tick(1_500), vec![Effect::ClearFlash { token: 2 }]);
        assert_eq!(s.game.token(2).unwrap().state, TokenState::Available);
        assert!(s.reverts.is_empty());
    }

    #[test]
    fn early_revert_from_overlapping_clicks() {
        let mut s = GameSession::new(SEQ, 42).unwrap();
        s.handle(Event::Click(3), 0);
        s.handle(Event::Click(3), 300);
        // First revert clears the second flash early; second revert is a no-op.
        assert_eq!(s.tick(500), vec![Effect::ClearFlash { token: 3 }]);
        assert!(s.tick(800).is_empty());
    }

    #[test]
    fn config_change_applies_to_existing_game() {
        let mut s = GameSession::new(SEQ, 42).unwrap();
        config::replace(config::SiteConfig {
            flash_delay_ms: 800,
            ..config::SiteConfig::default()
        });
        s.handle(Event::Click(2), 0);
        assert!(s.tick(500).is_empty());
        assert_eq!(s.tick(800), vec![Effect::ClearFlash { token: 2 }]);
        config::replace(config::SiteConfig::default());
    }

    #[test]
    fn sessions_are_independent() {
        create("game-a", SEQ, 1).unwrap();
        create("game-b", SEQ, 2).unwrap();
        with_session_mut("game-a", |s| s.handle(Event::Click(0), 0));
        assert_eq!(with_session("game-a", |s| s.game.selected().len()), Some(1));
        assert_eq!(with_session("game-b", |s| s.game.selected().len()), Some(0));
        assert_eq!(
            with_session("game-b", |s| s.game.phase()),
            Some(Phase::InProgress)
        );
        assert!(remove("game-a"));
        assert!(remove("game-b"));
        assert!(with_session("game-a", |_| ()).is_none());
    }

    #[test]
    fn create_rejects_bad_sequence() {
        assert!(create("bad", "{oops", 1).is_err());
        assert!(with_session("bad", |_| ()).is_none());
    }

    #[test]
    fn seeds_differ() {
        assert_ne!(next_seed(), next_seed());
    }
}
