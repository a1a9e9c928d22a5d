//! `PreferenceStore` — validated, write-through preference persistence.
//!
//! The in-memory copy is authoritative for the lifetime of the page: `set`
//! and `toggle_learned` update it first and then write through to the
//! backing [`KeyValueStore`]. A failed write is logged and dropped, so the
//! page keeps working and the preference just does not survive a reload.

use crate::config::SiteConfig;
use crate::prefs::model::{FontSize, LearnedSet, PrefKey, PrefValue, Progress, Theme};
use crate::store::KeyValueStore;

pub struct PreferenceStore<S: KeyValueStore> {
    store: S,
    theme_key: String,
    font_key: String,
    learned_key: String,
    theme: Theme,
    font_size: FontSize,
    learned: LearnedSet,
}

impl<S: KeyValueStore> PreferenceStore<S> {
    /// Wrap a backing store. Values start at their defaults until [`load`]
    /// is called.
    ///
    /// [`load`]: PreferenceStore::load
    pub fn new(store: S, config: &SiteConfig) -> Self {
        Self {
            store,
            theme_key: config.theme_key.clone(),
            font_key: config.font_key.clone(),
            learned_key: config.learned_key.clone(),
            theme: Theme::default(),
            font_size: FontSize::default(),
            learned: LearnedSet::default(),
        }
    }

    /// Read every preference once, as on page load.
    ///
    /// Theme and font size fall back to their defaults when the stored value
    /// is missing or invalid, and the default is written back so it sticks.
    /// The learned set falls back to empty without writing anything.
    pub fn load(&mut self) {
        self.theme = match self.read(&self.theme_key).as_deref().and_then(Theme::parse) {
            Some(theme) => theme,
            None => {
                let theme = Theme::default();
                self.persist(PrefKey::Theme, theme.as_str());
                theme
            }
        };

        self.font_size = match self.read(&self.font_key).as_deref().and_then(FontSize::parse) {
            Some(font) => font,
            None => {
                let font = FontSize::default();
                self.persist(PrefKey::FontSize, font.class_name());
                font
            }
        };

        self.learned = self
            .read(&self.learned_key)
            .as_deref()
            .and_then(LearnedSet::parse)
            .unwrap_or_default();

        log::debug!(
            "preferences loaded: theme={} font={} learned={}",
            self.theme.as_str(),
            self.font_size.class_name(),
            self.learned.len()
        );
    }

    pub fn get(&self, key: PrefKey) -> PrefValue {
        match key {
            PrefKey::Theme => PrefValue::Theme(self.theme),
            PrefKey::FontSize => PrefValue::FontSize(self.font_size),
            PrefKey::Learned => PrefValue::Learned(self.learned.clone()),
        }
    }

    /// Validate `raw` against the key's shape and apply it. Returns `false`
    /// (and changes nothing) for invalid input.
    pub fn set(&mut self, key: PrefKey, raw: &str) -> bool {
        match key {
            PrefKey::Theme => match Theme::parse(raw) {
                Some(theme) => {
                    self.set_theme(theme);
                    true
                }
                None => false,
            },
            PrefKey::FontSize => match FontSize::parse(raw) {
                Some(font) => {
                    self.set_font_size(font);
                    true
                }
                None => false,
            },
            PrefKey::Learned => match LearnedSet::parse(raw) {
                Some(set) => {
                    self.learned = set;
                    let json = self.learned.to_json();
                    self.persist(PrefKey::Learned, &json);
                    true
                }
                None => false,
            },
        }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        self.persist(PrefKey::Theme, theme.as_str());
    }

    /// Flip between light and dark. Returns the new theme.
    pub fn toggle_theme(&mut self) -> Theme {
        let next = self.theme.toggled();
        self.set_theme(next);
        next
    }

    pub fn font_size(&self) -> FontSize {
        self.font_size
    }

    pub fn set_font_size(&mut self, font: FontSize) {
        self.font_size = font;
        self.persist(PrefKey::FontSize, font.class_name());
    }

    pub fn learned(&self) -> &LearnedSet {
        &self.learned
    }

    pub fn is_learned(&self, id: &str) -> bool {
        self.learned.contains(id)
    }

    /// Add or remove `id` from the learned set. Returns the new membership.
    pub fn toggle_learned(&mut self, id: &str) -> bool {
        let learned = self.learned.toggle(id);
        let json = self.learned.to_json();
        self.persist(PrefKey::Learned, &json);
        learned
    }

    /// Progress against the `total` experiments listed on the current page.
    pub fn progress(&self, total: usize) -> Option<Progress> {
        Progress::new(self.learned.len(), total)
    }

    pub fn backing_store(&self) -> &S {
        &self.store
    }

    fn key_name(&self, key: PrefKey) -> &str {
        match key {
            PrefKey::Theme => &self.theme_key,
            PrefKey::FontSize => &self.font_key,
            PrefKey::Learned => &self.learned_key,
        }
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("preference read of {} failed: {}", key, e);
                None
            }
        }
    }

    fn persist(&mut self, key: PrefKey, value: &str) {
        let name = self.key_name(key).to_string();
        if let Err(e) = self.store.set(&name, value) {
            log::warn!("preference {} not persisted: {}", name, e);
        }
    }
}
