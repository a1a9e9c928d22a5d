//! Preference value types and their validation.
//!
//! Every type here parses from the raw string found in storage (or posted by
//! the page) and returns `None` for anything outside its declared shape, so
//! corrupted or foreign data can never leak past the parser.

/// Color theme, mirrored onto `<html data-theme="…">`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Toggle button text names the theme a click switches *to*.
    pub fn button_label(self) -> &'static str {
        match self {
            Theme::Light => "暗色",
            Theme::Dark => "亮色",
        }
    }
}

/// Body text size. Stored and applied as one of three root CSS classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl FontSize {
    pub const ALL: [FontSize; 3] = [FontSize::Small, FontSize::Medium, FontSize::Large];

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.class_name() == raw)
    }

    pub fn class_name(self) -> &'static str {
        match self {
            FontSize::Small => "font-sm",
            FontSize::Medium => "font-md",
            FontSize::Large => "font-lg",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FontSize::Small => "A-",
            FontSize::Medium => "A",
            FontSize::Large => "A+",
        }
    }
}

/// Experiments the visitor has marked as learned.
///
/// Insertion order is kept so the persisted JSON list stays stable across
/// toggles of unrelated ids. Never contains duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LearnedSet {
    ids: Vec<String>,
}

impl LearnedSet {
    /// Parse the persisted JSON list. Anything that is not a list of strings
    /// is rejected; duplicate entries collapse to the first occurrence.
    pub fn parse(raw: &str) -> Option<Self> {
        let list: Vec<String> = serde_json::from_str(raw).ok()?;
        let mut set = LearnedSet::default();
        for id in list {
            if !set.contains(&id) {
                set.ids.push(id);
            }
        }
        Some(set)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.ids).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|x| x == id)
    }

    /// Add `id` if absent, remove it if present. Returns the new membership.
    pub fn toggle(&mut self, id: &str) -> bool {
        match self.ids.iter().position(|x| x == id) {
            Some(idx) => {
                self.ids.remove(idx);
                false
            }
            None => {
                self.ids.push(id.to_string());
                true
            }
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }
}

/// Learning progress over the experiments listed on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub count: usize,
    pub total: usize,
    /// `count / total * 100`, rounded half up.
    pub percent: u32,
}

impl Progress {
    /// `None` when the page lists no experiments.
    pub fn new(count: usize, total: usize) -> Option<Self> {
        if total == 0 {
            return None;
        }
        let percent = (count as f64 / total as f64 * 100.0).round() as u32;
        Some(Self {
            count,
            total,
            percent,
        })
    }
}

/// The independently persisted preference keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefKey {
    Theme,
    FontSize,
    Learned,
}

/// A validated preference value, as returned by `PreferenceStore::get`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrefValue {
    Theme(Theme),
    FontSize(FontSize),
    Learned(LearnedSet),
}
