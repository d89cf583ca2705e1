use catalog::Category;
use serde::{Deserialize, Serialize};

/// Per-category visibility flags.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterState {
    pub primary: bool,
    pub secondary: bool,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            primary: true,
            secondary: false,
        }
    }
}

impl FilterState {
    pub fn new(primary: bool, secondary: bool) -> Self {
        Self { primary, secondary }
    }

    pub fn is_visible(&self, category: Category) -> bool {
        match category {
            Category::Primary => self.primary,
            Category::Secondary => self.secondary,
        }
    }

    /// Returns `true` if the flag changed.
    pub fn set(&mut self, category: Category, visible: bool) -> bool {
        let slot = match category {
            Category::Primary => &mut self.primary,
            Category::Secondary => &mut self.secondary,
        };
        let changed = *slot != visible;
        *slot = visible;
        changed
    }

    /// Flips the flag and returns its new value.
    pub fn toggle(&mut self, category: Category) -> bool {
        let next = !self.is_visible(category);
        self.set(category, next);
        next
    }
}
