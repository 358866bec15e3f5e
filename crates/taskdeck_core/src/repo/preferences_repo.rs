//! Theme preference persistence under the `theme` key.

use crate::model::theme::Theme;
use crate::repo::kv_store::{KeyValueStore, KvResult};
use log::warn;

/// Storage key holding the theme name.
pub const THEME_KEY: &str = "theme";

/// Repository interface for user display preferences.
pub trait PreferencesRepository {
    /// Loads the stored theme. Absent or unknown values fall back to light.
    fn load_theme(&self) -> KvResult<Theme>;
    fn save_theme(&self, theme: Theme) -> KvResult<()>;
}

pub struct KvPreferencesRepository<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> KvPreferencesRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

impl<S: KeyValueStore> PreferencesRepository for KvPreferencesRepository<S> {
    fn load_theme(&self) -> KvResult<Theme> {
        let Some(raw) = self.store.get_item(THEME_KEY)? else {
            return Ok(Theme::default());
        };
        Ok(Theme::parse(&raw).unwrap_or_else(|| {
            warn!("event=theme_load module=prefs status=fallback reason=unknown_value");
            Theme::default()
        }))
    }

    fn save_theme(&self, theme: Theme) -> KvResult<()> {
        self.store.set_item(THEME_KEY, theme.as_str())
    }
}
