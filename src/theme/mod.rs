//! Light/dark theme
//!
//! The user picks `light`, `dark` or `system`; the page renders with the
//! resolved theme. The preference is persisted under the `theme` key of the
//! [`PreferenceStore`].
//!
//! There is one process-wide [`ThemeStore`], installed with [`init`] and read
//! with [`global`]. Interested parties call [`ThemeStore::subscribe`] and
//! receive a [`ThemeChange`] whenever the preference or the resolved theme
//! changes.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

mod palette;
mod store;

pub use palette::{Palette, Rgb, DARK, LIGHT};
pub use store::{PreferenceError, PreferenceStore};

/// Preference key holding the theme
pub const THEME_KEY: &str = "mantej-portfolio-theme";

/// Environment variable forcing the system appearance (`light` or `dark`)
pub const COLOR_SCHEME_ENV: &str = "PRISM_FOLIO_COLOR_SCHEME";

/// What the user asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    /// Always light
    Light,
    /// Always dark
    Dark,
    /// Follow the desktop
    #[default]
    System,
}

impl ThemePreference {
    /// Stored representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::System => "system",
        }
    }

    /// Preference after pressing the toggle.
    ///
    /// Leaving `system` switches to the opposite of what is currently shown.
    pub fn toggled(self, resolved: ResolvedTheme) -> Self {
        match self {
            Self::System => match resolved {
                ResolvedTheme::Dark => Self::Light,
                ResolvedTheme::Light => Self::Dark,
            },
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    /// Resolve against the system appearance
    pub fn resolve(self, system: ResolvedTheme) -> ResolvedTheme {
        match self {
            Self::Light => ResolvedTheme::Light,
            Self::Dark => ResolvedTheme::Dark,
            Self::System => system,
        }
    }

    /// Accessible label for the toggle button
    pub fn toggle_label(self, resolved: ResolvedTheme) -> &'static str {
        match (self, resolved) {
            (Self::System, _) => "Switch to manual theme control",
            (_, ResolvedTheme::Dark) => "Switch to light mode",
            (_, ResolvedTheme::Light) => "Switch to dark mode",
        }
    }
}

impl fmt::Display for ThemePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemePreference {
    type Err = PreferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            "system" => Ok(Self::System),
            _ => Err(PreferenceError::InvalidValue {
                key: THEME_KEY.to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Theme actually rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolvedTheme {
    /// Light colors
    Light,
    /// Dark colors
    Dark,
}

impl fmt::Display for ResolvedTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Light => "light",
            Self::Dark => "dark",
        })
    }
}

/// Source of the desktop's light/dark appearance
#[cfg_attr(test, mockall::automock)]
pub trait SystemAppearance: Send + Sync {
    /// Current appearance
    fn appearance(&self) -> ResolvedTheme;
}

/// Reads the appearance from the environment.
///
/// `PRISM_FOLIO_COLOR_SCHEME` wins when set; otherwise a `GTK_THEME` ending
/// in `:dark` means dark. Anything else is light.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvAppearance;

impl EnvAppearance {
    fn detect(scheme: Option<&str>, gtk_theme: Option<&str>) -> ResolvedTheme {
        match scheme.map(|s| s.trim().to_ascii_lowercase()) {
            Some(s) if s == "dark" => return ResolvedTheme::Dark,
            Some(s) if s == "light" => return ResolvedTheme::Light,
            _ => {}
        }
        match gtk_theme {
            Some(theme) if theme.to_ascii_lowercase().contains(":dark") => ResolvedTheme::Dark,
            _ => ResolvedTheme::Light,
        }
    }
}

impl SystemAppearance for EnvAppearance {
    fn appearance(&self) -> ResolvedTheme {
        let scheme = std::env::var(COLOR_SCHEME_ENV).ok();
        let gtk = std::env::var("GTK_THEME").ok();
        Self::detect(scheme.as_deref(), gtk.as_deref())
    }
}

/// Notification sent to subscribers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ThemeChange {
    /// New preference
    pub preference: ThemePreference,
    /// New resolved theme
    pub resolved: ResolvedTheme,
}

/// Theme state with persistence and observers
pub struct ThemeStore {
    preference: ThemePreference,
    system: ResolvedTheme,
    appearance: Box<dyn SystemAppearance>,
    preferences: PreferenceStore,
    observers: Vec<Sender<ThemeChange>>,
}

impl fmt::Debug for ThemeStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeStore")
            .field("preference", &self.preference)
            .field("system", &self.system)
            .field("preferences", &self.preferences)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl ThemeStore {
    /// Read the persisted preference, defaulting to `system`
    pub fn new(preferences: PreferenceStore, appearance: Box<dyn SystemAppearance>) -> Self {
        let preference = match preferences.get(THEME_KEY).map(str::parse::<ThemePreference>) {
            Some(Ok(preference)) => preference,
            Some(Err(e)) => {
                warn!("Ignoring stored theme: {}", e);
                ThemePreference::System
            }
            None => ThemePreference::System,
        };
        let system = appearance.appearance();
        debug!("Theme store: preference {}, system {}", preference, system);

        Self {
            preference,
            system,
            appearance,
            preferences,
            observers: Vec::new(),
        }
    }

    /// Stored preference
    pub fn preference(&self) -> ThemePreference {
        self.preference
    }

    /// Theme to render
    pub fn resolved(&self) -> ResolvedTheme {
        self.preference.resolve(self.system)
    }

    /// Colors for the resolved theme
    pub fn palette(&self) -> &'static Palette {
        Palette::for_theme(self.resolved())
    }

    /// Label for the toggle button
    pub fn toggle_label(&self) -> &'static str {
        self.preference.toggle_label(self.resolved())
    }

    /// Receive every future change
    pub fn subscribe(&mut self) -> Receiver<ThemeChange> {
        let (tx, rx) = unbounded();
        self.observers.push(tx);
        rx
    }

    /// Change and persist the preference.
    ///
    /// The in-memory preference changes even if persisting fails.
    pub fn set_preference(&mut self, preference: ThemePreference) -> Result<(), PreferenceError> {
        if preference == self.preference {
            return Ok(());
        }
        info!("Theme preference: {} -> {}", self.preference, preference);
        self.preference = preference;
        self.notify();
        self.preferences.set(THEME_KEY, preference.as_str())
    }

    /// Apply the toggle button
    pub fn toggle(&mut self) -> Result<ThemePreference, PreferenceError> {
        let next = self.preference.toggled(self.resolved());
        self.set_preference(next)?;
        Ok(next)
    }

    /// Re-read the system appearance; returns whether the rendered theme changed
    pub fn refresh_system(&mut self) -> bool {
        let system = self.appearance.appearance();
        if system == self.system {
            return false;
        }
        let before = self.resolved();
        self.system = system;
        let changed = before != self.resolved();
        if changed {
            debug!("System appearance changed to {}", system);
            self.notify();
        }
        changed
    }

    fn notify(&mut self) {
        let change = ThemeChange {
            preference: self.preference,
            resolved: self.resolved(),
        };
        // Dropped receivers unsubscribe themselves
        self.observers.retain(|tx| tx.send(change).is_ok());
    }
}

static GLOBAL: OnceLock<Mutex<ThemeStore>> = OnceLock::new();

/// Install the process-wide theme store.
///
/// Only the first call installs; later stores are dropped with a warning.
pub fn init(store: ThemeStore) -> &'static Mutex<ThemeStore> {
    let mut installed = false;
    let global = GLOBAL.get_or_init(|| {
        installed = true;
        Mutex::new(store)
    });
    if installed {
        info!("Theme initialized: {}", global.lock().resolved());
    } else {
        warn!("Theme store already initialized; keeping the existing one");
    }
    global
}

/// The process-wide theme store, if [`init`] has run
pub fn global() -> Option<&'static Mutex<ThemeStore>> {
    GLOBAL.get()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed(theme: ResolvedTheme) -> Box<dyn SystemAppearance> {
        let mut mock = MockSystemAppearance::new();
        mock.expect_appearance().return_const(theme);
        Box::new(mock)
    }

    #[test]
    fn test_toggle_semantics() {
        use ResolvedTheme as R;
        use ThemePreference as P;
        assert_eq!(P::System.toggled(R::Dark), P::Light);
        assert_eq!(P::System.toggled(R::Light), P::Dark);
        assert_eq!(P::Dark.toggled(R::Dark), P::Light);
        assert_eq!(P::Light.toggled(R::Light), P::Dark);
    }

    #[test]
    fn test_labels() {
        use ResolvedTheme as R;
        use ThemePreference as P;
        assert_eq!(P::System.toggle_label(R::Dark), "Switch to manual theme control");
        assert_eq!(P::Dark.toggle_label(R::Dark), "Switch to light mode");
        assert_eq!(P::Light.toggle_label(R::Light), "Switch to dark mode");
    }

    #[test]
    fn test_parse_preference() {
        assert_eq!("Dark".parse::<ThemePreference>().unwrap(), ThemePreference::Dark);
        assert!("sepia".parse::<ThemePreference>().is_err());
    }

    #[test]
    fn test_env_detection() {
        assert_eq!(EnvAppearance::detect(Some("dark"), None), ResolvedTheme::Dark);
        assert_eq!(
            EnvAppearance::detect(Some("light"), Some("Adwaita:dark")),
            ResolvedTheme::Light
        );
        assert_eq!(EnvAppearance::detect(None, Some("Adwaita:dark")), ResolvedTheme::Dark);
        assert_eq!(EnvAppearance::detect(None, None), ResolvedTheme::Light);
    }

    #[test]
    fn test_defaults_to_system() {
        let store = ThemeStore::new(PreferenceStore::in_memory(), fixed(ResolvedTheme::Dark));
        assert_eq!(store.preference(), ThemePreference::System);
        assert_eq!(store.resolved(), ResolvedTheme::Dark);
        assert_eq!(store.palette(), &DARK);
    }

    #[test]
    fn test_invalid_stored_value_falls_back() {
        let mut prefs = PreferenceStore::in_memory();
        prefs.set(THEME_KEY, "sepia").unwrap();
        let store = ThemeStore::new(prefs, fixed(ResolvedTheme::Light));
        assert_eq!(store.preference(), ThemePreference::System);
    }

    #[test]
    fn test_observers_notified() {
        let mut store = ThemeStore::new(PreferenceStore::in_memory(), fixed(ResolvedTheme::Dark));
        let rx = store.subscribe();

        assert_eq!(store.toggle().unwrap(), ThemePreference::Light);
        assert_eq!(
            rx.try_recv().unwrap(),
            ThemeChange {
                preference: ThemePreference::Light,
                resolved: ResolvedTheme::Light,
            }
        );

        // Same preference again is not a change
        store.set_preference(ThemePreference::Light).unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_dropped_subscriber_removed() {
        let mut store = ThemeStore::new(PreferenceStore::in_memory(), fixed(ResolvedTheme::Dark));
        drop(store.subscribe());
        store.set_preference(ThemePreference::Dark).unwrap();
        assert!(store.observers.is_empty());
    }

    #[test]
    fn test_refresh_system() {
        let mut mock = MockSystemAppearance::new();
        let mut seq = mockall::Sequence::new();
        mock.expect_appearance()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(ResolvedTheme::Light);
        mock.expect_appearance()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(ResolvedTheme::Dark);

        let mut store = ThemeStore::new(PreferenceStore::in_memory(), Box::new(mock));
        let rx = store.subscribe();
        assert!(store.refresh_system());
        assert_eq!(rx.try_recv().unwrap().resolved, ResolvedTheme::Dark);
    }
}
