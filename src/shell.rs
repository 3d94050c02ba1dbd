//! Top-level routing between the studio's features.

use crate::store::CredentialStore;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AppView {
    #[default]
    Home,
    PhotoMagic,
    StoryCreator,
    ColoringBook,
    FunZone,
}

impl AppView {
    pub const ALL: &'static [AppView] = &[
        AppView::Home,
        AppView::PhotoMagic,
        AppView::StoryCreator,
        AppView::ColoringBook,
        AppView::FunZone,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AppView::Home => "Home",
            AppView::PhotoMagic => "Photo Magic",
            AppView::StoryCreator => "Stories",
            AppView::ColoringBook => "Coloring",
            AppView::FunZone => "Fun Zone",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            AppView::Home => "🏰",
            AppView::PhotoMagic => "✨",
            AppView::StoryCreator => "📚",
            AppView::ColoringBook => "🎨",
            AppView::FunZone => "🧩",
        }
    }

    /// Views whose every screen calls the generation API. The Fun Zone gates per tab.
    pub fn requires_key(&self) -> bool {
        matches!(self, AppView::PhotoMagic | AppView::StoryCreator | AppView::ColoringBook)
    }
}

impl fmt::Display for AppView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AppView {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace([' ', '-', '_'], "").as_str() {
            "home" => Ok(AppView::Home),
            "photo" | "photomagic" => Ok(AppView::PhotoMagic),
            "story" | "stories" | "storycreator" => Ok(AppView::StoryCreator),
            "coloring" | "coloringbook" => Ok(AppView::ColoringBook),
            "funzone" | "fun" | "puzzles" | "stickers" => Ok(AppView::FunZone),
            _ => Err(format!("unknown view '{}'", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FunZoneTab {
    #[default]
    Stickers,
    Puzzle,
}

impl FunZoneTab {
    pub fn requires_key(&self) -> bool {
        matches!(self, FunZoneTab::Stickers)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavItem {
    pub view: AppView,
    pub label: &'static str,
    pub icon: &'static str,
    pub locked: bool,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureCard {
    pub view: AppView,
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
}

pub const FEATURE_CARDS: &[FeatureCard] = &[
    FeatureCard {
        view: AppView::PhotoMagic,
        title: "Photo Magic",
        description: "Meet characters in real life",
        icon: "✨",
    },
    FeatureCard {
        view: AppView::StoryCreator,
        title: "Storybooks",
        description: "Star in your own adventure book",
        icon: "📚",
    },
    FeatureCard {
        view: AppView::ColoringBook,
        title: "Coloring",
        description: "Turn any photo into printable pages",
        icon: "🎨",
    },
    FeatureCard {
        view: AppView::FunZone,
        title: "Fun Zone",
        description: "Create stickers and puzzles",
        icon: "🧩",
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Opened(AppView),
    /// No key yet: the view stays put and the settings panel opens instead.
    SettingsRequired(AppView),
}

/// Current view plus the settings panel, gated on a configured key.
#[derive(Clone)]
pub struct Shell {
    current: AppView,
    settings_open: bool,
    fun_zone_tab: FunZoneTab,
    credentials: CredentialStore,
}

impl Shell {
    pub fn new(credentials: CredentialStore) -> Self {
        Self {
            current: AppView::Home,
            settings_open: false,
            fun_zone_tab: FunZoneTab::default(),
            credentials,
        }
    }

    pub fn current(&self) -> AppView {
        self.current
    }

    pub fn settings_open(&self) -> bool {
        self.settings_open
    }

    pub fn open_settings(&mut self) {
        self.settings_open = true;
    }

    pub fn close_settings(&mut self) {
        self.settings_open = false;
    }

    pub fn is_unlocked(&self) -> bool {
        self.credentials.is_set()
    }

    fn blocked(&mut self, view: AppView) -> Navigation {
        log::warn!("🔒 {} needs an API key, opening settings", view);
        self.settings_open = true;
        Navigation::SettingsRequired(view)
    }

    pub fn navigate(&mut self, view: AppView) -> Navigation {
        if view.requires_key() && !self.is_unlocked() {
            return self.blocked(view);
        }
        if view == AppView::FunZone && self.fun_zone_tab.requires_key() && !self.is_unlocked() {
            self.fun_zone_tab = FunZoneTab::Puzzle;
        }
        log::debug!("Navigating to {}", view);
        self.current = view;
        self.settings_open = false;
        Navigation::Opened(view)
    }

    pub fn fun_zone_tab(&self) -> FunZoneTab {
        self.fun_zone_tab
    }

    /// Switches the Fun Zone tab. A locked tab leaves the current one in place.
    pub fn select_tab(&mut self, tab: FunZoneTab) -> Navigation {
        if tab.requires_key() && !self.is_unlocked() {
            return self.blocked(AppView::FunZone);
        }
        self.fun_zone_tab = tab;
        Navigation::Opened(AppView::FunZone)
    }

    /// Opens the Fun Zone directly on `tab`.
    pub fn open_fun_zone(&mut self, tab: FunZoneTab) -> Navigation {
        match self.select_tab(tab) {
            Navigation::Opened(_) => self.navigate(AppView::FunZone),
            blocked => blocked,
        }
    }

    pub fn nav_items(&self) -> Vec<NavItem> {
        let unlocked = self.is_unlocked();
        AppView::ALL
            .iter()
            .map(|&view| NavItem {
                view,
                label: view.label(),
                icon: view.icon(),
                locked: view.requires_key() && !unlocked,
                active: view == self.current,
            })
            .collect()
    }

    pub fn render_nav(&self) -> String {
        self.nav_items()
            .iter()
            .map(|item| {
                let marker = if item.active { "▶" } else { " " };
                let lock = if item.locked { " 🔒" } else { "" };
                format!("{} {} {}{}", marker, item.icon, item.label, lock)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use std::sync::Arc;

    fn shell() -> Shell {
        Shell::new(CredentialStore::new(Arc::new(MemoryStore::new())))
    }

    #[test]
    fn locked_views_open_settings() {
        let mut shell = shell();
        assert_eq!(shell.navigate(AppView::Home), Navigation::Opened(AppView::Home));
        assert_eq!(
            shell.navigate(AppView::ColoringBook),
            Navigation::SettingsRequired(AppView::ColoringBook)
        );
        assert_eq!(shell.current(), AppView::Home);
        assert!(shell.settings_open());
        assert!(shell.nav_items().iter().filter(|i| i.locked).count() == 3);
    }

    #[test]
    fn puzzle_tab_stays_open_without_a_key() {
        let mut shell = shell();
        assert_eq!(shell.navigate(AppView::FunZone), Navigation::Opened(AppView::FunZone));
        assert_eq!(shell.fun_zone_tab(), FunZoneTab::Puzzle);
        assert!(!shell.settings_open());

        assert_eq!(
            shell.select_tab(FunZoneTab::Stickers),
            Navigation::SettingsRequired(AppView::FunZone)
        );
        assert_eq!(shell.fun_zone_tab(), FunZoneTab::Puzzle);
        assert!(shell.settings_open());

        let mut fresh = self::shell();
        assert_eq!(
            fresh.open_fun_zone(FunZoneTab::Stickers),
            Navigation::SettingsRequired(AppView::FunZone)
        );
        assert_eq!(fresh.current(), AppView::Home);
        assert_eq!(fresh.open_fun_zone(FunZoneTab::Puzzle), Navigation::Opened(AppView::FunZone));
        assert!(!fresh.nav_items().iter().any(|i| i.view == AppView::FunZone && i.locked));
    }

    #[test]
    fn key_unlocks_every_view() {
        let creds = CredentialStore::new(Arc::new(MemoryStore::new()));
        let mut shell = Shell::new(creds.clone());
        shell.open_settings();
        creds.set("AIza-test").unwrap();

        for &view in AppView::ALL {
            assert_eq!(shell.navigate(view), Navigation::Opened(view));
        }
        assert!(!shell.settings_open());
        assert_eq!(shell.current(), AppView::FunZone);
        assert!(shell.nav_items().iter().all(|i| !i.locked));
        assert!(shell.render_nav().ends_with("▶ 🧩 Fun Zone"));

        assert_eq!(shell.select_tab(FunZoneTab::Stickers), Navigation::Opened(AppView::FunZone));
        assert_eq!(shell.fun_zone_tab(), FunZoneTab::Stickers);
        assert_eq!(shell.open_fun_zone(FunZoneTab::Puzzle), Navigation::Opened(AppView::FunZone));
        assert_eq!(shell.fun_zone_tab(), FunZoneTab::Puzzle);
    }

    #[test]
    fn views_parse_from_cli_names() {
        assert_eq!("photo".parse::<AppView>().unwrap(), AppView::PhotoMagic);
        assert_eq!("Fun Zone".parse::<AppView>().unwrap(), AppView::FunZone);
        assert_eq!("coloring-book".parse::<AppView>().unwrap(), AppView::ColoringBook);
        assert!("admin".parse::<AppView>().is_err());
        assert!(FEATURE_CARDS.iter().all(|c| c.view != AppView::Home));
    }
}
