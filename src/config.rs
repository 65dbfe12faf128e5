use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Host config section holding the panel's own toggles.
pub const CONFIG_SECTION: &str = "SceneTreeView";
/// Host config section shared with the host's main window.
pub const BASIC_WINDOW_SECTION: &str = "BasicWindow";

pub const SHOW_SCENE_ICONS_KEY: &str = "ShowSceneIcons";
pub const SHOW_FOLDER_ICONS_KEY: &str = "ShowFolderIcons";
pub const SHOW_LISTBOX_TOOLBARS_KEY: &str = "ShowListboxToolbars";
pub const TRANSITION_ON_DOUBLE_CLICK_KEY: &str = "TransitionOnDoubleClick";

#[derive(Debug, Clone, Deserialize)]
pub struct PanelConfig {
    /// File name of the persisted hierarchy inside the module config directory.
    #[serde(default = "PanelConfig::default_tree_file")]
    pub tree_file: String,
    /// Localized template for new folders; `%1` receives a counter starting at 0.
    #[serde(default = "PanelConfig::default_folder_name")]
    pub default_folder_name: String,
    /// Name the dock registers its event sink under.
    #[serde(default = "PanelConfig::default_listener_name")]
    pub listener_name: String,
}

impl PanelConfig {
    fn default_tree_file() -> String {
        "scene_tree.json".to_string()
    }

    fn default_folder_name() -> String {
        "Folder %1".to_string()
    }

    fn default_listener_name() -> String {
        "scene_tree_view".to_string()
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes =
            fs::read(path).with_context(|| format!("Failed to read panel config {}", path.display()))?;
        let cfg = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse panel config {}", path.display()))?;
        Ok(cfg)
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                log::warn!(target: "scene_tree", "Panel config load error: {err:?}. Falling back to defaults.");
                Self::default()
            }
        }
    }
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            tree_file: Self::default_tree_file(),
            default_folder_name: Self::default_folder_name(),
            listener_name: Self::default_listener_name(),
        }
    }
}
