use std::fmt;
use std::path::PathBuf;

use crate::events::ListenerId;

/// Stable identity the host mints once per scene. Never derived from a live pointer, so the
/// identity index keeps working after the scene itself is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SceneKey(pub u64);

impl fmt::Display for SceneKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scene#{}", self.0)
    }
}

/// Weak reference to a host-owned scene.
///
/// Weak references are refcounted by the host. The type is move-only: every `WeakScene` handed
/// out by [`SceneHost`] must end up either stored in the tree or passed back through
/// [`SceneHost::release`], and can never be released twice.
#[derive(Debug, PartialEq, Eq)]
pub struct WeakScene {
    key: SceneKey,
}

impl WeakScene {
    /// Only host implementations should mint these, after taking a weak reference host-side.
    pub fn new(key: SceneKey) -> Self {
        Self { key }
    }

    pub fn key(&self) -> SceneKey {
        self.key
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

/// Snapshot of a live scene, valid until the next host callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneInfo {
    pub key: SceneKey,
    pub name: String,
    /// `Some` when the scene overrides the program canvas size.
    pub canvas: Option<CanvasSize>,
}

impl SceneInfo {
    pub fn new(key: SceneKey, name: impl Into<String>) -> Self {
        Self { key, name: name.into(), canvas: None }
    }
}

/// A scene as enumerated by the host, together with a freshly acquired weak reference.
#[derive(Debug)]
pub struct SceneEntry {
    pub weak: WeakScene,
    pub info: SceneInfo,
}

/// Outcome of upgrading a [`WeakScene`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneLookup {
    Resolved(SceneInfo),
    Gone,
}

impl SceneLookup {
    pub fn resolved(self) -> Option<SceneInfo> {
        match self {
            SceneLookup::Resolved(info) => Some(info),
            SceneLookup::Gone => None,
        }
    }
}

/// Decides which host scenes the panel manages at all.
pub type ManagedSceneFilter = Box<dyn Fn(&SceneInfo) -> bool>;

/// Skips scenes with their own canvas size.
pub fn default_scene_filter() -> ManagedSceneFilter {
    Box::new(|info: &SceneInfo| info.canvas.is_none())
}

/// Narrow interface to the host application, injected into the dock at construction.
///
/// Read paths and weak-reference bookkeeping take `&self`; host actions take `&mut self`.
pub trait SceneHost {
    /// All current scenes, unordered. Each entry owns a new weak reference.
    fn enumerate_scenes(&self) -> Vec<SceneEntry>;

    /// Resolve a scene by its display name.
    fn scene_by_name(&self, name: &str) -> Option<SceneEntry>;

    /// Try to reach the scene behind a weak reference.
    fn upgrade(&self, weak: &WeakScene) -> SceneLookup;

    /// Give a weak reference back to the host.
    fn release(&self, weak: WeakScene);

    fn current_scene(&self) -> Option<SceneKey>;

    fn current_preview_scene(&self) -> Option<SceneKey>;

    fn set_current_scene(&mut self, scene: SceneKey);

    fn set_current_preview_scene(&mut self, scene: SceneKey);

    /// True while the host runs split preview/program mode.
    fn preview_program_mode(&self) -> bool;

    fn current_collection(&self) -> Option<String>;

    fn config_bool(&self, section: &str, key: &str) -> Option<bool>;

    fn set_config_bool(&mut self, section: &str, key: &str, value: bool);

    fn set_default_config_bool(&mut self, section: &str, key: &str, value: bool);

    /// Run the host's own "add scene" action.
    fn trigger_add_scene(&mut self);

    /// Ask the host to remove a scene. Removal may be deferred.
    fn request_remove_scene(&mut self, scene: SceneKey);

    /// Run the host's own scene rename.
    fn rename_scene(&mut self, scene: SceneKey, name: &str);

    fn add_event_listener(&mut self, listener: &ListenerId);

    fn remove_event_listener(&mut self, listener: &ListenerId);

    /// Absolute path of a file inside the module's config directory.
    fn config_path(&self, file_name: &str) -> PathBuf;
}

impl<H: SceneHost + ?Sized> SceneHost for &mut H {
    fn enumerate_scenes(&self) -> Vec<SceneEntry> {
        (**self).enumerate_scenes()
    }

    fn scene_by_name(&self, name: &str) -> Option<SceneEntry> {
        (**self).scene_by_name(name)
    }

    fn upgrade(&self, weak: &WeakScene) -> SceneLookup {
        (**self).upgrade(weak)
    }

    fn release(&self, weak: WeakScene) {
        (**self).release(weak)
    }

    fn current_scene(&self) -> Option<SceneKey> {
        (**self).current_scene()
    }

    fn current_preview_scene(&self) -> Option<SceneKey> {
        (**self).current_preview_scene()
    }

    fn set_current_scene(&mut self, scene: SceneKey) {
        (**self).set_current_scene(scene)
    }

    fn set_current_preview_scene(&mut self, scene: SceneKey) {
        (**self).set_current_preview_scene(scene)
    }

    fn preview_program_mode(&self) -> bool {
        (**self).preview_program_mode()
    }

    fn current_collection(&self) -> Option<String> {
        (**self).current_collection()
    }

    fn config_bool(&self, section: &str, key: &str) -> Option<bool> {
        (**self).config_bool(section, key)
    }

    fn set_config_bool(&mut self, section: &str, key: &str, value: bool) {
        (**self).set_config_bool(section, key, value)
    }

    fn set_default_config_bool(&mut self, section: &str, key: &str, value: bool) {
        (**self).set_default_config_bool(section, key, value)
    }

    fn trigger_add_scene(&mut self) {
        (**self).trigger_add_scene()
    }

    fn request_remove_scene(&mut self, scene: SceneKey) {
        (**self).request_remove_scene(scene)
    }

    fn rename_scene(&mut self, scene: SceneKey, name: &str) {
        (**self).rename_scene(scene, name)
    }

    fn add_event_listener(&mut self, listener: &ListenerId) {
        (**self).add_event_listener(listener)
    }

    fn remove_event_listener(&mut self, listener: &ListenerId) {
        (**self).remove_event_listener(listener)
    }

    fn config_path(&self, file_name: &str) -> PathBuf {
        (**self).config_path(file_name)
    }
}
