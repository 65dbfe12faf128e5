#![allow(dead_code)]

use scene_tree_view::events::ListenerId;
use scene_tree_view::host::{CanvasSize, SceneEntry, SceneHost, SceneInfo, SceneKey, SceneLookup, WeakScene};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;
use tempfile::TempDir;

/// In-memory host that counts the weak references it hands out.
pub struct FakeHost {
    scenes: Vec<SceneInfo>,
    next_key: u64,
    weak_refs: RefCell<HashMap<SceneKey, isize>>,
    pub current: Option<SceneKey>,
    pub preview: Option<SceneKey>,
    pub preview_mode: bool,
    pub collection: Option<String>,
    pub config: HashMap<(String, String), bool>,
    pub listeners: Vec<ListenerId>,
    /// When set, removal requests queue up instead of taking effect.
    pub defer_removal: bool,
    pub removal_requests: Vec<SceneKey>,
    pub add_scene_requests: usize,
    pub program_switches: usize,
    pub preview_switches: usize,
    config_dir: TempDir,
}

impl FakeHost {
    pub fn new() -> Self {
        Self {
            scenes: Vec::new(),
            next_key: 1,
            weak_refs: RefCell::new(HashMap::new()),
            current: None,
            preview: None,
            preview_mode: false,
            collection: Some("Untitled".to_string()),
            config: HashMap::new(),
            listeners: Vec::new(),
            defer_removal: false,
            removal_requests: Vec::new(),
            add_scene_requests: 0,
            program_switches: 0,
            preview_switches: 0,
            config_dir: tempfile::tempdir().expect("config dir"),
        }
    }

    pub fn with_scenes(names: &[&str]) -> Self {
        let mut host = Self::new();
        for name in names {
            host.add_scene(name);
        }
        host
    }

    pub fn add_scene(&mut self, name: &str) -> SceneKey {
        let key = SceneKey(self.next_key);
        self.next_key += 1;
        self.scenes.push(SceneInfo::new(key, name));
        key
    }

    pub fn add_scene_with_canvas(&mut self, name: &str) -> SceneKey {
        let key = self.add_scene(name);
        if let Some(scene) = self.scenes.iter_mut().find(|scene| scene.key == key) {
            scene.canvas = Some(CanvasSize { width: 1080, height: 1920 });
        }
        key
    }

    /// Destroy a scene outright; weak references to it stay outstanding until released.
    pub fn destroy(&mut self, key: SceneKey) {
        self.scenes.retain(|scene| scene.key != key);
        if self.current == Some(key) {
            self.current = None;
        }
        if self.preview == Some(key) {
            self.preview = None;
        }
    }

    /// Carry out deferred removal requests.
    pub fn flush_removals(&mut self) {
        for key in std::mem::take(&mut self.removal_requests) {
            self.destroy(key);
        }
    }

    pub fn key_of(&self, name: &str) -> SceneKey {
        self.scenes.iter().find(|scene| scene.name == name).map(|scene| scene.key).expect("scene exists")
    }

    pub fn scene_count(&self) -> usize {
        self.scenes.len()
    }

    pub fn outstanding(&self, key: SceneKey) -> isize {
        self.weak_refs.borrow().get(&key).copied().unwrap_or(0)
    }

    pub fn total_outstanding(&self) -> isize {
        self.weak_refs.borrow().values().sum()
    }

    pub fn tree_file(&self) -> PathBuf {
        self.config_path("scene_tree.json")
    }

    fn mint(&self, info: &SceneInfo) -> SceneEntry {
        *self.weak_refs.borrow_mut().entry(info.key).or_insert(0) += 1;
        SceneEntry { weak: WeakScene::new(info.key), info: info.clone() }
    }
}

impl SceneHost for FakeHost {
    fn enumerate_scenes(&self) -> Vec<SceneEntry> {
        self.scenes.iter().map(|info| self.mint(info)).collect()
    }

    fn scene_by_name(&self, name: &str) -> Option<SceneEntry> {
        self.scenes.iter().find(|scene| scene.name == name).map(|info| self.mint(info))
    }

    fn upgrade(&self, weak: &WeakScene) -> SceneLookup {
        match self.scenes.iter().find(|scene| scene.key == weak.key()) {
            Some(info) => SceneLookup::Resolved(info.clone()),
            None => SceneLookup::Gone,
        }
    }

    fn release(&self, weak: WeakScene) {
        let mut refs = self.weak_refs.borrow_mut();
        let count = refs.entry(weak.key()).or_insert(0);
        *count -= 1;
        assert!(*count >= 0, "{} released more often than acquired", weak.key());
    }

    fn current_scene(&self) -> Option<SceneKey> {
        self.current
    }

    fn current_preview_scene(&self) -> Option<SceneKey> {
        self.preview
    }

    fn set_current_scene(&mut self, scene: SceneKey) {
        self.current = Some(scene);
        self.program_switches += 1;
    }

    fn set_current_preview_scene(&mut self, scene: SceneKey) {
        self.preview = Some(scene);
        self.preview_switches += 1;
    }

    fn preview_program_mode(&self) -> bool {
        self.preview_mode
    }

    fn current_collection(&self) -> Option<String> {
        self.collection.clone()
    }

    fn config_bool(&self, section: &str, key: &str) -> Option<bool> {
        self.config.get(&(section.to_string(), key.to_string())).copied()
    }

    fn set_config_bool(&mut self, section: &str, key: &str, value: bool) {
        self.config.insert((section.to_string(), key.to_string()), value);
    }

    fn set_default_config_bool(&mut self, section: &str, key: &str, value: bool) {
        self.config.entry((section.to_string(), key.to_string())).or_insert(value);
    }

    fn trigger_add_scene(&mut self) {
        self.add_scene_requests += 1;
    }

    fn request_remove_scene(&mut self, scene: SceneKey) {
        if self.defer_removal {
            self.removal_requests.push(scene);
        } else {
            self.destroy(scene);
        }
    }

    fn rename_scene(&mut self, scene: SceneKey, name: &str) {
        if let Some(info) = self.scenes.iter_mut().find(|info| info.key == scene) {
            info.name = name.to_string();
        }
    }

    fn add_event_listener(&mut self, listener: &ListenerId) {
        self.listeners.push(listener.clone());
    }

    fn remove_event_listener(&mut self, listener: &ListenerId) {
        self.listeners.retain(|registered| registered != listener);
    }

    fn config_path(&self, file_name: &str) -> PathBuf {
        self.config_dir.path().join(file_name)
    }
}
