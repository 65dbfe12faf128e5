use crate::host::{SceneHost, SceneInfo, SceneLookup};
use crate::tree::{NodeId, NodeKind, SceneTree};
use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// One row of a persisted hierarchy. An entry is a folder iff it carries a `folder` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TreeEntry {
    Folder {
        name: String,
        folder: Vec<TreeEntry>,
        #[serde(default)]
        is_expanded: bool,
    },
    Scene {
        name: String,
    },
}

impl TreeEntry {
    pub fn name(&self) -> &str {
        match self {
            TreeEntry::Folder { name, .. } | TreeEntry::Scene { name } => name,
        }
    }
}

/// Wire shape of an entry before it is classified on the presence of `folder`.
#[derive(Deserialize)]
struct RawEntry {
    name: String,
    folder: Option<Vec<TreeEntry>>,
    #[serde(default)]
    is_expanded: bool,
}

impl<'de> Deserialize<'de> for TreeEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let RawEntry { name, folder, is_expanded } = RawEntry::deserialize(deserializer)?;
        Ok(match folder {
            Some(folder) => TreeEntry::Folder { name, folder, is_expanded },
            None => TreeEntry::Scene { name },
        })
    }
}

/// Every collection's hierarchy, as stored in one JSON document keyed by collection name.
#[derive(Debug, Clone, Default)]
pub struct SceneTreeFile {
    collections: Map<String, Value>,
}

impl SceneTreeFile {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).with_context(|| format!("Reading scene tree file {}", path.display()))?;
        let collections = serde_json::from_slice::<Map<String, Value>>(&bytes)
            .with_context(|| format!("Parsing scene tree file {}", path.display()))?;
        Ok(Self { collections })
    }

    /// A missing or unreadable file is treated as an empty one.
    pub fn load_or_empty(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(file) => file,
            Err(err) => {
                log::warn!(target: "scene_tree", "Scene tree load error: {err:?}. Starting with an empty tree.");
                Self::default()
            }
        }
    }

    pub fn save_to_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Creating scene tree directory {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(&self.collections)?;
        fs::write(path, json.as_bytes()).with_context(|| format!("Writing scene tree file {}", path.display()))?;
        Ok(())
    }

    pub fn collection_names(&self) -> impl Iterator<Item = &str> {
        self.collections.keys().map(String::as_str)
    }

    /// Entries stored for `collection`; empty when absent or malformed.
    pub fn collection(&self, collection: &str) -> Vec<TreeEntry> {
        let Some(value) = self.collections.get(collection) else {
            return Vec::new();
        };
        match Vec::<TreeEntry>::deserialize(value) {
            Ok(entries) => entries,
            Err(err) => {
                log::warn!(target: "scene_tree", "Ignoring malformed scene tree for '{collection}': {err}");
                Vec::new()
            }
        }
    }

    pub fn set_collection(&mut self, collection: &str, entries: &[TreeEntry]) -> Result<()> {
        let value = serde_json::to_value(entries)
            .with_context(|| format!("Serializing scene tree for '{collection}'"))?;
        self.collections.insert(collection.to_string(), value);
        Ok(())
    }
}

impl SceneTree {
    /// Snapshot the hierarchy for persistence.
    ///
    /// Scenes are stored by their current name since handles do not survive a host restart.
    /// Scene nodes whose weak reference no longer resolves are dropped from the tree first.
    pub fn save_scene_tree<H: SceneHost + ?Sized>(&mut self, host: &H) -> Vec<TreeEntry> {
        self.prune_gone_scenes(host);
        self.folder_entries(host, self.root())
    }

    /// Rebuild the hierarchy from `entries`, replacing whatever the tree held.
    ///
    /// Scene entries are resolved by name. Unknown, unmanaged or duplicate scenes are skipped.
    /// Expansion flags are applied once the whole tree exists.
    pub fn load_scene_tree<H, F>(&mut self, host: &H, entries: &[TreeEntry], is_managed: F)
    where
        H: SceneHost + ?Sized,
        F: Fn(&SceneInfo) -> bool,
    {
        self.cleanup_scene_tree(host);
        let mut expanded = Vec::new();
        self.load_folder_array(host, &is_managed, entries, self.root(), &mut expanded);
        for (folder, is_expanded) in expanded {
            self.set_expanded(folder, is_expanded);
        }
    }

    /// Remove scene nodes whose scene the host has destroyed. Returns how many went away.
    pub fn prune_gone_scenes<H: SceneHost + ?Sized>(&mut self, host: &H) -> usize {
        let gone: Vec<NodeId> = self
            .scene_nodes()
            .into_iter()
            .filter(|(node, _)| matches!(self.lookup_node(host, *node), Some(SceneLookup::Gone)))
            .map(|(node, _)| node)
            .collect();
        for node in &gone {
            self.remove_node(host, *node);
        }
        gone.len()
    }

    fn folder_entries<H: SceneHost + ?Sized>(&self, host: &H, folder: NodeId) -> Vec<TreeEntry> {
        let mut entries = Vec::with_capacity(self.child_count(folder));
        for child in self.children(folder) {
            match self.node_kind(child) {
                Some(NodeKind::Folder) => entries.push(TreeEntry::Folder {
                    name: self.node_name(child).unwrap_or_default().to_string(),
                    folder: self.folder_entries(host, child),
                    is_expanded: self.is_expanded(child),
                }),
                Some(NodeKind::Scene(_)) => {
                    if let Some(SceneLookup::Resolved(info)) = self.lookup_node(host, child) {
                        entries.push(TreeEntry::Scene { name: info.name });
                    }
                }
                None => debug_assert!(false, "child {child:?} is neither folder nor scene"),
            }
        }
        entries
    }

    fn load_folder_array<H, F>(
        &mut self,
        host: &H,
        is_managed: &F,
        entries: &[TreeEntry],
        folder: NodeId,
        expanded: &mut Vec<(NodeId, bool)>,
    ) where
        H: SceneHost + ?Sized,
        F: Fn(&SceneInfo) -> bool,
    {
        for entry in entries {
            match entry {
                TreeEntry::Scene { name } => {
                    let Some(scene) = host.scene_by_name(name) else {
                        continue;
                    };
                    if !is_managed(&scene.info) {
                        host.release(scene.weak);
                        continue;
                    }
                    if self.find_scene(scene.info.key).is_some() {
                        log::debug!(target: "scene_tree", "Dropping duplicate scene entry '{name}'");
                        host.release(scene.weak);
                        continue;
                    }
                    self.append_scene(folder, scene);
                }
                TreeEntry::Folder { name, folder: children, is_expanded } => {
                    let Ok(child) = self.insert_folder(folder, usize::MAX, name.clone()) else {
                        continue;
                    };
                    self.load_folder_array(host, is_managed, children, child, expanded);
                    expanded.push((child, *is_expanded));
                }
            }
        }
    }
}
