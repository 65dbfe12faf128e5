//! Ordered folder hierarchy over host scenes.
//!
//! Nodes live as entities in a private ECS world. Every node carries a `NodeName` and exactly
//! one of `FolderNode` or `SceneLink`. Non-root nodes point at their folder through
//! `Parent`, and folders keep their ordered rows in `Children`. The root is a nameless folder
//! entity owned by the tree.
//!
//! `scenes_in_tree` is the identity index: one entry per scene node, keyed by the host's
//! `SceneKey`. Every structural mutation in this module and its children keeps it in step with
//! the `SceneLink` components.

use crate::error::TreeError;
use crate::host::{SceneEntry, SceneHost, SceneKey, SceneLookup, WeakScene};
use bevy_ecs::prelude::{Component, Entity, World};
use std::collections::HashMap;

pub mod moves;
pub mod naming;
pub mod sync;

/// Identity of a tree node. Stays valid until the node is removed or replaced by a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(Entity);

impl NodeId {
    pub fn to_bits(self) -> u64 {
        self.0.to_bits()
    }

    pub fn from_bits(bits: u64) -> Option<Self> {
        Entity::try_from_bits(bits).ok().map(NodeId)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Folder,
    Scene,
}

impl ItemKind {
    pub fn label(self) -> &'static str {
        match self {
            ItemKind::Folder => "folder",
            ItemKind::Scene => "scene",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Folder,
    Scene(SceneKey),
}

impl NodeKind {
    pub fn item_kind(self) -> ItemKind {
        match self {
            NodeKind::Folder => ItemKind::Folder,
            NodeKind::Scene(_) => ItemKind::Scene,
        }
    }
}

#[derive(Component, Clone)]
struct NodeName(String);

#[derive(Component, Clone, Copy, Default)]
struct FolderNode {
    expanded: bool,
}

#[derive(Component)]
struct SceneLink(WeakScene);

#[derive(Component, Clone, Copy)]
struct Parent(Entity);

#[derive(Component, Default)]
struct Children(Vec<Entity>);

pub struct SceneTree {
    world: World,
    root: Entity,
    scenes_in_tree: HashMap<SceneKey, NodeId>,
}

impl Default for SceneTree {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneTree {
    pub fn new() -> Self {
        let mut world = World::new();
        let root = world.spawn((FolderNode { expanded: true }, Children::default())).id();
        Self { world, root, scenes_in_tree: HashMap::new() }
    }

    pub fn root(&self) -> NodeId {
        NodeId(self.root)
    }

    pub fn is_root(&self, node: NodeId) -> bool {
        node.0 == self.root
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.world.entities().contains(node.0)
    }

    pub fn node_kind(&self, node: NodeId) -> Option<NodeKind> {
        if let Some(link) = self.world.get::<SceneLink>(node.0) {
            return Some(NodeKind::Scene(link.0.key()));
        }
        self.world.get::<FolderNode>(node.0).map(|_| NodeKind::Folder)
    }

    pub fn is_folder(&self, node: NodeId) -> bool {
        matches!(self.node_kind(node), Some(NodeKind::Folder))
    }

    /// Display name; `None` for the root and for removed nodes.
    pub fn node_name(&self, node: NodeId) -> Option<&str> {
        self.world.get::<NodeName>(node.0).map(|name| name.0.as_str())
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.child_entities(node.0).iter().copied().map(NodeId).collect()
    }

    pub fn child_count(&self, node: NodeId) -> usize {
        self.child_entities(node.0).len()
    }

    pub fn child(&self, node: NodeId, row: usize) -> Option<NodeId> {
        self.child_entities(node.0).get(row).copied().map(NodeId)
    }

    /// Owning folder; `None` for the root.
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.world.get::<Parent>(node.0).map(|parent| NodeId(parent.0))
    }

    pub fn parent_or_root(&self, node: NodeId) -> NodeId {
        self.parent(node).unwrap_or(NodeId(self.root))
    }

    pub fn row_of(&self, node: NodeId) -> Option<usize> {
        let parent = self.world.get::<Parent>(node.0)?;
        self.child_entities(parent.0).iter().position(|&child| child == node.0)
    }

    /// True when `node` sits anywhere below `ancestor`, or is `ancestor` itself.
    pub fn is_within(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    pub fn find_scene(&self, key: SceneKey) -> Option<NodeId> {
        self.scenes_in_tree.get(&key).copied()
    }

    pub fn scene_keys(&self) -> impl Iterator<Item = SceneKey> + '_ {
        self.scenes_in_tree.keys().copied()
    }

    /// Upgrade the weak reference held by a scene node; `None` for folders and removed nodes.
    pub fn lookup_node<H: SceneHost + ?Sized>(&self, host: &H, node: NodeId) -> Option<SceneLookup> {
        self.world.get::<SceneLink>(node.0).map(|link| host.upgrade(&link.0))
    }

    pub fn index_len(&self) -> usize {
        self.scenes_in_tree.len()
    }

    pub fn is_expanded(&self, node: NodeId) -> bool {
        self.world.get::<FolderNode>(node.0).is_some_and(|folder| folder.expanded)
    }

    pub fn set_expanded(&mut self, node: NodeId, expanded: bool) {
        if let Some(mut folder) = self.world.get_mut::<FolderNode>(node.0) {
            folder.expanded = expanded;
        }
    }

    /// Pre-order walk over every node below the root, with its depth (root children are 0).
    pub fn visit_depth_first(&self, mut visit: impl FnMut(NodeId, usize)) {
        let mut stack: Vec<(Entity, usize)> =
            self.child_entities(self.root).iter().rev().map(|&child| (child, 0)).collect();
        while let Some((entity, depth)) = stack.pop() {
            visit(NodeId(entity), depth);
            stack.extend(self.child_entities(entity).iter().rev().map(|&child| (child, depth + 1)));
        }
    }

    /// Scene nodes in tree order, as found by walking the hierarchy rather than the index.
    pub fn scene_nodes(&self) -> Vec<(NodeId, SceneKey)> {
        let mut scenes = Vec::new();
        self.visit_depth_first(|node, _| {
            if let Some(NodeKind::Scene(key)) = self.node_kind(node) {
                scenes.push((node, key));
            }
        });
        scenes
    }

    pub fn insert_folder(
        &mut self,
        parent: NodeId,
        row: usize,
        name: impl Into<String>,
    ) -> Result<NodeId, TreeError> {
        match self.node_kind(parent) {
            Some(NodeKind::Folder) => {}
            Some(NodeKind::Scene(_)) => return Err(TreeError::NotAFolder(parent)),
            None => return Err(TreeError::UnknownNode(parent)),
        }
        let folder = self.spawn_folder(name.into(), false);
        self.attach(parent.0, row, folder);
        Ok(NodeId(folder))
    }

    /// Append a scene row that takes ownership of the entry's weak reference.
    pub(crate) fn append_scene(&mut self, folder: NodeId, scene: SceneEntry) -> NodeId {
        let key = scene.info.key;
        debug_assert!(!self.scenes_in_tree.contains_key(&key), "{key} is already in the tree");
        let node = NodeId(self.spawn_scene(scene.info.name, scene.weak));
        self.attach(folder.0, usize::MAX, node.0);
        self.scenes_in_tree.insert(key, node);
        node
    }

    /// Apply user-typed text to a folder, then make it unique among its sibling folders.
    /// Returns the name actually applied.
    pub fn rename_folder(&mut self, node: NodeId, text: &str) -> Option<String> {
        if !self.is_folder(node) || self.is_root(node) {
            return None;
        }
        let text = text.trim();
        if text.is_empty() {
            return self.node_name(node).map(str::to_string);
        }
        if let Some(mut name) = self.world.get_mut::<NodeName>(node.0) {
            name.0 = text.to_string();
        }
        let parent = self.parent_or_root(node);
        let unique = self.create_unique_folder_name(node, parent);
        if let Some(mut name) = self.world.get_mut::<NodeName>(node.0) {
            name.0.clone_from(&unique);
        }
        Some(unique)
    }

    /// Detach a node and everything below it, releasing the weak references it held.
    pub fn remove_node<H: SceneHost + ?Sized>(&mut self, host: &H, node: NodeId) -> bool {
        if self.is_root(node) || !self.contains(node) {
            return false;
        }
        self.detach(node.0);
        self.despawn_subtree(host, node.0);
        true
    }

    /// Drop every node and the whole identity index.
    pub fn cleanup_scene_tree<H: SceneHost + ?Sized>(&mut self, host: &H) {
        for child in self.child_entities(self.root).to_vec() {
            self.despawn_subtree(host, child);
        }
        if let Some(mut children) = self.world.get_mut::<Children>(self.root) {
            children.0.clear();
        }
        debug_assert!(self.scenes_in_tree.is_empty(), "identity index outlived its scene nodes");
        self.scenes_in_tree.clear();
    }

    fn child_entities(&self, entity: Entity) -> &[Entity] {
        self.world.get::<Children>(entity).map(|children| children.0.as_slice()).unwrap_or(&[])
    }

    fn spawn_folder(&mut self, name: String, expanded: bool) -> Entity {
        self.world.spawn((NodeName(name), FolderNode { expanded }, Children::default())).id()
    }

    fn spawn_scene(&mut self, name: String, weak: WeakScene) -> Entity {
        self.world.spawn((NodeName(name), SceneLink(weak))).id()
    }

    fn attach(&mut self, parent: Entity, row: usize, child: Entity) {
        self.world.entity_mut(child).insert(Parent(parent));
        if let Some(mut children) = self.world.get_mut::<Children>(parent) {
            let row = row.min(children.0.len());
            children.0.insert(row, child);
        } else {
            self.world.entity_mut(parent).insert(Children(vec![child]));
        }
    }

    fn detach(&mut self, child: Entity) {
        let Some(parent) = self.world.get::<Parent>(child).copied() else {
            return;
        };
        if let Some(mut siblings) = self.world.get_mut::<Children>(parent.0) {
            siblings.0.retain(|&sibling| sibling != child);
        }
        self.world.entity_mut(child).remove::<Parent>();
    }

    fn despawn_subtree<H: SceneHost + ?Sized>(&mut self, host: &H, entity: Entity) {
        let child_ids = self.world.get::<Children>(entity).map(|c| c.0.clone()).unwrap_or_default();
        for child in child_ids {
            self.despawn_subtree(host, child);
        }
        if self.world.get::<SceneLink>(entity).is_some() {
            if let Some(SceneLink(weak)) = self.world.entity_mut(entity).take::<SceneLink>() {
                let key = weak.key();
                if self.scenes_in_tree.get(&key) == Some(&NodeId(entity)) {
                    self.scenes_in_tree.remove(&key);
                }
                host.release(weak);
            }
        }
        self.world.despawn(entity);
    }
}
