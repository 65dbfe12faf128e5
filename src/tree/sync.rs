use super::{NodeId, NodeKind, NodeName, SceneTree};
use crate::host::{SceneEntry, SceneHost, SceneInfo};
use bevy_ecs::prelude::Entity;
use std::collections::HashMap;

/// What a reconcile pass changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub added: usize,
    pub removed: usize,
    pub renamed: usize,
}

impl SyncReport {
    pub fn is_noop(&self) -> bool {
        self.added == 0 && self.removed == 0 && self.renamed == 0
    }
}

impl SceneTree {
    /// Make the scene rows match `scene_list` exactly.
    ///
    /// Known scenes keep their node and position. New scenes are placed relative to `anchor`:
    /// as first child of an anchor folder, at the row of an anchor scene, or appended to the root.
    /// Nodes whose scene is no longer listed are removed. Every weak reference in `scene_list`
    /// is either stored or released.
    pub fn update_tree<H, F>(
        &mut self,
        host: &H,
        scene_list: Vec<SceneEntry>,
        anchor: Option<NodeId>,
        is_managed: F,
    ) -> SyncReport
    where
        H: SceneHost + ?Sized,
        F: Fn(&SceneInfo) -> bool,
    {
        let mut report = SyncReport::default();
        let mut new_scene_tree: HashMap<_, NodeId> = HashMap::with_capacity(scene_list.len());

        for SceneEntry { weak, info } in scene_list {
            if !is_managed(&info) || new_scene_tree.contains_key(&info.key) {
                host.release(weak);
                continue;
            }

            if let Some(node) = self.scenes_in_tree.remove(&info.key) {
                // The node already holds its own reference.
                host.release(weak);
                if let Some(mut name) = self.world.get_mut::<NodeName>(node.0) {
                    if name.0 != info.name {
                        name.0 = info.name;
                        report.renamed += 1;
                    }
                }
                new_scene_tree.insert(info.key, node);
            } else {
                let (parent, row) = self.anchor_position(anchor);
                let node = self.spawn_scene(info.name, weak);
                self.attach(parent, row, node);
                new_scene_tree.insert(info.key, NodeId(node));
                report.added += 1;
            }
        }

        let stale = std::mem::replace(&mut self.scenes_in_tree, new_scene_tree);
        for (_, node) in stale {
            debug_assert!(matches!(self.node_kind(node), Some(NodeKind::Scene(_))));
            self.detach(node.0);
            self.despawn_subtree(host, node.0);
            report.removed += 1;
        }
        report
    }

    fn anchor_position(&self, anchor: Option<NodeId>) -> (Entity, usize) {
        match anchor.and_then(|node| self.node_kind(node).map(|kind| (node, kind))) {
            Some((node, NodeKind::Folder)) => (node.0, 0),
            Some((node, NodeKind::Scene(_))) => {
                let parent = self.parent_or_root(node);
                (parent.0, self.row_of(node).unwrap_or(0))
            }
            None => (self.root, self.child_count(NodeId(self.root))),
        }
    }
}
