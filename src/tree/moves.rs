use super::{FolderNode, NodeId, NodeKind, SceneLink, SceneTree};
use crate::drag::DragItem;
use crate::error::TreeError;
use crate::host::SceneKey;

impl SceneTree {
    /// Re-home a scene under `new_parent` at `row`.
    ///
    /// A fresh node takes over the handle and cached name, then the old node is dropped, so
    /// `row` counts rows as they were before the move. The identity index follows the new node.
    pub fn move_scene_item(&mut self, key: SceneKey, row: usize, new_parent: NodeId) -> Result<NodeId, TreeError> {
        let Some(old) = self.find_scene(key) else {
            log::warn!(target: "scene_tree", "Couldn't find {key} to move in the scene tree");
            return Err(TreeError::UnknownScene(key));
        };
        match self.node_kind(new_parent) {
            Some(NodeKind::Folder) => {}
            Some(NodeKind::Scene(_)) => return Err(TreeError::DropOntoScene),
            None => return Err(TreeError::UnknownNode(new_parent)),
        }
        let name = self.node_name(old).unwrap_or_default().to_string();
        log::info!(target: "scene_tree", "Moving scene '{name}'");

        let Some(SceneLink(weak)) = self.world.entity_mut(old.0).take::<SceneLink>() else {
            debug_assert!(false, "indexed node {old:?} has no scene link");
            return Err(TreeError::UnknownNode(old));
        };
        let moved = self.spawn_scene(name, weak);
        self.attach(new_parent.0, row, moved);
        self.detach(old.0);
        self.world.despawn(old.0);

        let moved = NodeId(moved);
        self.scenes_in_tree.insert(key, moved);
        Ok(moved)
    }

    /// Re-home a folder and its whole subtree under `new_parent` at `row`.
    ///
    /// The folder is renamed first if its name is taken among the new siblings. Children keep
    /// their relative order; scenes move through [`Self::move_scene_item`].
    pub fn move_scene_folder(&mut self, folder: NodeId, row: usize, new_parent: NodeId) -> Result<NodeId, TreeError> {
        if !self.is_folder(folder) || self.is_root(folder) {
            return Err(TreeError::UnknownNode(folder));
        }
        match self.node_kind(new_parent) {
            Some(NodeKind::Folder) => {}
            Some(NodeKind::Scene(_)) => return Err(TreeError::DropOntoScene),
            None => return Err(TreeError::UnknownNode(new_parent)),
        }
        if self.is_within(new_parent, folder) {
            return Err(TreeError::DropIntoOwnSubtree);
        }
        Ok(self.rehome_folder(folder, row, new_parent))
    }

    fn rehome_folder(&mut self, folder: NodeId, row: usize, new_parent: NodeId) -> NodeId {
        log::info!(target: "scene_tree", "Moving folder '{}'", self.node_name(folder).unwrap_or_default());

        let new_name = self.create_unique_folder_name(folder, new_parent);
        let expanded = self.world.get::<FolderNode>(folder.0).is_some_and(|f| f.expanded);
        let new_folder = NodeId(self.spawn_folder(new_name, expanded));
        self.attach(new_parent.0, row, new_folder.0);

        for (sub_row, child) in self.children(folder).into_iter().enumerate() {
            match self.node_kind(child) {
                Some(NodeKind::Folder) => {
                    self.rehome_folder(child, sub_row, new_folder);
                }
                Some(NodeKind::Scene(key)) => {
                    // The target is a fresh folder, so this cannot fail.
                    let _ = self.move_scene_item(key, sub_row, new_folder);
                }
                None => debug_assert!(false, "child {child:?} of {folder:?} is neither folder nor scene"),
            }
        }

        self.detach(folder.0);
        self.world.despawn(folder.0);
        new_folder
    }

    /// Apply a dropped drag payload.
    ///
    /// `target` is the folder dropped onto, `None` for the root. Dropping onto a scene is
    /// rejected before anything moves, as is dropping a folder into its own subtree.
    /// Returns the node each moved item now lives at; items that could not be moved are skipped.
    pub fn drop_items(
        &mut self,
        items: &[DragItem],
        target: Option<NodeId>,
        row: i32,
    ) -> Result<Vec<(DragItem, NodeId)>, TreeError> {
        let parent = match target {
            None => self.root(),
            Some(node) => match self.node_kind(node) {
                Some(NodeKind::Folder) => node,
                Some(NodeKind::Scene(_)) => return Err(TreeError::DropOntoScene),
                None => return Err(TreeError::UnknownNode(node)),
            },
        };
        for item in items {
            if let DragItem::Folder(folder) = *item {
                if self.contains(folder) && self.is_within(parent, folder) {
                    return Err(TreeError::DropIntoOwnSubtree);
                }
            }
        }

        let row = usize::try_from(row).unwrap_or(0);
        let mut placed = Vec::with_capacity(items.len());
        for item in items {
            let moved = match *item {
                DragItem::Scene(key) => self.move_scene_item(key, row, parent),
                DragItem::Folder(folder) => self.move_scene_folder(folder, row, parent),
            };
            match moved {
                Ok(node) => placed.push((*item, node)),
                Err(err) => log::warn!(target: "scene_tree", "Skipping dropped {}: {err}", item.kind().label()),
            }
        }
        Ok(placed)
    }
}
