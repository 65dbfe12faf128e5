use crate::config::{
    PanelConfig, BASIC_WINDOW_SECTION, CONFIG_SECTION, SHOW_FOLDER_ICONS_KEY, SHOW_LISTBOX_TOOLBARS_KEY,
    SHOW_SCENE_ICONS_KEY, TRANSITION_ON_DOUBLE_CLICK_KEY,
};
use crate::drag::{decode_payload, drag_items, encode_payload, DragItem};
use crate::error::TreeError;
use crate::events::{FrontendEvent, FrontendEventSink, ListenerId};
use crate::host::{default_scene_filter, ManagedSceneFilter, SceneHost, SceneKey, SceneLookup};
use crate::record::SceneTreeFile;
use crate::tree::sync::SyncReport;
use crate::tree::{ItemKind, NodeId, NodeKind, SceneTree};

/// The scene tree panel: keeps a [`SceneTree`] in step with the host and persists it per scene
/// collection.
pub struct SceneTreeDock<H: SceneHost> {
    host: H,
    tree: SceneTree,
    config: PanelConfig,
    is_managed: ManagedSceneFilter,
    listener: ListenerId,
    collection: Option<String>,
    selected: Option<NodeId>,
    show_toolbars: bool,
}

impl<H: SceneHost> SceneTreeDock<H> {
    /// Seeds the panel's config defaults and registers with the host's event dispatch.
    pub fn new(mut host: H, config: PanelConfig) -> Self {
        host.set_default_config_bool(CONFIG_SECTION, SHOW_SCENE_ICONS_KEY, false);
        host.set_default_config_bool(CONFIG_SECTION, SHOW_FOLDER_ICONS_KEY, false);
        let show_toolbars = host.config_bool(BASIC_WINDOW_SECTION, SHOW_LISTBOX_TOOLBARS_KEY).unwrap_or(true);

        let listener = ListenerId::new(config.listener_name.clone());
        host.add_event_listener(&listener);

        Self {
            host,
            tree: SceneTree::new(),
            config,
            is_managed: default_scene_filter(),
            listener,
            collection: None,
            selected: None,
            show_toolbars,
        }
    }

    /// Replace the policy deciding which host scenes the panel shows.
    pub fn with_scene_filter(mut self, filter: ManagedSceneFilter) -> Self {
        self.is_managed = filter;
        self
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn tree(&self) -> &SceneTree {
        &self.tree
    }

    pub fn collection_name(&self) -> Option<&str> {
        self.collection.as_deref()
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.selected.filter(|node| self.tree.contains(*node))
    }

    pub fn toolbars_visible(&self) -> bool {
        self.show_toolbars
    }

    pub fn on_toggle_listbox_toolbars(&mut self, visible: bool) {
        self.show_toolbars = visible;
    }

    pub fn icon_visible(&self, kind: ItemKind) -> bool {
        self.host.config_bool(CONFIG_SECTION, icon_key(kind)).unwrap_or(false)
    }

    pub fn set_icon_visibility(&mut self, kind: ItemKind, visible: bool) {
        self.host.set_config_bool(CONFIG_SECTION, icon_key(kind), visible);
    }

    /// Reconcile against the host's scene list around the current selection, then persist.
    pub fn update_tree_view(&mut self) -> SyncReport {
        let report = self.reconcile(self.selected());
        self.save_scene_tree();
        report
    }

    pub fn save_scene_tree(&mut self) {
        let Some(collection) = self.collection.clone() else {
            return;
        };
        let path = self.host.config_path(&self.config.tree_file);
        let mut file = SceneTreeFile::load_or_empty(&path);
        let entries = self.tree.save_scene_tree(&self.host);
        let saved = file.set_collection(&collection, &entries).and_then(|()| file.save_to_path(&path));
        if let Err(err) = saved {
            log::warn!(target: "scene_tree", "Failed to save scene tree in '{}': {err:?}", path.display());
        }
    }

    pub fn load_scene_tree(&mut self) {
        let Some(collection) = self.collection.as_deref() else {
            return;
        };
        let path = self.host.config_path(&self.config.tree_file);
        let entries = SceneTreeFile::load_or_empty(&path).collection(collection);
        self.tree.load_scene_tree(&self.host, &entries, |info| (self.is_managed)(info));
        self.selected = None;
    }

    /// Add a folder with the first free default name, placed relative to the selection like
    /// newly discovered scenes are.
    pub fn add_folder(&mut self) -> Result<NodeId, TreeError> {
        let (parent, row) = match self.selected().and_then(|node| Some((node, self.tree.node_kind(node)?))) {
            Some((folder, NodeKind::Folder)) => (folder, 0),
            Some((scene, NodeKind::Scene(_))) => {
                (self.tree.parent_or_root(scene), self.tree.row_of(scene).unwrap_or(0))
            }
            None => (self.tree.root(), self.tree.child_count(self.tree.root())),
        };
        let name = self.tree.default_folder_name(&self.config.default_folder_name, parent);
        let folder = self.tree.insert_folder(parent, row, name)?;
        self.save_scene_tree();
        Ok(folder)
    }

    /// Delegates to the host's "add scene" action; the new scene shows up on the next list change.
    pub fn add_scene(&mut self) {
        self.host.trigger_add_scene();
    }

    /// Remove the selected node: scenes through the host, folders recursively.
    pub fn remove_selected(&mut self) {
        let Some(selected) = self.selected().filter(|node| !self.tree.is_root(*node)) else {
            return;
        };
        match self.tree.node_kind(selected) {
            Some(NodeKind::Scene(key)) => {
                self.host.request_remove_scene(key);
                self.reconcile(None);
            }
            Some(NodeKind::Folder) => self.remove_folder(selected),
            None => return,
        }
        if !self.tree.contains(selected) {
            self.selected = None;
        }
        self.save_scene_tree();
    }

    /// Commit edited text for the selected node. Scene renames go to the host; folders get the
    /// text made unique among their siblings. Returns the folder name actually applied.
    pub fn commit_rename(&mut self, text: &str) -> Option<String> {
        let selected = self.selected()?;
        match self.tree.node_kind(selected)? {
            NodeKind::Scene(key) => {
                let text = text.trim();
                if !text.is_empty() {
                    self.host.rename_scene(key, text);
                }
                None
            }
            NodeKind::Folder => {
                let applied = self.tree.rename_folder(selected, text);
                self.save_scene_tree();
                applied
            }
        }
    }

    /// The view expanded or collapsed a folder. Picked up by the next save.
    pub fn set_expanded(&mut self, folder: NodeId, expanded: bool) {
        self.tree.set_expanded(folder, expanded);
    }

    /// User picked a node in the view. Picking a scene switches the host to it.
    pub fn select_node(&mut self, node: NodeId) {
        if !self.tree.contains(node) {
            return;
        }
        self.selected = Some(node);
        if matches!(self.tree.node_kind(node), Some(NodeKind::Scene(_))) {
            self.set_selected_scene(node, false);
        }
    }

    /// Make the host show this scene: preview scene in split mode, program scene otherwise.
    /// Without `force`, nothing is sent when the host already shows it.
    pub fn set_selected_scene(&mut self, node: NodeId, force: bool) -> bool {
        let Some(key) = self.resolve_scene(node) else {
            return false;
        };
        if self.host.preview_program_mode() {
            if force || self.host.current_preview_scene() != Some(key) {
                self.host.set_current_preview_scene(key);
            }
        } else if force || self.host.current_scene() != Some(key) {
            self.host.set_current_scene(key);
        }
        true
    }

    /// Double-click on a node. In split mode with "transition on double click" enabled, a scene
    /// goes to preview and straight on to program. Returns false when the view should fall
    /// back to editing the item in place.
    pub fn activate_scene(&mut self, node: NodeId) -> bool {
        if !self.host.preview_program_mode() {
            return false;
        }
        let transition = self.host.config_bool(BASIC_WINDOW_SECTION, TRANSITION_ON_DOUBLE_CLICK_KEY).unwrap_or(false);
        if !transition {
            return false;
        }
        if !self.set_selected_scene(node, false) {
            return false;
        }
        if let Some(NodeKind::Scene(key)) = self.tree.node_kind(node) {
            self.host.set_current_scene(key);
        }
        true
    }

    pub fn begin_drag(&self, selection: &[NodeId]) -> Vec<u8> {
        encode_payload(&drag_items(&self.tree, selection))
    }

    /// Drop a payload onto `target` (`None` for empty space, i.e. the root) at `row`.
    pub fn accept_drop(&mut self, payload: &[u8], target: Option<NodeId>, row: i32) -> Result<(), TreeError> {
        let items = decode_payload(payload)?;
        let selected = self.selected().and_then(|node| Some((node, self.tree.node_kind(node)?)));
        let placed = self.tree.drop_items(&items, target, row)?;
        if let Some((node, kind)) = selected.filter(|(node, _)| !self.tree.contains(*node)) {
            // Moves replace nodes; keep the selection on whatever took its place.
            self.selected = match kind {
                NodeKind::Scene(key) => self.tree.find_scene(key),
                NodeKind::Folder => placed
                    .iter()
                    .find(|(item, _)| *item == DragItem::Folder(node))
                    .map(|(_, moved)| *moved),
            };
        }
        self.save_scene_tree();
        Ok(())
    }

    /// Follow the host's current scene without asking the host to switch.
    pub fn select_current_scene(&mut self) {
        let current = if self.host.preview_program_mode() {
            self.host.current_preview_scene()
        } else {
            self.host.current_scene()
        };
        let Some(node) = current.and_then(|key| self.tree.find_scene(key)) else {
            log::warn!(target: "scene_tree", "Couldn't find current scene in the scene tree");
            return;
        };
        if self.selected != Some(node) {
            self.selected = Some(node);
        }
    }

    fn reconcile(&mut self, anchor: Option<NodeId>) -> SyncReport {
        let scenes = self.host.enumerate_scenes();
        let report = self.tree.update_tree(&self.host, scenes, anchor, |info| (self.is_managed)(info));
        if !report.is_noop() {
            log::debug!(
                target: "scene_tree",
                "Scene tree synced: {} added, {} removed, {} renamed",
                report.added,
                report.removed,
                report.renamed
            );
        }
        report
    }

    /// Ask the host to remove every scene below `folder`, dropping sub-folders that end up
    /// empty and finally `folder` itself if nothing is left.
    ///
    /// The host may defer removals, so a row is only skipped once a request left the row count
    /// unchanged. Each row is visited at most once per pass, which bounds the loop.
    fn remove_folder(&mut self, folder: NodeId) {
        let mut row = 0;
        let mut row_count = self.tree.child_count(folder);
        while row < row_count {
            let Some(child) = self.tree.child(folder, row) else {
                break;
            };
            match self.tree.node_kind(child) {
                Some(NodeKind::Scene(key)) => {
                    self.host.request_remove_scene(key);
                    self.reconcile(None);
                }
                Some(NodeKind::Folder) => self.remove_folder(child),
                None => debug_assert!(false, "child {child:?} is neither folder nor scene"),
            }

            let now = self.tree.child_count(folder);
            if now == row_count {
                row += 1;
            }
            row_count = now;
        }

        if self.tree.child_count(folder) == 0 {
            self.tree.remove_node(&self.host, folder);
        }
    }

    /// Scene key behind a node, dropping the node if its scene is gone.
    fn resolve_scene(&mut self, node: NodeId) -> Option<SceneKey> {
        match self.tree.lookup_node(&self.host, node)? {
            SceneLookup::Resolved(info) => Some(info.key),
            SceneLookup::Gone => {
                self.tree.remove_node(&self.host, node);
                None
            }
        }
    }
}

impl<H: SceneHost> FrontendEventSink for SceneTreeDock<H> {
    fn on_event(&mut self, event: FrontendEvent) {
        log::debug!(target: "scene_tree", "Frontend event {event}");
        match event {
            FrontendEvent::FinishedLoading => {
                self.collection = self.host.current_collection();
                self.load_scene_tree();
                self.update_tree_view();
                self.select_current_scene();
            }
            FrontendEvent::SceneListChanged => {
                self.update_tree_view();
            }
            FrontendEvent::SceneChanged | FrontendEvent::PreviewSceneChanged => self.select_current_scene(),
            FrontendEvent::SceneCollectionCleanup => {
                self.tree.cleanup_scene_tree(&self.host);
                self.collection = None;
                self.selected = None;
            }
            FrontendEvent::SceneCollectionChanging => self.save_scene_tree(),
            FrontendEvent::SceneCollectionChanged => {
                self.collection = self.host.current_collection();
                self.load_scene_tree();
                self.update_tree_view();
            }
            FrontendEvent::SceneCollectionRenamed => {
                // The record under the old name stays behind in the file.
                self.collection = self.host.current_collection();
                self.save_scene_tree();
            }
        }
    }

    fn on_save(&mut self, saving: bool) {
        if saving {
            self.save_scene_tree();
        }
    }
}

impl<H: SceneHost> Drop for SceneTreeDock<H> {
    fn drop(&mut self) {
        self.host.remove_event_listener(&self.listener);
        self.tree.cleanup_scene_tree(&self.host);
    }
}

fn icon_key(kind: ItemKind) -> &'static str {
    match kind {
        ItemKind::Scene => SHOW_SCENE_ICONS_KEY,
        ItemKind::Folder => SHOW_FOLDER_ICONS_KEY,
    }
}
