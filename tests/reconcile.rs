mod common;

use common::FakeHost;
use scene_tree_view::host::{default_scene_filter, SceneHost, SceneInfo};
use scene_tree_view::tree::sync::SyncReport;
use scene_tree_view::tree::{NodeId, SceneTree};

fn sync(tree: &mut SceneTree, host: &FakeHost, anchor: Option<NodeId>) -> SyncReport {
    tree.update_tree(host, host.enumerate_scenes(), anchor, |_: &SceneInfo| true)
}

fn names(tree: &SceneTree, folder: NodeId) -> Vec<String> {
    tree.children(folder).into_iter().map(|child| tree.node_name(child).unwrap_or_default().to_string()).collect()
}

fn assert_index_matches_tree(tree: &SceneTree) {
    let nodes = tree.scene_nodes();
    assert_eq!(nodes.len(), tree.index_len());
    for (node, key) in nodes {
        assert_eq!(tree.find_scene(key), Some(node), "index entry for {key} points elsewhere");
    }
}

#[test]
fn second_reconcile_changes_nothing() {
    let host = FakeHost::with_scenes(&["Intro", "Live", "Outro"]);
    let mut tree = SceneTree::new();
    let root = tree.root();

    let first = sync(&mut tree, &host, None);
    assert_eq!(first.added, 3);
    assert_eq!(names(&tree, root), ["Intro", "Live", "Outro"]);
    let rows = tree.children(root);

    let second = sync(&mut tree, &host, None);
    assert!(second.is_noop(), "unexpected churn: {second:?}");
    assert_eq!(tree.children(root), rows);
    for name in ["Intro", "Live", "Outro"] {
        assert_eq!(host.outstanding(host.key_of(name)), 1);
    }
    assert_index_matches_tree(&tree);

    tree.cleanup_scene_tree(&host);
    assert_eq!(tree.index_len(), 0);
    assert_eq!(host.total_outstanding(), 0);
}

#[test]
fn external_rename_and_removal_are_picked_up() {
    let mut host = FakeHost::with_scenes(&["A", "B"]);
    let mut tree = SceneTree::new();
    sync(&mut tree, &host, None);
    let a = host.key_of("A");
    let b = host.key_of("B");
    let b_node = tree.find_scene(b).expect("B in tree");

    host.rename_scene(b, "Bee");
    let report = sync(&mut tree, &host, None);
    assert_eq!(report, SyncReport { added: 0, removed: 0, renamed: 1 });
    assert_eq!(tree.find_scene(b), Some(b_node));
    assert_eq!(tree.node_name(b_node), Some("Bee"));

    host.destroy(a);
    let report = sync(&mut tree, &host, None);
    assert_eq!(report.removed, 1);
    assert_eq!(tree.find_scene(a), None);
    assert_eq!(host.outstanding(a), 0);
    assert_eq!(tree.child_count(tree.root()), 1);
    assert_index_matches_tree(&tree);
}

#[test]
fn new_scenes_are_placed_at_the_anchor() {
    let mut host = FakeHost::with_scenes(&["A", "B"]);
    let mut tree = SceneTree::new();
    let root = tree.root();
    sync(&mut tree, &host, None);
    let folder = tree.insert_folder(root, 2, "Folder").expect("folder");

    host.add_scene("C");
    sync(&mut tree, &host, Some(folder));
    assert_eq!(names(&tree, folder), ["C"]);

    host.add_scene("D");
    let anchor = tree.find_scene(host.key_of("B"));
    sync(&mut tree, &host, anchor);
    assert_eq!(names(&tree, root), ["A", "D", "B", "Folder"]);

    host.add_scene("E");
    sync(&mut tree, &host, None);
    assert_eq!(names(&tree, root), ["A", "D", "B", "Folder", "E"]);
    assert_index_matches_tree(&tree);
}

#[test]
fn unmanaged_and_duplicate_entries_are_released() {
    let mut host = FakeHost::with_scenes(&["Main"]);
    let vertical = host.add_scene_with_canvas("Vertical");
    let main = host.key_of("Main");
    let filter = default_scene_filter();
    let mut tree = SceneTree::new();

    let mut scene_list = host.enumerate_scenes();
    scene_list.extend(host.enumerate_scenes());
    let report = tree.update_tree(&host, scene_list, None, |info: &SceneInfo| filter(info));

    assert_eq!(report.added, 1);
    assert_eq!(tree.find_scene(vertical), None);
    assert_eq!(host.outstanding(vertical), 0);
    assert_eq!(host.outstanding(main), 1);
}

#[test]
fn scenes_removed_from_a_folder_leave_the_folder() {
    let mut host = FakeHost::with_scenes(&["A"]);
    let mut tree = SceneTree::new();
    let root = tree.root();
    let folder = tree.insert_folder(root, 0, "Folder").expect("folder");
    sync(&mut tree, &host, Some(folder));
    let a = host.key_of("A");
    assert_eq!(tree.parent(tree.find_scene(a).expect("A")), Some(folder));

    host.destroy(a);
    sync(&mut tree, &host, None);
    assert!(tree.contains(folder));
    assert_eq!(tree.child_count(folder), 0);
    assert_eq!(host.total_outstanding(), 0);
}
