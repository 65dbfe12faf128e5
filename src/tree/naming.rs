use super::{FolderNode, NodeId, NodeName, SceneTree};

impl SceneTree {
    /// False iff a direct child folder of `parent`, other than `excluding`, is called `name`.
    /// Scene rows never collide with folder names.
    pub fn check_folder_name_uniqueness(&self, name: &str, parent: NodeId, excluding: Option<NodeId>) -> bool {
        !self.child_entities(parent.0).iter().any(|&child| {
            Some(NodeId(child)) != excluding
                && self.world.get::<FolderNode>(child).is_some()
                && self.world.get::<NodeName>(child).is_some_and(|existing| existing.0 == name)
        })
    }

    /// The folder's current name if it is free under `parent`, otherwise the first free
    /// numbered variant of it.
    pub fn create_unique_folder_name(&self, node: NodeId, parent: NodeId) -> String {
        let name = self.node_name(node).unwrap_or_default().to_string();
        self.unique_folder_name(&name, parent, Some(node))
    }

    pub fn unique_folder_name(&self, seed: &str, parent: NodeId, excluding: Option<NodeId>) -> String {
        if self.check_folder_name_uniqueness(seed, parent, excluding) {
            return seed.to_string();
        }
        let stem = numbered_stem(seed);
        let mut suffix: u64 = 0;
        loop {
            suffix += 1;
            let candidate = format!("{stem}{suffix}");
            if self.check_folder_name_uniqueness(&candidate, parent, excluding) {
                return candidate;
            }
        }
    }

    /// First free name produced by `template` with counters 0, 1, 2, ...
    pub fn default_folder_name(&self, template: &str, parent: NodeId) -> String {
        let mut counter: u64 = 0;
        loop {
            let candidate = format_folder_template(template, counter);
            if self.check_folder_name_uniqueness(&candidate, parent, None) {
                return candidate;
            }
            counter += 1;
        }
    }
}

/// `"Folder 12"` -> `"Folder "`; names without a trailing number get a separating space.
fn numbered_stem(name: &str) -> String {
    let stem = name.trim_end_matches(|ch: char| ch.is_ascii_digit());
    if stem.len() == name.len() {
        format!("{name} ")
    } else {
        stem.to_string()
    }
}

/// Substitute `counter` into a localized template (`%1` or `%d`), or append it.
pub fn format_folder_template(template: &str, counter: u64) -> String {
    let value = counter.to_string();
    if template.contains("%1") {
        template.replace("%1", &value)
    } else if template.contains("%d") {
        template.replace("%d", &value)
    } else {
        format!("{template} {value}")
    }
}
