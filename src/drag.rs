//! In-process drag payload: a native-endian `i32` count followed by fixed-size records.

use crate::error::TreeError;
use crate::host::SceneKey;
use crate::tree::{ItemKind, NodeId, NodeKind, SceneTree};

pub const MIME_TYPE: &str = "application/x-stvindexlist";

const KIND_FOLDER: u32 = 1;
const KIND_SCENE: u32 = 2;
const COUNT_BYTES: usize = std::mem::size_of::<i32>();
const RECORD_BYTES: usize = std::mem::size_of::<DragRecord>();

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DragRecord {
    kind: u32,
    _pad: u32,
    identity: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragItem {
    /// Folders travel by their own node identity.
    Folder(NodeId),
    /// Scenes travel by handle, so they survive node replacement during the drop.
    Scene(SceneKey),
}

impl DragItem {
    pub fn kind(&self) -> ItemKind {
        match self {
            DragItem::Folder(_) => ItemKind::Folder,
            DragItem::Scene(_) => ItemKind::Scene,
        }
    }

    fn to_record(self) -> DragRecord {
        match self {
            DragItem::Folder(node) => DragRecord { kind: KIND_FOLDER, _pad: 0, identity: node.to_bits() },
            DragItem::Scene(key) => DragRecord { kind: KIND_SCENE, _pad: 0, identity: key.0 },
        }
    }

    fn from_record(record: DragRecord) -> Result<Self, TreeError> {
        match record.kind {
            KIND_FOLDER => NodeId::from_bits(record.identity)
                .map(DragItem::Folder)
                .ok_or(TreeError::MalformedPayload("invalid folder identity")),
            KIND_SCENE => Ok(DragItem::Scene(SceneKey(record.identity))),
            _ => Err(TreeError::MalformedPayload("unknown item type")),
        }
    }
}

/// Items for the selected nodes; the root and removed nodes are skipped.
pub fn drag_items(tree: &SceneTree, selection: &[NodeId]) -> Vec<DragItem> {
    selection
        .iter()
        .filter(|node| !tree.is_root(**node))
        .filter_map(|&node| match tree.node_kind(node)? {
            NodeKind::Folder => Some(DragItem::Folder(node)),
            NodeKind::Scene(key) => Some(DragItem::Scene(key)),
        })
        .collect()
}

pub fn encode_payload(items: &[DragItem]) -> Vec<u8> {
    let count = i32::try_from(items.len()).unwrap_or(i32::MAX);
    let mut bytes = Vec::with_capacity(COUNT_BYTES + items.len() * RECORD_BYTES);
    bytes.extend_from_slice(&count.to_ne_bytes());
    for item in items.iter().take(count as usize) {
        bytes.extend_from_slice(bytemuck::bytes_of(&item.to_record()));
    }
    bytes
}

pub fn decode_payload(bytes: &[u8]) -> Result<Vec<DragItem>, TreeError> {
    let Some(header) = bytes.get(..COUNT_BYTES) else {
        return Err(TreeError::MalformedPayload("missing item count"));
    };
    let mut count_bytes = [0u8; COUNT_BYTES];
    count_bytes.copy_from_slice(header);
    let count = usize::try_from(i32::from_ne_bytes(count_bytes))
        .map_err(|_| TreeError::MalformedPayload("negative item count"))?;

    let body = &bytes[COUNT_BYTES..];
    if body.len() < count * RECORD_BYTES {
        return Err(TreeError::MalformedPayload("truncated item records"));
    }
    body.chunks_exact(RECORD_BYTES)
        .take(count)
        .map(|chunk| DragItem::from_record(bytemuck::pod_read_unaligned::<DragRecord>(chunk)))
        .collect()
}
