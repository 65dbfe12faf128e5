use thiserror::Error;

use crate::host::SceneKey;
use crate::tree::NodeId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("scenes cannot hold other items")]
    DropOntoScene,
    #[error("a folder cannot be moved into itself or one of its descendants")]
    DropIntoOwnSubtree,
    #[error("node {0:?} is not part of the scene tree")]
    UnknownNode(NodeId),
    #[error("{0} is not in the scene tree")]
    UnknownScene(SceneKey),
    #[error("node {0:?} is not a folder")]
    NotAFolder(NodeId),
    #[error("malformed drag payload: {0}")]
    MalformedPayload(&'static str),
}
