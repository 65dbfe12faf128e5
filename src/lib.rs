pub mod config;
pub mod dock;
pub mod drag;
pub mod error;
pub mod events;
pub mod host;
pub mod record;
pub mod tree;

pub use dock::SceneTreeDock;
pub use error::TreeError;
pub use events::{FrontendEvent, FrontendEventSink, ListenerId};
pub use host::{SceneHost, SceneKey, WeakScene};
pub use tree::{NodeId, NodeKind, SceneTree};
