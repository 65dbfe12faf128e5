use std::fmt;

/// Host lifecycle notifications the scene tree reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontendEvent {
    FinishedLoading,
    SceneListChanged,
    SceneChanged,
    PreviewSceneChanged,
    SceneCollectionCleanup,
    SceneCollectionChanging,
    SceneCollectionChanged,
    SceneCollectionRenamed,
}

impl fmt::Display for FrontendEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FrontendEvent::FinishedLoading => "FinishedLoading",
            FrontendEvent::SceneListChanged => "SceneListChanged",
            FrontendEvent::SceneChanged => "SceneChanged",
            FrontendEvent::PreviewSceneChanged => "PreviewSceneChanged",
            FrontendEvent::SceneCollectionCleanup => "SceneCollectionCleanup",
            FrontendEvent::SceneCollectionChanging => "SceneCollectionChanging",
            FrontendEvent::SceneCollectionChanged => "SceneCollectionChanged",
            FrontendEvent::SceneCollectionRenamed => "SceneCollectionRenamed",
        };
        f.write_str(label)
    }
}

/// Name under which a sink is registered with the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListenerId(pub String);

impl ListenerId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

/// Receiver for host callbacks. Callbacks arrive on the UI thread, one at a time.
pub trait FrontendEventSink {
    fn on_event(&mut self, event: FrontendEvent);

    /// `saving` is false when the host only asks for its save data without writing it.
    fn on_save(&mut self, saving: bool);
}
