use std::sync::mpsc;

use walkthrough_collision::{CollisionProxy, ProxyError};
use walkthrough_proximity::{AnchorRegistry, RegistryError, SceneIndex};

/// A collaborator result ready for the frame loop.
pub enum LoadedAsset {
    /// Collision proxy extracted from the environment.
    Proxy(Box<dyn CollisionProxy + Send>),
    /// Board data: anchor names and display text.
    Anchors(AnchorRegistry),
    /// Named object positions from the environment.
    Scene(SceneIndex),
}

impl LoadedAsset {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Proxy(_) => "proxy",
            Self::Anchors(_) => "anchors",
            Self::Scene(_) => "scene",
        }
    }
}

impl std::fmt::Debug for LoadedAsset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LoadedAsset::{}", self.kind())
    }
}

/// Errors reported by asynchronous loaders.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("proxy error: {0}")]
    Proxy(#[from] ProxyError),
    #[error("anchor data error: {0}")]
    Registry(#[from] RegistryError),
    #[error("failed to load {what}: {reason}")]
    Failed { what: String, reason: String },
}

type Delivery = Result<LoadedAsset, LoadError>;

/// Write end handed to loaders. Cheap to clone and usable from any thread.
#[derive(Debug, Clone)]
pub struct LoadSender {
    tx: mpsc::Sender<Delivery>,
}

impl LoadSender {
    pub fn deliver(&self, asset: LoadedAsset) {
        self.send(Ok(asset));
    }

    pub fn fail(&self, error: LoadError) {
        self.send(Err(error));
    }

    /// Forward a loader result as-is.
    pub fn send(&self, result: Delivery) {
        // The driver is gone; nobody is left to consume the result.
        let _ = self.tx.send(result);
    }
}

/// Read end owned by the frame driver.
#[derive(Debug)]
pub struct LoadInbox {
    rx: mpsc::Receiver<Delivery>,
    tx: mpsc::Sender<Delivery>,
}

impl Default for LoadInbox {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadInbox {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { rx, tx }
    }

    pub fn sender(&self) -> LoadSender {
        LoadSender {
            tx: self.tx.clone(),
        }
    }

    /// Everything delivered since the last drain, in delivery order.
    pub fn drain(&self) -> Vec<Delivery> {
        self.rx.try_iter().collect()
    }
}
