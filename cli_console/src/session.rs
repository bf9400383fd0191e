//! Session context: the explicit owner of every subsystem
//!
//! One `Session` exists per process. Startup restores the previous state
//! from the three backing files (namespace snapshot, block image, settings)
//! and the persistence methods rewrite them wholesale when a command's
//! outcome flags ask for it.

use block_store::{self, BlockStore, Geometry};
use fs_tree::{load_snapshot_safe, save_snapshot, FsError, Namespace, NodeId, SnapshotError};
use hal::{Clock, PointerSource};
use settings::{load_settings_safe, save_settings, Settings, SettingsError};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default file names, next to the working directory of the shell
const IMAGE_FILE: &str = "disk.dat";
const SNAPSHOT_FILE: &str = "files.dat";
const SETTINGS_FILE: &str = "settings.txt";

/// Errors from session startup and persistence
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error(transparent)]
    Fs(#[from] FsError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error(transparent)]
    Settings(#[from] SettingsError),
}

/// Locations of the three backing files
#[derive(Debug, Clone)]
pub struct SessionPaths {
    pub image: PathBuf,
    pub snapshot: PathBuf,
    pub settings: PathBuf,
}

impl SessionPaths {
    /// Standard file names inside `dir`
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            image: dir.join(IMAGE_FILE),
            snapshot: dir.join(SNAPSHOT_FILE),
            settings: dir.join(SETTINGS_FILE),
        }
    }
}

/// The session: block store, namespace, settings, host capabilities and
/// the current working node
pub struct Session {
    pub store: BlockStore,
    pub namespace: Namespace,
    pub settings: Settings,
    current: NodeId,
    clock: Box<dyn Clock>,
    pub(crate) pointer: Box<dyn PointerSource>,
    paths: SessionPaths,
}

impl Session {
    /// Starts a session from the backing files
    ///
    /// A missing or damaged snapshot yields a fresh root (persisted
    /// immediately, like first startup); a missing image yields an empty
    /// arena; settings restore the previous working directory when its path
    /// still resolves.
    pub fn start(
        paths: SessionPaths,
        geometry: Geometry,
        clock: Box<dyn Clock>,
        pointer: Box<dyn PointerSource>,
    ) -> Result<Self, SessionError> {
        let now = clock.now_nanos();

        let fresh_start = !paths.snapshot.exists();
        let namespace = load_snapshot_safe(&paths.snapshot, now);
        let store = block_store::load_or_create(geometry, &paths.image)
            .map_err(FsError::from)?;
        let settings = load_settings_safe(&paths.settings);

        let current = settings
            .last_dir()
            .and_then(|path| namespace.resolve(path, namespace.root()).ok())
            .unwrap_or_else(|| namespace.root());

        let mut session = Self {
            store,
            namespace,
            settings,
            current,
            clock,
            pointer,
            paths,
        };
        if fresh_start {
            session.persist_namespace()?;
        }
        Ok(session)
    }

    /// Current working node
    pub fn current(&self) -> NodeId {
        self.current
    }

    /// Absolute path of the current working node, for the prompt
    pub fn current_path(&self) -> &str {
        self.namespace
            .node(self.current)
            .map(|node| node.absolute_path.as_str())
            .unwrap_or("/")
    }

    /// Changes the working node and records it for the next session
    pub fn change_current(&mut self, id: NodeId) -> Result<(), FsError> {
        let path = self.namespace.node(id)?.absolute_path.clone();
        self.current = id;
        self.settings.set_last_dir(path);
        Ok(())
    }

    /// Timestamp for the operation being executed
    pub fn now(&self) -> u64 {
        self.clock.now_nanos()
    }

    /// The injected cursor source, read by the pointer device
    pub fn pointer(&self) -> &dyn PointerSource {
        self.pointer.as_ref()
    }

    /// Rewrites the namespace snapshot and the block image
    pub fn persist_namespace(&self) -> Result<(), SessionError> {
        save_snapshot(&self.namespace, &self.paths.snapshot)?;
        block_store::save_image(&self.store, &self.paths.image).map_err(FsError::from)?;
        Ok(())
    }

    /// Rewrites the settings file
    pub fn persist_settings(&self) -> Result<(), SessionError> {
        save_settings(&self.settings, &self.paths.settings)?;
        Ok(())
    }
}
