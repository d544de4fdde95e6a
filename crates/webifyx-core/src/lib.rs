//! Webifyx Core Library
//!
//! Editing core for the Webifyx site builder: the element model, the
//! document store with undo/redo, drag-and-drop placement, keyboard
//! shortcuts and site persistence.

pub mod drag;
pub mod element;
pub mod error;
pub mod history;
pub mod shortcuts;
pub mod site;
pub mod storage;
pub mod store;

pub use drag::{DragDropEngine, DragPayload, DropOutcome, DropTarget, closest_intersecting};
pub use element::{Element, ElementId, ElementKind, ElementUpdate};
pub use error::{BuilderError, BuilderResult};
pub use history::{History, HistoryEntry, MAX_UNDO_HISTORY};
pub use shortcuts::{BuilderAction, KeyPress, ShortcutOutcome, ShortcutRegistry};
pub use site::{GlobalStyles, Site, SiteContent};
pub use storage::{AutoSaveManager, FileStorage, MemoryStorage, Storage, StorageError, StorageResult};
pub use store::{BuilderStore, SaveRequest, Viewport};
