//! Editing session: the pipeline controller, its redraw scheduling, undo
//! history and the load/export collaborators.

pub mod config;
pub mod editor;
pub mod event;
pub mod export;
pub mod history;
pub mod scheduler;
pub mod session;
pub mod source;
pub mod stages;

pub use config::EditorConfig;
pub use editor::{Editor, Notification};
pub use event::{EditEvent, EventKey};
pub use history::{History, HistoryState, ReplayTarget};
pub use session::Session;
pub use source::{LoadError, SourceImage, load_decoded_image};
pub use stages::{RenderStats, Stage};
