use std::path::Path;

use anyhow::Result;
use tracing::info;

use crate::config::EditorConfig;
use crate::editor::{Editor, Notification};
use crate::event::EditEvent;
use crate::history::{History, HistoryState};
use crate::source::load_decoded_image;

/// An [`Editor`] plus its undo log.
pub struct Session {
    editor: Editor,
    history: History,
}

impl Session {
    pub fn new(editor: Editor) -> Self {
        Self {
            editor,
            history: History::new(),
        }
    }

    /// Decode `path` and start editing it. A decode failure surfaces as a
    /// [`crate::source::LoadError`] inside the returned error.
    pub async fn open(path: impl AsRef<Path>, config: EditorConfig) -> Result<Self> {
        let source = load_decoded_image(path).await?;
        Ok(Self::new(Editor::load(source, config)?))
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut Editor {
        &mut self.editor
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Record an edit the editor already shows, at the end of a gesture.
    pub fn commit(&mut self, event: EditEvent) {
        if self.editor.is_closed() {
            return;
        }
        let state = self.history.commit(event);
        self.announce(state);
    }

    /// Apply `event` through the live path, then commit it.
    pub fn apply(&mut self, event: EditEvent) -> Result<()> {
        crate::history::ReplayTarget::replay(&mut self.editor, &event)?;
        self.commit(event);
        Ok(())
    }

    pub fn undo(&mut self) -> Result<bool> {
        if self.editor.is_closed() {
            return Ok(false);
        }
        let undone = self.history.undo(&mut self.editor)?;
        if undone {
            self.announce(self.history.state());
        }
        Ok(undone)
    }

    pub fn redo(&mut self) -> Result<bool> {
        if self.editor.is_closed() {
            return Ok(false);
        }
        let redone = self.history.redo(&mut self.editor)?;
        if redone {
            self.announce(self.history.state());
        }
        Ok(redone)
    }

    pub fn close(&mut self) {
        self.editor.close();
        info!(events = self.history.len(), "session closed");
    }

    fn announce(&mut self, state: HistoryState) {
        self.editor.notify(Notification::HistoryChanged {
            can_undo: state.can_undo,
            can_redo: state.can_redo,
        });
    }
}
