//! One modal editing session: image loading, seeding and saving.
//!
//! Loading and saving each run on a one-shot worker thread and report back
//! over a channel that the UI polls once per frame. Closing the session drops
//! the receivers, so late results are discarded without touching state.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;

use image::RgbaImage;

use crate::config::EditorConfig;
use crate::error::{EditorError, Result};
use crate::guard;
use crate::record::{HistoryRecord, SavePayload};
use crate::save::{self, SaveClient, SaveError};
use crate::tool::Editor;

#[derive(Clone, Debug)]
pub enum ImageSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

impl ImageSource {
    fn decode(self) -> Result<RgbaImage> {
        let bytes = match self {
            ImageSource::Path(path) => std::fs::read(&path).map_err(EditorError::ImageRead)?,
            ImageSource::Bytes(bytes) => bytes,
        };
        Ok(image::load_from_memory(&bytes)?.to_rgba8())
    }
}

#[derive(Debug)]
pub enum SessionEvent {
    ImageLoaded,
    ImageFailed(String),
    /// The save went through and the session is over. `payload` is what was
    /// sent, `record` is the stored record updated with it.
    Saved {
        payload: SavePayload,
        record: HistoryRecord,
    },
    SaveFailed(String),
}

struct PendingSave {
    payload: SavePayload,
    result: Receiver<std::result::Result<(), SaveError>>,
}

pub struct Session {
    record: HistoryRecord,
    config: EditorConfig,
    image: Option<Arc<RgbaImage>>,
    editor: Option<Editor>,
    loading: Option<Receiver<Result<RgbaImage>>>,
    saving: Option<PendingSave>,
    error: Option<String>,
    open: bool,
}

impl Session {
    pub fn open(record: HistoryRecord, source: ImageSource, config: EditorConfig) -> Self {
        let mut session = Self {
            record,
            config,
            image: None,
            editor: None,
            loading: None,
            saving: None,
            error: None,
            open: true,
        };
        session.load_image(source);
        session
    }

    /// Start decoding `source`, replacing any load still in progress.
    pub fn load_image(&mut self, source: ImageSource) {
        if !self.open {
            return;
        }
        tracing::debug!(source = source_kind(&source), "loading image");
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            // the receiver is gone if the session closed meanwhile
            let _ = tx.send(source.decode());
        });
        self.loading = Some(rx);
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_some()
    }

    pub fn is_saving(&self) -> bool {
        self.saving.is_some()
    }

    pub fn record(&self) -> &HistoryRecord {
        &self.record
    }

    pub fn image(&self) -> Option<&Arc<RgbaImage>> {
        self.image.as_ref()
    }

    pub fn editor(&self) -> Option<&Editor> {
        self.editor.as_ref()
    }

    /// Mutable access to the editor, withheld while a save is in flight so the
    /// annotations cannot drift from the payload being sent.
    pub fn editor_mut(&mut self) -> Option<&mut Editor> {
        if self.saving.is_some() {
            return None;
        }
        self.editor.as_mut()
    }

    /// Last user-facing error, cleared by the next successful step.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Discard everything; results still in flight are ignored.
    pub fn close(&mut self) {
        if self.open {
            tracing::debug!(file_id = %self.record.file_id, "session closed");
        }
        self.open = false;
        self.loading = None;
        self.saving = None;
        self.editor = None;
        self.image = None;
    }

    /// Validate and serialize the current annotations, then hand them to
    /// `client` on a worker thread. The store is left untouched until the
    /// outcome is known.
    pub fn begin_save(&mut self, client: Arc<dyn SaveClient>) -> Result<()> {
        let result = self.prepare_save();
        let payload = match result {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!(error = %err, "save refused");
                self.error = Some(err.to_string());
                return Err(err);
            }
        };

        tracing::info!(
            file_id = %payload.file_id,
            boxes = payload.boxes.len(),
            masks = payload.masks.len(),
            "saving annotations"
        );
        let (tx, rx) = mpsc::channel();
        let outgoing = payload.clone();
        std::thread::spawn(move || {
            let _ = tx.send(client.save(&outgoing));
        });
        self.saving = Some(PendingSave {
            payload,
            result: rx,
        });
        self.error = None;
        Ok(())
    }

    fn prepare_save(&self) -> Result<SavePayload> {
        if self.saving.is_some() {
            return Err(EditorError::SaveInFlight);
        }
        if !save::is_valid_file_id(&self.record.file_id) {
            return Err(EditorError::InvalidFileId(self.record.file_id.clone()));
        }
        let editor = self.editor.as_ref().ok_or(EditorError::NoImage)?;
        Ok(editor.to_payload(&self.record))
    }

    /// Check the workers; call once per frame.
    pub fn poll(&mut self) -> Option<SessionEvent> {
        if !self.open {
            return None;
        }

        if let Some(rx) = &self.loading {
            match rx.try_recv() {
                Ok(result) => return Some(self.finish_load(result)),
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => {
                    self.loading = None;
                }
            }
        }

        if let Some(pending) = &self.saving {
            match pending.result.try_recv() {
                Ok(result) => return Some(self.finish_save(result)),
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => {
                    return Some(self.finish_save(Err(SaveError::Rejected(
                        "save worker stopped".to_string(),
                    ))));
                }
            }
        }
        None
    }

    fn finish_load(&mut self, result: Result<RgbaImage>) -> SessionEvent {
        self.loading = None;
        match result {
            Ok(rgba) => {
                let rgba = Arc::new(rgba);
                let guard = guard::for_image(Arc::clone(&rgba), &self.config.draw_guard);
                match &mut self.editor {
                    Some(editor) => editor.replace_image(guard),
                    None => {
                        self.editor = Some(Editor::from_record(&self.record, &self.config, guard));
                    }
                }
                tracing::info!(width = rgba.width(), height = rgba.height(), "image loaded");
                self.image = Some(rgba);
                self.error = None;
                SessionEvent::ImageLoaded
            }
            Err(err) => {
                tracing::error!(error = %err, "image load failed");
                let message = err.to_string();
                self.error = Some(message.clone());
                SessionEvent::ImageFailed(message)
            }
        }
    }

    fn finish_save(&mut self, result: std::result::Result<(), SaveError>) -> SessionEvent {
        let Some(pending) = self.saving.take() else {
            return SessionEvent::SaveFailed("no save in progress".to_string());
        };
        match result {
            Ok(()) => {
                let record = self
                    .record
                    .updated_with(&pending.payload, chrono::Utc::now().to_rfc3339());
                tracing::info!(
                    file_id = %pending.payload.file_id,
                    updated_at = record.updated_at.as_deref().unwrap_or_default(),
                    "annotations saved"
                );
                self.close();
                SessionEvent::Saved {
                    payload: pending.payload,
                    record,
                }
            }
            Err(err) => {
                let err = match err {
                    SaveError::Unauthorized => EditorError::Unauthorized,
                    other => EditorError::SaveFailed(other.to_string()),
                };
                tracing::warn!(error = %err, "save failed");
                let message = err.to_string();
                self.error = Some(message.clone());
                SessionEvent::SaveFailed(message)
            }
        }
    }

    #[cfg(test)]
    fn wait(&mut self) -> Option<SessionEvent> {
        for _ in 0..500 {
            if let Some(event) = self.poll() {
                return Some(event);
            }
            if !self.is_loading() && !self.is_saving() {
                return None;
            }
            std::thread::sleep(std::time::Duration::from_millis(10));
        }
        None
    }
}

fn source_kind(source: &ImageSource) -> &'static str {
    match source {
        ImageSource::Path(_) => "path",
        ImageSource::Bytes(_) => "bytes",
    }
}
