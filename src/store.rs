//! File-backed document store with an in-memory write-through copy.
//!
//! The whole document is rewritten on every change. A single async mutex
//! serializes read-modify-write cycles so concurrent requests cannot
//! overwrite each other.

use crate::models::{AdminCredential, Document};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Thread-safe JSON document store
pub struct Store {
    /// Location of the document on disk
    path: PathBuf,

    /// Current document, always equal to what was last written
    doc: Mutex<Document>,
}

impl Store {
    /// Open the document at `path`, creating it with empty collections and
    /// the given admin credential if it does not exist yet.
    pub async fn open(path: impl Into<PathBuf>, admin: AdminCredential) -> Result<Self, StoreError> {
        let path = path.into();

        let doc = match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let doc: Document = serde_json::from_slice(&bytes)?;
                info!(
                    path = %path.display(),
                    clients = doc.clients.len(),
                    programs = doc.programs.len(),
                    tickets = doc.tickets.len(),
                    recipes = doc.recipes.len(),
                    "Loaded document"
                );
                doc
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let doc = Document::new(admin);
                write_document(&path, &doc).await?;
                info!(path = %path.display(), "Initialized empty document");
                doc
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            doc: Mutex::new(doc),
        })
    }

    /// Snapshot of the current document
    pub async fn load(&self) -> Document {
        self.doc.lock().await.clone()
    }

    /// Run `f` against the current document without copying it
    pub async fn read<T>(&self, f: impl FnOnce(&Document) -> T) -> T {
        f(&*self.doc.lock().await)
    }

    /// Replace the whole document
    pub async fn save(&self, doc: Document) -> Result<(), StoreError> {
        let mut current = self.doc.lock().await;
        write_document(&self.path, &doc).await?;
        *current = doc;
        Ok(())
    }

    /// Apply `f` to a copy of the document and persist the result.
    ///
    /// The lock is held for the whole cycle. When `f` fails nothing is
    /// written; when it leaves the document unchanged the disk write is
    /// skipped.
    pub async fn mutate<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Document) -> Result<T, E>,
        E: From<StoreError>,
    {
        let mut current = self.doc.lock().await;
        let mut next = current.clone();

        let out = f(&mut next)?;

        if next != *current {
            write_document(&self.path, &next).await?;
            *current = next;
            debug!("Document persisted");
        }

        Ok(out)
    }
}

/// Serialize and write the document via a temporary sibling file
async fn write_document(path: &Path, doc: &Document) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let bytes = serde_json::to_vec_pretty(doc)?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, path).await?;

    Ok(())
}

/// Store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt document: {0}")]
    Corrupt(#[from] serde_json::Error),
}
