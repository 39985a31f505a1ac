//! Multipart file uploads with progress reporting.

use bytes::Bytes;
use futures::stream::{self, BoxStream, StreamExt};
use reqwest::multipart::{Form, Part};
use reqwest::Body;
use std::io;
use std::path::Path;
use tokio_util::io::ReaderStream;

use super::error::{ClientError, ClientResult};

/// Form field the file is sent under.
pub const FILE_FIELD: &str = "file";

const CHUNK_SIZE: usize = 64 * 1024;

/// Progress callback; receives a percentage in `[0, 100]`.
pub type ProgressFn = Box<dyn Fn(u8) + Send + Sync>;

/// Percentage of `total` covered by `loaded`, rounded half up and capped at 100.
pub fn progress_percentage(loaded: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    let loaded = u128::from(loaded.min(total));
    let total = u128::from(total);
    ((loaded * 100 + total / 2) / total) as u8
}

/// Counts bytes as they are handed to the transport.
///
/// Reports after every chunk when the total is known and stays silent
/// otherwise. A known total of zero counts as unknown.
pub struct ProgressTracker {
    loaded: u64,
    total: Option<u64>,
    callback: Option<ProgressFn>,
}

impl ProgressTracker {
    pub fn new(total: Option<u64>, callback: Option<ProgressFn>) -> Self {
        Self {
            loaded: 0,
            total: total.filter(|t| *t > 0),
            callback,
        }
    }

    pub fn loaded(&self) -> u64 {
        self.loaded
    }

    pub fn advance(&mut self, bytes: usize) {
        self.loaded = self.loaded.saturating_add(bytes as u64);
        if let (Some(total), Some(callback)) = (self.total, &self.callback) {
            callback(progress_percentage(self.loaded, total));
        }
    }
}

/// A file to upload: a name, an optional MIME type, and a byte source.
pub struct UploadFile {
    file_name: String,
    mime: Option<String>,
    length: Option<u64>,
    body: BoxStream<'static, io::Result<Bytes>>,
}

impl UploadFile {
    /// Upload an in-memory buffer. The total size is known.
    pub fn from_bytes(file_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        let data: Bytes = data.into();
        let length = data.len() as u64;
        let chunks: Vec<io::Result<Bytes>> = (0..data.len())
            .step_by(CHUNK_SIZE)
            .map(|start| Ok(data.slice(start..(start + CHUNK_SIZE).min(data.len()))))
            .collect();
        Self {
            file_name: file_name.into(),
            mime: None,
            length: Some(length),
            body: stream::iter(chunks).boxed(),
        }
    }

    /// Stream a file from disk. The total size comes from its metadata.
    pub async fn from_path(path: impl AsRef<Path>) -> ClientResult<Self> {
        let path = path.as_ref();
        let file = tokio::fs::File::open(path).await?;
        let length = file.metadata().await?.len();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| {
                ClientError::Io(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("{} has no file name", path.display()),
                ))
            })?;
        Ok(Self {
            file_name,
            mime: None,
            length: Some(length),
            body: ReaderStream::with_capacity(file, CHUNK_SIZE).boxed(),
        })
    }

    /// Upload an arbitrary byte stream. Pass `None` when the size is unknown;
    /// no progress is reported in that case.
    pub fn from_stream<S>(file_name: impl Into<String>, body: S, length: Option<u64>) -> Self
    where
        S: futures::Stream<Item = io::Result<Bytes>> + Send + 'static,
    {
        Self {
            file_name: file_name.into(),
            mime: None,
            length,
            body: body.boxed(),
        }
    }

    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn length(&self) -> Option<u64> {
        self.length
    }

    /// Build the multipart form, wiring `on_progress` into the body stream.
    pub(crate) fn into_form(self, on_progress: Option<ProgressFn>) -> ClientResult<Form> {
        let mut tracker = ProgressTracker::new(self.length, on_progress);
        let body = self.body.inspect(move |chunk| {
            if let Ok(chunk) = chunk {
                tracker.advance(chunk.len());
            }
        });
        let body = Body::wrap_stream(body);

        let part = match self.length {
            Some(length) => Part::stream_with_length(body, length),
            None => Part::stream(body),
        }
        .file_name(self.file_name);

        let part = match self.mime {
            Some(mime) => part
                .mime_str(&mime)
                .map_err(|e| ClientError::Config(format!("Invalid MIME type '{}': {}", mime, e)))?,
            None => part,
        };

        Ok(Form::new().part(FILE_FIELD, part))
    }
}
