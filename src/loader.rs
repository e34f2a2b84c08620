use crate::error::{VisualizerError, VisualizerResult};
use log::debug;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// What a byte source answered for one URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub status_text: String,
    pub body: Vec<u8>,
}

impl Response {
    pub fn ok(body: Vec<u8>) -> Self {
        Self {
            status: 200,
            status_text: String::from("OK"),
            body,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }

    /// The body of a successful response, or a [`VisualizerError::Network`] naming the status.
    pub fn into_body(self) -> VisualizerResult<Vec<u8>> {
        if self.is_success() {
            Ok(self.body)
        } else {
            Err(VisualizerError::Network(format!(
                "{} {}",
                self.status, self.status_text
            )))
        }
    }
}

/// Fetches the bytes behind a URL. Transport failures are reported as `Err`,
/// unsuccessful answers as a [`Response`] with a non-2xx status.
pub trait Fetch {
    fn fetch(&self, url: &str) -> VisualizerResult<Response>;
}

impl<F: Fn(&str) -> VisualizerResult<Response>> Fetch for F {
    fn fetch(&self, url: &str) -> VisualizerResult<Response> {
        self(url)
    }
}

/// Serves `file://` URLs and bare paths from the local disk.
#[derive(Debug, Clone, Default)]
pub struct FileUrlFetcher {
    root: Option<PathBuf>,
}

impl FileUrlFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves relative paths against `root` instead of the working directory.
    pub fn with_root<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn resolve(&self, url: &str) -> VisualizerResult<PathBuf> {
        let raw = if let Some(path) = url.strip_prefix("file://") {
            path
        } else if let Some((scheme, _)) = url.split_once("://") {
            return Err(VisualizerError::Network(format!(
                "unsupported URL scheme '{}'",
                scheme
            )));
        } else {
            url
        };

        let path = Path::new(raw);
        Ok(match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        })
    }
}

impl Fetch for FileUrlFetcher {
    fn fetch(&self, url: &str) -> VisualizerResult<Response> {
        let path = self.resolve(url)?;
        debug!("Fetching {} from {}", url, path.display());

        match fs::read(&path) {
            Ok(body) => Ok(Response::ok(body)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Response {
                status: 404,
                status_text: String::from("Not Found"),
                body: Vec::new(),
            }),
            Err(e) => Err(VisualizerError::Network(format!(
                "failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }
}

/// Reads a local file for the file-picker style load path.
pub fn read_local_file<P: AsRef<Path>>(path: P) -> VisualizerResult<Vec<u8>> {
    fs::read(path.as_ref()).map_err(|e| VisualizerError::Read {
        path: path.as_ref().display().to_string(),
        reason: e.to_string(),
    })
}
