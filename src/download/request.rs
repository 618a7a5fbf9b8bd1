//! Download requests.
//!
//! A [`DownloadRequest`] names one transfer: the caller-chosen id, the source
//! URL, the destination directory and file name, and extra request headers.
//! It is validated on construction and immutable afterwards.
//!
//! # Examples
//!
//! ```rust
//! use haul::download::DownloadRequest;
//!
//! // Explicit file name
//! let request = DownloadRequest::new("a", "https://example.com/get?id=1", "/tmp", "f.bin")?
//!     .with_header("Referer", "https://example.com/")?;
//! assert_eq!(request.destination(), std::path::Path::new("/tmp/f.bin"));
//!
//! // File name taken from the URL
//! let request = DownloadRequest::from_url("b", "https://example.com/file-0.1.2.zip", "/tmp")?;
//! assert_eq!(request.filename(), "file-0.1.2.zip");
//! # Ok::<(), haul::Error>(())
//! ```

use crate::error::{Error, Result};

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Url;
use std::path::{Path, PathBuf};

/// Represents a file to be downloaded under a caller-chosen id.
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    id: String,
    url: Url,
    directory: PathBuf,
    filename: String,
    headers: HeaderMap,
}

impl DownloadRequest {
    /// Creates a new [`DownloadRequest`].
    ///
    /// Fails with [`Error::InvalidRequest`] for an empty id or an unusable
    /// file name, and with [`Error::InvalidUrl`] when `url` is not an
    /// HTTP(S) URL.
    pub fn new(
        id: impl Into<String>,
        url: &str,
        directory: impl Into<PathBuf>,
        filename: impl Into<String>,
    ) -> Result<Self> {
        let id = validate_id(id.into())?;
        let url = parse_url(url)?;
        let filename = validate_filename(filename.into())?;
        Ok(Self {
            id,
            url,
            directory: directory.into(),
            filename,
            headers: HeaderMap::new(),
        })
    }

    /// Creates a new [`DownloadRequest`], extracting the file name from the
    /// last segment of the URL path.
    pub fn from_url(id: impl Into<String>, url: &str, directory: impl Into<PathBuf>) -> Result<Self> {
        let parsed = parse_url(url)?;
        let filename = filename_from_url(&parsed)?;
        Self::new(id, url, directory, filename)
    }

    /// Add one request header. Later values for the same name replace earlier ones.
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| Error::InvalidRequest(format!("invalid header name `{}`: {}", name, e)))?;
        let value = HeaderValue::from_str(value).map_err(|e| {
            Error::InvalidRequest(format!("invalid value for header `{}`: {}", name, e))
        })?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Add several request headers.
    pub fn with_headers<I, K, V>(self, headers: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        headers
            .into_iter()
            .try_fold(self, |request, (name, value)| {
                request.with_header(name.as_ref(), value.as_ref())
            })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Headers sent along with the GET request.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Final path of the downloaded file.
    pub fn destination(&self) -> PathBuf {
        self.directory.join(&self.filename)
    }
}

fn validate_id(id: String) -> Result<String> {
    if id.trim().is_empty() {
        return Err(Error::InvalidRequest("download id must not be empty".into()));
    }
    Ok(id)
}

fn parse_url(value: &str) -> Result<Url> {
    let url = Url::parse(value)
        .map_err(|e| Error::InvalidUrl(format!("The url \"{}\" cannot be parsed: {}", value, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(Error::InvalidUrl(format!(
            "The url \"{}\" uses the unsupported scheme \"{}\"",
            value, scheme
        ))),
    }
}

/// A file name must stay inside the destination directory.
fn validate_filename(filename: String) -> Result<String> {
    if filename.is_empty() || filename == "." || filename == ".." {
        return Err(Error::InvalidRequest(format!(
            "\"{}\" is not a usable file name",
            filename
        )));
    }
    if filename.contains(['/', '\\', '\0']) {
        return Err(Error::InvalidRequest(format!(
            "file name \"{}\" must not contain path separators",
            filename
        )));
    }
    Ok(filename)
}

fn filename_from_url(url: &Url) -> Result<String> {
    url.path_segments()
        .ok_or_else(|| {
            Error::InvalidUrl(format!("The url \"{}\" does not contain a valid path", url))
        })?
        .next_back()
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            form_urlencoded::parse(segment.as_bytes())
                .map(|(key, val)| [key, val].concat())
                .collect::<String>()
        })
        .ok_or_else(|| Error::InvalidUrl(format!("The url \"{}\" does not contain a filename", url)))
}
