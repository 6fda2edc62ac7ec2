//! Content discovery and path → route resolution.
//!
//! Every routable page is a file under the content root. Its route is the
//! chain of directory names leading to it, followed by the file name with
//! the extension removed:
//!
//! ```text
//! content/tutorials/                 # Content root
//! ├── basics.mdx                     → [basics]
//! ├── intro/
//! │   └── setup.mdx                  → [intro, setup]
//! └── rust/
//!     └── async/
//!         └── tasks.mdx              → [rust, async, tasks]
//! ```
//!
//! ## Operations
//!
//! - [`enumerate`] walks the root once and returns every content file.
//! - [`resolve`] maps one file path to its [`RouteSegments`].
//! - [`list_routes`] combines both; this is what a build consumes.
//!
//! Resolution works on path components, never on string prefixes, so a
//! path that is not under the root is reported as
//! [`ResolutionError::OutsideRoot`] instead of producing a bogus route.
//!
//! ## Hidden Entries
//!
//! Files and directories whose name starts with `.` are not content. This
//! keeps editor swap files and `.git` out of the route table.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Serialize;
use std::ffi::OsStr;
use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

/// The recursive walk over the content root could not complete.
#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Cannot read content root {path}: {source}")]
    Root {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Content root is not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

/// A path could not be turned into route segments.
#[derive(Error, Debug, PartialEq)]
pub enum ResolutionError {
    #[error("{path} is not under content root {root}")]
    OutsideRoot { path: PathBuf, root: PathBuf },
    #[error("{0} is the content root itself, not a content file")]
    Empty(PathBuf),
    #[error("Invalid route segment {segment:?} in {path}")]
    InvalidSegment { path: PathBuf, segment: String },
    #[error("Route segment in {0} is not valid UTF-8")]
    NonUtf8(PathBuf),
}

#[derive(Error, Debug)]
pub enum RouteError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
}

/// Ordered route segments, shallowest directory first, file stem last.
///
/// Never empty. Serializes as a plain JSON array of strings.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RouteSegments(Vec<String>);

impl RouteSegments {
    /// Build from owned segments. Returns `None` for an empty list or any
    /// empty or separator-containing segment.
    pub fn new(segments: Vec<String>) -> Option<Self> {
        let valid = !segments.is_empty()
            && segments
                .iter()
                .all(|s| !s.is_empty() && !s.contains('/') && s != "." && s != "..");
        valid.then_some(Self(segments))
    }

    /// Parse a `/`-joined route key such as `intro/setup`.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::new(
            key.split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    // A route always has at least the file stem.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The de-extensioned file name (last segment).
    pub fn name(&self) -> &str {
        self.0.last().map(String::as_str).unwrap_or_default()
    }

    /// Directory segments above the file, outermost first.
    pub fn parents(&self) -> &[String] {
        &self.0[..self.0.len() - 1]
    }

    /// Segments joined with `/`; used as registry key and URL suffix.
    pub fn key(&self) -> String {
        self.0.join("/")
    }

    /// Segments percent-encoded and joined with `/`, for use in an `href`.
    ///
    /// `["c#", "a b"]` → `c%23/a%20b`. The key itself stays unencoded since
    /// it doubles as the output directory path.
    pub fn url_path(&self) -> String {
        self.0
            .iter()
            .map(|s| encode_segment(s))
            .collect::<Vec<_>>()
            .join("/")
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

/// Characters left as-is in a URL path segment: alphanumerics and `-._~`.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encode one URL path segment.
pub fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}

impl fmt::Display for RouteSegments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

/// A discovered content file together with its resolved route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub source: PathBuf,
    pub segments: RouteSegments,
}

/// Find every file under `root` (recursively) whose extension is `extension`.
///
/// The result is sorted by path so builds are reproducible; callers must not
/// rely on any particular order beyond that. Fails if the root is missing,
/// is not a directory, or any part of the walk errors out. There is no
/// partial result.
pub fn enumerate(root: &Path, extension: &str) -> Result<Vec<PathBuf>, DiscoveryError> {
    let meta = fs::metadata(root).map_err(|source| DiscoveryError::Root {
        path: root.to_path_buf(),
        source,
    })?;
    if !meta.is_dir() {
        return Err(DiscoveryError::NotADirectory(root.to_path_buf()));
    }

    let walker = WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e));

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry?;
        if entry.file_type().is_file() && has_extension(entry.path(), extension) {
            files.push(entry.into_path());
        }
    }

    tracing::debug!(
        root = %root.display(),
        count = files.len(),
        "enumerated content files"
    );
    Ok(files)
}

/// Map a content file path to its route segments.
///
/// `root/a/b/c.mdx` → `[a, b, c]`, `root/c.mdx` → `[c]`. Only the final
/// extension is removed (`notes.v2.mdx` → `notes.v2`). Pure: touches no
/// filesystem state.
pub fn resolve(path: &Path, root: &Path) -> Result<RouteSegments, ResolutionError> {
    let relative = path
        .strip_prefix(root)
        .map_err(|_| ResolutionError::OutsideRoot {
            path: path.to_path_buf(),
            root: root.to_path_buf(),
        })?;

    let mut names: Vec<&OsStr> = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(name) => names.push(name),
            Component::CurDir => {}
            other => {
                return Err(ResolutionError::InvalidSegment {
                    path: path.to_path_buf(),
                    segment: other.as_os_str().to_string_lossy().into_owned(),
                });
            }
        }
    }

    let (file, dirs) = names
        .split_last()
        .ok_or_else(|| ResolutionError::Empty(path.to_path_buf()))?;

    let mut segments = Vec::with_capacity(names.len());
    for dir in dirs {
        segments.push(utf8_segment(dir, path)?.to_string());
    }
    let stem = Path::new(file).file_stem().unwrap_or(*file);
    let stem = utf8_segment(stem, path)?;
    if stem.is_empty() {
        return Err(ResolutionError::InvalidSegment {
            path: path.to_path_buf(),
            segment: file.to_string_lossy().into_owned(),
        });
    }
    segments.push(stem.to_string());

    Ok(RouteSegments(segments))
}

/// Enumerate `root` and resolve every file found.
///
/// An empty root yields an empty list. Computed once per build.
pub fn list_routes(root: &Path, extension: &str) -> Result<Vec<Route>, RouteError> {
    let files = enumerate(root, extension)?;
    let mut routes = Vec::with_capacity(files.len());
    for source in files {
        let segments = resolve(&source, root)?;
        tracing::trace!(route = %segments, source = %source.display(), "resolved route");
        routes.push(Route { source, segments });
    }
    Ok(routes)
}

fn utf8_segment<'a>(segment: &'a OsStr, path: &Path) -> Result<&'a str, ResolutionError> {
    segment
        .to_str()
        .ok_or_else(|| ResolutionError::NonUtf8(path.to_path_buf()))
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension().is_some_and(|e| e == extension)
}
