//! Concepts and the detection interface.
//!
//! A concept is a label produced by an upstream object detector. Concepts are
//! used verbatim as path segments of ConceptNet URLs and as graph node names,
//! so the detector is expected to hand out valid segments.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::error::DetectError;

/// A detected label, e.g. `"dog"`.
pub type Concept = String;

/// Deduplicated set of concepts from one detection run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConceptSet(BTreeSet<Concept>);

impl ConceptSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a label. Surrounding whitespace is trimmed and empty labels dropped.
    pub fn insert(&mut self, label: &str) -> bool {
        let label = label.trim();
        if label.is_empty() {
            return false;
        }
        self.0.insert(label.to_string())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for ConceptSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for label in iter {
            set.insert(label.as_ref());
        }
        set
    }
}

impl<'a> IntoIterator for &'a ConceptSet {
    type Item = &'a Concept;
    type IntoIter = std::collections::btree_set::Iter<'a, Concept>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// An object detector: image in, labels out.
///
/// Detection never fails from the caller's point of view. An implementation
/// that cannot process the image logs the reason and returns an empty set.
pub trait Detector {
    fn detect(&self, image: &Path) -> ConceptSet;
}

/// Reads labels written by an external detector.
///
/// Looks for `<image>.labels` next to the image, or a fixed file when one is
/// configured. One label per line; blank lines and `#` comments are ignored.
#[derive(Debug, Clone, Default)]
pub struct LabelFileDetector {
    labels_path: Option<PathBuf>,
}

impl LabelFileDetector {
    /// Use `<image>.labels` sidecar files.
    pub fn sidecar() -> Self {
        Self { labels_path: None }
    }

    /// Always read this file regardless of the image.
    pub fn fixed(path: impl Into<PathBuf>) -> Self {
        Self {
            labels_path: Some(path.into()),
        }
    }

    fn labels_for(&self, image: &Path) -> PathBuf {
        match &self.labels_path {
            Some(path) => path.clone(),
            None => {
                let mut name = image.as_os_str().to_owned();
                name.push(".labels");
                PathBuf::from(name)
            }
        }
    }

    /// Read and parse a label file.
    pub fn read_labels(path: &Path) -> Result<ConceptSet, DetectError> {
        let content = std::fs::read_to_string(path).map_err(|e| DetectError::Labels {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok(parse_labels(&content))
    }
}

impl Detector for LabelFileDetector {
    fn detect(&self, image: &Path) -> ConceptSet {
        let path = self.labels_for(image);
        match Self::read_labels(&path) {
            Ok(concepts) => {
                if concepts.is_empty() {
                    tracing::warn!(image = %image.display(), "no objects detected");
                } else {
                    tracing::info!(image = %image.display(), count = concepts.len(), "detected concepts");
                }
                concepts
            }
            Err(e) => {
                tracing::error!(image = %image.display(), error = %e, "object detection failed");
                ConceptSet::new()
            }
        }
    }
}

/// Parse newline-separated labels.
pub fn parse_labels(content: &str) -> ConceptSet {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('#'))
        .collect()
}
