//! Candidate catalog.
//!
//! Scans the watched directory for eligible images and keeps them ordered
//! newest first. A watermark taken at the start of every scan decides which
//! files count as newly discovered on the next one.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use natord::compare;
use thiserror::Error;

use super::source::{DirEntryInfo, DirectorySource};
use crate::config::{AgentConfig, CatalogStyle, PrimaryOrientation};

/// Orientation of a scanned image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Landscape,
    Portrait,
}

/// An eligible image in the watched directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// File name relative to the watched directory. Unique within a catalog.
    pub name: String,
    /// Absolute path to the image.
    pub path: PathBuf,
    /// Last modification time at scan time.
    pub modified: SystemTime,
    /// Pixel width.
    pub width: u32,
    /// Pixel height.
    pub height: u32,
}

impl Candidate {
    /// Returns the orientation derived from the pixel size. Squares are landscape.
    #[must_use]
    pub const fn orientation(&self) -> Orientation {
        if self.width >= self.height { Orientation::Landscape } else { Orientation::Portrait }
    }
}

/// Eligible images ordered newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    entries: Vec<Candidate>,
}

impl Catalog {
    /// Builds a catalog from arbitrary candidates, sorting them newest first.
    #[must_use]
    pub fn from_candidates(mut entries: Vec<Candidate>) -> Self {
        sort_newest_first(&mut entries);
        Self { entries }
    }

    #[must_use]
    pub const fn len(&self) -> usize { self.entries.len() }

    #[must_use]
    pub const fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Returns the candidates, newest first.
    #[must_use]
    pub fn candidates(&self) -> &[Candidate] { &self.entries }

    /// Looks up a candidate by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Candidate> {
        self.entries.iter().find(|candidate| candidate.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Candidate> { self.entries.iter() }
}

/// Outcome of a catalog refresh.
#[derive(Debug, Clone)]
pub enum CatalogScan {
    /// At least one eligible image was found.
    Ready {
        catalog: Catalog,
        /// Names of eligible files modified after the previous watermark.
        discovered: Vec<String>,
        /// Time captured before the directory was listed.
        watermark: SystemTime,
    },
    /// The directory holds no eligible image.
    Empty { watermark: SystemTime },
}

impl CatalogScan {
    /// Returns the watermark of this scan.
    #[must_use]
    pub const fn watermark(&self) -> SystemTime {
        match self {
            Self::Ready { watermark, .. } | Self::Empty { watermark } => *watermark,
        }
    }
}

/// Errors that prevent a catalog refresh.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The watched directory does not exist or cannot be listed.
    #[error("cannot read wallpaper directory {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Scan settings derived from the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogOptions {
    pub directory: PathBuf,
    /// Lowercase extensions without the leading dot.
    pub extensions: Vec<String>,
    pub orientation: PrimaryOrientation,
    pub style: CatalogStyle,
}

impl CatalogOptions {
    #[must_use]
    pub fn from_config(config: &AgentConfig) -> Self {
        Self {
            directory: config.watch_dir(),
            extensions: config.extensions(),
            orientation: config.primary_orientation,
            style: config.catalog_style,
        }
    }

    /// Checks if a file name has a supported extension (case-insensitive).
    #[must_use]
    pub fn is_supported(&self, name: &str) -> bool {
        Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(ext)))
    }
}

/// Rescans the watched directory.
///
/// With no `watermark` nothing counts as newly discovered. In the incremental
/// style only newly discovered files are probed and merged in front of
/// `previous`; without a previous catalog every file is probed.
///
/// # Errors
///
/// Returns `CatalogError::Unreadable` if the directory cannot be listed.
pub fn refresh(
    source: &dyn DirectorySource,
    options: &CatalogOptions,
    previous: Option<&Catalog>,
    watermark: Option<SystemTime>,
) -> Result<CatalogScan, CatalogError> {
    // Taken before listing so files written during the scan are seen next time
    let now = SystemTime::now();

    let listing = source.list_entries(&options.directory).map_err(|source| {
        CatalogError::Unreadable {
            path: options.directory.clone(),
            source,
        }
    })?;

    let eligible: Vec<DirEntryInfo> =
        listing.into_iter().filter(|entry| options.is_supported(&entry.name)).collect();

    let is_new = |entry: &DirEntryInfo| watermark.is_some_and(|mark| entry.modified > mark);

    let (entries, discovered) = match (options.style, previous) {
        (CatalogStyle::Incremental, Some(previous)) => {
            let fresh: Vec<&DirEntryInfo> = eligible.iter().filter(|e| is_new(e)).collect();
            let fresh_names: HashSet<&str> = fresh.iter().map(|e| e.name.as_str()).collect();
            let present: HashSet<&str> = eligible.iter().map(|e| e.name.as_str()).collect();

            let mut merged: Vec<Candidate> =
                fresh.into_iter().filter_map(|entry| probe(source, entry, options.orientation)).collect();
            sort_newest_first(&mut merged);
            let discovered = merged.iter().map(|c| c.name.clone()).collect();

            merged.extend(
                previous
                    .iter()
                    .filter(|c| present.contains(c.name.as_str()))
                    .filter(|c| !fresh_names.contains(c.name.as_str()))
                    .cloned(),
            );
            (merged, discovered)
        }
        _ => {
            let mut all: Vec<Candidate> = eligible
                .iter()
                .filter_map(|entry| probe(source, entry, options.orientation))
                .collect();
            sort_newest_first(&mut all);
            let discovered = all
                .iter()
                .filter(|c| watermark.is_some_and(|mark| c.modified > mark))
                .map(|c| c.name.clone())
                .collect();
            (all, discovered)
        }
    };

    if entries.is_empty() {
        return Ok(CatalogScan::Empty { watermark: now });
    }

    Ok(CatalogScan::Ready {
        catalog: Catalog { entries },
        discovered,
        watermark: now,
    })
}

/// Reads the image size and applies the orientation filter.
fn probe(
    source: &dyn DirectorySource,
    entry: &DirEntryInfo,
    orientation: PrimaryOrientation,
) -> Option<Candidate> {
    let (width, height) = match source.dimensions(&entry.path) {
        Ok(size) => size,
        Err(err) => {
            tracing::debug!(error = %err, path = %entry.path.display(), "skipping undecodable image");
            return None;
        }
    };

    if !orientation.accepts(width, height) {
        return None;
    }

    Some(Candidate {
        name: entry.name.clone(),
        path: entry.path.clone(),
        modified: entry.modified,
        width,
        height,
    })
}

/// Sorts newest first, breaking ties with natural name order.
fn sort_newest_first(entries: &mut [Candidate]) {
    entries.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| compare(&a.name, &b.name)));
}
