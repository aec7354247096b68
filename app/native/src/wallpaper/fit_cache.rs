//! Image fit cache.
//!
//! Produces copies of the candidates resized to cover the largest connected
//! display, stored as `<stem>-<width>x<height><ext>` in the cache directory.
//! Existing files are reused while they are newer than their source; files
//! for other resolutions are left alone.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{ImageFormat, ImageReader};
use rayon::prelude::*;

use super::catalog::Candidate;
use super::source::ScreenSize;

/// JPEG quality used for fitted images.
const JPEG_QUALITY: u8 = 95;

/// Resize filter used for fitted images.
const RESIZE_FILTER: FilterType = FilterType::Lanczos3;

/// Errors that can occur while fitting an image.
#[derive(Debug)]
pub enum FitError {
    /// Failed to read or decode the source image.
    ImageRead(String),
    /// Failed to encode or save the fitted image.
    ImageSave(String),
    /// Failed to create the cache directory.
    CacheDirectory(String),
}

impl std::fmt::Display for FitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ImageRead(path) => write!(f, "Failed to read image: {path}"),
            Self::ImageSave(path) => write!(f, "Failed to save fitted image: {path}"),
            Self::CacheDirectory(path) => {
                write!(f, "Failed to create cache directory: {path}")
            }
        }
    }
}

impl std::error::Error for FitError {}

/// Where the image for a candidate comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FitOutcome {
    /// The image is smaller than the target and is used as is.
    Original(PathBuf),
    /// A fitted copy already existed.
    Cached(PathBuf),
    /// A fitted copy was written.
    Generated(PathBuf),
}

impl FitOutcome {
    /// Path to apply as wallpaper.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Original(path) | Self::Cached(path) | Self::Generated(path) => path,
        }
    }
}

/// Returns the largest display by area, or 2560x1440 when none is known.
#[must_use]
pub fn target_resolution(displays: &[ScreenSize]) -> ScreenSize {
    displays
        .iter()
        .copied()
        .filter(|size| size.width > 0 && size.height > 0)
        .max_by_key(|size| size.area())
        .unwrap_or_else(ScreenSize::default_2k)
}

/// Computes the cover-fit size of an image for `target`.
///
/// Returns `None` when the image is smaller than the target in both
/// dimensions and should be used unresized. Otherwise the height is matched
/// first; if that leaves the width short, the width is matched instead. The
/// overflowing dimension is kept, never cropped.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn fit_size(image: (u32, u32), target: ScreenSize) -> Option<(u32, u32)> {
    let (width, height) = image;
    if width == 0 || height == 0 {
        return None;
    }
    if width < target.width && height < target.height {
        return None;
    }

    let by_height_width =
        (f64::from(width) * f64::from(target.height) / f64::from(height)).round() as u32;
    if by_height_width >= target.width {
        return Some((by_height_width.max(1), target.height));
    }

    let by_width_height =
        (f64::from(height) * f64::from(target.width) / f64::from(width)).round() as u32;
    Some((target.width, by_width_height.max(1)))
}

/// Generates the cache filename for a candidate at a resolution.
#[must_use]
pub fn cache_filename(name: &str, target: ScreenSize) -> String {
    let path = Path::new(name);
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("wallpaper");
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default();
    format!("{stem}-{}x{}{ext}", target.width, target.height)
}

/// Fits a single candidate into `root` for `target`.
///
/// # Errors
///
/// Returns a `FitError` if the cache directory cannot be created or the image
/// cannot be decoded, resized or saved.
pub fn fit_candidate(
    candidate: &Candidate,
    root: &Path,
    target: ScreenSize,
) -> Result<FitOutcome, FitError> {
    let Some((width, height)) = fit_size((candidate.width, candidate.height), target) else {
        return Ok(FitOutcome::Original(candidate.path.clone()));
    };

    let cache_path = root.join(cache_filename(&candidate.name, target));
    if is_fresh(&cache_path, candidate.modified) {
        return Ok(FitOutcome::Cached(cache_path));
    }

    ensure_dir(root)?;

    let img = ImageReader::open(&candidate.path)
        .map_err(|_| FitError::ImageRead(candidate.path.display().to_string()))?
        .with_guessed_format()
        .map_err(|_| FitError::ImageRead(candidate.path.display().to_string()))?
        .decode()
        .map_err(|_| FitError::ImageRead(candidate.path.display().to_string()))?;

    let resized = img.resize_exact(width, height, RESIZE_FILTER);

    // Renamed into place only once fully written
    let partial_path = root.join(format!(".partial-{}", cache_filename(&candidate.name, target)));
    let save_error = || FitError::ImageSave(cache_path.display().to_string());

    let format = ImageFormat::from_path(&cache_path).unwrap_or(ImageFormat::Jpeg);
    let file = File::create(&partial_path).map_err(|_| save_error())?;
    let mut writer = BufWriter::new(file);

    let encoded = if format == ImageFormat::Jpeg {
        let encoder = JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY);
        resized.to_rgb8().write_with_encoder(encoder)
    } else {
        resized.write_to(&mut writer, format)
    };
    let flushed = writer.into_inner().is_ok();

    if encoded.is_err() || !flushed || fs::rename(&partial_path, &cache_path).is_err() {
        let _ = fs::remove_file(&partial_path);
        return Err(save_error());
    }

    Ok(FitOutcome::Generated(cache_path))
}

/// A fitted file is reusable when it was written after its source changed.
fn is_fresh(cache_path: &Path, source_modified: SystemTime) -> bool {
    fs::metadata(cache_path)
        .and_then(|meta| meta.modified())
        .is_ok_and(|cached| cached >= source_modified)
}

fn ensure_dir(dir: &Path) -> Result<(), FitError> {
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|_| FitError::CacheDirectory(dir.display().to_string()))?;
    }
    Ok(())
}

/// Counts from a bulk build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrewarmSummary {
    pub generated: usize,
    pub cached: usize,
    pub original: usize,
    pub failed: usize,
}

/// Mapped image together with the source state it was built from.
#[derive(Debug, Clone)]
struct Entry {
    path: PathBuf,
    modified: SystemTime,
    size: (u32, u32),
}

impl Entry {
    fn new(candidate: &Candidate, path: PathBuf) -> Self {
        Self {
            path,
            modified: candidate.modified,
            size: (candidate.width, candidate.height),
        }
    }

    fn matches(&self, candidate: &Candidate) -> bool {
        self.modified == candidate.modified && self.size == (candidate.width, candidate.height)
    }
}

/// Maps candidate names to the image applied for them at one resolution.
///
/// Sources that cannot be decoded are excluded until their file changes.
/// Sources that decode but cannot be written to the cache fall back to the
/// original file.
#[derive(Debug, Clone)]
pub struct FitCache {
    root: PathBuf,
    target: ScreenSize,
    entries: HashMap<String, Entry>,
    excluded: HashMap<String, SystemTime>,
}

impl FitCache {
    /// Creates an empty cache targeting the largest of `displays`.
    #[must_use]
    pub fn new(root: PathBuf, displays: &[ScreenSize]) -> Self {
        Self {
            root,
            target: target_resolution(displays),
            entries: HashMap::new(),
            excluded: HashMap::new(),
        }
    }

    #[must_use]
    pub const fn target(&self) -> ScreenSize { self.target }

    #[must_use]
    pub fn root(&self) -> &Path { &self.root }

    /// Number of mapped candidates.
    #[must_use]
    pub fn len(&self) -> usize { self.entries.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Whether `candidate` failed to decode and has not changed since.
    #[must_use]
    pub fn is_excluded(&self, candidate: &Candidate) -> bool {
        self.excluded.get(&candidate.name).is_some_and(|modified| *modified == candidate.modified)
    }

    /// Switches to the largest of `displays`, dropping the mapping when the
    /// target resolution changed. Returns whether it changed.
    pub fn retarget(&mut self, displays: &[ScreenSize]) -> bool {
        let target = target_resolution(displays);
        if target == self.target {
            return false;
        }

        tracing::info!(from = %self.target, to = %target, "display resolution changed");
        self.target = target;
        self.entries.clear();
        true
    }

    /// Returns the path to apply for `candidate`, fitting it on first use.
    ///
    /// A mapping built from an older version of the file is rebuilt. Returns
    /// `None` when the source cannot be decoded.
    pub fn resolve(&mut self, candidate: &Candidate) -> Option<PathBuf> {
        if self.is_excluded(candidate) {
            return None;
        }
        if let Some(entry) = self.entries.get(&candidate.name) {
            if entry.matches(candidate) {
                return Some(entry.path.clone());
            }
            tracing::debug!(name = %candidate.name, "source changed, refitting");
        }

        let result = fit_candidate(candidate, &self.root, self.target);
        self.record(candidate, result)
    }

    /// Stores a fit result, returning the path to apply.
    fn record(
        &mut self,
        candidate: &Candidate,
        result: Result<FitOutcome, FitError>,
    ) -> Option<PathBuf> {
        let path = match result {
            Ok(outcome) => {
                self.excluded.remove(&candidate.name);
                outcome.path().to_path_buf()
            }
            Err(err @ FitError::ImageRead(_)) => {
                tracing::warn!(error = %err, name = %candidate.name, "skipping undecodable image");
                self.entries.remove(&candidate.name);
                self.excluded.insert(candidate.name.clone(), candidate.modified);
                return None;
            }
            Err(err) => {
                tracing::warn!(error = %err, name = %candidate.name, "failed to fit image, using original");
                candidate.path.clone()
            }
        };

        self.entries.insert(candidate.name.clone(), Entry::new(candidate, path.clone()));
        Some(path)
    }

    /// Fits every candidate in parallel and records the results.
    pub fn prewarm(&mut self, candidates: &[Candidate]) -> PrewarmSummary {
        let root = self.root.clone();
        let target = self.target;

        let results: Vec<(&Candidate, Result<FitOutcome, FitError>)> = candidates
            .par_iter()
            .filter(|candidate| {
                !self.is_excluded(candidate)
                    && !self.entries.get(&candidate.name).is_some_and(|entry| entry.matches(candidate))
            })
            .map(|candidate| (candidate, fit_candidate(candidate, &root, target)))
            .collect();

        let mut summary = PrewarmSummary::default();
        for (candidate, result) in results {
            match &result {
                Ok(FitOutcome::Original(_)) => summary.original += 1,
                Ok(FitOutcome::Cached(_)) => summary.cached += 1,
                Ok(FitOutcome::Generated(_)) => summary.generated += 1,
                Err(_) => summary.failed += 1,
            }
            self.record(candidate, result);
        }

        tracing::info!(
            target_size = %target,
            generated = summary.generated,
            cached = summary.cached,
            original = summary.original,
            failed = summary.failed,
            "fit cache ready"
        );
        summary
    }
}
