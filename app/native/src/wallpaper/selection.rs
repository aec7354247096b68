//! Selection policies.
//!
//! Newly discovered images always win. Otherwise the newest-first catalog is
//! cut into recency bands and a weighted draw picks the band. Catalogs with
//! fewer than [`MIN_BANDED_LEN`] images are sampled uniformly.

use std::collections::HashSet;
use std::fmt;
use std::ops::Range;

use rand::{Rng, RngCore};

use super::catalog::{Candidate, Catalog};
use super::source::DirectorySource;
use crate::config::SelectionPolicyKind;

/// Smallest catalog that is split into bands.
pub const MIN_BANDED_LEN: usize = 5;

/// Upper bound (inclusive) of the band draw.
const BAND_DRAW_MAX: u32 = 20;

/// Names discovered since startup that have not been shown yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnseenSet {
    names: HashSet<String>,
}

impl UnseenSet {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Adds discovered names.
    pub fn extend<I: IntoIterator<Item = String>>(&mut self, names: I) { self.names.extend(names); }

    /// Moves every name of `other` into this set.
    pub fn absorb(&mut self, other: Self) { self.names.extend(other.names); }

    /// Removes and returns an arbitrary name.
    pub fn pop_any(&mut self) -> Option<String> {
        let name = self.names.iter().next()?.clone();
        self.names.remove(&name);
        Some(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool { self.names.contains(name) }

    #[must_use]
    pub fn len(&self) -> usize { self.names.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.names.is_empty() }
}

/// Cut points shared by the banded policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Bands {
    quartile: usize,
    half: usize,
    three_quarter: usize,
}

impl Bands {
    const fn new(len: usize) -> Self {
        let half = len / 2;
        let quartile = half / 2;
        Self {
            quartile,
            half,
            three_quarter: half + quartile,
        }
    }
}

/// Draws from `range`, or from the whole catalog when a band is empty.
///
/// Returns 0 for an empty catalog.
fn draw(rng: &mut dyn RngCore, range: Range<usize>, len: usize) -> usize {
    if !range.is_empty() {
        rng.random_range(range)
    } else if len > 0 {
        rng.random_range(0..len)
    } else {
        0
    }
}

/// Strategy used to pick the next image.
pub trait SelectionPolicy: fmt::Debug {
    /// Picks a catalog index for a catalog of `len` images.
    ///
    /// The bands are only meaningful from [`MIN_BANDED_LEN`] images up, but
    /// any `len` is accepted; the result is below `len` whenever `len > 0`.
    fn pick_index(&self, len: usize, rng: &mut dyn RngCore) -> usize;

    /// Returns the next image name.
    ///
    /// Pops the unseen set first. Returns `None` only when both the unseen
    /// set and the catalog are empty.
    fn choose(
        &self,
        catalog: &Catalog,
        unseen: &mut UnseenSet,
        rng: &mut dyn RngCore,
    ) -> Option<String> {
        if let Some(name) = unseen.pop_any() {
            return Some(name);
        }

        let len = catalog.len();
        if len == 0 {
            return None;
        }

        let index =
            if len < MIN_BANDED_LEN { rng.random_range(0..len) } else { self.pick_index(len, rng) };

        catalog.candidates().get(index).map(|candidate| candidate.name.clone())
    }
}

/// Overlapping bands: newest quarter, half, three quarters, everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NestedBands;

impl SelectionPolicy for NestedBands {
    fn pick_index(&self, len: usize, rng: &mut dyn RngCore) -> usize {
        let bands = Bands::new(len);
        let band_len = match rng.random_range(0..=BAND_DRAW_MAX) {
            0..=11 => bands.quartile,
            12..=17 => bands.half,
            18..=19 => bands.three_quarter,
            _ => len,
        };
        draw(rng, 0..band_len, len)
    }
}

/// Disjoint bands: newest half, next quarter, oldest quarter.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisjointBands;

impl SelectionPolicy for DisjointBands {
    fn pick_index(&self, len: usize, rng: &mut dyn RngCore) -> usize {
        let bands = Bands::new(len);
        let range = match rng.random_range(0..=BAND_DRAW_MAX) {
            0..=11 => 0..bands.half,
            12..=17 => bands.half..bands.three_quarter,
            _ => bands.three_quarter..len,
        };
        draw(rng, range, len)
    }
}

/// No recency bias.
#[derive(Debug, Clone, Copy, Default)]
pub struct Uniform;

impl SelectionPolicy for Uniform {
    fn pick_index(&self, len: usize, rng: &mut dyn RngCore) -> usize { draw(rng, 0..len, len) }
}

/// Builds the configured policy.
#[must_use]
pub fn make_policy(kind: SelectionPolicyKind) -> Box<dyn SelectionPolicy> {
    match kind {
        SelectionPolicyKind::NestedBands => Box::new(NestedBands),
        SelectionPolicyKind::DisjointBands => Box::new(DisjointBands),
        SelectionPolicyKind::Uniform => Box::new(Uniform),
    }
}

/// Chooses an image whose file still exists and that `selectable` accepts.
///
/// Names that are no longer in the catalog, whose file vanished or that are
/// rejected are discarded and the draw is retried, at most
/// `catalog.len() + unseen.len()` times.
pub fn choose_existing(
    policy: &dyn SelectionPolicy,
    catalog: &Catalog,
    unseen: &mut UnseenSet,
    rng: &mut dyn RngCore,
    source: &dyn DirectorySource,
    selectable: &dyn Fn(&Candidate) -> bool,
) -> Option<Candidate> {
    let attempts = catalog.len() + unseen.len();

    for _ in 0..attempts {
        let name = policy.choose(catalog, unseen, rng)?;

        match catalog.get(&name) {
            Some(candidate) if !source.exists(&candidate.path) => {
                tracing::debug!(path = %candidate.path.display(), "selected image vanished, retrying");
            }
            Some(candidate) if !selectable(candidate) => {
                tracing::debug!(name = %candidate.name, "selected image is excluded, retrying");
            }
            Some(candidate) => return Some(candidate.clone()),
            None => tracing::debug!(name = %name, "unseen image is not in the catalog, retrying"),
        }
    }

    tracing::warn!(attempts, "no existing image could be selected");
    None
}
