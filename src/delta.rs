use compact_str::CompactString;
use hashbrown::HashSet;

/// Rolling memory of the previous poll: one full snapshot, replaced wholesale
/// each completed iteration.
///
/// New ads are only looked for in the leading half of the current listing.
/// The page presents most-recent-first, so genuine novelty surfaces at the
/// front; entries further down that drift in and out with pagination or
/// re-sorting are not reported.
#[derive(Debug, Default)]
pub struct DeltaTracker {
    cache: Vec<CompactString>,
}

impl DeltaTracker {
    #[must_use]
    pub const fn new() -> Self {
        Self { cache: Vec::new() }
    }

    /// Links in the scan window (first half of `current`) that the previous
    /// snapshot did not contain anywhere, in page order.
    ///
    /// Empty until one poll has completed, so startup never notifies.
    #[must_use]
    pub fn diff(&self, current: &[CompactString]) -> Vec<CompactString> {
        if self.cache.is_empty() {
            return Vec::new();
        }

        let seen: HashSet<&str> = self.cache.iter().map(CompactString::as_str).collect();
        current[..current.len() / 2]
            .iter()
            .filter(|link| !seen.contains(link.as_str()))
            .cloned()
            .collect()
    }

    /// Installs `snapshot` as the new point of comparison, discarding the old
    /// one entirely.
    pub fn replace(&mut self, snapshot: Vec<CompactString>) {
        self.cache = snapshot;
    }
}
