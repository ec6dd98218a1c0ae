//! Longest weak chain selection.
//!
//! Tracks the node with the greatest weight. Among equal weights the
//! earliest arrival wins and keeps the position until a strictly heavier
//! node shows up.

use super::WeakBlock;
use shared_types::Hash;

/// Ordering key: heavier first, then earlier arrival.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct TipKey {
    pub(crate) hash: Hash,
    pub(crate) weight: u64,
    pub(crate) arrival: u64,
}

impl TipKey {
    pub(crate) fn of(wb: &WeakBlock) -> Self {
        Self {
            hash: wb.hash,
            weight: wb.weight,
            arrival: wb.arrival,
        }
    }

    /// True if `self` should replace `other` as the longest tip.
    pub(crate) fn beats(&self, other: &TipKey) -> bool {
        self.weight > other.weight || (self.weight == other.weight && self.arrival < other.arrival)
    }
}

#[derive(Debug, Default)]
pub(crate) struct LongestChainSelector {
    best: Option<TipKey>,
}

impl LongestChainSelector {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn best(&self) -> Option<Hash> {
        self.best.map(|k| k.hash)
    }

    /// Feed a newly accepted node. Returns true if it became the longest tip.
    ///
    /// New nodes always arrive after the current best, so only a strictly
    /// greater weight displaces it.
    pub(crate) fn offer(&mut self, wb: &WeakBlock) -> bool {
        let candidate = TipKey::of(wb);
        match self.best {
            Some(current) if !candidate.beats(&current) => false,
            _ => {
                self.best = Some(candidate);
                true
            }
        }
    }

    /// Recompute from scratch over the surviving nodes.
    pub(crate) fn recompute<'a>(&mut self, nodes: impl IntoIterator<Item = &'a WeakBlock>) {
        self.best = nodes.into_iter().map(TipKey::of).fold(None, |best, k| match best {
            Some(b) if !k.beats(&b) => Some(b),
            _ => Some(k),
        });
    }

    /// Drop the current best if it is `hash`. Returns true if it was.
    pub(crate) fn invalidate(&mut self, hash: &Hash) -> bool {
        if self.best.is_some_and(|k| &k.hash == hash) {
            self.best = None;
            true
        } else {
            false
        }
    }

    pub(crate) fn clear(&mut self) {
        self.best = None;
    }

    #[cfg(test)]
    pub(crate) fn force(&mut self, key: Option<TipKey>) {
        self.best = key;
    }
}
