//! Anonymization labels for peer review.
//!
//! Stage 2 shows reviewers the opinions as "Response A", "Response B", …
//! in a shuffled order so no reviewer can favor a known peer or the first
//! slot. One map is drawn per council run and shared by every reviewer, so
//! ranks can be mapped back to original opinions when aggregating.

use rand::seq::SliceRandom;

/// Stable label position ↔ original opinion index mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMap {
    /// `order[pos]` = original index of the opinion shown at label `pos`
    order: Vec<usize>,
}

impl LabelMap {
    /// Draw a fresh shuffled mapping for `count` opinions
    pub fn shuffled(count: usize) -> Self {
        let mut order: Vec<usize> = (0..count).collect();
        order.shuffle(&mut rand::thread_rng());
        Self { order }
    }

    /// Build from an explicit order, for tests that need a known map.
    ///
    /// # Panics
    /// Panics if `order` is not a permutation of `0..order.len()`
    pub fn with_order(order: Vec<usize>) -> Self {
        let mut seen = order.clone();
        seen.sort_unstable();
        assert!(
            seen.iter().copied().eq(0..order.len()),
            "label order must be a permutation of 0..len"
        );
        Self { order }
    }

    /// Original opinion index shown at label position `pos`
    pub fn original_index(&self, pos: usize) -> usize {
        self.order[pos]
    }

    /// Display label for position `pos`: "Response A", "Response B", …
    pub fn label(pos: usize) -> String {
        // Council size is capped well below 26
        let letter = (b'A' + (pos % 26) as u8) as char;
        format!("Response {letter}")
    }

    /// What one reviewer sees: (label, original index) for every opinion
    /// except their own, in label order. Labels are global, so every
    /// reviewer refers to the same opinion by the same letter.
    pub fn shown_to(&self, reviewer_original: usize) -> Vec<(String, usize)> {
        self.order
            .iter()
            .enumerate()
            .filter(|(_, original)| **original != reviewer_original)
            .map(|(pos, original)| (Self::label(pos), *original))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_order_maps_positions() {
        let map = LabelMap::with_order(vec![2, 0, 1]);
        assert_eq!(map.original_index(0), 2);
        assert_eq!(map.original_index(2), 1);
    }

    #[test]
    fn test_shuffled_is_permutation() {
        let map = LabelMap::shuffled(7);
        let mut indices: Vec<usize> = (0..7).map(|pos| map.original_index(pos)).collect();
        indices.sort_unstable();
        assert_eq!(indices, vec![0, 1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_labels() {
        assert_eq!(LabelMap::label(0), "Response A");
        assert_eq!(LabelMap::label(2), "Response C");
    }

    #[test]
    fn test_shown_to_excludes_reviewer() {
        // Opinion 2 shown first, then 0, then 1
        let map = LabelMap::with_order(vec![2, 0, 1]);
        let shown = map.shown_to(0);
        assert_eq!(shown, vec![("Response A".to_string(), 2), ("Response C".to_string(), 1)]);
    }

    #[test]
    #[should_panic]
    fn test_with_order_rejects_non_permutation() {
        LabelMap::with_order(vec![0, 0, 1]);
    }
}
