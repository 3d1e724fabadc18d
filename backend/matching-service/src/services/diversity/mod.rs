use crate::models::ScoredCandidate;
use uuid::Uuid;

pub const DEFAULT_MAX_CONSECUTIVE_FROM_AUTHOR: usize = 2;

/// Diversity Layer - author cap over a ranked sequence
///
/// Greedy: at every position take the highest-ranked remaining item that
/// would not make more than `max_consecutive_from_author` items in a row from
/// the same author. Once only one author remains and the cap is reached, the
/// rest of the sequence is dropped.
#[derive(Debug, Clone)]
pub struct DiversityLayer {
    max_consecutive_from_author: usize,
}

impl DiversityLayer {
    /// `max_consecutive` below 1 is treated as 1
    pub fn new(max_consecutive: usize) -> Self {
        Self {
            max_consecutive_from_author: max_consecutive.max(1),
        }
    }

    pub fn max_consecutive(&self) -> usize {
        self.max_consecutive_from_author
    }

    /// Reorder an already-sorted sequence. Relative order is preserved apart
    /// from deferring items that would break the author cap.
    pub fn rerank(&self, ranked: Vec<ScoredCandidate>) -> Vec<ScoredCandidate> {
        let mut selected: Vec<ScoredCandidate> = Vec::with_capacity(ranked.len());
        let mut remaining = ranked;

        while !remaining.is_empty() {
            let recent_authors = self.get_recent_authors(&selected);
            let next = remaining
                .iter()
                .position(|item| !self.violates_author_diversity(&recent_authors, item));

            match next {
                Some(idx) => selected.push(remaining.remove(idx)),
                None => break,
            }
        }

        selected
    }

    /// Last N author ids, most recent first
    fn get_recent_authors(&self, selected: &[ScoredCandidate]) -> Vec<Uuid> {
        selected
            .iter()
            .rev()
            .take(self.max_consecutive_from_author)
            .map(|s| s.candidate.author_id)
            .collect()
    }

    fn violates_author_diversity(&self, recent_authors: &[Uuid], item: &ScoredCandidate) -> bool {
        if recent_authors.len() < self.max_consecutive_from_author {
            return false;
        }
        recent_authors
            .iter()
            .all(|author| *author == item.candidate.author_id)
    }
}

impl Default for DiversityLayer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CONSECUTIVE_FROM_AUTHOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{fixed_now, post};
    use std::collections::BTreeMap;

    fn scored(author: Uuid, score: f64) -> ScoredCandidate {
        let mut candidate = post(author);
        candidate.created_at = fixed_now();
        ScoredCandidate {
            candidate,
            score,
            breakdown: BTreeMap::new(),
        }
    }

    fn max_run(items: &[ScoredCandidate]) -> usize {
        let mut best = 0;
        let mut run = 0;
        let mut last = None;
        for item in items {
            if Some(item.candidate.author_id) == last {
                run += 1;
            } else {
                run = 1;
                last = Some(item.candidate.author_id);
            }
            best = best.max(run);
        }
        best
    }

    #[test]
    fn test_author_diversity_enforcement() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let ranked = vec![
            scored(a, 0.9),
            scored(a, 0.88),
            scored(a, 0.86),
            scored(b, 0.7),
        ];

        let reranked = DiversityLayer::new(2).rerank(ranked);

        assert_eq!(reranked.len(), 4);
        let authors: Vec<Uuid> = reranked.iter().map(|s| s.candidate.author_id).collect();
        assert_eq!(authors, vec![a, a, b, a]);
        assert!(max_run(&reranked) <= 2);
    }

    #[test]
    fn test_single_author_tail_is_dropped() {
        let a = Uuid::new_v4();
        let ranked: Vec<ScoredCandidate> = (0..5).map(|i| scored(a, 1.0 - i as f64 * 0.1)).collect();

        let reranked = DiversityLayer::new(2).rerank(ranked);

        assert_eq!(reranked.len(), 2);
        assert_eq!(reranked[0].score, 1.0);
    }

    #[test]
    fn test_with_author_limit_one() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let ranked = vec![scored(a, 0.9), scored(a, 0.88), scored(b, 0.5), scored(b, 0.4)];

        let reranked = DiversityLayer::new(1).rerank(ranked);

        let authors: Vec<Uuid> = reranked.iter().map(|s| s.candidate.author_id).collect();
        assert_eq!(authors, vec![a, b, a, b]);
    }

    #[test]
    fn test_already_diverse_order_untouched() {
        let ranked: Vec<ScoredCandidate> =
            (0..6).map(|i| scored(Uuid::new_v4(), 1.0 - i as f64 * 0.1)).collect();
        let ids: Vec<Uuid> = ranked.iter().map(|s| s.candidate.id).collect();

        let reranked = DiversityLayer::default().rerank(ranked);

        let reranked_ids: Vec<Uuid> = reranked.iter().map(|s| s.candidate.id).collect();
        assert_eq!(ids, reranked_ids);
    }

    #[test]
    fn test_zero_cap_is_clamped() {
        assert_eq!(DiversityLayer::new(0).max_consecutive(), 1);
    }

    #[test]
    fn test_empty_input() {
        assert!(DiversityLayer::default().rerank(Vec::new()).is_empty());
    }
}
