//! Cosine similarity and ranking over in-memory vectors.
//!
//! Nothing is indexed: every ranking is a full scan over the candidates supplied.

use std::cmp::Ordering;

use serde::Serialize;

/// A payload paired with its similarity to a query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredItem<T> {
    pub item: T,
    pub score: f32,
}

/// Cosine of the angle between `a` and `b`.
///
/// Both vectors must have the same dimension. Returns NaN when either norm is zero;
/// callers treat NaN as "no similarity".
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "embedding dimensions must match");

    let mut dot = 0.0_f32;
    let mut norm_a = 0.0_f32;
    let mut norm_b = 0.0_f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        return f32::NAN;
    }
    dot / denom
}

/// Scores every candidate against `query` and sorts descending.
///
/// The sort is stable, so equal scores keep their input order. NaN scores sort last.
/// Returns the full ranking; callers truncate.
pub fn rank_by_similarity<T, V>(
    query: &[f32],
    candidates: impl IntoIterator<Item = (T, V)>,
) -> Vec<ScoredItem<T>>
where
    V: AsRef<[f32]>,
{
    let mut ranked: Vec<ScoredItem<T>> = candidates
        .into_iter()
        .map(|(item, vector)| ScoredItem {
            score: cosine_similarity(query, vector.as_ref()),
            item,
        })
        .collect();

    ranked.sort_by(|a, b| descending_nan_last(a.score, b.score));
    ranked
}

fn descending_nan_last(a: f32, b: f32) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f32 = 1e-5;

    #[test]
    fn test_identical_vectors_score_one() {
        for v in [vec![1.0_f32, 0.0, 0.0], vec![0.3, -2.0, 5.5], vec![1e-3, 1e-3]] {
            assert!((cosine_similarity(&v, &v) - 1.0).abs() < TOLERANCE);
        }
    }

    #[test]
    fn test_cosine_is_symmetric() {
        let a = [0.2, 0.9, -0.4, 1.5];
        let b = [1.1, -0.3, 0.8, 0.05];
        assert_eq!(cosine_similarity(&a, &b), cosine_similarity(&b, &a));
    }

    #[test]
    fn test_orthogonal_and_opposite() {
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < TOLERANCE);
        assert!((cosine_similarity(&[1.0, 2.0], &[-1.0, -2.0]) + 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_magnitude_invariant() {
        let a = [1.0, 2.0, 3.0];
        let b = [10.0, 20.0, 30.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_zero_norm_is_nan() {
        assert!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]).is_nan());
        assert!(cosine_similarity(&[0.0, 0.0], &[0.0, 0.0]).is_nan());
    }

    #[test]
    fn test_ranking_is_descending_permutation() {
        let query = [1.0, 0.0];
        let candidates: Vec<(&str, Vec<f32>)> = vec![
            ("east-ish", vec![0.9, 0.1]),
            ("north", vec![0.0, 1.0]),
            ("east", vec![1.0, 0.0]),
            ("west", vec![-1.0, 0.0]),
        ];

        let ranked = rank_by_similarity(&query, candidates.clone());

        let order: Vec<_> = ranked.iter().map(|s| s.item).collect();
        assert_eq!(order, vec!["east", "east-ish", "north", "west"]);
        assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));

        let mut seen = order.clone();
        seen.sort();
        let mut expected: Vec<_> = candidates.iter().map(|(n, _)| *n).collect();
        expected.sort();
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let query = [1.0, 0.0];
        let candidates: Vec<(usize, Vec<f32>)> = vec![
            (0, vec![1.0, 0.0]),
            (1, vec![0.0, 1.0]),
            (2, vec![1.0, 0.0]),
            (3, vec![1.0, 0.0]),
        ];
        let order: Vec<_> = rank_by_similarity(&query, candidates)
            .into_iter()
            .map(|s| s.item)
            .collect();
        assert_eq!(order, vec![0, 2, 3, 1]);
    }

    #[test]
    fn test_nan_scores_rank_last() {
        let query = [1.0, 0.0];
        let candidates: Vec<(&str, Vec<f32>)> = vec![
            ("zero", vec![0.0, 0.0]),
            ("opposite", vec![-1.0, 0.0]),
            ("same", vec![1.0, 0.0]),
        ];
        let ranked = rank_by_similarity(&query, candidates);
        assert_eq!(ranked[0].item, "same");
        assert_eq!(ranked[1].item, "opposite");
        assert_eq!(ranked[2].item, "zero");
        assert!(ranked[2].score.is_nan());
    }

    #[test]
    fn test_empty_candidates() {
        let ranked = rank_by_similarity::<&str, Vec<f32>>(&[1.0], Vec::new());
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_borrowed_vectors() {
        let vectors: Vec<Vec<f32>> = vec![vec![0.0, 1.0], vec![1.0, 0.0]];
        let ranked = rank_by_similarity(&[1.0, 0.0], vectors.iter().enumerate());
        assert_eq!(ranked[0].item, 1);
    }
}
