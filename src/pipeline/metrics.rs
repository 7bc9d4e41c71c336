//! Classification scoring metrics

/// Area under the ROC curve for binary labels (0/1).
///
/// Returns 0.5 when either class is absent.
pub fn roc_auc(scores: &[f64], labels: &[f64]) -> f64 {
    let weights = vec![1.0; scores.len()];
    weighted_roc_auc(scores, labels, &weights)
}

/// Weighted ROC AUC using the weighted Mann-Whitney U statistic.
///
/// Tied scores share the weighted midpoint rank. Rows with non-positive
/// weight or a NaN score are ignored.
pub fn weighted_roc_auc(scores: &[f64], labels: &[f64], weights: &[f64]) -> f64 {
    let mut rows: Vec<(f64, bool, f64)> = scores
        .iter()
        .zip(labels.iter())
        .zip(weights.iter())
        .filter(|((s, _), w)| !s.is_nan() && **w > 0.0)
        .map(|((&s, &y), &w)| (s, y > 0.5, w))
        .collect();

    if rows.is_empty() {
        return 0.5;
    }

    rows.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

    let total_pos: f64 = rows.iter().filter(|(_, pos, _)| *pos).map(|(_, _, w)| w).sum();
    let total_neg: f64 = rows.iter().filter(|(_, pos, _)| !*pos).map(|(_, _, w)| w).sum();

    if total_pos <= 0.0 || total_neg <= 0.0 {
        return 0.5;
    }

    let n = rows.len();
    let mut weighted_rank_sum_pos = 0.0;
    let mut cumulative_weight = 0.0;
    let mut i = 0;

    while i < n {
        let current = rows[i].0;
        let mut j = i;
        while j < n && rows[j].0 == current {
            j += 1;
        }

        let group_weight: f64 = rows[i..j].iter().map(|(_, _, w)| w).sum();
        let avg_rank = cumulative_weight + group_weight / 2.0;

        weighted_rank_sum_pos += rows[i..j]
            .iter()
            .filter(|(_, pos, _)| *pos)
            .map(|(_, _, w)| avg_rank * w)
            .sum::<f64>();

        cumulative_weight += group_weight;
        i = j;
    }

    let u = weighted_rank_sum_pos - total_pos * total_pos / 2.0;
    (u / (total_pos * total_neg)).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_separation() {
        let auc = roc_auc(&[0.1, 0.2, 0.8, 0.9], &[0.0, 0.0, 1.0, 1.0]);
        assert!((auc - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_inverted_separation() {
        let auc = roc_auc(&[0.9, 0.8, 0.2, 0.1], &[0.0, 0.0, 1.0, 1.0]);
        assert!(auc.abs() < 1e-12);
    }

    #[test]
    fn test_all_ties_is_half() {
        let auc = roc_auc(&[0.5; 6], &[0.0, 1.0, 0.0, 1.0, 0.0, 1.0]);
        assert!((auc - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_partial_overlap() {
        // pairs (pos, neg): (0.4 vs 0.1 ok), (0.4 vs 0.6 miss), (0.9 vs both ok) => 3/4
        let auc = roc_auc(&[0.1, 0.4, 0.6, 0.9], &[0.0, 1.0, 0.0, 1.0]);
        assert!((auc - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_single_class_defaults_to_half() {
        assert_eq!(roc_auc(&[0.1, 0.9], &[1.0, 1.0]), 0.5);
        assert_eq!(roc_auc(&[], &[]), 0.5);
    }

    #[test]
    fn test_weights_shift_auc() {
        let scores = [0.1, 0.4, 0.6, 0.9];
        let labels = [0.0, 1.0, 0.0, 1.0];
        // Dropping the misordered negative via zero weight gives a perfect ranking
        let auc = weighted_roc_auc(&scores, &labels, &[1.0, 1.0, 0.0, 1.0]);
        assert!((auc - 1.0).abs() < 1e-12);
    }
}
