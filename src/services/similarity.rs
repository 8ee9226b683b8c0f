use crate::models::UserRatingMap;

/// Pearson correlation of two users' scores over the movies both rated
///
/// Means are taken over the shared movies only. Returns 0.0 when nothing is
/// shared or when either side has zero variance over the shared movies, which
/// includes every single-movie overlap. The result is clamped to [-1, 1].
pub fn similarity(ratings_a: &UserRatingMap, ratings_b: &UserRatingMap) -> f64 {
    // Iterate the smaller map; sort so the float sums do not depend on hash order.
    let (small, large) = if ratings_a.len() <= ratings_b.len() {
        (ratings_a, ratings_b)
    } else {
        (ratings_b, ratings_a)
    };

    let mut shared: Vec<(&String, f64, f64)> = small
        .iter()
        .filter_map(|(movie_id, &score)| {
            large
                .get(movie_id)
                .map(|&other| (movie_id, f64::from(score), f64::from(other)))
        })
        .collect();

    if shared.is_empty() {
        return 0.0;
    }
    shared.sort_by(|a, b| a.0.cmp(b.0));

    // Keep (a, b) orientation fixed regardless of which map was iterated.
    let pairs: Vec<(f64, f64)> = if std::ptr::eq(small, ratings_a) {
        shared.iter().map(|&(_, s, l)| (s, l)).collect()
    } else {
        shared.iter().map(|&(_, s, l)| (l, s)).collect()
    };

    pearson(&pairs)
}

fn pearson(pairs: &[(f64, f64)]) -> f64 {
    let n = pairs.len() as f64;
    let mean_a = pairs.iter().map(|(a, _)| a).sum::<f64>() / n;
    let mean_b = pairs.iter().map(|(_, b)| b).sum::<f64>() / n;

    let (mut covariance, mut var_a, mut var_b) = (0.0, 0.0, 0.0);
    for &(a, b) in pairs {
        let da = a - mean_a;
        let db = b - mean_b;
        covariance += da * db;
        var_a += da * da;
        var_b += db * db;
    }

    if var_a == 0.0 || var_b == 0.0 {
        return 0.0;
    }

    (covariance / (var_a.sqrt() * var_b.sqrt())).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ratings(entries: &[(&str, u8)]) -> UserRatingMap {
        entries
            .iter()
            .map(|&(movie, score)| (movie.to_string(), score))
            .collect()
    }

    #[test]
    fn test_no_shared_movies_is_zero() {
        let a = ratings(&[("238", 5), ("680", 4)]);
        let b = ratings(&[("13", 5), ("550", 1)]);
        assert_eq!(similarity(&a, &b), 0.0);
    }

    #[test]
    fn test_empty_maps_are_zero() {
        let a = ratings(&[]);
        let b = ratings(&[("238", 5)]);
        assert_eq!(similarity(&a, &b), 0.0);
        assert_eq!(similarity(&a, &a), 0.0);
    }

    #[test]
    fn test_zero_variance_is_zero() {
        // b gave every shared movie the same score
        let a = ratings(&[("238", 5), ("680", 2), ("13", 1)]);
        let b = ratings(&[("238", 4), ("680", 4), ("13", 4)]);
        assert_eq!(similarity(&a, &b), 0.0);
        assert_eq!(similarity(&b, &a), 0.0);
    }

    #[test]
    fn test_single_shared_movie_is_defined() {
        let a = ratings(&[("238", 5), ("680", 1)]);
        let b = ratings(&[("238", 1), ("13", 5)]);
        let score = similarity(&a, &b);
        assert!(!score.is_nan());
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_fixed_pair_value() {
        // Both prefer 238 over 680, so the deviations line up exactly.
        let a = ratings(&[("238", 5), ("680", 4)]);
        let b = ratings(&[("238", 5), ("680", 2)]);
        let score = similarity(&a, &b);
        assert!((score - 1.0).abs() < 1e-12, "got {}", score);
    }

    #[test]
    fn test_inverted_preferences_are_negative() {
        let a = ratings(&[("238", 5), ("680", 4), ("13", 1)]);
        let b = ratings(&[("238", 1), ("680", 2), ("13", 5)]);
        let score = similarity(&a, &b);
        assert!(score < -0.9, "got {}", score);
        assert!(score >= -1.0);
    }

    #[test]
    fn test_partial_correlation() {
        let a = ratings(&[("1", 5), ("2", 4), ("3", 2), ("4", 1)]);
        let b = ratings(&[("1", 4), ("2", 5), ("3", 1), ("4", 2), ("5", 3)]);
        // mean a = 3, mean b = 3; cov = 2*1 + 1*2 + (-1)(-2) + (-2)(-1) = 8; var = 10, 10
        let score = similarity(&a, &b);
        assert!((score - 0.8).abs() < 1e-12, "got {}", score);
    }

    #[test]
    fn test_symmetry() {
        let fixtures = [
            (
                ratings(&[("238", 5), ("680", 4)]),
                ratings(&[("238", 5), ("680", 2)]),
            ),
            (
                ratings(&[("1", 5), ("2", 3), ("3", 1), ("9", 4)]),
                ratings(&[("1", 2), ("2", 3), ("3", 4)]),
            ),
            (
                ratings(&[("1", 1), ("2", 2), ("3", 3), ("4", 5), ("5", 4)]),
                ratings(&[("5", 5), ("4", 1), ("3", 3), ("2", 2), ("1", 4), ("6", 1)]),
            ),
            (ratings(&[("1", 5)]), ratings(&[("2", 5)])),
        ];

        for (a, b) in &fixtures {
            assert_eq!(similarity(a, b), similarity(b, a));
        }
    }

    #[test]
    fn test_result_within_bounds() {
        let a = ratings(&[("1", 1), ("2", 5), ("3", 3), ("4", 4), ("5", 2)]);
        let b = ratings(&[("1", 2), ("2", 5), ("3", 3), ("4", 4), ("5", 1)]);
        let score = similarity(&a, &b);
        assert!((-1.0..=1.0).contains(&score));
        assert!(score > 0.0);
    }
}
