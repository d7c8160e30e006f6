use crate::services::features::FeatureMatrix;

/// Saturating kernel `tanh(gamma * <x, y> + coef0)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SigmoidKernel {
    /// Scale applied to the inner product, `1 / n_features` when `None`
    pub gamma: Option<f64>,
    /// Offset added before squashing
    pub coef0: f64,
}

impl Default for SigmoidKernel {
    fn default() -> Self {
        Self {
            gamma: None,
            coef0: 1.0,
        }
    }
}

impl SigmoidKernel {
    /// Effective gamma for a vocabulary of `n_features` terms
    pub fn gamma_for(&self, n_features: usize) -> f64 {
        match self.gamma {
            Some(gamma) => gamma,
            None if n_features > 0 => 1.0 / n_features as f64,
            None => 1.0,
        }
    }

    pub fn apply(&self, gamma: f64, inner_product: f64) -> f64 {
        (gamma * inner_product + self.coef0).tanh()
    }
}

/// Dense, row-major N x N similarity scores
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimilarityMatrix {
    n: usize,
    scores: Vec<f64>,
}

impl SimilarityMatrix {
    /// Number of movies (rows and columns)
    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Similarity of movie `i` to movie `j`
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        if i < self.n && j < self.n {
            self.scores.get(i * self.n + j).copied()
        } else {
            None
        }
    }

    /// Similarity of movie `i` to every movie, in catalogue order
    pub fn row(&self, i: usize) -> Option<&[f64]> {
        if i < self.n {
            Some(&self.scores[i * self.n..(i + 1) * self.n])
        } else {
            None
        }
    }
}

/// Computes the full pairwise similarity matrix of a feature matrix
pub fn compute_similarity(features: &FeatureMatrix, kernel: &SigmoidKernel) -> SimilarityMatrix {
    let n = features.n_rows();
    let gamma = kernel.gamma_for(features.n_features());
    let rows = features.rows();

    let mut scores = Vec::with_capacity(n * n);
    for left in rows {
        for right in rows {
            scores.push(kernel.apply(gamma, left.dot(right)));
        }
    }

    tracing::debug!(n, gamma, coef0 = kernel.coef0, "Computed similarity matrix");

    SimilarityMatrix { n, scores }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::features::{TfidfVectorizer, VectorizerConfig};

    fn features(docs: &[&str]) -> FeatureMatrix {
        TfidfVectorizer::new(VectorizerConfig {
            min_df: 1,
            ..VectorizerConfig::default()
        })
        .unwrap()
        .fit_transform(docs)
    }

    #[test]
    fn test_gamma_defaults_to_inverse_feature_count() {
        let kernel = SigmoidKernel::default();
        assert_eq!(kernel.gamma_for(4), 0.25);
        assert_eq!(kernel.gamma_for(0), 1.0);

        let fixed = SigmoidKernel {
            gamma: Some(2.0),
            coef0: 0.0,
        };
        assert_eq!(fixed.gamma_for(4), 2.0);
    }

    #[test]
    fn test_kernel_values() {
        let kernel = SigmoidKernel {
            gamma: Some(1.0),
            coef0: 1.0,
        };
        let matrix = compute_similarity(&features(&["drama", "comedy"]), &kernel);

        assert_eq!(matrix.len(), 2);
        assert!((matrix.get(0, 0).unwrap() - 2.0f64.tanh()).abs() < 1e-12);
        assert!((matrix.get(0, 1).unwrap() - 1.0f64.tanh()).abs() < 1e-12);
    }

    #[test]
    fn test_self_similarity_is_row_maximum() {
        let matrix = compute_similarity(
            &features(&["crime drama", "crime thriller", "romance comedy"]),
            &SigmoidKernel::default(),
        );

        for i in 0..matrix.len() {
            let row = matrix.row(i).unwrap();
            let max = row.iter().cloned().fold(f64::MIN, f64::max);
            assert_eq!(row[i], max);
        }
    }

    #[test]
    fn test_scores_are_bounded_and_symmetric() {
        let matrix = compute_similarity(
            &features(&["crime drama", "crime thriller", "romance comedy"]),
            &SigmoidKernel::default(),
        );

        for i in 0..3 {
            for j in 0..3 {
                let score = matrix.get(i, j).unwrap();
                assert!(score > 0.0 && score < 1.0);
                assert!((score - matrix.get(j, i).unwrap()).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_out_of_range_lookup() {
        let matrix = compute_similarity(&features(&["drama"]), &SigmoidKernel::default());
        assert!(matrix.get(1, 0).is_none());
        assert!(matrix.row(1).is_none());
    }
}
