//! Seeded k-means clustering over dense feature rows.
//!
//! Centroids start from k-means++ seeding driven by a seeded RNG, so a fit is
//! reproducible for a given seed and input. Lloyd iterations run until the
//! assignment stops changing, the centroid shift falls under the tolerance,
//! or the iteration cap is reached.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::error::ClassifyError;

pub const DEFAULT_SEED: u64 = 42;
const MAX_ITER: usize = 300;
const TOL: f64 = 1e-4;

#[derive(Debug, Clone, PartialEq)]
pub struct KMeans {
    n_clusters: usize,
    seed: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KMeansFit {
    pub centroids: Vec<Vec<f64>>,
    /// Cluster index per input row
    pub labels: Vec<usize>,
    /// Sum of squared distances of rows to their centroid
    pub inertia: f64,
    pub iterations: usize,
}

impl KMeansFit {
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.centroids.len()];
        for &label in &self.labels {
            sizes[label] += 1;
        }
        sizes
    }
}

impl KMeans {
    pub fn new(n_clusters: usize) -> Self {
        Self {
            n_clusters,
            seed: DEFAULT_SEED,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn fit(&self, data: &[Vec<f64>]) -> Result<KMeansFit, ClassifyError> {
        if self.n_clusters == 0 {
            return Err(ClassifyError::NoClusters);
        }
        if data.len() < self.n_clusters {
            return Err(ClassifyError::InsufficientData {
                samples: data.len(),
                clusters: self.n_clusters,
            });
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut centroids = self.seed_centroids(data, &mut rng);
        let tol = TOL * mean_variance(data);

        let mut labels: Vec<usize> = Vec::new();
        let mut iterations = 0;
        for iter in 1..=MAX_ITER {
            iterations = iter;
            let assigned: Vec<(usize, f64)> = data.iter().map(|p| nearest(p, &centroids)).collect();
            let new_labels: Vec<usize> = assigned.iter().map(|(l, _)| *l).collect();
            let updated = recompute_centroids(data, &assigned, &centroids);

            let shift: f64 = centroids
                .iter()
                .zip(&updated)
                .map(|(old, new)| sq_dist(old, new))
                .sum();
            centroids = updated;

            if new_labels == labels {
                debug!(iter, "k-means assignment stable");
                break;
            }
            labels = new_labels;
            if shift <= tol {
                debug!(iter, shift, "k-means centroid shift under tolerance");
                break;
            }
        }

        // Final assignment against the last centroids.
        let mut inertia = 0.0;
        let labels = data
            .iter()
            .map(|p| {
                let (label, dist) = nearest(p, &centroids);
                inertia += dist;
                label
            })
            .collect();

        Ok(KMeansFit {
            centroids,
            labels,
            inertia,
            iterations,
        })
    }

    /// k-means++: each new centroid is drawn with probability proportional to
    /// its squared distance from the closest centroid chosen so far.
    fn seed_centroids(&self, data: &[Vec<f64>], rng: &mut StdRng) -> Vec<Vec<f64>> {
        let n = data.len();
        let mut centroids = Vec::with_capacity(self.n_clusters);
        centroids.push(data[rng.gen_range(0..n)].clone());

        let mut closest: Vec<f64> = data.iter().map(|p| sq_dist(p, &centroids[0])).collect();
        while centroids.len() < self.n_clusters {
            let total: f64 = closest.iter().sum();
            let idx = if total > 0.0 {
                let mut target = rng.gen_range(0.0..total);
                let mut chosen = None;
                for (i, d) in closest.iter().enumerate() {
                    if target < *d {
                        chosen = Some(i);
                        break;
                    }
                    target -= d;
                }
                chosen
                    .or_else(|| closest.iter().rposition(|d| *d > 0.0))
                    .unwrap_or(n - 1)
            } else {
                rng.gen_range(0..n)
            };

            let centroid = data[idx].clone();
            for (d, p) in closest.iter_mut().zip(data) {
                *d = d.min(sq_dist(p, &centroid));
            }
            centroids.push(centroid);
        }
        centroids
    }
}

fn sq_dist(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

fn nearest(point: &[f64], centroids: &[Vec<f64>]) -> (usize, f64) {
    let mut best = (0, f64::INFINITY);
    for (i, c) in centroids.iter().enumerate() {
        let d = sq_dist(point, c);
        if d < best.1 {
            best = (i, d);
        }
    }
    best
}

/// Mean of each cluster's members. An empty cluster takes over the point
/// that lies farthest from its current centroid.
fn recompute_centroids(
    data: &[Vec<f64>],
    assigned: &[(usize, f64)],
    previous: &[Vec<f64>],
) -> Vec<Vec<f64>> {
    let k = previous.len();
    let dims = previous.first().map_or(0, Vec::len);
    let mut sums = vec![vec![0.0; dims]; k];
    let mut counts = vec![0usize; k];
    for (point, (label, _)) in data.iter().zip(assigned) {
        counts[*label] += 1;
        for (s, v) in sums[*label].iter_mut().zip(point) {
            *s += v;
        }
    }

    let mut distances: Vec<f64> = assigned.iter().map(|(_, d)| *d).collect();
    for cluster in 0..k {
        if counts[cluster] == 0 {
            let far = distances
                .iter()
                .enumerate()
                .max_by(|a, b| a.1.total_cmp(b.1).then(b.0.cmp(&a.0)))
                .map_or(0, |(i, _)| i);
            debug!(cluster, point = far, "relocating empty cluster");
            distances[far] = 0.0;
            sums[cluster] = data[far].clone();
            counts[cluster] = 1;
        }
    }

    sums.into_iter()
        .zip(counts)
        .map(|(sum, count)| sum.into_iter().map(|s| s / count as f64).collect())
        .collect()
}

/// Mean over features of the per-feature population variance
fn mean_variance(data: &[Vec<f64>]) -> f64 {
    let n = data.len() as f64;
    let dims = data.first().map_or(0, Vec::len);
    if dims == 0 {
        return 0.0;
    }
    let total: f64 = (0..dims)
        .map(|j| {
            let mean = data.iter().map(|r| r[j]).sum::<f64>() / n;
            data.iter().map(|r| (r[j] - mean).powi(2)).sum::<f64>() / n
        })
        .sum();
    total / dims as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blobs() -> Vec<Vec<f64>> {
        vec![
            vec![0.0, 0.1],
            vec![0.1, 0.0],
            vec![0.05, 0.05],
            vec![10.0, 10.1],
            vec![10.1, 10.0],
            vec![9.95, 10.05],
        ]
    }

    #[test]
    fn test_separates_two_blobs() {
        let fit = KMeans::new(2).fit(&blobs()).unwrap();
        assert_eq!(fit.labels[0], fit.labels[1]);
        assert_eq!(fit.labels[1], fit.labels[2]);
        assert_eq!(fit.labels[3], fit.labels[4]);
        assert_eq!(fit.labels[4], fit.labels[5]);
        assert_ne!(fit.labels[0], fit.labels[3]);
        assert_eq!(fit.cluster_sizes(), vec![3, 3]);
        assert!(fit.inertia < 0.1);
    }

    #[test]
    fn test_same_seed_same_fit() {
        let data: Vec<Vec<f64>> = (0..40)
            .map(|i| vec![(i % 7) as f64, (i % 5) as f64 * 0.5, (i % 3) as f64])
            .collect();
        let a = KMeans::new(4).with_seed(7).fit(&data).unwrap();
        let b = KMeans::new(4).with_seed(7).fit(&data).unwrap();
        assert_eq!(a, b);
        assert!(a.labels.iter().all(|l| *l < 4));
    }

    #[test]
    fn test_insufficient_data() {
        let err = KMeans::new(11).fit(&blobs()).unwrap_err();
        assert!(matches!(
            err,
            ClassifyError::InsufficientData { samples: 6, clusters: 11 }
        ));
        assert!(matches!(
            KMeans::new(0).fit(&blobs()).unwrap_err(),
            ClassifyError::NoClusters
        ));
    }

    #[test]
    fn test_one_cluster_per_point() {
        let data = blobs();
        let fit = KMeans::new(data.len()).fit(&data).unwrap();
        assert!(fit.inertia.abs() < 1e-12);
        let mut labels = fit.labels.clone();
        labels.sort();
        labels.dedup();
        assert_eq!(labels.len(), data.len());
    }

    #[test]
    fn test_identical_points_do_not_panic() {
        let data = vec![vec![1.0, 1.0]; 5];
        let fit = KMeans::new(3).fit(&data).unwrap();
        assert_eq!(fit.labels.len(), 5);
        assert_eq!(fit.inertia, 0.0);
    }
}
