//! Booking-text classifier: TF-IDF vectors clustered with k-means, each
//! cluster named through the label table, and missing categories back-filled
//! from the cluster name.

use finmath_core::Transaction;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::error::ClassifyError;
use crate::kmeans::{KMeans, KMeansFit};
use crate::labels::LabelTable;
use crate::tfidf::{TfidfMatrix, TfidfVectorizer};

#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierConfig {
    pub n_clusters: usize,
    pub max_features: usize,
    pub seed: u64,
    /// Terms listed per cluster when profiling
    pub top_terms: usize,
    pub samples_per_cluster: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            n_clusters: 11,
            max_features: 100,
            seed: 42,
            top_terms: 5,
            samples_per_cluster: 3,
        }
    }
}

/// Cluster result for one record, addressed by its position in the input
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ClassifiedRow {
    pub index: usize,
    pub cluster: usize,
    pub suggested_category: String,
}

/// What a cluster contains: strongest centroid terms and a few sample texts
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ClusterProfile {
    pub cluster: usize,
    pub label: String,
    /// Highest-weighted centroid terms; zero-weight terms are never listed
    pub top_terms: Vec<String>,
    pub samples: Vec<String>,
    pub size: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub rows: Vec<ClassifiedRow>,
    pub profiles: Vec<ClusterProfile>,
    /// Every record already had a category, so all of them were clustered
    pub used_fallback: bool,
}

/// Input record with the classifier's outputs attached
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CategorizedTransaction {
    pub transaction: Transaction,
    pub cluster: Option<usize>,
    pub suggested_category: Option<String>,
    pub final_category: Option<String>,
}

pub struct TextClassifier {
    config: ClassifierConfig,
    labels: LabelTable,
    vectorizer: TfidfVectorizer,
}

impl TextClassifier {
    /// Fails if the label table does not name exactly `config.n_clusters` clusters.
    pub fn new(config: ClassifierConfig, labels: LabelTable) -> Result<Self, ClassifyError> {
        labels.validate(config.n_clusters)?;
        let vectorizer = TfidfVectorizer::new(config.max_features)?;
        Ok(Self {
            config,
            labels,
            vectorizer,
        })
    }

    pub fn classify(&self, records: &[Transaction]) -> Result<Classification, ClassifyError> {
        let (indices, used_fallback) = select_uncategorized(records);
        if used_fallback {
            info!(records = records.len(), "no uncategorized records; classifying the whole dataset");
        } else {
            info!(records = indices.len(), "classifying uncategorized records");
        }

        if indices.len() < self.config.n_clusters {
            return Err(ClassifyError::InsufficientData {
                samples: indices.len(),
                clusters: self.config.n_clusters,
            });
        }

        let docs: Vec<&str> = indices
            .iter()
            .map(|&i| records[i].booking_text.as_str())
            .collect();
        let matrix = self.vectorizer.fit_transform(&docs)?;
        debug!(terms = matrix.n_features(), "built TF-IDF vocabulary");

        let fit = KMeans::new(self.config.n_clusters)
            .with_seed(self.config.seed)
            .fit(&matrix.rows)?;
        debug!(iterations = fit.iterations, inertia = fit.inertia, "k-means converged");

        let rows = indices
            .iter()
            .zip(&fit.labels)
            .map(|(&index, &cluster)| -> Result<ClassifiedRow, ClassifyError> {
                Ok(ClassifiedRow {
                    index,
                    cluster,
                    suggested_category: self.label_for(cluster)?.to_string(),
                })
            })
            .collect::<Result<Vec<_>, ClassifyError>>()?;

        let profiles = self.profiles(&matrix, &fit, &docs)?;

        Ok(Classification {
            rows,
            profiles,
            used_fallback,
        })
    }

    fn label_for(&self, cluster: usize) -> Result<&str, ClassifyError> {
        self.labels
            .label(cluster)
            .ok_or_else(|| ClassifyError::LabelTable(format!("no label for cluster {cluster}")))
    }

    fn profiles(
        &self,
        matrix: &TfidfMatrix,
        fit: &KMeansFit,
        docs: &[&str],
    ) -> Result<Vec<ClusterProfile>, ClassifyError> {
        let sizes = fit.cluster_sizes();
        fit.centroids
            .iter()
            .enumerate()
            .map(|(cluster, centroid)| -> Result<ClusterProfile, ClassifyError> {
                let mut weighted: Vec<(usize, f64)> = centroid
                    .iter()
                    .copied()
                    .enumerate()
                    .filter(|(_, w)| *w > 0.0)
                    .collect();
                weighted.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
                let top_terms = weighted
                    .into_iter()
                    .take(self.config.top_terms)
                    .map(|(j, _)| matrix.vocabulary[j].clone())
                    .collect();

                let samples = fit
                    .labels
                    .iter()
                    .zip(docs)
                    .filter(|(label, _)| **label == cluster)
                    .take(self.config.samples_per_cluster)
                    .map(|(_, doc)| doc.to_string())
                    .collect();

                Ok(ClusterProfile {
                    cluster,
                    label: self.label_for(cluster)?.to_string(),
                    top_terms,
                    samples,
                    size: sizes[cluster],
                })
            })
            .collect()
    }
}

/// Positions of records still needing a category. When there are none, every
/// position is returned and the flag is set.
pub fn select_uncategorized(records: &[Transaction]) -> (Vec<usize>, bool) {
    let missing: Vec<usize> = records
        .iter()
        .enumerate()
        .filter(|(_, t)| t.needs_category())
        .map(|(i, _)| i)
        .collect();
    if missing.is_empty() {
        ((0..records.len()).collect(), true)
    } else {
        (missing, false)
    }
}

/// Attach cluster results to every record by position. Records without a
/// category take the suggested one; the rest keep their own, `Unknown`
/// included. The output has exactly one entry per input record.
pub fn backfill(records: &[Transaction], classification: &Classification) -> Vec<CategorizedTransaction> {
    let mut by_index: Vec<Option<&ClassifiedRow>> = vec![None; records.len()];
    for row in &classification.rows {
        if let Some(slot) = by_index.get_mut(row.index) {
            *slot = Some(row);
        }
    }

    records
        .iter()
        .zip(by_index)
        .map(|(txn, row)| {
            let suggested = row.map(|r| r.suggested_category.clone());
            let final_category = if txn.category_label().is_none() {
                suggested.clone().or_else(|| txn.category.clone())
            } else {
                txn.category.clone()
            };
            CategorizedTransaction {
                transaction: txn.clone(),
                cluster: row.map(|r| r.cluster),
                suggested_category: suggested,
                final_category,
            }
        })
        .collect()
}

/// Record count per final category, records without one left out.
pub fn final_category_counts(rows: &[CategorizedTransaction]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for row in rows {
        if let Some(category) = row.final_category.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            *counts.entry(category.to_string()).or_insert(0) += 1;
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const TEXTS: [&str; 14] = [
        "REWE Markt Berlin // End-To-End 1",
        "EDEKA Center Muenchen",
        "Miete Wohnung Januar",
        "Amazon EU Marketplace // End-To-End 9",
        "Sparplan ETF Depot",
        "Restaurant Pizzeria Roma",
        "Shell Tankstelle Autobahn",
        "Allianz Versicherung Kfz",
        "Handwerker Reparatur Heizung",
        "Netflix Streaming Abo",
        "Wechselkurs Gebuehr USD",
        "REWE Markt Berlin // End-To-End 1",
        "Kredit Rate Sparkasse",
        "Kino Ticket Cinemaxx",
    ];

    fn records(category: impl Fn(usize) -> Option<&'static str>) -> Vec<Transaction> {
        TEXTS
            .iter()
            .enumerate()
            .map(|(i, text)| {
                Transaction::new(
                    NaiveDate::from_ymd_opt(2025, 1, 1 + i as u32).unwrap(),
                    *text,
                    -10.0 * (i as f64 + 1.0),
                    "Card payment",
                    category(i).map(str::to_string),
                )
            })
            .collect()
    }

    fn classifier() -> TextClassifier {
        TextClassifier::new(ClassifierConfig::default(), LabelTable::embedded().unwrap()).unwrap()
    }

    #[test]
    fn test_select_uncategorized() {
        let rs = records(|i| match i {
            0 => None,
            1 => Some("Unknown"),
            2 => Some("  "),
            _ => Some("Groceries"),
        });
        assert_eq!(select_uncategorized(&rs), (vec![0, 1, 2], false));

        let all = records(|_| Some("Groceries"));
        let (indices, fallback) = select_uncategorized(&all);
        assert!(fallback);
        assert_eq!(indices.len(), TEXTS.len());
    }

    #[test]
    fn test_classify_uncategorized() {
        let rs = records(|i| if i < 12 { None } else { Some("Banking & Loans") });
        let result = classifier().classify(&rs).unwrap();

        assert!(!result.used_fallback);
        assert_eq!(result.rows.len(), 12);
        let table = LabelTable::embedded().unwrap();
        for row in &result.rows {
            assert!(row.index < 12);
            assert!(row.cluster < 11);
            assert_eq!(Some(row.suggested_category.as_str()), table.label(row.cluster));
        }
        // Identical texts share a cluster.
        assert_eq!(result.rows[0].cluster, result.rows[11].cluster);
    }

    #[test]
    fn test_profiles() {
        let rs = records(|_| None);
        let result = classifier().classify(&rs).unwrap();
        assert_eq!(result.profiles.len(), 11);
        let total: usize = result.profiles.iter().map(|p| p.size).sum();
        assert_eq!(total, TEXTS.len());
        for p in &result.profiles {
            assert!(p.top_terms.len() <= 5);
            assert!(p.samples.len() <= 3);
            assert!(p.samples.len() <= p.size);
        }
    }

    #[test]
    fn test_top_terms_come_from_cluster_members() {
        let rs = records(|_| None);
        let result = classifier().classify(&rs).unwrap();
        for p in &result.profiles {
            let members: Vec<String> = result
                .rows
                .iter()
                .filter(|r| r.cluster == p.cluster)
                .map(|r| TEXTS[r.index].to_lowercase())
                .collect();
            for term in &p.top_terms {
                assert!(
                    members.iter().any(|m| m.contains(term.as_str())),
                    "{term} not in cluster {}",
                    p.cluster
                );
            }
        }
        // Single short texts have fewer than five terms with any weight.
        assert!(result.profiles.iter().any(|p| p.top_terms.len() < 5));
    }

    #[test]
    fn test_classify_is_deterministic() {
        let rs = records(|_| None);
        let a = classifier().classify(&rs).unwrap();
        let b = classifier().classify(&rs).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_fallback_classifies_everything() {
        let rs = records(|_| Some("Misc"));
        let result = classifier().classify(&rs).unwrap();
        assert!(result.used_fallback);
        assert_eq!(result.rows.len(), TEXTS.len());

        let categorized = backfill(&rs, &result);
        assert!(categorized
            .iter()
            .all(|c| c.final_category.as_deref() == Some("Misc")));
    }

    #[test]
    fn test_insufficient_data() {
        let rs = records(|i| if i < 3 { None } else { Some("Misc") });
        let err = classifier().classify(&rs).unwrap_err();
        assert!(matches!(
            err,
            ClassifyError::InsufficientData { samples: 3, clusters: 11 }
        ));
    }

    #[test]
    fn test_label_table_must_match_cluster_count() {
        let config = ClassifierConfig {
            n_clusters: 5,
            ..ClassifierConfig::default()
        };
        let err = TextClassifier::new(config, LabelTable::embedded().unwrap())
            .err()
            .unwrap();
        assert!(matches!(err, ClassifyError::LabelTable(_)));
    }

    #[test]
    fn test_backfill_keeps_row_count_with_duplicate_texts() {
        let rs = records(|i| match i {
            0 => Some("Groceries"),
            11 => None,
            1 => Some("Unknown"),
            _ => None,
        });
        let result = classifier().classify(&rs).unwrap();
        let out = backfill(&rs, &result);

        assert_eq!(out.len(), rs.len());
        // Row 0 is categorized; its duplicate text at row 11 is not.
        assert_eq!(out[0].final_category.as_deref(), Some("Groceries"));
        assert_eq!(out[0].cluster, None);
        assert_eq!(out[11].final_category, out[11].suggested_category);
        assert!(out[11].suggested_category.is_some());
        assert_eq!(out[1].final_category.as_deref(), Some("Unknown"));
        for (c, t) in out.iter().zip(&rs) {
            assert_eq!(&c.transaction, t);
        }
    }

    #[test]
    fn test_unknown_category_is_kept_after_backfill() {
        let rs = records(|i| match i {
            2 | 5 => Some("Unknown"),
            7 => Some("   "),
            _ => None,
        });
        let result = classifier().classify(&rs).unwrap();
        assert!(!result.used_fallback);
        assert_eq!(result.rows.len(), rs.len());

        let out = backfill(&rs, &result);
        for i in [2, 5] {
            assert!(out[i].suggested_category.is_some());
            assert_eq!(out[i].final_category.as_deref(), Some("Unknown"));
        }
        assert_eq!(out[7].final_category, out[7].suggested_category);
        assert_eq!(out[0].final_category, out[0].suggested_category);
        assert!(final_category_counts(&out)["Unknown"] >= 2);
    }

    #[test]
    fn test_final_category_counts() {
        let rs = records(|_| None);
        let result = classifier().classify(&rs).unwrap();
        let counts = final_category_counts(&backfill(&rs, &result));
        assert_eq!(counts.values().sum::<usize>(), TEXTS.len());
    }
}
