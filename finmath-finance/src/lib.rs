//! finmath-finance: aggregation, statistics, and text classification of bank transactions

pub mod aggregate;
pub mod classifier;
pub mod error;
pub mod export;
pub mod kmeans;
pub mod labels;
pub mod stats;
pub mod tfidf;

pub use aggregate::{category_sums, category_summary, cluster_sums, group_by, top_vendors, total, GroupKey};
pub use classifier::{
    backfill, final_category_counts, select_uncategorized, CategorizedTransaction, Classification,
    ClassifiedRow, ClassifierConfig, ClusterProfile, TextClassifier,
};
pub use error::ClassifyError;
pub use export::{write_categorized, write_categorized_to};
pub use kmeans::{KMeans, KMeansFit};
pub use labels::{ClusterLabel, LabelTable};
pub use stats::{column_info, describe, ColumnInfo, Describe};
pub use tfidf::{TfidfMatrix, TfidfVectorizer, ENGLISH_STOP_WORDS};
