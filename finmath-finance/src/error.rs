use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClassifyError {
    #[error("insufficient data: {samples} descriptions for {clusters} clusters")]
    InsufficientData { samples: usize, clusters: usize },

    #[error("number of clusters must be at least 1")]
    NoClusters,

    #[error("empty vocabulary: descriptions contain only stop words or no terms")]
    EmptyVocabulary,

    #[error("invalid token pattern: {0}")]
    TokenPattern(#[from] regex::Error),

    #[error("invalid label table: {0}")]
    LabelTable(String),

    #[error("parsing label table: {0}")]
    LabelParse(#[from] toml::de::Error),

    #[error("reading label table {}: {source}", .path.display())]
    LabelRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
