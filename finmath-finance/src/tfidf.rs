//! TF-IDF term weighting for booking texts.
//!
//! Texts are lowercased and split into word tokens of two or more characters.
//! English stop words are dropped, and the vocabulary is capped at the most
//! frequent terms across the corpus. Weights use a smoothed inverse document
//! frequency and every row is scaled to unit length.

use regex::Regex;
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::error::ClassifyError;

const TOKEN_PATTERN: &str = r"\b\w\w+\b";

pub const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "about", "above", "across", "after", "afterwards", "again", "against", "all", "almost",
    "alone", "along", "already", "also", "although", "always", "am", "among", "amongst",
    "amoungst", "amount", "an", "and", "another", "any", "anyhow", "anyone", "anything", "anyway",
    "anywhere", "are", "around", "as", "at", "back", "be", "became", "because", "become",
    "becomes", "becoming", "been", "before", "beforehand", "behind", "being", "below", "beside",
    "besides", "between", "beyond", "bill", "both", "bottom", "but", "by", "call", "can",
    "cannot", "cant", "co", "con", "could", "couldnt", "cry", "de", "describe", "detail", "do",
    "done", "down", "due", "during", "each", "eg", "eight", "either", "eleven", "else",
    "elsewhere", "empty", "enough", "etc", "even", "ever", "every", "everyone", "everything",
    "everywhere", "except", "few", "fifteen", "fifty", "fill", "find", "fire", "first", "five",
    "for", "former", "formerly", "forty", "found", "four", "from", "front", "full", "further",
    "get", "give", "go", "had", "has", "hasnt", "have", "he", "hence", "her", "here",
    "hereafter", "hereby", "herein", "hereupon", "hers", "herself", "him", "himself", "his",
    "how", "however", "hundred", "i", "ie", "if", "in", "inc", "indeed", "interest", "into",
    "is", "it", "its", "itself", "keep", "last", "latter", "latterly", "least", "less", "ltd",
    "made", "many", "may", "me", "meanwhile", "might", "mill", "mine", "more", "moreover",
    "most", "mostly", "move", "much", "must", "my", "myself", "name", "namely", "neither",
    "never", "nevertheless", "next", "nine", "no", "nobody", "none", "noone", "nor", "not",
    "nothing", "now", "nowhere", "of", "off", "often", "on", "once", "one", "only", "onto", "or",
    "other", "others", "otherwise", "our", "ours", "ourselves", "out", "over", "own", "part",
    "per", "perhaps", "please", "put", "rather", "re", "same", "see", "seem", "seemed",
    "seeming", "seems", "serious", "several", "she", "should", "show", "side", "since",
    "sincere", "six", "sixty", "so", "some", "somehow", "someone", "something", "sometime",
    "sometimes", "somewhere", "still", "such", "system", "take", "ten", "than", "that", "the",
    "their", "them", "themselves", "then", "thence", "there", "thereafter", "thereby",
    "therefore", "therein", "thereupon", "these", "they", "thick", "thin", "third", "this",
    "those", "though", "three", "through", "throughout", "thru", "thus", "to", "together", "too",
    "top", "toward", "towards", "twelve", "twenty", "two", "un", "under", "until", "up", "upon",
    "us", "very", "via", "was", "we", "well", "were", "what", "whatever", "when", "whence",
    "whenever", "where", "whereafter", "whereas", "whereby", "wherein", "whereupon", "wherever",
    "whether", "which", "while", "whither", "who", "whoever", "whole", "whom", "whose", "why",
    "will", "with", "within", "without", "would", "yet", "you", "your", "yours", "yourself",
    "yourselves",
];

/// Dense document-term matrix with an alphabetically ordered vocabulary
#[derive(Debug, Clone, PartialEq)]
pub struct TfidfMatrix {
    pub vocabulary: Vec<String>,
    /// One row per input document, one column per vocabulary term
    pub rows: Vec<Vec<f64>>,
}

impl TfidfMatrix {
    pub fn n_features(&self) -> usize {
        self.vocabulary.len()
    }
}

#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    max_features: usize,
    token: Regex,
    stop_words: HashSet<&'static str>,
}

impl TfidfVectorizer {
    pub fn new(max_features: usize) -> Result<Self, ClassifyError> {
        let token = Regex::new(TOKEN_PATTERN)?;
        Ok(Self {
            max_features,
            token,
            stop_words: ENGLISH_STOP_WORDS.iter().copied().collect(),
        })
    }

    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        self.token
            .find_iter(&lowered)
            .map(|m| m.as_str())
            .filter(|t| !self.stop_words.contains(*t))
            .map(str::to_string)
            .collect()
    }

    pub fn fit_transform(&self, docs: &[&str]) -> Result<TfidfMatrix, ClassifyError> {
        let counts: Vec<HashMap<String, usize>> = docs
            .iter()
            .map(|doc| {
                let mut tf = HashMap::new();
                for token in self.tokenize(doc) {
                    *tf.entry(token).or_insert(0) += 1;
                }
                tf
            })
            .collect();

        // term -> (corpus frequency, document frequency)
        let mut stats: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
        for tf in &counts {
            for (term, n) in tf {
                let entry = stats.entry(term.as_str()).or_insert((0, 0));
                entry.0 += n;
                entry.1 += 1;
            }
        }
        if stats.is_empty() {
            return Err(ClassifyError::EmptyVocabulary);
        }

        let mut ranked: Vec<(&str, usize, usize)> =
            stats.iter().map(|(t, (freq, df))| (*t, *freq, *df)).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(self.max_features);
        ranked.sort_by(|a, b| a.0.cmp(b.0));

        let n_docs = docs.len() as f64;
        let idf: Vec<f64> = ranked
            .iter()
            .map(|(_, _, df)| ((1.0 + n_docs) / (1.0 + *df as f64)).ln() + 1.0)
            .collect();
        let vocabulary: Vec<String> = ranked.iter().map(|(t, _, _)| t.to_string()).collect();

        let rows = counts
            .iter()
            .map(|tf| {
                let mut row: Vec<f64> = vocabulary
                    .iter()
                    .zip(&idf)
                    .map(|(term, w)| tf.get(term).map_or(0.0, |n| *n as f64 * w))
                    .collect();
                let norm = row.iter().map(|v| v * v).sum::<f64>().sqrt();
                if norm > 0.0 {
                    row.iter_mut().for_each(|v| *v /= norm);
                }
                row
            })
            .collect();

        Ok(TfidfMatrix { vocabulary, rows })
    }
}
