//! Keyphrase extraction over 1- and 2-grams.
//!
//! Text is lowercased and cut into clauses at punctuation. Inside a clause,
//! stop words and bare numbers break the run of content words; every unigram
//! and adjacent bigram of a run is a candidate. Candidates are ranked by the
//! RAKE score (sum of `degree / frequency` of their words), ties going to the
//! phrase seen first.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;

use super::{AnalysisError, KeywordExtractor};

/// Longest input accepted, in chars.
pub const MAX_INPUT_CHARS: usize = 20_000;

static CLAUSE_SPLIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[.,;:!?()\[\]{}"“”|/]+|\s[-–—]+\s"#).expect("clause regex"));

// Same shape as the usual bag-of-words token pattern: two or more word chars.
static TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?u)\b\w\w+\b").expect("token regex"));

static STOP_WORDS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| ENGLISH_STOP_WORDS.iter().copied().collect());

const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "about", "above", "across", "after", "afterwards", "again", "against", "all", "almost",
    "alone", "along", "already", "also", "although", "always", "am", "among", "amongst", "an",
    "and", "another", "any", "anyhow", "anyone", "anything", "anyway", "anywhere", "are",
    "around", "as", "at", "back", "be", "became", "because", "become", "becomes", "becoming",
    "been", "before", "beforehand", "behind", "being", "below", "beside", "besides", "between",
    "beyond", "both", "but", "by", "can", "cannot", "could", "did", "do", "does", "doing", "done",
    "down", "due", "during", "each", "eg", "either", "else", "elsewhere", "enough", "etc", "even",
    "ever", "every", "everyone", "everything", "everywhere", "except", "few", "for", "former",
    "formerly", "from", "further", "had", "has", "have", "having", "he", "hence", "her", "here",
    "hereafter", "hereby", "herein", "hers", "herself", "him", "himself", "his", "how",
    "however", "ie", "if", "in", "indeed", "into", "is", "it", "its", "itself", "just", "last",
    "latter", "least", "less", "many", "may", "me", "meanwhile", "might", "more", "moreover",
    "most", "mostly", "much", "must", "my", "myself", "namely", "neither", "never",
    "nevertheless", "next", "no", "nobody", "none", "nor", "not", "nothing", "now", "nowhere",
    "of", "off", "often", "on", "once", "one", "only", "onto", "or", "other", "others",
    "otherwise", "our", "ours", "ourselves", "out", "over", "own", "per", "perhaps", "please",
    "rather", "re", "same", "says", "said", "see", "seem", "seemed", "seeming", "seems", "several",
    "she", "should", "since", "so", "some", "somehow", "someone", "something", "sometime",
    "sometimes", "somewhere", "still", "such", "than", "that", "the", "their", "theirs", "them",
    "themselves", "then", "thence", "there", "thereafter", "thereby", "therefore", "therein",
    "these", "they", "this", "those", "though", "through", "throughout", "thru", "thus", "to",
    "together", "too", "toward", "towards", "under", "until", "up", "upon", "us", "very", "via",
    "was", "we", "well", "were", "what", "whatever", "when", "whence", "whenever", "where",
    "whereafter", "whereas", "whereby", "wherein", "whereupon", "wherever", "whether", "which",
    "while", "who", "whoever", "whole", "whom", "whose", "why", "will", "with", "within",
    "without", "would", "yet", "you", "your", "yours", "yourself", "yourselves",
];

fn is_stop_word(tok: &str) -> bool {
    STOP_WORDS.contains(tok)
}

fn is_numeric(tok: &str) -> bool {
    tok.chars().all(|c| c.is_numeric() || c == '_')
}

/// Default keyphrase extractor.
#[derive(Debug, Clone, Default)]
pub struct RakeExtractor;

impl RakeExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl KeywordExtractor for RakeExtractor {
    fn extract(&self, text: &str, top_n: usize) -> Result<Vec<String>, AnalysisError> {
        let len = text.chars().count();
        if len > MAX_INPUT_CHARS {
            return Err(AnalysisError::InputTooLong {
                len,
                max: MAX_INPUT_CHARS,
            });
        }
        if top_n == 0 {
            return Ok(Vec::new());
        }

        let runs = content_runs(text);
        Ok(rank_phrases(&runs).into_iter().take(top_n).collect())
    }
}

/// Maximal runs of content words, in reading order.
fn content_runs(text: &str) -> Vec<Vec<String>> {
    let lower = text.to_lowercase();
    let mut runs = Vec::new();

    for clause in CLAUSE_SPLIT.split(&lower) {
        let mut run: Vec<String> = Vec::new();
        for m in TOKEN.find_iter(clause) {
            let tok = m.as_str();
            if is_stop_word(tok) || is_numeric(tok) {
                if !run.is_empty() {
                    runs.push(std::mem::take(&mut run));
                }
                continue;
            }
            run.push(tok.to_string());
        }
        if !run.is_empty() {
            runs.push(run);
        }
    }

    runs
}

fn rank_phrases(runs: &[Vec<String>]) -> Vec<String> {
    let mut freq: HashMap<&str, f64> = HashMap::new();
    let mut degree: HashMap<&str, f64> = HashMap::new();
    for run in runs {
        for w in run {
            *freq.entry(w.as_str()).or_default() += 1.0;
            *degree.entry(w.as_str()).or_default() += run.len() as f64;
        }
    }
    let word_score = |w: &str| -> f64 {
        let f = freq.get(w).copied().unwrap_or(1.0);
        degree.get(w).copied().unwrap_or(0.0) / f
    };

    // phrase -> (score, first position)
    let mut candidates: HashMap<String, (f64, usize)> = HashMap::new();
    let mut pos = 0usize;
    for run in runs {
        for i in 0..run.len() {
            let uni = run[i].clone();
            let uni_score = word_score(&run[i]);
            candidates.entry(uni).or_insert((uni_score, pos));
            pos += 1;

            if let Some(next) = run.get(i + 1) {
                let bi = format!("{} {}", run[i], next);
                let bi_score = uni_score + word_score(next);
                candidates.entry(bi).or_insert((bi_score, pos));
                pos += 1;
            }
        }
    }

    let mut ranked: Vec<(String, f64, usize)> = candidates
        .into_iter()
        .map(|(phrase, (score, first))| (phrase, score, first))
        .collect();
    ranked.sort_by(|a, b| match b.1.total_cmp(&a.1) {
        Ordering::Equal => a.2.cmp(&b.2),
        other => other,
    });
    ranked.into_iter().map(|(phrase, _, _)| phrase).collect()
}
