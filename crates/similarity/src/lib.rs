//! Textual and phonetic similarity estimation for mark names.
//!
//! Produces a 0-100 closeness score between a proposed mark and a candidate
//! mark. The computation is a capability-gated strategy: `FullSimilarity`
//! (edit distance + Soundex/Metaphone + containment, requires the `phonetics`
//! feature) with `BasicSimilarity` (positional character ratio + containment)
//! as the reduced fallback. `default_strategy()` picks the strongest
//! implementation compiled in.

/// Normalize a mark for comparison: trimmed, uppercased.
pub fn normalize_mark(text: &str) -> String {
    text.trim().to_uppercase()
}

/// Levenshtein edit distance over Unicode scalar values.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    // Two-row DP
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Edit-distance similarity scaled to 0-100. Both strings empty yields 0.
#[cfg(feature = "phonetics")]
fn edit_similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 0.0;
    }
    let distance = edit_distance(a, b);
    (1.0 - distance as f64 / max_len as f64) * 100.0
}

/// Positional character-match ratio scaled to 0-100.
///
/// Counts equal characters across the zipped prefix, divided by the longer
/// length. Cheaper stand-in for edit distance in the reduced strategy.
fn positional_similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 0.0;
    }
    let matching = a.chars().zip(b.chars()).filter(|(x, y)| x == y).count();
    matching as f64 / max_len as f64 * 100.0
}

/// Containment score: 70 if either normalized mark contains the other.
fn containment_score(a: &str, b: &str) -> f64 {
    if a.contains(b) || b.contains(a) {
        70.0
    } else {
        0.0
    }
}

#[cfg(feature = "phonetics")]
mod phonetics {
    use rphonetic::{Encoder, Metaphone, Soundex};

    /// Phonetic encodings for a normalized mark.
    #[derive(Debug, Clone, Default)]
    pub struct PhoneticCodes {
        pub soundex: Option<String>,
        pub metaphone: Option<String>,
    }

    pub fn encode(text: &str) -> PhoneticCodes {
        let soundex = Soundex::default().encode(text);
        let metaphone = Metaphone::default().encode(text);

        // Empty codes (no encodable letters) never participate in matching
        PhoneticCodes {
            soundex: (!soundex.is_empty()).then_some(soundex),
            metaphone: (!metaphone.is_empty()).then_some(metaphone),
        }
    }

    /// Score a single phonetic axis: 80 when both codes exist and match.
    pub fn axis_score(a: &Option<String>, b: &Option<String>) -> f64 {
        match (a, b) {
            (Some(x), Some(y)) if x == y => 80.0,
            _ => 0.0,
        }
    }
}

/// A similarity computation selected at startup.
///
/// Implementations must be symmetric in their two arguments and return a
/// score in [0, 100].
pub trait SimilarityStrategy: Send + Sync {
    /// Strategy name for logging.
    fn name(&self) -> &'static str;

    /// Compute the 0-100 closeness score between two mark names.
    fn score(&self, query: &str, mark_text: &str) -> f64;
}

/// Primary strategy: edit distance, Soundex, Metaphone, containment.
///
/// A strong match on any single axis dominates (maximum, not average).
#[cfg(feature = "phonetics")]
#[derive(Debug, Clone, Copy, Default)]
pub struct FullSimilarity;

#[cfg(feature = "phonetics")]
impl SimilarityStrategy for FullSimilarity {
    fn name(&self) -> &'static str {
        "full"
    }

    fn score(&self, query: &str, mark_text: &str) -> f64 {
        let query = normalize_mark(query);
        let mark = normalize_mark(mark_text);

        if query == mark {
            return 100.0;
        }

        let mut best = edit_similarity(&query, &mark);

        let query_codes = phonetics::encode(&query);
        let mark_codes = phonetics::encode(&mark);
        best = best.max(phonetics::axis_score(&query_codes.soundex, &mark_codes.soundex));
        best = best.max(phonetics::axis_score(&query_codes.metaphone, &mark_codes.metaphone));

        best = best.max(containment_score(&query, &mark));

        best.clamp(0.0, 100.0)
    }
}

/// Reduced fallback strategy: positional character ratio and containment.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicSimilarity;

impl SimilarityStrategy for BasicSimilarity {
    fn name(&self) -> &'static str {
        "basic"
    }

    fn score(&self, query: &str, mark_text: &str) -> f64 {
        let query = normalize_mark(query);
        let mark = normalize_mark(mark_text);

        if query == mark {
            return 100.0;
        }

        let best = positional_similarity(&query, &mark).max(containment_score(&query, &mark));

        best.clamp(0.0, 100.0)
    }
}

/// Select the strongest strategy available in this build.
pub fn default_strategy() -> Box<dyn SimilarityStrategy> {
    #[cfg(feature = "phonetics")]
    return Box::new(FullSimilarity);

    #[cfg(not(feature = "phonetics"))]
    Box::new(BasicSimilarity)
}
