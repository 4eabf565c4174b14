//! Match-quality scoring between a search query and a search hit.
//!
//! The score is a weighted blend of two measures computed on normalized text:
//!
//! * **string similarity** – gestalt pattern matching ratio
//!   (`2 * matching_chars / (len(a) + len(b))`) over the whole strings
//! * **word similarity** – fraction of query words that have a close match
//!   (ratio ≥ 0.6) among the hit's words
//!
//! `quality = 0.6 * string + 0.4 * word`, always in `[0, 1]`.

use std::collections::HashMap;
use std::fmt;

/// Weight of the character-level ratio in the overall quality.
pub const STRING_WEIGHT: f64 = 0.6;
/// Weight of the word-level ratio in the overall quality.
pub const WORD_WEIGHT: f64 = 0.4;
/// Minimum ratio for a hit word to count as a match for a query word.
pub const WORD_MATCH_CUTOFF: f64 = 0.6;

/// Sequences at least this long get the "popular element" junk heuristic.
const AUTOJUNK_MIN_LEN: usize = 200;

// ── Normalization ────────────────────────────────────────────────────────────

/// Lower-case, drop everything that is not alphanumeric or whitespace, trim.
///
/// `"Don't Stop Me Now!"` → `"dont stop me now"`
pub fn normalize(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .trim()
        .to_string()
}

// ── Sequence matching ────────────────────────────────────────────────────────

/// Gestalt pattern matcher over two `char` sequences.
///
/// Repeatedly finds the longest contiguous matching block, then recurses into
/// the pieces left and right of it.  Elements of `b` that occur more than
/// `len(b) / 100 + 1` times are ignored as block seeds once `b` has 200 or
/// more elements; seeded blocks are still extended across them.
pub struct SequenceMatcher<'a> {
    a: &'a [char],
    b: &'a [char],
    b2j: HashMap<char, Vec<usize>>,
}

impl<'a> SequenceMatcher<'a> {
    pub fn new(a: &'a [char], b: &'a [char]) -> Self {
        let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
        for (j, &c) in b.iter().enumerate() {
            b2j.entry(c).or_default().push(j);
        }

        if b.len() >= AUTOJUNK_MIN_LEN {
            let ntest = b.len() / 100 + 1;
            b2j.retain(|_, positions| positions.len() <= ntest);
        }

        SequenceMatcher { a, b, b2j }
    }

    /// Longest matching block in `a[alo..ahi]` / `b[blo..bhi]` as `(i, j, size)`.
    /// Ties go to the block that starts earliest in `a`, then in `b`.
    fn find_longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> (usize, usize, usize) {
        let (mut besti, mut bestj, mut bestsize) = (alo, blo, 0);

        // j2len[j] = length of the match ending at a[i-1], b[j]
        let mut j2len: HashMap<usize, usize> = HashMap::new();
        for i in alo..ahi {
            let mut new_j2len: HashMap<usize, usize> = HashMap::new();
            if let Some(positions) = self.b2j.get(&self.a[i]) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = j
                        .checked_sub(1)
                        .and_then(|prev| j2len.get(&prev))
                        .copied()
                        .unwrap_or(0)
                        + 1;
                    new_j2len.insert(j, k);
                    if k > bestsize {
                        besti = i + 1 - k;
                        bestj = j + 1 - k;
                        bestsize = k;
                    }
                }
            }
            j2len = new_j2len;
        }

        // Grow the block over elements that were dropped from b2j
        while besti > alo && bestj > blo && self.a[besti - 1] == self.b[bestj - 1] {
            besti -= 1;
            bestj -= 1;
            bestsize += 1;
        }
        while besti + bestsize < ahi
            && bestj + bestsize < bhi
            && self.a[besti + bestsize] == self.b[bestj + bestsize]
        {
            bestsize += 1;
        }

        (besti, bestj, bestsize)
    }

    /// Total number of characters covered by matching blocks.
    pub fn matching_chars(&self) -> usize {
        let mut total = 0;
        let mut pending = vec![(0, self.a.len(), 0, self.b.len())];

        while let Some((alo, ahi, blo, bhi)) = pending.pop() {
            let (i, j, k) = self.find_longest_match(alo, ahi, blo, bhi);
            if k == 0 {
                continue;
            }
            total += k;
            if alo < i && blo < j {
                pending.push((alo, i, blo, j));
            }
            if i + k < ahi && j + k < bhi {
                pending.push((i + k, ahi, j + k, bhi));
            }
        }

        total
    }

    /// Similarity in `[0, 1]`; two empty sequences count as identical.
    pub fn ratio(&self) -> f64 {
        let total = self.a.len() + self.b.len();
        if total == 0 {
            return 1.0;
        }
        2.0 * self.matching_chars() as f64 / total as f64
    }

    /// Cheap upper bound on [`ratio`](Self::ratio) from the lengths alone.
    pub fn real_quick_ratio(&self) -> f64 {
        let total = self.a.len() + self.b.len();
        if total == 0 {
            return 1.0;
        }
        2.0 * self.a.len().min(self.b.len()) as f64 / total as f64
    }
}

/// `true` when any of `candidates` is at least `cutoff` similar to `word`.
fn has_close_match(word: &[char], candidates: &[Vec<char>], cutoff: f64) -> bool {
    candidates.iter().any(|candidate| {
        let matcher = SequenceMatcher::new(candidate, word);
        matcher.real_quick_ratio() >= cutoff && matcher.ratio() >= cutoff
    })
}

// ── Similarity measures ──────────────────────────────────────────────────────

/// Character-level similarity of the normalized strings.
/// 0.0 when either side normalizes to nothing.
pub fn string_similarity(s1: &str, s2: &str) -> f64 {
    let a: Vec<char> = normalize(s1).chars().collect();
    let b: Vec<char> = normalize(s2).chars().collect();

    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    SequenceMatcher::new(&a, &b).ratio()
}

/// Fraction of query words with a close match among the result's words.
/// Word order does not matter.
pub fn fuzzy_word_similarity(query: &str, result_text: &str) -> f64 {
    let query_norm = normalize(query);
    let result_norm = normalize(result_text);

    let query_words: Vec<Vec<char>> = query_norm.split_whitespace().map(|w| w.chars().collect()).collect();
    let result_words: Vec<Vec<char>> = result_norm.split_whitespace().map(|w| w.chars().collect()).collect();

    if query_words.is_empty() || result_words.is_empty() {
        return 0.0;
    }

    let matched = query_words
        .iter()
        .filter(|word| has_close_match(word, &result_words, WORD_MATCH_CUTOFF))
        .count();

    matched as f64 / query_words.len() as f64
}

// ── Overall score ────────────────────────────────────────────────────────────

/// Human-readable quality category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityBand {
    Excellent,
    Good,
    Fair,
    Weak,
    Poor,
}

impl QualityBand {
    pub fn from_quality(quality: f64) -> Self {
        if quality >= 0.8 {
            QualityBand::Excellent
        } else if quality >= 0.6 {
            QualityBand::Good
        } else if quality >= 0.3 {
            QualityBand::Fair
        } else if quality >= 0.1 {
            QualityBand::Weak
        } else {
            QualityBand::Poor
        }
    }
}

impl fmt::Display for QualityBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            QualityBand::Excellent => "Excellent match",
            QualityBand::Good => "Good match",
            QualityBand::Fair => "Fair match",
            QualityBand::Weak => "Weak match",
            QualityBand::Poor => "Poor match",
        };
        f.write_str(s)
    }
}

/// Quality of a search hit plus an explanation.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchScore {
    /// Overall quality in `[0, 1]`
    pub quality: f64,
    pub string_similarity: f64,
    pub word_similarity: f64,
    /// e.g. `"Excellent match (str: 0.85, word: 1.00)"`
    pub reason: String,
}

impl MatchScore {
    fn zero(reason: &str) -> Self {
        MatchScore {
            quality: 0.0,
            string_similarity: 0.0,
            word_similarity: 0.0,
            reason: reason.to_string(),
        }
    }
}

/// Score a hit (`result_name` by `result_artists`) against `query`.
pub fn score(query: &str, result_name: &str, result_artists: &str) -> MatchScore {
    if result_name.is_empty() {
        return MatchScore::zero("No result found");
    }
    if query.is_empty() {
        return MatchScore::zero("Empty query");
    }

    let result_full = format!("{} {}", result_name, result_artists);
    let result_full = result_full.trim();

    let string_sim = string_similarity(query, result_full);
    let word_sim = fuzzy_word_similarity(query, result_full);
    let quality = STRING_WEIGHT * string_sim + WORD_WEIGHT * word_sim;

    let band = QualityBand::from_quality(quality);
    MatchScore {
        quality,
        string_similarity: string_sim,
        word_similarity: word_sim,
        reason: format!("{} (str: {:.2}, word: {:.2})", band, string_sim, word_sim),
    }
}
