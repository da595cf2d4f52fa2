//! Ranking extraction and aggregation for peer review.
//!
//! Reviewers answer in free text; these functions pull a structured ranking
//! out of it and later merge all rankings into per-opinion scores. Pure
//! domain logic: no I/O, only text pattern matching and arithmetic.
//!
//! # Supported Ranking Formats
//!
//! 1. **JSON** (preferred): `{"rankings": [2, 1], "confidence": 0.8, "reasoning": "..."}`
//! 2. **Labelled line**: `Rankings: [2, 1]`
//! 3. **Bare bracketed list**: first `[..]` containing only digits and commas
//!
//! A ranking is only accepted as a complete permutation of `1..=len`
//! (1 = best); anything else is a parse failure and the caller degrades the
//! review to the identity ranking with zero confidence.

use serde_json::Value;

/// Confidence recorded when a ranking parses from plain text without an
/// explicit confidence value.
const DEFAULT_PARSED_CONFIDENCE: f64 = 0.7;

/// Outcome of parsing one reviewer's response
#[derive(Debug, Clone, PartialEq)]
pub enum RankingParse {
    Parsed {
        rankings: Vec<usize>,
        confidence: f64,
        reasoning: String,
    },
    Failed {
        reason: String,
    },
}

/// Extract a ranking of `expected_len` entries from a review response.
pub fn parse_review_response(response: &str, expected_len: usize) -> RankingParse {
    // Try to find JSON in the response first
    if let Some(start) = response.find('{')
        && let Some(end) = response[start..].rfind('}')
    {
        let json_str = &response[start..start + end + 1];
        if let Ok(parsed) = serde_json::from_str::<Value>(json_str)
            && let Some(rankings) = parsed.get("rankings").and_then(parse_json_rankings)
        {
            if !is_permutation(&rankings, expected_len) {
                return RankingParse::Failed {
                    reason: format!("rankings {rankings:?} are not a permutation of 1..={expected_len}"),
                };
            }
            let confidence = parsed
                .get("confidence")
                .and_then(Value::as_f64)
                .unwrap_or(DEFAULT_PARSED_CONFIDENCE)
                .clamp(0.0, 1.0);
            let reasoning = parsed
                .get("reasoning")
                .and_then(Value::as_str)
                .unwrap_or(response)
                .to_string();
            return RankingParse::Parsed { rankings, confidence, reasoning };
        }
    }

    // Fallback: a "Rankings: [..]" line, or failing that any bracketed digit
    // list anywhere in the text
    let from_line = rankings_from_labelled_line(response);
    let rankings = match from_line.or_else(|| first_bracketed_list(response)) {
        Some(r) => r,
        None => {
            return RankingParse::Failed { reason: "no ranking list found".to_string() };
        }
    };
    if !is_permutation(&rankings, expected_len) {
        return RankingParse::Failed {
            reason: format!("rankings {rankings:?} are not a permutation of 1..={expected_len}"),
        };
    }
    let confidence = find_confidence(response).unwrap_or(DEFAULT_PARSED_CONFIDENCE);
    RankingParse::Parsed { rankings, confidence, reasoning: response.trim().to_string() }
}

fn parse_json_rankings(value: &Value) -> Option<Vec<usize>> {
    let array = value.as_array()?;
    array.iter().map(|v| v.as_u64().map(|n| n as usize)).collect()
}

/// Bracketed list on the first line mentioning "ranking". Brackets and
/// digits survive lowercasing, so the lowered copy is safe to parse.
fn rankings_from_labelled_line(response: &str) -> Option<Vec<usize>> {
    for line in response.lines() {
        let lower = line.to_lowercase();
        if let Some(idx) = lower.find("ranking") {
            return parse_bracketed_list(&lower[idx..]);
        }
    }
    None
}

/// First `[..]` span in `s` holding only digits, commas and spaces
fn first_bracketed_list(s: &str) -> Option<Vec<usize>> {
    let mut rest = s;
    while let Some(start) = rest.find('[') {
        let tail = &rest[start + 1..];
        if let Some(end) = tail.find(']')
            && let Some(parsed) = parse_digit_list(&tail[..end])
        {
            return Some(parsed);
        }
        rest = &rest[start + 1..];
    }
    None
}

fn parse_bracketed_list(s: &str) -> Option<Vec<usize>> {
    let start = s.find('[')?;
    let end = s[start + 1..].find(']')?;
    parse_digit_list(&s[start + 1..start + 1 + end])
}

fn parse_digit_list(inner: &str) -> Option<Vec<usize>> {
    if inner.trim().is_empty() {
        return None;
    }
    inner
        .split(',')
        .map(|part| part.trim().parse::<usize>().ok())
        .collect()
}

fn is_permutation(rankings: &[usize], expected_len: usize) -> bool {
    if rankings.len() != expected_len {
        return false;
    }
    let mut sorted = rankings.to_vec();
    sorted.sort_unstable();
    sorted.iter().copied().eq(1..=expected_len)
}

/// First number following the word "confidence", clamped to 0..=1
fn find_confidence(response: &str) -> Option<f64> {
    let lower = response.to_lowercase();
    let idx = lower.find("confidence")?;
    let tail = &lower[idx + "confidence".len()..];
    for word in tail.split(|c: char| c.is_whitespace() || c == ':' || c == '=' || c == ',') {
        if word.is_empty() {
            continue;
        }
        if let Ok(value) = word.trim_matches(|c: char| !(c.is_ascii_digit() || c == '.')).parse::<f64>() {
            return Some(value.clamp(0.0, 1.0));
        }
    }
    None
}

// ==================== Aggregation ====================

/// One reviewer's contribution mapped back to original opinion indices
#[derive(Debug, Clone, PartialEq)]
pub struct RankTally {
    pub confidence: f64,
    /// (original opinion index, rank given, 1 = best)
    pub ranks: Vec<(usize, usize)>,
}

/// Confidence-weighted average rank per original opinion.
///
/// `score[i] = Σ(rank_given_to_i × confidence) / Σ confidence`, summed over
/// the reviews that ranked opinion `i`. When every review carries zero
/// confidence the ranks average unweighted, so degraded reviews still break
/// ties deterministically. An opinion no review ranked scores worse than
/// any possible average.
pub fn aggregate_rankings(tallies: &[RankTally], opinion_count: usize) -> Vec<f64> {
    let total_confidence: f64 = tallies.iter().map(|t| t.confidence).sum();
    let weight_of = |confidence: f64| if total_confidence > 0.0 { confidence } else { 1.0 };

    let mut weighted_sum = vec![0.0f64; opinion_count];
    let mut weight = vec![0.0f64; opinion_count];
    for tally in tallies {
        let w = weight_of(tally.confidence);
        for &(original, rank) in &tally.ranks {
            if original < opinion_count {
                weighted_sum[original] += rank as f64 * w;
                weight[original] += w;
            }
        }
    }

    let worst = opinion_count as f64 + 1.0;
    (0..opinion_count)
        .map(|i| if weight[i] > 0.0 { weighted_sum[i] / weight[i] } else { worst })
        .collect()
}

/// Index of the best (lowest) score; ties go to the earliest opinion
pub fn best_opinion(scores: &[f64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, score) in scores.iter().enumerate() {
        match best {
            Some(b) if scores[b] <= *score => {}
            _ => best = Some(i),
        }
    }
    best
}
