//! 路径模糊匹配打分
//!
//! 大小写不敏感的子序列匹配：连续命中、词首命中、文件名命中都会加分。

const MATCH: u32 = 1;
const CONSECUTIVE_BONUS: u32 = 5;
const WORD_START_BONUS: u32 = 8;
const BASENAME_BONUS: u32 = 10;

fn is_separator(c: char) -> bool {
    matches!(c, '/' | '\\' | '_' | '-' | '.' | ' ')
}

fn subsequence_score(query: &[char], candidate: &str) -> Option<u32> {
    if query.is_empty() {
        return Some(0);
    }

    let chars: Vec<char> = candidate.chars().collect();
    let mut score = 0u32;
    let mut qi = 0usize;
    let mut last_match: Option<usize> = None;

    for (i, &c) in chars.iter().enumerate() {
        if qi == query.len() {
            break;
        }
        if !c.to_lowercase().eq(query[qi].to_lowercase()) {
            continue;
        }

        score += MATCH;
        if last_match.is_some_and(|last| last + 1 == i) {
            score += CONSECUTIVE_BONUS;
        }
        let prev = i.checked_sub(1).map(|p| chars[p]);
        let word_start = match prev {
            None => true,
            Some(p) => is_separator(p) || (p.is_lowercase() && c.is_uppercase()),
        };
        if word_start {
            score += WORD_START_BONUS;
        }

        last_match = Some(i);
        qi += 1;
    }

    (qi == query.len()).then_some(score)
}

fn basename(path: &str) -> &str {
    path.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(path)
}

/// Score of `candidate` (a workspace-relative path) for `query`, or `None`
/// when the query is not a subsequence of it.
pub fn fuzzy_score(query: &str, candidate: &str) -> Option<u32> {
    let query: Vec<char> = query.chars().filter(|c| !c.is_whitespace()).collect();
    let score = subsequence_score(&query, candidate)?;
    let bonus = subsequence_score(&query, basename(candidate))
        .map(|s| s + BASENAME_BONUS)
        .unwrap_or(0);
    Some(score + bonus)
}

/// Case-insensitive substring match; earlier and basename hits rank higher.
pub fn substring_score(query: &str, candidate: &str) -> Option<u32> {
    let query = query.trim().to_lowercase();
    let lowered = candidate.to_lowercase();
    let pos = lowered.find(&query)?;
    let mut score = 1000u32.saturating_sub(pos as u32);
    if basename(&lowered).contains(&query) {
        score += BASENAME_BONUS * 10;
    }
    Some(score)
}
