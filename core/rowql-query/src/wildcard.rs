//! SQL-`LIKE`-style wildcard matching for the `like`/`ilike` operators.
//!
//! Pattern language: `%` matches any run of zero or more characters,
//! `_` matches exactly one character, `\` escapes the following character
//! (so `\%` and `\_` are literal). Matching is an iterative two-pointer
//! scan with a backtrack bookmark at the last `%`, bounded at
//! O(subject × pattern) in the worst case.

const ANY: char = '%';
const SINGLE: char = '_';
const ESCAPE: char = '\\';

/// Case-sensitive wildcard match.
#[must_use]
pub fn is_match(subject: &str, pattern: &str) -> bool {
    let s: Vec<char> = subject.chars().collect();
    let p: Vec<char> = pattern.chars().collect();

    let mut si = 0;
    let mut pi = 0;
    // Bookmarks for the most recent unescaped '%': subject resume point
    // and the pattern position just past the '%'.
    let mut s_mark: Option<usize> = None;
    let mut p_mark: Option<usize> = None;

    while si < s.len() {
        let mut escaped = false;
        if pi < p.len() && p[pi] == ESCAPE {
            escaped = true;
            pi += 1;
        }

        if pi < p.len() && p[pi] == ANY && !escaped {
            s_mark = Some(si);
            pi += 1;
            p_mark = Some(pi);
            // A trailing '%' swallows the rest of the subject.
            if pi == p.len() {
                return true;
            }
            continue;
        }

        if pi < p.len() && (s[si] == p[pi] || (p[pi] == SINGLE && !escaped)) {
            si += 1;
            pi += 1;
        } else {
            // Mismatch: resume one past the last '%' bookmark, or fail
            // outright if none was ever seen.
            let (Some(sm), Some(pm)) = (s_mark, p_mark) else {
                return false;
            };
            si = sm + 1;
            s_mark = Some(si);
            pi = pm;
        }
    }

    // Subject exhausted: the rest of the pattern must be unescaped '%'s.
    while pi < p.len() && p[pi] == ANY {
        pi += 1;
    }
    pi == p.len()
}

/// Case-insensitive wildcard match; lowercases both inputs.
#[must_use]
pub fn is_match_ci(subject: &str, pattern: &str) -> bool {
    is_match(&subject.to_lowercase(), &pattern.to_lowercase())
}
