//! Best-effort name, email and phone extraction from unstructured resume text.
//!
//! Pure and total: any input yields a profile, missing fields are empty strings.
//! Precedence: email, then phone, then a three-pass name heuristic whose last
//! pass derives the name from the email's local part.

use std::sync::OnceLock;

use regex::Regex;

use crate::models::candidate::CandidateProfile;

/// Lines scanned by the header pass (short capitalized line near the top).
const HEADER_SCAN_LINES: usize = 8;
/// Lines scanned by the strict alphabetic-word pass.
const STRICT_SCAN_LINES: usize = 20;
/// Characters that never appear in a name line (table borders, labels, markup).
const NAME_FORBIDDEN_CHARS: &[char] = &['|', ':', ';', '<', '>', '~', '}', '{'];

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}").expect("valid email pattern")
    })
}

fn phone_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"(\+?[0-9]{1,3}[-.\s]?)?([0-9]{10}|[0-9]{5}[-.\s][0-9]{5}|[0-9]{3}[-.\s][0-9]{3}[-.\s][0-9]{4})",
        )
        .expect("valid phone pattern")
    })
}

fn strict_name_word() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z.'-]+$").expect("valid name word pattern"))
}

/// Extracts a candidate profile from plain text.
pub fn extract_fields(text: &str) -> CandidateProfile {
    if text.is_empty() {
        return CandidateProfile::default();
    }

    let normalized = text.replace('\r', "\n");
    let lines: Vec<&str> = normalized
        .split('\n')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let email = find_email(text);
    let phone = find_phone(text);

    let name = header_name(&lines)
        .or_else(|| strict_name(&lines))
        .map(str::to_string)
        .unwrap_or_else(|| name_from_email(&email));

    CandidateProfile {
        name: name.trim().to_string(),
        email: email.trim().to_string(),
        phone: phone.trim().to_string(),
    }
}

fn find_email(text: &str) -> String {
    email_pattern()
        .find(text)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

fn find_phone(text: &str) -> String {
    phone_pattern()
        .find(text)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Lines containing `@` or any digit are contact/detail lines, never a name.
fn is_candidate_line(line: &str) -> bool {
    !line.contains('@') && !line.chars().any(|c| c.is_ascii_digit())
}

/// Pass 1: a 1–4 word line in the first few lines, at least half its words capitalized.
fn header_name<'a>(lines: &[&'a str]) -> Option<&'a str> {
    lines
        .iter()
        .take(HEADER_SCAN_LINES)
        .copied()
        .filter(|l| is_candidate_line(l))
        .find(|line| {
            let words: Vec<&str> = line.split_whitespace().collect();
            if words.is_empty() || words.len() > 4 {
                return false;
            }
            let capitalized = words
                .iter()
                .filter(|w| w.starts_with(|c: char| c.is_ascii_uppercase()))
                .count();
            capitalized as f64 / words.len() as f64 >= 0.5
                && !line.contains(NAME_FORBIDDEN_CHARS)
        })
}

/// Pass 2: a 2–4 word line where every word is strictly alphabetic (plus `.'-`).
fn strict_name<'a>(lines: &[&'a str]) -> Option<&'a str> {
    lines
        .iter()
        .take(STRICT_SCAN_LINES)
        .copied()
        .filter(|l| is_candidate_line(l))
        .find(|line| {
            let words: Vec<&str> = line.split_whitespace().collect();
            (2..=4).contains(&words.len()) && words.iter().all(|w| strict_name_word().is_match(w))
        })
}

/// Pass 3: "john.q.public@x.com" → "John Q Public".
fn name_from_email(email: &str) -> String {
    let local = email.split('@').next().unwrap_or_default();
    local
        .split(['.', '_', '-'])
        .map(|part| {
            part.chars()
                .filter(|c| c.is_ascii_alphabetic())
                .collect::<String>()
        })
        .filter(|part| !part.is_empty())
        .map(|part| capitalize(&part))
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}
