use crate::models::candidate::ScoreResult;

pub const FALLBACK_SUMMARY: &str = "Placeholder summary generated (no scoring service).";

const CHARS_PER_POINT: usize = 20;
const MAX_POINTS_PER_ANSWER: u32 = 20;
const MAX_SCORE: u32 = 100;

/// One point per 20 characters, capped at 20 per answer.
pub fn answer_points(answer: &str) -> u32 {
    let points = (answer.chars().count() / CHARS_PER_POINT) as u32;
    points.min(MAX_POINTS_PER_ANSWER)
}

/// Deterministic offline score: sum of per-answer points, capped at 100.
pub fn local_score(answers: &[String]) -> ScoreResult {
    let total: u32 = answers.iter().map(|a| answer_points(a)).sum();
    ScoreResult {
        score: total.min(MAX_SCORE),
        summary: FALLBACK_SUMMARY.to_string(),
    }
}
