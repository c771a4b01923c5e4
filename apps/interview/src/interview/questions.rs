use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Seconds allowed to answer a question of this difficulty.
    pub fn budget_secs(self) -> i64 {
        match self {
            Difficulty::Easy => 20,
            Difficulty::Medium => 60,
            Difficulty::Hard => 120,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    pub text: &'static str,
    pub difficulty: Difficulty,
}

impl Question {
    pub fn budget_secs(&self) -> i64 {
        self.difficulty.budget_secs()
    }
}

/// The fixed interview, asked in this order.
pub static QUESTION_BANK: [Question; 6] = [
    Question {
        text: "Explain props vs state in React.",
        difficulty: Difficulty::Easy,
    },
    Question {
        text: "What is event delegation in JavaScript?",
        difficulty: Difficulty::Easy,
    },
    Question {
        text: "How would you optimize a slow React app?",
        difficulty: Difficulty::Medium,
    },
    Question {
        text: "Explain closure in JS with an example.",
        difficulty: Difficulty::Medium,
    },
    Question {
        text: "Design a rate limiter for API requests.",
        difficulty: Difficulty::Hard,
    },
    Question {
        text: "How to scale a Node.js app for high concurrency?",
        difficulty: Difficulty::Hard,
    },
];
