//! The fixed interview script. Read-only, defined at process start.

/// The ordered HR question sequence. Never mutated; the session controller
/// walks it by index.
pub const HR_QUESTIONS: [&str; 7] = [
    "Tell me about yourself and your background.",
    "Why are you interested in this position?",
    "What are your greatest strengths and weaknesses?",
    "Describe a challenging situation you faced and how you handled it.",
    "Where do you see yourself in 5 years?",
    "Why should we hire you?",
    "Do you have any questions for us?",
];
