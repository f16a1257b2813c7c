// All prompt constants for the AI gateway. Templates use `{placeholder}`
// markers that are substituted before sending.

use crate::gateway::problem::Difficulty;

/// Instruction part sent alongside the inline audio data.
pub const TRANSCRIPTION_INSTRUCTION: &str =
    "Please transcribe the following audio recording. Return only the transcribed text, nothing else.";

/// Interview feedback template. Replace `{question}` and `{answer}`.
/// Framing is fixed: act as an interviewer, 2-3 sentences, low temperature.
pub const FEEDBACK_PROMPT_TEMPLATE: &str = r#"You are an HR interviewer. Give quick, actionable feedback (2-3 sentences).

Question: "{question}"
Answer: "{answer}"

Feedback on clarity, relevance, and professionalism:"#;

/// Problem generation template. Replace `{difficulty}`, `{seed}`, `{timestamp}`.
///
/// The seed and timestamp only bias the backend away from repeating earlier
/// output; they are a hint, not a uniqueness guarantee. The "all values as
/// strings" demand matches the sanitization invariant in `gateway::problem`,
/// which is still enforced locally whatever the backend returns.
pub const PROBLEM_PROMPT_TEMPLATE: &str = r#"Create a UNIQUE {difficulty} level Data Structures and Algorithms problem.

IMPORTANT: Create a completely NEW and DIFFERENT problem each time. Do not repeat previous problems.
Problem seed: {seed} | Timestamp: {timestamp}

Focus on diverse topics like:
- Arrays, Strings, Hash Maps
- Linked Lists, Stacks, Queues
- Trees (Binary, BST, Tries)
- Graphs (DFS, BFS, Shortest Path)
- Dynamic Programming
- Greedy Algorithms
- Sorting & Searching
- Sliding Window, Two Pointers
- Heaps & Priority Queues

CRITICAL: Return ONLY valid JSON with ALL values as strings. No nested objects or arrays in example fields.

Required format:
{
  "title": "Problem Name (string)",
  "description": "Problem statement as a single string",
  "difficulty": "{difficulty}",
  "examples": [
    {
      "input": "All input data as a formatted string (e.g., 'arr = [1,2,3], target = 5')",
      "output": "Expected output as a string (e.g., '[0, 2]')",
      "explanation": "Why this output as a string"
    }
  ],
  "constraints": ["constraint 1 as string", "constraint 2 as string"],
  "hints": ["hint 1 as string", "hint 2 as string"]
}

Example of CORRECT format:
{
  "input": "n = 5, k = 2, edges = [[0,1],[1,2],[2,3],[3,4]]",
  "output": "true",
  "explanation": "The graph is connected"
}

Do NOT return nested objects like {"n": 5, "k": 2}. Convert everything to strings."#;

/// Fills [`FEEDBACK_PROMPT_TEMPLATE`].
pub fn feedback_prompt(question: &str, answer: &str) -> String {
    FEEDBACK_PROMPT_TEMPLATE
        .replace("{question}", question)
        .replace("{answer}", answer)
}

/// Fills [`PROBLEM_PROMPT_TEMPLATE`].
pub fn problem_prompt(difficulty: Difficulty, seed: &str, timestamp_ms: i64) -> String {
    PROBLEM_PROMPT_TEMPLATE
        .replace("{difficulty}", difficulty.as_str())
        .replace("{seed}", seed)
        .replace("{timestamp}", &timestamp_ms.to_string())
}
