//! Configuration types.

/// Bot configuration.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Bot display name used in the welcome message.
    pub name: String,
    /// Points awarded per accepted challenge response.
    pub points_per_response: u32,
    /// Minimum whitespace-separated word count for a response to qualify.
    pub min_response_words: usize,
    /// Similarity threshold above which a near-miss text triggers a
    /// command suggestion (0–1 scale, inclusive).
    pub suggestion_threshold: f64,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: "Lumo".to_string(),
            points_per_response: 10,
            min_response_words: 3,
            suggestion_threshold: 0.7,
        }
    }
}
