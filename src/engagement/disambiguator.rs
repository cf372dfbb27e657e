//! Fuzzy command matching for near-miss input.
//!
//! Runs before the state machine on every free-text event, in any
//! conversational state. A near-command word typed as a challenge response
//! is therefore redirected to a suggestion instead of being evaluated —
//! intentional, if surprising.

use crate::config::BotConfig;

/// Recognized command vocabulary, in deterministic tie-break order.
pub const COMMANDS: [&str; 4] = ["/start", "/reto", "/puntos", "/salir"];

/// Maps near-miss text to the closest known command.
#[derive(Debug, Clone)]
pub struct Disambiguator {
    threshold: f64,
}

impl Disambiguator {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn from_config(config: &BotConfig) -> Self {
        Self::new(config.suggestion_threshold)
    }

    /// Return the best-matching command if its similarity reaches the
    /// threshold. Ties broken by vocabulary order: a later candidate must
    /// score strictly higher to win.
    pub fn suggest(&self, text: &str) -> Option<&'static str> {
        let normalized = text.trim().to_lowercase();
        if normalized.is_empty() {
            return None;
        }

        let mut best: Option<(&'static str, f64)> = None;
        for command in COMMANDS {
            let score = strsim::normalized_levenshtein(&normalized, command);
            if best.is_none_or(|(_, top)| score > top) {
                best = Some((command, score));
            }
        }

        best.filter(|(_, score)| *score >= self.threshold)
            .map(|(command, _)| command)
    }
}

impl Default for Disambiguator {
    fn default() -> Self {
        Self::new(BotConfig::default().suggestion_threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typo_maps_to_closest_command() {
        let d = Disambiguator::default();
        assert_eq!(d.suggest("/ret"), Some("/reto"));
        assert_eq!(d.suggest("/retoo"), Some("/reto"));
        assert_eq!(d.suggest("/punto"), Some("/puntos"));
        assert_eq!(d.suggest("/sali"), Some("/salir"));
        assert_eq!(d.suggest("/strt"), Some("/start"));
    }

    #[test]
    fn matching_is_case_insensitive_and_trimmed() {
        let d = Disambiguator::default();
        assert_eq!(d.suggest("  /RETO  "), Some("/reto"));
        assert_eq!(d.suggest("/Puntos"), Some("/puntos"));
    }

    #[test]
    fn bare_command_word_without_slash_still_matches() {
        let d = Disambiguator::default();
        assert_eq!(d.suggest("reto"), Some("/reto"));
    }

    #[test]
    fn unrelated_text_gets_no_suggestion() {
        let d = Disambiguator::default();
        assert_eq!(d.suggest("hoy me siento muy bien"), None);
        assert_eq!(d.suggest("hola"), None);
        assert_eq!(d.suggest(""), None);
        assert_eq!(d.suggest("   "), None);
    }

    #[test]
    fn only_best_match_is_returned() {
        let d = Disambiguator::default();
        // Closer to /salir than to any other command.
        assert_eq!(d.suggest("/salirr"), Some("/salir"));
    }

    #[test]
    fn threshold_is_configurable() {
        let strict = Disambiguator::new(0.95);
        assert_eq!(strict.suggest("/ret"), None);
        assert_eq!(strict.suggest("/reto"), Some("/reto"));
    }
}
