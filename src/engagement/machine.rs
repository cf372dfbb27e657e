//! Engagement state machine — pure transition logic.
//!
//! Two states per user: `Idle` and `Awaiting` (an open challenge). Given the
//! current profile snapshot and a recovered action, `transition` computes the
//! reply and the single profile mutation to persist. All I/O (catalog lookup,
//! profile writes) happens outside; the machine itself is side-effect-free
//! apart from drawing an affirmation when a response is accepted.

use std::sync::Arc;

use crate::config::BotConfig;
use crate::engagement::affirmations::AffirmationSource;
use crate::engagement::messages;
use crate::engagement::model::{
    Action, Challenge, ProfileUpdate, Reply, Transition, UserProfile,
};

/// The core decision logic of the bot.
pub struct EngagementMachine {
    config: BotConfig,
    affirmations: Arc<dyn AffirmationSource>,
}

impl EngagementMachine {
    pub fn new(config: BotConfig, affirmations: Arc<dyn AffirmationSource>) -> Self {
        Self {
            config,
            affirmations,
        }
    }

    /// Compute the next step for one inbound action.
    ///
    /// `next_challenge` is the result of the bounded catalog lookup and is
    /// only consulted for `Action::RequestChallenge`.
    pub fn transition(
        &self,
        profile: &UserProfile,
        action: &Action,
        next_challenge: Option<&Challenge>,
    ) -> Transition {
        match action {
            Action::Start => Transition::reply_only(Reply::with_menu(messages::welcome(
                &self.config.name,
                &profile.name,
            ))),
            Action::RequestChallenge => self.request_challenge(next_challenge),
            Action::QueryPoints => {
                // Idempotent: never mutates state.
                Transition::reply_only(Reply::with_menu(messages::points_total(profile.points)))
            }
            Action::Exit => Transition {
                reply: Reply::with_menu(messages::EXIT_ACK),
                update: Some(ProfileUpdate::Exited),
            },
            Action::FreeText(text) => {
                if profile.awaiting_response {
                    self.submit_response(profile, text)
                } else {
                    Transition::reply_only(Reply::with_menu(messages::IDLE_FALLBACK))
                }
            }
        }
    }

    /// Offer the next unseen challenge, or report catalog exhaustion.
    ///
    /// Requesting while a challenge is already open abandons it without
    /// penalty: the cursor advances to the newly offered id.
    fn request_challenge(&self, next_challenge: Option<&Challenge>) -> Transition {
        match next_challenge {
            Some(challenge) => Transition {
                reply: Reply::plain(messages::challenge_prompt(challenge)),
                update: Some(ProfileUpdate::ChallengeAssigned {
                    challenge_id: challenge.id,
                }),
            },
            None => Transition::reply_only(Reply::plain(messages::CATALOG_EXHAUSTED)),
        }
    }

    /// Evaluate a free-text challenge response.
    fn submit_response(&self, profile: &UserProfile, text: &str) -> Transition {
        let text = text.trim();

        if word_count(text) < self.config.min_response_words {
            return Transition::reply_only(Reply::plain(messages::TOO_BRIEF));
        }

        // Exact string equality against the full history, not fuzzy.
        if profile.responses.iter().any(|r| r == text) {
            return Transition::reply_only(Reply::plain(messages::DUPLICATE));
        }

        let new_points = profile.points + self.config.points_per_response;
        let affirmation = self.affirmations.pick();
        Transition {
            reply: Reply::with_menu(messages::response_accepted(
                affirmation,
                self.config.points_per_response,
                new_points,
            )),
            update: Some(ProfileUpdate::ResponseAccepted {
                text: text.to_string(),
                new_points,
            }),
        }
    }
}

/// Number of whitespace-separated tokens in the trimmed input.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
