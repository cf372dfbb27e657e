//! Core domain types — profiles, challenges, actions, transitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persistent per-user record of progress.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    /// Opaque stable user identifier (channel-native user id).
    pub id: String,
    /// Display name, set at creation and never mutated by the core.
    pub name: String,
    /// Point total. Always `10 * responses.len()`.
    pub points: u32,
    /// Accepted response texts, append-only. Used for duplicate detection.
    pub responses: Vec<String>,
    /// True while the user has an open challenge awaiting a response.
    pub awaiting_response: bool,
    /// Cursor: id of the most recently assigned challenge, if any.
    pub current_challenge_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    /// Initial profile, created exactly once on first contact.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            points: 0,
            responses: Vec::new(),
            awaiting_response: false,
            current_challenge_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Catalog cursor — the last assigned challenge id, or 0 if none yet.
    pub fn cursor(&self) -> i64 {
        self.current_challenge_id.unwrap_or(0)
    }

    /// Current conversational state.
    pub fn state(&self) -> ConversationState {
        if self.awaiting_response {
            ConversationState::Awaiting
        } else {
            ConversationState::Idle
        }
    }

    /// Apply a transition's profile update in memory.
    ///
    /// Mirrors `Store::apply_update`; used by tests to check the invariants
    /// without a store round-trip.
    pub fn apply(&mut self, update: &ProfileUpdate) {
        match update {
            ProfileUpdate::ChallengeAssigned { challenge_id } => {
                self.awaiting_response = true;
                self.current_challenge_id = Some(*challenge_id);
            }
            ProfileUpdate::ResponseAccepted { text, new_points } => {
                self.responses.push(text.clone());
                self.points = *new_points;
                self.awaiting_response = false;
            }
            ProfileUpdate::Exited => {
                self.awaiting_response = false;
            }
        }
        self.updated_at = Utc::now();
    }
}

/// The two conversational states of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationState {
    Idle,
    Awaiting,
}

/// A single catalog entry. Immutable once read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Challenge {
    /// Positive, strictly increasing across the catalog.
    pub id: i64,
    /// Prompt shown to the user.
    pub text: String,
}

/// A user intent recovered from an inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// `/start` — welcome (profile creation happens before dispatch).
    Start,
    /// `/reto` — request the next unseen challenge.
    RequestChallenge,
    /// `/puntos` — query the point total.
    QueryPoints,
    /// `/salir` — leave challenge mode.
    Exit,
    /// Anything else: a challenge response or idle chatter.
    FreeText(String),
}

impl Action {
    /// Map a recognized command name to an action.
    pub fn from_command(name: &str) -> Option<Self> {
        match name {
            "/start" => Some(Self::Start),
            "/reto" => Some(Self::RequestChallenge),
            "/puntos" => Some(Self::QueryPoints),
            "/salir" => Some(Self::Exit),
            _ => None,
        }
    }
}

/// The single profile mutation a transition requests.
///
/// Each variant maps to one atomic whole-field update in the store: either
/// the full new state commits or none of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileUpdate {
    /// A challenge was assigned: open it and advance the cursor.
    ChallengeAssigned { challenge_id: i64 },
    /// A qualifying response was accepted: append it, set the new point
    /// total, and close the open challenge.
    ResponseAccepted { text: String, new_points: u32 },
    /// The user left challenge mode. Cursor untouched.
    Exited,
}

/// Outbound reply text, with or without the command menu keyboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub show_menu: bool,
}

impl Reply {
    pub fn with_menu(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            show_menu: true,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            show_menu: false,
        }
    }
}

/// The outcome of one state machine step.
#[derive(Debug, Clone)]
pub struct Transition {
    pub reply: Reply,
    /// The profile mutation to persist, if the step changed state.
    pub update: Option<ProfileUpdate>,
}

impl Transition {
    /// A step that emits a reply without changing state.
    pub fn reply_only(reply: Reply) -> Self {
        Self {
            reply,
            update: None,
        }
    }
}
