//! Engagement core — state machine, catalog selection, disambiguation.

pub mod affirmations;
pub mod disambiguator;
pub mod machine;
pub mod messages;
pub mod model;

pub use affirmations::{AffirmationSource, FixedAffirmations, RandomAffirmations};
pub use disambiguator::Disambiguator;
pub use machine::EngagementMachine;
pub use model::{Action, Challenge, ConversationState, ProfileUpdate, Reply, Transition, UserProfile};
