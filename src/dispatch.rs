//! Dispatch shell — routes inbound events through the engagement pipeline.
//!
//! Pipeline per message: per-user serialization, profile lifecycle
//! (create-on-first-contact), command mapping or disambiguation, then the
//! state machine. The dispatcher owns the store handle and applies the
//! machine's requested profile mutation before replying.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::channels::{IncomingMessage, OutgoingResponse};
use crate::config::BotConfig;
use crate::engagement::affirmations::AffirmationSource;
use crate::engagement::disambiguator::Disambiguator;
use crate::engagement::machine::EngagementMachine;
use crate::engagement::messages;
use crate::engagement::model::{Action, Reply, UserProfile};
use crate::error::Result;
use crate::store::Store;

/// Routes one inbound message at a time per user.
pub struct Dispatcher {
    store: Arc<dyn Store>,
    machine: EngagementMachine,
    disambiguator: Disambiguator,
    /// Per-user locks. Events for the same user are serialized so that the
    /// read-modify-write on the profile cannot race; distinct users proceed
    /// concurrently.
    user_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl Dispatcher {
    pub fn new(
        store: Arc<dyn Store>,
        config: BotConfig,
        affirmations: Arc<dyn AffirmationSource>,
    ) -> Self {
        let disambiguator = Disambiguator::from_config(&config);
        Self {
            store,
            machine: EngagementMachine::new(config, affirmations),
            disambiguator,
            user_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Handle one inbound message and produce the reply to deliver.
    pub async fn handle(&self, msg: &IncomingMessage) -> Result<OutgoingResponse> {
        let lock = self.user_lock(&msg.user_id).await;
        let _guard = lock.lock().await;

        let profile = self.ensure_profile(&msg.user_id, &msg.user_name).await?;

        let action = match self.route(msg) {
            Routed::Action(action) => action,
            Routed::Suggestion(command) => {
                // Short-circuit: no state transition, regardless of state.
                debug!(user_id = %msg.user_id, command, "Near-miss command suggestion");
                return Ok(reply_to_response(Reply::plain(messages::command_suggestion(
                    command,
                ))));
            }
        };

        // The one bounded catalog lookup, only when a challenge is requested.
        let next_challenge = if action == Action::RequestChallenge {
            self.store.query_next_challenge(profile.cursor()).await?
        } else {
            None
        };

        let transition = self
            .machine
            .transition(&profile, &action, next_challenge.as_ref());

        if let Some(update) = &transition.update {
            self.store.apply_update(&profile.id, update).await?;
        }

        Ok(reply_to_response(transition.reply))
    }

    /// Recover the user's intent from the raw event.
    fn route(&self, msg: &IncomingMessage) -> Routed {
        if msg.is_command {
            if let Some(action) = msg
                .command_name
                .as_deref()
                .and_then(Action::from_command)
            {
                return Routed::Action(action);
            }
        }

        // Everything unrecognized goes through the disambiguator first.
        if let Some(command) = self.disambiguator.suggest(&msg.text) {
            return Routed::Suggestion(command);
        }

        Routed::Action(Action::FreeText(msg.text.clone()))
    }

    /// Fetch the profile, creating it on first contact.
    async fn ensure_profile(&self, user_id: &str, user_name: &str) -> Result<UserProfile> {
        if let Some(profile) = self.store.get_profile(user_id).await? {
            return Ok(profile);
        }

        let profile = UserProfile::new(user_id, user_name);
        self.store.create_profile(&profile).await?;
        info!(user_id, "New user profile created");
        Ok(profile)
    }

    async fn user_lock(&self, user_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.user_locks.lock().await;
        Arc::clone(
            locks
                .entry(user_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        )
    }
}

enum Routed {
    Action(Action),
    Suggestion(&'static str),
}

fn reply_to_response(reply: Reply) -> OutgoingResponse {
    OutgoingResponse::new(reply.text, reply.show_menu)
}
