//! Intent Dispatcher
//!
//! Maps an inbound intent name to its handler and runs it against the
//! conversation's `SessionState`. The dispatcher is synchronous and owns no
//! per-conversation data: everything that must survive between turns lives in
//! the session passed in by the caller.

use crate::{
    catalog::Catalog,
    fallback::{self, render_template},
    reply::{Reply, Surface, speak},
    responder,
    session::{ConsumptionPolicy, SessionState, Stage},
};
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Intent names that are not bound to a content category.
pub mod actions {
    pub const UNRECOGNIZED_DEEP_LINK: &str = "deeplink.unknown";
    pub const START_OVER: &str = "startOver.intent";

    /// Intents a catalog category may not claim as its content intent.
    pub const RESERVED: [&str; 2] = [UNRECOGNIZED_DEEP_LINK, START_OVER];
}

/// Name of the NLU parameter carrying the requested category.
pub const CATEGORY_PARAMETER: &str = "category";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler {
    Fallback,
    Content,
    StartOver,
}

/// Reasons a content intent could not serve an entry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("{parameter} parameter is unrecognized or not provided by the {intent} action")]
    UnresolvedParameter {
        parameter: &'static str,
        intent: String,
        value: Option<String>,
    },
    #[error("every category has been played this session")]
    AllExhausted,
    #[error("category '{0}' has nothing left to play")]
    CategoryExhausted(String),
}

/// The parts of an inbound event the dispatcher acts on.
#[derive(Debug, Clone, Copy)]
pub struct Turn<'a> {
    pub intent: &'a str,
    pub category: Option<&'a str>,
    pub raw_input: &'a str,
    pub surface: Surface,
}

pub struct Dispatcher {
    catalog: Arc<Catalog>,
    policy: ConsumptionPolicy,
    routes: HashMap<String, Handler>,
}

impl Dispatcher {
    /// Builds the routing table: one content route per catalog category, plus
    /// the deep-link fallback and the restart intent.
    pub fn new(catalog: Arc<Catalog>, policy: ConsumptionPolicy) -> Self {
        let mut routes: HashMap<String, Handler> = catalog
            .categories()
            .iter()
            .map(|c| (c.intent.clone(), Handler::Content))
            .collect();
        routes.insert(actions::UNRECOGNIZED_DEEP_LINK.to_string(), Handler::Fallback);
        routes.insert(actions::START_OVER.to_string(), Handler::StartOver);
        Self {
            catalog,
            policy,
            routes,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn policy(&self) -> ConsumptionPolicy {
        self.policy
    }

    /// Unknown intents route to the fallback handler.
    pub fn route(&self, intent: &str) -> Handler {
        self.routes.get(intent).copied().unwrap_or(Handler::Fallback)
    }

    /// Handles one turn and returns the reply to send.
    pub fn dispatch<R: Rng + ?Sized>(
        &self,
        turn: &Turn<'_>,
        session: &mut SessionState,
        rng: &mut R,
    ) -> Reply {
        let handler = self.route(turn.intent);
        debug!(intent = turn.intent, ?handler, stage = %session.stage(), "Dispatching turn");

        match handler {
            Handler::Fallback => {
                if turn.intent != actions::UNRECOGNIZED_DEEP_LINK {
                    warn!(intent = turn.intent, "No handler for intent, asking for clarification");
                }
                fallback::clarify(&self.catalog, turn.raw_input, turn.surface, rng)
            }
            Handler::Content => match self.serve_content(turn, session, rng) {
                Ok(reply) => reply,
                Err(err) => self.recover(err, turn, rng),
            },
            Handler::StartOver => self.start_over(session),
        }
    }

    fn serve_content<R: Rng + ?Sized>(
        &self,
        turn: &Turn<'_>,
        session: &mut SessionState,
        rng: &mut R,
    ) -> Result<Reply, DispatchError> {
        session.set_stage(Stage::Content(turn.intent.to_string()));
        session.ensure_initialized(&self.catalog);

        if session.all_exhausted() {
            return Err(DispatchError::AllExhausted);
        }

        let category = turn
            .category
            .and_then(|value| self.catalog.lookup(value).ok())
            .ok_or_else(|| DispatchError::UnresolvedParameter {
                parameter: CATEGORY_PARAMETER,
                intent: turn.intent.to_string(),
                value: turn.category.map(str::to_string),
            })?;

        let entry = session
            .pick_next(&category.id, self.policy, rng)
            .ok_or_else(|| DispatchError::CategoryExhausted(category.id.clone()))?;

        info!(category = %category.id, surface = ?turn.surface, "Serving content entry");
        Ok(responder::format_content(
            &self.catalog,
            category,
            &entry,
            turn.surface,
            rng,
        ))
    }

    fn recover<R: Rng + ?Sized>(&self, err: DispatchError, turn: &Turn<'_>, rng: &mut R) -> Reply {
        let general = self.catalog.general();
        match err {
            DispatchError::UnresolvedParameter { ref value, .. } => {
                error!(error = %err, value = ?value, "Could not resolve content category");
                fallback::clarify(&self.catalog, turn.raw_input, turn.surface, rng)
            }
            DispatchError::AllExhausted => {
                info!("Every category exhausted, closing the conversation");
                Reply::tell(speak(&[general.heard_it_all.as_str()]))
            }
            DispatchError::CategoryExhausted(ref id) => match self.catalog.lookup(id) {
                Ok(category) => {
                    info!(category = %id, "Category exhausted");
                    let notice = render_template(
                        &general.category_exhausted,
                        &category.display_name.to_lowercase(),
                    );
                    Reply::ask(
                        speak(&[notice.as_str(), category.next_prompt.as_str()]),
                        self.catalog.reprompts(),
                    )
                }
                Err(_) => fallback::clarify(&self.catalog, turn.raw_input, turn.surface, rng),
            },
        }
    }

    fn start_over(&self, session: &SessionState) -> Reply {
        let general = self.catalog.general();
        let say = match session.stage() {
            Stage::Beginning => general.start_over.as_str(),
            Stage::Content(intent) => match self.catalog.category_for_intent(intent) {
                Some(category) => category.restart_prompt.as_str(),
                None => {
                    warn!(intent = %intent, "Stage names an intent with no category");
                    general.start_over.as_str()
                }
            },
        };
        Reply::ask(speak(&[say]), self.catalog.reprompts())
    }
}
