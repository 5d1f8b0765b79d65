//! Clarification replies for input the action cannot place.

use crate::{
    catalog::Catalog,
    reply::{Reply, RichResponse, Surface},
};
use rand::{Rng, seq::IndexedRandom};

/// Placeholder replaced by the user's raw input.
pub const RAW_INPUT_PLACEHOLDER: &str = "%s";

/// Substitutes `raw_input` for the first placeholder in `template`.
///
/// Templates without a placeholder are returned unchanged.
pub fn render_template(template: &str, raw_input: &str) -> String {
    template.replacen(RAW_INPUT_PLACEHOLDER, raw_input, 1)
}

/// Builds a randomized clarification prompt. Never ends the conversation.
pub fn clarify<R: Rng + ?Sized>(
    catalog: &Catalog,
    raw_input: &str,
    surface: Surface,
    rng: &mut R,
) -> Reply {
    let template = catalog
        .fallback_templates()
        .choose(rng)
        .map(String::as_str)
        .unwrap_or_default();
    let response = render_template(template, raw_input);

    if !surface.has_screen() {
        return Reply::ask(response, catalog.reprompts());
    }

    let rich = RichResponse::new()
        .add_simple_response(response)
        .add_suggestions(catalog.suggestions());
    Reply::ask_rich(rich, catalog.reprompts())
}
