//! Formats a served content entry for the client's surface.

use crate::{
    catalog::{Catalog, Category},
    reply::{BasicCard, Reply, RichResponse, Surface, speak},
};
use rand::{Rng, seq::IndexedRandom};

/// Builds the reply for one served entry of `category`.
///
/// Audio-only devices get a single SSML string ending in the category's
/// follow-up question. Devices with a screen get the entry spoken, a card with
/// a random catalog image and a "learn more" button, the follow-up question,
/// and the category suggestion chips.
pub fn format_content<R: Rng + ?Sized>(
    catalog: &Catalog,
    category: &Category,
    entry: &str,
    surface: Surface,
    rng: &mut R,
) -> Reply {
    if !surface.has_screen() {
        return Reply::ask(
            speak(&[category.prefix.as_str(), entry, category.next_prompt.as_str()]),
            catalog.reprompts(),
        );
    }

    let mut card = BasicCard::new(entry).with_button(&catalog.general().link_out, catalog.link());
    if let Some(image) = catalog.images().choose(rng) {
        card = card.with_image(&image.url, &image.alt_text);
    }

    let rich = RichResponse::new()
        .add_simple_response(speak(&[category.prefix.as_str(), entry]))
        .add_basic_card(card)
        .add_simple_response(&category.next_prompt)
        .add_suggestions(catalog.suggestions());

    Reply::ask_rich(rich, catalog.reprompts())
}
