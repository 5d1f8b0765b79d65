//! Static Content Catalog
//!
//! The catalog is the read-only table of content categories, images, reprompts
//! and canned phrasings that every turn draws from. It is parsed and validated
//! once at startup and then shared behind an `Arc`; nothing in the crate can
//! mutate it afterwards.

use crate::dispatcher::actions;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// The catalog document compiled into the crate.
const DEFAULT_CATALOG: &str = include_str!("../content/catalog.json");

/// Errors raised while loading, validating or querying the catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to read catalog file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse catalog document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid catalog: {0}")]
    Invalid(String),
    #[error("Unknown category: {0}")]
    UnknownCategory(String),
}

/// One content category, e.g. "meditation".
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Identifier matched against the NLU `category` parameter.
    #[serde(rename = "category")]
    pub id: String,
    /// The content intent that serves this category.
    pub intent: String,
    /// Human-facing label, also used as the suggestion chip text.
    #[serde(rename = "suggestion")]
    pub display_name: String,
    /// Playable or readable entries (SSML audio clips or text).
    #[serde(rename = "facts")]
    pub entries: Vec<String>,
    /// Spoken before every entry. May be empty.
    #[serde(rename = "factPrefix", default)]
    pub prefix: String,
    /// Follow-up question asked after an entry.
    #[serde(rename = "nextFact")]
    pub next_prompt: String,
    /// What the restart intent says right after this category was served.
    pub restart_prompt: String,
}

/// An illustrative image for visual surfaces, stored as `[url, alt]` in the document.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(from = "(String, String)")]
pub struct Image {
    pub url: String,
    pub alt_text: String,
}

impl From<(String, String)> for Image {
    fn from((url, alt_text): (String, String)) -> Self {
        Self { url, alt_text }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct Content {
    images: Vec<Image>,
    link: String,
}

#[derive(Debug, Clone, Deserialize)]
struct SuggestionSets {
    confirmation: Vec<String>,
}

/// Shared phrasings that are not tied to a single category.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralStrings {
    pub heard_it_all: String,
    pub category_exhausted: String,
    no_inputs: Vec<String>,
    suggestions: SuggestionSets,
    pub link_out: String,
    pub start_over: String,
}

/// The immutable content table.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    categories: Vec<Category>,
    content: Content,
    general: GeneralStrings,
    unknown_value_handler: Vec<String>,
}

impl Catalog {
    /// Loads the catalog shipped with the crate.
    pub fn load_default() -> Result<Self, CatalogError> {
        Self::from_json(DEFAULT_CATALOG)
    }

    /// Loads and validates a catalog document from disk.
    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    /// Parses and validates a catalog document.
    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog = serde_json::from_str(raw)?;
        catalog.validate()?;
        Ok(catalog)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        if self.categories.is_empty() {
            return Err(CatalogError::Invalid("no categories defined".to_string()));
        }
        for (idx, category) in self.categories.iter().enumerate() {
            if category.entries.is_empty() {
                return Err(CatalogError::Invalid(format!(
                    "category '{}' has no entries",
                    category.id
                )));
            }
            if actions::RESERVED.contains(&category.intent.as_str()) {
                return Err(CatalogError::Invalid(format!(
                    "category '{}' claims the reserved intent '{}'",
                    category.id, category.intent
                )));
            }
            let earlier = &self.categories[..idx];
            if earlier.iter().any(|c| c.id == category.id) {
                return Err(CatalogError::Invalid(format!(
                    "duplicate category '{}'",
                    category.id
                )));
            }
            if earlier.iter().any(|c| c.intent == category.intent) {
                return Err(CatalogError::Invalid(format!(
                    "intent '{}' is bound to more than one category",
                    category.intent
                )));
            }
        }
        if self.content.images.is_empty() {
            return Err(CatalogError::Invalid("image pool is empty".to_string()));
        }
        if self.unknown_value_handler.is_empty() {
            return Err(CatalogError::Invalid(
                "no fallback phrasings defined".to_string(),
            ));
        }
        if self.general.no_inputs.is_empty() {
            return Err(CatalogError::Invalid("no reprompts defined".to_string()));
        }
        Ok(())
    }

    /// Resolves an NLU category value.
    ///
    /// Exact id matches win; otherwise the value is compared case-insensitively
    /// against both the id and the display name, since entity values can come
    /// back as either.
    pub fn lookup(&self, id: &str) -> Result<&Category, CatalogError> {
        let wanted = id.trim();
        self.categories
            .iter()
            .find(|c| c.id == wanted)
            .or_else(|| {
                self.categories.iter().find(|c| {
                    c.id.eq_ignore_ascii_case(wanted) || c.display_name.eq_ignore_ascii_case(wanted)
                })
            })
            .ok_or_else(|| CatalogError::UnknownCategory(id.to_string()))
    }

    /// Returns the category served by the given content intent, if any.
    pub fn category_for_intent(&self, intent: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.intent == intent)
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn images(&self) -> &[Image] {
        &self.content.images
    }

    /// Target of the "learn more" button on content cards.
    pub fn link(&self) -> &str {
        &self.content.link
    }

    pub fn general(&self) -> &GeneralStrings {
        &self.general
    }

    /// Prompts the platform plays when the user stays silent.
    pub fn reprompts(&self) -> &[String] {
        &self.general.no_inputs
    }

    /// Quick-reply chips offered on visual surfaces.
    pub fn suggestions(&self) -> &[String] {
        &self.general.suggestions.confirmation
    }

    /// Clarification phrasings used by the fallback handler.
    pub fn fallback_templates(&self) -> &[String] {
        &self.unknown_value_handler
    }
}
