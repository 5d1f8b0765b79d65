//! Webhook Wire Models
//!
//! Request and response shapes of the Dialogflow v1 fulfillment webhook, with
//! the Actions on Google payload nested under `originalRequest` / `data.google`.
//! Only the fields the action reads or writes are modelled; everything else in
//! the platform payload is ignored on deserialization.

use holiday_chill_core::{
    dispatcher::CATEGORY_PARAMETER,
    reply::{BasicCard as CoreCard, Reply, ReplyBody, RichItem, Surface},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;

/// Capability name the platform sends for devices with a display.
pub const SCREEN_OUTPUT: &str = "actions.capability.SCREEN_OUTPUT";

// --- Inbound ---

#[derive(Deserialize, ToSchema, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct WebhookRequest {
    #[serde(default)]
    pub id: Option<String>,
    #[schema(example = "1515191296300")]
    pub session_id: Option<String>,
    #[serde(default)]
    pub result: QueryResult,
    #[serde(default)]
    pub original_request: Option<OriginalRequest>,
}

#[derive(Deserialize, ToSchema, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    #[serde(default)]
    #[schema(example = "meditate.intent")]
    pub action: String,
    #[serde(default)]
    pub resolved_query: Option<String>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub parameters: HashMap<String, serde_json::Value>,
}

#[derive(Deserialize, ToSchema, Debug, Clone, Default)]
pub struct OriginalRequest {
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub data: GoogleRequest,
}

#[derive(Deserialize, ToSchema, Debug, Clone, Default)]
pub struct GoogleRequest {
    #[serde(default)]
    pub surface: Option<SurfaceInfo>,
    #[serde(default)]
    pub inputs: Vec<GoogleInput>,
}

#[derive(Deserialize, ToSchema, Debug, Clone, Default)]
pub struct SurfaceInfo {
    #[serde(default)]
    pub capabilities: Vec<Capability>,
}

#[derive(Deserialize, ToSchema, Debug, Clone)]
pub struct Capability {
    pub name: String,
}

#[derive(Deserialize, ToSchema, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct GoogleInput {
    #[serde(default)]
    pub raw_inputs: Vec<RawInput>,
}

#[derive(Deserialize, ToSchema, Debug, Clone)]
pub struct RawInput {
    #[serde(default)]
    pub query: String,
}

impl WebhookRequest {
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref().filter(|s| !s.trim().is_empty())
    }

    /// The classified action, which the dispatcher treats as the intent name.
    pub fn action(&self) -> &str {
        &self.result.action
    }

    /// The `category` parameter, if the NLU supplied a non-empty string.
    pub fn category(&self) -> Option<&str> {
        self.result
            .parameters
            .get(CATEGORY_PARAMETER)
            .and_then(serde_json::Value::as_str)
            .filter(|s| !s.trim().is_empty())
    }

    /// What the user actually said: the Google raw query when present,
    /// otherwise the query Dialogflow resolved.
    pub fn raw_input(&self) -> &str {
        self.original_request
            .as_ref()
            .and_then(|r| r.data.inputs.first())
            .and_then(|i| i.raw_inputs.first())
            .map(|r| r.query.as_str())
            .or(self.result.resolved_query.as_deref())
            .unwrap_or_default()
    }

    pub fn surface(&self) -> Surface {
        let has_screen = self
            .original_request
            .as_ref()
            .and_then(|r| r.data.surface.as_ref())
            .is_some_and(|s| s.capabilities.iter().any(|c| c.name == SCREEN_OUTPUT));
        Surface::from_screen_output(has_screen)
    }
}

// --- Outbound ---

#[derive(Serialize, ToSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WebhookResponse {
    pub speech: String,
    pub display_text: String,
    pub data: ResponseData,
}

#[derive(Serialize, ToSchema, Debug, Clone, PartialEq)]
pub struct ResponseData {
    pub google: GooglePayload,
}

#[derive(Serialize, ToSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GooglePayload {
    pub expect_user_response: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub no_input_prompts: Vec<SimpleResponse>,
    pub rich_response: RichResponse,
}

/// A spoken prompt; SSML goes in `ssml`, plain text in `textToSpeech`.
#[derive(Serialize, ToSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SimpleResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_to_speech: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssml: Option<String>,
}

impl SimpleResponse {
    pub fn from_speech(speech: &str) -> Self {
        if speech.trim_start().starts_with("<speak>") {
            Self {
                text_to_speech: None,
                ssml: Some(speech.to_string()),
            }
        } else {
            Self {
                text_to_speech: Some(speech.to_string()),
                ssml: None,
            }
        }
    }
}

#[derive(Serialize, ToSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RichResponse {
    pub items: Vec<RichResponseItem>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<Suggestion>,
}

#[derive(Serialize, ToSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum RichResponseItem {
    SimpleResponse(SimpleResponse),
    BasicCard(BasicCard),
}

#[derive(Serialize, ToSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BasicCard {
    pub formatted_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<CardImage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub buttons: Vec<Button>,
}

#[derive(Serialize, ToSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CardImage {
    pub url: String,
    pub accessibility_text: String,
}

#[derive(Serialize, ToSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Button {
    pub title: String,
    pub open_url_action: OpenUrlAction,
}

#[derive(Serialize, ToSchema, Debug, Clone, PartialEq)]
pub struct OpenUrlAction {
    pub url: String,
}

#[derive(Serialize, ToSchema, Debug, Clone, PartialEq)]
pub struct Suggestion {
    pub title: String,
}

impl From<&CoreCard> for BasicCard {
    fn from(card: &CoreCard) -> Self {
        Self {
            formatted_text: card.body.clone(),
            image: card.image.as_ref().map(|i| CardImage {
                url: i.url.clone(),
                accessibility_text: i.alt_text.clone(),
            }),
            buttons: card
                .button
                .iter()
                .map(|b| Button {
                    title: b.title.clone(),
                    open_url_action: OpenUrlAction { url: b.url.clone() },
                })
                .collect(),
        }
    }
}

impl From<&Reply> for WebhookResponse {
    fn from(reply: &Reply) -> Self {
        let rich_response = match &reply.body {
            ReplyBody::Speech(speech) => RichResponse {
                items: vec![RichResponseItem::SimpleResponse(SimpleResponse::from_speech(
                    speech,
                ))],
                suggestions: Vec::new(),
            },
            ReplyBody::Rich(rich) => RichResponse {
                items: rich
                    .items
                    .iter()
                    .map(|item| match item {
                        RichItem::SimpleResponse { speech } => {
                            RichResponseItem::SimpleResponse(SimpleResponse::from_speech(speech))
                        }
                        RichItem::BasicCard(card) => RichResponseItem::BasicCard(card.into()),
                    })
                    .collect(),
                suggestions: rich
                    .suggestions
                    .iter()
                    .map(|title| Suggestion {
                        title: title.clone(),
                    })
                    .collect(),
            },
        };

        let speech = reply.primary_speech().to_string();
        Self {
            display_text: speech.clone(),
            speech,
            data: ResponseData {
                google: GooglePayload {
                    expect_user_response: reply.expect_user_response,
                    no_input_prompts: reply
                        .reprompts
                        .iter()
                        .map(|p| SimpleResponse::from_speech(p))
                        .collect(),
                    rich_response,
                },
            },
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
}
