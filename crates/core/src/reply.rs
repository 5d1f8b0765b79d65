//! Transport-independent reply values.
//!
//! The API layer turns these into the platform's webhook JSON; the core only
//! decides what is said and shown.

/// Which output channels the client device declared for this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    AudioOnly,
    AudioVisual,
}

impl Surface {
    pub fn from_screen_output(supports_visual_output: bool) -> Self {
        if supports_visual_output {
            Surface::AudioVisual
        } else {
            Surface::AudioOnly
        }
    }

    pub fn has_screen(self) -> bool {
        self == Surface::AudioVisual
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardImage {
    pub url: String,
    pub alt_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkButton {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicCard {
    pub body: String,
    pub image: Option<CardImage>,
    pub button: Option<LinkButton>,
}

impl BasicCard {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            image: None,
            button: None,
        }
    }

    pub fn with_image(mut self, url: impl Into<String>, alt_text: impl Into<String>) -> Self {
        self.image = Some(CardImage {
            url: url.into(),
            alt_text: alt_text.into(),
        });
        self
    }

    pub fn with_button(mut self, title: impl Into<String>, url: impl Into<String>) -> Self {
        self.button = Some(LinkButton {
            title: title.into(),
            url: url.into(),
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RichItem {
    SimpleResponse { speech: String },
    BasicCard(BasicCard),
}

/// An ordered list of items plus quick-reply chips, for screen surfaces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RichResponse {
    pub items: Vec<RichItem>,
    pub suggestions: Vec<String>,
}

impl RichResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_simple_response(mut self, speech: impl Into<String>) -> Self {
        self.items.push(RichItem::SimpleResponse {
            speech: speech.into(),
        });
        self
    }

    pub fn add_basic_card(mut self, card: BasicCard) -> Self {
        self.items.push(RichItem::BasicCard(card));
        self
    }

    pub fn add_suggestions<S: AsRef<str>>(mut self, labels: &[S]) -> Self {
        self.suggestions
            .extend(labels.iter().map(|s| s.as_ref().to_string()));
        self
    }

    /// The first spoken item, used as the plain-text fallback of the reply.
    pub fn first_speech(&self) -> Option<&str> {
        self.items.iter().find_map(|item| match item {
            RichItem::SimpleResponse { speech } => Some(speech.as_str()),
            RichItem::BasicCard(_) => None,
        })
    }

    pub fn card(&self) -> Option<&BasicCard> {
        self.items.iter().find_map(|item| match item {
            RichItem::BasicCard(card) => Some(card),
            RichItem::SimpleResponse { .. } => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyBody {
    Speech(String),
    Rich(RichResponse),
}

/// What the handler sends back for one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub body: ReplyBody,
    /// Played by the platform when the user does not answer.
    pub reprompts: Vec<String>,
    /// `false` closes the conversation after this reply.
    pub expect_user_response: bool,
}

impl Reply {
    /// Speaks and keeps the microphone open.
    pub fn ask(speech: impl Into<String>, reprompts: &[String]) -> Self {
        Self {
            body: ReplyBody::Speech(speech.into()),
            reprompts: reprompts.to_vec(),
            expect_user_response: true,
        }
    }

    pub fn ask_rich(response: RichResponse, reprompts: &[String]) -> Self {
        Self {
            body: ReplyBody::Rich(response),
            reprompts: reprompts.to_vec(),
            expect_user_response: true,
        }
    }

    /// Speaks and ends the conversation.
    pub fn tell(speech: impl Into<String>) -> Self {
        Self {
            body: ReplyBody::Speech(speech.into()),
            reprompts: Vec::new(),
            expect_user_response: false,
        }
    }

    /// The text to surface as the plain `speech` of the webhook reply.
    pub fn primary_speech(&self) -> &str {
        match &self.body {
            ReplyBody::Speech(speech) => speech,
            ReplyBody::Rich(rich) => rich.first_speech().unwrap_or_default(),
        }
    }

    pub fn speech(&self) -> Option<&str> {
        match &self.body {
            ReplyBody::Speech(speech) => Some(speech),
            ReplyBody::Rich(_) => None,
        }
    }

    pub fn rich(&self) -> Option<&RichResponse> {
        match &self.body {
            ReplyBody::Rich(rich) => Some(rich),
            ReplyBody::Speech(_) => None,
        }
    }
}

/// Wraps trimmed, non-empty parts in an SSML `<speak>` element.
pub fn speak<S: AsRef<str>>(parts: &[S]) -> String {
    let body = parts
        .iter()
        .map(|p| p.as_ref().trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    format!("<speak>{}</speak>", body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speak_skips_empty_parts() {
        assert_eq!(speak(&["", " hello ", "world"]), "<speak>hello world</speak>");
        assert_eq!(speak::<&str>(&[]), "<speak></speak>");
    }

    #[test]
    fn test_surface_from_flag() {
        assert_eq!(Surface::from_screen_output(true), Surface::AudioVisual);
        assert_eq!(Surface::from_screen_output(false), Surface::AudioOnly);
        assert!(!Surface::AudioOnly.has_screen());
    }

    #[test]
    fn test_ask_and_tell() {
        let reprompts = vec!["anyone there?".to_string()];
        let ask = Reply::ask("hi", &reprompts);
        assert!(ask.expect_user_response);
        assert_eq!(ask.reprompts, reprompts);
        assert_eq!(ask.speech(), Some("hi"));

        let tell = Reply::tell("bye");
        assert!(!tell.expect_user_response);
        assert!(tell.reprompts.is_empty());
    }

    #[test]
    fn test_rich_response_accessors() {
        let rich = RichResponse::new()
            .add_basic_card(BasicCard::new("body").with_button("Go", "https://x"))
            .add_simple_response("first")
            .add_simple_response("second")
            .add_suggestions(&["A", "B"]);

        assert_eq!(rich.first_speech(), Some("first"));
        assert_eq!(rich.card().unwrap().button.as_ref().unwrap().title, "Go");
        assert_eq!(rich.suggestions, vec!["A", "B"]);

        let reply = Reply::ask_rich(rich, &[]);
        assert_eq!(reply.primary_speech(), "first");
        assert!(reply.speech().is_none());
    }
}
