//! Outgoing message model, independent of the transport.

use super::types::InlineKeyboardMarkup;

/// Maximum caption length Telegram accepts on a photo.
pub const CAPTION_LIMIT: usize = 1024;

/// What a message carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Text(String),
    Photo { url: String, caption: String },
}

/// A message ready to be delivered to one chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outgoing {
    pub content: Content,
    /// Send with the legacy `Markdown` parse mode.
    pub markdown: bool,
    pub keyboard: Option<InlineKeyboardMarkup>,
}

impl Outgoing {
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: Content::Text(text.into()),
            markdown: false,
            keyboard: None,
        }
    }

    #[must_use]
    pub fn photo(url: impl Into<String>, caption: impl Into<String>) -> Self {
        Self {
            content: Content::Photo {
                url: url.into(),
                caption: caption.into(),
            },
            markdown: false,
            keyboard: None,
        }
    }

    #[must_use]
    pub fn markdown(mut self) -> Self {
        self.markdown = true;
        self
    }

    #[must_use]
    pub fn with_keyboard(mut self, keyboard: InlineKeyboardMarkup) -> Self {
        self.keyboard = Some(keyboard);
        self
    }

    /// The message text, or the caption of a photo.
    #[must_use]
    pub fn body(&self) -> &str {
        match &self.content {
            Content::Text(text) => text,
            Content::Photo { caption, .. } => caption,
        }
    }

    #[must_use]
    pub const fn is_photo(&self) -> bool {
        matches!(self.content, Content::Photo { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders() {
        let message = Outgoing::photo("https://x/y.jpg", "caption").markdown();
        assert!(message.is_photo());
        assert!(message.markdown);
        assert_eq!(message.body(), "caption");
        assert!(message.keyboard.is_none());

        let plain = Outgoing::text("hi");
        assert!(!plain.is_photo());
        assert!(!plain.markdown);
        assert_eq!(plain.body(), "hi");
    }
}
