use crate::attachment::Attachment;
use crate::model::OutgoingMessage;

/// Glyphs offered by the emoji palette, in display order.
pub const EMOJI_PALETTE: [&str; 10] = ["😊", "👍", "❤️", "🎉", "🔥", "😂", "🙏", "✨", "🤔", "👀"];

/// Draft state behind the message input.
///
/// A send dispatches exactly one payload: the staged file wins over a staged emoji,
/// which wins over typed text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Composer {
    draft: String,
    staged_emoji: Option<String>,
    staged_attachment: Option<Attachment>,
}

impl Composer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn staged_emoji(&self) -> Option<&str> {
        self.staged_emoji.as_deref()
    }

    pub fn staged_attachment(&self) -> Option<&Attachment> {
        self.staged_attachment.as_ref()
    }

    /// Mirrors the input field's value.
    pub fn set_draft(&mut self, draft: impl Into<String>) {
        self.draft = draft.into();
    }

    /// Appends the glyph to the draft and stages it as the emoji candidate.
    pub fn pick_emoji(&mut self, glyph: &str) {
        self.draft.push_str(glyph);
        self.staged_emoji = Some(glyph.to_string());
    }

    /// Stages a single file, replacing any earlier one.
    pub fn stage_attachment(&mut self, attachment: Attachment) {
        self.staged_attachment = Some(attachment);
    }

    pub fn remove_attachment(&mut self) -> Option<Attachment> {
        self.staged_attachment.take()
    }

    pub fn can_send(&self) -> bool {
        !self.draft.is_empty() || self.staged_emoji.is_some() || self.staged_attachment.is_some()
    }

    /// Takes the payload to dispatch and resets the composer.
    ///
    /// Returns `None` when only whitespace was typed and nothing is staged; the draft is
    /// left untouched in that case.
    pub fn take_outgoing(&mut self) -> Option<OutgoingMessage> {
        let outgoing = if let Some(attachment) = &self.staged_attachment {
            OutgoingMessage::attachment(attachment)
        } else if let Some(glyph) = &self.staged_emoji {
            OutgoingMessage::emoji(glyph.clone())
        } else if !self.draft.trim().is_empty() {
            OutgoingMessage::text(self.draft.clone())
        } else {
            return None;
        };

        self.clear();
        Some(outgoing)
    }

    pub fn clear(&mut self) {
        self.draft.clear();
        self.staged_emoji = None;
        self.staged_attachment = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MessageKind;

    fn photo() -> Attachment {
        Attachment::new("cat.png", "/tmp/cat.png", "image/png")
    }

    #[test]
    fn staged_file_wins_over_emoji_and_text() {
        let mut composer = Composer::new();
        composer.set_draft("look at this ");
        composer.pick_emoji("🔥");
        composer.stage_attachment(photo());

        let outgoing = composer.take_outgoing().expect("file is dispatched");
        assert_eq!(outgoing.kind, MessageKind::Image);
        assert_eq!(outgoing.content, "cat.png");
        assert_eq!(outgoing.file_url.as_deref(), Some("/tmp/cat.png"));
        assert_eq!(composer, Composer::new());
    }

    #[test]
    fn staged_emoji_wins_over_text() {
        let mut composer = Composer::new();
        composer.set_draft("nice ");
        composer.pick_emoji("👍");
        assert_eq!(composer.draft(), "nice 👍");

        let outgoing = composer.take_outgoing().expect("emoji is dispatched");
        assert_eq!(outgoing, OutgoingMessage::emoji("👍"));
        assert!(!composer.can_send());
        assert_eq!(composer.draft(), "");
    }

    #[test]
    fn text_is_sent_as_typed() {
        let mut composer = Composer::new();
        composer.set_draft("  hello  ");
        assert_eq!(
            composer.take_outgoing(),
            Some(OutgoingMessage::text("  hello  "))
        );
    }

    #[test]
    fn blank_drafts_are_not_dispatched() {
        let mut composer = Composer::new();
        assert!(!composer.can_send());
        assert_eq!(composer.take_outgoing(), None);

        composer.set_draft("   ");
        // The send button reflects the raw draft; dispatch still refuses blank text.
        assert!(composer.can_send());
        assert_eq!(composer.take_outgoing(), None);
        assert_eq!(composer.draft(), "   ");
    }

    #[test]
    fn removing_the_staged_file_falls_back_to_text() {
        let mut composer = Composer::new();
        composer.set_draft("hi");
        composer.stage_attachment(photo());
        assert_eq!(composer.remove_attachment(), Some(photo()));

        assert_eq!(composer.take_outgoing(), Some(OutgoingMessage::text("hi")));
    }

    #[test]
    fn palette_has_ten_distinct_glyphs() {
        let mut glyphs = EMOJI_PALETTE.to_vec();
        glyphs.sort_unstable();
        glyphs.dedup();
        assert_eq!(glyphs.len(), 10);
    }
}
