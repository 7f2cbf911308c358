//! Strips conversational filler the model appends after its answer.

/// Phrases that mark the start of trailing filler, in priority order.
pub const FILLER_PHRASES: &[&str] = &[
    "Let me know when you're ready",
    "I'm here to help",
    "What do you say?",
    "Please respond",
];

/// Clean model output.
///
/// Walks [`FILLER_PHRASES`] in order. The first phrase found anywhere in the
/// text cuts it at that phrase's first occurrence; later list entries are
/// not consulted even if they occur earlier in the text. The result is
/// trimmed either way.
pub fn clean(text: &str) -> String {
    FILLER_PHRASES
        .iter()
        .find_map(|phrase| text.find(phrase))
        .map_or(text, |idx| &text[..idx])
        .trim()
        .to_owned()
}
