use sigrelay_common::types::Mention;

/// Remove the `[start, start + length)` span from `body`.
///
/// Offsets count UTF-16 code units. A character that begins inside the span
/// is removed whole.
pub fn remove_span(body: &str, start: usize, length: usize) -> String {
    let end = start.saturating_add(length);
    let mut offset = 0usize;
    let mut out = String::with_capacity(body.len());
    for ch in body.chars() {
        if offset < start || offset >= end {
            out.push(ch);
        }
        offset += ch.len_utf16();
    }
    out
}

/// The command text of a message: its body without the bot's mention,
/// trimmed.
pub fn command_text(body: &str, mention: &Mention) -> String {
    remove_span(body, mention.start, mention.length)
        .trim()
        .to_string()
}
