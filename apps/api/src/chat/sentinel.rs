/// Marker the interviewer appends to its final turn.
///
/// The marker travels inside the generated text, so it is only honoured at the
/// very end of a response (whitespace after it is tolerated). The same string
/// in the middle of a reply is left alone.
pub const END_OF_INTERVIEW: &str = "[[END_OF_INTERVIEW]]";

/// Splits a finished response into display text and whether it closed the flow.
/// Text before the marker is returned exactly as received.
pub fn strip_sentinel(text: &str) -> (&str, bool) {
    match text.trim_end().strip_suffix(END_OF_INTERVIEW) {
        Some(body) => (body, true),
        None => (text, false),
    }
}
