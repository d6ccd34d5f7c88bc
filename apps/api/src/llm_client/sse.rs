//! Incremental decoder for the OpenAI chat-completions SSE stream.
//!
//! Network chunks do not align with SSE lines, so bytes are buffered until a
//! full line is available.

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseEvent {
    /// A piece of generated text.
    Delta(String),
    /// A choice finished; carries the finish reason ("stop", "length", ...).
    Finished(String),
    /// `data: [DONE]`
    Done,
    Malformed(String),
}

#[derive(Deserialize)]
struct StreamChunk {
    choices: Vec<StreamChoice>,
}

#[derive(Deserialize)]
struct StreamChoice {
    delta: Delta,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct Delta {
    content: Option<String>,
}

#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    pub fn push(&mut self, bytes: &[u8]) -> Vec<SseEvent> {
        self.buffer.extend_from_slice(bytes);
        let mut events = Vec::new();

        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line);
            let line = line.trim_end_matches(|c| c == '\r' || c == '\n');
            parse_line(line, &mut events);
        }

        events
    }
}

fn parse_line(line: &str, events: &mut Vec<SseEvent>) {
    let Some(data) = line.strip_prefix("data:") else {
        // comments, event names and blank separators
        return;
    };
    let data = data.trim_start();
    if data == "[DONE]" {
        events.push(SseEvent::Done);
        return;
    }
    match serde_json::from_str::<StreamChunk>(data) {
        Ok(chunk) => {
            for choice in chunk.choices {
                if let Some(content) = choice.delta.content.filter(|c| !c.is_empty()) {
                    events.push(SseEvent::Delta(content));
                }
                if let Some(reason) = choice.finish_reason {
                    events.push(SseEvent::Finished(reason));
                }
            }
        }
        Err(_) => events.push(SseEvent::Malformed(data.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delta_line(text: &str) -> String {
        format!(
            "data: {{\"choices\":[{{\"delta\":{{\"content\":{}}},\"finish_reason\":null}}]}}\n\n",
            serde_json::to_string(text).unwrap()
        )
    }

    #[test]
    fn test_decodes_deltas_and_done() {
        let mut decoder = SseDecoder::default();
        let input = format!("{}{}data: [DONE]\n\n", delta_line("Hel"), delta_line("lo"));
        let events = decoder.push(input.as_bytes());
        assert_eq!(
            events,
            vec![
                SseEvent::Delta("Hel".into()),
                SseEvent::Delta("lo".into()),
                SseEvent::Done
            ]
        );
    }

    #[test]
    fn test_line_split_across_chunks() {
        let mut decoder = SseDecoder::default();
        let line = delta_line("split");
        let (a, b) = line.split_at(17);
        assert!(decoder.push(a.as_bytes()).is_empty());
        assert_eq!(decoder.push(b.as_bytes()), vec![SseEvent::Delta("split".into())]);
    }

    #[test]
    fn test_finish_reason_reported() {
        let mut decoder = SseDecoder::default();
        let events = decoder
            .push(b"data: {\"choices\":[{\"delta\":{},\"finish_reason\":\"length\"}]}\r\n");
        assert_eq!(events, vec![SseEvent::Finished("length".into())]);
    }

    #[test]
    fn test_malformed_and_comment_lines() {
        let mut decoder = SseDecoder::default();
        let events = decoder.push(b": keep-alive\ndata: {not json}\n");
        assert_eq!(events, vec![SseEvent::Malformed("{not json}".into())]);
    }
}
