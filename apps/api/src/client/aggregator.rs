//! Turns a chunked text response into live and final text.
//!
//! Each aggregator owns one slot. A slot runs at most one aggregation at a
//! time; `is_loading` is what a UI disables its trigger buttons on. Clones
//! share the same slot state, so an observer can hold a clone while the owner
//! drives the request.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::chat::strip_sentinel;
use crate::client::error::StreamError;
use crate::client::source::ChunkSource;

/// The logical action a slot serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    CoverLetter,
    Interview,
    Test,
}

/// Final outcome of a successful aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregated {
    /// Concatenated chunks with a trailing end-of-interview marker removed.
    pub text: String,
    /// The response ended with the marker.
    pub closed_flow: bool,
}

struct SlotState {
    loading: AtomicBool,
    error: AtomicBool,
    live: watch::Sender<String>,
}

#[derive(Clone)]
pub struct StreamAggregator {
    slot: Slot,
    timeout: Duration,
    state: Arc<SlotState>,
}

/// Releases the slot when the aggregation ends, including when its future is dropped.
struct LoadingGuard<'a>(&'a AtomicBool);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl StreamAggregator {
    pub fn new(slot: Slot, timeout: Duration) -> Self {
        let (live, _) = watch::channel(String::new());
        Self {
            slot,
            timeout,
            state: Arc::new(SlotState {
                loading: AtomicBool::new(false),
                error: AtomicBool::new(false),
                live,
            }),
        }
    }

    pub fn slot(&self) -> Slot {
        self.slot
    }

    pub fn is_loading(&self) -> bool {
        self.state.loading.load(Ordering::Acquire)
    }

    pub fn is_error(&self) -> bool {
        self.state.error.load(Ordering::Acquire)
    }

    /// Text received so far by the current (or last successful) aggregation.
    pub fn live(&self) -> String {
        self.state.live.borrow().clone()
    }

    /// Receiver that observes every published buffer.
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.state.live.subscribe()
    }

    /// Flags a failure detected by the caller after a successful read,
    /// e.g. an unparseable payload.
    pub fn mark_error(&self) {
        self.state.error.store(true, Ordering::Release);
    }

    /// Clears live text and the error flag. Used when the owning flow resets.
    pub fn clear(&self) {
        self.state.error.store(false, Ordering::Release);
        self.state.live.send_replace(String::new());
    }

    fn acquire(&self) -> Result<LoadingGuard<'_>, StreamError> {
        self.state
            .loading
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| StreamError::SlotBusy(self.slot))?;
        Ok(LoadingGuard(&self.state.loading))
    }

    pub async fn run(
        &self,
        source: &dyn ChunkSource,
        endpoint: &str,
        body: &serde_json::Value,
    ) -> Result<Aggregated, StreamError> {
        self.run_observed(source, endpoint, body, |_| {}).await
    }

    /// Runs one aggregation, calling `observe` with the whole buffer after
    /// every chunk.
    pub async fn run_observed<F>(
        &self,
        source: &dyn ChunkSource,
        endpoint: &str,
        body: &serde_json::Value,
        mut observe: F,
    ) -> Result<Aggregated, StreamError>
    where
        F: FnMut(&str),
    {
        let _guard = self.acquire()?;
        self.clear();

        let result = match tokio::time::timeout(
            self.timeout,
            self.read_all(source, endpoint, body, &mut observe),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(StreamError::Timeout(self.timeout)),
        };

        match result {
            Ok(text) => {
                let (body, closed_flow) = strip_sentinel(&text);
                debug!(
                    "{:?} stream finished: {} bytes, closed_flow={}",
                    self.slot,
                    body.len(),
                    closed_flow
                );
                Ok(Aggregated {
                    text: body.to_string(),
                    closed_flow,
                })
            }
            Err(e) => {
                warn!("{:?} stream failed: {e}", self.slot);
                self.state.error.store(true, Ordering::Release);
                self.state.live.send_replace(String::new());
                Err(e)
            }
        }
    }

    async fn read_all<F>(
        &self,
        source: &dyn ChunkSource,
        endpoint: &str,
        body: &serde_json::Value,
        observe: &mut F,
    ) -> Result<String, StreamError>
    where
        F: FnMut(&str),
    {
        let mut chunks = source.open(endpoint, body).await?;
        let mut buffer = String::new();
        let mut carry = Utf8Carry::default();

        while let Some(chunk) = chunks.next().await {
            let chunk = chunk?;
            carry.decode(&chunk, &mut buffer);
            self.state.live.send_replace(buffer.clone());
            observe(&buffer);
        }
        if carry.finish(&mut buffer) {
            self.state.live.send_replace(buffer.clone());
            observe(&buffer);
        }

        Ok(buffer)
    }
}

/// Incremental UTF-8 decoding: a character split across two chunks is held
/// back until its remaining bytes arrive. Invalid bytes become U+FFFD.
#[derive(Debug, Default)]
struct Utf8Carry {
    pending: Vec<u8>,
}

impl Utf8Carry {
    fn decode(&mut self, bytes: &[u8], out: &mut String) {
        self.pending.extend_from_slice(bytes);
        loop {
            let (valid, invalid_len) = match std::str::from_utf8(&self.pending) {
                Ok(_) => (self.pending.len(), None),
                Err(e) => (e.valid_up_to(), e.error_len()),
            };
            out.push_str(&String::from_utf8_lossy(&self.pending[..valid]));
            match invalid_len {
                Some(len) => {
                    out.push(char::REPLACEMENT_CHARACTER);
                    self.pending.drain(..valid + len);
                }
                None => {
                    // incomplete tail (or nothing) stays for the next chunk
                    self.pending.drain(..valid);
                    return;
                }
            }
        }
    }

    /// Flushes a truncated trailing character. Returns true if anything was written.
    fn finish(&mut self, out: &mut String) -> bool {
        if self.pending.is_empty() {
            return false;
        }
        out.push(char::REPLACEMENT_CHARACTER);
        self.pending.clear();
        true
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use bytes::Bytes;
    use futures::stream;

    use super::*;
    use crate::chat::END_OF_INTERVIEW;
    use crate::client::source::ChunkStream;

    /// Plays back one scripted response per `open` call and records request bodies.
    pub(crate) struct ScriptedSource {
        responses: Mutex<Vec<Result<Vec<Result<Vec<u8>, ()>>, StreamError>>>,
        pub(crate) requests: Mutex<Vec<(String, serde_json::Value)>>,
    }

    impl ScriptedSource {
        pub(crate) fn new() -> Self {
            Self {
                responses: Mutex::new(Vec::new()),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn reply(self, chunks: &[&str]) -> Self {
            let chunks = chunks.iter().map(|c| Ok(c.as_bytes().to_vec())).collect();
            self.responses.lock().unwrap().push(Ok(chunks));
            self
        }

        pub(crate) fn reply_bytes(self, chunks: Vec<Vec<u8>>) -> Self {
            self.responses
                .lock()
                .unwrap()
                .push(Ok(chunks.into_iter().map(Ok).collect()));
            self
        }

        /// A response that yields `chunks` and then fails mid-body.
        pub(crate) fn reply_then_break(self, chunks: &[&str]) -> Self {
            let mut items: Vec<Result<Vec<u8>, ()>> =
                chunks.iter().map(|c| Ok(c.as_bytes().to_vec())).collect();
            items.push(Err(()));
            self.responses.lock().unwrap().push(Ok(items));
            self
        }

        pub(crate) fn fail(self, status: u16) -> Self {
            self.responses
                .lock()
                .unwrap()
                .push(Err(StreamError::Http { status }));
            self
        }

        pub(crate) fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        pub(crate) fn last_request(&self) -> (String, serde_json::Value) {
            self.requests.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl ChunkSource for ScriptedSource {
        async fn open(&self, endpoint: &str, body: &serde_json::Value) -> Result<ChunkStream, StreamError> {
            self.requests
                .lock()
                .unwrap()
                .push((endpoint.to_string(), body.clone()));
            let mut responses = self.responses.lock().unwrap();
            assert!(!responses.is_empty(), "unexpected request to {endpoint}");
            let chunks = responses.remove(0)?;
            let items: Vec<Result<Bytes, StreamError>> = chunks
                .into_iter()
                .map(|c| {
                    c.map(Bytes::from)
                        .map_err(|_| StreamError::Transport("connection reset".into()))
                })
                .collect();
            Ok(Box::pin(stream::iter(items)))
        }
    }

    /// Never produces a chunk.
    struct HangingSource;

    #[async_trait]
    impl ChunkSource for HangingSource {
        async fn open(&self, _endpoint: &str, _body: &serde_json::Value) -> Result<ChunkStream, StreamError> {
            Ok(Box::pin(stream::pending()))
        }
    }

    fn aggregator() -> StreamAggregator {
        StreamAggregator::new(Slot::Interview, Duration::from_secs(30))
    }

    fn body() -> serde_json::Value {
        serde_json::json!({})
    }

    #[tokio::test]
    async fn test_live_values_are_prefix_concatenations() {
        let source = ScriptedSource::new().reply(&["Hello ", "world", END_OF_INTERVIEW]);
        let agg = aggregator();
        let mut seen = Vec::new();

        let result = agg
            .run_observed(&source, "/api/interview", &body(), |live| {
                seen.push(live.to_string())
            })
            .await
            .unwrap();

        assert_eq!(
            seen,
            vec![
                "Hello ".to_string(),
                "Hello world".to_string(),
                format!("Hello world{END_OF_INTERVIEW}"),
            ]
        );
        assert_eq!(result.text, "Hello world");
        assert!(result.closed_flow);
        assert!(!agg.is_loading());
        assert!(!agg.is_error());
    }

    #[tokio::test]
    async fn test_whitespace_before_sentinel_is_kept() {
        let source = ScriptedSource::new().reply(&["Hello ", END_OF_INTERVIEW]);
        let result = aggregator().run(&source, "/api/interview", &body()).await.unwrap();
        assert_eq!(result.text, "Hello ");
        assert!(result.closed_flow);
    }

    #[tokio::test]
    async fn test_final_text_without_sentinel_is_full_concatenation() {
        let source = ScriptedSource::new().reply(&["a", "b ", "c "]);
        let result = aggregator().run(&source, "/x", &body()).await.unwrap();
        assert_eq!(result.text, "ab c ");
        assert!(!result.closed_flow);
    }

    #[tokio::test]
    async fn test_http_failure_sets_error_and_keeps_live_empty() {
        let source = ScriptedSource::new().fail(500);
        let agg = aggregator();
        let err = agg.run(&source, "/x", &body()).await.unwrap_err();
        assert!(matches!(err, StreamError::Http { status: 500 }));
        assert!(agg.is_error());
        assert_eq!(agg.live(), "");
        assert!(!agg.is_loading());
    }

    #[tokio::test]
    async fn test_mid_stream_failure_discards_partial_text() {
        let source = ScriptedSource::new().reply_then_break(&["partial"]);
        let agg = aggregator();
        assert!(agg.run(&source, "/x", &body()).await.is_err());
        assert!(agg.is_error());
        assert_eq!(agg.live(), "");
    }

    #[tokio::test]
    async fn test_each_run_starts_from_empty_state() {
        let source = ScriptedSource::new().fail(502).reply(&["second"]);
        let agg = aggregator();
        assert!(agg.run(&source, "/x", &body()).await.is_err());
        let result = agg.run(&source, "/x", &body()).await.unwrap();
        assert_eq!(result.text, "second");
        assert_eq!(agg.live(), "second");
        assert!(!agg.is_error());
    }

    #[tokio::test]
    async fn test_split_multibyte_character_is_reassembled() {
        let bytes = "héllo".as_bytes().to_vec();
        let source = ScriptedSource::new().reply_bytes(vec![bytes[..2].to_vec(), bytes[2..].to_vec()]);
        let mut seen = Vec::new();
        let result = aggregator()
            .run_observed(&source, "/x", &body(), |live| seen.push(live.to_string()))
            .await
            .unwrap();
        assert_eq!(seen, vec!["h".to_string(), "héllo".to_string()]);
        assert_eq!(result.text, "héllo");
    }

    #[tokio::test]
    async fn test_busy_slot_rejects_second_run() {
        let agg = aggregator();
        let observer = agg.clone();
        let _held = agg.acquire().unwrap();
        assert!(observer.is_loading());

        let source = ScriptedSource::new().reply(&["x"]);
        let err = observer.run(&source, "/x", &body()).await.unwrap_err();
        assert!(matches!(err, StreamError::SlotBusy(Slot::Interview)));
        assert_eq!(source.request_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_stream_times_out() {
        let agg = StreamAggregator::new(Slot::Test, Duration::from_secs(60));
        let err = agg.run(&HangingSource, "/x", &body()).await.unwrap_err();
        assert!(matches!(err, StreamError::Timeout(_)));
        assert!(agg.is_error());
        assert!(!agg.is_loading());
    }

    #[tokio::test]
    async fn test_subscriber_sees_final_buffer() {
        let agg = aggregator();
        let rx = agg.subscribe();
        let source = ScriptedSource::new().reply(&["one ", "two"]);
        agg.run(&source, "/x", &body()).await.unwrap();
        assert_eq!(*rx.borrow(), "one two");
    }

    #[test]
    fn test_utf8_carry_replaces_invalid_bytes() {
        let mut carry = Utf8Carry::default();
        let mut out = String::new();
        carry.decode(&[b'a', 0xFF, b'b'], &mut out);
        assert_eq!(out, "a\u{FFFD}b");

        carry.decode(&[0xE2, 0x82], &mut out);
        assert_eq!(out, "a\u{FFFD}b");
        assert!(carry.finish(&mut out));
        assert_eq!(out, "a\u{FFFD}b\u{FFFD}");
    }
}
