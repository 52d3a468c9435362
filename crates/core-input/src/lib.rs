//! Blocking byte input and the key decoder built on top of it.

mod decoder;
pub use decoder::{DecodeState, KeyDecoder};

use anyhow::{Result, bail};
use std::io::{ErrorKind, Read};

/// Blocking source of raw input bytes.
pub trait ByteSource {
    /// Wait for the next byte. There is no timeout.
    fn read_byte(&mut self) -> Result<u8>;
}

/// `ByteSource` over any reader (stdin in raw mode for the editor).
#[derive(Debug)]
pub struct ReadSource<R> {
    inner: R,
}

impl<R: Read> ReadSource<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

impl<R: Read> ByteSource for ReadSource<R> {
    fn read_byte(&mut self) -> Result<u8> {
        let mut buf = [0u8; 1];
        loop {
            match self.inner.read(&mut buf) {
                Ok(0) => bail!("input closed"),
                Ok(_) => return Ok(buf[0]),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_events::Key;
    use std::fmt;
    use std::io::Cursor;
    use std::sync::{Arc, Mutex};
    use tracing::Subscriber;
    use tracing::dispatcher::Dispatch;
    use tracing::field::{Field, Visit};
    use tracing_subscriber::layer::Context;
    use tracing_subscriber::layer::Layer;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::registry::Registry;

    #[derive(Clone, Default)]
    struct Capture {
        events: Arc<Mutex<Vec<CapturedEvent>>>,
    }

    #[derive(Clone, Debug)]
    struct CapturedEvent {
        target: String,
        fields: Vec<(String, String)>,
    }

    #[derive(Default)]
    struct FieldCollector {
        fields: Vec<(String, String)>,
    }

    impl Visit for FieldCollector {
        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            self.fields
                .push((field.name().to_string(), format!("{:?}", value)));
        }
    }

    impl<S> Layer<S> for Capture
    where
        S: Subscriber,
    {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            let mut collector = FieldCollector::default();
            event.record(&mut collector);
            let meta = event.metadata();
            self.events.lock().unwrap().push(CapturedEvent {
                target: meta.target().to_string(),
                fields: collector.fields,
            });
        }
    }

    #[test]
    fn next_key_blocks_until_sequence_completes() {
        let mut source = ReadSource::new(Cursor::new(b"\x1b[Z\x1b[5~x".to_vec()));
        let mut decoder = KeyDecoder::new();
        assert_eq!(decoder.next_key(&mut source).unwrap(), Key::PageUp);
        assert_eq!(decoder.next_key(&mut source).unwrap(), Key::Char(b'x'));
    }

    #[test]
    fn end_of_input_is_an_error() {
        let mut source = ReadSource::new(Cursor::new(b"\x1b[".to_vec()));
        let mut decoder = KeyDecoder::new();
        let err = decoder.next_key(&mut source).unwrap_err();
        assert!(err.to_string().contains("input closed"));
    }

    #[test]
    fn discarded_sequence_is_traced() {
        let capture = Capture::default();
        let events = capture.events.clone();
        let subscriber = Registry::default().with(capture);
        let dispatch = Dispatch::new(subscriber);

        tracing::dispatcher::with_default(&dispatch, || {
            let mut decoder = KeyDecoder::new();
            for &b in b"\x1b[Q" {
                assert!(decoder.feed(b).is_none());
            }
        });

        let events = events.lock().unwrap();
        let event = events
            .iter()
            .find(|e| e.target == "input.decode")
            .expect("missing input.decode event");
        assert!(
            event
                .fields
                .iter()
                .any(|(name, value)| name == "state" && value.contains("Bracket")),
            "state field missing from event: {event:?}"
        );
    }
}
