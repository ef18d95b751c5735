//! tracing-subscriber layer feeding [`LogSinks`]

use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

use crate::record::LogRecord;
use crate::sinks::LogSinks;

/// Layer converting every enabled event into a [`LogRecord`]
pub struct SinkLayer {
    sinks: LogSinks,
}

impl SinkLayer {
    pub fn new(sinks: LogSinks) -> Self {
        Self { sinks }
    }
}

impl<S: Subscriber> Layer<S> for SinkLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        self.sinks.dispatch(&LogRecord::from_event(event));
    }
}
