//! JSON-lines output: one object per event, written to stderr so stdout
//! stays reserved for command payloads.
//!
//! A line looks like
//! `{"ts":…,"level":"info","event":"reduce.finished","run_id":…,"stage":"reduce","message":…,"fields":{…}}`.
//! Context keys missing on the event are inherited from the nearest
//! enclosing span that recorded them.

use std::io::{self, Write};
use std::sync::Mutex;

use chrono::Utc;
use serde_json::{Map, Number, Value};
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

const CONTEXT_KEYS: [&str; 4] = ["run_id", "correlation_id", "host_id", "stage"];

/// Context values captured from a span's attributes.
struct SpanFields(Map<String, Value>);

#[derive(Default)]
struct Collector {
    message: Option<String>,
    fields: Map<String, Value>,
}

impl Collector {
    fn put(&mut self, field: &Field, value: Value) {
        self.fields.insert(field.name().to_string(), value);
    }

    /// Non-empty string value of a context key, removed from `fields`.
    fn take_context(&mut self, key: &str) -> Option<String> {
        match self.fields.remove(key) {
            Some(Value::String(s)) if !s.is_empty() => Some(s),
            _ => None,
        }
    }
}

impl Visit for Collector {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.put(field, Value::from(value));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.record_str(field, &format!("{:?}", value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.put(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.put(field, Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        // NaN and infinities have no JSON form.
        if let Some(n) = Number::from_f64(value) {
            self.put(field, Value::Number(n));
        }
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.put(field, Value::Bool(value));
    }
}

pub struct JsonlLayer<W = io::Stderr> {
    writer: Mutex<W>,
}

impl JsonlLayer<io::Stderr> {
    pub fn stderr() -> Self {
        JsonlLayer::new(io::stderr())
    }
}

impl<W: Write> JsonlLayer<W> {
    pub fn new(writer: W) -> Self {
        JsonlLayer {
            writer: Mutex::new(writer),
        }
    }
}

fn inherited<S>(ctx: &Context<'_, S>, event: &Event<'_>, key: &str) -> Option<String>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    ctx.event_scope(event)?.find_map(|span| {
        span.extensions()
            .get::<SpanFields>()
            .and_then(|fields| fields.0.get(key))
            .and_then(Value::as_str)
            .map(str::to_string)
    })
}

impl<S, W> Layer<S> for JsonlLayer<W>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: Write + 'static,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let mut collected = Collector::default();
        attrs.record(&mut collected);

        let mut kept = Map::new();
        for key in CONTEXT_KEYS {
            if let Some(value) = collected.take_context(key) {
                kept.insert(key.to_string(), Value::String(value));
            }
        }
        if let Some(span) = ctx.span(id) {
            span.extensions_mut().insert(SpanFields(kept));
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let meta = event.metadata();
        let mut collected = Collector::default();
        event.record(&mut collected);

        let mut line = Map::new();
        line.insert("ts".into(), Value::from(Utc::now().to_rfc3339()));
        line.insert(
            "level".into(),
            Value::from(meta.level().to_string().to_ascii_lowercase()),
        );
        line.insert("event".into(), Value::from(meta.target()));

        for key in CONTEXT_KEYS {
            let value = collected
                .take_context(key)
                .or_else(|| inherited(&ctx, event, key));
            if let Some(value) = value {
                line.insert(key.to_string(), Value::String(value));
            }
        }

        if let Some(message) = collected.message.take() {
            line.insert("message".into(), Value::String(message));
        }
        if !collected.fields.is_empty() {
            line.insert("fields".into(), Value::Object(collected.fields));
        }

        let Ok(rendered) = serde_json::to_string(&line) else {
            return;
        };
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", rendered);
        }
    }
}
