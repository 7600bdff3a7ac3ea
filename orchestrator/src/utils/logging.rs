use chrono::Utc;
use serde_json::{Map, Value};
use tracing::{
    field::{Field, Visit},
    Event, Level, Subscriber,
};
use tracing_error::ErrorLayer;
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::fmt::{format::Writer, FormatEvent, FormatFields};
use tracing_subscriber::layer::Context;
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

/// Span fields kept in the JSON output but left out of the pretty span summary
const FIELDS_TO_SKIP: &[&str] = &["request_id", "span_type"];

/// Span field holding the job category shown in the category column
const CATEGORY_FIELD: &str = "category";

/// Typed field values of one event or span, with the `message` field split out
#[derive(Default)]
struct ValueVisitor {
    message: Option<String>,
    values: Map<String, Value>,
}

impl ValueVisitor {
    fn insert(&mut self, field: &Field, value: Value) {
        match (field.name(), value) {
            ("message", Value::String(message)) => self.message = Some(message),
            (name, value) => {
                self.values.insert(name.to_string(), value);
            }
        }
    }
}

impl Visit for ValueVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.insert(field, Value::String(format!("{:?}", value).trim_matches('"').to_string()));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, Value::String(value.to_string()));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.insert(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, Value::from(value));
    }
}

/// Fields recorded on a span so far, stored in the span's extensions
#[derive(Debug, Clone, Default)]
pub struct SpanFields {
    values: Map<String, Value>,
}

impl SpanFields {
    fn get_str(&self, name: &str) -> Option<String> {
        match self.values.get(name)? {
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// `name=value` pairs for the pretty output, without the skipped fields
    pub fn display(&self) -> String {
        self.values
            .iter()
            .filter(|(name, _)| !FIELDS_TO_SKIP.contains(&name.as_str()))
            .map(|(name, value)| match value {
                Value::String(s) => format!("{}={}", name, s),
                other => format!("{}={}", name, other),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Keeps the fields of every span in its extensions so the formatters can print them
pub struct FieldCollectorLayer;

impl<S> Layer<S> for FieldCollectorLayer
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
{
    fn on_new_span(&self, attrs: &tracing::span::Attributes<'_>, id: &tracing::span::Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else { return };

        let mut visitor = ValueVisitor::default();
        attrs.record(&mut visitor);
        span.extensions_mut().insert(SpanFields { values: visitor.values });
    }

    fn on_record(&self, id: &tracing::span::Id, values: &tracing::span::Record<'_>, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else { return };

        let mut visitor = ValueVisitor::default();
        values.record(&mut visitor);
        let mut extensions = span.extensions_mut();
        match extensions.get_mut::<SpanFields>() {
            Some(fields) => fields.values.extend(visitor.values),
            None => extensions.insert(SpanFields { values: visitor.values }),
        }
    }
}

/// Category of the innermost span carrying one, walking outwards
fn current_category<S, N>(ctx: &FmtContext<'_, S, N>) -> Option<String>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    let span = ctx.lookup_current()?;
    for span in span.scope() {
        if let Some(category) = span.extensions().get::<SpanFields>().and_then(|f| f.get_str(CATEGORY_FIELD)) {
            return Some(category);
        }
    }
    None
}

// Pretty formatter is formatted for console readability
pub struct PrettyFormatter;

impl<S, N> FormatEvent<S, N> for PrettyFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(&self, ctx: &FmtContext<'_, S, N>, mut writer: Writer<'_>, event: &Event<'_>) -> std::fmt::Result {
        let meta = event.metadata();
        let now = Utc::now().format("%y-%m-%d %H:%M:%S").to_string();

        let ts_color = "\x1b[96m"; // Bright Cyan
        let level_color = match *meta.level() {
            Level::TRACE => "\x1b[90m",
            Level::DEBUG => "\x1b[34m",
            Level::INFO => "\x1b[32m",
            Level::WARN => "\x1b[33m",
            Level::ERROR => "\x1b[31m",
        };
        let msg_color = "\x1b[97m"; // Bright White
        let column_color = "\x1b[92m"; // Bright Green
        let reset = "\x1b[0m";
        let dim_color = "\x1b[90m";

        let mut visitor = FieldExtractor::default();
        event.record(&mut visitor);

        // The event's own category wins over the one inherited from its spans
        let category = visitor.category.take().or_else(|| current_category(ctx));
        let category = category_column(category.as_deref());

        // Timestamp | Level (5) | Category (13) | Component (8) | Message and fields
        write!(writer, "{}{}{} ", ts_color, now, reset)?;
        write!(writer, "{}|{} ", dim_color, reset)?;
        write!(writer, "{}{:<5}{} ", level_color, *meta.level(), reset)?;
        write!(writer, "{}|{} ", dim_color, reset)?;
        write!(writer, "{}{:<13}{} ", column_color, category, reset)?;
        write!(writer, "{}|{} ", dim_color, reset)?;
        write!(writer, "{}{:<8}{} ", column_color, extract_component_name(meta.target()), reset)?;
        write!(writer, "{}|{} ", dim_color, reset)?;

        write!(writer, "{}{}{}", msg_color, visitor.message, reset)?;

        if !visitor.meta.is_empty() || !visitor.fields.is_empty() {
            let joined = [visitor.meta, visitor.fields].into_iter().filter(|s| !s.is_empty()).collect::<Vec<_>>();
            write!(writer, " ({}{}{})", msg_color, joined.join(", "), reset)?;
        }

        if let Some(span) = ctx.lookup_current() {
            let summary = span.extensions().get::<SpanFields>().map(SpanFields::display).unwrap_or_default();
            if !summary.is_empty() {
                write!(writer, " {}[{}: {}]{}", dim_color, span.metadata().name(), summary, reset)?;
            }
        }

        writeln!(writer)
    }
}

// Visitor to extract message and format fields
#[derive(Default)]
struct FieldExtractor {
    message: String,
    category: Option<String>,
    fields: String,
    meta: String,
}

impl tracing::field::Visit for FieldExtractor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        let fixed_field_color = "\x1b[90m"; // Dark Grey
        let reset = "\x1b[0m";
        let formatted_value = format!("{:?}", value).trim_matches('"').to_string();

        match field.name() {
            "message" => self.message = formatted_value,
            CATEGORY_FIELD => self.category = Some(formatted_value),
            name => {
                let formatted_field = format!("{}{}={}{}", fixed_field_color, name, formatted_value, reset);
                // Ids go first
                let target = if name == "job_id" || name == "id" { &mut self.meta } else { &mut self.fields };
                if !target.is_empty() {
                    target.push_str(", ");
                }
                target.push_str(&formatted_field);
            }
        }
    }
}

// JSON formatter for structured logs suitable for log aggregation
pub struct JsonEventFormatter;

impl<S, N> FormatEvent<S, N> for JsonEventFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(&self, ctx: &FmtContext<'_, S, N>, mut writer: Writer<'_>, event: &Event<'_>) -> std::fmt::Result {
        let meta = event.metadata();
        let ts = Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);

        let mut visitor = ValueVisitor::default();
        event.record(&mut visitor);

        let mut root = Map::new();
        root.insert("timestamp".to_string(), Value::String(ts));
        root.insert("level".to_string(), Value::String(meta.level().to_string()));
        root.insert("target".to_string(), Value::String(meta.target().to_string()));
        root.insert("component".to_string(), Value::String(extract_component_name(meta.target()).to_string()));
        if let Some(file) = meta.file() {
            root.insert("filename".to_string(), Value::String(file.to_string()));
        }
        if let Some(line) = meta.line() {
            root.insert("line_number".to_string(), Value::from(line));
        }
        if let Some(message) = visitor.message.take() {
            root.insert("message".to_string(), Value::String(message));
        }

        // Span fields first so that event fields win on name clashes
        let mut all_fields = Map::new();
        if let Some(span) = ctx.lookup_current() {
            all_fields.insert("span_name".to_string(), Value::String(span.metadata().name().to_string()));
            for scoped in span.scope().from_root() {
                if let Some(fields) = scoped.extensions().get::<SpanFields>() {
                    all_fields.extend(fields.values.clone());
                }
            }
        }
        all_fields.extend(visitor.values);

        if !all_fields.is_empty() {
            root.insert("fields".to_string(), Value::Object(all_fields));
        }

        let line = serde_json::to_string(&Value::Object(root)).map_err(|_| std::fmt::Error)?;
        writeln!(writer, "{}", line)
    }
}

/// Initialize the tracing subscriber with
/// - PrettyFormatter for console readability (when LOG_FORMAT != "json")
/// - JsonEventFormatter for json logging (when LOG_FORMAT = "json")
///
/// This will also install color_eyre to handle the panic in the application
pub fn init_logging() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::builder()
            .with_default_directive(Level::INFO.into())
            .parse("scribe_orchestrator=info,orchestrator=info")?,
    };

    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let fmt_layer = fmt::layer().with_target(true).with_thread_ids(false).with_file(true).with_line_number(true);
    let fmt_layer = if log_format == "json" {
        fmt_layer.event_format(JsonEventFormatter).boxed()
    } else {
        fmt_layer.event_format(PrettyFormatter).boxed()
    };

    let subscriber =
        Registry::default().with(env_filter).with(FieldCollectorLayer).with(fmt_layer).with(ErrorLayer::default());
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Short display name of the component that emitted an event
fn extract_component_name(target: &str) -> &'static str {
    if target.starts_with("scribe_orchestrator::server") {
        "HTTP"
    } else if target.starts_with("scribe_orchestrator::worker") {
        "WORKER"
    } else if target.starts_with("scribe_orchestrator::monitor") {
        "MONITOR"
    } else if target.starts_with("scribe_orchestrator") {
        "-"
    } else if target.starts_with("redis") || target.starts_with("deadpool") {
        "STORE"
    } else {
        "EXTERNAL"
    }
}

/// Value shown in the category column of the pretty output
pub fn category_column(category: Option<&str>) -> String {
    match category {
        Some(category) if !category.is_empty() => category.to_uppercase(),
        _ => "-".to_string(),
    }
}
