//! Structured logging for the guest portal.
//!
//! Text output for local runs, JSON (`LOG_JSON=1`) for log shippers. The
//! filter comes from `RUST_LOG` when set, otherwise from
//! [`DEFAULT_DIRECTIVES`].

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Every portal crate at `info`; raise `realtime` or `api` to `debug` to
/// follow individual streams. Hyper stays at `warn`.
pub const DEFAULT_DIRECTIVES: &str =
    "info,guest_portal=info,api=info,realtime=info,request_store=info,worker=info,hyper=warn,tower_http=info";

/// Tracing configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct TracingConfig {
    /// `EnvFilter` directives, e.g. `"info,realtime=debug"`.
    pub filter: String,
    pub json: bool,
    /// Log span open/close, useful when following one stream's lifetime.
    pub span_events: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_DIRECTIVES.to_string(),
            json: false,
            span_events: false,
        }
    }
}

impl TracingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    pub fn with_span_events(mut self, span_events: bool) -> Self {
        self.span_events = span_events;
        self
    }

    /// Reads `RUST_LOG`, `LOG_JSON` and `LOG_SPAN_EVENTS`.
    pub fn from_env() -> Self {
        let mut config = Self::new()
            .with_json(env_flag("LOG_JSON"))
            .with_span_events(env_flag("LOG_SPAN_EVENTS"));
        if let Ok(filter) = std::env::var("RUST_LOG") {
            if !filter.trim().is_empty() {
                config.filter = filter;
            }
        }
        config
    }

    /// The configured filter, or the portal defaults when it does not parse.
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_new(&self.filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES))
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name).map(|v| parse_flag(&v)).unwrap_or(false)
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

/// Installs the global subscriber. Later calls are ignored, so tests and
/// the binary can both call it.
pub fn init_tracing(config: TracingConfig) {
    let env_filter = config.env_filter();

    let span_events = if config.span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let installed = if config.json {
        let fmt_layer = fmt::layer()
            .json()
            .with_span_events(span_events)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .is_ok()
    } else {
        let fmt_layer = fmt::layer().with_span_events(span_events).with_target(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .is_ok()
    };

    if installed {
        tracing::info!(filter = %config.filter, json = config.json, "Tracing initialized");
    }
}

/// Initialize tracing from environment variables.
pub fn init_tracing_from_env() {
    init_tracing(TracingConfig::from_env());
}
