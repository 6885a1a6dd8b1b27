//! Observability for the Maileon client.
//!
//! The client emits `tracing` events under the `maileon` target. In debug mode
//! every exchange is logged with masked credentials and capped entities.

mod exchange;
mod logging;

pub use exchange::{
    log_request, log_response, render_entity, render_headers, MAX_LOGGED_ENTITY_BYTES,
    TRUNCATION_MARKER,
};
pub use logging::{LogFormat, LogLevel, LoggingConfig};
