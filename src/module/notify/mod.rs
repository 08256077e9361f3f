///! Notification composition and dispatch
///!
///! ## Components
///! - `Notification`: structured message model (title, link, fields, footer)
///! - `WebhookSink`: HTTP dispatch to one preconfigured webhook destination
///! - `RateLimiter`: token bucket pacing dispatches to the sink's limit

// ============ Message Model & Composition ============
mod message;
pub use message::{
    compose_daily_rollup, compose_pass_notification, Notification, NotificationField, PASS_COLOR,
};

// ============ Webhook Sink ============
mod sink;
pub use sink::{embed_json, NotifySink, SinkError, WebhookSink};

// ============ Rate Limiting ============
mod limiter;
pub use limiter::RateLimiter;
