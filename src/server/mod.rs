//! Inbound update transports: webhook server and long polling.

mod polling;
mod webhook;

pub use polling::{POLL_TIMEOUT_SECS, RETRY_DELAY, run_polling};
pub use webhook::{HEALTH_BODY, router, serve};
