//! Daily APOD broadcast scheduler module.
//!
//! Fires once a day at a fixed UTC time and delivers the Astronomy Picture
//! of the Day to every subscriber.

mod runner;
mod state;

pub use runner::{DailyBroadcaster, SchedulerMessage};
pub use state::{BroadcastReport, DailyTime, DailyTimeError};
