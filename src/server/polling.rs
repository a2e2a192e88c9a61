//! Long-polling transport, used when no public webhook URL is configured.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::commands::CommandHandler;
use crate::telegram::TelegramBot;

/// Server-side `getUpdates` timeout.
pub const POLL_TIMEOUT_SECS: u64 = 30;

/// Pause after a failed poll.
pub const RETRY_DELAY: Duration = Duration::from_secs(5);

/// Polls `getUpdates` and processes updates one at a time until `shutdown`
/// resolves.
pub async fn run_polling(
    bot: &TelegramBot,
    handler: &CommandHandler,
    timeout_secs: u64,
    shutdown: impl Future<Output = ()>,
) {
    tokio::pin!(shutdown);
    let mut offset: Option<i64> = None;
    info!("Long polling started");

    loop {
        let batch = tokio::select! {
            () = &mut shutdown => break,
            batch = bot.get_updates(offset, timeout_secs) => batch,
        };

        match batch {
            Ok(updates) => {
                if !updates.is_empty() {
                    debug!("Received {} updates", updates.len());
                }
                for update in updates {
                    offset = Some(update.update_id + 1);
                    handler.handle_update(update).await;
                }
            }
            Err(e) => {
                warn!("getUpdates failed: {}; retrying in {:?}", e, RETRY_DELAY);
                tokio::select! {
                    () = &mut shutdown => break,
                    () = tokio::time::sleep(RETRY_DELAY) => {}
                }
            }
        }
    }

    info!("Long polling stopped");
}
