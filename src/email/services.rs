use tracing::{info, warn};

use super::{job::EmailJob, queue::publish_job};
use crate::state::AppState;

/// Queues the confirmation mail. Failures are logged and never surface to the caller.
pub async fn send_confirmation(state: &AppState, to: &str, token: &str) {
    let job = EmailJob::confirmation(to, &state.config.public_base_url, token);
    match publish_job(state.email_queue.as_ref(), &job).await {
        Ok(()) => info!(to = %to, "confirmation email queued"),
        Err(e) => warn!(error = %e, to = %to, "could not queue confirmation email"),
    }
}
