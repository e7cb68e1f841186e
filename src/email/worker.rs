use std::{sync::Arc, time::Duration};

use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::{job::EmailJob, queue::EmailQueue, sender::EmailSender};

const RETRY_AFTER_QUEUE_ERROR: Duration = Duration::from_secs(1);

#[derive(Debug, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    /// Payload was not a valid job and has been discarded.
    Dropped,
    /// SMTP failed; the message is consumed anyway.
    Failed,
}

pub async fn handle_delivery(sender: &dyn EmailSender, payload: &[u8]) -> Delivery {
    let job: EmailJob = match serde_json::from_slice(payload) {
        Ok(job) => job,
        Err(e) => {
            warn!(error = %e, "dropping undecodable email job");
            return Delivery::Dropped;
        }
    };
    match sender.send(&job).await {
        Ok(()) => {
            info!(to = %job.to, subject = %job.subject, "email sent");
            Delivery::Sent
        }
        Err(e) => {
            error!(error = %e, to = %job.to, "failed to send email");
            Delivery::Failed
        }
    }
}

/// Consumes the queue one message at a time until it is closed.
pub async fn run(queue: Arc<dyn EmailQueue>, sender: Arc<dyn EmailSender>) {
    info!("email worker started");
    loop {
        match queue.consume().await {
            Ok(Some(payload)) => {
                handle_delivery(sender.as_ref(), &payload).await;
            }
            Ok(None) => break,
            Err(e) => {
                error!(error = %e, "email queue consume failed");
                tokio::time::sleep(RETRY_AFTER_QUEUE_ERROR).await;
            }
        }
    }
    info!("email worker stopped");
}

pub fn spawn(queue: Arc<dyn EmailQueue>, sender: Arc<dyn EmailSender>) -> JoinHandle<()> {
    tokio::spawn(run(queue, sender))
}
