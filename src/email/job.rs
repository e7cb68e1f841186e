use serde::{Deserialize, Serialize};

/// One outgoing message as it travels through the queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailJob {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl EmailJob {
    pub fn confirmation(to: &str, public_base_url: &str, token: &str) -> Self {
        let link = format!(
            "{}/confirm-email?token={}",
            public_base_url.trim_end_matches('/'),
            token
        );
        Self {
            to: to.to_string(),
            subject: "Confirm your email".to_string(),
            body: format!("Please confirm your email address by opening this link: {link}"),
        }
    }
}
