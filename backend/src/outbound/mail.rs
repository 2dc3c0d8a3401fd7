//! Mail adapters for the reset password flow.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::domain::ports::{MailDeliveryError, MailSender, ResetPasswordMail};

/// Mail adapter that records deliveries in the structured log instead of
/// speaking SMTP. Used when no relay is configured; the reset link stays
/// out of the log line.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingMailSender;

#[async_trait]
impl MailSender for TracingMailSender {
    async fn send_reset_password(
        &self,
        mail: &ResetPasswordMail,
    ) -> Result<(), MailDeliveryError> {
        tracing::info!(recipient = %mail.recipient, "reset password mail dispatched");
        Ok(())
    }
}

/// Mail adapter that captures messages for assertions.
#[derive(Debug, Default)]
pub struct RecordingMailSender {
    sent: Mutex<Vec<ResetPasswordMail>>,
}

impl RecordingMailSender {
    /// Messages handed to the adapter so far, oldest first.
    pub fn sent(&self) -> Vec<ResetPasswordMail> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl MailSender for RecordingMailSender {
    async fn send_reset_password(
        &self,
        mail: &ResetPasswordMail,
    ) -> Result<(), MailDeliveryError> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(mail.clone());
        Ok(())
    }
}
