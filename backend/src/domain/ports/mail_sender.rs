//! Outbound port for transactional mail.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Delivery errors raised by mail adapters.
    pub enum MailDeliveryError {
        /// The mail relay rejected or never accepted the message.
        Delivery { message: String } => "mail delivery failed: {message}",
    }
}

/// A password reset message addressed to one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetPasswordMail {
    pub recipient: String,
    /// Absolute URL the recipient follows to choose a new password.
    pub reset_link: String,
}

#[async_trait]
pub trait MailSender: Send + Sync {
    /// Hand the message to the mail relay.
    async fn send_reset_password(
        &self,
        mail: &ResetPasswordMail,
    ) -> Result<(), MailDeliveryError>;
}
