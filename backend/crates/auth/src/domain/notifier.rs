//! Outbound OTP delivery
//!
//! Concrete SMS / email providers are out of scope; the infrastructure
//! layer ships a logging implementation.

use thiserror::Error;

use crate::domain::value_object::otp::{OtpChannel, OtpCode, VerificationPurpose};

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Channel {0} is not enabled")]
    ChannelDisabled(OtpChannel),

    #[error("Delivery failed: {0}")]
    Delivery(String),
}

#[trait_variant::make(OtpNotifier: Send)]
pub trait LocalOtpNotifier {
    /// `destination` is an E.164 number for SMS or an address for email
    async fn send(
        &self,
        channel: OtpChannel,
        destination: &str,
        purpose: VerificationPurpose,
        code: &OtpCode,
    ) -> Result<(), NotifyError>;
}
