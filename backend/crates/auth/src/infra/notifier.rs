//! Logging OTP notifier
//!
//! Stands in for real SMS / email providers. Destinations are masked in
//! `info` logs; the code itself only appears at `debug`.

use crate::domain::notifier::{NotifyError, OtpNotifier};
use crate::domain::value_object::otp::{OtpChannel, OtpCode, VerificationPurpose};

#[derive(Debug, Clone, Default)]
pub struct LogNotifier {
    sms_enabled: bool,
}

impl LogNotifier {
    pub fn new(sms_enabled: bool) -> Self {
        Self { sms_enabled }
    }
}

impl OtpNotifier for LogNotifier {
    async fn send(
        &self,
        channel: OtpChannel,
        destination: &str,
        purpose: VerificationPurpose,
        code: &OtpCode,
    ) -> Result<(), NotifyError> {
        if channel == OtpChannel::Sms && !self.sms_enabled {
            return Err(NotifyError::ChannelDisabled(channel));
        }

        tracing::info!(
            channel = %channel,
            destination = %mask(destination),
            purpose = %purpose,
            "Verification code dispatched"
        );
        tracing::debug!(code = code.as_str(), "Verification code body");
        Ok(())
    }
}

fn mask(destination: &str) -> String {
    match destination.split_once('@') {
        Some((local, domain)) => {
            let first = local.chars().next().unwrap_or('*');
            format!("{first}***@{domain}")
        }
        None => {
            let tail: String = destination
                .chars()
                .rev()
                .take(4)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect();
            format!("***{tail}")
        }
    }
}
