//! Code delivery adapters.
//!
//! SMS gateways plug in behind [`CodeDelivery`]. [`LogDelivery`] only records
//! that a code was produced, for local runs and staging.

use async_trait::async_trait;
use shared_types::NormalizedPhone;
use tracing::{debug, info};

use crate::domain::OtpCode;
use crate::ports::{CodeDelivery, DeliveryError};

/// Writes a delivery record to the log. The code itself is only logged at
/// `debug` level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDelivery;

#[async_trait]
impl CodeDelivery for LogDelivery {
    async fn send_code(&self, phone: &NormalizedPhone, code: &OtpCode) -> Result<(), DeliveryError> {
        info!(phone = %phone.masked(), "OTP ready for delivery (log channel)");
        debug!(phone = %phone.masked(), code = %code.as_str(), "OTP code");
        Ok(())
    }
}

/// Keeps every delivered code in memory so tests can read it back.
#[cfg(any(test, feature = "test-utils"))]
#[derive(Debug, Default)]
pub struct CapturingDelivery {
    sent: parking_lot::Mutex<Vec<(NormalizedPhone, String)>>,
    fail: std::sync::atomic::AtomicBool,
}

#[cfg(any(test, feature = "test-utils"))]
impl CapturingDelivery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent deliveries fail.
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, std::sync::atomic::Ordering::SeqCst);
    }

    /// Most recent code sent to `phone`.
    pub fn last_code(&self, phone: &NormalizedPhone) -> Option<String> {
        self.sent
            .lock()
            .iter()
            .rev()
            .find(|(p, _)| p == phone)
            .map(|(_, code)| code.clone())
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().len()
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl CodeDelivery for CapturingDelivery {
    async fn send_code(&self, phone: &NormalizedPhone, code: &OtpCode) -> Result<(), DeliveryError> {
        if self.fail.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(DeliveryError("gateway rejected message".into()));
        }
        self.sent
            .lock()
            .push((phone.clone(), code.as_str().to_string()));
        Ok(())
    }
}
