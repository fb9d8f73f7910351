use astragate_core::errors::GateError;
use astragate_core::traits::{CaptureSession, VoiceCapability};

/// Platform without speech recognition. Every capture attempt fails up front.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableCapability;

impl VoiceCapability for UnavailableCapability {
    fn is_available(&self) -> bool {
        false
    }

    fn start_capture(&self, locale: &str) -> Result<Box<dyn CaptureSession>, GateError> {
        tracing::debug!(locale, "capture requested on platform without recognition");
        Err(GateError::RecognitionUnavailable)
    }
}
