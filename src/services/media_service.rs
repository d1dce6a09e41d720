use std::sync::Arc;

/// Camera and microphone used to record the video introduction.
pub trait CaptureDevice: Send + Sync {
    fn acquire(&self) -> Result<(), MediaError>;
    fn release(&self);
}

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("capture device unavailable: {0}")]
    Unavailable(String),
}

/// Holds an acquired device; releasing happens on drop.
pub struct CaptureGuard {
    device: Arc<dyn CaptureDevice>,
}

impl CaptureGuard {
    pub fn acquire(device: Arc<dyn CaptureDevice>) -> Result<Self, MediaError> {
        device.acquire()?;
        tracing::debug!("Capture device acquired");
        Ok(Self { device })
    }
}

impl Drop for CaptureGuard {
    fn drop(&mut self) {
        self.device.release();
        tracing::debug!("Capture device released");
    }
}


#[cfg(test)]
mod tests {
    use super::testing::CountingDevice;
    use super::*;

    #[test]
    fn guard_releases_on_drop() {
        let device = Arc::new(CountingDevice::default());
        {
            let _guard = CaptureGuard::acquire(device.clone()).unwrap();
            assert_eq!(device.held(), 1);
        }
        assert_eq!(device.held(), 0);
    }
}
