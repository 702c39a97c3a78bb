use candle_core::Device;
use tracing::{debug, info, warn};

use super::error::EmbeddingError;

/// Picks the device the batched matrix products run on.
///
/// GPU backends are only attempted when compiled in (`metal` / `cuda`
/// features). Any GPU failure falls back to CPU, so this only errors if a
/// future backend has no fallback.
pub fn select_device() -> Result<Device, EmbeddingError> {
    let mut failures: Vec<String> = Vec::new();

    if cfg!(feature = "metal") {
        match Device::new_metal(0) {
            Ok(device) => {
                info!(device = "metal", "Scoring on GPU");
                return Ok(device);
            }
            Err(e) => {
                warn!(error = %e, "Metal device unavailable");
                failures.push(format!("metal failed: {e}"));
            }
        }
    }

    if cfg!(feature = "cuda") {
        match Device::new_cuda(0) {
            Ok(device) => {
                info!(device = "cuda", "Scoring on GPU");
                return Ok(device);
            }
            Err(e) => {
                warn!(error = %e, "CUDA device unavailable");
                failures.push(format!("cuda failed: {e}"));
            }
        }
    }

    if failures.is_empty() {
        debug!("No GPU backend compiled, scoring on CPU");
    } else {
        warn!(reason = %failures.join("; "), "Falling back to CPU device");
    }

    Ok(Device::Cpu)
}

/// Short name used in log fields.
pub fn device_label(device: &Device) -> &'static str {
    match device {
        Device::Cpu => "cpu",
        Device::Cuda(_) => "cuda",
        Device::Metal(_) => "metal",
    }
}
