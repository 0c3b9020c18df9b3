use candle_core::Device;

/// Selects the compute device based on enabled features (falls back to CPU).
///
/// Never fails: an unavailable GPU is logged and the CPU is used instead.
#[cfg(any(feature = "metal", feature = "cuda"))]
pub fn select_device() -> Device {
    use tracing::{info, warn};

    let mut failures: Vec<String> = Vec::new();

    #[cfg(feature = "metal")]
    {
        match Device::new_metal(0) {
            Ok(device) => {
                info!("Using Metal GPU for the reranker");
                return device;
            }
            Err(e) => {
                let msg = e.to_string();
                warn!(error = %msg, "Metal device unavailable");
                failures.push(format!("metal failed: {msg}"));
            }
        }
    }

    #[cfg(feature = "cuda")]
    {
        match Device::new_cuda(0) {
            Ok(device) => {
                info!("Using CUDA GPU for the reranker");
                return device;
            }
            Err(e) => {
                let msg = e.to_string();
                warn!(error = %msg, "CUDA device unavailable");
                failures.push(format!("cuda failed: {msg}"));
            }
        }
    }

    let reason = if failures.is_empty() {
        "no GPU device available".to_string()
    } else {
        failures.join("; ")
    };
    warn!(reason = %reason, "Falling back to CPU device");
    Device::Cpu
}

/// Selects the compute device based on enabled features (falls back to CPU).
#[cfg(not(any(feature = "metal", feature = "cuda")))]
pub fn select_device() -> Device {
    tracing::debug!("No GPU features enabled, reranker runs on CPU");
    Device::Cpu
}
