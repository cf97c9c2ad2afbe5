use std::path::PathBuf;

/// Failures reported by a [`GpuDriver`](super::GpuDriver).
///
/// All of them are recoverable from the shell's point of view: the surface
/// stays not-ready and initialization is retried on the next paint.
#[derive(thiserror::Error, Debug)]
pub enum GpuError
{
        #[error("no driver type could create a device: {0}")]
        NoDriver(String),

        #[error("device creation failed: {0}")]
        DeviceCreation(String),

        #[error("swap chain back buffer unavailable: {0}")]
        BackBuffer(String),

        #[error("render target view creation failed: {0}")]
        RenderTarget(String),

        #[error("effect resource not found: {}", .0.display())]
        ResourceNotFound(PathBuf),

        #[error("effect `{}` failed to compile: {reason}", .path.display())]
        EffectCompilation
        {
                path: PathBuf,
                reason: String,
        },

        #[error("technique `{0}` not found")]
        TechniqueNotFound(String),

        #[error("pass {pass} out of range, technique has {count}")]
        PassOutOfRange
        {
                pass: usize,
                count: usize,
        },

        #[error("input layout creation failed: {0}")]
        InputLayout(String),

        #[error("buffer creation failed: {0}")]
        Buffer(String),

        #[error("device is not ready")]
        NotReady,

        #[error("present failed: {0}")]
        Present(String),
}
