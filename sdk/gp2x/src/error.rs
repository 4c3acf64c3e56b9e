use thiserror::Error;

/// Configuration errors raised when raw values cross into the typed API.
///
/// Register programming itself never fails; out-of-range numeric fields such
/// as alpha are masked instead.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("region {0} does not exist (valid regions are 1-5)")]
    InvalidRegion(u8),
    #[error("pixel format {0} is not a valid 2-bit BPP value")]
    InvalidPixelFormat(u8),
    #[error("blend mode {0} is not a valid MIXMUX value")]
    InvalidBlendMode(u8),
}

pub type Result<T> = core::result::Result<T, Error>;
