//! Machine-level error type.

use ferricom_core::BusFault;
use ricoh_2a03::CpuError;
use thiserror::Error;

/// Errors surfaced by cartridge loading and [`crate::Nes::step`].
///
/// A step error leaves the machine in an inconsistent-but-safe state;
/// the host should stop stepping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NesError {
    /// Bad magic or a truncated iNES image.
    #[error("not a valid iNES image")]
    InvalidRom,
    /// The image requests a mapper this emulator does not implement.
    #[error("unsupported iNES mapper {0}")]
    UnsupportedMapper(u8),
    /// CPU decode or execution failure.
    #[error(transparent)]
    Cpu(#[from] CpuError),
    /// A bus access outside every mapped region.
    #[error(transparent)]
    Bus(#[from] BusFault),
}
