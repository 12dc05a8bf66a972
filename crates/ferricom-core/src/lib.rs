//! Shared plumbing for the ferricom emulator.
//!
//! Everything the CPU and PPU crates have in common but that is not
//! machine-specific lives here: the fallible byte bus, the bus-fault
//! error, and the 16-bit read helpers with their 6502 wrap quirks.

mod bus;
mod mem;

pub use bus::{AccessKind, Bus, BusFault, SimpleBus};
pub use mem::{mirror_index, page_crossed, read16, read16_page_wrap, read16_zero_page};
