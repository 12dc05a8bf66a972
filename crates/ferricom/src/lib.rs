//! Cycle-accurate NES (Famicom) emulator core.
//!
//! The CPU (a Ricoh 2A03) is instruction-stepped; every CPU cycle
//! advances the PPU by exactly three dots, so a full NTSC frame is
//! 341 dots × 262 scanlines = 89,342 PPU cycles (one dot shorter on odd
//! frames while rendering). The host drives [`Nes::step`] or
//! [`Nes::run_until_frame`] and drains pixels through a [`FrameSink`].

mod apu;
mod bus;
mod cartridge;
mod controller;
mod error;
mod nes;
mod palette;
pub mod ppu;
mod video;

pub use apu::Apu;
pub use bus::CpuBus;
pub use cartridge::{Cartridge, Mirroring};
pub use controller::{InputSource, Joypad, NullInput};
pub use error::NesError;
pub use nes::Nes;
pub use palette::PALETTE;
pub use video::{FrameSink, Framebuffer, FB_HEIGHT, FB_WIDTH};
