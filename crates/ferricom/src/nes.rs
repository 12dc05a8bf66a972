//! Console façade: the CPU and everything on its bus, advanced in
//! lock-step.
//!
//! One [`Nes::step`] runs a single CPU instruction (plus any interrupt
//! service and DMA stall) and then the matching 3× PPU dots, so no CPU
//! observation can ever get ahead of the PPU.

use log::info;
use ricoh_2a03::Cpu;

use crate::bus::CpuBus;
use crate::cartridge::Cartridge;
use crate::controller::InputSource;
use crate::error::NesError;
use crate::video::FrameSink;

/// The machine: CPU plus bus (PPU, APU, cartridge, joypads).
#[derive(Debug)]
pub struct Nes<S: FrameSink, I: InputSource> {
    cpu: Cpu,
    bus: CpuBus<S, I>,
}

impl<S: FrameSink, I: InputSource> Nes<S, I> {
    /// Build a machine from an iNES image, a frame sink and an input
    /// source, and reset the CPU through the cartridge's reset vector.
    ///
    /// # Errors
    ///
    /// [`NesError::InvalidRom`] or [`NesError::UnsupportedMapper`] when
    /// the image cannot be used.
    pub fn new(rom: &[u8], sink: S, input: I) -> Result<Self, NesError> {
        let cartridge = Cartridge::from_ines(rom)?;
        let mut bus = CpuBus::new(cartridge, sink, input);
        let mut cpu = Cpu::new();
        cpu.reset(&mut bus)?;
        info!("reset vector ${:04X}", cpu.pc());
        Ok(Self { cpu, bus })
    }

    /// Run one CPU instruction and the PPU dots it pays for.
    ///
    /// # Errors
    ///
    /// The first decode or bus error; the machine should not be stepped
    /// afterwards.
    pub fn step(&mut self) -> Result<(), NesError> {
        let mut cycles = self.cpu.step(&mut self.bus)?;

        // A $4014 write during the instruction performed the OAM copy;
        // the stall cycles surface here so the PPU keeps pace.
        let stall = self.bus.take_dma_stall();
        if stall > 0 {
            self.cpu.add_cycles(stall);
            cycles += stall;
        }

        self.bus.step_ppu(cycles * 3)?;

        if self.bus.ppu.take_nmi() {
            self.cpu.trigger_nmi();
        }
        self.cpu.set_irq(self.bus.cartridge.irq_line());
        Ok(())
    }

    /// Step until the PPU latches a completed frame.
    pub fn run_until_frame(&mut self) -> Result<(), NesError> {
        loop {
            self.step()?;
            if self.bus.ppu.take_frame() {
                return Ok(());
            }
        }
    }

    #[must_use]
    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }

    #[must_use]
    pub fn bus(&self) -> &CpuBus<S, I> {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut CpuBus<S, I> {
        &mut self.bus
    }

    #[must_use]
    pub fn frame_sink(&self) -> &S {
        self.bus.ppu.sink()
    }

    pub fn frame_sink_mut(&mut self) -> &mut S {
        self.bus.ppu.sink_mut()
    }

    pub fn input_mut(&mut self) -> &mut I {
        self.bus.joypad1.input_mut()
    }
}
