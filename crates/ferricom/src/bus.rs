//! CPU-side address routing.
//!
//! | Range           | Device                               |
//! |-----------------|--------------------------------------|
//! | $0000-$1FFF     | 2 KiB work RAM, mirrored every $800  |
//! | $2000-$3FFF     | PPU registers, mirrored every 8      |
//! | $4000-$4013,$15 | APU stub                             |
//! | $4014           | OAM DMA trigger                      |
//! | $4016           | Joypad 1                             |
//! | $4017           | Joypad 2 (reads 0)                   |
//! | $4018-$401F     | Disabled test registers (ignored)    |
//! | $4020-$FFFF     | Cartridge                            |

use ferricom_core::{mirror_index, Bus, BusFault};

use crate::apu::Apu;
use crate::cartridge::Cartridge;
use crate::controller::{InputSource, Joypad};
use crate::ppu::Ppu;
use crate::video::FrameSink;

/// CPU cycles a $4014 write stalls the CPU for.
const OAM_DMA_CYCLES: u64 = 514;

/// The CPU bus. Owns everything the CPU can reach: work RAM, the PPU,
/// the APU stub, the cartridge and the joypads.
#[derive(Debug)]
pub struct CpuBus<S: FrameSink, I: InputSource> {
    pub ram: [u8; 2048],
    pub ppu: Ppu<S>,
    pub apu: Apu,
    pub cartridge: Cartridge,
    pub joypad1: Joypad<I>,
    /// Cycles the pending OAM DMA costs; collected by the console.
    dma_stall: u64,
}

impl<S: FrameSink, I: InputSource> CpuBus<S, I> {
    pub fn new(cartridge: Cartridge, sink: S, input: I) -> Self {
        Self {
            ram: [0; 2048],
            ppu: Ppu::new(sink),
            apu: Apu::new(),
            cartridge,
            joypad1: Joypad::new(input),
            dma_stall: 0,
        }
    }

    /// Advance the PPU; dots are CPU cycles × 3.
    pub fn step_ppu(&mut self, dots: u64) -> Result<(), BusFault> {
        self.ppu.step(&mut self.cartridge, dots)
    }

    /// Take the cycle cost of a DMA triggered by the last instruction.
    pub fn take_dma_stall(&mut self) -> u64 {
        std::mem::take(&mut self.dma_stall)
    }

    /// $4014 write: copy a 256-byte page into OAM at the current OAM
    /// address, stalling the CPU for 514 cycles.
    fn oam_dma(&mut self, page: u8) -> Result<(), BusFault> {
        let base = u16::from(page) << 8;
        for offset in 0..256 {
            let value = self.read(base + offset)?;
            self.ppu.dma_write(value);
        }
        self.dma_stall = OAM_DMA_CYCLES;
        Ok(())
    }
}

impl<S: FrameSink, I: InputSource> Bus for CpuBus<S, I> {
    fn read(&mut self, addr: u16) -> Result<u8, BusFault> {
        match addr {
            0x0000..=0x1FFF => Ok(self.ram[usize::from(mirror_index(addr, 0x0000, 0x0800))]),
            0x2000..=0x3FFF => self
                .ppu
                .read_register(mirror_index(addr, 0x2000, 8), &mut self.cartridge),
            0x4016 => Ok(self.joypad1.read()),
            0x4017 => Ok(0), // second joypad not wired
            0x4000..=0x4015 => Ok(self.apu.read(addr)),
            0x4018..=0x401F => Ok(0), // disabled test mode
            0x4020..=0xFFFF => self.cartridge.cpu_read(addr),
        }
    }

    fn write(&mut self, addr: u16, value: u8) -> Result<(), BusFault> {
        match addr {
            0x0000..=0x1FFF => {
                self.ram[usize::from(mirror_index(addr, 0x0000, 0x0800))] = value;
                Ok(())
            }
            0x2000..=0x3FFF => {
                self.ppu
                    .write_register(mirror_index(addr, 0x2000, 8), value, &mut self.cartridge)
            }
            0x4014 => self.oam_dma(value),
            0x4016 => {
                self.joypad1.write(value);
                Ok(())
            }
            0x4000..=0x4013 | 0x4015 | 0x4017 => {
                self.apu.write(addr, value);
                Ok(())
            }
            0x4018..=0x401F => Ok(()),
            0x4020..=0xFFFF => self.cartridge.cpu_write(addr, value),
        }
    }
}
