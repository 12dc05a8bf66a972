//! Whole-machine tests: hand-assembled iNES images driven through the
//! console façade.

use ferricom::{Framebuffer, Nes, NullInput, PALETTE};

/// NROM image: 32 KiB PRG, 8 KiB CHR, `code` at $8000, all vectors at
/// the given reset target.
fn build_rom(code: &[u8], reset: u16) -> Vec<u8> {
    let mut rom = vec![0u8; 16 + 0x8000 + 0x2000];
    rom[0..4].copy_from_slice(b"NES\x1a");
    rom[4] = 2; // 2 × 16 KiB PRG
    rom[5] = 1; // 8 KiB CHR
    rom[16..16 + code.len()].copy_from_slice(code);
    rom[16 + 0x7FFA] = reset as u8; // NMI
    rom[16 + 0x7FFB] = (reset >> 8) as u8;
    rom[16 + 0x7FFC] = reset as u8; // RESET
    rom[16 + 0x7FFD] = (reset >> 8) as u8;
    rom[16 + 0x7FFE] = reset as u8; // IRQ/BRK
    rom[16 + 0x7FFF] = (reset >> 8) as u8;
    rom
}

fn make_nes(rom: &[u8]) -> Nes<Framebuffer, NullInput> {
    Nes::new(rom, Framebuffer::new(), NullInput).expect("valid test ROM")
}

/// Absolute dot position within the frame.
fn dot_index(nes: &Nes<Framebuffer, NullInput>) -> u64 {
    u64::from(nes.bus().ppu.scanline()) * 341 + u64::from(nes.bus().ppu.dot())
}

/// Dots advanced since `start`, assuming less than one frame passed.
/// Frames are a constant 89,342 dots while rendering is disabled.
fn dots_advanced(start: u64, now: u64) -> u64 {
    (now + 341 * 262 - start) % (341 * 262)
}

#[test]
fn reset_vector_sets_pc() {
    let mut rom = build_rom(&[], 0x8000);
    rom[16 + 0x7FFC] = 0x34;
    rom[16 + 0x7FFD] = 0x12;
    let nes = make_nes(&rom);
    assert_eq!(nes.cpu().pc(), 0x1234);
}

#[test]
fn immediate_load_then_store() {
    // LDA #$42; STA $10; BRK
    let rom = build_rom(&[0xA9, 0x42, 0x85, 0x10, 0x00], 0x8000);
    let mut nes = make_nes(&rom);
    nes.step().unwrap();
    nes.step().unwrap();
    assert_eq!(nes.cpu().a(), 0x42);
    assert_eq!(nes.bus().ram[0x10], 0x42);
    assert_eq!(nes.cpu().status() & 0x02, 0, "Z clear");
    assert_eq!(nes.cpu().status() & 0x80, 0, "N clear");
}

#[test]
fn ppu_advances_three_dots_per_cpu_cycle() {
    // NOP sled
    let rom = build_rom(&[0xEA; 64], 0x8000);
    let mut nes = make_nes(&rom);
    let start_dots = dot_index(&nes);
    let start_cycles = nes.cpu().cycles();
    for _ in 0..20 {
        nes.step().unwrap();
    }
    let cycles = nes.cpu().cycles() - start_cycles;
    assert_eq!(cycles, 40, "20 NOPs at 2 cycles each");
    assert_eq!(dots_advanced(start_dots, dot_index(&nes)), 3 * cycles);
}

#[test]
fn oam_dma_stalls_514_cycles() {
    // LDA #$02; STA $4014
    let rom = build_rom(&[0xA9, 0x02, 0x8D, 0x14, 0x40], 0x8000);
    let mut nes = make_nes(&rom);
    let start_dots = dot_index(&nes);
    nes.step().unwrap(); // LDA, 2 cycles
    nes.step().unwrap(); // STA, 4 cycles + 514 stall
    assert_eq!(nes.cpu().cycles(), 2 + 4 + 514);
    assert_eq!(
        dots_advanced(start_dots, dot_index(&nes)),
        3 * (2 + 4 + 514)
    );
}

#[test]
fn vblank_nmi_is_serviced() {
    // $8000: LDA #$80; STA $2000; JMP $8005 — enable NMI, then idle.
    // NMI vector points at $8100: JMP $8100.
    let mut code = vec![0xA9, 0x80, 0x8D, 0x00, 0x20, 0x4C, 0x05, 0x80];
    code.resize(0x100, 0xEA);
    code.extend_from_slice(&[0x4C, 0x00, 0x81]); // $8100
    let mut rom = build_rom(&code, 0x8000);
    rom[16 + 0x7FFA] = 0x00;
    rom[16 + 0x7FFB] = 0x81;
    let mut nes = make_nes(&rom);

    let s0 = nes.cpu().s();
    for _ in 0..40_000 {
        nes.step().unwrap();
        if (0x8100..=0x8102).contains(&nes.cpu().pc()) {
            break;
        }
    }
    assert!(
        (0x8100..=0x8102).contains(&nes.cpu().pc()),
        "NMI handler never entered, PC=${:04X}",
        nes.cpu().pc()
    );
    assert_eq!(nes.cpu().s(), s0.wrapping_sub(3), "PC and P pushed");
    assert!(
        nes.bus().ppu.scanline() >= 241 || nes.bus().ppu.scanline() < 10,
        "NMI must arrive around VBlank, at scanline {}",
        nes.bus().ppu.scanline()
    );
}

#[test]
fn run_until_frame_latches_once_per_frame() {
    let rom = build_rom(&[0x4C, 0x00, 0x80], 0x8000); // JMP $8000
    let mut nes = make_nes(&rom);
    nes.run_until_frame().unwrap();
    assert_eq!(nes.frame_sink().frames(), 1);
    nes.run_until_frame().unwrap();
    nes.run_until_frame().unwrap();
    assert_eq!(nes.frame_sink().frames(), 3);
}

#[test]
fn boot_rom_polls_vblank_and_reaches_idle() {
    // Standard init: SEI, CLD, LDX #$FF, TXS, two $2002 polls, idle.
    #[rustfmt::skip]
    let code: &[u8] = &[
        0x78,             // $8000  SEI
        0xD8,             // $8001  CLD
        0xA2, 0xFF,       // $8002  LDX #$FF
        0x9A,             // $8004  TXS
        0xAD, 0x02, 0x20, // $8005  LDA $2002
        0x10, 0xFB,       // $8008  BPL $8005
        0xAD, 0x02, 0x20, // $800A  LDA $2002
        0x10, 0xFB,       // $800D  BPL $800A
        0x4C, 0x0F, 0x80, // $800F  JMP $800F
    ];
    let rom = build_rom(code, 0x8000);
    let mut nes = make_nes(&rom);

    for _ in 0..5 {
        nes.run_until_frame().unwrap();
        if (0x800F..=0x8011).contains(&nes.cpu().pc()) {
            return;
        }
    }
    panic!(
        "idle loop not reached within 5 frames, PC=${:04X}",
        nes.cpu().pc()
    );
}

/// Program a background: palette, one solid tile, rendering on.
#[test]
fn background_tile_reaches_the_frame_sink() {
    #[rustfmt::skip]
    let code: &[u8] = &[
        0x78,             // $8000  SEI
        0xD8,             // $8001  CLD
        0xA2, 0xFF,       // $8002  LDX #$FF
        0x9A,             // $8004  TXS
        0xA9, 0x00,       // $8005  LDA #$00
        0x8D, 0x01, 0x20, // $8007  STA $2001      rendering off
        0xAD, 0x02, 0x20, // $800A  LDA $2002      VBlank wait 1
        0x10, 0xFB,       // $800D  BPL $800A
        0xAD, 0x02, 0x20, // $800F  LDA $2002      VBlank wait 2
        0x10, 0xFB,       // $8012  BPL $800F
        0xAD, 0x02, 0x20, // $8014  LDA $2002      reset address latch
        0xA9, 0x3F,       // $8017  LDA #$3F
        0x8D, 0x06, 0x20, // $8019  STA $2006
        0xA9, 0x00,       // $801C  LDA #$00
        0x8D, 0x06, 0x20, // $801E  STA $2006      PPU address $3F00
        0xA9, 0x0F,       // $8021  LDA #$0F
        0x8D, 0x07, 0x20, // $8023  STA $2007      backdrop black
        0xA9, 0x30,       // $8026  LDA #$30
        0x8D, 0x07, 0x20, // $8028  STA $2007      colour 1 white
        0xA9, 0x21,       // $802B  LDA #$21
        0x8D, 0x06, 0x20, // $802D  STA $2006
        0xA9, 0xCC,       // $8030  LDA #$CC
        0x8D, 0x06, 0x20, // $8032  STA $2006      nametable $21CC
        0xA9, 0x01,       // $8035  LDA #$01
        0x8D, 0x07, 0x20, // $8037  STA $2007      tile 1 (row 14, col 12)
        0xA9, 0x00,       // $803A  LDA #$00
        0x8D, 0x05, 0x20, // $803C  STA $2005
        0x8D, 0x05, 0x20, // $803F  STA $2005      scroll (0, 0)
        0x8D, 0x00, 0x20, // $8042  STA $2000      ctrl: tables 0, no NMI
        0xA9, 0x1E,       // $8045  LDA #$1E
        0x8D, 0x01, 0x20, // $8047  STA $2001      BG + sprites + left
        0x4C, 0x4A, 0x80, // $804A  JMP $804A      idle
    ];
    let mut rom = build_rom(code, 0x8000);
    // Tile 1: bitplane 0 solid → colour index 1 everywhere
    let chr = 16 + 0x8000;
    for row in 0..8 {
        rom[chr + 16 + row] = 0xFF;
    }
    let mut nes = make_nes(&rom);

    for _ in 0..6 {
        nes.run_until_frame().unwrap();
    }
    assert!(
        (0x804A..=0x804C).contains(&nes.cpu().pc()),
        "setup never finished, PC=${:04X}",
        nes.cpu().pc()
    );

    let sink = nes.frame_sink();
    // Tile row 14 → scanline 112; column 12 → x 96
    assert_eq!(sink.pixel(96, 112), PALETTE[0x30], "tile pixel");
    assert_eq!(sink.pixel(103, 119), PALETTE[0x30], "tile bottom-right");
    assert_eq!(sink.pixel(0, 0), PALETTE[0x0F], "backdrop");
    assert_eq!(sink.pixel(104, 112), PALETTE[0x0F], "right of the tile");
}

#[test]
fn invalid_and_unsupported_images_are_rejected() {
    assert!(Nes::new(&[0u8; 64], Framebuffer::new(), NullInput).is_err());
    let mut rom = build_rom(&[], 0x8000);
    rom[6] = 0x30; // mapper 3
    let err = Nes::new(&rom, Framebuffer::new(), NullInput).unwrap_err();
    assert_eq!(err, ferricom::NesError::UnsupportedMapper(3));
}
