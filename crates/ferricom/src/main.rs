//! ferricom binary.
//!
//! Runs the emulator in a winit window with a pixels framebuffer, or
//! headless for a fixed number of frames.

#![allow(clippy::cast_possible_truncation)]

use std::path::PathBuf;
use std::process;
use std::time::{Duration, Instant};

use ferricom::{Framebuffer, InputSource, Nes, FB_HEIGHT, FB_WIDTH};
use log::info;
use pixels::{Pixels, SurfaceTexture};
use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowAttributes, WindowId};

/// Window scale factor.
const SCALE: u32 = 3;

/// Frame duration for ~60 Hz NTSC.
const FRAME_DURATION: Duration = Duration::from_micros(16_639);

type Machine = Nes<Framebuffer, Keyboard>;

// ---------------------------------------------------------------------------
// Keyboard input source
// ---------------------------------------------------------------------------

/// Button states fed from winit keyboard events.
#[derive(Default)]
struct Keyboard {
    a: bool,
    b: bool,
    select: bool,
    start: bool,
    up: bool,
    down: bool,
    left: bool,
    right: bool,
}

impl Keyboard {
    /// Apply a key event. Returns false for unmapped keys.
    fn set_key(&mut self, keycode: KeyCode, pressed: bool) -> bool {
        match keycode {
            KeyCode::KeyZ => self.a = pressed,
            KeyCode::KeyX => self.b = pressed,
            KeyCode::ShiftRight | KeyCode::ShiftLeft => self.select = pressed,
            KeyCode::Enter => self.start = pressed,
            KeyCode::ArrowUp => self.up = pressed,
            KeyCode::ArrowDown => self.down = pressed,
            KeyCode::ArrowLeft => self.left = pressed,
            KeyCode::ArrowRight => self.right = pressed,
            _ => return false,
        }
        true
    }
}

impl InputSource for Keyboard {
    fn a(&self) -> bool {
        self.a
    }
    fn b(&self) -> bool {
        self.b
    }
    fn select(&self) -> bool {
        self.select
    }
    fn start(&self) -> bool {
        self.start
    }
    fn up(&self) -> bool {
        self.up
    }
    fn down(&self) -> bool {
        self.down
    }
    fn left(&self) -> bool {
        self.left
    }
    fn right(&self) -> bool {
        self.right
    }
}

// ---------------------------------------------------------------------------
// CLI argument parsing
// ---------------------------------------------------------------------------

struct CliArgs {
    rom_path: Option<PathBuf>,
    headless: bool,
    frames: u32,
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        rom_path: None,
        headless: false,
        frames: 200,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--rom" => {
                i += 1;
                cli.rom_path = args.get(i).map(PathBuf::from);
            }
            "--headless" => {
                cli.headless = true;
            }
            "--frames" => {
                i += 1;
                if let Some(s) = args.get(i) {
                    cli.frames = s.parse().unwrap_or(200);
                }
            }
            "--help" | "-h" => {
                eprintln!("Usage: ferricom [OPTIONS]");
                eprintln!();
                eprintln!("Options:");
                eprintln!("  --rom <file>   iNES ROM file (.nes)");
                eprintln!("  --headless     Run without a window");
                eprintln!("  --frames <n>   Frames to run in headless mode [default: 200]");
                process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {other}");
                process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

// ---------------------------------------------------------------------------
// Windowed mode (winit + pixels)
// ---------------------------------------------------------------------------

struct App {
    nes: Machine,
    window: Option<&'static Window>,
    pixels: Option<Pixels<'static>>,
    last_frame_time: Instant,
}

impl App {
    fn new(nes: Machine) -> Self {
        Self {
            nes,
            window: None,
            pixels: None,
            last_frame_time: Instant::now(),
        }
    }

    fn update_pixels(&mut self) {
        let Some(pixels) = self.pixels.as_mut() else {
            return;
        };

        let fb = self.nes.frame_sink().pixels();
        let frame = pixels.frame_mut();
        for (i, &rgb) in fb.iter().enumerate() {
            let offset = i * 4;
            frame[offset] = ((rgb >> 16) & 0xFF) as u8;
            frame[offset + 1] = ((rgb >> 8) & 0xFF) as u8;
            frame[offset + 2] = (rgb & 0xFF) as u8;
            frame[offset + 3] = 0xFF;
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let size = winit::dpi::LogicalSize::new(FB_WIDTH as u32 * SCALE, FB_HEIGHT as u32 * SCALE);
        let attrs = WindowAttributes::default()
            .with_title("ferricom")
            .with_inner_size(size)
            .with_resizable(false);

        match event_loop.create_window(attrs) {
            Ok(window) => {
                let window: &'static Window = Box::leak(Box::new(window));
                let inner = window.inner_size();
                let surface = SurfaceTexture::new(inner.width, inner.height, window);
                match Pixels::new(FB_WIDTH as u32, FB_HEIGHT as u32, surface) {
                    Ok(pixels) => self.pixels = Some(pixels),
                    Err(e) => {
                        eprintln!("Failed to create pixel surface: {e}");
                        event_loop.exit();
                        return;
                    }
                }
                self.window = Some(window);
            }
            Err(e) => {
                eprintln!("Failed to create window: {e}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(keycode) = event.physical_key {
                    if keycode == KeyCode::Escape && event.state == ElementState::Pressed {
                        event_loop.exit();
                        return;
                    }
                    let pressed = event.state == ElementState::Pressed;
                    self.nes.input_mut().set_key(keycode, pressed);
                }
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                if now.duration_since(self.last_frame_time) >= FRAME_DURATION {
                    if let Err(e) = self.nes.run_until_frame() {
                        eprintln!("Emulation stopped: {e}");
                        event_loop.exit();
                        return;
                    }
                    self.update_pixels();
                    self.last_frame_time = now;
                }

                if let Some(pixels) = self.pixels.as_ref() {
                    if let Err(e) = pixels.render() {
                        eprintln!("Render error: {e}");
                        event_loop.exit();
                    }
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = self.window {
            window.request_redraw();
        }
    }
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn make_nes(cli: &CliArgs) -> Machine {
    let rom_path = cli.rom_path.as_ref().unwrap_or_else(|| {
        eprintln!("No ROM file specified. Use --rom <file.nes>");
        process::exit(1);
    });

    let rom = match std::fs::read(rom_path) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("Failed to read {}: {e}", rom_path.display());
            process::exit(1);
        }
    };

    match Nes::new(&rom, Framebuffer::new(), Keyboard::default()) {
        Ok(nes) => {
            info!("loaded {}", rom_path.display());
            nes
        }
        Err(e) => {
            eprintln!("Failed to load ROM: {e}");
            process::exit(1);
        }
    }
}

fn run_headless(cli: &CliArgs) {
    let mut nes = make_nes(cli);
    for _ in 0..cli.frames {
        if let Err(e) = nes.run_until_frame() {
            eprintln!("Emulation stopped: {e}");
            process::exit(1);
        }
    }
    info!("ran {} frames headless", nes.frame_sink().frames());
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    env_logger::init();
    let cli = parse_args();

    if cli.headless {
        run_headless(&cli);
        return;
    }

    let nes = make_nes(&cli);
    let mut app = App::new(nes);

    let event_loop = match EventLoop::new() {
        Ok(el) => el,
        Err(e) => {
            eprintln!("Failed to create event loop: {e}");
            process::exit(1);
        }
    };

    if let Err(e) = event_loop.run_app(&mut app) {
        eprintln!("Event loop error: {e}");
        process::exit(1);
    }
}
