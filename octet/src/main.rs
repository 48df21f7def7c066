use std::path::PathBuf;

use clap::Parser;
use octet_base::{
    processor::ProcessorBuilder,
    rom::{LoadError, Rom},
    screen::{PartialOffscreenDrawing, Screen},
};
use pixels::{Pixels, SurfaceTexture};
use rand::{rngs::StdRng, SeedableRng};
use spin_sleep::LoopHelper;
use thiserror::Error;
use tracing::{debug, error, info};
use tracing_subscriber::{self, EnvFilter};
use winit::{
    dpi::{LogicalPosition, LogicalSize, PhysicalSize},
    event::{ElementState, Event, KeyboardInput, VirtualKeyCode, WindowEvent},
    event_loop::EventLoop,
    window::{Window, WindowBuilder},
};

use crate::keymap::{IntoKeyState, TryIntoKey};

mod keymap;

/// RGB color for the pixel on-state
const COLOR_PIXEL_ON: [u8; 3] = [0xFF, 0xFF, 0xFF];
/// RGB color for the pixel off-state
const COLOR_PIXEL_OFF: [u8; 3] = [0x00, 0x00, 0x00];

const TITLE: &str = "octet";
/// Shown in the window title while the sound timer runs.
const TITLE_SOUND_ACTIVE: &str = "octet \u{266A}";

#[derive(Debug, Error)]
enum StartupError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("could not create the window")]
    Window(#[from] winit::error::OsError),
    #[error("could not create the pixel buffer")]
    Pixels(#[from] pixels::Error),
}

#[derive(Debug, Parser)]
#[command(version, about)]
struct CliOpts {
    /// The path to the file containing the ROM.
    /// The file's contents will be loaded into the emulator's memory,
    /// starting at address 0x200.
    rom_file: PathBuf,
    /// The clipping/wrapping behavior for sprites that are drawn partially offscreen.
    /// One of `clip-xy`, `clip-x-wrap-y`, `wrap-x-clip-y` and `wrap-xy`.
    #[arg(short, long, default_value_t = PartialOffscreenDrawing::ClipXY)]
    partial_offscreen_drawing: PartialOffscreenDrawing,
    /// The number of instructions executed per second.
    /// The delay and sound timers tick once per instruction.
    #[arg(short, long, default_value_t = 700)]
    steps_per_second: u32,
    /// Seed for the random number generator, for reproducible runs.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<(), StartupError> {
    let cli_opts = CliOpts::parse();

    tracing_subscriber::fmt()
        .pretty()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let rom = Rom::read(&cli_opts.rom_file)?;
    let rng = match cli_opts.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut processor = ProcessorBuilder::new()
        .partial_offscreen_drawing(cli_opts.partial_offscreen_drawing)
        .rom(&rom)
        .build(rng);

    let event_loop = EventLoop::new();
    let (window, size) = create_window(
        &event_loop,
        TITLE,
        PhysicalSize::new(Screen::WIDTH as u32, Screen::HEIGHT as u32),
    )?;
    let surface_texture = SurfaceTexture::new(size.width, size.height, &window);
    let mut pixels = Pixels::new(
        Screen::WIDTH as u32,
        Screen::HEIGHT as u32,
        surface_texture,
    )?;

    let mut loop_helper = LoopHelper::builder().build_with_target_rate(cli_opts.steps_per_second);
    let mut sound_active = false;

    info!(steps_per_second = cli_opts.steps_per_second, "starting");

    event_loop.run(move |event, _, control_flow| {
        control_flow.set_poll();
        match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::Resized(size) => {
                    if let Err(error) = pixels.resize_surface(size.width, size.height) {
                        error!(%error, "could not resize the surface texture");
                        control_flow.set_exit();
                    }
                }
                WindowEvent::CloseRequested => {
                    info!("window closed, exiting...");
                    control_flow.set_exit();
                }
                WindowEvent::KeyboardInput {
                    input:
                        KeyboardInput {
                            state,
                            virtual_keycode: Some(virtual_keycode),
                            ..
                        },
                    ..
                } => {
                    debug!(?virtual_keycode, ?state, "key state changed");
                    if virtual_keycode == VirtualKeyCode::Escape && state == ElementState::Pressed
                    {
                        info!("escape key pressed, exiting...");
                        control_flow.set_exit();
                    } else if let Ok(key) = virtual_keycode.try_into_key() {
                        processor.set_key_state(key, state.into_key_state());
                    }
                }
                _ => (),
            },
            Event::MainEventsCleared => {
                loop_helper.loop_start();
                if let Err(error) = processor.step() {
                    error!(%error, "error occurred running the CHIP-8 ROM");
                    control_flow.set_exit();
                    return;
                }
                if processor.draw_requested() {
                    window.request_redraw();
                }
                if processor.sound_active() != sound_active {
                    sound_active = processor.sound_active();
                    window.set_title(if sound_active {
                        TITLE_SOUND_ACTIVE
                    } else {
                        TITLE
                    });
                }
                loop_helper.loop_sleep();
            }
            Event::RedrawRequested(_) => {
                render(processor.screen(), pixels.frame_mut());
                if let Err(error) = pixels.render() {
                    error!(
                        %error,
                        "pixels failed to draw pixel buffer to surface texture"
                    );
                    control_flow.set_exit();
                }
            }
            _ => (),
        }
    });
}

/// Copy the screen into an RGBA frame of the same dimensions.
fn render(screen: &Screen, frame: &mut [u8]) {
    frame
        .chunks_exact_mut(4)
        .zip(screen.pixels().iter().map(|&pixel| pixel != 0))
        .for_each(|(frame_pixel, screen_pixel_on)| {
            frame_pixel[0..3].copy_from_slice(if screen_pixel_on {
                &COLOR_PIXEL_ON
            } else {
                &COLOR_PIXEL_OFF
            }); // RGB
            frame_pixel[3] = 0xFF; // alpha
        });
}

fn create_window<T>(
    event_loop: &EventLoop<T>,
    title: &str,
    pixel_buffer_size: PhysicalSize<u32>,
) -> Result<(Window, PhysicalSize<u32>), winit::error::OsError> {
    let pixel_buffer_size: PhysicalSize<f64> = pixel_buffer_size.cast();

    let window = WindowBuilder::new()
        .with_visible(false)
        .with_title(title)
        .build(event_loop)?;

    let hidpi_factor = window.scale_factor();
    let (monitor_width, monitor_height) = {
        if let Some(monitor) = window.current_monitor() {
            let size = monitor.size().to_logical(hidpi_factor);
            (size.width, size.height)
        } else {
            (pixel_buffer_size.width, pixel_buffer_size.height)
        }
    };

    // Scale to two thirds of the smaller dimension of the monitor,
    // relative to the size of the pixel buffer.
    let scale = (monitor_width / pixel_buffer_size.width)
        .min(monitor_height / pixel_buffer_size.height)
        * 2.0
        / 3.0;
    let scale = scale.round().max(1.0);

    // Smaller than pixel_buffer_size logical pixels doesn't really make sense.
    let min_size = pixel_buffer_size.to_logical::<f64>(hidpi_factor);

    let default_size = LogicalSize::new(
        pixel_buffer_size.width * scale,
        pixel_buffer_size.height * scale,
    );

    let upper_left_of_centered = LogicalPosition::new(
        (monitor_width - default_size.width) / 2.0,
        (monitor_height - default_size.height) / 2.0,
    );

    window.set_min_inner_size(Some(min_size));
    window.set_inner_size(default_size);
    window.set_outer_position(upper_left_of_centered);
    window.set_visible(true);

    let physical_default_size = default_size.to_physical::<f64>(hidpi_factor);

    Ok((
        window,
        PhysicalSize::new(
            physical_default_size.width.round() as u32,
            physical_default_size.height.round() as u32,
        ),
    ))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn render_maps_pixels_to_rgba() {
        let mut screen = Screen::default();
        screen.draw_sprite(0, 0, &[0b1000_0000], PartialOffscreenDrawing::ClipXY);
        let mut frame = vec![0x11; Screen::WIDTH * Screen::HEIGHT * 4];

        render(&screen, &mut frame);

        assert_eq!(&frame[0..8], &[0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0xFF]);
        assert!(frame.chunks_exact(4).skip(1).all(|pixel| pixel == [0, 0, 0, 0xFF]));
    }

    #[test]
    fn cli_defaults() {
        let cli_opts = CliOpts::try_parse_from(["octet", "game.ch8"]).unwrap();

        assert_eq!(cli_opts.rom_file, PathBuf::from("game.ch8"));
        assert_eq!(
            cli_opts.partial_offscreen_drawing,
            PartialOffscreenDrawing::ClipXY
        );
        assert_eq!(cli_opts.steps_per_second, 700);
        assert_eq!(cli_opts.seed, None);
    }

    #[test]
    fn cli_options() {
        let cli_opts = CliOpts::try_parse_from([
            "octet",
            "--partial-offscreen-drawing",
            "wrap-xy",
            "-s",
            "500",
            "--seed",
            "42",
            "game.ch8",
        ])
        .unwrap();

        assert_eq!(
            cli_opts.partial_offscreen_drawing,
            PartialOffscreenDrawing::WrapXY
        );
        assert_eq!(cli_opts.steps_per_second, 500);
        assert_eq!(cli_opts.seed, Some(42));
    }

    #[test]
    fn cli_rejects_unknown_drawing_mode() {
        assert!(CliOpts::try_parse_from(["octet", "-p", "wrap-z", "game.ch8"]).is_err());
    }
}
