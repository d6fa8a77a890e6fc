use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use log::{LevelFilter, debug, error, info, warn};
use prismboy::{config, screenshot};
use prismboy_core::{
    Cartridge, GameBoy, ModelOverride,
    session::{self, SessionOptions, ShutdownFlag},
};

#[derive(Parser)]
#[command(version, about = "Game Boy / Game Boy Color emulator")]
struct Args {
    /// Path to ROM file
    rom: PathBuf,

    /// Force DMG mode
    #[arg(long, conflicts_with = "cgb")]
    dmg: bool,

    /// Force CGB mode
    #[arg(long, conflicts_with = "dmg")]
    cgb: bool,

    /// Number of frames to run before exiting
    #[arg(long)]
    frames: Option<u64>,

    /// Run as fast as possible instead of at 59.73 frames per second
    #[arg(long)]
    no_pacing: bool,

    /// Path to the config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the last frame to this PNG file on exit
    #[arg(long)]
    screenshot: Option<PathBuf>,

    /// Enable debug logging of CPU state
    #[arg(long)]
    debug: bool,
}

fn init_logging(debug: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if debug {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.debug);

    let config_path = args.config.clone().unwrap_or_else(config::default_config_path);
    let cfg = config::load_from_file(&config_path);
    debug!("Using config {}: {cfg:?}", config_path.display());

    let mode = if args.dmg {
        ModelOverride::ForceDmg
    } else if args.cgb {
        ModelOverride::ForceCgb
    } else {
        cfg.emulation_mode.into()
    };

    let cart = match Cartridge::from_file(&args.rom) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load ROM {}: {e}", args.rom.display());
            return ExitCode::FAILURE;
        }
    };

    let mut gb = GameBoy::with_cartridge(cart, mode);
    let options = SessionOptions {
        pacing: cfg.frame_pacing && !args.no_pacing,
        frame_limit: args.frames.or(cfg.frame_limit),
        save_on_exit: cfg.save_on_exit,
    };
    info!("Starting emulator ({options:?})");

    let mut presented = 0u64;
    let mut sink = |_frame: &[u32]| {
        presented += 1;
        if presented.is_multiple_of(60) {
            debug!("frame {presented}");
        }
    };
    let shutdown = ShutdownFlag::new();
    let interrupt = shutdown.clone();
    // Ctrl-C and SIGTERM end the session normally so battery RAM is saved.
    if let Err(e) = ctrlc::set_handler(move || interrupt.request()) {
        warn!("Failed to install signal handler: {e}");
    }
    let stats = session::run(&mut gb, &mut sink, &shutdown, options);

    if args.debug {
        debug!("{}", gb.cpu.debug_state());
    }

    if let Some(path) = &args.screenshot {
        match screenshot::save_png(gb.framebuffer(), path) {
            Ok(()) => info!("Saved frame {} to {}", stats.frames, path.display()),
            Err(e) => {
                error!("Failed to write screenshot {}: {e}", path.display());
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}
