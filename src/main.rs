use std::error::Error;
use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::Mutex;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use chip8::display::MonoTermDisplay;
use chip8::input::TermInput;
use chip8::instruction::disassemble;
use chip8::memory::CHIP8_PROGRAM_ADDR;
use chip8::sound::{Mute, SimpleBeep, Sound};
use chip8::{Chip8Error, Config, Environment, Quirks, SpriteEdge};

/// Run a CHIP-8 program in the terminal
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// program image, loaded at 0x200
    rom: PathBuf,

    /// instructions per frame
    #[arg(long, default_value_t = 10)]
    cycles: u32,

    /// frames (timer ticks) per second
    #[arg(long, default_value_t = 60.0)]
    fps: f64,

    /// terminal cells per CHIP-8 pixel
    #[arg(long, default_value_t = 1)]
    scale: u16,

    /// seed for RND, for repeatable runs
    #[arg(long)]
    seed: Option<u64>,

    /// drop sprite pixels past the screen edge instead of wrapping them
    #[arg(long)]
    clip_sprites: bool,

    /// leave I alone after FX55/FX65
    #[arg(long)]
    no_index_advance: bool,

    /// stop after this many frames
    #[arg(long)]
    max_frames: Option<u64>,

    /// write logs here (filtered by RUST_LOG); the terminal belongs to the display
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// print a listing of the program and exit
    #[arg(long)]
    disassemble: bool,

    /// no beeping
    #[arg(long)]
    mute: bool,
}

impl Args {
    fn config(&self) -> Config {
        Config {
            quirks: Quirks {
                sprite_edge: if self.clip_sprites {
                    SpriteEdge::Clip
                } else {
                    SpriteEdge::Wrap
                },
                index_advance: !self.no_index_advance,
            },
            cycles_per_frame: self.cycles,
            frame_rate: self.fps,
            scale: self.scale,
            rng_seed: self.seed,
        }
    }
}

fn init_logging(args: &Args) -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match &args.log_file {
        Some(path) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(File::create(path)?))
            .init(),
        // nowhere safe to log to while the display is up
        None if !args.disassemble => {}
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
    }
    Ok(())
}

fn print_listing(program: &[u8]) {
    for (addr, decoded) in disassemble(program, CHIP8_PROGRAM_ADDR) {
        match decoded {
            Ok(instruction) => println!("{:03X}: {}", addr, instruction),
            Err(word) => println!("{:03X}: {:04X}  ; data", addr, word),
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_logging(&args)?;

    if args.disassemble {
        print_listing(&fs::read(&args.rom)?);
        return Ok(());
    }

    // initialise
    let config = args.config();
    let mut display = MonoTermDisplay::new(config.scale)?;
    let mut input = TermInput::new()?;
    let mut sound: Box<dyn Sound> = if args.mute {
        Box::new(Mute::new())
    } else {
        Box::new(SimpleBeep::new())
    };
    let mut environment = Environment::new(config, &mut display, &mut input, sound.as_mut());

    // load a program
    let mut f = File::open(&args.rom)?;
    environment.load_program(&mut f)?;
    let result = environment.main_loop(args.max_frames);
    drop(environment);
    drop(input);

    // shove some junk on stdout to stop the cli messing up the last frame
    for _ in 0..4 {
        println!();
    }
    if let Err(Chip8Error::Halted(diagnostics)) = &result {
        eprintln!("halted: {}", diagnostics);
    }
    result?;
    Ok(())
}
