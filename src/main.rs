//! DCPU-16 Emulator - CLI Entry Point
//!
//! Commands:
//! - `dcpu-emu run <image>` - Run a program image until PC leaves it
//! - `dcpu-emu debug <image>` - Interactive debugger
//! - `dcpu-emu dump <image>` - Print the memory map of a loaded image

use clap::{ArgAction, Parser, Subcommand};
use log::LevelFilter;
use simple_logger::SimpleLogger;

#[derive(Parser)]
#[command(name = "dcpu-emu")]
#[command(version)]
#[command(about = "An interpreter for the DCPU-16, a fictional 16-bit CPU")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a program until PC leaves the loaded image
    Run {
        /// Path to the binary image (little-endian 16-bit words)
        image: String,
        /// Stop after this many instructions even if PC is still in the image
        #[arg(short, long)]
        max_steps: Option<u64>,
        /// Print the register file after every instruction
        #[arg(short, long)]
        trace: bool,
        /// Print the memory map after the run
        #[arg(short, long)]
        dump: bool,
        /// Print the final machine state as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
    /// Interactive debugger
    #[cfg(feature = "tui")]
    Debug {
        /// Path to the binary image
        image: String,
    },
    /// Print the memory map of a freshly loaded image
    Dump {
        /// Path to the binary image
        image: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Some(Commands::Run { image, max_steps, trace, dump, json }) => {
            run_program(&image, max_steps, trace, dump, json);
        }
        #[cfg(feature = "tui")]
        Some(Commands::Debug { image }) => {
            debug_program(&image);
        }
        Some(Commands::Dump { image }) => {
            dump_image(&image);
        }
        None => {
            println!("DCPU-16 Emulator v{}", env!("CARGO_PKG_VERSION"));
            println!("A 16-bit word-addressed CPU interpreter");
            println!();
            println!("Use --help for available commands");
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    if let Err(e) = SimpleLogger::new().with_level(level).init() {
        eprintln!("❌ Failed to initialize logging: {}", e);
    }
}

fn load_or_exit(path: &str) -> Vec<dcpu::Word> {
    match dcpu::load_image(path) {
        Ok(words) => words,
        Err(e) => {
            eprintln!("❌ Failed to load image: {}", e);
            std::process::exit(1);
        }
    }
}

fn run_program(path: &str, max_steps: Option<u64>, trace: bool, dump: bool, json: bool) {
    use dcpu::{memory_map, Cpu};

    let program = load_or_exit(path);
    if !json {
        println!("🔧 Running: {} ({} words)", path, program.len());
    }

    let mut cpu = match Cpu::with_program(&program) {
        Ok(cpu) => cpu,
        Err(e) => {
            eprintln!("❌ Failed to load program: {}", e);
            std::process::exit(1);
        }
    };

    if trace {
        println!("      {}", cpu.regs);
    }

    let mut fault_pc = cpu.regs.pc;
    let outcome = cpu.run_observed(max_steps.unwrap_or(u64::MAX), |pc, cpu| {
        if trace {
            println!("{:04x}: {}", pc, cpu.regs);
        }
        fault_pc = cpu.regs.pc;
    });
    if let Err(e) = outcome {
        eprintln!("❌ Fault at PC={:04x}: {}", fault_pc, e);
        std::process::exit(1);
    }

    if json {
        match serde_json::to_string_pretty(&cpu) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("❌ Failed to serialize state: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        println!();
        println!("━━━ Result ━━━");
        println!("Steps: {}", cpu.steps);
        println!("State: {:?}", cpu.state);
        println!("{}", cpu.regs);

        if cpu.is_running() {
            println!();
            println!("⚠️  Stopped at the step budget ({}) with PC still inside the image.", cpu.steps);
        }
    }

    if dump {
        print!("{}", memory_map(&cpu.mem));
    }
}

#[cfg(feature = "tui")]
fn debug_program(path: &str) {
    use dcpu::run_debugger;

    let program = load_or_exit(path);
    println!("🚀 Launching debugger for {} ({} words)...", path, program.len());

    if let Err(e) = run_debugger(&program) {
        eprintln!("❌ Debugger error: {}", e);
        std::process::exit(1);
    }
}

fn dump_image(path: &str) {
    use dcpu::{memory_map, Cpu};

    let program = load_or_exit(path);
    match Cpu::with_program(&program) {
        Ok(cpu) => print!("{}", memory_map(&cpu.mem)),
        Err(e) => {
            eprintln!("❌ Failed to load program: {}", e);
            std::process::exit(1);
        }
    }
}
