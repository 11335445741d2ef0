
use emu_lib::{Emulator, HaltReason};
use emu_lib::io::Cancel;
use emu_lib::io::terminal::RawModeGuard;
use emu_lib::io::tty::StdIo;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{CommandFactory, Parser};
use log::warn;

// What exit(-2) looks like to the shell.
const INTERRUPTED_STATUS: u8 = 254;

const HALT_NOTICE: &str = "halt";

/// LC-3 Emulator
#[derive(Parser)]
#[command(about)]
struct Args {
    /// Image to execute. The first word is the load address.
    image: Option<PathBuf>,

    /// Address at which to start executing (x3000, 0x3000 or decimal).
    #[arg(long, default_value = "x3000", value_parser = parse_addr)]
    start: u16,
}

// Printed once the terminal is restored.
#[derive(Debug, PartialEq, Eq)]
enum Report {
    Out(String),
    Err(String),
}

fn outcome(reason: Option<&HaltReason>) -> (Report, u8) {
    match reason {
        Some(HaltReason::Halted) | None => (Report::Out(HALT_NOTICE.to_string()), 0),
        Some(HaltReason::Interrupted) => (Report::Out(String::new()), INTERRUPTED_STATUS),
        Some(reason) => (Report::Err(reason.to_string()), 0),
    }
}

fn parse_addr(s: &str) -> Result<u16, String> {
    let res = match s.strip_prefix("0x").or_else(|| s.strip_prefix('x')) {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => s.parse(),
    };
    res.map_err(|err| format!("bad address {s:?}: {err}"))
}


fn main() -> ExitCode {
    env_logger::init();

    let opt = Args::parse();
    let Some(path) = opt.image else {
        if let Err(err) = Args::command().print_help() {
            eprintln!("{err}");
        }
        return ExitCode::SUCCESS;
    };

    let cancel = Cancel::new();
    let tty = Arc::new(StdIo::new(cancel.clone()));
    let mut emu = Emulator::with_cancel(tty, cancel);

    if let Err(err) = emu.load_image_file(&path) {
        println!("can't load {}: {err}", path.display());
        return ExitCode::SUCCESS;
    }

    {
        // Restored when this scope ends, however the run ended.
        let _raw = match RawModeGuard::acquire() {
            Ok(guard) => Some(guard),
            Err(err) => {
                warn!("Can't enable raw mode, input will be line buffered: {err}");
                None
            },
        };
        emu.run_at(opt.start);
    }

    let (report, status) = outcome(emu.halt_reason());
    match report {
        Report::Out(msg) => println!("{msg}"),
        Report::Err(msg) => eprintln!("{msg}"),
    }
    ExitCode::from(status)
}
