pub mod emulator;
pub mod emulator_state;
pub mod io;
pub mod loader;

pub use emulator::{Emulator, ExecRet, HaltReason, RunState};
pub use emulator_state::{Cond, EmulatorState};
pub use io::MMIOHandler;
pub use loader::{Image, LoadError};
