//! esh, the Evanjo SHell: a small interactive command interpreter.
//!
//! Each input line is split into words and run as exactly one command: a
//! builtin (`cd`, `help`, `exit`, `pwd`) executed in-process, or an external
//! program launched as a child process and waited for. There are no pipelines,
//! redirections, quoting or variables.
//!
//! The main entry point is [`Interpreter`]. Its read-eval loop reads through a
//! [`LineReader`], whose pending read can be cancelled by Ctrl-C once the loop is
//! armed (see [`signal`]), so an interrupt restarts the loop instead of killing
//! the shell.

pub mod builtin;
pub mod command;
pub mod config;
mod external;
mod interpreter;
#[cfg(test)]
mod io_adapters;
pub mod lexer;
pub mod reader;
pub mod signal;

pub use command::{Argv, ExecutionSignal, Launch};
pub use config::Options;
pub use external::ProcessLauncher;
/// Just a convenient re-export of the interactive command runner.
///
/// See [`Interpreter`] for the high-level API and examples.
pub use interpreter::{Interpreter, RESTART_NOTICE};
pub use reader::{LineReader, ReadOutcome};
