use crate::builtin;
use crate::command::{ExecutionSignal, Launch};
use crate::config::Options;
use crate::external::ProcessLauncher;
use crate::lexer;
use crate::reader::{LineReader, ReadOutcome};
use anyhow::Result;
use std::io::{self, Write};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

/// Printed when the loop starts over because of Ctrl-C.
pub const RESTART_NOTICE: &str = "SIGINT caught. Restarting...";

/// A minimal shell-like interpreter that can execute built-in and external commands.
///
/// Each input line holds exactly one command. Builtins from
/// [`builtin::BUILTINS`] run in-process; anything else is handed to the
/// [`Launch`] implementation. See [`Default`] for the setup used by the `esh`
/// binary.
///
/// Example
/// ```
/// use esh::{ExecutionSignal, Interpreter};
/// let mut sh: Interpreter = Interpreter::default();
/// let argv = vec!["exit".to_string()];
/// assert_eq!(sh.execute(&argv), ExecutionSignal::Terminate);
/// ```
pub struct Interpreter<L = ProcessLauncher> {
    launcher: L,
    stdout: Box<dyn Write>,
    stderr: Box<dyn Write>,
    prompt: String,
    restart_pause: Duration,
}

impl<L: Launch> Interpreter<L> {
    /// Create an interpreter that writes to the given streams.
    pub fn new(launcher: L, stdout: Box<dyn Write>, stderr: Box<dyn Write>) -> Self {
        let options = Options::default();
        Self {
            launcher,
            stdout,
            stderr,
            prompt: options.prompt.clone(),
            restart_pause: options.restart_pause(),
        }
    }

    /// Take the prompt and restart pause from command-line options.
    pub fn with_options(mut self, options: &Options) -> Self {
        self.prompt = options.prompt.clone();
        self.restart_pause = options.restart_pause();
        self
    }

    /// Run one already tokenized command.
    ///
    /// An empty `argv` does nothing. Errors of builtins and launches are printed
    /// to the error stream and never end the loop; only `exit` does.
    pub fn execute(&mut self, argv: &[String]) -> ExecutionSignal {
        let Some(name) = argv.first() else {
            return ExecutionSignal::Continue;
        };

        if let Some(builtin) = builtin::lookup(name) {
            debug!(builtin = builtin.name, "running builtin");
            let res = (builtin.run)(argv, &mut self.stdout);
            let _ = self.stdout.flush();
            return match res {
                Ok(signal) => signal,
                Err(e) => {
                    self.report(&e);
                    ExecutionSignal::Continue
                }
            };
        }

        // Anything buffered must reach the terminal before the child writes to it.
        let _ = self.stdout.flush();
        debug!(program = %name, "launching external program");
        if let Err(e) = self.launcher.launch(argv) {
            self.report(&e);
        }
        ExecutionSignal::Continue
    }

    /// The read-eval loop.
    ///
    /// Every iteration arms the interrupt handling, prompts, reads one line,
    /// tokenizes and runs it. Ctrl-C while armed restarts the iteration after
    /// printing [`RESTART_NOTICE`] and pausing. Returns after `exit` or at the
    /// end of input.
    pub fn repl(&mut self, reader: &mut LineReader) -> Result<()> {
        let mut restarted = false;
        loop {
            reader.interrupter().arm();
            if restarted {
                writeln!(self.stdout, "{RESTART_NOTICE}")?;
                self.stdout.flush()?;
                thread::sleep(self.restart_pause);
            }

            let line = match reader.read_line(&self.prompt, &mut self.stdout) {
                ReadOutcome::Line(line) => line,
                ReadOutcome::Interrupted => {
                    debug!("read interrupted, restarting loop");
                    restarted = true;
                    continue;
                }
                ReadOutcome::Eof => {
                    debug!("end of input");
                    break;
                }
                ReadOutcome::Failed(e) => {
                    warn!("reading input failed: {e}");
                    let _ = writeln!(self.stderr, "esh: failed to read input: {e}");
                    break;
                }
            };
            restarted = false;

            let argv = lexer::tokenize(&line);
            if !self.execute(&argv).should_continue() {
                break;
            }
        }
        Ok(())
    }

    fn report(&mut self, err: &anyhow::Error) {
        let _ = writeln!(self.stderr, "esh: {err:#}");
        let _ = self.stderr.flush();
    }
}

impl Default for Interpreter {
    /// Create an interpreter that launches real processes and writes to the
    /// process's standard streams.
    fn default() -> Self {
        Self::new(
            ProcessLauncher::new(),
            Box::new(io::stdout()),
            Box::new(io::stderr()),
        )
    }
}
