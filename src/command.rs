use anyhow::Result;

/// Arguments of one command invocation; the first element is the command name.
///
/// Produced by [`crate::lexer::tokenize`] and never contains empty strings.
pub type Argv = Vec<String>;

/// What the read-eval loop should do after a command has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionSignal {
    /// Prompt for the next line.
    Continue,
    /// Leave the loop.
    Terminate,
}

impl ExecutionSignal {
    pub fn should_continue(self) -> bool {
        self == ExecutionSignal::Continue
    }
}

/// Runs a command that is not a builtin.
///
/// Implemented by [`crate::ProcessLauncher`]; the interpreter is generic
/// over it so dispatch can be observed without spawning processes.
pub trait Launch {
    /// Runs `argv[0]` with the remaining arguments and waits for it to finish.
    ///
    /// The program's own exit status is not an error. `Err` means the program
    /// could not be started or waited for; the caller reports it and carries on.
    fn launch(&mut self, argv: &[String]) -> Result<()>;
}
