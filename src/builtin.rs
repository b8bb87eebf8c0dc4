use crate::command::ExecutionSignal;
use anyhow::{Context, Result, anyhow};
use argh::{EarlyExit, FromArgs};
use std::env;
use std::io::Write;

/// Signature shared by every entry of the builtin table.
///
/// Receives the full argument vector (command name included) and the shell's
/// standard output. Errors are returned, not printed.
pub type BuiltinFn = fn(&[String], &mut dyn Write) -> Result<ExecutionSignal>;

/// One named operation of the builtin table.
#[derive(Clone, Copy)]
pub struct BuiltinEntry {
    pub name: &'static str,
    pub run: BuiltinFn,
}

impl std::fmt::Debug for BuiltinEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuiltinEntry")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Commands implemented inside the shell process, in the order `help` lists them.
pub static BUILTINS: [BuiltinEntry; 4] = [
    entry::<Cd>(),
    entry::<Help>(),
    entry::<Exit>(),
    entry::<Pwd>(),
];

/// Finds the builtin called exactly `name` (case-sensitive).
pub fn lookup(name: &str) -> Option<&'static BuiltinEntry> {
    BUILTINS.iter().find(|builtin| builtin.name == name)
}

const fn entry<T: BuiltinCommand>() -> BuiltinEntry {
    BuiltinEntry {
        name: T::NAME,
        run: T::invoke,
    }
}

/// Built-in commands known to the shell at compile time.
///
/// Builtins are parsed using the [`argh`] crate (`FromArgs`) and executed directly
/// in-process without spawning a child process.
pub(crate) trait BuiltinCommand: Sized + FromArgs {
    /// Canonical name of the command, e.g. "pwd" or "cd".
    const NAME: &'static str;

    /// Executes the already parsed command.
    fn execute(self, stdout: &mut dyn Write) -> Result<ExecutionSignal>;

    /// Parses `argv` and runs the command.
    ///
    /// `--help` prints the command's usage and continues. Arguments the command
    /// does not accept are a usage error.
    fn invoke(argv: &[String], stdout: &mut dyn Write) -> Result<ExecutionSignal> {
        let args: Vec<&str> = argv.iter().skip(1).map(String::as_str).collect();
        match Self::from_args(&[Self::NAME], &args) {
            Ok(cmd) => cmd.execute(stdout),
            Err(EarlyExit {
                output,
                status: Ok(()),
            }) => {
                stdout.write_all(output.as_bytes())?;
                Ok(ExecutionSignal::Continue)
            }
            Err(EarlyExit {
                output,
                status: Err(()),
            }) => Err(anyhow!("{}: {}", Self::NAME, output.trim_end())),
        }
    }
}

#[derive(FromArgs)]
/// Change the current working directory of the shell.
pub struct Cd {
    #[argh(positional)]
    /// directory to switch to; absolute or relative to the current directory.
    pub target: Option<String>,
}

impl BuiltinCommand for Cd {
    const NAME: &'static str = "cd";

    fn execute(self, _stdout: &mut dyn Write) -> Result<ExecutionSignal> {
        let Some(target) = self.target else {
            return Err(anyhow!("expected argument to \"cd\""));
        };
        env::set_current_dir(&target).with_context(|| format!("cd: {target}"))?;
        Ok(ExecutionSignal::Continue)
    }
}

#[derive(FromArgs)]
/// Print the current working directory to standard output.
pub struct Pwd {}

impl BuiltinCommand for Pwd {
    const NAME: &'static str = "pwd";

    fn execute(self, stdout: &mut dyn Write) -> Result<ExecutionSignal> {
        let cwd = env::current_dir().context("pwd")?;
        writeln!(stdout, "{}", cwd.display())?;
        Ok(ExecutionSignal::Continue)
    }
}

#[derive(FromArgs)]
/// List the commands built into the shell.
pub struct Help {}

impl BuiltinCommand for Help {
    const NAME: &'static str = "help";

    fn execute(self, stdout: &mut dyn Write) -> Result<ExecutionSignal> {
        writeln!(stdout, "Evanjo SHell.")?;
        writeln!(stdout, "The following are built-in:")?;
        for builtin in &BUILTINS {
            writeln!(stdout, "  {}", builtin.name)?;
        }
        Ok(ExecutionSignal::Continue)
    }
}

#[derive(FromArgs)]
/// Exit the shell.
pub struct Exit {}

impl BuiltinCommand for Exit {
    const NAME: &'static str = "exit";

    fn execute(self, _stdout: &mut dyn Write) -> Result<ExecutionSignal> {
        Ok(ExecutionSignal::Terminate)
    }

    /// `exit` terminates whatever arguments it is given.
    fn invoke(_argv: &[String], stdout: &mut dyn Write) -> Result<ExecutionSignal> {
        Exit {}.execute(stdout)
    }
}
