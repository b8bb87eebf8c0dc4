use anyhow::Result;
use esh::{Interpreter, LineReader, Options};
use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let options: Options = argh::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(options.log_level())),
        )
        .with_writer(std::io::stderr)
        .init();

    if !options.quiet {
        println!("Welcome to the Evanjo shell!");
    }

    let interactive = !options.plain && std::io::stdin().is_terminal();
    let mut reader = LineReader::stdin(interactive)?;
    // Until the loop arms it, the handler ignores Ctrl-C.
    reader.interrupter().install_handler()?;

    let mut shell: Interpreter = Interpreter::default().with_options(&options);
    shell.repl(&mut reader)
}
