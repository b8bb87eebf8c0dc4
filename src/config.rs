use argh::FromArgs;
use std::time::Duration;

/// Prompt shown before every line.
pub const DEFAULT_PROMPT: &str = "esh=$ ";

/// Pause after an interrupt before prompting again, in milliseconds.
pub const DEFAULT_RESTART_PAUSE_MS: u64 = 1000;

#[derive(FromArgs, Debug, Clone, PartialEq, Eq)]
/// Evanjo SHell: run builtins and external programs, one command per line.
pub struct Options {
    #[argh(option, default = "DEFAULT_PROMPT.to_string()")]
    /// prompt printed before reading each line
    pub prompt: String,

    #[argh(option, default = "DEFAULT_RESTART_PAUSE_MS")]
    /// milliseconds to wait after Ctrl-C before prompting again
    pub restart_pause_ms: u64,

    #[argh(switch)]
    /// read plain lines even when standard input is a terminal
    pub plain: bool,

    #[argh(switch, short = 'q')]
    /// do not print the welcome banner
    pub quiet: bool,

    #[argh(switch, short = 'd')]
    /// log at debug level (overridden by RUST_LOG)
    pub debug: bool,
}

impl Options {
    pub fn restart_pause(&self) -> Duration {
        Duration::from_millis(self.restart_pause_ms)
    }

    /// Default log filter when `RUST_LOG` is not set.
    pub fn log_level(&self) -> &'static str {
        if self.debug { "debug" } else { "warn" }
    }
}

impl Default for Options {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
            restart_pause_ms: DEFAULT_RESTART_PAUSE_MS,
            plain: false,
            quiet: false,
            debug: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Options {
        Options::from_args(&["esh"], args).unwrap_or_else(|e| panic!("{}", e.output))
    }

    #[test]
    fn test_defaults_match_empty_command_line() {
        assert_eq!(parse(&[]), Options::default());
        assert_eq!(Options::default().prompt, "esh=$ ");
        assert_eq!(Options::default().restart_pause(), Duration::from_secs(1));
        assert_eq!(Options::default().log_level(), "warn");
    }

    #[test]
    fn test_all_options() {
        let options = parse(&[
            "--prompt",
            "> ",
            "--restart-pause-ms",
            "5",
            "--plain",
            "-q",
            "--debug",
        ]);
        assert_eq!(options.prompt, "> ");
        assert_eq!(options.restart_pause(), Duration::from_millis(5));
        assert!(options.plain);
        assert!(options.quiet);
        assert_eq!(options.log_level(), "debug");
    }

    #[test]
    fn test_invalid_pause_is_rejected() {
        assert!(Options::from_args(&["esh"], &["--restart-pause-ms", "soon"]).is_err());
    }
}
