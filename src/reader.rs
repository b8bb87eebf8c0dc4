//! Cancellable line input.
//!
//! Lines are read on a dedicated thread, one per request, so nothing touches
//! standard input while a launched program may be reading it. The reader thread
//! and the SIGINT handler report into one channel and the loop takes whichever
//! event comes first.

use crate::signal::{InterruptCount, Interrupter};
use anyhow::{Context, Result, anyhow};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::fs::File;
use std::io::{self, Read, Write};
use std::os::fd::AsFd;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use tracing::{debug, warn};

/// Result of one cancellable read.
#[derive(Debug)]
pub enum ReadOutcome {
    /// A line without its terminating newline.
    Line(String),
    /// The read was interrupted; the loop should start over.
    Interrupted,
    /// No more input.
    Eof,
    /// Reading failed.
    Failed(io::Error),
}

/// What wakes a waiting [`LineReader`].
#[derive(Debug)]
pub(crate) enum Event {
    /// The reader thread finished a request.
    Read(ReadOutcome),
    /// SIGINT arrived while the loop was armed.
    Interrupt,
}

/// A blocking source of lines, driven from the reader thread.
pub trait LineSource {
    /// Whether [`LineSource::read_line`] displays the prompt itself.
    const SHOWS_PROMPT: bool;

    /// Reads one line. Input that arrived before `interrupts` last changed
    /// belongs to an abandoned line and must not be returned.
    fn read_line(&mut self, prompt: &str, interrupts: &InterruptCount) -> ReadOutcome;
}

/// Reads raw lines; the prompt is printed by the loop.
///
/// Input is consumed one byte at a time, so nothing past the newline is taken
/// away from a program launched by the line. Bytes collected before an
/// interrupt are dropped once the next byte arrives.
pub struct PlainSource<R> {
    input: R,
}

impl<R: Read> PlainSource<R> {
    pub fn new(input: R) -> Self {
        Self { input }
    }

    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut byte = [0u8; 1];
        loop {
            match self.input.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(byte[0])),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

impl<R: Read> LineSource for PlainSource<R> {
    const SHOWS_PROMPT: bool = false;

    fn read_line(&mut self, _prompt: &str, interrupts: &InterruptCount) -> ReadOutcome {
        let mut buf = Vec::new();
        let mut seen = interrupts.get();
        loop {
            let next = self.read_byte();
            let now = interrupts.get();
            if now != seen {
                debug!(dropped = buf.len(), "discarding input read before interrupt");
                buf.clear();
                seen = now;
            }
            match next {
                Ok(Some(b'\n')) => break,
                Ok(Some(byte)) => buf.push(byte),
                // A last line without a newline still counts.
                Ok(None) if buf.is_empty() => return ReadOutcome::Eof,
                Ok(None) => break,
                Err(e) => return ReadOutcome::Failed(e),
            }
        }
        ReadOutcome::Line(String::from_utf8_lossy(&buf).into_owned())
    }
}

/// Interactive line editing with in-memory history.
///
/// Ctrl-C while editing does not raise SIGINT (the terminal is in raw mode); the
/// editor reports it instead, drops the edited line and it is treated the same
/// way.
pub struct EditorSource {
    editor: DefaultEditor,
}

impl EditorSource {
    pub fn new() -> Result<Self> {
        let editor = DefaultEditor::new().context("failed to initialize line editor")?;
        Ok(Self { editor })
    }
}

impl LineSource for EditorSource {
    const SHOWS_PROMPT: bool = true;

    fn read_line(&mut self, prompt: &str, _interrupts: &InterruptCount) -> ReadOutcome {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    if let Err(e) = self.editor.add_history_entry(line.as_str()) {
                        debug!("failed to record history: {e}");
                    }
                }
                ReadOutcome::Line(line)
            }
            Err(ReadlineError::Interrupted) => ReadOutcome::Interrupted,
            Err(ReadlineError::Eof) => ReadOutcome::Eof,
            Err(ReadlineError::Io(e)) => ReadOutcome::Failed(e),
            Err(e) => ReadOutcome::Failed(io::Error::other(e.to_string())),
        }
    }
}

/// Line input for the read-eval loop, cancellable by SIGINT.
pub struct LineReader {
    requests: Sender<String>,
    events: Receiver<Event>,
    interrupter: Interrupter,
    source_shows_prompt: bool,
    in_flight: bool,
}

impl LineReader {
    /// Starts a reader thread over the source built by `make`.
    ///
    /// `make` runs on the reader thread, so the source itself does not need to be
    /// `Send`. Its error is returned here.
    pub fn spawn<S, F>(make: F) -> Result<Self>
    where
        S: LineSource + 'static,
        F: FnOnce() -> Result<S> + Send + 'static,
    {
        let (request_tx, request_rx) = mpsc::channel::<String>();
        let (event_tx, event_rx) = mpsc::channel();
        let (ready_tx, ready_rx) = mpsc::channel();
        let worker_events = event_tx.clone();
        let interrupter = Interrupter::new(event_tx);
        let interrupts = interrupter.count().clone();

        thread::Builder::new()
            .name("esh-reader".to_string())
            .spawn(move || {
                let source = match make() {
                    Ok(source) => {
                        let _ = ready_tx.send(Ok(()));
                        source
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                serve(source, request_rx, worker_events, interrupts);
            })
            .context("failed to start reader thread")?;

        ready_rx
            .recv()
            .map_err(|_| anyhow!("reader thread exited during startup"))??;

        Ok(Self {
            requests: request_tx,
            events: event_rx,
            interrupter,
            source_shows_prompt: S::SHOWS_PROMPT,
            in_flight: false,
        })
    }

    /// Reads standard input, using the line editor when `interactive` is set.
    ///
    /// Falls back to plain reading if the editor cannot be set up.
    pub fn stdin(interactive: bool) -> Result<Self> {
        if interactive {
            match Self::spawn(EditorSource::new) {
                Ok(reader) => return Ok(reader),
                Err(e) => warn!("line editing unavailable, reading plain input: {e:#}"),
            }
        }
        Self::spawn(|| {
            // A private handle on fd 0 bypasses the buffering of `io::stdin()`.
            let input = io::stdin()
                .as_fd()
                .try_clone_to_owned()
                .context("failed to duplicate standard input")?;
            Ok(PlainSource::new(File::from(input)))
        })
    }

    /// Handle for the SIGINT handler and for arming the loop.
    pub fn interrupter(&self) -> &Interrupter {
        &self.interrupter
    }

    /// Shows `prompt` on `out` (unless the source does) and waits for a line.
    ///
    /// An interrupted read stays pending on the reader thread, and the next call
    /// waits for it instead of starting another one. An interrupt that arrived
    /// while no read was pending is reported before anything is shown.
    pub fn read_line(&mut self, prompt: &str, out: &mut dyn Write) -> ReadOutcome {
        if !self.in_flight {
            match self.events.try_recv() {
                Ok(Event::Interrupt) => return ReadOutcome::Interrupted,
                Ok(Event::Read(outcome)) => return outcome,
                Err(_) => {}
            }
        }
        if !self.source_shows_prompt || self.in_flight {
            if let Err(e) = write!(out, "{prompt}").and_then(|()| out.flush()) {
                return ReadOutcome::Failed(e);
            }
        }
        if !self.in_flight {
            if self.requests.send(prompt.to_string()).is_err() {
                // The reader thread stops after end of input.
                return ReadOutcome::Eof;
            }
            self.in_flight = true;
        }

        match self.events.recv() {
            Ok(Event::Read(outcome)) => {
                self.in_flight = false;
                outcome
            }
            Ok(Event::Interrupt) => ReadOutcome::Interrupted,
            Err(_) => ReadOutcome::Eof,
        }
    }
}

fn serve<S: LineSource>(
    mut source: S,
    requests: Receiver<String>,
    events: Sender<Event>,
    interrupts: InterruptCount,
) {
    for prompt in requests {
        let outcome = source.read_line(&prompt, &interrupts);
        let finished = matches!(outcome, ReadOutcome::Eof | ReadOutcome::Failed(_));
        if events.send(Event::Read(outcome)).is_err() || finished {
            break;
        }
    }
    debug!("reader thread finished");
}
