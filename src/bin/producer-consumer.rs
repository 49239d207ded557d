//! Terminal front-end for the bounded buffer.
//!
//! Reads one command per line from stdin and runs each one on its own worker
//! thread. Outcome lines go to stdout; diagnostics go to stderr via tracing
//! (`RUST_LOG=info` also logs every outcome there).
//!
//! # Commands
//! - `produce` / `p`
//! - `consume` / `c`
//! - `exit` / `quit` / `q`
//!
//! # Usage
//! ```sh
//! producer-consumer --capacity 10
//! producer-consumer --script "ppp ccc" --sequential
//! ```

use std::io::{self, BufRead};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use bounded_buffer::{
    BUFFER_SIZE, BufferConfig, Invoker, LineSink, LogSink, Outcome, OutcomeSink, Request, Ticket,
};

#[derive(Parser, Debug)]
#[command(name = "producer-consumer")]
#[command(about = "Drive a bounded buffer with on-demand producers and consumers")]
struct Args {
    /// Number of buffer slots.
    #[arg(short, long, default_value_t = BUFFER_SIZE, env = "BUFFER_CAPACITY")]
    capacity: usize,

    /// Run a fixed sequence instead of reading stdin: `p` produces, `c`
    /// consumes, `x` or `q` exits. Whitespace is ignored.
    #[arg(short, long)]
    script: Option<String>,

    /// Wait for each request to finish before taking the next one.
    #[arg(long)]
    sequential: bool,
}

enum Command {
    Run(Request),
    Exit,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn parse_line(line: &str) -> Result<Option<Command>> {
    let word = line.trim();
    if word.is_empty() {
        return Ok(None);
    }
    match word.to_ascii_lowercase().as_str() {
        "exit" | "quit" | "q" => Ok(Some(Command::Exit)),
        _ => Ok(Some(Command::Run(word.parse()?))),
    }
}

fn parse_script(script: &str) -> Result<Vec<Command>> {
    let mut commands = Vec::new();
    for op in script.chars().filter(|c| !c.is_whitespace()) {
        let command = match op.to_ascii_lowercase() {
            'p' => Command::Run(Request::Produce),
            'c' => Command::Run(Request::Consume),
            'x' | 'q' => Command::Exit,
            other => bail!("unknown script op {:?}", other),
        };
        commands.push(command);
    }
    Ok(commands)
}

/// Submits commands and tracks the tickets still in flight.
struct Session {
    invoker: Invoker,
    sequential: bool,
    pending: Vec<Ticket>,
}

impl Session {
    fn run(&mut self, request: Request) -> Result<()> {
        let ticket = self
            .invoker
            .submit(request)
            .with_context(|| format!("could not start {:?} request", request))?;

        if self.sequential {
            ticket.wait();
        } else {
            Invoker::reap_finished(&mut self.pending);
            self.pending.push(ticket);
        }
        Ok(())
    }

    fn finish(self) {
        debug!(pending = self.pending.len(), "waiting for outstanding requests");
        Invoker::wait_all(self.pending);
    }
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let config = BufferConfig::with_capacity(args.capacity);
    let buffer = Arc::new(config.build().context("invalid buffer configuration")?);
    let (producer, consumer) = bounded_buffer::split(Arc::clone(&buffer));

    println!("Buffer Log:");
    // Outcome lines on stdout, plus a tracing event per outcome on stderr
    let lines = LineSink::new(io::stdout());
    let sink = Arc::new(move |outcome: &Outcome| {
        lines.notify(outcome);
        LogSink.notify(outcome);
    });
    let mut session = Session {
        invoker: Invoker::new(producer, consumer, sink),
        sequential: args.sequential,
        pending: Vec::new(),
    };

    info!(capacity = buffer.capacity(), "buffer ready");

    match args.script {
        Some(script) => {
            for command in parse_script(&script)? {
                match command {
                    Command::Run(request) => session.run(request)?,
                    Command::Exit => break,
                }
            }
        }
        None => {
            for line in io::stdin().lock().lines() {
                let line = line.context("failed to read command")?;
                match parse_line(&line) {
                    Ok(Some(Command::Run(request))) => session.run(request)?,
                    Ok(Some(Command::Exit)) => break,
                    Ok(None) => {}
                    Err(err) => eprintln!("{:#}", err),
                }
            }
        }
    }

    session.finish();

    let counts = buffer.slot_counts();
    info!(empty = counts.empty, full = counts.full, "exiting");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_script() {
        let commands = parse_script("pp c\tx p").unwrap();
        assert_eq!(commands.len(), 5);
        assert!(matches!(commands[0], Command::Run(Request::Produce)));
        assert!(matches!(commands[2], Command::Run(Request::Consume)));
        assert!(matches!(commands[3], Command::Exit));
        assert!(parse_script("pz").is_err());
    }

    #[test]
    fn test_parse_line() {
        assert!(matches!(parse_line("produce").unwrap(), Some(Command::Run(Request::Produce))));
        assert!(matches!(parse_line(" C ").unwrap(), Some(Command::Run(Request::Consume))));
        assert!(matches!(parse_line("Exit").unwrap(), Some(Command::Exit)));
        assert!(parse_line("   ").unwrap().is_none());
        assert!(parse_line("steal").is_err());
    }
}
