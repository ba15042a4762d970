//! Run command implementation

use anyhow::{bail, Context, Result};
use std::collections::VecDeque;
use std::path::PathBuf;
use tokio::sync::mpsc;

use starless::config::Config;
use starless::starnet::{self, ProcessRegistry, StarnetRunner, ToolRunner};
use starless::store::SettingsStore;
use starless::{LogEvent, LogEventKind};

/// Output lines kept for the summary when auto scroll is off
const TAIL_LINES: usize = 20;

pub struct RunOptions {
    pub input: PathBuf,
    pub stride: Option<u32>,
    pub json: bool,
    pub keep_input: bool,
}

/// Run starnet++ on `options.input` with the current settings
pub async fn run_command(store: &SettingsStore, config: &Config, options: RunOptions) -> Result<()> {
    let mut invocation = starnet::invocation_for(store, &config.runner)?
        .with_source(&options.input);
    if let Some(stride) = options.stride {
        invocation = invocation.with_stride(stride);
    }

    invocation
        .stage_input()
        .await
        .with_context(|| format!("Failed to stage {}", options.input.display()))?;

    let registry = ProcessRegistry::new();
    let runner = StarnetRunner::new(registry.clone(), &config.runner);

    let (event_tx, mut event_rx) = mpsc::channel::<LogEvent>(256);
    // Auto scroll: follow the tool live; otherwise only show the tail at the end
    let follow = store.auto_scroll();
    let json = options.json;
    let printer = tokio::spawn(async move {
        let mut tail: VecDeque<LogEvent> = VecDeque::with_capacity(TAIL_LINES);
        while let Some(event) = event_rx.recv().await {
            let is_line = matches!(event.kind, LogEventKind::Stdout | LogEventKind::Stderr);
            if json {
                match serde_json::to_string(&event) {
                    Ok(line) => println!("{}", line),
                    Err(e) => tracing::warn!("Failed to encode event: {}", e),
                }
            } else if follow || !is_line {
                print_event(&event);
            } else {
                if tail.len() == TAIL_LINES {
                    tail.pop_front();
                }
                tail.push_back(event);
            }
        }
        for event in tail {
            print_event(&event);
        }
    });

    let run = runner.run(&invocation, event_tx);
    tokio::pin!(run);
    let outcome = loop {
        tokio::select! {
            result = &mut run => break result,
            _ = tokio::signal::ctrl_c() => {
                eprintln!("Interrupted, stopping starnet++");
                registry.kill_all();
            }
        }
    };

    // The sender was moved into the run, so the printer ends once it is done
    let _ = printer.await;

    if !options.keep_input {
        if let Err(e) = invocation.cleanup_input().await {
            tracing::warn!("{}", e);
        }
    }

    let outcome = outcome?;
    if !outcome.success {
        bail!(
            "starnet++ failed (exit code {})",
            outcome
                .exit_code
                .map(|c| c.to_string())
                .unwrap_or_else(|| "none".to_string())
        );
    }

    if !options.json {
        if outcome.output_exists {
            eprintln!("Wrote {}", outcome.output_path.display());
        } else {
            eprintln!(
                "starnet++ finished but {} was not created",
                outcome.output_path.display()
            );
        }
    }

    Ok(())
}

fn print_event(event: &LogEvent) {
    match event.kind {
        LogEventKind::Stdout => println!("{}", event.message),
        LogEventKind::Stderr | LogEventKind::Error => eprintln!("{}", event.message),
        LogEventKind::System | LogEventKind::Terminated => eprintln!("{}", event),
    }
}
