//! # CLI Module
//!
//! Command-line interface for the photo organizer.
//!
//! ## Usage
//! ```bash
//! # Organize the current directory in place
//! photo-organize
//!
//! # Organize another tree in place
//! photo-organize -i ~/Pictures/import
//! ```

use clap::Parser;
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use photo_organizer::core::pipeline::{Pipeline, PipelineResult};
use photo_organizer::error::Result;
use photo_organizer::events::{DedupEvent, Event, EventChannel, PipelineEvent, ScanEvent};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

/// Photo Organizer - rename photos by capture time and set copies aside
#[derive(Parser, Debug)]
#[command(name = "photo-organize")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory to organize in place
    #[arg(short = 'i', value_name = "PATH", default_value = ".")]
    input: PathBuf,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    photo_organizer::init_tracing(Path::new(photo_organizer::LOG_FILE_NAME))?;
    run_organize(cli.input)
}

fn run_organize(input: PathBuf) -> Result<()> {
    let term = Term::stderr();

    term.write_line(&format!(
        "{} {}",
        style("Output folder:").bold().cyan(),
        input.display()
    ))
    .ok();

    let pipeline = Pipeline::builder().root(&input).build();

    let (sender, receiver) = EventChannel::new();

    let progress = ProgressBar::new_spinner();
    progress.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    progress.enable_steady_tick(Duration::from_millis(100));

    let progress_clone = progress.clone();

    // Handle events in a separate thread
    let event_thread = thread::spawn(move || {
        for event in receiver.iter() {
            match event {
                Event::Pipeline(PipelineEvent::PhaseChanged { phase }) => {
                    progress_clone.set_message(format!("{}", phase));
                }
                Event::Scan(ScanEvent::Progress(p)) => {
                    progress_clone.set_message(format!(
                        "Parsed {} photos, {} time stamps",
                        p.photos_parsed, p.keys_found
                    ));
                }
                Event::Scan(ScanEvent::Completed { .. }) => {
                    progress_clone.println("All parsing done. Now clean photos.");
                }
                Event::Dedup(DedupEvent::RedundantFound { key, paths }) => {
                    progress_clone.set_message(format!("{}: {} redundant", key, paths.len()));
                }
                Event::Pipeline(PipelineEvent::Completed { .. })
                | Event::Pipeline(PipelineEvent::Error { .. }) => {
                    progress_clone.finish_and_clear();
                }
                _ => {}
            }
        }
    });

    let result = pipeline.run_with_events(&sender);

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();
    progress.finish_and_clear();

    print_summary(&term, &result?);
    Ok(())
}

fn print_summary(term: &Term, result: &PipelineResult) {
    let summary = &result.summary;

    term.write_line(&format!(
        "  {} photos under {} time stamps",
        style(summary.total_photos).cyan(),
        style(summary.total_keys).cyan()
    ))
    .ok();

    term.write_line(&format!(
        "  {} redundant copies set aside",
        style(summary.redundant_files).yellow()
    ))
    .ok();

    term.write_line(&format!(
        "  {} files moved in {:.1}s",
        style(summary.files_moved).cyan(),
        summary.duration_ms as f64 / 1000.0
    ))
    .ok();

    term.write_line(&format!("{} All done.", style("✓").green().bold()))
        .ok();
}
