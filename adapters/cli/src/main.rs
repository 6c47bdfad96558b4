#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that loads gate puzzle levels and plays them headlessly.

mod level;
mod render;
mod session;

use std::{cell::Cell, fs, path::PathBuf, rc::Rc, time::Duration};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gate_puzzle_core::Event;
use gate_puzzle_persistence::{restore_backup, save_backup, GridAsset};
use gate_puzzle_system_extraction::ExtractionConfig;
use gate_puzzle_world::query;
use log::info;

use crate::{level::Level, render::render_grid, session::Session};

#[derive(Parser)]
#[command(name = "gate-puzzle")]
#[command(about = "Headless runner for gate puzzle levels")]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Prints the grid of a level.
    Show {
        /// Level file (JSON).
        level: PathBuf,
    },
    /// Places the level's blocks and resolves every gate pull.
    Play {
        /// Level file (JSON).
        level: PathBuf,
        /// Extraction timing overrides (TOML).
        #[arg(long)]
        config: Option<PathBuf>,
        /// Simulated frame length in milliseconds.
        #[arg(long, default_value_t = 16)]
        frame_ms: u64,
        /// Upper bound on simulated frames.
        #[arg(long, default_value_t = 3_600)]
        max_frames: u32,
        /// Writes a JSON backup of the final grid.
        #[arg(long)]
        backup: Option<PathBuf>,
    },
    /// Prints the single-line transfer string of a level's grid.
    Encode {
        /// Level file (JSON).
        level: PathBuf,
    },
    /// Decodes a transfer string or backup and prints the grid as JSON.
    Decode {
        /// Transfer string.
        #[arg(conflicts_with = "backup")]
        transfer: Option<String>,
        /// Backup file to restore instead.
        #[arg(long)]
        backup: Option<PathBuf>,
    },
}

/// Entry point for the gate puzzle command-line interface.
fn main() -> Result<()> {
    env_logger::init();

    match Cli::parse().command {
        CliCommand::Show { level } => show(&Level::load(&level)?),
        CliCommand::Play {
            level,
            config,
            frame_ms,
            max_frames,
            backup,
        } => play(
            &Level::load(&level)?,
            load_config(config)?,
            Duration::from_millis(frame_ms),
            max_frames,
            backup,
        ),
        CliCommand::Encode { level } => {
            println!("{}", Level::load(&level)?.grid.encode_transfer()?);
            Ok(())
        }
        CliCommand::Decode { transfer, backup } => decode(transfer, backup),
    }
}

fn load_config(path: Option<PathBuf>) -> Result<ExtractionConfig> {
    let Some(path) = path else {
        return Ok(ExtractionConfig::default());
    };
    let contents = fs::read_to_string(&path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    toml::from_str(&contents).with_context(|| format!("failed to parse config {}", path.display()))
}

fn build(level: &Level, config: ExtractionConfig) -> Session {
    let mut session = Session::new(config);
    for command in level.commands() {
        let _ = session.submit(command);
    }
    session
}

fn show(level: &Level) -> Result<()> {
    let session = build(level, ExtractionConfig::default());
    print!("{}", render_grid(session.world()));
    Ok(())
}

fn play(
    level: &Level,
    config: ExtractionConfig,
    frame: Duration,
    max_frames: u32,
    backup: Option<PathBuf>,
) -> Result<()> {
    let mut session = build(level, config);
    let removed = Rc::new(Cell::new(0_u32));
    let counter = Rc::clone(&removed);
    let _ = session
        .signals_mut()
        .block_removed
        .subscribe(move || counter.set(counter.get() + 1));

    print!("{}", render_grid(session.world()));
    let mut events = session.start();
    let (settled, frames) = session.settle(frame, max_frames);
    events.extend(settled);

    for event in &events {
        match event {
            Event::ExtractionStarted { block, gate, direction, .. } => println!(
                "block {} leaves through gate {} heading {direction:?}",
                block.get(),
                gate.get()
            ),
            Event::BlockRemoved { block, .. } => println!("block {} removed", block.get()),
            _ => {}
        }
    }
    for call in session.drain_calls() {
        println!("  {call:?}");
    }

    info!("settled after {frames} frames");
    println!(
        "{} blocks removed, {} remaining",
        removed.get(),
        query::block_count(session.world())
    );
    print!("{}", render_grid(session.world()));

    if let Some(path) = backup {
        if !save_backup(&GridAsset::capture(session.world()), &path) {
            eprintln!("backup to {} failed", path.display());
        }
    }
    Ok(())
}

fn decode(transfer: Option<String>, backup: Option<PathBuf>) -> Result<()> {
    let asset = match (transfer, backup) {
        (Some(transfer), _) => GridAsset::decode_transfer(&transfer)?,
        (None, Some(path)) => restore_backup(&path)
            .with_context(|| format!("could not restore {}", path.display()))?,
        (None, None) => anyhow::bail!("provide a transfer string or --backup"),
    };
    println!("{}", asset.to_json()?);
    Ok(())
}
