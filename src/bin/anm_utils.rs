//! ANM animation utility.
//!
//! Provides two subcommands:
//! - `decode`: dump an animation into `palette.txt`, `metadata.txt`, and one
//!   `frame_NNNN.bmp` per frame.
//! - `encode`: rebuild an animation from the same sidecars; the optional
//!   third argument enables RLE compression (default true).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use sgs_rs::prelude::AnmFile;

fn main() -> Result<()> {
	env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

	let cli = Cli::parse();
	match cli.command {
		Command::Decode {
			input,
			out_dir,
		} => run_decode(&input, &out_dir),
		Command::Encode {
			in_dir,
			output,
			compress,
		} => run_encode(&in_dir, &output, compress),
	}
}

#[derive(Parser)]
#[command(name = "anm_utils")]
#[command(author = "sgs-rs project")]
#[command(version)]
#[command(about = "Decode and rebuild animation (.ANM) files", long_about = None)]
struct Cli {
	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand)]
enum Command {
	/// Decode an animation into bitmaps and sidecar files
	Decode {
		/// Path to the .ANM file
		input: PathBuf,
		/// Output directory
		out_dir: PathBuf,
	},
	/// Rebuild an animation from a decoded directory
	Encode {
		/// Input directory containing sidecars and frame bitmaps
		in_dir: PathBuf,
		/// Path of the .ANM file to write
		output: PathBuf,
		/// Enable RLE compression
		#[arg(default_value_t = true, action = clap::ArgAction::Set)]
		compress: bool,
	},
}

fn run_decode(input: &Path, out_dir: &Path) -> Result<()> {
	let anm =
		AnmFile::open(input).with_context(|| format!("Failed to open {}", input.display()))?;

	info!("{}: {}", input.display(), anm);
	anm.decode_to_dir(out_dir)
		.with_context(|| format!("Failed to write into {}", out_dir.display()))?;

	info!("Done!");
	Ok(())
}

fn run_encode(in_dir: &Path, output: &Path, compress: bool) -> Result<()> {
	let anm = AnmFile::from_dir(in_dir, compress)
		.with_context(|| format!("Failed to read frames from {}", in_dir.display()))?;

	info!("{} frames, compression: {}", anm.frames().len(), compress);
	anm.save(output).with_context(|| format!("Failed to write {}", output.display()))?;

	info!("Done!");
	Ok(())
}
