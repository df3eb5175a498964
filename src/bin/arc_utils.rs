//! ARC archive utility.
//!
//! Provides two subcommands:
//! - `extract`: unpack every entry of an archive into a directory.
//! - `pack`: build an archive from a directory tree (entries are stored
//!   uncompressed).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use log::info;
use sgs_rs::prelude::ArcFile;

fn main() -> Result<()> {
	env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

	let cli = Cli::parse();
	match cli.command {
		Command::Extract {
			archive,
			out_dir,
		} => run_extract(&archive, &out_dir),
		Command::Pack {
			in_dir,
			archive,
		} => run_pack(&in_dir, &archive),
	}
}

#[derive(Parser)]
#[command(name = "arc_utils")]
#[command(author = "sgs-rs project")]
#[command(version)]
#[command(about = "Extract and build ARC archives", long_about = None)]
struct Cli {
	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand)]
enum Command {
	/// Extract every entry of an archive into a directory
	Extract {
		/// Path to the archive
		archive: PathBuf,
		/// Output directory
		out_dir: PathBuf,
	},
	/// Build an archive from a directory tree
	Pack {
		/// Input directory
		in_dir: PathBuf,
		/// Path of the archive to write
		archive: PathBuf,
	},
}

fn run_extract(archive: &Path, out_dir: &Path) -> Result<()> {
	let arc = ArcFile::open(archive)
		.with_context(|| format!("Failed to open archive {}", archive.display()))?;

	info!("{}: {} entries", archive.display(), arc.num_entries());
	arc.extract_all(out_dir)
		.with_context(|| format!("Failed to extract into {}", out_dir.display()))?;

	info!("Done!");
	Ok(())
}

fn run_pack(in_dir: &Path, archive: &Path) -> Result<()> {
	if !in_dir.is_dir() {
		bail!("{} is not a directory", in_dir.display());
	}

	let arc = ArcFile::pack_dir(in_dir, false)
		.with_context(|| format!("Failed to pack {}", in_dir.display()))?;
	for entry in arc.entries() {
		info!("added {} ({} bytes)", entry.name(), entry.unpacked_size);
	}

	arc.save(archive).with_context(|| format!("Failed to write {}", archive.display()))?;

	info!("{}: {} entries written", archive.display(), arc.num_entries());
	Ok(())
}
