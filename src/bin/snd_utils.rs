//! Sound conversion utility.
//!
//! Provides three subcommands:
//! - `info`: print the parsed parameters of a PCM or WAV file.
//! - `towav`: convert to a WAV file, preserving channels, rate, and depth.
//! - `topcm`: convert to a raw PCM blob (mono 22050 Hz; bit depth follows
//!   the engine version gate).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use sgs_rs::prelude::{Sound, Version};

fn main() -> Result<()> {
	env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

	let cli = Cli::parse();
	match cli.command {
		Command::Info {
			input,
		} => run_info(&input),
		Command::Towav {
			input,
			output,
			version,
		} => run_towav(&input, &output, parse_version(&version)?),
		Command::Topcm {
			input,
			output,
			version,
		} => run_topcm(&input, &output, parse_version(&version)?),
	}
}

#[derive(Parser)]
#[command(name = "snd_utils")]
#[command(author = "sgs-rs project")]
#[command(version)]
#[command(about = "Inspect and convert PCM / WAV sound files", long_about = None)]
struct Cli {
	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand)]
enum Command {
	/// Print the parsed parameters of a sound file
	Info {
		/// Path to the sound file
		input: PathBuf,
	},
	/// Convert a sound file to WAV
	Towav {
		/// Input file (raw PCM or WAV)
		input: PathBuf,
		/// Output WAV path
		output: PathBuf,
		/// Engine version gate: unrestricted | pregtb | gtb | postgtb
		#[arg(default_value = "unrestricted")]
		version: String,
	},
	/// Convert a sound file to raw PCM
	Topcm {
		/// Input file (raw PCM or WAV)
		input: PathBuf,
		/// Output PCM path
		output: PathBuf,
		/// Engine version gate: unrestricted | pregtb | gtb | postgtb
		#[arg(default_value = "unrestricted")]
		version: String,
	},
}

fn parse_version(text: &str) -> Result<Version> {
	text.parse::<Version>().map_err(|err| anyhow::anyhow!(err))
}

fn run_info(input: &Path) -> Result<()> {
	let sound = Sound::open(input, Version::Unrestricted)
		.with_context(|| format!("Failed to open {}", input.display()))?;

	println!("{}: {}", input.display(), sound.info_string());
	Ok(())
}

fn run_towav(input: &Path, output: &Path, version: Version) -> Result<()> {
	let sound = Sound::open(input, version)
		.with_context(|| format!("Failed to open {}", input.display()))?;

	info!("{} ({})", sound, version);
	std::fs::write(output, sound.to_wav())
		.with_context(|| format!("Failed to write {}", output.display()))?;

	info!("Done!");
	Ok(())
}

fn run_topcm(input: &Path, output: &Path, version: Version) -> Result<()> {
	let sound = Sound::open(input, version)
		.with_context(|| format!("Failed to open {}", input.display()))?;

	info!("{} ({})", sound, version);
	std::fs::write(output, sound.to_raw(version))
		.with_context(|| format!("Failed to write {}", output.display()))?;

	info!("Done!");
	Ok(())
}
