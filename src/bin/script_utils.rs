//! Script utility: disassembly, text export, and translation import.
//!
//! Single-file subcommands take an optional output path; batch subcommands
//! walk a directory and process every file in it. The text codec defaults to
//! Shift-JIS and can be overridden with `--encoding` (WHATWG label or
//! Windows code-page number).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use log::{info, warn};
use sgs_rs::prelude::ScriptFile;
use sgs_rs::prelude::file::script::{encoding_from_label, export, import};
use walkdir::WalkDir;

/// Default line length for the auto line breaker.
const DEFAULT_MAX_LINE_LENGTH: usize = 50;

fn main() -> Result<()> {
	env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

	let cli = Cli::parse();
	let encoding = encoding_from_label(&cli.encoding)
		.with_context(|| format!("Unknown encoding '{}'", cli.encoding))?;

	match cli.command {
		Command::Disasm {
			input,
			output,
		} => run_disasm(&input, output.as_deref(), encoding),
		Command::Export {
			input,
			output,
		} => run_export(&input, output.as_deref(), encoding),
		Command::Import {
			script,
			text,
			output,
			max_line_length,
		} => run_import(&script, &text, output.as_deref(), max_line_length, encoding),
		Command::BatchExport {
			dir,
			out_dir,
		} => run_batch_export(&dir, out_dir.as_deref(), encoding),
		Command::BatchImport {
			script_dir,
			text_dir,
			out_dir,
			max_line_length,
		} => run_batch_import(&script_dir, &text_dir, out_dir.as_deref(), max_line_length, encoding),
	}
}

#[derive(Parser)]
#[command(name = "script_utils")]
#[command(author = "sgs-rs project")]
#[command(version)]
#[command(about = "Disassemble, export, and patch script bytecode", long_about = None)]
struct Cli {
	/// Text codec: WHATWG label or Windows code-page number
	#[arg(long, global = true, default_value = "932")]
	encoding: String,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand)]
enum Command {
	/// Write a disassembly listing
	#[command(visible_alias = "d")]
	Disasm {
		/// Input script
		input: PathBuf,
		/// Output listing path (defaults to stdout)
		output: Option<PathBuf>,
	},
	/// Export translatable strings
	#[command(visible_alias = "e")]
	Export {
		/// Input script
		input: PathBuf,
		/// Output text path (defaults to the input with .txt appended)
		output: Option<PathBuf>,
	},
	/// Apply a translation file to a script
	#[command(visible_alias = "i")]
	Import {
		/// Input script
		script: PathBuf,
		/// Translation text file
		text: PathBuf,
		/// Output script path (defaults to replacing the input in place)
		output: Option<PathBuf>,
		/// Auto line-break limit in characters
		#[arg(default_value_t = DEFAULT_MAX_LINE_LENGTH)]
		max_line_length: usize,
	},
	/// Export every script in a directory
	BatchExport {
		/// Directory of scripts
		dir: PathBuf,
		/// Output directory (defaults to the input directory)
		out_dir: Option<PathBuf>,
	},
	/// Import a directory of translation files
	BatchImport {
		/// Directory of scripts
		script_dir: PathBuf,
		/// Directory of translation text files
		text_dir: PathBuf,
		/// Output directory (defaults to the script directory)
		out_dir: Option<PathBuf>,
		/// Auto line-break limit in characters
		#[arg(default_value_t = DEFAULT_MAX_LINE_LENGTH)]
		max_line_length: usize,
	},
}

fn collect_files(dir: &Path) -> Result<Vec<PathBuf>> {
	if !dir.is_dir() {
		bail!("{} is not a directory", dir.display());
	}

	let mut files = Vec::new();
	for entry in WalkDir::new(dir).max_depth(1).sort_by_file_name() {
		let entry = entry?;
		if entry.file_type().is_file() {
			files.push(entry.into_path());
		}
	}
	Ok(files)
}

fn run_disasm(input: &Path, output: Option<&Path>, encoding: &'static encoding_rs::Encoding) -> Result<()> {
	let script = ScriptFile::open(input, encoding)
		.with_context(|| format!("Failed to open {}", input.display()))?;

	let listing = script.disassemble().text();
	match output {
		Some(path) => {
			std::fs::write(path, listing)
				.with_context(|| format!("Failed to write {}", path.display()))?;
			info!("listing written to {}", path.display());
		}
		None => print!("{listing}"),
	}
	Ok(())
}

fn run_export(input: &Path, output: Option<&Path>, encoding: &'static encoding_rs::Encoding) -> Result<()> {
	let script = ScriptFile::open(input, encoding)
		.with_context(|| format!("Failed to open {}", input.display()))?;

	let text = script.export_text();
	let default_path;
	let path = match output {
		Some(path) => path,
		None => {
			default_path = append_extension(input, "txt");
			default_path.as_path()
		}
	};

	std::fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))?;
	info!("strings written to {}", path.display());
	Ok(())
}

fn run_import(
	script_path: &Path,
	text_path: &Path,
	output: Option<&Path>,
	max_line_length: usize,
	encoding: &'static encoding_rs::Encoding,
) -> Result<()> {
	let script = ScriptFile::open(script_path, encoding)
		.with_context(|| format!("Failed to open {}", script_path.display()))?;
	let text = std::fs::read_to_string(text_path)
		.with_context(|| format!("Failed to read {}", text_path.display()))?;

	let translations = export::parse(&text);
	let patched = script
		.import_translations(&translations, max_line_length)
		.with_context(|| format!("Failed to patch {}", script_path.display()))?;

	let path = output.unwrap_or(script_path);
	import::write_atomic(path, &patched)
		.with_context(|| format!("Failed to write {}", path.display()))?;

	info!("{} bytes written to {}", patched.len(), path.display());
	Ok(())
}

fn run_batch_export(
	dir: &Path,
	out_dir: Option<&Path>,
	encoding: &'static encoding_rs::Encoding,
) -> Result<()> {
	let out_dir = out_dir.unwrap_or(dir);
	std::fs::create_dir_all(out_dir)?;

	for path in collect_files(dir)? {
		let Some(name) = path.file_name() else {
			continue;
		};
		let target = append_extension(&out_dir.join(name), "txt");
		match run_export(&path, Some(target.as_path()), encoding) {
			Ok(()) => {}
			Err(err) => warn!("{}: {err:#}", path.display()),
		}
	}
	Ok(())
}

fn run_batch_import(
	script_dir: &Path,
	text_dir: &Path,
	out_dir: Option<&Path>,
	max_line_length: usize,
	encoding: &'static encoding_rs::Encoding,
) -> Result<()> {
	let out_dir = out_dir.unwrap_or(script_dir);
	std::fs::create_dir_all(out_dir)?;

	for path in collect_files(script_dir)? {
		let Some(name) = path.file_name() else {
			continue;
		};
		let text_path = append_extension(&text_dir.join(name), "txt");
		if !text_path.exists() {
			warn!("no translation file for {}, skipping", path.display());
			continue;
		}

		let target = out_dir.join(name);
		match run_import(&path, &text_path, Some(target.as_path()), max_line_length, encoding) {
			Ok(()) => {}
			Err(err) => warn!("{}: {err:#}", path.display()),
		}
	}
	Ok(())
}

fn append_extension(path: &Path, extension: &str) -> PathBuf {
	let mut name = path.as_os_str().to_owned();
	name.push(".");
	name.push(extension);
	PathBuf::from(name)
}
