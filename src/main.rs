use clap::Parser;
use coalesced::archive::{
    compile_dir, extract_file, list_file, CompileOptions, ExtractOptions, Mode, CONTAINER_FILE_NAME,
};
use coalesced::ArchiveError;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "coalesced",
    version,
    about = "Compile a directory of .ini files into Coalesced.ini, or dump a Coalesced.ini back into files"
)]
struct Cli {
    /// Directory (to compile) or Coalesced.ini file (to decompile)
    path: PathBuf,
    /// Write decompiled files here instead of next to the container
    #[arg(short = 'C', long)]
    output_dir: Option<PathBuf>,
    /// Extension of the files to compile [default: ini]
    #[arg(long = "ext")]
    extension: Option<String>,
    /// List the container's entries instead of writing them out
    #[arg(short, long)]
    list: bool,
    /// Print the listing as JSON
    #[arg(long, requires = "list")]
    json: bool,
    /// More log output (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    /// Only log warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            // --help / --version are not failures
            return if e.use_stderr() { ExitCode::from(1) } else { ExitCode::SUCCESS };
        }
    };
    init_tracing(cli.verbose, cli.quiet);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

fn run(cli: Cli) -> Result<(), ArchiveError> {
    match Mode::from_path(&cli.path)? {

        // ── Compile ──────────────────────────────────────────────────────────
        Mode::Compile(dir) => {
            if cli.list || cli.output_dir.is_some() {
                return Err(ArchiveError::Usage(format!(
                    "--list and --output-dir expect a {CONTAINER_FILE_NAME} file, not a directory"
                )));
            }
            let mut opts = CompileOptions::default();
            if let Some(ext) = cli.extension {
                opts.extension = ext;
            }
            let report = compile_dir(&dir, &opts)?;
            println!("Created: {} ({} files, {} B)",
                     report.output.display(), report.files.len(), report.size);
        }

        // ── Extract ──────────────────────────────────────────────────────────
        Mode::Extract(_) if cli.extension.is_some() => {
            return Err(ArchiveError::Usage("--ext only applies when compiling a directory".to_owned()));
        }

        // ── List ─────────────────────────────────────────────────────────────
        Mode::Extract(file) if cli.list => {
            if cli.output_dir.is_some() {
                return Err(ArchiveError::Usage("--output-dir has no effect with --list".to_owned()));
            }
            let rows = list_file(&file)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                println!("Container: {}", file.display());
                println!("{:>10}  {:<32} {:>10}  Stored name", "Offset", "File", "Length");
                for row in &rows {
                    println!("  0x{:06X}  {:<32} {:>10}  {}",
                             row.offset, row.file_name, row.body_len, row.name);
                }
            }
        }

        Mode::Extract(file) => {
            let opts = ExtractOptions { output_dir: cli.output_dir };
            let written = extract_file(&file, &opts)?;
            println!("Unpacked {} file(s) from {}", written.len(), file.display());
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8, quiet: bool) {
    let default_level = match (quiet, verbose) {
        (true, _) => "warn",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
