use std::{
    io::{BufRead, Write, stdin, stdout},
    path::PathBuf,
};

use clap::Parser;
use miette::{IntoDiagnostic, Result, WrapErr};
use tracing::info;
use tracing_subscriber::EnvFilter;

use skiff_db::{Config, Confirm, Database, JsonFileBackend, Response, Session};

/// Skiff DB interactive shell
#[derive(Parser, Debug)]
#[command(name = "skiff", version, about = "A small file-backed tabular store")]
struct Args {
    /// Configuration file (TOML)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory holding the registry and table documents
    #[arg(short = 'd', long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Do not ask before drop_table and delete
    #[arg(short = 'y', long)]
    yes: bool,

    /// Log engine activity at debug level
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Run a single command and exit
    #[arg(short = 'c', long, conflicts_with = "file")]
    command: Option<String>,

    /// Run the commands in FILE, one per line, and exit
    #[arg(short = 'f', long, value_name = "FILE")]
    file: Option<PathBuf>,
}

/// Asks on stdin, expecting `y` or `yes`.
struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, prompt: &str) -> bool {
        print!("{prompt} [y/N] ");
        if stdout().flush().is_err() {
            return false;
        }

        let mut answer = String::new();
        match stdin().lock().read_line(&mut answer) {
            Ok(_) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
            Err(_) => false,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(false)
                .context_lines(3)
                .tab_width(4)
                .break_words(true)
                .build(),
        )
    }))
    .into_diagnostic()?;
    miette::set_panic_hook();

    let config = load_config(&args)?;
    init_logging(&config, args.verbose);

    let db = Database::open(config.open_backend()?)?;
    info!(data_dir = %config.data_dir.display(), "database opened");

    let mut session = Session::new(db, StdinConfirm).with_confirmation(config.confirm_destructive);

    if let Some(command) = &args.command {
        run_line(&mut session, command)?;
        return Ok(());
    }

    if let Some(file) = &args.file {
        let script = std::fs::read_to_string(file)
            .into_diagnostic()
            .wrap_err_with(|| format!("could not read {}", file.display()))?;

        for (idx, line) in script.lines().enumerate() {
            let keep_going = run_line(&mut session, line)
                .wrap_err_with(|| format!("{}:{}: `{}`", file.display(), idx + 1, line.trim()))?;
            if !keep_going {
                break;
            }
        }
        return Ok(());
    }

    repl(&mut session)
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    if let Some(data_dir) = &args.data_dir {
        config.data_dir = data_dir.clone();
    }
    if args.yes {
        config.confirm_destructive = false;
    }

    Ok(config)
}

fn init_logging(config: &Config, verbose: bool) {
    let default_level = if verbose { "debug" } else { config.log_level.as_str() };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("skiff_db={default_level},skiff={default_level}")))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

/// Runs one line and prints its outcome. Returns `false` once the user
/// asked to exit.
fn run_line(session: &mut Session<JsonFileBackend, StdinConfirm>, line: &str) -> Result<bool> {
    match session.execute_line(line)? {
        Some(Response::Output { text, warnings }) => {
            for warning in warnings {
                eprintln!("{:?}", miette::Report::new(warning));
            }
            println!("{text}");
        }
        Some(Response::Cancelled) => println!("Cancelled"),
        Some(Response::Exit) => return Ok(false),
        None => {}
    }

    Ok(true)
}

fn repl(session: &mut Session<JsonFileBackend, StdinConfirm>) -> Result<()> {
    println!("Skiff DB. Type `help` for commands, `exit` to leave.");

    let mut buf = String::new();
    loop {
        print!("skiff> ");
        stdout().flush().into_diagnostic()?;

        buf.clear();
        let read = stdin().lock().read_line(&mut buf).into_diagnostic()?;
        if read == 0 {
            // EOF
            println!();
            break;
        }

        match run_line(session, &buf) {
            Ok(true) => {}
            Ok(false) => break,
            Err(report) => eprintln!("{:?}", report.with_source_code(buf.trim().to_string())),
        }
    }

    println!("Exiting Skiff");
    Ok(())
}
