use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use rusqlite::Connection;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use paraquery::configuration::{ShellConfig, DEFAULT_CONFIG_FILE};
use paraquery::shell::{read_command, Reply, Shell};
use paraquery::store::{Store, DATABASE_FILE};
use paraquery::{ParaqueryError, Result};

const PROMPT: &str = "query> ";

fn main() {
    if let Err(e) = run() {
        eprintln!("\n Error: {e}\n");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let config_file = std::env::var("PARAQUERY_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
    let config = ShellConfig::load(&config_file)?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log.as_deref().unwrap_or("warn")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    // a directory argument holds the database, a file argument is a script
    let argument = std::env::args().nth(1).map(PathBuf::from);
    let (database, script) = match argument {
        Some(path) if path.is_dir() => (path.join(DATABASE_FILE), None),
        Some(path) if path.is_file() => (configured_database(&config), Some(path)),
        Some(path) => {
            eprintln!("\n Error: the path {} does not exist.\n", path.display());
            return Ok(());
        }
        None => (configured_database(&config), None),
    };

    let interactive = script.is_none();
    let mut input: Box<dyn BufRead> = match &script {
        Some(script) => Box::new(BufReader::new(File::open(script).map_err(|e| {
            ParaqueryError::Execution(format!("cannot read {}: {e}", script.display()))
        })?)),
        None => Box::new(BufReader::new(io::stdin())),
    };

    // `attach` ends a session and starts the next one on another database
    let mut database = database;
    let mut settings = config.settings();
    loop {
        let connection = open(&database)?;
        let store = Store::new(&connection)?;
        let mut shell = Shell::new(store, settings.clone(), database.display().to_string());
        if !interactive {
            shell = shell.scripted();
        }
        match serve(&mut shell, input.as_mut(), interactive)? {
            Some(next) => {
                settings = shell.settings().clone();
                database = next;
            }
            None => return Ok(()),
        }
    }
}

fn open(database: &Path) -> Result<Connection> {
    if database.is_file() {
        info!(database = %database.display(), "attaching paraphrase database");
        Ok(Connection::open(database)?)
    } else {
        warn!(database = %database.display(), "no paraphrase database found, using an empty one");
        eprintln!("\n No database found at {}.\n", database.display());
        Ok(Connection::open_in_memory()?)
    }
}

// runs commands until quit or end of input, returns the database to attach next
fn serve(shell: &mut Shell, input: &mut dyn BufRead, interactive: bool) -> Result<Option<PathBuf>> {
    loop {
        if interactive {
            print!("{PROMPT}");
            if let Err(e) = io::stdout().flush() {
                warn!(error = %e, "cannot flush prompt");
            }
        }
        let Some(line) = read_command(input)? else {
            return Ok(None);
        };
        let mut reply = shell.handle(&line);
        let attach = reply.attach.take();
        if emit(reply) {
            return Ok(None);
        }
        if attach.is_some() {
            return Ok(attach);
        }
    }
}

fn configured_database(config: &ShellConfig) -> PathBuf {
    match &config.database {
        Some(path) if path.is_dir() => path.join(DATABASE_FILE),
        Some(path) => path.clone(),
        None => Path::new(".").join(DATABASE_FILE),
    }
}

// returns true when the shell should stop
fn emit(reply: Reply) -> bool {
    for diagnostic in &reply.diagnostics {
        eprintln!("\n {diagnostic}\n");
    }
    if !reply.output.is_empty() {
        println!("{}", reply.output);
    }
    reply.quit
}
