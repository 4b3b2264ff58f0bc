//! Line-oriented command shell over an attached paraphrase database.
//!
//! Commands:
//! * `show <query>` runs a query and lists the matching rules or counts.
//! * `get <query>` runs a query and returns the unformatted rows.
//! * `explain <query>` is `show` with the pivots of every rule listed.
//! * `set [name value | name=value]` changes a session setting, or lists them.
//! * `attach <path>` switches to the database in a directory or file.
//! * `info` describes the attached database.
//! * `quit`, `exit`, `q` end the session.

use std::io::BufRead;
use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use crate::compile::{compile_text, Compilation};
use crate::display::{format_counts, format_raw, format_rules};
use crate::error::{ParaqueryError, Result};
use crate::session::Settings;
use crate::store::{QueryResult, Store, DATABASE_FILE};

lazy_static! {
    static ref COMMAND: Regex = Regex::new(r"^\s*(\S+)\s*(.*?)\s*$").unwrap();
    static ref ASSIGNMENT: Regex = Regex::new(r"^([^=\s]+)\s*(?:=\s*|\s+)(.+)$").unwrap();
}

/// What a command produced: text for stdout and diagnostics for stderr.
#[derive(Debug, Default, PartialEq)]
pub struct Reply {
    pub output: String,
    pub diagnostics: Vec<String>,
    pub quit: bool,
    /// Database the caller should reopen the shell on.
    pub attach: Option<PathBuf>,
}

impl Reply {
    fn output(output: impl Into<String>) -> Self {
        Self { output: output.into(), ..Self::default() }
    }
    fn error(message: impl Into<String>) -> Self {
        Self { diagnostics: vec![format!("Error: {}", message.into())], ..Self::default() }
    }
}

pub struct Shell<'db> {
    store: Store<'db>,
    settings: Settings,
    interactive: bool,
    database: String,
}

impl<'db> Shell<'db> {
    pub fn new(store: Store<'db>, settings: Settings, database: impl Into<String>) -> Self {
        Self { store, settings, interactive: true, database: database.into() }
    }
    /// Script mode prints tab separated rows instead of aligned listings.
    pub fn scripted(mut self) -> Self {
        self.interactive = false;
        self
    }
    pub fn settings(&self) -> &Settings {
        &self.settings
    }
    pub fn store(&mut self) -> &mut Store<'db> {
        &mut self.store
    }

    /// Compiles and runs one query under the current settings.
    pub fn get(&self, query: &str) -> Result<(Compilation, QueryResult)> {
        let compilation = compile_text(query, &self.settings)?;
        let result = self.store.execute(&compilation.query)?;
        Ok((compilation, result))
    }

    pub fn handle(&mut self, line: &str) -> Reply {
        let Some(captures) = COMMAND.captures(line) else {
            return Reply::default();
        };
        let argument = captures.get(2).map(|m| m.as_str()).unwrap_or("");
        match captures.get(1).map(|m| m.as_str()).unwrap_or("") {
            "show" => {
                let explain = self.settings.explain;
                let interactive = self.interactive;
                self.query(argument, |compilation, result| match result {
                    QueryResult::Rules(rows) => format_rules(&rows, interactive, explain),
                    QueryResult::Counts(rows) => format_counts(&rows, compilation.query.group_by),
                })
            }
            "get" => self.query(argument, |_, result| format_raw(&result)),
            "explain" => {
                if argument.split_whitespace().any(|w| w == "count") {
                    return Reply::error("cannot use \"count\" modifier for explain queries.");
                }
                let interactive = self.interactive;
                self.query(argument, |_, result| match result {
                    QueryResult::Rules(rows) => format_rules(&rows, interactive, true),
                    QueryResult::Counts(_) => String::new(),
                })
            }
            "set" => self.set(argument),
            "attach" => attach(argument),
            "info" => match self.store.record_count() {
                Ok(count) => Reply::output(format!(
                    "\n Database {} with {} paraphrase rules.\n",
                    self.database, count
                )),
                Err(e) => Reply::error(e.to_string()),
            },
            "quit" | "exit" | "q" => Reply { quit: true, ..Reply::default() },
            other => Reply::error(format!("unknown command '{other}'.")),
        }
    }

    fn query(&self, query: &str, render: impl FnOnce(&Compilation, QueryResult) -> String) -> Reply {
        let compilation = match compile_text(query, &self.settings) {
            Ok(compilation) => compilation,
            Err(ParaqueryError::Parse { message, .. }) => {
                info!(query, %message, "query rejected");
                return Reply::error("cannot parse query.");
            }
            Err(e) => return Reply::error(e.to_string()),
        };
        let mut diagnostics: Vec<String> = compilation.warnings.iter().map(|w| format!("Warning: {w}")).collect();
        if self.settings.debug {
            diagnostics.push(format!("Query: {};", compilation.query));
        }
        let output = match self.store.execute(&compilation.query) {
            Ok(result) => render(&compilation, result),
            Err(e) => {
                warn!(error = %e, "query failed");
                diagnostics.push(format!("Error: {e}"));
                String::new()
            }
        };
        Reply { output, diagnostics, ..Reply::default() }
    }

    fn set(&mut self, argument: &str) -> Reply {
        if argument.is_empty() {
            return Reply::output(format!("\n{}", self.settings));
        }
        let Some(assignment) = ASSIGNMENT.captures(argument) else {
            return Reply::error("incorrect set statement.");
        };
        let name = assignment.get(1).map(|m| m.as_str()).unwrap_or("");
        let value = assignment.get(2).map(|m| m.as_str()).unwrap_or("");
        match self.settings.set(name, value) {
            Ok(()) => Reply::default(),
            Err(ParaqueryError::UnknownSetting(_)) => {
                Reply::error("incorrect setting name. Use \"set\" to see current settings.")
            }
            Err(e) => {
                warn!(error = %e, "setting rejected");
                Reply::error("incorrect value for setting.")
            }
        }
    }
}

// a directory holds a `.paradb`, anything else must be the database file
fn attach(argument: &str) -> Reply {
    let path = Path::new(argument);
    let database = if path.is_dir() { path.join(DATABASE_FILE) } else { path.to_path_buf() };
    if argument.is_empty() || !database.is_file() {
        return Reply::error(format!("the path {argument} does not contain a paraphrase database."));
    }
    info!(database = %database.display(), "attaching paraphrase database");
    Reply {
        diagnostics: vec!["Attaching paraphrase database.".to_string()],
        attach: Some(database),
        ..Reply::default()
    }
}

/// Reads one command line without its line break; `None` at end of input.
pub fn read_command<R: BufRead + ?Sized>(input: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    let read = input
        .read_line(&mut line)
        .map_err(|e| ParaqueryError::Execution(format!("cannot read command: {e}")))?;
    if read == 0 {
        return Ok(None);
    }
    let trimmed = line.trim_end_matches(['\n', '\r']).len();
    line.truncate(trimmed);
    Ok(Some(line))
}
