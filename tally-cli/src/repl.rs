//! Interactive session
//!
//! Reads one request per line. A line is either a session keyword
//! (`menu`, `save_history`, ...) or `<operation> <operands...>`.

use std::io;
use std::path::PathBuf;
use tally::history::render_rows;
use tally::Calculator;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{error, info, warn};

const PROMPT: &str = "> ";
const GREETING: &str = "Welcome to Tally. Type 'menu' to see available commands or 'exit' to quit.";

static SESSION_COMMANDS: [(&str, &str); 10] = [
    ("menu", "list available operations"),
    ("help", "show usage for every operation"),
    ("last", "show the most recent calculation"),
    ("view_history", "show every recorded calculation"),
    ("filter_history <operation>", "show calculations of one operation"),
    ("delete_history <index>", "remove one calculation"),
    ("clear_history", "remove every calculation"),
    ("save_history [path]", "write history to CSV"),
    ("load_history [path]", "replace history with a CSV file"),
    ("exit", "leave the session"),
];

/// First words claimed by the session before any operation lookup
pub static KEYWORDS: [&str; 11] = [
    "exit",
    "quit",
    "menu",
    "help",
    "last",
    "view_history",
    "clear_history",
    "save_history",
    "load_history",
    "delete_history",
    "filter_history",
];

/// One parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Empty,
    Exit,
    Menu,
    Help,
    Last,
    ViewHistory,
    ClearHistory,
    SaveHistory(Option<PathBuf>),
    LoadHistory(Option<PathBuf>),
    DeleteHistory(usize),
    FilterHistory(String),
    Calculate { operation: String, operands: Vec<String> },
    Invalid(String),
}

impl Input {
    /// Keywords match case-insensitively; operation names do not
    pub fn parse(line: &str) -> Self {
        let mut words = line.split_whitespace();
        let Some(first) = words.next() else {
            return Input::Empty;
        };
        let rest: Vec<&str> = words.collect();
        let path = || rest.first().map(PathBuf::from);

        match first.to_lowercase().as_str() {
            "exit" | "quit" => Input::Exit,
            "menu" => Input::Menu,
            "help" => Input::Help,
            "last" => Input::Last,
            "view_history" => Input::ViewHistory,
            "clear_history" => Input::ClearHistory,
            "save_history" => Input::SaveHistory(path()),
            "load_history" => Input::LoadHistory(path()),
            "delete_history" => match rest.first().map(|s| s.parse::<usize>()) {
                Some(Ok(index)) => Input::DeleteHistory(index),
                Some(Err(_)) => Input::Invalid(format!("'{}' is not a history index", rest[0])),
                None => Input::Invalid("usage: delete_history <index>".to_string()),
            },
            "filter_history" => match rest.first() {
                Some(op) => Input::FilterHistory(op.to_string()),
                None => Input::Invalid("usage: filter_history <operation>".to_string()),
            },
            _ => Input::Calculate {
                operation: first.to_string(),
                operands: rest.iter().map(|s| s.to_string()).collect(),
            },
        }
    }
}

/// What the session does after handling a line
#[derive(Debug, PartialEq, Eq)]
pub enum Step {
    Continue(String),
    Exit(String),
}

pub struct Repl {
    calculator: Calculator,
    history_path: PathBuf,
}

impl Repl {
    pub fn new(calculator: Calculator, history_path: PathBuf) -> Self {
        let repl = Self { calculator, history_path };
        for name in repl.shadowed_operations() {
            warn!(operation = %name, "operation shares a session keyword and cannot be called interactively");
        }
        repl
    }

    /// Registered operations whose name parses as a session keyword
    pub fn shadowed_operations(&self) -> Vec<String> {
        self.calculator
            .registry()
            .names()
            .into_iter()
            .filter(|name| KEYWORDS.contains(&name.to_lowercase().as_str()))
            .collect()
    }

    pub fn calculator(&self) -> &Calculator {
        &self.calculator
    }

    /// Serve lines from `reader` until `exit` or end of input
    pub async fn run<R, W>(&mut self, reader: R, writer: &mut W) -> io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!("starting interactive session");
        writer.write_all(format!("{}\n{}\n", GREETING, self.menu()).as_bytes()).await?;

        let mut lines = reader.lines();
        loop {
            writer.write_all(PROMPT.as_bytes()).await?;
            writer.flush().await?;

            let Some(line) = lines.next_line().await? else {
                writer.write_all(b"\n").await?;
                break;
            };

            match self.handle(Input::parse(&line)).await {
                Step::Continue(text) => {
                    if !text.is_empty() {
                        writer.write_all(format!("{}\n", text).as_bytes()).await?;
                    }
                }
                Step::Exit(text) => {
                    writer.write_all(format!("{}\n", text).as_bytes()).await?;
                    break;
                }
            }
        }

        writer.flush().await?;
        info!("interactive session ended");
        Ok(())
    }

    pub async fn handle(&mut self, input: Input) -> Step {
        let text = match input {
            Input::Empty => String::new(),
            Input::Exit => return Step::Exit("Goodbye!".to_string()),
            Input::Menu => self.menu(),
            Input::Help => self.help(),
            Input::Last => match self.calculator.history().latest() {
                Some(record) => record.to_string(),
                None => "No calculations yet.".to_string(),
            },
            Input::ViewHistory => format!("Calculation history:\n{}", self.calculator.history().render()),
            Input::ClearHistory => {
                self.calculator.history_mut().clear();
                info!("history cleared");
                "History cleared.".to_string()
            }
            Input::SaveHistory(path) => {
                let path = path.unwrap_or_else(|| self.history_path.clone());
                match self.calculator.history().save_csv(&path) {
                    Ok(()) => format!("History saved to {}.", path.display()),
                    Err(e) => {
                        error!(error = %e, "saving history failed");
                        format!("Error: {}", e)
                    }
                }
            }
            Input::LoadHistory(path) => {
                let path = path.unwrap_or_else(|| self.history_path.clone());
                match self.calculator.history_mut().replace_from_csv(&path) {
                    Ok(count) => format!("Loaded {} calculations from {}.", count, path.display()),
                    Err(e) => {
                        warn!(error = %e, "loading history failed");
                        format!("Error: {}", e)
                    }
                }
            }
            Input::DeleteHistory(index) => match self.calculator.history_mut().remove(index) {
                Ok(record) => format!("Deleted {}.", record),
                Err(e) => format!("Error: {}", e),
            },
            Input::FilterHistory(operation) => {
                render_rows(self.calculator.history().filter_by_operation(&operation))
            }
            Input::Calculate { operation, operands } => {
                match self.calculator.calculate(&operation, &operands).await {
                    Ok(record) => {
                        info!(calculation = %record, "calculated");
                        record.to_string()
                    }
                    Err(e) => {
                        error!(operation = %operation, error = %e, "calculation failed");
                        format!("Error: {}", e)
                    }
                }
            }
            Input::Invalid(message) => message,
        };
        Step::Continue(text)
    }

    fn menu(&self) -> String {
        let names = self.calculator.registry().names();
        let session: Vec<&str> = SESSION_COMMANDS
            .iter()
            .map(|&(usage, _)| usage.split(' ').next().unwrap_or(usage))
            .collect();
        let mut text = format!(
            "Available operations: {}\nSession commands: {}",
            names.join(", "),
            session.join(", ")
        );
        let shadowed = self.shadowed_operations();
        if !shadowed.is_empty() {
            text.push_str(&format!(
                "\nReserved session keywords, not callable here: {}",
                shadowed.join(", ")
            ));
        }
        text
    }

    fn help(&self) -> String {
        let mut lines = vec!["Operations:".to_string()];
        for (name, meta) in self.calculator.registry().list() {
            lines.push(format!("  {:<10} {:<26} {}", name, meta.usage, meta.description));
        }
        lines.push("Session:".to_string());
        for &(usage, description) in SESSION_COMMANDS.iter() {
            lines.push(format!("  {:<37} {}", usage, description));
        }
        lines.join("\n")
    }
}
