//! Stdin/stdout REPL front end for local use.

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::pipeline::Dispatcher;

/// One parsed line of REPL input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    /// Blank line.
    Empty,
    /// `/quit` or `/exit`.
    Quit,
    /// `/logs`: print the dispatch log as JSON lines.
    Logs,
    /// `/name <name>`: set the customer name; `/name` alone resets it.
    SetName(Option<String>),
    /// `/help`.
    Help,
    /// An unknown `/command`.
    Unknown(String),
    /// Anything else is a customer message.
    Message(String),
}

impl ReplCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Self::Empty;
        }
        let Some(rest) = line.strip_prefix('/') else {
            return Self::Message(line.to_string());
        };

        let (cmd, arg) = match rest.split_once(char::is_whitespace) {
            Some((cmd, arg)) => (cmd, arg.trim()),
            None => (rest, ""),
        };
        match cmd.to_lowercase().as_str() {
            "quit" | "exit" => Self::Quit,
            "logs" => Self::Logs,
            "help" => Self::Help,
            "name" if arg.is_empty() => Self::SetName(None),
            "name" => Self::SetName(Some(arg.to_string())),
            other => Self::Unknown(other.to_string()),
        }
    }
}

const HELP: &str = "Commands: /name <name>, /logs, /help, /quit. Anything else is sent as a customer message.";

/// Read lines from stdin until EOF or `/quit`, dispatching each message.
pub async fn run(dispatcher: &Dispatcher) -> Result<(), std::io::Error> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut customer_name: Option<String> = None;

    eprint!("> ");
    while let Some(line) = lines.next_line().await? {
        match ReplCommand::parse(&line) {
            ReplCommand::Empty => {}
            ReplCommand::Quit => break,
            ReplCommand::Help => eprintln!("{HELP}"),
            ReplCommand::Unknown(cmd) => eprintln!("Unknown command: /{cmd}. {HELP}"),
            ReplCommand::SetName(name) => {
                eprintln!(
                    "Customer name set to {}",
                    name.as_deref().unwrap_or("Customer")
                );
                customer_name = name;
            }
            ReplCommand::Logs => match dispatcher.log().to_json_lines().await {
                Ok(out) => print!("{out}"),
                Err(e) => tracing::error!("Failed to render logs: {}", e),
            },
            ReplCommand::Message(text) => {
                match dispatcher.process(&text, customer_name.as_deref()).await {
                    Ok(entry) => {
                        println!("\n[{}] {}\n", entry.handler_name, entry.response);
                    }
                    Err(e) => eprintln!("Error: {e}"),
                }
            }
        }
        eprint!("> ");
    }
    Ok(())
}
