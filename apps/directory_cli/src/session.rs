//! Line-driven session over the view coordinator.

use std::sync::Arc;

use client_core::{form::SubmitOutcome, View, ViewCoordinator};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::render::{render_directory, render_form};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Present(View),
    Username(String),
    Age(String),
    Submit,
    Search(String),
    Next,
    Prev,
    Refresh,
    Show,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  form | list          switch view
  username <value>     edit the draft username
  age <value>          edit the draft age
  submit               create the record
  search [keyword]     search the directory (debounced)
  next | prev          page through the directory
  refresh              clear the search and reload
  show                 print the current view
  help | quit
";

pub fn parse_command(line: &str) -> Result<SessionCommand, String> {
    let line = line.trim();
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };

    let command = match head.to_ascii_lowercase().as_str() {
        "form" => SessionCommand::Present(View::Form),
        "list" => SessionCommand::Present(View::Directory),
        "username" => SessionCommand::Username(rest.to_string()),
        "age" => SessionCommand::Age(rest.to_string()),
        "submit" => SessionCommand::Submit,
        "search" => SessionCommand::Search(rest.to_string()),
        "next" => SessionCommand::Next,
        "prev" => SessionCommand::Prev,
        "refresh" => SessionCommand::Refresh,
        "show" | "" => SessionCommand::Show,
        "help" | "?" => SessionCommand::Help,
        "quit" | "exit" => SessionCommand::Quit,
        other => return Err(format!("unknown command '{other}'; type 'help'")),
    };
    Ok(command)
}

pub async fn run(coordinator: Arc<ViewCoordinator>) -> anyhow::Result<()> {
    println!("{HELP}");
    print!("{}", render_active(&coordinator).await);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(message) => {
                println!("{message}");
                continue;
            }
        };
        debug!(?command, "session command");
        if command == SessionCommand::Quit {
            break;
        }
        if let Some(output) = apply(&coordinator, command).await {
            print!("{output}");
        }
    }

    coordinator.shutdown().await;
    Ok(())
}

async fn apply(coordinator: &ViewCoordinator, command: SessionCommand) -> Option<String> {
    let form = coordinator.form();
    let directory = coordinator.directory();
    match command {
        SessionCommand::Present(view) => coordinator.present(view).await,
        SessionCommand::Username(value) => form.set_username(value).await,
        SessionCommand::Age(value) => form.set_age(value).await,
        SessionCommand::Submit => {
            if let SubmitOutcome::Ignored = form.submit().await {
                return Some("a submission is already in flight\n".to_string());
            }
        }
        SessionCommand::Search(keyword) => {
            directory.set_keyword(keyword.clone()).await;
            return Some(format!("searching for '{keyword}' (type 'show' to see results)\n"));
        }
        SessionCommand::Next => {
            if !directory.go_to_next_page().await {
                return Some("already on the last page\n".to_string());
            }
        }
        SessionCommand::Prev => {
            if !directory.go_to_prev_page().await {
                return Some("already on the first page\n".to_string());
            }
        }
        SessionCommand::Refresh => directory.refresh().await,
        SessionCommand::Show => {}
        SessionCommand::Help => return Some(HELP.to_string()),
        SessionCommand::Quit => return None,
    }
    Some(render_active(coordinator).await)
}

async fn render_active(coordinator: &ViewCoordinator) -> String {
    match coordinator.active().await {
        View::Form => render_form(&coordinator.form().state().await),
        View::Directory => render_directory(&coordinator.directory().state().await),
    }
}
