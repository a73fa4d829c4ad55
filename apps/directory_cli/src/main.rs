use std::sync::Arc;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use client_core::{
    config::parse_base_address, load_settings, DirectoryController, FormController,
    HttpRecordStore, RecordStore, SubmitOutcome, TracingDiagnostics, ViewCoordinator,
};
use shared::domain::{QueryParams, RecordId};
use tracing_subscriber::EnvFilter;

mod render;
mod session;

#[derive(Parser, Debug)]
#[command(name = "directory", about = "Register and browse directory records")]
struct Cli {
    /// Record store base address, e.g. http://localhost:5000/api
    #[arg(long, global = true)]
    base_address: Option<String>,
    /// Request timeout in milliseconds
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        age: String,
    },
    List {
        #[arg(long, default_value = "")]
        keyword: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        json: bool,
    },
    Show {
        id: i64,
    },
    Interactive,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings()?;
    if let Some(base_address) = &cli.base_address {
        settings.base_address = parse_base_address(base_address)?;
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        settings.timeout_ms = timeout_ms;
    }
    tracing::info!(base_address = %settings.base_address, timeout_ms = settings.timeout_ms, "using record store");

    let store: Arc<dyn RecordStore> =
        Arc::new(HttpRecordStore::new(&settings, Arc::new(TracingDiagnostics))?);

    match cli.command {
        Command::Register { username, age } => {
            let form = FormController::new(store);
            form.set_username(username).await;
            form.set_age(age).await;
            let outcome = form.submit().await;
            let state = form.state().await;
            match outcome {
                SubmitOutcome::Created(record) => {
                    println!(
                        "{} (id={})",
                        state.success_message.unwrap_or_default(),
                        record.id.0
                    );
                }
                SubmitOutcome::Invalid | SubmitOutcome::Rejected(_) | SubmitOutcome::Ignored => {
                    print!("{}", render::render_form(&state));
                    bail!("record was not created");
                }
            }
        }
        Command::List {
            keyword,
            page,
            json,
        } => {
            let params = QueryParams::for_page(&keyword, page);
            let result = store.list_records(params).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result.records)?);
            } else {
                print!("{}", render::render_page(page.max(1), &result));
            }
        }
        Command::Show { id } => {
            let record = store.get_record(RecordId(id)).await?;
            print!("{}", render::render_record(&record));
        }
        Command::Interactive => {
            let coordinator = ViewCoordinator::start(
                FormController::new(store.clone()),
                DirectoryController::new(store),
            );
            session::run(coordinator).await?;
        }
    }

    Ok(())
}
