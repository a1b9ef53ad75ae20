use std::{
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{NotificationChannel, PageSize, StudentClient};
use shared::{
    domain::{StudentDraft, StudentId},
    protocol::StudentSearch,
};
use tokio::io::BufReader;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod render;

use commands::{needs_report, Console, DraftEdits};
use config::{load_settings, validate_server_url};

#[derive(Parser, Debug)]
#[command(name = "studentctl", about = "Manage student records from the terminal")]
struct Cli {
    #[arg(
        long,
        global = true,
        env = "STUDENTCTL_CONFIG",
        default_value = "studentctl.toml"
    )]
    config: PathBuf,
    /// Overrides `server_url` from the config file and environment.
    #[arg(long, global = true)]
    server_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print one page of the student list.
    List {
        #[arg(long)]
        page: Option<String>,
        #[arg(long)]
        page_size: Option<PageSize>,
    },
    /// Page through the list interactively.
    Browse {
        #[arg(long)]
        page_size: Option<PageSize>,
    },
    Show {
        id: String,
    },
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        city: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: i64,
        #[arg(long)]
        photo: Option<PathBuf>,
    },
    /// Change a record; fields left out keep their stored values.
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<i64>,
        #[arg(long)]
        photo: Option<PathBuf>,
    },
    Delete {
        id: String,
        /// Skip the confirmation prompt.
        #[arg(long, short)]
        yes: bool,
    },
    /// Download a record's photo.
    Photo {
        id: String,
        #[arg(long)]
        out: PathBuf,
    },
    RemovePhoto {
        id: String,
    },
    Search {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if needs_report(&err) {
                eprintln!("error: {err:#}");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut settings = load_settings(&cli.config);
    if let Some(raw) = &cli.server_url {
        settings.server_url = validate_server_url(raw)
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("invalid --server-url {raw:?}"))?;
    }
    if let Command::List {
        page_size: Some(size),
        ..
    }
    | Command::Browse {
        page_size: Some(size),
    } = &cli.command
    {
        settings.page_size = *size;
    }
    debug!(?settings, "resolved settings");

    let notifications = NotificationChannel::new();
    let client = StudentClient::new(settings.server_url.clone(), notifications.clone())
        .context("failed to build student api client")?;
    info!(server_url = client.server_url(), "using student api");

    let mut console = Console::new(
        client,
        notifications,
        settings.page_size,
        settings.toast_ttl,
    );

    let mut stdout = io::stdout().lock();
    let result = execute(&mut console, cli.command, &mut stdout).await;
    debug!(status = ?console.session().status(), "command finished");
    console.finish(result, &mut stdout, &mut io::stderr())
}

async fn execute<W: Write>(
    console: &mut Console<StudentClient>,
    command: Command,
    out: &mut W,
) -> Result<()> {
    match command {
        Command::List { page, .. } => console.list(page, None, out).await,
        Command::Browse { .. } => {
            let stdin = BufReader::new(tokio::io::stdin());
            console.browse(stdin, out, &mut io::stderr()).await
        }
        Command::Show { id } => console.show(&StudentId::new(id), out).await,
        Command::Add {
            name,
            city,
            email,
            phone,
            photo,
        } => {
            let draft = StudentDraft {
                student_name: name,
                student_city: city,
                student_email: email,
                student_phone: Some(phone),
            };
            console.add(draft, photo.as_deref(), out).await
        }
        Command::Update {
            id,
            name,
            city,
            email,
            phone,
            photo,
        } => {
            let edits = DraftEdits {
                name,
                city,
                email,
                phone,
            };
            console
                .update(&StudentId::new(id), &edits, photo.as_deref(), out)
                .await
        }
        Command::Delete { id, yes } => {
            let stdin = BufReader::new(tokio::io::stdin());
            console.delete(&StudentId::new(id), yes, stdin, out).await
        }
        Command::Photo { id, out: dest } => {
            console.save_photo(&StudentId::new(id), &dest, out).await
        }
        Command::RemovePhoto { id } => console.remove_photo(&StudentId::new(id), out).await,
        Command::Search { name, phone, email } => {
            let query = StudentSearch { name, phone, email };
            console.search(&query, out).await
        }
    }
}
