use clap::Subcommand;
use serde_json::json;

use crate::cli::config::load_session;
use crate::cli::utils::{output_records, output_success};
use crate::cli::{OutputFormat, DEFAULT_PAGE_SIZE};
use crate::client::{Identified, ListStore};
use crate::records::{AdminEntry, Appointment, Incident, OwnedRecord};

#[derive(Subcommand)]
pub enum AdminCommands {
    #[command(about = "Every user's appointments")]
    Appointments {
        #[command(subcommand)]
        cmd: AdminRecordCommands,
    },

    #[command(about = "Every user's incidents")]
    Incidents {
        #[command(subcommand)]
        cmd: AdminRecordCommands,
    },
}

#[derive(Subcommand)]
pub enum AdminRecordCommands {
    #[command(about = "List records across all users")]
    List {
        #[arg(long, help = "Page size")]
        limit: Option<usize>,
        #[arg(long, help = "Title prefix to search for")]
        search: Option<String>,
        #[arg(long, help = "Follow next-page tokens until the list is exhausted")]
        all: bool,
    },

    #[command(about = "Delete any user's record")]
    Delete {
        #[arg(help = "Record ID")]
        id: String,
    },
}

pub async fn handle(cmd: AdminCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AdminCommands::Appointments { cmd } => {
            handle_records::<Appointment>(cmd, &["id", "title", "date", "time", "userName"], output_format).await
        }
        AdminCommands::Incidents { cmd } => {
            handle_records::<Incident>(cmd, &["id", "title", "userName", "createdAt"], output_format).await
        }
    }
}

async fn handle_records<R>(cmd: AdminRecordCommands, columns: &[&str], output_format: OutputFormat) -> anyhow::Result<()>
where
    R: OwnedRecord + Identified,
{
    let client = load_session()?.authenticated_client()?;
    let path = format!("/admin/{}", R::LISTING.collection);

    match cmd {
        AdminRecordCommands::List { limit, search, all } => {
            let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE);
            let mut store = ListStore::<AdminEntry<R>>::new(client, path);
            store.set_search_query(search.unwrap_or_default());
            store.fetch_first_page(limit).await?;
            if all {
                while store.fetch_next_page(limit).await? {}
            }
            output_records(&output_format, R::LISTING.collection, &store.items, columns, &store.pagination)
        }
        AdminRecordCommands::Delete { id } => {
            client.delete(&format!("{}/{}", path, id)).await?;
            output_success(&output_format, &format!("{} {} deleted", R::NOUN, id), Some(json!({ "id": id })))
        }
    }
}
