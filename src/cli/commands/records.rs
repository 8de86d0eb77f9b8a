use clap::Subcommand;
use serde_json::json;

use crate::cli::config::load_session;
use crate::cli::utils::{output_record, output_records, output_success, read_json_input};
use crate::cli::OutputFormat;
use crate::client::{Identified, ListQuery, ListStore, Pagination};
use crate::records::{OwnedRecord, Validate};

/// Subcommands shared by `melody appointments` and `melody incidents`
#[derive(Subcommand)]
pub enum RecordCommands {
    #[command(about = "List your records, newest first")]
    List {
        #[arg(long, help = "Page size (server default when omitted)")]
        limit: Option<usize>,
        #[arg(long, help = "Title prefix to search for")]
        search: Option<String>,
        #[arg(long, help = "Continue from a previous page")]
        page_token: Option<String>,
        #[arg(long, help = "Follow next-page tokens until the list is exhausted")]
        all: bool,
    },

    #[command(about = "Show one record")]
    Show {
        #[arg(help = "Record ID")]
        id: String,
    },

    #[command(about = "Create a record from --data or stdin JSON")]
    Create {
        #[arg(long, help = "JSON body (read from stdin if not provided)")]
        data: Option<String>,
    },

    #[command(about = "Update a record from --data or stdin JSON")]
    Update {
        #[arg(help = "Record ID")]
        id: String,
        #[arg(long, help = "JSON body with the fields to change (read from stdin if not provided)")]
        data: Option<String>,
    },

    #[command(about = "Delete a record")]
    Delete {
        #[arg(help = "Record ID")]
        id: String,
    },
}

/// Dispatch against the collection rooted at `path`; `columns` drive the text table
pub async fn handle<R>(cmd: RecordCommands, path: &str, columns: &[&str], output_format: OutputFormat) -> anyhow::Result<()>
where
    R: OwnedRecord + Identified,
{
    let client = load_session()?.authenticated_client()?;

    match cmd {
        RecordCommands::List { limit, search, page_token, all } => {
            // An explicit token bypasses the store: it only walks forward from the first page
            if let Some(token) = page_token {
                let mut query = ListQuery::default().page_token(Some(token));
                query.limit = limit;
                if let Some(search) = &search {
                    query = query.search(search);
                }
                let page = client.list::<R>(path, &query).await?;
                return output_records(&output_format, R::LISTING.collection, &page.items, columns, &Pagination::of(&page));
            }

            let limit = limit.unwrap_or(crate::cli::DEFAULT_PAGE_SIZE);
            let mut store = ListStore::<R>::new(client, path);
            store.set_search_query(search.unwrap_or_default());
            store.fetch_first_page(limit).await?;
            if all {
                while store.fetch_next_page(limit).await? {}
            }
            output_records(&output_format, R::LISTING.collection, &store.items, columns, &store.pagination)
        }
        RecordCommands::Show { id } => {
            let record: R = client.get(&format!("{}/{}", path, id)).await?;
            output_record(&output_format, &record)
        }
        RecordCommands::Create { data } => {
            let body: R::New = serde_json::from_value(read_json_input(data)?)?;
            check(&body)?;
            let created: R = client.create(path, &body).await?;
            output_success(
                &output_format,
                &format!("{} {} created", R::NOUN, OwnedRecord::id(&created)),
                Some(json!({ "record": created })),
            )
        }
        RecordCommands::Update { id, data } => {
            let patch: R::Patch = serde_json::from_value(read_json_input(data)?)?;
            check(&patch)?;
            let updated: R = client.update(&format!("{}/{}", path, id), &patch).await?;
            output_success(
                &output_format,
                &format!("{} {} updated", R::NOUN, id),
                Some(json!({ "record": updated })),
            )
        }
        RecordCommands::Delete { id } => {
            client.delete(&format!("{}/{}", path, id)).await?;
            output_success(&output_format, &format!("{} {} deleted", R::NOUN, id), Some(json!({ "id": id })))
        }
    }
}

/// Run the same input checks the server runs before sending anything
pub(crate) fn check<B: Validate>(body: &B) -> anyhow::Result<()> {
    body.validate().map_err(|e| anyhow::anyhow!("{}", e))
}
