use clap::Subcommand;
use serde_json::json;

use crate::cli::commands::records::check;
use crate::cli::config::load_session;
use crate::cli::utils::{output_record, output_records, output_success};
use crate::cli::{OutputFormat, DEFAULT_PAGE_SIZE};
use crate::client::ListStore;
use crate::records::profile::ResourceDetail;
use crate::records::{NewReview, Review, UserProfile};

const COLUMNS: &[&str] = &["id", "name", "location", "email"];

#[derive(Subcommand)]
pub enum ResourceCommands {
    #[command(about = "Browse the musician catalogue")]
    List {
        #[arg(long, help = "Page size")]
        limit: Option<usize>,
        #[arg(long, help = "Name prefix to search for")]
        search: Option<String>,
        #[arg(long, help = "Follow next-page tokens until the list is exhausted")]
        all: bool,
    },

    #[command(about = "Show a musician with their reviews and average rating")]
    Show {
        #[arg(help = "Musician ID")]
        id: String,
    },

    #[command(about = "Review a musician")]
    Review {
        #[arg(help = "Musician ID")]
        id: String,
        #[arg(long, help = "Rating from 1 to 5")]
        rating: i32,
        #[arg(long, default_value = "", help = "Review text")]
        comment: String,
    },
}

pub async fn handle(cmd: ResourceCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let session = load_session()?;

    match cmd {
        ResourceCommands::List { limit, search, all } => {
            let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE);
            let mut store = ListStore::<UserProfile>::new(session.client()?, "/resources");
            store.set_search_query(search.unwrap_or_default());
            store.fetch_first_page(limit).await?;
            if all {
                while store.fetch_next_page(limit).await? {}
            }
            output_records(&output_format, "resources", &store.items, COLUMNS, &store.pagination)
        }
        ResourceCommands::Show { id } => {
            let detail: ResourceDetail = session.client()?.get(&format!("/resources/{}", id)).await?;
            output_record(&output_format, &detail)
        }
        ResourceCommands::Review { id, rating, comment } => {
            let review = NewReview { rating, comment };
            check(&review)?;
            let client = session.authenticated_client()?;
            let created: Review = client.create(&format!("/resources/{}/reviews", id), &review).await?;
            output_success(
                &output_format,
                &format!("Reviewed musician {} with {} stars", id, created.rating),
                Some(json!({ "review": created })),
            )
        }
    }
}
