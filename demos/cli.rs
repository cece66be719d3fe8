use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use linkhub_client_rs::{
    load_config, Config, ContentItem, Error, FilterOptions, LinkClient, SaveRequest, SearchQuery,
    TracingNotifier, TOKEN_ENV_VAR,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "linkhub",
    about = "Browse, search and save links in your linkhub account",
    arg_required_else_help = true
)]
struct Cli {
    #[arg(short, long, value_name = "FILE", help = "Path to the TOML config file")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List saved items, newest first
    List {
        #[arg(long)]
        universe: Option<String>,
        #[arg(long)]
        hide_read: bool,
        #[arg(long)]
        hide_archived: bool,
        #[arg(long)]
        details: bool,
    },
    /// Search saved items by text
    Search {
        query: String,
        #[arg(long)]
        universe: Option<String>,
    },
    /// List universes
    Universes,
    /// Save a URL
    Save {
        url: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        universe: Option<String>,
    },
    /// Mark an item as read (or unread)
    Read {
        id: String,
        #[arg(long)]
        unread: bool,
    },
    /// Archive an item (or restore it)
    Archive {
        id: String,
        #[arg(long)]
        restore: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let cli = Cli::parse();
    let config = build_config(cli.config.as_deref())?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let client = LinkClient::new(config, Arc::new(TracingNotifier))?;

    match cli.command {
        Commands::List {
            universe,
            hide_read,
            hide_archived,
            details,
        } => {
            let filter = FilterOptions {
                universe_id: universe,
                hide_read,
                hide_archived,
                ..client.filter()
            };
            let all = client.fetch_all(&filter).await?;
            if !all.authenticated {
                println!("Not logged in. Set a token in the config or {TOKEN_ENV_VAR}.");
            } else {
                print_items(&all.items, details);
            }
        }
        Commands::Search { query, universe } => {
            let mut query = SearchQuery::new(query);
            query.universe_id = universe;
            let found = client.search(&query, &client.filter()).await?;
            if !found.authenticated {
                println!("Not logged in. Set a token in the config or {TOKEN_ENV_VAR}.");
            } else {
                print_items(&found.items, false);
            }
        }
        Commands::Universes => {
            let universes = client.list_universes().await?;
            if universes.is_empty() {
                println!("No universes found.");
            }
            for u in universes {
                println!("{} ({} item(s))  [{}]", u.name, u.count, u.id);
            }
        }
        Commands::Save {
            url,
            title,
            universe,
        } => {
            let title = title.unwrap_or_else(|| url.clone());
            let mut request = SaveRequest::new(url, title);
            request.collection_id = universe;
            let saved = client.save_link(&request).await?;
            println!("Saved {} as {}", request.url, saved.item_id);
        }
        Commands::Read { id, unread } => {
            client.set_read(&id, !unread).await?;
            println!("Marked {id} as {}", if unread { "unread" } else { "read" });
        }
        Commands::Archive { id, restore } => {
            client.set_archived(&id, !restore).await?;
            println!("{} {id}", if restore { "Restored" } else { "Archived" });
        }
    }

    Ok(())
}

fn print_items(items: &[ContentItem], details: bool) {
    if items.is_empty() {
        println!("No items found.");
        return;
    }
    println!("Found {} item(s):", items.len());
    for (idx, item) in items.iter().enumerate() {
        println!("{}. [{}] {}", idx + 1, item.kind.as_str(), item.title);
        if details {
            println!("   ID: {}", item.id);
            println!("   URL: {}", item.url);
            if let Some(summary) = &item.summary {
                println!("   Summary: {}", summary);
            }
        }
    }
}

fn build_config(path: Option<&std::path::Path>) -> Result<Config, Error> {
    let mut cfg = match path {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };
    if let Ok(token) = std::env::var(TOKEN_ENV_VAR) {
        cfg.token = Some(token);
    }
    Ok(cfg)
}
