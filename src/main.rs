//! Marketplace page builder CLI
//!
//! Edits the site configuration document stored by a file or relay channel
//! and prints results as JSON.
//!
//! ```text
//! pagebuilder --config builder.toml <command>
//!     → load_config → init_logging
//!     → channel.backend:
//!         file  → FileChannel (<directory>/<namespace>_site_specific_config.json)
//!         relay → RelayChannel (kind 30078, d = <namespace>_site_specific_config)
//!     → PageBuilder::load → edit → await publish → print JSON
//! ```

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use market_pagebuilder::builder::{Edit, PageBuilder};
use market_pagebuilder::channel::{
    ConfigurationReadChannel, ConfigurationWriteChannel, DocumentWatcher, FileChannel, RelayChannel,
};
use market_pagebuilder::config::{load_config, BuilderConfig, ChannelBackend};
use market_pagebuilder::document::{validate_document, EntityKind, PageId, SectionId, SiteConfig, WidgetType, WIDGET_CATALOG};
use market_pagebuilder::engine::{SectionMove, SectionSetup};
use market_pagebuilder::observability::logging::init_logging;
use market_pagebuilder::publish::{ChannelKeys, ConfigurationPublisher};
use market_pagebuilder::store::ConfigurationStore;

#[derive(Parser)]
#[command(name = "pagebuilder")]
#[command(about = "Edit the marketplace page layout configuration", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the stored site configuration
    Show,
    /// List the available section widgets
    Widgets,
    /// Append a section to a page
    AddSection {
        title: String,
        #[arg(long, default_value = "0")]
        page: String,
    },
    /// Configure a section
    Setup {
        page: String,
        section: String,
        #[arg(long)]
        title: String,
        #[arg(long = "type")]
        widget: WidgetType,
        #[arg(long)]
        max: Option<u32>,
        #[arg(long)]
        text: Option<String>,
    },
    /// Move a section between display positions
    Move { page: String, from: usize, to: usize },
    /// Delete a section
    RemoveSection { page: String, section: String },
    /// Attach a product or stall to a section
    AddItem {
        page: String,
        section: String,
        kind: EntityKind,
        id: String,
    },
    /// Detach a product or stall from a section
    RemoveItem {
        page: String,
        section: String,
        kind: EntityKind,
        id: String,
    },
    /// List the sections showing an item
    Places { kind: EntityKind, id: String },
    /// Check the stored document for inconsistencies
    Validate,
    /// Follow external changes to the stored document (file backend)
    Watch,
}

/// The configured channel, seen from both sides.
struct Channels {
    write: Arc<dyn ConfigurationWriteChannel>,
    read: Arc<dyn ConfigurationReadChannel>,
    file: Option<Arc<FileChannel>>,
}

fn open_channels(config: &BuilderConfig) -> Result<Channels, Box<dyn Error>> {
    match config.channel.backend {
        ChannelBackend::File => {
            let channel = Arc::new(FileChannel::new(&config.channel.directory));
            tracing::debug!(directory = %config.channel.directory, "Using file channel");
            Ok(Channels {
                write: channel.clone(),
                read: channel.clone(),
                file: Some(channel),
            })
        }
        ChannelBackend::Relay => {
            let channel = Arc::new(RelayChannel::new(&config.channel)?);
            tracing::debug!(relays = ?channel.relays(), author = %channel.public_key(), "Using relay channel");
            Ok(Channels {
                write: channel.clone(),
                read: channel,
                file: None,
            })
        }
    }
}

#[derive(Serialize)]
struct EditReport<T> {
    version: u64,
    changed: bool,
    value: T,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => BuilderConfig::default(),
    };
    init_logging(&config.observability);

    let channels = open_channels(&config)?;
    let keys = ChannelKeys::from_config(&config.channel);
    let publisher = ConfigurationPublisher::new(channels.write.clone(), keys.clone(), &config.publisher);
    let store = ConfigurationStore::shared();
    let builder = PageBuilder::new(store.clone(), Arc::new(publisher), channels.read.clone());

    tracing::debug!(namespace = %keys.namespace(), "Loading site configuration");
    builder.load().await?;

    match cli.command {
        Commands::Show => {
            let site = builder.snapshot().map(|site| (*site).clone()).unwrap_or_default();
            print_json(&site)?;
        }
        Commands::Widgets => {
            print_json(&WIDGET_CATALOG)?;
        }
        Commands::AddSection { title, page } => {
            let edit = builder.add_section_to_page(&title, &PageId::new(page))?;
            report(edit).await?;
        }
        Commands::Setup {
            page,
            section,
            title,
            widget,
            max,
            text,
        } => {
            let page = PageId::new(page);
            let section = SectionId::new(section);
            let mut setup = SectionSetup::new(title, widget);
            if let Some(max) = max {
                setup = setup.with_max_products(max);
            }
            if let Some(text) = text {
                setup = setup.with_markdown(text);
            }

            let edit = builder.save_section_setup(&page, &section, &setup)?;
            let Edit {
                value: text_publish,
                version,
                changed,
                publish,
            } = edit;
            if let Some(handle) = text_publish {
                handle.wait().await?;
            }
            if let Some(handle) = publish {
                handle.wait().await?;
            }
            print_json(&EditReport {
                version,
                changed,
                value: builder.section(&page, &section),
            })?;
        }
        Commands::Move { page, from, to } => {
            let edit = builder.handle_move(&PageId::new(page), SectionMove::new(from, to))?;
            report(edit).await?;
        }
        Commands::RemoveSection { page, section } => {
            let edit = builder.remove_section(&PageId::new(page), &SectionId::new(section))?;
            report(edit).await?;
        }
        Commands::AddItem { page, section, kind, id } => {
            let edit = builder.add_item_to_section(&PageId::new(page), &SectionId::new(section), &id, kind)?;
            report(edit).await?;
        }
        Commands::RemoveItem { page, section, kind, id } => {
            let edit = builder.remove_item_from_section(&PageId::new(page), &SectionId::new(section), &id, kind)?;
            report(edit).await?;
        }
        Commands::Places { kind, id } => {
            print_json(&builder.places_where_item_is_present(&id, kind))?;
        }
        Commands::Validate => {
            let site = builder.snapshot().map(|site| (*site).clone()).unwrap_or_default();
            validate(&site)?;
        }
        Commands::Watch => {
            let Some(channel) = channels.file.as_ref() else {
                return Err("watch needs channel.backend = \"file\"".into());
            };
            let watcher = DocumentWatcher::new(channel, &keys.site(), store.clone());
            tracing::info!(path = ?watcher.path(), "Watching for changes (Ctrl+C to stop)");
            let _watcher = watcher.run()?;

            let mut updates = store.subscribe();
            updates.borrow_and_update();
            loop {
                tokio::select! {
                    changed = updates.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("Stopping watcher");
                        break;
                    }
                }

                let snapshot = updates.borrow_and_update().clone();
                let sections = snapshot.site.as_ref().map_or(0, |site| site.section_count());
                println!(
                    "{}",
                    serde_json::to_string(&EditReport {
                        version: snapshot.version,
                        changed: true,
                        value: sections,
                    })?
                );
            }
        }
    }

    Ok(())
}

/// Wait for the publish and print the outcome.
async fn report<T: Serialize>(edit: Edit<T>) -> Result<(), Box<dyn Error>> {
    let version = edit.version;
    let changed = edit.changed;
    let value = edit.published().await?;
    print_json(&EditReport { version, changed, value })
}

fn validate(site: &SiteConfig) -> Result<(), Box<dyn Error>> {
    match validate_document(site) {
        Ok(()) => {
            println!("Document is valid");
            Ok(())
        }
        Err(problems) => {
            for problem in &problems {
                eprintln!("- {}", problem);
            }
            Err(format!("{} problem(s) found", problems.len()).into())
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
