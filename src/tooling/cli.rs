//! CLI Tooling
//!
//! Command-line interface over the section registry: load and print trees,
//! expand and reveal nodes, list pages and generate static snapshots.

use crate::config::NavConfig;
use crate::document::DocumentStoreClient;
use crate::error::NavError;
use crate::fetch::{Fetcher, HttpTransport, ReqwestTransport};
use crate::logging::LoggingConfig;
use crate::service::NavigationService;
use crate::snapshot::SnapshotWriter;
use crate::store::{NavigationStore, PrimarySource, SectionRegistry};
use crate::tree::{flatten, prev_next, FlatPage, NavItem, PrevNext, ProcessedNode};
use clap::{Parser, Subcommand, ValueEnum};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// navsync - hierarchical navigation synchronization
#[derive(Parser, Debug)]
#[command(name = "navsync")]
#[command(about = "Load, expand and snapshot section navigation trees from a document store")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Serve tier 1 from the document store directly instead of the section endpoints
    #[arg(long, global = true)]
    pub in_process: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long, global = true)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Apply logging flags on top of the configured logging section
    pub fn logging_config(&self, base: &LoggingConfig) -> LoggingConfig {
        let mut config = base.clone();
        if let Some(level) = &self.log_level {
            config.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.format = format.clone();
        }
        if let Some(output) = &self.log_output {
            config.output = output.clone();
        }
        if let Some(file) = &self.log_file {
            config.file = Some(file.clone());
        }
        config
    }

    pub fn primary_source(&self) -> PrimarySource {
        if self.in_process {
            PrimarySource::InProcess
        } else {
            PrimarySource::Endpoint
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load a section and print its top-level tree
    Tree {
        #[arg(long)]
        section: String,
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Toggle a loaded node and print its children
    Expand {
        #[arg(long)]
        section: String,
        /// Node id
        id: String,
    },
    /// Reveal the root-to-node path, loading ancestors as needed
    Reveal {
        #[arg(long)]
        section: String,
        /// Node id
        id: String,
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// List loaded pages in reading order
    Pages {
        #[arg(long)]
        section: String,
    },
    /// Print the previous and next pages around a page in reading order
    Neighbors {
        #[arg(long)]
        section: String,
        /// Page slug
        slug: String,
    },
    /// Print every visible page of a section nested under its parent
    Outline {
        #[arg(long)]
        section: String,
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Generate the static snapshot for a section
    Snapshot {
        #[arg(long)]
        section: String,
        /// Destination file
        #[arg(long)]
        output: PathBuf,
    },
    /// List configured sections
    Sections,
}

/// Runtime state for one CLI invocation
pub struct CliContext {
    config: NavConfig,
    transport: Arc<dyn HttpTransport>,
    registry: SectionRegistry,
    runtime: tokio::runtime::Runtime,
}

impl CliContext {
    /// Context backed by the reqwest transport
    pub fn new(config: NavConfig, primary: PrimarySource) -> Result<Self, NavError> {
        Self::with_transport(config, Arc::new(ReqwestTransport::new()), primary)
    }

    pub fn with_transport(
        config: NavConfig,
        transport: Arc<dyn HttpTransport>,
        primary: PrimarySource,
    ) -> Result<Self, NavError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|e| NavError::ConfigError(format!("Failed to start async runtime: {}", e)))?;
        let registry = SectionRegistry::from_config(&config, Arc::clone(&transport), primary);
        Ok(Self {
            config,
            transport,
            registry,
            runtime,
        })
    }

    pub fn config(&self) -> &NavConfig {
        &self.config
    }

    /// Execute a CLI command, returning the text to print
    pub fn execute(&self, command: &Commands) -> Result<String, NavError> {
        match command {
            Commands::Tree { section, format } => {
                let store = self.initialized(section)?;
                let items = store.items();
                match format {
                    OutputFormat::Json => to_json(&items),
                    OutputFormat::Text => Ok(format_tree(&items)),
                }
            }
            Commands::Expand { section, id } => {
                let store = self.initialized(section)?;
                if store.find_by_id(id).is_none() {
                    return Err(NavError::NodeNotFound {
                        section: section.clone(),
                        id: id.clone(),
                    });
                }
                self.runtime.block_on(store.toggle_expand(id));
                let node = store.find_by_id(id).ok_or_else(|| NavError::NoData {
                    section: section.clone(),
                })?;
                Ok(format_expanded(&node))
            }
            Commands::Reveal {
                section,
                id,
                format,
            } => {
                let store = self.registry.get(section)?;
                let path = self
                    .runtime
                    .block_on(store.reveal_path(id))
                    .ok_or_else(|| NavError::NodeNotFound {
                        section: section.clone(),
                        id: id.clone(),
                    })?;
                match format {
                    OutputFormat::Json => to_json(&path),
                    OutputFormat::Text => Ok(format_path(&path, &store.items())),
                }
            }
            Commands::Pages { section } => {
                let store = self.initialized(section)?;
                Ok(format_pages(&flatten(&store.items())))
            }
            Commands::Neighbors { section, slug } => {
                let store = self.initialized(section)?;
                let pages = flatten(&store.items());
                let neighbors = prev_next(&pages, slug);
                if neighbors.current.is_none() {
                    return Err(NavError::NodeNotFound {
                        section: section.clone(),
                        id: slug.clone(),
                    });
                }
                Ok(format_neighbors(&neighbors))
            }
            Commands::Outline { section, format } => {
                let tree = self.runtime.block_on(self.service(section)?.full_tree())?;
                match format {
                    OutputFormat::Json => to_json(&tree),
                    OutputFormat::Text => Ok(format_outline(&tree)),
                }
            }
            Commands::Snapshot { section, output } => {
                let service = self.service(section)?;
                let tree = self.runtime.block_on(service.top_level_tree())?;
                let bytes = SnapshotWriter::new(output).write(&tree)?;
                info!(section = %section, path = %output.display(), "Snapshot generated");
                Ok(format!(
                    "Wrote {} top-level items ({} bytes) to {}",
                    tree.len(),
                    bytes,
                    output.display()
                ))
            }
            Commands::Sections => Ok(format_sections(&self.config)),
        }
    }

    fn service(&self, section: &str) -> Result<NavigationService, NavError> {
        let section_config = self.config.section(section)?.clone();
        let fetcher = Fetcher::new(Arc::clone(&self.transport), self.config.retry);
        let client = DocumentStoreClient::new(fetcher, self.config.document_store.base_url.clone());
        Ok(NavigationService::new(client, section_config))
    }

    fn initialized(&self, section: &str) -> Result<Arc<NavigationStore>, NavError> {
        let store = self.registry.get(section)?;
        self.runtime.block_on(store.ensure_initialized());
        if store.error().is_some() {
            return Err(NavError::NoData {
                section: section.to_string(),
            });
        }
        Ok(store)
    }
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, NavError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| NavError::ConfigError(format!("Failed to render JSON: {}", e)))
}

/// Indented tree: `▾` expanded, `▸` collapsed with children, `•` leaf
pub fn format_tree(items: &[ProcessedNode]) -> String {
    let mut out = String::new();
    render_level(items, 0, &mut out);
    out.trim_end().to_string()
}

fn render_level(items: &[ProcessedNode], depth: usize, out: &mut String) {
    for node in items {
        let marker = match (node.has_children(), node.is_expanded()) {
            (true, true) => "▾",
            (true, false) => "▸",
            (false, _) => "•",
        };
        let title = if node.is_category() {
            node.title().bold().to_string()
        } else {
            node.title().to_string()
        };
        out.push_str(&format!("{}{} {}", "  ".repeat(depth), marker, title));
        if let Some(slug) = node.slug() {
            out.push_str(&format!(" {}", format!("/{}", slug).dimmed()));
        }
        out.push_str(&format!(" {}\n", format!("[{}]", node.id()).dimmed()));
        if node.is_expanded() {
            render_level(node.children(), depth + 1, out);
        }
    }
}

/// Fully nested listing of wire items, one line per page
pub fn format_outline(items: &[NavItem]) -> String {
    fn walk(items: &[NavItem], depth: usize, out: &mut String) {
        for item in items {
            let title = if item.is_category {
                item.title.bold().to_string()
            } else {
                item.title.clone()
            };
            out.push_str(&format!("{}{}\n", "  ".repeat(depth), title));
            if let Some(children) = &item.children {
                walk(children, depth + 1, out);
            }
        }
    }
    let mut out = String::new();
    walk(items, 0, &mut out);
    out.trim_end().to_string()
}

fn format_expanded(node: &ProcessedNode) -> String {
    let state = if node.is_expanded() { "expanded" } else { "collapsed" };
    let mut out = format!("{} ({}, {} children)\n", node.title().bold(), state, node.children().len());
    if node.is_expanded() {
        let mut level = String::new();
        render_level(node.children(), 1, &mut level);
        out.push_str(&level);
    }
    out.trim_end().to_string()
}

fn format_path(path: &[ProcessedNode], items: &[ProcessedNode]) -> String {
    let crumbs: Vec<&str> = path.iter().map(ProcessedNode::title).collect();
    format!("{}\n\n{}", crumbs.join(" › ").bold(), format_tree(items))
}

fn format_neighbors(neighbors: &PrevNext<'_>) -> String {
    let describe = |page: Option<&FlatPage>| match page {
        Some(page) => match &page.slug {
            Some(slug) => format!("{} {}", page.title, format!("/{}", slug).dimmed()),
            None => page.title.clone(),
        },
        None => "-".dimmed().to_string(),
    };
    format!(
        "← {}\n{}\n→ {}",
        describe(neighbors.previous),
        describe(neighbors.current).bold(),
        describe(neighbors.next)
    )
}

fn format_pages(pages: &[FlatPage]) -> String {
    if pages.is_empty() {
        return "No pages loaded".to_string();
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Category", "Title", "Slug", "Depth", "ID"]);
    for page in pages {
        table.add_row(vec![
            page.category_name.clone(),
            format!("{}{}", "  ".repeat(page.depth), page.title),
            page.slug.clone().unwrap_or_else(|| "-".to_string()),
            page.depth.to_string(),
            page.id.clone(),
        ]);
    }
    table.to_string()
}

fn format_sections(config: &NavConfig) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Section", "Collection", "Endpoint", "Children", "Fallback", "Snapshot"]);
    for (name, section) in &config.sections {
        table.add_row(vec![
            name.clone(),
            section.collection.clone(),
            section.primary_endpoint.clone(),
            section
                .children_endpoint_pattern
                .clone()
                .unwrap_or_else(|| "-".to_string()),
            section
                .direct_fallback
                .as_ref()
                .map(|f| format!("{} (limit {})", f.collection, f.limit))
                .unwrap_or_else(|| "-".to_string()),
            section.static_snapshot.clone().unwrap_or_else(|| "-".to_string()),
        ]);
    }
    table.to_string()
}
