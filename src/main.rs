//! Command-line entry point for callhier

use anyhow::{Context, anyhow, bail};
use callhier::{
    CallHierarchyHandler, CancellationToken, ContentId, HierarchyError, HierarchyNode, Position,
    Range, Settings, WorkspaceHost, logging,
};
use clap::{
    Args, Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use serde::Serialize;
use std::path::{Path, PathBuf};

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

#[derive(Parser)]
#[command(
    name = "callhier",
    version = env!("CARGO_PKG_VERSION"),
    about = "Call hierarchy for Java workspaces",
    long_about = "Find the callers and callees of Java methods, constructors and fields \
                  across workspace sources and library artifacts.",
    next_line_help = true,
    styles = clap_cargo_style()
)]
struct Cli {
    /// Path to custom settings.toml file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print JSON instead of a tree
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
enum Commands {
    /// Show the call hierarchy item at a position
    #[command(about = "Resolve the declaration at a position into a hierarchy item")]
    Prepare {
        #[command(flatten)]
        at: Location,
    },

    /// Show who calls the declaration at a position
    #[command(about = "List incoming calls, expanded into a caller tree")]
    Incoming {
        #[command(flatten)]
        at: Location,

        /// Levels to expand (defaults to hierarchy.max_depth)
        #[arg(short, long)]
        depth: Option<usize>,
    },

    /// Show what the declaration at a position calls
    #[command(about = "List outgoing calls, expanded into a callee tree")]
    Outgoing {
        #[command(flatten)]
        at: Location,

        /// Levels to expand (defaults to hierarchy.max_depth)
        #[arg(short, long)]
        depth: Option<usize>,
    },

    /// Show the effective configuration
    #[command(about = "Print the merged settings as TOML")]
    Config,
}

/// A position in a workspace file. Line and column are one-based.
#[derive(Args)]
struct Location {
    /// Java source file
    file: PathBuf,

    /// Line number
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    line: u32,

    /// Column number
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    column: u32,
}

impl Location {
    fn uri(&self) -> anyhow::Result<String> {
        let absolute = absolute_path(&self.file)?;
        Ok(ContentId::workspace(absolute).uri())
    }

    fn position(&self) -> Position {
        Position::new(self.line - 1, self.column - 1)
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Direction {
    Incoming,
    Outgoing,
}

/// One level of an expanded hierarchy
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TreeEntry {
    #[serde(flatten)]
    node: HierarchyNode,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    from_ranges: Vec<Range>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<TreeEntry>,
    /// Already on the current path, not expanded again
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    recursive: bool,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        if let Some(error) = e.downcast_ref::<HierarchyError>() {
            for suggestion in error.recovery_suggestions() {
                eprintln!("  - {suggestion}");
            }
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = load_settings(cli.config.as_deref())?;
    logging::init(&settings);

    match cli.command {
        Commands::Config => {
            let toml = toml::to_string_pretty(&settings).context("failed to render settings")?;
            println!("{toml}");
        }
        Commands::Prepare { at } => {
            let host = WorkspaceHost::from_settings(&settings);
            let handler = CallHierarchyHandler::new(&host);
            let token = CancellationToken::new();
            let Some(items) = prepare(&handler, &at, &token)? else {
                return Ok(());
            };
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&items)?);
            } else {
                for item in &items {
                    println!("{}", describe(item));
                }
            }
        }
        Commands::Incoming { at, depth } => {
            let max_depth = depth.unwrap_or(settings.hierarchy.max_depth);
            show_tree(&settings, &at, Direction::Incoming, max_depth, cli.json)?;
        }
        Commands::Outgoing { at, depth } => {
            let max_depth = depth.unwrap_or(settings.hierarchy.max_depth);
            show_tree(&settings, &at, Direction::Outgoing, max_depth, cli.json)?;
        }
    }

    Ok(())
}

fn show_tree(
    settings: &Settings,
    at: &Location,
    direction: Direction,
    max_depth: usize,
    json: bool,
) -> anyhow::Result<()> {
    let host = WorkspaceHost::from_settings(settings);
    let handler = CallHierarchyHandler::new(&host);
    let token = CancellationToken::new();

    let Some(items) = prepare(&handler, at, &token)? else {
        return Ok(());
    };
    let mut trees = Vec::with_capacity(items.len());
    for item in items {
        let mut path = vec![item.clone()];
        let children = expand(&handler, &item, direction, max_depth, &mut path, &token)?;
        trees.push(TreeEntry {
            node: item,
            from_ranges: Vec::new(),
            children,
            recursive: false,
        });
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&trees)?);
    } else {
        for tree in &trees {
            print_tree(tree, 0);
        }
    }
    Ok(())
}

fn load_settings(config: Option<&Path>) -> anyhow::Result<Settings> {
    let settings = match config {
        Some(path) => {
            if !path.exists() {
                bail!("configuration file not found: {}", path.display());
            }
            Settings::load_from(path)
        }
        None => Settings::load(),
    };
    settings.map_err(|e| anyhow!("failed to load configuration: {e}"))
}

fn prepare(
    handler: &CallHierarchyHandler<'_>,
    at: &Location,
    token: &CancellationToken,
) -> anyhow::Result<Option<Vec<HierarchyNode>>> {
    let items = handler.prepare_call_hierarchy(&at.uri()?, at.position(), token)?;
    if items.is_none() {
        eprintln!(
            "No call hierarchy item at {}:{}:{}",
            at.file.display(),
            at.line,
            at.column
        );
    }
    Ok(items)
}

/// Expand `node` up to `remaining` levels, skipping items already on `path`
fn expand(
    handler: &CallHierarchyHandler<'_>,
    node: &HierarchyNode,
    direction: Direction,
    remaining: usize,
    path: &mut Vec<HierarchyNode>,
    token: &CancellationToken,
) -> anyhow::Result<Vec<TreeEntry>> {
    if remaining == 0 {
        return Ok(Vec::new());
    }

    let calls: Vec<(HierarchyNode, Vec<Range>)> = match direction {
        Direction::Incoming => handler
            .incoming_calls(node, token)?
            .into_iter()
            .map(|call| (call.from, call.from_ranges))
            .collect(),
        Direction::Outgoing => handler
            .outgoing_calls(node, token)?
            .into_iter()
            .map(|call| (call.to, call.from_ranges))
            .collect(),
    };

    let mut entries = Vec::with_capacity(calls.len());
    for (item, from_ranges) in calls {
        let recursive = path.iter().any(|seen| same_item(seen, &item));
        let children = if recursive {
            Vec::new()
        } else {
            path.push(item.clone());
            let children = expand(handler, &item, direction, remaining - 1, path, token)?;
            path.pop();
            children
        };
        entries.push(TreeEntry {
            node: item,
            from_ranges,
            children,
            recursive,
        });
    }
    Ok(entries)
}

fn same_item(a: &HierarchyNode, b: &HierarchyNode) -> bool {
    match (&a.data, &b.data) {
        (Some(x), Some(y)) => x == y,
        _ => a.uri == b.uri && a.selection_range == b.selection_range,
    }
}

fn print_tree(entry: &TreeEntry, indent: usize) {
    let pad = "  ".repeat(indent);
    let mut line = format!("{pad}{}", describe(&entry.node));
    if !entry.from_ranges.is_empty() {
        let sites = entry
            .from_ranges
            .iter()
            .map(|r| format!("{}:{}", r.start.line + 1, r.start.character + 1))
            .collect::<Vec<_>>()
            .join(", ");
        line.push_str(&format!(" @ {sites}"));
    }
    if entry.recursive {
        line.push_str(" (recursive)");
    }
    println!("{line}");
    for child in &entry.children {
        print_tree(child, indent + 1);
    }
}

fn describe(node: &HierarchyNode) -> String {
    let mut out = format!("{} [{}]", node.name, node.kind.label());
    if !node.detail.is_empty() {
        out.push_str(&format!(" : {}", node.detail));
    }
    if node.is_deprecated() {
        out.push_str(" (deprecated)");
    }
    out.push_str(&format!(
        " - {}:{}",
        node.uri,
        node.selection_range.start.line + 1
    ));
    out
}

fn absolute_path(path: &Path) -> anyhow::Result<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .context("cannot determine the current directory")?
            .join(path)
    };
    // Drop `.` components so the URI matches the walked path
    Ok(joined.components().collect())
}
