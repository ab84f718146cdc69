//! utam-inspect
//!
//! Command line front end for browsing UTAM page objects and locating their
//! elements in a saved DOM snapshot or a live page.

use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, Parser, Subcommand};
use serde_json::{Value, json};
use std::path::PathBuf;
use utam_inspector::browser::{BrowserSession, LaunchOptions};
use utam_inspector::dom::DomTree;
use utam_inspector::inspector::Inspector;
use utam_inspector::pageobject::{ArgValue, DeclaredType, DirectorySource, intrinsic_members};
use utam_inspector::tools::utils::normalize_url;

#[derive(Parser)]
#[command(name = "utam-inspect")]
#[command(version)]
#[command(about = "Inspect UTAM page objects and locate their elements", long_about = None)]
struct Cli {
    /// Directory containing UTAM page-object definitions
    #[arg(long, short = 'd', value_name = "DIR", global = true, default_value = ".")]
    definitions: PathBuf,

    /// URI namespace prepended to definition paths
    #[arg(long, short = 'n', value_name = "NAME", global = true)]
    namespace: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List page-object URIs
    List {
        /// Only list page objects loadable from the document root
        #[arg(long)]
        roots: bool,
    },
    /// Show the public members of a page object
    Members {
        /// Page-object URI
        uri: String,
    },
    /// Show the intrinsic operations of an element type
    Intrinsics {
        /// Capability names, e.g. clickable editable
        capabilities: Vec<String>,
    },
    /// Follow a member chain from a root page object and print what it finds
    Find {
        #[command(flatten)]
        page: PageArgs,

        /// Root page-object URI
        uri: String,

        /// Members to expand in order, written `name` or `name(arg, ...)` with JSON arguments
        members: Vec<String>,
    },
    /// Rank the page objects that could fill a container member
    Rank {
        #[command(flatten)]
        page: PageArgs,

        /// Root page-object URI
        uri: String,

        /// Member chain ending at the container element
        members: Vec<String>,

        /// Maximum number of candidates to print
        #[arg(long, default_value = "10")]
        limit: usize,
    },
}

#[derive(Args)]
struct PageArgs {
    /// DOM snapshot produced by the capture script
    #[arg(long, value_name = "FILE", conflicts_with = "url")]
    snapshot: Option<PathBuf>,

    /// Page to open and capture
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// Launch browser in headed mode (default: headless)
    #[arg(long, short = 'H')]
    headed: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut source = DirectorySource::new(&cli.definitions);
    if let Some(namespace) = cli.namespace.clone() {
        source = source.namespace(namespace);
    }

    if let Command::Intrinsics { capabilities } = &cli.command {
        let declared = DeclaredType::Capabilities(capabilities.clone());
        return print(&json!(intrinsic_members(Some(&declared))));
    }

    let mut inspector = Inspector::new();
    let count = inspector
        .reload(&source)
        .await
        .with_context(|| format!("loading definitions from {}", cli.definitions.display()))?;
    log::info!("Loaded {} page objects", count);

    match cli.command {
        Command::List { roots } => {
            let snapshot = inspector.database().snapshot()?;
            let uris: Vec<&str> = if roots {
                snapshot.root_uris().iter().map(String::as_str).collect()
            } else {
                snapshot.uris().collect()
            };
            for uri in uris {
                println!("{}", uri);
            }
            Ok(())
        }
        Command::Members { uri } => {
            let members = inspector.database().public_members(&uri)?;
            print(&json!(members))
        }
        // answered before loading definitions
        Command::Intrinsics { .. } => Ok(()),
        Command::Find { page, uri, members } => {
            inspector.load_document(capture(&page)?);
            let node = follow(&mut inspector, &uri, &members)?;

            let mut output = json!({
                "node": inspector.node(node)?,
                "snippet": inspector.snippet(node)?,
            });
            if let Some(element) = inspector.node(node)?.element {
                output["element"] = json!(inspector.element_summary(element));
            }
            print(&output)
        }
        Command::Rank {
            page,
            uri,
            members,
            limit,
        } => {
            inspector.load_document(capture(&page)?);
            let node = follow(&mut inspector, &uri, &members)?;

            let candidates: Vec<Value> = inspector
                .rank_container_candidates(node)?
                .into_iter()
                .take(limit)
                .map(|(uri, score)| json!({ "uri": uri, "score": score }))
                .collect();
            print(&json!(candidates))
        }
    }
}

/// Load the document from a snapshot file or a live page
fn capture(page: &PageArgs) -> Result<DomTree> {
    if let Some(path) = &page.snapshot {
        let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        return Ok(DomTree::from_json(&text)?);
    }

    let url = page.url.as_deref().ok_or_else(|| anyhow!("either --snapshot or --url is required"))?;
    let session = BrowserSession::launch(LaunchOptions::new().headless(!page.headed))?;
    session.navigate(&normalize_url(url))?;
    session.wait_for_navigation()?;
    let dom = session.capture_dom()?;
    log::debug!("Captured {} elements", dom.count_elements());
    Ok(dom)
}

/// Expand a root page object and then each member in turn, returning the last node id
fn follow(inspector: &mut Inspector, uri: &str, members: &[String]) -> Result<usize> {
    let mut node = inspector.expand_root(uri)?.id;
    for step in members {
        let (name, args) = parse_step(step)?;
        let expanded = inspector.expand_member(node, name, args)?;
        if expanded.element.is_none() {
            bail!("'{}' was not found in the page", step);
        }
        node = expanded.id;
    }
    Ok(node)
}

/// Split `name(1, "x")` into the member name and its positional arguments
fn parse_step(step: &str) -> Result<(&str, Vec<ArgValue>)> {
    let Some((name, rest)) = step.split_once('(') else {
        return Ok((step, Vec::new()));
    };
    let inner = rest
        .strip_suffix(')')
        .ok_or_else(|| anyhow!("missing ')' in '{}'", step))?;
    let values: Vec<Value> =
        serde_json::from_str(&format!("[{}]", inner)).with_context(|| format!("arguments of '{}'", step))?;

    let args = values
        .into_iter()
        .enumerate()
        .map(|(index, value)| ArgValue::new(format!("arg{}", index), value))
        .collect();
    Ok((name, args))
}

fn print(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
