//! # utam-inspector
//!
//! Resolve declarative UTAM page-object definitions into a typed member model and
//! locate the elements they describe in a live page.
//!
//! ## Features
//!
//! - **Definition Resolver**: turns `*.utam.json` definitions into elements and methods with
//!   computed argument lists, return types and element chains
//! - **Element Walker**: replays selectors, shadow roots and filters against a captured DOM
//! - **Inspection Session**: expand page objects member by member and generate matching UTAM code
//! - **MCP Server**: exposes the inspection tools to AI agents and other MCP clients
//!
//! ## MCP Server
//!
//! ```bash
//! # Serve definitions from ./pageObjects over stdio
//! cargo run --bin mcp-server --features mcp-server -- --definitions ./pageObjects
//!
//! # Watch the browser while capturing
//! cargo run --bin mcp-server --features mcp-server -- --definitions ./pageObjects --headed
//! ```
//!
//! ## Library Usage
//!
//! ### Resolving definitions
//!
//! ```rust
//! use utam_inspector::pageobject::{InMemorySource, PageObjectDatabase};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> utam_inspector::Result<()> {
//! let source = InMemorySource::new().with_definition(
//!     "shop/list",
//!     r#"{"root": true, "selector": {"css": "ul"},
//!         "elements": [{"name": "item", "public": true, "selector": {"css": "li:nth-child(%d)", "args": [{"name": "i", "type": "number"}]}}]}"#,
//! );
//!
//! let mut database = PageObjectDatabase::new();
//! database.reload(&source).await?;
//!
//! for member in database.public_members("shop/list")? {
//!     println!("{} ({} args)", member.display_name(), member.effective_args().len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### Locating elements in a page
//!
//! ```rust,no_run
//! use utam_inspector::{BrowserSession, Inspector, LaunchOptions};
//! use utam_inspector::pageobject::{ArgValue, DirectorySource};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> utam_inspector::Result<()> {
//! let mut inspector = Inspector::new();
//! inspector.reload(&DirectorySource::new("./pageObjects")).await?;
//!
//! let session = BrowserSession::launch(LaunchOptions::default())?;
//! session.navigate("https://example.com")?;
//! inspector.load_document(session.capture_dom()?);
//!
//! let root = inspector.expand_root("shop/list")?;
//! let item = inspector.expand_member(root.id, "item", vec![ArgValue::new("i", 2)])?;
//! println!("{}", inspector.snippet(item.id)?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! - [`pageobject`]: definition model, intrinsic catalog, resolver and database
//! - [`finder`]: element walker and container candidate scoring
//! - [`inspector`]: inspection session, member nodes and snippets
//! - [`browser`]: browser session management and configuration
//! - [`dom`]: DOM snapshots and the CSS selector engine
//! - [`tools`]: typed inspection tools
//! - [`error`]: Error types and result aliases
//! - [`mcp`]: Model Context Protocol server (requires `mcp-handler` feature)

pub mod browser;
pub mod dom;
pub mod error;
pub mod finder;
pub mod inspector;
pub mod pageobject;
pub mod tools;

#[cfg(feature = "mcp-handler")]
pub mod mcp;

pub use browser::{BrowserSession, ConnectionOptions, LaunchOptions};
pub use dom::{DomTree, ElementNode, NodeId};
pub use error::{InspectorError, Result};
pub use finder::ElementFinder;
pub use inspector::{Inspector, MemberNode, MemberNodeMap};
pub use pageobject::{DefinitionSource, Member, PageObjectDatabase, ParsedPageObject, Resolver};
pub use tools::{Tool, ToolContext, ToolRegistry, ToolResult};

#[cfg(feature = "mcp-handler")]
pub use mcp::InspectorServer;
#[cfg(feature = "mcp-handler")]
pub use rmcp::ServiceExt;
