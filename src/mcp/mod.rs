//! MCP (Model Context Protocol) server for page-object inspection
//!
//! This module exposes the inspector tools through rmcp, plus the two
//! operations that need I/O: reloading definitions and capturing a page.

pub mod handler;
pub use handler::InspectorServer;

use crate::browser::BrowserSession;
use crate::error::InspectorError;
use crate::pageobject::database::{DefinitionSource, DirectorySource};
use crate::tools::container::{RankContainerCandidatesParams, SetContainerTypeParams};
use crate::tools::expand::{ExpandMemberParams, ExpandRootParams};
use crate::tools::page_objects::{GetIntrinsicMembersParams, GetMembersParams, ListPageObjectsParams};
use crate::tools::snippet::GenerateSnippetParams;
use crate::tools::utils::normalize_url;
use crate::tools::{ToolContext, ToolResult as InternalToolResult};
use rmcp::{
    ErrorData as McpError,
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Content},
    tool, tool_router,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Reload parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ReloadDefinitionsParams {
    /// Directory of `*.utam.json` files; the configured source is used when absent
    #[serde(default)]
    pub directory: Option<String>,
    /// URI namespace for files loaded from `directory`
    #[serde(default)]
    pub namespace: Option<String>,
}

/// Page capture parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CapturePageParams {
    /// URL or local file to open first; the current page is captured when absent
    #[serde(default)]
    pub url: Option<String>,
}

/// Convert internal ToolResult to MCP CallToolResult
fn convert_result(result: InternalToolResult) -> Result<CallToolResult, McpError> {
    if result.success {
        let text = if let Some(data) = result.data {
            serde_json::to_string_pretty(&data).unwrap_or_else(|_| data.to_string())
        } else {
            "Success".to_string()
        };
        Ok(CallToolResult::success(vec![Content::text(text)]))
    } else {
        let error_msg = result.error.unwrap_or_else(|| "Unknown error".to_string());
        Err(McpError::internal_error(error_msg, None))
    }
}

/// Caller mistakes become invalid-params errors, everything else is internal
fn convert_error(error: InspectorError) -> McpError {
    match error {
        InspectorError::InvalidParams(_)
        | InspectorError::UnknownPageObject(_)
        | InspectorError::UnknownMember { .. }
        | InspectorError::UnknownNode(_)
        | InspectorError::NoDefinitionsLoaded(_)
        | InspectorError::NoDocumentLoaded => McpError::invalid_params(error.to_string(), None),
        other => McpError::internal_error(other.to_string(), None),
    }
}

impl InspectorServer {
    fn run_tool<P: Serialize>(&self, name: &str, params: P) -> Result<CallToolResult, McpError> {
        let params = serde_json::to_value(params).map_err(|e| McpError::invalid_params(e.to_string(), None))?;
        let mut inspector = self.inspector()?;
        let mut context = ToolContext::new(&mut inspector);

        let result = self
            .registry()
            .execute(name, params, &mut context)
            .map_err(convert_error)?;

        convert_result(result)
    }
}

#[tool_router]
impl InspectorServer {
    /// Reload page-object definitions
    #[tool(description = "Reload UTAM page-object definitions from the configured source or a directory")]
    async fn reload_definitions(
        &self,
        params: Parameters<ReloadDefinitionsParams>,
    ) -> Result<CallToolResult, McpError> {
        let loaded = match params.0.directory {
            Some(directory) => {
                let mut source = DirectorySource::new(directory);
                if let Some(namespace) = params.0.namespace {
                    source = source.namespace(namespace);
                }
                source.load_definitions().await
            }
            None => self.source().load_definitions().await,
        };

        // Loading happens without holding the lock; the swap is immediate
        let count = match loaded {
            Ok(definitions) => self.inspector()?.install_definitions(&definitions),
            Err(e) => {
                log::warn!("Definition reload failed: {}", e);
                self.inspector()?.clear_definitions();
                return Err(convert_error(match e {
                    InspectorError::NoDefinitionsLoaded(reason) => InspectorError::NoDefinitionsLoaded(reason),
                    other => InspectorError::NoDefinitionsLoaded(other.to_string()),
                }));
            }
        };

        convert_result(InternalToolResult::success_with(serde_json::json!({ "count": count })))
    }

    /// Capture the page open in the browser
    #[tool(description = "Open a URL (optional) and capture the page DOM, including shadow roots, for element lookups")]
    fn capture_page(
        &self,
        params: Parameters<CapturePageParams>,
    ) -> Result<CallToolResult, McpError> {
        let mut browser = self.browser()?;
        if browser.is_none() {
            let session = BrowserSession::launch(self.launch_options().clone()).map_err(convert_error)?;
            *browser = Some(session);
        }
        let session = browser
            .as_ref()
            .ok_or_else(|| McpError::internal_error("Browser not available", None))?;

        let url = params.0.url.as_deref().map(normalize_url);
        if let Some(url) = &url {
            session.navigate(url).map_err(convert_error)?;
            session.wait_for_navigation().map_err(convert_error)?;
        }

        let dom = session.capture_dom().map_err(convert_error)?;
        let elements = dom.count_elements();
        self.inspector()?.load_document(dom);

        convert_result(InternalToolResult::success_with(serde_json::json!({
            "url": url,
            "elements": elements,
        })))
    }

    /// List known page objects
    #[tool(description = "List the URIs of all loaded page objects and which of them are loadable from the page root")]
    fn list_page_objects(
        &self,
        params: Parameters<ListPageObjectsParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run_tool("list_page_objects", params.0)
    }

    /// Public members of a page object
    #[tool(description = "Get the public elements and methods of a page object, with argument lists and return types")]
    fn get_members(
        &self,
        params: Parameters<GetMembersParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run_tool("get_members", params.0)
    }

    /// Intrinsic operations of an element type
    #[tool(description = "Get the intrinsic operations (click, getText, ...) available for a list of element capabilities")]
    fn get_intrinsic_members(
        &self,
        params: Parameters<GetIntrinsicMembersParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run_tool("get_intrinsic_members", params.0)
    }

    /// Load a root page object
    #[tool(description = "Locate a root page object in the captured page and return its node id")]
    fn expand_root(
        &self,
        params: Parameters<ExpandRootParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run_tool("expand_root", params.0)
    }

    /// Resolve a member of a node
    #[tool(description = "Resolve an element, method or intrinsic of an expanded node against the captured page")]
    fn expand_member(
        &self,
        params: Parameters<ExpandMemberParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run_tool("expand_member", params.0)
    }

    /// Type a container node
    #[tool(description = "Set the page object that fills a container node")]
    fn set_container_type(
        &self,
        params: Parameters<SetContainerTypeParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run_tool("set_container_type", params.0)
    }

    /// Rank container candidates
    #[tool(description = "Rank page objects by how many of their elements are present inside a container node")]
    fn rank_container_candidates(
        &self,
        params: Parameters<RankContainerCandidatesParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run_tool("rank_container_candidates", params.0)
    }

    /// Generate a code snippet
    #[tool(description = "Generate UTAM JavaScript that reproduces the member chain leading to a node")]
    fn generate_snippet(
        &self,
        params: Parameters<GenerateSnippetParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run_tool("generate_snippet", params.0)
    }
}
