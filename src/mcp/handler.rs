use crate::browser::{BrowserSession, LaunchOptions};
use crate::inspector::Inspector;
use crate::pageobject::database::DefinitionSource;
use crate::tools::ToolRegistry;
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::router::tool::ToolRouter,
    model::{ServerCapabilities, ServerInfo},
    tool_handler,
};
use std::sync::{Arc, Mutex, MutexGuard};

/// MCP server exposing page-object inspection tools
#[derive(Clone)]
pub struct InspectorServer {
    inspector: Arc<Mutex<Inspector>>,
    source: Arc<dyn DefinitionSource>,
    registry: Arc<ToolRegistry>,
    browser: Arc<Mutex<Option<BrowserSession>>>,
    launch_options: LaunchOptions,
    pub(crate) tool_router: ToolRouter<Self>,
}

impl InspectorServer {
    /// Create a server loading definitions from `source`; the browser starts on first capture
    pub fn new(source: Arc<dyn DefinitionSource>, launch_options: LaunchOptions) -> Self {
        Self {
            inspector: Arc::new(Mutex::new(Inspector::new())),
            source,
            registry: Arc::new(ToolRegistry::with_defaults()),
            browser: Arc::new(Mutex::new(None)),
            launch_options,
            tool_router: Self::tool_router(),
        }
    }

    /// Create a server and load its definitions right away
    pub async fn with_definitions(source: Arc<dyn DefinitionSource>, launch_options: LaunchOptions) -> crate::Result<Self> {
        let mut inspector = Inspector::new();
        let count = inspector.reload(source.as_ref()).await?;
        log::info!("Loaded {} page objects", count);

        let mut server = Self::new(source, launch_options);
        server.inspector = Arc::new(Mutex::new(inspector));
        Ok(server)
    }

    pub(crate) fn inspector(&self) -> Result<MutexGuard<'_, Inspector>, McpError> {
        self.inspector
            .lock()
            .map_err(|e| McpError::internal_error(format!("Inspector state poisoned: {}", e), None))
    }

    pub(crate) fn browser(&self) -> Result<MutexGuard<'_, Option<BrowserSession>>, McpError> {
        self.browser
            .lock()
            .map_err(|e| McpError::internal_error(format!("Browser state poisoned: {}", e), None))
    }

    pub(crate) fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub(crate) fn source(&self) -> &Arc<dyn DefinitionSource> {
        &self.source
    }

    pub(crate) fn launch_options(&self) -> &LaunchOptions {
        &self.launch_options
    }
}

#[tool_handler]
impl ServerHandler for InspectorServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Inspect UTAM page objects against a live page. Call reload_definitions, then capture_page, \
                 then expand_root and expand_member to locate elements; generate_snippet prints the matching \
                 UTAM JavaScript."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
