//! Request/response surface over the inspector
//!
//! Every query the UI layer issues is a [`Tool`] with typed parameters. Tools
//! are registered by name in a [`ToolRegistry`] and dispatched with JSON
//! parameters against a [`ToolContext`] holding the inspection session.

pub mod container;
pub mod expand;
pub mod page_objects;
pub mod snippet;
pub mod utils;

pub use container::{RankContainerCandidatesTool, SetContainerTypeTool};
pub use expand::{ExpandMemberTool, ExpandRootTool};
pub use page_objects::{GetIntrinsicMembersTool, GetMembersTool, ListPageObjectsTool};
pub use snippet::GenerateSnippetTool;

use crate::error::{InspectorError, Result};
use crate::inspector::Inspector;
use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// State a tool operates on
pub struct ToolContext<'a> {
    pub inspector: &'a mut Inspector,
}

impl<'a> ToolContext<'a> {
    pub fn new(inspector: &'a mut Inspector) -> Self {
        Self { inspector }
    }
}

/// Outcome of a tool call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolResult {
    pub fn success() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
        }
    }

    pub fn success_with(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

/// A tool with typed parameters
pub trait Tool: Send + Sync {
    type Params: DeserializeOwned + JsonSchema;

    fn name(&self) -> &str;

    fn execute_typed(&self, params: Self::Params, context: &mut ToolContext) -> Result<ToolResult>;

    /// JSON schema of the parameters
    fn parameters_schema(&self) -> Value {
        serde_json::to_value(schemars::schema_for!(Self::Params)).unwrap_or_default()
    }
}

/// Object-safe form of [`Tool`], taking JSON parameters
pub trait DynTool: Send + Sync {
    fn name(&self) -> &str;

    fn parameters_schema(&self) -> Value;

    fn execute(&self, params: Value, context: &mut ToolContext) -> Result<ToolResult>;
}

impl<T: Tool> DynTool for T {
    fn name(&self) -> &str {
        Tool::name(self)
    }

    fn parameters_schema(&self) -> Value {
        Tool::parameters_schema(self)
    }

    fn execute(&self, params: Value, context: &mut ToolContext) -> Result<ToolResult> {
        let typed = serde_json::from_value(params)
            .map_err(|e| InspectorError::InvalidParams(format!("{}: {}", Tool::name(self), e)))?;
        self.execute_typed(typed, context)
    }
}

/// Tools by name, in registration order
#[derive(Default)]
pub struct ToolRegistry {
    tools: IndexMap<String, Box<dyn DynTool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every inspector tool
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(ListPageObjectsTool);
        registry.register(GetMembersTool);
        registry.register(GetIntrinsicMembersTool);
        registry.register(ExpandRootTool);
        registry.register(ExpandMemberTool);
        registry.register(SetContainerTypeTool);
        registry.register(RankContainerCandidatesTool);
        registry.register(GenerateSnippetTool);
        registry
    }

    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        self.tools.insert(Tool::name(&tool).to_string(), Box::new(tool));
    }

    pub fn get(&self, name: &str) -> Option<&dyn DynTool> {
        self.tools.get(name).map(|tool| tool.as_ref())
    }

    pub fn has(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Execute a tool by name
    pub fn execute(&self, name: &str, params: Value, context: &mut ToolContext) -> Result<ToolResult> {
        let tool = self.get(name).ok_or_else(|| InspectorError::ToolExecutionFailed {
            tool: name.to_string(),
            reason: "unknown tool".to_string(),
        })?;
        log::debug!("Executing tool {}", name);
        tool.execute(params, context)
    }
}
