use crate::error::Result;
use crate::tools::{Tool, ToolContext, ToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the generate_snippet tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GenerateSnippetParams {
    /// Id of the last node of the chain
    pub node_id: usize,
}

/// Tool producing JavaScript that reproduces a member chain
#[derive(Default)]
pub struct GenerateSnippetTool;

impl Tool for GenerateSnippetTool {
    type Params = GenerateSnippetParams;

    fn name(&self) -> &str {
        "generate_snippet"
    }

    fn execute_typed(&self, params: GenerateSnippetParams, context: &mut ToolContext) -> Result<ToolResult> {
        let snippet = context.inspector.snippet(params.node_id)?;
        Ok(ToolResult::success_with(serde_json::json!({
            "language": "javascript",
            "snippet": snippet,
        })))
    }
}
