use crate::error::Result;
use crate::tools::{Tool, ToolContext, ToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the set_container_type tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SetContainerTypeParams {
    /// Id of a container node
    pub node_id: usize,

    /// Page object filling the container
    pub uri: String,
}

/// Tool choosing the content page object of a container
#[derive(Default)]
pub struct SetContainerTypeTool;

impl Tool for SetContainerTypeTool {
    type Params = SetContainerTypeParams;

    fn name(&self) -> &str {
        "set_container_type"
    }

    fn execute_typed(&self, params: SetContainerTypeParams, context: &mut ToolContext) -> Result<ToolResult> {
        let node = context.inspector.set_container_type(params.node_id, &params.uri)?;
        Ok(ToolResult::success_with(serde_json::json!({ "node": node })))
    }
}

/// Parameters for the rank_container_candidates tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RankContainerCandidatesParams {
    /// Id of a container node bound to an element
    pub node_id: usize,

    /// Maximum number of candidates to return
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Tool scoring which page objects could fill a container
#[derive(Default)]
pub struct RankContainerCandidatesTool;

impl Tool for RankContainerCandidatesTool {
    type Params = RankContainerCandidatesParams;

    fn name(&self) -> &str {
        "rank_container_candidates"
    }

    fn execute_typed(&self, params: RankContainerCandidatesParams, context: &mut ToolContext) -> Result<ToolResult> {
        let ranked = context.inspector.rank_container_candidates(params.node_id)?;
        let candidates: Vec<serde_json::Value> = ranked
            .into_iter()
            .take(params.limit.unwrap_or(usize::MAX))
            .map(|(uri, score)| serde_json::json!({ "uri": uri, "score": score }))
            .collect();

        Ok(ToolResult::success_with(serde_json::json!({
            "count": candidates.len(),
            "candidates": candidates,
        })))
    }
}
