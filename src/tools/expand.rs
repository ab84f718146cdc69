use crate::error::Result;
use crate::inspector::{Inspector, MemberNode};
use crate::pageobject::types::ArgValue;
use crate::tools::{Tool, ToolContext, ToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Node together with a summary of the element it is bound to
fn node_result(inspector: &Inspector, node: &MemberNode) -> ToolResult {
    let element = node.element.and_then(|id| inspector.element_summary(id));
    ToolResult::success_with(serde_json::json!({
        "node": node,
        "found": element.is_some(),
        "element": element,
    }))
}

/// Parameters for the expand_root tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExpandRootParams {
    /// URI of a page object with a root selector
    pub uri: String,
}

/// Tool loading a page object from the captured document
#[derive(Default)]
pub struct ExpandRootTool;

impl Tool for ExpandRootTool {
    type Params = ExpandRootParams;

    fn name(&self) -> &str {
        "expand_root"
    }

    fn execute_typed(&self, params: ExpandRootParams, context: &mut ToolContext) -> Result<ToolResult> {
        let node = context.inspector.expand_root(&params.uri)?;
        Ok(node_result(context.inspector, &node))
    }
}

/// Parameters for the expand_member tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExpandMemberParams {
    /// Id of the node to expand from
    pub node_id: usize,

    /// Element, method or intrinsic name
    pub member: String,

    /// Argument values, bound by position
    #[serde(default)]
    pub args: Vec<ArgValue>,
}

/// Tool resolving a member relative to an expanded node
#[derive(Default)]
pub struct ExpandMemberTool;

impl Tool for ExpandMemberTool {
    type Params = ExpandMemberParams;

    fn name(&self) -> &str {
        "expand_member"
    }

    fn execute_typed(&self, params: ExpandMemberParams, context: &mut ToolContext) -> Result<ToolResult> {
        let node = context
            .inspector
            .expand_member(params.node_id, &params.member, params.args)?;
        Ok(node_result(context.inspector, &node))
    }
}
