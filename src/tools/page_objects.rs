use crate::error::Result;
use crate::pageobject::database::intrinsic_members;
use crate::pageobject::definition::DeclaredType;
use crate::tools::{Tool, ToolContext, ToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the list_page_objects tool
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ListPageObjectsParams {
    /// Only list page objects loadable straight from the document
    #[serde(default)]
    pub roots_only: bool,
}

/// Tool listing every known page-object URI
#[derive(Default)]
pub struct ListPageObjectsTool;

impl Tool for ListPageObjectsTool {
    type Params = ListPageObjectsParams;

    fn name(&self) -> &str {
        "list_page_objects"
    }

    fn execute_typed(&self, params: ListPageObjectsParams, context: &mut ToolContext) -> Result<ToolResult> {
        let snapshot = context.inspector.database().snapshot()?;
        let uris: Vec<&str> = if params.roots_only {
            snapshot.root_uris().iter().map(String::as_str).collect()
        } else {
            snapshot.uris().collect()
        };

        Ok(ToolResult::success_with(serde_json::json!({
            "count": uris.len(),
            "uris": uris,
            "rootUris": snapshot.root_uris(),
        })))
    }
}

/// Parameters for the get_members tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GetMembersParams {
    /// Page-object URI
    pub uri: String,
}

/// Tool returning the public elements and methods of a page object
#[derive(Default)]
pub struct GetMembersTool;

impl Tool for GetMembersTool {
    type Params = GetMembersParams;

    fn name(&self) -> &str {
        "get_members"
    }

    fn execute_typed(&self, params: GetMembersParams, context: &mut ToolContext) -> Result<ToolResult> {
        let page_object = context.inspector.database().get_by_uri(&params.uri)?;
        let members = page_object.public_members();

        Ok(ToolResult::success_with(serde_json::json!({
            "uri": page_object.uri,
            "description": page_object.description,
            "author": page_object.author,
            "members": members,
        })))
    }
}

/// Parameters for the get_intrinsic_members tool
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct GetIntrinsicMembersParams {
    /// Capability names declared as the element type, e.g. `["clickable"]`
    #[serde(default)]
    pub capabilities: Vec<String>,
}

/// Tool returning the intrinsic operations of an element type
#[derive(Default)]
pub struct GetIntrinsicMembersTool;

impl Tool for GetIntrinsicMembersTool {
    type Params = GetIntrinsicMembersParams;

    fn name(&self) -> &str {
        "get_intrinsic_members"
    }

    fn execute_typed(&self, params: GetIntrinsicMembersParams, _context: &mut ToolContext) -> Result<ToolResult> {
        let declared = DeclaredType::Capabilities(params.capabilities);
        let members = intrinsic_members(Some(&declared));

        Ok(ToolResult::success_with(serde_json::json!({
            "count": members.len(),
            "members": members,
        })))
    }
}
