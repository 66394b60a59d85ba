// file: src/agent/tools.rs
// description: agent tool definitions with generated parameter schemas
// reference: https://docs.rs/schemars

use crate::error::Result;
use crate::models::ToolDef;
use schemars::{schema_for, JsonSchema};
use serde::Deserialize;

pub const SEARCH_TOOL: &str = "search_sow_documents";
pub const RISK_TOOL: &str = "check_sow_risks";

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchToolArgs {
    /// Search query text
    pub query: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct RiskCheckArgs {
    /// Statement-of-work content to inspect for risks
    pub content: String,
}

pub fn tool_definitions() -> Result<Vec<ToolDef>> {
    Ok(vec![
        ToolDef::function(
            SEARCH_TOOL,
            "Search statement-of-work documents for passages relevant to a query.",
            serde_json::to_value(schema_for!(SearchToolArgs))?,
        ),
        ToolDef::function(
            RISK_TOOL,
            "Check statement-of-work content for contractual risks. \
             Only identify risks present in the content; do not make up risks. \
             Returns 'No major risks identified' when none are found.",
            serde_json::to_value(schema_for!(RiskCheckArgs))?,
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_definitions_shape() {
        let tools = tool_definitions().unwrap();
        assert_eq!(tools.len(), 2);
        assert_eq!(tools[0].function.name, SEARCH_TOOL);
        assert_eq!(tools[1].function.name, RISK_TOOL);
        assert!(tools.iter().all(|t| t.def_type == "function"));
    }

    #[test]
    fn test_search_tool_schema_requires_query() {
        let tools = tool_definitions().unwrap();
        let params = &tools[0].function.parameters;
        assert_eq!(params["type"], "object");
        assert!(params["properties"].get("query").is_some());
        assert!(params["required"]
            .as_array()
            .unwrap()
            .iter()
            .any(|v| v == "query"));
    }

    #[test]
    fn test_risk_tool_schema_requires_content() {
        let tools = tool_definitions().unwrap();
        let params = &tools[1].function.parameters;
        assert!(params["properties"].get("content").is_some());
        assert!(params["required"]
            .as_array()
            .unwrap()
            .iter()
            .any(|v| v == "content"));
    }

    #[test]
    fn test_search_args_deserialization() {
        let args: SearchToolArgs =
            serde_json::from_str(r#"{"query": "warranty terms"}"#).unwrap();
        assert_eq!(args.query, "warranty terms");
    }

    #[test]
    fn test_malformed_args_rejected() {
        assert!(serde_json::from_str::<SearchToolArgs>(r#"{"q": "oops"}"#).is_err());
        assert!(serde_json::from_str::<RiskCheckArgs>("not json").is_err());
    }
}
