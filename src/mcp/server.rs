//! DFC MCP Server Implementation
//!
//! Implements the MCP server with all calculator tools.

use std::path::PathBuf;
use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::db::Database;
use crate::portions::PortionTables;
use crate::store::SqliteValueStore;
use crate::tools::calculator;
use crate::tools::status::StatusTracker;

/// DFC MCP Service
#[derive(Clone)]
pub struct DfcService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    store: SqliteValueStore,
    tables: Arc<PortionTables>,
    tables_source: String,
    tool_router: ToolRouter<DfcService>,
}

impl DfcService {
    pub fn new(
        database_path: PathBuf,
        database: Database,
        tables: PortionTables,
        tables_source: String,
    ) -> Self {
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(
                database_path,
                tables_source.clone(),
            ))),
            store: SqliteValueStore::new(database),
            tables: Arc::new(tables),
            tables_source,
            tool_router: Self::tool_router(),
        }
    }
}

// ============================================================================
// Calculator Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct EstimatePortionsParams {
    /// Body weight in pounds
    pub weight_lbs: f64,
    /// Age in weeks
    pub age_weeks: f64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateInputsParams {
    /// Weight in pounds, exactly as typed (omit to keep the saved value)
    pub weight: Option<String>,
    /// Age in weeks, exactly as typed (omit to keep the saved value)
    pub age_weeks: Option<String>,
}

#[derive(Debug, Serialize)]
struct PortionTablesResponse<'a> {
    source: &'a str,
    max_raw_weight_lbs: f64,
    kibble_weight_range_lbs: Option<(f64, f64)>,
    tables: &'a PortionTables,
}

fn to_json<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl DfcService {
    // --- Status ---

    #[tool(description = "Get the current status of the DFC service including build info, database status, table source, and process information")]
    async fn dfc_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        to_json(&tracker.get_status())
    }

    #[tool(description = "Get instructions for using the dog food calculator. Call this when starting a feeding session or when unsure how to read the results.")]
    fn feeding_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::FEEDING_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(FEEDING_INSTRUCTIONS)]))
    }

    // --- Calculator ---

    #[tool(description = "Estimate daily raw food and kibble grams for a dog from weight (lbs) and age (weeks). Does not change saved inputs. Returns null unless both values are positive numbers. Weights outside the tables give 0 g.")]
    fn estimate_portions(&self, Parameters(p): Parameters<EstimatePortionsParams>) -> Result<CallToolResult, McpError> {
        let report = calculator::estimate_portions(&self.tables, p.weight_lbs, p.age_weeks);
        to_json(&report)
    }

    #[tool(description = "Update the saved weight and/or age (text as typed) and return the recalculated portions. result is null when either input is not a positive number.")]
    fn update_inputs(&self, Parameters(p): Parameters<UpdateInputsParams>) -> Result<CallToolResult, McpError> {
        let state = calculator::update_inputs(
            &self.store,
            &self.tables,
            p.weight.as_deref(),
            p.age_weeks.as_deref(),
        )
        .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&state)
    }

    #[tool(description = "Get the last saved weight and age (defaults 10 lbs, 9 weeks) with their calculated portions")]
    fn get_saved_inputs(&self) -> Result<CallToolResult, McpError> {
        let state = calculator::get_saved_inputs(&self.store, &self.tables);
        to_json(&state)
    }

    #[tool(description = "Get the raw food and kibble reference tables currently in use")]
    fn get_portion_tables(&self) -> Result<CallToolResult, McpError> {
        to_json(&PortionTablesResponse {
            source: &self.tables_source,
            max_raw_weight_lbs: self.tables.max_raw_weight(),
            kibble_weight_range_lbs: self.tables.kibble_weight_range(),
            tables: self.tables.as_ref(),
        })
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for DfcService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "dfc".into(),
                version: crate::tools::status::VERSION.into(),
                title: Some("Dog Food Calculator".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Dog Food Calculator (DFC) - Daily raw food and kibble portions from weight (lbs) and age (weeks). \
                 Call feeding_instructions first. \
                 Calculator: estimate_portions (one-off), update_inputs/get_saved_inputs (saved form values). \
                 Reference: get_portion_tables. Status: dfc_status."
                    .into(),
            ),
        }
    }
}
