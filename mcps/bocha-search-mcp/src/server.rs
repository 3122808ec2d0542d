//! MCP Server implementation for Bocha web search
//!
//! Exposes a single `search` tool. All argument checking and rendering lives
//! in [`SearchTool`]; this module only wires it into rmcp.

use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Implementation, ServerCapabilities, ServerInfo},
    service::RequestContext,
    tool, tool_handler, tool_router, ErrorData as McpError, RoleServer,
};
use std::sync::Arc;

use crate::config::Config;
use crate::search::{BochaClient, BochaResult, SearchService};
use crate::tool::{SearchParams, SearchTool};

/// The main Bocha Search MCP Server
#[derive(Clone)]
pub struct BochaSearchMcpServer {
    tool: SearchTool,
    server_name: String,
    server_version: String,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl BochaSearchMcpServer {
    /// Build a server backed by the Bocha HTTP client
    pub fn new(config: &Config) -> BochaResult<Self> {
        let client = BochaClient::new(config.client_config())?;
        tracing::info!("Using Bocha search API at {}", config.api_base_url);
        Ok(Self::with_service(Arc::new(client), config))
    }

    /// Build a server around any search service
    pub fn with_service(service: Arc<dyn SearchService>, config: &Config) -> Self {
        Self {
            tool: SearchTool::new(service),
            server_name: config.server_name.clone(),
            server_version: config.server_version.clone(),
            tool_router: Self::tool_router(),
        }
    }

    #[tool(description = "Get the state of the world by searching the web")]
    async fn search(
        &self,
        Parameters(params): Parameters<SearchParams>,
        ctx: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        Ok(self.tool.invoke(ctx.ct.clone(), params).await)
    }
}

#[tool_handler]
impl rmcp::ServerHandler for BochaSearchMcpServer {
    fn get_info(&self) -> ServerInfo {
        let mut server_info = Implementation::from_build_env();
        server_info.name = self.server_name.clone();
        server_info.version = self.server_version.clone();

        ServerInfo {
            instructions: Some(
                "Bocha Search MCP Server - provides a `search` tool backed by the Bocha AI \
                 web search API. Supports freshness filtering (noLimit, day, week, month, \
                 oneYear), 1-50 results and optional generated summaries."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info,
            ..Default::default()
        }
    }
}
