//! Bocha Search MCP Library
//!
//! Exposes the Bocha AI web search API as a single MCP `search` tool.
//!
//! # Usage as Library
//!
//! ```rust,ignore
//! use bocha_search_mcp::{BochaSearchMcpServer, Config};
//!
//! let config = Config::load(None)?;
//! let server = BochaSearchMcpServer::new(&config)?;
//! // Serve via stdio or embed with an in-memory transport
//! ```
//!
//! # Configuration
//! Set `BOCHA_API_KEY` (required) and optionally `BOCHA_API_BASE_URL`,
//! `HTTP_TIMEOUT`, `BOCHA_RATE_LIMIT`, `BOCHA_RATE_BURST`, or point
//! `CONFIG_FILE` at a TOML file under the working directory.

pub mod config;
pub mod sanitize;
pub mod search;
pub mod server;
pub mod telemetry;
pub mod tool;

// Re-export main server type
pub use server::BochaSearchMcpServer;

pub use config::Config;
pub use search::{BochaClient, ClientConfig, SearchError, SearchRequest, SearchResponse, SearchService};
pub use tool::{SearchParams, SearchTool};
