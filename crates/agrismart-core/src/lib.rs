//! AgriSmart Core - Farm-management agents for Brazilian agriculture.
//!
//! This crate provides the core functionality for AgriSmart, including:
//! - Capability agents (climate, crop, water, yield) and the farm coordinator
//! - HTTP server exposing the agents and farm records
//! - SQLite document store for farm records
//! - Configuration management
//! - Error handling
//!
//! # Example
//!
//! ```rust,no_run
//! use agrismart_core::{config::Config, server};
//!
//! #[tokio::main]
//! async fn main() -> agrismart_core::error::Result<()> {
//!     let config = Config::load(None)?;
//!     server::run(&config).await
//! }
//! ```

pub mod agents;
pub mod config;
pub mod error;
pub mod prompts;
pub mod server;
pub mod storage;

pub use agents::{
    Agent, AgentIdentity, CapabilityRequest, ClimateMonitor, CropAnalyzer, FarmManager, Operation,
    OperationError, ResponseEnvelope, RoutingDecision, WaterOptimizer, YieldPredictor,
};
pub use config::Config;
pub use error::{CoreError, Result};
pub use prompts::{PromptContext, PromptTemplate};
pub use server::{AppState, build_router};
pub use storage::{Collection, Database, Document, DocumentRepository, StorageError};
