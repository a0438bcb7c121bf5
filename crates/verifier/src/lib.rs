#![doc = include_str!("../README.md")]
//!
//! # Module Structure
//!
//! - [`error`]: Domain error types (`VerifierError`)
//! - [`config`]: Verifier configuration (`VerifierConfig`, builder)
//! - [`client`]: Manager API abstraction (`ManagerClient` trait, `HttpManagerClient`)
//! - [`render`]: Declarative configuration rendering (`ConfigDocument`)
//! - [`verify`]: Lifecycle checks (`LifecycleVerifier`)
//! - [`scenario`]: Scenario runner (`Scenario`, `ScenarioRunner`)
//!
//! # Architecture
//!
//! ```text
//! Scenario (RuleSpec create/update)
//!     |
//! ScenarioRunner ----render----> ConfigDocument (logged)
//!     |
//!     +--apply/update/delete--> ManagerClient (trait)
//!     |                              |
//! LifecycleVerifier --read-----> HttpManagerClient / mock
//!     |
//! ScenarioReport
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod render;
pub mod scenario;
pub mod verify;

// --- Public API Re-exports ---

// Verifier (lifecycle checks)
pub use verify::LifecycleVerifier;

// Scenario
pub use scenario::{Scenario, ScenarioRunner, ScenarioRunnerBuilder};

// Configuration
pub use config::{VerifierConfig, VerifierConfigBuilder};

// Error
pub use error::VerifierError;

// Manager API
pub use client::{HttpManagerClient, ManagerClient};

// Rendering
pub use render::{AttrValue, Block, ConfigDocument, rule_document};
