//! n8n REST backend: client, wire types, and workflow templates.
//!
//! The gateway core never talks to this module directly; the n8n tool module
//! does, through the [`WorkflowApi`] trait.

pub mod client;
pub mod template;
pub mod types;

pub use client::{N8nClient, WorkflowApi};
pub use template::{scraping_workflow, ScrapingTemplate};
pub use types::{Execution, Workflow, WorkflowDefinition, WorkflowNode};

use std::time::Duration;
use thiserror::Error;

/// Failures talking to the backend service.
#[derive(Error, Debug)]
pub enum BackendError {
    /// Connection or protocol failure before a response arrived.
    #[error("request failed: {0}")]
    Http(#[source] reqwest::Error),

    /// No response within the per-operation budget.
    #[error("timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),

    /// Non-2xx response.
    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body did not match the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl BackendError {
    pub(crate) fn from_reqwest(err: reqwest::Error, budget: Duration) -> Self {
        if err.is_timeout() {
            BackendError::Timeout(budget)
        } else {
            BackendError::Http(err)
        }
    }
}
