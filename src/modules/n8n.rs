//! n8n tool module: workflow CRUD, execution and execution history.

use crate::backend::{scraping_workflow, BackendError, Execution, ScrapingTemplate, Workflow, WorkflowApi};
use crate::tools::{ActionDescriptor, HealthStatus, ModuleError, ToolModule, ToolResult};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt::Write as _;
use std::sync::Arc;

/// Default page size for `list_executions`.
pub const DEFAULT_EXECUTION_LIMIT: u32 = 20;
/// Largest page the n8n API accepts.
pub const MAX_EXECUTION_LIMIT: u32 = 250;

// =============================================================================
// Arguments
// =============================================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct NoArgs {}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct WorkflowIdArgs {
    /// Workflow ID
    #[schemars(length(min = 1))]
    pub id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ExecuteArgs {
    /// Workflow ID
    #[schemars(length(min = 1))]
    pub id: String,
    /// Input data passed to the workflow
    #[serde(default)]
    pub data: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateScrapingArgs {
    /// Workflow name (defaults to "Scraping: <query> in <location>")
    #[serde(default)]
    pub name: Option<String>,
    /// Location to search, e.g. "Lyon, France"
    #[schemars(length(min = 1))]
    pub location: String,
    /// Google Sheets spreadsheet ID receiving the results
    #[schemars(length(min = 1))]
    pub destination_id: String,
    /// What to search for (defaults to "businesses")
    #[serde(default)]
    pub query: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListExecutionsArgs {
    /// Only executions of this workflow
    #[serde(default)]
    pub workflow_id: Option<String>,
    /// Maximum number of executions (1-250, default 20)
    #[serde(default)]
    #[schemars(range(min = 1, max = 250))]
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ExecutionIdArgs {
    /// Execution ID
    #[schemars(length(min = 1))]
    pub id: String,
}

// =============================================================================
// Actions
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    TestConnection,
    ListWorkflows,
    GetWorkflow,
    ExecuteWorkflow,
    CreateWorkflow,
    ActivateWorkflow,
    DeactivateWorkflow,
    DeleteWorkflow,
    ListExecutions,
    GetExecution,
}

impl Action {
    const ALL: [Action; 10] = [
        Action::TestConnection,
        Action::ListWorkflows,
        Action::GetWorkflow,
        Action::ExecuteWorkflow,
        Action::CreateWorkflow,
        Action::ActivateWorkflow,
        Action::DeactivateWorkflow,
        Action::DeleteWorkflow,
        Action::ListExecutions,
        Action::GetExecution,
    ];

    fn name(self) -> &'static str {
        match self {
            Action::TestConnection => "test_connection",
            Action::ListWorkflows => "list_workflows",
            Action::GetWorkflow => "get_workflow",
            Action::ExecuteWorkflow => "execute_workflow",
            Action::CreateWorkflow => "create_workflow",
            Action::ActivateWorkflow => "activate_workflow",
            Action::DeactivateWorkflow => "deactivate_workflow",
            Action::DeleteWorkflow => "delete_workflow",
            Action::ListExecutions => "list_executions",
            Action::GetExecution => "get_execution",
        }
    }

    fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.name() == name)
    }

    fn descriptor(self) -> ActionDescriptor {
        let name = self.name();
        match self {
            Action::TestConnection => {
                ActionDescriptor::for_args::<NoArgs>(name, "Test the connection to n8n")
            }
            Action::ListWorkflows => {
                ActionDescriptor::for_args::<NoArgs>(name, "List all n8n workflows")
            }
            Action::GetWorkflow => {
                ActionDescriptor::for_args::<WorkflowIdArgs>(name, "Get the details of a workflow")
            }
            Action::ExecuteWorkflow => {
                ActionDescriptor::for_args::<ExecuteArgs>(name, "Execute a workflow")
            }
            Action::CreateWorkflow => ActionDescriptor::for_args::<CreateScrapingArgs>(
                name,
                "Create a scraping workflow that collects listings for a location into a Google Sheet",
            ),
            Action::ActivateWorkflow => {
                ActionDescriptor::for_args::<WorkflowIdArgs>(name, "Activate a workflow")
            }
            Action::DeactivateWorkflow => {
                ActionDescriptor::for_args::<WorkflowIdArgs>(name, "Deactivate a workflow")
            }
            Action::DeleteWorkflow => {
                ActionDescriptor::for_args::<WorkflowIdArgs>(name, "Delete a workflow")
            }
            Action::ListExecutions => ActionDescriptor::for_args::<ListExecutionsArgs>(
                name,
                "List recent executions, optionally for one workflow",
            ),
            Action::GetExecution => {
                ActionDescriptor::for_args::<ExecutionIdArgs>(name, "Get the details of an execution")
            }
        }
    }
}

// =============================================================================
// Module
// =============================================================================

/// Tool module backed by an n8n instance.
pub struct N8nModule {
    api: Arc<dyn WorkflowApi>,
    base_url: String,
}

impl std::fmt::Debug for N8nModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("N8nModule")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl N8nModule {
    pub fn new(api: Arc<dyn WorkflowApi>, base_url: impl Into<String>) -> Self {
        Self {
            api,
            base_url: base_url.into(),
        }
    }

    async fn test_connection(&self) -> ToolResult {
        match self.api.list_workflows().await {
            Ok(_) => ToolResult::success(format!("Connected to n8n at {}", self.base_url)),
            Err(e) => ToolResult::failure(format!("Connection failed: {}", e)),
        }
    }

    async fn list_workflows(&self) -> Result<ToolResult, ModuleError> {
        let workflows = self
            .api
            .list_workflows()
            .await
            .map_err(|e| ModuleError::backend("unable to list workflows", e))?;
        Ok(ToolResult::success(render_workflow_list(&workflows)))
    }

    async fn get_workflow(&self, args: WorkflowIdArgs) -> Result<ToolResult, ModuleError> {
        let workflow = self
            .api
            .get_workflow(&args.id)
            .await
            .map_err(|e| ModuleError::backend("unable to fetch workflow", e))?;
        Ok(ToolResult::success(render_workflow(&workflow)))
    }

    async fn execute_workflow(&self, args: ExecuteArgs) -> Result<ToolResult, ModuleError> {
        let data = Value::Object(args.data.unwrap_or_default());
        let execution = self
            .api
            .execute_workflow(&args.id, data)
            .await
            .map_err(|e| ModuleError::backend("unable to execute workflow", e))?;
        Ok(ToolResult::success(format!(
            "Workflow executed\nExecution ID: {}\nStatus: {}",
            execution.id.as_deref().unwrap_or("N/A"),
            execution.status_label()
        )))
    }

    async fn create_workflow(&self, args: CreateScrapingArgs) -> Result<ToolResult, ModuleError> {
        let definition = scraping_workflow(&ScrapingTemplate {
            name: args.name,
            location: args.location,
            destination_id: args.destination_id,
            query: args.query,
        });
        let workflow = self
            .api
            .create_workflow(&definition)
            .await
            .map_err(|e| ModuleError::backend("unable to create workflow", e))?;
        Ok(ToolResult::success(format!(
            "Workflow created\nName: {}\nID: {}\nNodes: {}\nActive: {}",
            workflow.name,
            workflow.id,
            definition.nodes.len(),
            yes_no(workflow.active)
        )))
    }

    async fn set_active(&self, args: WorkflowIdArgs, active: bool) -> Result<ToolResult, ModuleError> {
        let context = if active {
            "unable to activate workflow"
        } else {
            "unable to deactivate workflow"
        };
        let workflow = self
            .api
            .set_active(&args.id, active)
            .await
            .map_err(|e| ModuleError::backend(context, e))?;
        Ok(ToolResult::success(format!(
            "Workflow {} (ID: {}) is now {}",
            workflow.name,
            workflow.id,
            if workflow.active { "active" } else { "inactive" }
        )))
    }

    async fn delete_workflow(&self, args: WorkflowIdArgs) -> Result<ToolResult, ModuleError> {
        let workflow = self
            .api
            .delete_workflow(&args.id)
            .await
            .map_err(|e| ModuleError::backend("unable to delete workflow", e))?;
        Ok(ToolResult::success(format!(
            "Workflow {} (ID: {}) deleted",
            workflow.name, workflow.id
        )))
    }

    async fn list_executions(&self, args: ListExecutionsArgs) -> Result<ToolResult, ModuleError> {
        let limit = args
            .limit
            .unwrap_or(DEFAULT_EXECUTION_LIMIT)
            .clamp(1, MAX_EXECUTION_LIMIT);
        let executions = self
            .api
            .list_executions(args.workflow_id, limit)
            .await
            .map_err(|e| ModuleError::backend("unable to list executions", e))?;
        Ok(ToolResult::success(render_execution_list(&executions)))
    }

    async fn get_execution(&self, args: ExecutionIdArgs) -> Result<ToolResult, ModuleError> {
        let execution = self
            .api
            .get_execution(&args.id)
            .await
            .map_err(|e| ModuleError::backend("unable to fetch execution", e))?;
        Ok(ToolResult::success(render_execution(&execution)))
    }
}

#[async_trait]
impl ToolModule for N8nModule {
    fn list_descriptors(&self) -> Result<Vec<ActionDescriptor>, ModuleError> {
        Ok(Action::ALL.into_iter().map(Action::descriptor).collect())
    }

    async fn invoke(&self, action: &str, arguments: Value) -> Result<ToolResult, ModuleError> {
        let action = Action::parse(action).ok_or_else(|| ModuleError::UnknownAction(action.to_string()))?;

        match action {
            Action::TestConnection => Ok(self.test_connection().await),
            Action::ListWorkflows => self.list_workflows().await,
            Action::GetWorkflow => self.get_workflow(parse_args(arguments)?).await,
            Action::ExecuteWorkflow => self.execute_workflow(parse_args(arguments)?).await,
            Action::CreateWorkflow => self.create_workflow(parse_args(arguments)?).await,
            Action::ActivateWorkflow => self.set_active(parse_args(arguments)?, true).await,
            Action::DeactivateWorkflow => self.set_active(parse_args(arguments)?, false).await,
            Action::DeleteWorkflow => self.delete_workflow(parse_args(arguments)?).await,
            Action::ListExecutions => self.list_executions(parse_args(arguments)?).await,
            Action::GetExecution => self.get_execution(parse_args(arguments)?).await,
        }
    }

    async fn probe_health(&self) -> Result<HealthStatus, ModuleError> {
        Ok(match self.api.probe().await {
            Ok(()) => HealthStatus::healthy(self.base_url.clone()),
            Err(e) => HealthStatus::unhealthy(probe_detail(&e)),
        })
    }
}

fn parse_args<T: DeserializeOwned>(arguments: Value) -> Result<T, ModuleError> {
    serde_json::from_value(arguments).map_err(|e| ModuleError::InvalidArguments(e.to_string()))
}

fn probe_detail(err: &BackendError) -> String {
    match err {
        BackendError::Status { status, .. } => format!("backend returned {}", status),
        other => other.to_string(),
    }
}

// =============================================================================
// Rendering
// =============================================================================

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

fn render_workflow_list(workflows: &[Workflow]) -> String {
    let mut out = format!("Found {} workflow(s):\n\n", workflows.len());
    for wf in workflows {
        let status = if wf.active { "active" } else { "inactive" };
        let _ = writeln!(out, "- {} (ID: {}) - {}", wf.name, wf.id, status);
    }
    out
}

fn render_workflow(wf: &Workflow) -> String {
    format!(
        "Workflow: {}\nID: {}\nActive: {}\nNodes: {}",
        wf.name,
        wf.id,
        yes_no(wf.active),
        wf.nodes.len()
    )
}

fn render_execution_list(executions: &[Execution]) -> String {
    let mut out = format!("Found {} execution(s):\n\n", executions.len());
    for exec in executions {
        let _ = writeln!(
            out,
            "- {} [{}] workflow {} started {}",
            exec.id.as_deref().unwrap_or("N/A"),
            exec.status_label(),
            exec.workflow_id.as_deref().unwrap_or("N/A"),
            exec.started_at.as_deref().unwrap_or("N/A"),
        );
    }
    out
}

fn render_execution(exec: &Execution) -> String {
    format!(
        "Execution: {}\nWorkflow: {}\nStatus: {}\nMode: {}\nStarted: {}\nStopped: {}",
        exec.id.as_deref().unwrap_or("N/A"),
        exec.workflow_id.as_deref().unwrap_or("N/A"),
        exec.status_label(),
        exec.mode.as_deref().unwrap_or("N/A"),
        exec.started_at.as_deref().unwrap_or("N/A"),
        exec.stopped_at.as_deref().unwrap_or("N/A"),
    )
}

// =============================================================================
// Tests
// =============================================================================
