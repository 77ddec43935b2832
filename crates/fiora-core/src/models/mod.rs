pub mod agent;
pub mod execution;
pub mod workflow;

pub use agent::{AgentStatus, RemoteAgentHandle};
pub use execution::{ExecutionRecord, ExecutionStatus};
pub use workflow::{
    ActionConfig, AutomationConfig, AutomationRequest, DelayConfig, StepKind, ValidationConfig,
    WorkflowStep,
};
