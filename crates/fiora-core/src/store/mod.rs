pub mod agent_registry;
pub mod execution_store;

pub use agent_registry::AgentRegistry;
pub use execution_store::ExecutionStore;
