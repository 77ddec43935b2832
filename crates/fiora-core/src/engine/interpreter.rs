//! Step interpreter — maps one declarative step to remote agent calls or
//! a local suspension, producing the payload recorded under `step_<n>`.

use std::collections::HashMap;
use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::cua::{BrowserAction, CuaClient};
use crate::error::AutomatorError;
use crate::models::{
    ActionConfig, AutomationConfig, DelayConfig, StepKind, ValidationConfig, WorkflowStep,
};
use crate::template;

/// What an `action` step resolves to, before anything touches the network.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionPlan {
    Remote(BrowserAction),
    Wait { seconds: f64 },
}

fn parse_config<T: DeserializeOwned>(config: &serde_json::Value) -> Result<T, AutomatorError> {
    // A step may omit `config` entirely; treat that as an empty mapping so
    // per-field defaults apply.
    let value = if config.is_null() {
        serde_json::json!({})
    } else {
        config.clone()
    };
    serde_json::from_value(value).map_err(|e| AutomatorError::InvalidStepConfig(e.to_string()))
}

/// Resolve an `action` step's config into a concrete plan, applying
/// template substitution to the value.
pub fn plan_action(
    config: &ActionConfig,
    template_inputs: &HashMap<String, String>,
) -> Result<ActionPlan, AutomatorError> {
    let value = template::substitute(&config.value, template_inputs);

    match config.action.as_str() {
        "click" => Ok(ActionPlan::Remote(BrowserAction::Click {
            selector: config.selector.clone(),
        })),
        "type" => Ok(ActionPlan::Remote(BrowserAction::Type {
            selector: config.selector.clone(),
            text: value,
        })),
        "select" => Ok(ActionPlan::Remote(BrowserAction::Select {
            selector: config.selector.clone(),
            value,
        })),
        "wait" => {
            let seconds = if value.is_empty() {
                1.0
            } else {
                value.parse::<f64>().map_err(|_| {
                    AutomatorError::InvalidStepConfig(format!("invalid wait duration: {}", value))
                })?
            };
            Ok(ActionPlan::Wait { seconds })
        }
        other => Err(AutomatorError::UnknownAction(other.to_string())),
    }
}

/// Execute one workflow step against the rented agent and return its
/// result payload.
pub async fn execute_step(
    client: &CuaClient,
    agent_id: &str,
    step: &WorkflowStep,
    template_inputs: &HashMap<String, String>,
) -> Result<serde_json::Value, AutomatorError> {
    let kind = StepKind::parse(&step.step_type)
        .ok_or_else(|| AutomatorError::UnknownStepType(step.step_type.clone()))?;

    match kind {
        StepKind::Action => {
            let config: ActionConfig = parse_config(&step.config)?;
            match plan_action(&config, template_inputs)? {
                ActionPlan::Remote(action) => {
                    let result = client.execute_action(agent_id, &action).await?;
                    Ok(serde_json::json!({
                        "action": config.action,
                        "selector": config.selector,
                        "result": result,
                    }))
                }
                ActionPlan::Wait { seconds } => {
                    tokio::time::sleep(Duration::from_secs_f64(seconds.max(0.0))).await;
                    Ok(serde_json::json!({ "action": "wait", "duration": seconds }))
                }
            }
        }
        StepKind::Validation => {
            let config: ValidationConfig = parse_config(&step.config)?;
            let action = BrowserAction::WaitForElement {
                selector: config.selector.clone(),
                condition: config.validation.rule.clone(),
            };
            let result = client.execute_action(agent_id, &action).await?;
            Ok(serde_json::json!({
                "validation": config.validation.rule,
                "selector": config.selector,
                "result": result,
            }))
        }
        StepKind::Screenshot => {
            let result = client.screenshot(agent_id).await?;
            Ok(serde_json::json!({ "screenshot": result }))
        }
        StepKind::Delay => {
            let config: DelayConfig = parse_config(&step.config)?;
            let seconds = config.duration / 1000.0;
            tokio::time::sleep(Duration::from_secs_f64(seconds.max(0.0))).await;
            Ok(serde_json::json!({ "delay": seconds }))
        }
        StepKind::StructuredAutomation => {
            let config: AutomationConfig = parse_config(&step.config)?;
            let inputs: HashMap<String, String> = config
                .inputs
                .iter()
                .map(|(key, value)| {
                    let text = match value {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    (key.clone(), template::substitute(&text, template_inputs))
                })
                .collect();

            let action = BrowserAction::Automation {
                automation_id: config.automation_id.clone(),
                inputs: inputs.clone(),
            };
            let result = client.execute_action(agent_id, &action).await?;
            Ok(serde_json::json!({
                "automation": config.automation_id,
                "inputs": inputs,
                "result": result,
            }))
        }
    }
}
