//! Workflow submission types.
//!
//! A workflow arrives as a JSON request body:
//!
//! ```json
//! {
//!   "workflow_steps": [
//!     {
//!       "id": "s1",
//!       "step_type": "action",
//!       "step_order": 1,
//!       "config": { "action": "type", "selector": "#user", "value": "{username}" }
//!     }
//!   ],
//!   "template_inputs": { "username": "alice" },
//!   "sap_fiori_url": "https://fiori.example.com"
//! }
//! ```
//!
//! `step_type` is kept as a plain string in the wire model: an unknown kind
//! must fail the run when the step is reached, not reject the submission.
//! The free-form `config` is parsed into the typed per-kind structs below at
//! the interpretation boundary.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One declarative unit of a workflow. Immutable once submitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowStep {
    pub id: String,
    pub step_type: String,
    pub step_order: u32,
    #[serde(default)]
    pub config: serde_json::Value,
}

/// An ordered workflow plus the template inputs substituted into its steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutomationRequest {
    pub workflow_steps: Vec<WorkflowStep>,
    #[serde(default)]
    pub template_inputs: HashMap<String, String>,
    #[serde(default)]
    pub sap_fiori_url: Option<String>,
}

/// Enumerated step discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Action,
    Validation,
    Screenshot,
    Delay,
    StructuredAutomation,
}

impl StepKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Action => "action",
            Self::Validation => "validation",
            Self::Screenshot => "screenshot",
            Self::Delay => "delay",
            Self::StructuredAutomation => "structured-automation",
        }
    }

    /// Parse a wire step type. `cua_automation` is the legacy spelling of
    /// `structured-automation` still emitted by older workflow builders.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "action" => Some(Self::Action),
            "validation" => Some(Self::Validation),
            "screenshot" => Some(Self::Screenshot),
            "delay" => Some(Self::Delay),
            "structured-automation" | "structured_automation" | "cua_automation" => {
                Some(Self::StructuredAutomation)
            }
            _ => None,
        }
    }
}

fn default_action() -> String {
    "click".to_string()
}

/// Config for `action` steps.
#[derive(Debug, Clone, Deserialize)]
pub struct ActionConfig {
    #[serde(default = "default_action")]
    pub action: String,
    #[serde(default)]
    pub selector: String,
    #[serde(default)]
    pub value: String,
}

/// Config for `validation` steps.
#[derive(Debug, Clone, Deserialize)]
pub struct ValidationConfig {
    #[serde(default)]
    pub selector: String,
    #[serde(default)]
    pub validation: ValidationRule,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ValidationRule {
    #[serde(default = "default_validation_rule")]
    pub rule: String,
}

impl Default for ValidationRule {
    fn default() -> Self {
        Self {
            rule: default_validation_rule(),
        }
    }
}

fn default_validation_rule() -> String {
    "toBeVisible".to_string()
}

/// Config for `delay` steps. Duration is in milliseconds.
#[derive(Debug, Clone, Deserialize)]
pub struct DelayConfig {
    #[serde(default = "default_delay_ms")]
    pub duration: f64,
}

fn default_delay_ms() -> f64 {
    1000.0
}

/// Config for `structured-automation` steps.
#[derive(Debug, Clone, Deserialize)]
pub struct AutomationConfig {
    #[serde(default, rename = "automationId")]
    pub automation_id: String,
    #[serde(default)]
    pub inputs: HashMap<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_kind_parse() {
        assert_eq!(StepKind::parse("action"), Some(StepKind::Action));
        assert_eq!(StepKind::parse("delay"), Some(StepKind::Delay));
        assert_eq!(
            StepKind::parse("structured-automation"),
            Some(StepKind::StructuredAutomation)
        );
        assert_eq!(
            StepKind::parse("cua_automation"),
            Some(StepKind::StructuredAutomation)
        );
        assert_eq!(StepKind::parse("bogus"), None);
    }

    #[test]
    fn test_parse_request_with_defaults() {
        let json = r#"{
            "workflow_steps": [
                {"id": "s1", "step_type": "screenshot", "step_order": 1}
            ]
        }"#;
        let req: AutomationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.workflow_steps.len(), 1);
        assert!(req.template_inputs.is_empty());
        assert!(req.sap_fiori_url.is_none());
        assert!(req.workflow_steps[0].config.is_null());
    }

    #[test]
    fn test_action_config_defaults() {
        let cfg: ActionConfig = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(cfg.action, "click");
        assert_eq!(cfg.selector, "");
        assert_eq!(cfg.value, "");
    }

    #[test]
    fn test_validation_config_default_rule() {
        let cfg: ValidationConfig =
            serde_json::from_value(serde_json::json!({"selector": "#ok"})).unwrap();
        assert_eq!(cfg.validation.rule, "toBeVisible");

        let cfg: ValidationConfig = serde_json::from_value(
            serde_json::json!({"selector": "#ok", "validation": {"rule": "toBeHidden"}}),
        )
        .unwrap();
        assert_eq!(cfg.validation.rule, "toBeHidden");
    }
}
