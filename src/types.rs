use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The UI operation the model picked for the current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Click,
    Type,
    Scroll,
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    #[default]
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollDirection {
    Up,
    Down,
    Left,
    Right,
    Top,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollAmount {
    Small,
    Medium,
    Large,
    Page,
}

/// A single decided step, in the wire shape the extension consumes:
/// `{"action": ..., "parameters": {...}, "reason": ..., "status": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "action")]
    pub kind: ActionKind,
    #[serde(default)]
    pub parameters: Map<String, Value>,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub status: ActionStatus,
}

/// Why a parsed model reply could not be turned into an [`Action`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    MissingAction,
    UnknownAction(String),
    Invalid(String),
}

impl SchemaError {
    pub fn message(&self) -> String {
        match self {
            SchemaError::MissingAction => "Invalid action format: missing 'action' field".to_string(),
            SchemaError::UnknownAction(kind) => {
                format!("Invalid action format: unknown action '{}'", kind)
            }
            SchemaError::Invalid(detail) => format!("Invalid action format: {}", detail),
        }
    }
}

impl Action {
    /// Validate an already-parsed model reply.
    ///
    /// Only `action` is required. `parameters`, `reason` and `status` fall back to
    /// `{}`, `""` and `in_progress`, whether absent or `null`. Unknown extra
    /// keys are ignored.
    pub fn from_value(raw: &Value) -> Result<Self, SchemaError> {
        let Some(obj) = raw.as_object() else {
            return Err(SchemaError::MissingAction);
        };
        let kind = obj.get("action").ok_or(SchemaError::MissingAction)?;
        if serde_json::from_value::<ActionKind>(kind.clone()).is_err() {
            return Err(match kind.as_str() {
                Some(name) => SchemaError::UnknownAction(name.to_string()),
                None => SchemaError::Invalid(format!("'action' must be a string, got {}", kind)),
            });
        }

        let mut fields = obj.clone();
        fields.retain(|key, value| key == "action" || !value.is_null());
        serde_json::from_value(Value::Object(fields)).map_err(|e| SchemaError::Invalid(e.to_string()))
    }

    pub fn selector(&self) -> Option<&str> {
        self.parameters.get("selector").and_then(Value::as_str)
    }

    pub fn text(&self) -> Option<&str> {
        self.parameters.get("text").and_then(Value::as_str)
    }

    pub fn scroll_direction(&self) -> Option<ScrollDirection> {
        self.parameters
            .get("direction")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub fn scroll_amount(&self) -> Option<ScrollAmount> {
        self.parameters
            .get("amount")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// True when the extension should stop driving the page after this step.
    pub fn is_final(&self) -> bool {
        self.kind == ActionKind::Stop || self.status == ActionStatus::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fills_defaults_for_missing_fields() {
        let action = Action::from_value(&json!({"action": "stop"})).unwrap();
        assert_eq!(action.kind, ActionKind::Stop);
        assert!(action.parameters.is_empty());
        assert_eq!(action.reason, "");
        assert_eq!(action.status, ActionStatus::InProgress);
    }

    #[test]
    fn keeps_every_supplied_field() {
        let raw = json!({
            "reason": "search box found",
            "action": "type",
            "parameters": {"selector": "agent-id-3", "text": "oat milk"},
            "status": "in_progress"
        });
        let action = Action::from_value(&raw).unwrap();
        assert_eq!(action.kind, ActionKind::Type);
        assert_eq!(action.selector(), Some("agent-id-3"));
        assert_eq!(action.text(), Some("oat milk"));
        assert_eq!(action.reason, "search box found");
        assert_eq!(serde_json::to_value(&action).unwrap(), raw);
    }

    #[test]
    fn missing_action_is_not_defaulted() {
        let err = Action::from_value(&json!({"status": "completed"})).unwrap_err();
        assert_eq!(err, SchemaError::MissingAction);
        assert_eq!(
            err.message(),
            "Invalid action format: missing 'action' field"
        );
    }

    #[test]
    fn non_object_reply_counts_as_missing_action() {
        assert_eq!(
            Action::from_value(&json!([1, 2])).unwrap_err(),
            SchemaError::MissingAction
        );
        assert_eq!(
            Action::from_value(&json!("click")).unwrap_err(),
            SchemaError::MissingAction
        );
    }

    #[test]
    fn unknown_action_kind_is_rejected() {
        let err = Action::from_value(&json!({"action": "navigate"})).unwrap_err();
        assert_eq!(err, SchemaError::UnknownAction("navigate".into()));
        assert_eq!(
            err.message(),
            "Invalid action format: unknown action 'navigate'"
        );
    }

    #[test]
    fn non_string_action_is_invalid() {
        let err = Action::from_value(&json!({"action": 3})).unwrap_err();
        assert_eq!(
            err.message(),
            "Invalid action format: 'action' must be a string, got 3"
        );
        assert!(matches!(
            Action::from_value(&json!({"action": null})),
            Err(SchemaError::Invalid(_))
        ));
    }

    #[test]
    fn null_optional_fields_fall_back_to_defaults() {
        let stop = Action::from_value(&json!({
            "action": "stop",
            "parameters": null,
            "reason": "done",
            "status": "completed"
        }))
        .unwrap();
        assert!(stop.parameters.is_empty());
        assert_eq!(stop.reason, "done");
        assert_eq!(stop.status, ActionStatus::Completed);

        let click = Action::from_value(&json!({
            "action": "click",
            "parameters": {"selector": "a"},
            "reason": null,
            "status": null
        }))
        .unwrap();
        assert_eq!(click.selector(), Some("a"));
        assert_eq!(click.reason, "");
        assert_eq!(click.status, ActionStatus::InProgress);
    }

    #[test]
    fn wrongly_typed_field_is_still_invalid() {
        let err = Action::from_value(&json!({"action": "click", "parameters": "agent-id-1"}))
            .unwrap_err();
        assert!(matches!(err, SchemaError::Invalid(_)));
    }

    #[test]
    fn scroll_parameters_are_typed_when_valid() {
        let action = Action::from_value(&json!({
            "action": "scroll",
            "parameters": {"direction": "down", "amount": "page"}
        }))
        .unwrap();
        assert_eq!(action.scroll_direction(), Some(ScrollDirection::Down));
        assert_eq!(action.scroll_amount(), Some(ScrollAmount::Page));

        let sideways = Action::from_value(&json!({
            "action": "scroll",
            "parameters": {"direction": "diagonal"}
        }))
        .unwrap();
        assert_eq!(sideways.scroll_direction(), None);
        assert_eq!(sideways.scroll_amount(), None);
    }

    #[test]
    fn stop_or_completed_is_final() {
        let stop = Action::from_value(&json!({"action": "stop"})).unwrap();
        let done = Action::from_value(&json!({"action": "click", "status": "completed"})).unwrap();
        let click = Action::from_value(&json!({"action": "click"})).unwrap();
        assert!(stop.is_final());
        assert!(done.is_final());
        assert!(!click.is_final());
    }
}
