use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::DecideError;
use crate::llm::TextGenerator;
use crate::types::{Action, SchemaError};

pub type Decision = Result<Action, DecideError>;

fn render_prompt(user_goal: &str, page_data: &str) -> String {
    format!(
        r#"You are a web automation agent helping a user shop for groceries in their browser.
You see the interactive elements of the current page and decide the ONE next action that moves the user closer to their goal.

User goal: {user_goal}

Current page elements:
{page_data}

Available actions:
- "click": click an element. Parameters: {{"selector": "<element id from the page data>"}}
- "type": type into an input. Parameters: {{"selector": "<element id>", "text": "<text to enter>"}}
- "scroll": scroll the page. Parameters: {{"direction": "up|down|left|right|top|bottom", "amount": "small|medium|large|page"}} ("amount" is optional)
- "stop": stop, the goal is reached or cannot be reached. Parameters: {{}}

Respond with ONLY a JSON object in exactly this format, with no markdown and no extra text:
{{
  "reason": "<short explanation of why this action>",
  "action": "click|type|scroll|stop",
  "parameters": {{ ... }},
  "status": "in_progress|completed"
}}

Use "completed" only when the user goal has been fully achieved."#
    )
}

/// Prompt-and-parse unit: (goal, page snapshot) -> next action.
///
/// Malformed model output is never repaired or retried; the raw text is
/// handed back so prompt drift stays visible.
pub struct Brain {
    generator: Arc<dyn TextGenerator>,
    timeout: Duration,
}

impl Brain {
    pub fn new(generator: Arc<dyn TextGenerator>, timeout: Duration) -> Self {
        Self { generator, timeout }
    }

    pub fn prompt_for(user_goal: &str, page_snapshot: &Value) -> String {
        // Pretty printing a Value cannot fail.
        let page_data = serde_json::to_string_pretty(page_snapshot).unwrap_or_default();
        render_prompt(user_goal, &page_data)
    }

    pub async fn decide(&self, user_goal: &str, page_snapshot: &Value) -> Decision {
        let prompt = Self::prompt_for(user_goal, page_snapshot);

        let reply = match tokio::time::timeout(self.timeout, self.generator.generate_text(&prompt))
            .await
        {
            Ok(Ok(reply)) => reply,
            Ok(Err(e)) => {
                warn!(error = %e, "model call failed");
                return Err(DecideError::UpstreamFailure(e.to_string()));
            }
            Err(_) => {
                warn!(timeout = ?self.timeout, "model call timed out");
                return Err(DecideError::UpstreamFailure(format!(
                    "model call timed out after {:?}",
                    self.timeout
                )));
            }
        };

        if reply.is_empty() {
            return Err(DecideError::UpstreamFailure(
                "Failed to get response from LLM".to_string(),
            ));
        }

        let decision = parse_decision(&reply);
        match &decision {
            Ok(action) => info!(
                action = ?action.kind,
                selector = action.selector().unwrap_or("-"),
                status = ?action.status,
                "decided next action"
            ),
            Err(e) => warn!(error = %e, "model reply rejected"),
        }
        decision
    }
}

/// Strictly parse a model reply. No fence stripping, no repair.
pub fn parse_decision(raw: &str) -> Decision {
    let value: Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            debug!(error = %e, "model reply is not JSON");
            return Err(DecideError::MalformedResponse {
                raw_response: raw.to_string(),
            });
        }
    };

    Action::from_value(&value).map_err(|e: SchemaError| DecideError::InvalidAction {
        message: e.message(),
        raw_response: raw.to_string(),
    })
}
