use serde::Deserialize;

use crate::core::task::Task;
use crate::core::user::User;

#[derive(Debug, Clone, Deserialize)]
struct ProxyError {
    #[serde(default)]
    message: String,
}

/// POST `{action, payload}` to the proxy function and return the response
/// body. One shot: no retries, no streaming; the platform's function
/// timeout is the only deadline.
async fn post(endpoint: &str, body: &serde_json::Value) -> Result<serde_json::Value, String> {
    let client = reqwest::Client::new();
    let resp = client
        .post(endpoint)
        .header("content-type", "application/json")
        .json(body)
        .send()
        .await
        .map_err(|e| format!("Assistant request failed: {}", e))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let message = resp
            .json::<ProxyError>()
            .await
            .map(|e| e.message)
            .unwrap_or_default();
        if message.is_empty() {
            return Err(format!("Assistant error {}", status));
        }
        return Err(message);
    }

    resp.json()
        .await
        .map_err(|e| format!("Failed to parse assistant response: {}", e))
}

/// Ask the proxy for the team's daily briefing over the visible task list.
/// The roster is reduced to id and name before it travels.
pub async fn generate_daily_briefing(
    endpoint: &str,
    tasks: &[Task],
    users: &[User],
) -> Result<String, String> {
    let roster: Vec<serde_json::Value> = users
        .iter()
        .map(|u| serde_json::json!({ "id": u.id, "name": u.name }))
        .collect();

    let body = serde_json::json!({
        "action": "generateDailyBriefing",
        "payload": { "tasks": tasks, "users": roster },
    });

    let value = post(endpoint, &body).await?;
    value
        .get("report")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| "No report in assistant response".to_string())
}

/// Answer a question against one knowledge-base document. The document text
/// travels as context; the proxy instructs the model to use nothing else.
pub async fn ask_knowledge_base(
    endpoint: &str,
    question: &str,
    context: &str,
) -> Result<String, String> {
    let body = serde_json::json!({
        "action": "askKnowledgeBase",
        "payload": { "question": question, "context": context },
    });

    let value = post(endpoint, &body).await?;
    value
        .get("answer")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| "No answer in assistant response".to_string())
}
