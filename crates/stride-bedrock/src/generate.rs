use aws_sdk_bedrockruntime::types::{ContentBlock, ConversationRole, Message, SystemContentBlock};
use aws_sdk_bedrockruntime::Client;
use tracing::info;

use stride_core::models::content::{ContentRequest, GeneratedContent};

use crate::error::BedrockError;
use crate::prompt::{self, MAX_MICRO_PLAN_ITEMS};
use crate::tokens::{self, TokenCount};

/// Generate daily content for a goal with one model. Token usage and the
/// estimated cost are logged, not returned.
///
/// Fails with `SchemaViolation` when the model answers with something other
/// than the agreed JSON shape; the caller decides whether to try another
/// model.
pub async fn generate_content(
    client: &Client,
    model_id: &str,
    request: &ContentRequest,
) -> Result<GeneratedContent, BedrockError> {
    let user_message = prompt::build_user_message(request);

    info!(model_id, kind = ?request.kind, "requesting daily content");

    let (text, tokens) =
        invoke_converse(client, model_id, prompt::SYSTEM_PROMPT, &user_message).await?;
    let content = parse_content(&text)?;

    let cost_usd = tokens::get_pricing(model_id)
        .map(|p| p.estimate_cost(tokens))
        .unwrap_or(0.0);
    info!(
        model_id,
        input_tokens = tokens.input,
        output_tokens = tokens.output,
        cost_usd,
        "daily content generated"
    );

    Ok(content)
}

/// Parse and validate the model's JSON answer.
///
/// Tolerates a surrounding markdown code fence; trims every field.
pub fn parse_content(text: &str) -> Result<GeneratedContent, BedrockError> {
    let json = strip_code_fence(text);
    let raw: GeneratedContent = serde_json::from_str(json).map_err(|e| {
        BedrockError::SchemaViolation(format!(
            "failed to parse GeneratedContent: {e}. Response: {text}"
        ))
    })?;

    let content = GeneratedContent {
        message: raw.message.trim().to_string(),
        micro_plan: raw
            .micro_plan
            .iter()
            .map(|s| s.trim().to_string())
            .collect(),
        challenge: raw.challenge.trim().to_string(),
    };

    if content.message.is_empty() {
        return Err(BedrockError::SchemaViolation("empty message".to_string()));
    }
    if content.challenge.is_empty() {
        return Err(BedrockError::SchemaViolation("empty challenge".to_string()));
    }
    if content.micro_plan.is_empty() || content.micro_plan.len() > MAX_MICRO_PLAN_ITEMS {
        return Err(BedrockError::SchemaViolation(format!(
            "micro_plan must have 1..={MAX_MICRO_PLAN_ITEMS} items, got {}",
            content.micro_plan.len()
        )));
    }
    if content.micro_plan.iter().any(|s| s.is_empty()) {
        return Err(BedrockError::SchemaViolation(
            "micro_plan contains an empty item".to_string(),
        ));
    }

    Ok(content)
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop an optional language tag on the opening fence line.
    let rest = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Core invocation using the Bedrock Converse API.
/// Returns the response text and token counts.
async fn invoke_converse(
    client: &Client,
    model_id: &str,
    system_prompt: &str,
    user_message: &str,
) -> Result<(String, TokenCount), BedrockError> {
    let response = client
        .converse()
        .model_id(model_id)
        .system(SystemContentBlock::Text(system_prompt.to_string()))
        .messages(
            Message::builder()
                .role(ConversationRole::User)
                .content(ContentBlock::Text(user_message.to_string()))
                .build()
                .map_err(|e| BedrockError::Invocation(e.to_string()))?,
        )
        .send()
        .await
        .map_err(|e| BedrockError::Invocation(e.into_service_error().to_string()))?;

    let output_message = response
        .output()
        .and_then(|o| o.as_message().ok())
        .ok_or_else(|| BedrockError::ResponseParse("no message in response".to_string()))?;

    let response_text = output_message
        .content()
        .iter()
        .filter_map(|block| {
            if let ContentBlock::Text(text) = block {
                Some(text.as_str())
            } else {
                None
            }
        })
        .collect::<Vec<_>>()
        .join("");

    let tokens = response
        .usage()
        .map(tokens::extract_token_usage)
        .unwrap_or_default();

    Ok((response_text, tokens))
}
