/// Input/output token counts for one Converse call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenCount {
    pub input: u64,
    pub output: u64,
}

/// Per-million-token prices used for cost logging.
#[derive(Debug, Clone, Copy)]
pub struct ModelPricing {
    pub input_per_million: f64,
    pub output_per_million: f64,
}

impl ModelPricing {
    pub fn estimate_cost(&self, tokens: TokenCount) -> f64 {
        (tokens.input as f64 / 1_000_000.0) * self.input_per_million
            + (tokens.output as f64 / 1_000_000.0) * self.output_per_million
    }
}

/// Extract token counts from a Bedrock Converse response.
pub fn extract_token_usage(usage: &aws_sdk_bedrockruntime::types::TokenUsage) -> TokenCount {
    TokenCount {
        input: usage.input_tokens.max(0) as u64,
        output: usage.output_tokens.max(0) as u64,
    }
}

/// Known model pricing (per million tokens). Approximate.
pub fn get_pricing(model_id: &str) -> Option<ModelPricing> {
    match model_id {
        id if id.contains("claude-sonnet-4") => Some(ModelPricing {
            input_per_million: 3.0,
            output_per_million: 15.0,
        }),
        id if id.contains("claude-haiku-4") => Some(ModelPricing {
            input_per_million: 1.0,
            output_per_million: 5.0,
        }),
        id if id.contains("claude-3-5-haiku") => Some(ModelPricing {
            input_per_million: 0.80,
            output_per_million: 4.0,
        }),
        _ => None,
    }
}
