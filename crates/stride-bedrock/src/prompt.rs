//! Prompt assembly for daily goal content.
//!
//! The system prompt pins the JSON contract; the user message carries the
//! goal as an XML-style block so free-text titles cannot break the framing.

use stride_core::models::content::{ContentKind, ContentRequest};

/// Upper bound on micro-plan items accepted from the model.
pub const MAX_MICRO_PLAN_ITEMS: usize = 5;

pub const SYSTEM_PROMPT: &str = "\
You are a personal accountability coach writing a short daily email for \
someone working toward a goal. Respond with a single JSON object and nothing \
else, using exactly these keys:
  \"message\": a motivational message of 2-4 sentences,
  \"micro_plan\": an ordered array of 3 to 5 concrete actions that each take \
under 15 minutes,
  \"challenge\": one reflective question or challenge for the day.
Do not wrap the JSON in markdown. Do not add any other keys.";

/// Build the user message for a content request.
pub fn build_user_message(request: &ContentRequest) -> String {
    let mut msg = String::from("<goal>\n");
    msg.push_str(&format!("<title>{}</title>\n", request.title.trim()));
    if let Some(description) = request
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
    {
        msg.push_str(&format!("<description>{description}</description>\n"));
    }
    msg.push_str(&format!("<streak_days>{}</streak_days>\n", request.streak_count));
    if let Some(target) = request.target_date {
        msg.push_str(&format!("<target_date>{target}</target_date>\n"));
    }
    msg.push_str("</goal>\n\n");

    msg.push_str("Tone: ");
    msg.push_str(request.tone.style_instruction());
    msg.push('\n');

    match request.kind {
        ContentKind::Daily => {
            msg.push_str("Write today's daily motivation for this goal.");
        }
        ContentKind::UrgentNudge => {
            msg.push_str(
                "The user missed yesterday's check-in and their streak is about to break. \
Write an urgent but supportive nudge that gets them to act today.",
            );
        }
    }

    msg
}
