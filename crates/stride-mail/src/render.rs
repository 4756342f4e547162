use serde::Serialize;
use tera::{Context, Tera};

use stride_core::models::content::ContentKind;

use crate::error::MailError;

const DAILY_TEMPLATE_NAME: &str = "daily.html";
const DAILY_TEMPLATE: &str = include_str!("../templates/daily.html");

/// Values available to the daily email template.
#[derive(Debug, Clone, Serialize)]
pub struct DailyEmail<'a> {
    pub greeting_name: &'a str,
    pub goal_title: &'a str,
    pub streak_count: u32,
    pub message: &'a str,
    pub micro_plan: &'a [String],
    pub challenge: &'a str,
    pub urgent: bool,
    pub app_url: Option<&'a str>,
}

/// Render the daily email HTML body. Values are HTML-escaped.
pub fn render_daily_html(email: &DailyEmail<'_>) -> Result<String, MailError> {
    let mut tera = Tera::default();
    tera.add_raw_template(DAILY_TEMPLATE_NAME, DAILY_TEMPLATE)?;

    let value = serde_json::to_value(email)?;
    let context =
        Context::from_value(value).map_err(|e| MailError::TemplateRender(e.to_string()))?;

    Ok(tera.render(DAILY_TEMPLATE_NAME, &context)?)
}

/// Subject line for a goal email.
pub fn subject_line(kind: ContentKind, goal_title: &str, streak_count: u32) -> String {
    let title = goal_title.trim();
    match kind {
        ContentKind::UrgentNudge if streak_count > 0 => {
            format!("Don't break your {streak_count}-day streak: {title}")
        }
        ContentKind::UrgentNudge => format!("Get back on track: {title}"),
        ContentKind::Daily if streak_count > 0 => format!("Day {}: {title}", streak_count + 1),
        ContentKind::Daily => format!("Today's step toward {title}"),
    }
}
