//! S3 key/path conventions.
//!
//! Pure string functions with no AWS SDK dependency. These define the
//! canonical layout of objects in the Stride S3 bucket.

use jiff::civil::Date;
use uuid::Uuid;

pub const GOALS_PREFIX: &str = "goals/";

pub fn goal(id: Uuid) -> String {
    format!("goals/{id}.json")
}

pub fn profile(user_id: Uuid) -> String {
    format!("profiles/{user_id}.json")
}

pub fn subscription(user_id: Uuid) -> String {
    format!("subscriptions/{user_id}.json")
}

pub fn daily_content(goal_id: Uuid, date: Date) -> String {
    format!("content/{goal_id}/{date}.json")
}

pub fn delivery_outcome(date: Date, goal_id: Uuid, outcome_id: Uuid) -> String {
    format!("deliveries/{date}/{goal_id}/{outcome_id}.json")
}

pub fn skip(date: Date, goal_id: Uuid) -> String {
    format!("skips/{date}/{goal_id}.json")
}

pub fn run_summary(date: Date, run_id: Uuid) -> String {
    format!("runs/{date}/{run_id}.json")
}
