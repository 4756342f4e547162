mod common;

use jiff::civil::date;

use stride_core::models::content::ContentKind;
use stride_core::models::goal::CoachingTone;
use stride_scheduler::content::{content_kind, static_content, ContentGenerator, ContentSource};

use common::{now, seeded_store, today, ScriptedContent};

fn models() -> Vec<String> {
    vec!["model-a".to_string(), "model-b".to_string()]
}

#[tokio::test]
async fn generates_and_stores_with_first_model() {
    let (store, g) = seeded_store().await;
    let provider = ScriptedContent::new();
    let models = models();
    let generator = ContentGenerator::new(&store, &provider, &models);

    let prepared = generator.prepare(&g, today(), now()).await;

    assert_eq!(
        prepared.source,
        ContentSource::Generated {
            model_id: "model-a".to_string()
        }
    );
    assert_eq!(provider.calls(), vec!["model-a"]);
    let stored = store.content_for(g.id, today()).await.unwrap();
    assert_eq!(stored.message, "from model-a");
    assert_eq!(stored.streak_snapshot, g.streak_count);
    assert_eq!(stored.model_id.as_deref(), Some("model-a"));
}

#[tokio::test]
async fn reuses_content_for_same_day_and_streak() {
    let (store, g) = seeded_store().await;
    let provider = ScriptedContent::new();
    let models = models();
    let generator = ContentGenerator::new(&store, &provider, &models);

    generator.prepare(&g, today(), now()).await;
    let again = generator.prepare(&g, today(), now()).await;

    assert_eq!(again.source, ContentSource::Reused);
    assert_eq!(provider.calls().len(), 1);
}

#[tokio::test]
async fn streak_change_forces_regeneration() {
    let (store, mut g) = seeded_store().await;
    let provider = ScriptedContent::new();
    let models = models();
    let generator = ContentGenerator::new(&store, &provider, &models);

    generator.prepare(&g, today(), now()).await;
    g.streak_count += 1;
    let again = generator.prepare(&g, today(), now()).await;

    assert!(matches!(again.source, ContentSource::Generated { .. }));
    assert_eq!(provider.calls().len(), 2);
    let stored = store.content_for(g.id, today()).await.unwrap();
    assert_eq!(stored.streak_snapshot, g.streak_count);
}

#[tokio::test]
async fn falls_back_to_next_model_in_order() {
    let (store, g) = seeded_store().await;
    let provider = ScriptedContent::failing(&["model-a"]);
    let models = models();
    let generator = ContentGenerator::new(&store, &provider, &models);

    let prepared = generator.prepare(&g, today(), now()).await;

    assert_eq!(provider.calls(), vec!["model-a", "model-b"]);
    assert_eq!(prepared.content.message, "from model-b");
}

#[tokio::test]
async fn all_models_failing_yields_static_content_not_stored() {
    let (store, g) = seeded_store().await;
    let provider = ScriptedContent::failing(&["model-a", "model-b"]);
    let models = models();
    let generator = ContentGenerator::new(&store, &provider, &models);

    let prepared = generator.prepare(&g, today(), now()).await;

    assert_eq!(prepared.source, ContentSource::Fallback);
    assert!(prepared.content.model_id.is_none());
    assert!(prepared.content.message.contains("Learn Spanish"));
    assert!(!prepared.content.micro_plan.is_empty());
    assert!(store.content_for(g.id, today()).await.is_none());
}

#[test]
fn missed_check_in_asks_for_urgent_nudge() {
    let mut g = common::goal(uuid::Uuid::new_v4());
    assert_eq!(content_kind(&g, today()), ContentKind::Daily);

    g.last_check_in = Some(date(2026, 5, 7));
    assert_eq!(content_kind(&g, today()), ContentKind::UrgentNudge);

    g.streak_count = 0;
    assert_eq!(content_kind(&g, today()), ContentKind::Daily);
}

#[test]
fn static_content_follows_tone() {
    let mut g = common::goal(uuid::Uuid::new_v4());
    g.tone = CoachingTone::Drill;
    let drill = static_content(&g, today(), ContentKind::Daily, now());
    g.tone = CoachingTone::Gentle;
    let gentle = static_content(&g, today(), ContentKind::Daily, now());

    assert_ne!(drill.message, gentle.message);

    let urgent = static_content(&g, today(), ContentKind::UrgentNudge, now());
    assert!(urgent.message.contains("4-day streak"));
    assert_eq!(urgent.kind, ContentKind::UrgentNudge);
}
