//! Integration tests for the thread publication pipeline
//!
//! These tests drive the pipeline through its public entry points against
//! scripted collaborators and check the persisted draft afterwards:
//! - Direct-content publication (happy path, length boundary)
//! - Partial failure in the reply chain
//! - Generate-then-publish with context and memories

mod common;

use common::{harness, CannedGenerator, FixedCooldown, ScriptedPlatform};
use threadline::core::types::MessageId;
use threadline::store::{DraftStore, KnowledgeStore, MemoryKind, TranscriptEntry, TranscriptLog};
use threadline::thread::{DraftStatus, Segment};

fn segments(texts: &[&str]) -> Vec<Segment> {
    texts.iter().map(|t| Segment::new(*t)).collect()
}

// ============================================================================
// Direct-content mode
// ============================================================================

#[tokio::test]
async fn test_two_segments_publish() {
    let h = harness(ScriptedPlatform::new(), CannedGenerator::default(), FixedCooldown::inactive());

    let result = h.agent.pipeline.publish(segments(&["Hello", "World"])).await;

    assert!(result.success);
    assert_eq!(result.tweet_ids.len(), 2);
    assert_eq!(result.status, Some(DraftStatus::Published));
    assert_eq!(result.thread_id, Some(MessageId::from("msg_0")));

    let draft = h
        .drafts
        .fetch_draft(result.draft_id.as_ref().unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(draft.status, DraftStatus::Published);
    assert_eq!(draft.message_ids, result.tweet_ids);
}

/// Each reply targets the id produced by the segment right before it
#[tokio::test]
async fn test_replies_chain_to_previous_segment() {
    let h = harness(ScriptedPlatform::new(), CannedGenerator::default(), FixedCooldown::inactive());

    let result = h.agent.pipeline.publish(segments(&["a", "b", "c"])).await;
    assert!(result.success);

    let requests = h.platform.requests();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[0].0, None);
    assert_eq!(requests[1].0, Some(MessageId::from("msg_0")));
    assert_eq!(requests[2].0, Some(MessageId::from("msg_1")));

    let draft_id = result.draft_id.unwrap();
    assert_eq!(requests[2].1.idempotency_key, format!("{}:2", draft_id));
}

#[tokio::test]
async fn test_segment_of_exactly_280_chars_is_accepted() {
    let h = harness(ScriptedPlatform::new(), CannedGenerator::default(), FixedCooldown::inactive());

    let long = "x".repeat(280);
    let result = h.agent.pipeline.publish(segments(&[&long, "tail"])).await;

    assert!(result.success);
    assert_eq!(h.platform.call_count(), 2);
}

/// 281 characters aborts before any network call and creates no draft
#[tokio::test]
async fn test_segment_of_281_chars_aborts_before_posting() {
    let h = harness(ScriptedPlatform::new(), CannedGenerator::default(), FixedCooldown::inactive());

    let too_long = "x".repeat(281);
    let result = h.agent.pipeline.publish(segments(&["intro", &too_long])).await;

    assert!(!result.success);
    assert!(result.message.contains("exceeds character limit"));
    assert!(result.draft_id.is_none());
    assert!(result.status.is_none());
    assert_eq!(h.platform.call_count(), 0);
    assert!(h.drafts.is_empty());
}

// ============================================================================
// Partial failure
// ============================================================================

/// Four segments, reply for index 2 fails: two ids recorded, index 3 never
/// attempted, draft ends failed
#[tokio::test]
async fn test_partial_failure_keeps_prefix_and_stops() {
    let h = harness(
        ScriptedPlatform::failing_at(2),
        CannedGenerator::default(),
        FixedCooldown::inactive(),
    );

    let result = h
        .agent
        .pipeline
        .publish(segments(&["one", "two", "three", "four"]))
        .await;

    assert!(!result.success);
    assert_eq!(result.status, Some(DraftStatus::Failed));
    assert_eq!(result.tweet_ids.len(), 2);
    assert!(result.message.contains("Failed to post reply tweet 3"));
    assert!(result.message.contains("rate limited"));
    assert_eq!(h.platform.call_count(), 3);

    let draft = h
        .drafts
        .fetch_draft(result.draft_id.as_ref().unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(draft.status, DraftStatus::Failed);
    assert_eq!(draft.message_ids.len(), 2);
    assert_eq!(draft.unposted().len(), 2);
}

#[tokio::test]
async fn test_first_post_failure_attempts_nothing_else() {
    let h = harness(
        ScriptedPlatform::failing_at(0),
        CannedGenerator::default(),
        FixedCooldown::inactive(),
    );

    let result = h.agent.pipeline.publish(segments(&["one", "two"])).await;

    assert!(!result.success);
    assert_eq!(result.status, Some(DraftStatus::Failed));
    assert!(result.tweet_ids.is_empty());
    assert_eq!(h.platform.call_count(), 1);
}

// ============================================================================
// Generate-then-publish mode
// ============================================================================

#[tokio::test]
async fn test_generation_receives_history_and_memories() {
    let h = harness(
        ScriptedPlatform::new(),
        CannedGenerator::returning(&["first", "second"]),
        FixedCooldown::inactive(),
    );
    h.transcript
        .append(TranscriptEntry::new("help", "Available commands:"))
        .await
        .unwrap();
    h.knowledge
        .remember(MemoryKind::WorldKnowledge, "Rust editions ship every three years")
        .await
        .unwrap();

    let result = h.agent.pipeline.generate_and_publish("rust editions").await;
    assert!(result.success);

    let seen = h.generator.seen.lock().unwrap().clone();
    assert_eq!(seen.len(), 1);
    let (topic, context, memories) = &seen[0];
    assert_eq!(topic, "rust editions");
    assert!(context.contains("$ help"));
    assert!(memories.contains("Rust editions ship every three years"));

    let draft = h
        .drafts
        .fetch_draft(result.draft_id.as_ref().unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(draft.topic.as_deref(), Some("rust editions"));
}

/// Posted segments are added to memory as they go out
#[tokio::test]
async fn test_posted_segments_are_remembered() {
    let h = harness(
        ScriptedPlatform::failing_at(1),
        CannedGenerator::returning(&["kept", "lost"]),
        FixedCooldown::inactive(),
    );

    let result = h.agent.pipeline.generate_and_publish("anything").await;
    assert!(!result.success);

    let memories = h.knowledge.memories();
    assert_eq!(memories.len(), 1);
    assert_eq!(memories[0].text, "kept");
    assert_eq!(memories[0].kind, MemoryKind::ThreadPost);
}

#[tokio::test]
async fn test_generation_error_is_reported_without_draft() {
    let h = harness(ScriptedPlatform::new(), CannedGenerator::failing(), FixedCooldown::inactive());

    let result = h.agent.pipeline.generate_and_publish("anything").await;

    assert!(!result.success);
    assert!(result.message.starts_with("Failed to generate thread content"));
    assert!(h.drafts.is_empty());
    assert_eq!(h.platform.call_count(), 0);
}

#[tokio::test]
async fn test_zero_generated_segments_is_explicit_failure() {
    let h = harness(
        ScriptedPlatform::new(),
        CannedGenerator::returning(&[]),
        FixedCooldown::inactive(),
    );

    let result = h.agent.pipeline.generate_and_publish("anything").await;

    assert!(!result.success);
    assert_eq!(result.message, "content generation produced no segments");
    assert!(h.drafts.is_empty());
}
