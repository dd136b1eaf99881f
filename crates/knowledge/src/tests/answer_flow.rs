//! End-to-end behavior of `FaqOrchestrator::answer` and `load_corpus`.

use super::*;
use crate::types::{AnswerResult, FALLBACK_MESSAGE, NO_MATCH_MESSAGE};

fn setup(behavior: Behavior) -> (Arc<KeywordEmbedder>, Arc<StubAugmenter>, FaqOrchestrator) {
    setup_with(behavior, FaqConfig::default())
}

fn setup_with(
    behavior: Behavior,
    config: FaqConfig,
) -> (Arc<KeywordEmbedder>, Arc<StubAugmenter>, FaqOrchestrator) {
    let embedder = Arc::new(KeywordEmbedder::default());
    let augmenter = Arc::new(StubAugmenter::new(behavior));
    let orchestrator = build_orchestrator(embedder.clone(), augmenter.clone(), config);
    (embedder, augmenter, orchestrator)
}

#[tokio::test]
async fn test_plumbing_question_matches_cost_entry() {
    let (_, augmenter, orchestrator) = setup(Behavior::Echo);
    orchestrator.load_corpus(&example_corpus()).await.unwrap();

    let result = orchestrator
        .answer("How much does plumbing repair cost?")
        .await
        .unwrap();

    assert_eq!(
        result,
        AnswerResult::Augmented {
            text: "$100-$200".to_string(),
            matched_document_id: "1".to_string(),
        }
    );
    assert_eq!(augmenter.calls(), 1);
}

#[tokio::test]
async fn test_repeated_question_is_served_from_cache() {
    let (_, augmenter, orchestrator) = setup(Behavior::Decorate);
    orchestrator.load_corpus(&example_corpus()).await.unwrap();

    let first = orchestrator
        .answer("How much does plumbing repair cost?")
        .await
        .unwrap();
    let second = orchestrator
        .answer("  how MUCH does   plumbing repair\tcost?  ")
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(first.text(), "$100-$200 (augmented)");
    assert_eq!(augmenter.calls(), 1);
    assert_eq!(orchestrator.cache_len(), 1);
}

#[tokio::test]
async fn test_different_questions_for_same_entry_are_cached_separately() {
    let (_, augmenter, orchestrator) = setup(Behavior::Echo);
    orchestrator.load_corpus(&example_corpus()).await.unwrap();

    orchestrator.answer("plumbing cost?").await.unwrap();
    orchestrator.answer("what does plumbing cost").await.unwrap();

    assert_eq!(augmenter.calls(), 2);
    assert_eq!(orchestrator.cache_len(), 2);
}

#[tokio::test]
async fn test_augmentation_failure_returns_stored_answer() {
    let kinds = [
        AugmentationErrorKind::Timeout,
        AugmentationErrorKind::RateLimited,
        AugmentationErrorKind::AuthFailure,
        AugmentationErrorKind::Unknown,
    ];

    for kind in kinds {
        let (_, augmenter, orchestrator) = setup(Behavior::Fail(kind));
        orchestrator.load_corpus(&example_corpus()).await.unwrap();

        let result = orchestrator
            .answer("Are your contractors reliable?")
            .await
            .unwrap();

        assert_eq!(
            result,
            AnswerResult::RawAnswer {
                text: "vetted by experience and reviews".to_string(),
                matched_document_id: "2".to_string(),
            }
        );
        assert!(result.augmentation_skipped());

        // Failures are not cached, so the next attempt tries again
        orchestrator
            .answer("Are your contractors reliable?")
            .await
            .unwrap();
        assert_eq!(augmenter.calls(), 2);
        assert_eq!(orchestrator.cache_len(), 0);
    }
}

#[tokio::test]
async fn test_embedding_outage_falls_back() {
    let (embedder, augmenter, orchestrator) = setup(Behavior::Echo);
    orchestrator.load_corpus(&example_corpus()).await.unwrap();

    embedder.set_unavailable(true);
    let result = orchestrator.answer("plumbing cost").await.unwrap();

    assert_eq!(result, AnswerResult::Fallback);
    assert_eq!(result.text(), FALLBACK_MESSAGE);
    assert_eq!(augmenter.calls(), 0);

    embedder.set_unavailable(false);
    let result = orchestrator.answer("plumbing cost").await.unwrap();
    assert_eq!(result.matched_document_id(), Some("1"));
}

#[tokio::test]
async fn test_blank_question_makes_no_calls() {
    let (embedder, augmenter, orchestrator) = setup(Behavior::Echo);
    orchestrator.load_corpus(&example_corpus()).await.unwrap();
    let embed_calls = embedder.calls();

    for input in ["", "   ", "\n\t "] {
        assert_eq!(orchestrator.answer(input).await.unwrap(), AnswerResult::NoQuery);
    }

    assert_eq!(embedder.calls(), embed_calls);
    assert_eq!(augmenter.calls(), 0);
}

#[tokio::test]
async fn test_empty_corpus_is_no_match() {
    let (_, augmenter, orchestrator) = setup(Behavior::Echo);

    let result = orchestrator.answer("plumbing cost").await.unwrap();
    assert_eq!(result, AnswerResult::NoMatch);
    assert_eq!(result.text(), NO_MATCH_MESSAGE);

    assert_eq!(orchestrator.load_corpus(&[]).await.unwrap(), 0);
    assert_eq!(
        orchestrator.answer("plumbing cost").await.unwrap(),
        AnswerResult::NoMatch
    );
    assert_eq!(augmenter.calls(), 0);
}

#[tokio::test]
async fn test_best_score_below_threshold_is_no_match() {
    let config = FaqConfig {
        match_threshold: 0.5,
        ..Default::default()
    };
    let (_, augmenter, orchestrator) = setup_with(Behavior::Echo, config);
    orchestrator.load_corpus(&example_corpus()).await.unwrap();

    // No keyword overlap: every score is 0.0
    let result = orchestrator.answer("Do you work on weekends?").await.unwrap();
    assert_eq!(result, AnswerResult::NoMatch);

    // "cost" alone scores 1/sqrt(2) against entry 1
    let result = orchestrator.answer("What will it cost?").await.unwrap();
    assert_eq!(result.matched_document_id(), Some("1"));
    assert_eq!(augmenter.calls(), 1);
}

#[tokio::test]
async fn test_disabled_threshold_always_uses_best_match() {
    let (_, _, orchestrator) = setup(Behavior::Echo);
    orchestrator.load_corpus(&example_corpus()).await.unwrap();

    // All scores tie at 0.0; the first-loaded entry wins
    let result = orchestrator.answer("Do you work on weekends?").await.unwrap();
    assert_eq!(result.matched_document_id(), Some("1"));
}

#[tokio::test]
async fn test_equal_scores_prefer_earlier_entry() {
    let (_, _, orchestrator) = setup(Behavior::Echo);
    let corpus = vec![
        FaqEntry::new("a", "water heater lifetime", "first"),
        FaqEntry::new("b", "Water heater lifespan?", "second"),
    ];
    orchestrator.load_corpus(&corpus).await.unwrap();

    for _ in 0..3 {
        let result = orchestrator.answer("how long does a water heater last").await.unwrap();
        assert_eq!(result.matched_document_id(), Some("a"));
    }
}

#[tokio::test]
async fn test_rejected_corpus_leaves_previous_one_in_place() {
    let (embedder, _, orchestrator) = setup(Behavior::Echo);
    orchestrator.load_corpus(&example_corpus()).await.unwrap();
    orchestrator.answer("plumbing cost").await.unwrap();
    assert_eq!(orchestrator.corpus_size(), 2);

    let duplicate = vec![
        FaqEntry::new("x", "water heater", "a"),
        FaqEntry::new("x", "water heater again", "b"),
    ];
    let err = orchestrator.load_corpus(&duplicate).await.unwrap_err();
    assert!(matches!(err, AppError::DuplicateId(ref id) if id == "x"));

    let blank_question = vec![FaqEntry::new("y", "   ", "a")];
    let err = orchestrator.load_corpus(&blank_question).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidArgument(_)));

    let blank_id = vec![FaqEntry::new("", "water heater", "a")];
    assert!(orchestrator.load_corpus(&blank_id).await.is_err());

    embedder.set_unavailable(true);
    let err = orchestrator
        .load_corpus(&[FaqEntry::new("z", "water heater", "a")])
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::EmbeddingUnavailable(_)));
    embedder.set_unavailable(false);

    assert_eq!(orchestrator.corpus_size(), 2);
    assert_eq!(orchestrator.cache_len(), 1);
    let result = orchestrator.answer("plumbing cost").await.unwrap();
    assert_eq!(result.matched_document_id(), Some("1"));
}

#[tokio::test]
async fn test_reloading_corpus_clears_cache() {
    let (_, augmenter, orchestrator) = setup(Behavior::Echo);
    orchestrator.load_corpus(&example_corpus()).await.unwrap();
    orchestrator.answer("plumbing cost").await.unwrap();
    assert_eq!(orchestrator.cache_len(), 1);

    let updated = vec![FaqEntry::new("1", "average cost of plumbing", "$120-$250")];
    assert_eq!(orchestrator.load_corpus(&updated).await.unwrap(), 1);
    assert_eq!(orchestrator.cache_len(), 0);

    let result = orchestrator.answer("plumbing cost").await.unwrap();
    assert_eq!(result.text(), "$120-$250");
    assert_eq!(augmenter.calls(), 2);
}

#[tokio::test]
async fn test_builtin_corpus_loads_with_trigram_embeddings() {
    let config = FaqConfig::default();
    let embedder = crate::embeddings::create_provider(&config.embedding).unwrap();
    let augmenter = Arc::new(StubAugmenter::new(Behavior::Echo));
    let orchestrator = FaqOrchestrator::new(embedder, augmenter, config).unwrap();

    let loaded = orchestrator
        .load_corpus(&crate::corpus::builtin_corpus())
        .await
        .unwrap();
    assert_eq!(loaded, 3);

    let result = orchestrator
        .answer("When should I replace my water heater?")
        .await
        .unwrap();
    assert_eq!(result.matched_document_id(), Some("3"));
}

#[test]
fn test_answer_result_json_shape() {
    let result = AnswerResult::Augmented {
        text: "$100-$200".to_string(),
        matched_document_id: "1".to_string(),
    };
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"type": "augmented", "text": "$100-$200", "matched_document_id": "1"})
    );

    let json = serde_json::to_value(AnswerResult::NoMatch).unwrap();
    assert_eq!(json, serde_json::json!({"type": "no_match"}));
}
