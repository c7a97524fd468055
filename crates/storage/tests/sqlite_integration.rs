use chrono::Duration;
use playtest_core::model::{
    AnswerKey, BlockId, GameMode, LuminariasTransaction, Question, QuestionContent, QuestionId,
    SessionOutcome, TopicId, TransactionKind, UserId,
};
use playtest_core::time::fixed_now;
use storage::repository::{
    AttemptRecord, AttemptRepository, LuminariasRepository, QuestionRepository, Storage,
    StorageError,
};
use storage::sqlite::SqliteRepository;

fn build_question(id: u64, block: u64) -> Question {
    let content = QuestionContent::new(
        format!("Pregunta {id}"),
        [
            "uno".to_string(),
            "dos".to_string(),
            "tres".to_string(),
            "cuatro".to_string(),
        ],
        AnswerKey::C,
        Some("porque sí".to_string()),
    )
    .unwrap();
    Question::new(
        QuestionId::new(id),
        BlockId::new(block),
        Some(TopicId::new(7)),
        content,
    )
}

fn attempt(user: u64, question: u64, answer: AnswerKey, minutes: i64) -> AttemptRecord {
    AttemptRecord {
        user_id: UserId::new(user),
        question_id: QuestionId::new(question),
        answer,
        correct: answer == AnswerKey::C,
        answered_at: fixed_now() + Duration::minutes(minutes),
    }
}

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

#[tokio::test]
async fn sqlite_roundtrip_keeps_content_and_order() {
    let repo = connect("memdb_questions").await;
    for id in [5, 2, 9] {
        repo.upsert_question(&build_question(id, 1)).await.unwrap();
    }
    repo.upsert_question(&build_question(3, 2)).await.unwrap();

    let questions = repo
        .questions_for_block(UserId::new(1), BlockId::new(1))
        .await
        .unwrap();
    let ids: Vec<u64> = questions.iter().map(|q| q.id().value()).collect();
    assert_eq!(ids, vec![2, 5, 9]);

    let first = &questions[0];
    assert_eq!(first.content().text(), "Pregunta 2");
    assert_eq!(first.content().option(AnswerKey::D), "cuatro");
    assert_eq!(first.content().correct(), AnswerKey::C);
    assert_eq!(first.content().explanation(), Some("porque sí"));
    assert_eq!(first.topic_id(), Some(TopicId::new(7)));
    assert!(!first.stats().is_attempted());

    assert_eq!(repo.count_block_questions(BlockId::new(1)).await.unwrap(), 3);
    assert_eq!(repo.count_block_questions(BlockId::new(99)).await.unwrap(), 0);
}

#[tokio::test]
async fn sqlite_keeps_true_false_questions() {
    let repo = connect("memdb_true_false").await;
    let content = QuestionContent::new(
        "El sol es una estrella",
        [
            "Verdadero".to_string(),
            "Falso".to_string(),
            String::new(),
            String::new(),
        ],
        AnswerKey::A,
        None,
    )
    .unwrap();
    let question = Question::new(QuestionId::new(1), BlockId::new(4), None, content);
    repo.upsert_question(&question).await.unwrap();

    let loaded = repo
        .questions_for_block(UserId::new(1), BlockId::new(4))
        .await
        .unwrap();
    assert_eq!(loaded, vec![question]);
    assert_eq!(loaded[0].content().available_options().count(), 2);
}

#[tokio::test]
async fn sqlite_attempts_fold_into_per_user_stats() {
    let repo = connect("memdb_attempts").await;
    repo.upsert_question(&build_question(1, 1)).await.unwrap();
    repo.upsert_question(&build_question(2, 1)).await.unwrap();

    repo.record_attempt(&attempt(1, 1, AnswerKey::A, 0)).await.unwrap();
    repo.record_attempt(&attempt(1, 1, AnswerKey::C, 1)).await.unwrap();
    let stats = repo
        .record_attempt(&attempt(1, 1, AnswerKey::C, 2))
        .await
        .unwrap();
    assert_eq!(stats.attempts_total(), 3);
    assert_eq!(stats.correct_total(), 2);

    let other_user = repo
        .question_stats(UserId::new(2), QuestionId::new(1))
        .await
        .unwrap();
    assert!(!other_user.is_attempted());

    let questions = repo
        .questions_for_block(UserId::new(1), BlockId::new(1))
        .await
        .unwrap();
    assert_eq!(questions[0].stats().attempts_total(), 3);
    assert!(!questions[1].stats().is_attempted());

    let err = repo
        .record_attempt(&attempt(1, 404, AnswerKey::C, 3))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::NotFound));
}

#[tokio::test]
async fn sqlite_ledger_balances_and_keeps_metadata() {
    let repo = connect("memdb_ledger").await;
    let user = UserId::new(3);
    let outcome = SessionOutcome::new(GameMode::Exam, 9, 10).with_victory(true);
    let reward = LuminariasTransaction::session_reward(user, &outcome, 40, fixed_now()).unwrap();
    repo.append_transaction(&reward).await.unwrap();

    let spend = LuminariasTransaction::new(
        user,
        TransactionKind::Spend,
        30,
        "user_spending",
        "shop",
        "buy_item",
        "avatar",
        fixed_now(),
    )
    .unwrap();
    repo.append_transaction(&spend).await.unwrap();
    assert_eq!(repo.balance(user).await.unwrap(), 10);
    assert_eq!(repo.balance(UserId::new(4)).await.unwrap(), 0);

    let err = repo.append_transaction(&spend).await.unwrap_err();
    assert!(matches!(
        err,
        StorageError::InsufficientBalance {
            balance: 10,
            requested: 30
        }
    ));

    let history = repo.list_transactions(user, 10).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].transaction.kind(), TransactionKind::Spend);
    let earned = &history[1].transaction;
    assert_eq!(earned.action_type(), "complete_session");
    let metadata = earned.metadata().expect("metadata");
    assert_eq!(metadata.game_mode, GameMode::Exam);
    assert_eq!(metadata.correct_answers, 9);
    assert!(metadata.victory);

    let limited = repo.list_transactions(user, 1).await.unwrap();
    assert_eq!(limited.len(), 1);
}

#[tokio::test]
async fn storage_sqlite_wires_all_repositories() {
    let storage = Storage::sqlite("sqlite:file:memdb_storage?mode=memory&cache=shared")
        .await
        .expect("storage");
    storage
        .questions
        .upsert_question(&build_question(1, 4))
        .await
        .unwrap();
    storage
        .attempts
        .record_attempt(&attempt(1, 1, AnswerKey::C, 0))
        .await
        .unwrap();
    let questions = storage
        .questions
        .questions_for_block(UserId::new(1), BlockId::new(4))
        .await
        .unwrap();
    assert_eq!(questions[0].stats().correct_total(), 1);
    assert_eq!(storage.luminarias.balance(UserId::new(1)).await.unwrap(), 0);
}
