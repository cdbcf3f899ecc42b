mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{init_tracing, Script, ScriptedScorer};
use tokio::time::Instant;
use tutor_quiz::models::{HandwritingSample, QuestionId, ScoringTask, TaskId, TaskStatus};
use tutor_quiz::orchestrator::{poll_until_terminal, ScoringOrchestrator};
use tutor_quiz::QuestionCtx;

const INTERVAL: Duration = Duration::from_secs(1);

fn ctx() -> QuestionCtx {
    QuestionCtx::new(7, 5, 0, QuestionId("word-1".into()))
}

fn sample() -> HandwritingSample {
    HandwritingSample::from_data_url("data:image/png;base64,iVBORw==")
}

fn orchestrator(
    scorer: Arc<ScriptedScorer>,
) -> (
    ScoringOrchestrator,
    tokio::sync::mpsc::UnboundedReceiver<tutor_quiz::orchestrator::ScoringEvent>,
) {
    init_tracing();
    ScoringOrchestrator::with_settings(scorer, INTERVAL, 30)
}

#[tokio::test(start_paused = true)]
async fn test_never_terminal_task_fails_after_exactly_thirty_attempts() {
    let scorer = Arc::new(ScriptedScorer::new(Script::NeverFinish));
    let (orchestrator, mut rx) = orchestrator(scorer.clone());

    let started = Instant::now();
    let ack = orchestrator.submit(&ctx(), "词1", sample()).await;
    assert!(ack.accepted);
    orchestrator.wait_idle().await;

    let event = rx.try_recv().unwrap();
    assert_eq!(event.generation, 7);
    assert_eq!(event.task.id, ack.task_id);
    assert_eq!(event.task.status, TaskStatus::Failed);
    assert_eq!(event.task.attempts, 30);
    assert!(!event.task.outcome().unwrap().correct);
    assert_eq!(scorer.poll_count(), 30);
    assert!(started.elapsed() >= Duration::from_secs(30));
    assert!(rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_completed_status_delivers_payload() {
    let scorer = Arc::new(ScriptedScorer::new(Script::CompleteAfter {
        polls: 3,
        correct: true,
    }));
    let (orchestrator, mut rx) = orchestrator(scorer.clone());

    orchestrator.submit(&ctx(), "你好", sample()).await;
    orchestrator.wait_idle().await;

    let event = rx.try_recv().unwrap();
    assert_eq!(event.task.status, TaskStatus::Completed);
    assert_eq!(event.task.attempts, 3);
    let payload = event.task.outcome().unwrap();
    assert!(payload.correct);
    assert_eq!(payload.recognized.as_deref(), Some("你好"));
    assert_eq!(event.task.question_id, QuestionId("word-1".into()));
}

#[tokio::test(start_paused = true)]
async fn test_error_status_fails_without_exhausting_budget() {
    let scorer = Arc::new(ScriptedScorer::new(Script::ErrorAfter { polls: 2 }));
    let (orchestrator, mut rx) = orchestrator(scorer.clone());

    orchestrator.submit(&ctx(), "你好", sample()).await;
    orchestrator.wait_idle().await;

    let event = rx.try_recv().unwrap();
    assert_eq!(event.task.status, TaskStatus::Failed);
    assert_eq!(event.task.attempts, 2);
    assert_eq!(scorer.poll_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_transport_errors_count_toward_budget() {
    let scorer = Arc::new(ScriptedScorer::new(Script::TransportError));
    let (orchestrator, mut rx) = orchestrator(scorer.clone());

    orchestrator.submit(&ctx(), "你好", sample()).await;
    orchestrator.wait_idle().await;

    let event = rx.try_recv().unwrap();
    assert_eq!(event.task.status, TaskStatus::Failed);
    assert_eq!(event.task.attempts, 30);
    assert_eq!(scorer.poll_count(), 30);
}

#[tokio::test(start_paused = true)]
async fn test_submission_failure_is_delivered_immediately() {
    let scorer = Arc::new(ScriptedScorer::rejecting());
    let (orchestrator, mut rx) = orchestrator(scorer.clone());

    let ack = orchestrator.submit(&ctx(), "你好", sample()).await;
    assert!(!ack.accepted);
    assert!(ack.task_id.0.starts_with("local-failed-word-1-"));
    assert_eq!(orchestrator.in_flight(), 0);

    let event = rx.try_recv().unwrap();
    assert_eq!(event.task.id, ack.task_id);
    assert_eq!(event.task.status, TaskStatus::Failed);
    assert_eq!(event.task.attempts, 0);
    assert_eq!(scorer.poll_count(), 0);

    // 每次失败都合成新的任务ID
    let second = orchestrator.submit(&ctx(), "你好", sample()).await;
    assert_ne!(second.task_id, ack.task_id);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_tasks_poll_independently() {
    let scorer = Arc::new(ScriptedScorer::new(Script::CompleteAfter {
        polls: 2,
        correct: false,
    }));
    let (orchestrator, mut rx) = orchestrator(scorer.clone());

    for i in 0..3 {
        let ctx = QuestionCtx::new(1, 5, i, QuestionId(format!("word-{}", i)));
        orchestrator.submit(&ctx, "你好", sample()).await;
    }
    assert_eq!(orchestrator.in_flight(), 3);

    orchestrator.wait_idle().await;
    let mut delivered = Vec::new();
    while let Ok(event) = rx.try_recv() {
        delivered.push(event.task.question_id);
    }
    delivered.sort();
    assert_eq!(
        delivered,
        vec![
            QuestionId("word-0".into()),
            QuestionId("word-1".into()),
            QuestionId("word-2".into())
        ]
    );
    assert_eq!(scorer.poll_count(), 6);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_all_stops_polling() {
    let scorer = Arc::new(ScriptedScorer::new(Script::NeverFinish));
    let (orchestrator, mut rx) = orchestrator(scorer.clone());

    orchestrator.submit(&ctx(), "你好", sample()).await;
    assert_eq!(orchestrator.in_flight(), 1);

    tokio::time::sleep(Duration::from_millis(3500)).await;
    let polled = scorer.poll_count();
    assert_eq!(polled, 3);

    orchestrator.cancel_all();
    assert_eq!(orchestrator.in_flight(), 0);

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(scorer.poll_count(), polled);
    assert!(rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_poll_until_terminal_respects_custom_budget() {
    let scorer = ScriptedScorer::new(Script::NeverFinish);
    let mut task = ScoringTask::new(TaskId("t-9".into()), QuestionId("word-9".into()));
    task.begin_polling();

    let task = poll_until_terminal(&scorer, task, Duration::from_millis(10), 5).await;
    assert_eq!(task.status, TaskStatus::Failed);
    assert_eq!(task.attempts, 5);
    assert_eq!(scorer.poll_count(), 5);
}
