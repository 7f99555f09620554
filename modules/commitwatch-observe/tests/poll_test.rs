//! Integration tests for the poll notifier: scan-from-head semantics,
//! independent cursors, timeout and cancellation bounds.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use commitwatch_events::{EventRecord, StreamId, UpdateRecord};
use commitwatch_observe::{CommitSink, PollNotifier, RecordError, WaitError, WaitOptions};

#[derive(Debug)]
struct Registered {
    username: String,
}

#[derive(Debug)]
struct Deactivated {
    username: String,
}

#[derive(Debug)]
struct UserReadModel {
    username: String,
}

fn registered(username: &str) -> EventRecord {
    EventRecord::new(
        StreamId::new(),
        Registered {
            username: username.into(),
        },
    )
}

fn fast_notifier() -> PollNotifier {
    PollNotifier::new().with_poll_interval(Duration::from_millis(10))
}

fn opts(deadline_ms: u64) -> WaitOptions {
    WaitOptions::new().with_deadline(Duration::from_millis(deadline_ms))
}

// =========================================================================
// Matching
// =========================================================================

#[tokio::test]
async fn finds_record_committed_before_the_wait() {
    let notifier = fast_notifier();
    notifier
        .record_commit(vec![registered("jane")], vec![])
        .unwrap();

    let matched = notifier
        .wait_for(|e: &Registered| e.username == "jane", opts(500))
        .await
        .unwrap();

    assert_eq!(matched.username, "jane");
}

#[tokio::test]
async fn finds_record_committed_while_waiting() {
    let notifier = Arc::new(fast_notifier());

    let producer = {
        let notifier = Arc::clone(&notifier);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            notifier
                .record_commit(vec![registered("jane")], vec![])
                .unwrap();
        })
    };

    let matched = notifier
        .wait_for(|e: &Registered| e.username == "jane", opts(2_000))
        .await
        .unwrap();

    assert_eq!(matched.username, "jane");
    producer.await.unwrap();
}

#[tokio::test]
async fn no_matching_record_times_out() {
    let notifier = fast_notifier();
    notifier
        .record_commit(vec![registered("jane")], vec![])
        .unwrap();

    let outcome = notifier
        .wait_for(|e: &Registered| e.username == "bob", opts(200))
        .await;

    assert!(matches!(outcome, Err(WaitError::TimedOut { .. })));
}

#[tokio::test]
async fn wrong_type_is_skipped_not_matched() {
    let notifier = fast_notifier();
    notifier
        .record_commit(
            vec![EventRecord::new(
                StreamId::new(),
                Deactivated {
                    username: "jane".into(),
                },
            )],
            vec![],
        )
        .unwrap();

    // Same field value, different type: must not match.
    let outcome = notifier
        .wait_for(|e: &Registered| e.username == "jane", opts(100))
        .await;

    assert!(matches!(outcome, Err(WaitError::TimedOut { .. })));
}

#[tokio::test]
async fn projection_updates_are_observable() {
    let notifier = fast_notifier();
    notifier
        .record_commit(
            vec![registered("jane")],
            vec![UpdateRecord::new(UserReadModel {
                username: "jane".into(),
            })],
        )
        .unwrap();

    let matched = notifier
        .wait_for(|u: &UserReadModel| u.username == "jane", opts(500))
        .await
        .unwrap();

    assert_eq!(matched.username, "jane");
}

// =========================================================================
// Cursor semantics
// =========================================================================

#[tokio::test]
async fn satisfied_predicate_matches_again_on_a_fresh_wait() {
    let notifier = fast_notifier();
    notifier
        .record_commit(vec![registered("jane")], vec![])
        .unwrap();

    for _ in 0..2 {
        let matched = notifier
            .wait_for(|e: &Registered| e.username == "jane", opts(500))
            .await
            .unwrap();
        assert_eq!(matched.username, "jane");
    }
}

#[tokio::test]
async fn each_record_is_scanned_at_most_once_per_waiter() {
    let notifier = fast_notifier();
    notifier
        .record_commit(
            vec![registered("ada"), registered("bea"), registered("cal")],
            vec![],
        )
        .unwrap();

    // Predicate never matches; count how often it runs. Three records,
    // many poll rounds within the deadline, each record tested once.
    let tested = Arc::new(AtomicUsize::new(0));
    let outcome = {
        let tested = Arc::clone(&tested);
        notifier
            .wait_for(
                move |_: &Registered| {
                    tested.fetch_add(1, Ordering::SeqCst);
                    false
                },
                opts(200),
            )
            .await
    };

    assert!(matches!(outcome, Err(WaitError::TimedOut { .. })));
    assert_eq!(tested.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn records_appended_between_polls_are_not_skipped() {
    let notifier = Arc::new(fast_notifier());

    let producer = {
        let notifier = Arc::clone(&notifier);
        tokio::spawn(async move {
            for name in ["ada", "bea", "jane"] {
                notifier.record_commit(vec![registered(name)], vec![]).unwrap();
                tokio::time::sleep(Duration::from_millis(25)).await;
            }
        })
    };

    let seen = Arc::new(AtomicUsize::new(0));
    let matched = {
        let seen = Arc::clone(&seen);
        notifier
            .wait_for(
                move |e: &Registered| {
                    seen.fetch_add(1, Ordering::SeqCst);
                    e.username == "jane"
                },
                opts(2_000),
            )
            .await
            .unwrap()
    };

    assert_eq!(matched.username, "jane");
    // All three commits were scanned, none twice.
    assert_eq!(seen.load(Ordering::SeqCst), 3);
    producer.await.unwrap();
}

// =========================================================================
// Concurrent waiters
// =========================================================================

#[tokio::test]
async fn one_commit_satisfies_two_independent_waiters() {
    let notifier = Arc::new(fast_notifier());

    let jane_wait = {
        let notifier = Arc::clone(&notifier);
        tokio::spawn(async move {
            notifier
                .wait_for(|e: &Registered| e.username == "jane", opts(2_000))
                .await
        })
    };
    let any_wait = {
        let notifier = Arc::clone(&notifier);
        tokio::spawn(async move {
            notifier
                .wait_for(|e: &Registered| e.username.contains('a'), opts(2_000))
                .await
        })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    notifier
        .record_commit(vec![registered("jane")], vec![])
        .unwrap();

    // Independent cursors: neither waiter steals the record from the other.
    let jane = jane_wait.await.unwrap().unwrap();
    let any = any_wait.await.unwrap().unwrap();
    assert_eq!(jane.username, "jane");
    assert_eq!(any.username, "jane");
}

// =========================================================================
// Timeout and cancellation bounds
// =========================================================================

#[tokio::test]
async fn timeout_resolves_within_deadline_plus_scan_interval() {
    let notifier = PollNotifier::new().with_poll_interval(Duration::from_millis(50));

    let started = Instant::now();
    let outcome = notifier
        .wait_for(|_: &Registered| true, opts(100))
        .await;
    let elapsed = started.elapsed();

    assert!(matches!(outcome, Err(WaitError::TimedOut { .. })));
    // Deadline 100ms, interval 50ms, generous scheduling slack.
    assert!(elapsed < Duration::from_millis(500), "took {elapsed:?}");
}

#[tokio::test]
async fn cancellation_resolves_within_one_interval_and_notifier_survives() {
    let notifier = Arc::new(fast_notifier());
    let token = CancellationToken::new();

    let wait = {
        let notifier = Arc::clone(&notifier);
        let token = token.clone();
        tokio::spawn(async move {
            notifier
                .wait_for(
                    |_: &Registered| false,
                    WaitOptions::new()
                        .with_deadline(Duration::from_secs(5))
                        .with_cancellation(token),
                )
                .await
        })
    };

    tokio::time::sleep(Duration::from_millis(30)).await;
    let cancelled_at = Instant::now();
    token.cancel();

    let outcome = wait.await.unwrap();
    assert!(matches!(outcome, Err(WaitError::Cancelled)));
    assert!(cancelled_at.elapsed() < Duration::from_millis(200));

    // A cancelled wait must not poison later waits on the same notifier.
    notifier
        .record_commit(vec![registered("jane")], vec![])
        .unwrap();
    let matched = notifier
        .wait_for(|e: &Registered| e.username == "jane", opts(500))
        .await
        .unwrap();
    assert_eq!(matched.username, "jane");
}

#[tokio::test]
async fn default_ceiling_bounds_a_wait_with_no_deadline() {
    // Not waiting out the full 10s ceiling here; just pin down that an
    // unbounded-looking wait is still a bounded one.
    let outcome = tokio::time::timeout(
        Duration::from_millis(50),
        fast_notifier().wait_for(|_: &Registered| true, WaitOptions::new()),
    )
    .await;

    // Still waiting at 50ms: the ceiling, not an instant empty success.
    assert!(outcome.is_err());
}

// =========================================================================
// Shutdown
// =========================================================================

#[tokio::test]
async fn record_commit_after_shutdown_fails_loudly() {
    let notifier = fast_notifier();
    notifier
        .record_commit(vec![registered("jane")], vec![])
        .unwrap();

    notifier.shutdown();

    let err = notifier
        .record_commit(vec![registered("bob")], vec![])
        .unwrap_err();
    assert!(matches!(err, RecordError::Shutdown));

    // Records committed before shutdown stay observable.
    let matched = notifier
        .wait_for(|e: &Registered| e.username == "jane", opts(500))
        .await
        .unwrap();
    assert_eq!(matched.username, "jane");
}
