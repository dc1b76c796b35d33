mod common;

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use common::{init_logging, original, pin, Pass, RecordingSink, ScriptedLauncher};
use pinboard_engine::{
    BoardScanner, BoardTarget, CollectedUrls, EngineConfig, RunContext, ScanError, ScanMode,
    ScanSettings, ScanStop, ScrollStrategy,
};
use pretty_assertions::assert_eq;

fn target(max: usize, mode: ScanMode) -> BoardTarget {
    BoardTarget {
        url: "https://www.pinterest.com/someone/board".to_string(),
        max_items: NonZeroUsize::new(max).unwrap(),
        destination: PathBuf::from("unused"),
        mode,
    }
}

fn settings() -> ScanSettings {
    EngineConfig::without_delays().scan
}

fn scanner(launcher: &ScriptedLauncher, settings: ScanSettings) -> BoardScanner {
    BoardScanner::new(Arc::new(launcher.clone()), settings)
}

#[tokio::test]
async fn stagnating_board_returns_fewer_than_requested() {
    init_logging();
    let a = pin("a", "236x");
    let b = pin("b", "474x");
    let c = pin("c", "564x");
    // Same probe every pass: the first one is the baseline, then four repeats.
    let launcher = ScriptedLauncher::new(vec![Pass::new(&[&a, &b, &c], 800)]);
    let sink = Arc::new(RecordingSink::new());
    let ctx = RunContext::new(sink.clone());

    let report = scanner(&launcher, settings())
        .scan(&target(5, ScanMode::FastLimit), &ctx)
        .await
        .unwrap();

    assert_eq!(report.urls, vec![original("a"), original("b"), original("c")]);
    assert_eq!(report.stop, ScanStop::Stagnated);

    let log = launcher.log();
    assert_eq!(log.probes, 5);
    assert_eq!(log.shutdowns, 1);
    assert_eq!(
        log.navigated,
        vec!["https://www.pinterest.com/someone/board".to_string()]
    );
    assert!(sink.statuses().contains(&"Found 3 / 5 pins...".to_string()));
}

#[tokio::test]
async fn movement_resets_the_stagnation_counter() {
    let a = pin("a", "236x");
    let b = pin("b", "236x");
    let launcher = ScriptedLauncher::new(vec![
        Pass::new(&[&a], 0),
        Pass::new(&[&a], 0),
        Pass::new(&[&a], 0),
        Pass::new(&[&a], 0),
        Pass::new(&[&a, &b], 900),
        Pass::new(&[&a, &b], 900),
    ]);
    let ctx = RunContext::new(Arc::new(RecordingSink::new()));

    let report = scanner(&launcher, settings())
        .scan(&target(10, ScanMode::FastLimit), &ctx)
        .await
        .unwrap();

    assert_eq!(report.urls, vec![original("a"), original("b")]);
    assert_eq!(report.stop, ScanStop::Stagnated);
    // 1 baseline + 3 repeats, move, then 4 repeats of the new position.
    assert_eq!(launcher.log().probes, 9);
}

#[tokio::test]
async fn scan_stops_at_target_and_truncates() {
    let sources: Vec<String> = (0..8).map(|i| pin(&format!("p{i}"), "236x")).collect();
    let refs: Vec<&str> = sources.iter().map(String::as_str).collect();
    let launcher = ScriptedLauncher::new(vec![Pass::new(&refs, 0)]);
    let ctx = RunContext::new(Arc::new(RecordingSink::new()));

    let report = scanner(&launcher, settings())
        .scan(&target(3, ScanMode::FastLimit), &ctx)
        .await
        .unwrap();

    assert_eq!(report.urls.len(), 3);
    assert_eq!(report.urls[0], original("p0"));
    assert_eq!(report.urls[2], original("p2"));
    assert_eq!(report.stop, ScanStop::TargetReached);
    assert!(launcher.log().scrolls.is_empty());
}

#[tokio::test]
async fn thumbnail_variants_collapse_to_one_entry() {
    let launcher = ScriptedLauncher::new(vec![
        Pass::new(&[&pin("x", "236x"), &pin("x", "474x"), &pin("x", "236x")], 0),
        Pass::new(&[&pin("x", "564x"), &pin("y", "236x")], 500),
        Pass::new(&[&pin("y", "474x")], 500),
    ]);
    let ctx = RunContext::new(Arc::new(RecordingSink::new()));

    let report = scanner(&launcher, settings())
        .scan(&target(10, ScanMode::FastLimit), &ctx)
        .await
        .unwrap();

    assert_eq!(report.urls, vec![original("x"), original("y")]);
}

#[tokio::test]
async fn ineligible_and_stale_elements_are_skipped() {
    let launcher = ScriptedLauncher::new(vec![Pass::new(
        &[
            "",
            "https://i.pinimg.com/75x75_RS/aa/avatar.jpg",
            "https://i.pinimg.com/profile_display/aa/me.jpg",
            "https://s.pinimg.com/webapp/logo.png",
            &pin("ok", "236x"),
        ],
        0,
    )
    .with_stale_element()]);
    let ctx = RunContext::new(Arc::new(RecordingSink::new()));

    let report = scanner(&launcher, settings())
        .scan(&target(1, ScanMode::FastLimit), &ctx)
        .await
        .unwrap();

    assert_eq!(report.urls, vec![original("ok")]);
}

#[tokio::test]
async fn strict_mode_stops_at_end_of_board() {
    let launcher = ScriptedLauncher::new(vec![
        Pass::new(&[&pin("only", "236x")], 0),
        Pass::new(&[&pin("only", "236x"), &pin("rail", "236x")], 700).with_end_marker(),
    ]);
    let sink = Arc::new(RecordingSink::new());
    let ctx = RunContext::new(sink.clone());

    let report = scanner(&launcher, settings())
        .scan(&target(2, ScanMode::StrictBoardOnly), &ctx)
        .await
        .unwrap();

    assert_eq!(report.urls, vec![original("only")]);
    assert_eq!(report.stop, ScanStop::EndOfBoard);
    assert!(sink
        .statuses()
        .contains(&"End of board detected. Stopping search.".to_string()));
    assert_eq!(launcher.log().shutdowns, 1);
}

#[tokio::test]
async fn fast_mode_ignores_end_marker() {
    let launcher = ScriptedLauncher::new(vec![
        Pass::new(&[&pin("only", "236x")], 0).with_end_marker(),
        Pass::new(&[&pin("only", "236x"), &pin("rail", "236x")], 700).with_end_marker(),
    ]);
    let ctx = RunContext::new(Arc::new(RecordingSink::new()));

    let report = scanner(&launcher, settings())
        .scan(&target(2, ScanMode::FastLimit), &ctx)
        .await
        .unwrap();

    assert_eq!(report.urls, vec![original("only"), original("rail")]);
    assert_eq!(launcher.log().marker_checks, 0);
}

#[tokio::test]
async fn scroll_strategy_comes_from_settings() {
    let launcher = ScriptedLauncher::new(vec![Pass::new(&[&pin("a", "236x")], 0)]);
    let ctx = RunContext::new(Arc::new(RecordingSink::new()));
    let mut settings = settings();
    settings.scroll_strategy = ScrollStrategy::DocumentEnd;
    settings.stagnation_threshold = 1;

    scanner(&launcher, settings)
        .scan(&target(5, ScanMode::FastLimit), &ctx)
        .await
        .unwrap();

    assert_eq!(
        launcher.log().scrolls,
        vec![ScrollStrategy::DocumentEnd, ScrollStrategy::DocumentEnd]
    );
}

#[tokio::test]
async fn launch_failure_is_a_browser_error() {
    let launcher = ScriptedLauncher::failing_launch();
    let ctx = RunContext::new(Arc::new(RecordingSink::new()));

    let err = scanner(&launcher, settings())
        .scan(&target(5, ScanMode::FastLimit), &ctx)
        .await
        .unwrap_err();

    assert!(matches!(err, ScanError::Browser(_)));
}

#[tokio::test]
async fn navigation_failure_still_tears_down_session() {
    let launcher = ScriptedLauncher::failing_navigation();
    let ctx = RunContext::new(Arc::new(RecordingSink::new()));

    let err = scanner(&launcher, settings())
        .scan(&target(5, ScanMode::FastLimit), &ctx)
        .await
        .unwrap_err();

    assert!(matches!(err, ScanError::Browser(_)));
    assert_eq!(launcher.log().shutdowns, 1);
}

#[tokio::test]
async fn cancelled_scan_fails_and_tears_down() {
    let launcher = ScriptedLauncher::new(vec![Pass::new(&[&pin("a", "236x")], 0)]);
    let ctx = RunContext::new(Arc::new(RecordingSink::new()));
    let mut settings = settings();
    settings.settle_delay = pinboard_engine::DelayRange::fixed(60_000);

    let scanner = scanner(&launcher, settings);
    let stopper = ctx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        stopper.cancel();
    });

    let err = tokio::time::timeout(
        Duration::from_secs(5),
        scanner.scan(&target(5, ScanMode::FastLimit), &ctx),
    )
    .await
    .expect("cancellation must interrupt the settle delay")
    .unwrap_err();

    assert_eq!(err, ScanError::Cancelled);
    assert_eq!(launcher.log().shutdowns, 1);
}

#[tokio::test]
async fn stop_interrupts_a_slow_navigation() {
    let launcher = ScriptedLauncher::new(vec![Pass::new(&[&pin("a", "236x")], 0)])
        .with_slow_navigation(Duration::from_secs(30));
    let ctx = RunContext::new(Arc::new(RecordingSink::new()));
    let scanner = scanner(&launcher, settings());
    let stopper = ctx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        stopper.cancel();
    });

    let err = tokio::time::timeout(
        Duration::from_secs(5),
        scanner.scan(&target(5, ScanMode::FastLimit), &ctx),
    )
    .await
    .expect("stop must not wait for the page to answer")
    .unwrap_err();

    let log = launcher.log();
    assert_eq!(err, ScanError::Cancelled);
    assert_eq!(log.navigated.len(), 1);
    assert_eq!(log.image_reads, 0);
    assert_eq!(log.shutdowns, 1);
}

#[test]
fn collected_urls_keep_first_seen_order() {
    let mut collected = CollectedUrls::new();
    assert!(collected.insert("b".into()));
    assert!(collected.insert("a".into()));
    assert!(!collected.insert("b".into()));
    assert_eq!(collected.len(), 2);
    assert_eq!(collected.into_limited(5), vec!["b".to_string(), "a".to_string()]);
}
