//! Detail panel timing tests
//!
//! Run with paused tokio time, so the 200 ms hide delay and the simulated
//! markdown latency are deterministic.

mod common;

use std::time::Duration;

use common::{MemorySource, article};
use gallery::prelude::*;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[test_log::test(tokio::test(start_paused = true))]
async fn test_reenter_within_delay_keeps_panel() {
    let source = MemorySource::default();
    let item = Item::new("a").with_summary("hello");
    let mut panel = DetailPanel::new();

    assert!(panel.hover(&item, &source).is_none());
    panel.leave();
    assert!(panel.timer_armed());
    tokio::time::sleep(ms(100)).await;
    panel.hover(&item, &source);
    assert!(!panel.timer_armed());

    tokio::time::sleep(ms(500)).await;
    assert!(panel.is_shown());
}

#[test_log::test(tokio::test(start_paused = true))]
async fn test_leave_hides_after_delay() {
    let source = MemorySource::default();
    let item = Item::new("a").with_title("A");
    let mut panel = DetailPanel::new();

    panel.hover(&item, &source);
    panel.leave();
    tokio::time::sleep(ms(150)).await;
    assert!(panel.is_shown(), "hidden before the delay elapsed");
    tokio::time::sleep(ms(100)).await;
    assert!(!panel.is_shown());
    assert!(!panel.timer_armed());
}

#[test_log::test(tokio::test(start_paused = true))]
async fn test_pointer_on_panel_keeps_it_open() {
    let source = MemorySource::default();
    let item = Item::new("a");
    let mut panel = DetailPanel::new();

    panel.hover(&item, &source);
    panel.leave();
    tokio::time::sleep(ms(50)).await;
    panel.enter_panel();
    tokio::time::sleep(ms(1000)).await;
    assert!(panel.is_shown());

    panel.leave_panel();
    tokio::time::sleep(ms(250)).await;
    assert!(!panel.is_shown());
}

#[test_log::test(tokio::test(start_paused = true))]
async fn test_markdown_summary_loads() -> anyhow::Result<()> {
    let source = MemorySource::new(vec![]).with_text(
        "/content/a.md",
        "# Title\nfirst line\n\nsecond line\nthird\nfourth",
        ms(50),
    );
    let item = article("a").with_summary("ignored when markdown exists");
    let mut panel = DetailPanel::new();

    let task = panel.hover(&item, &source).expect("summary task");
    assert_eq!(
        panel.content().map(|c| c.summary),
        Some(SummaryText::Loading("/content/a.md".into()))
    );
    task.await?;
    let content = panel.content().expect("content");
    assert_eq!(
        content.summary,
        SummaryText::Text("first line second line third...".into())
    );
    Ok(())
}

#[test_log::test(tokio::test(start_paused = true))]
async fn test_failed_markdown_hides_summary() -> anyhow::Result<()> {
    let source = MemorySource::default();
    let item = article("missing");
    let mut panel = DetailPanel::new();

    panel.hover(&item, &source).expect("summary task").await?;
    assert_eq!(
        panel.content().map(|c| c.summary),
        Some(SummaryText::Hidden)
    );
    Ok(())
}

#[test_log::test(tokio::test(start_paused = true))]
async fn test_stale_summary_is_discarded() -> anyhow::Result<()> {
    let source = MemorySource::new(vec![]).with_text("/content/slow.md", "slow body", ms(500));
    let slow = article("slow");
    let fast = Item::new("fast").with_summary("fast summary");
    let mut panel = DetailPanel::new();

    let task = panel.hover(&slow, &source).expect("summary task");
    tokio::time::sleep(ms(10)).await;
    panel.leave();
    panel.hover(&fast, &source);
    task.await?;

    let content = panel.content().expect("content");
    assert_eq!(content.item_id, "fast");
    assert_eq!(content.summary, SummaryText::Text("fast summary".into()));
    assert_eq!(source.text_loads(), 1);
    Ok(())
}

#[test_log::test(tokio::test(start_paused = true))]
async fn test_drop_aborts_summary_load() {
    let source = MemorySource::new(vec![]).with_text("/content/a.md", "body", ms(10_000));
    let mut panel = DetailPanel::new();
    let task = panel.hover(&article("a"), &source).expect("summary task");
    drop(panel);
    let err = task.await.unwrap_err();
    assert!(err.is_cancelled());
}
