//! Lifecycle command
//!
//! Usage: logbridge lifecycle
//!
//! Drives an adapter over a direct sink through enable, a refused second
//! enable, disable and a refused re-enable, printing what each step observes.

use logbridge_core::{DirectSink, HandlerResult, LogAdapter, LogLevel};

/// Execute lifecycle command
pub fn execute() -> anyhow::Result<()> {
    let adapter = LogAdapter::new(DirectSink::new());
    let handler = |level: LogLevel, _: Option<&str>, message: &str| -> HandlerResult {
        println!("  handler <- [{}] {}", level, message);
        Ok(())
    };

    observe(&adapter, "start");

    adapter.enable(handler)?;
    observe(&adapter, "enable");
    adapter.sink().emit(LogLevel::Info, Some("lifecycle"), "first record");

    match adapter.enable(handler) {
        Ok(()) => anyhow::bail!("second enable unexpectedly succeeded"),
        Err(e) => println!("second enable refused: {}", e),
    }

    adapter.disable();
    observe(&adapter, "disable");
    let delivered = adapter
        .sink()
        .emit(LogLevel::Info, Some("lifecycle"), "after disable");
    println!("emit after disable delivered: {}", delivered);

    match adapter.enable(handler) {
        Ok(()) => anyhow::bail!("re-enable after disable unexpectedly succeeded"),
        Err(e) => println!("re-enable refused: {}", e),
    }
    observe(&adapter, "end");
    Ok(())
}

fn observe(adapter: &LogAdapter<DirectSink>, step: &str) {
    println!(
        "{}: phase={} is_enabled={} can_enable={}",
        step,
        adapter.phase(),
        adapter.is_enabled(),
        adapter.can_enable()
    );
}
