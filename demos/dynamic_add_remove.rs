//! # Example: dynamic_add_remove
//!
//! Dynamically add and remove sources at runtime via the `Manager`.
//!
//! Demonstrates how to:
//! - Start the `Manager` (on a background task) with an initial source.
//! - From another async task ("controller"), add/remove sources over time.
//! - Stop the runtime and observe the graceful-shutdown result.
//!
//! ## Flow
//! ```text
//! main()
//!   ├─► spawn manager.run(token)
//!   │     └─► Worker per source ... publishes lifecycle events
//!   │
//!   └─► controller task
//!         ├─► manager.add_source(...)
//!         ├─► manager.remove_source(...)
//!         └─► manager.stop()
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example dynamic_add_remove
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use inflow::{
    Config, IngestError, LogWriter, Manager, MemorySink, Schedule, SinkRef, SourceFn, SourceRef,
    SourceSpec, Subscriber,
};

/// A source that reports which feed it polled.
fn feed(name: &'static str) -> SourceRef<String> {
    SourceFn::arc(name, move |_ctx: CancellationToken| async move {
        Ok::<String, IngestError>(format!("{name}: payload"))
    })
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let subs: Vec<Arc<dyn Subscriber>> = vec![Arc::new(LogWriter)];
    let manager = Arc::new(Manager::new(Config::default(), subs));

    let mem = Arc::new(MemorySink::new());
    let sink: SinkRef<String> = mem.clone();

    // Initial source: poll feed-a every 300ms.
    let key_a = manager
        .add_source(SourceSpec::new(
            feed("feed-a"),
            Schedule::Periodic {
                every: Duration::from_millis(300),
            },
            sink.clone(),
        ))
        .await?;

    let run = {
        let manager = Arc::clone(&manager);
        tokio::spawn(async move { manager.run(CancellationToken::new()).await })
    };

    // Controller: reshape the registry over time.
    {
        tokio::time::sleep(Duration::from_millis(500)).await;
        println!("[controller] add feed-b (periodic transactional)");
        let key_b = manager
            .add_source(SourceSpec::new(
                feed("feed-b"),
                Schedule::PeriodicTransactional {
                    every: Duration::from_millis(200),
                },
                sink.clone(),
            ))
            .await?;

        tokio::time::sleep(Duration::from_millis(600)).await;
        println!("[controller] remove {key_a}");
        manager.remove_source(key_a).await;

        tokio::time::sleep(Duration::from_millis(400)).await;
        println!("[controller] remove {key_b} and stop");
        manager.remove_source(key_b).await;
        manager.stop().await?;
    }

    run.await??;
    println!("[main] collected {} records", mem.len());
    Ok(())
}
