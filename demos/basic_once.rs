//! # Example: basic_once
//!
//! Run a single one-shot source to completion and inspect the sink.
//!
//! Demonstrates how to:
//! - Build a `Manager` with the built-in `LogWriter` subscriber.
//! - Register a `Schedule::Once` source.
//! - Let the run loop go, then stop it from a controller task.
//!
//! ## Run
//! ```bash
//! cargo run --example basic_once
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use inflow::{
    Config, IngestError, LogWriter, Manager, MemorySink, Schedule, SinkRef, SourceFn, SourceRef,
    SourceSpec, Subscriber,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let subs: Vec<Arc<dyn Subscriber>> = vec![Arc::new(LogWriter)];
    let manager = Arc::new(Manager::new(Config::default(), subs));

    let mem = Arc::new(MemorySink::new());
    let sink: SinkRef<String> = mem.clone();

    let greeter: SourceRef<String> =
        SourceFn::arc("greeter", |_ctx: CancellationToken| async move {
            Ok::<String, IngestError>("hello from a one-shot source".to_string())
        });
    let key = manager
        .add_source(SourceSpec::new(greeter, Schedule::Once, sink))
        .await?;
    println!("[main] registered {key}");

    // Run in the background; cancel once the one-shot had time to finish.
    let token = CancellationToken::new();
    let run = {
        let manager = Arc::clone(&manager);
        let token = token.clone();
        tokio::spawn(async move { manager.run(token).await })
    };

    tokio::time::sleep(Duration::from_millis(200)).await;
    println!("[main] status: {:?}", manager.status(key).await);
    token.cancel();
    run.await??;

    println!("[main] sink contents: {:?}", mem.records());
    Ok(())
}
