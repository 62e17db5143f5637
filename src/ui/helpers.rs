//! Helper functions shared across the UI layer: background fetch spawning
//! and panic capture for spawned tasks.

use crate::app::{App, AppEvent};
use crate::cache::FetchRequest;
use crate::feed::{fetch_stories, FetchOptions, Sources};
use chrono::NaiveDate;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Wraps a future to catch panics and convert them to errors.
///
/// Instead of the task silently disappearing (caught by Tokio's runtime but not
/// handled), panics are converted to `Err(String)` containing the panic message.
///
/// # Returns
///
/// - `Ok(result)` if the future completes normally
/// - `Err(panic_message)` if the future panics
pub(super) async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: std::future::Future<Output = T>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|panic| {
            if let Some(s) = panic.downcast_ref::<&'static str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                format!("Unknown panic: {:?}", (*panic).type_id())
            }
        })
}

/// Spawn one background fetch for `request`.
///
/// The task owns only a client clone and the event sender. It always reports
/// back, either with `DayFetched` or with `TaskPanicked`. `today` is the
/// latest published day, which decides whether the site is scraped.
pub(super) fn spawn_day_fetch(
    request: FetchRequest,
    client: reqwest::Client,
    sources: Sources,
    today: Option<NaiveDate>,
    options: FetchOptions,
    tx: mpsc::Sender<AppEvent>,
) -> JoinHandle<()> {
    let FetchRequest { date, generation } = request;

    tokio::spawn(async move {
        let tx_panic = tx.clone();
        match catch_task_panic(async {
            let result = fetch_stories(&client, &sources, date, today, options).await;
            if let Err(e) = tx
                .send(AppEvent::DayFetched {
                    date,
                    generation,
                    result,
                })
                .await
            {
                tracing::warn!(error = %e, event = "DayFetched", "Channel send failed (receiver dropped)");
            }
        })
        .await
        {
            Ok(()) => {}
            Err(panic_msg) => {
                tracing::error!(task = "fetch_day", %date, error = %panic_msg, "Fetch task panicked");
                let _ = tx_panic
                    .send(AppEvent::TaskPanicked {
                        task: "fetch_day",
                        date,
                        generation,
                        error: panic_msg,
                    })
                    .await;
            }
        }
    })
}

/// Start a task for every fetch the navigator queued since the last call.
///
/// A new request for a date that still has a running task replaces it; the
/// old task is aborted since its result would be stale anyway.
pub(super) fn spawn_pending_fetches(app: &mut App, tx: &mpsc::Sender<AppEvent>) {
    for request in app.nav.take_fetch_requests() {
        if let Some((previous, handle)) = app.fetch_handles.remove(&request.date) {
            tracing::debug!(date = %request.date, previous, "Aborting superseded fetch");
            handle.abort();
        }

        tracing::debug!(
            date = %request.date,
            generation = request.generation,
            "Spawning day fetch"
        );
        let handle = spawn_day_fetch(
            request,
            app.http_client.clone(),
            app.sources.clone(),
            app.nav.latest(),
            app.fetch_options,
            tx.clone(),
        );
        app.fetch_handles
            .insert(request.date, (request.generation, handle));
    }
}
