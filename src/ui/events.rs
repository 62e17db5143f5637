//! Background task event processing.

use crate::app::{App, AppEvent};
use crate::cache::FailureReason;
use crate::feed::FetchError;
use crate::model::Item;
use chrono::NaiveDate;

/// Apply one event from a background task to the application state.
pub(super) fn handle_app_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::DayFetched {
            date,
            generation,
            result,
        } => {
            handle_day_fetched(app, date, generation, result);
        }
        AppEvent::TaskPanicked {
            task,
            date,
            generation,
            error,
        } => {
            tracing::error!(task, %date, generation, error, "Background task panicked");
            app.release_fetch(date, generation);
            // The day would otherwise stay pending with nothing left to finish it
            app.nav
                .apply_fetch(date, generation, Err(FailureReason::NetworkError));
            app.set_status(format!("Internal error in {} task", task));
        }
    }
}

fn handle_day_fetched(
    app: &mut App,
    date: NaiveDate,
    generation: u64,
    result: Result<Vec<Item>, FetchError>,
) {
    // A refresh may already have replaced the handle with a newer task
    app.release_fetch(date, generation);

    let failure = match &result {
        Ok(_) => None,
        Err(e) => {
            tracing::warn!(%date, generation, error = %e, "Day fetch failed");
            Some(e.failure())
        }
    };

    let applied = app
        .nav
        .apply_fetch(date, generation, result.map_err(|e| e.failure()));

    if !applied {
        tracing::debug!(%date, generation, "Discarded stale fetch result");
        return;
    }

    if let Some(reason) = failure {
        if date == app.nav.current_date() {
            app.set_status(format!("{}: {}", date.format("%Y-%m-%d"), reason.describe()));
        }
    }
}
