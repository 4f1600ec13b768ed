//! Delayed auto-advance of the session selection.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;

use scanventory_session::ScanSession;

/// How long the selection lingers before moving to the next item.
pub const DEFAULT_ADVANCE_DELAY: Duration = Duration::from_millis(600);

/// Schedules the post-update selection advance.
///
/// The session itself never blocks: after an update it reports where the
/// selection should go and the caller arms this timer. Rescheduling or
/// dropping the timer aborts the armed task, and a task that fires after the
/// user already moved on is a no-op thanks to
/// [`ScanSession::advance_selection_from`].
#[derive(Debug)]
pub struct AutoAdvanceTimer {
    delay: Duration,
    task: Option<JoinHandle<()>>,
}

impl AutoAdvanceTimer {
    pub fn new() -> Self {
        Self::with_delay(DEFAULT_ADVANCE_DELAY)
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self { delay, task: None }
    }

    /// Arm the timer to advance the selection from `index` after the delay.
    /// Any previously armed advance is cancelled.
    pub fn schedule(&mut self, session: Arc<Mutex<ScanSession>>, index: usize) {
        self.cancel();
        let delay = self.delay;
        self.task = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut session = session.lock().unwrap_or_else(PoisonError::into_inner);
            if session.advance_selection_from(index) {
                tracing::debug!(from = index, "selection auto-advanced");
            }
        }));
    }

    /// Abort the armed advance, if any.
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Default for AutoAdvanceTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for AutoAdvanceTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use scanventory_recognition::RecognizedItem;

    use super::*;

    fn shared_session(names: &[&str], selected: usize) -> Arc<Mutex<ScanSession>> {
        let mut session = ScanSession::new(
            names.iter().map(|n| RecognizedItem::new(*n)).collect(),
        );
        session.select(selected).unwrap();
        Arc::new(Mutex::new(session))
    }

    fn selected(session: &Arc<Mutex<ScanSession>>) -> Option<usize> {
        session.lock().unwrap().selected()
    }

    #[tokio::test(start_paused = true)]
    async fn the_selection_advances_after_the_delay() {
        let session = shared_session(&["A", "B", "C"], 0);
        let mut timer = AutoAdvanceTimer::new();

        timer.schedule(session.clone(), 0);
        assert_eq!(selected(&session), Some(0));

        tokio::time::sleep(DEFAULT_ADVANCE_DELAY + Duration::from_millis(50)).await;
        assert_eq!(selected(&session), Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn cancelling_prevents_the_advance() {
        let session = shared_session(&["A", "B"], 0);
        let mut timer = AutoAdvanceTimer::new();

        timer.schedule(session.clone(), 0);
        timer.cancel();

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(selected(&session), Some(0));
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_timer_aborts_the_armed_advance() {
        let session = shared_session(&["A", "B"], 0);
        {
            let mut timer = AutoAdvanceTimer::new();
            timer.schedule(session.clone(), 0);
        }

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(selected(&session), Some(0));
    }

    #[tokio::test(start_paused = true)]
    async fn a_stale_timer_does_not_fight_the_user() {
        let session = shared_session(&["A", "B", "C"], 0);
        let mut timer = AutoAdvanceTimer::new();

        timer.schedule(session.clone(), 0);
        // The user jumps ahead before the timer fires.
        session.lock().unwrap().select(2).unwrap();

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(selected(&session), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn rescheduling_restarts_the_delay() {
        let session = shared_session(&["A", "B", "C"], 1);
        let mut timer = AutoAdvanceTimer::with_delay(Duration::from_millis(100));

        timer.schedule(session.clone(), 1);
        tokio::time::sleep(Duration::from_millis(50)).await;
        timer.schedule(session.clone(), 1);

        // The first arming would have fired by now; it was aborted.
        tokio::time::sleep(Duration::from_millis(70)).await;
        assert_eq!(selected(&session), Some(1));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(selected(&session), Some(2));
    }
}
