//! Tick delivery background task

use std::{sync::Arc, time::Duration};
use futures::stream::{self, BoxStream, Stream, StreamExt};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::state::{AppState, RunState};

/// Periodic tick source; the first tick arrives one period after subscribing
pub fn interval_ticks(period: Duration) -> BoxStream<'static, ()> {
    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    stream::unfold(interval, |mut interval| async move {
        interval.tick().await;
        Some(((), interval))
    })
    .boxed()
}

/// Background task that feeds ticks into the state while a countdown runs
/// or its alert is showing.
///
/// A fresh source is taken from `make_ticks` for every run and dropped as soon
/// as that run stops, expires or is replaced by a new start. While the alert
/// is up, a separate source republishes the alert so its pulse keeps moving.
pub async fn tick_task<F, S>(state: Arc<AppState>, mut make_ticks: F)
where
    F: FnMut() -> S,
    S: Stream<Item = ()> + Unpin,
{
    info!("Starting tick task");

    let mut snapshots = state.watch_snapshots();

    loop {
        // Wait for a run or an alert
        if snapshots.wait_for(|snapshot| snapshot.state != RunState::Idle).await.is_err() {
            warn!("Snapshot channel closed, stopping tick task");
            return;
        }
        let (phase, run) = {
            let snapshot = snapshots.borrow_and_update();
            (snapshot.state, snapshot.run)
        };

        debug!("Run {} is {}, subscribing to ticks", run, phase);
        let mut ticks = make_ticks();

        loop {
            tokio::select! {
                // Run changes win over ticks so a replaced run never takes a stale tick
                biased;

                changed = snapshots.changed() => {
                    if changed.is_err() {
                        warn!("Snapshot channel closed, stopping tick task");
                        return;
                    }
                    let left = {
                        let snapshot = snapshots.borrow_and_update();
                        snapshot.state != phase || snapshot.run != run
                    };
                    if left {
                        break;
                    }
                }

                tick = ticks.next() => match tick {
                    Some(()) => {
                        let applied = match phase {
                            RunState::Running => state.tick().map(|_| ()),
                            _ => state.refresh_alert().map(|_| ()),
                        };
                        if let Err(e) = applied {
                            error!("Failed to apply tick: {}", e);
                        }
                    }
                    None => {
                        warn!("Tick source ended during run {}", run);
                        let left = snapshots
                            .wait_for(|snapshot| snapshot.state != phase || snapshot.run != run)
                            .await;
                        if left.is_err() {
                            return;
                        }
                        break;
                    }
                },
            }
        }

        debug!("Run {} left {}, dropping tick subscription", run, phase);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::channel::mpsc;
    use tokio::time::timeout;

    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::state::Minutes;

    fn shared_state() -> Arc<AppState> {
        Arc::new(AppState::new(0, "127.0.0.1".to_string(), Minutes::default()))
    }

    fn from_pool(
        mut pool: Vec<mpsc::UnboundedReceiver<()>>,
    ) -> impl FnMut() -> BoxStream<'static, ()> {
        move || match pool.pop() {
            Some(rx) => rx.boxed(),
            None => stream::pending().boxed(),
        }
    }

    /// Like `from_pool`, but also counts how many sources were handed out
    fn counting_pool(
        pool: Vec<mpsc::UnboundedReceiver<()>>,
    ) -> (impl FnMut() -> BoxStream<'static, ()>, Arc<AtomicUsize>) {
        let made = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&made);
        let mut next = from_pool(pool);
        let factory = move || {
            counter.fetch_add(1, Ordering::SeqCst);
            next()
        };
        (factory, made)
    }

    async fn until(mut check: impl FnMut() -> bool) -> bool {
        timeout(Duration::from_secs(5), async {
            while !check() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .is_ok()
    }

    #[tokio::test]
    async fn injected_ticks_drive_run_to_expiry() {
        let state = shared_state();
        let (tx, rx) = mpsc::unbounded();
        let task = tokio::spawn(tick_task(Arc::clone(&state), from_pool(vec![rx])));

        let mut snapshots = state.watch_snapshots();
        state.start(Some(1)).unwrap();
        for _ in 0..60 {
            tx.unbounded_send(()).unwrap();
        }

        let reached = timeout(
            Duration::from_secs(5),
            snapshots.wait_for(|snapshot| snapshot.state == RunState::Expired),
        )
        .await
        .map(|result| result.is_ok());
        assert!(matches!(reached, Ok(true)));

        // The subscription is released once the run expires
        let released = timeout(Duration::from_secs(5), async {
            while !tx.is_closed() {
                tokio::task::yield_now().await;
            }
        })
        .await;
        assert!(released.is_ok());
        assert_eq!(state.run_state(), Ok(RunState::Expired));

        task.abort();
    }

    #[tokio::test]
    async fn stop_drops_subscription_and_restart_takes_a_new_one() {
        let state = shared_state();
        let (first_tx, first_rx) = mpsc::unbounded();
        let (second_tx, second_rx) = mpsc::unbounded();
        let task = tokio::spawn(tick_task(
            Arc::clone(&state),
            from_pool(vec![second_rx, first_rx]),
        ));

        let mut snapshots = state.watch_snapshots();
        state.start(Some(1)).unwrap();
        for _ in 0..3 {
            first_tx.unbounded_send(()).unwrap();
        }
        let reached = timeout(
            Duration::from_secs(5),
            snapshots.wait_for(|snapshot| snapshot.remaining_seconds == Some(57)),
        )
        .await
        .map(|result| result.is_ok());
        assert!(matches!(reached, Ok(true)));

        state.stop().unwrap();
        let released = timeout(Duration::from_secs(5), async {
            while !first_tx.is_closed() {
                tokio::task::yield_now().await;
            }
        })
        .await;
        assert!(released.is_ok());

        state.start(Some(1)).unwrap();
        second_tx.unbounded_send(()).unwrap();
        let reached = timeout(
            Duration::from_secs(5),
            snapshots.wait_for(|snapshot| snapshot.remaining_seconds == Some(59)),
        )
        .await
        .map(|result| result.is_ok());
        assert!(matches!(reached, Ok(true)));

        task.abort();
    }

    #[tokio::test]
    async fn back_to_back_stop_and_start_takes_a_fresh_source() {
        let state = shared_state();
        let (first_tx, first_rx) = mpsc::unbounded();
        let (second_tx, second_rx) = mpsc::unbounded();
        let (factory, made) = counting_pool(vec![second_rx, first_rx]);
        let task = tokio::spawn(tick_task(Arc::clone(&state), factory));

        state.start(Some(1)).unwrap();
        assert!(until(|| made.load(Ordering::SeqCst) == 1).await);

        // No yield between stop and start: the task only sees the final snapshot
        state.stop().unwrap();
        state.start(Some(1)).unwrap();
        let _ = first_tx.unbounded_send(());

        assert!(until(|| made.load(Ordering::SeqCst) == 2 && first_tx.is_closed()).await);
        assert_eq!(state.snapshot().unwrap().remaining_seconds, Some(60));

        let mut snapshots = state.watch_snapshots();
        second_tx.unbounded_send(()).unwrap();
        let reached = timeout(
            Duration::from_secs(5),
            snapshots.wait_for(|snapshot| snapshot.remaining_seconds == Some(59)),
        )
        .await
        .map(|result| result.is_ok());
        assert!(matches!(reached, Ok(true)));
        assert_eq!(state.snapshot().unwrap().run, 2);

        task.abort();
    }

    #[tokio::test]
    async fn alert_keeps_refreshing_until_acknowledged() {
        let state = shared_state();
        let (run_tx, run_rx) = mpsc::unbounded();
        let (alert_tx, alert_rx) = mpsc::unbounded();
        let (factory, made) = counting_pool(vec![alert_rx, run_rx]);
        let task = tokio::spawn(tick_task(Arc::clone(&state), factory));

        state.start(Some(1)).unwrap();
        for _ in 0..60 {
            run_tx.unbounded_send(()).unwrap();
        }
        assert!(until(|| made.load(Ordering::SeqCst) == 2).await);
        assert!(run_tx.is_closed());

        let mut snapshots = state.watch_snapshots();
        snapshots.borrow_and_update();
        alert_tx.unbounded_send(()).unwrap();
        let changed = timeout(Duration::from_secs(5), snapshots.changed()).await;
        assert!(matches!(changed, Ok(Ok(()))));
        let refreshed = snapshots.borrow_and_update().clone();
        assert!(refreshed.is_expired());
        assert!(refreshed.alert.is_some());

        state.acknowledge().unwrap();
        assert!(until(|| alert_tx.is_closed()).await);

        task.abort();
    }
}
