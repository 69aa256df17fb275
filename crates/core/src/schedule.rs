//! Boundary-aligned scheduling for the update loops.
//!
//! Ticks fire on wall-clock multiples of the cadence (counted from the
//! epoch), not on a free-running interval, so restarts don't drift the
//! update times. Two independent loops run concurrently with different
//! cadences; they are deliberately uncoordinated.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use log::{debug, error, info, warn};
use tokio::sync::watch;

use crate::errors::UpdateError;
use crate::host::ChannelHost;

/// Wait between connectivity rechecks when the host is disconnected at a
/// boundary.
pub const RECONNECT_BACKOFF: Duration = Duration::from_secs(180);

/// Seconds since the epoch, as a float.
pub fn epoch_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

/// Delay until the next multiple of `cadence_secs` since the epoch.
///
/// Landing exactly on a boundary yields a full cadence, never zero.
pub fn until_next_boundary(cadence_secs: u64, now_secs: f64) -> Duration {
    let cadence = cadence_secs as f64;
    Duration::from_secs_f64(cadence - (now_secs % cadence))
}

/// Sleep until `deadline` unless shutdown is requested first.
///
/// Watch notifications carrying `false` (an embedder re-sending the
/// initial value) are absorbed and the sleep resumes for the remaining
/// time; they never cut the wait short. Returns `false` on shutdown.
async fn sleep_until_unless_shutdown(
    deadline: tokio::time::Instant,
    shutdown: &mut watch::Receiver<bool>,
) -> bool {
    loop {
        tokio::select! {
            _ = tokio::time::sleep_until(deadline) => return true,
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    return false;
                }
            }
        }
    }
}

/// Run `tick` once per cadence boundary until shutdown.
///
/// If the host is disconnected when a boundary fires, the loop backs off
/// [`RECONNECT_BACKOFF`] and rechecks instead of busy-looping or dying.
/// Tick errors are logged here and never terminate the loop; error
/// containment inside a tick is the tick's own job. Shutdown interrupts
/// the sleeps but lets a running tick finish.
pub async fn run_on_boundaries<F, Fut>(
    cadence_secs: u64,
    host: Arc<dyn ChannelHost>,
    mut shutdown: watch::Receiver<bool>,
    name: &str,
    mut tick: F,
) where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<(), UpdateError>>,
{
    info!("{} loop starting with {}s cadence", name, cadence_secs);
    loop {
        let delay = until_next_boundary(cadence_secs, epoch_now());
        debug!(
            "sleeping {:.1}s until next {} boundary",
            delay.as_secs_f64(),
            name
        );
        let boundary = tokio::time::Instant::now() + delay;
        if !sleep_until_unless_shutdown(boundary, &mut shutdown).await {
            info!("{} loop stopping", name);
            return;
        }

        while !host.is_connected() {
            warn!("{} update deferred, host disconnected", name);
            let recheck = tokio::time::Instant::now() + RECONNECT_BACKOFF;
            if !sleep_until_unless_shutdown(recheck, &mut shutdown).await {
                info!("{} loop stopping", name);
                return;
            }
        }

        if let Err(err) = tick().await {
            error!("{} update failed: {}", name, err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_boundary_delay_mid_interval() {
        let delay = until_next_boundary(3600, 5000.0);
        assert!((delay.as_secs_f64() - 2200.0).abs() < 1e-6);
    }

    #[test]
    fn test_boundary_delay_on_boundary_is_full_cadence() {
        let delay = until_next_boundary(1800, 3600.0);
        assert!((delay.as_secs_f64() - 1800.0).abs() < 1e-6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_false_notification_does_not_shorten_the_sleep() {
        let (tx, mut rx) = watch::channel(false);
        let start = tokio::time::Instant::now();
        let deadline = start + Duration::from_secs(30);

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            let _ = tx.send(false);
            // Keep the sender alive past the deadline.
            tokio::time::sleep(Duration::from_secs(60)).await;
        });

        assert!(sleep_until_unless_shutdown(deadline, &mut rx).await);
        assert_eq!(start.elapsed(), Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_interrupts_the_sleep() {
        let (tx, mut rx) = watch::channel(false);
        let start = tokio::time::Instant::now();
        let deadline = start + Duration::from_secs(30);

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            let _ = tx.send(true);
        });

        assert!(!sleep_until_unless_shutdown(deadline, &mut rx).await);
        assert_eq!(start.elapsed(), Duration::from_secs(5));
    }

    struct AlwaysConnected;

    #[async_trait::async_trait]
    impl ChannelHost for AlwaysConnected {
        fn is_connected(&self) -> bool {
            true
        }
        async fn list_channels(
            &self,
            _category: u64,
        ) -> Result<Vec<crate::host::ChannelInfo>, crate::host::HostError> {
            Ok(Vec::new())
        }
        async fn create_channel(
            &self,
            _category: u64,
            _name: &str,
            _position: usize,
        ) -> Result<u64, crate::host::HostError> {
            Ok(0)
        }
        async fn rename_channel(
            &self,
            _channel: u64,
            _name: &str,
        ) -> Result<(), crate::host::HostError> {
            Ok(())
        }
        async fn reposition_channel(
            &self,
            _channel: u64,
            _position: usize,
        ) -> Result<(), crate::host::HostError> {
            Ok(())
        }
        async fn delete_channel(&self, _channel: u64) -> Result<(), crate::host::HostError> {
            Ok(())
        }
        async fn send_message(
            &self,
            _channel: u64,
            _text: &str,
        ) -> Result<(), crate::host::HostError> {
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_ticks_and_survives_tick_errors() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let (stop_tx, stop_rx) = watch::channel(false);
        let host: Arc<dyn ChannelHost> = Arc::new(AlwaysConnected);

        let counter = ticks.clone();
        let loop_handle = tokio::spawn(async move {
            run_on_boundaries(10, host, stop_rx, "test", move || {
                let counter = counter.clone();
                async move {
                    let n = counter.fetch_add(1, Ordering::SeqCst);
                    if n == 0 {
                        // The first tick fails; the loop must keep going.
                        Err(UpdateError::Host(crate::host::HostError::new(
                            "create",
                            "boom",
                        )))
                    } else {
                        Ok(())
                    }
                }
            })
            .await;
        });

        // Paused time auto-advances through the sleeps; give the loop a
        // few boundaries, then stop it.
        tokio::time::sleep(Duration::from_secs(35)).await;
        let _ = stop_tx.send(true);
        let _ = loop_handle.await;

        assert!(ticks.load(Ordering::SeqCst) >= 2);
    }
}
