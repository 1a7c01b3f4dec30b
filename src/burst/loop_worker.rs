use tokio::time::{Duration, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::models::FrameSource;

use super::sampler::BurstSampler;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

pub type BoxedFrameSource = Box<dyn FrameSource + Send>;

/// Render-clock stand-in: ticks the sampler once per display refresh until
/// cancelled, then hands the sampler and the camera back to the caller.
///
/// Missed ticks are skipped rather than replayed, so a stalled host resumes
/// at the normal cadence instead of bursting to catch up.
pub async fn burst_loop(
    mut sampler: BurstSampler,
    mut source: BoxedFrameSource,
    refresh_hz: u32,
    cancel_token: CancellationToken,
) -> (BurstSampler, BoxedFrameSource) {
    let period = Duration::from_secs_f64(1.0 / refresh_hz.max(1) as f64);
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let clock = Instant::now();
    let mut ticks: u64 = 0;

    loop {
        tokio::select! {
            _ = cancel_token.cancelled() => {
                log_info!("burst loop shutting down after {} ticks", ticks);
                break;
            }
            _ = ticker.tick() => {
                ticks += 1;
                let now_ms = clock.elapsed().as_secs_f64() * 1000.0;
                if let Some(index) = sampler.tick(now_ms, source.as_mut()) {
                    log_debug!("sampled burst frame {} at {:.1}ms", index, now_ms);
                }
            }
        }
    }

    (sampler, source)
}
