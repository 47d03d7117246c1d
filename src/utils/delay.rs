use rand::Rng;
use std::time::Duration;
use tokio::time::sleep;

use crate::config::JitterRange;

/// Uniform random duration inside `range`.
pub fn jitter_duration(range: JitterRange) -> Duration {
    let (min, max) = range.bounds();
    let seconds = if max > min {
        rand::thread_rng().gen_range(min..=max)
    } else {
        min
    };
    Duration::from_secs_f64(seconds)
}

pub async fn jitter(range: JitterRange) {
    let delay = jitter_duration(range);
    if !delay.is_zero() {
        sleep(delay).await;
    }
}
