//! Send pacing and session timing
//!
//! Inter-send delays, clamping to the session window, randomized session
//! start times inside hour windows and the pause between back-to-back
//! sessions.

use chrono::{DateTime, Local, NaiveDate, TimeZone};
use rand::Rng;
use std::time::Duration;

use crate::config::{HourWindow, PacingConfig, SecondsRange};

/// Draws per day before a window is treated as unrepresentable
const WINDOW_DRAW_ATTEMPTS: usize = 16;

/// Draw one inter-send delay: uniform base plus an independent jitter
pub fn draw_delay<G: Rng + ?Sized>(pacing: &PacingConfig, rng: &mut G) -> Duration {
    let base = pacing.delay.draw(rng);
    let jitter = Duration::from_secs(rng.gen_range(0..=pacing.jitter_max_secs));
    base + jitter
}

/// Time left until `end`, zero once it has passed
pub fn remaining(now: DateTime<Local>, end: DateTime<Local>) -> Duration {
    (end - now).to_std().unwrap_or(Duration::ZERO)
}

/// Shorten `delay` so the sleep never runs past `window_end`
pub fn clamp_to_window(delay: Duration, now: DateTime<Local>, window_end: DateTime<Local>) -> Duration {
    delay.min(remaining(now, window_end))
}

/// `start + duration`, saturating at `start` if the sum is unrepresentable
pub fn after(start: DateTime<Local>, duration: Duration) -> DateTime<Local> {
    chrono::Duration::from_std(duration)
        .ok()
        .and_then(|d| start.checked_add_signed(d))
        .unwrap_or(start)
}

/// Pause between two sessions that run back to back
pub fn session_gap<G: Rng + ?Sized>(range: &SecondsRange, rng: &mut G) -> Duration {
    range.draw(rng)
}

/// Pick the start instant of a session with a time-of-day window
///
/// A random hour, minute and second inside today's window is drawn. If that
/// instant already passed but the window is still open, the session starts
/// now. If the whole window is over, a time inside tomorrow's window is used.
/// Wall-clock times skipped by a DST change are redrawn.
pub fn next_window_start<G: Rng + ?Sized>(
    now: DateTime<Local>,
    window: HourWindow,
    rng: &mut G,
) -> DateTime<Local> {
    pick_window_start(now, window, rng, local_at)
}

fn pick_window_start<G, F>(now: DateTime<Local>, window: HourWindow, rng: &mut G, resolve: F) -> DateTime<Local>
where
    G: Rng + ?Sized,
    F: Fn(NaiveDate, u32, u32, u32) -> Option<DateTime<Local>>,
{
    let today = now.date_naive();

    match draw_in_window(today, window, rng, &resolve) {
        Some(start) if start >= now => start,
        // The drawn time lies inside the window, so the window has begun
        Some(_) if window_end(today, window).is_some_and(|end| now < end) => now,
        _ => today
            .succ_opt()
            .and_then(|tomorrow| draw_in_window(tomorrow, window, rng, &resolve))
            .unwrap_or(now),
    }
}

fn draw_in_window<G, F>(date: NaiveDate, window: HourWindow, rng: &mut G, resolve: &F) -> Option<DateTime<Local>>
where
    G: Rng + ?Sized,
    F: Fn(NaiveDate, u32, u32, u32) -> Option<DateTime<Local>>,
{
    (0..WINDOW_DRAW_ATTEMPTS).find_map(|_| {
        let hour = rng.gen_range(window.start_hour..window.end_hour);
        let minute = rng.gen_range(0..60);
        let second = rng.gen_range(0..60);
        resolve(date, hour, minute, second)
    })
}

fn window_end(date: NaiveDate, window: HourWindow) -> Option<DateTime<Local>> {
    if window.end_hour >= 24 {
        date.succ_opt().and_then(|next| local_at(next, 0, 0, 0))
    } else {
        local_at(date, window.end_hour, 0, 0)
    }
}

/// Local instant for a wall-clock time, earliest one on DST overlaps
fn local_at(date: NaiveDate, hour: u32, minute: u32, second: u32) -> Option<DateTime<Local>> {
    let naive = date.and_hms_opt(hour, minute, second)?;
    Local.from_local_datetime(&naive).earliest()
}
