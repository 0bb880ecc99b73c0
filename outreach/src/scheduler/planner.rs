//! Session planning
//!
//! Turns the shuffled eligible pool into the bounded queue of one session.

use chrono::{DateTime, Local};
use rand::Rng;
use shared::SlotRef;
use std::time::Duration;

use crate::config::CountRange;
use crate::scheduler::pacing;

/// Ephemeral plan of one session, discarded when the session ends
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPlan {
    pub session_no: u32,
    pub window_start: DateTime<Local>,
    pub window_end: DateTime<Local>,
    pub target: usize,
    pub pool_size: usize,
    pub queue: Vec<SlotRef>,
}

impl SessionPlan {
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// Plan one session over `pool`
///
/// The target is drawn uniformly from `range`, then capped by the pool size
/// and by `remaining_budget` when a daily target is configured. The queue is
/// the front of the already shuffled pool, so no slot appears twice.
pub fn plan_session<G: Rng + ?Sized>(
    session_no: u32,
    mut pool: Vec<SlotRef>,
    range: CountRange,
    remaining_budget: Option<usize>,
    now: DateTime<Local>,
    duration: Duration,
    rng: &mut G,
) -> SessionPlan {
    let pool_size = pool.len();
    let drawn = range.draw(rng);
    let target = remaining_budget
        .map_or(drawn, |budget| drawn.min(budget))
        .min(pool_size);

    pool.truncate(target);

    SessionPlan {
        session_no,
        window_start: now,
        window_end: pacing::after(now, duration),
        target,
        pool_size,
        queue: pool,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use shared::SlotId;

    fn pool(n: usize) -> Vec<SlotRef> {
        (0..n).map(|row| SlotRef::new(row, SlotId::Hr1)).collect()
    }

    #[test]
    fn test_target_within_capped_range() {
        let mut rng = StdRng::seed_from_u64(21);
        let now = Local::now();
        for pool_size in 0..12 {
            for _ in 0..20 {
                let range = CountRange::new(3, 8).unwrap();
                let plan = plan_session(1, pool(pool_size), range, None, now, Duration::from_secs(60), &mut rng);
                assert!(plan.target >= 3.min(pool_size));
                assert!(plan.target <= 8.min(pool_size));
                assert_eq!(plan.queue.len(), plan.target);
                assert_eq!(plan.pool_size, pool_size);
            }
        }
    }

    #[test]
    fn test_queue_is_front_of_pool() {
        let mut rng = StdRng::seed_from_u64(22);
        let candidates = vec![
            SlotRef::new(4, SlotId::Hr2),
            SlotRef::new(1, SlotId::Hr3),
            SlotRef::new(0, SlotId::Hr1),
        ];
        let range = CountRange::new(2, 2).unwrap();
        let plan = plan_session(1, candidates.clone(), range, None, Local::now(), Duration::from_secs(60), &mut rng);
        assert_eq!(plan.queue, candidates[..2].to_vec());
    }

    #[test]
    fn test_daily_budget_caps_target() {
        let mut rng = StdRng::seed_from_u64(23);
        let range = CountRange::new(5, 5).unwrap();
        let plan = plan_session(2, pool(10), range, Some(3), Local::now(), Duration::from_secs(60), &mut rng);
        assert_eq!(plan.target, 3);

        let plan = plan_session(3, pool(10), range, Some(0), Local::now(), Duration::from_secs(60), &mut rng);
        assert!(plan.is_empty());
    }

    #[test]
    fn test_empty_pool_gives_empty_plan() {
        let mut rng = StdRng::seed_from_u64(24);
        let range = CountRange::new(15, 25).unwrap();
        let plan = plan_session(1, Vec::new(), range, None, Local::now(), Duration::from_secs(60), &mut rng);
        assert!(plan.is_empty());
        assert_eq!(plan.target, 0);
    }

    #[test]
    fn test_window_end_follows_duration() {
        let mut rng = StdRng::seed_from_u64(25);
        let now = Local::now();
        let range = CountRange::new(1, 1).unwrap();
        let plan = plan_session(1, pool(1), range, None, now, Duration::from_secs(7200), &mut rng);
        assert_eq!(plan.window_start, now);
        assert_eq!(plan.window_end - now, chrono::Duration::hours(2));
    }
}
