use std::{
    num::NonZeroUsize,
    sync::Mutex,
    time::{Duration, Instant},
};

use lru::LruCache;
use serenity::all::UserId;

/// Last invocation time per (user, command), bounded so idle users age out
pub struct Cooldowns {
    last_used: Mutex<LruCache<(UserId, String), Instant>>,
}

impl Cooldowns {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            last_used: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Records `now` and returns `Ok` if the user may run `command` again,
    /// otherwise returns the time left and records nothing.
    pub fn check(
        &self,
        user_id: UserId,
        command: &str,
        cooldown: Duration,
        now: Instant,
    ) -> Result<(), Duration> {
        if cooldown.is_zero() {
            return Ok(());
        }

        let mut last_used = self.last_used.lock().unwrap_or_else(|e| e.into_inner());
        let key = (user_id, command.to_string());
        if let Some(previous) = last_used.get(&key) {
            let elapsed = now.saturating_duration_since(*previous);
            if elapsed < cooldown {
                return Err(cooldown - elapsed);
            }
        }
        last_used.put(key, now);
        Ok(())
    }
}
