use crate::types::Timestamp;

/// Interval between two outbound drawing transmissions.
pub const DEFAULT_THROTTLE_INTERVAL_MS: u64 = 50;

#[derive(Debug, PartialEq)]
pub enum Publish<T> {
    /// Transmit right away.
    Now(T),
    /// Held in the pending slot; call [`Throttle::fire`] at `fire_at`.
    Deferred { fire_at: Timestamp },
}

impl<T> Publish<T> {
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Publish<U> {
        match self {
            Publish::Now(value) => Publish::Now(f(value)),
            Publish::Deferred { fire_at } => Publish::Deferred { fire_at },
        }
    }
}

#[derive(Debug)]
enum State<T> {
    Idle,
    CoolingDown {
        last_sent: Timestamp,
        pending: Option<T>,
    },
}

/// Trailing-edge throttle with a leading-edge fast path.
///
/// An offer made while idle goes out immediately. Offers made inside the
/// interval overwrite a single pending slot, which goes out once the interval
/// since the previous transmission has elapsed. A burst inside one interval
/// therefore yields at most two transmissions: the first value and the last.
#[derive(Debug)]
pub struct Throttle<T> {
    interval: u64,
    state: State<T>,
}

impl<T> Throttle<T> {
    pub fn new(interval: u64) -> Self {
        Self {
            interval,
            state: State::Idle,
        }
    }

    pub fn offer(&mut self, value: T, now: Timestamp) -> Publish<T> {
        match &mut self.state {
            State::CoolingDown { last_sent, pending } => {
                let fire_at = last_sent.saturating_add(self.interval);
                if pending.is_none() && now >= fire_at {
                    self.state = State::CoolingDown {
                        last_sent: now,
                        pending: None,
                    };
                    Publish::Now(value)
                } else {
                    if pending.replace(value).is_some() {
                        log::trace!("Throttle coalesced a pending value");
                    }
                    Publish::Deferred { fire_at }
                }
            }
            State::Idle => {
                self.state = State::CoolingDown {
                    last_sent: now,
                    pending: None,
                };
                Publish::Now(value)
            }
        }
    }

    /// Releases the pending value if it is due. Early calls return `None` and
    /// leave the slot untouched.
    pub fn fire(&mut self, now: Timestamp) -> Option<T> {
        match &mut self.state {
            State::CoolingDown { last_sent, pending }
                if now >= last_sent.saturating_add(self.interval) =>
            {
                let value = pending.take()?;
                *last_sent = now;
                Some(value)
            }
            _ => None,
        }
    }

    /// Deadline of the pending value, if any.
    pub fn next_fire_at(&self) -> Option<Timestamp> {
        match &self.state {
            State::CoolingDown {
                last_sent,
                pending: Some(_),
            } => Some(last_sent.saturating_add(self.interval)),
            _ => None,
        }
    }

    pub fn has_pending(&self) -> bool {
        self.next_fire_at().is_some()
    }
}

impl<T> std::default::Default for Throttle<T> {
    fn default() -> Self {
        Self::new(DEFAULT_THROTTLE_INTERVAL_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_should_send_first_offer_immediately() {
        let mut throttle = Throttle::new(50);
        assert_eq!(throttle.offer("a", 1000), Publish::Now("a"));
        assert!(!throttle.has_pending());
    }

    #[test]
    fn it_should_coalesce_a_burst_into_two_transmissions() {
        let mut throttle = Throttle::new(50);
        let mut sent = Vec::new();

        if let Publish::Now(v) = throttle.offer(0, 0) {
            sent.push((0, v));
        }
        assert_eq!(throttle.offer(5, 5), Publish::Deferred { fire_at: 50 });
        assert_eq!(throttle.offer(40, 40), Publish::Deferred { fire_at: 50 });

        assert_eq!(throttle.fire(49), None);
        if let Some(v) = throttle.fire(50) {
            sent.push((50, v));
        }

        // 60 lands in the window opened by the send at 50
        assert_eq!(throttle.offer(60, 60), Publish::Deferred { fire_at: 100 });

        assert_eq!(sent, vec![(0, 0), (50, 40)]);
        assert_eq!(throttle.next_fire_at(), Some(100));
    }

    #[test]
    fn it_should_send_immediately_after_a_quiet_interval() {
        let mut throttle = Throttle::new(50);
        assert_eq!(throttle.offer('a', 0), Publish::Now('a'));
        assert_eq!(throttle.offer('b', 50), Publish::Now('b'));
        assert_eq!(throttle.offer('c', 120), Publish::Now('c'));
    }

    #[test]
    fn it_should_keep_pending_value_when_timer_is_late() {
        let mut throttle = Throttle::new(50);
        throttle.offer(1, 0);
        throttle.offer(2, 10);
        // host timer has not fired yet although the deadline passed
        assert_eq!(throttle.offer(3, 70), Publish::Deferred { fire_at: 50 });
        assert_eq!(throttle.fire(75), Some(3));
        assert_eq!(throttle.fire(200), None);
    }

    #[test]
    fn it_should_not_overflow_at_the_end_of_time() {
        let mut throttle = Throttle::new(50);
        assert_eq!(throttle.offer(1, u64::MAX - 10), Publish::Now(1));
        assert_eq!(
            throttle.offer(2, u64::MAX),
            Publish::Deferred { fire_at: u64::MAX }
        );
        assert_eq!(throttle.next_fire_at(), Some(u64::MAX));
        assert_eq!(throttle.fire(u64::MAX), Some(2));
    }
}
