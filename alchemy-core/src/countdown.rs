use crate::ValidationError;

pub const MIN_DURATION_MINUTES: u32 = 1;
/// Exclusive upper bound.
pub const MAX_DURATION_MINUTES: u32 = 5;
/// Every tick at or below this many seconds is announced.
pub const FINAL_COUNTDOWN_SECONDS: i32 = 10;

pub fn validate_duration(minutes: u32) -> Result<(), ValidationError> {
    if (MIN_DURATION_MINUTES..MAX_DURATION_MINUTES).contains(&minutes) {
        Ok(())
    } else {
        Err(ValidationError::DurationOutOfRange(minutes))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Silent,
    Announce(i32),
    Expired,
}

#[derive(Debug, Clone, Copy)]
struct Milestone {
    at: i32,
    fired: bool,
}

/// Decides which remaining-second values get broadcast.
///
/// Milestones sit at three quarters, half and a quarter of the total; each
/// fires once, on the first tick at or below it. The last ten seconds are
/// announced on every tick.
#[derive(Debug, Clone)]
pub struct Countdown {
    total: i32,
    milestones: [Milestone; 3],
}

impl Countdown {
    pub fn new(duration_minutes: u32) -> Result<Self, ValidationError> {
        validate_duration(duration_minutes)?;

        let total = duration_minutes as i32 * 60;
        let half = total / 2;
        let quarter = half / 2;
        let three_quarter = half + quarter;

        Ok(Self {
            total,
            milestones: [three_quarter, half, quarter].map(|at| Milestone { at, fired: false }),
        })
    }

    pub fn total_seconds(&self) -> i32 {
        self.total
    }

    pub fn tick(&mut self, seconds_left: i32) -> Tick {
        if seconds_left <= 0 {
            return Tick::Expired;
        }

        let mut crossed = false;
        for milestone in self.milestones.iter_mut() {
            if !milestone.fired && seconds_left <= milestone.at {
                milestone.fired = true;
                crossed = true;
            }
        }

        if crossed || seconds_left <= FINAL_COUNTDOWN_SECONDS {
            Tick::Announce(seconds_left)
        } else {
            Tick::Silent
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn announcements(duration: u32) -> (Vec<i32>, bool) {
        let mut countdown = Countdown::new(duration).unwrap();
        let mut announced = Vec::new();
        let mut expired = false;
        for elapsed in 1..=countdown.total_seconds() {
            match countdown.tick(countdown.total_seconds() - elapsed) {
                Tick::Announce(seconds) => announced.push(seconds),
                Tick::Expired => expired = true,
                Tick::Silent => {}
            }
        }
        (announced, expired)
    }

    #[test]
    fn test_one_minute_schedule() {
        let (announced, expired) = announcements(1);
        assert_eq!(
            announced,
            vec![45, 30, 15, 10, 9, 8, 7, 6, 5, 4, 3, 2, 1]
        );
        assert!(expired);
    }

    #[test]
    fn test_three_minute_milestones() {
        let (announced, _) = announcements(3);
        assert_eq!(&announced[..3], &[135, 90, 45]);
        assert_eq!(announced.len(), 13);
    }

    #[test]
    fn test_milestone_fires_once_when_skipped_over() {
        let mut countdown = Countdown::new(1).unwrap();
        // A late tick crosses two milestones at once.
        assert_eq!(countdown.tick(29), Tick::Announce(29));
        assert_eq!(countdown.tick(28), Tick::Silent);
        assert_eq!(countdown.tick(15), Tick::Announce(15));
        assert_eq!(countdown.tick(14), Tick::Silent);
    }

    #[test]
    fn test_duration_bounds() {
        assert!(Countdown::new(0).is_err());
        assert!(Countdown::new(1).is_ok());
        assert!(Countdown::new(4).is_ok());
        assert_eq!(
            Countdown::new(5).unwrap_err(),
            ValidationError::DurationOutOfRange(5)
        );
    }
}
