//! Iteration-count throttling

/// Fires on the first call and then once every `period` calls
#[derive(Debug, Clone)]
pub struct DoEvery {
    period: u32,
    count: u32,
}

impl DoEvery {
    /// Create a throttle; a period of 0 is treated as 1
    pub fn new(period: u32) -> Self {
        Self {
            period: period.max(1),
            count: 0,
        }
    }

    /// Advance by one iteration, returning `true` when the action is due
    pub fn tick(&mut self) -> bool {
        let due = self.count == 0;
        self.count += 1;
        if self.count == self.period {
            self.count = 0;
        }
        due
    }

    /// Configured period
    pub fn period(&self) -> u32 {
        self.period
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_on_zero_and_multiples() {
        let mut every = DoEvery::new(3);
        let fired: Vec<bool> = (0..7).map(|_| every.tick()).collect();
        assert_eq!(fired, vec![true, false, false, true, false, false, true]);
    }

    #[test]
    fn test_zero_period_fires_every_time() {
        let mut every = DoEvery::new(0);
        assert_eq!(every.period(), 1);
        assert!((0..5).all(|_| every.tick()));
    }
}
