use std::time::Duration;

/// Interval at which a UI should call [`ProgressTicker::tick`].
pub const TICK_INTERVAL: Duration = Duration::from_millis(400);

const CEILING: u8 = 95;

/// Simulated progress for a single in-flight image. The model gives no real
/// progress, so the bar eases towards 95% and jumps to 100% on completion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressTicker {
    percent: u8,
}

impl ProgressTicker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn percent(&self) -> u8 {
        self.percent
    }

    pub fn tick(&mut self) -> u8 {
        if self.percent < CEILING {
            let step = match self.percent {
                0..=49 => 10,
                50..=79 => 5,
                _ => 1,
            };
            self.percent = (self.percent + step).min(CEILING);
        }
        self.percent
    }

    pub fn finish(&mut self) -> u8 {
        self.percent = 100;
        self.percent
    }

    pub fn reset(&mut self) {
        self.percent = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eases_and_caps_at_ninety_five() {
        let mut ticker = ProgressTicker::new();
        assert_eq!(ticker.tick(), 10);
        for _ in 0..4 {
            ticker.tick();
        }
        assert_eq!(ticker.percent(), 50);
        assert_eq!(ticker.tick(), 55);
        for _ in 0..100 {
            ticker.tick();
        }
        assert_eq!(ticker.percent(), 95);
        assert_eq!(ticker.finish(), 100);
        ticker.reset();
        assert_eq!(ticker.percent(), 0);
    }
}
