use super::{read_json, traits::KeyValueStore, write_json, KEY_DAILY_USAGE};
use crate::error::{MagicError, Result};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyUsage {
    pub date: NaiveDate,
    pub count: u32,
}

/// Advisory per-day generation counter. Not atomic across processes.
#[derive(Clone)]
pub struct UsageLimiter {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    limit: u32,
}

impl UsageLimiter {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>, limit: u32) -> Self {
        Self {
            store,
            clock,
            limit,
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Calls made today. A record from an earlier day counts as zero.
    pub fn used_today(&self) -> Result<u32> {
        let today = self.clock.today();
        let usage: Option<DailyUsage> = read_json(self.store.as_ref(), KEY_DAILY_USAGE)?;
        Ok(usage.filter(|u| u.date == today).map_or(0, |u| u.count))
    }

    pub fn remaining(&self) -> Result<u32> {
        Ok(self.limit.saturating_sub(self.used_today()?))
    }

    /// Fails with `QuotaExceeded` once today's ceiling is reached.
    pub fn check(&self) -> Result<()> {
        let used = self.used_today()?;
        if used >= self.limit {
            log::warn!("Daily limit reached ({}/{})", used, self.limit);
            return Err(MagicError::QuotaExceeded { limit: self.limit });
        }
        Ok(())
    }

    pub fn record(&self) -> Result<u32> {
        let count = self.used_today()? + 1;
        let usage = DailyUsage {
            date: self.clock.today(),
            count,
        };
        write_json(self.store.as_ref(), KEY_DAILY_USAGE, &usage)?;
        log::debug!("Daily usage now {}/{}", count, self.limit);
        Ok(count)
    }
}
