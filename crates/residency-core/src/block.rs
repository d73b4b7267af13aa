//! Block entity: a half-day assignable slot.

use crate::ids::BlockId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Morning or afternoon half of a calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TimeOfDay {
    Am,
    Pm,
}

/// A half-day assignable slot. Created once per calendar period and
/// immutable thereafter (see spec §3, "Block").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    id: BlockId,
    date: NaiveDate,
    time_of_day: TimeOfDay,
    block_number: u32,
    weekend: bool,
    holiday: bool,
}

impl Block {
    pub fn new(date: NaiveDate, time_of_day: TimeOfDay, block_number: u32, holiday: bool) -> Self {
        use chrono::Weekday;
        let weekend = matches!(date.weekday(), Weekday::Sat | Weekday::Sun);
        Self {
            id: BlockId::new(),
            date,
            time_of_day,
            block_number,
            weekend,
            holiday,
        }
    }

    pub fn id(&self) -> BlockId {
        self.id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn time_of_day(&self) -> TimeOfDay {
        self.time_of_day
    }

    pub fn block_number(&self) -> u32 {
        self.block_number
    }

    pub fn is_weekend(&self) -> bool {
        self.weekend
    }

    pub fn is_holiday(&self) -> bool {
        self.holiday
    }

    /// The block for the following calendar day at the same time-of-day,
    /// used by PCAT/day-off synchronization (§4.1 step 4).
    pub fn next_day(&self, of_day: TimeOfDay) -> (NaiveDate, TimeOfDay) {
        (self.date + chrono::Duration::days(1), of_day)
    }
}
