use crate::day::{local_datetime, UtcOffset};
use crate::errors::ValidationError;
use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

const MINUTES_PER_DAY: u32 = 24 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub minutes_since_midnight: u32,
    pub fraction: f64,
}

impl Milestone {
    pub const fn at(hour: u32, minute: u32, fraction: f64) -> Self {
        Self {
            minutes_since_midnight: hour * 60 + minute,
            fraction,
        }
    }
}

/// Strictly ascending checkpoints of how much of the daily requirement
/// should be met by a given time of day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MilestoneSchedule {
    milestones: Vec<Milestone>,
}

impl MilestoneSchedule {
    pub fn new(milestones: Vec<Milestone>) -> Result<Self, ValidationError> {
        let mut previous: Option<u32> = None;
        for milestone in &milestones {
            let minute = milestone.minutes_since_midnight;
            if minute >= MINUTES_PER_DAY || previous.is_some_and(|prev| minute <= prev) {
                return Err(ValidationError::ScheduleNotAscending(minute));
            }
            if !(milestone.fraction > 0.0 && milestone.fraction <= 1.0) {
                return Err(ValidationError::InvalidFraction(milestone.fraction));
            }
            previous = Some(minute);
        }

        Ok(Self { milestones })
    }

    pub fn milestones(&self) -> &[Milestone] {
        &self.milestones
    }
}

impl Default for MilestoneSchedule {
    fn default() -> Self {
        Self {
            milestones: vec![
                Milestone::at(7, 0, 0.15),
                Milestone::at(10, 30, 0.25),
                Milestone::at(13, 0, 0.50),
                Milestone::at(16, 30, 0.65),
                Milestone::at(19, 30, 0.85),
                Milestone::at(21, 0, 1.00),
            ],
        }
    }
}

/// Fraction of the first checkpoint still ahead of `now_minutes`, or 1.0 once
/// every checkpoint has been reached.
pub fn target_fraction(now_minutes: u32, schedule: &MilestoneSchedule) -> f64 {
    schedule
        .milestones
        .iter()
        .find(|milestone| milestone.minutes_since_midnight > now_minutes)
        .map_or(1.0, |milestone| milestone.fraction)
}

/// Minutes since local midnight, read in the tracker's canonical offset.
pub fn minutes_since_midnight(now: DateTime<Utc>, offset: UtcOffset) -> u32 {
    let local = local_datetime(now, offset);
    local.hour() * 60 + local.minute()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn single_checkpoint_steps_to_full_after_its_time() {
        let schedule = MilestoneSchedule::new(vec![Milestone::at(13, 0, 0.50)]).unwrap();
        assert_eq!(target_fraction(12 * 60, &schedule), 0.50);
        assert_eq!(target_fraction(14 * 60, &schedule), 1.0);
    }

    #[test]
    fn checkpoint_time_itself_moves_to_the_next_fraction() {
        let schedule = MilestoneSchedule::default();
        assert_eq!(target_fraction(0, &schedule), 0.15);
        assert_eq!(target_fraction(6 * 60 + 59, &schedule), 0.15);
        assert_eq!(target_fraction(7 * 60, &schedule), 0.25);
        assert_eq!(target_fraction(21 * 60 - 1, &schedule), 1.0);
        assert_eq!(target_fraction(21 * 60, &schedule), 1.0);
        assert_eq!(target_fraction(23 * 60 + 59, &schedule), 1.0);
    }

    #[test]
    fn target_is_monotonic_and_drawn_from_schedule() {
        let schedule = MilestoneSchedule::default();
        let allowed: Vec<f64> = schedule.milestones().iter().map(|m| m.fraction).collect();
        let mut last = 0.0;
        for minute in 0..MINUTES_PER_DAY {
            let fraction = target_fraction(minute, &schedule);
            assert!(fraction >= last, "dropped at minute {minute}");
            assert!(fraction == 1.0 || allowed.contains(&fraction));
            last = fraction;
        }
    }

    #[test]
    fn empty_schedule_always_expects_everything() {
        let schedule = MilestoneSchedule::new(Vec::new()).unwrap();
        assert_eq!(target_fraction(300, &schedule), 1.0);
    }

    #[test]
    fn rejects_unordered_or_out_of_range_schedules() {
        let unordered = MilestoneSchedule::new(vec![
            Milestone::at(10, 0, 0.2),
            Milestone::at(10, 0, 0.3),
        ]);
        assert_eq!(unordered, Err(ValidationError::ScheduleNotAscending(600)));

        let late = MilestoneSchedule::new(vec![Milestone::at(24, 0, 1.0)]);
        assert_eq!(late, Err(ValidationError::ScheduleNotAscending(1440)));

        let zero = MilestoneSchedule::new(vec![Milestone::at(8, 0, 0.0)]);
        assert_eq!(zero, Err(ValidationError::InvalidFraction(0.0)));
    }

    #[test]
    fn now_is_read_in_the_fixed_offset() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 2, 0, 0).unwrap();
        assert_eq!(minutes_since_midnight(now, UtcOffset::IST), 7 * 60 + 30);
    }
}
