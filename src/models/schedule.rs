//! Business calendar: weekly opening hours and slot granularity

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::config::{CalendarConfig, DayHoursConfig};

/// Opening hours for one day; `open < close`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayHours {
    pub open: NaiveTime,
    pub close: NaiveTime,
}

impl DayHours {
    pub fn new(open: NaiveTime, close: NaiveTime) -> Result<Self, String> {
        if open >= close {
            return Err(format!("opening time {} must be before closing time {}", open, close));
        }
        Ok(Self { open, close })
    }

    /// Whether `[start, end)` lies inside these hours
    pub fn contains(&self, start: NaiveTime, end: NaiveTime) -> bool {
        start < end && start >= self.open && end <= self.close
    }
}

/// Per-weekday schedule of the shop, in shop-local time
#[derive(Debug, Clone)]
pub struct BusinessCalendar {
    /// Indexed from Monday (0) to Sunday (6); `None` is closed all day
    hours: [Option<DayHours>; 7],
    /// Fixed step between candidate slots; `None` steps by the service duration
    slot_step: Option<Duration>,
    default_duration: Duration,
    offset: FixedOffset,
}

impl BusinessCalendar {
    pub fn new(
        hours: [Option<DayHours>; 7],
        slot_step: Option<Duration>,
        default_duration: Duration,
        offset: FixedOffset,
    ) -> Self {
        Self {
            hours,
            slot_step,
            default_duration,
            offset,
        }
    }

    /// Build the calendar from configuration, rejecting malformed hours
    pub fn from_config(config: &CalendarConfig) -> Result<Self, String> {
        let week = &config.hours;
        let days = [
            ("monday", &week.monday),
            ("tuesday", &week.tuesday),
            ("wednesday", &week.wednesday),
            ("thursday", &week.thursday),
            ("friday", &week.friday),
            ("saturday", &week.saturday),
            ("sunday", &week.sunday),
        ];

        let mut hours = [None; 7];
        for (slot, (name, day)) in hours.iter_mut().zip(days) {
            *slot = day
                .as_ref()
                .map(|d| parse_day(d).map_err(|e| format!("calendar.hours.{}: {}", name, e)))
                .transpose()?;
        }

        if config.default_duration_minutes == 0 {
            return Err("calendar.default_duration_minutes must be greater than zero".to_string());
        }

        let offset = FixedOffset::east_opt(config.utc_offset_minutes * 60).ok_or_else(|| {
            format!(
                "calendar.utc_offset_minutes out of range: {}",
                config.utc_offset_minutes
            )
        })?;

        let slot_step = match config.slot_step_minutes {
            0 => None,
            m => Some(Duration::minutes(i64::from(m))),
        };

        Ok(Self::new(
            hours,
            slot_step,
            Duration::minutes(i64::from(config.default_duration_minutes)),
            offset,
        ))
    }

    pub fn hours_on(&self, date: NaiveDate) -> Option<DayHours> {
        self.hours[date.weekday().num_days_from_monday() as usize]
    }

    pub fn default_duration(&self) -> Duration {
        self.default_duration
    }

    /// Whether a booking `[start, end)` on `date` falls entirely within opening hours
    pub fn fits(&self, date: NaiveDate, start: NaiveTime, end: NaiveTime) -> bool {
        self.hours_on(date).is_some_and(|h| h.contains(start, end))
    }

    /// Shop-local wall clock time for a UTC instant
    pub fn local_now(&self, now: DateTime<Utc>) -> NaiveDateTime {
        now.with_timezone(&self.offset).naive_local()
    }

    /// Candidate start times for a service of `duration` on `date`, ascending.
    /// The last candidate ends exactly at closing time at the latest.
    pub fn candidate_starts(&self, date: NaiveDate, duration: Duration) -> Vec<NaiveTime> {
        let Some(hours) = self.hours_on(date) else {
            return Vec::new();
        };
        if duration <= Duration::zero() {
            return Vec::new();
        }

        let step = self.slot_step.unwrap_or(duration);
        let mut starts = Vec::new();
        let mut start = hours.open;
        while let Some(end) = end_time(start, duration) {
            if end > hours.close {
                break;
            }
            starts.push(start);
            match end_time(start, step) {
                Some(next) => start = next,
                None => break,
            }
        }
        starts
    }
}

/// `start + duration`, or `None` when it would cross midnight
pub fn end_time(start: NaiveTime, duration: Duration) -> Option<NaiveTime> {
    let (end, overflow) = start.overflowing_add_signed(duration);
    (overflow == 0 && end > start).then_some(end)
}

/// Parse "HH:MM"
pub fn parse_hour(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").ok()
}

fn parse_day(day: &DayHoursConfig) -> Result<DayHours, String> {
    let open = parse_hour(&day.open)
        .ok_or_else(|| format!("invalid open time '{}' (use HH:MM)", day.open))?;
    let close = parse_hour(&day.close)
        .ok_or_else(|| format!("invalid close time '{}' (use HH:MM)", day.close))?;
    DayHours::new(open, close)
}
