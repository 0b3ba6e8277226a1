//! Five-field cron expressions: `minute hour day-of-month month day-of-week`.
//!
//! Each field accepts `*`, numbers, `a-b` ranges, `*/n` and `a-b/n` steps and comma lists.
//! Months and weekdays also accept three-letter names, and weekday `7` is Sunday. When both day
//! fields are restricted a day matching either one matches.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Months, NaiveDateTime, TimeDelta, TimeZone, Timelike};

use crate::foundation::error::{SegError, SegResult};

const MONTH_NAMES: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];
const DAY_NAMES: [&str; 7] = ["sun", "mon", "tue", "wed", "thu", "fri", "sat"];

/// Upper bound on calendar jumps while searching for the next match.
const SEARCH_LIMIT: usize = 50_000;

struct FieldSpec {
    name: &'static str,
    min: u32,
    max: u32,
    names: &'static [&'static str],
    /// Value of the first entry in `names`.
    names_base: u32,
}

const MINUTE: FieldSpec = FieldSpec {
    name: "minute",
    min: 0,
    max: 59,
    names: &[],
    names_base: 0,
};
const HOUR: FieldSpec = FieldSpec {
    name: "hour",
    min: 0,
    max: 23,
    names: &[],
    names_base: 0,
};
const DAY_OF_MONTH: FieldSpec = FieldSpec {
    name: "day-of-month",
    min: 1,
    max: 31,
    names: &[],
    names_base: 0,
};
const MONTH: FieldSpec = FieldSpec {
    name: "month",
    min: 1,
    max: 12,
    names: &MONTH_NAMES,
    names_base: 1,
};
const DAY_OF_WEEK: FieldSpec = FieldSpec {
    name: "day-of-week",
    min: 0,
    max: 7,
    names: &DAY_NAMES,
    names_base: 0,
};

/// Allowed values of one field as a bit set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Field {
    bits: u64,
    /// Written as `*` or `*/n`.
    star: bool,
}

impl Field {
    fn contains(&self, v: u32) -> bool {
        v < 64 && self.bits & (1u64 << v) != 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronExpr {
    source: String,
    minute: Field,
    hour: Field,
    day_of_month: Field,
    month: Field,
    day_of_week: Field,
}

impl CronExpr {
    pub fn parse(expr: &str) -> SegResult<Self> {
        let fields: Vec<&str> = expr.split_whitespace().collect();
        let [minute, hour, dom, month, dow] = fields.as_slice() else {
            return Err(SegError::schedule(format!(
                "cron expression '{expr}' must have 5 fields, found {}",
                fields.len()
            )));
        };

        let err = |e: String| SegError::schedule(format!("invalid cron expression '{expr}': {e}"));
        let mut day_of_week = parse_field(dow, &DAY_OF_WEEK).map_err(err)?;
        if day_of_week.contains(7) {
            day_of_week.bits = (day_of_week.bits & !(1 << 7)) | 1;
        }

        Ok(Self {
            source: fields.join(" "),
            minute: parse_field(minute, &MINUTE).map_err(err)?,
            hour: parse_field(hour, &HOUR).map_err(err)?,
            day_of_month: parse_field(dom, &DAY_OF_MONTH).map_err(err)?,
            month: parse_field(month, &MONTH).map_err(err)?,
            day_of_week,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    fn day_matches(&self, t: &NaiveDateTime) -> bool {
        let dom = self.day_of_month.contains(t.day());
        let dow = self.day_of_week.contains(t.weekday().num_days_from_sunday());
        match (self.day_of_month.star, self.day_of_week.star) {
            (true, true) => true,
            (true, false) => dow,
            (false, true) => dom,
            (false, false) => dom || dow,
        }
    }

    /// Whether the minute containing `t` matches.
    pub fn matches<Tz: TimeZone>(&self, t: &DateTime<Tz>) -> bool {
        let n = t.naive_local();
        self.month.contains(n.month())
            && self.day_matches(&n)
            && self.hour.contains(n.hour())
            && self.minute.contains(n.minute())
    }

    /// First matching minute strictly after `t`, in `t`'s time zone.
    ///
    /// Local minutes skipped by a DST change never match; a repeated local minute matches its
    /// earlier instant.
    pub fn next_after<Tz: TimeZone>(&self, t: &DateTime<Tz>) -> Option<DateTime<Tz>> {
        let tz = t.timezone();
        let mut n = t.naive_local().with_second(0)?.with_nanosecond(0)? + TimeDelta::minutes(1);

        for _ in 0..SEARCH_LIMIT {
            if !self.month.contains(n.month()) {
                n = n
                    .date()
                    .with_day(1)?
                    .checked_add_months(Months::new(1))?
                    .and_hms_opt(0, 0, 0)?;
                continue;
            }
            if !self.day_matches(&n) {
                n = n.date().succ_opt()?.and_hms_opt(0, 0, 0)?;
                continue;
            }
            if !self.hour.contains(n.hour()) {
                n = n.with_minute(0)? + TimeDelta::hours(1);
                continue;
            }
            if !self.minute.contains(n.minute()) {
                n += TimeDelta::minutes(1);
                continue;
            }
            match tz.from_local_datetime(&n).earliest() {
                Some(found) if found > *t => return Some(found),
                _ => n += TimeDelta::minutes(1),
            }
        }
        None
    }
}

impl FromStr for CronExpr {
    type Err = SegError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for CronExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn parse_value(s: &str, kind: &FieldSpec) -> Result<u32, String> {
    let v = match kind.names.iter().position(|n| n.eq_ignore_ascii_case(s)) {
        Some(idx) => idx as u32 + kind.names_base,
        None => s
            .parse::<u32>()
            .map_err(|_| format!("invalid {} value '{s}'", kind.name))?,
    };
    if v < kind.min || v > kind.max {
        return Err(format!(
            "{} value {v} is outside {}-{}",
            kind.name, kind.min, kind.max
        ));
    }
    Ok(v)
}

fn parse_field(text: &str, kind: &FieldSpec) -> Result<Field, String> {
    let mut bits = 0u64;
    for item in text.split(',') {
        let (range, step) = match item.split_once('/') {
            Some((r, s)) => {
                let step: u32 = s
                    .parse()
                    .map_err(|_| format!("invalid {} step '{s}'", kind.name))?;
                if step == 0 {
                    return Err(format!("{} step must be positive", kind.name));
                }
                (r, step)
            }
            None => (item, 1),
        };

        let (lo, hi) = if range == "*" {
            (kind.min, kind.max)
        } else if let Some((a, b)) = range.split_once('-') {
            (parse_value(a, kind)?, parse_value(b, kind)?)
        } else {
            let v = parse_value(range, kind)?;
            // `a/n` runs from `a` to the end of the field.
            (v, if step > 1 { kind.max } else { v })
        };
        if lo > hi {
            return Err(format!("{} range {lo}-{hi} is reversed", kind.name));
        }

        for v in (lo..=hi).step_by(step as usize) {
            bits |= 1 << v;
        }
    }
    Ok(Field {
        bits,
        star: text.starts_with('*'),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/schedule/cron.rs"]
mod tests;
