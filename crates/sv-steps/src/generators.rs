use std::fmt::Write as _;
use std::net::Ipv4Addr;

use chrono::{DateTime, Days, Months, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use sv_core::TypedValue;
use sv_runtime::{parse_datetime, ScopeHandle, SeededRng};
use tracing::debug;
use uuid::Uuid;

use crate::error::StepError;

const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";
const ALPHANUMERIC: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Random instants fall between the Unix epoch and 2100-01-01.
const RANDOM_INSTANT_SPAN_SECONDS: u32 = 4_102_444_800;

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];
const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];
const TOP_LEVEL_DOMAINS: [&str; 5] = ["com", "net", "org", "info", "biz"];

/// `#` in a phone mask stands for one random digit.
pub const PHONE_MASK_DIGIT: char = '#';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CharSet {
    Letters,
    Digits,
    Alphanumeric,
}

impl CharSet {
    fn alphabet(self) -> &'static [u8] {
        match self {
            Self::Letters => LETTERS,
            Self::Digits => DIGITS,
            Self::Alphanumeric => ALPHANUMERIC,
        }
    }
}

/// Source of generated data. Draws go through the scope's RNG so a seeded
/// scope produces the same values on every run.
pub trait DataGenerator: Send + Sync {
    fn characters(&self, rng: &mut SeededRng, charset: CharSet, length: usize) -> String;
    fn instant(&self, rng: &mut SeededRng) -> NaiveDateTime;
    fn uuid(&self, rng: &mut SeededRng) -> Uuid;
    fn now(&self) -> NaiveDateTime;

    fn phone(&self, rng: &mut SeededRng, mask: &str) -> String {
        mask.chars()
            .map(|ch| {
                if ch == PHONE_MASK_DIGIT {
                    char::from(DIGITS[rng.next_index(DIGITS.len())])
                } else {
                    ch
                }
            })
            .collect()
    }

    fn month(&self, rng: &mut SeededRng) -> &'static str {
        MONTHS[rng.next_index(MONTHS.len())]
    }

    fn weekday(&self, rng: &mut SeededRng) -> &'static str {
        WEEKDAYS[rng.next_index(WEEKDAYS.len())]
    }

    fn email(&self, rng: &mut SeededRng, provider: &str) -> String {
        let user = self.characters(rng, CharSet::Letters, 10).to_lowercase();
        format!("{}@{}", user, provider)
    }

    /// Unicast IPv4 address with no zero or broadcast octet at either end.
    fn ip(&self, rng: &mut SeededRng) -> Ipv4Addr {
        let mut octet = |low: u32, high: u32| {
            u8::try_from(low + rng.next_bounded(high - low + 1)).unwrap_or(u8::MAX)
        };
        Ipv4Addr::new(octet(1, 223), octet(0, 255), octet(0, 255), octet(1, 254))
    }

    fn url(&self, rng: &mut SeededRng) -> String {
        let host = self.characters(rng, CharSet::Letters, 8).to_lowercase();
        let domain = TOP_LEVEL_DOMAINS[rng.next_index(TOP_LEVEL_DOMAINS.len())];
        format!("https://www.{}.{}", host, domain)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SeededGenerator;

impl DataGenerator for SeededGenerator {
    fn characters(&self, rng: &mut SeededRng, charset: CharSet, length: usize) -> String {
        let alphabet = charset.alphabet();
        (0..length)
            .map(|_| char::from(alphabet[rng.next_index(alphabet.len())]))
            .collect()
    }

    fn instant(&self, rng: &mut SeededRng) -> NaiveDateTime {
        let seconds = rng.next_bounded(RANDOM_INSTANT_SPAN_SECONDS);
        DateTime::from_timestamp(i64::from(seconds), 0)
            .map(|instant| instant.naive_utc())
            .unwrap_or_default()
    }

    fn uuid(&self, rng: &mut SeededRng) -> Uuid {
        let mut bytes = [0u8; 16];
        for chunk in bytes.chunks_mut(4) {
            chunk.copy_from_slice(&rng.next_u32().to_le_bytes());
        }
        uuid::Builder::from_random_bytes(bytes).into_uuid()
    }

    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateParts {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl DateParts {
    pub fn to_date(self) -> Result<NaiveDate, StepError> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day).ok_or_else(|| {
            StepError::invalid_date(format!(
                "{:04}-{:02}-{:02} is not a calendar date",
                self.year, self.month, self.day
            ))
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeParts {
    pub hour: u32,
    pub minute: u32,
    #[serde(default)]
    pub second: u32,
    #[serde(default)]
    pub millisecond: u32,
}

impl TimeParts {
    pub fn to_time(self) -> Result<NaiveTime, StepError> {
        NaiveTime::from_hms_milli_opt(self.hour, self.minute, self.second, self.millisecond)
            .ok_or_else(|| {
                StepError::invalid_date(format!(
                    "{:02}:{:02}:{:02}.{:03} is not a time of day",
                    self.hour, self.minute, self.second, self.millisecond
                ))
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ShiftDirection {
    Past,
    Future,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Shift {
    pub years: u32,
    pub months: u32,
    pub days: u64,
}

impl Shift {
    pub fn apply(
        self,
        from: NaiveDateTime,
        direction: ShiftDirection,
    ) -> Result<NaiveDateTime, StepError> {
        let out_of_range = || {
            StepError::invalid_date(format!(
                "shifting {} by {:?} leaves the supported range",
                from, self
            ))
        };
        let months = self
            .years
            .checked_mul(12)
            .and_then(|months| months.checked_add(self.months))
            .map(Months::new)
            .ok_or_else(out_of_range)?;
        let days = Days::new(self.days);
        let shifted = match direction {
            ShiftDirection::Past => from
                .checked_sub_months(months)
                .and_then(|date| date.checked_sub_days(days)),
            ShiftDirection::Future => from
                .checked_add_months(months)
                .and_then(|date| date.checked_add_days(days)),
        };
        shifted.ok_or_else(out_of_range)
    }
}

/// Formatted dates are stored as text, unformatted ones as `DateTime`.
fn store_instant(
    scope: &ScopeHandle,
    name: &str,
    instant: NaiveDateTime,
    format: Option<&str>,
) -> Result<(), StepError> {
    let value = match format {
        Some(format) => TypedValue::String(format_instant(instant, format)?),
        None => TypedValue::DateTime(instant),
    };
    scope.store()?.set(name, value)?;
    Ok(())
}

pub fn format_instant(instant: NaiveDateTime, format: &str) -> Result<String, StepError> {
    let mut output = String::new();
    write!(output, "{}", instant.format(format))
        .map_err(|_| StepError::invalid_date(format!("bad date format \"{}\"", format)))?;
    Ok(output)
}

pub fn store_date(
    scope: &ScopeHandle,
    date: DateParts,
    format: Option<&str>,
    name: &str,
) -> Result<(), StepError> {
    scope.store()?.require_absent(name)?;
    let instant = date.to_date()?.and_time(NaiveTime::MIN);
    store_instant(scope, name, instant, format)
}

/// The date part of a stored time is 0001-01-01.
pub fn store_time(
    scope: &ScopeHandle,
    time: TimeParts,
    format: Option<&str>,
    name: &str,
) -> Result<(), StepError> {
    scope.store()?.require_absent(name)?;
    let day_one = DateParts {
        year: 1,
        month: 1,
        day: 1,
    };
    let instant = day_one.to_date()?.and_time(time.to_time()?);
    store_instant(scope, name, instant, format)
}

pub fn store_datetime(
    scope: &ScopeHandle,
    date: DateParts,
    time: TimeParts,
    format: Option<&str>,
    name: &str,
) -> Result<(), StepError> {
    scope.store()?.require_absent(name)?;
    let instant = date.to_date()?.and_time(time.to_time()?);
    store_instant(scope, name, instant, format)
}

pub fn store_current_date(
    scope: &ScopeHandle,
    generator: &dyn DataGenerator,
    format: Option<&str>,
    name: &str,
) -> Result<(), StepError> {
    scope.store()?.require_absent(name)?;
    store_instant(scope, name, generator.now(), format)
}

pub fn store_random_date(
    scope: &ScopeHandle,
    generator: &dyn DataGenerator,
    format: Option<&str>,
    name: &str,
) -> Result<(), StepError> {
    scope.store()?.require_absent(name)?;
    let instant = scope.with_rng(|rng| generator.instant(rng))?;
    store_instant(scope, name, instant.date().and_time(NaiveTime::MIN), format)
}

/// Shifts `from` (interpolated, then parsed) or the current time when
/// `from` is absent.
pub fn store_shifted_date(
    scope: &ScopeHandle,
    generator: &dyn DataGenerator,
    shift: Shift,
    direction: ShiftDirection,
    from: Option<&str>,
    format: Option<&str>,
    name: &str,
) -> Result<(), StepError> {
    scope.store()?.require_absent(name)?;
    let start = match from {
        Some(text) => parse_datetime(&scope.resolve(text)?, None)?,
        None => generator.now(),
    };
    store_instant(scope, name, shift.apply(start, direction)?, format)
}

/// Random text of `length` characters with optional interpolated affixes.
pub fn store_random_text(
    scope: &ScopeHandle,
    generator: &dyn DataGenerator,
    charset: CharSet,
    length: usize,
    prefix: Option<&str>,
    postfix: Option<&str>,
    name: &str,
) -> Result<(), StepError> {
    let store = scope.store()?;
    store.require_absent(name)?;
    let body = scope.with_rng(|rng| generator.characters(rng, charset, length))?;
    let prefix = prefix.map(|text| scope.resolve(text)).transpose()?;
    let postfix = postfix.map(|text| scope.resolve(text)).transpose()?;
    let text = format!(
        "{}{}{}",
        prefix.unwrap_or_default(),
        body,
        postfix.unwrap_or_default()
    );
    store.set(name, TypedValue::String(text))?;
    Ok(())
}

pub fn store_uuid(
    scope: &ScopeHandle,
    generator: &dyn DataGenerator,
    name: &str,
) -> Result<(), StepError> {
    let store = scope.store()?;
    store.require_absent(name)?;
    let uuid = scope.with_rng(|rng| generator.uuid(rng))?;
    store.set(name, TypedValue::String(uuid.to_string()))?;
    Ok(())
}

/// Stores one generated text value under a new variable.
fn store_drawn(
    scope: &ScopeHandle,
    name: &str,
    draw: impl FnOnce(&mut SeededRng) -> String,
) -> Result<(), StepError> {
    let store = scope.store()?;
    store.require_absent(name)?;
    let text = scope.with_rng(draw)?;
    debug!(variable = name, value = %text, "generated value");
    store.set(name, TypedValue::String(text))?;
    Ok(())
}

/// Phone number following `mask` (interpolated), e.g. `7##########`.
pub fn store_random_phone(
    scope: &ScopeHandle,
    generator: &dyn DataGenerator,
    mask: &str,
    name: &str,
) -> Result<(), StepError> {
    let mask = scope.resolve(mask)?;
    store_drawn(scope, name, |rng| generator.phone(rng, &mask))
}

pub fn store_random_month(
    scope: &ScopeHandle,
    generator: &dyn DataGenerator,
    name: &str,
) -> Result<(), StepError> {
    store_drawn(scope, name, |rng| generator.month(rng).to_string())
}

pub fn store_random_weekday(
    scope: &ScopeHandle,
    generator: &dyn DataGenerator,
    name: &str,
) -> Result<(), StepError> {
    store_drawn(scope, name, |rng| generator.weekday(rng).to_string())
}

pub fn store_random_email(
    scope: &ScopeHandle,
    generator: &dyn DataGenerator,
    provider: &str,
    name: &str,
) -> Result<(), StepError> {
    let provider = scope.resolve(provider)?;
    store_drawn(scope, name, |rng| generator.email(rng, &provider))
}

pub fn store_random_ip(
    scope: &ScopeHandle,
    generator: &dyn DataGenerator,
    name: &str,
) -> Result<(), StepError> {
    store_drawn(scope, name, |rng| generator.ip(rng).to_string())
}

pub fn store_random_url(
    scope: &ScopeHandle,
    generator: &dyn DataGenerator,
    name: &str,
) -> Result<(), StepError> {
    store_drawn(scope, name, |rng| generator.url(rng))
}
