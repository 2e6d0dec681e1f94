//! Group selection and NEWGROUPS argument parsing

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

/// Parse the `NEWGROUPS date time [GMT|UTC]` arguments
///
/// `date` is `yymmdd` or `yyyymmdd`; two-digit years below 70 are taken as
/// 20yy. Without `GMT`/`UTC` the time is server local time.
pub fn parse_newgroups_time(date: &str, time: &str, zone: Option<&str>) -> Option<DateTime<Utc>> {
    if !date.bytes().all(|b| b.is_ascii_digit()) || !time.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if time.len() != 6 {
        return None;
    }
    let (year, rest) = match date.len() {
        6 => {
            let yy: i32 = date[..2].parse().ok()?;
            (if yy < 70 { 2000 + yy } else { 1900 + yy }, &date[2..])
        }
        8 => (date[..4].parse().ok()?, &date[4..]),
        _ => return None,
    };
    let day = NaiveDate::from_ymd_opt(year, rest[..2].parse().ok()?, rest[2..].parse().ok()?)?;
    let clock = NaiveTime::from_hms_opt(
        time[..2].parse().ok()?,
        time[2..4].parse().ok()?,
        time[4..].parse().ok()?,
    )?;
    let naive = NaiveDateTime::new(day, clock);

    match zone.map(str::to_ascii_uppercase).as_deref() {
        Some("GMT" | "UTC") => Some(Utc.from_utc_datetime(&naive)),
        _ => Local
            .from_local_datetime(&naive)
            .earliest()
            .map(|t| t.with_timezone(&Utc)),
    }
}
