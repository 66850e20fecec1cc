/*
 * Copyright © 2025, United States Government, as represented by the Administrator of 
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License"); 
 * you may not use this file except in compliance with the License. You may obtain a copy 
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, SecondsFormat, TimeDelta, TimeZone, Utc};
use serde::Serializer;

/// julian date of the unix epoch (1970-01-01T00:00:00Z)
pub const JD_UNIX_EPOCH: f64 = 2440587.5;

pub const SECONDS_PER_DAY: f64 = 86400.0;
pub const MINUTES_PER_DAY: f64 = 1440.0;

/// julian date (UTC based - we do not distinguish UT1 at the accuracy level of mean element propagation)
pub fn julian_date<Tz: TimeZone> (dt: &DateTime<Tz>)->f64 {
    let secs = dt.timestamp() as f64 + dt.timestamp_subsec_nanos() as f64 * 1e-9;
    JD_UNIX_EPOCH + secs / SECONDS_PER_DAY
}

/// fractional minutes of a time delta, with microsecond resolution
pub fn fractional_minutes (d: TimeDelta)->f64 {
    match d.num_microseconds() {
        Some(us) => us as f64 / 60e6,
        None => d.num_milliseconds() as f64 / 60e3  // beyond ±292k years
    }
}

/// minutes from `t0` to `t`, negative if `t` is before `t0`
pub fn minutes_since (t0: &DateTime<Utc>, t: &DateTime<Utc>)->f64 {
    fractional_minutes( *t - *t0)
}

/// add fractional minutes (rounded to microseconds). Returns None if the result is out of range
pub fn add_minutes (dt: &DateTime<Utc>, minutes: f64)->Option<DateTime<Utc>> {
    if !minutes.is_finite() { return None }
    let us = (minutes * 60e6).round();
    if us.abs() > i64::MAX as f64 { return None }
    dt.checked_add_signed( TimeDelta::microseconds( us as i64))
}

/// the instant that corresponds to a (4 digit) year and a 1-based fractional day of that year, as used
/// by TLE epochs (e.g. 25087.72483446 is year 2025, day 87.72483446)
pub fn datetime_from_year_and_day (year: i32, day: f64)->Option<DateTime<Utc>> {
    if !(day >= 1.0 && day < 367.0) { return None }

    let jan1 = NaiveDate::from_ymd_opt( year, 1, 1)?.and_hms_opt( 0, 0, 0)?;
    let us = ((day - 1.0) * SECONDS_PER_DAY * 1e6).round() as i64;
    let dt = jan1.checked_add_signed( TimeDelta::microseconds(us))?;

    Some( Utc.from_utc_datetime( &dt))
}

/// the inverse of [`datetime_from_year_and_day`]
pub fn year_and_day (dt: &DateTime<Utc>)->(i32,f64) {
    let year = dt.year();
    let jan1 = Utc.with_ymd_and_hms( year, 1, 1, 0, 0, 0).single().unwrap_or(*dt);
    let day = 1.0 + fractional_minutes( *dt - jan1) / MINUTES_PER_DAY;
    (year, day)
}

/// parse RFC3339 or a naive (UTC) ISO date/datetime spec as used in OMM records and command lines
pub fn parse_datetime (s: &str)->Option<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.to_utc())
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some( Utc.from_utc_datetime(&ndt))
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
        .and_then( |nd| nd.and_hms_opt(0,0,0))
        .map( |ndt| Utc.from_utc_datetime(&ndt))
}

/// RFC3339 with millisecond resolution and 'Z' suffix, e.g. "2025-03-28T17:23:45.697Z"
pub fn rfc3339_millis (dt: &DateTime<Utc>)->String {
    dt.to_rfc3339_opts( SecondsFormat::Millis, true)
}

pub fn ser_rfc3339_millis<S: Serializer> (dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error>  {
    s.serialize_str( &rfc3339_millis(dt))
}
