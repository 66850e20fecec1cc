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

//! parsing and formatting of NORAD two-line element sets. Columns are 0-based, end-exclusive:
//! ```text
//! 1 25544U 98067A   25087.72483446  .00032194  00000-0  56484-3 0  9999
//! 2 25544  51.6386 345.5386 0004029  59.5799 332.6073 15.50242233502686
//! ```

use std::{ops::Range, sync::LazyLock};
use regex::Regex;
use spacetrace_common::datetime::{datetime_from_year_and_day, year_and_day};

use crate::elements::OrbitalElementSet;
use crate::errors::{Result, SpaceTraceError, malformed};

pub const TLE_LINE_LEN: usize = 69;

/// implied decimal point and exponent fields such as " 56484-3" (= 0.56484e-3) or "-11606-4"
static EXP_FIELD_RE: LazyLock<Regex> = LazyLock::new(||
    Regex::new( r"^([+-]?)(\d{1,5})([+-]?)(\d)$").unwrap()
);

/// modulo 10 checksum over the first 68 chars. Digits count with their value, '-' counts as 1
pub fn checksum (line: &str)->u32 {
    line.chars().take( TLE_LINE_LEN-1).map( |c| {
        match c {
            '-' => 1,
            c => c.to_digit(10).unwrap_or(0)
        }
    }).sum::<u32>() % 10
}

/// find the (optional) name line and the two data lines in a text. The data lines have to be the first
/// two non-empty lines, or the second and third if there is a leading name line
pub fn find_tle_lines (text: &str)->Option<(Option<&str>,&str,&str)> {
    let lines: Vec<&str> = text.lines().map( |l| l.trim_end()).filter( |l| !l.is_empty()).collect();

    for i in 0..2 {
        if lines.len() >= i+2 && lines[i].starts_with("1 ") && lines[i+1].starts_with("2 ") {
            let name = if i == 1 { Some( strip_name_prefix( lines[0])) } else { None };
            return Some( (name, lines[i], lines[i+1]) )
        }
    }
    None
}

// space-track 3LE data prefixes names with "0 "
fn strip_name_prefix (line: &str)->&str {
    let line = line.trim();
    line.strip_prefix("0 ").unwrap_or(line).trim()
}

/// parse a 2 or 3 line TLE text
pub fn parse_tle_text (text: &str)->Result<OrbitalElementSet> {
    if let Some((name,line1,line2)) = find_tle_lines( text) {
        parse_tle( name, line1, line2)
    } else {
        Err( malformed!("TLE", "no consecutive line 1 / line 2 pair found"))
    }
}

/// parse a TLE from its data lines. Fails if a checksum does not match, fixed columns do not parse
/// or the resulting elements are out of range
pub fn parse_tle (name: Option<&str>, line1: &str, line2: &str)->Result<OrbitalElementSet> {
    let line1 = check_line( line1, '1')?;
    let line2 = check_line( line2, '2')?;

    let sat_id = parse_int( field( line1, 2..7), "NORAD_CAT_ID")?;
    if parse_int( field( line2, 2..7), "NORAD_CAT_ID")? != sat_id {
        return Err( malformed!("NORAD_CAT_ID", "catalog numbers of line 1 and line 2 differ"))
    }

    let classification = match line1.as_bytes()[7] {
        b' ' => 'U',
        c => c as char
    };
    let intl_designator = Some( field( line1, 9..17).trim()).filter(|s| !s.is_empty()).map( |s| s.to_string());

    let yy = parse_int( field( line1, 18..20), "EPOCH")? as i32;
    let year = if yy < 57 { 2000 + yy } else { 1900 + yy };
    let day = parse_float( field( line1, 20..32), "EPOCH")?;
    let epoch = datetime_from_year_and_day( year, day).ok_or( malformed!("EPOCH", "invalid day of year {day}"))?;

    let mean_motion_dot = parse_float( field( line1, 33..43), "MEAN_MOTION_DOT")?;
    let mean_motion_ddot = parse_exp_field( field( line1, 44..52), "MEAN_MOTION_DDOT")?;
    let bstar = parse_exp_field( field( line1, 53..61), "BSTAR")?;
    let ephemeris_type = parse_int_or_zero( field( line1, 62..63), "EPHEMERIS_TYPE")? as u8;
    let element_set_no = parse_int_or_zero( field( line1, 64..68), "ELEMENT_SET_NO")?;

    let inclination = parse_float( field( line2, 8..16), "INCLINATION")?;
    let raan = parse_float( field( line2, 17..25), "RA_OF_ASC_NODE")?;
    let ecc_digits = field( line2, 26..33).trim();
    if ecc_digits.is_empty() || !ecc_digits.chars().all( |c| c.is_ascii_digit()) {
        return Err( malformed!("ECCENTRICITY", "not an implied decimal digit field '{ecc_digits}'"))
    }
    let eccentricity = parse_float( &format!("0.{ecc_digits}"), "ECCENTRICITY")?;
    let arg_of_perigee = parse_float( field( line2, 34..42), "ARG_OF_PERICENTER")?;
    let mean_anomaly = parse_float( field( line2, 43..51), "MEAN_ANOMALY")?;
    let mean_motion = parse_float( field( line2, 52..63), "MEAN_MOTION")?;
    let rev_at_epoch = parse_int_or_zero( field( line2, 63..68), "REV_AT_EPOCH")?;

    let elements = OrbitalElementSet {
        sat_id,
        name: name.map( |s| s.to_string()).filter( |s| !s.is_empty()),
        intl_designator,
        classification,
        epoch,
        mean_motion,
        mean_motion_dot,
        mean_motion_ddot,
        eccentricity,
        inclination,
        raan,
        arg_of_perigee,
        mean_anomaly,
        bstar,
        ephemeris_type,
        element_set_no,
        rev_at_epoch,
    };
    elements.validate()?;

    Ok(elements)
}

fn check_line (line: &str, line_no: char)->Result<&str> {
    let line = line.trim_end();
    let field_name = format!("line {line_no}");

    if !line.is_ascii() {
        return Err( malformed!( field_name, "non-ASCII characters"))
    }
    if line.len() != TLE_LINE_LEN {
        return Err( malformed!( field_name, "length {} instead of {}", line.len(), TLE_LINE_LEN))
    }
    if !line.starts_with(line_no) || line.as_bytes()[1] != b' ' {
        return Err( malformed!( field_name, "does not start with '{line_no} '"))
    }

    let expected = checksum( line);
    match line.as_bytes()[TLE_LINE_LEN-1] {
        c if c.is_ascii_digit() && (c - b'0') as u32 == expected => Ok(line),
        c => Err( malformed!( format!("line {line_no} checksum"), "'{}' does not match computed {}", c as char, expected))
    }
}

// only called on checked ASCII lines of the right length
fn field (line: &str, range: Range<usize>)->&str {
    &line[range]
}

fn parse_float (s: &str, field_name: &str)->Result<f64> {
    let s = s.trim();
    s.parse::<f64>().map_err( |_| malformed!( field_name, "not a number '{s}'"))
}

fn parse_int (s: &str, field_name: &str)->Result<u32> {
    let s = s.trim();
    s.parse::<u32>().map_err( |_| malformed!( field_name, "not an unsigned integer '{s}'"))
}

fn parse_int_or_zero (s: &str, field_name: &str)->Result<u32> {
    if s.trim().is_empty() { Ok(0) } else { parse_int( s, field_name) }
}

fn parse_exp_field (s: &str, field_name: &str)->Result<f64> {
    let s = s.trim();
    if s.is_empty() { return Ok(0.0) }

    let cap = EXP_FIELD_RE.captures(s).ok_or( malformed!( field_name, "not an exponent field '{s}'"))?;
    let sign = if &cap[1] == "-" { -1.0 } else { 1.0 };
    let mantissa = parse_float( &format!("0.{}", &cap[2]), field_name)?;
    let exp = parse_float( &cap[4], field_name)? as i32;
    let exp = if &cap[3] == "-" { -exp } else { exp };

    Ok( sign * mantissa * 10f64.powi(exp))
}

/* #region formatting ****************************************************************************/

/// the two checksummed data lines for an element set
pub fn format_tle (e: &OrbitalElementSet)->(String,String) {
    let (year, day) = year_and_day( &e.epoch);
    let intl = e.intl_designator.as_deref().unwrap_or("");

    let line1 = format!("1 {:05}{} {:<8} {:02}{:012.8} {} {} {} {} {:4}",
        e.sat_id % 100000, e.classification, intl, year.rem_euclid(100), day,
        format_ndot( e.mean_motion_dot), format_exp_field( e.mean_motion_ddot), format_exp_field( e.bstar),
        e.ephemeris_type % 10, e.element_set_no % 10000
    );

    let line2 = format!("2 {:05} {:8.4} {:8.4} {:07} {:8.4} {:8.4} {:11.8}{:5}",
        e.sat_id % 100000, e.inclination, e.raan, (e.eccentricity * 1e7).round() as u64,
        e.arg_of_perigee, e.mean_anomaly, e.mean_motion, e.rev_at_epoch % 100000
    );

    (with_checksum(line1), with_checksum(line2))
}

fn with_checksum (line: String)->String {
    let cs = checksum( &line);
    format!("{line}{cs}")
}

/// " .00032194" style
fn format_ndot (v: f64)->String {
    let s = format!("{:.8}", v.abs());
    let digits = s.strip_prefix('0').unwrap_or( &s);
    format!("{}{}", if v < 0.0 { '-' } else { ' ' }, digits)
}

/// " 56484-3" style
fn format_exp_field (v: f64)->String {
    if v == 0.0 { return " 00000-0".to_string() }

    let sign = if v < 0.0 { '-' } else { ' ' };
    let a = v.abs();
    let mut exp = a.log10().floor() as i32 + 1;
    let mut mantissa = (a / 10f64.powi(exp) * 1e5).round() as u32;
    if mantissa >= 100000 {
        mantissa /= 10;
        exp += 1;
    }
    let exp_sign = if exp < 0 { '-' } else { '+' };

    format!("{sign}{mantissa:05}{exp_sign}{}", exp.abs().min(9))
}

/* #endregion formatting */

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exp_field() {
        assert!( (parse_exp_field( " 56484-3", "x").unwrap() - 0.56484e-3).abs() < 1e-15);
        assert!( (parse_exp_field( "-11606-4", "x").unwrap() + 0.11606e-4).abs() < 1e-15);
        assert_eq!( parse_exp_field( " 00000-0", "x").unwrap(), 0.0);
        assert!( parse_exp_field( " 5x484-3", "x").is_err());

        assert_eq!( format_exp_field( 0.56484e-3), " 56484-3");
        assert_eq!( format_exp_field( -0.11606e-4), "-11606-4");
        assert_eq!( format_exp_field( 0.0), " 00000-0");
    }

    #[test]
    fn test_ndot() {
        assert_eq!( format_ndot( 0.00032194), " .00032194");
        assert_eq!( format_ndot( -0.00000123), "-.00000123");
    }

    #[test]
    fn test_find_lines() {
        let text = "0 NOAA 21\n1 54234U 22150A   25076.92835707  .00000366  00000-0  19403-3 0  9994\n2 54234  98.7204  17.0432 0002710  72.7407 287.4066 14.19556514121811\n";
        let (name, l1, l2) = find_tle_lines( text).unwrap();
        assert_eq!( name, Some("NOAA 21"));
        assert!( l1.starts_with("1 54234"));
        assert!( l2.starts_with("2 54234"));
        assert!( find_tle_lines( "hello\nworld").is_none());
    }
}
