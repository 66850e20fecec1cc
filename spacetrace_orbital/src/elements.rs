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

use std::{fmt, path::{Path,PathBuf}};
use chrono::{DateTime,Utc};
use serde::{Serialize,Deserialize};
use tracing::{debug,info};
use spacetrace_common::{datetime, fs::{filepath_contents_as_string, lowercase_extension, sibling_path, write_file_atomic}};

use crate::errors::{Result, SpaceTraceError, malformed};
use crate::{tle, omm::{self, OmmRecord}};

/// gravitational parameter used to derive semi-major axis from mean motion (WGS72, km³/s²)
pub const MU_WGS72: f64 = 398600.8;

/// the normalized orbital element set obtained from a TLE or OMM record.
/// Angles are in degrees, mean motion in revolutions per day. The first and second derivatives of the
/// mean motion use the TLE convention (already divided by 2 and 6)
#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
pub struct OrbitalElementSet {
    pub sat_id: u32,
    pub name: Option<String>,
    pub intl_designator: Option<String>,
    pub classification: char,

    #[serde(serialize_with = "datetime::ser_rfc3339_millis")]
    pub epoch: DateTime<Utc>,

    pub mean_motion: f64,
    pub mean_motion_dot: f64,
    pub mean_motion_ddot: f64,
    pub eccentricity: f64,
    pub inclination: f64,
    pub raan: f64,
    pub arg_of_perigee: f64,
    pub mean_anomaly: f64,
    pub bstar: f64,

    pub ephemeris_type: u8,
    pub element_set_no: u32,
    pub rev_at_epoch: u32,
}

impl OrbitalElementSet {

    /// check the invariants of a parsed element set
    pub fn validate (&self)->Result<()> {
        let finite = [ 
            ("MEAN_MOTION", self.mean_motion), ("ECCENTRICITY", self.eccentricity), ("INCLINATION", self.inclination),
            ("RA_OF_ASC_NODE", self.raan), ("ARG_OF_PERICENTER", self.arg_of_perigee), ("MEAN_ANOMALY", self.mean_anomaly),
            ("BSTAR", self.bstar), ("MEAN_MOTION_DOT", self.mean_motion_dot), ("MEAN_MOTION_DDOT", self.mean_motion_ddot)
        ];
        for (field,v) in finite {
            if !v.is_finite() { return Err( malformed!( field, "not a finite number: {v}")) }
        }

        if !(0.0..1.0).contains( &self.eccentricity) {
            return Err( malformed!("ECCENTRICITY", "{} not in [0,1)", self.eccentricity))
        }
        if !(0.0..=180.0).contains( &self.inclination) {
            return Err( malformed!("INCLINATION", "{} not in [0,180]", self.inclination))
        }
        if self.mean_motion <= 0.0 {
            return Err( malformed!("MEAN_MOTION", "{} is not positive", self.mean_motion))
        }
        for (field,v) in [("RA_OF_ASC_NODE", self.raan), ("ARG_OF_PERICENTER", self.arg_of_perigee), ("MEAN_ANOMALY", self.mean_anomaly)] {
            if !(0.0..=360.0).contains( &v) {
                return Err( malformed!( field, "{v} not in [0,360]"))
            }
        }
        Ok(())
    }

    pub fn epoch_jd (&self)->f64 {
        datetime::julian_date( &self.epoch)
    }

    /// orbital period in minutes
    pub fn period_minutes (&self)->f64 {
        datetime::MINUTES_PER_DAY / self.mean_motion
    }

    /// Kepler semi-major axis in km
    pub fn semi_major_axis (&self)->f64 {
        let n = self.mean_motion * std::f64::consts::TAU / datetime::SECONDS_PER_DAY; // rad/s
        (MU_WGS72 / (n*n)).cbrt()
    }

    /// name if we have one, catalog number otherwise
    pub fn display_name (&self)->String {
        match &self.name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => format!("{:05}", self.sat_id)
        }
    }
}

impl fmt::Display for OrbitalElementSet {
    fn fmt (&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!( f, "{} ({:05}) epoch {} n={:.8} e={:.7} i={:.4}", 
            self.display_name(), self.sat_id, datetime::rfc3339_millis(&self.epoch), 
            self.mean_motion, self.eccentricity, self.inclination)
    }
}

/// the supported element set encodings
#[derive(Debug,Clone,Copy,PartialEq,Eq,Serialize,Deserialize)]
pub enum ElementFormat {
    Tle,
    Omm
}

impl ElementFormat {
    /// guess the format from the payload: JSON means OMM, two (or three with a leading name) lines
    /// whose data lines start with '1 ' and '2 ' mean TLE
    pub fn detect (text: &str)->Result<ElementFormat> {
        let trimmed = text.trim_start();
        if trimmed.starts_with('{') || trimmed.starts_with('[') {
            Ok( ElementFormat::Omm )
        } else if tle::find_tle_lines( text).is_some() {
            Ok( ElementFormat::Tle )
        } else {
            Err( SpaceTraceError::UnsupportedFormat( "neither TLE nor OMM (JSON) data".to_string()))
        }
    }

    /// format from the filename extension of an element file
    pub fn from_path (path: impl AsRef<Path>)->Result<ElementFormat> {
        let path = path.as_ref();
        match lowercase_extension(path).as_deref() {
            Some("tle") | Some("txt") => Ok( ElementFormat::Tle ),
            Some("json") => Ok( ElementFormat::Omm ),
            _ => Err( SpaceTraceError::UnsupportedFormat( format!("unknown element file type {path:?}")))
        }
    }

    /// suffix and extension of raw element files saved next to an export
    fn raw_suffix (&self)->(&'static str, &'static str) {
        match self {
            ElementFormat::Tle => ("_tle", "txt"),
            ElementFormat::Omm => ("_omm", "json")
        }
    }
}

impl fmt::Display for ElementFormat {
    fn fmt (&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementFormat::Tle => write!(f, "TLE"),
            ElementFormat::Omm => write!(f, "OMM"),
        }
    }
}

/// parse raw element data in the given format. Multi-record payloads use the first record
pub fn parse_elements (text: &str, format: ElementFormat)->Result<OrbitalElementSet> {
    let elements = match format {
        ElementFormat::Tle => tle::parse_tle_text( text)?,
        ElementFormat::Omm => {
            let mut list = omm::parse_omm_list( text)?;
            if list.is_empty() {
                return Err( malformed!("OMM", "no records"))
            }
            list.swap_remove(0)
        }
    };
    debug!("parsed {format} element set: {elements}");
    Ok(elements)
}

/// parse raw element data, auto-detecting the format
pub fn parse_element_data (text: &str)->Result<OrbitalElementSet> {
    let format = ElementFormat::detect( text)?;
    parse_elements( text, format)
}

/// read an element file (.tle, .txt or .json)
pub fn load_element_file (path: impl AsRef<Path>)->Result<(OrbitalElementSet,ElementFormat)> {
    let path = path.as_ref();
    let format = ElementFormat::from_path( path)?;
    let text = filepath_contents_as_string( &path)?;
    let elements = parse_elements( &text, format)?;
    info!("loaded {} from {:?}", elements.display_name(), path);

    Ok( (elements,format) )
}

/// path of the raw element file that goes with an export at `path`
pub fn raw_elements_path (path: impl AsRef<Path>, format: ElementFormat)->PathBuf {
    let (suffix,ext) = format.raw_suffix();
    sibling_path( path, suffix, ext)
}

/// save the element set next to `path` as `<stem>_tle.txt` or `<stem>_omm.json`
pub fn save_raw_elements (path: impl AsRef<Path>, elements: &OrbitalElementSet, format: ElementFormat)->Result<PathBuf> {
    let raw_path = raw_elements_path( path, format);

    let contents = match format {
        ElementFormat::Tle => {
            let (line1,line2) = tle::format_tle( elements);
            format!("{line1}\n{line2}\n")
        }
        ElementFormat::Omm => {
            let records = vec![ OmmRecord::from(elements) ];
            serde_json::to_string_pretty( &records)?
        }
    };
    write_file_atomic( &raw_path, contents.as_bytes())?;
    info!("saved raw {format} data to {:?}", raw_path);

    Ok(raw_path)
}
