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

//! CCSDS Orbit Mean-Elements Message records in the JSON form served by space-track.org and celestrak.
//! Numeric values can be JSON numbers or strings (space-track sends everything as strings)

use serde::{Serialize,Deserialize};
use serde_json::Value;
use spacetrace_common::datetime::parse_datetime;

use crate::elements::OrbitalElementSet;
use crate::errors::{Result, SpaceTraceError, malformed};

#[derive(Debug,Clone,Default,PartialEq,Serialize,Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct OmmRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_frame: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_system: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean_element_theory: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epoch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean_motion: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eccentricity: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inclination: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ra_of_asc_node: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arg_of_pericenter: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean_anomaly: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ephemeris_type: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub norad_cat_id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_set_no: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rev_at_epoch: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bstar: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean_motion_dot: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean_motion_ddot: Option<Value>,
}

impl OmmRecord {
    /// convert into a validated element set. Fails if a required key is missing or a value is out of range
    pub fn to_elements (&self)->Result<OrbitalElementSet> {
        if let Some(theory) = &self.mean_element_theory {
            if !theory.eq_ignore_ascii_case("SGP4") {
                return Err( malformed!("MEAN_ELEMENT_THEORY", "unsupported theory '{theory}'"))
            }
        }
        if let Some(frame) = &self.ref_frame {
            if !frame.eq_ignore_ascii_case("TEME") {
                return Err( malformed!("REF_FRAME", "unsupported reference frame '{frame}'"))
            }
        }

        let epoch_spec = self.epoch.as_deref().ok_or( malformed!("EPOCH", "missing required key"))?;
        let epoch = parse_datetime( epoch_spec).ok_or( malformed!("EPOCH", "invalid datetime '{epoch_spec}'"))?;

        let sat_id = required_number( &self.norad_cat_id, "NORAD_CAT_ID")?;
        if sat_id < 0.0 || sat_id.fract() != 0.0 || sat_id > u32::MAX as f64 {
            return Err( malformed!("NORAD_CAT_ID", "not a catalog number: {sat_id}"))
        }

        let classification = self.classification_type.as_deref()
            .and_then( |s| s.trim().chars().next())
            .unwrap_or('U');

        let elements = OrbitalElementSet {
            sat_id: sat_id as u32,
            name: self.object_name.as_ref().map( |s| s.trim().to_string()).filter( |s| !s.is_empty()),
            intl_designator: match self.object_id.as_deref() {
                Some(id) => tle_intl_designator( id)?,
                None => None
            },
            classification,
            epoch,
            mean_motion: required_number( &self.mean_motion, "MEAN_MOTION")?,
            mean_motion_dot: optional_number( &self.mean_motion_dot, "MEAN_MOTION_DOT")?.unwrap_or(0.0),
            mean_motion_ddot: optional_number( &self.mean_motion_ddot, "MEAN_MOTION_DDOT")?.unwrap_or(0.0),
            eccentricity: required_number( &self.eccentricity, "ECCENTRICITY")?,
            inclination: required_number( &self.inclination, "INCLINATION")?,
            raan: required_number( &self.ra_of_asc_node, "RA_OF_ASC_NODE")?,
            arg_of_perigee: required_number( &self.arg_of_pericenter, "ARG_OF_PERICENTER")?,
            mean_anomaly: required_number( &self.mean_anomaly, "MEAN_ANOMALY")?,
            bstar: optional_number( &self.bstar, "BSTAR")?.unwrap_or(0.0),
            ephemeris_type: optional_count( &self.ephemeris_type, "EPHEMERIS_TYPE")?.min(9) as u8,
            element_set_no: optional_count( &self.element_set_no, "ELEMENT_SET_NO")?,
            rev_at_epoch: optional_count( &self.rev_at_epoch, "REV_AT_EPOCH")?,
        };
        elements.validate()?;

        Ok(elements)
    }
}

impl From<&OrbitalElementSet> for OmmRecord {
    fn from (e: &OrbitalElementSet)->Self {
        fn num (v: f64)->Option<Value> { Some( Value::String( v.to_string())) }
        fn count (v: u32)->Option<Value> { Some( Value::String( v.to_string())) }

        OmmRecord {
            object_name: e.name.clone(),
            object_id: e.intl_designator.as_deref().map( omm_object_id),
            center_name: Some("EARTH".to_string()),
            ref_frame: Some("TEME".to_string()),
            time_system: Some("UTC".to_string()),
            mean_element_theory: Some("SGP4".to_string()),
            epoch: Some( e.epoch.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()),
            mean_motion: num( e.mean_motion),
            eccentricity: num( e.eccentricity),
            inclination: num( e.inclination),
            ra_of_asc_node: num( e.raan),
            arg_of_pericenter: num( e.arg_of_perigee),
            mean_anomaly: num( e.mean_anomaly),
            ephemeris_type: count( e.ephemeris_type as u32),
            classification_type: Some( e.classification.to_string()),
            norad_cat_id: count( e.sat_id),
            element_set_no: count( e.element_set_no),
            rev_at_epoch: count( e.rev_at_epoch),
            bstar: num( e.bstar),
            mean_motion_dot: num( e.mean_motion_dot),
            mean_motion_ddot: num( e.mean_motion_ddot),
        }
    }
}

/// parse a JSON array of OMM records or a single OMM object
pub fn parse_omm_list (text: &str)->Result<Vec<OrbitalElementSet>> {
    let value: Value = serde_json::from_str( text).map_err( |e| malformed!("OMM", "invalid JSON: {e}"))?;

    match value {
        Value::Array(items) => items.into_iter().map( record_from_value).collect(),
        obj @ Value::Object(_) => Ok( vec![ record_from_value( obj)? ] ),
        _ => Err( SpaceTraceError::UnsupportedFormat( "OMM data has to be a JSON object or array".to_string()))
    }
}

fn record_from_value (v: Value)->Result<OrbitalElementSet> {
    let rec: OmmRecord = serde_json::from_value(v).map_err( |e| malformed!("OMM", "invalid record: {e}"))?;
    rec.to_elements()
}

fn optional_number (v: &Option<Value>, field: &str)->Result<Option<f64>> {
    match v {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n.as_f64().map( Some).ok_or( malformed!( field, "invalid number {n}")),
        Some(Value::String(s)) => {
            let s = s.trim();
            if s.is_empty() { 
                Ok(None) 
            } else { 
                s.parse::<f64>().map( Some).map_err( |_| malformed!( field, "not a number '{s}'")) 
            }
        }
        Some(other) => Err( malformed!( field, "unexpected value {other}"))
    }
}

fn required_number (v: &Option<Value>, field: &str)->Result<f64> {
    optional_number( v, field)?.ok_or( malformed!( field, "missing required key"))
}

fn optional_count (v: &Option<Value>, field: &str)->Result<u32> {
    match optional_number( v, field)? {
        None => Ok(0),
        Some(x) if x >= 0.0 && x.fract() == 0.0 && x <= u32::MAX as f64 => Ok(x as u32),
        Some(x) => Err( malformed!( field, "not a count: {x}"))
    }
}

/// "2022-150A" -> "22150A". Designators have to be ASCII since they end up in TLE columns
fn tle_intl_designator (object_id: &str)->Result<Option<String>> {
    let s = object_id.trim();
    if s.is_empty() { return Ok(None) }
    if !s.is_ascii() {
        return Err( malformed!("OBJECT_ID", "non-ASCII designator '{s}'"))
    }

    match s.split_once('-') {
        Some((year,rest)) if year.len() == 4 && year.chars().all( |c| c.is_ascii_digit()) => Ok( Some( format!("{}{}", &year[2..], rest))),
        _ => Ok( Some( s.to_string()))
    }
}

/// "22150A" -> "2022-150A" (same century rule as TLE epochs)
fn omm_object_id (intl: &str)->String {
    let s = intl.trim();
    let has_year = s.len() > 2 && s.is_char_boundary(2) && s[..2].chars().all( |c| c.is_ascii_digit());
    if has_year && !s.contains('-') {
        let yy: u32 = s[..2].parse().unwrap_or(0);
        let year = if yy < 57 { 2000 + yy } else { 1900 + yy };
        format!("{year}-{}", &s[2..])
    } else {
        s.to_string()
    }
}
