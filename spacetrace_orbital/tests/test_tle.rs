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

use chrono::{TimeZone,Utc};
use spacetrace_orbital::{
    elements::{ElementFormat, parse_element_data, parse_elements, save_raw_elements, raw_elements_path, load_element_file},
    errors::SpaceTraceError,
    omm::{OmmRecord, parse_omm_list},
    tle::{checksum, format_tle, parse_tle, parse_tle_text},
};

/* #region test-data *************************************************************/

const ISS_LINE1: &str = "1 25544U 98067A   25087.72483446  .00032194  00000-0  56484-3 0  9999";
const ISS_LINE2: &str = "2 25544  51.6386 345.5386 0004029  59.5799 332.6073 15.50242233502686";

const NOAA21_TLE: &str = r#"0 NOAA 21
1 54234U 22150A   25076.92835707  .00000366  00000-0  19403-3 0  9994
2 54234  98.7204  17.0432 0002710  72.7407 287.4066 14.19556514121811
"#;

const NOAA21_OMM: &str = r#"[
  {
    "CCSDS_OMM_VERS": "2.0",
    "COMMENT": "GENERATED VIA SPACE-TRACK.ORG API",
    "CREATION_DATE": "2025-03-18T02:25:22",
    "ORIGINATOR": "18 SPCS",
    "OBJECT_NAME": "NOAA 21",
    "OBJECT_ID": "2022-150A",
    "CENTER_NAME": "EARTH",
    "REF_FRAME": "TEME",
    "TIME_SYSTEM": "UTC",
    "MEAN_ELEMENT_THEORY": "SGP4",
    "EPOCH": "2025-03-17T22:16:50.050848",
    "MEAN_MOTION": "14.19556514",
    "ECCENTRICITY": "0.00027100",
    "INCLINATION": "98.7204",
    "RA_OF_ASC_NODE": "17.0432",
    "ARG_OF_PERICENTER": "72.7407",
    "MEAN_ANOMALY": "287.4066",
    "EPHEMERIS_TYPE": "0",
    "CLASSIFICATION_TYPE": "U",
    "NORAD_CAT_ID": "54234",
    "ELEMENT_SET_NO": "999",
    "REV_AT_EPOCH": "12181",
    "BSTAR": "0.00019403000000",
    "MEAN_MOTION_DOT": "0.00000366",
    "MEAN_MOTION_DDOT": "0.0000000000000",
    "DECAY_DATE": null,
    "TLE_LINE0": "0 NOAA 21"
  }
]"#;

// no international designator, blank element set fields
const DEEP_SPACE_LINE1: &str = "1 11801U          80230.29629788  .01431103  00000-0  14311-1 0    13";
const DEEP_SPACE_LINE2: &str = "2 11801  46.7916 230.4354 7318036  47.4722  10.4117  2.28537848    13";

/* #endregion test-data */

fn assert_close (a: f64, b: f64, eps: f64) {
    assert!( (a - b).abs() <= eps, "{a} != {b} (eps {eps})");
}

#[test]
fn test_parse_iss() {
    let e = parse_tle( Some("ISS (ZARYA)"), ISS_LINE1, ISS_LINE2).unwrap();
    println!("{e}");

    assert_eq!( e.sat_id, 25544);
    assert_eq!( e.name.as_deref(), Some("ISS (ZARYA)"));
    assert_eq!( e.intl_designator.as_deref(), Some("98067A"));
    assert_eq!( e.classification, 'U');
    assert_close( e.mean_motion, 15.50242233, 1e-12);
    assert_close( e.mean_motion_dot, 0.00032194, 1e-14);
    assert_close( e.bstar, 0.56484e-3, 1e-15);
    assert_close( e.eccentricity, 0.0004029, 1e-12);
    assert_close( e.inclination, 51.6386, 1e-12);
    assert_eq!( e.element_set_no, 999);
    assert_eq!( e.rev_at_epoch, 50268);

    let expected_epoch = Utc.with_ymd_and_hms( 2025, 3, 28, 17, 23, 45).unwrap();
    let dt = (e.epoch - expected_epoch).num_milliseconds();
    assert!( (dt - 697).abs() <= 1, "epoch off by {dt} ms");
}

#[test]
fn test_format_round_trip() {
    let e = parse_tle( None, ISS_LINE1, ISS_LINE2).unwrap();
    let (l1,l2) = format_tle( &e);
    assert_eq!( l1, ISS_LINE1);
    assert_eq!( l2, ISS_LINE2);

    let e = parse_tle_text( NOAA21_TLE).unwrap();
    let (l1,l2) = format_tle( &e);
    let lines: Vec<&str> = NOAA21_TLE.lines().collect();
    assert_eq!( l1, lines[1]);
    assert_eq!( l2, lines[2]);
}

#[test]
fn test_checksum_failure() {
    assert_eq!( checksum( ISS_LINE1), 9);

    let corrupted = ISS_LINE1.replace("9999", "9998");
    match parse_tle( None, &corrupted, ISS_LINE2) {
        Err(SpaceTraceError::MalformedElementSet{ field, .. }) => assert_eq!( field, "line 1 checksum"),
        other => panic!("expected checksum failure, got {other:?}")
    }
}

#[test]
fn test_malformed_lines() {
    assert!( matches!( parse_tle( None, &ISS_LINE1[..60], ISS_LINE2), Err(SpaceTraceError::MalformedElementSet{..})));
    assert!( matches!( parse_tle( None, ISS_LINE2, ISS_LINE1), Err(SpaceTraceError::MalformedElementSet{..})));
    assert!( matches!( parse_tle_text( "just some text\n"), Err(SpaceTraceError::MalformedElementSet{..})));
}

#[test]
fn test_blank_fields() {
    let e = parse_tle( None, DEEP_SPACE_LINE1, DEEP_SPACE_LINE2).unwrap();
    assert_eq!( e.sat_id, 11801);
    assert!( e.intl_designator.is_none());
    assert_eq!( e.element_set_no, 1);
    assert_eq!( e.rev_at_epoch, 1);
    assert_close( e.eccentricity, 0.7318036, 1e-12);
    assert!( e.period_minutes() > 225.0);
}

#[test]
fn test_omm() {
    let list = parse_omm_list( NOAA21_OMM).unwrap();
    assert_eq!( list.len(), 1);
    let omm = &list[0];
    let tle = parse_tle_text( NOAA21_TLE).unwrap();

    assert_eq!( omm.sat_id, tle.sat_id);
    assert_eq!( omm.name, tle.name);
    assert_eq!( omm.intl_designator, tle.intl_designator);
    assert_eq!( omm.element_set_no, 999);
    assert_eq!( omm.rev_at_epoch, 12181);
    assert_close( omm.mean_motion, tle.mean_motion, 1e-12);
    assert_close( omm.eccentricity, tle.eccentricity, 1e-12);
    assert_close( omm.bstar, tle.bstar, 1e-15);
    assert!( (omm.epoch - tle.epoch).num_milliseconds().abs() <= 1);
}

#[test]
fn test_omm_numbers_and_missing_keys() {
    let text = r#"{ "NORAD_CAT_ID": 54234, "EPOCH": "2025-03-17T22:16:50.050848", "MEAN_MOTION": 14.19556514,
        "ECCENTRICITY": 0.000271, "INCLINATION": 98.7204, "RA_OF_ASC_NODE": 17.0432, "ARG_OF_PERICENTER": 72.7407,
        "MEAN_ANOMALY": 287.4066 }"#;
    let list = parse_omm_list( text).unwrap();
    assert_eq!( list[0].sat_id, 54234);
    assert_eq!( list[0].bstar, 0.0);
    assert!( list[0].name.is_none());

    let missing = text.replace( r#""MEAN_MOTION": 14.19556514,"#, "");
    match parse_omm_list( &missing) {
        Err(SpaceTraceError::MalformedElementSet{ field, .. }) => assert_eq!( field, "MEAN_MOTION"),
        other => panic!("expected missing MEAN_MOTION, got {other:?}")
    }

    let bad_ecc = text.replace( "0.000271", "1.2");
    assert!( matches!( parse_omm_list( &bad_ecc), Err(SpaceTraceError::MalformedElementSet{..})));
}

#[test]
fn test_omm_non_ascii_designator() {
    let text = r#"{ "OBJECT_ID": "aéb-1", "NORAD_CAT_ID": "54234", "EPOCH": "2025-03-17T22:16:50.050848", "MEAN_MOTION": "14.19556514",
        "ECCENTRICITY": "0.000271", "INCLINATION": "98.7204", "RA_OF_ASC_NODE": "17.0432", "ARG_OF_PERICENTER": "72.7407",
        "MEAN_ANOMALY": "287.4066" }"#;

    match parse_elements( text, ElementFormat::Omm) {
        Err(SpaceTraceError::MalformedElementSet{ field, .. }) => assert_eq!( field, "OBJECT_ID"),
        other => panic!("expected malformed OBJECT_ID, got {other:?}")
    }

    let list = parse_omm_list( &text.replace( "aéb-1", "TBD-1")).unwrap();
    assert_eq!( list[0].intl_designator.as_deref(), Some("TBD-1"));
}

#[test]
fn test_omm_record_conversion() {
    let tle = parse_tle_text( NOAA21_TLE).unwrap();
    let rec = OmmRecord::from( &tle);
    let json = serde_json::to_string( &vec![rec]).unwrap();
    let list = parse_omm_list( &json).unwrap();

    assert_eq!( list[0].sat_id, tle.sat_id);
    assert_eq!( list[0].intl_designator, tle.intl_designator);
    assert_close( list[0].mean_motion, tle.mean_motion, 1e-12);
    assert!( (list[0].epoch - tle.epoch).num_milliseconds().abs() <= 1);
}

#[test]
fn test_format_detection() {
    assert_eq!( ElementFormat::detect( NOAA21_TLE).unwrap(), ElementFormat::Tle);
    assert_eq!( ElementFormat::detect( NOAA21_OMM).unwrap(), ElementFormat::Omm);
    assert!( matches!( ElementFormat::detect( "<xml/>"), Err(SpaceTraceError::UnsupportedFormat(_))));

    let e = parse_element_data( NOAA21_OMM).unwrap();
    assert_eq!( e.sat_id, 54234);
    assert!( parse_elements( NOAA21_TLE, ElementFormat::Omm).is_err());
}

#[test]
fn test_element_files() {
    let dir = tempfile::tempdir().unwrap();
    let tle_path = dir.path().join("noaa21.tle");
    std::fs::write( &tle_path, NOAA21_TLE).unwrap();

    let (e,format) = load_element_file( &tle_path).unwrap();
    assert_eq!( format, ElementFormat::Tle);
    assert_eq!( e.sat_id, 54234);

    let xyz_path = dir.path().join("noaa21.xyz");
    std::fs::write( &xyz_path, NOAA21_TLE).unwrap();
    assert!( matches!( load_element_file( &xyz_path), Err(SpaceTraceError::UnsupportedFormat(_))));

    // raw data is saved next to the export path
    let out = dir.path().join("track.geojson");
    let raw = save_raw_elements( &out, &e, ElementFormat::Tle).unwrap();
    assert_eq!( raw, dir.path().join("track_tle.txt"));
    let (e2,_) = load_element_file( &raw).unwrap();
    assert_eq!( format_tle( &e), format_tle( &e2));

    let raw = save_raw_elements( &out, &e, ElementFormat::Omm).unwrap();
    assert_eq!( raw, raw_elements_path( &out, ElementFormat::Omm));
    let (e3,format) = load_element_file( &raw).unwrap();
    assert_eq!( format, ElementFormat::Omm);
    assert_eq!( e3.sat_id, e.sat_id);
}
