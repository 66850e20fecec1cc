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

use chrono::TimeDelta;
use spacetrace_common::cartographic::Cartographic;
use spacetrace_orbital::{
    assembler::{assemble_points, split_antimeridian},
    errors::SpaceTraceError,
    frames::{EarthModel, FrameConverter, GroundPoint},
    sampler::TrackSampler,
    tle::parse_tle,
    assemble, compute_track, OrbitalElementSet, TrackWindow,
};

const ISS_LINE1: &str = "1 25544U 98067A   25087.72483446  .00032194  00000-0  56484-3 0  9999";
const ISS_LINE2: &str = "2 25544  51.6386 345.5386 0004029  59.5799 332.6073 15.50242233502686";

fn iss ()->OrbitalElementSet {
    parse_tle( Some("ISS (ZARYA)"), ISS_LINE1, ISS_LINE2).unwrap()
}

fn assert_no_crossing (points: &[GroundPoint]) {
    for w in points.windows(2) {
        let dlon = (w[1].longitude - w[0].longitude).abs();
        assert!( dlon <= 180.0, "segment crosses antimeridian: {} -> {}", w[0].longitude, w[1].longitude);
        assert!( w[0].time <= w[1].time);
    }
}

#[test]
fn test_iss_two_hours() {
    let e = iss();
    let fc = FrameConverter::new( &EarthModel::WGS84);
    let track = compute_track( &e, &fc, &TrackWindow::new( None, 2.0, 1.0)).unwrap();

    assert_eq!( track.points.len(), 121);
    assert_eq!( track.sat_id, 25544);
    assert_eq!( track.points[0].time, e.epoch);
    assert_eq!( track.points[120].time, e.epoch + TimeDelta::hours(2));

    let p0 = &track.points[0];
    assert!( (p0.latitude - 24.744466823).abs() < 1e-3, "lat {}", p0.latitude);
    assert!( (p0.longitude - -80.511850297).abs() < 1e-3, "lon {}", p0.longitude);
    assert!( (p0.altitude - 414.377).abs() < 0.5, "alt {}", p0.altitude);

    let p120 = &track.points[120];
    assert!( (p120.latitude - 32.0158).abs() < 1e-3, "lat {}", p120.latitude);
    assert!( (p120.longitude - 18.2428).abs() < 1e-3, "lon {}", p120.longitude);

    // exactly one eastbound crossing between sample 66 and 67
    assert_eq!( track.n_splits(), 1);
    let seg0 = &track.segments[0];
    let seg1 = &track.segments[1];
    assert_eq!( seg0.len(), 68);
    assert_eq!( seg1.len(), 55);
    assert!( track.points[66].longitude > 179.0);
    assert!( track.points[67].longitude < -175.0);

    for seg in &track.segments {
        assert!( !seg.is_point());
        assert_no_crossing( &seg.points);
        for p in &seg.points {
            assert!( p.longitude >= -180.0 && p.longitude <= 180.0);
            assert!( p.latitude.abs() <= 52.0); // geodetic latitude exceeds the inclination slightly
        }
    }
}

#[test]
fn test_segment_continuity() {
    let e = iss();
    let track = compute_track( &e, &FrameConverter::default(), &TrackWindow::new( None, 24.0, 1.0)).unwrap();
    assert_eq!( track.points.len(), 1441);
    // ~15.5 orbits per day minus one wrap for earth rotation, so ~14.5 eastward crossings
    assert!( (14..=15).contains( &track.n_splits()), "{} splits", track.n_splits());

    for (a,b) in track.segments.iter().zip( track.segments.iter().skip(1)) {
        let end = a.points.last().unwrap();
        let start = b.points.first().unwrap();
        assert_eq!( end.longitude.abs(), 180.0);
        assert_eq!( end.longitude, -start.longitude);
        assert_eq!( end.latitude, start.latitude);
        assert_eq!( end.time, start.time);
        assert_eq!( b.index, a.index + 1);
    }

    // all samples show up in exactly one segment
    let n_boundary = 2 * track.n_splits();
    let n_seg_points: usize = track.segments.iter().map( |s| s.len()).sum();
    assert_eq!( n_seg_points, track.points.len() + n_boundary);
}

#[test]
fn test_great_circle_steps() {
    let e = iss();
    let track = compute_track( &e, &FrameConverter::default(), &TrackWindow::new( None, 24.0, 1.0)).unwrap();

    // a ground step can't exceed the inertial arc plus earth rotation (~6% for LEO)
    for seg in &track.segments {
        for w in seg.points.windows(2) {
            let dt = (w[1].time - w[0].time).as_seconds_f64();
            let a = Cartographic::from_degrees( w[0].longitude, w[0].latitude, 0.0);
            let b = Cartographic::from_degrees( w[1].longitude, w[1].latitude, 0.0);
            let max_angle = 1.2 * w[0].speed.max( w[1].speed) * dt / 6378.0;
            let angle = a.central_angle( &b);
            assert!( angle <= max_angle, "step {angle} rad > {max_angle} rad at {}", w[0].time);
        }
    }

    // the same holds across the antimeridian for consecutive samples
    for w in track.points.windows(2) {
        let a = Cartographic::from_degrees( w[0].longitude, w[0].latitude, 0.0);
        let b = Cartographic::from_degrees( w[1].longitude, w[1].latitude, 0.0);
        assert!( a.central_angle( &b) <= 1.2 * w[0].speed * 60.0 / 6378.0);
    }
}

#[test]
fn test_zero_duration() {
    let e = iss();
    let track = compute_track( &e, &FrameConverter::default(), &TrackWindow::new( None, 0.0, 1.0)).unwrap();

    assert_eq!( track.points.len(), 1);
    assert!( track.is_degenerate());
    assert_eq!( track.segments.len(), 1);
    assert!( track.segments[0].is_point());
    assert_eq!( track.n_splits(), 0);
}

#[test]
fn test_explicit_start() {
    let e = iss();
    let fc = FrameConverter::default();
    let start = e.epoch + TimeDelta::minutes(30);

    let full = TrackSampler::new( &e, &fc, None, 1.0, 1.0).unwrap().collect_points().unwrap();
    let later = TrackSampler::new( &e, &fc, Some(start), 0.5, 1.0).unwrap().collect_points().unwrap();

    assert_eq!( later.len(), 31);
    assert_eq!( later[0].time, start);
    assert_eq!( later[0], full[30]);
    assert_eq!( later[30], full[60]);
}

#[test]
fn test_sample_error_aborts() {
    let mut e = iss();
    e.bstar = 0.5;
    let fc = FrameConverter::default();
    let sampler = TrackSampler::new( &e, &fc, None, 240.0, 60.0).unwrap();

    let results: Vec<_> = sampler.samples().collect();
    assert!( results.len() < sampler.len());
    assert!( matches!( results.last(), Some(Err(SpaceTraceError::DecayedOrbit{..}))));
    assert!( results[..results.len()-1].iter().all( |r| r.is_ok()));

    assert!( matches!( assemble( &e, sampler.samples()), Err(SpaceTraceError::DecayedOrbit{..})));
}

#[test]
fn test_empty_assembly() {
    assert!( matches!( assemble_points( &iss(), Vec::new()), Err(SpaceTraceError::InvalidArgument(_))));
    assert!( split_antimeridian( &[]).is_empty());
}

#[test]
fn test_earth_model_altitude() {
    let e = iss();
    let wgs84 = FrameConverter::new( &EarthModel::WGS84);
    let sphere = FrameConverter::new( &EarthModel{ equatorial_radius: 6371.0, inverse_flattening: 1.0e12 });

    let sampler = TrackSampler::new( &e, &wgs84, None, 0.0, 1.0).unwrap();
    let sv = sampler.propagator().propagate( &e.epoch).unwrap();
    let a = wgs84.to_geodetic( &sv, &e.epoch).unwrap();
    let b = sphere.to_geodetic( &sv, &e.epoch).unwrap();

    assert!( (b.altitude - (sv.radius() - 6371.0)).abs() < 1e-3);
    assert!( (a.longitude - b.longitude).abs() < 1e-9);
    assert!( (a.altitude - b.altitude).abs() > 1.0);
}
