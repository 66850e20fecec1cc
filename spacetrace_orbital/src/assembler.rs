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

//! assembly of sampled ground points into track segments that do not cross the antimeridian

use chrono::{DateTime,Utc};
use itertools::Itertools;
use serde::Serialize;
use tracing::debug;
use spacetrace_common::{angle::{longitude_delta, normalize_360}, datetime::{add_minutes, minutes_since, ser_rfc3339_millis}};

use crate::elements::OrbitalElementSet;
use crate::errors::{Result, SpaceTraceError};
use crate::frames::GroundPoint;

/// a contiguous part of a ground track that does not cross the ±180° meridian. Segments that end or
/// start at the antimeridian have an interpolated boundary point at ±180°
#[derive(Debug,Clone,PartialEq,Serialize)]
pub struct TrackSegment {
    pub sat_id: u32,
    #[serde(serialize_with = "ser_rfc3339_millis")]
    pub epoch: DateTime<Utc>,
    pub index: usize,
    pub points: Vec<GroundPoint>,
}

impl TrackSegment {
    pub fn len (&self)->usize { self.points.len() }

    pub fn is_empty (&self)->bool { self.points.is_empty() }

    /// degenerate segments are exported as point features
    pub fn is_point (&self)->bool { self.points.len() < 2 }

    pub fn start_time (&self)->Option<DateTime<Utc>> { self.points.first().map( |p| p.time) }

    pub fn end_time (&self)->Option<DateTime<Utc>> { self.points.last().map( |p| p.time) }
}

/// the assembled ground track of one element set
#[derive(Debug,Clone,Serialize)]
pub struct GroundTrack {
    pub sat_id: u32,
    pub name: Option<String>,
    #[serde(serialize_with = "ser_rfc3339_millis")]
    pub epoch: DateTime<Utc>,
    pub inclination: f64,
    pub points: Vec<GroundPoint>,  // the samples, without boundary points
    pub segments: Vec<TrackSegment>,
}

impl GroundTrack {
    pub fn n_splits (&self)->usize { self.segments.len().saturating_sub(1) }

    /// true for single sample tracks
    pub fn is_degenerate (&self)->bool { self.points.len() < 2 }
}

/// linear interpolation between two samples at fraction `f`, with the longitude set to `lon`
fn boundary_point (p1: &GroundPoint, p2: &GroundPoint, f: f64, lon: f64)->GroundPoint {
    let lerp = |a: f64, b: f64| a + f * (b - a);
    let dt = minutes_since( &p1.time, &p2.time);

    GroundPoint {
        time: add_minutes( &p1.time, f * dt).unwrap_or( p1.time),
        latitude: lerp( p1.latitude, p2.latitude),
        longitude: lon,
        altitude: lerp( p1.altitude, p2.altitude),
        speed: lerp( p1.speed, p2.speed),
        azimuth: normalize_360( p1.azimuth + f * longitude_delta( p1.azimuth, p2.azimuth)),
        elevation: lerp( p1.elevation, p2.elevation),
        true_anomaly: normalize_360( p1.true_anomaly + f * longitude_delta( p1.true_anomaly, p2.true_anomaly)),
    }
}

fn push_distinct (points: &mut Vec<GroundPoint>, p: GroundPoint) {
    if let Some(last) = points.last() {
        if last.longitude == p.longitude && last.latitude == p.latitude {
            return
        }
    }
    points.push(p)
}

/// split a sequence of points into parts that do not cross the antimeridian. A step with a longitude
/// change of more than 180° is a crossing. Boundary points are interpolated linearly in latitude, with
/// the fraction taken from the unwrapped longitude step
pub fn split_antimeridian (points: &[GroundPoint])->Vec<Vec<GroundPoint>> {
    let mut parts: Vec<Vec<GroundPoint>> = Vec::new();
    let Some(first) = points.first() else { return parts };

    let mut current = vec![ first.clone() ];

    for (p1,p2) in points.iter().tuple_windows() {
        let dlon = p2.longitude - p1.longitude;

        if dlon < -180.0 { // eastbound across +180
            let f = (180.0 - p1.longitude) / (p2.longitude + 360.0 - p1.longitude);
            let b = boundary_point( p1, p2, f, 180.0);
            push_distinct( &mut current, b.clone());
            parts.push( std::mem::take( &mut current));
            current.push( GroundPoint{ longitude: -180.0, ..b });

        } else if dlon > 180.0 { // westbound across -180
            let f = (-180.0 - p1.longitude) / (p2.longitude - 360.0 - p1.longitude);
            let b = boundary_point( p1, p2, f, -180.0);
            push_distinct( &mut current, b.clone());
            parts.push( std::mem::take( &mut current));
            current.push( GroundPoint{ longitude: 180.0, ..b });
        }

        push_distinct( &mut current, p2.clone());
    }

    parts.push( current);
    parts
}

/// collect samples into a ground track. The first sample error aborts assembly and is returned unchanged
pub fn assemble<I> (elements: &OrbitalElementSet, samples: I)->Result<GroundTrack> where I: IntoIterator<Item=Result<GroundPoint>> {
    let points: Vec<GroundPoint> = samples.into_iter().collect::<Result<Vec<_>>>()?;
    assemble_points( elements, points)
}

pub fn assemble_points (elements: &OrbitalElementSet, points: Vec<GroundPoint>)->Result<GroundTrack> {
    if points.is_empty() {
        return Err( SpaceTraceError::InvalidArgument( "no ground track samples".to_string()))
    }

    let segments: Vec<TrackSegment> = split_antimeridian( &points).into_iter().enumerate()
        .map( |(index, points)| TrackSegment{ sat_id: elements.sat_id, epoch: elements.epoch, index, points })
        .collect();

    debug!("assembled {} points of {:05} into {} segments", points.len(), elements.sat_id, segments.len());

    Ok( GroundTrack {
        sat_id: elements.sat_id,
        name: elements.name.clone(),
        epoch: elements.epoch,
        inclination: elements.inclination,
        points,
        segments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn gp (t: i64, lon: f64, lat: f64)->GroundPoint {
        GroundPoint {
            time: Utc.timestamp_opt( 1_700_000_000 + t * 60, 0).unwrap(),
            latitude: lat, longitude: lon, altitude: 400.0, speed: 7.6, azimuth: 90.0, elevation: 0.0, true_anomaly: 10.0
        }
    }

    fn lon_lat (seg: &[GroundPoint])->Vec<(f64,f64)> {
        seg.iter().map( |p| (p.longitude, p.latitude)).collect()
    }

    #[test]
    fn test_westbound_split() {
        let parts = split_antimeridian( &[ gp(0, -179.0, 0.0), gp(1, 179.0, 1.0) ]);
        assert_eq!( parts.len(), 2);
        assert_eq!( lon_lat( &parts[0]), vec![(-179.0, 0.0), (-180.0, 0.5)]);
        assert_eq!( lon_lat( &parts[1]), vec![(180.0, 0.5), (179.0, 1.0)]);
    }

    #[test]
    fn test_eastbound_split() {
        let parts = split_antimeridian( &[ gp(0, 170.0, 10.0), gp(1, -170.0, 20.0), gp(2, -160.0, 25.0) ]);
        assert_eq!( parts.len(), 2);
        assert_eq!( lon_lat( &parts[0]), vec![(170.0, 10.0), (180.0, 15.0)]);
        assert_eq!( lon_lat( &parts[1]), vec![(-180.0, 15.0), (-170.0, 20.0), (-160.0, 25.0)]);

        // boundary time is interpolated too
        assert_eq!( parts[0][1].time, gp(0, 0.0, 0.0).time + chrono::TimeDelta::seconds(30));
    }

    #[test]
    fn test_no_split() {
        let parts = split_antimeridian( &[ gp(0, -10.0, 0.0), gp(1, 10.0, 5.0), gp(2, 179.0, 10.0) ]);
        assert_eq!( parts.len(), 1);
        assert_eq!( parts[0].len(), 3);
    }

    #[test]
    fn test_sample_on_boundary() {
        let parts = split_antimeridian( &[ gp(0, 170.0, 0.0), gp(1, 180.0, 1.0), gp(2, -170.0, 2.0) ]);
        assert_eq!( parts.len(), 2);
        assert_eq!( lon_lat( &parts[0]), vec![(170.0, 0.0), (180.0, 1.0)]);
        assert_eq!( lon_lat( &parts[1]), vec![(-180.0, 1.0), (-170.0, 2.0)]);
    }

    #[test]
    fn test_single_point() {
        let parts = split_antimeridian( &[ gp(0, 42.0, 0.0) ]);
        assert_eq!( parts.len(), 1);
        assert_eq!( parts[0].len(), 1);
        assert!( split_antimeridian( &[]).is_empty());
    }
}
