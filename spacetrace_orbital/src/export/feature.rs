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

//! format independent feature sets (geometry plus typed attribute rows) built from ground tracks

use std::fmt;
use chrono::{DateTime,Utc};
use geo_types::{Coord, Geometry, LineString, Point, Rect};
use spacetrace_common::datetime::rfc3339_millis;

use crate::assembler::{GroundTrack, TrackSegment};
use crate::frames::GroundPoint;

#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum FieldType {
    Integer,
    Real,
    Text,
    DateTime,
}

/// attribute field definition. Names are at most 10 chars so that they fit into dBASE tables
#[derive(Debug,Clone,PartialEq)]
pub struct FieldDef {
    pub name: &'static str,
    pub field_type: FieldType,
    pub width: u8,      // text or numeric width for fixed width formats
    pub decimals: u8,
}

impl FieldDef {
    const fn new (name: &'static str, field_type: FieldType, width: u8, decimals: u8)->Self {
        FieldDef { name, field_type, width, decimals }
    }
}

#[derive(Debug,Clone,PartialEq)]
pub enum AttrValue {
    Integer(i64),
    Real(f64),
    Text(String),
    DateTime(DateTime<Utc>),
    Null,
}

impl AttrValue {
    pub fn as_f64 (&self)->Option<f64> {
        match self {
            AttrValue::Integer(i) => Some(*i as f64),
            AttrValue::Real(x) => Some(*x),
            _ => None
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt (&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Integer(i) => write!(f, "{i}"),
            AttrValue::Real(x) => write!(f, "{x}"),
            AttrValue::Text(s) => write!(f, "{s}"),
            AttrValue::DateTime(dt) => write!(f, "{}", rfc3339_millis(dt)),
            AttrValue::Null => Ok(())
        }
    }
}

#[derive(Debug,Clone,PartialEq)]
pub struct Feature {
    pub geometry: Geometry<f64>,
    pub attributes: Vec<AttrValue>,  // in order of the FeatureSet fields
}

/// one layer of features that share the same attribute schema
#[derive(Debug,Clone,PartialEq)]
pub struct FeatureSet {
    pub name: String,
    pub fields: Vec<FieldDef>,
    pub features: Vec<Feature>,
}

pub const LINE_FIELDS: [FieldDef;7] = [
    FieldDef::new( "sat_id", FieldType::Integer, 9, 0),
    FieldDef::new( "name", FieldType::Text, 64, 0),
    FieldDef::new( "segment", FieldType::Integer, 6, 0),
    FieldDef::new( "start_time", FieldType::DateTime, 24, 0),
    FieldDef::new( "end_time", FieldType::DateTime, 24, 0),
    FieldDef::new( "epoch", FieldType::DateTime, 24, 0),
    FieldDef::new( "n_points", FieldType::Integer, 9, 0),
];

pub const POINT_FIELDS: [FieldDef;10] = [
    FieldDef::new( "point_id", FieldType::Integer, 9, 0),
    FieldDef::new( "date_time", FieldType::DateTime, 24, 0),
    FieldDef::new( "latitude", FieldType::Real, 12, 6),
    FieldDef::new( "longitude", FieldType::Real, 12, 6),
    FieldDef::new( "altitude", FieldType::Real, 12, 3),
    FieldDef::new( "velocity", FieldType::Real, 10, 4),
    FieldDef::new( "azimuth", FieldType::Real, 10, 4),
    FieldDef::new( "elevation", FieldType::Real, 10, 4),
    FieldDef::new( "true_anom", FieldType::Real, 10, 4),
    FieldDef::new( "incl", FieldType::Real, 10, 4),
];

fn coord (p: &GroundPoint)->Coord<f64> {
    Coord { x: p.longitude, y: p.latitude }
}

fn segment_geometry (seg: &TrackSegment)->Option<Geometry<f64>> {
    match seg.points.as_slice() {
        [] => None,
        [p] => Some( Geometry::Point( Point( coord(p)))),
        pts => Some( Geometry::LineString( LineString::new( pts.iter().map( coord).collect())))
    }
}

impl FeatureSet {

    /// one feature per track segment. Single point segments become point features
    pub fn line_layer (track: &GroundTrack)->Self {
        let name = track.name.clone().unwrap_or_default();

        let features = track.segments.iter().filter_map( |seg| {
            let geometry = segment_geometry( seg)?;
            let attributes = vec![
                AttrValue::Integer( seg.sat_id as i64),
                AttrValue::Text( name.clone()),
                AttrValue::Integer( seg.index as i64),
                seg.start_time().map( AttrValue::DateTime).unwrap_or(AttrValue::Null),
                seg.end_time().map( AttrValue::DateTime).unwrap_or(AttrValue::Null),
                AttrValue::DateTime( seg.epoch),
                AttrValue::Integer( seg.len() as i64),
            ];
            Some( Feature { geometry, attributes })
        }).collect();

        FeatureSet { name: layer_name( track, "track"), fields: LINE_FIELDS.to_vec(), features }
    }

    /// one point feature per sample
    pub fn point_layer (track: &GroundTrack)->Self {
        let features = track.points.iter().enumerate().map( |(i,p)| {
            Feature {
                geometry: Geometry::Point( Point( coord(p))),
                attributes: vec![
                    AttrValue::Integer( i as i64 + 1),
                    AttrValue::DateTime( p.time),
                    AttrValue::Real( p.latitude),
                    AttrValue::Real( p.longitude),
                    AttrValue::Real( p.altitude),
                    AttrValue::Real( p.speed),
                    AttrValue::Real( p.azimuth),
                    AttrValue::Real( p.elevation),
                    AttrValue::Real( p.true_anomaly),
                    AttrValue::Real( track.inclination),
                ]
            }
        }).collect();

        FeatureSet { name: layer_name( track, "points"), fields: POINT_FIELDS.to_vec(), features }
    }

    pub fn len (&self)->usize { self.features.len() }

    pub fn is_empty (&self)->bool { self.features.is_empty() }

    pub fn field_index (&self, name: &str)->Option<usize> {
        self.fields.iter().position( |f| f.name == name)
    }

    /// attribute value of feature `i` for field `name`
    pub fn attribute (&self, i: usize, name: &str)->Option<&AttrValue> {
        let idx = self.field_index( name)?;
        self.features.get(i).and_then( |f| f.attributes.get(idx))
    }

    /// true if all geometries are points
    pub fn is_point_layer (&self)->bool {
        self.features.iter().all( |f| matches!( f.geometry, Geometry::Point(_)))
    }

    /// bounding rectangle of all geometries
    pub fn bounds (&self)->Option<Rect<f64>> {
        self.features.iter().filter_map( |f| geometry_bounds( &f.geometry))
            .reduce( |a,b| Rect::new(
                Coord { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
                Coord { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) }
            ))
    }
}

/// the bounding rectangle of the point and line geometries we produce
pub fn geometry_bounds (geom: &Geometry<f64>)->Option<Rect<f64>> {
    match geom {
        Geometry::Point(p) => Some( Rect::new( p.0, p.0)),
        Geometry::LineString(ls) => {
            let mut it = ls.coords();
            let c0 = it.next()?;
            let (mut min, mut max) = (*c0, *c0);
            for c in it {
                min.x = min.x.min(c.x); min.y = min.y.min(c.y);
                max.x = max.x.max(c.x); max.y = max.y.max(c.y);
            }
            Some( Rect::new( min, max))
        }
        _ => None
    }
}

fn layer_name (track: &GroundTrack, kind: &str)->String {
    format!("{}_{:05}", kind, track.sat_id)
}
