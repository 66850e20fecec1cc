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

//! ESRI shapefile encoding of feature sets (.shp/.shx/.dbf plus .prj and .cpg sidecars)

use std::{fs, path::{Path,PathBuf}};
use geo_types::{Coord, Geometry};
use shapefile::{Point, Polyline, Writer, dbase::{FieldName, FieldValue, Record, TableWriterBuilder}};
use tracing::debug;
use spacetrace_common::{datetime::rfc3339_millis, fs::{filestem, parent_dir, replace_files}, geo_constants::WGS84_WKT};

use crate::errors::{Result, SpaceTraceError, op_failed};
use super::feature::{AttrValue, FieldType, FeatureSet};

/// the files that make up a shapefile, with the main .shp file last
const COMPONENTS: [&str;5] = ["shx", "dbf", "prj", "cpg", "shp"];

fn field_name (name: &str)->Result<FieldName> {
    FieldName::try_from( name).map_err( |e| op_failed!("invalid dbase field name {}: {:?}", name, e))
}

fn table_builder (layer: &FeatureSet)->Result<TableWriterBuilder> {
    let mut builder = TableWriterBuilder::new();
    for f in &layer.fields {
        let name = field_name( f.name)?;
        builder = match f.field_type {
            FieldType::Text | FieldType::DateTime => builder.add_character_field( name, f.width),
            FieldType::Integer | FieldType::Real => builder.add_numeric_field( name, f.width, f.decimals),
        };
    }
    Ok(builder)
}

fn record (layer: &FeatureSet, attrs: &[AttrValue])->Record {
    let mut rec = Record::default();
    for (f, v) in layer.fields.iter().zip( attrs.iter()) {
        let value = match (f.field_type, v) {
            (_, AttrValue::Text(s)) => FieldValue::Character( Some(s.clone())),
            (_, AttrValue::DateTime(dt)) => FieldValue::Character( Some( rfc3339_millis(dt))),
            (_, AttrValue::Integer(i)) => FieldValue::Numeric( Some(*i as f64)),
            (_, AttrValue::Real(x)) => FieldValue::Numeric( Some(*x)),
            (FieldType::Text | FieldType::DateTime, AttrValue::Null) => FieldValue::Character(None),
            (_, AttrValue::Null) => FieldValue::Numeric(None),
        };
        rec.insert( f.name.to_string(), value);
    }
    rec
}

fn shp_point (c: &Coord<f64>)->Point {
    Point::new( c.x, c.y)
}

/// polylines need at least two vertices, single points become zero length lines
fn shp_polyline (geom: &Geometry<f64>)->Result<Polyline> {
    let mut pts: Vec<Point> = match geom {
        Geometry::LineString(ls) => ls.coords().map( shp_point).collect(),
        Geometry::Point(p) => vec![ shp_point( &p.0) ],
        _ => return Err( op_failed!("unsupported geometry type for polyline layer"))
    };
    if pts.len() == 1 {
        pts.push( pts[0]);
    }
    Ok( Polyline::new( pts))
}

fn write_components (layer: &FeatureSet, shp_path: &Path)->Result<()> {
    let mut writer = Writer::from_path( shp_path, table_builder(layer)?)?;

    if layer.is_point_layer() {
        for f in &layer.features {
            if let Geometry::Point(p) = &f.geometry {
                writer.write_shape_and_record( &shp_point( &p.0), &record( layer, &f.attributes))?;
            }
        }
    } else {
        for f in &layer.features {
            writer.write_shape_and_record( &shp_polyline( &f.geometry)?, &record( layer, &f.attributes))?;
        }
    }
    drop(writer); // finalizes headers

    fs::write( shp_path.with_extension("prj"), WGS84_WKT)?;
    fs::write( shp_path.with_extension("cpg"), "UTF-8")?;
    Ok(())
}

/// write feature set as shapefile. All component files are first written to a temp dir next to
/// the target and then moved into place together, the .shp last. If one of the moves fails the
/// previous component files are restored so that we never leave a mix of old and new components
pub fn write_shapefile (layer: &FeatureSet, path: &Path)->Result<Vec<PathBuf>> {
    let stem = filestem( &path).ok_or_else( || SpaceTraceError::UnsupportedFileFormat{ path: path.to_path_buf() })?;
    let tmp_dir = tempfile::Builder::new().prefix(".shp").tempdir_in( parent_dir(path))?;
    let tmp_shp = tmp_dir.path().join( format!("{stem}.shp"));

    write_components( layer, &tmp_shp)?;

    let moves: Vec<(PathBuf,PathBuf)> = COMPONENTS.iter()
        .map( |ext| (tmp_shp.with_extension( ext), path.with_extension( ext)))
        .filter( |(src,_)| src.is_file())
        .collect();

    let backup_dir = tmp_dir.path().join("replaced");
    fs::create_dir( &backup_dir)?;
    replace_files( &moves, &backup_dir)?;

    let written: Vec<PathBuf> = moves.into_iter().map( |(_,tgt)| tgt).collect();
    debug!("wrote shapefile {:?} with {} features", path, layer.len());

    Ok(written)
}
