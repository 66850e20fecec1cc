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

//! GeoJSON (RFC 7946) encoding of feature sets

use std::path::Path;
use geojson::{FeatureCollection, JsonObject, JsonValue};
use spacetrace_common::{datetime::rfc3339_millis, fs::write_file_atomic};

use crate::errors::Result;
use super::feature::{AttrValue, FeatureSet};

fn json_value (v: &AttrValue)->JsonValue {
    match v {
        AttrValue::Integer(i) => JsonValue::from(*i),
        AttrValue::Real(x) => serde_json::Number::from_f64(*x).map( JsonValue::Number).unwrap_or(JsonValue::Null),
        AttrValue::Text(s) => JsonValue::from( s.as_str()),
        AttrValue::DateTime(dt) => JsonValue::from( rfc3339_millis(dt)),
        AttrValue::Null => JsonValue::Null,
    }
}

pub fn feature_collection (layer: &FeatureSet)->FeatureCollection {
    let features = layer.features.iter().map( |f| {
        let mut properties = JsonObject::new();
        for (field, value) in layer.fields.iter().zip( f.attributes.iter()) {
            properties.insert( field.name.to_string(), json_value( value));
        }

        geojson::Feature {
            bbox: None,
            geometry: Some( geojson::Geometry::new( geojson::Value::from( &f.geometry))),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        }
    }).collect();

    FeatureCollection { bbox: None, features, foreign_members: None }
}

pub fn to_geojson_string (layer: &FeatureSet)->Result<String> {
    Ok( serde_json::to_string_pretty( &feature_collection(layer))? )
}

/// write feature set through a temp file that is moved into place when complete
pub fn write_geojson (layer: &FeatureSet, path: &Path)->Result<()> {
    let json = to_geojson_string(layer)?;
    write_file_atomic( path, json.as_bytes())?;
    Ok(())
}
