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

/// common geodetic constants that should be consistent through the ground track crates
/// lengths are in kilometers since this is what orbit propagation uses

/// WGS84 semi major axis in km
pub const WGS84_EQUATORIAL_RADIUS: f64 = 6378.137;

/// WGS84 inverse flattening
pub const WGS84_INVERSE_FLATTENING: f64 = 298.257223563;

/// WGS84 semi minor axis in km
pub const WGS84_POLAR_RADIUS: f64 = WGS84_EQUATORIAL_RADIUS * (1.0 - 1.0/WGS84_INVERSE_FLATTENING);

/// mean earth radius in km (IUGG)
pub const MEAN_EARTH_RADIUS: f64 = 6371.0088;

/// WKT of the WGS84 geographic CRS, as used in ESRI .prj files
pub const WGS84_WKT: &str = r#"GEOGCS["GCS_WGS_1984",DATUM["D_WGS_1984",SPHEROID["WGS_1984",6378137.0,298.257223563]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]]"#;

/// OGC WKT of EPSG:4326 for GeoPackage srs tables
pub const EPSG_4326_WKT: &str = r#"GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563,AUTHORITY["EPSG","7030"]],AUTHORITY["EPSG","6326"]],PRIMEM["Greenwich",0,AUTHORITY["EPSG","8901"]],UNIT["degree",0.0174532925199433,AUTHORITY["EPSG","9122"]],AUTHORITY["EPSG","4326"]]"#;
