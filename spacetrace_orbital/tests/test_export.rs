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

use std::path::Path;
use geo_types::Geometry;
use sqlx::{Connection, ConnectOptions, Row, sqlite::SqliteConnectOptions};
use spacetrace_orbital::{
    errors::SpaceTraceError,
    export::{export, points_path, AttrValue, ExportOptions, OutputFormat, WrittenArtifact, json::to_geojson_string},
    frames::FrameConverter,
    tle::parse_tle,
    compute_track, generate_ground_track, GroundTrack, OrbitalElementSet, TrackConfig, TrackWindow,
};

const ISS_LINE1: &str = "1 25544U 98067A   25087.72483446  .00032194  00000-0  56484-3 0  9999";
const ISS_LINE2: &str = "2 25544  51.6386 345.5386 0004029  59.5799 332.6073 15.50242233502686";

fn iss ()->OrbitalElementSet {
    parse_tle( Some("ISS (ZARYA)"), ISS_LINE1, ISS_LINE2).unwrap()
}

fn iss_track (hours: f64)->GroundTrack {
    compute_track( &iss(), &FrameConverter::default(), &TrackWindow::new( None, hours, 1.0)).unwrap()
}

fn dir_entries (dir: &Path)->Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir).unwrap()
        .map( |e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

#[test]
fn test_output_format() {
    assert_eq!( OutputFormat::from_path( "a/b/track.SHP").unwrap(), OutputFormat::Shapefile);
    assert_eq!( OutputFormat::from_path( "track.gpkg").unwrap(), OutputFormat::GeoPackage);
    assert_eq!( OutputFormat::from_path( "track.geojson").unwrap(), OutputFormat::GeoJson);
    assert!( matches!( OutputFormat::from_path( "track.json"), Err(SpaceTraceError::UnsupportedFileFormat{..})));
    assert!( matches!( OutputFormat::from_path( "track"), Err(SpaceTraceError::UnsupportedFileFormat{..})));

    assert_eq!( points_path( "out/iss.gpkg", OutputFormat::GeoPackage), Path::new("out/iss_points.gpkg"));
}

#[test]
fn test_unsupported_extension_touches_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("not_there");
    let path = missing.join("track.xyz");
    let opts = ExportOptions{ create_dirs: true, ..ExportOptions::default() };

    let res = export( &iss_track( 0.5), Some(&path), &opts);
    assert!( matches!( res, Err(SpaceTraceError::UnsupportedFileFormat{..})));
    assert!( !missing.exists());
    assert!( dir_entries( dir.path()).is_empty());
}

#[test]
fn test_format_checked_before_propagation() {
    let mut e = iss();
    e.bstar = 0.5; // would decay within the window
    let config = TrackConfig::default();
    let window = TrackWindow::new( None, 48.0, 1.0);

    let res = generate_ground_track( &e, &config, &window, Some( Path::new("track.kml")));
    assert!( matches!( res, Err(SpaceTraceError::UnsupportedFileFormat{..})));

    let res = generate_ground_track( &e, &config, &window, None);
    assert!( matches!( res, Err(SpaceTraceError::DecayedOrbit{..})));
}

#[test]
fn test_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sub").join("track.geojson");

    let res = export( &iss_track( 0.5), Some(&path), &ExportOptions::default());
    assert!( matches!( res, Err(SpaceTraceError::DestinationNotWritable{..})));
    assert!( !dir.path().join("sub").exists());

    let opts = ExportOptions{ create_dirs: true, ..ExportOptions::default() };
    let artifact = export( &iss_track( 0.5), Some(&path), &opts).unwrap();
    assert_eq!( artifact.paths().len(), 2);
    assert!( path.is_file());
    assert!( dir.path().join("sub").join("track_points.geojson").is_file());
}

#[test]
fn test_in_memory() {
    let track = iss_track( 2.0);
    let artifact = export( &track, None, &ExportOptions::default()).unwrap();
    assert!( artifact.paths().is_empty());

    let WrittenArtifact::InMemory(layers) = artifact else { panic!("expected in-memory layers") };
    let lines = layers.lines.unwrap();
    let points = layers.points.unwrap();

    assert_eq!( lines.name, "track_25544");
    assert_eq!( lines.len(), 2);
    assert!( !lines.is_point_layer());
    assert_eq!( lines.attribute( 0, "sat_id"), Some( &AttrValue::Integer(25544)));
    assert_eq!( lines.attribute( 1, "segment"), Some( &AttrValue::Integer(1)));
    assert_eq!( lines.attribute( 0, "name"), Some( &AttrValue::Text( "ISS (ZARYA)".to_string())));
    assert_eq!( lines.attribute( 0, "start_time"), Some( &AttrValue::DateTime( track.epoch)));
    assert_eq!( lines.attribute( 0, "n_points"), Some( &AttrValue::Integer(68)));

    let bounds = lines.bounds().unwrap();
    assert_eq!( bounds.min().x, -180.0);
    assert_eq!( bounds.max().x, 180.0);

    assert_eq!( points.len(), 121);
    assert!( points.is_point_layer());
    assert_eq!( points.attribute( 0, "point_id"), Some( &AttrValue::Integer(1)));
    assert_eq!( points.attribute( 120, "incl").and_then( |v| v.as_f64()), Some( 51.6386));

    let lines_only = ExportOptions{ include_points: false, ..ExportOptions::default() };
    let WrittenArtifact::InMemory(layers) = export( &track, None, &lines_only).unwrap() else { panic!("expected in-memory layers") };
    assert!( layers.points.is_none());
}

#[test]
fn test_single_sample_is_point() {
    let track = iss_track( 0.0);
    let WrittenArtifact::InMemory(layers) = export( &track, None, &ExportOptions::default()).unwrap() else { panic!("expected in-memory layers") };
    let lines = layers.lines.unwrap();

    assert_eq!( lines.len(), 1);
    assert!( matches!( lines.features[0].geometry, Geometry::Point(_)));
    assert_eq!( lines.attribute( 0, "n_points"), Some( &AttrValue::Integer(1)));

    let json = to_geojson_string( &lines).unwrap();
    let fc: geojson::FeatureCollection = json.parse::<geojson::GeoJson>().unwrap().try_into().unwrap();
    let geom = fc.features[0].geometry.as_ref().unwrap();
    assert!( matches!( geom.value, geojson::Value::Point(_)));
}

#[test]
fn test_geojson_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("iss.geojson");

    let artifact = export( &iss_track( 2.0), Some(&path), &ExportOptions::default()).unwrap();
    assert!( matches!( artifact, WrittenArtifact::Files{ format: OutputFormat::GeoJson, .. }));
    assert_eq!( dir_entries( dir.path()), vec!["iss.geojson", "iss_points.geojson"]);

    let text = std::fs::read_to_string( &path).unwrap();
    let fc: geojson::FeatureCollection = text.parse::<geojson::GeoJson>().unwrap().try_into().unwrap();
    assert_eq!( fc.features.len(), 2);
    let props = fc.features[1].properties.as_ref().unwrap();
    assert_eq!( props.get("segment").and_then( |v| v.as_i64()), Some(1));
    assert_eq!( props.get("sat_id").and_then( |v| v.as_i64()), Some(25544));
    assert!( matches!( fc.features[0].geometry.as_ref().unwrap().value, geojson::Value::LineString(_)));

    // replacing an existing export
    export( &iss_track( 0.5), Some(&path), &ExportOptions::default()).unwrap();
    assert_eq!( dir_entries( dir.path()).len(), 2);
}

#[test]
fn test_shapefile() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("iss.shp");

    let artifact = export( &iss_track( 2.0), Some(&path), &ExportOptions::default()).unwrap();
    assert_eq!( artifact.paths().len(), 10);
    for ext in ["shp", "shx", "dbf", "prj", "cpg"] {
        assert!( path.with_extension(ext).is_file(), "missing .{ext}");
        assert!( dir.path().join( format!("iss_points.{ext}")).is_file(), "missing points .{ext}");
    }
    assert_eq!( dir_entries( dir.path()).len(), 10); // no temp leftovers

    let lines: Vec<shapefile::Polyline> = shapefile::read_shapes_as( &path).unwrap();
    assert_eq!( lines.len(), 2);
    assert_eq!( lines[0].parts()[0].len(), 68);

    let points: Vec<shapefile::Point> = shapefile::read_shapes_as( dir.path().join("iss_points.shp")).unwrap();
    assert_eq!( points.len(), 121);

    let prj = std::fs::read_to_string( path.with_extension("prj")).unwrap();
    assert!( prj.contains("WGS_1984"));
}

// a layer that can't be put in place must not leave the other layer replaced
#[test]
fn test_failed_export_keeps_previous_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("iss.shp");

    export( &iss_track( 0.5), Some(&path), &ExportOptions{ include_points: false, ..ExportOptions::default() }).unwrap();
    let old: Vec<Vec<u8>> = ["shp", "shx", "dbf"].iter().map( |ext| std::fs::read( path.with_extension(ext)).unwrap()).collect();

    // the point layer .shp is replaceable but one of its components is blocked
    std::fs::create_dir( dir.path().join("iss_points.dbf")).unwrap();

    let res = export( &iss_track( 2.0), Some(&path), &ExportOptions::default());
    assert!( res.is_err());

    let now: Vec<Vec<u8>> = ["shp", "shx", "dbf"].iter().map( |ext| std::fs::read( path.with_extension(ext)).unwrap()).collect();
    assert_eq!( now, old);
    assert!( !dir.path().join("iss_points.shp").exists());
    assert!( dir.path().join("iss_points.dbf").is_dir());
    assert_eq!( dir_entries( dir.path()), vec!["iss.cpg", "iss.dbf", "iss.prj", "iss.shp", "iss.shx", "iss_points.dbf"]);
}

#[test]
fn test_replace_existing_shapefile() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("iss.shp");
    let opts = ExportOptions{ include_points: false, ..ExportOptions::default() };

    export( &iss_track( 0.5), Some(&path), &opts).unwrap();
    export( &iss_track( 2.0), Some(&path), &opts).unwrap();

    let lines: Vec<shapefile::Polyline> = shapefile::read_shapes_as( &path).unwrap();
    assert_eq!( lines.len(), 2);
    assert_eq!( dir_entries( dir.path()).len(), 5);
}

#[test]
fn test_geopackage() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("iss.gpkg");

    let artifact = export( &iss_track( 2.0), Some(&path), &ExportOptions{ include_points: false, ..ExportOptions::default() }).unwrap();
    assert_eq!( artifact.paths(), &[path.clone()]);
    assert_eq!( dir_entries( dir.path()), vec!["iss.gpkg"]);

    let header = std::fs::read( &path).unwrap();
    assert!( header.starts_with( b"SQLite format 3\0"));

    let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
    rt.block_on( async {
        let mut conn = SqliteConnectOptions::new().filename( &path).read_only(true).connect().await.unwrap();

        let app_id: i64 = sqlx::query("PRAGMA application_id").fetch_one( &mut conn).await.unwrap().get(0);
        assert_eq!( app_id, 0x47504B47);

        let row = sqlx::query("SELECT table_name, data_type, srs_id FROM gpkg_contents").fetch_one( &mut conn).await.unwrap();
        assert_eq!( row.get::<String,_>(0), "track_25544");
        assert_eq!( row.get::<String,_>(1), "features");
        assert_eq!( row.get::<i64,_>(2), 4326);

        let n: i64 = sqlx::query("SELECT count(*) FROM track_25544").fetch_one( &mut conn).await.unwrap().get(0);
        assert_eq!( n, 2);

        let geom: Vec<u8> = sqlx::query("SELECT geom FROM track_25544 WHERE segment = 0").fetch_one( &mut conn).await.unwrap().get(0);
        assert_eq!( &geom[0..2], b"GP");

        conn.close().await.unwrap();
    });
}

// exporting from async code must not try to block the caller's runtime
#[tokio::test]
async fn test_geopackage_from_async_context() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("iss.gpkg");

    let artifact = export( &iss_track( 2.0), Some(&path), &ExportOptions::default()).unwrap();
    assert_eq!( artifact.paths().len(), 2);
    assert_eq!( dir_entries( dir.path()), vec!["iss.gpkg", "iss_points.gpkg"]);

    let mut conn = SqliteConnectOptions::new().filename( &path).read_only(true).connect().await.unwrap();
    let n: i64 = sqlx::query("SELECT count(*) FROM track_25544").fetch_one( &mut conn).await.unwrap().get(0);
    assert_eq!( n, 2);
    conn.close().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_geopackage_from_multi_thread_runtime() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("iss.gpkg");

    export( &iss_track( 0.5), Some(&path), &ExportOptions{ include_points: false, ..ExportOptions::default() }).unwrap();
    assert!( std::fs::read( &path).unwrap().starts_with( b"SQLite format 3\0"));
}

#[test]
fn test_pipeline_with_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out").join("iss.geojson");
    let config = TrackConfig{ create_parent_dirs: true, include_points: false, ..TrackConfig::default() };
    let window = TrackWindow::new( None, 2.0, 1.0);

    let (track, artifact) = generate_ground_track( &iss(), &config, &window, Some(&path)).unwrap();
    assert_eq!( track.points.len(), 121);
    assert_eq!( artifact.paths(), &[path.clone()]);
    assert!( path.is_file());
}
