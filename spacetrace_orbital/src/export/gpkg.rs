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

//! OGC GeoPackage encoding of feature sets, written through sqlite

use std::path::Path;
use chrono::Utc;
use geo_types::Geometry;
use sqlx::{Connection, Sqlite, query::Query, sqlite::{SqliteArguments, SqliteConnectOptions, SqliteConnection}};
use tracing::debug;
use spacetrace_common::{datetime::rfc3339_millis, fs::temp_file_for, geo_constants::EPSG_4326_WKT};

use crate::errors::{Result, SpaceTraceError, op_failed};
use super::feature::{AttrValue, FeatureSet, FieldType, geometry_bounds};

/// 'GPKG' in big endian
pub const GPKG_APPLICATION_ID: i32 = 0x47504B47;
pub const GPKG_USER_VERSION: i32 = 10200;
pub const SRS_ID: i32 = 4326;

const GEOMETRY_COLUMN: &str = "geom";

//--- geometry encoding

fn wkb_coord (buf: &mut Vec<u8>, x: f64, y: f64) {
    buf.extend_from_slice( &x.to_le_bytes());
    buf.extend_from_slice( &y.to_le_bytes());
}

/// little endian WKB of the point and linestring geometries we produce
pub fn wkb (geom: &Geometry<f64>)->Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(64);
    buf.push(1); // little endian

    match geom {
        Geometry::Point(p) => {
            buf.extend_from_slice( &1u32.to_le_bytes());
            wkb_coord( &mut buf, p.x(), p.y());
        }
        Geometry::LineString(ls) => {
            buf.extend_from_slice( &2u32.to_le_bytes());
            buf.extend_from_slice( &(ls.0.len() as u32).to_le_bytes());
            for c in ls.coords() {
                wkb_coord( &mut buf, c.x, c.y);
            }
        }
        _ => return Err( op_failed!("unsupported geometry type"))
    }
    Ok(buf)
}

/// GeoPackage binary: "GP" magic, version 0, flags (little endian, xy envelope), srs id, envelope, WKB
pub fn gp_blob (geom: &Geometry<f64>)->Result<Vec<u8>> {
    let bounds = geometry_bounds( geom).ok_or_else( || op_failed!("empty geometry"))?;
    let wkb = wkb( geom)?;

    let mut buf = Vec::with_capacity( 40 + wkb.len());
    buf.extend_from_slice( b"GP");
    buf.push(0);                  // version 1.0
    buf.push( (1 << 1) | 1);      // envelope [minx,maxx,miny,maxy], little endian
    buf.extend_from_slice( &SRS_ID.to_le_bytes());
    for v in [bounds.min().x, bounds.max().x, bounds.min().y, bounds.max().y] {
        buf.extend_from_slice( &v.to_le_bytes());
    }
    buf.extend_from_slice( &wkb);

    Ok(buf)
}

fn geometry_type_name (layer: &FeatureSet)->&'static str {
    if layer.is_point_layer() {
        "POINT"
    } else if layer.features.iter().all( |f| matches!( f.geometry, Geometry::LineString(_))) {
        "LINESTRING"
    } else {
        "GEOMETRY"
    }
}

fn column_type (ft: FieldType)->&'static str {
    match ft {
        FieldType::Integer => "INTEGER",
        FieldType::Real => "DOUBLE",
        FieldType::Text => "TEXT",
        FieldType::DateTime => "DATETIME",
    }
}

fn bind_attr<'q> (q: Query<'q,Sqlite,SqliteArguments<'q>>, v: &AttrValue)->Query<'q,Sqlite,SqliteArguments<'q>> {
    match v {
        AttrValue::Integer(i) => q.bind(*i),
        AttrValue::Real(x) => q.bind(*x),
        AttrValue::Text(s) => q.bind( s.clone()),
        AttrValue::DateTime(dt) => q.bind( rfc3339_millis(dt)),
        AttrValue::Null => q.bind( None::<String>),
    }
}

//--- database

async fn create_metadata_tables (conn: &mut SqliteConnection)->Result<()> {
    sqlx::query( r#"
        CREATE TABLE gpkg_spatial_ref_sys (
            srs_name TEXT NOT NULL,
            srs_id INTEGER NOT NULL PRIMARY KEY,
            organization TEXT NOT NULL,
            organization_coordsys_id INTEGER NOT NULL,
            definition TEXT NOT NULL,
            description TEXT
        );
    "#).execute( &mut *conn).await?;

    sqlx::query( r#"
        CREATE TABLE gpkg_contents (
            table_name TEXT NOT NULL PRIMARY KEY,
            data_type TEXT NOT NULL,
            identifier TEXT UNIQUE,
            description TEXT DEFAULT '',
            last_change DATETIME NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now')),
            min_x DOUBLE,
            min_y DOUBLE,
            max_x DOUBLE,
            max_y DOUBLE,
            srs_id INTEGER,
            CONSTRAINT fk_gc_r_srs_id FOREIGN KEY (srs_id) REFERENCES gpkg_spatial_ref_sys(srs_id)
        );
    "#).execute( &mut *conn).await?;

    sqlx::query( r#"
        CREATE TABLE gpkg_geometry_columns (
            table_name TEXT NOT NULL,
            column_name TEXT NOT NULL,
            geometry_type_name TEXT NOT NULL,
            srs_id INTEGER NOT NULL,
            z TINYINT NOT NULL,
            m TINYINT NOT NULL,
            CONSTRAINT pk_geom_cols PRIMARY KEY (table_name, column_name),
            CONSTRAINT uk_gc_table_name UNIQUE (table_name),
            CONSTRAINT fk_gc_tn FOREIGN KEY (table_name) REFERENCES gpkg_contents(table_name),
            CONSTRAINT fk_gc_srs FOREIGN KEY (srs_id) REFERENCES gpkg_spatial_ref_sys (srs_id)
        );
    "#).execute( &mut *conn).await?;

    let srs_rows: [(&str,i32,&str,i32,&str,&str);3] = [
        ("Undefined cartesian SRS", -1, "NONE", -1, "undefined", "undefined cartesian coordinate reference system"),
        ("Undefined geographic SRS", 0, "NONE", 0, "undefined", "undefined geographic coordinate reference system"),
        ("WGS 84 geodetic", SRS_ID, "EPSG", 4326, EPSG_4326_WKT, "longitude/latitude coordinates in decimal degrees on the WGS 84 spheroid"),
    ];
    for (name, id, org, org_id, def, descr) in srs_rows {
        sqlx::query( r#"
            INSERT INTO gpkg_spatial_ref_sys (srs_name, srs_id, organization, organization_coordsys_id, definition, description)
            VALUES (?, ?, ?, ?, ?, ?)
        "#)
        .bind(name).bind(id).bind(org).bind(org_id).bind(def).bind(descr)
        .execute( &mut *conn).await?;
    }

    Ok(())
}

async fn write_feature_table (conn: &mut SqliteConnection, layer: &FeatureSet)->Result<()> {
    let table = &layer.name;

    let columns: Vec<String> = layer.fields.iter().map( |f| format!("\"{}\" {}", f.name, column_type(f.field_type))).collect();
    let sql = format!("CREATE TABLE \"{table}\" (fid INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL, {GEOMETRY_COLUMN} {}, {})",
                      geometry_type_name(layer), columns.join(", "));
    sqlx::query( &sql).execute( &mut *conn).await?;

    let bounds = layer.bounds();
    sqlx::query( r#"
        INSERT INTO gpkg_contents (table_name, data_type, identifier, description, last_change, min_x, min_y, max_x, max_y, srs_id)
        VALUES (?, 'features', ?, ?, ?, ?, ?, ?, ?, ?)
    "#)
    .bind( table)
    .bind( table)
    .bind( format!("ground track {table}"))
    .bind( rfc3339_millis( &Utc::now()))
    .bind( bounds.map( |r| r.min().x))
    .bind( bounds.map( |r| r.min().y))
    .bind( bounds.map( |r| r.max().x))
    .bind( bounds.map( |r| r.max().y))
    .bind( SRS_ID)
    .execute( &mut *conn).await?;

    sqlx::query( r#"
        INSERT INTO gpkg_geometry_columns (table_name, column_name, geometry_type_name, srs_id, z, m)
        VALUES (?, ?, ?, ?, 0, 0)
    "#)
    .bind( table)
    .bind( GEOMETRY_COLUMN)
    .bind( geometry_type_name(layer))
    .bind( SRS_ID)
    .execute( &mut *conn).await?;

    let names: Vec<String> = layer.fields.iter().map( |f| format!("\"{}\"", f.name)).collect();
    let placeholders = vec!["?"; layer.fields.len() + 1].join(", ");
    let insert = format!("INSERT INTO \"{table}\" ({GEOMETRY_COLUMN}, {}) VALUES ({placeholders})", names.join(", "));

    for f in &layer.features {
        let mut q = sqlx::query( &insert).bind( gp_blob( &f.geometry)?);
        for v in &f.attributes {
            q = bind_attr( q, v);
        }
        q.execute( &mut *conn).await?;
    }

    Ok(())
}

async fn write_db (layer: &FeatureSet, db_path: &Path)->Result<()> {
    let options = SqliteConnectOptions::new()
        .filename( db_path)
        .create_if_missing( true);
    let mut conn = SqliteConnection::connect_with( &options).await?;

    // header fields, these have to be set outside of a transaction
    sqlx::query( &format!("PRAGMA application_id = {GPKG_APPLICATION_ID}")).execute( &mut conn).await?;
    sqlx::query( &format!("PRAGMA user_version = {GPKG_USER_VERSION}")).execute( &mut conn).await?;

    let mut tx = conn.begin().await?;
    create_metadata_tables( &mut *tx).await?;
    write_feature_table( &mut *tx, layer).await?;
    tx.commit().await?;

    conn.close().await?;
    Ok(())
}

/// drive the async writer on its own current-thread runtime. If the caller already runs inside a tokio
/// runtime we can't block its thread, so the write moves to a scoped thread with a fresh runtime
fn run_db_write (layer: &FeatureSet, path: &Path)->Result<()> {
    let run = || -> Result<()> {
        let rt = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
        rt.block_on( write_db( layer, path))
    };

    if tokio::runtime::Handle::try_current().is_ok() {
        std::thread::scope( |s| {
            s.spawn( run).join().map_err( |_| op_failed!("geopackage writer thread panicked"))?
        })
    } else {
        run()
    }
}

/// write feature set as a GeoPackage. The database is created in a temp file next to the target and
/// persisted once the transaction has been committed
pub fn write_geopackage (layer: &FeatureSet, path: &Path)->Result<()> {
    let tmp = temp_file_for( path)?;

    run_db_write( layer, tmp.path())?;

    tmp.persist( path).map_err( |e| e.error)?;
    debug!("wrote geopackage {:?} with {} features", path, layer.len());

    Ok(())
}
