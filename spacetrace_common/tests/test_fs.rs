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
#![allow(unused)]

use std::{fs, path::{Path,PathBuf}};
use spacetrace_common::fs::*;

#[test]
fn test_sibling_path () {
    assert_eq!( sibling_path( "out/iss.gpkg", "_points", "gpkg"), PathBuf::from("out/iss_points.gpkg"));
    assert_eq!( sibling_path( "iss.shp", "_tle", "txt"), PathBuf::from("iss_tle.txt"));
    assert_eq!( parent_dir( "iss.shp"), PathBuf::from("."));
    assert_eq!( parent_dir( "/tmp/iss.shp"), PathBuf::from("/tmp"));
    assert_eq!( lowercase_extension( "a/b/Track.GeoJSON"), Some("geojson".to_string()));
    assert_eq!( lowercase_extension( "a/b/track"), None);
}

#[test]
fn test_check_writable_dir () {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("x/y");

    assert!( check_writable_dir( &dir, false).is_err());
    assert!( !dir.exists());

    check_writable_dir( &dir, true).unwrap();
    assert!( dir.is_dir());
    check_writable_dir( &dir, false).unwrap();

    let file = dir.join("f.txt");
    fs::write( &file, "x").unwrap();
    assert!( check_writable_dir( &file, true).is_err());
}

#[test]
fn test_write_file_atomic () {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("data.txt");

    write_file_atomic( &path, b"first").unwrap();
    write_file_atomic( &path, b"second").unwrap();
    assert_eq!( filepath_contents_as_string(&path).unwrap(), "second");

    // no temp leftovers
    let n = fs::read_dir( tmp.path()).unwrap().count();
    assert_eq!( n, 1);

    assert!( check_replaceable_file( tmp.path()).is_err());
    assert!( check_replaceable_file( &path).is_ok());
}

#[test]
fn test_replace_files () {
    let tmp = tempfile::tempdir().unwrap();
    let stage = tmp.path().join("stage");
    let backup = tmp.path().join("backup");
    fs::create_dir( &stage).unwrap();
    fs::create_dir( &backup).unwrap();

    let a = tmp.path().join("a.txt");
    let b = tmp.path().join("b.txt");
    fs::write( &a, "old a").unwrap();
    fs::write( stage.join("a.txt"), "new a").unwrap();
    fs::write( stage.join("b.txt"), "new b").unwrap();

    let moves = vec![ (stage.join("a.txt"), a.clone()), (stage.join("b.txt"), b.clone()) ];
    replace_files( &moves, &backup).unwrap();
    assert_eq!( fs::read_to_string( &a).unwrap(), "new a");
    assert_eq!( fs::read_to_string( &b).unwrap(), "new b");
    assert_eq!( fs::read_to_string( backup.join("0.bak")).unwrap(), "old a");
}

#[test]
fn test_replace_files_reverts_on_error () {
    let tmp = tempfile::tempdir().unwrap();
    let stage = tmp.path().join("stage");
    let backup = tmp.path().join("backup");
    fs::create_dir( &stage).unwrap();
    fs::create_dir( &backup).unwrap();

    let a = tmp.path().join("a.txt");
    let b = tmp.path().join("b.txt");
    let c = tmp.path().join("c.txt");
    fs::write( &a, "old a").unwrap();
    fs::write( &c, "old c").unwrap();
    fs::write( stage.join("a.txt"), "new a").unwrap();
    fs::write( stage.join("b.txt"), "new b").unwrap();

    // the staged c is missing, so the last move fails
    let moves = vec![
        (stage.join("a.txt"), a.clone()),
        (stage.join("b.txt"), b.clone()),
        (stage.join("c.txt"), c.clone()),
    ];
    assert!( replace_files( &moves, &backup).is_err());

    assert_eq!( fs::read_to_string( &a).unwrap(), "old a");
    assert!( !b.exists());
    assert_eq!( fs::read_to_string( &c).unwrap(), "old c");
}

#[test]
fn test_replace_files_keeps_directories () {
    let tmp = tempfile::tempdir().unwrap();
    let stage = tmp.path().join("stage");
    let backup = tmp.path().join("backup");
    fs::create_dir( &stage).unwrap();
    fs::create_dir( &backup).unwrap();

    let a = tmp.path().join("a.txt");
    let d = tmp.path().join("d.txt");
    fs::create_dir( &d).unwrap();
    fs::write( d.join("keep"), "x").unwrap();
    fs::write( stage.join("a.txt"), "new a").unwrap();
    fs::write( stage.join("d.txt"), "new d").unwrap();

    let moves = vec![ (stage.join("a.txt"), a.clone()), (stage.join("d.txt"), d.clone()) ];
    assert!( replace_files( &moves, &backup).is_err());
    assert!( !a.exists());
    assert!( d.join("keep").is_file());
}
