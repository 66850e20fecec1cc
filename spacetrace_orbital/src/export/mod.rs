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

//! export of assembled ground tracks, either as in-memory feature sets or as files. The output
//! format is selected by the file extension
//!
//! File export writes the line layer at the destination path and (optionally) the point layer at
//! `<stem>_points.<ext>`. All layers are first written to a staging directory next to the destination
//! and only moved into place once every layer is complete. A failed export leaves no partial files
//! behind and restores files it was about to replace

use std::{fmt, path::{Path,PathBuf}};
use tracing::info;
use spacetrace_common::fs::{check_replaceable_file, check_writable_dir, lowercase_extension, parent_dir, path_to_lossy_string, replace_files, sibling_path};

use crate::assembler::GroundTrack;
use crate::errors::{Result, SpaceTraceError};

pub mod feature;
pub mod json;
pub mod shp;
pub mod gpkg;

pub use feature::{AttrValue, Feature, FeatureSet, FieldDef, FieldType};

/// file suffix of the optional point layer
pub const POINTS_SUFFIX: &str = "_points";

#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum OutputFormat {
    Shapefile,
    GeoPackage,
    GeoJson,
}

impl OutputFormat {
    /// map a (case insensitive) file extension to the output format
    pub fn for_extension (ext: &str)->Option<OutputFormat> {
        match ext.to_ascii_lowercase().as_str() {
            "shp" => Some(OutputFormat::Shapefile),
            "gpkg" => Some(OutputFormat::GeoPackage),
            "geojson" => Some(OutputFormat::GeoJson),
            _ => None
        }
    }

    /// this only looks at the path, i.e. does not access the file system
    pub fn from_path (path: impl AsRef<Path>)->Result<OutputFormat> {
        let path = path.as_ref();
        lowercase_extension( path)
            .and_then( |ext| OutputFormat::for_extension( &ext))
            .ok_or_else( || SpaceTraceError::UnsupportedFileFormat{ path: path.to_path_buf() })
    }

    pub fn extension (&self)->&'static str {
        match self {
            OutputFormat::Shapefile => "shp",
            OutputFormat::GeoPackage => "gpkg",
            OutputFormat::GeoJson => "geojson",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt (&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Shapefile => "ESRI Shapefile",
            OutputFormat::GeoPackage => "GeoPackage",
            OutputFormat::GeoJson => "GeoJSON",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug,Clone)]
pub struct ExportOptions {
    pub include_lines: bool,
    pub include_points: bool,
    pub create_dirs: bool,  // create missing parent directories
}

impl Default for ExportOptions {
    fn default()->Self {
        ExportOptions { include_lines: true, include_points: true, create_dirs: false }
    }
}

/// the in-memory layers of a ground track
#[derive(Debug,Clone,PartialEq)]
pub struct LayerSet {
    pub lines: Option<FeatureSet>,
    pub points: Option<FeatureSet>,
}

impl LayerSet {
    pub fn new (track: &GroundTrack, opts: &ExportOptions)->Self {
        LayerSet {
            lines: opts.include_lines.then( || FeatureSet::line_layer( track)),
            points: opts.include_points.then( || FeatureSet::point_layer( track)),
        }
    }
}

/// what an export produced
#[derive(Debug,Clone)]
pub enum WrittenArtifact {
    InMemory( LayerSet ),
    Files { format: OutputFormat, paths: Vec<PathBuf> },
}

impl WrittenArtifact {
    pub fn paths (&self)->&[PathBuf] {
        match self {
            WrittenArtifact::InMemory(_) => &[],
            WrittenArtifact::Files{ paths, .. } => paths.as_slice()
        }
    }
}

/// the path of the point layer that belongs to a line layer path
pub fn points_path (path: impl AsRef<Path>, format: OutputFormat)->PathBuf {
    sibling_path( path, POINTS_SUFFIX, format.extension())
}

fn check_destination (path: &Path, create_dirs: bool)->Result<()> {
    let dir = parent_dir( path);
    check_writable_dir( &dir, create_dirs)
        .and_then( |_| check_replaceable_file( path))
        .map_err( |e| SpaceTraceError::DestinationNotWritable{ path: path.to_path_buf(), msg: e.to_string() })
}

/// check format and destination of a file export before anything is computed or written. The format
/// is checked first so that unsupported extensions never touch the file system. Missing parent
/// directories are only created if `opts.create_dirs` is set
pub fn check_export_destination (path: &Path, opts: &ExportOptions)->Result<OutputFormat> {
    let format = OutputFormat::from_path( path)?;
    if !opts.include_lines && !opts.include_points {
        return Err( SpaceTraceError::InvalidArgument( "no layers selected for export".to_string()))
    }
    check_destination( path, opts.create_dirs)?;
    Ok(format)
}

fn write_layer (layer: &FeatureSet, path: &Path, format: OutputFormat)->Result<Vec<PathBuf>> {
    match format {
        OutputFormat::GeoJson => {
            json::write_geojson( layer, path)?;
            Ok( vec![ path.to_path_buf() ])
        }
        OutputFormat::GeoPackage => {
            gpkg::write_geopackage( layer, path)?;
            Ok( vec![ path.to_path_buf() ])
        }
        OutputFormat::Shapefile => shp::write_shapefile( layer, path)
    }
}

fn staged_path (staging_dir: &Path, target: &Path)->Result<PathBuf> {
    target.file_name()
        .map( |name| staging_dir.join( name))
        .ok_or_else( || SpaceTraceError::DestinationNotWritable{ path: target.to_path_buf(), msg: "no file name".to_string() })
}

/// export a ground track. Without destination this returns the in-memory layers, otherwise the
/// destination extension selects the format. Format and destination are checked before anything is written
pub fn export (track: &GroundTrack, destination: Option<&Path>, opts: &ExportOptions)->Result<WrittenArtifact> {
    let Some(path) = destination else {
        return Ok( WrittenArtifact::InMemory( LayerSet::new( track, opts)))
    };

    let format = check_export_destination( path, opts)?;
    let layers = LayerSet::new( track, opts);

    let pp = points_path( path, format);
    if layers.points.is_some() {
        check_replaceable_file( &pp).map_err( |e| SpaceTraceError::DestinationNotWritable{ path: pp.clone(), msg: e.to_string() })?;
    }

    // stage all layers before we touch any existing destination file
    let staging = tempfile::Builder::new().prefix(".export").tempdir_in( parent_dir( path))?;
    let mut staged = Vec::new();

    if let Some(lines) = &layers.lines {
        staged.extend( write_layer( lines, &staged_path( staging.path(), path)?, format)?);
    }
    if let Some(points) = &layers.points {
        staged.extend( write_layer( points, &staged_path( staging.path(), &pp)?, format)?);
    }

    let moves: Vec<(PathBuf,PathBuf)> = staged.into_iter()
        .filter_map( |src| src.file_name().map( |name| path.with_file_name( name)).map( |tgt| (src,tgt)))
        .collect();

    let backup_dir = staging.path().join("replaced");
    std::fs::create_dir( &backup_dir)?;
    replace_files( &moves, &backup_dir)?;

    let paths: Vec<PathBuf> = moves.into_iter().map( |(_,tgt)| tgt).collect();
    for p in &paths {
        info!("written {} file {}", format, path_to_lossy_string(p));
    }

    Ok( WrittenArtifact::Files{ format, paths } )
}
