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

use std::path::PathBuf;
use anyhow::{anyhow,Result};
use chrono::{DateTime,Utc};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use spacetrace_common::{datetime::parse_datetime, fs::path_to_lossy_string};
use spacetrace_orbital::{
    elements::{load_element_file, save_raw_elements}, 
    generate_ground_track, load_config, TrackConfig, TrackWindow, WrittenArtifact
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = "compute the ground track of a satellite from a TLE or OMM element file and export it as shapefile, geopackage or geojson")]
pub struct Args {
    /// start time (RFC3339), defaults to the element set epoch
    #[arg(long, value_parser = parse_start)]
    pub start: Option<DateTime<Utc>>,

    /// track duration in hours
    #[arg(short, long)]
    pub duration: Option<f64>,

    /// sample step in minutes
    #[arg(short, long)]
    pub step: Option<f64>,

    /// output file (.shp, .gpkg or .geojson). Only prints a summary if not set
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// create missing output directories
    #[arg(long)]
    pub create_dirs: bool,

    /// don't write the point layer
    #[arg(long)]
    pub no_points: bool,

    /// save the element set next to the output file
    #[arg(long)]
    pub save_raw: bool,

    /// RON config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// element file (.tle, .txt or .json)
    pub input: PathBuf,
}

fn parse_start (s: &str)->std::result::Result<DateTime<Utc>,String> {
    parse_datetime(s).ok_or_else( || format!("invalid start time {s}"))
}

fn main()->Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter( EnvFilter::try_from_default_env().unwrap_or_else( |_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    if args.save_raw && args.output.is_none() {
        return Err( anyhow!("--save-raw requires --output"))
    }

    let mut config = match &args.config {
        Some(path) => load_config( path)?,
        None => TrackConfig::default()
    };
    if let Some(step) = args.step { config.step_minutes = step }
    if let Some(duration) = args.duration { config.duration_hours = duration }
    if args.create_dirs { config.create_parent_dirs = true }
    if args.no_points { config.include_points = false }

    let (elements,format) = load_element_file( &args.input)?;
    let mut window = TrackWindow::from_config( &config);
    window.start = args.start;

    let (track,artifact) = generate_ground_track( &elements, &config, &window, args.output.as_deref())?;

    match &artifact {
        WrittenArtifact::Files{ format, paths } => {
            for p in paths { println!("{}", path_to_lossy_string(p)); }
        }
        WrittenArtifact::InMemory(layers) => {
            let n_lines = layers.lines.as_ref().map( |l| l.len()).unwrap_or(0);
            let n_points = layers.points.as_ref().map( |l| l.len()).unwrap_or(0);
            println!("{}: {} samples, {} line features, {} point features", elements.display_name(), track.points.len(), n_lines, n_points);
        }
    }

    if args.save_raw && let Some(output) = &args.output {
        let raw_path = save_raw_elements( output, &elements, format)?;
        println!("{}", path_to_lossy_string(&raw_path));
    }

    Ok(())
}
