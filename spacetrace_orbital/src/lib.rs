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

//! satellite ground tracks: element set parsing (TLE, OMM), SGP4/SDP4 propagation, conversion
//! into geodetic coordinates, antimeridian splitting and export as vector features

use std::path::{Path,PathBuf};
use chrono::{DateTime,Utc};
use tracing::{debug,info};

pub mod errors;
use errors::{Result,SpaceTraceError};

pub mod elements;
pub mod tle;
pub mod omm;
pub mod sgp4;
pub mod frames;
pub mod sampler;
pub mod assembler;
pub mod export;
pub mod config;

pub use elements::{OrbitalElementSet, ElementFormat, parse_element_data, parse_elements, load_element_file};
pub use sgp4::{Propagator, StateVector, OrbitModel, propagate};
pub use frames::{EarthModel, FrameConverter, GroundPoint};
pub use sampler::TrackSampler;
pub use assembler::{GroundTrack, TrackSegment, assemble};
pub use export::{ExportOptions, OutputFormat, WrittenArtifact, export};
pub use config::{TrackConfig, load_config};

/// the time window of a ground track
#[derive(Debug,Clone,Copy,PartialEq)]
pub struct TrackWindow {
    pub start: Option<DateTime<Utc>>,  // element epoch if None
    pub duration_hours: f64,
    pub step_minutes: f64,
}

impl TrackWindow {
    pub fn new (start: Option<DateTime<Utc>>, duration_hours: f64, step_minutes: f64)->Self {
        TrackWindow { start, duration_hours, step_minutes }
    }

    pub fn from_config (config: &TrackConfig)->Self {
        TrackWindow { start: None, duration_hours: config.duration_hours, step_minutes: config.step_minutes }
    }
}

/// sample and assemble the ground track of an element set. Fails with the first propagation error
pub fn compute_track (elements: &OrbitalElementSet, converter: &FrameConverter, window: &TrackWindow)->Result<GroundTrack> {
    let sampler = TrackSampler::new( elements, converter, window.start, window.duration_hours, window.step_minutes)?;
    let track = assemble( elements, sampler.samples())?;

    info!("computed {} samples with {} antimeridian splits for {}", track.points.len(), track.n_splits(), elements.display_name());
    Ok(track)
}

/// the complete pipeline from element set to written artifact. The output format and destination are
/// checked before anything is propagated, i.e. nothing is computed for an export that cannot succeed
pub fn generate_ground_track (elements: &OrbitalElementSet, config: &TrackConfig, window: &TrackWindow, 
                              destination: Option<&Path>)->Result<(GroundTrack,WrittenArtifact)> {
    config.validate()?;
    let opts = config.export_options();
    if let Some(path) = destination {
        let format = export::check_export_destination( path, &opts)?;
        debug!("exporting {} as {}", elements.display_name(), format);
    }

    let converter = FrameConverter::new( &config.earth_model);
    let track = compute_track( elements, &converter, window)?;
    let artifact = export( &track, destination, &opts)?;

    Ok( (track,artifact) )
}
