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

//! ground track configuration, loaded from RON files

use std::path::Path;
use serde::{Serialize,Deserialize};
use tracing::info;
use spacetrace_common::fs::path_to_lossy_string;

use crate::errors::{Result, SpaceTraceError};
use crate::export::ExportOptions;
use crate::frames::EarthModel;
use crate::sampler::DEFAULT_STEP_MINUTES;

pub const DEFAULT_DURATION_HOURS: f64 = 24.0;

/// ground track parameters. All fields have defaults so that config files only need to contain
/// what differs from them, e.g.
/// ```ron
/// TrackConfig( step_minutes: 0.5, create_parent_dirs: true )
/// ```
#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
#[serde(default)]
pub struct TrackConfig {
    pub earth_model: EarthModel,
    pub step_minutes: f64,
    pub duration_hours: f64,
    pub create_parent_dirs: bool,
    pub include_points: bool,
    pub include_lines: bool,
}

impl Default for TrackConfig {
    fn default()->Self {
        TrackConfig {
            earth_model: EarthModel::default(),
            step_minutes: DEFAULT_STEP_MINUTES,
            duration_hours: DEFAULT_DURATION_HOURS,
            create_parent_dirs: false,
            include_points: true,
            include_lines: true,
        }
    }
}

impl TrackConfig {
    pub fn validate (&self)->Result<()> {
        self.earth_model.validate()?;
        if !(self.step_minutes > 0.0) || !self.step_minutes.is_finite() {
            return Err( SpaceTraceError::InvalidArgument( format!("step_minutes has to be positive: {}", self.step_minutes)))
        }
        if !(self.duration_hours >= 0.0) || !self.duration_hours.is_finite() {
            return Err( SpaceTraceError::InvalidArgument( format!("duration_hours must not be negative: {}", self.duration_hours)))
        }
        Ok(())
    }

    pub fn export_options (&self)->ExportOptions {
        ExportOptions { 
            include_lines: self.include_lines, 
            include_points: self.include_points, 
            create_dirs: self.create_parent_dirs 
        }
    }
}

pub fn parse_config (data: &[u8])->Result<TrackConfig> {
    let config: TrackConfig = ron::de::from_bytes( data)?;
    config.validate()?;
    Ok(config)
}

/// load config from a RON file. A missing file yields the defaults
pub fn load_config (path: impl AsRef<Path>)->Result<TrackConfig> {
    let path = path.as_ref();
    if !path.exists() {
        info!("no config file {}, using defaults", path_to_lossy_string(path));
        return Ok( TrackConfig::default())
    }
    let data = std::fs::read( path)?;
    parse_config( data.as_slice())
}
