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

use std::path::PathBuf;
use chrono::{DateTime,Utc};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SpaceTraceError>;

#[derive(Error,Debug)]
pub enum SpaceTraceError {

    #[error("malformed element set (field {field}): {msg}")]
    MalformedElementSet { field: String, msg: String },

    #[error("unsupported element format: {0}")]
    UnsupportedFormat(String),

    #[error("propagation diverged at {epoch}: {msg}")]
    PropagationDivergence { epoch: DateTime<Utc>, msg: String },

    #[error("decayed orbit at {epoch}: {msg}")]
    DecayedOrbit { epoch: DateTime<Utc>, msg: String },

    #[error("unsupported output file format: {path:?}")]
    UnsupportedFileFormat { path: PathBuf },

    #[error("destination {path:?} not writable: {msg}")]
    DestinationNotWritable { path: PathBuf, msg: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("IO error {0}")]
    IOError( #[from] std::io::Error),

    #[error("JSON error {0}")]
    JsonError( #[from] serde_json::Error),

    #[error("config error {0}")]
    ConfigError( #[from] ron::error::SpannedError),

    #[error("shapefile error {0}")]
    ShapefileError( #[from] shapefile::Error),

    #[error("sql error {0}")]
    SqlError( #[from] sqlx::Error),

    #[error("operation failed {0}")]
    OpFailedError(String),
}

macro_rules! malformed {
    ($field:expr, $fmt:literal $(, $arg:expr )* ) => {
        SpaceTraceError::MalformedElementSet{ field: $field.to_string(), msg: format!( $fmt $(, $arg)* ) }
    };
}
pub (crate) use malformed;

macro_rules! op_failed {
    ($fmt:literal $(, $arg:expr )* ) => {
        SpaceTraceError::OpFailedError( format!( $fmt $(, $arg)* ))
    };
}
pub (crate) use op_failed;
