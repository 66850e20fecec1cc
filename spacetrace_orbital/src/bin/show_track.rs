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
use anyhow::Result;
use chrono::{DateTime,Utc};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use spacetrace_common::datetime::parse_datetime;
use spacetrace_orbital::{assemble, load_element_file, FrameConverter, TrackSampler, sampler::DEFAULT_STEP_MINUTES};

#[derive(Parser, Debug)]
#[command(version, about, long_about = "print the ground points of a TLE or OMM element file")]
pub struct Args {
    /// start time (RFC3339), defaults to the element set epoch
    #[arg(long, value_parser = parse_start)]
    pub start: Option<DateTime<Utc>>,

    /// duration in hours
    #[arg(short, long, default_value_t = 2.0)]
    pub duration: f64,

    /// sample step in minutes
    #[arg(short, long, default_value_t = DEFAULT_STEP_MINUTES)]
    pub step: f64,

    /// print segments instead of samples
    #[arg(long)]
    pub segments: bool,

    /// element file (.tle, .txt or .json)
    pub input: PathBuf,
}

fn parse_start (s: &str)->std::result::Result<DateTime<Utc>,String> {
    parse_datetime(s).ok_or_else( || format!("invalid start time {s}"))
}

fn main()->Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter( EnvFilter::try_from_default_env().unwrap_or_else( |_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();
    let (elements,_) = load_element_file( &args.input)?;
    let converter = FrameConverter::default();
    let sampler = TrackSampler::new( &elements, &converter, args.start, args.duration, args.step)?;

    println!("{elements}");
    if args.segments {
        let track = assemble( &elements, sampler.samples())?;
        for seg in &track.segments {
            println!("--- segment {} ({} points)", seg.index, seg.len());
            for p in &seg.points { println!("{p}") }
        }
    } else {
        for p in sampler.samples() {
            println!("{}", p?);
        }
    }

    Ok(())
}
