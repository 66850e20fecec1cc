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

//! lazy, restartable sampling of a ground track at a fixed time step

use std::iter::FusedIterator;
use chrono::{DateTime,Utc};
use tracing::debug;
use spacetrace_common::datetime::add_minutes;

use crate::elements::OrbitalElementSet;
use crate::errors::{Result, SpaceTraceError};
use crate::frames::{FrameConverter, GroundPoint};
use crate::sgp4::Propagator;

/// default sample step in minutes
pub const DEFAULT_STEP_MINUTES: f64 = 1.0;

// tolerance for the number of whole steps that fit into the duration
const STEP_EPS: f64 = 1e-9;

/// the immutable sampling plan for one element set. Each call of [`TrackSampler::samples`] starts
/// a new sequence from `start`
#[derive(Debug,Clone)]
pub struct TrackSampler {
    propagator: Propagator,
    converter: FrameConverter,
    start: DateTime<Utc>,
    step_minutes: f64,
    n_samples: usize,
}

impl TrackSampler {

    /// create a sampler for `duration_hours` (≥ 0) from `start` (the element epoch if None) with a step
    /// of `step_minutes` (> 0). Both ends of the interval are sampled. Propagator initialization errors
    /// are reported here, i.e. before any sample is computed
    pub fn new (elements: &OrbitalElementSet, converter: &FrameConverter, start: Option<DateTime<Utc>>,
                duration_hours: f64, step_minutes: f64)->Result<Self> {
        if !duration_hours.is_finite() || duration_hours < 0.0 {
            return Err( SpaceTraceError::InvalidArgument( format!("duration must be a non-negative number of hours, got {duration_hours}")))
        }
        if !step_minutes.is_finite() || step_minutes <= 0.0 {
            return Err( SpaceTraceError::InvalidArgument( format!("step must be a positive number of minutes, got {step_minutes}")))
        }

        let propagator = Propagator::new( elements)?;
        let start = start.unwrap_or( elements.epoch);
        let duration_minutes = duration_hours * 60.0;
        let n_steps = (duration_minutes / step_minutes + STEP_EPS).floor();
        if n_steps >= usize::MAX as f64 {
            return Err( SpaceTraceError::InvalidArgument( format!("too many samples for step {step_minutes} min")))
        }
        let n_samples = n_steps as usize + 1;

        debug!("sampling {:05} from {} with {} samples of {} min", elements.sat_id, start, n_samples, step_minutes);

        Ok( TrackSampler { propagator, converter: converter.clone(), start, step_minutes, n_samples } )
    }

    pub fn start (&self)->DateTime<Utc> { self.start }

    pub fn step_minutes (&self)->f64 { self.step_minutes }

    pub fn len (&self)->usize { self.n_samples }

    pub fn is_empty (&self)->bool { self.n_samples == 0 }

    pub fn propagator (&self)->&Propagator { &self.propagator }

    /// the time of sample `i`
    pub fn sample_time (&self, i: usize)->Option<DateTime<Utc>> {
        if i < self.n_samples {
            add_minutes( &self.start, i as f64 * self.step_minutes)
        } else {
            None
        }
    }

    /// compute a single sample
    pub fn sample_at (&self, t: &DateTime<Utc>)->Result<GroundPoint> {
        let sv = self.propagator.propagate(t)?;
        self.converter.to_geodetic( &sv, t)
    }

    /// a new lazy sequence over all samples. The sequence ends after the first error
    pub fn samples (&self)->Samples<'_> {
        Samples { sampler: self, next: 0, failed: false }
    }

    /// all samples, or the first error
    pub fn collect_points (&self)->Result<Vec<GroundPoint>> {
        self.samples().collect()
    }
}

/// forward-only iterator over the samples of a [`TrackSampler`]
#[derive(Debug,Clone)]
pub struct Samples<'a> {
    sampler: &'a TrackSampler,
    next: usize,
    failed: bool,
}

impl<'a> Iterator for Samples<'a> {
    type Item = Result<GroundPoint>;

    fn next (&mut self)->Option<Self::Item> {
        if self.failed || self.next >= self.sampler.n_samples {
            return None
        }

        let i = self.next;
        self.next += 1;

        let res = match self.sampler.sample_time(i) {
            Some(t) => self.sampler.sample_at(&t),
            None => Err( SpaceTraceError::InvalidArgument( format!("sample time {i} out of range")))
        };
        if res.is_err() { self.failed = true }

        Some(res)
    }

    fn size_hint (&self)->(usize, Option<usize>) {
        if self.failed {
            (0, Some(0))
        } else {
            let remaining = self.sampler.n_samples - self.next;
            (0, Some(remaining))
        }
    }
}

impl<'a> FusedIterator for Samples<'a> {}
