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

//! the SGP4/SDP4 analytical propagator for NORAD mean element sets (Vallado et al., "Revisiting
//! Spacetrack Report #3", AIAA 2006-6753) using WGS72 gravity constants and the improved GMST mode.
//!
//! The model is selected once from the element set's period. Both near earth and deep space variants
//! share the secular drag/gravity terms and the Kepler/short periodic solution. Deep space orbits
//! add lunar-solar secular and periodic terms and, for 12h and 24h orbits, the resonance integrator.
//! Propagation is stateless: the resonance integrator restarts from epoch for each call so that
//! results do not depend on the order of calls

use std::{f64::consts::PI, fmt};
use chrono::{DateTime,Utc};
use tracing::debug;
use spacetrace_common::{TWO_PI, cartesian3::Cartesian3, datetime::{add_minutes, minutes_since, MINUTES_PER_DAY}};

use crate::elements::OrbitalElementSet;
use crate::errors::{Result, SpaceTraceError};

mod near_earth;
mod deep_space;

use near_earth::{InitGeometry, SecularTerms, SecularState};
pub use deep_space::{DeepSpace, Resonance};

pub(crate) const X2O3: f64 = 2.0 / 3.0;

/// period in minutes at and above which we use the deep space variant
pub const DEEP_SPACE_PERIOD: f64 = 225.0;

pub const KEPLER_MAX_ITER: usize = 10;
pub const KEPLER_TOLERANCE: f64 = 1.0e-12;

/// earth gravity model constants. Distances are in earth radii and time in minutes internally
#[derive(Debug,Clone,Copy)]
pub struct GravityModel {
    pub mu: f64,      // km³/s²
    pub radius: f64,  // km
    pub xke: f64,     // sqrt(mu) in earth radii^1.5 per minute
    pub tumin: f64,   // minutes per time unit
    pub j2: f64,
    pub j3: f64,
    pub j4: f64,
    pub j3oj2: f64,
}

impl GravityModel {
    pub fn wgs72 ()->Self {
        let mu: f64 = 398600.8;
        let radius: f64 = 6378.135;
        let xke = 60.0 / (radius * radius * radius / mu).sqrt();
        let j2 = 0.001082616;
        let j3 = -0.00000253881;
        let j4 = -0.00000165597;

        GravityModel { mu, radius, xke, tumin: 1.0 / xke, j2, j3, j4, j3oj2: j3 / j2 }
    }
}

/// Greenwich mean sidereal time in radians [0,2π) for a UT1 julian date (IAU-82)
pub fn gstime (jd_ut1: f64)->f64 {
    let tut1 = (jd_ut1 - 2451545.0) / 36525.0;
    let temp = -6.2e-6 * tut1 * tut1 * tut1 
        + 0.093104 * tut1 * tut1
        + (876600.0 * 3600.0 + 8640184.812866) * tut1 
        + 67310.54841;  // seconds
    let temp = (temp * (PI / 180.0) / 240.0) % TWO_PI;

    if temp < 0.0 { temp + TWO_PI } else { temp }
}

/// inertial (TEME) position and velocity at a given time
#[derive(Debug,Clone,PartialEq)]
pub struct StateVector {
    pub epoch: DateTime<Utc>,
    pub position: Cartesian3,  // km
    pub velocity: Cartesian3,  // km/s
}

impl StateVector {
    pub fn radius (&self)->f64 { self.position.length() }
    pub fn speed (&self)->f64 { self.velocity.length() }
}

/// the mean elements in propagator units (radians, radians per minute)
#[derive(Debug,Clone)]
pub(crate) struct MeanElements {
    pub bstar: f64,
    pub ecco: f64,
    pub argpo: f64,
    pub inclo: f64,
    pub mo: f64,
    pub no_kozai: f64,
    pub nodeo: f64,
}

impl MeanElements {
    fn from_elements (e: &OrbitalElementSet)->Self {
        MeanElements {
            bstar: e.bstar,
            ecco: e.eccentricity,
            argpo: e.arg_of_perigee.to_radians(),
            inclo: e.inclination.to_radians(),
            mo: e.mean_anomaly.to_radians(),
            no_kozai: e.mean_motion * TWO_PI / MINUTES_PER_DAY,
            nodeo: e.raan.to_radians(),
        }
    }
}

/// the angles after lunar-solar periodics have been applied
#[derive(Debug,Clone)]
pub(crate) struct PerturbedElements {
    pub ep: f64,
    pub xincp: f64,
    pub nodep: f64,
    pub argpp: f64,
    pub mp: f64,
}

/// the propagation model variant, chosen once from the element set period
#[derive(Debug,Clone)]
pub enum OrbitModel {
    NearEarth,
    DeepSpace( Box<DeepSpace> ),
}

impl fmt::Display for OrbitModel {
    fn fmt (&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrbitModel::NearEarth => write!(f, "SGP4 (near earth)"),
            OrbitModel::DeepSpace(_) => write!(f, "SDP4 (deep space)"),
        }
    }
}

/// why a single propagation failed. Turned into a SpaceTraceError once we know the target epoch
#[derive(Debug,Clone,PartialEq)]
pub(crate) enum Sgp4Failure {
    Decayed(String),
    Diverged(String),
}

impl Sgp4Failure {
    fn into_error (self, epoch: DateTime<Utc>)->SpaceTraceError {
        match self {
            Sgp4Failure::Decayed(msg) => SpaceTraceError::DecayedOrbit{ epoch, msg },
            Sgp4Failure::Diverged(msg) => SpaceTraceError::PropagationDivergence{ epoch, msg },
        }
    }
}

/// an initialized propagator for one element set. This is immutable after construction, i.e. it can
/// be shared between threads and called in any order
#[derive(Debug,Clone)]
pub struct Propagator {
    sat_id: u32,
    epoch: DateTime<Utc>,
    grav: GravityModel,
    mean: MeanElements,
    no_unkozai: f64,
    secular: SecularTerms,
    model: OrbitModel,
}

impl Propagator {

    pub fn new (elements: &OrbitalElementSet)->Result<Self> {
        elements.validate()?;

        let grav = GravityModel::wgs72();
        let epoch_jd = elements.epoch_jd();
        let mean = MeanElements::from_elements( elements);
        let geom = InitGeometry::new( &grav, &mean, epoch_jd);

        let is_deep_space = TWO_PI / geom.no_unkozai >= DEEP_SPACE_PERIOD;
        let secular = SecularTerms::new( &grav, &mean, &geom, is_deep_space);

        let model = if is_deep_space {
            OrbitModel::DeepSpace( Box::new( DeepSpace::new( &grav, &mean, &geom, &secular)))
        } else {
            OrbitModel::NearEarth
        };
        debug!("{:05} uses {} model (period {:.2} min)", elements.sat_id, model, TWO_PI / geom.no_unkozai);

        Ok( Propagator { sat_id: elements.sat_id, epoch: elements.epoch, grav, mean, no_unkozai: geom.no_unkozai, secular, model } )
    }

    pub fn sat_id (&self)->u32 { self.sat_id }

    pub fn epoch (&self)->DateTime<Utc> { self.epoch }

    pub fn model (&self)->&OrbitModel { &self.model }

    pub fn is_deep_space (&self)->bool { matches!( self.model, OrbitModel::DeepSpace(_)) }

    /// state at an absolute time
    pub fn propagate (&self, t: &DateTime<Utc>)->Result<StateVector> {
        let tsince = minutes_since( &self.epoch, t);
        self.state_at( tsince, *t)
    }

    /// state at a number of minutes since the element epoch
    pub fn propagate_minutes (&self, tsince: f64)->Result<StateVector> {
        let t = add_minutes( &self.epoch, tsince)
            .ok_or( SpaceTraceError::InvalidArgument( format!("time offset {tsince} min out of range")))?;
        self.state_at( tsince, t)
    }

    fn state_at (&self, tsince: f64, epoch: DateTime<Utc>)->Result<StateVector> {
        let (r,v) = self.sgp4( tsince).map_err( |f| f.into_error(epoch))?;
        Ok( StateVector{ epoch, position: Cartesian3::from_array(&r), velocity: Cartesian3::from_array(&v) } )
    }

    fn sgp4 (&self, t: f64)->std::result::Result<([f64;3],[f64;3]),Sgp4Failure> {
        let g = &self.grav;
        let vkmpersec = g.radius * g.xke / 60.0;

        //--- secular gravity, drag and (deep space) lunar-solar/resonance terms
        let mut st: SecularState = self.secular.secular_state( &self.mean, self.no_unkozai, t);
        if let OrbitModel::DeepSpace(ds) = &self.model {
            ds.secular( t, &mut st);
        }

        if st.nm <= 0.0 {
            return Err( Sgp4Failure::Decayed( format!("mean motion {} not positive", st.nm)))
        }
        if st.tempa <= 0.0 {
            return Err( Sgp4Failure::Decayed( format!("drag polynomial {} not positive", st.tempa)))
        }

        let am = (g.xke / st.nm).powf(X2O3) * st.tempa * st.tempa;
        let nm = g.xke / am.powf(1.5);
        let mut em = st.em - st.tempe;

        if em >= 1.0 || em < -0.001 {
            return Err( Sgp4Failure::Decayed( format!("mean eccentricity {em} not in [0,1)")))
        }
        if em < 1.0e-6 { em = 1.0e-6 }

        let mm = st.mm + self.no_unkozai * st.templ;
        let xlm = (mm + st.argpm + st.nodem) % TWO_PI;
        let nodem = st.nodem % TWO_PI;
        let argpm = st.argpm % TWO_PI;
        let mm = (xlm - argpm - nodem) % TWO_PI;
        let inclm = st.inclm;

        //--- lunar-solar periodics
        let mut p = PerturbedElements { ep: em, xincp: inclm, nodep: nodem, argpp: argpm, mp: mm };
        let (mut sinip, mut cosip) = inclm.sin_cos();
        let s = &self.secular;
        let (mut aycof, mut xlcof) = (s.aycof, s.xlcof);
        let (mut con41, mut x1mth2, mut x7thm1) = (s.con41, s.x1mth2, s.x7thm1);

        if let OrbitModel::DeepSpace(ds) = &self.model {
            ds.periodics( t, &mut p);

            if p.xincp < 0.0 {
                p.xincp = -p.xincp;
                p.nodep += PI;
                p.argpp -= PI;
            }
            if p.ep < 0.0 || p.ep > 1.0 {
                return Err( Sgp4Failure::Diverged( format!("perturbed eccentricity {} not in [0,1]", p.ep)))
            }

            (sinip, cosip) = p.xincp.sin_cos();
            aycof = -0.5 * g.j3oj2 * sinip;
            xlcof = near_earth::xlcof( g.j3oj2, sinip, cosip);

            let cosisq = cosip * cosip;
            con41 = 3.0 * cosisq - 1.0;
            x1mth2 = 1.0 - cosisq;
            x7thm1 = 7.0 * cosisq - 1.0;
        }

        //--- long period periodics and Kepler's equation
        let PerturbedElements{ ep, xincp, nodep, argpp, mp } = p;
        let axnl = ep * argpp.cos();
        let temp = 1.0 / (am * (1.0 - ep * ep));
        let aynl = ep * argpp.sin() + temp * aycof;
        let xl = mp + argpp + nodep + temp * xlcof * axnl;

        let u = (xl - nodep) % TWO_PI;
        let eo1 = solve_kepler( u, axnl, aynl)
            .ok_or_else( || Sgp4Failure::Diverged( format!("Kepler solution not converging within {KEPLER_MAX_ITER} iterations")))?;

        //--- short period preliminary quantities
        let (sineo1, coseo1) = eo1.sin_cos();
        let ecose = axnl * coseo1 + aynl * sineo1;
        let esine = axnl * sineo1 - aynl * coseo1;
        let el2 = axnl * axnl + aynl * aynl;
        let pl = am * (1.0 - el2);

        if pl < 0.0 {
            return Err( Sgp4Failure::Decayed( format!("semi-latus rectum {pl} negative")))
        }

        let rl = am * (1.0 - ecose);
        let rdotl = am.sqrt() * esine / rl;
        let rvdotl = pl.sqrt() / rl;
        let betal = (1.0 - el2).sqrt();
        let temp = esine / (1.0 + betal);
        let sinu = am / rl * (sineo1 - aynl - axnl * temp);
        let cosu = am / rl * (coseo1 - axnl + aynl * temp);
        let su = sinu.atan2(cosu);
        let sin2u = (cosu + cosu) * sinu;
        let cos2u = 1.0 - 2.0 * sinu * sinu;
        let temp = 1.0 / pl;
        let temp1 = 0.5 * g.j2 * temp;
        let temp2 = temp1 * temp;

        //--- update for short period periodics
        let mrt = rl * (1.0 - 1.5 * temp2 * betal * con41) + 0.5 * temp1 * x1mth2 * cos2u;
        let su = su - 0.25 * temp2 * x7thm1 * sin2u;
        let xnode = nodep + 1.5 * temp2 * cosip * sin2u;
        let xinc = xincp + 1.5 * temp2 * cosip * sinip * cos2u;
        let mvt = rdotl - nm * temp1 * x1mth2 * sin2u / g.xke;
        let rvdot = rvdotl + nm * temp1 * (x1mth2 * cos2u + 1.5 * con41) / g.xke;

        if mrt < 1.0 {
            return Err( Sgp4Failure::Decayed( format!("radius {:.3} km below earth surface", mrt * g.radius)))
        }

        //--- orientation vectors
        let (sinsu, cossu) = su.sin_cos();
        let (snod, cnod) = xnode.sin_cos();
        let (sini, cosi) = xinc.sin_cos();
        let xmx = -snod * cosi;
        let xmy = cnod * cosi;
        let ux = xmx * sinsu + cnod * cossu;
        let uy = xmy * sinsu + snod * cossu;
        let uz = sini * sinsu;
        let vx = xmx * cossu - cnod * sinsu;
        let vy = xmy * cossu - snod * sinsu;
        let vz = sini * cossu;

        let mr = mrt * g.radius;
        let r = [ mr * ux, mr * uy, mr * uz ];
        let v = [
            (mvt * ux + rvdot * vx) * vkmpersec,
            (mvt * uy + rvdot * vy) * vkmpersec,
            (mvt * uz + rvdot * vz) * vkmpersec
        ];

        Ok( (r,v) )
    }
}

/// Newton-Raphson solution of Kepler's equation for the eccentric longitude, with step size clamped to
/// ±0.95. Returns None if the step does not fall below the tolerance within KEPLER_MAX_ITER iterations
fn solve_kepler (u: f64, axnl: f64, aynl: f64)->Option<f64> {
    let mut eo1 = u;

    for _ in 0..KEPLER_MAX_ITER {
        let (sineo1, coseo1) = eo1.sin_cos();
        let mut tem5 = (u - aynl * coseo1 + axnl * sineo1 - eo1) / (1.0 - coseo1 * axnl - sineo1 * aynl);
        if tem5.abs() >= 0.95 {
            tem5 = if tem5 > 0.0 { 0.95 } else { -0.95 };
        }
        eo1 += tem5;

        if tem5.abs() < KEPLER_TOLERANCE {
            return Some(eo1)
        }
    }
    None
}

/// one-shot propagation of an element set to an absolute time
pub fn propagate (elements: &OrbitalElementSet, t: &DateTime<Utc>)->Result<StateVector> {
    Propagator::new( elements)?.propagate( t)
}
