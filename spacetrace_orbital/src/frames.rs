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

//! conversion of inertial (TEME) state vectors into geodetic ground points

use std::fmt;
use chrono::{DateTime,Utc};
use nalgebra::{Rotation3,Vector3};
use serde::{Serialize,Deserialize};
use spacetrace_common::{
    angle::{normalize_180, normalize_360}, cartesian3::Cartesian3, cartographic::{Cartographic, Ellipsoid},
    datetime::{julian_date, ser_rfc3339_millis}, geo_constants::{WGS84_EQUATORIAL_RADIUS, WGS84_INVERSE_FLATTENING}
};

use crate::elements::MU_WGS72;
use crate::errors::{Result, SpaceTraceError};
use crate::sgp4::{StateVector, gstime};

/// mean angular velocity of the earth [rad/s]
pub const EARTH_ROTATION_RATE: f64 = 7.292115e-5;

/// the reference ellipsoid used for geodetic coordinates, in km
#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
#[serde(default)]
pub struct EarthModel {
    pub equatorial_radius: f64,  // km
    pub inverse_flattening: f64,
}

impl EarthModel {
    pub const WGS84: EarthModel = EarthModel { 
        equatorial_radius: WGS84_EQUATORIAL_RADIUS, 
        inverse_flattening: WGS84_INVERSE_FLATTENING 
    };

    pub fn ellipsoid (&self)->Ellipsoid {
        Ellipsoid::new( self.equatorial_radius, self.inverse_flattening)
    }

    pub fn validate (&self)->Result<()> {
        if !(self.equatorial_radius > 0.0) || !(self.inverse_flattening > 1.0) {
            Err( SpaceTraceError::InvalidArgument( format!("invalid earth model {self:?}")))
        } else {
            Ok(())
        }
    }
}

impl Default for EarthModel {
    fn default()->Self { EarthModel::WGS84 }
}

/// one sample of a ground track
#[derive(Debug,Clone,PartialEq,Serialize)]
pub struct GroundPoint {
    #[serde(serialize_with = "ser_rfc3339_millis")]
    pub time: DateTime<Utc>,
    pub latitude: f64,      // geodetic, degrees [-90,90]
    pub longitude: f64,     // degrees (-180,180]
    pub altitude: f64,      // km above ellipsoid
    pub speed: f64,         // inertial speed [km/s]
    pub azimuth: f64,       // heading of earth relative velocity, degrees clockwise from north [0,360)
    pub elevation: f64,     // flight path angle [deg]
    pub true_anomaly: f64,  // osculating two-body true anomaly [deg, 0..360)
}

impl fmt::Display for GroundPoint {
    fn fmt (&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!( f, "{}  lat: {:9.4}  lon: {:9.4}  alt: {:9.3} km  v: {:6.3} km/s  hdg: {:6.2}",
            self.time.format("%Y-%m-%dT%H:%M:%S%.3fZ"), self.latitude, self.longitude, self.altitude, self.speed, self.azimuth)
    }
}

/// Greenwich mean sidereal angle [rad] at a given time
pub fn gmst (t: &DateTime<Utc>)->f64 {
    gstime( julian_date(t))
}

/// rotate a TEME vector into the earth fixed frame by the sidereal angle. We ignore polar motion
/// since it is below the accuracy of mean element propagation
pub fn teme_to_ecef (v: &Cartesian3, gmst: f64)->Cartesian3 {
    let rot = Rotation3::from_axis_angle( &Vector3::z_axis(), -gmst);
    Cartesian3::from( rot * Vector3::from(v))
}

/// osculating two-body true anomaly in degrees [0,360) for an inertial state vector
pub fn true_anomaly (r: &Cartesian3, v: &Cartesian3, mu: f64)->f64 {
    let rv = Vector3::from(r);
    let vv = Vector3::from(v);
    let rmag = rv.norm();

    let h = rv.cross(&vv);
    let e_vec = vv.cross(&h) / mu - rv / rmag;
    let ecc = e_vec.norm();

    let nu = if ecc > 1e-10 {
        let cos_nu = (e_vec.dot(&rv) / (ecc * rmag)).clamp(-1.0, 1.0);
        let nu = cos_nu.acos();
        if rv.dot(&vv) < 0.0 { std::f64::consts::TAU - nu } else { nu }

    } else { // circular: use argument of latitude relative to the ascending node
        let node = Vector3::z().cross(&h);
        let n = node.norm();
        if n > 1e-10 {
            let cos_u = (node.dot(&rv) / (n * rmag)).clamp(-1.0, 1.0);
            let u = cos_u.acos();
            if rv.z < 0.0 { std::f64::consts::TAU - u } else { u }
        } else {
            rv.y.atan2(rv.x)
        }
    };

    normalize_360( nu.to_degrees())
}

/// converts inertial state vectors into ground points for a given earth model. This is a read-only
/// value, i.e. one converter can be shared by any number of concurrent propagation runs
#[derive(Debug,Clone)]
pub struct FrameConverter {
    earth: EarthModel,
    ellipsoid: Ellipsoid,
}

impl FrameConverter {
    pub fn new (earth: &EarthModel)->Self {
        FrameConverter { earth: *earth, ellipsoid: earth.ellipsoid() }
    }

    pub fn earth_model (&self)->&EarthModel { &self.earth }

    pub fn to_geodetic (&self, sv: &StateVector, t: &DateTime<Utc>)->Result<GroundPoint> {
        let r = &sv.position;
        let v = &sv.velocity;

        if ![r.x, r.y, r.z, v.x, v.y, v.z].iter().all( |c| c.is_finite()) {
            return Err( SpaceTraceError::PropagationDivergence{ epoch: *t, msg: "non-finite state vector".to_string() })
        }

        let theta = gmst(t);
        let r_ecef = teme_to_ecef( r, theta);
        let pos = Cartographic::from_ecef( &r_ecef, &self.ellipsoid);

        // earth relative velocity
        let omega = Cartesian3::new( 0.0, 0.0, EARTH_ROTATION_RATE);
        let v_ecef = teme_to_ecef( v, theta) - omega.cross( &r_ecef);

        let (east, north, up) = pos.enu_basis();
        let ve = v_ecef.dot(&east);
        let vn = v_ecef.dot(&north);
        let vu = v_ecef.dot(&up);

        let azimuth = normalize_360( ve.atan2(vn).to_degrees());
        let elevation = vu.atan2( (ve*ve + vn*vn).sqrt()).to_degrees();

        Ok( GroundPoint {
            time: *t,
            latitude: pos.latitude_deg(),
            longitude: normalize_180( pos.longitude_deg()),
            altitude: pos.height,
            speed: v.length(),
            azimuth,
            elevation,
            true_anomaly: true_anomaly( r, v, MU_WGS72),
        })
    }
}

impl Default for FrameConverter {
    fn default()->Self { FrameConverter::new( &EarthModel::WGS84) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_teme_rotation() {
        let p = Cartesian3::new( 7000.0, 0.0, 100.0);
        let q = teme_to_ecef( &p, std::f64::consts::FRAC_PI_2);

        // earth rotated by 90°: inertial x axis is at -90° longitude
        assert!( q.x.abs() < 1e-9);
        assert!( (q.y + 7000.0).abs() < 1e-9);
        assert_eq!( q.z, 100.0);
    }

    #[test]
    fn test_true_anomaly_circular() {
        let r = Cartesian3::new( 7000.0, 0.0, 0.0);
        let v = Cartesian3::new( 0.0, (MU_WGS72 / 7000.0).sqrt(), 0.0);
        let nu = true_anomaly( &r, &v, MU_WGS72);
        assert!( nu < 1e-6 || nu > 360.0 - 1e-6, "{nu}");
    }

    #[test]
    fn test_true_anomaly_apogee() {
        // below circular speed at this radius: we are at apoapsis
        let r = Cartesian3::new( 0.0, 8000.0, 0.0);
        let v = Cartesian3::new( -0.9 * (MU_WGS72 / 8000.0).sqrt(), 0.0, 0.0);
        let nu = true_anomaly( &r, &v, MU_WGS72);
        assert!( (nu - 180.0).abs() < 1e-6, "{nu}");
    }

    #[test]
    fn test_ground_point_equator() {
        let fc = FrameConverter::default();
        let t = Utc.with_ymd_and_hms( 2025, 3, 28, 0, 0, 0).unwrap();
        let theta = gmst(&t);

        // put the satellite above the greenwich meridian
        let r = 7000.0;
        let sv = StateVector {
            epoch: t,
            position: Cartesian3::new( r * theta.cos(), r * theta.sin(), 0.0),
            velocity: Cartesian3::new( 0.0, 0.0, 7.5),
        };
        let gp = fc.to_geodetic( &sv, &t).unwrap();

        assert!( gp.latitude.abs() < 1e-9);
        assert!( gp.longitude.abs() < 1e-9);
        assert!( (gp.altitude - (r - WGS84_EQUATORIAL_RADIUS)).abs() < 1e-6);
        assert!( (gp.elevation).abs() < 1e-9);
        assert!( gp.azimuth < 5.0 || gp.azimuth > 355.0, "{}", gp.azimuth); // northbound plus earth rotation
    }

    #[test]
    fn test_non_finite_state() {
        let fc = FrameConverter::default();
        let t = Utc::now();
        let sv = StateVector { epoch: t, position: Cartesian3::new( f64::NAN, 0.0, 0.0), velocity: Cartesian3::zero() };
        assert!( matches!( fc.to_geodetic( &sv, &t), Err(SpaceTraceError::PropagationDivergence{..})));
    }
}
