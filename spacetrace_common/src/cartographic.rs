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

//! cartographic coordinates.
//! Cartographic is an internal format based on radians, to efficiently interface with the orbit
//! and frame computations. Heights are in the length unit of the Ellipsoid that was used to
//! compute them (km for everything that comes out of propagation)

use serde::{Serialize,Deserialize};
use crate::{cartesian3::Cartesian3, geo_constants::{WGS84_EQUATORIAL_RADIUS, WGS84_INVERSE_FLATTENING}};

/// an oblate reference ellipsoid
#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
pub struct Ellipsoid {
    pub semi_major_axis: f64,
    pub inverse_flattening: f64,
}

impl Ellipsoid {
    pub const WGS84: Ellipsoid = Ellipsoid { 
        semi_major_axis: WGS84_EQUATORIAL_RADIUS, 
        inverse_flattening: WGS84_INVERSE_FLATTENING 
    };

    pub fn new (semi_major_axis: f64, inverse_flattening: f64)->Self {
        Ellipsoid { semi_major_axis, inverse_flattening }
    }

    pub fn flattening (&self)->f64 { 1.0 / self.inverse_flattening }

    /// first eccentricity squared
    pub fn e2 (&self)->f64 { 
        let f = self.flattening();
        f * (2.0 - f)
    }

    pub fn semi_minor_axis (&self)->f64 {
        self.semi_major_axis * (1.0 - self.flattening())
    }
}

impl Default for Ellipsoid {
    fn default()->Self { Ellipsoid::WGS84 }
}

#[derive(Debug,Clone,Copy,PartialEq)]
pub struct Cartographic {
    pub longitude: f64, // radians
    pub latitude: f64,  // radians
    pub height: f64     // above ellipsoid
}

impl Cartographic {
    pub fn new (longitude:f64, latitude: f64, height: f64)->Self {
        Cartographic { longitude, latitude, height }
    }

    pub fn from_degrees (lon: f64, lat: f64, height: f64)->Self {
        Cartographic::new( lon.to_radians(), lat.to_radians(), height)
    }

    pub fn longitude_deg (&self)-> f64 { self.longitude.to_degrees() }
    pub fn latitude_deg (&self)-> f64 { self.latitude.to_degrees() }

    /// convert cartesian ECEF coordinates to Cartographic
    /// see
    ///    Olson, D. K. (1996).
    ///    Converting Earth-Centered, Earth-Fixed Coordinates to Geodetic Coordinates.
    ///    IEEE Transactions on Aerospace and Electronic Systems, 32(1), 473–476. https://doi.org/10.1109/7.481290
    ///
    /// the closed form coefficients are derived from the ellipsoid so that this works in any length unit.
    /// Points closer than a1 (≈ 43km for earth) to the geocenter have no meaningful geodetic solution
    /// and are mapped to the origin
    pub fn from_ecef (p: &Cartesian3, ellipsoid: &Ellipsoid) -> Self {
        let a  = ellipsoid.semi_major_axis;
        let e2 = ellipsoid.e2();
        let a1 = a * e2;
        let a2 = a1 * a1;
        let a3 = a1 * e2 / 2.0;
        let a4 = 2.5 * a2;
        let a5 = a1 + a3;
        let a6 = 1.0 - e2;

        let x = p.x;
        let y = p.y;
        let z = p.z;

        let zp = z.abs();
        let w2 = x*x + y*y;
        let w = w2.sqrt();
        let z2 = z*z;
        let r2 = w2 + z2;
        let r = r2.sqrt();

        if r < a1 {
            return Cartographic::new( 0.0, 0.0, 0.0)
        }

        let lon = y.atan2(x);
        let s2 = z2 / r2;
        let c2 = w2 / r2;
        let mut u = a2 / r;
        let mut v = a3 - a4 / r;

        let (mut lat, s, c, ss) = if c2 > 0.3 {
            let s = (zp/r)*(1.0 + c2*(a1 + u + s2*v)/r);
            let ss = s*s;
            (s.asin(), s, (1.0 - ss).sqrt(), ss)
        } else {
            let c = (w/r)*(1.0 - s2*(a5 - u - c2*v)/r);
            let ss = 1.0 - c*c;
            (c.acos(), ss.sqrt(), c, ss)
        };

        let g = 1.0 - e2*ss;
        let rg = a / g.sqrt();
        let rf = a6 * rg;
        u = w - rg * c;
        v = zp - rf * s;
        let f = c * u + s * v;
        let m = c * v - s * u;
        let p = m / (rf / g + f);

        lat += p;
        let height = f + m*p/2.0;
        if z < 0.0 { lat = -lat; }

        Cartographic::new( lon, lat, height)
    }

    /// convert to ECEF coordinates (same length unit as the ellipsoid)
    pub fn to_ecef (&self, ellipsoid: &Ellipsoid) -> Cartesian3 {
        let e2 = ellipsoid.e2();
        let sin_lat = self.latitude.sin();
        let cos_lat = self.latitude.cos();
        let n = ellipsoid.semi_major_axis / (1.0 - e2 * sin_lat * sin_lat).sqrt();

        Cartesian3::new(
            (n + self.height) * cos_lat * self.longitude.cos(),
            (n + self.height) * cos_lat * self.longitude.sin(),
            (n * (1.0 - e2) + self.height) * sin_lat
        )
    }

    /// central angle between two surface positions in radians (haversine, spherical approximation)
    pub fn central_angle (&self, other: &Cartographic) -> f64 {
        let dlat = other.latitude - self.latitude;
        let dlon = other.longitude - self.longitude;
        let h = (dlat/2.0).sin().powi(2) + self.latitude.cos() * other.latitude.cos() * (dlon/2.0).sin().powi(2);
        2.0 * h.sqrt().min(1.0).asin()
    }

    /// unit vectors of the local east/north/up frame at this position, in ECEF axes.
    /// This uses the geodetic latitude, i.e. 'up' is the ellipsoid normal
    pub fn enu_basis (&self) -> (Cartesian3,Cartesian3,Cartesian3) {
        let (sin_lat, cos_lat) = self.latitude.sin_cos();
        let (sin_lon, cos_lon) = self.longitude.sin_cos();

        let east = Cartesian3::new( -sin_lon, cos_lon, 0.0);
        let north = Cartesian3::new( -sin_lat*cos_lon, -sin_lat*sin_lon, cos_lat);
        let up = Cartesian3::new( cos_lat*cos_lon, cos_lat*sin_lon, sin_lat);

        (east, north, up)
    }
}

impl std::fmt::Display for Cartographic {
    fn fmt (&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{ longitude: {}, latitude: {}, height: {} }}",
            self.longitude.to_degrees(), self.latitude.to_degrees(), self.height)
    }
}
