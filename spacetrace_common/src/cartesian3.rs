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

use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use nalgebra::Vector3;
use serde::{Serialize,Deserialize};

/// note that we do not use uom here to allow for abstract coordinate systems (TEME and ECEF are
/// both represented as Cartesian3, in km or km/s depending on context)

#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
pub struct Cartesian3 {
    pub x: f64,
    pub y: f64,
    pub z: f64
}

impl Cartesian3 {
    pub fn new (x: f64, y: f64, z: f64)->Cartesian3 {
        Cartesian3{x,y,z}
    }

    pub fn zero ()->Cartesian3 {
        Cartesian3{x: 0.0, y: 0.0, z: 0.0}
    }

    pub fn from_array (a: &[f64;3])->Cartesian3 {
        Cartesian3{ x: a[0], y: a[1], z: a[2] }
    }

    pub fn cross (&self, p: &Cartesian3)->Self {
        Cartesian3 {
            x: (self.y * p.z) - (self.z * p.y),
            y: (self.z * p.x) - (self.x * p.z),
            z: (self.x * p.y) - (self.y * p.x)
        }
    }

    pub fn dot(&self, p: &Cartesian3) -> f64 {
        (self.x * p.x) + (self.y * p.y) +(self.z * p.z)
    }

    pub fn length(&self) -> f64 {
        ((self.x * self.x) + (self.y * self.y) + (self.z * self.z)).sqrt()
    }
}

impl From<Vector3<f64>> for Cartesian3 {
    fn from (v: Vector3<f64>)->Self {
        Cartesian3{ x: v.x, y: v.y, z: v.z }
    }
}

impl From<&Cartesian3> for Vector3<f64> {
    fn from (p: &Cartesian3)->Self {
        Vector3::new( p.x, p.y, p.z)
    }
}

impl Add for Cartesian3 {
    type Output = Cartesian3;
    fn add (self, p: Cartesian3)->Cartesian3 {
        Cartesian3{ x: self.x + p.x, y: self.y + p.y, z: self.z + p.z }
    }
}

impl AddAssign for Cartesian3 {
    fn add_assign (&mut self, p: Cartesian3) {
        self.x += p.x;
        self.y += p.y;
        self.z += p.z;
    }
}

impl Sub for Cartesian3 {
    type Output = Cartesian3;
    fn sub (self, p: Cartesian3)->Cartesian3 {
        Cartesian3{ x: self.x - p.x, y: self.y - p.y, z: self.z - p.z }
    }
}

impl SubAssign for Cartesian3 {
    fn sub_assign (&mut self, p: Cartesian3) {
        self.x -= p.x;
        self.y -= p.y;
        self.z -= p.z;
    }
}

impl Mul<f64> for Cartesian3 {
    type Output = Cartesian3;
    fn mul (self, s: f64)->Cartesian3 {
        Cartesian3{ x: self.x * s, y: self.y * s, z: self.z * s }
    }
}

impl Neg for Cartesian3 {
    type Output = Cartesian3;
    fn neg (self)->Cartesian3 {
        Cartesian3{ x: -self.x, y: -self.y, z: -self.z }
    }
}

impl std::fmt::Display for Cartesian3 {
    fn fmt (&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "( {:.8}, {:.8}, {:.8} )", self.x, self.y, self.z)
    }
}
