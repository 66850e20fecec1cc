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

/// angle normalization functions (degrees)

/// normalize to (-180,180] - note that -180 is mapped to 180 so that every meridian has a unique value
#[inline]
pub fn normalize_180 (d: f64) -> f64 {
    let x = d % 360.0;

    if x <= -180.0 { 360.0 + x }
    else if x > 180.0 { x - 360.0 }
    else { x }
}

/// normalize to [0,360)
#[inline]
pub fn normalize_360 (d: f64) -> f64 {
    let x = d % 360.0;
    if x < 0.0 { 
        let y = 360.0 + x;
        if y >= 360.0 { 0.0 } else { y } // catch tiny negatives that round up to 360
    } else { x }
}

/// signed smallest difference b - a for two longitudes, in (-180,180]
#[inline]
pub fn longitude_delta (a: f64, b: f64) -> f64 {
    normalize_180( b - a)
}
