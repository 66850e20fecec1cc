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

//! initialization and secular terms shared by both model variants

use std::f64::consts::PI;
use super::{GravityModel, MeanElements, X2O3, gstime};

const JD_1950: f64 = 2433281.5;  // reference for lunar-solar arguments

/// orbit geometry derived from the mean elements at epoch (Vallado's initl)
#[derive(Debug,Clone)]
pub(crate) struct InitGeometry {
    pub no_unkozai: f64,  // Brouwer mean motion [rad/min]
    pub ao: f64,          // semi major axis [earth radii]
    pub con41: f64,
    pub con42: f64,
    pub cosio: f64,
    pub cosio2: f64,
    pub sinio: f64,
    pub eccsq: f64,
    pub omeosq: f64,
    pub rteosq: f64,
    pub posq: f64,
    pub rp: f64,          // perigee radius [earth radii]
    pub gsto: f64,        // GMST at epoch [rad]
    pub epoch_1950: f64,  // days since 1950-01-00 0h
}

impl InitGeometry {
    pub fn new (grav: &GravityModel, m: &MeanElements, epoch_jd: f64)->Self {
        let eccsq = m.ecco * m.ecco;
        let omeosq = 1.0 - eccsq;
        let rteosq = omeosq.sqrt();
        let cosio = m.inclo.cos();
        let cosio2 = cosio * cosio;

        // un-Kozai the mean motion
        let ak = (grav.xke / m.no_kozai).powf(X2O3);
        let d1 = 0.75 * grav.j2 * (3.0 * cosio2 - 1.0) / (rteosq * omeosq);
        let del = d1 / (ak * ak);
        let adel = ak * (1.0 - del * del - del * (1.0 / 3.0 + 134.0 * del * del / 81.0));
        let del = d1 / (adel * adel);
        let no_unkozai = m.no_kozai / (1.0 + del);

        let ao = (grav.xke / no_unkozai).powf(X2O3);
        let sinio = m.inclo.sin();
        let po = ao * omeosq;
        let con42 = 1.0 - 5.0 * cosio2;
        let con41 = -con42 - cosio2 - cosio2;
        let posq = po * po;
        let rp = ao * (1.0 - m.ecco);

        InitGeometry {
            no_unkozai, ao, con41, con42, cosio, cosio2, sinio, eccsq, omeosq, rteosq, posq, rp,
            gsto: gstime( epoch_jd),
            epoch_1950: epoch_jd - JD_1950,
        }
    }
}

/// the long period lunar-solar coefficient for the mean longitude. Guarded against division by zero
/// for retrograde equatorial orbits
pub(crate) fn xlcof (j3oj2: f64, sinio: f64, cosio: f64)->f64 {
    let temp4 = 1.5e-12;
    let denom = if (cosio + 1.0).abs() > temp4 { 1.0 + cosio } else { temp4 };
    -0.25 * j3oj2 * sinio * (3.0 + 5.0 * cosio) / denom
}

/// secular gravity and atmospheric drag coefficients
#[derive(Debug,Clone)]
pub(crate) struct SecularTerms {
    pub isimp: bool,  // simplified drag for low perigee and deep space orbits
    pub bstar: f64,
    pub aycof: f64,
    pub con41: f64,
    pub cc1: f64,
    pub cc4: f64,
    pub cc5: f64,
    pub d2: f64,
    pub d3: f64,
    pub d4: f64,
    pub delmo: f64,
    pub eta: f64,
    pub argpdot: f64,
    pub omgcof: f64,
    pub sinmao: f64,
    pub t2cof: f64,
    pub t3cof: f64,
    pub t4cof: f64,
    pub t5cof: f64,
    pub x1mth2: f64,
    pub x7thm1: f64,
    pub mdot: f64,
    pub nodedot: f64,
    pub xlcof: f64,
    pub xmcof: f64,
    pub nodecf: f64,
}

/// mean elements at a given time after applying secular terms, with the drag polynomials
/// that still have to be applied to semi major axis, eccentricity and mean longitude
#[derive(Debug,Clone)]
pub(crate) struct SecularState {
    pub em: f64,
    pub inclm: f64,
    pub nodem: f64,
    pub argpm: f64,
    pub mm: f64,
    pub nm: f64,
    pub tempa: f64,
    pub tempe: f64,
    pub templ: f64,
}

impl SecularTerms {
    pub fn new (grav: &GravityModel, m: &MeanElements, geo: &InitGeometry, is_deep_space: bool)->Self {
        let re = grav.radius;
        let ss = 78.0 / re + 1.0;
        let qzms2t = ((120.0 - 78.0) / re).powi(4);
        let no = geo.no_unkozai;
        let ao = geo.ao;
        let ecco = m.ecco;
        let (cosio, cosio2, sinio, con41) = (geo.cosio, geo.cosio2, geo.sinio, geo.con41);

        let isimp = is_deep_space || geo.rp < (220.0 / re + 1.0);

        // atmosphere density parameters for low perigees
        let mut sfour = ss;
        let mut qzms24 = qzms2t;
        let perige = (geo.rp - 1.0) * re;
        if perige < 156.0 {
            sfour = if perige < 98.0 { 20.0 } else { perige - 78.0 };
            qzms24 = ((120.0 - sfour) / re).powi(4);
            sfour = sfour / re + 1.0;
        }

        let pinvsq = 1.0 / geo.posq;
        let tsi = 1.0 / (ao - sfour);
        let eta = ao * ecco * tsi;
        let etasq = eta * eta;
        let eeta = ecco * eta;
        let psisq = (1.0 - etasq).abs();
        let coef = qzms24 * tsi.powi(4);
        let coef1 = coef / psisq.powf(3.5);

        let cc2 = coef1 * no * (ao * (1.0 + 1.5 * etasq + eeta * (4.0 + etasq))
            + 0.375 * grav.j2 * tsi / psisq * con41 * (8.0 + 3.0 * etasq * (8.0 + etasq)));
        let cc1 = m.bstar * cc2;
        let cc3 = if ecco > 1.0e-4 { -2.0 * coef * tsi * grav.j3oj2 * no * sinio / ecco } else { 0.0 };
        let x1mth2 = 1.0 - cosio2;
        let cc4 = 2.0 * no * coef1 * ao * geo.omeosq * (eta * (2.0 + 0.5 * etasq) + ecco * (0.5 + 2.0 * etasq)
            - grav.j2 * tsi / (ao * psisq) * (-3.0 * con41 * (1.0 - 2.0 * eeta + etasq * (1.5 - 0.5 * eeta))
                + 0.75 * x1mth2 * (2.0 * etasq - eeta * (1.0 + etasq)) * (2.0 * m.argpo).cos()));
        let cc5 = 2.0 * coef1 * ao * geo.omeosq * (1.0 + 2.75 * (etasq + eeta) + eeta * etasq);

        let cosio4 = cosio2 * cosio2;
        let temp1 = 1.5 * grav.j2 * pinvsq * no;
        let temp2 = 0.5 * temp1 * grav.j2 * pinvsq;
        let temp3 = -0.46875 * grav.j4 * pinvsq * pinvsq * no;
        let mdot = no + 0.5 * temp1 * geo.rteosq * con41 
            + 0.0625 * temp2 * geo.rteosq * (13.0 - 78.0 * cosio2 + 137.0 * cosio4);
        let argpdot = -0.5 * temp1 * geo.con42 
            + 0.0625 * temp2 * (7.0 - 114.0 * cosio2 + 395.0 * cosio4)
            + temp3 * (3.0 - 36.0 * cosio2 + 49.0 * cosio4);
        let xhdot1 = -temp1 * cosio;
        let nodedot = xhdot1 + (0.5 * temp2 * (4.0 - 19.0 * cosio2) + 2.0 * temp3 * (3.0 - 7.0 * cosio2)) * cosio;

        let omgcof = m.bstar * cc3 * m.argpo.cos();
        let xmcof = if ecco > 1.0e-4 { -X2O3 * coef * m.bstar / eeta } else { 0.0 };
        let nodecf = 3.5 * geo.omeosq * xhdot1 * cc1;
        let t2cof = 1.5 * cc1;

        let mut terms = SecularTerms {
            isimp, 
            bstar: m.bstar,
            aycof: -0.5 * grav.j3oj2 * sinio,
            con41, cc1, cc4, cc5,
            d2: 0.0, d3: 0.0, d4: 0.0,
            delmo: (1.0 + eta * m.mo.cos()).powi(3),
            eta, argpdot, omgcof,
            sinmao: m.mo.sin(),
            t2cof, t3cof: 0.0, t4cof: 0.0, t5cof: 0.0,
            x1mth2,
            x7thm1: 7.0 * cosio2 - 1.0,
            mdot, nodedot,
            xlcof: xlcof( grav.j3oj2, sinio, cosio),
            xmcof, nodecf,
        };

        if !isimp {
            let cc1sq = cc1 * cc1;
            let d2 = 4.0 * ao * tsi * cc1sq;
            let temp = d2 * tsi * cc1 / 3.0;
            let d3 = (17.0 * ao + sfour) * temp;
            let d4 = 0.5 * temp * ao * tsi * (221.0 * ao + 31.0 * sfour) * cc1;

            terms.d2 = d2;
            terms.d3 = d3;
            terms.d4 = d4;
            terms.t3cof = d2 + 2.0 * cc1sq;
            terms.t4cof = 0.25 * (3.0 * d3 + cc1 * (12.0 * d2 + 10.0 * cc1sq));
            terms.t5cof = 0.2 * (3.0 * d4 + 12.0 * cc1 * d3 + 6.0 * d2 * d2 + 15.0 * cc1sq * (2.0 * d2 + cc1sq));
        }

        terms
    }

    /// the argument of perigee rate plus the node rate
    pub fn xpidot (&self)->f64 { self.argpdot + self.nodedot }

    /// apply secular gravity and drag for `t` minutes since epoch
    pub fn secular_state (&self, m: &MeanElements, no_unkozai: f64, t: f64)->SecularState {
        let xmdf = m.mo + self.mdot * t;
        let argpdf = m.argpo + self.argpdot * t;
        let nodedf = m.nodeo + self.nodedot * t;
        let t2 = t * t;

        let mut argpm = argpdf;
        let mut mm = xmdf;
        let nodem = nodedf + self.nodecf * t2;
        let mut tempa = 1.0 - self.cc1 * t;
        let mut tempe = self.bstar * self.cc4 * t;
        let mut templ = self.t2cof * t2;

        if !self.isimp {
            let delomg = self.omgcof * t;
            let delm = self.xmcof * ((1.0 + self.eta * xmdf.cos()).powi(3) - self.delmo);
            let temp = delomg + delm;
            mm = xmdf + temp;
            argpm = argpdf - temp;

            let t3 = t2 * t;
            let t4 = t3 * t;
            tempa = tempa - self.d2 * t2 - self.d3 * t3 - self.d4 * t4;
            tempe = tempe + self.bstar * self.cc5 * (mm.sin() - self.sinmao);
            templ = templ + self.t3cof * t3 + t4 * (self.t4cof + t * self.t5cof);
        }

        SecularState { em: m.ecco, inclm: m.inclo, nodem, argpm, mm, nm: no_unkozai, tempa, tempe, templ }
    }
}
