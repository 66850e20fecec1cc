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

//! lunar-solar perturbations and geopotential resonance for orbits with periods of 225 minutes
//! and more (the SDP4 part of the model)

use std::f64::consts::PI;
use spacetrace_common::TWO_PI;
use super::{GravityModel, MeanElements, PerturbedElements, X2O3};
use super::near_earth::{InitGeometry, SecularTerms, SecularState};

const ZNS: f64 = 1.19459e-5;
const ZES: f64 = 0.01675;
const ZNL: f64 = 1.5835218e-4;
const ZEL: f64 = 0.05490;
const C1SS: f64 = 2.9864797e-6;
const C1L: f64 = 4.7968065e-7;
const ZSINIS: f64 = 0.39785416;
const ZCOSIS: f64 = 0.91744867;
const ZCOSGS: f64 = 0.1945905;
const ZSINGS: f64 = -0.98088458;

const RPTIM: f64 = 4.37526908801129966e-3;  // earth rotation [rad/min]
const STEPP: f64 = 720.0;
const STEPN: f64 = -720.0;
const STEP2: f64 = 259200.0;

const LOW_INCLINATION: f64 = 5.2359877e-2;

/// the per-body terms of the lunar-solar expansion (sun and moon are computed the same way)
#[derive(Debug,Clone)]
struct ThirdBodyTerms {
    s1: f64, s2: f64, s3: f64, s4: f64, s5: f64, s6: f64, s7: f64,
    z1: f64, z2: f64, z3: f64,
    z11: f64, z12: f64, z13: f64,
    z21: f64, z22: f64, z23: f64,
    z31: f64, z32: f64, z33: f64,
}

/// the satellite orbit orientation at epoch as needed by the third body expansion
struct OrbitAngles {
    sinim: f64,
    cosim: f64,
    sinomm: f64,
    cosomm: f64,
    em: f64,
    emsq: f64,
    betasq: f64,
    rtemsq: f64,
    xnoi: f64,
}

/// orientation of the perturbing body's orbit relative to the equator and the satellite node
struct BodyOrientation {
    zcosg: f64,
    zsing: f64,
    zcosi: f64,
    zsini: f64,
    zcosh: f64,
    zsinh: f64,
    cc: f64,
}

impl ThirdBodyTerms {
    fn new (b: &BodyOrientation, o: &OrbitAngles)->Self {
        let a1 = b.zcosg * b.zcosh + b.zsing * b.zcosi * b.zsinh;
        let a3 = -b.zsing * b.zcosh + b.zcosg * b.zcosi * b.zsinh;
        let a7 = -b.zcosg * b.zsinh + b.zsing * b.zcosi * b.zcosh;
        let a8 = b.zsing * b.zsini;
        let a9 = b.zsing * b.zsinh + b.zcosg * b.zcosi * b.zcosh;
        let a10 = b.zcosg * b.zsini;
        let a2 = o.cosim * a7 + o.sinim * a8;
        let a4 = o.cosim * a9 + o.sinim * a10;
        let a5 = -o.sinim * a7 + o.cosim * a8;
        let a6 = -o.sinim * a9 + o.cosim * a10;

        let x1 = a1 * o.cosomm + a2 * o.sinomm;
        let x2 = a3 * o.cosomm + a4 * o.sinomm;
        let x3 = -a1 * o.sinomm + a2 * o.cosomm;
        let x4 = -a3 * o.sinomm + a4 * o.cosomm;
        let x5 = a5 * o.sinomm;
        let x6 = a6 * o.sinomm;
        let x7 = a5 * o.cosomm;
        let x8 = a6 * o.cosomm;

        let emsq = o.emsq;
        let z31 = 12.0 * x1 * x1 - 3.0 * x3 * x3;
        let z32 = 24.0 * x1 * x2 - 6.0 * x3 * x4;
        let z33 = 12.0 * x2 * x2 - 3.0 * x4 * x4;
        let z1 = 3.0 * (a1 * a1 + a2 * a2) + z31 * emsq;
        let z2 = 6.0 * (a1 * a3 + a2 * a4) + z32 * emsq;
        let z3 = 3.0 * (a3 * a3 + a4 * a4) + z33 * emsq;
        let z11 = -6.0 * a1 * a5 + emsq * (-24.0 * x1 * x7 - 6.0 * x3 * x5);
        let z12 = -6.0 * (a1 * a6 + a3 * a5) + emsq * (-24.0 * (x2 * x7 + x1 * x8) - 6.0 * (x3 * x6 + x4 * x5));
        let z13 = -6.0 * a3 * a6 + emsq * (-24.0 * x2 * x8 - 6.0 * x4 * x6);
        let z21 = 6.0 * a2 * a5 + emsq * (24.0 * x1 * x5 - 6.0 * x3 * x7);
        let z22 = 6.0 * (a4 * a5 + a2 * a6) + emsq * (24.0 * (x2 * x5 + x1 * x6) - 6.0 * (x4 * x7 + x3 * x8));
        let z23 = 6.0 * a4 * a6 + emsq * (24.0 * x2 * x6 - 6.0 * x4 * x8);
        let z1 = z1 + z1 + o.betasq * z31;
        let z2 = z2 + z2 + o.betasq * z32;
        let z3 = z3 + z3 + o.betasq * z33;

        let s3 = b.cc * o.xnoi;
        let s2 = -0.5 * s3 / o.rtemsq;
        let s4 = s3 * o.rtemsq;
        let s1 = -15.0 * o.em * s4;
        let s5 = x1 * x3 + x2 * x4;
        let s6 = x2 * x3 + x1 * x4;
        let s7 = x2 * x4 - x1 * x3;

        ThirdBodyTerms { s1, s2, s3, s4, s5, s6, s7, z1, z2, z3, z11, z12, z13, z21, z22, z23, z31, z32, z33 }
    }
}

/// long period periodic coefficients of one perturbing body
#[derive(Debug,Clone)]
struct PeriodicCoefficients {
    e2: f64, e3: f64,
    i2: f64, i3: f64,
    l2: f64, l3: f64, l4: f64,
    gh2: f64, gh3: f64, gh4: f64,
    h2: f64, h3: f64,
    zmo: f64,  // mean anomaly at epoch [rad]
    zn: f64,   // mean motion [rad/min]
    ze: f64,   // eccentricity
}

impl PeriodicCoefficients {
    fn new (tb: &ThirdBodyTerms, emsq: f64, zmo: f64, zn: f64, ze: f64)->Self {
        PeriodicCoefficients {
            e2: 2.0 * tb.s1 * tb.s6,
            e3: 2.0 * tb.s1 * tb.s7,
            i2: 2.0 * tb.s2 * tb.z12,
            i3: 2.0 * tb.s2 * (tb.z13 - tb.z11),
            l2: -2.0 * tb.s3 * tb.z2,
            l3: -2.0 * tb.s3 * (tb.z3 - tb.z1),
            l4: -2.0 * tb.s3 * (-21.0 - 9.0 * emsq) * ze,
            gh2: 2.0 * tb.s4 * tb.z32,
            gh3: 2.0 * tb.s4 * (tb.z33 - tb.z31),
            gh4: -18.0 * tb.s4 * ze,
            h2: -2.0 * tb.s2 * tb.z22,
            h3: -2.0 * tb.s2 * (tb.z23 - tb.z21),
            zmo, zn, ze,
        }
    }

    /// (e, i, l, gh, h) periodic contributions at `t` minutes since epoch
    fn evaluate (&self, t: f64)->[f64;5] {
        let zm = self.zmo + self.zn * t;
        let zf = zm + 2.0 * self.ze * zm.sin();
        let sinzf = zf.sin();
        let f2 = 0.5 * sinzf * sinzf - 0.25;
        let f3 = -0.5 * sinzf * zf.cos();

        [
            self.e2 * f2 + self.e3 * f3,
            self.i2 * f2 + self.i3 * f3,
            self.l2 * f2 + self.l3 * f3 + self.l4 * sinzf,
            self.gh2 * f2 + self.gh3 * f3 + self.gh4 * sinzf,
            self.h2 * f2 + self.h3 * f3,
        ]
    }
}

/// geopotential resonance coefficients
#[derive(Debug,Clone)]
pub enum Resonance {
    None,
    /// 12h orbits with high eccentricity (Molniya type)
    HalfDay { d2201: f64, d2211: f64, d3210: f64, d3222: f64, d4410: f64, d4422: f64, d5220: f64, d5232: f64, d5421: f64, d5433: f64 },
    /// 24h (geosynchronous) orbits
    OneDay { del1: f64, del2: f64, del3: f64 },
}

/// rates of change and derivatives of the resonance integrator at one integration step
struct ResonanceRates {
    xndt: f64,
    xldot: f64,
    xnddt: f64,
}

/// the deep space terms computed once from the element set
#[derive(Debug,Clone)]
pub struct DeepSpace {
    gsto: f64,
    no_unkozai: f64,
    argpo: f64,
    argpdot: f64,
    dedt: f64,
    didt: f64,
    dmdt: f64,
    dnodt: f64,
    domdt: f64,
    solar: PeriodicCoefficients,
    lunar: PeriodicCoefficients,
    resonance: Resonance,
    xfact: f64,
    xlamo: f64,
}

impl DeepSpace {
    pub(crate) fn new (grav: &GravityModel, m: &MeanElements, geo: &InitGeometry, sec: &SecularTerms)->Self {
        let nm = geo.no_unkozai;
        let day = geo.epoch_1950 + 18261.5;  // days since J2000 (tc = 0)

        let (snodm, cnodm) = m.nodeo.sin_cos();
        let (sinomm, cosomm) = m.argpo.sin_cos();
        let (sinim, cosim) = m.inclo.sin_cos();
        let emsq = m.ecco * m.ecco;
        let betasq = 1.0 - emsq;
        let orbit = OrbitAngles { sinim, cosim, sinomm, cosomm, em: m.ecco, emsq, betasq, rtemsq: betasq.sqrt(), xnoi: 1.0 / nm };

        //--- lunar orbit orientation at epoch
        let xnodce = (4.5236020 - 9.2422029e-4 * day) % TWO_PI;
        let (stem, ctem) = xnodce.sin_cos();
        let zcosil = 0.91375164 - 0.03568096 * ctem;
        let zsinil = (1.0 - zcosil * zcosil).sqrt();
        let zsinhl = 0.089683511 * stem / zsinil;
        let zcoshl = (1.0 - zsinhl * zsinhl).sqrt();
        let gam = 5.8351514 + 0.0019443680 * day;
        let zx = 0.39785416 * stem / zsinil;
        let zy = zcoshl * ctem + 0.91744867 * zsinhl * stem;
        let zx = gam + zx.atan2(zy) - xnodce;
        let (zsingl, zcosgl) = zx.sin_cos();

        let sun = BodyOrientation { zcosg: ZCOSGS, zsing: ZSINGS, zcosi: ZCOSIS, zsini: ZSINIS, zcosh: cnodm, zsinh: snodm, cc: C1SS };
        let moon = BodyOrientation {
            zcosg: zcosgl, zsing: zsingl, zcosi: zcosil, zsini: zsinil,
            zcosh: zcoshl * cnodm + zsinhl * snodm,
            zsinh: snodm * zcoshl - cnodm * zsinhl,
            cc: C1L
        };
        let ss = ThirdBodyTerms::new( &sun, &orbit);
        let lu = ThirdBodyTerms::new( &moon, &orbit);

        let zmol = (4.7199672 + 0.22997150 * day - gam) % TWO_PI;
        let zmos = (6.2565837 + 0.017201977 * day) % TWO_PI;
        let solar = PeriodicCoefficients::new( &ss, emsq, zmos, ZNS, ZES);
        let lunar = PeriodicCoefficients::new( &lu, emsq, zmol, ZNL, ZEL);

        //--- secular lunar-solar rates
        let is_near_equatorial = m.inclo < LOW_INCLINATION || m.inclo > PI - LOW_INCLINATION;

        let ses = ss.s1 * ZNS * ss.s5;
        let sis = ss.s2 * ZNS * (ss.z11 + ss.z13);
        let sls = -ZNS * ss.s3 * (ss.z1 + ss.z3 - 14.0 - 6.0 * emsq);
        let sghs = ss.s4 * ZNS * (ss.z31 + ss.z33 - 6.0);
        let mut shs = if is_near_equatorial { 0.0 } else { -ZNS * ss.s2 * (ss.z21 + ss.z23) };
        if sinim != 0.0 { shs /= sinim }
        let sgs = sghs - cosim * shs;

        let dedt = ses + lu.s1 * ZNL * lu.s5;
        let didt = sis + lu.s2 * ZNL * (lu.z11 + lu.z13);
        let dmdt = sls - ZNL * lu.s3 * (lu.z1 + lu.z3 - 14.0 - 6.0 * emsq);
        let sghl = lu.s4 * ZNL * (lu.z31 + lu.z33 - 6.0);
        let shll = if is_near_equatorial { 0.0 } else { -ZNL * lu.s2 * (lu.z21 + lu.z23) };

        let mut domdt = sgs + sghl;
        let mut dnodt = shs;
        if sinim != 0.0 {
            domdt -= cosim / sinim * shll;
            dnodt += shll / sinim;
        }

        //--- resonance
        let theta = geo.gsto % TWO_PI;
        let aonv = (nm / grav.xke).powf(X2O3);
        let mut xlamo = 0.0;
        let mut xfact = 0.0;

        let resonance = if nm > 0.0034906585 && nm < 0.0052359877 {
            let g200 = 1.0 + emsq * (-2.5 + 0.8125 * emsq);
            let g310 = 1.0 + 2.0 * emsq;
            let g300 = 1.0 + emsq * (-6.0 + 6.60937 * emsq);
            let f220 = 0.75 * (1.0 + cosim) * (1.0 + cosim);
            let f311 = 0.9375 * sinim * sinim * (1.0 + 3.0 * cosim) - 0.75 * (1.0 + cosim);
            let f330 = 1.875 * (1.0 + cosim).powi(3);
            let q22 = 1.7891679e-6;
            let q31 = 2.1460748e-6;
            let q33 = 2.2123015e-7;

            let del = 3.0 * nm * nm * aonv * aonv;
            xlamo = (m.mo + m.nodeo + m.argpo - theta) % TWO_PI;
            xfact = sec.mdot + sec.xpidot() - RPTIM + dmdt + domdt + dnodt - nm;

            Resonance::OneDay {
                del1: del * f311 * g310 * q31 * aonv,
                del2: 2.0 * del * f220 * g200 * q22,
                del3: 3.0 * del * f330 * g300 * q33 * aonv,
            }

        } else if (8.26e-3..=9.24e-3).contains(&nm) && m.ecco >= 0.5 {
            let em = m.ecco;
            let eoc = em * emsq;
            let cosisq = cosim * cosim;

            let g201 = -0.306 - (em - 0.64) * 0.440;
            let (g211, g310, g322, g410, g422, g520) = if em <= 0.65 {
                (
                    3.616 - 13.2470 * em + 16.2900 * emsq,
                    -19.302 + 117.3900 * em - 228.4190 * emsq + 156.5910 * eoc,
                    -18.9068 + 109.7927 * em - 214.6334 * emsq + 146.5816 * eoc,
                    -41.122 + 242.6940 * em - 471.0940 * emsq + 313.9530 * eoc,
                    -146.407 + 841.8800 * em - 1629.014 * emsq + 1083.4350 * eoc,
                    -532.114 + 3017.977 * em - 5740.032 * emsq + 3708.2760 * eoc,
                )
            } else {
                (
                    -72.099 + 331.819 * em - 508.738 * emsq + 266.724 * eoc,
                    -346.844 + 1582.851 * em - 2415.925 * emsq + 1246.113 * eoc,
                    -342.585 + 1554.908 * em - 2366.899 * emsq + 1215.972 * eoc,
                    -1052.797 + 4758.686 * em - 7193.992 * emsq + 3651.957 * eoc,
                    -3581.690 + 16178.110 * em - 24462.770 * emsq + 12422.520 * eoc,
                    if em > 0.715 {
                        -5149.66 + 29936.92 * em - 54087.36 * emsq + 31324.56 * eoc
                    } else {
                        1464.74 - 4664.75 * em + 3763.64 * emsq
                    },
                )
            };
            let (g533, g521, g532) = if em < 0.7 {
                (
                    -919.22770 + 4988.61 * em - 9064.77 * emsq + 5542.21 * eoc,
                    -822.71072 + 4568.6173 * em - 8491.4146 * emsq + 5337.524 * eoc,
                    -853.66600 + 4690.25 * em - 8624.77 * emsq + 5341.4 * eoc,
                )
            } else {
                (
                    -37995.78 + 161616.52 * em - 229838.2 * emsq + 109377.94 * eoc,
                    -51752.104 + 218913.95 * em - 309468.16 * emsq + 146349.42 * eoc,
                    -40023.88 + 170470.89 * em - 242699.48 * emsq + 115605.82 * eoc,
                )
            };

            let sini2 = sinim * sinim;
            let f220 = 0.75 * (1.0 + 2.0 * cosim + cosisq);
            let f221 = 1.5 * sini2;
            let f321 = 1.875 * sinim * (1.0 - 2.0 * cosim - 3.0 * cosisq);
            let f322 = -1.875 * sinim * (1.0 + 2.0 * cosim - 3.0 * cosisq);
            let f441 = 35.0 * sini2 * f220;
            let f442 = 39.375 * sini2 * sini2;
            let f522 = 9.84375 * sinim * (sini2 * (1.0 - 2.0 * cosim - 5.0 * cosisq)
                + 1.0 / 3.0 * (-2.0 + 4.0 * cosim + 6.0 * cosisq));
            let f523 = sinim * (4.92187512 * sini2 * (-2.0 - 4.0 * cosim + 10.0 * cosisq)
                + 6.56250012 * (1.0 + 2.0 * cosim - 3.0 * cosisq));
            let f542 = 29.53125 * sinim * (2.0 - 8.0 * cosim + cosisq * (-12.0 + 8.0 * cosim + 10.0 * cosisq));
            let f543 = 29.53125 * sinim * (-2.0 - 8.0 * cosim + cosisq * (12.0 + 8.0 * cosim - 10.0 * cosisq));

            let root22 = 1.7891679e-6;
            let root32 = 3.7393792e-7;
            let root44 = 7.3636953e-9;
            let root52 = 1.1428639e-7;
            let root54 = 2.1765803e-9;

            let temp1 = 3.0 * nm * nm * aonv * aonv;
            let t22 = temp1 * root22;
            let temp1 = temp1 * aonv;
            let t32 = temp1 * root32;
            let temp1 = temp1 * aonv;
            let t44 = 2.0 * temp1 * root44;
            let temp1 = temp1 * aonv;
            let t52 = temp1 * root52;
            let t54 = 2.0 * temp1 * root54;

            xlamo = (m.mo + m.nodeo + m.nodeo - theta - theta) % TWO_PI;
            xfact = sec.mdot + dmdt + 2.0 * (sec.nodedot + dnodt - RPTIM) - nm;

            Resonance::HalfDay {
                d2201: t22 * f220 * g201,
                d2211: t22 * f221 * g211,
                d3210: t32 * f321 * g310,
                d3222: t32 * f322 * g322,
                d4410: t44 * f441 * g410,
                d4422: t44 * f442 * g422,
                d5220: t52 * f522 * g520,
                d5232: t52 * f523 * g532,
                d5421: t54 * f542 * g521,
                d5433: t54 * f543 * g533,
            }
        } else {
            Resonance::None
        };

        DeepSpace {
            gsto: geo.gsto, no_unkozai: nm, argpo: m.argpo, argpdot: sec.argpdot,
            dedt, didt, dmdt, dnodt, domdt,
            solar, lunar, resonance, xfact, xlamo
        }
    }

    pub fn resonance (&self)->&Resonance { &self.resonance }

    /// lunar-solar secular rates and resonance effects at `t` minutes since epoch
    pub(crate) fn secular (&self, t: f64, st: &mut SecularState) {
        st.em += self.dedt * t;
        st.inclm += self.didt * t;
        st.argpm += self.domdt * t;
        st.nodem += self.dnodt * t;
        st.mm += self.dmdt * t;

        if matches!( self.resonance, Resonance::None) {
            return
        }

        let theta = (self.gsto + t * RPTIM) % TWO_PI;
        let delt = if t > 0.0 { STEPP } else { STEPN };

        // always integrate from epoch so that results do not depend on previous calls
        let mut atime = 0.0;
        let mut xni = self.no_unkozai;
        let mut xli = self.xlamo;

        let (rates, ft) = loop {
            let rates = self.resonance_rates( atime, xli, xni);
            if (t - atime).abs() >= STEPP {
                xli += rates.xldot * delt + rates.xndt * STEP2;
                xni += rates.xndt * delt + rates.xnddt * STEP2;
                atime += delt;
            } else {
                break (rates, t - atime)
            }
        };

        st.nm = xni + rates.xndt * ft + rates.xnddt * ft * ft * 0.5;
        let xl = xli + rates.xldot * ft + rates.xndt * ft * ft * 0.5;
        st.mm = match self.resonance {
            Resonance::OneDay{..} => xl - st.nodem - st.argpm + theta,
            _ => xl - 2.0 * st.nodem + 2.0 * theta
        };
    }

    fn resonance_rates (&self, atime: f64, xli: f64, xni: f64)->ResonanceRates {
        let xldot = xni + self.xfact;

        match self.resonance {
            Resonance::OneDay{ del1, del2, del3 } => {
                let fasx2 = 0.13130908;
                let fasx4 = 2.8843198;
                let fasx6 = 0.37448087;

                let xndt = del1 * (xli - fasx2).sin() 
                    + del2 * (2.0 * (xli - fasx4)).sin() 
                    + del3 * (3.0 * (xli - fasx6)).sin();
                let xnddt = (del1 * (xli - fasx2).cos()
                    + 2.0 * del2 * (2.0 * (xli - fasx4)).cos()
                    + 3.0 * del3 * (3.0 * (xli - fasx6)).cos()) * xldot;

                ResonanceRates { xndt, xldot, xnddt }
            }
            Resonance::HalfDay{ d2201, d2211, d3210, d3222, d4410, d4422, d5220, d5232, d5421, d5433 } => {
                let g22 = 5.7686396;
                let g32 = 0.95240898;
                let g44 = 1.8014998;
                let g52 = 1.0508330;
                let g54 = 4.4108898;

                let xomi = self.argpo + self.argpdot * atime;
                let x2omi = xomi + xomi;
                let x2li = xli + xli;

                let xndt = d2201 * (x2omi + xli - g22).sin()
                    + d2211 * (xli - g22).sin()
                    + d3210 * (xomi + xli - g32).sin()
                    + d3222 * (-xomi + xli - g32).sin()
                    + d4410 * (x2omi + x2li - g44).sin()
                    + d4422 * (x2li - g44).sin()
                    + d5220 * (xomi + xli - g52).sin()
                    + d5232 * (-xomi + xli - g52).sin()
                    + d5421 * (xomi + x2li - g54).sin()
                    + d5433 * (-xomi + x2li - g54).sin();
                let xnddt = (d2201 * (x2omi + xli - g22).cos()
                    + d2211 * (xli - g22).cos()
                    + d3210 * (xomi + xli - g32).cos()
                    + d3222 * (-xomi + xli - g32).cos()
                    + d5220 * (xomi + xli - g52).cos()
                    + d5232 * (-xomi + xli - g52).cos()
                    + 2.0 * (d4410 * (x2omi + x2li - g44).cos()
                        + d4422 * (x2li - g44).cos()
                        + d5421 * (xomi + x2li - g54).cos()
                        + d5433 * (-xomi + x2li - g54).cos())) * xldot;

                ResonanceRates { xndt, xldot, xnddt }
            }
            Resonance::None => ResonanceRates { xndt: 0.0, xldot, xnddt: 0.0 }
        }
    }

    /// apply lunar-solar long period periodics at `t` minutes since epoch
    pub(crate) fn periodics (&self, t: f64, p: &mut PerturbedElements) {
        let [ses, sis, sls, sghs, shs] = self.solar.evaluate( t);
        let [sel, sil, sll, sghl, shll] = self.lunar.evaluate( t);

        let pe = ses + sel;
        let pinc = sis + sil;
        let pl = sls + sll;
        let mut pgh = sghs + sghl;
        let mut ph = shs + shll;

        p.xincp += pinc;
        p.ep += pe;
        let (sinip, cosip) = p.xincp.sin_cos();

        if p.xincp >= 0.2 {
            ph /= sinip;
            pgh -= cosip * ph;
            p.argpp += pgh;
            p.nodep += ph;
            p.mp += pl;

        } else { // Lyddane modification for low inclinations
            let (sinop, cosop) = p.nodep.sin_cos();
            let mut alfdp = sinip * sinop;
            let mut betdp = sinip * cosop;
            let dalf = ph * cosop + pinc * cosip * sinop;
            let dbet = -ph * sinop + pinc * cosip * cosop;
            alfdp += dalf;
            betdp += dbet;

            p.nodep %= TWO_PI;
            let xls = p.mp + p.argpp + pl + pgh + (cosip - pinc * sinip) * p.nodep;
            let xnoh = p.nodep;
            p.nodep = alfdp.atan2(betdp);
            if (xnoh - p.nodep).abs() > PI {
                if p.nodep < xnoh { p.nodep += TWO_PI } else { p.nodep -= TWO_PI }
            }
            p.mp += pl;
            p.argpp = xls - p.mp - cosip * p.nodep;
        }
    }
}
