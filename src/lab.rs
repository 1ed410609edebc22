/*
 * // Copyright (c) Radzivon Bartoshyk 2/2025. All rights reserved.
 * //
 * // Redistribution and use in source and binary forms, with or without modification,
 * // are permitted provided that the following conditions are met:
 * //
 * // 1.  Redistributions of source code must retain the above copyright notice, this
 * // list of conditions and the following disclaimer.
 * //
 * // 2.  Redistributions in binary form must reproduce the above copyright notice,
 * // this list of conditions and the following disclaimer in the documentation
 * // and/or other materials provided with the distribution.
 * //
 * // 3.  Neither the name of the copyright holder nor the names of its
 * // contributors may be used to endorse or promote products derived from
 * // this software without specific prior written permission.
 * //
 * // THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS"
 * // AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE
 * // IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
 * // DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE
 * // FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL, EXEMPLARY, OR CONSEQUENTIAL
 * // DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
 * // SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER
 * // CAUSED AND ON ANY THEORY OF LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY,
 * // OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE
 * // OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.
 */
use crate::matrix::Xyz;
use pxfm::f_cbrt;

/// The ICC profile connection space illuminant.
pub const D50_XYZ: Xyz = Xyz::new(0.96422, 1.0, 0.82521);
/// D65 as carried by display profiles' media white point tags.
pub const D65_XYZ: Xyz = Xyz::new(0.95047, 1.0, 1.08883);

const CIE_EPSILON: f64 = {
    let t = 24.0 / 116.0;
    t * t * t
};
const CIE_KAPPA: f64 = 841.0 / 108.0;
const CIE_OFFSET: f64 = 16.0 / 116.0;

#[inline]
fn cie_f(t: f64) -> f64 {
    if t > CIE_EPSILON {
        f_cbrt(t)
    } else {
        CIE_KAPPA * t + CIE_OFFSET
    }
}

#[inline]
fn cie_f_inverse(f: f64) -> f64 {
    if f > 24.0 / 116.0 {
        f * f * f
    } else {
        (f - CIE_OFFSET) / CIE_KAPPA
    }
}

/// CIE L\*a\*b\* value; L in [0, 100], a and b nominally in [-128, 127].
#[derive(Debug, Copy, Clone, Default)]
pub struct Lab {
    pub l: f64,
    pub a: f64,
    pub b: f64,
}

impl PartialEq for Lab {
    fn eq(&self, other: &Self) -> bool {
        const TOLERANCE: f64 = 1e-9;
        (self.l - other.l).abs() < TOLERANCE
            && (self.a - other.a).abs() < TOLERANCE
            && (self.b - other.b).abs() < TOLERANCE
    }
}

impl Lab {
    #[inline]
    pub const fn new(l: f64, a: f64, b: f64) -> Self {
        Lab { l, a, b }
    }

    /// Standard CIE piecewise conversion against the given reference white.
    pub fn to_xyz(&self, white: Xyz) -> Xyz {
        let fy = (self.l + 16.0) / 116.0;
        let fx = fy + self.a / 500.0;
        let fz = fy - self.b / 200.0;
        Xyz::new(
            white.x * cie_f_inverse(fx),
            white.y * cie_f_inverse(fy),
            white.z * cie_f_inverse(fz),
        )
    }

    pub fn from_xyz(xyz: Xyz, white: Xyz) -> Lab {
        let fx = cie_f(xyz.x / white.x);
        let fy = cie_f(xyz.y / white.y);
        let fz = cie_f(xyz.z / white.z);
        Lab::new(116.0 * fy - 16.0, 500.0 * (fx - fy), 200.0 * (fy - fz))
    }

    /// Against D50, the only white the PCS carries.
    #[inline]
    pub fn to_d50_xyz(&self) -> Xyz {
        self.to_xyz(D50_XYZ)
    }

    #[inline]
    pub fn from_d50_xyz(xyz: Xyz) -> Lab {
        Lab::from_xyz(xyz, D50_XYZ)
    }
}
