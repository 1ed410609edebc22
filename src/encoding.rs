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
use crate::lab::Lab;
use crate::matrix::Xyz;

/// The ICC XYZ-to-16-bit factor, 2 * 32768 / 65535.
pub(crate) const PCS_XYZ_SCALE: f64 = 1.999969482421875;
/// The 8000h / 8080h ratio between v2 and v4 Lab encodings.
pub(crate) const V2_FROM_V4: f64 = 65280.0 / 65535.0;

/// Value encoding carried by every stage boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// n floats in [0, 1]
    Device,
    /// Lab packed into [0, 1] triples with the 8000h/8080h v2 scale
    PcsV2,
    /// Lab packed into [0, 1] triples: L/100, (a+128)/255, (b+128)/255
    PcsV4,
    /// XYZ scaled by 1/1.999969482421875
    PcsXyz,
    /// Lab components against D50: L in [0,100], a/b in [-128,127]
    LabD50,
    CmsLab,
    CmsRgb,
    CmsCmyk,
    CmsXyz,
}

impl Encoding {
    pub const fn name(self) -> &'static str {
        match self {
            Encoding::Device => "device",
            Encoding::PcsV2 => "PCSv2",
            Encoding::PcsV4 => "PCSv4",
            Encoding::PcsXyz => "PCSXYZ",
            Encoding::LabD50 => "LabD50",
            Encoding::CmsLab => "cmsLab",
            Encoding::CmsRgb => "cmsRGB",
            Encoding::CmsCmyk => "cmsCMYK",
            Encoding::CmsXyz => "cmsXYZ",
        }
    }

    /// Encodings the PCS conversion lattice covers.
    pub(crate) const fn is_convertible(self) -> bool {
        matches!(
            self,
            Encoding::PcsV2
                | Encoding::PcsV4
                | Encoding::PcsXyz
                | Encoding::LabD50
                | Encoding::CmsLab
                | Encoding::CmsXyz
        )
    }

    pub(crate) const fn is_lab_pcs(self) -> bool {
        matches!(self, Encoding::PcsV2 | Encoding::PcsV4)
    }
}

#[inline]
fn lab_to_v4(v: [f64; 3]) -> [f64; 3] {
    [v[0] / 100.0, (v[1] + 128.0) / 255.0, (v[2] + 128.0) / 255.0]
}

#[inline]
fn v4_to_lab(v: [f64; 3]) -> [f64; 3] {
    [v[0] * 100.0, v[1] * 255.0 - 128.0, v[2] * 255.0 - 128.0]
}

#[inline]
fn lab_to_pcs_xyz(v: [f64; 3]) -> [f64; 3] {
    let xyz = Lab::new(v[0], v[1], v[2]).to_d50_xyz();
    [
        xyz.x / PCS_XYZ_SCALE,
        xyz.y / PCS_XYZ_SCALE,
        xyz.z / PCS_XYZ_SCALE,
    ]
}

#[inline]
fn pcs_xyz_to_lab(v: [f64; 3]) -> [f64; 3] {
    let lab = Lab::from_d50_xyz(Xyz::new(
        v[0] * PCS_XYZ_SCALE,
        v[1] * PCS_XYZ_SCALE,
        v[2] * PCS_XYZ_SCALE,
    ));
    [lab.l, lab.a, lab.b]
}

/// Converts a triple between any two PCS-family encodings. Direct scale
/// paths are taken where they exist; everything else composes through
/// LabD50. Callers guarantee both tags satisfy `is_convertible`.
pub(crate) fn pcs_convert(from: Encoding, to: Encoding, v: [f64; 3]) -> [f64; 3] {
    use Encoding::*;
    if from == to {
        return v;
    }
    match (from, to) {
        (PcsV4, PcsV2) => [
            v[0] * V2_FROM_V4,
            v[1] * V2_FROM_V4,
            v[2] * V2_FROM_V4,
        ],
        (PcsV2, PcsV4) => [
            v[0] / V2_FROM_V4,
            v[1] / V2_FROM_V4,
            v[2] / V2_FROM_V4,
        ],
        (LabD50, PcsV4) | (CmsLab, PcsV4) => lab_to_v4(v),
        (PcsV4, LabD50) | (PcsV4, CmsLab) => v4_to_lab(v),
        (LabD50, PcsV2) | (CmsLab, PcsV2) => {
            let v4 = lab_to_v4(v);
            [
                v4[0] * V2_FROM_V4,
                v4[1] * V2_FROM_V4,
                v4[2] * V2_FROM_V4,
            ]
        }
        (PcsV2, LabD50) | (PcsV2, CmsLab) => v4_to_lab([
            v[0] / V2_FROM_V4,
            v[1] / V2_FROM_V4,
            v[2] / V2_FROM_V4,
        ]),
        (LabD50, CmsLab) | (CmsLab, LabD50) => v,
        (LabD50, PcsXyz) | (CmsLab, PcsXyz) => lab_to_pcs_xyz(v),
        (PcsXyz, LabD50) | (PcsXyz, CmsLab) => pcs_xyz_to_lab(v),
        (PcsXyz, PcsV4) => lab_to_v4(pcs_xyz_to_lab(v)),
        (PcsV4, PcsXyz) => lab_to_pcs_xyz(v4_to_lab(v)),
        (PcsXyz, PcsV2) => pcs_convert(PcsV4, PcsV2, pcs_convert(PcsXyz, PcsV4, v)),
        (PcsV2, PcsXyz) => pcs_convert(PcsV4, PcsXyz, pcs_convert(PcsV2, PcsV4, v)),
        (CmsXyz, PcsXyz) => [
            v[0] / PCS_XYZ_SCALE,
            v[1] / PCS_XYZ_SCALE,
            v[2] / PCS_XYZ_SCALE,
        ],
        (PcsXyz, CmsXyz) => [
            v[0] * PCS_XYZ_SCALE,
            v[1] * PCS_XYZ_SCALE,
            v[2] * PCS_XYZ_SCALE,
        ],
        (CmsXyz, _) => pcs_convert(PcsXyz, to, pcs_convert(CmsXyz, PcsXyz, v)),
        (_, CmsXyz) => pcs_convert(PcsXyz, CmsXyz, pcs_convert(from, PcsXyz, v)),
        _ => v,
    }
}
