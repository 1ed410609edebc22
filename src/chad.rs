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
use crate::lab::D50_XYZ;
use crate::matrix::{Matrix3d, Xyz};

const LAM_RIGG: Matrix3d = Matrix3d {
    v: [
        [0.8951, 0.2664, -0.1614],
        [-0.7502, 1.7135, 0.0367],
        [0.0389, -0.0685, 1.0296],
    ],
};

fn compute_chromatic_adaption(
    source_white_point: Xyz,
    dest_white_point: Xyz,
    chad: Matrix3d,
) -> Option<Matrix3d> {
    let cone_source_rgb = chad.mul_vector(source_white_point.to_vector());
    let cone_dest_rgb = chad.mul_vector(dest_white_point.to_vector());

    if cone_source_rgb.v.iter().any(|&v| v == 0.0) {
        return None;
    }

    let cone = Matrix3d {
        v: [
            [cone_dest_rgb.v[0] / cone_source_rgb.v[0], 0.0, 0.0],
            [0.0, cone_dest_rgb.v[1] / cone_source_rgb.v[1], 0.0],
            [0.0, 0.0, cone_dest_rgb.v[2] / cone_source_rgb.v[2]],
        ],
    };

    let chad_inv = chad.inverse()?;
    Some(chad_inv.mat_mul(cone.mat_mul(chad)))
}

/// Bradford transform carrying `source_illumination` onto `target_illumination`.
pub(crate) fn adaption_matrix(
    source_illumination: Xyz,
    target_illumination: Xyz,
) -> Option<Matrix3d> {
    compute_chromatic_adaption(source_illumination, target_illumination, LAM_RIGG)
}

/// Adaptation from an arbitrary media white onto the PCS illuminant.
pub(crate) fn adapt_to_d50(source_white_pt: Xyz) -> Option<Matrix3d> {
    if source_white_pt.y == 0.0 {
        return None;
    }
    adaption_matrix(source_white_pt, D50_XYZ)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lab::D65_XYZ;
    use crate::matrix::Vector3d;

    #[test]
    fn test_same_white_is_identity() {
        let m = adaption_matrix(D50_XYZ, D50_XYZ).unwrap();
        assert!(m.test_equality(Matrix3d::IDENTITY));
    }

    #[test]
    fn test_white_maps_to_white() {
        let m = adaption_matrix(D65_XYZ, D50_XYZ).unwrap();
        let out = m.mul_vector(D65_XYZ.to_vector());
        assert!((out.v[0] - D50_XYZ.x).abs() < 1e-6);
        assert!((out.v[1] - D50_XYZ.y).abs() < 1e-6);
        assert!((out.v[2] - D50_XYZ.z).abs() < 1e-6);
    }

    #[test]
    fn test_neutral_axis_stays_neutral() {
        let m = adaption_matrix(D65_XYZ, D50_XYZ).unwrap();
        let gray = m.mul_vector(Vector3d::new(
            D65_XYZ.x * 0.18,
            D65_XYZ.y * 0.18,
            D65_XYZ.z * 0.18,
        ));
        assert!((gray.v[0] - D50_XYZ.x * 0.18).abs() < 1e-6);
        assert!((gray.v[2] - D50_XYZ.z * 0.18).abs() < 1e-6);
    }
}
