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
use crate::clut::Clut;
use crate::encoding::{Encoding, PCS_XYZ_SCALE, pcs_convert};
use crate::interp::{InterpolationMethod, eval_clut};
use crate::lab::{D50_XYZ, Lab};
use crate::matrix::{Matrix3d, Vector3d, Xyz};
use crate::mlaf::mlad;
use crate::trc::Trc;
use std::fmt;
use std::sync::Arc;

/// Caller-supplied per-pixel function injected at a pipeline anchor.
pub type CustomStageFn = Arc<dyn Fn(&[f64]) -> Vec<f64> + Send + Sync>;

/// Boundaries at which custom stages may be registered. Indexed anchors
/// take an optional hop number; `None` matches every hop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageAnchor {
    BeforeInput2Device,
    BeforeDevice2Pcs(Option<usize>),
    AfterDevice2Pcs(Option<usize>),
    Pcs(Option<usize>),
    BeforePcs2Device(Option<usize>),
    AfterPcs2Device(Option<usize>),
    AfterDevice2Output,
}

#[derive(Clone)]
pub struct CustomStage {
    pub anchor: StageAnchor,
    pub name: String,
    pub func: CustomStageFn,
}

impl fmt::Debug for CustomStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomStage")
            .field("anchor", &self.anchor)
            .field("name", &self.name)
            .finish()
    }
}

/// Typed payload of a pipeline stage; the executor dispatches on it.
#[derive(Clone)]
pub(crate) enum StageOp {
    Null,
    PcsConvert,
    /// cmsLab object -> PCSv4, optionally adapting the source white onto D50.
    LabInput {
        white: Xyz,
        adapt: Option<Matrix3d>,
    },
    /// PCSv4 -> cmsLab object.
    LabOutput {
        round: bool,
        precision: u32,
    },
    /// cmsXYZ object -> PCSXYZ.
    XyzInput,
    /// PCSXYZ -> cmsXYZ object.
    XyzOutput,
    /// Structured object components -> device floats (divide by range).
    ObjectToDevice {
        divisor: f64,
    },
    /// Device floats -> structured object components.
    DeviceToObject {
        scale: f64,
        round: bool,
        precision: u32,
    },
    /// Raw integers -> device floats.
    IntToDevice {
        divisor: f64,
    },
    /// Device floats -> raw integers, rounding half away from zero.
    /// `max` stays at the integer ceiling when the scale is folded away.
    DeviceToInt {
        scale: f64,
        max: f64,
    },
    Curves {
        curves: Vec<Trc>,
        inverse: bool,
    },
    Matrix {
        m: Matrix3d,
        bias: Vector3d,
        clip: bool,
    },
    Interp {
        lut: Arc<Clut>,
        method_3d: InterpolationMethod,
        method_4d: InterpolationMethod,
    },
    Bpc {
        scale: Vector3d,
        offset: Vector3d,
    },
    /// Gray kTRC expansion into the PCS; the output encoding selects the
    /// XYZ or Lab form.
    GrayToPcs {
        curve: Option<Trc>,
    },
    /// PCS back through the inverse kTRC into one device channel.
    PcsToGray {
        curve: Option<Trc>,
    },
    Custom {
        func: CustomStageFn,
    },
}

impl fmt::Debug for StageOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StageOp::Null => "null",
            StageOp::PcsConvert => "pcs_convert",
            StageOp::LabInput { .. } => "lab_input",
            StageOp::LabOutput { .. } => "lab_output",
            StageOp::XyzInput => "xyz_input",
            StageOp::XyzOutput => "xyz_output",
            StageOp::ObjectToDevice { .. } => "object_to_device",
            StageOp::DeviceToObject { .. } => "device_to_object",
            StageOp::IntToDevice { .. } => "int_to_device",
            StageOp::DeviceToInt { .. } => "device_to_int",
            StageOp::Curves { .. } => "curves",
            StageOp::Matrix { .. } => "matrix",
            StageOp::Interp { .. } => "interp",
            StageOp::Bpc { .. } => "bpc",
            StageOp::GrayToPcs { .. } => "gray_to_pcs",
            StageOp::PcsToGray { .. } => "pcs_to_gray",
            StageOp::Custom { .. } => "custom",
        })
    }
}

/// One functional unit of a pipeline with its declared boundary encodings.
#[derive(Clone, Debug)]
pub struct Stage {
    pub name: String,
    pub in_encoding: Encoding,
    pub out_encoding: Encoding,
    pub(crate) op: StageOp,
    pub optimised: bool,
}

impl Stage {
    pub(crate) fn new(
        name: &str,
        in_encoding: Encoding,
        out_encoding: Encoding,
        op: StageOp,
    ) -> Stage {
        Stage {
            name: name.to_owned(),
            in_encoding,
            out_encoding,
            op,
            optimised: false,
        }
    }

    pub(crate) fn pcs_convert(from: Encoding, to: Encoding) -> Stage {
        Stage::new(
            &format!("{}2{}", from.name(), to.name()),
            from,
            to,
            StageOp::PcsConvert,
        )
    }

    #[inline]
    fn round_to(v: f64, precision: u32) -> f64 {
        let factor = 10f64.powi(precision as i32);
        (v * factor).round() / factor
    }

    /// Runs the stage over one value, appending the result into `dst`.
    pub(crate) fn apply(&self, src: &[f64], dst: &mut Vec<f64>) {
        dst.clear();
        match &self.op {
            StageOp::Null => dst.extend_from_slice(src),
            StageOp::PcsConvert => {
                let out = pcs_convert(
                    self.in_encoding,
                    self.out_encoding,
                    [src[0], src[1], src[2]],
                );
                dst.extend_from_slice(&out);
            }
            StageOp::LabInput { white, adapt } => {
                let lab = Lab::new(src[0], src[1], src[2]);
                let lab = if let Some(adaptation) = adapt {
                    let xyz = lab.to_xyz(*white);
                    let adapted = adaptation.mul_vector(xyz.to_vector());
                    Lab::from_d50_xyz(Xyz::from_vector(adapted))
                } else {
                    lab
                };
                let out = pcs_convert(
                    Encoding::LabD50,
                    Encoding::PcsV4,
                    [lab.l, lab.a, lab.b],
                );
                dst.extend_from_slice(&out);
            }
            StageOp::LabOutput { round, precision } => {
                let lab = pcs_convert(
                    Encoding::PcsV4,
                    Encoding::CmsLab,
                    [src[0], src[1], src[2]],
                );
                for v in lab {
                    dst.push(if *round { Self::round_to(v, *precision) } else { v });
                }
            }
            StageOp::XyzInput => {
                for v in src.iter().take(3) {
                    dst.push(v / PCS_XYZ_SCALE);
                }
            }
            StageOp::XyzOutput => {
                for v in src.iter().take(3) {
                    dst.push(v * PCS_XYZ_SCALE);
                }
            }
            StageOp::ObjectToDevice { divisor } => {
                for v in src {
                    dst.push(v / divisor);
                }
            }
            StageOp::DeviceToObject {
                scale,
                round,
                precision,
            } => {
                for v in src {
                    let v = v.clamp(0.0, 1.0) * scale;
                    dst.push(if *round { Self::round_to(v, *precision) } else { v });
                }
            }
            StageOp::IntToDevice { divisor } => {
                for v in src {
                    dst.push(v / divisor);
                }
            }
            StageOp::DeviceToInt { scale, max } => {
                for v in src {
                    dst.push((v * scale).round().clamp(0.0, *max));
                }
            }
            StageOp::Curves { curves, inverse } => {
                for (ch, v) in src.iter().enumerate() {
                    let curve = &curves[ch.min(curves.len() - 1)];
                    dst.push(if *inverse {
                        curve.eval_inverse(*v)
                    } else {
                        curve.eval(*v)
                    });
                }
            }
            StageOp::Matrix { m, bias, clip } => {
                let (x, y, z) = (src[0], src[1], src[2]);
                for row in 0..3 {
                    let mut v = mlad(
                        mlad(mlad(bias.v[row], x, m.v[row][0]), y, m.v[row][1]),
                        z,
                        m.v[row][2],
                    );
                    if *clip {
                        v = v.clamp(0.0, 1.0);
                    }
                    dst.push(v);
                }
            }
            StageOp::Interp {
                lut,
                method_3d,
                method_4d,
            } => {
                dst.resize(lut.output_channels, 0.0);
                eval_clut(lut, *method_3d, *method_4d, src, dst);
            }
            StageOp::Bpc { scale, offset } => {
                for row in 0..3 {
                    dst.push(mlad(offset.v[row], src[row], scale.v[row]));
                }
            }
            StageOp::GrayToPcs { curve } => {
                let g = match curve {
                    Some(trc) => trc.eval(src[0].clamp(0.0, 1.0)),
                    None => src[0].clamp(0.0, 1.0),
                };
                if self.out_encoding == Encoding::PcsXyz {
                    dst.push(g * D50_XYZ.x / PCS_XYZ_SCALE);
                    dst.push(g * D50_XYZ.y / PCS_XYZ_SCALE);
                    dst.push(g * D50_XYZ.z / PCS_XYZ_SCALE);
                } else {
                    // a* = b* = 0 in the PCSv4 packing, (0 + 128) / 255
                    dst.push(g);
                    dst.push(128.0 / 255.0);
                    dst.push(128.0 / 255.0);
                }
            }
            StageOp::PcsToGray { curve } => {
                let t = if self.in_encoding == Encoding::PcsXyz {
                    (src[1] * PCS_XYZ_SCALE).clamp(0.0, 1.0)
                } else {
                    src[0].clamp(0.0, 1.0)
                };
                dst.push(match curve {
                    Some(trc) => trc.eval_inverse(t),
                    None => t,
                });
            }
            StageOp::Custom { func } => {
                let out = func(src);
                dst.extend_from_slice(&out);
            }
        }
    }

    /// Debug line recorded when `pipeline_debug` is on.
    pub(crate) fn debug_line(&self, input: &[f64], output: &[f64]) -> String {
        format!(
            "{} [{} -> {}]: {:?} -> {:?}",
            self.name,
            self.in_encoding.name(),
            self.out_encoding.name(),
            input,
            output
        )
    }
}

/// Threads one value through the whole stage list.
pub(crate) fn run_pipeline(stages: &[Stage], input: &[f64]) -> Vec<f64> {
    let mut current = input.to_vec();
    let mut next = Vec::new();
    for stage in stages {
        stage.apply(&current, &mut next);
        std::mem::swap(&mut current, &mut next);
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_matrix_stage_passes_through() {
        let stage = Stage::new(
            "matrix_rgb",
            Encoding::Device,
            Encoding::Device,
            StageOp::Matrix {
                m: Matrix3d::IDENTITY,
                bias: Vector3d::ZERO,
                clip: false,
            },
        );
        let mut out = Vec::new();
        stage.apply(&[0.1, 0.9, 0.4], &mut out);
        assert_eq!(out, vec![0.1, 0.9, 0.4]);
    }

    #[test]
    fn test_device_to_int_rounds_half_away() {
        let stage = Stage::new(
            "device3_to_int",
            Encoding::Device,
            Encoding::Device,
            StageOp::DeviceToInt {
                scale: 255.0,
                max: 255.0,
            },
        );
        let mut out = Vec::new();
        stage.apply(&[0.5 / 255.0, 1.5 / 255.0, 1.2], &mut out);
        assert_eq!(out, vec![1.0, 2.0, 255.0]);
    }

    #[test]
    fn test_lab_roundtrip_stages() {
        let input = Stage::new(
            "cmsLab2PCSv4",
            Encoding::CmsLab,
            Encoding::PcsV4,
            StageOp::LabInput {
                white: D50_XYZ,
                adapt: None,
            },
        );
        let output = Stage::new(
            "PCSv42cmsLab",
            Encoding::PcsV4,
            Encoding::CmsLab,
            StageOp::LabOutput {
                round: false,
                precision: 0,
            },
        );
        let mut mid = Vec::new();
        let mut back = Vec::new();
        input.apply(&[62.0, -14.0, 40.0], &mut mid);
        output.apply(&mid, &mut back);
        assert!((back[0] - 62.0).abs() < 1e-9);
        assert!((back[1] + 14.0).abs() < 1e-9);
        assert!((back[2] - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_gray_scatter_lab_pcs() {
        let stage = Stage::new(
            "gray2PCS",
            Encoding::Device,
            Encoding::PcsV4,
            StageOp::GrayToPcs { curve: None },
        );
        let mut out = Vec::new();
        stage.apply(&[0.5], &mut out);
        assert_eq!(out, vec![0.5, 128.0 / 255.0, 128.0 / 255.0]);
        // the placeholder decodes to a* = b* = 0 exactly
        let lab = pcs_convert(Encoding::PcsV4, Encoding::LabD50, [out[0], out[1], out[2]]);
        assert_eq!(lab[1], 0.0);
        assert_eq!(lab[2], 0.0);
    }

    #[test]
    fn test_bpc_stage_is_affine() {
        let stage = Stage::new(
            "bpc",
            Encoding::PcsXyz,
            Encoding::PcsXyz,
            StageOp::Bpc {
                scale: Vector3d::new(0.9, 0.9, 0.9),
                offset: Vector3d::new(0.01, 0.02, 0.03),
            },
        );
        let mut out = Vec::new();
        stage.apply(&[0.1, 0.2, 0.3], &mut out);
        assert!((out[0] - 0.1f64.mul_add(0.9, 0.01)).abs() < 1e-12);
        assert!((out[1] - 0.2f64.mul_add(0.9, 0.02)).abs() < 1e-12);
        assert!((out[2] - 0.3f64.mul_add(0.9, 0.03)).abs() < 1e-12);
    }
}
