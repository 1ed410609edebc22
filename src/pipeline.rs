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
use crate::bpc;
use crate::chad::{adapt_to_d50, adaption_matrix};
use crate::clut::Clut;
use crate::encoding::{Encoding, PCS_XYZ_SCALE};
use crate::err::CmsError;
use crate::interp::InterpolationMethod;
use crate::lab::D50_XYZ;
use crate::matrix::{Matrix3d, Vector3d};
use crate::profile::{
    ColorProfile, DataColorSpace, ProfileKind, ProfileLut, ProfileVersion, RenderingIntent,
    resolve_virtual,
};
use crate::stage::{CustomStage, Stage, StageAnchor, StageOp};
use crate::transform::{ChainEntry, DataFormat, TransformOptions};
use crate::trc::Trc;
use std::sync::Arc;

/// Chain after validation: profiles at even slots, intents at odd slots.
#[derive(Clone, Debug)]
pub(crate) struct ResolvedChain {
    pub profiles: Vec<Arc<ColorProfile>>,
    pub intents: Vec<RenderingIntent>,
}

impl ResolvedChain {
    pub(crate) fn hops(&self) -> usize {
        self.intents.len()
    }

    pub(crate) fn first(&self) -> &ColorProfile {
        &self.profiles[0]
    }

    pub(crate) fn last(&self) -> &ColorProfile {
        self.profiles.last().expect("validated chain is non-empty")
    }
}

/// Enforces the chain shape: odd length >= 3, profiles at even positions,
/// intents at odd positions, virtual names resolved through the registry.
pub(crate) fn validate_chain(chain: &[ChainEntry]) -> Result<ResolvedChain, CmsError> {
    if chain.len() < 3 {
        return Err(CmsError::ChainTooShort(chain.len()));
    }
    if chain.len() % 2 == 0 {
        return Err(CmsError::ChainExpectedProfile(chain.len() - 1));
    }
    let mut profiles = Vec::with_capacity(chain.len() / 2 + 1);
    let mut intents = Vec::with_capacity(chain.len() / 2);
    for (i, entry) in chain.iter().enumerate() {
        if i % 2 == 0 {
            match entry {
                ChainEntry::Profile(p) => profiles.push(p.clone()),
                ChainEntry::Named(name) => profiles.push(Arc::new(resolve_virtual(name)?)),
                ChainEntry::Intent(_) => return Err(CmsError::ChainExpectedProfile(i)),
            }
        } else {
            match entry {
                ChainEntry::Intent(intent) => intents.push(*intent),
                _ => return Err(CmsError::ChainExpectedIntent(i)),
            }
        }
    }
    Ok(ResolvedChain { profiles, intents })
}

/// Verifies that every stage hands its successor the encoding it expects.
pub(crate) fn validate_stages(stages: &[Stage]) -> Result<(), CmsError> {
    for (i, pair) in stages.windows(2).enumerate() {
        if pair[0].out_encoding != pair[1].in_encoding {
            return Err(CmsError::StageEncodingMismatch {
                index: i,
                out: pair[0].out_encoding,
                next_in: pair[1].in_encoding,
            });
        }
    }
    Ok(())
}

pub(crate) struct PipelineBuilder<'a> {
    opts: &'a TransformOptions,
    chain: &'a ResolvedChain,
    custom: &'a [CustomStage],
    stages: Vec<Stage>,
    cursor: Encoding,
    pub(crate) notes: Vec<String>,
}

impl<'a> PipelineBuilder<'a> {
    pub(crate) fn new(
        opts: &'a TransformOptions,
        chain: &'a ResolvedChain,
        custom: &'a [CustomStage],
    ) -> Self {
        PipelineBuilder {
            opts,
            chain,
            custom,
            stages: Vec::new(),
            cursor: Encoding::Device,
            notes: Vec::new(),
        }
    }

    /// Builds the full staged pipeline for the chain.
    pub(crate) fn build(mut self) -> Result<(Vec<Stage>, Vec<String>), CmsError> {
        self.push_custom(StageAnchor::BeforeInput2Device, self.input_encoding());
        self.phase_input_decode()?;
        for hop in 0..self.chain.hops() {
            self.build_hop(hop)?;
        }
        self.phase_output_encode()?;
        self.push_custom(StageAnchor::AfterDevice2Output, self.cursor);
        validate_stages(&self.stages)?;
        Ok((self.stages, self.notes))
    }

    /// Builds the minimal pipeline that decodes the input, runs one cached
    /// CLUT lookup and encodes the output.
    pub(crate) fn build_minimal(mut self, lut: Arc<Clut>) -> Result<(Vec<Stage>, Vec<String>), CmsError> {
        self.phase_input_decode()?;
        let in_enc = self.cursor;
        let method_3d = if in_enc.is_lab_pcs() {
            InterpolationMethod::Trilinear
        } else {
            self.opts.lut_interpolation_3d
        };
        let out_enc = self.pcs_device_encoding(self.chain.last());
        self.stages.push(Stage::new(
            "interp",
            in_enc,
            out_enc,
            StageOp::Interp {
                lut,
                method_3d,
                method_4d: self.opts.lut_interpolation_4d,
            },
        ));
        self.cursor = out_enc;
        self.phase_output_encode()?;
        validate_stages(&self.stages)?;
        Ok((self.stages, self.notes))
    }

    fn note(&mut self, text: String) {
        if self.opts.verbose {
            println!("{text}");
        }
        self.notes.push(text);
    }

    /// Encoding the caller's raw values arrive in.
    fn input_encoding(&self) -> Encoding {
        match self.opts.data_format {
            DataFormat::Object | DataFormat::ObjectFloat => match self.chain.first().kind() {
                ProfileKind::Lab => Encoding::CmsLab,
                ProfileKind::Xyz => Encoding::CmsXyz,
                ProfileKind::Cmyk => Encoding::CmsCmyk,
                ProfileKind::RgbMatrix | ProfileKind::RgbLut => Encoding::CmsRgb,
                ProfileKind::Gray | ProfileKind::Duo => Encoding::Device,
            },
            _ => Encoding::Device,
        }
    }

    /// The encoding a Lab or XYZ profile's "device" side runs in.
    fn pcs_device_encoding(&self, profile: &ColorProfile) -> Encoding {
        match profile.kind() {
            ProfileKind::Lab => {
                if profile.version == ProfileVersion::V2 {
                    Encoding::PcsV2
                } else {
                    Encoding::PcsV4
                }
            }
            ProfileKind::Xyz => Encoding::PcsXyz,
            _ => Encoding::Device,
        }
    }

    fn ensure(&mut self, target: Encoding) -> Result<(), CmsError> {
        if self.cursor == target {
            return Ok(());
        }
        if !self.cursor.is_convertible() || !target.is_convertible() {
            return Err(CmsError::UnexpectedPcsEncoding {
                expected: target,
                found: self.cursor,
            });
        }
        self.stages.push(Stage::pcs_convert(self.cursor, target));
        self.cursor = target;
        Ok(())
    }

    fn push_custom(&mut self, anchor: StageAnchor, encoding: Encoding) {
        for custom in self.custom {
            let matches = match (custom.anchor, anchor) {
                (StageAnchor::BeforeInput2Device, StageAnchor::BeforeInput2Device) => true,
                (StageAnchor::AfterDevice2Output, StageAnchor::AfterDevice2Output) => true,
                (StageAnchor::BeforeDevice2Pcs(want), StageAnchor::BeforeDevice2Pcs(Some(at)))
                | (StageAnchor::AfterDevice2Pcs(want), StageAnchor::AfterDevice2Pcs(Some(at)))
                | (StageAnchor::Pcs(want), StageAnchor::Pcs(Some(at)))
                | (StageAnchor::BeforePcs2Device(want), StageAnchor::BeforePcs2Device(Some(at)))
                | (StageAnchor::AfterPcs2Device(want), StageAnchor::AfterPcs2Device(Some(at))) => {
                    want.is_none() || want == Some(at)
                }
                _ => false,
            };
            if matches {
                self.stages.push(Stage::new(
                    &custom.name,
                    encoding,
                    encoding,
                    StageOp::Custom {
                        func: custom.func.clone(),
                    },
                ));
            }
        }
    }

    // Phase A
    fn phase_input_decode(&mut self) -> Result<(), CmsError> {
        let first = self.chain.first().clone();
        let kind = first.kind();
        match self.opts.data_format {
            DataFormat::Object | DataFormat::ObjectFloat => match kind {
                ProfileKind::Lab => {
                    let adapt = if self.opts.lab_input_adaptation && first.white_point != D50_XYZ {
                        adapt_to_d50(first.white_point)
                    } else {
                        None
                    };
                    self.stages.push(Stage::new(
                        "cmsLab2PCSv4",
                        Encoding::CmsLab,
                        Encoding::PcsV4,
                        StageOp::LabInput {
                            white: first.white_point,
                            adapt,
                        },
                    ));
                    self.cursor = Encoding::PcsV4;
                }
                ProfileKind::Xyz => {
                    self.stages.push(Stage::new(
                        "cmsXYZ2PCSXYZ",
                        Encoding::CmsXyz,
                        Encoding::PcsXyz,
                        StageOp::XyzInput,
                    ));
                    self.cursor = Encoding::PcsXyz;
                }
                _ => {
                    if self.opts.data_format == DataFormat::Object {
                        let divisor = match kind {
                            ProfileKind::Cmyk => 100.0,
                            _ => 255.0,
                        };
                        let in_enc = self.input_encoding();
                        self.stages.push(Stage::new(
                            "input2device",
                            in_enc,
                            Encoding::Device,
                            StageOp::ObjectToDevice { divisor },
                        ));
                    }
                    self.cursor = Encoding::Device;
                }
            },
            DataFormat::Int8 | DataFormat::Int16 => {
                let divisor = if self.opts.data_format == DataFormat::Int8 {
                    255.0
                } else {
                    65535.0
                };
                self.stages.push(Stage::new(
                    "int_to_device",
                    Encoding::Device,
                    self.pcs_device_encoding(&first),
                    StageOp::IntToDevice { divisor },
                ));
                self.cursor = self.pcs_device_encoding(&first);
            }
            DataFormat::Device => {
                self.cursor = self.pcs_device_encoding(&first);
            }
        }
        Ok(())
    }

    fn build_hop(&mut self, hop: usize) -> Result<(), CmsError> {
        let pin = self.chain.profiles[hop].clone();
        let pout = self.chain.profiles[hop + 1].clone();
        let intent = self.chain.intents[hop];

        self.push_custom(StageAnchor::BeforeDevice2Pcs(Some(hop)), self.cursor);
        self.device_to_pcs(&pin, intent)?;
        self.push_custom(StageAnchor::AfterDevice2Pcs(Some(hop)), self.cursor);

        if intent == RenderingIntent::AbsoluteColorimetric {
            self.ensure(Encoding::PcsXyz)?;
            self.stages.push(Stage::new(
                "absoluteAdaptationIn",
                Encoding::PcsXyz,
                Encoding::PcsXyz,
                StageOp::Matrix {
                    m: Matrix3d::diagonal(pin.absolute_scale_in()),
                    bias: Vector3d::ZERO,
                    clip: false,
                },
            ));
        }

        if bpc::bpc_enabled(self.opts, hop, intent, &pin, &pout) {
            let in_black = bpc::detect_input_black(&pin, intent)?;
            let out_black = bpc::detect_output_black(&pout, intent)?;
            if let Some((scale, offset)) = bpc::bpc_params(in_black, out_black) {
                self.note(format!(
                    "hop {hop}: BPC {:?} -> {:?}",
                    in_black, out_black
                ));
                self.ensure(Encoding::PcsXyz)?;
                self.stages.push(Stage::new(
                    "bpc",
                    Encoding::PcsXyz,
                    Encoding::PcsXyz,
                    StageOp::Bpc { scale, offset },
                ));
            }
        }

        if self.opts.display_chromatic_adaptation && pin.white_point != pout.white_point {
            if let Some(m) = adaption_matrix(pin.white_point, pout.white_point) {
                self.ensure(Encoding::PcsXyz)?;
                self.stages.push(Stage::new(
                    "chromaticAdaptation",
                    Encoding::PcsXyz,
                    Encoding::PcsXyz,
                    StageOp::Matrix {
                        m,
                        bias: Vector3d::ZERO,
                        clip: false,
                    },
                ));
            }
        }

        self.push_custom(StageAnchor::Pcs(Some(hop)), self.cursor);

        if intent == RenderingIntent::AbsoluteColorimetric {
            self.ensure(Encoding::PcsXyz)?;
            self.stages.push(Stage::new(
                "absoluteAdaptationOut",
                Encoding::PcsXyz,
                Encoding::PcsXyz,
                StageOp::Matrix {
                    m: Matrix3d::diagonal(pout.absolute_scale_out()),
                    bias: Vector3d::ZERO,
                    clip: false,
                },
            ));
        }

        self.push_custom(StageAnchor::BeforePcs2Device(Some(hop)), self.cursor);
        self.pcs_to_device(&pout, intent)?;
        self.push_custom(StageAnchor::AfterPcs2Device(Some(hop)), self.cursor);
        Ok(())
    }

    fn device_to_pcs(&mut self, pin: &ColorProfile, intent: RenderingIntent) -> Result<(), CmsError> {
        match pin.kind() {
            ProfileKind::Lab => {
                let target = self.pcs_device_encoding(pin);
                self.ensure(target)
            }
            ProfileKind::Xyz => self.ensure(Encoding::PcsXyz),
            ProfileKind::RgbMatrix => {
                let trc = [&pin.red_trc, &pin.green_trc, &pin.blue_trc];
                if let Some(curves) = gather_curves(&trc) {
                    self.stages.push(Stage::new(
                        "curves",
                        Encoding::Device,
                        Encoding::Device,
                        StageOp::Curves {
                            curves,
                            inverse: false,
                        },
                    ));
                }
                let m = pin
                    .rgb_to_xyz
                    .ok_or(CmsError::UnsupportedProfileConnection)?;
                self.stages.push(Stage::new(
                    "matrix_rgb",
                    Encoding::Device,
                    Encoding::PcsXyz,
                    StageOp::Matrix {
                        m: m.mul_scalar(1.0 / PCS_XYZ_SCALE),
                        bias: Vector3d::ZERO,
                        clip: false,
                    },
                ));
                self.cursor = Encoding::PcsXyz;
                Ok(())
            }
            ProfileKind::Gray if pin.a2b_for(intent).is_none() => {
                let out = if pin.pcs == DataColorSpace::Lab {
                    Encoding::PcsV4
                } else {
                    Encoding::PcsXyz
                };
                let curve = pin.gray_trc.clone().filter(|c| !c.is_identity());
                self.stages.push(Stage::new(
                    "gray2pcs",
                    Encoding::Device,
                    out,
                    StageOp::GrayToPcs { curve },
                ));
                self.cursor = out;
                Ok(())
            }
            _ => {
                let lut = pin
                    .a2b_for(intent)
                    .ok_or(CmsError::ProfileMissingLut("A2B"))?
                    .clone();
                self.push_lut_a2b(pin, &lut)
            }
        }
    }

    fn pcs_to_device(&mut self, pout: &ColorProfile, intent: RenderingIntent) -> Result<(), CmsError> {
        match pout.kind() {
            ProfileKind::Lab => {
                let target = self.pcs_device_encoding(pout);
                self.ensure(target)
            }
            ProfileKind::Xyz => self.ensure(Encoding::PcsXyz),
            ProfileKind::RgbMatrix => {
                self.ensure(Encoding::PcsXyz)?;
                let m = pout
                    .xyz_to_rgb
                    .ok_or(CmsError::UnsupportedProfileConnection)?;
                self.stages.push(Stage::new(
                    "matrix_rgb",
                    Encoding::PcsXyz,
                    Encoding::Device,
                    StageOp::Matrix {
                        m: m.mul_scalar(PCS_XYZ_SCALE),
                        bias: Vector3d::ZERO,
                        clip: self.opts.clip_rgb_in_pipeline,
                    },
                ));
                self.cursor = Encoding::Device;
                let trc = [&pout.red_trc, &pout.green_trc, &pout.blue_trc];
                if let Some(curves) = gather_curves(&trc) {
                    self.stages.push(Stage::new(
                        "curves_inverse",
                        Encoding::Device,
                        Encoding::Device,
                        StageOp::Curves {
                            curves,
                            inverse: true,
                        },
                    ));
                }
                Ok(())
            }
            ProfileKind::Gray if pout.b2a_for(intent).is_none() => {
                let inp = if pout.pcs == DataColorSpace::Lab {
                    Encoding::PcsV4
                } else {
                    Encoding::PcsXyz
                };
                self.ensure(inp)?;
                let curve = pout.gray_trc.clone().filter(|c| !c.is_identity());
                self.stages.push(Stage::new(
                    "pcs2gray",
                    inp,
                    Encoding::Device,
                    StageOp::PcsToGray { curve },
                ));
                self.cursor = Encoding::Device;
                Ok(())
            }
            _ => {
                let lut = pout
                    .b2a_for(intent)
                    .ok_or(CmsError::ProfileMissingLut("B2A"))?
                    .clone();
                self.push_lut_b2a(pout, &lut)
            }
        }
    }

    fn lut_pcs_encoding(&self, profile: &ColorProfile) -> Encoding {
        if profile.pcs == DataColorSpace::Xyz {
            Encoding::PcsXyz
        } else if profile.version == ProfileVersion::V2 {
            Encoding::PcsV2
        } else {
            Encoding::PcsV4
        }
    }

    fn interp_stage(&self, lut: &Clut, in_enc: Encoding) -> Stage {
        let method_3d = if in_enc.is_lab_pcs() {
            // tetrahedral indexing biases visibly when the axis is Lab L
            InterpolationMethod::Trilinear
        } else {
            self.opts.interpolation_3d
        };
        Stage::new(
            "interp",
            Encoding::Device,
            Encoding::Device,
            StageOp::Interp {
                lut: Arc::new(lut.clone()),
                method_3d,
                method_4d: self.opts.interpolation_4d,
            },
        )
    }

    fn push_lut_a2b(&mut self, pin: &ColorProfile, lut: &ProfileLut) -> Result<(), CmsError> {
        let pcs_enc = self.lut_pcs_encoding(pin);
        let mut sub: Vec<Stage> = Vec::new();
        if let Some(curves) = lut.a_curves.as_ref().and_then(non_identity_curves) {
            let name = if lut.m_curves.is_some() || lut.matrix.is_some() {
                "aCurves"
            } else {
                "inputCurve"
            };
            sub.push(Stage::new(
                name,
                Encoding::Device,
                Encoding::Device,
                StageOp::Curves {
                    curves,
                    inverse: false,
                },
            ));
        }
        if let Some(clut) = &lut.clut {
            sub.push(self.interp_stage(clut, Encoding::Device));
        }
        if let Some(curves) = lut.m_curves.as_ref().and_then(non_identity_curves) {
            sub.push(Stage::new(
                "mCurves",
                Encoding::Device,
                Encoding::Device,
                StageOp::Curves {
                    curves,
                    inverse: false,
                },
            ));
        }
        if let Some((m, bias)) = &lut.matrix {
            if !m.test_equality(Matrix3d::IDENTITY) || *bias != Vector3d::ZERO {
                sub.push(Stage::new(
                    "matrix_v4",
                    Encoding::Device,
                    Encoding::Device,
                    StageOp::Matrix {
                        m: *m,
                        bias: *bias,
                        clip: false,
                    },
                ));
            }
        }
        if let Some(curves) = lut.b_curves.as_ref().and_then(non_identity_curves) {
            let name = if lut.m_curves.is_some() || lut.matrix.is_some() {
                "bCurves"
            } else {
                "outputCurve"
            };
            sub.push(Stage::new(
                name,
                Encoding::Device,
                Encoding::Device,
                StageOp::Curves {
                    curves,
                    inverse: false,
                },
            ));
        }
        if sub.is_empty() {
            return Err(CmsError::ProfileMissingLut("A2B"));
        }
        if let Some(last) = sub.last_mut() {
            last.out_encoding = pcs_enc;
        }
        self.stages.append(&mut sub);
        self.cursor = pcs_enc;
        Ok(())
    }

    fn push_lut_b2a(&mut self, pout: &ColorProfile, lut: &ProfileLut) -> Result<(), CmsError> {
        let pcs_enc = self.lut_pcs_encoding(pout);
        self.ensure(pcs_enc)?;
        let mut sub: Vec<Stage> = Vec::new();
        if let Some(curves) = lut.b_curves.as_ref().and_then(non_identity_curves) {
            let name = if lut.m_curves.is_some() || lut.matrix.is_some() {
                "bCurves"
            } else {
                "inputCurve"
            };
            sub.push(Stage::new(
                name,
                Encoding::Device,
                Encoding::Device,
                StageOp::Curves {
                    curves,
                    inverse: false,
                },
            ));
        }
        if let Some((m, bias)) = &lut.matrix {
            if !m.test_equality(Matrix3d::IDENTITY) || *bias != Vector3d::ZERO {
                sub.push(Stage::new(
                    "matrix_v4",
                    Encoding::Device,
                    Encoding::Device,
                    StageOp::Matrix {
                        m: *m,
                        bias: *bias,
                        clip: false,
                    },
                ));
            }
        }
        if let Some(curves) = lut.m_curves.as_ref().and_then(non_identity_curves) {
            sub.push(Stage::new(
                "mCurves",
                Encoding::Device,
                Encoding::Device,
                StageOp::Curves {
                    curves,
                    inverse: false,
                },
            ));
        }
        if let Some(clut) = &lut.clut {
            sub.push(self.interp_stage(clut, pcs_enc));
        }
        if let Some(curves) = lut.a_curves.as_ref().and_then(non_identity_curves) {
            let name = if lut.m_curves.is_some() || lut.matrix.is_some() {
                "aCurves"
            } else {
                "outputCurve"
            };
            sub.push(Stage::new(
                name,
                Encoding::Device,
                Encoding::Device,
                StageOp::Curves {
                    curves,
                    inverse: false,
                },
            ));
        }
        if sub.is_empty() {
            return Err(CmsError::ProfileMissingLut("B2A"));
        }
        if let Some(first_stage) = sub.first_mut() {
            first_stage.in_encoding = pcs_enc;
        }
        self.stages.append(&mut sub);
        self.cursor = Encoding::Device;
        Ok(())
    }

    // Phase D
    fn phase_output_encode(&mut self) -> Result<(), CmsError> {
        let last = self.chain.last().clone();
        let kind = last.kind();
        match self.opts.data_format {
            DataFormat::Object | DataFormat::ObjectFloat => match kind {
                ProfileKind::Lab => {
                    // without lab_adaptation the emitted Lab is re-referenced
                    // to the profile's own media white
                    if !self.opts.lab_adaptation && last.white_point != D50_XYZ {
                        if let Some(m) = adaption_matrix(D50_XYZ, last.white_point) {
                            self.ensure(Encoding::PcsXyz)?;
                            self.stages.push(Stage::new(
                                "labAdaptation",
                                Encoding::PcsXyz,
                                Encoding::PcsXyz,
                                StageOp::Matrix {
                                    m,
                                    bias: Vector3d::ZERO,
                                    clip: false,
                                },
                            ));
                        }
                    }
                    self.ensure(Encoding::PcsV4)?;
                    let round = self.opts.data_format == DataFormat::Object
                        && self.opts.round_output;
                    self.stages.push(Stage::new(
                        "PCSv42cmsLab",
                        Encoding::PcsV4,
                        Encoding::CmsLab,
                        StageOp::LabOutput {
                            round,
                            precision: self.opts.precession,
                        },
                    ));
                    self.cursor = Encoding::CmsLab;
                }
                ProfileKind::Xyz => {
                    self.ensure(Encoding::PcsXyz)?;
                    self.stages.push(Stage::new(
                        "PCSXYZ2cmsXYZ",
                        Encoding::PcsXyz,
                        Encoding::CmsXyz,
                        StageOp::XyzOutput,
                    ));
                    self.cursor = Encoding::CmsXyz;
                }
                _ => {
                    if self.opts.data_format == DataFormat::Object {
                        let (scale, out_enc) = match kind {
                            ProfileKind::Cmyk => (100.0, Encoding::CmsCmyk),
                            ProfileKind::RgbMatrix | ProfileKind::RgbLut => {
                                (255.0, Encoding::CmsRgb)
                            }
                            _ => (255.0, Encoding::Device),
                        };
                        self.stages.push(Stage::new(
                            "device2output",
                            Encoding::Device,
                            out_enc,
                            StageOp::DeviceToObject {
                                scale,
                                round: self.opts.round_output,
                                precision: self.opts.precession,
                            },
                        ));
                        self.cursor = out_enc;
                    }
                }
            },
            DataFormat::Int8 | DataFormat::Int16 => {
                let scale = if self.opts.data_format == DataFormat::Int8 {
                    255.0
                } else {
                    65535.0
                };
                let in_enc = self.pcs_device_encoding(&last);
                self.ensure(in_enc)?;
                self.stages.push(Stage::new(
                    &format!("device{}_to_int", last.channels()),
                    in_enc,
                    Encoding::Device,
                    StageOp::DeviceToInt { scale, max: scale },
                ));
                self.cursor = Encoding::Device;
            }
            DataFormat::Device => {
                let target = self.pcs_device_encoding(&last);
                self.ensure(target)?;
            }
        }
        Ok(())
    }
}

fn gather_curves(trc: &[&Option<Trc>; 3]) -> Option<Vec<Trc>> {
    let curves: Vec<Trc> = trc
        .iter()
        .map(|c| (*c).clone().unwrap_or(Trc::Parametric(vec![1.0])))
        .collect();
    if curves.iter().all(|c| c.is_identity()) {
        None
    } else {
        Some(curves)
    }
}

fn non_identity_curves(curves: &Vec<Trc>) -> Option<Vec<Trc>> {
    if curves.is_empty() || curves.iter().all(|c| c.is_identity()) {
        None
    } else {
        Some(curves.clone())
    }
}
