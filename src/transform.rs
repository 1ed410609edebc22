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
use crate::baker::{LutChainEntry, PrebuiltLut, SimplifiedProfile, bake_stages};
use crate::clut::Clut;
use crate::encoding::Encoding;
use crate::err::CmsError;
use crate::interp::{AlphaMode, InterpolationMethod, transform_buffer_via_lut};
use crate::lab::Lab;
use crate::matrix::Xyz;
use crate::optimize::optimise_stages;
use crate::pipeline::{PipelineBuilder, ResolvedChain, validate_chain, validate_stages};
use crate::profile::{ColorProfile, RenderingIntent};
use crate::stage::{CustomStage, Stage, StageOp};
use num_traits::AsPrimitive;
use std::sync::{Arc, Mutex};

/// I/O representation the transform consumes and produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataFormat {
    /// Structured values in device ranges: RGB 0-255, CMYK 0-100, Lab.
    #[default]
    Object,
    /// Structured values with unit-range device components.
    ObjectFloat,
    Int8,
    Int16,
    /// Bare floats in [0, 1].
    Device,
}

impl DataFormat {
    pub fn from_name(name: &str) -> Result<DataFormat, CmsError> {
        match name {
            "object" => Ok(DataFormat::Object),
            "objectFloat" => Ok(DataFormat::ObjectFloat),
            "int8" => Ok(DataFormat::Int8),
            "int16" => Ok(DataFormat::Int16),
            "device" => Ok(DataFormat::Device),
            _ => Err(CmsError::UnsupportedDataFormat(name.to_owned())),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            DataFormat::Object => "object",
            DataFormat::ObjectFloat => "objectFloat",
            DataFormat::Int8 => "int8",
            DataFormat::Int16 => "int16",
            DataFormat::Device => "device",
        }
    }
}

/// Black point compensation policy: the auto-enable heuristics, a global
/// switch, or a per-hop list.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum BpcMode {
    #[default]
    Auto,
    All(bool),
    PerHop(Vec<bool>),
}

#[derive(Clone, Debug)]
pub struct TransformOptions {
    /// Bake the whole pipeline into a cached CLUT during `create`.
    pub built_lut: bool,
    pub lut_grid_points_3d: usize,
    pub lut_grid_points_4d: usize,
    pub interpolation_3d: InterpolationMethod,
    pub interpolation_4d: InterpolationMethod,
    /// Sampler used against a cached CLUT.
    pub lut_interpolation_3d: InterpolationMethod,
    pub lut_interpolation_4d: InterpolationMethod,
    /// Channel-specialised interpolators on the bulk paths.
    pub interpolation_fast: bool,
    pub data_format: DataFormat,
    /// Adapt output Lab onto D50.
    pub lab_adaptation: bool,
    /// Adapt the incoming cmsLab white point onto D50.
    pub lab_input_adaptation: bool,
    /// Insert PCS-space Bradford between profiles with differing media
    /// white points.
    pub display_chromatic_adaptation: bool,
    pub pipeline_debug: bool,
    pub optimise: bool,
    pub round_output: bool,
    /// Decimal places kept when rounding object outputs.
    pub precession: u32,
    pub bpc: BpcMode,
    /// Clip RGB to [0, 1] inside matrix stages.
    pub clip_rgb_in_pipeline: bool,
    pub verbose: bool,
    /// Off for the temporary transforms black-point detection spawns.
    pub allow_bpc_auto: bool,
}

impl Default for TransformOptions {
    fn default() -> Self {
        TransformOptions {
            built_lut: false,
            lut_grid_points_3d: 33,
            lut_grid_points_4d: 17,
            interpolation_3d: InterpolationMethod::Tetrahedral,
            interpolation_4d: InterpolationMethod::Tetrahedral,
            lut_interpolation_3d: InterpolationMethod::Tetrahedral,
            lut_interpolation_4d: InterpolationMethod::Tetrahedral,
            interpolation_fast: true,
            data_format: DataFormat::Object,
            lab_adaptation: false,
            lab_input_adaptation: true,
            display_chromatic_adaptation: false,
            pipeline_debug: false,
            optimise: true,
            round_output: true,
            precession: 0,
            bpc: BpcMode::Auto,
            clip_rgb_in_pipeline: false,
            verbose: false,
            allow_bpc_auto: true,
        }
    }
}

/// One slot of a transform chain: a profile value object, an intent, or a
/// `*Name` virtual-profile reference.
#[derive(Clone, Debug)]
pub enum ChainEntry {
    Profile(Arc<ColorProfile>),
    Intent(RenderingIntent),
    Named(String),
}

/// A single input or output value in the configured data format.
#[derive(Clone, Debug, PartialEq)]
pub enum ColorValue {
    Lab(Lab),
    Rgb([f64; 3]),
    Cmyk([f64; 4]),
    Xyz(Xyz),
    Gray(f64),
    Values(Vec<f64>),
}

impl ColorValue {
    pub fn to_components(&self) -> Vec<f64> {
        match self {
            ColorValue::Lab(lab) => vec![lab.l, lab.a, lab.b],
            ColorValue::Rgb(rgb) => rgb.to_vec(),
            ColorValue::Cmyk(cmyk) => cmyk.to_vec(),
            ColorValue::Xyz(xyz) => vec![xyz.x, xyz.y, xyz.z],
            ColorValue::Gray(g) => vec![*g],
            ColorValue::Values(v) => v.clone(),
        }
    }
}

/// The transform engine root. Owns the chain, the stage list built by
/// `create`, the optional cached CLUT and the debug buffers.
///
/// `create` runs once per instance. After it succeeds the stage list is
/// frozen; repeated `forward` calls from several threads are sound while
/// `pipeline_debug` stays off (the debug buffers sit behind a mutex).
pub struct Transform {
    pub options: TransformOptions,
    chain: Option<ResolvedChain>,
    stages: Vec<Stage>,
    created: bool,
    cached_lut: Option<Arc<Clut>>,
    cached_chain: Option<Vec<LutChainEntry>>,
    input_channels: usize,
    output_channels: usize,
    optimise_log: Vec<String>,
    optimise_passes: usize,
    build_notes: Vec<String>,
    debug_history: Mutex<Vec<String>>,
    pipeline_history: Mutex<Vec<Vec<f64>>>,
}

impl Transform {
    pub fn new(options: TransformOptions) -> Transform {
        Transform {
            options,
            chain: None,
            stages: Vec::new(),
            created: false,
            cached_lut: None,
            cached_chain: None,
            input_channels: 0,
            output_channels: 0,
            optimise_log: Vec::new(),
            optimise_passes: 0,
            build_notes: Vec::new(),
            debug_history: Mutex::new(Vec::new()),
            pipeline_history: Mutex::new(Vec::new()),
        }
    }

    /// Two-profile convenience over `create_multi_stage`.
    pub fn create(
        &mut self,
        input: ColorProfile,
        output: ColorProfile,
        intent: RenderingIntent,
        custom_stages: &[CustomStage],
    ) -> Result<(), CmsError> {
        self.create_multi_stage(
            vec![
                ChainEntry::Profile(Arc::new(input)),
                ChainEntry::Intent(intent),
                ChainEntry::Profile(Arc::new(output)),
            ],
            custom_stages,
        )
    }

    /// Builds the stage list for an N-profile chain, runs the optimiser
    /// and optionally bakes the cached CLUT.
    pub fn create_multi_stage(
        &mut self,
        chain: Vec<ChainEntry>,
        custom_stages: &[CustomStage],
    ) -> Result<(), CmsError> {
        let resolved = validate_chain(&chain)?;
        self.input_channels = resolved.first().channels();
        self.output_channels = resolved.last().channels();

        if let Some(lut) = self.cached_lut.clone() {
            let builder = PipelineBuilder::new(&self.options, &resolved, &[]);
            let (stages, notes) = builder.build_minimal(lut)?;
            self.install_stages(stages, notes)?;
        } else {
            let builder = PipelineBuilder::new(&self.options, &resolved, custom_stages);
            let (stages, notes) = builder.build()?;
            self.install_stages(stages, notes)?;

            if self.options.built_lut {
                self.bake_cached_lut(&resolved, custom_stages)?;
                let lut = self
                    .cached_lut
                    .clone()
                    .ok_or(CmsError::LutMissingPayload)?;
                let builder = PipelineBuilder::new(&self.options, &resolved, &[]);
                let (stages, notes) = builder.build_minimal(lut)?;
                self.install_stages(stages, notes)?;
            }
        }

        self.chain = Some(resolved);
        self.created = true;
        Ok(())
    }

    fn install_stages(&mut self, mut stages: Vec<Stage>, notes: Vec<String>) -> Result<(), CmsError> {
        self.build_notes.extend(notes);
        if self.options.optimise {
            self.optimise_passes = optimise_stages(&mut stages, &mut self.optimise_log);
            validate_stages(&stages)?;
        }
        self.stages = stages;
        Ok(())
    }

    /// Evaluates the device-to-device semantics of the chain over a
    /// regular grid. Custom stages are baked into the table.
    fn bake_cached_lut(
        &mut self,
        resolved: &ResolvedChain,
        custom_stages: &[CustomStage],
    ) -> Result<(), CmsError> {
        let mut bake_opts = self.options.clone();
        bake_opts.data_format = DataFormat::Device;
        bake_opts.built_lut = false;
        bake_opts.pipeline_debug = false;
        bake_opts.verbose = false;
        let builder = PipelineBuilder::new(&bake_opts, resolved, custom_stages);
        let (mut stages, _) = builder.build()?;
        if self.options.optimise {
            let mut scratch = Vec::new();
            optimise_stages(&mut stages, &mut scratch);
        }
        let grid = if self.input_channels == 4 {
            self.options.lut_grid_points_4d
        } else {
            self.options.lut_grid_points_3d
        };
        let clut = bake_stages(&stages, self.input_channels, self.output_channels, grid)?;
        self.cached_chain = Some(simplify_chain(resolved));
        self.cached_lut = Some(Arc::new(clut));
        Ok(())
    }

    /// Attaches a previously exported CLUT. The transform becomes usable
    /// immediately; a later `create` swaps in the real chain but keeps
    /// the single-lookup pipeline.
    pub fn set_lut(&mut self, lut: PrebuiltLut) -> Result<(), CmsError> {
        let clut = Arc::new(lut.to_clut()?);
        let resolved = match self.chain.clone() {
            Some(resolved) => resolved,
            None => {
                let (first, last) = lut.endpoints()?;
                ResolvedChain {
                    profiles: vec![Arc::new(first), Arc::new(last)],
                    intents: vec![lut.intent()],
                }
            }
        };
        self.input_channels = clut.input_channels;
        self.output_channels = clut.output_channels;
        self.cached_chain = Some(lut.chain.clone());
        self.cached_lut = Some(clut.clone());
        let builder = PipelineBuilder::new(&self.options, &resolved, &[]);
        let (stages, notes) = builder.build_minimal(clut)?;
        self.install_stages(stages, notes)?;
        self.chain = Some(resolved);
        self.created = true;
        Ok(())
    }

    /// Exports the cached CLUT, baking it first when `create` ran without
    /// `built_lut`. Precision 8 or 16 quantises the payload.
    pub fn get_lut(&mut self, precision: Option<u8>) -> Result<PrebuiltLut, CmsError> {
        if !self.created {
            return Err(CmsError::NoPipeline);
        }
        if self.cached_lut.is_none() {
            let resolved = self.chain.clone().ok_or(CmsError::NoPipeline)?;
            self.bake_cached_lut(&resolved, &[])?;
        }
        let clut = self.cached_lut.as_ref().ok_or(CmsError::LutMissingPayload)?;
        let chain = match &self.cached_chain {
            Some(chain) => chain.clone(),
            None => Vec::new(),
        };
        Ok(PrebuiltLut::from_clut(clut, chain, precision))
    }

    pub fn get_lut_8(&mut self) -> Result<PrebuiltLut, CmsError> {
        self.get_lut(Some(8))
    }

    pub fn get_lut_16(&mut self) -> Result<PrebuiltLut, CmsError> {
        self.get_lut(Some(16))
    }

    /// Single conversion through the stage list.
    pub fn forward(&self, value: &ColorValue) -> Result<ColorValue, CmsError> {
        if !self.created {
            return Err(CmsError::NoPipeline);
        }
        let mut current = value.to_components();
        let mut next = Vec::new();
        let debug = self.options.pipeline_debug;
        for stage in &self.stages {
            stage.apply(&current, &mut next);
            if debug {
                if let Ok(mut history) = self.debug_history.lock() {
                    history.push(stage.debug_line(&current, &next));
                }
                if let Ok(mut history) = self.pipeline_history.lock() {
                    history.push(next.clone());
                }
            }
            std::mem::swap(&mut current, &mut next);
        }
        let out_encoding = self
            .stages
            .last()
            .map(|s| s.out_encoding)
            .unwrap_or(Encoding::Device);
        Ok(self.wrap_output(out_encoding, current))
    }

    fn wrap_output(&self, encoding: Encoding, values: Vec<f64>) -> ColorValue {
        match encoding {
            Encoding::CmsLab => ColorValue::Lab(Lab::new(values[0], values[1], values[2])),
            Encoding::CmsRgb => ColorValue::Rgb([values[0], values[1], values[2]]),
            Encoding::CmsCmyk => {
                ColorValue::Cmyk([values[0], values[1], values[2], values[3]])
            }
            Encoding::CmsXyz => ColorValue::Xyz(Xyz::new(values[0], values[1], values[2])),
            _ => match self.options.data_format {
                DataFormat::Object if values.len() == 1 => ColorValue::Gray(values[0]),
                DataFormat::ObjectFloat => match values.len() {
                    1 => ColorValue::Gray(values[0]),
                    3 => ColorValue::Rgb([values[0], values[1], values[2]]),
                    4 => ColorValue::Cmyk([values[0], values[1], values[2], values[3]]),
                    _ => ColorValue::Values(values),
                },
                _ => ColorValue::Values(values),
            },
        }
    }

    /// Bulk conversion of structured values: the full stage list runs per
    /// entry.
    pub fn transform_values(&self, values: &[ColorValue]) -> Result<Vec<ColorValue>, CmsError> {
        values.iter().map(|v| self.forward(v)).collect()
    }

    pub fn transform_array_u8(
        &self,
        src: &[u8],
        in_alpha: bool,
        out_alpha: bool,
        preserve_alpha: bool,
        count: Option<usize>,
    ) -> Result<Vec<u8>, CmsError> {
        self.transform_array_numeric(src, in_alpha, out_alpha, preserve_alpha, count, 255u8, true)
    }

    pub fn transform_array_u16(
        &self,
        src: &[u16],
        in_alpha: bool,
        out_alpha: bool,
        preserve_alpha: bool,
        count: Option<usize>,
    ) -> Result<Vec<u16>, CmsError> {
        self.transform_array_numeric(
            src,
            in_alpha,
            out_alpha,
            preserve_alpha,
            count,
            65535u16,
            true,
        )
    }

    pub fn transform_array_f64(
        &self,
        src: &[f64],
        in_alpha: bool,
        out_alpha: bool,
        preserve_alpha: bool,
        count: Option<usize>,
    ) -> Result<Vec<f64>, CmsError> {
        self.transform_array_numeric(src, in_alpha, out_alpha, preserve_alpha, count, 1.0f64, false)
    }

    /// Bulk conversion that insists on the cached-CLUT fast path.
    pub fn transform_array_via_lut_u8(
        &self,
        src: &[u8],
        in_alpha: bool,
        out_alpha: bool,
        preserve_alpha: bool,
        count: Option<usize>,
    ) -> Result<Vec<u8>, CmsError> {
        let (lut, m3, m4) = self.bulk_lut().ok_or(CmsError::NoPipeline)?;
        transform_buffer_via_lut(
            lut,
            m3,
            m4,
            self.options.interpolation_fast,
            src,
            AlphaMode {
                in_alpha,
                out_alpha,
                preserve: preserve_alpha,
            },
            count,
            255u8,
            true,
        )
    }

    pub fn transform_array_via_lut_u16(
        &self,
        src: &[u16],
        in_alpha: bool,
        out_alpha: bool,
        preserve_alpha: bool,
        count: Option<usize>,
    ) -> Result<Vec<u16>, CmsError> {
        let (lut, m3, m4) = self.bulk_lut().ok_or(CmsError::NoPipeline)?;
        transform_buffer_via_lut(
            lut,
            m3,
            m4,
            self.options.interpolation_fast,
            src,
            AlphaMode {
                in_alpha,
                out_alpha,
                preserve: preserve_alpha,
            },
            count,
            65535u16,
            true,
        )
    }

    /// The folded single-lookup form of the pipeline, when it exists: an
    /// interp stage optionally followed by the compact int stage.
    fn bulk_lut(&self) -> Option<(&Arc<Clut>, InterpolationMethod, InterpolationMethod)> {
        self.cached_lut.as_ref()?;
        let mut found = None;
        for stage in &self.stages {
            match &stage.op {
                StageOp::Interp {
                    lut,
                    method_3d,
                    method_4d,
                } => {
                    if found.is_some() {
                        return None;
                    }
                    found = Some((lut, *method_3d, *method_4d));
                }
                StageOp::DeviceToInt { scale, .. } if *scale == 1.0 => {}
                _ => return None,
            }
        }
        found
    }

    fn transform_array_numeric<T>(
        &self,
        src: &[T],
        in_alpha: bool,
        out_alpha: bool,
        preserve_alpha: bool,
        count: Option<usize>,
        max_value: T,
        round: bool,
    ) -> Result<Vec<T>, CmsError>
    where
        T: Copy + 'static + AsPrimitive<f64>,
        f64: AsPrimitive<T>,
    {
        if !self.created {
            return Err(CmsError::NoPipeline);
        }
        let alpha = AlphaMode {
            in_alpha,
            out_alpha,
            preserve: preserve_alpha,
        };
        if let Some((lut, m3, m4)) = self.bulk_lut() {
            return transform_buffer_via_lut(
                lut,
                m3,
                m4,
                self.options.interpolation_fast,
                src,
                alpha,
                count,
                max_value,
                round,
            );
        }

        let in_stride = self.input_channels + usize::from(in_alpha);
        let out_stride = self.output_channels + usize::from(out_alpha);
        let pixels = match count {
            Some(n) => {
                if src.len() < n * in_stride {
                    return Err(CmsError::LaneSizeMismatch);
                }
                n
            }
            None => {
                if src.len() % in_stride != 0 {
                    return Err(CmsError::LaneMultipleOfChannels);
                }
                src.len() / in_stride
            }
        };

        let mut dst = vec![max_value; pixels * out_stride];
        let mut pixel = vec![0f64; self.input_channels];
        let mut scratch = Vec::new();
        for (chunk, out) in src
            .chunks_exact(in_stride)
            .take(pixels)
            .zip(dst.chunks_exact_mut(out_stride))
        {
            for (p, s) in pixel.iter_mut().zip(chunk.iter()) {
                *p = s.as_();
            }
            let mut current = pixel.clone();
            for stage in &self.stages {
                stage.apply(&current, &mut scratch);
                std::mem::swap(&mut current, &mut scratch);
            }
            for (o, v) in out.iter_mut().zip(current.iter()) {
                let v = if round { v.round() } else { *v };
                *o = v.as_();
            }
            if out_alpha {
                out[self.output_channels] = if preserve_alpha && in_alpha {
                    chunk[self.input_channels]
                } else {
                    max_value
                };
            }
        }
        Ok(dst)
    }

    pub fn input_channels(&self) -> usize {
        self.input_channels
    }

    pub fn output_channels(&self) -> usize {
        self.output_channels
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn has_cached_lut(&self) -> bool {
        self.cached_lut.is_some()
    }

    /// "sRGB -> (relative) -> Lab" style description of the chain.
    pub fn chain_info(&self) -> String {
        let Some(chain) = &self.chain else {
            return String::new();
        };
        let mut parts = Vec::new();
        for (i, profile) in chain.profiles.iter().enumerate() {
            if i > 0 {
                parts.push(format!("({})", chain.intents[i - 1].as_str()));
            }
            let name = if profile.description.is_empty() {
                profile.color_space.as_str().to_owned()
            } else {
                profile.description.clone()
            };
            parts.push(name);
        }
        parts.join(" -> ")
    }

    pub fn stage_names(&self) -> String {
        self.stages
            .iter()
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>()
            .join(" -> ")
    }

    pub fn optimise_info(&self) -> String {
        let mut out = format!("{} pass(es)", self.optimise_passes);
        for line in &self.optimise_log {
            out.push('\n');
            out.push_str(line);
        }
        out
    }

    pub fn debug_info(&self) -> String {
        match self.debug_history.lock() {
            Ok(history) => history.join("\n"),
            Err(_) => String::new(),
        }
    }

    pub fn history_info(&self) -> String {
        match self.pipeline_history.lock() {
            Ok(history) => history
                .iter()
                .map(|v| format!("{v:?}"))
                .collect::<Vec<_>>()
                .join("\n"),
            Err(_) => String::new(),
        }
    }

    pub fn clear_debug(&self) {
        if let Ok(mut history) = self.debug_history.lock() {
            history.clear();
        }
        if let Ok(mut history) = self.pipeline_history.lock() {
            history.clear();
        }
    }
}

fn simplify_chain(resolved: &ResolvedChain) -> Vec<LutChainEntry> {
    let mut chain = Vec::with_capacity(resolved.profiles.len() + resolved.intents.len());
    for (i, profile) in resolved.profiles.iter().enumerate() {
        if i > 0 {
            chain.push(LutChainEntry::Intent(resolved.intents[i - 1].code()));
        }
        chain.push(LutChainEntry::Profile(SimplifiedProfile::from_profile(
            profile,
        )));
    }
    chain
}
