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
use crate::err::CmsError;
use crate::profile::{ColorProfile, DataColorSpace, ProfileClass, ProfileVersion, RenderingIntent};
use crate::stage::{Stage, run_pipeline};
use serde::{Deserialize, Serialize};

/// Evaluates a device-to-device stage list over a regular grid, producing
/// the cached CLUT. Inputs and outputs stay in normalised device space,
/// so a fresh float bake carries unit input and output scales.
pub(crate) fn bake_stages(
    stages: &[Stage],
    input_channels: usize,
    output_channels: usize,
    grid: usize,
) -> Result<Clut, CmsError> {
    if !(1..=4).contains(&input_channels) {
        return Err(CmsError::UnsupportedLutArity(input_channels));
    }
    let nodes = grid.pow(input_channels as u32);
    let mut table = Vec::with_capacity(nodes * output_channels);
    let scale = 1.0 / (grid - 1) as f64;
    let mut input = vec![0f64; input_channels];
    for node in 0..nodes {
        // first channel owns the largest stride
        for (ch, slot) in input.iter_mut().enumerate() {
            let stride = grid.pow((input_channels - 1 - ch) as u32);
            *slot = ((node / stride) % grid) as f64 * scale;
        }
        let out = run_pipeline(stages, &input);
        if out.len() != output_channels {
            return Err(CmsError::LaneSizeMismatch);
        }
        for v in out {
            table.push(v as f32);
        }
    }
    Clut::new(
        input_channels,
        output_channels,
        vec![grid; input_channels],
        table,
    )
}

/// Profile stripped to its identifying fields for the persisted chain.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimplifiedProfile {
    pub description: String,
    pub class: String,
    pub color_space: String,
    pub pcs: String,
    pub version: u8,
    pub channels: usize,
}

impl SimplifiedProfile {
    pub fn from_profile(profile: &ColorProfile) -> SimplifiedProfile {
        SimplifiedProfile {
            description: profile.description.clone(),
            class: profile.profile_class.as_str().to_owned(),
            color_space: profile.color_space.as_str().to_owned(),
            pcs: profile.pcs.as_str().to_owned(),
            version: profile.version.major(),
            channels: profile.channels(),
        }
    }

    /// Rebuilds a bare value object carrying just enough for the minimal
    /// cached-LUT pipeline: spaces, version, class.
    pub(crate) fn to_profile(&self) -> Result<ColorProfile, CmsError> {
        let space = DataColorSpace::from_name(&self.color_space).ok_or_else(|| {
            CmsError::MalformedLutRecord(format!("unknown color space '{}'", self.color_space))
        })?;
        let pcs = DataColorSpace::from_name(&self.pcs).ok_or_else(|| {
            CmsError::MalformedLutRecord(format!("unknown PCS '{}'", self.pcs))
        })?;
        let mut profile = match space {
            DataColorSpace::Lab => ColorProfile::new_lab_d50(),
            DataColorSpace::Xyz => ColorProfile::new_xyz(),
            DataColorSpace::Gray => ColorProfile::new_gray_with_gamma(1.0),
            _ => {
                // device spaces only need their channel arity here
                let mut p = ColorProfile::new_lab_d50();
                p.color_space = space;
                p
            }
        };
        profile.pcs = pcs;
        profile.version = if self.version >= 4 {
            ProfileVersion::V4
        } else {
            ProfileVersion::V2
        };
        if let Some(class) = ProfileClass::from_name(&self.class) {
            profile.profile_class = class;
        }
        profile.description = self.description.clone();
        Ok(profile)
    }
}

/// One entry of the persisted chain: an intent code or a simplified profile.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LutChainEntry {
    Intent(u8),
    Profile(SimplifiedProfile),
}

/// The persisted pre-built CLUT record. Strides are stored precomputed so
/// consumers can index the payload without re-deriving them.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PrebuiltLut {
    pub chain: Vec<LutChainEntry>,
    pub version: u32,
    pub input_channels: usize,
    pub output_channels: usize,
    pub grid_points: Vec<usize>,
    pub g1: usize,
    pub g2: usize,
    pub g3: usize,
    pub go0: usize,
    pub go1: usize,
    pub go2: usize,
    pub go3: usize,
    #[serde(rename = "CLUT")]
    pub clut: Vec<f32>,
    pub encoding: String,
    pub precision: Option<u8>,
    pub input_scale: f64,
    pub output_scale: f64,
}

pub(crate) const PREBUILT_LUT_VERSION: u32 = 1;

impl PrebuiltLut {
    pub(crate) fn from_clut(
        clut: &Clut,
        chain: Vec<LutChainEntry>,
        precision: Option<u8>,
    ) -> PrebuiltLut {
        let g = clut.grid();
        let [go0, go1, go2, go3] = clut.output_strides();
        let (payload, output_scale) = match precision {
            Some(8) => (
                clut.table
                    .iter()
                    .map(|v| (v.clamp(0.0, 1.0) * 255.0).round())
                    .collect(),
                clut.output_scale / 255.0,
            ),
            Some(16) => (
                clut.table
                    .iter()
                    .map(|v| (v.clamp(0.0, 1.0) * 65535.0).round())
                    .collect(),
                clut.output_scale / 65535.0,
            ),
            _ => (clut.table.clone(), clut.output_scale),
        };
        PrebuiltLut {
            chain,
            version: PREBUILT_LUT_VERSION,
            input_channels: clut.input_channels,
            output_channels: clut.output_channels,
            grid_points: clut.grid_points.clone(),
            g1: 1,
            g2: g,
            g3: g * g,
            go0,
            go1,
            go2,
            go3,
            clut: payload,
            encoding: "number".to_owned(),
            precision: precision.filter(|p| *p == 8 || *p == 16),
            input_scale: clut.input_scale,
            output_scale,
        }
    }

    /// Chain shape checks run again on attachment: at least three entries,
    /// profile-shaped ends, an intent in the penultimate slot.
    pub(crate) fn validate(&self) -> Result<(), CmsError> {
        if self.chain.len() < 3 {
            return Err(CmsError::LutChainTooShort(self.chain.len()));
        }
        if !matches!(self.chain.first(), Some(LutChainEntry::Profile(_))) {
            return Err(CmsError::ChainExpectedProfile(0));
        }
        if !matches!(self.chain.last(), Some(LutChainEntry::Profile(_))) {
            return Err(CmsError::ChainExpectedProfile(self.chain.len() - 1));
        }
        if !matches!(
            self.chain.get(self.chain.len() - 2),
            Some(LutChainEntry::Intent(_))
        ) {
            return Err(CmsError::ChainExpectedIntent(self.chain.len() - 2));
        }
        if self.clut.is_empty() {
            return Err(CmsError::LutMissingPayload);
        }
        match self.encoding.as_str() {
            "number" => Ok(()),
            // base64 payloads are decoded by an outer collaborator
            other => Err(CmsError::UnknownLutEncoding(other.to_owned())),
        }
    }

    pub(crate) fn to_clut(&self) -> Result<Clut, CmsError> {
        self.validate()?;
        let mut clut = Clut::new(
            self.input_channels,
            self.output_channels,
            self.grid_points.clone(),
            self.clut.clone(),
        )?;
        clut.input_scale = self.input_scale;
        clut.output_scale = self.output_scale;
        clut.precision = self.precision;
        Ok(clut)
    }

    pub(crate) fn endpoints(&self) -> Result<(ColorProfile, ColorProfile), CmsError> {
        let first = match self.chain.first() {
            Some(LutChainEntry::Profile(p)) => p.to_profile()?,
            _ => return Err(CmsError::ChainExpectedProfile(0)),
        };
        let last = match self.chain.last() {
            Some(LutChainEntry::Profile(p)) => p.to_profile()?,
            _ => return Err(CmsError::ChainExpectedProfile(self.chain.len() - 1)),
        };
        Ok((first, last))
    }

    pub(crate) fn intent(&self) -> RenderingIntent {
        match self.chain.get(self.chain.len() - 2) {
            Some(LutChainEntry::Intent(code)) => {
                RenderingIntent::from_code(*code).unwrap_or_default()
            }
            _ => RenderingIntent::default(),
        }
    }

    pub fn to_json(&self) -> Result<String, CmsError> {
        serde_json::to_string(self).map_err(|e| CmsError::MalformedLutRecord(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<PrebuiltLut, CmsError> {
        serde_json::from_str(json).map_err(|e| CmsError::MalformedLutRecord(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::Encoding;
    use crate::stage::StageOp;

    fn device_chain() -> Vec<LutChainEntry> {
        let srgb = SimplifiedProfile::from_profile(&ColorProfile::new_srgb());
        let lab = SimplifiedProfile::from_profile(&ColorProfile::new_lab_d50());
        vec![
            LutChainEntry::Profile(srgb),
            LutChainEntry::Intent(1),
            LutChainEntry::Profile(lab),
        ]
    }

    #[test]
    fn test_bake_identity_stage_list() {
        // single null stage: the baked table reproduces the grid itself
        let stages = vec![Stage::new(
            "stage_null",
            Encoding::Device,
            Encoding::Device,
            StageOp::Null,
        )];
        let clut = bake_stages(&stages, 3, 3, 5).unwrap();
        assert_eq!(clut.grid(), 5);
        assert_eq!(clut.input_scale, 1.0);
        assert_eq!(clut.output_scale, 1.0);
        // node (1, 0, 0)
        let idx = 25 * 3;
        assert!((clut.table[idx] - 0.25).abs() < 1e-7);
        assert!(clut.table[idx + 1].abs() < 1e-7);
    }

    #[test]
    fn test_prebuilt_roundtrip_json() {
        let clut = Clut::identity(3, 3).unwrap();
        let lut = PrebuiltLut::from_clut(&clut, device_chain(), None);
        let json = lut.to_json().unwrap();
        let back = PrebuiltLut::from_json(&json).unwrap();
        assert_eq!(back.version, 1);
        assert_eq!(back.chain, lut.chain);
        assert_eq!(back.clut, lut.clut);
        assert_eq!(back.go0, 3);
        assert_eq!(back.go1, 9);
    }

    #[test]
    fn test_quantised_export_preserves_roundtrip_scale() {
        let clut = Clut::identity(3, 3).unwrap();
        let lut = PrebuiltLut::from_clut(&clut, device_chain(), Some(8));
        assert_eq!(lut.precision, Some(8));
        // stored values are raw 0..255, the scale folds them back
        assert_eq!(lut.clut[lut.clut.len() - 1], 255.0);
        let attached = lut.to_clut().unwrap();
        assert!((attached.output_scale * 255.0 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_validate_rejects_malformed_chains() {
        let clut = Clut::identity(3, 3).unwrap();
        let mut lut = PrebuiltLut::from_clut(&clut, device_chain(), None);
        lut.chain.truncate(2);
        assert!(matches!(
            lut.validate(),
            Err(CmsError::LutChainTooShort(2))
        ));

        let mut lut = PrebuiltLut::from_clut(&clut, device_chain(), None);
        lut.encoding = "base64".to_owned();
        assert!(matches!(
            lut.validate(),
            Err(CmsError::UnknownLutEncoding(_))
        ));

        let mut lut = PrebuiltLut::from_clut(&clut, device_chain(), None);
        lut.clut.clear();
        assert!(matches!(lut.validate(), Err(CmsError::LutMissingPayload)));
    }
}
