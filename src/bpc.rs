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
use crate::encoding::{Encoding, PCS_XYZ_SCALE, pcs_convert};
use crate::err::CmsError;
use crate::lab::{D50_XYZ, Lab};
use crate::matrix::{Matrix3d, Vector3d, Xyz};
use crate::profile::{ColorProfile, ProfileClass, ProfileKind, RenderingIntent};
use crate::transform::{ChainEntry, ColorValue, DataFormat, Transform, TransformOptions};
use std::sync::Arc;

/// The ICC v4 specification black for perceptual and saturation intents.
const V4_PERCEPTUAL_BLACK: Xyz = Xyz::new(0.00336, 0.0034731, 0.00287);

/// Per-hop compensation policy. Auto-enable fires for perceptual and
/// saturation hops touching a v4 profile and for kTRC-only Gray profiles;
/// absolute hops and Duo or RGB-matrix profiles never compensate.
pub(crate) fn bpc_enabled(
    opts: &TransformOptions,
    hop: usize,
    intent: RenderingIntent,
    pin: &ColorProfile,
    pout: &ColorProfile,
) -> bool {
    use crate::transform::BpcMode;
    if intent == RenderingIntent::AbsoluteColorimetric {
        return false;
    }
    if matches!(pin.kind(), ProfileKind::Duo | ProfileKind::RgbMatrix)
        || matches!(pout.kind(), ProfileKind::Duo | ProfileKind::RgbMatrix)
    {
        return false;
    }
    let auto = opts.allow_bpc_auto
        && ((matches!(
            intent,
            RenderingIntent::Perceptual | RenderingIntent::Saturation
        ) && (pin.is_v4() || pout.is_v4()))
            || (pin.kind() == ProfileKind::Gray
                && pin.gray_trc.is_some()
                && pin.a2b_for(intent).is_none()));
    match &opts.bpc {
        BpcMode::Auto => auto,
        BpcMode::All(enabled) => *enabled,
        BpcMode::PerHop(hops) => hops.get(hop).copied().unwrap_or(auto),
    }
}

/// Options for the temporary probe transforms. `allow_bpc_auto` is off so
/// black detection cannot recurse into itself.
fn probe_options() -> TransformOptions {
    TransformOptions {
        data_format: DataFormat::Device,
        allow_bpc_auto: false,
        built_lut: false,
        ..TransformOptions::default()
    }
}

fn lab_to_device_probe(
    profile: &ColorProfile,
    intent: RenderingIntent,
) -> Result<Transform, CmsError> {
    let mut t = Transform::new(probe_options());
    t.create_multi_stage(
        vec![
            ChainEntry::Profile(Arc::new(ColorProfile::new_lab_d50())),
            ChainEntry::Intent(intent),
            ChainEntry::Profile(Arc::new(profile.clone())),
        ],
        &[],
    )?;
    Ok(t)
}

fn device_to_lab_probe(
    profile: &ColorProfile,
    intent: RenderingIntent,
) -> Result<Transform, CmsError> {
    let mut t = Transform::new(probe_options());
    t.create_multi_stage(
        vec![
            ChainEntry::Profile(Arc::new(profile.clone())),
            ChainEntry::Intent(intent),
            ChainEntry::Profile(Arc::new(ColorProfile::new_lab_d50())),
        ],
        &[],
    )?;
    Ok(t)
}

fn forward_values(t: &Transform, values: Vec<f64>) -> Result<Vec<f64>, CmsError> {
    match t.forward(&ColorValue::Values(values))? {
        ColorValue::Values(v) => Ok(v),
        other => Ok(other.to_components()),
    }
}

fn lab_to_pcs_values(lab: Lab) -> Vec<f64> {
    pcs_convert(Encoding::LabD50, Encoding::PcsV4, [lab.l, lab.a, lab.b]).to_vec()
}

fn pcs_values_to_lab(values: &[f64]) -> Lab {
    let lab = pcs_convert(
        Encoding::PcsV4,
        Encoding::LabD50,
        [values[0], values[1], values[2]],
    );
    Lab::new(lab[0], lab[1], lab[2])
}

fn roundtrip_lab(
    to_device: &Transform,
    to_lab: &Transform,
    lab: Lab,
) -> Result<Lab, CmsError> {
    let device = forward_values(to_device, lab_to_pcs_values(lab))?;
    let back = forward_values(to_lab, device)?;
    Ok(pcs_values_to_lab(&back))
}

/// "Max colourant" black: drive every channel to full ink (or RGB-like
/// spaces to zero), round-trip through a temporary device -> Lab
/// transform, clamp L into [0, 50] and zero a, b.
fn max_colourant_black(profile: &ColorProfile, intent: RenderingIntent) -> Result<Xyz, CmsError> {
    let device_black = match profile.kind() {
        ProfileKind::RgbMatrix | ProfileKind::RgbLut | ProfileKind::Gray => {
            vec![0.0; profile.channels()]
        }
        _ => vec![1.0; profile.channels()],
    };
    let to_lab = device_to_lab_probe(profile, intent)?;
    let out = forward_values(&to_lab, device_black)?;
    let lab = pcs_values_to_lab(&out);
    let lab = Lab::new(lab.l.clamp(0.0, 50.0), 0.0, 0.0);
    Ok(lab.to_d50_xyz())
}

/// Ink-limited black for CMYK printer profiles under relative intent:
/// Lab(0,0,0) -> device under the perceptual table, then device -> Lab
/// under the relative one.
fn ink_limited_black(profile: &ColorProfile) -> Result<Xyz, CmsError> {
    let to_device = lab_to_device_probe(profile, RenderingIntent::Perceptual)?;
    let to_lab = device_to_lab_probe(profile, RenderingIntent::RelativeColorimetric)?;
    let lab = roundtrip_lab(&to_device, &to_lab, Lab::new(0.0, 0.0, 0.0))?;
    Ok(lab.to_d50_xyz())
}

fn trivial_black(profile: &ColorProfile, intent: RenderingIntent) -> Option<Xyz> {
    if intent == RenderingIntent::AbsoluteColorimetric
        || matches!(
            profile.profile_class,
            ProfileClass::DeviceLink | ProfileClass::Abstract | ProfileClass::NamedColor
        )
        || profile.kind() == ProfileKind::RgbMatrix
    {
        return Some(Xyz::ZERO);
    }
    if profile.is_v4()
        && matches!(
            intent,
            RenderingIntent::Perceptual | RenderingIntent::Saturation
        )
    {
        return Some(V4_PERCEPTUAL_BLACK);
    }
    None
}

pub(crate) fn detect_input_black(
    profile: &ColorProfile,
    intent: RenderingIntent,
) -> Result<Xyz, CmsError> {
    if let Some(black) = trivial_black(profile, intent) {
        return Ok(black);
    }
    let detected = if profile.kind() == ProfileKind::Cmyk
        && profile.profile_class == ProfileClass::Printer
        && intent == RenderingIntent::RelativeColorimetric
    {
        ink_limited_black(profile)
    } else {
        max_colourant_black(profile, intent)
    };
    // a profile the probes cannot drive contributes no compensation
    Ok(detected.unwrap_or(Xyz::ZERO))
}

pub(crate) fn detect_output_black(
    profile: &ColorProfile,
    intent: RenderingIntent,
) -> Result<Xyz, CmsError> {
    if let Some(black) = trivial_black(profile, intent) {
        return Ok(black);
    }
    Ok(output_black_by_roundtrip(profile, intent).unwrap_or(Xyz::ZERO))
}

fn output_black_by_roundtrip(
    profile: &ColorProfile,
    intent: RenderingIntent,
) -> Result<Xyz, CmsError> {
    let to_device = lab_to_device_probe(profile, intent)?;
    let to_lab = device_to_lab_probe(profile, RenderingIntent::RelativeColorimetric)?;

    let initial = roundtrip_lab(&to_device, &to_lab, Lab::new(0.0, 0.0, 0.0))?;

    let mut out_l = [0f64; 256];
    for (i, slot) in out_l.iter_mut().enumerate() {
        let l = i as f64 / 255.0 * 100.0;
        *slot = roundtrip_lab(&to_device, &to_lab, Lab::new(l, 0.0, 0.0))?.l;
    }
    // force the ramp monotonically decreasing from the top
    for i in (0..255).rev() {
        out_l[i] = out_l[i].min(out_l[i + 1]);
    }

    if nearly_straight_midtones(&out_l) {
        let lab = Lab::new(initial.l.clamp(0.0, 50.0), initial.a, initial.b);
        return Ok(lab.to_d50_xyz());
    }

    let (lo, hi) = if intent == RenderingIntent::Perceptual {
        (0.03, 0.25)
    } else {
        (0.1, 0.5)
    };
    let mut points = Vec::new();
    for (i, l) in out_l.iter().enumerate() {
        let y = l / 100.0;
        if y >= lo && y <= hi {
            points.push((i as f64 / 255.0, y));
        }
    }
    let l_black = match quadratic_vertex(&points) {
        Some(vertex) => (vertex * 100.0).clamp(0.0, 50.0),
        None => initial.l.clamp(0.0, 50.0),
    };
    Ok(Lab::new(l_black, initial.a, initial.b).to_d50_xyz())
}

fn nearly_straight_midtones(out_l: &[f64; 256]) -> bool {
    const TOLERANCE: f64 = 1.0;
    let a = out_l[0];
    let b = out_l[255];
    for (i, l) in out_l.iter().enumerate().take(224).skip(32) {
        let chord = a + (b - a) * (i as f64 / 255.0);
        if (l - chord).abs() > TOLERANCE {
            return false;
        }
    }
    true
}

/// Least-squares fit of y = a*x^2 + b*x + c, returning the parabola's
/// vertex. Needs at least three shadow samples and real curvature.
fn quadratic_vertex(points: &[(f64, f64)]) -> Option<f64> {
    if points.len() < 3 {
        return None;
    }
    let n = points.len() as f64;
    let (mut sx, mut sx2, mut sx3, mut sx4) = (0.0, 0.0, 0.0, 0.0);
    let (mut sy, mut sxy, mut sx2y) = (0.0, 0.0, 0.0);
    for &(x, y) in points {
        let x2 = x * x;
        sx += x;
        sx2 += x2;
        sx3 += x2 * x;
        sx4 += x2 * x2;
        sy += y;
        sxy += x * y;
        sx2y += x2 * y;
    }
    let normal = Matrix3d {
        v: [[sx4, sx3, sx2], [sx3, sx2, sx], [sx2, sx, n]],
    };
    let inv = normal.inverse()?;
    let coeffs = inv.mul_vector(Vector3d::new(sx2y, sxy, sy));
    let (a, b) = (coeffs.v[0], coeffs.v[1]);
    if a.abs() < 1e-10 {
        return None;
    }
    Some(-b / (2.0 * a))
}

/// Affine map in PCSXYZ carrying the input black onto the output black
/// while fixing D50. Returns None when both blacks coincide.
pub(crate) fn bpc_params(in_black: Xyz, out_black: Xyz) -> Option<(Vector3d, Vector3d)> {
    if in_black == out_black {
        return None;
    }
    let d50 = D50_XYZ;
    let scale = Vector3d::new(
        (d50.x - out_black.x) / (d50.x - in_black.x),
        (d50.y - out_black.y) / (d50.y - in_black.y),
        (d50.z - out_black.z) / (d50.z - in_black.z),
    );
    let offset = Vector3d::new(
        d50.x * (out_black.x - in_black.x) / (d50.x - in_black.x) / PCS_XYZ_SCALE,
        d50.y * (out_black.y - in_black.y) / (d50.y - in_black.y) / PCS_XYZ_SCALE,
        d50.z * (out_black.z - in_black.z) / (d50.z - in_black.z) / PCS_XYZ_SCALE,
    );
    Some((scale, offset))
}
