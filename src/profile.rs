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
use crate::chad::adapt_to_d50;
use crate::clut::Clut;
use crate::err::CmsError;
use crate::lab::{D50_XYZ, D65_XYZ};
use crate::matrix::{Chromaticity, Matrix3d, Vector3d, Xyz, primaries_to_xyz};
use crate::trc::Trc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataColorSpace {
    Rgb,
    Gray,
    Duo,
    Cmyk,
    Lab,
    Xyz,
}

impl DataColorSpace {
    /// Device channel count of the space.
    pub const fn channels(self) -> usize {
        match self {
            DataColorSpace::Rgb => 3,
            DataColorSpace::Gray => 1,
            DataColorSpace::Duo => 2,
            DataColorSpace::Cmyk => 4,
            DataColorSpace::Lab => 3,
            DataColorSpace::Xyz => 3,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            DataColorSpace::Rgb => "RGB",
            DataColorSpace::Gray => "Gray",
            DataColorSpace::Duo => "Duo",
            DataColorSpace::Cmyk => "CMYK",
            DataColorSpace::Lab => "Lab",
            DataColorSpace::Xyz => "XYZ",
        }
    }

    pub fn from_name(name: &str) -> Option<DataColorSpace> {
        match name {
            "RGB" => Some(DataColorSpace::Rgb),
            "Gray" => Some(DataColorSpace::Gray),
            "Duo" => Some(DataColorSpace::Duo),
            "CMYK" => Some(DataColorSpace::Cmyk),
            "Lab" => Some(DataColorSpace::Lab),
            "XYZ" => Some(DataColorSpace::Xyz),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileClass {
    Display,
    Printer,
    Scanner,
    Abstract,
    DeviceLink,
    NamedColor,
}

impl ProfileClass {
    pub const fn as_str(self) -> &'static str {
        match self {
            ProfileClass::Display => "display",
            ProfileClass::Printer => "printer",
            ProfileClass::Scanner => "scanner",
            ProfileClass::Abstract => "abstract",
            ProfileClass::DeviceLink => "devicelink",
            ProfileClass::NamedColor => "namedcolor",
        }
    }

    pub fn from_name(name: &str) -> Option<ProfileClass> {
        match name {
            "display" => Some(ProfileClass::Display),
            "printer" => Some(ProfileClass::Printer),
            "scanner" => Some(ProfileClass::Scanner),
            "abstract" => Some(ProfileClass::Abstract),
            "devicelink" => Some(ProfileClass::DeviceLink),
            "namedcolor" => Some(ProfileClass::NamedColor),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileVersion {
    V2,
    V4,
}

impl ProfileVersion {
    pub const fn major(self) -> u8 {
        match self {
            ProfileVersion::V2 => 2,
            ProfileVersion::V4 => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderingIntent {
    Perceptual,
    #[default]
    RelativeColorimetric,
    Saturation,
    AbsoluteColorimetric,
}

impl RenderingIntent {
    /// The A2B/B2A slot serving this intent; absolute shares the
    /// relative tables.
    pub const fn lut_index(self) -> usize {
        match self {
            RenderingIntent::Perceptual => 0,
            RenderingIntent::RelativeColorimetric => 1,
            RenderingIntent::Saturation => 2,
            RenderingIntent::AbsoluteColorimetric => 1,
        }
    }

    pub const fn code(self) -> u8 {
        match self {
            RenderingIntent::Perceptual => 0,
            RenderingIntent::RelativeColorimetric => 1,
            RenderingIntent::Saturation => 2,
            RenderingIntent::AbsoluteColorimetric => 3,
        }
    }

    pub const fn from_code(code: u8) -> Option<RenderingIntent> {
        match code {
            0 => Some(RenderingIntent::Perceptual),
            1 => Some(RenderingIntent::RelativeColorimetric),
            2 => Some(RenderingIntent::Saturation),
            3 => Some(RenderingIntent::AbsoluteColorimetric),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            RenderingIntent::Perceptual => "perceptual",
            RenderingIntent::RelativeColorimetric => "relative",
            RenderingIntent::Saturation => "saturation",
            RenderingIntent::AbsoluteColorimetric => "absolute",
        }
    }
}

/// Shape the pipeline builder branches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileKind {
    Gray,
    Duo,
    RgbMatrix,
    RgbLut,
    Cmyk,
    Lab,
    Xyz,
}

/// One A2B or B2A structure. `a_curves` always sit on the device side and
/// `b_curves` on the PCS side; the builder mirrors the application order
/// for the B2A direction. v2 lut8/lut16 structures populate only the
/// curve pair and the CLUT.
#[derive(Debug, Clone, Default)]
pub struct ProfileLut {
    pub a_curves: Option<Vec<Trc>>,
    pub clut: Option<Clut>,
    pub m_curves: Option<Vec<Trc>>,
    pub matrix: Option<(Matrix3d, Vector3d)>,
    pub b_curves: Option<Vec<Trc>>,
}

/// Opaque profile value object the transform engine consumes. Parsing ICC
/// binaries into this shape is a collaborator's job.
#[derive(Debug, Clone)]
pub struct ColorProfile {
    pub profile_class: ProfileClass,
    pub color_space: DataColorSpace,
    pub pcs: DataColorSpace,
    pub version: ProfileVersion,
    /// Media white point.
    pub white_point: Xyz,
    pub pcs_illuminant: Xyz,
    pub a2b: [Option<ProfileLut>; 3],
    pub b2a: [Option<ProfileLut>; 3],
    pub gray_trc: Option<Trc>,
    pub red_trc: Option<Trc>,
    pub green_trc: Option<Trc>,
    pub blue_trc: Option<Trc>,
    pub rgb_to_xyz: Option<Matrix3d>,
    pub xyz_to_rgb: Option<Matrix3d>,
    pub description: String,
}

impl ColorProfile {
    pub fn kind(&self) -> ProfileKind {
        match self.color_space {
            DataColorSpace::Lab => ProfileKind::Lab,
            DataColorSpace::Xyz => ProfileKind::Xyz,
            DataColorSpace::Gray => ProfileKind::Gray,
            DataColorSpace::Duo => ProfileKind::Duo,
            DataColorSpace::Cmyk => ProfileKind::Cmyk,
            DataColorSpace::Rgb => {
                if self.has_device_lut() {
                    ProfileKind::RgbLut
                } else {
                    ProfileKind::RgbMatrix
                }
            }
        }
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.color_space.channels()
    }

    pub fn has_device_lut(&self) -> bool {
        self.a2b.iter().any(|l| l.is_some()) || self.b2a.iter().any(|l| l.is_some())
    }

    pub(crate) fn a2b_for(&self, intent: RenderingIntent) -> Option<&ProfileLut> {
        let idx = intent.lut_index();
        self.a2b[idx]
            .as_ref()
            .or_else(|| self.a2b.iter().find_map(|l| l.as_ref()))
    }

    pub(crate) fn b2a_for(&self, intent: RenderingIntent) -> Option<&ProfileLut> {
        let idx = intent.lut_index();
        self.b2a[idx]
            .as_ref()
            .or_else(|| self.b2a.iter().find_map(|l| l.as_ref()))
    }

    /// Ratio of the media white to the PCS illuminant, applied to PCSXYZ
    /// at the input end of an absolute-intent hop.
    pub fn absolute_scale_in(&self) -> Vector3d {
        Vector3d::new(
            self.white_point.x / self.pcs_illuminant.x,
            self.white_point.y / self.pcs_illuminant.y,
            self.white_point.z / self.pcs_illuminant.z,
        )
    }

    /// Reciprocal of `absolute_scale_in`, applied at the output end.
    pub fn absolute_scale_out(&self) -> Vector3d {
        Vector3d::new(
            self.pcs_illuminant.x / self.white_point.x,
            self.pcs_illuminant.y / self.white_point.y,
            self.pcs_illuminant.z / self.white_point.z,
        )
    }

    pub(crate) fn is_v4(&self) -> bool {
        self.version == ProfileVersion::V4
    }

    fn empty(class: ProfileClass, space: DataColorSpace, pcs: DataColorSpace) -> ColorProfile {
        ColorProfile {
            profile_class: class,
            color_space: space,
            pcs,
            version: ProfileVersion::V4,
            white_point: D50_XYZ,
            pcs_illuminant: D50_XYZ,
            a2b: [None, None, None],
            b2a: [None, None, None],
            gray_trc: None,
            red_trc: None,
            green_trc: None,
            blue_trc: None,
            rgb_to_xyz: None,
            xyz_to_rgb: None,
            description: String::new(),
        }
    }

    fn new_rgb_matrix(
        description: &str,
        red: Chromaticity,
        green: Chromaticity,
        blue: Chromaticity,
        trc: Trc,
    ) -> Result<ColorProfile, CmsError> {
        let white = D65_XYZ;
        let unadapted = primaries_to_xyz(red, green, blue, white)
            .ok_or(CmsError::MatrixNotInvertible)?;
        let adaptation = adapt_to_d50(white).ok_or(CmsError::MatrixNotInvertible)?;
        let rgb_to_xyz = adaptation.mat_mul(unadapted);
        let xyz_to_rgb = rgb_to_xyz.inverse().ok_or(CmsError::MatrixNotInvertible)?;
        let mut p = ColorProfile::empty(ProfileClass::Display, DataColorSpace::Rgb, DataColorSpace::Xyz);
        p.white_point = white;
        p.red_trc = Some(trc.clone());
        p.green_trc = Some(trc.clone());
        p.blue_trc = Some(trc);
        p.rgb_to_xyz = Some(rgb_to_xyz);
        p.xyz_to_rgb = Some(xyz_to_rgb);
        p.description = description.to_owned();
        Ok(p)
    }

    pub fn new_srgb() -> ColorProfile {
        ColorProfile::new_rgb_matrix(
            "sRGB",
            Chromaticity::new(0.640, 0.330),
            Chromaticity::new(0.300, 0.600),
            Chromaticity::new(0.150, 0.060),
            Trc::srgb(),
        )
        .expect("sRGB primaries are invertible")
    }

    pub fn new_adobe_rgb() -> ColorProfile {
        ColorProfile::new_rgb_matrix(
            "AdobeRGB",
            Chromaticity::new(0.640, 0.330),
            Chromaticity::new(0.210, 0.710),
            Chromaticity::new(0.150, 0.060),
            Trc::from_gamma(2.19921875),
        )
        .expect("AdobeRGB primaries are invertible")
    }

    pub fn new_lab_d50() -> ColorProfile {
        let mut p = ColorProfile::empty(ProfileClass::Abstract, DataColorSpace::Lab, DataColorSpace::Lab);
        p.description = "Lab".to_owned();
        p
    }

    pub fn new_lab_d65() -> ColorProfile {
        let mut p = ColorProfile::new_lab_d50();
        p.white_point = D65_XYZ;
        p.description = "LabD65".to_owned();
        p
    }

    pub fn new_xyz() -> ColorProfile {
        let mut p = ColorProfile::empty(ProfileClass::Abstract, DataColorSpace::Xyz, DataColorSpace::Xyz);
        p.description = "XYZ".to_owned();
        p
    }

    pub fn new_gray_with_gamma(gamma: f32) -> ColorProfile {
        let mut p = ColorProfile::empty(ProfileClass::Display, DataColorSpace::Gray, DataColorSpace::Xyz);
        p.gray_trc = Some(Trc::from_gamma(gamma));
        p.description = "Gray".to_owned();
        p
    }
}

/// Resolves a `*Name` virtual-profile reference. The prefix is mandatory:
/// bare strings are rejected so that profile-object slots and name slots
/// cannot be confused in a chain.
pub(crate) fn resolve_virtual(name: &str) -> Result<ColorProfile, CmsError> {
    let Some(stripped) = name.strip_prefix('*') else {
        return Err(CmsError::VirtualProfileNeedsStar(name.to_owned()));
    };
    match stripped {
        "sRGB" | "srgb" => Ok(ColorProfile::new_srgb()),
        "AdobeRGB" | "Adobe RGB" | "AdobeRGB1998" => Ok(ColorProfile::new_adobe_rgb()),
        "Lab" | "LabD50" => Ok(ColorProfile::new_lab_d50()),
        "LabD65" => Ok(ColorProfile::new_lab_d65()),
        "XYZ" => Ok(ColorProfile::new_xyz()),
        "Gray" => Ok(ColorProfile::new_gray_with_gamma(2.2)),
        _ => Err(CmsError::UnknownVirtualProfile(name.to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::Vector3d;

    #[test]
    fn test_srgb_matrix_maps_white_to_d50() {
        let p = ColorProfile::new_srgb();
        let m = p.rgb_to_xyz.unwrap();
        let w = m.mul_vector(Vector3d::new(1.0, 1.0, 1.0));
        assert!((w.v[0] - D50_XYZ.x).abs() < 1e-6);
        assert!((w.v[1] - D50_XYZ.y).abs() < 1e-6);
        assert!((w.v[2] - D50_XYZ.z).abs() < 1e-6);
    }

    #[test]
    fn test_kind_derivation() {
        assert_eq!(ColorProfile::new_srgb().kind(), ProfileKind::RgbMatrix);
        assert_eq!(ColorProfile::new_lab_d50().kind(), ProfileKind::Lab);
        assert_eq!(
            ColorProfile::new_gray_with_gamma(2.2).kind(),
            ProfileKind::Gray
        );
    }

    #[test]
    fn test_virtual_resolution() {
        assert!(resolve_virtual("*sRGB").is_ok());
        assert!(matches!(
            resolve_virtual("sRGB"),
            Err(CmsError::VirtualProfileNeedsStar(_))
        ));
        assert!(matches!(
            resolve_virtual("*NoSuch"),
            Err(CmsError::UnknownVirtualProfile(_))
        ));
    }

    #[test]
    fn test_absolute_scales_are_reciprocal() {
        let p = ColorProfile::new_srgb();
        let a = p.absolute_scale_in();
        let b = p.absolute_scale_out();
        for i in 0..3 {
            assert!((a.v[i] * b.v[i] - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_intent_lut_index() {
        assert_eq!(RenderingIntent::Perceptual.lut_index(), 0);
        assert_eq!(RenderingIntent::AbsoluteColorimetric.lut_index(), 1);
        assert_eq!(RenderingIntent::Saturation.lut_index(), 2);
    }
}
