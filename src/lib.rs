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
#![allow(clippy::manual_clamp, clippy::excessive_precision)]
#![deny(unreachable_pub)]
#![forbid(unsafe_code)]
mod baker;
mod bpc;
mod chad;
mod clut;
mod encoding;
mod err;
mod interp;
mod lab;
mod matrix;
mod mlaf;
mod optimize;
mod pipeline;
mod profile;
mod stage;
mod transform;
mod trc;

pub use baker::{LutChainEntry, PrebuiltLut, SimplifiedProfile};
pub use clut::Clut;
pub use encoding::Encoding;
pub use err::CmsError;
pub use interp::InterpolationMethod;
pub use lab::{D50_XYZ, D65_XYZ, Lab};
pub use matrix::{Chromaticity, Matrix3d, Vector3d, Vector3f, Vector4f, Xyz};
pub use profile::{
    ColorProfile, DataColorSpace, ProfileClass, ProfileKind, ProfileLut, ProfileVersion,
    RenderingIntent,
};
pub use stage::{CustomStage, CustomStageFn, Stage, StageAnchor};
pub use transform::{
    BpcMode, ChainEntry, ColorValue, DataFormat, Transform, TransformOptions,
};
pub use trc::Trc;
