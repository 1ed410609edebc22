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
use crate::encoding::Encoding;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Faults raised while assembling or driving a transform.
///
/// Everything here is a construction-time failure; once `create` has
/// succeeded execution is panic-free.
#[derive(Debug, Clone, PartialEq)]
pub enum CmsError {
    UnsupportedDataFormat(String),
    UnsupportedInterpolation(String),
    UnsupportedLutArity(usize),
    ChainTooShort(usize),
    ChainExpectedProfile(usize),
    ChainExpectedIntent(usize),
    UnknownVirtualProfile(String),
    VirtualProfileNeedsStar(String),
    StageEncodingMismatch {
        index: usize,
        out: Encoding,
        next_in: Encoding,
    },
    UnexpectedPcsEncoding {
        expected: Encoding,
        found: Encoding,
    },
    ProfileMissingLut(&'static str),
    UnsupportedProfileConnection,
    MatrixNotInvertible,
    LutChainTooShort(usize),
    LutMissingPayload,
    UnknownLutEncoding(String),
    InvalidClutSize {
        expected: usize,
        found: usize,
    },
    NoPipeline,
    LaneSizeMismatch,
    LaneMultipleOfChannels,
    MalformedLutRecord(String),
}

impl Display for CmsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CmsError::UnsupportedDataFormat(s) => write!(f, "Unsupported data format: {s}"),
            CmsError::UnsupportedInterpolation(s) => {
                write!(f, "Unsupported interpolation method: {s}")
            }
            CmsError::UnsupportedLutArity(n) => {
                write!(f, "LUTs with {n} input channels are not supported")
            }
            CmsError::ChainTooShort(n) => {
                write!(f, "Chain must hold at least profile, intent, profile; got {n} entries")
            }
            CmsError::ChainExpectedProfile(i) => {
                write!(f, "Chain entry {i} must be a profile")
            }
            CmsError::ChainExpectedIntent(i) => {
                write!(f, "Chain entry {i} must be a rendering intent")
            }
            CmsError::UnknownVirtualProfile(s) => write!(f, "Unknown virtual profile '{s}'"),
            CmsError::VirtualProfileNeedsStar(s) => {
                write!(f, "Virtual profile name '{s}' must start with '*'")
            }
            CmsError::StageEncodingMismatch {
                index,
                out,
                next_in,
            } => write!(
                f,
                "Stage {index} emits {} but stage {} expects {}",
                out.name(),
                index + 1,
                next_in.name()
            ),
            CmsError::UnexpectedPcsEncoding { expected, found } => write!(
                f,
                "PCS cursor holds {} where {} was required",
                found.name(),
                expected.name()
            ),
            CmsError::ProfileMissingLut(which) => {
                write!(f, "Profile carries no {which} table for the requested intent")
            }
            CmsError::UnsupportedProfileConnection => {
                write!(f, "No conversion path between these profiles")
            }
            CmsError::MatrixNotInvertible => write!(f, "Profile matrix is not invertible"),
            CmsError::LutChainTooShort(n) => {
                write!(f, "Prebuilt LUT chain must hold at least 3 entries; got {n}")
            }
            CmsError::LutMissingPayload => write!(f, "Prebuilt LUT carries no CLUT payload"),
            CmsError::UnknownLutEncoding(s) => {
                write!(f, "Unknown prebuilt LUT payload encoding '{s}'")
            }
            CmsError::InvalidClutSize { expected, found } => {
                write!(f, "CLUT payload holds {found} values, expected {expected}")
            }
            CmsError::NoPipeline => write!(f, "Transform used before create() has run"),
            CmsError::LaneSizeMismatch => write!(f, "Source and destination lane sizes must match"),
            CmsError::LaneMultipleOfChannels => {
                write!(f, "Lane length must be a multiple of the channel count")
            }
            CmsError::MalformedLutRecord(s) => write!(f, "Malformed prebuilt LUT record: {s}"),
        }
    }
}

impl Error for CmsError {}
