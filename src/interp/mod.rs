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
mod bulk;
mod linear;
mod tetrahedral;
mod trilinear;

pub(crate) use bulk::{AlphaMode, transform_buffer_via_lut};
pub(crate) use linear::{bilinear_2d, linear_1d};
pub(crate) use tetrahedral::Tetrahedral;
pub(crate) use trilinear::Trilinear;

use crate::clut::Clut;
use crate::err::CmsError;

/// Sampler used for 3-D and 4-D CLUTs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterpolationMethod {
    #[default]
    Tetrahedral,
    Trilinear,
}

impl InterpolationMethod {
    pub fn from_name(name: &str) -> Result<InterpolationMethod, CmsError> {
        match name {
            "tetrahedral" => Ok(InterpolationMethod::Tetrahedral),
            "trilinear" => Ok(InterpolationMethod::Trilinear),
            _ => Err(CmsError::UnsupportedInterpolation(name.to_owned())),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            InterpolationMethod::Tetrahedral => "tetrahedral",
            InterpolationMethod::Trilinear => "trilinear",
        }
    }
}

/// Grid index, upper neighbour and fractional offset along one axis.
/// At the top edge the neighbour collapses onto the index itself so no
/// wraparound can occur.
#[derive(Debug, Copy, Clone)]
pub(crate) struct GridCoord {
    pub idx: i32,
    pub next: i32,
    pub frac: f32,
}

#[inline(always)]
pub(crate) fn grid_coord(v: f64, input_scale: f64, grid: usize) -> GridCoord {
    let t = (v * input_scale).clamp(0.0, 1.0) * (grid - 1) as f64;
    let mut idx = t.floor() as i32;
    if idx as usize >= grid - 1 {
        idx = grid as i32 - 1;
    }
    let next = if (idx as usize) + 1 < grid { idx + 1 } else { idx };
    GridCoord {
        idx,
        next,
        frac: (t - idx as f64) as f32,
    }
}

/// Runs one N-dimensional lookup against the table, honoring the LUT's
/// input and output scales. `dst` must hold `output_channels` slots.
pub(crate) fn eval_clut(
    lut: &Clut,
    method_3d: InterpolationMethod,
    method_4d: InterpolationMethod,
    src: &[f64],
    dst: &mut [f64],
) {
    let g = lut.grid();
    let oc = lut.output_channels;
    match lut.input_channels {
        1 => linear_1d(lut, src[0], dst),
        2 => bilinear_2d(lut, src[0], src[1], dst),
        3 => {
            eval_3d_slice(
                &lut.table,
                g,
                oc,
                method_3d,
                grid_coord(src[0], lut.input_scale, g),
                grid_coord(src[1], lut.input_scale, g),
                grid_coord(src[2], lut.input_scale, g),
                dst,
            );
            for d in dst.iter_mut() {
                *d *= lut.output_scale;
            }
        }
        4 => {
            // the K axis blends linearly between two 3-D slices
            let k = grid_coord(src[0], lut.input_scale, g);
            let x = grid_coord(src[1], lut.input_scale, g);
            let y = grid_coord(src[2], lut.input_scale, g);
            let z = grid_coord(src[3], lut.input_scale, g);
            let slice_len = g * g * g * oc;
            let lo = &lut.table[k.idx as usize * slice_len..][..slice_len];
            eval_3d_slice(lo, g, oc, method_4d, x, y, z, dst);
            if k.frac != 0.0 && k.next != k.idx {
                let hi = &lut.table[k.next as usize * slice_len..][..slice_len];
                let mut stack = [0f64; 16];
                let mut heap;
                let upper: &mut [f64] = if oc <= 16 {
                    &mut stack[..oc]
                } else {
                    heap = vec![0f64; oc];
                    &mut heap
                };
                eval_3d_slice(hi, g, oc, method_4d, x, y, z, upper);
                let t = k.frac as f64;
                for (d, u) in dst.iter_mut().zip(upper.iter()) {
                    *d += (u - *d) * t;
                }
            }
            for d in dst.iter_mut() {
                *d *= lut.output_scale;
            }
        }
        _ => unreachable!("LUT arity is validated at construction"),
    }
}

#[allow(clippy::too_many_arguments)]
#[inline]
fn eval_3d_slice(
    table: &[f32],
    grid: usize,
    channels: usize,
    method: InterpolationMethod,
    x: GridCoord,
    y: GridCoord,
    z: GridCoord,
    dst: &mut [f64],
) {
    match method {
        InterpolationMethod::Tetrahedral => {
            let sampler = Tetrahedral::new(table, grid, channels);
            match channels {
                3 => {
                    let r = sampler.inter3(x, y, z);
                    dst[0] = r.v[0] as f64;
                    dst[1] = r.v[1] as f64;
                    dst[2] = r.v[2] as f64;
                }
                4 => {
                    let r = sampler.inter4(x, y, z);
                    for (d, v) in dst.iter_mut().zip(r.v.iter()) {
                        *d = *v as f64;
                    }
                }
                _ => sampler.inter_n(x, y, z, dst),
            }
        }
        InterpolationMethod::Trilinear => {
            let sampler = Trilinear::new(table, grid, channels);
            match channels {
                3 => {
                    let r = sampler.inter3(x, y, z);
                    dst[0] = r.v[0] as f64;
                    dst[1] = r.v[1] as f64;
                    dst[2] = r.v[2] as f64;
                }
                4 => {
                    let r = sampler.inter4(x, y, z);
                    for (d, v) in dst.iter_mut().zip(r.v.iter()) {
                        *d = *v as f64;
                    }
                }
                _ => sampler.inter_n(x, y, z, dst),
            }
        }
    }
}
