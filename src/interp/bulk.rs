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
use crate::interp::{
    InterpolationMethod, Tetrahedral, Trilinear, eval_clut, grid_coord,
};
use num_traits::AsPrimitive;

/// Alpha semantics of the bulk paths: skip an input alpha channel, emit
/// the type's maximum, or carry the input alpha through.
#[derive(Debug, Copy, Clone)]
pub(crate) struct AlphaMode {
    pub in_alpha: bool,
    pub out_alpha: bool,
    pub preserve: bool,
}

/// Drives a whole pixel buffer through the cached CLUT. This is the
/// allocation-light loop behind `transform_array_via_lut`; the staged
/// pipeline never runs here.
#[allow(clippy::too_many_arguments)]
pub(crate) fn transform_buffer_via_lut<T>(
    lut: &Clut,
    method_3d: InterpolationMethod,
    method_4d: InterpolationMethod,
    fast: bool,
    src: &[T],
    alpha: AlphaMode,
    count: Option<usize>,
    max_value: T,
    round: bool,
) -> Result<Vec<T>, CmsError>
where
    T: Copy + 'static + AsPrimitive<f64>,
    f64: AsPrimitive<T>,
{
    let in_ch = lut.input_channels;
    let oc = lut.output_channels;
    let in_stride = in_ch + usize::from(alpha.in_alpha);
    let out_stride = oc + usize::from(alpha.out_alpha);

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

    let specialised = fast && in_ch >= 3 && (oc == 3 || oc == 4);
    if specialised {
        transform_specialised(
            lut, method_3d, method_4d, src, &mut dst, alpha, pixels, in_stride, out_stride,
            max_value, round,
        );
    } else {
        let mut pixel_in = [0f64; 4];
        let mut stack = [0f64; 16];
        let mut heap;
        let pixel_out: &mut [f64] = if oc <= 16 {
            &mut stack[..oc]
        } else {
            heap = vec![0f64; oc];
            &mut heap
        };
        for (chunk, out) in src
            .chunks_exact(in_stride)
            .take(pixels)
            .zip(dst.chunks_exact_mut(out_stride))
        {
            for (p, s) in pixel_in.iter_mut().zip(chunk.iter()) {
                *p = s.as_();
            }
            eval_clut(lut, method_3d, method_4d, &pixel_in[..in_ch], pixel_out);
            for (o, v) in out.iter_mut().zip(pixel_out.iter()) {
                let v = if round { v.round() } else { *v };
                *o = v.as_();
            }
            if alpha.out_alpha {
                out[oc] = if alpha.preserve && alpha.in_alpha {
                    chunk[in_ch]
                } else {
                    max_value
                };
            }
        }
    }

    Ok(dst)
}

/// Fully unrolled 3- and 4-channel output forms; the per-pixel path
/// dominates total runtime so these stay in registers.
#[allow(clippy::too_many_arguments)]
fn transform_specialised<T>(
    lut: &Clut,
    method_3d: InterpolationMethod,
    method_4d: InterpolationMethod,
    src: &[T],
    dst: &mut [T],
    alpha: AlphaMode,
    pixels: usize,
    in_stride: usize,
    out_stride: usize,
    max_value: T,
    round: bool,
) where
    T: Copy + 'static + AsPrimitive<f64>,
    f64: AsPrimitive<T>,
{
    let g = lut.grid();
    let oc = lut.output_channels;
    let in_ch = lut.input_channels;
    let scale = lut.output_scale as f32;
    let slice_len = g * g * g * oc;

    let emit = |out: &mut [T], values: &[f32], alpha_src: Option<T>| {
        for (o, v) in out.iter_mut().zip(values.iter()) {
            let v = (*v * scale) as f64;
            let v = if round { v.round() } else { v };
            *o = v.as_();
        }
        if alpha.out_alpha {
            out[oc] = match alpha_src {
                Some(a) if alpha.preserve => a,
                _ => max_value,
            };
        }
    };

    for (chunk, out) in src
        .chunks_exact(in_stride)
        .take(pixels)
        .zip(dst.chunks_exact_mut(out_stride))
    {
        let alpha_src = if alpha.in_alpha {
            Some(chunk[in_ch])
        } else {
            None
        };
        if in_ch == 3 {
            let x = grid_coord(chunk[0].as_(), lut.input_scale, g);
            let y = grid_coord(chunk[1].as_(), lut.input_scale, g);
            let z = grid_coord(chunk[2].as_(), lut.input_scale, g);
            match (method_3d, oc) {
                (InterpolationMethod::Tetrahedral, 3) => {
                    let r = Tetrahedral::new(&lut.table, g, 3).inter3(x, y, z);
                    emit(out, &r.v, alpha_src);
                }
                (InterpolationMethod::Tetrahedral, _) => {
                    let r = Tetrahedral::new(&lut.table, g, 4).inter4(x, y, z);
                    emit(out, &r.v, alpha_src);
                }
                (InterpolationMethod::Trilinear, 3) => {
                    let r = Trilinear::new(&lut.table, g, 3).inter3(x, y, z);
                    emit(out, &r.v, alpha_src);
                }
                (InterpolationMethod::Trilinear, _) => {
                    let r = Trilinear::new(&lut.table, g, 4).inter4(x, y, z);
                    emit(out, &r.v, alpha_src);
                }
            }
        } else {
            let k = grid_coord(chunk[0].as_(), lut.input_scale, g);
            let x = grid_coord(chunk[1].as_(), lut.input_scale, g);
            let y = grid_coord(chunk[2].as_(), lut.input_scale, g);
            let z = grid_coord(chunk[3].as_(), lut.input_scale, g);
            let lo = &lut.table[k.idx as usize * slice_len..][..slice_len];
            let blend = k.frac != 0.0 && k.next != k.idx;
            if oc == 3 {
                let sample = |slice: &[f32]| match method_4d {
                    InterpolationMethod::Tetrahedral => {
                        Tetrahedral::new(slice, g, 3).inter3(x, y, z)
                    }
                    InterpolationMethod::Trilinear => Trilinear::new(slice, g, 3).inter3(x, y, z),
                };
                let mut r = sample(lo);
                if blend {
                    let hi = &lut.table[k.next as usize * slice_len..][..slice_len];
                    let r2 = sample(hi);
                    r = r.mla(r2 - r, k.frac);
                }
                emit(out, &r.v, alpha_src);
            } else {
                let sample = |slice: &[f32]| match method_4d {
                    InterpolationMethod::Tetrahedral => {
                        Tetrahedral::new(slice, g, 4).inter4(x, y, z)
                    }
                    InterpolationMethod::Trilinear => Trilinear::new(slice, g, 4).inter4(x, y, z),
                };
                let mut r = sample(lo);
                if blend {
                    let hi = &lut.table[k.next as usize * slice_len..][..slice_len];
                    let r2 = sample(hi);
                    r = r.mla(r2 - r, k.frac);
                }
                emit(out, &r.v, alpha_src);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity_u8_lut() -> Clut {
        let mut lut = Clut::identity(3, 17).unwrap();
        lut.input_scale = 1.0 / 255.0;
        lut.output_scale = 255.0;
        lut
    }

    #[test]
    fn test_bulk_identity_u8() {
        let lut = identity_u8_lut();
        let src: Vec<u8> = vec![0, 0, 0, 255, 255, 255, 64, 128, 192];
        let out = transform_buffer_via_lut(
            &lut,
            InterpolationMethod::Tetrahedral,
            InterpolationMethod::Tetrahedral,
            true,
            &src,
            AlphaMode {
                in_alpha: false,
                out_alpha: false,
                preserve: false,
            },
            None,
            255u8,
            true,
        )
        .unwrap();
        assert_eq!(out, src);
    }

    #[test]
    fn test_bulk_alpha_injection() {
        let lut = identity_u8_lut();
        let src: Vec<u8> = vec![10, 20, 30];
        let out = transform_buffer_via_lut(
            &lut,
            InterpolationMethod::Tetrahedral,
            InterpolationMethod::Tetrahedral,
            true,
            &src,
            AlphaMode {
                in_alpha: false,
                out_alpha: true,
                preserve: false,
            },
            None,
            255u8,
            true,
        )
        .unwrap();
        assert_eq!(out, vec![10, 20, 30, 255]);
    }

    #[test]
    fn test_bulk_alpha_preserved() {
        let lut = identity_u8_lut();
        let src: Vec<u8> = vec![10, 20, 30, 77, 50, 60, 70, 200];
        let out = transform_buffer_via_lut(
            &lut,
            InterpolationMethod::Tetrahedral,
            InterpolationMethod::Tetrahedral,
            true,
            &src,
            AlphaMode {
                in_alpha: true,
                out_alpha: true,
                preserve: true,
            },
            None,
            255u8,
            true,
        )
        .unwrap();
        assert_eq!(out, vec![10, 20, 30, 77, 50, 60, 70, 200]);
    }

    #[test]
    fn test_bulk_generic_path_matches_fast() {
        let lut = identity_u8_lut();
        let src: Vec<u8> = vec![5, 250, 100, 33, 66, 99];
        let mode = AlphaMode {
            in_alpha: false,
            out_alpha: false,
            preserve: false,
        };
        let fast = transform_buffer_via_lut(
            &lut,
            InterpolationMethod::Tetrahedral,
            InterpolationMethod::Tetrahedral,
            true,
            &src,
            mode,
            None,
            255u8,
            true,
        )
        .unwrap();
        let slow = transform_buffer_via_lut(
            &lut,
            InterpolationMethod::Tetrahedral,
            InterpolationMethod::Tetrahedral,
            false,
            &src,
            mode,
            None,
            255u8,
            true,
        )
        .unwrap();
        assert_eq!(fast, slow);
    }

    #[test]
    fn test_bulk_rejects_ragged_lane() {
        let lut = identity_u8_lut();
        let src: Vec<u8> = vec![1, 2, 3, 4];
        let r = transform_buffer_via_lut(
            &lut,
            InterpolationMethod::Tetrahedral,
            InterpolationMethod::Tetrahedral,
            true,
            &src,
            AlphaMode {
                in_alpha: false,
                out_alpha: false,
                preserve: false,
            },
            None,
            255u8,
            true,
        );
        assert_eq!(r, Err(CmsError::LaneMultipleOfChannels));
    }
}
