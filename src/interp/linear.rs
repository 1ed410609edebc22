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
use crate::interp::grid_coord;

/// 1-D table walk for Gray LUTs.
pub(crate) fn linear_1d(lut: &Clut, v: f64, dst: &mut [f64]) {
    let g = lut.grid();
    let oc = lut.output_channels;
    let c = grid_coord(v, lut.input_scale, g);
    let lo = c.idx as usize * oc;
    let hi = c.next as usize * oc;
    let t = c.frac as f64;
    for ch in 0..oc {
        let a = lut.table[lo + ch] as f64;
        let b = lut.table[hi + ch] as f64;
        dst[ch] = (a + (b - a) * t) * lut.output_scale;
    }
}

/// 2-D bilinear walk for Duo LUTs. The first channel carries the larger
/// stride, matching the row-major grid layout.
pub(crate) fn bilinear_2d(lut: &Clut, v0: f64, v1: f64, dst: &mut [f64]) {
    let g = lut.grid();
    let oc = lut.output_channels;
    let x = grid_coord(v0, lut.input_scale, g);
    let y = grid_coord(v1, lut.input_scale, g);
    let row = g * oc;
    let o00 = x.idx as usize * row + y.idx as usize * oc;
    let o01 = x.idx as usize * row + y.next as usize * oc;
    let o10 = x.next as usize * row + y.idx as usize * oc;
    let o11 = x.next as usize * row + y.next as usize * oc;
    let tx = x.frac as f64;
    let ty = y.frac as f64;
    for ch in 0..oc {
        let c0 = lut.table[o00 + ch] as f64 * (1.0 - ty) + lut.table[o01 + ch] as f64 * ty;
        let c1 = lut.table[o10 + ch] as f64 * (1.0 - ty) + lut.table[o11 + ch] as f64 * ty;
        dst[ch] = (c0 * (1.0 - tx) + c1 * tx) * lut.output_scale;
    }
}
