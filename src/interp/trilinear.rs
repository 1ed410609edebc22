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
use crate::interp::GridCoord;
use crate::matrix::{Vector3f, Vector4f};

/// Eight-corner weighted cube sampler. Chosen over the tetrahedral form
/// whenever the index axis is Lab L, where the tetrahedral split shows
/// visible bias on uncentred luma.
pub(crate) struct Trilinear<'a> {
    cube: &'a [f32],
    grid_size: usize,
    channels: usize,
}

impl<'a> Trilinear<'a> {
    #[inline]
    pub(crate) fn new(table: &'a [f32], grid_size: usize, channels: usize) -> Self {
        Trilinear {
            cube: table,
            grid_size,
            channels,
        }
    }

    #[inline(always)]
    fn offset(&self, x: i32, y: i32, z: i32) -> usize {
        (x as u32 * (self.grid_size * self.grid_size) as u32
            + y as u32 * self.grid_size as u32
            + z as u32) as usize
            * self.channels
    }

    #[inline(always)]
    fn fetch3(&self, x: i32, y: i32, z: i32) -> Vector3f {
        let jx = &self.cube[self.offset(x, y, z)..][..3];
        Vector3f {
            v: [jx[0], jx[1], jx[2]],
        }
    }

    #[inline(always)]
    fn fetch4(&self, x: i32, y: i32, z: i32) -> Vector4f {
        let jx = &self.cube[self.offset(x, y, z)..][..4];
        Vector4f {
            v: [jx[0], jx[1], jx[2], jx[3]],
        }
    }

    #[inline(always)]
    pub(crate) fn inter3(&self, x: GridCoord, y: GridCoord, z: GridCoord) -> Vector3f {
        let x_d = Vector3f::from(x.frac);
        let y_d = Vector3f::from(y.frac);
        let z_d = Vector3f::from(z.frac);
        let one = Vector3f::from(1.0);

        let c000 = self.fetch3(x.idx, y.idx, z.idx);
        let c100 = self.fetch3(x.next, y.idx, z.idx);
        let c010 = self.fetch3(x.idx, y.next, z.idx);
        let c110 = self.fetch3(x.next, y.next, z.idx);
        let c001 = self.fetch3(x.idx, y.idx, z.next);
        let c101 = self.fetch3(x.next, y.idx, z.next);
        let c011 = self.fetch3(x.idx, y.next, z.next);
        let c111 = self.fetch3(x.next, y.next, z.next);

        let c00 = c000 * (one - x_d) + c100 * x_d;
        let c10 = c010 * (one - x_d) + c110 * x_d;
        let c01 = c001 * (one - x_d) + c101 * x_d;
        let c11 = c011 * (one - x_d) + c111 * x_d;

        let c0 = c00 * (one - y_d) + c10 * y_d;
        let c1 = c01 * (one - y_d) + c11 * y_d;

        c0 * (one - z_d) + c1 * z_d
    }

    #[inline(always)]
    pub(crate) fn inter4(&self, x: GridCoord, y: GridCoord, z: GridCoord) -> Vector4f {
        let x_d = Vector4f::from(x.frac);
        let y_d = Vector4f::from(y.frac);
        let z_d = Vector4f::from(z.frac);
        let one = Vector4f::from(1.0);

        let c000 = self.fetch4(x.idx, y.idx, z.idx);
        let c100 = self.fetch4(x.next, y.idx, z.idx);
        let c010 = self.fetch4(x.idx, y.next, z.idx);
        let c110 = self.fetch4(x.next, y.next, z.idx);
        let c001 = self.fetch4(x.idx, y.idx, z.next);
        let c101 = self.fetch4(x.next, y.idx, z.next);
        let c011 = self.fetch4(x.idx, y.next, z.next);
        let c111 = self.fetch4(x.next, y.next, z.next);

        let c00 = c000 * (one - x_d) + c100 * x_d;
        let c10 = c010 * (one - x_d) + c110 * x_d;
        let c01 = c001 * (one - x_d) + c101 * x_d;
        let c11 = c011 * (one - x_d) + c111 * x_d;

        let c0 = c00 * (one - y_d) + c10 * y_d;
        let c1 = c01 * (one - y_d) + c11 * y_d;

        c0 * (one - z_d) + c1 * z_d
    }

    pub(crate) fn inter_n(&self, x: GridCoord, y: GridCoord, z: GridCoord, dst: &mut [f64]) {
        let o = [
            self.offset(x.idx, y.idx, z.idx),
            self.offset(x.next, y.idx, z.idx),
            self.offset(x.idx, y.next, z.idx),
            self.offset(x.next, y.next, z.idx),
            self.offset(x.idx, y.idx, z.next),
            self.offset(x.next, y.idx, z.next),
            self.offset(x.idx, y.next, z.next),
            self.offset(x.next, y.next, z.next),
        ];
        let (rx, ry, rz) = (x.frac as f64, y.frac as f64, z.frac as f64);
        for (ch, out) in dst.iter_mut().enumerate().take(self.channels) {
            let c00 = self.cube[o[0] + ch] as f64 * (1.0 - rx) + self.cube[o[1] + ch] as f64 * rx;
            let c10 = self.cube[o[2] + ch] as f64 * (1.0 - rx) + self.cube[o[3] + ch] as f64 * rx;
            let c01 = self.cube[o[4] + ch] as f64 * (1.0 - rx) + self.cube[o[5] + ch] as f64 * rx;
            let c11 = self.cube[o[6] + ch] as f64 * (1.0 - rx) + self.cube[o[7] + ch] as f64 * rx;
            let c0 = c00 * (1.0 - ry) + c10 * ry;
            let c1 = c01 * (1.0 - ry) + c11 * ry;
            *out = c0 * (1.0 - rz) + c1 * rz;
        }
    }
}
