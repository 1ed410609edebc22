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

/// Six-way tetrahedral sampler over one 3-D slice. The cube around the
/// sample point splits along the rx >= ry >= rz ordering; exactly one
/// branch fires, costing three table fetches past the base corner.
pub(crate) struct Tetrahedral<'a> {
    cube: &'a [f32],
    grid_size: usize,
    channels: usize,
}

impl<'a> Tetrahedral<'a> {
    #[inline]
    pub(crate) fn new(table: &'a [f32], grid_size: usize, channels: usize) -> Self {
        Tetrahedral {
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

    /// Picks the tetrahedron for the fractional offsets and returns the
    /// corner tuples whose differences form c1, c2, c3.
    #[inline(always)]
    fn corners(
        x: GridCoord,
        y: GridCoord,
        z: GridCoord,
    ) -> [[(i32, i32, i32); 2]; 3] {
        let (x0, x1) = (x.idx, x.next);
        let (y0, y1) = (y.idx, y.next);
        let (z0, z1) = (z.idx, z.next);
        let (rx, ry, rz) = (x.frac, y.frac, z.frac);
        if rx >= ry {
            if ry >= rz {
                //rx >= ry && ry >= rz
                [
                    [(x1, y0, z0), (x0, y0, z0)],
                    [(x1, y1, z0), (x1, y0, z0)],
                    [(x1, y1, z1), (x1, y1, z0)],
                ]
            } else if rx >= rz {
                //rx >= rz && rz >= ry
                [
                    [(x1, y0, z0), (x0, y0, z0)],
                    [(x1, y1, z1), (x1, y0, z1)],
                    [(x1, y0, z1), (x1, y0, z0)],
                ]
            } else {
                //rz > rx && rx >= ry
                [
                    [(x1, y0, z1), (x0, y0, z1)],
                    [(x1, y1, z1), (x1, y0, z1)],
                    [(x0, y0, z1), (x0, y0, z0)],
                ]
            }
        } else if rx >= rz {
            //ry > rx && rx >= rz
            [
                [(x1, y1, z0), (x0, y1, z0)],
                [(x0, y1, z0), (x0, y0, z0)],
                [(x1, y1, z1), (x1, y1, z0)],
            ]
        } else if ry >= rz {
            //ry >= rz && rz > rx
            [
                [(x1, y1, z1), (x0, y1, z1)],
                [(x0, y1, z0), (x0, y0, z0)],
                [(x0, y1, z1), (x0, y1, z0)],
            ]
        } else {
            //rz > ry && ry > rx
            [
                [(x1, y1, z1), (x0, y1, z1)],
                [(x0, y1, z1), (x0, y0, z1)],
                [(x0, y0, z1), (x0, y0, z0)],
            ]
        }
    }

    #[inline(always)]
    pub(crate) fn inter3(&self, x: GridCoord, y: GridCoord, z: GridCoord) -> Vector3f {
        let c0 = self.fetch3(x.idx, y.idx, z.idx);
        let corners = Self::corners(x, y, z);
        let c1 = self.fetch3(corners[0][0].0, corners[0][0].1, corners[0][0].2)
            - self.fetch3(corners[0][1].0, corners[0][1].1, corners[0][1].2);
        let c2 = self.fetch3(corners[1][0].0, corners[1][0].1, corners[1][0].2)
            - self.fetch3(corners[1][1].0, corners[1][1].1, corners[1][1].2);
        let c3 = self.fetch3(corners[2][0].0, corners[2][0].1, corners[2][0].2)
            - self.fetch3(corners[2][1].0, corners[2][1].1, corners[2][1].2);
        let s0 = c0.mla(c1, x.frac);
        let s1 = s0.mla(c2, y.frac);
        s1.mla(c3, z.frac)
    }

    #[inline(always)]
    pub(crate) fn inter4(&self, x: GridCoord, y: GridCoord, z: GridCoord) -> Vector4f {
        let c0 = self.fetch4(x.idx, y.idx, z.idx);
        let corners = Self::corners(x, y, z);
        let c1 = self.fetch4(corners[0][0].0, corners[0][0].1, corners[0][0].2)
            - self.fetch4(corners[0][1].0, corners[0][1].1, corners[0][1].2);
        let c2 = self.fetch4(corners[1][0].0, corners[1][0].1, corners[1][0].2)
            - self.fetch4(corners[1][1].0, corners[1][1].1, corners[1][1].2);
        let c3 = self.fetch4(corners[2][0].0, corners[2][0].1, corners[2][0].2)
            - self.fetch4(corners[2][1].0, corners[2][1].1, corners[2][1].2);
        let s0 = c0.mla(c1, x.frac);
        let s1 = s0.mla(c2, y.frac);
        s1.mla(c3, z.frac)
    }

    /// Generic path for output arities without a specialised form.
    pub(crate) fn inter_n(&self, x: GridCoord, y: GridCoord, z: GridCoord, dst: &mut [f64]) {
        let base = self.offset(x.idx, y.idx, z.idx);
        let corners = Self::corners(x, y, z);
        let o = [
            self.offset(corners[0][0].0, corners[0][0].1, corners[0][0].2),
            self.offset(corners[0][1].0, corners[0][1].1, corners[0][1].2),
            self.offset(corners[1][0].0, corners[1][0].1, corners[1][0].2),
            self.offset(corners[1][1].0, corners[1][1].1, corners[1][1].2),
            self.offset(corners[2][0].0, corners[2][0].1, corners[2][0].2),
            self.offset(corners[2][1].0, corners[2][1].1, corners[2][1].2),
        ];
        let (rx, ry, rz) = (x.frac as f64, y.frac as f64, z.frac as f64);
        for (ch, out) in dst.iter_mut().enumerate().take(self.channels) {
            let c0 = self.cube[base + ch] as f64;
            let c1 = self.cube[o[0] + ch] as f64 - self.cube[o[1] + ch] as f64;
            let c2 = self.cube[o[2] + ch] as f64 - self.cube[o[3] + ch] as f64;
            let c3 = self.cube[o[4] + ch] as f64 - self.cube[o[5] + ch] as f64;
            *out = c0 + c1 * rx + c2 * ry + c3 * rz;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interp::grid_coord;

    fn coord(v: f64, g: usize) -> GridCoord {
        grid_coord(v, 1.0, g)
    }

    #[test]
    fn test_corner_fetch_is_exact() {
        // 2x2x2 grid holding node coordinates
        let mut table = Vec::new();
        for x in 0..2 {
            for y in 0..2 {
                for z in 0..2 {
                    table.extend_from_slice(&[x as f32, y as f32, z as f32]);
                }
            }
        }
        let t = Tetrahedral::new(&table, 2, 3);
        let r = t.inter3(coord(1.0, 2), coord(0.0, 2), coord(1.0, 2));
        assert_eq!(r.v, [1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_all_six_branches_agree_with_linear_ramp() {
        // a linear table: value = (x + 2y + 4z) / 7, tetrahedral
        // interpolation reproduces any linear function exactly
        let g = 4usize;
        let mut table = Vec::new();
        for x in 0..g {
            for y in 0..g {
                for z in 0..g {
                    let v = (x as f32 + 2.0 * y as f32 + 4.0 * z as f32) / (7.0 * (g - 1) as f32);
                    table.extend_from_slice(&[v, v, v]);
                }
            }
        }
        let t = Tetrahedral::new(&table, g, 3);
        // one probe inside each of the six orderings
        let probes = [
            (0.5, 0.3, 0.1),
            (0.5, 0.1, 0.3),
            (0.3, 0.1, 0.5),
            (0.3, 0.5, 0.1),
            (0.1, 0.5, 0.3),
            (0.1, 0.3, 0.5),
        ];
        for (px, py, pz) in probes {
            let r = t.inter3(coord(px, g), coord(py, g), coord(pz, g));
            let expected = (px + 2.0 * py + 4.0 * pz) as f32 / 7.0;
            assert!(
                (r.v[0] - expected).abs() < 1e-6,
                "probe ({px},{py},{pz}): {} vs {expected}",
                r.v[0]
            );
        }
    }

    #[test]
    fn test_generic_matches_specialised() {
        let g = 3usize;
        let mut table = Vec::new();
        for x in 0..g {
            for y in 0..g {
                for z in 0..g {
                    table.extend_from_slice(&[
                        x as f32 / 2.0,
                        y as f32 / 2.0,
                        z as f32 / 2.0,
                    ]);
                }
            }
        }
        let t = Tetrahedral::new(&table, g, 3);
        let (cx, cy, cz) = (coord(0.4, g), coord(0.7, g), coord(0.2, g));
        let fast = t.inter3(cx, cy, cz);
        let mut slow = [0f64; 3];
        t.inter_n(cx, cy, cz, &mut slow);
        for (f, s) in fast.v.iter().zip(slow.iter()) {
            assert!((*f as f64 - s).abs() < 1e-6);
        }
    }
}
