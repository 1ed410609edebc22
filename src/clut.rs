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
use crate::err::CmsError;

/// A regular n-dimensional color lookup table, channel-major within a
/// row-major grid. The first input channel carries the largest stride.
#[derive(Clone, Debug, PartialEq)]
pub struct Clut {
    pub input_channels: usize,
    pub output_channels: usize,
    pub grid_points: Vec<usize>,
    pub table: Vec<f32>,
    /// Maps incoming raw values into [0, 1] before grid indexing.
    pub input_scale: f64,
    /// Maps stored values back into device units after interpolation.
    pub output_scale: f64,
    /// None for native float payloads, 8 or 16 for quantised ones.
    pub precision: Option<u8>,
}

impl Clut {
    pub fn new(
        input_channels: usize,
        output_channels: usize,
        grid_points: Vec<usize>,
        table: Vec<f32>,
    ) -> Result<Self, CmsError> {
        if !(1..=4).contains(&input_channels) {
            return Err(CmsError::UnsupportedLutArity(input_channels));
        }
        let expected: usize = grid_points
            .iter()
            .take(input_channels)
            .product::<usize>()
            * output_channels;
        if table.len() != expected || grid_points.len() < input_channels {
            return Err(CmsError::InvalidClutSize {
                expected,
                found: table.len(),
            });
        }
        Ok(Clut {
            input_channels,
            output_channels,
            grid_points,
            table,
            input_scale: 1.0,
            output_scale: 1.0,
            precision: None,
        })
    }

    /// Grid resolution; identical per axis in practice.
    #[inline]
    pub fn grid(&self) -> usize {
        self.grid_points[0]
    }

    /// Output strides `go0..go3`: oc, g*oc, g^2*oc, g^3*oc.
    #[inline]
    pub(crate) fn output_strides(&self) -> [usize; 4] {
        let g = self.grid();
        let oc = self.output_channels;
        [oc, g * oc, g * g * oc, g * g * g * oc]
    }

    /// Identity table mapping each grid node onto its own coordinates.
    pub fn identity(input_channels: usize, grid: usize) -> Result<Self, CmsError> {
        if !(1..=4).contains(&input_channels) {
            return Err(CmsError::UnsupportedLutArity(input_channels));
        }
        let nodes = grid.pow(input_channels as u32);
        let mut table = vec![0f32; nodes * input_channels];
        let scale = 1.0 / (grid - 1) as f32;
        for node in 0..nodes {
            // first channel owns the largest stride
            for ch in 0..input_channels {
                let stride = grid.pow((input_channels - 1 - ch) as u32);
                let coord = (node / stride) % grid;
                table[node * input_channels + ch] = coord as f32 * scale;
            }
        }
        Clut::new(input_channels, input_channels, vec![grid; input_channels], table)
    }
}
