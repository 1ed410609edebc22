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
use crate::stage::{Stage, StageOp};
use std::sync::Arc;

const OUTPUT_SCALE_SNAP: f64 = 0.01;

/// Peephole rewriter over the stage list. Scans repeatedly for adjacent
/// patterns and rewrites in place until a pass produces no rewrite.
/// Rewrites preserve numerical semantics up to the output-scale snap.
pub(crate) fn optimise_stages(stages: &mut Vec<Stage>, log: &mut Vec<String>) -> usize {
    let mut passes = 0usize;
    loop {
        passes += 1;
        let mut changed = false;
        let mut i = 0usize;
        while i + 1 < stages.len() {
            if rewrite_pair(stages, i, log) {
                changed = true;
                i = i.saturating_sub(1);
            } else {
                i += 1;
            }
        }
        // a stuck rewrite cannot happen, this bounds pathological lists
        if !changed || passes > 64 {
            return passes;
        }
    }
}

fn rewrite_pair(stages: &mut Vec<Stage>, i: usize, log: &mut Vec<String>) -> bool {
    enum Rewrite {
        DropBoth,
        MergeConvert,
        FuseMatrices,
        FoldIntoInputScale,
        FoldIntoOutputScale,
        AliasNull,
    }

    let action = {
        let a = &stages[i];
        let b = &stages[i + 1];
        match (&a.op, &b.op) {
            (StageOp::PcsConvert, StageOp::PcsConvert) => {
                if a.in_encoding == b.out_encoding {
                    Some(Rewrite::DropBoth)
                } else {
                    Some(Rewrite::MergeConvert)
                }
            }
            (StageOp::Matrix { clip: false, .. }, StageOp::Matrix { .. }) => {
                Some(Rewrite::FuseMatrices)
            }
            (StageOp::IntToDevice { .. }, StageOp::Interp { .. }) => {
                Some(Rewrite::FoldIntoInputScale)
            }
            (StageOp::Interp { .. }, StageOp::DeviceToInt { scale, .. }) if *scale != 1.0 => {
                Some(Rewrite::FoldIntoOutputScale)
            }
            (StageOp::Null, _) if a.out_encoding != b.in_encoding => Some(Rewrite::AliasNull),
            _ => None,
        }
    };

    let Some(action) = action else {
        return false;
    };

    match action {
        Rewrite::DropBoth => {
            log.push(format!(
                "cancelled {} . {}",
                stages[i].name,
                stages[i + 1].name
            ));
            stages.drain(i..i + 2);
        }
        Rewrite::MergeConvert => {
            let from = stages[i].in_encoding;
            let to = stages[i + 1].out_encoding;
            log.push(format!(
                "merged {} . {} into {}2{}",
                stages[i].name,
                stages[i + 1].name,
                from.name(),
                to.name()
            ));
            let mut merged = Stage::pcs_convert(from, to);
            merged.optimised = true;
            stages.splice(i..i + 2, [merged]);
        }
        Rewrite::FuseMatrices => {
            let (m1, b1) = match &stages[i].op {
                StageOp::Matrix { m, bias, .. } => (*m, *bias),
                _ => unreachable!(),
            };
            let (m2, b2, clip2) = match &stages[i + 1].op {
                StageOp::Matrix { m, bias, clip } => (*m, *bias, *clip),
                _ => unreachable!(),
            };
            let name = if stages[i].name == stages[i + 1].name {
                stages[i].name.clone()
            } else {
                "matrix".to_owned()
            };
            log.push(format!(
                "fused {} . {}",
                stages[i].name,
                stages[i + 1].name
            ));
            let mut fused = Stage::new(
                &name,
                stages[i].in_encoding,
                stages[i + 1].out_encoding,
                StageOp::Matrix {
                    m: m2.mat_mul(m1),
                    bias: m2.mul_vector(b1) + b2,
                    clip: clip2,
                },
            );
            fused.optimised = true;
            stages.splice(i..i + 2, [fused]);
        }
        Rewrite::FoldIntoInputScale => {
            let divisor = match &stages[i].op {
                StageOp::IntToDevice { divisor } => *divisor,
                _ => unreachable!(),
            };
            let in_encoding = stages[i].in_encoding;
            log.push(format!(
                "folded {} into {} input scale 1/{divisor}",
                stages[i].name,
                stages[i + 1].name
            ));
            if let StageOp::Interp { lut, .. } = &mut stages[i + 1].op {
                Arc::make_mut(lut).input_scale = 1.0 / divisor;
            }
            stages[i + 1].in_encoding = in_encoding;
            stages[i + 1].optimised = true;
            stages.remove(i);
        }
        Rewrite::FoldIntoOutputScale => {
            let scale = match &stages[i + 1].op {
                StageOp::DeviceToInt { scale, .. } => *scale,
                _ => unreachable!(),
            };
            log.push(format!(
                "folded {} scale {scale} into {} output scale",
                stages[i + 1].name,
                stages[i].name
            ));
            if let StageOp::Interp { lut, .. } = &mut stages[i].op {
                let lut = Arc::make_mut(lut);
                lut.output_scale *= scale;
                // 255 <-> 65535 requantisation leaves the product a hair
                // off unity; snap it back
                if (lut.output_scale - 1.0).abs() < OUTPUT_SCALE_SNAP {
                    lut.output_scale = 1.0;
                }
            }
            stages[i].optimised = true;
            if let StageOp::DeviceToInt { scale, .. } = &mut stages[i + 1].op {
                *scale = 1.0;
            }
            stages[i + 1].optimised = true;
        }
        Rewrite::AliasNull => {
            let target = stages[i + 1].in_encoding;
            log.push(format!(
                "aliased {} output onto {}",
                stages[i].name,
                target.name()
            ));
            stages[i].out_encoding = target;
        }
    }
    true
}
