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
use pxfm::f_pow;

#[inline]
pub(crate) fn clamp_unit(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}

/// Tone reproduction curve: a sampled 16-bit table over [0, 1], or an ICC
/// parametric record `[g]`, `[g,a,b]`, `[g,a,b,c]`, `[g,a,b,c,d]`,
/// `[g,a,b,c,d,e,f]`.
#[derive(Clone, Debug, PartialEq)]
pub enum Trc {
    Lut(Vec<u16>),
    Parametric(Vec<f32>),
}

/// Linear interpolation into a normalized 16-bit table.
pub(crate) fn lut_interp_linear(input_value: f64, table: &[u16]) -> f64 {
    if table.is_empty() {
        return input_value;
    }
    if table.len() == 1 {
        // u8Fixed8 gamma packed into a single entry
        let gamma = table[0] as f64 / 256.0;
        return f_pow(clamp_unit(input_value), gamma);
    }
    let value = clamp_unit(input_value) * (table.len() - 1) as f64;
    let lower = value.floor() as usize;
    let upper = value.ceil() as usize;
    let frac = value - lower as f64;
    let a = table[lower] as f64;
    let b = table[upper] as f64;
    (a + (b - a) * frac) / 65535.0
}

/// Inverse lookup into a non-decreasing normalized 16-bit table.
pub(crate) fn lut_interp_linear_reverse(output_value: f64, table: &[u16]) -> f64 {
    if table.is_empty() {
        return output_value;
    }
    if table.len() == 1 {
        let gamma = table[0] as f64 / 256.0;
        if gamma == 0.0 {
            return 0.0;
        }
        return f_pow(clamp_unit(output_value), 1.0 / gamma);
    }
    let target = clamp_unit(output_value) * 65535.0;
    let last = table.len() - 1;
    if target <= table[0] as f64 {
        return 0.0;
    }
    if target >= table[last] as f64 {
        return 1.0;
    }
    let mut lo = 0usize;
    let mut hi = last;
    while hi - lo > 1 {
        let mid = (lo + hi) / 2;
        if (table[mid] as f64) < target {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    let a = table[lo] as f64;
    let b = table[hi] as f64;
    let frac = if b > a { (target - a) / (b - a) } else { 0.0 };
    (lo as f64 + frac) / last as f64
}

#[allow(clippy::many_single_char_names)]
fn parametric_eval(params: &[f32], x: f64) -> f64 {
    let p: Vec<f64> = params.iter().map(|&v| v as f64).collect();
    match p.len() {
        1 => {
            let g = p[0];
            f_pow(clamp_unit(x), g)
        }
        3 => {
            // Y = (aX + b)^g | X >= -b/a, else 0
            let (g, a, b) = (p[0], p[1], p[2]);
            let e = a * x + b;
            if e > 0.0 { f_pow(e, g) } else { 0.0 }
        }
        4 => {
            // Y = (aX + b)^g + c | X >= -b/a, else c
            let (g, a, b, c) = (p[0], p[1], p[2], p[3]);
            let e = a * x + b;
            if e > 0.0 { f_pow(e, g) + c } else { c }
        }
        5 => {
            // IEC 61966-2.1 shape:
            // Y = (aX + b)^g | X >= d
            // Y = cX         | X < d
            let (g, a, b, c, d) = (p[0], p[1], p[2], p[3], p[4]);
            if x >= d {
                let e = a * x + b;
                if e > 0.0 { f_pow(e, g) } else { 0.0 }
            } else {
                c * x
            }
        }
        7 => {
            let (g, a, b, c, d, e, f) = (p[0], p[1], p[2], p[3], p[4], p[5], p[6]);
            if x >= d {
                let t = a * x + b;
                if t > 0.0 { f_pow(t, g) + e } else { e }
            } else {
                c * x + f
            }
        }
        _ => x,
    }
}

fn parametric_eval_inverse(params: &[f32], y: f64) -> Option<f64> {
    let p: Vec<f64> = params.iter().map(|&v| v as f64).collect();
    match p.len() {
        1 => {
            let g = p[0];
            if g == 0.0 {
                return None;
            }
            Some(f_pow(clamp_unit(y), 1.0 / g))
        }
        5 => {
            let (g, a, b, c, d) = (p[0], p[1], p[2], p[3], p[4]);
            if g == 0.0 || a == 0.0 {
                return None;
            }
            let knee = c * d;
            if y < knee {
                if c == 0.0 {
                    return Some(0.0);
                }
                Some(y / c)
            } else {
                Some((f_pow(y.max(0.0), 1.0 / g) - b) / a)
            }
        }
        _ => None,
    }
}

impl Trc {
    /// Device value in [0, 1] to linear.
    pub fn eval(&self, x: f64) -> f64 {
        match self {
            Trc::Lut(table) => lut_interp_linear(x, table),
            Trc::Parametric(p) => parametric_eval(p, x),
        }
    }

    /// Linear value back to device. Sampled tables run a reverse lookup;
    /// parametric shapes invert analytically where the record allows and
    /// fall back to a sampled reverse otherwise.
    pub fn eval_inverse(&self, y: f64) -> f64 {
        match self {
            Trc::Lut(table) => lut_interp_linear_reverse(y, table),
            Trc::Parametric(p) => {
                if let Some(x) = parametric_eval_inverse(p, y) {
                    return x;
                }
                const SAMPLES: usize = 4096;
                let mut table = vec![0u16; SAMPLES];
                for (i, t) in table.iter_mut().enumerate() {
                    let x = i as f64 / (SAMPLES - 1) as f64;
                    *t = (parametric_eval(p, x).clamp(0.0, 1.0) * 65535.0 + 0.5) as u16;
                }
                lut_interp_linear_reverse(y, &table)
            }
        }
    }

    pub fn is_identity(&self) -> bool {
        match self {
            Trc::Lut(table) => {
                if table.is_empty() {
                    return true;
                }
                if table.len() == 1 {
                    return table[0] == 256;
                }
                false
            }
            Trc::Parametric(p) => p.len() == 1 && p[0] == 1.0,
        }
    }

    /// Single-entry u8Fixed8 gamma, the way v2 profiles encode pure powers.
    pub fn from_gamma(gamma: f32) -> Trc {
        Trc::Parametric(vec![gamma])
    }

    /// IEC 61966-2.1 sRGB curve.
    pub fn srgb() -> Trc {
        Trc::Parametric(vec![
            2.4,
            1.0 / 1.055,
            0.055 / 1.055,
            1.0 / 12.92,
            0.04045,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_srgb_knees() {
        let trc = Trc::srgb();
        assert!(trc.eval(0.0).abs() < 1e-12);
        assert!((trc.eval(1.0) - 1.0).abs() < 1e-9);
        // mid gray: 0.5 device -> ~0.2140 linear
        assert!((trc.eval(0.5) - 0.21404).abs() < 1e-4);
    }

    #[test]
    fn test_srgb_inverse_roundtrip() {
        let trc = Trc::srgb();
        for i in 0..=100 {
            let x = i as f64 / 100.0;
            let y = trc.eval(x);
            let back = trc.eval_inverse(y);
            assert!((back - x).abs() < 1e-9, "x={x} back={back}");
        }
    }

    #[test]
    fn test_gamma_inverse_roundtrip() {
        let trc = Trc::from_gamma(2.19921875);
        for i in 1..=100 {
            let x = i as f64 / 100.0;
            let back = trc.eval_inverse(trc.eval(x));
            assert!((back - x).abs() < 1e-9);
        }
    }

    #[test]
    fn test_lut_reverse() {
        let table: Vec<u16> = (0..=255)
            .map(|i| ((i as f64 / 255.0).powf(2.2) * 65535.0).round() as u16)
            .collect();
        let trc = Trc::Lut(table);
        for i in 0..=50 {
            let x = i as f64 / 50.0;
            let back = trc.eval_inverse(trc.eval(x));
            assert!((back - x).abs() < 1e-3, "x={x} back={back}");
        }
    }

    #[test]
    fn test_identity_detection() {
        assert!(Trc::Lut(vec![]).is_identity());
        assert!(Trc::Parametric(vec![1.0]).is_identity());
        assert!(!Trc::srgb().is_identity());
    }
}
