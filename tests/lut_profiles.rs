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
use linkcms::{
    ChainEntry, Clut, ColorProfile, ColorValue, DataColorSpace, ProfileClass, ProfileLut,
    ProfileVersion, RenderingIntent, Transform, TransformOptions, Trc,
};
use std::sync::Arc;

const GRID: usize = 5;

/// Synthetic CMYK coverage curve: encoded L drops linearly with total ink.
fn ink_to_l(c: f64, m: f64, y: f64, k: f64) -> f64 {
    1.0 - (0.3 * c + 0.3 * m + 0.1 * y + 0.3 * k).min(1.0)
}

fn cmyk_a2b() -> Clut {
    let mut table = Vec::new();
    let s = 1.0 / (GRID - 1) as f64;
    for c in 0..GRID {
        for m in 0..GRID {
            for y in 0..GRID {
                for k in 0..GRID {
                    let l = ink_to_l(c as f64 * s, m as f64 * s, y as f64 * s, k as f64 * s);
                    table.extend_from_slice(&[l as f32, 0.5, 0.5]);
                }
            }
        }
    }
    Clut::new(4, 3, vec![GRID; 4], table).unwrap()
}

fn cmyk_b2a() -> Clut {
    let mut table = Vec::new();
    let s = 1.0 / (GRID - 1) as f64;
    for l in 0..GRID {
        for _a in 0..GRID {
            for _b in 0..GRID {
                let ink = 1.0 - l as f64 * s;
                table.extend_from_slice(&[
                    (ink * 0.5) as f32,
                    (ink * 0.5) as f32,
                    (ink * 0.5) as f32,
                    ink as f32,
                ]);
            }
        }
    }
    Clut::new(3, 4, vec![GRID; 3], table).unwrap()
}

fn fake_cmyk(version: ProfileVersion) -> ColorProfile {
    let mut p = ColorProfile::new_lab_d50();
    p.profile_class = ProfileClass::Printer;
    p.color_space = DataColorSpace::Cmyk;
    p.pcs = DataColorSpace::Lab;
    p.version = version;
    p.a2b[1] = Some(ProfileLut {
        clut: Some(cmyk_a2b()),
        ..ProfileLut::default()
    });
    p.b2a[1] = Some(ProfileLut {
        clut: Some(cmyk_b2a()),
        ..ProfileLut::default()
    });
    p.description = "FakeCMYK".to_owned();
    p
}

fn fake_duo() -> ColorProfile {
    // two inks feeding L only
    let mut table = Vec::new();
    let s = 1.0 / (GRID - 1) as f64;
    for d0 in 0..GRID {
        for d1 in 0..GRID {
            let l = 1.0 - (0.6 * d0 as f64 * s + 0.4 * d1 as f64 * s).min(1.0);
            table.extend_from_slice(&[l as f32, 0.5, 0.5]);
        }
    }
    let mut p = ColorProfile::new_lab_d50();
    p.profile_class = ProfileClass::Printer;
    p.color_space = DataColorSpace::Duo;
    p.pcs = DataColorSpace::Lab;
    p.a2b[1] = Some(ProfileLut {
        clut: Some(Clut::new(2, 3, vec![GRID; 2], table).unwrap()),
        ..ProfileLut::default()
    });
    p.description = "FakeDuo".to_owned();
    p
}

/// An RGB profile driven by device LUTs instead of matrix/TRC data.
fn fake_rgb_lut(version: ProfileVersion) -> ColorProfile {
    let s = 1.0 / (GRID - 1) as f64;
    let neutral = (128.0 / 255.0) as f32;
    // A2B: device RGB -> Lab PCS, encoded L follows luma
    let mut a2b_table = Vec::new();
    for r in 0..GRID {
        for g in 0..GRID {
            for b in 0..GRID {
                let luma = 0.3 * r as f64 * s + 0.6 * g as f64 * s + 0.1 * b as f64 * s;
                a2b_table.extend_from_slice(&[luma as f32, neutral, neutral]);
            }
        }
    }
    // B2A: Lab PCS -> device RGB, every channel follows L
    let mut b2a_table = Vec::new();
    for l in 0..GRID {
        for _a in 0..GRID {
            for _b in 0..GRID {
                let v = (l as f64 * s) as f32;
                b2a_table.extend_from_slice(&[v, v, v]);
            }
        }
    }
    let mut p = ColorProfile::new_lab_d50();
    p.profile_class = ProfileClass::Display;
    p.color_space = DataColorSpace::Rgb;
    p.pcs = DataColorSpace::Lab;
    p.version = version;
    p.a2b[1] = Some(ProfileLut {
        clut: Some(Clut::new(3, 3, vec![GRID; 3], a2b_table).unwrap()),
        ..ProfileLut::default()
    });
    p.b2a[1] = Some(ProfileLut {
        clut: Some(Clut::new(3, 3, vec![GRID; 3], b2a_table).unwrap()),
        ..ProfileLut::default()
    });
    p.description = "FakeRgbLut".to_owned();
    p
}

fn cmyk_to_lab(version: ProfileVersion, intent: RenderingIntent) -> Transform {
    let mut t = Transform::new(TransformOptions {
        round_output: false,
        ..TransformOptions::default()
    });
    t.create_multi_stage(
        vec![
            ChainEntry::Profile(Arc::new(fake_cmyk(version))),
            ChainEntry::Intent(intent),
            ChainEntry::Named("*Lab".to_owned()),
        ],
        &[],
    )
    .unwrap();
    t
}

#[test]
fn test_cmyk_paper_white_to_lab() {
    let t = cmyk_to_lab(ProfileVersion::V4, RenderingIntent::RelativeColorimetric);
    let out = t
        .forward(&ColorValue::Cmyk([0.0, 0.0, 0.0, 0.0]))
        .unwrap();
    let ColorValue::Lab(lab) = out else {
        panic!("expected Lab output");
    };
    assert!((lab.l - 100.0).abs() < 1e-3, "L = {}", lab.l);
    assert!(lab.a.abs() <= 0.5 && lab.b.abs() <= 0.5, "{lab:?}");
}

#[test]
fn test_cmyk_full_ink_to_lab() {
    let t = cmyk_to_lab(ProfileVersion::V4, RenderingIntent::RelativeColorimetric);
    let out = t
        .forward(&ColorValue::Cmyk([100.0, 100.0, 100.0, 100.0]))
        .unwrap();
    let ColorValue::Lab(lab) = out else {
        panic!("expected Lab output");
    };
    assert!(lab.l.abs() < 1e-3, "L = {}", lab.l);
}

#[test]
fn test_cmyk_4d_interpolation_off_grid() {
    let t = cmyk_to_lab(ProfileVersion::V4, RenderingIntent::RelativeColorimetric);
    let out = t
        .forward(&ColorValue::Cmyk([50.0, 40.0, 30.0, 20.0]))
        .unwrap();
    let ColorValue::Lab(lab) = out else {
        panic!("expected Lab output");
    };
    // the coverage curve is linear, so tetrahedral sampling is exact
    let expected = ink_to_l(0.5, 0.4, 0.3, 0.2) * 100.0;
    assert!((lab.l - expected).abs() < 0.01, "L = {} vs {expected}", lab.l);
}

#[test]
fn test_v2_profile_gets_v2_encoding_stages() {
    let mut t = Transform::new(TransformOptions {
        round_output: false,
        optimise: false,
        ..TransformOptions::default()
    });
    t.create_multi_stage(
        vec![
            ChainEntry::Profile(Arc::new(fake_cmyk(ProfileVersion::V2))),
            ChainEntry::Intent(RenderingIntent::RelativeColorimetric),
            ChainEntry::Named("*Lab".to_owned()),
        ],
        &[],
    )
    .unwrap();
    // the v2 LUT emits PCSv2, the v4 Lab endpoint needs PCSv4
    assert!(t.stage_names().contains("PCSv22PCSv4"), "{}", t.stage_names());

    let out = t
        .forward(&ColorValue::Cmyk([0.0, 0.0, 0.0, 0.0]))
        .unwrap();
    let ColorValue::Lab(lab) = out else {
        panic!("expected Lab output");
    };
    // the 8000h/8080h rescale shifts this synthetic unit white by ~0.4 L
    assert!((lab.l - 100.0).abs() < 0.5, "L = {}", lab.l);
}

#[test]
fn test_v4_perceptual_hop_emits_bpc_exactly_once() {
    let mut t = Transform::new(TransformOptions {
        optimise: false,
        ..TransformOptions::default()
    });
    t.create_multi_stage(
        vec![
            ChainEntry::Profile(Arc::new(fake_cmyk(ProfileVersion::V4))),
            ChainEntry::Intent(RenderingIntent::Perceptual),
            ChainEntry::Profile(Arc::new(fake_cmyk(ProfileVersion::V2))),
        ],
        &[],
    )
    .unwrap();
    let bpc_count = t
        .stage_names()
        .split(" -> ")
        .filter(|n| *n == "bpc")
        .count();
    assert_eq!(bpc_count, 1, "{}", t.stage_names());
}

#[test]
fn test_duo_profile_uses_bilinear_path() {
    let mut t = Transform::new(TransformOptions {
        round_output: false,
        ..TransformOptions::default()
    });
    t.create_multi_stage(
        vec![
            ChainEntry::Profile(Arc::new(fake_duo())),
            ChainEntry::Intent(RenderingIntent::RelativeColorimetric),
            ChainEntry::Named("*Lab".to_owned()),
        ],
        &[],
    )
    .unwrap();
    assert_eq!(t.input_channels(), 2);
    // object format carries Duo inks on the 0-255 range
    let out = t
        .forward(&ColorValue::Values(vec![127.5, 127.5]))
        .unwrap();
    let ColorValue::Lab(lab) = out else {
        panic!("expected Lab output");
    };
    let expected = (1.0 - (0.6 * 0.5 + 0.4 * 0.5)) * 100.0;
    assert!((lab.l - expected).abs() < 0.01, "L = {}", lab.l);
}

#[test]
fn test_rgb_lut_profile_runs_through_device_lut() {
    let mut t = Transform::new(TransformOptions {
        round_output: false,
        ..TransformOptions::default()
    });
    t.create_multi_stage(
        vec![
            ChainEntry::Profile(Arc::new(fake_rgb_lut(ProfileVersion::V4))),
            ChainEntry::Intent(RenderingIntent::RelativeColorimetric),
            ChainEntry::Named("*Lab".to_owned()),
        ],
        &[],
    )
    .unwrap();
    // the device LUT, not a matrix, carries this hop
    assert!(t.stage_names().contains("interp"), "{}", t.stage_names());
    assert!(!t.stage_names().contains("matrix_rgb"), "{}", t.stage_names());

    let out = t.forward(&ColorValue::Rgb([255.0, 0.0, 0.0])).unwrap();
    let ColorValue::Lab(lab) = out else {
        panic!("expected Lab output");
    };
    // pure red carries 0.3 luma, the neutral placeholders decode to zero
    // up to f32 table storage
    assert!((lab.l - 30.0).abs() < 0.01, "L = {}", lab.l);
    assert!(lab.a.abs() < 1e-4 && lab.b.abs() < 1e-4, "{lab:?}");
}

#[test]
fn test_rgb_lut_object_output_wraps_as_rgb() {
    let mut t = Transform::new(TransformOptions::default());
    t.create_multi_stage(
        vec![
            ChainEntry::Named("*Lab".to_owned()),
            ChainEntry::Intent(RenderingIntent::RelativeColorimetric),
            ChainEntry::Profile(Arc::new(fake_rgb_lut(ProfileVersion::V4))),
        ],
        &[],
    )
    .unwrap();
    let out = t
        .forward(&ColorValue::Lab(linkcms::Lab::new(40.0, 0.0, 0.0)))
        .unwrap();
    let ColorValue::Rgb(rgb) = out else {
        panic!("expected RGB output, got {out:?}");
    };
    // every B2A channel follows L: 0.4 * 255 = 102
    for ch in rgb {
        assert!((ch - 102.0).abs() <= 0.5, "{rgb:?}");
    }
}

#[test]
fn test_rgb_lut_max_colourant_black_feeds_bpc() {
    use linkcms::BpcMode;
    let mut t = Transform::new(TransformOptions {
        bpc: BpcMode::All(true),
        optimise: false,
        ..TransformOptions::default()
    });
    // v2 on both sides keeps black detection off the trivial paths: the
    // RGB LUT input probes its zero-ink black, the CMYK output its
    // round-trip black, and the two differ
    t.create_multi_stage(
        vec![
            ChainEntry::Profile(Arc::new(fake_rgb_lut(ProfileVersion::V2))),
            ChainEntry::Intent(RenderingIntent::RelativeColorimetric),
            ChainEntry::Profile(Arc::new(fake_cmyk(ProfileVersion::V2))),
        ],
        &[],
    )
    .unwrap();
    let bpc_count = t
        .stage_names()
        .split(" -> ")
        .filter(|n| *n == "bpc")
        .count();
    assert_eq!(bpc_count, 1, "{}", t.stage_names());

    let out = t.forward(&ColorValue::Rgb([10.0, 10.0, 10.0])).unwrap();
    assert!(matches!(out, ColorValue::Cmyk(_)), "{out:?}");
}

#[test]
fn test_mab_pcs_side_curves_apply_last() {
    // a squaring B-curve on the PCS side halves mid-coverage L
    let mut profile = fake_cmyk(ProfileVersion::V4);
    if let Some(lut) = profile.a2b[1].as_mut() {
        lut.b_curves = Some(vec![
            Trc::from_gamma(2.0),
            Trc::from_gamma(1.0),
            Trc::from_gamma(1.0),
        ]);
    }
    let mut t = Transform::new(TransformOptions {
        round_output: false,
        ..TransformOptions::default()
    });
    t.create_multi_stage(
        vec![
            ChainEntry::Profile(Arc::new(profile)),
            ChainEntry::Intent(RenderingIntent::RelativeColorimetric),
            ChainEntry::Named("*Lab".to_owned()),
        ],
        &[],
    )
    .unwrap();
    // total ink 0.5 -> encoded L 0.5 -> squared -> 0.25 -> L 25
    let out = t
        .forward(&ColorValue::Cmyk([0.0, 100.0, 0.0, 66.0 + 2.0 / 3.0]))
        .unwrap();
    let ColorValue::Lab(lab) = out else {
        panic!("expected Lab output");
    };
    assert!((lab.l - 25.0).abs() < 0.2, "L = {}", lab.l);
}
