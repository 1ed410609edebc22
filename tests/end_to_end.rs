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
    ChainEntry, ColorValue, Lab, RenderingIntent, Transform, TransformOptions,
};

fn chain(names: &[&str], intent: RenderingIntent) -> Vec<ChainEntry> {
    let mut out = Vec::new();
    for (i, name) in names.iter().enumerate() {
        if i > 0 {
            out.push(ChainEntry::Intent(intent));
        }
        out.push(ChainEntry::Named((*name).to_owned()));
    }
    out
}

fn srgb_to_lab(round: bool) -> Transform {
    let mut t = Transform::new(TransformOptions {
        round_output: round,
        ..TransformOptions::default()
    });
    t.create_multi_stage(
        chain(&["*sRGB", "*Lab"], RenderingIntent::RelativeColorimetric),
        &[],
    )
    .unwrap();
    t
}

#[test]
fn test_srgb_white_to_lab() {
    let t = srgb_to_lab(false);
    let out = t.forward(&ColorValue::Rgb([255.0, 255.0, 255.0])).unwrap();
    let ColorValue::Lab(lab) = out else {
        panic!("expected Lab output, got {out:?}");
    };
    assert!((lab.l - 100.0).abs() < 1e-3, "L = {}", lab.l);
    assert!(lab.a.abs() < 1e-3, "a = {}", lab.a);
    assert!(lab.b.abs() < 1e-3, "b = {}", lab.b);
}

#[test]
fn test_srgb_black_to_lab() {
    let t = srgb_to_lab(false);
    let out = t.forward(&ColorValue::Rgb([0.0, 0.0, 0.0])).unwrap();
    let ColorValue::Lab(lab) = out else {
        panic!("expected Lab output");
    };
    assert!(lab.l.abs() < 1e-3);
    assert!(lab.a.abs() < 1e-3);
    assert!(lab.b.abs() < 1e-3);
}

#[test]
fn test_srgb_red_to_lab() {
    let t = srgb_to_lab(false);
    let out = t.forward(&ColorValue::Rgb([255.0, 0.0, 0.0])).unwrap();
    let ColorValue::Lab(lab) = out else {
        panic!("expected Lab output");
    };
    assert!((lab.l - 54.29).abs() < 0.05, "L = {}", lab.l);
    assert!((lab.a - 80.81).abs() < 0.05, "a = {}", lab.a);
    assert!((lab.b - 69.89).abs() < 0.05, "b = {}", lab.b);
}

#[test]
fn test_lab_mid_gray_to_srgb() {
    let mut t = Transform::new(TransformOptions::default());
    t.create_multi_stage(
        chain(&["*Lab", "*sRGB"], RenderingIntent::RelativeColorimetric),
        &[],
    )
    .unwrap();
    let out = t
        .forward(&ColorValue::Lab(Lab::new(50.0, 0.0, 0.0)))
        .unwrap();
    let ColorValue::Rgb(rgb) = out else {
        panic!("expected RGB output");
    };
    for ch in rgb {
        assert!((ch - 119.0).abs() < 0.5, "channel = {ch}");
    }
}

#[test]
fn test_srgb_adobe_srgb_roundtrip() {
    let mut t = Transform::new(TransformOptions::default());
    t.create_multi_stage(
        chain(
            &["*sRGB", "*AdobeRGB", "*sRGB"],
            RenderingIntent::RelativeColorimetric,
        ),
        &[],
    )
    .unwrap();
    let out = t.forward(&ColorValue::Rgb([128.0, 64.0, 200.0])).unwrap();
    let ColorValue::Rgb(rgb) = out else {
        panic!("expected RGB output");
    };
    assert!((rgb[0] - 128.0).abs() <= 1.0, "{rgb:?}");
    assert!((rgb[1] - 64.0).abs() <= 1.0, "{rgb:?}");
    assert!((rgb[2] - 200.0).abs() <= 1.0, "{rgb:?}");
}

#[test]
fn test_lab_d65_adapts_to_d50() {
    let mut t = Transform::new(TransformOptions {
        lab_adaptation: true,
        round_output: false,
        ..TransformOptions::default()
    });
    t.create_multi_stage(
        chain(&["*LabD65", "*Lab"], RenderingIntent::RelativeColorimetric),
        &[],
    )
    .unwrap();
    let out = t
        .forward(&ColorValue::Lab(Lab::new(50.0, 0.0, 0.0)))
        .unwrap();
    let ColorValue::Lab(lab) = out else {
        panic!("expected Lab output");
    };
    // a Bradford-type transform maps the neutral axis onto the neutral
    // axis, so a D65 gray lands close to the D50 gray axis
    assert!((lab.l - 50.0).abs() < 0.5, "L = {}", lab.l);
    assert!(lab.a.abs() < 4.0, "a = {}", lab.a);
    assert!(lab.b.abs() < 4.0, "b = {}", lab.b);
}

#[test]
fn test_output_format_follows_configuration() {
    let t = srgb_to_lab(true);
    let out = t.forward(&ColorValue::Rgb([10.0, 20.0, 30.0])).unwrap();
    assert!(matches!(out, ColorValue::Lab(_)));

    let mut t = Transform::new(TransformOptions {
        data_format: linkcms::DataFormat::Device,
        ..TransformOptions::default()
    });
    t.create_multi_stage(
        chain(&["*sRGB", "*Lab"], RenderingIntent::RelativeColorimetric),
        &[],
    )
    .unwrap();
    let out = t
        .forward(&ColorValue::Values(vec![0.1, 0.5, 0.9]))
        .unwrap();
    let ColorValue::Values(v) = out else {
        panic!("expected raw values");
    };
    assert_eq!(v.len(), 3);
}

#[test]
fn test_rounded_object_output() {
    let t = srgb_to_lab(true);
    let out = t.forward(&ColorValue::Rgb([200.0, 60.0, 30.0])).unwrap();
    let ColorValue::Lab(lab) = out else {
        panic!("expected Lab output");
    };
    assert_eq!(lab.l, lab.l.round());
    assert_eq!(lab.a, lab.a.round());
    assert_eq!(lab.b, lab.b.round());
}

#[test]
fn test_device_lab_identity_chain() {
    let mut t = Transform::new(TransformOptions {
        data_format: linkcms::DataFormat::Device,
        ..TransformOptions::default()
    });
    t.create_multi_stage(
        chain(&["*Lab", "*Lab"], RenderingIntent::RelativeColorimetric),
        &[],
    )
    .unwrap();
    let input = vec![0.5, 0.25, 0.75];
    let out = t.forward(&ColorValue::Values(input.clone())).unwrap();
    assert_eq!(out, ColorValue::Values(input));
}

#[test]
fn test_gray_to_srgb_is_neutral() {
    let mut t = Transform::new(TransformOptions::default());
    t.create_multi_stage(
        chain(&["*Gray", "*sRGB"], RenderingIntent::RelativeColorimetric),
        &[],
    )
    .unwrap();
    let out = t.forward(&ColorValue::Gray(128.0)).unwrap();
    let ColorValue::Rgb(rgb) = out else {
        panic!("expected RGB output");
    };
    assert!((rgb[0] - rgb[1]).abs() < 0.5, "{rgb:?}");
    assert!((rgb[1] - rgb[2]).abs() < 0.5, "{rgb:?}");
    assert!(rgb[0] > 100.0 && rgb[0] < 160.0, "{rgb:?}");
}

#[test]
fn test_int8_bulk_roundtrip() {
    let mut t = Transform::new(TransformOptions {
        data_format: linkcms::DataFormat::Int8,
        ..TransformOptions::default()
    });
    t.create_multi_stage(
        chain(
            &["*sRGB", "*AdobeRGB", "*sRGB"],
            RenderingIntent::RelativeColorimetric,
        ),
        &[],
    )
    .unwrap();
    let src: Vec<u8> = vec![128, 64, 200, 255, 255, 255, 0, 0, 0, 17, 170, 90];
    let out = t
        .transform_array_u8(&src, false, false, false, None)
        .unwrap();
    assert_eq!(out.len(), src.len());
    for (a, b) in src.iter().zip(out.iter()) {
        assert!(
            (*a as i32 - *b as i32).abs() <= 2,
            "roundtrip drifted: {src:?} -> {out:?}"
        );
    }
}

#[test]
fn test_alpha_handling_in_bulk_paths() {
    let mut t = Transform::new(TransformOptions {
        data_format: linkcms::DataFormat::Int8,
        ..TransformOptions::default()
    });
    t.create_multi_stage(
        chain(&["*sRGB", "*sRGB"], RenderingIntent::RelativeColorimetric),
        &[],
    )
    .unwrap();
    let src: Vec<u8> = vec![10, 20, 30, 99, 200, 100, 50, 44];
    let out = t.transform_array_u8(&src, true, true, true, None).unwrap();
    assert_eq!(out.len(), 8);
    assert_eq!(out[3], 99);
    assert_eq!(out[7], 44);

    let injected = t
        .transform_array_u8(&[10, 20, 30], false, true, false, None)
        .unwrap();
    assert_eq!(injected.len(), 4);
    assert_eq!(injected[3], 255);
}

#[test]
fn test_absolute_intent_emits_no_bpc() {
    // optimisation left off so stage names stay unfused
    let mut t = Transform::new(TransformOptions {
        optimise: false,
        ..TransformOptions::default()
    });
    t.create_multi_stage(
        chain(
            &["*sRGB", "*Lab"],
            RenderingIntent::AbsoluteColorimetric,
        ),
        &[],
    )
    .unwrap();
    assert!(!t.stage_names().contains("bpc"));
    // but absolute adaptation is present
    assert!(t.stage_names().contains("absoluteAdaptation"));
}

#[test]
fn test_matrix_to_matrix_hop_emits_no_bpc() {
    let mut t = Transform::new(TransformOptions::default());
    t.create_multi_stage(
        chain(
            &["*sRGB", "*AdobeRGB"],
            RenderingIntent::Perceptual,
        ),
        &[],
    )
    .unwrap();
    assert!(!t.stage_names().contains("bpc"));
}

#[test]
fn test_multi_hop_count() {
    let mut t = Transform::new(TransformOptions::default());
    t.create_multi_stage(
        chain(
            &["*sRGB", "*Lab", "*sRGB"],
            RenderingIntent::RelativeColorimetric,
        ),
        &[],
    )
    .unwrap();
    // 5 entries -> 2 hops; round trip through Lab keeps the color
    let out = t.forward(&ColorValue::Rgb([120.0, 33.0, 250.0])).unwrap();
    let ColorValue::Rgb(rgb) = out else {
        panic!("expected RGB");
    };
    assert!((rgb[0] - 120.0).abs() <= 1.0);
    assert!((rgb[1] - 33.0).abs() <= 1.0);
    assert!((rgb[2] - 250.0).abs() <= 1.0);
}

#[test]
fn test_transform_values_batch() {
    let t = srgb_to_lab(false);
    let values = vec![
        ColorValue::Rgb([255.0, 255.0, 255.0]),
        ColorValue::Rgb([0.0, 0.0, 0.0]),
    ];
    let out = t.transform_values(&values).unwrap();
    assert_eq!(out.len(), 2);
    let ColorValue::Lab(white) = &out[0] else {
        panic!("expected Lab");
    };
    assert!((white.l - 100.0).abs() < 1e-3);
}

#[test]
fn test_custom_stage_at_pcs_anchor() {
    use linkcms::{CustomStage, StageAnchor};
    use std::sync::Arc;

    let passthrough = CustomStage {
        anchor: StageAnchor::Pcs(Some(0)),
        name: "proofMark".to_owned(),
        func: Arc::new(|v: &[f64]| v.to_vec()),
    };
    let mut t = Transform::new(TransformOptions {
        optimise: false,
        round_output: false,
        ..TransformOptions::default()
    });
    t.create_multi_stage(
        chain(&["*sRGB", "*Lab"], RenderingIntent::RelativeColorimetric),
        &[passthrough],
    )
    .unwrap();
    assert!(t.stage_names().contains("proofMark"));
    let out = t.forward(&ColorValue::Rgb([255.0, 255.0, 255.0])).unwrap();
    let ColorValue::Lab(lab) = out else {
        panic!("expected Lab output");
    };
    assert!((lab.l - 100.0).abs() < 1e-3);
}

#[test]
fn test_debug_history_records_stages() {
    let mut t = Transform::new(TransformOptions {
        pipeline_debug: true,
        ..TransformOptions::default()
    });
    t.create_multi_stage(
        chain(&["*sRGB", "*Lab"], RenderingIntent::RelativeColorimetric),
        &[],
    )
    .unwrap();
    t.forward(&ColorValue::Rgb([255.0, 0.0, 0.0])).unwrap();
    let info = t.debug_info();
    assert!(info.contains("matrix_rgb"), "{info}");
    assert_eq!(info.lines().count(), t.stages().len());
}
