#![no_main]

use libfuzzer_sys::fuzz_target;
use linkcms::{
    ChainEntry, DataFormat, InterpolationMethod, RenderingIntent, Transform, TransformOptions,
};
use std::sync::LazyLock;

static STATIC_BAKED_TETRA: LazyLock<Transform> = LazyLock::new(|| build(true));
static STATIC_BAKED_TRI: LazyLock<Transform> = LazyLock::new(|| build(false));

fn build(tetrahedral: bool) -> Transform {
    let mut t = Transform::new(TransformOptions {
        data_format: DataFormat::Int8,
        built_lut: true,
        lut_grid_points_3d: 9,
        lut_interpolation_3d: if tetrahedral {
            InterpolationMethod::Tetrahedral
        } else {
            InterpolationMethod::Trilinear
        },
        ..TransformOptions::default()
    });
    t.create_multi_stage(
        vec![
            ChainEntry::Named("*sRGB".to_owned()),
            ChainEntry::Intent(RenderingIntent::RelativeColorimetric),
            ChainEntry::Named("*AdobeRGB".to_owned()),
        ],
        &[],
    )
    .expect("baked chain builds");
    t
}

fuzz_target!(|data: (Vec<u8>, bool, bool, bool, bool)| {
    let (pixels, tetra, in_alpha, out_alpha, preserve) = data;
    let transform = if tetra {
        &*STATIC_BAKED_TETRA
    } else {
        &*STATIC_BAKED_TRI
    };
    let stride = 3 + usize::from(in_alpha);
    let len = (pixels.len() / stride) * stride;
    let src = &pixels[..len];
    if let Ok(out) = transform.transform_array_via_lut_u8(src, in_alpha, out_alpha, preserve, None)
    {
        let out_stride = 3 + usize::from(out_alpha);
        assert_eq!(out.len() / out_stride, len / stride);
    }
});
