#![no_main]

use libfuzzer_sys::fuzz_target;
use linkcms::{ChainEntry, ColorValue, RenderingIntent, Transform, TransformOptions};

const NAMES: [&str; 6] = ["*sRGB", "*AdobeRGB", "*Lab", "*LabD65", "*XYZ", "*Gray"];

fuzz_target!(|data: (Vec<u8>, u8, [u8; 3])| {
    let (picks, intent_seed, pixel) = data;
    if picks.is_empty() || picks.len() > 5 {
        return;
    }
    let intent = RenderingIntent::from_code(intent_seed % 4).unwrap_or_default();
    let mut chain = Vec::new();
    for (i, pick) in picks.iter().enumerate() {
        if i > 0 {
            chain.push(ChainEntry::Intent(intent));
        }
        chain.push(ChainEntry::Named(
            NAMES[*pick as usize % NAMES.len()].to_owned(),
        ));
    }

    let mut t = Transform::new(TransformOptions::default());
    if t.create_multi_stage(chain, &[]).is_err() {
        return;
    }
    let input = match t.input_channels() {
        1 => ColorValue::Gray(pixel[0] as f64),
        3 => ColorValue::Rgb([pixel[0] as f64, pixel[1] as f64, pixel[2] as f64]),
        _ => return,
    };
    // a built pipeline must execute panic-free on any input
    let _ = t.forward(&input);
});
