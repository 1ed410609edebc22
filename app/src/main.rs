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
    ChainEntry, ColorValue, DataFormat, Lab, RenderingIntent, Transform, TransformOptions,
};
use rand::Rng;

fn named_chain(names: &[&str], intent: RenderingIntent) -> Vec<ChainEntry> {
    let mut chain = Vec::new();
    for (i, name) in names.iter().enumerate() {
        if i > 0 {
            chain.push(ChainEntry::Intent(intent));
        }
        chain.push(ChainEntry::Named((*name).to_owned()));
    }
    chain
}

fn main() {
    let mut to_lab = Transform::new(TransformOptions {
        round_output: false,
        verbose: true,
        ..TransformOptions::default()
    });
    to_lab
        .create_multi_stage(
            named_chain(&["*sRGB", "*Lab"], RenderingIntent::RelativeColorimetric),
            &[],
        )
        .expect("sRGB -> Lab chain builds");

    println!("chain:  {}", to_lab.chain_info());
    println!("stages: {}", to_lab.stage_names());
    println!("opt:    {}", to_lab.optimise_info());

    for rgb in [[255.0, 255.0, 255.0], [255.0, 0.0, 0.0], [32.0, 96.0, 180.0]] {
        let out = to_lab.forward(&ColorValue::Rgb(rgb)).expect("forward");
        if let ColorValue::Lab(lab) = out {
            println!(
                "RGB({:3.0},{:3.0},{:3.0}) -> Lab({:7.3}, {:7.3}, {:7.3})",
                rgb[0], rgb[1], rgb[2], lab.l, lab.a, lab.b
            );
        }
    }

    let mut to_rgb = Transform::new(TransformOptions {
        round_output: true,
        ..TransformOptions::default()
    });
    to_rgb
        .create_multi_stage(
            named_chain(&["*Lab", "*sRGB"], RenderingIntent::RelativeColorimetric),
            &[],
        )
        .expect("Lab -> sRGB chain builds");
    let gray = to_rgb
        .forward(&ColorValue::Lab(Lab::new(50.0, 0.0, 0.0)))
        .expect("forward");
    println!("Lab(50,0,0) -> {gray:?}");

    // baked path over a random image strip
    let mut baked = Transform::new(TransformOptions {
        data_format: DataFormat::Int8,
        built_lut: true,
        ..TransformOptions::default()
    });
    baked
        .create_multi_stage(
            named_chain(
                &["*sRGB", "*AdobeRGB"],
                RenderingIntent::RelativeColorimetric,
            ),
            &[],
        )
        .expect("baked chain builds");

    let mut rng = rand::rng();
    let src: Vec<u8> = (0..256 * 3).map(|_| rng.random_range(0..=255)).collect();
    let dst = baked
        .transform_array_via_lut_u8(&src, false, false, false, None)
        .expect("bulk transform");
    println!(
        "baked sRGB -> AdobeRGB strip: first pixel {:?} -> {:?}",
        &src[0..3],
        &dst[0..3]
    );
}
