#![cfg(feature = "rayon")]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rotmatch::lowlevel::{match_with_angle, AngleSweep, SweepOptions};
use rotmatch::{rotate_image, MatchConfig, Matcher, OwnedImage, Rect};

fn noise_image(width: usize, height: usize, seed: u64) -> OwnedImage {
    let mut rng = StdRng::seed_from_u64(seed);
    let data: Vec<u8> = (0..width * height).map(|_| rng.random::<u8>()).collect();
    OwnedImage::new(data, width, height).unwrap()
}

/// Smooth interference pattern; rotating it changes the correlation gradually.
fn texture_image(width: usize, height: usize) -> OwnedImage {
    let mut data = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            let (xf, yf) = (x as f64, y as f64);
            let v = 128.0
                + 55.0 * (0.31 * xf + 0.17 * yf).sin()
                + 45.0 * (0.23 * yf - 0.13 * xf).cos()
                + 20.0 * (0.07 * xf * yf / 8.0).sin();
            data.push(v.round().clamp(0.0, 255.0) as u8);
        }
    }
    OwnedImage::new(data, width, height).unwrap()
}

#[test]
fn parallel_sweep_matches_sequential() {
    let base = texture_image(71, 65);
    let template =
        OwnedImage::from_view(base.view().window(Rect::new(25, 20, 18, 14)).unwrap()).unwrap();
    let search = rotate_image(base.view(), 3.0).unwrap();
    let sweep = AngleSweep::new(6.0, 1.0).unwrap();

    let sequential = match_with_angle(
        template.view(),
        search.view(),
        &sweep,
        &SweepOptions {
            parallel: false,
            ..SweepOptions::default()
        },
    )
    .unwrap();
    let parallel = match_with_angle(
        template.view(),
        search.view(),
        &sweep,
        &SweepOptions {
            parallel: true,
            ..SweepOptions::default()
        },
    )
    .unwrap();

    assert_eq!(sequential, parallel);
    assert_eq!(sequential.shift.angle_deg, -3.0);
    assert_eq!(sequential.top_left, (25, 20));
}

#[test]
fn parallel_interpolated_ranking_matches_sequential() {
    let base = texture_image(71, 65);
    let template =
        OwnedImage::from_view(base.view().window(Rect::new(25, 20, 18, 14)).unwrap()).unwrap();
    let search = rotate_image(base.view(), 3.0).unwrap();
    let sweep = AngleSweep::new(6.0, 1.0).unwrap();

    let run = |parallel| {
        match_with_angle(
            template.view(),
            search.view(),
            &sweep,
            &SweepOptions {
                parallel,
                interpolate_peaks: true,
                ..SweepOptions::default()
            },
        )
        .unwrap()
    };
    assert_eq!(run(false), run(true));
}

#[test]
fn parallel_single_angle_matches_sequential() {
    let search = noise_image(64, 48, 9);
    let template =
        OwnedImage::from_view(search.view().window(Rect::new(5, 7, 12, 12)).unwrap()).unwrap();
    let sweep = AngleSweep::new(0.0, 0.0).unwrap();

    let run = |parallel| {
        match_with_angle(
            template.view(),
            search.view(),
            &sweep,
            &SweepOptions {
                parallel,
                ..SweepOptions::default()
            },
        )
        .unwrap()
    };
    assert_eq!(run(false), run(true));
}

#[test]
fn parallel_pipeline_matches_sequential() {
    let mut scene = noise_image(160, 140, 21).into_vec();
    // Low-contrast background keeps the pasted template dominant.
    for v in scene.iter_mut() {
        *v /= 4;
    }
    let mut tpl = Vec::with_capacity(40 * 40);
    for y in 0..40usize {
        for x in 0..40usize {
            let value = if (6..18).contains(&x) && (8..26).contains(&y) {
                240
            } else {
                80 + x + 2 * y
            };
            tpl.push(value as u8);
        }
    }
    for y in 0..40 {
        for x in 0..40 {
            scene[(50 + y) * 160 + (70 + x)] = tpl[y * 40 + x];
        }
    }
    let scene = OwnedImage::new(scene, 160, 140).unwrap();
    let template = OwnedImage::new(tpl, 40, 40).unwrap();

    let run = |parallel| {
        Matcher::new(MatchConfig {
            parallel,
            ..MatchConfig::default()
        })
        .unwrap()
        .match_template_report(template.view(), scene.view(), 4.0, f32::NEG_INFINITY)
        .unwrap()
    };
    let sequential = run(false);
    let parallel = run(true);
    assert_eq!(sequential, parallel);
}
