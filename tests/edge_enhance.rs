use rotmatch::lowlevel::{edge_map, expand_edges};
use rotmatch::{EdgeConfig, EdgeMode, ImageView, OwnedImage, RotMatchError};

fn square_scene(width: usize, height: usize) -> Vec<u8> {
    let mut data = vec![30u8; width * height];
    for y in height / 4..3 * height / 4 {
        for x in width / 4..3 * width / 4 {
            data[y * width + x] = 220;
        }
    }
    data
}

#[test]
fn binary_mode_keeps_dimensions_and_is_binary() {
    let data = square_scene(40, 32);
    let view = ImageView::from_slice(&data, 40, 32).unwrap();
    let cfg = EdgeConfig {
        mode: EdgeMode::Binary,
        ..EdgeConfig::default()
    };

    let edges = edge_map(view, &cfg).unwrap();
    assert_eq!((edges.width(), edges.height()), (40, 32));
    assert!(edges.data().iter().all(|&v| v == 0 || v == cfg.max_value));

    let lit = edges.data().iter().filter(|&&v| v > 0).count();
    assert!(lit > 0);
    // Far from the square boundary nothing fires.
    assert_eq!(edges.view().get(20, 16), Some(&0));
    assert_eq!(edges.view().get(1, 1), Some(&0));
}

#[test]
fn strength_mode_grades_edges_below_the_cap() {
    let data = square_scene(40, 32);
    let view = ImageView::from_slice(&data, 40, 32).unwrap();
    let cfg = EdgeConfig::default();
    assert_eq!(cfg.mode, EdgeMode::Strength);

    let edges = edge_map(view, &cfg).unwrap();
    assert_eq!((edges.width(), edges.height()), (40, 32));
    assert!(edges.data().iter().all(|&v| v <= cfg.max_value));
    // The 190-level step scales to about 95 on straight sides, well under
    // the cap; blurring spreads it into a ramp of intermediate values.
    let peak = edges.data().iter().copied().max().unwrap();
    assert!(peak > 0 && peak < cfg.max_value, "peak {peak}");
    assert!(edges.data().iter().any(|&v| v > 0 && v < peak));
    assert_eq!(edges.view().get(20, 16), Some(&0));
    assert_eq!(edges.view().get(1, 1), Some(&0));
}

#[test]
fn flat_image_has_no_edges() {
    let data = vec![128u8; 24 * 24];
    let view = ImageView::from_slice(&data, 24, 24).unwrap();
    for mode in [EdgeMode::Strength, EdgeMode::Binary] {
        let cfg = EdgeConfig {
            mode,
            ..EdgeConfig::default()
        };
        let edges = edge_map(view, &cfg).unwrap();
        assert!(edges.data().iter().all(|&v| v == 0), "{mode:?}");
    }
}

#[test]
fn expand_edges_writes_into_matching_buffer() {
    let data = square_scene(40, 32);
    let view = ImageView::from_slice(&data, 40, 32).unwrap();
    let cfg = EdgeConfig::default();

    let mut dst = OwnedImage::filled(40, 32, 7).unwrap();
    expand_edges(view, &mut dst, &cfg).unwrap();
    assert_eq!(dst, edge_map(view, &cfg).unwrap());
}

#[test]
fn expand_edges_rejects_size_mismatch() {
    let data = square_scene(40, 32);
    let view = ImageView::from_slice(&data, 40, 32).unwrap();
    let mut dst = OwnedImage::filled(32, 40, 0).unwrap();

    let err = expand_edges(view, &mut dst, &EdgeConfig::default())
        .err()
        .unwrap();
    assert_eq!(
        err,
        RotMatchError::SizeMismatch {
            src_width: 40,
            src_height: 32,
            dst_width: 32,
            dst_height: 40,
        }
    );
}

#[test]
fn edge_config_validation() {
    assert!(EdgeConfig::default().validate().is_ok());
    let cfg = EdgeConfig {
        blur_width: 0,
        ..EdgeConfig::default()
    };
    assert!(cfg.validate().is_err());
    let cfg = EdgeConfig {
        low_threshold: f32::NAN,
        ..EdgeConfig::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn strided_windows_match_copies() {
    let data = square_scene(40, 32);
    let view = ImageView::from_slice(&data, 40, 32).unwrap();
    let roi = view.roi(4, 3, 30, 24).unwrap();
    let copy = OwnedImage::from_view(roi).unwrap();

    let cfg = EdgeConfig::default();
    assert_eq!(edge_map(roi, &cfg).unwrap(), edge_map(copy.view(), &cfg).unwrap());
}
