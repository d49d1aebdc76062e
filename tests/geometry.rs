use rotmatch::image::pyramid::pyramid_depth;
use rotmatch::lowlevel::window_around;
use rotmatch::{compose_transforms, rotate_point, Point, RotMatchError, ShiftValue, Size};

fn close(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol
}

#[test]
fn rotate_point_zero_angle_is_identity() {
    for &(x, y) in &[(0.0, 0.0), (12.5, -3.25), (-1e6, 7.0)] {
        let p = Point::new(x, y);
        assert_eq!(rotate_point(p, 0.0).unwrap(), p);
    }
}

#[test]
fn rotate_point_inverse_restores_point() {
    let p = Point::new(17.0, -42.5);
    let mut angle = -180.0;
    while angle <= 180.0 {
        let back = rotate_point(rotate_point(p, angle).unwrap(), -angle).unwrap();
        assert!(close(back.x, p.x, 1e-9), "angle {angle}: {back:?}");
        assert!(close(back.y, p.y, 1e-9), "angle {angle}: {back:?}");
        angle += 7.5;
    }
}

#[test]
fn rotate_point_rejects_angles_outside_half_turn() {
    let err = rotate_point(Point::new(1.0, 2.0), -181.0).err().unwrap();
    assert_eq!(
        err,
        RotMatchError::AngleOutOfRange {
            angle_deg: -181.0,
            min_deg: -180.0,
            max_deg: 180.0,
        }
    );
}

#[test]
fn compose_with_identity_keeps_transform() {
    let t = ShiftValue::new(-12.0, 33.5, 0.0);
    assert_eq!(compose_transforms(t, ShiftValue::IDENTITY).unwrap(), t);
    assert_eq!(compose_transforms(ShiftValue::IDENTITY, t).unwrap(), t);

    // With a rotation the translation is expressed in the rotated frame and
    // comes back through `rotate_point`.
    let r = ShiftValue::new(10.0, -4.0, 25.0);
    let right = compose_transforms(r, ShiftValue::IDENTITY).unwrap();
    let expected = rotate_point(r.offset(), 25.0).unwrap();
    assert!(close(right.x, expected.x, 1e-12));
    assert!(close(right.y, expected.y, 1e-12));
    assert_eq!(right.angle_deg, 25.0);

    let left = compose_transforms(ShiftValue::IDENTITY, r).unwrap();
    assert_eq!(left, right);
}

#[test]
fn compose_sums_angles() {
    let a = ShiftValue::new(0.0, 0.0, 170.0);
    let b = ShiftValue::new(1.0, 0.0, 20.0);
    let out = compose_transforms(a, b).unwrap();
    assert!(close(out.angle_deg, 190.0, 1e-12));
    // The second offset is rotated by the wrapped sum (-170 degrees).
    let expected = rotate_point(Point::new(1.0, 0.0), -170.0).unwrap();
    assert!(close(out.x, expected.x, 1e-12));
    assert!(close(out.y, expected.y, 1e-12));
}

#[test]
fn window_stays_inside_container() {
    let container = Size::new(120, 90);
    let reference = Size::new(30, 20);
    for expand in [0.0, 0.2, 0.5] {
        for cy in (0..=90).step_by(5) {
            for cx in (0..=120).step_by(5) {
                let center = Point::new(cx as f64, cy as f64);
                let window = window_around(container, reference, center, expand).unwrap();
                let rect = window.rect;
                assert!(rect.x + rect.width <= container.width, "{rect:?}");
                assert!(rect.y + rect.height <= container.height, "{rect:?}");
                assert_eq!(window.top_left, (rect.x, rect.y));
                assert_eq!(rect.width, (30.0 * (1.0 + 2.0 * expand)) as usize);
            }
        }
    }
}

#[test]
fn window_rejects_bad_requests() {
    let container = Size::new(100, 100);
    let reference = Size::new(20, 20);
    assert!(window_around(container, reference, Point::new(-1.0, 10.0), 0.2).is_err());
    assert!(window_around(container, reference, Point::new(10.0, 101.0), 0.2).is_err());
    assert!(window_around(container, reference, Point::new(50.0, 50.0), -0.1).is_err());
    assert!(matches!(
        window_around(container, Size::new(80, 80), Point::new(50.0, 50.0), 0.5),
        Err(RotMatchError::RoiOutOfBounds { .. })
    ));
}

#[test]
fn pyramid_depth_is_deepest_level_above_minimum() {
    let min_len = 20;
    for (tpl, expected) in [(24usize, 0usize), (41, 0), (50, 1), (64, 1), (100, 2), (161, 2)] {
        let depth = pyramid_depth(Size::new(tpl, tpl), Size::new(1000, 1000), min_len).unwrap();
        assert_eq!(depth, expected, "tpl {tpl}");
        // The coarse template stays above the minimum, one more level would not.
        assert!(tpl >> depth > min_len || depth == 0, "tpl {tpl}");
        assert!(tpl >> (depth + 1) <= min_len, "tpl {tpl}");
    }
}

#[test]
fn pyramid_depth_edge_cases() {
    let source = Size::new(400, 300);
    assert_eq!(pyramid_depth(Size::new(400, 50), source, 20).unwrap(), 0);
    assert_eq!(pyramid_depth(Size::new(80, 300), source, 1).unwrap(), 0);
    assert_eq!(pyramid_depth(Size::new(20, 200), source, 20).unwrap(), 0);
    assert_eq!(pyramid_depth(Size::new(50, 50), source, 20).unwrap(), 1);
    assert!(matches!(
        pyramid_depth(Size::new(401, 10), source, 20),
        Err(RotMatchError::TemplateLargerThanImage { .. })
    ));
}
