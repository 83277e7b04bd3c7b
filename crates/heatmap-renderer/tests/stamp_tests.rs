//! Tests for stamp generation.

use heatmap_renderer::stamp::{Stamp, DEFAULT_BLUR, DEFAULT_RADIUS};

#[test]
fn test_stamp_dimensions() {
    let stamp = Stamp::build(25, 15);
    assert_eq!(stamp.side(), 2 * (25 + 15));
    assert_eq!(stamp.extent(), 40);
    assert_eq!(stamp.alpha().len(), 80 * 80);
}

#[test]
fn test_defaults() {
    let stamp = Stamp::with_defaults();
    assert_eq!(stamp.radius(), DEFAULT_RADIUS);
    assert_eq!(stamp.blur(), DEFAULT_BLUR);
    assert_eq!(stamp.side(), 2 * (DEFAULT_RADIUS + DEFAULT_BLUR) as usize);
}

#[test]
fn test_center_is_opaque_corners_are_clear() {
    let stamp = Stamp::with_defaults();
    let side = stamp.side();

    // Center pixels sit inside the opaque core
    assert_eq!(stamp.alpha_at(side / 2, side / 2), 255);
    assert_eq!(stamp.alpha_at(side / 2 - 1, side / 2 - 1), 255);

    // Corners are beyond the outer extent
    assert_eq!(stamp.alpha_at(0, 0), 0);
    assert_eq!(stamp.alpha_at(side - 1, 0), 0);
    assert_eq!(stamp.alpha_at(0, side - 1), 0);
    assert_eq!(stamp.alpha_at(side - 1, side - 1), 0);
}

#[test]
fn test_radial_symmetry() {
    let stamp = Stamp::build(10, 6);
    let side = stamp.side();

    for y in 0..side {
        for x in 0..side {
            let mirrored_x = stamp.alpha_at(side - 1 - x, y);
            let mirrored_y = stamp.alpha_at(x, side - 1 - y);
            assert_eq!(stamp.alpha_at(x, y), mirrored_x, "x mirror at ({x},{y})");
            assert_eq!(stamp.alpha_at(x, y), mirrored_y, "y mirror at ({x},{y})");
        }
    }
}

#[test]
fn test_falloff_is_monotone_from_center() {
    let stamp = Stamp::build(12, 8);
    let side = stamp.side();
    let cy = side / 2;

    // Walking right from the center, alpha never increases
    let mut prev = 255u8;
    for x in side / 2..side {
        let a = stamp.alpha_at(x, cy);
        assert!(a <= prev, "alpha rose at x={x}");
        prev = a;
    }
    // And it has faded to (near) nothing by the last column
    assert!(prev <= 1);
}

#[test]
fn test_zero_blur_gives_hard_circle() {
    let stamp = Stamp::build(8, 0);
    assert_eq!(stamp.side(), 16);

    let side = stamp.side();
    let cy = side / 2;
    // Every pixel on the center row is either fully opaque or fully clear
    for x in 0..side {
        let a = stamp.alpha_at(x, cy);
        assert!(a == 0 || a == 255, "soft pixel {a} in unblurred stamp");
    }
}

#[test]
fn test_blur_wider_than_radius() {
    // The opaque core collapses to the center; the footprint is all falloff
    let stamp = Stamp::build(4, 10);
    assert_eq!(stamp.side(), 28);

    let side = stamp.side();
    // No opaque core left, but the peak stays close to fully opaque
    assert!(stamp.alpha_at(side / 2, side / 2) >= 250);
    assert_eq!(stamp.alpha_at(0, 0), 0);
}
