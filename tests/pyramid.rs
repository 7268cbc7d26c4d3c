use window_detector::image::GrayImageU8;
use window_detector::pyramid::ScalePyramid;
use window_detector::{ScanParams, Size};

fn params() -> ScanParams {
    ScanParams {
        base_window: Size::new(24, 24),
        scale_factor: 1.15,
        ..Default::default()
    }
}

#[test]
fn rendered_levels_match_their_geometry() {
    let img = GrayImageU8::from_fn(100, 80, |x, y| ((x * 2 + y) % 251) as u8);
    let pyramid = ScalePyramid::new(Size::new(100, 80), &params());

    let mut scratch = GrayImageU8::zeroed(0, 0);
    let mut expected_index = 0usize;
    for level in pyramid.levels() {
        assert_eq!(level.index, expected_index);
        expected_index += 1;

        level.render(&img.as_view(), &mut scratch);
        assert_eq!(scratch.width(), level.scaled_size.width as usize);
        assert_eq!(scratch.height(), level.scaled_size.height as usize);

        // scaled * scale recovers the source dimensions up to rounding.
        let back_w = level.scaled_size.width as f64 * level.scale;
        let back_h = level.scaled_size.height as f64 * level.scale;
        assert!((back_w - 100.0).abs() <= level.scale, "{back_w}");
        assert!((back_h - 80.0).abs() <= level.scale, "{back_h}");
    }
    assert!(expected_index > 1, "expected several levels for 100x80");
}

#[test]
fn constant_image_stays_constant_across_levels() {
    let img = GrayImageU8::from_fn(64, 48, |_, _| 137);
    let pyramid = ScalePyramid::new(Size::new(64, 48), &params());

    let mut scratch = GrayImageU8::zeroed(0, 0);
    for level in pyramid.levels() {
        level.render(&img.as_view(), &mut scratch);
        assert!(
            scratch.as_raw().iter().all(|&v| v == 137),
            "level {} introduced interpolation drift",
            level.index
        );
    }
}
