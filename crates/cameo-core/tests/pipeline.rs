//! End-to-end filter pipeline on a synthetic frame.

use cameo_core::curve::Interpolation;
use cameo_core::{BgrImage, CurveFunction, CurvePreset, EdgeStroke, Filter, KernelFilter, LookupFilter, LookupTable};

const EPSILON: f64 = 1e-9;

fn ramp(width: u32, height: u32) -> BgrImage {
    let pixels = (0..height)
        .flat_map(|y| (0..width).map(move |x| (x, y)))
        .map(|(x, y)| [(x * 255 / (width - 1)) as u8, (y * 255 / (height - 1)) as u8, 128])
        .collect();
    BgrImage::from_pixels(width, height, pixels).expect("valid size")
}

#[test]
fn test_stroke_then_grade_keeps_shape() {
    let frame = ramp(32, 24);
    let mut out = frame.clone();
    EdgeStroke::default().apply_in_place(&mut out).expect("stroke");
    CurvePreset::portra().to_filter().apply_in_place(&mut out).expect("grade");
    assert_eq!(out.dimensions(), frame.dimensions());
    assert_eq!(out.pixels.len(), frame.pixels.len());
}

#[test]
fn test_kernel_filters_preserve_flat_fields() {
    let flat = BgrImage::filled(10, 6, [40, 140, 240]);
    for filter in [KernelFilter::sharpen(), KernelFilter::blur(), KernelFilter::emboss()] {
        assert_eq!(filter.apply(&flat).expect("filter"), flat);
    }
}

#[test]
fn test_curve_kind_follows_point_count() {
    let two = CurveFunction::new(&[(0.0, 0.0), (255.0, 128.0)]).expect("linear");
    let three = CurveFunction::new(&[(0.0, 0.0), (128.0, 200.0), (255.0, 255.0)]).expect("quadratic");
    let four = CurveFunction::new(&[(0.0, 0.0), (64.0, 80.0), (192.0, 200.0), (255.0, 255.0)]).expect("cubic");
    assert_eq!(two.kind(), Interpolation::Linear);
    assert_eq!(three.kind(), Interpolation::Quadratic);
    assert_eq!(four.kind(), Interpolation::Cubic);
    assert!((two.evaluate(127.5).expect("inside") - 64.0).abs() < EPSILON);
    assert_eq!(four.evaluate(300.0), None);
}

#[test]
fn test_lookup_tables_are_in_range_for_any_curve() {
    let steep = CurveFunction::new(&[(0.0, -500.0), (100.0, 900.0), (200.0, -40.0), (255.0, 300.0)]).expect("valid");
    let table = LookupTable::from_fn(steep.as_fn());
    assert_eq!(table.get(0), 0);
    assert_eq!(table.get(100), 255);
    assert_eq!(table.get(255), 255);

    let filter = LookupFilter::from_curves(None, Some(&steep), None, None);
    let out = filter.apply(&ramp(16, 16)).expect("filter");
    let original = ramp(16, 16);
    for (a, b) in out.pixels.iter().zip(&original.pixels) {
        assert_eq!(a[1..], b[1..]);
    }
}
