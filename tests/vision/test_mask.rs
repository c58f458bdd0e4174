// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use media_tools_node::vision::{build_mask, BoundingPolygon, Detection};

#[test]
fn test_mask_covers_only_detected_regions() {
    let detections = vec![
        Detection::new(BoundingPolygon::from_rect(2, 2, 4, 3), "ab", 0.9),
        Detection::new(BoundingPolygon::from_rect(10, 6, 3, 3), "c", 0.9),
    ];
    let mask = build_mask(16, 12, &detections);

    assert_eq!(mask.dimensions(), (16, 12));
    assert_eq!(mask.get_pixel(3, 3).0[0], 255);
    assert_eq!(mask.get_pixel(11, 7).0[0], 255);
    assert_eq!(mask.get_pixel(0, 0).0[0], 0);
    assert_eq!(mask.get_pixel(8, 4).0[0], 0);
    assert_eq!(mask.get_pixel(15, 11).0[0], 0);
}

#[test]
fn test_mask_without_detections_is_empty() {
    let mask = build_mask(8, 8, &[]);
    assert!(mask.pixels().all(|p| p.0[0] == 0));
}

#[test]
fn test_polygon_outside_image_is_clipped() {
    let detections = vec![Detection::new(
        BoundingPolygon([[-5, -5], [4, -5], [4, 4], [-5, 4]]),
        "edge",
        0.5,
    )];
    let mask = build_mask(8, 8, &detections);

    assert_eq!(mask.get_pixel(0, 0).0[0], 255);
    assert_eq!(mask.get_pixel(7, 7).0[0], 0);
}
