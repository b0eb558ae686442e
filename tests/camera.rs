use std::f64::consts::{FRAC_PI_3, FRAC_PI_4};

use gridcast::camera::{Camera, CameraConfig, NEAR, Projector, focal_length_for_fov};
use gridcast::caster::RayCaster;
use gridcast::grid::GridMap;
use gridcast::player::Pose;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn config(resolution: usize) -> CameraConfig {
    CameraConfig {
        resolution,
        ..CameraConfig::default()
    }
}

fn room() -> RayCaster<GridMap> {
    RayCaster::builder()
        .map(GridMap::with_border(8, 8).unwrap())
        .build()
        .unwrap()
}

const POSE: Pose = Pose {
    x: 4.5,
    y: 4.5,
    direction: 0.0,
};

#[test]
fn farther_slices_are_shorter() {
    let projector = Projector::new(600.0);
    let heights: Vec<f64> = [0.5, 1.0, 2.0, 4.0, 8.0]
        .iter()
        .map(|&d| projector.project(1.0, 0.0, 0.0, d).height)
        .collect();
    for pair in heights.windows(2) {
        assert!(pair[0] > pair[1], "{heights:?}");
    }
}

#[test]
fn projection_places_slice_below_the_horizon() {
    let projector = Projector::new(600.0);
    let p = projector.project(1.0, 0.0, 0.0, 2.0);
    assert!(approx(p.height, 300.0));
    assert!(approx(p.bottom, 450.0));
    assert!(approx(p.top, 150.0));

    let looking_up = projector.project(1.0, 0.0, 0.5, 2.0);
    assert!(approx(looking_up.bottom, 300.0));
    assert!(approx(looking_up.height, p.height));
}

#[test]
fn projection_removes_fisheye() {
    let projector = Projector::new(480.0);
    let off_axis = projector.project(1.0, FRAC_PI_3, 0.0, 2.0);
    let on_axis = projector.project(1.0, 0.0, 0.0, 2.0 * FRAC_PI_3.cos());
    assert_eq!(off_axis, on_axis);
}

#[test]
fn projection_of_zero_distance_stays_finite() {
    let projector = Projector::new(480.0);
    let p = projector.project(1.0, 0.0, 0.0, 0.0);
    assert!(p.height.is_finite() && p.bottom.is_finite() && p.top.is_finite());
    assert!(approx(p.height, 480.0 / NEAR));
}

#[test]
fn column_angles_span_the_view() {
    let camera = Camera::new(320, 240, config(4));
    assert_eq!(camera.column_angle(2), 0.0);
    assert!(approx(camera.column_angle(0), (-0.5f64).atan2(0.8)));
    assert!(camera.column_angle(1) < 0.0 && camera.column_angle(3) > 0.0);

    let wide = Camera::new(
        320,
        240,
        CameraConfig {
            resolution: 4,
            focal_length: focal_length_for_fov(90.0),
            ..CameraConfig::default()
        },
    );
    assert!(approx(wide.column_angle(0), -FRAC_PI_4));
}

#[test]
fn spacing_follows_width_and_resolution() {
    let mut camera = Camera::new(320, 240, config(160));
    assert_eq!(camera.spacing(), 2.0);
    camera.resize(640, 480);
    assert_eq!(camera.spacing(), 4.0);
    assert_eq!(camera.projector().viewport_height(), 480.0);
}

#[test]
fn update_casts_one_ray_per_column() {
    let mut caster = room();
    let mut camera = Camera::new(160, 120, config(16));
    assert!(camera.update(POSE, &mut caster).unwrap());
    assert_eq!(camera.rays().len(), 16);
    for (column, ray) in camera.rays().iter().enumerate() {
        assert_eq!(ray.angle, camera.column_angle(column));
        assert!(ray.hit().is_some(), "column {column} sees no wall");
    }
}

#[test]
fn unchanged_pose_keeps_the_batch() {
    let mut caster = room();
    let mut camera = Camera::new(160, 120, config(16));
    assert!(camera.update(POSE, &mut caster).unwrap());
    let before = camera.rays().to_vec();
    assert!(!camera.update(POSE, &mut caster).unwrap());
    assert_eq!(camera.rays(), &before[..]);

    let turned = Pose {
        direction: 0.1,
        ..POSE
    };
    assert!(camera.update(turned, &mut caster).unwrap());
    assert_ne!(camera.rays(), &before[..]);
}

#[test]
fn revisited_pose_comes_from_the_frame_cache() {
    let mut caster = room();
    let mut camera = Camera::new(160, 120, config(16));
    let moved = Pose { x: 3.5, ..POSE };

    camera.update(POSE, &mut caster).unwrap();
    let first = camera.rays().to_vec();
    camera.update(moved, &mut caster).unwrap();
    assert_eq!(camera.cached_frames(), 2);

    assert!(camera.update(POSE, &mut caster).unwrap());
    assert_eq!(camera.cached_frames(), 2);
    assert_eq!(camera.rays(), &first[..]);
}

#[test]
fn frame_cache_starts_over_past_its_limit() {
    let mut caster = room();
    let mut camera = Camera::new(
        160,
        120,
        CameraConfig {
            cache_limit: 2,
            ..config(16)
        },
    );
    for x in [2.5, 3.5, 4.5] {
        camera.update(Pose { x, ..POSE }, &mut caster).unwrap();
    }
    assert_eq!(camera.cached_frames(), 1);
}

#[test]
fn frame_cache_can_be_disabled() {
    let mut caster = room();
    let mut camera = Camera::new(
        160,
        120,
        CameraConfig {
            frame_memo: false,
            ..config(16)
        },
    );
    camera.update(POSE, &mut caster).unwrap();
    camera.update(Pose { x: 3.5, ..POSE }, &mut caster).unwrap();
    assert_eq!(camera.cached_frames(), 0);
}

#[test]
fn parallel_and_sequential_batches_agree() {
    let mut caster = room();
    let mut parallel = Camera::new(320, 240, config(64));
    let mut sequential = Camera::new(
        320,
        240,
        CameraConfig {
            parallel: false,
            ..config(64)
        },
    );
    let pose = Pose {
        x: 2.3,
        y: 5.7,
        direction: 1.2,
    };
    parallel.update(pose, &mut caster).unwrap();
    sequential.update(pose, &mut caster).unwrap();
    assert_eq!(parallel.rays(), sequential.rays());
}

#[test]
fn ray_memo_routes_through_the_caster_cache() {
    let mut caster = RayCaster::builder()
        .map(GridMap::with_border(8, 8).unwrap())
        .memoize(true)
        .cache_limit(64)
        .build()
        .unwrap();
    let mut memo = Camera::new(
        160,
        120,
        CameraConfig {
            ray_memo: true,
            frame_memo: false,
            ..config(16)
        },
    );
    memo.update(POSE, &mut caster).unwrap();
    assert_eq!(caster.cache_size(), Ok(16));

    let mut plain_caster = room();
    let mut plain = Camera::new(160, 120, config(16));
    plain.update(POSE, &mut plain_caster).unwrap();
    assert_eq!(memo.rays(), plain.rays());
}
