use super::*;
use crate::mapping::OrthographicCamera;
use crate::ops::FrameCapture;
use crate::world::{TileRaycaster, Tilemap};

const RED: Rgba8 = Rgba8::new(255, 0, 0, 255);
const GREEN: Rgba8 = Rgba8::new(0, 200, 0, 255);
const STREAK: Rgba8 = Rgba8::new(90, 10, 10, 180);

fn make_system(grid: &Tilemap) -> DecalSystem {
    let mut system = DecalSystem::new(DecalConfig::default()).expect("system");
    system.initialize(grid).expect("initialize");
    system
}

fn make_open_system() -> DecalSystem {
    make_system(&Tilemap::all_floor(10, 10))
}

/// Covers map pixels 25..525 on both axes with opaque green.
fn paint_background(system: &mut DecalSystem) {
    let background = DecalImage::solid(500, 500, GREEN).expect("background");
    system
        .stamp(Vec2::new(5.5, 5.5), Vec2::ZERO, Vec2::ZERO, &background)
        .expect("paint");
}

fn opaque_pixels(system: &DecalSystem) -> Vec<PixelCoord> {
    let width = system.mapper().expect("mapper").map_width_px() as usize;
    system
        .map_pixels()
        .expect("pixels")
        .iter()
        .enumerate()
        .filter(|(_, pixel)| !pixel.is_transparent())
        .map(|(index, _)| PixelCoord::new((index % width) as i32, (index / width) as i32))
        .collect()
}

fn assert_no_decal_on_walls(system: &DecalSystem) {
    let floor = system.floor_mask().expect("floor");
    for pixel in opaque_pixels(system) {
        assert!(floor.is_floor_pixel(pixel), "decal on wall at {pixel:?}");
    }
}

fn camera_at(x: f32, y: f32, size: f32) -> OrthographicCamera {
    OrthographicCamera::new(Vec2::new(x, y), size, 1.0)
}

#[test]
fn red_two_by_two_lands_on_the_four_center_pixels() {
    let mut system = make_open_system();
    let decal = DecalImage::solid(2, 2, RED).expect("decal");
    system
        .stamp(Vec2::new(5.0, 5.0), Vec2::ZERO, Vec2::ZERO, &decal)
        .expect("stamp");

    assert_eq!(
        opaque_pixels(&system),
        vec![
            PixelCoord::new(249, 249),
            PixelCoord::new(250, 249),
            PixelCoord::new(249, 250),
            PixelCoord::new(250, 250),
        ]
    );
    assert_eq!(system.map_pixel(PixelCoord::new(250, 250)), Some(RED));
}

#[test]
fn opaque_single_pixel_keeps_its_exact_color() {
    let mut system = make_open_system();
    let color = Rgba8::new(10, 20, 30, 255);
    let decal = DecalImage::solid(1, 1, color).expect("decal");
    system
        .stamp(Vec2::new(2.0, 3.0), Vec2::new(0.3, -0.7), Vec2::ZERO, &decal)
        .expect("stamp");
    assert_eq!(system.map_pixel(PixelCoord::new(100, 150)), Some(color));
}

#[test]
fn world_offset_moves_the_anchor() {
    let mut system = make_open_system();
    let decal = DecalImage::solid(1, 1, RED).expect("decal");
    system
        .stamp(
            Vec2::new(2.0, 2.0),
            Vec2::ZERO,
            Vec2::new(1.0, 0.5),
            &decal,
        )
        .expect("stamp");
    assert_eq!(opaque_pixels(&system), vec![PixelCoord::new(150, 125)]);
}

#[test]
fn clear_radius_clears_core_and_fades_ring() {
    let mut system = make_open_system();
    paint_background(&mut system);
    system
        .clear_radius(Vec2::new(5.0, 5.0), 1.0, 0.5)
        .expect("clear");

    let at = |x: i32, y: i32| system.map_pixel(PixelCoord::new(x, y)).expect("pixel");
    assert_eq!(at(250, 250), Rgba8::TRANSPARENT);
    assert_eq!(at(280, 250), Rgba8::TRANSPARENT);
    assert_eq!(at(250, 287), Rgba8::TRANSPARENT);
    assert_eq!(at(310, 250), GREEN.with_alpha(153));
    assert_eq!(at(250, 324), GREEN.with_alpha(248));
    assert_eq!(at(330, 250), GREEN);
    assert_eq!(at(310, 310), GREEN);
}

#[test]
fn repeated_radial_clears_never_raise_alpha() {
    let mut system = make_open_system();
    paint_background(&mut system);
    system
        .clear_radius(Vec2::new(4.2, 6.1), 0.8, 0.3)
        .expect("clear");
    let first = system.map_pixels().expect("pixels").to_vec();
    for _ in 0..3 {
        system
            .clear_radius(Vec2::new(4.2, 6.1), 0.8, 0.3)
            .expect("clear");
    }
    for (before, after) in first.iter().zip(system.map_pixels().expect("pixels")) {
        assert!(after.a <= before.a);
    }
}

#[test]
fn wall_tile_stays_transparent_under_a_stamp() {
    let mut grid = Tilemap::all_floor(10, 10);
    assert!(grid.set_wall(3, 3, true));
    let mut system = make_system(&grid);
    let decal = DecalImage::solid(100, 100, RED).expect("decal");
    system
        .stamp(Vec2::new(3.5, 3.5), Vec2::ZERO, Vec2::ZERO, &decal)
        .expect("stamp");

    for y in 150..200 {
        for x in 150..200 {
            assert_eq!(
                system.map_pixel(PixelCoord::new(x, y)),
                Some(Rgba8::TRANSPARENT),
                "pixel ({x}, {y})"
            );
        }
    }
    assert_eq!(system.map_pixel(PixelCoord::new(130, 130)), Some(RED));
    assert_eq!(system.map_pixel(PixelCoord::new(210, 140)), Some(RED));
}

#[test]
fn border_row_and_column_never_receive_decals() {
    let mut system = make_open_system();
    let decal = DecalImage::solid(80, 80, RED).expect("decal");
    system
        .stamp(Vec2::new(10.0, 10.0), Vec2::new(1.0, 1.0), Vec2::ZERO, &decal)
        .expect("stamp");
    assert!(!opaque_pixels(&system).is_empty());
    assert!(opaque_pixels(&system)
        .iter()
        .all(|pixel| pixel.x < 500 && pixel.y < 500));
    assert_no_decal_on_walls(&system);
}

#[test]
fn operations_far_outside_the_map_are_clipped() {
    let grid = Tilemap::from_rows(&[
        "..........",
        "....##....",
        "....##....",
        "..........",
        "..#.......",
        "..........",
        "......#...",
        "..........",
        "..........",
        "..........",
    ])
    .expect("grid");
    let mut system = make_system(&grid);
    let decal = DecalImage::solid(40, 24, RED).expect("decal");
    let streak = DecalImage::solid(6, 6, STREAK).expect("streak");
    let raycaster = TileRaycaster::new(&grid);
    let positions = [
        Vec2::new(-1000.0, 5.0),
        Vec2::new(5.0, -1000.0),
        Vec2::new(2000.0, 2000.0),
        Vec2::new(-0.2, -0.2),
        Vec2::new(10.9, 10.9),
        Vec2::new(10.2, 3.0),
        Vec2::new(4.5, 8.5),
        Vec2::new(2.5, 1.5),
    ];
    let directions = [
        Vec2::new(1.0, 0.0),
        Vec2::new(-0.3, 0.9),
        Vec2::new(-1.0, -1.0),
        Vec2::new(0.0, -2.0),
    ];

    for (index, position) in positions.iter().enumerate() {
        let direction = directions[index % directions.len()];
        system
            .stamp(*position, direction, Vec2::ZERO, &decal)
            .expect("stamp");
        system
            .clear_radius(*position, 2.0, 0.4)
            .expect("clear radius");
        system
            .clear_line(*position, direction, &streak, &raycaster)
            .expect("clear line");
    }

    let mapper = system.mapper().expect("mapper");
    let expected_len = mapper.map_width_px() as usize * mapper.map_height_px() as usize;
    assert_eq!(system.map_pixels().expect("pixels").len(), expected_len);
    assert_no_decal_on_walls(&system);
}

struct ClearSky;

impl ObstacleRaycaster for ClearSky {
    fn raycast(&self, _origin: Vec2, _end: Vec2) -> Option<Vec2> {
        None
    }
}

#[test]
fn positions_at_the_float_limits_leave_the_map_untouched() {
    let mut system = make_open_system();
    paint_background(&mut system);
    let before = system.map_pixels().expect("pixels").to_vec();
    let decal = DecalImage::solid(7, 5, RED).expect("decal");
    let streak = DecalImage::solid(6, 6, STREAK).expect("streak");
    let positions = [
        Vec2::new(1.0e9, 5.0),
        Vec2::new(-1.0e9, 5.0),
        Vec2::new(5.0, 1.0e12),
        Vec2::new(-1.0e4, -1.0e9),
        Vec2::new(-1.0e12, -1.0e12),
        Vec2::new(f32::MAX, 5.0),
        Vec2::new(5.0, f32::MIN),
        Vec2::new(f32::MAX, f32::MIN),
    ];
    let directions = [
        Vec2::ZERO,
        Vec2::new(1.0, 0.0),
        Vec2::new(0.0, -1.0),
        Vec2::new(0.6, 0.8),
        Vec2::new(-0.7, 0.3),
        Vec2::new(-1.0, -1.0),
    ];

    for position in positions {
        for direction in directions {
            let bounds = system
                .stamp(position, direction, Vec2::ZERO, &decal)
                .expect("stamp");
            assert!(bounds.is_empty(), "stamp at {position:?} touched {bounds:?}");
            system
                .clear_radius(position, 2.0, 0.4)
                .expect("clear radius");
            let written = system
                .clear_line(position, direction, &streak, &ClearSky)
                .expect("clear line");
            assert_eq!(written, 0, "line from {position:?} along {direction:?}");
        }
    }

    let agents: Vec<CleaningAgent> = positions
        .iter()
        .map(|&position| CleaningAgent {
            position,
            radius: 3.0,
            cleaning_quality: 1.0,
        })
        .collect();
    system
        .on_frame_update(&camera_at(5.0, 5.0, 4.0), agents)
        .expect("frame");
    system
        .complete_pending_render(&mut FrameCapture::default())
        .expect("render");

    assert_eq!(system.map_pixels().expect("pixels"), before.as_slice());
}

#[test]
fn line_entering_from_off_map_without_a_hit_reaches_the_map() {
    let mut system = make_open_system();
    paint_background(&mut system);
    let streak = DecalImage::solid(6, 6, STREAK).expect("streak");
    let written = system
        .clear_line(Vec2::new(-0.5, 5.5), Vec2::new(1.0, 0.0), &streak, &ClearSky)
        .expect("clear line");
    assert!(written > 0);
    assert_eq!(
        system.map_pixel(PixelCoord::new(100, 275)).expect("pixel"),
        STREAK
    );
}

#[test]
fn clear_line_stops_at_the_first_wall() {
    let mut grid = Tilemap::all_floor(10, 10);
    for y in 0..10 {
        grid.set_wall(7, y, true);
    }
    let mut system = make_system(&grid);
    paint_background(&mut system);
    let streak = DecalImage::solid(8, 8, STREAK).expect("streak");
    let raycaster = TileRaycaster::new(&grid);

    let written = system
        .clear_line(Vec2::new(1.5, 5.5), Vec2::new(1.0, 0.0), &streak, &raycaster)
        .expect("line");
    assert!(written > 0);

    let at = |x: i32, y: i32| system.map_pixel(PixelCoord::new(x, y)).expect("pixel");
    assert_eq!(at(100, 275), STREAK);
    assert_eq!(at(100, 278), STREAK);
    assert_eq!(at(100, 280), Rgba8::TRANSPARENT);
    assert!(at(100, 285).a < GREEN.a);
    assert_eq!(at(100, 295), GREEN);
    assert_eq!(at(349, 250), GREEN);
    assert_eq!(at(360, 275), Rgba8::TRANSPARENT);
    assert_eq!(at(400, 275), GREEN);
    assert_eq!(system.stats().snapshot().line_clears, 1);
}

#[test]
fn clear_all_leaves_every_pixel_transparent() {
    let mut system = make_open_system();
    paint_background(&mut system);
    system.clear_all_decals().expect("clear all");
    assert!(system
        .map_pixels()
        .expect("pixels")
        .iter()
        .all(|pixel| pixel.a == 0));
    assert_eq!(system.viewport_window(), None);
}

#[test]
fn viewport_window_stays_inside_the_map() {
    let mut system = make_open_system();
    let mut capture = FrameCapture::default();
    let (map_width, map_height) = {
        let mapper = system.mapper().expect("mapper");
        (mapper.map_width_px() as i32, mapper.map_height_px() as i32)
    };

    let mut frames = 0;
    for size in [1.0, 2.5, 4.0, 6.0, 40.0] {
        for x in [-30.0, 0.0, 0.4, 5.5, 10.9, 11.0, 75.0] {
            for y in [-8.0, 1.0, 5.0, 10.5, 300.0] {
                system
                    .on_frame_update(&camera_at(x, y, size), Vec::new())
                    .expect("frame");
                assert!(system
                    .complete_pending_render(&mut capture)
                    .expect("render"));
                frames += 1;

                let window = system.viewport_window().expect("window");
                let rect = window.rect();
                assert!(rect.min.x >= 0 && rect.min.y >= 0, "{rect:?}");
                assert!(rect.max.x <= map_width && rect.max.y <= map_height, "{rect:?}");
                assert!(rect.area() > 0);
                assert_eq!(capture.width, window.width());
                assert_eq!(capture.height, window.height());
                assert_eq!(capture.pixels.len(), rect.area());
            }
        }
    }
    assert_eq!(capture.uploads, frames);
    assert_eq!(system.stats().snapshot().frames, frames as u64);
}

#[test]
fn viewport_shows_the_visible_map_slice() {
    let mut system = make_open_system();
    let decal = DecalImage::solid(1, 1, RED).expect("decal");
    system
        .stamp(Vec2::new(5.0, 5.0), Vec2::ZERO, Vec2::ZERO, &decal)
        .expect("stamp");

    let mut capture = FrameCapture::default();
    system
        .on_frame_update(&camera_at(5.0, 5.0, 1.0), Vec::new())
        .expect("frame");
    system
        .complete_pending_render(&mut capture)
        .expect("render");

    let window = capture.window.expect("window");
    assert_eq!(window.lower(), PixelCoord::new(195, 195));
    assert_eq!(window.upper(), PixelCoord::new(305, 305));
    assert_eq!(capture.pixel(55, 55), Some(RED));
    assert_eq!(capture.pixel(54, 55), Some(Rgba8::TRANSPARENT));
}

#[test]
fn camera_pan_slides_and_zoom_reallocates() {
    let mut system = make_open_system();
    let mut capture = FrameCapture::default();

    system
        .on_frame_update(&camera_at(5.0, 5.0, 1.0), Vec::new())
        .expect("frame");
    system.complete_pending_render(&mut capture).expect("render");
    let first = system.viewport_window().expect("window");

    system
        .on_frame_update(&camera_at(6.0, 4.5, 1.0), Vec::new())
        .expect("frame");
    system.complete_pending_render(&mut capture).expect("render");
    let panned = system.viewport_window().expect("window");
    assert_eq!(panned.width(), first.width());
    assert_eq!(panned.height(), first.height());
    assert_eq!(panned.lower(), PixelCoord::new(245, 170));

    system
        .on_frame_update(&camera_at(6.0, 4.5, 2.0), Vec::new())
        .expect("frame");
    system.complete_pending_render(&mut capture).expect("render");
    let zoomed = system.viewport_window().expect("window");
    assert!(zoomed.width() > panned.width());
    assert_eq!(capture.width, zoomed.width());
}

#[test]
fn agents_erase_decals_during_the_frame() {
    let mut system = make_open_system();
    paint_background(&mut system);
    let agents = vec![
        CleaningAgent {
            position: Vec2::new(3.0, 3.0),
            radius: 0.5,
            cleaning_quality: 1.0,
        },
        CleaningAgent {
            position: Vec2::new(7.0, 7.0),
            radius: 0.5,
            cleaning_quality: 1.0,
        },
    ];
    system
        .on_frame_update(&camera_at(5.0, 5.0, 5.0), agents)
        .expect("frame");
    assert_eq!(system.map_pixel(PixelCoord::new(150, 150)), Some(Rgba8::TRANSPARENT));
    assert_eq!(system.map_pixel(PixelCoord::new(350, 350)), Some(Rgba8::TRANSPARENT));
    assert_eq!(system.map_pixel(PixelCoord::new(250, 250)), Some(GREEN));

    let stats = system.stats().snapshot();
    assert_eq!(stats.frames, 1);
    assert_eq!(stats.radial_clears, 2);
}

#[test]
fn scheduled_render_blocks_map_mutators() {
    let mut system = make_open_system();
    let grid = Tilemap::all_floor(10, 10);
    let decal = DecalImage::solid(2, 2, RED).expect("decal");
    let camera = camera_at(5.0, 5.0, 2.0);

    system.on_frame_update(&camera, Vec::new()).expect("frame");
    assert_eq!(system.render_job_state(), JobState::Scheduled);

    let pending = |result: Result<(), DecalError>| {
        assert!(matches!(
            result,
            Err(DecalError::JobPending { target: "viewport" })
        ));
    };
    pending(
        system
            .stamp(Vec2::new(5.0, 5.0), Vec2::ZERO, Vec2::ZERO, &decal)
            .map(|_| ()),
    );
    pending(system.clear_radius(Vec2::new(5.0, 5.0), 1.0, 0.5));
    pending(
        system
            .clear_line(
                Vec2::new(5.0, 5.0),
                Vec2::new(1.0, 0.0),
                &decal,
                &TileRaycaster::new(&grid),
            )
            .map(|_| ()),
    );
    pending(system.clear_all_decals());
    pending(system.on_frame_update(&camera, Vec::new()));

    let mut capture = FrameCapture::default();
    assert!(system.complete_pending_render(&mut capture).expect("render"));
    assert_eq!(system.render_job_state(), JobState::Idle);
    assert!(!system.complete_pending_render(&mut capture).expect("render"));
    assert_eq!(capture.uploads, 1);

    system
        .stamp(Vec2::new(5.0, 5.0), Vec2::ZERO, Vec2::ZERO, &decal)
        .expect("stamp after completion");
}

#[test]
fn dispose_is_idempotent_and_completes_pending_render() {
    let mut system = make_open_system();
    system
        .on_frame_update(&camera_at(5.0, 5.0, 2.0), Vec::new())
        .expect("frame");

    system.dispose_buffers().expect("dispose");
    assert_eq!(system.render_job_state(), JobState::Idle);
    assert!(!system.is_initialized());
    system.dispose_buffers().expect("second dispose");

    let mut never_initialized = DecalSystem::new(DecalConfig::default()).expect("system");
    never_initialized.dispose_buffers().expect("dispose");
}

#[test]
fn operations_before_initialize_report_not_initialized() {
    let mut system = DecalSystem::new(DecalConfig::default()).expect("system");
    let decal = DecalImage::solid(1, 1, RED).expect("decal");
    let err = system
        .stamp(Vec2::new(1.0, 1.0), Vec2::ZERO, Vec2::ZERO, &decal)
        .expect_err("not initialized");
    assert!(matches!(
        err,
        DecalError::NotInitialized { operation: "stamp" }
    ));
    assert!(matches!(
        system.on_frame_update(&camera_at(1.0, 1.0, 2.0), Vec::new()),
        Err(DecalError::NotInitialized { .. })
    ));
    assert_eq!(system.map_pixel(PixelCoord::new(0, 0)), None);
    assert!(!system
        .complete_pending_render(&mut FrameCapture::default())
        .expect("nothing scheduled"));
}

#[test]
fn reinitialize_replaces_buffers() {
    let mut system = make_open_system();
    paint_background(&mut system);
    system
        .initialize(&Tilemap::all_floor(4, 6))
        .expect("reinitialize");
    let mapper = system.mapper().expect("mapper");
    assert_eq!(mapper.map_width_px(), 250);
    assert_eq!(mapper.map_height_px(), 350);
    assert!(opaque_pixels(&system).is_empty());
}

#[test]
fn invalid_config_is_rejected() {
    let config = DecalConfig {
        line_full_clear_fraction: 1.5,
        ..DecalConfig::default()
    };
    assert!(matches!(
        DecalSystem::new(config),
        Err(DecalError::InvalidConfig {
            field: "line_full_clear_fraction",
            ..
        })
    ));
}
