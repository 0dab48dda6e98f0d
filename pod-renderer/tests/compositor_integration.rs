//! Compositor Integration Tests
//!
//! Renders real canvases end to end:
//! - image items land at their committed transform
//! - the tinted background shows behind items
//! - JPEG output is decodable and sized to the canvas

use pod_core::{
    CanvasController, EditorSession, Gesture, GesturePhase, ImageData, NoHaptics, Point,
    ProductColor, Size,
};
use pod_renderer::{BackgroundLibrary, Compositor};

fn solid(rgba: [u8; 4]) -> ImageData {
    ImageData::from_rgba(10, 10, rgba.repeat(100)).expect("valid buffer")
}

fn canvas() -> CanvasController {
    CanvasController::new(Size::new(200.0, 200.0), Box::new(NoHaptics))
}

#[test]
fn test_image_item_is_drawn_at_center() {
    let mut canvas = canvas();
    canvas.add_image(solid([255, 0, 0, 255]));

    let raster = Compositor::with_defaults()
        .capture_snapshot(&mut canvas, None)
        .expect("capture");
    assert_eq!(raster.dimensions(), (200, 200));
    assert_eq!(raster.get_pixel(100, 100).0, [255, 0, 0, 255]);
    // fitted to 80%: 160x160 centered, corners stay empty
    assert_eq!(raster.get_pixel(5, 5).0[3], 0);
}

#[test]
fn test_moved_item_is_drawn_at_committed_position() {
    let mut canvas = canvas();
    let id = canvas.add_image(solid([0, 255, 0, 255]));
    for phase in [GesturePhase::Began, GesturePhase::Ended] {
        canvas
            .handle_gesture(
                id,
                Gesture::Pinch {
                    phase,
                    scale: 0.5,
                },
            )
            .expect("pinch");
    }
    for (phase, dx) in [(GesturePhase::Began, 0.0), (GesturePhase::Ended, 60.0)] {
        canvas
            .handle_gesture(
                id,
                Gesture::Pan {
                    phase,
                    translation: Point::new(dx, 0.0),
                },
            )
            .expect("pan");
    }

    let raster = Compositor::with_defaults()
        .capture_snapshot(&mut canvas, None)
        .expect("capture");
    // 80x80 square centered at (160, 100)
    assert_eq!(raster.get_pixel(160, 100).0, [0, 255, 0, 255]);
    assert_eq!(raster.get_pixel(100, 100).0[3], 0);
}

#[test]
fn test_tinted_background_shows_behind_items() {
    let mut session = EditorSession::new(Size::new(200.0, 200.0), Box::new(NoHaptics));
    session.select_color(ProductColor::Navy);
    session.canvas_mut().add_image(solid([255, 255, 0, 255]));

    let mut library = BackgroundLibrary::plain(200, 200);
    let background = library
        .tinted(session.side(), session.color())
        .expect("outline")
        .clone();

    let raster = Compositor::with_defaults()
        .capture_snapshot(session.canvas_mut(), Some(&background))
        .expect("capture");
    assert_eq!(raster.get_pixel(10, 10).0, [0, 0, 128, 255]);
    assert_eq!(raster.get_pixel(100, 100).0, [255, 255, 0, 255]);
}

#[test]
fn test_jpeg_capture_is_canvas_sized() {
    let mut canvas = canvas();
    canvas.add_image(solid([0, 0, 255, 128]));
    let jpeg = Compositor::with_defaults()
        .capture_jpeg(&mut canvas, None)
        .expect("jpeg");
    assert_eq!(&jpeg[0..3], &[0xFF, 0xD8, 0xFF]);

    let decoded = image::load_from_memory(&jpeg).expect("decode").to_rgb8();
    assert_eq!(decoded.dimensions(), (200, 200));
    let corner = decoded.get_pixel(2, 2);
    assert!(corner.0.iter().all(|&c| c > 245), "matte should be white: {corner:?}");
}
