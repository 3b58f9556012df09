use std::f64::consts::FRAC_PI_2;
use std::time::{Duration, Instant};

use kurbo::Point;
use retouch_core::geometry::animation::Step;
use retouch_core::geometry::crop::{CropRatio, CropRect};
use retouch_core::params::{EnhanceParams, Filter};
use retouch_core::pipeline::Pipeline;
use retouch_core::pipeline::modules::{Brightness, Contrast, Grain, Sharpen};
use retouch_core::surface::Surface;
use retouch_session::{
    EditEvent, Editor, EditorConfig, LoadError, Notification, Session, SourceImage, Stage,
};

fn photo(width: u32, height: u32) -> Surface {
    let mut s = Surface::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let b = if (x + y) % 2 == 0 { 210 } else { 40 };
            s.set_pixel(x, y, [(x * 255 / width) as u8, (y * 255 / height) as u8, b, 255]);
        }
    }
    s
}

fn editor(width: u32, height: u32) -> Editor {
    let source = SourceImage::from_surface(photo(width, height)).unwrap();
    Editor::load(source, EditorConfig::default()).unwrap()
}

fn session(width: u32, height: u32) -> Session {
    Session::new(editor(width, height))
}

fn brightness(value: f32) -> EditEvent {
    EditEvent::Enhance {
        filter: Filter::Brightness,
        value,
    }
}

#[test]
fn zero_parameters_reproduce_the_source() {
    let mut e = editor(32, 24);
    for filter in Filter::ALL {
        e.set_enhance_parameter(filter, 0.0);
    }
    e.flush().unwrap();
    assert_eq!(e.color_output(), e.source().surface());
}

#[test]
fn contrast_and_brightness_do_not_commute() {
    let mut params = EnhanceParams::default();
    params.set(Filter::Contrast, 60.0);
    params.set(Filter::Brightness, 40.0);

    let source = photo(16, 16);
    let forward = Pipeline::with_modules(vec![Box::new(Contrast), Box::new(Brightness)])
        .process_cpu(source.clone(), &params)
        .unwrap();
    let backward = Pipeline::with_modules(vec![Box::new(Brightness), Box::new(Contrast)])
        .process_cpu(source, &params)
        .unwrap();
    assert_ne!(forward, backward);
}

#[test]
fn extreme_parameters_stay_in_range_and_alpha_is_kept() {
    let mut params = EnhanceParams::default();
    for filter in Filter::ALL {
        let range = filter.range();
        params.set(filter, range.max);
    }
    let modules: Vec<Box<dyn retouch_core::pipeline::module::ProcessingModule>> = vec![
        Box::new(Contrast),
        Box::new(Brightness),
        Box::new(Grain::seeded(7)),
        Box::new(Sharpen),
    ];
    let out = Pipeline::with_modules(modules)
        .process_cpu(photo(20, 20), &params)
        .unwrap();
    assert!(out.data.chunks_exact(4).all(|p| p[3] == 255));

    let full = Pipeline::new().process_cpu(photo(20, 20), &params).unwrap();
    assert_eq!(full.data.len(), 20 * 20 * 4);
}

#[test]
fn backwards_corner_drag_is_normalized() {
    let mut e = editor(100, 80);
    e.enable_crop_mode().unwrap();
    e.set_crop_rect(CropRect::new(20.0, 20.0, 40.0, 30.0)).unwrap();
    let pad = e.config().geometry.padding;

    // Grab the bottom-right corner and pull it above and left of the top-left.
    assert!(e.pointer_down(Point::new(60.0 + pad, 50.0 + pad), 1.0).unwrap());
    e.pointer_move(Point::new(5.0 + pad, 8.0 + pad)).unwrap();
    e.pointer_up().unwrap();

    let rect = e.crop_rect();
    assert_eq!(rect, CropRect::new(5.0, 8.0, 15.0, 12.0));
    assert!(rect.width >= 0.0 && rect.height >= 0.0);
}

#[test]
fn fixed_ratio_survives_corner_drag() {
    let mut e = editor(160, 120);
    e.enable_crop_mode().unwrap();
    e.set_crop_ratio(CropRatio::R4x3).unwrap();
    let start = e.crop_rect();
    assert_eq!((start.width, start.height), (160.0, 120.0));

    let pad = e.config().geometry.padding;
    assert!(e.pointer_down(Point::new(160.0 + pad, 120.0 + pad), 1.0).unwrap());
    e.pointer_move(Point::new(97.0 + pad, 101.0 + pad)).unwrap();
    e.pointer_up().unwrap();

    let rect = e.crop_rect();
    assert!(rect.width > 0.0 && rect.height > 0.0);
    assert!((rect.width / rect.height - 4.0 / 3.0).abs() < 0.02, "{rect:?}");
}

#[test]
fn commit_after_undo_discards_the_redo_tail() {
    let mut s = session(8, 8);
    s.apply(brightness(10.0)).unwrap();
    s.apply(brightness(20.0)).unwrap();
    s.apply(brightness(30.0)).unwrap();
    s.undo().unwrap();
    s.undo().unwrap();
    assert_eq!(s.history().current_state(), 0);

    s.apply(EditEvent::Enhance {
        filter: Filter::Fade,
        value: 50.0,
    })
    .unwrap();
    assert_eq!(s.history().len(), 2);
    assert!(!s.redo().unwrap());
    assert_eq!(s.editor().enhance_parameter(Filter::Brightness), 10.0);
    assert_eq!(s.editor().enhance_parameter(Filter::Fade), 50.0);
}

#[test]
fn undo_walks_brightness_back_to_default() {
    let mut s = session(8, 8);
    for v in [10.0, 20.0, 30.0] {
        s.apply(brightness(v)).unwrap();
    }
    s.undo().unwrap();
    s.undo().unwrap();
    assert_eq!(s.editor().enhance_parameter(Filter::Brightness), 10.0);
    s.undo().unwrap();
    assert_eq!(s.editor().enhance_parameter(Filter::Brightness), 0.0);
    assert!(!s.undo().unwrap());

    s.redo().unwrap();
    assert_eq!(s.editor().enhance_parameter(Filter::Brightness), 10.0);
}

#[test]
fn undo_of_crop_ratio_restores_previous_rect() {
    let mut s = session(100, 50);
    s.apply(EditEvent::Crop {
        ratio: CropRatio::Square,
    })
    .unwrap();
    assert_eq!(s.editor().crop_rect(), CropRect::new(25.0, 0.0, 50.0, 50.0));
    s.undo().unwrap();
    assert_eq!(s.editor().crop_ratio(), CropRatio::Free);
    assert_eq!(s.editor().crop_rect(), CropRect::new(0.0, 0.0, 100.0, 50.0));
    let out = s.editor_mut().get_modified_file().unwrap();
    assert_eq!((out.width, out.height), (100, 50));
    assert_eq!(&out, s.editor().source().surface());

    s.redo().unwrap();
    assert_eq!(s.editor().crop_rect(), CropRect::new(25.0, 0.0, 50.0, 50.0));
    let notes = s.editor_mut().drain_notifications();
    assert_eq!(
        notes.last(),
        Some(&Notification::HistoryChanged {
            can_undo: false,
            can_redo: true
        })
    );
}

#[test]
fn closed_session_keeps_its_last_output() {
    let mut s = session(40, 30);
    s.apply(brightness(20.0)).unwrap();
    s.editor_mut().flush().unwrap();
    let before = s.editor().output().clone();
    s.close();

    let e = s.editor_mut();
    e.enable_brush_mode().unwrap();
    assert!(!e.pointer_down(Point::new(10.0, 10.0), 1.0).unwrap());
    assert!(!e.pointer_move(Point::new(20.0, 20.0)).unwrap());
    assert!(!e.pointer_up().unwrap());
    e.set_crop_ratio(CropRatio::Square).unwrap();
    assert!(!e.rotate_quarter());
    e.set_enhance_parameter(Filter::Brightness, 80.0);
    e.flush().unwrap();

    assert!(e.strokes().is_empty());
    assert_eq!(e.enhance_parameter(Filter::Brightness), 20.0);
    assert_eq!(e.output(), &before);
}

#[test]
fn untouched_session_exports_the_source() {
    let mut e = editor(100, 100);
    let out = e.get_modified_file().unwrap();
    assert_eq!((out.width, out.height), (100, 100));
    assert_eq!(&out, e.source().surface());
}

#[test]
fn crop_is_baked_into_the_export() {
    let mut e = editor(100, 100);
    e.enable_crop_mode().unwrap();
    e.set_crop_rect(CropRect::new(10.0, 10.0, 50.0, 50.0)).unwrap();
    e.disable_crop_mode().unwrap();

    let out = e.get_modified_file().unwrap();
    assert_eq!((out.width, out.height), (50, 50));
    assert_eq!(out, e.source().surface().sub_region(10, 10, 50, 50));
    assert_eq!(e.geometry().rotation(), 0.0);
    assert_eq!(e.geometry().mirror(), 1.0);
}

#[test]
fn quarter_turn_converges_without_drift() {
    let mut e = editor(40, 20);
    let before = e.geometry().committed_rotation();
    assert!(e.rotate_quarter());
    // A second press mid-flight joins the running animation.
    e.advance_animation(16.0).unwrap();
    assert!(!e.rotate_quarter());

    let mut frames = 0;
    loop {
        match e.advance_animation(16.0).unwrap() {
            Step::Running => frames += 1,
            Step::Finished => break,
            Step::Idle => panic!("animation stopped without finishing"),
        }
        assert!(frames < 1000);
    }
    assert_eq!(e.geometry().committed_rotation(), before + 2.0 * FRAC_PI_2);
    assert!(!e.is_animating());

    let out = e.get_modified_file().unwrap();
    assert_eq!((out.width, out.height), (40, 20));
}

#[test]
fn single_quarter_turn_swaps_dimensions() {
    let mut e = editor(40, 20);
    e.rotate_quarter();
    while e.advance_animation(16.0).unwrap() == Step::Running {}
    assert_eq!(e.geometry().committed_rotation(), FRAC_PI_2);
    let out = e.output();
    assert_eq!((out.width, out.height), (20, 40));
}

#[test]
fn geometry_only_edits_never_rerun_color() {
    let mut e = editor(64, 48);
    e.enable_crop_mode().unwrap();
    e.set_crop_ratio(CropRatio::R16x9).unwrap();
    e.mirror();
    while e.advance_animation(16.0).unwrap() == Step::Running {}
    e.set_dial_tick(10);
    e.settle_animation().unwrap();
    e.disable_crop_mode().unwrap();
    e.get_modified_file().unwrap();

    let stats = e.stats();
    assert_eq!(stats.runs(Stage::Color), 1);
    assert!(stats.runs(Stage::Geometry) > 3);
}

#[test]
fn slider_burst_redraws_once_per_tick() {
    let mut e = editor(32, 32);
    let t0 = Instant::now();
    for v in 1..=50 {
        e.set_enhance_parameter(Filter::Saturation, v as f32);
    }
    assert_eq!(e.stats().color_runs, 1);
    assert!(e.tick(t0 + Duration::from_millis(200)).unwrap());
    assert_eq!(e.stats().color_runs, 2);
    assert_eq!(e.enhance_parameter(Filter::Saturation), 50.0);

    // A change between ticks is picked up by the next one, never dropped.
    e.set_enhance_parameter(Filter::Saturation, -30.0);
    assert!(!e.tick(t0 + Duration::from_millis(201)).unwrap());
    assert!(e.is_dirty(Stage::Color));
    assert!(e.tick(t0 + Duration::from_millis(400)).unwrap());
    assert!(!e.is_dirty(Stage::Color));
}

#[tokio::test]
async fn load_and_export_through_files() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.png");
    photo(30, 20).to_rgba_image().unwrap().save(&input).unwrap();

    let mut s = Session::open(&input, EditorConfig::default()).await.unwrap();
    s.editor_mut().enable_crop_mode().unwrap();
    s.editor_mut()
        .set_crop_rect(CropRect::new(0.0, 0.0, 10.0, 10.0))
        .unwrap();
    let out = s.editor_mut().get_modified_file().unwrap();

    let output = dir.path().join("out.png");
    retouch_session::export::save(&out, &output).unwrap();
    let back = image::open(&output).unwrap().to_rgba8();
    assert_eq!(back.dimensions(), (10, 10));
    s.close();
}

#[tokio::test]
async fn undecodable_source_rejects_the_session() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("broken.png");
    std::fs::write(&input, b"not a png").unwrap();

    let err = Session::open(&input, EditorConfig::default())
        .await
        .err()
        .unwrap();
    assert!(matches!(
        err.downcast_ref::<LoadError>(),
        Some(LoadError::Decode(_))
    ));
}
