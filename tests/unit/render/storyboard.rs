use super::*;
use crate::{
    marks::tracker::replay,
    render::sink::drive,
    search::{generator::generate, model::Variant},
};

fn center(board: &Storyboard, index: usize) -> (u32, u32) {
    let c = board.cell(index).unwrap().center();
    (c.x as u32, c.y as u32)
}

#[test]
fn canvas_is_even_and_fits_all_cells() {
    let board = Storyboard::new(StoryboardStyle::default(), 5).unwrap();
    assert_eq!(board.canvas(), (400, 174));

    let odd = StoryboardStyle {
        margin_px: 3,
        ..StoryboardStyle::default()
    };
    let (w, h) = Storyboard::new(odd, 3).unwrap().canvas();
    assert_eq!(w % 2, 0);
    assert_eq!(h % 2, 0);
}

#[test]
fn style_validation_rejects_degenerate_values() {
    let bad = StoryboardStyle {
        frames_per_step: 0,
        ..StoryboardStyle::default()
    };
    assert!(Storyboard::new(bad, 3).is_err());
    let fat_border = StoryboardStyle {
        cell_px: 8,
        border_px: 4,
        ..StoryboardStyle::default()
    };
    assert!(fat_border.validate().is_err());
    assert!(matches!(
        Storyboard::new(StoryboardStyle::default(), 0),
        Err(SearchVizError::EmptyArray)
    ));
}

#[test]
fn oversized_rows_are_rejected_instead_of_overflowing() {
    assert!(matches!(
        Storyboard::new(StoryboardStyle::default(), 100_000_000),
        Err(SearchVizError::Validation(_))
    ));
    assert!(matches!(
        Storyboard::new(StoryboardStyle::default(), usize::MAX),
        Err(SearchVizError::Validation(_))
    ));
    let wide_margin = StoryboardStyle {
        margin_px: u32::MAX / 2,
        ..StoryboardStyle::default()
    };
    assert!(Storyboard::new(wide_margin, 1).is_err());
}

#[test]
fn cells_take_the_color_of_their_mark() {
    let trace = generate(&[2, 5, 8, 13, 17], Some(13), Variant::Binary).unwrap();
    let frames = replay(&trace).unwrap();
    let board = Storyboard::for_trace(StoryboardStyle::default(), &trace).unwrap();
    let last = trace.steps.last().unwrap();
    let img = board.draw(Some(last), &frames.last().unwrap().marks).unwrap();

    let p = Palette::default();
    let (x, y) = center(&board, 0);
    assert_eq!(img.pixel(x, y), Some(p.skipped));
    let (x, y) = center(&board, 2);
    assert_eq!(img.pixel(x, y), Some(p.scanned));
    let (x, y) = center(&board, 3);
    assert_eq!(img.pixel(x, y), Some(p.found));
    let (x, y) = center(&board, 4);
    assert_eq!(img.pixel(x, y), Some(p.excluded));
}

#[test]
fn probe_frame_shows_mid_marker_under_probed_cell() {
    let trace = generate(&[2, 5, 8, 13, 17], Some(13), Variant::Binary).unwrap();
    let frames = replay(&trace).unwrap();
    let board = Storyboard::for_trace(StoryboardStyle::default(), &trace).unwrap();
    let img = board.draw(Some(&trace.steps[0]), &frames[0].marks).unwrap();

    let p = Palette::default();
    let cell = board.cell(2).unwrap();
    let x = cell.center().x as u32;
    // Lanes start one gap under the row: low, mid, high.
    assert_eq!(img.pixel(x, 119), Some(p.mid));
    let low_x = board.cell(0).unwrap().center().x as u32;
    assert_eq!(img.pixel(low_x, 105), Some(p.low));
    let high_x = board.cell(4).unwrap().center().x as u32;
    assert_eq!(img.pixel(high_x, 133), Some(p.high));
}

#[test]
fn not_found_frame_is_outlined() {
    let trace = generate(&[2, 5, 8], Some(99), Variant::Linear).unwrap();
    let frames = replay(&trace).unwrap();
    let board = Storyboard::for_trace(StoryboardStyle::default(), &trace).unwrap();
    let img = board
        .draw(trace.steps.last(), &frames.last().unwrap().marks)
        .unwrap();
    let first = board.cell(0).unwrap();
    let x = first.center().x as u32;
    let y = (first.y0 - 4.0) as u32;
    assert_eq!(img.pixel(x, y), Some(Palette::default().not_found));
}

#[test]
fn draw_rejects_wrong_mark_count() {
    let board = Storyboard::new(StoryboardStyle::default(), 3).unwrap();
    assert!(board.draw::<i32>(None, &[IndexMark::Untouched; 2]).is_err());
}

#[test]
fn collector_emits_start_frame_plus_one_per_step() {
    let trace = generate(&[1, 3, 5, 7], Some(7), Variant::Binary).unwrap();
    let board = Storyboard::for_trace(StoryboardStyle::default(), &trace).unwrap();
    let mut collector = FrameCollector::new(board);
    drive(&trace, &mut collector).unwrap();
    assert_eq!(collector.frames().len(), trace.steps.len() + 1);
    let (w, h) = (collector.frames()[0].width, collector.frames()[0].height);
    assert!(collector.into_frames().iter().all(|f| f.width == w && f.height == h));
}
