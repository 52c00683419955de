use scroll_reader::{Item, Matrix, PointerEvent, PointerPhase, ReaderOptions};
use scroll_reader_adapter::{Reader, RecordingSink, VecProvider};

fn main() {
    // Simulates a reading session: swipe, fling, load earlier chapters, resume from an anchor.
    let heights = (0..40).map(|i| if i % 5 == 0 { 1400.0 } else { 900.0 });
    let options = ReaderOptions::default().with_low_data_threshold(5);
    let mut reader = Reader::new(options, VecProvider::from_heights(heights), RecordingSink::new());
    reader.resize(720, 1280);

    let mut now = 0;
    let swipe = [1100.0, 1000.0, 880.0, 740.0, 600.0];
    reader.on_pointer_event(&PointerEvent::single(PointerPhase::Down, 360.0, 1200.0, now));
    for y in swipe {
        now += 12;
        reader.on_pointer_event(&PointerEvent::single(PointerPhase::Move, 360.0, y, now));
    }
    now += 12;
    reader.on_pointer_event(&PointerEvent::single(PointerPhase::Up, 360.0, 600.0, now));

    let mut surface = Matrix::IDENTITY;
    while reader.is_animating() {
        now += 16;
        reader.tick(now);
        reader.draw(now, &mut surface);
    }
    println!(
        "after fling: offset={} page={:?}",
        reader.controller().viewport().current_offset(),
        reader.controller().viewport().current_index()
    );

    let anchor = reader.capture_anchor();
    println!("anchor: {anchor:?}");

    // Earlier chapters arrive; the current page must not move on screen.
    reader.update_data(|p| {
        p.prepend((0..6).map(|i| Item {
            key: 1000 + i,
            height: 900.0,
            view_type: 0,
        }))
    });
    println!(
        "after prepend: offset={} page={:?}",
        reader.controller().viewport().current_offset(),
        reader.controller().viewport().current_index()
    );

    for event in reader.drain_events() {
        println!("event: {event:?}");
    }

    // A second session resumes from the anchor.
    let mut resumed = Reader::new(
        ReaderOptions::default(),
        reader.provider().clone(),
        RecordingSink::new(),
    );
    resumed.resize(720, 1280);
    if let Some(anchor) = anchor {
        let ok = resumed.apply_anchor(&anchor);
        println!(
            "resumed: ok={ok} offset={} first_visible={:?}",
            resumed.controller().viewport().current_offset(),
            resumed.controller().viewport().first_visible_index()
        );
    }
}
