use crate::*;

use scroll_reader::{
    Item, Matrix, PointerEvent, PointerPhase, ReaderEvent, ReaderOptions, Rect, ScrollSnapshot,
    ScrollState,
};

type TestReader = Reader<VecProvider<usize>, RecordingSink<PageView>>;

fn reader_with(provider: VecProvider<usize>) -> TestReader {
    let mut r = Reader::new(ReaderOptions::default(), provider, RecordingSink::new());
    r.resize(400, 1000);
    r
}

fn pages(count: usize) -> TestReader {
    reader_with(VecProvider::from_heights(vec![600.0; count]))
}

fn prepended(count: usize) -> VecProvider<usize> {
    let mut provider = VecProvider::from_heights(vec![600.0; count]);
    provider.prepend((0..3).map(|i| Item {
        key: 100 + i,
        height: 300.0,
        view_type: 0,
    }));
    provider
}

fn ev(phase: PointerPhase, y: f32, t: u64) -> PointerEvent {
    PointerEvent::single(phase, 200.0, y, t)
}

fn offset(r: &TestReader) -> i32 {
    r.controller().viewport().current_offset()
}

#[test]
fn resize_lays_out_and_places_views() {
    let r = pages(20);
    assert_eq!(r.sink().attached(), &[PageView(1), PageView(2)]);
    assert_eq!(
        r.sink().rect_of(&PageView(2)),
        Some(Rect {
            left: 0,
            top: 610,
            right: 400,
            bottom: 1210
        })
    );
}

#[test]
fn nothing_is_laid_out_before_resize() {
    let r = Reader::new(
        ReaderOptions::default(),
        VecProvider::from_heights([600.0; 3]),
        RecordingSink::<PageView>::new(),
    );
    assert!(r.sink().attached().is_empty());
    assert_eq!(r.controller().viewport().visible_range(), None);
}

#[test]
fn drag_relayouts_without_an_explicit_call() {
    let mut r = pages(20);
    r.on_pointer_event(&ev(PointerPhase::Down, 900.0, 0));
    let out = r.on_pointer_event(&ev(PointerPhase::Move, 200.0, 16));
    assert!(out.layout);

    assert_eq!(offset(&r), 700);
    // Item 2 reuses the view item 0 left behind.
    assert_eq!(r.sink().attached(), &[PageView(2), PageView(1)]);
    assert_eq!(r.provider().views_created(), 2);
    assert_eq!(r.provider().bind_count(), 3);
    assert_eq!(r.sink().detach_count(), 1);
}

#[test]
fn fling_runs_to_completion_through_ticks() {
    let mut r = pages(200);
    r.on_pointer_event(&ev(PointerPhase::Down, 900.0, 0));
    for (i, y) in [850.0, 800.0, 750.0, 700.0].into_iter().enumerate() {
        r.on_pointer_event(&ev(PointerPhase::Move, y, 10 * (i as u64 + 1)));
    }
    r.on_pointer_event(&ev(PointerPhase::Up, 650.0, 50));
    assert!(r.is_animating());

    let mut now = 50;
    let mut ticks = 0;
    while r.is_animating() && ticks < 500 {
        now += 16;
        r.tick(now);
        ticks += 1;
    }
    assert!(!r.is_animating());
    assert!(offset(&r) > 1200);

    let events = r.drain_events();
    assert!(events.iter().any(|e| matches!(e, ReaderEvent::FlingStarted { .. })));
    assert_eq!(
        events.iter().filter(|e| **e == ReaderEvent::FlingEnded).count(),
        1
    );
}

#[test]
fn prepend_keeps_the_current_page_in_place() {
    let mut r = pages(20);
    r.restore(ScrollSnapshot {
        offset: 1300,
        current_index: None,
    });
    assert_eq!(r.controller().viewport().current_index(), Some(3));

    r.update_data(|p| {
        p.prepend((0..3).map(|i| Item {
            key: 100 + i,
            height: 300.0,
            view_type: 0,
        }))
    });

    let vp = r.controller().viewport();
    // Three 300 px pages plus dividers landed above.
    assert_eq!(vp.current_offset(), 1300 + 930);
    assert_eq!(vp.current_index(), Some(6));
    assert_eq!(vp.laid_out(5).map(|it| (it.key, it.top)), Some((2, -80)));
}

#[test]
fn shrinking_a_page_refills_the_bottom_in_the_same_layout() {
    let mut r = pages(20);
    r.update_data(|p| p.set_height(1, 300.0));

    let range = r.controller().viewport().visible_range().map(|v| v.bottom_index);
    assert_eq!(range, Some(2));
    assert_eq!(
        r.sink().rect_of(&PageView(3)),
        Some(Rect {
            left: 0,
            top: 920,
            right: 400,
            bottom: 1520
        })
    );
}

#[test]
fn anchor_survives_a_prepend_across_readers() {
    let mut a = pages(20);
    a.restore(ScrollSnapshot {
        offset: 1300,
        current_index: None,
    });
    let anchor = a.capture_anchor().expect("laid out");
    assert_eq!(anchor.key, 2);
    assert_eq!(anchor.offset_in_page, 80);

    let mut b = reader_with(prepended(20));
    assert!(b.apply_anchor(&anchor));
    assert_eq!(offset(&b), 930 + 2 * 610 + 80);
    assert_eq!(b.controller().viewport().first_visible_index(), Some(5));
    assert_eq!(
        b.controller().viewport().laid_out(5).map(|it| it.top),
        Some(-80)
    );
}

#[test]
fn anchor_for_a_missing_page_is_rejected() {
    let mut r = pages(5);
    let anchor = PageAnchor {
        key: 999,
        offset_in_page: 0,
    };
    assert!(!r.apply_anchor(&anchor));
    assert_eq!(offset(&r), 0);
}

#[test]
fn snapshot_restores_into_a_fresh_reader() {
    let mut a = pages(20);
    assert!(a.scroll_to_index(4));
    let snap = a.snapshot();
    assert_eq!(snap.scroll.offset, 4 * 610);

    let mut b = pages(20);
    b.restore(snap.scroll);
    assert_eq!(offset(&b), 4 * 610);
    let range = b.controller().viewport().visible_range().expect("laid out");
    assert_eq!((range.top_index, range.bottom_index), (4, 5));
}

#[test]
fn scroll_to_index_rejects_out_of_range() {
    let mut r = pages(3);
    assert!(!r.scroll_to_index(3));
    assert_eq!(offset(&r), 0);
}

#[test]
fn replace_provider_starts_from_scratch() {
    let mut r = pages(20);
    r.on_pointer_event(&ev(PointerPhase::Down, 900.0, 0));
    r.on_pointer_event(&ev(PointerPhase::Move, 200.0, 16));
    r.on_pointer_event(&ev(PointerPhase::Up, 200.0, 500));

    let old = r.replace_provider(VecProvider::from_heights([300.0; 5]));
    assert_eq!(old.len(), 20);
    assert_eq!(offset(&r), 0);
    assert_eq!(r.sink().attached().len(), 4);
    assert_eq!(r.provider().views_created(), 4);
}

#[test]
fn replacing_the_provider_mid_fling_detaches_each_view_once() {
    let mut r = pages(200);
    r.on_pointer_event(&ev(PointerPhase::Down, 900.0, 0));
    for (i, y) in [850.0, 800.0, 750.0, 700.0].into_iter().enumerate() {
        r.on_pointer_event(&ev(PointerPhase::Move, y, 10 * (i as u64 + 1)));
    }
    r.on_pointer_event(&ev(PointerPhase::Up, 650.0, 50));
    r.tick(66);
    assert!(r.controller().fling().is_running());
    r.drain_events();

    let attached = r.sink().attached().len();
    let detached = r.sink().detach_count();
    r.replace_provider(VecProvider::from_heights([300.0; 5]));

    assert_eq!(r.sink().detach_count(), detached + attached);
    assert!(!r.controller().fling().is_running());
    assert_eq!(r.controller().scroll_state(), ScrollState::Idle);
    let events = r.drain_events();
    assert_eq!(
        events.iter().filter(|e| **e == ReaderEvent::FlingEnded).count(),
        1
    );
    assert!(events.contains(&ReaderEvent::ScrollStateChanged(ScrollState::Idle)));
}

#[test]
fn double_tap_zoom_reaches_the_surface() {
    let mut r = pages(20);
    r.on_pointer_event(&ev(PointerPhase::Down, 100.0, 0));
    r.on_pointer_event(&ev(PointerPhase::Up, 100.0, 40));
    r.on_pointer_event(&ev(PointerPhase::Down, 100.0, 150));
    r.on_pointer_event(&ev(PointerPhase::Up, 100.0, 190));

    let mut surface = Matrix::IDENTITY;
    assert!(r.draw(250, &mut surface));
    assert!(surface.scale_y > 1.0 && surface.scale_y < 2.0);
    assert!(!r.draw(400, &mut surface));
    assert_eq!(surface.scale_y, 2.0);
}

#[test]
fn try_new_rejects_invalid_options() {
    let options = ReaderOptions::default().with_fling_friction(0.0);
    let r = Reader::try_new(
        options,
        VecProvider::from_heights([600.0]),
        RecordingSink::<PageView>::new(),
    );
    assert!(r.is_err());
}

#[test]
fn into_parts_hands_back_the_provider() {
    let r = pages(7);
    let (controller, provider, sink) = r.into_parts();
    assert_eq!(provider.len(), 7);
    assert_eq!(sink.attached().len(), 2);
    assert_eq!(controller.viewport().laid_out_len(), 2);
}

#[cfg(feature = "serde")]
#[test]
fn anchor_serializes_to_json() {
    let anchor = PageAnchor {
        key: 42usize,
        offset_in_page: 120,
    };
    let json = serde_json::to_string(&anchor).expect("serialize");
    let back: PageAnchor<usize> = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, anchor);
}
