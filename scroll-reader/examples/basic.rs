// Example: drive the engine directly with a tiny provider, then fling.
use scroll_reader::{
    GestureController, Item, ItemProvider, PlacementSink, PointerEvent, PointerPhase,
    ReaderOptions, Rect,
};

struct Pages {
    heights: Vec<f32>,
    created: u32,
}

impl ItemProvider for Pages {
    type Handle = u32;
    type Key = usize;

    fn count(&self) -> usize {
        self.heights.len()
    }

    fn item_at(&self, index: usize) -> Item<usize> {
        Item {
            key: index,
            height: self.heights[index],
            view_type: 0,
        }
    }

    fn materialize(&mut self, _index: usize, recycled: Option<u32>) -> u32 {
        recycled.unwrap_or_else(|| {
            self.created += 1;
            self.created
        })
    }
}

struct Printer {
    quiet: bool,
}

impl PlacementSink<u32> for Printer {
    fn place(&mut self, handle: &u32, rect: Rect) {
        if !self.quiet {
            println!("  view {handle}: top={} bottom={}", rect.top, rect.bottom);
        }
    }
}

fn main() {
    let mut pages = Pages {
        heights: (0..50).map(|i| 600.0 + (i % 3) as f32 * 150.0).collect(),
        created: 0,
    };
    let mut sink = Printer { quiet: false };
    let mut c = GestureController::new(ReaderOptions::default());
    c.attach_provider(&pages, &mut sink);

    println!("initial layout:");
    c.layout(400, 1000, &mut pages, &mut sink);

    // A quick upward swipe.
    c.on_pointer_event(&PointerEvent::single(PointerPhase::Down, 200.0, 900.0, 0));
    for step in 1..=4u64 {
        let y = 900.0 - 60.0 * step as f32;
        c.on_pointer_event(&PointerEvent::single(PointerPhase::Move, 200.0, y, step * 10));
        c.layout(400, 1000, &mut pages, &mut sink);
    }
    c.on_pointer_event(&PointerEvent::single(PointerPhase::Up, 200.0, 660.0, 50));

    sink.quiet = true;
    let mut now = 50;
    while c.fling().is_running() {
        now += 16;
        if c.tick(now).layout {
            c.layout(400, 1000, &mut pages, &mut sink);
        }
    }

    println!(
        "after fling: offset={} current={:?} views_created={}",
        c.viewport().current_offset(),
        c.viewport().current_index(),
        pages.created
    );
    for event in c.drain_events() {
        println!("event: {event:?}");
    }
}
