use fmrender::{BusPort, ChipCore, RenderConfig, RenderError, Renderer, Timeline, TimelineBuilder};

/// Chip that records every bus operation with the frame it arrived on.
///
/// The frame is derived from the tick count, so the recorder also checks the
/// renderer's clocking. Output is a deterministic function of the last
/// latched data value so idempotence is observable.
#[derive(Debug, Default)]
struct Recorder {
    clock_step: u64,
    ticks: u64,
    resets: Vec<u32>,
    writes: Vec<(u64, BusPort, u8)>,
    last_data: u8,
}

impl Recorder {
    fn new(clock_step: u32) -> Self {
        Self {
            clock_step: clock_step as u64,
            ..Default::default()
        }
    }

    fn frame(&self) -> u64 {
        self.ticks / self.clock_step
    }

    fn writes_per_frame(&self) -> std::collections::HashMap<u64, usize> {
        let mut counts = std::collections::HashMap::new();
        for (frame, _, _) in &self.writes {
            *counts.entry(*frame).or_insert(0) += 1;
        }
        counts
    }
}

impl ChipCore for Recorder {
    fn reset(&mut self, clock_hz: u32) {
        self.resets.push(clock_hz);
        self.ticks = 0;
        self.writes.clear();
        self.last_data = 0;
    }

    fn write_bus(&mut self, port: BusPort, value: u8) {
        self.writes.push((self.frame(), port, value));
        if port == BusPort::Data {
            self.last_data = value;
        }
    }

    fn tick(&mut self) -> (i32, i32) {
        self.ticks += 1;
        let level = self.last_data as i32 * 128;
        (level, -level)
    }
}

fn example_timeline() -> Timeline {
    let mut builder = TimelineBuilder::new();
    builder.add_write(0.0, 0x20, 0xC7);
    builder.add_write(0.0, 0x08, 0x78);
    builder.finalize().unwrap()
}

fn renderer(busy_cycles: u32) -> Renderer<Recorder> {
    let config = RenderConfig::new(3_579_545, 64, busy_cycles).unwrap();
    Renderer::new(Recorder::new(64), config)
}

#[test]
fn test_example_bus_schedule() {
    // busy 128 / step 64 = 2.0 frames per access
    let mut r = renderer(128);
    assert_eq!(r.render(&example_timeline(), 8), 8);

    let writes = &r.chip().writes;
    assert_eq!(
        writes,
        &vec![
            (0, BusPort::Address, 0x20),
            (2, BusPort::Data, 0xC7),
            (4, BusPort::Address, 0x08),
            (6, BusPort::Data, 0x78),
        ]
    );
}

#[test]
fn test_render_returns_frame_count_and_buffer_size() {
    let mut r = renderer(64);
    for frames in [1usize, 7, 512] {
        assert_eq!(r.render(&example_timeline(), frames), frames);
        assert_eq!(r.samples().len(), frames * 2);
        assert_eq!(r.frames(), frames);
    }
}

#[test]
fn test_one_bus_operation_per_frame_on_dense_timeline() {
    let mut builder = TimelineBuilder::new();
    for i in 0..64u8 {
        builder.add_write(0.0, 0x60 + (i & 0x1F), i);
    }
    let timeline = builder.finalize().unwrap();

    // No busy interval at all: still one operation per frame
    let mut r = renderer(0);
    r.render(&timeline, 200);
    let chip = r.chip();
    assert_eq!(chip.writes.len(), 128);
    assert!(chip.writes_per_frame().values().all(|&n| n == 1));
}

#[test]
fn test_data_follows_address_with_busy_gap() {
    let mut builder = TimelineBuilder::new();
    for i in 0..10u8 {
        builder.add_write(i as f64 * 0.0001, 0x28, i);
    }
    let timeline = builder.finalize().unwrap();

    // 3.25 frames per access -> at least 4 frames between operations
    let mut r = renderer(208);
    r.set_trace(true);
    r.render(&timeline, 1000);
    let trace = r.trace();
    assert_eq!(trace.len(), 20);

    for pair in trace.chunks_exact(2) {
        assert_eq!(pair[0].port(), BusPort::Address);
        assert_eq!(pair[1].port(), BusPort::Data);
        assert_eq!(pair[0].command_index, pair[1].command_index);
        assert!(pair[1].frame - pair[0].frame >= 4);
    }
    for window in trace.windows(2) {
        assert!(window[1].frame - window[0].frame >= 4);
    }
}

#[test]
fn test_commands_wait_for_trigger_time() {
    let config = RenderConfig::for_sample_rate(1000, 64).unwrap();
    let mut r = Renderer::new(Recorder::new(64), config);
    let timeline: Timeline = "0.5 0x08 0x78\n0.75 0x08 0x00\n".parse().unwrap();
    r.set_trace(true);
    r.render(&timeline, 1000);

    let frames: Vec<usize> = r.trace().iter().map(|e| e.frame).collect();
    assert_eq!(frames, vec![500, 501, 750, 751]);
}

#[test]
fn test_unfinished_timeline_is_truncated() {
    let timeline: Timeline = "0 0x20 0xC7\n10.0 0x08 0x78\n".parse().unwrap();
    let mut r = renderer(64);
    r.set_trace(true);
    assert_eq!(r.render(&timeline, 100), 100);
    assert_eq!(r.trace().len(), 2);
}

#[test]
fn test_render_is_idempotent() {
    let timeline = example_timeline();
    let mut r = renderer(128);
    r.render(&timeline, 64);
    let first = r.samples().to_vec();
    r.render(&timeline, 64);
    assert_eq!(r.samples(), first.as_slice());
    assert_eq!(r.chip().resets, vec![3_579_545, 3_579_545]);
}

#[test]
fn test_samples_are_last_tick_scaled() {
    let mut r = renderer(128);
    r.render(&example_timeline(), 8);
    // Frames 0 and 1 precede the first data write
    assert_eq!(r.sample(0), 0.0);
    assert_eq!(r.sample(3), 0.0);
    // From frame 2 on the recorder outputs 0xC7 * 128
    let expected = (0xC7 * 128) as f32 / 32768.0;
    assert_eq!(r.sample(4), expected);
    assert_eq!(r.sample(5), -expected);
    // Frame 6 latched 0x78
    assert_eq!(r.sample(12), (0x78 * 128) as f32 / 32768.0);
}

#[test]
fn test_empty_timeline_renders_silence() {
    let mut r = renderer(64);
    assert_eq!(r.render(&Timeline::default(), 100), 100);
    assert!(r.samples().iter().all(|&s| s == 0.0));
    assert!(r.chip().writes.is_empty());
}

#[test]
fn test_zero_frames_rejected() {
    let mut r = renderer(64);
    assert_eq!(r.render(&example_timeline(), 0), 0);
    assert_eq!(
        r.try_render(&example_timeline(), 0),
        Err(RenderError::EmptyRequest)
    );
    assert_eq!(r.frames(), 0);
    assert!(r.chip().resets.is_empty());
}

#[test]
fn test_safe_reads() {
    let mut r = renderer(64);
    assert_eq!(r.sample(0), 0.0);
    r.render(&example_timeline(), 4);
    assert_eq!(r.sample(8), 0.0);
    assert_eq!(r.sample(usize::MAX), 0.0);
    r.release();
    assert_eq!(r.sample(0), 0.0);
    assert!(r.samples().is_empty());
}
