use foundation::time::Time;

/// Metadata for one display refresh.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
    /// Seconds since the previous frame (0 for the first frame).
    pub dt_s: f64,
    /// Time since the clock started.
    pub time: Time,
}

impl Frame {
    pub fn new(index: u64, dt_s: f64, time: Time) -> Self {
        Self { index, dt_s, time }
    }

    /// Frame `index` of a fixed-step timeline. Handy for tests and replays.
    pub fn fixed(index: u64, dt_s: f64) -> Self {
        Self::new(index, dt_s, Time(index as f64 * dt_s))
    }
}

/// Turns host refresh timestamps into [`Frame`]s.
///
/// Host timestamps are seconds on any monotonic-ish timeline; the first
/// timestamp seen becomes time zero. A timestamp earlier than the previous one
/// yields `dt_s = 0` rather than running time backwards.
#[derive(Debug, Default, Clone)]
pub struct Clock {
    start_s: Option<f64>,
    last: Option<Frame>,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, host_now_s: f64) -> Frame {
        let start = *self.start_s.get_or_insert(host_now_s);
        let frame = match self.last {
            None => Frame::new(0, 0.0, Time::ZERO),
            Some(prev) => {
                let time = Time((host_now_s - start).max(prev.time.0));
                Frame::new(prev.index + 1, time.since(prev.time), time)
            }
        };
        self.last = Some(frame);
        frame
    }

    /// Elapsed time of the most recent frame.
    pub fn elapsed(&self) -> Time {
        self.last.map(|f| f.time).unwrap_or(Time::ZERO)
    }
}
