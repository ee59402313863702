use foundation::Color;
use foundation::math::{GeoCoordinate, Vec3};
use serde::Serialize;

use crate::frame::Frame;

/// Something the host may want to react to (update a readout, re-upload uniforms).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GlobeEvent {
    Picked {
        coordinate: GeoCoordinate,
        point: Vec3,
    },
    Missed,
    MarkerMoved {
        coordinate: GeoCoordinate,
        position: Vec3,
    },
    CameraMoved {
        position: Vec3,
    },
    SunMoved {
        direction: Vec3,
    },
    ColorsChanged {
        day: Color,
        twilight: Color,
    },
    Resized {
        width: f64,
        height: f64,
        pixel_ratio: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    pub frame_index: u64,
    pub event: GlobeEvent,
}

#[derive(Debug, Default)]
pub struct EventBus {
    frame_index: u64,
    events: Vec<Event>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamps subsequent events with `frame`'s index.
    pub fn begin_frame(&mut self, frame: Frame) {
        self.frame_index = frame.index;
    }

    pub fn emit(&mut self, event: GlobeEvent) {
        self.events.push(Event {
            frame_index: self.frame_index,
            event,
        });
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}
