//! Headless adapter: scripted input, captured frames, no window.
//!
//! Used by tests and by tooling that wants to drive the render loop
//! without a display server.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{Platform, PlatformEvent};
use crate::error::PlatformError;
use crate::renderer::{Color, Frame};
use crate::AppConfig;

/// What the headless platform saw. Shared with the test that created it.
#[derive(Debug, Default)]
pub struct HeadlessRecord {
    pub polls: usize,
    pub frames_presented: usize,
    pub last_frame: Option<Frame>,
    pub clear_colors: Vec<Color>,
    pub shutdowns: usize,
}

pub struct HeadlessPlatform {
    size: (u32, u32),
    script: VecDeque<Vec<PlatformEvent>>,
    close_after: Option<usize>,
    record: Arc<Mutex<HeadlessRecord>>,
}

impl HeadlessPlatform {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: (width, height),
            script: VecDeque::new(),
            close_after: None,
            record: Arc::new(Mutex::new(HeadlessRecord::default())),
        }
    }

    /// Queue the events returned by the next unscripted poll.
    pub fn push_frame_events(&mut self, events: Vec<PlatformEvent>) {
        self.script.push_back(events);
    }

    pub fn with_frame_events(mut self, events: Vec<PlatformEvent>) -> Self {
        self.push_frame_events(events);
        self
    }

    /// Request a close on poll number `frames` (1-based).
    pub fn close_after(mut self, frames: usize) -> Self {
        self.close_after = Some(frames);
        self
    }

    pub fn record(&self) -> Arc<Mutex<HeadlessRecord>> {
        self.record.clone()
    }

    fn lock(&self) -> MutexGuard<'_, HeadlessRecord> {
        self.record.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Platform for HeadlessPlatform {
    fn create(config: &AppConfig) -> Result<Self, PlatformError> {
        Ok(Self::new(config.width, config.height))
    }

    fn poll_events(&mut self) -> Result<Vec<PlatformEvent>, PlatformError> {
        let polls = {
            let mut record = self.lock();
            record.polls += 1;
            record.polls
        };

        let mut events = self.script.pop_front().unwrap_or_default();
        for event in &events {
            if let PlatformEvent::Resized { width, height } = event {
                self.size = (*width, *height);
            }
        }
        if self.close_after == Some(polls) {
            events.push(PlatformEvent::CloseRequested);
        }
        Ok(events)
    }

    fn framebuffer_size(&self) -> (u32, u32) {
        self.size
    }

    fn present(&mut self, frame: &Frame, clear_color: Color) -> Result<(), PlatformError> {
        let mut record = self.lock();
        record.frames_presented += 1;
        record.last_frame = Some(frame.clone());
        record.clear_colors.push(clear_color);
        Ok(())
    }

    fn shutdown(&mut self) {
        self.lock().shutdowns += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_events_then_close() {
        let mut platform = HeadlessPlatform::new(640, 480)
            .with_frame_events(vec![PlatformEvent::PointerMoved { x: 1.0, y: 2.0 }])
            .close_after(2);

        assert_eq!(
            platform.poll_events().unwrap(),
            [PlatformEvent::PointerMoved { x: 1.0, y: 2.0 }]
        );
        assert_eq!(
            platform.poll_events().unwrap(),
            [PlatformEvent::CloseRequested]
        );
        assert!(platform.poll_events().unwrap().is_empty());
    }

    #[test]
    fn test_resize_updates_framebuffer() {
        let mut platform = HeadlessPlatform::new(640, 480).with_frame_events(vec![
            PlatformEvent::Resized {
                width: 800,
                height: 600,
            },
        ]);
        platform.poll_events().unwrap();
        assert_eq!(platform.framebuffer_size(), (800, 600));
    }

    #[test]
    fn test_present_is_recorded() {
        let mut platform = HeadlessPlatform::new(10, 10);
        let record = platform.record();
        platform.present(&Frame::default(), Color::BLACK).unwrap();
        platform.shutdown();

        let record = record.lock().unwrap();
        assert_eq!(record.frames_presented, 1);
        assert_eq!(record.clear_colors, [Color::BLACK]);
        assert_eq!(record.shutdowns, 1);
    }
}
