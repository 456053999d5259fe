#![allow(dead_code)]

use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::io;
use std::sync::Arc;
use sugar_logger::options::with_writer;
use sugar_logger::LoggerOption;

/// In-memory sink shared between a test and the loggers writing to it
#[derive(Clone, Default)]
pub struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    pub fn option(&self) -> LoggerOption {
        let writer = self.clone();
        with_writer(move || writer.clone())
    }

    pub fn text(&self) -> String {
        String::from_utf8(self.0.lock().clone()).unwrap()
    }

    pub fn lines(&self) -> Vec<String> {
        self.text().lines().map(str::to_string).collect()
    }

    pub fn records(&self) -> Vec<Map<String, Value>> {
        self.lines()
            .iter()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }
}

impl io::Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
