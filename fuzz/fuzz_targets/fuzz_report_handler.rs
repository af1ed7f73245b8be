//! Fuzz target: `HidEngine::handle_report`
//!
//! Slices arbitrary bytes into 64-byte reports and drives them through
//! the engine with an advancing clock, asserting that no input sequence
//! panics and that every reply stays within protocol bounds (error
//! replies are exactly one byte, payloads never exceed the message
//! limit).
//!
//! cargo fuzz run fuzz_report_handler

#![no_main]

use authfob::app::ports::{AppError, CommandPort};
use authfob::config::TokenConfig;
use authfob::hid::{HidEngine, MAX_MSG_LEN, REPORT_SIZE, Report};
use libfuzzer_sys::fuzz_target;

struct NoApp;

impl CommandPort for NoApp {
    fn handle(
        &mut self,
        _channel: u32,
        _command: u8,
        _payload: &[u8],
    ) -> Result<heapless::Vec<u8, MAX_MSG_LEN>, AppError> {
        Err(AppError::Unsupported)
    }

    fn wink(&mut self, _channel: u32) {}
}

fuzz_target!(|data: &[u8]| {
    let mut engine = HidEngine::new(TokenConfig::default(), 0xF0B);
    let mut app = NoApp;
    let mut now = 0u64;

    for chunk in data.chunks(REPORT_SIZE) {
        let mut report: Report = [0; REPORT_SIZE];
        report[..chunk.len()].copy_from_slice(chunk);

        if let Some(reply) = engine.handle_report(now, &report, &mut app) {
            assert!(reply.payload.len() <= MAX_MSG_LEN);
            if reply.is_error() {
                assert_eq!(reply.payload.len(), 1);
            }
            // Every reply must fragment into at least one report.
            assert!(reply.reports().next().is_some());
        }

        now += 50;
        let _ = engine.poll(now);
    }
});
