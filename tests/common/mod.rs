//! Scripted transport shared by the integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use u2if_hid::{Error, Result, Transport, STATUS_NOK, STATUS_OK};

/// Replays canned responses in order and records every command sent.
#[derive(Debug, Default)]
pub struct ScriptedDevice {
    responses: RefCell<VecDeque<Result<Vec<u8>>>>,
    sent: RefCell<Vec<Vec<u8>>>,
}

impl ScriptedDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(&self, bytes: Vec<u8>) -> &Self {
        self.responses.borrow_mut().push_back(Ok(bytes));
        self
    }

    pub fn ok(&self, opcode: u8, pin: u8, payload: &[u8]) -> &Self {
        let mut bytes = vec![opcode, STATUS_OK, pin];
        bytes.extend_from_slice(payload);
        self.reply(bytes)
    }

    pub fn nok(&self, opcode: u8, pin: u8, code: u8) -> &Self {
        self.reply(vec![opcode, STATUS_NOK, pin, code])
    }

    pub fn fail(&self, err: Error) -> &Self {
        self.responses.borrow_mut().push_back(Err(err));
        self
    }

    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.sent.borrow().clone()
    }

    pub fn pending(&self) -> usize {
        self.responses.borrow().len()
    }
}

impl Transport for ScriptedDevice {
    fn send_report(&self, report: &[u8]) -> Result<Vec<u8>> {
        self.sent.borrow_mut().push(report.to_vec());
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or(Err(Error::Timeout { opcode: report[0] }))
    }
}

/// 125 MHz as sent by the firmware.
pub const SYS_CLK_125MHZ: [u8; 4] = [0x00, 0x9E, 0x7A, 0x07];

pub fn counts(high: u32, low: u32) -> Vec<u8> {
    let mut payload = high.to_le_bytes().to_vec();
    payload.extend_from_slice(&low.to_le_bytes());
    payload
}
