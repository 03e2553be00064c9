//! Scripted transport for unit tests.

use crate::device::Transport;
use crate::error::{Error, Result};
use std::cell::RefCell;
use std::collections::VecDeque;

#[derive(Debug, Default)]
pub(crate) struct MockTransport {
    responses: RefCell<VecDeque<Result<Vec<u8>>>>,
    sent: RefCell<Vec<Vec<u8>>>,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn reply(&self, bytes: &[u8]) -> &Self {
        self.responses.borrow_mut().push_back(Ok(bytes.to_vec()));
        self
    }

    pub(crate) fn fail(&self, err: Error) -> &Self {
        self.responses.borrow_mut().push_back(Err(err));
        self
    }

    pub(crate) fn sent(&self) -> Vec<Vec<u8>> {
        self.sent.borrow().clone()
    }
}

impl Transport for MockTransport {
    fn send_report(&self, report: &[u8]) -> Result<Vec<u8>> {
        self.sent.borrow_mut().push(report.to_vec());
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or(Err(Error::Timeout { opcode: report[0] }))
    }
}
