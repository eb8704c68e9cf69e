//! In-memory producers for pipeline tests.

use std::sync::Mutex;

use svk_records::{ProduceRequest, Producer, ProducerError, RecordSet};

/// Serves a fixed record set, restricted to the requested window.
#[derive(Debug, Clone)]
pub struct StaticProducer {
    set: RecordSet,
}

impl StaticProducer {
    pub fn new(set: RecordSet) -> Self {
        Self { set }
    }

    /// A producer that always answers "no new data".
    pub fn empty() -> Self {
        Self::new(RecordSet::empty())
    }
}

impl Producer for StaticProducer {
    fn name(&self) -> &'static str {
        "static"
    }

    fn produce(&self, req: &ProduceRequest) -> Result<RecordSet, ProducerError> {
        match req.end() {
            Some(end) => Ok(self.set.filter_dates(req.start, end)),
            None => Ok(RecordSet::empty()),
        }
    }
}

/// Fails every request with the given error.
#[derive(Debug, Clone)]
pub struct FailingProducer {
    err: ProducerError,
}

impl FailingProducer {
    pub fn new(err: ProducerError) -> Self {
        Self { err }
    }

    pub fn unavailable() -> Self {
        Self::new(ProducerError::Unavailable("upstream down".to_string()))
    }
}

impl Producer for FailingProducer {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn produce(&self, _req: &ProduceRequest) -> Result<RecordSet, ProducerError> {
        Err(self.err.clone())
    }
}

/// Wraps a [`StaticProducer`], remembers every request, and optionally fails
/// on specific start dates.
#[derive(Debug)]
pub struct RecordingProducer {
    inner: StaticProducer,
    fail_on: Vec<chrono::NaiveDate>,
    requests: Mutex<Vec<ProduceRequest>>,
}

impl RecordingProducer {
    pub fn new(set: RecordSet) -> Self {
        Self {
            inner: StaticProducer::new(set),
            fail_on: Vec::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests starting on `day` fail with [`ProducerError::Rejected`].
    pub fn failing_on(mut self, day: chrono::NaiveDate) -> Self {
        self.fail_on.push(day);
        self
    }

    /// Requests seen so far, in call order.
    pub fn requests(&self) -> Vec<ProduceRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

impl Producer for RecordingProducer {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn produce(&self, req: &ProduceRequest) -> Result<RecordSet, ProducerError> {
        match self.requests.lock() {
            Ok(mut r) => r.push(*req),
            Err(poisoned) => poisoned.into_inner().push(*req),
        }
        if self.fail_on.contains(&req.start) {
            return Err(ProducerError::Rejected(format!("no data for {}", req.start)));
        }
        self.inner.produce(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{date, hourly_days};

    #[test]
    fn static_producer_filters_to_window() {
        let p = StaticProducer::new(hourly_days(date(2024, 1, 1), 5));
        let out = p.produce(&ProduceRequest::new(date(2024, 1, 2), 2)).unwrap();
        assert_eq!(out.len(), 48);
    }

    #[test]
    fn recording_producer_logs_and_fails_selectively() {
        let p = RecordingProducer::new(hourly_days(date(2024, 1, 1), 3)).failing_on(date(2024, 1, 2));
        assert!(p.produce(&ProduceRequest::single_day(date(2024, 1, 1))).is_ok());
        assert!(p.produce(&ProduceRequest::single_day(date(2024, 1, 2))).is_err());
        assert_eq!(p.requests().len(), 2);
    }
}
