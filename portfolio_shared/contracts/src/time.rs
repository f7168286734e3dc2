use chrono::{DateTime, Utc};

#[cfg_attr(feature = "mock", mockall::automock)]
pub trait TimeService: Send + Sync + 'static {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;
}

#[cfg(feature = "mock")]
impl MockTimeService {
    pub fn with_now(mut self, time: DateTime<Utc>) -> Self {
        self.expect_now().once().return_const(time);
        self
    }

    /// Expects one call per entry of `times`, returning them in order.
    pub fn with_sequence(mut self, times: impl IntoIterator<Item = DateTime<Utc>>) -> Self {
        let mut seq = mockall::Sequence::new();
        for time in times {
            self.expect_now()
                .once()
                .in_sequence(&mut seq)
                .return_const(time);
        }
        self
    }
}
