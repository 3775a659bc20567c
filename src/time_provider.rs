
use chrono::{DateTime, Local, NaiveDate, Utc};

#[cfg(test)]
use mockall::automock;

#[cfg_attr(test, automock)]
pub trait TimeProvider : Send + Sync {
    ///
    /// The local date the run started on. Used for naming and for retention.
    ///
    fn today(&self) -> NaiveDate;
    fn utc_now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

pub struct CoreTimeProvider { start: NaiveDate }
impl CoreTimeProvider {
    pub fn new() -> Self {
        Self { start: Local::now().date_naive() }
    }
}
impl TimeProvider for CoreTimeProvider {
    fn today(&self) -> NaiveDate {
        self.start
    }
}
