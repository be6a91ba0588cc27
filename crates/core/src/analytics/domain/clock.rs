/// Seconds on some fixed epoch.
pub type Timestamp = f64;

/// Domain interface for the time source stamped onto observations.
///
/// Observations are timed when they are ingested, not when the frame was
/// captured, so a producer that drops frames compresses dwell times.
pub trait Clock: Send {
    fn now(&self) -> Timestamp;
}
