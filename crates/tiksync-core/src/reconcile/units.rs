// Traffic and queue rate rescaling
//
// Raw counters arrive in bits per second. Queue limits arrive as
// "upload/download" pairs in bits per second ("1000000/2000000"), with
// burst times as "upload/download" durations ("8s/8s").

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::error::CoreError;
use crate::model::{CounterSample, Interface, Queue};
use crate::store::Collection;

/// Display unit for rates.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
pub enum RateUnit {
    #[default]
    #[serde(rename = "bps")]
    #[strum(serialize = "bps")]
    Bps,
    #[serde(rename = "Kbps")]
    #[strum(serialize = "Kbps")]
    Kbps,
    #[serde(rename = "Mbps")]
    #[strum(serialize = "Mbps")]
    Mbps,
    #[serde(rename = "B/s")]
    #[strum(serialize = "B/s")]
    BytesPerSec,
    #[serde(rename = "KB/s")]
    #[strum(serialize = "KB/s")]
    KilobytesPerSec,
    #[serde(rename = "MB/s")]
    #[strum(serialize = "MB/s")]
    MegabytesPerSec,
}

impl RateUnit {
    /// Divisor applied to a bits-per-second value. Always positive.
    pub const fn divisor(self) -> u64 {
        match self {
            Self::Bps => 1,
            Self::Kbps => 1_000,
            Self::Mbps => 1_000_000,
            Self::BytesPerSec => 8,
            Self::KilobytesPerSec => 8_000,
            Self::MegabytesPerSec => 8_000_000,
        }
    }

    /// Every accepted unit name, in declaration order.
    pub fn names() -> Vec<String> {
        Self::iter().map(|unit| unit.to_string()).collect()
    }

    /// Rescale bits per second into this unit, rounded to nearest.
    pub fn scale(self, bits_per_second: u64) -> u64 {
        let divisor = self.divisor();
        let round_up = bits_per_second % divisor >= divisor.div_ceil(2);
        bits_per_second / divisor + u64::from(round_up)
    }

    /// `"{scaled} {unit}"`, e.g. `"2 Mbps"`.
    pub fn render(self, bits_per_second: u64) -> String {
        format!("{} {self}", self.scale(bits_per_second))
    }

    /// Render a raw numeric string from a rate spec. Non-numeric parts
    /// (`"unlimited"`) pass through untouched.
    pub fn render_text(self, raw: &str) -> String {
        match raw.trim().parse::<u64>() {
            Ok(bps) => self.render(bps),
            Err(_) => raw.trim().to_owned(),
        }
    }
}

/// Split an `"upload/download"` spec into its two halves.
///
/// Any other number of parts means the record's shape changed and is an
/// error for that record.
pub fn split_rate_spec(spec: &str) -> Result<(&str, &str), CoreError> {
    let mut parts = spec.split('/');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(up), Some(down), None) => Ok((up, down)),
        _ => Err(CoreError::MalformedRateSpec {
            spec: spec.to_owned(),
        }),
    }
}

/// Split and rescale an `"upload/download"` bits-per-second spec.
pub fn convert_rate_spec(spec: &str, unit: RateUnit) -> Result<(String, String), CoreError> {
    let (up, down) = split_rate_spec(spec)?;
    Ok((unit.render_text(up), unit.render_text(down)))
}

/// Fill a queue's per-direction fields from its raw specs.
///
/// Fails on the first malformed spec; the caller holds the queue back.
pub fn convert_queue(queue: &mut Queue, unit: RateUnit) -> Result<(), CoreError> {
    (queue.upload_max_limit, queue.download_max_limit) = convert_rate_spec(&queue.max_limit, unit)?;
    (queue.upload_limit_at, queue.download_limit_at) = convert_rate_spec(&queue.limit_at, unit)?;
    (queue.upload_burst_limit, queue.download_burst_limit) =
        convert_rate_spec(&queue.burst_limit, unit)?;
    (queue.upload_burst_threshold, queue.download_burst_threshold) =
        convert_rate_spec(&queue.burst_threshold, unit)?;
    (queue.upload_rate, queue.download_rate) = convert_rate_spec(&queue.rate, unit)?;

    let (up, down) = split_rate_spec(&queue.burst_time)?;
    queue.upload_burst_time = up.to_owned();
    queue.download_burst_time = down.to_owned();
    Ok(())
}

/// Bits per second between two byte counter readings. A counter that
/// went backwards was reset and yields 0.
fn counter_rate(previous: i64, current: i64, elapsed_ms: i64) -> u64 {
    if elapsed_ms <= 0 || current < previous {
        return 0;
    }
    let delta = u64::try_from(current - previous).unwrap_or(0);
    let elapsed = u64::try_from(elapsed_ms).unwrap_or(1);
    delta.saturating_mul(8_000) / elapsed
}

/// Derive interface rates from the byte counters of this cycle and the
/// sample kept from the previous one, then store a fresh sample.
pub fn update_traffic(interfaces: &mut Collection<Interface>, unit: RateUnit, now: DateTime<Utc>) {
    for iface in interfaces.values_mut() {
        let (rx, tx) = match iface.counter_sample {
            Some(prev) => {
                let elapsed_ms = (now - prev.at).num_milliseconds();
                (
                    counter_rate(prev.rx_byte, iface.rx_byte, elapsed_ms),
                    counter_rate(prev.tx_byte, iface.tx_byte, elapsed_ms),
                )
            }
            None => (0, 0),
        };

        iface.rx_bits_per_second = i64::try_from(rx).unwrap_or(i64::MAX);
        iface.tx_bits_per_second = i64::try_from(tx).unwrap_or(i64::MAX);
        iface.rx_rate = unit.render(rx);
        iface.tx_rate = unit.render(tx);
        iface.counter_sample = Some(CounterSample {
            rx_byte: iface.rx_byte,
            tx_byte: iface.tx_byte,
            at: now,
        });
    }
}
