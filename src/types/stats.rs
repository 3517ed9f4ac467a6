//! Period-level summary statistics

use serde::{Serialize, Serializer};

/// Round to one decimal place (half away from zero)
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Serialize a float total rounded to one decimal
fn serialize_round1<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(round1(*value))
}

/// Summary over the worked days of a period. Recomputed on demand.
///
/// Totals are kept unrounded in memory and rounded to one decimal when
/// serialized; averages are already rounded.
#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct MonthlyStats {
    pub working_days: u32,
    #[serde(serialize_with = "serialize_round1")]
    pub total_distance_km: f64,
    pub total_deliveries: u64,
    /// Yen
    pub total_highway_fee: u64,
    #[serde(serialize_with = "serialize_round1")]
    pub total_work_hours: f64,
    pub average_distance_km: f64,
    pub average_deliveries: f64,
    pub average_work_hours: f64,
}

impl MonthlyStats {
    /// Fill in the averages from the totals. Zero working days leaves them at 0.
    pub fn with_averages(mut self) -> Self {
        if self.working_days == 0 {
            self.average_distance_km = 0.0;
            self.average_deliveries = 0.0;
            self.average_work_hours = 0.0;
            return self;
        }

        let days = f64::from(self.working_days);
        self.average_distance_km = round1(self.total_distance_km / days);
        self.average_deliveries = round1(self.total_deliveries as f64 / days);
        self.average_work_hours = round1(self.total_work_hours / days);
        self
    }
}
