//! Quick-analytics catalogue
//!
//! Four fixed, hand-authored queries that each produce a single value. They
//! bypass the generator and are rendered once without being retained in
//! session state.

use querypilot_link::ResultSet;
use serde_json::Value as JsonValue;
use std::fmt;

/// How a metric's value is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// Whole number
    Count,
    /// Naira amount, thousands separators, 2 decimals
    Currency,
    /// Plain number with 2 decimals
    Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CannedMetric {
    pub key: &'static str,
    pub label: &'static str,
    pub sql: &'static str,
    pub kind: MetricKind,
}

pub const CANNED_METRICS: &[CannedMetric] = &[
    CannedMetric {
        key: "rides",
        label: "Total Rides Today",
        sql: "SELECT COUNT(*) as total_rides FROM agent.shuttler.ride_bookings WHERE DATE(ScheduledTime) = CURRENT_DATE()",
        kind: MetricKind::Count,
    },
    CannedMetric {
        key: "revenue",
        label: "Today's Revenue",
        sql: "SELECT SUM(Fare) as revenue FROM agent.shuttler.ride_bookings WHERE DATE(ScheduledTime) = CURRENT_DATE() AND Status = 'completed'",
        kind: MetricKind::Currency,
    },
    CannedMetric {
        key: "users",
        label: "Active Users (7 days)",
        sql: "SELECT COUNT(DISTINCT UserID) as active_users FROM agent.shuttler.ride_bookings WHERE DATE(ScheduledTime) >= DATE_SUB(CURRENT_DATE(), 7)",
        kind: MetricKind::Count,
    },
    CannedMetric {
        key: "rating",
        label: "Avg Rating (30 days)",
        sql: "SELECT AVG(Rating) as avg_rating FROM agent.shuttler.feedback WHERE DATE(Timestamp) >= DATE_SUB(CURRENT_DATE(), 30)",
        kind: MetricKind::Decimal,
    },
];

/// Look up a metric by key (case-insensitive)
pub fn find_metric(key: &str) -> Option<&'static CannedMetric> {
    let key = key.trim();
    CANNED_METRICS
        .iter()
        .find(|m| m.key.eq_ignore_ascii_case(key))
}

pub fn metric_keys() -> Vec<&'static str> {
    CANNED_METRICS.iter().map(|m| m.key).collect()
}

#[derive(Debug, Clone, PartialEq)]
pub enum MetricValue {
    Number(f64),
    Text(String),
    /// SQL NULL or no row at all, e.g. SUM over zero matching rows
    NoData,
}

impl MetricValue {
    /// Interpret a warehouse cell. The statement API reports numbers as
    /// strings, so numeric-looking text becomes `Number`.
    pub fn from_cell(cell: Option<&JsonValue>) -> Self {
        match cell {
            None | Some(JsonValue::Null) => MetricValue::NoData,
            Some(JsonValue::Number(n)) => n
                .as_f64()
                .map(MetricValue::Number)
                .unwrap_or_else(|| MetricValue::Text(n.to_string())),
            Some(JsonValue::String(s)) => match s.trim().parse::<f64>() {
                Ok(v) if v.is_finite() => MetricValue::Number(v),
                _ => MetricValue::Text(s.clone()),
            },
            Some(other) => MetricValue::Text(other.to_string()),
        }
    }

    pub fn render(&self, kind: MetricKind) -> String {
        match self {
            MetricValue::NoData => "No data".to_string(),
            MetricValue::Text(s) => s.clone(),
            MetricValue::Number(v) => match kind {
                MetricKind::Count => group_thousands(&format!("{:.0}", v)),
                MetricKind::Currency => format!("₦{}", group_thousands(&format!("{:.2}", v))),
                MetricKind::Decimal => format!("{:.2}", v),
            },
        }
    }
}

/// Insert `,` every three digits of the integer part of a formatted number
fn group_thousands(formatted: &str) -> String {
    let (sign, unsigned) = match formatted.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", formatted),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (idx, ch) in int_part.chars().enumerate() {
        if idx > 0 && (int_part.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(f) => format!("{}{}.{}", sign, grouped, f),
        None => format!("{}{}", sign, grouped),
    }
}

/// One rendered quick-analytics value
#[derive(Debug, Clone, PartialEq)]
pub struct MetricReading {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: MetricKind,
    pub value: MetricValue,
}

impl MetricReading {
    /// Take the first cell of the first row
    pub fn from_result(metric: &CannedMetric, result: &ResultSet) -> Self {
        Self {
            key: metric.key,
            label: metric.label,
            kind: metric.kind,
            value: MetricValue::from_cell(result.first_value()),
        }
    }

    pub fn display_value(&self) -> String {
        self.value.render(self.kind)
    }
}

impl fmt::Display for MetricReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label, self.display_value())
    }
}
