// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Simulated read-only metric service. Stands in for the backend the
//! widget renderers would normally query: every call sleeps an
//! artificial latency and fails at a configurable rate. The dashboard
//! engine never touches this crate; a widget whose data is unreachable
//! still has a valid placement and config.

use anyhow::{Result, bail};
use rand::Rng;
use std::thread;
use std::time::Duration;
use time::{Date, OffsetDateTime};

pub const DEFAULT_LATENCY: Duration = Duration::from_millis(400);
pub const DEFAULT_JITTER: Duration = Duration::from_millis(200);
pub const DEFAULT_ERROR_RATE: f64 = 0.1;

const FIRST_NAMES: [&str; 6] = ["John", "Jane", "Peter", "Susan", "Michael", "Emily"];
const LAST_NAMES: [&str; 6] = ["Smith", "Doe", "Jones", "Williams", "Brown", "Davis"];
const DOMAINS: [&str; 3] = ["example.com", "test.org", "mail.net"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserStatus {
    Active,
    Pending,
    Inactive,
}

impl UserStatus {
    pub const ALL: [Self; 3] = [Self::Active, Self::Pending, Self::Inactive];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Pending => "Pending",
            Self::Inactive => "Inactive",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevenuePoint {
    pub date: Date,
    pub revenue: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRow {
    pub id: u32,
    pub name: String,
    pub email: String,
    pub status: UserStatus,
    pub signup_date: Date,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KpiValue {
    pub value: f64,
    pub change: f64,
}

#[derive(Debug, Clone)]
pub struct DataService {
    latency: Duration,
    jitter: Duration,
    error_rate: f64,
}

impl DataService {
    pub fn new(latency: Duration, jitter: Duration, error_rate: f64) -> Self {
        Self {
            latency,
            jitter,
            error_rate: error_rate.clamp(0.0, 1.0),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_LATENCY, DEFAULT_JITTER, DEFAULT_ERROR_RATE)
    }

    /// Zero latency, zero failures. For tests and startup checks.
    pub fn instant() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO, 0.0)
    }

    /// 31 daily revenue points ending today: a random walk from 5000
    /// with a floor of 3000.
    pub fn revenue_series(&self) -> Result<Vec<RevenuePoint>> {
        self.simulate("revenue")?;

        let mut rng = rand::rng();
        let today = OffsetDateTime::now_utc().date();
        let mut value: f64 = 5000.0;
        let mut points = Vec::with_capacity(31);
        for back in (0..=30).rev() {
            value += (rng.random::<f64>() - 0.5) * 500.0;
            value = value.max(3000.0);
            points.push(RevenuePoint {
                date: today - time::Duration::days(back),
                revenue: value.round() as i64,
            });
        }
        Ok(points)
    }

    /// 50 generated user rows with signups inside the last 30 days.
    pub fn user_rows(&self) -> Result<Vec<UserRow>> {
        self.simulate("users")?;

        let mut rng = rand::rng();
        let today = OffsetDateTime::now_utc().date();
        let rows = (0..50)
            .map(|index| {
                let first = FIRST_NAMES[rng.random_range(0..FIRST_NAMES.len())];
                let last = LAST_NAMES[rng.random_range(0..LAST_NAMES.len())];
                let domain = DOMAINS[rng.random_range(0..DOMAINS.len())];
                UserRow {
                    id: index + 1,
                    name: format!("{first} {last}"),
                    email: format!(
                        "{}.{}@{domain}",
                        first.to_lowercase(),
                        last.to_lowercase()
                    ),
                    status: UserStatus::ALL[rng.random_range(0..UserStatus::ALL.len())],
                    signup_date: today - time::Duration::days(rng.random_range(0..30)),
                }
            })
            .collect();
        Ok(rows)
    }

    /// KPI snapshot keyed by metric name; `None` for a metric this
    /// service does not publish.
    pub fn kpi_value(&self, metric: &str) -> Result<Option<KpiValue>> {
        self.simulate("kpi")?;

        let value = match metric {
            "newUsers" => KpiValue {
                value: 1250.0,
                change: 12.5,
            },
            "totalRevenue" => KpiValue {
                value: 84530.0,
                change: -2.1,
            },
            "conversionRate" => KpiValue {
                value: 2.3,
                change: 0.5,
            },
            _ => return Ok(None),
        };
        Ok(Some(value))
    }

    fn simulate(&self, what: &str) -> Result<()> {
        let mut rng = rand::rng();
        let mut delay = self.latency;
        if !self.jitter.is_zero() {
            delay += self.jitter.mul_f64(rng.random::<f64>());
        }
        if !delay.is_zero() {
            thread::sleep(delay);
        }

        if self.error_rate > 0.0 && rng.random::<f64>() < self.error_rate {
            bail!("the {what} service is unavailable; refresh to retry");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{DataService, UserStatus};
    use std::time::Duration;

    #[test]
    fn revenue_series_stays_above_the_floor() {
        let service = DataService::instant();
        let points = service.revenue_series().expect("series");
        assert_eq!(points.len(), 31);
        assert!(points.iter().all(|point| point.revenue >= 3000));
        assert!(
            points.windows(2).all(|pair| pair[0].date < pair[1].date),
            "dates ascend"
        );
    }

    #[test]
    fn user_rows_are_well_formed() {
        let service = DataService::instant();
        let rows = service.user_rows().expect("rows");
        assert_eq!(rows.len(), 50);
        assert!(rows.iter().all(|row| row.email.contains('@')));
        assert!(
            rows.iter()
                .all(|row| UserStatus::ALL.contains(&row.status))
        );
    }

    #[test]
    fn kpi_lookup_distinguishes_known_and_unknown_metrics() {
        let service = DataService::instant();
        let kpi = service
            .kpi_value("newUsers")
            .expect("fetch")
            .expect("known metric");
        assert_eq!(kpi.value, 1250.0);
        assert_eq!(kpi.change, 12.5);

        assert!(service.kpi_value("bounceRate").expect("fetch").is_none());
    }

    #[test]
    fn a_full_error_rate_always_fails() {
        let service = DataService::new(Duration::ZERO, Duration::ZERO, 1.0);
        assert!(service.revenue_series().is_err());
        assert!(service.user_rows().is_err());
        assert!(service.kpi_value("newUsers").is_err());
    }
}
