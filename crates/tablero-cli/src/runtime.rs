// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use tablero_app::DashboardEngine;
use tablero_data::{DataService, KpiValue, RevenuePoint, UserRow};
use tablero_db::{PersistedState, Store};

/// Wires the TUI to the store and the simulated metric service.
pub struct ServiceRuntime<'a> {
    store: &'a Store,
    service: DataService,
}

impl<'a> ServiceRuntime<'a> {
    pub fn new(store: &'a Store, service: DataService) -> Self {
        Self { store, service }
    }
}

impl tablero_tui::AppRuntime for ServiceRuntime<'_> {
    fn persist(&mut self, engine: &DashboardEngine) -> Result<()> {
        self.store.save_state(&PersistedState {
            dashboards: engine.dashboards().clone(),
            active_dashboard_id: engine.active_dashboard_id().cloned(),
        })
    }

    fn fetch_revenue(&mut self) -> Result<Vec<RevenuePoint>> {
        self.service.revenue_series()
    }

    fn fetch_users(&mut self) -> Result<Vec<UserRow>> {
        self.service.user_rows()
    }

    fn fetch_kpi(&mut self, metric: &str) -> Result<Option<KpiValue>> {
        self.service.kpi_value(metric)
    }
}
