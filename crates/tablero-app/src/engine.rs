// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::catalog;
use crate::history::History;
use crate::ids::{DashboardId, WidgetId};
use crate::model::{Dashboard, DashboardCollection, GridPlacement, Widget, WidgetConfig, WidgetKind};

fn seed_collection() -> DashboardCollection {
    DashboardCollection::new(vec![
        Dashboard::new(DashboardId::new("default"), "My Dashboard"),
        Dashboard::new(DashboardId::new("marketing"), "Marketing"),
    ])
}

/// The dashboard state engine: one immutable collection snapshot as the
/// live state, a bounded linear history over it, and the operations that
/// produce new snapshots.
///
/// Every mutating operation reads the present snapshot, computes a
/// candidate collection, and records it; recording is equality-gated, so
/// an edit that changes nothing leaves both the state and the history
/// untouched. Operations addressing a dashboard or widget id that does
/// not exist are silent no-ops.
///
/// Each operation returns whether observable state changed. Callers use
/// that to trigger persistence; a `false` return means nothing to save.
#[derive(Debug, Clone)]
pub struct DashboardEngine {
    history: History<DashboardCollection>,
    active_dashboard_id: Option<DashboardId>,
    initialized: bool,
}

impl DashboardEngine {
    pub fn new() -> Self {
        Self {
            history: History::new(DashboardCollection::default()),
            active_dashboard_id: None,
            initialized: false,
        }
    }

    pub fn dashboards(&self) -> &DashboardCollection {
        self.history.present()
    }

    pub fn active_dashboard_id(&self) -> Option<&DashboardId> {
        self.active_dashboard_id.as_ref()
    }

    pub fn active_dashboard(&self) -> Option<&Dashboard> {
        let id = self.active_dashboard_id.as_ref()?;
        self.dashboards().get(id)
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn history(&self) -> &History<DashboardCollection> {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Install the two seed dashboards and select the first. Idempotent:
    /// once the engine has been initialized (seeded or restored), further
    /// calls do nothing. Establishes the history baseline directly; there
    /// is no prior state to undo to.
    pub fn set_initial_state(&mut self) -> bool {
        if self.initialized {
            return false;
        }
        let seeds = seed_collection();
        self.active_dashboard_id = seeds.first().map(|dashboard| dashboard.id.clone());
        self.history.reset(seeds);
        self.initialized = true;
        true
    }

    /// Rehydrate from persisted state. History always starts empty; the
    /// persisted active id is kept when it still resolves, otherwise the
    /// first dashboard is selected.
    pub fn restore(
        &mut self,
        dashboards: DashboardCollection,
        active_dashboard_id: Option<DashboardId>,
    ) {
        self.active_dashboard_id = active_dashboard_id
            .filter(|id| dashboards.contains(id))
            .or_else(|| dashboards.first().map(|dashboard| dashboard.id.clone()));
        self.history.reset(dashboards);
        self.initialized = true;
    }

    /// Pure selection change; switching dashboards is navigation, not an
    /// edit, so it bypasses history entirely.
    pub fn set_active_dashboard(&mut self, id: &DashboardId) -> bool {
        if self.active_dashboard_id.as_ref() == Some(id) || !self.dashboards().contains(id) {
            return false;
        }
        self.active_dashboard_id = Some(id.clone());
        true
    }

    pub fn add_widget(&mut self, kind: WidgetKind) -> bool {
        let definition = catalog::lookup(kind);
        let config = definition.default_config();
        let footprint = definition.footprint;
        self.record_active(|dashboard| {
            dashboard
                .widgets
                .push(Widget::new(kind, config, footprint.w, footprint.h));
        })
    }

    pub fn remove_widget(&mut self, id: &WidgetId) -> bool {
        self.record_active(|dashboard| {
            dashboard.widgets.retain(|widget| &widget.id != id);
        })
    }

    pub fn duplicate_widget(&mut self, id: &WidgetId) -> bool {
        self.record_active(|dashboard| {
            if let Some(widget) = dashboard.widget(id) {
                let copy = widget.duplicate();
                dashboard.widgets.push(copy);
            }
        })
    }

    /// Replace the widget's entire config with the supplied value. Not a
    /// merge.
    pub fn update_widget_config(&mut self, id: &WidgetId, config: WidgetConfig) -> bool {
        self.record_active(|dashboard| {
            if let Some(widget) = dashboard.widget_mut(id) {
                widget.config = config;
            }
        })
    }

    /// Reconcile widget placements against a settled layout. Widgets with
    /// a matching entry take it wholesale; widgets without one keep their
    /// placement. Nothing is ever removed here. Called on every
    /// interactive layout step; the equality gate in `record` is what
    /// keeps a drag from producing an entry per step.
    pub fn update_layout(&mut self, placements: &[GridPlacement]) -> bool {
        self.record_active(|dashboard| {
            for widget in &mut dashboard.widgets {
                if let Some(placement) = placements.iter().find(|entry| entry.i == widget.id) {
                    widget.placement = placement.clone();
                }
            }
        })
    }

    pub fn undo(&mut self) -> bool {
        if !self.history.undo() {
            return false;
        }
        self.reresolve_active();
        true
    }

    pub fn redo(&mut self) -> bool {
        if !self.history.redo() {
            return false;
        }
        self.reresolve_active();
        true
    }

    fn record_active<F>(&mut self, mutate: F) -> bool
    where
        F: FnOnce(&mut Dashboard),
    {
        let Some(active_id) = self.active_dashboard_id.clone() else {
            return false;
        };
        let mut candidate = self.history.present().clone();
        let Some(dashboard) = candidate.get_mut(&active_id) else {
            return false;
        };
        mutate(dashboard);
        self.history.record(candidate)
    }

    /// A restored snapshot may not contain the selected dashboard; fall
    /// back to its first member. No deletion operation exists today, but
    /// snapshots are not obligated to contain any particular id.
    fn reresolve_active(&mut self) {
        let present = self.history.present();
        self.active_dashboard_id = self
            .active_dashboard_id
            .take()
            .filter(|id| present.contains(id))
            .or_else(|| present.first().map(|dashboard| dashboard.id.clone()));
    }
}

impl Default for DashboardEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::DashboardEngine;
    use crate::ids::{DashboardId, WidgetId};
    use crate::model::{
        Dashboard, DashboardCollection, GridPlacement, RowAnchor, WidgetConfig, WidgetKind,
    };

    fn seeded() -> DashboardEngine {
        let mut engine = DashboardEngine::new();
        engine.set_initial_state();
        engine
    }

    fn active_widget_ids(engine: &DashboardEngine) -> Vec<WidgetId> {
        engine
            .active_dashboard()
            .expect("active dashboard")
            .widgets
            .iter()
            .map(|widget| widget.id.clone())
            .collect()
    }

    fn assert_placement_identity(engine: &DashboardEngine) {
        for dashboard in engine.dashboards().iter() {
            for widget in &dashboard.widgets {
                assert_eq!(widget.placement.i, widget.id);
            }
        }
    }

    #[test]
    fn set_initial_state_is_idempotent() {
        let mut engine = DashboardEngine::new();
        assert!(engine.set_initial_state());
        let once = engine.dashboards().clone();

        assert!(!engine.set_initial_state());
        assert_eq!(engine.dashboards(), &once);
        assert_eq!(engine.dashboards().len(), 2);
        assert_eq!(
            engine.active_dashboard_id(),
            Some(&DashboardId::new("default"))
        );
        assert!(!engine.can_undo());
    }

    #[test]
    fn operations_before_initialization_are_no_ops() {
        let mut engine = DashboardEngine::new();
        assert!(!engine.add_widget(WidgetKind::Notes));
        assert!(!engine.remove_widget(&WidgetId::new("nope")));
        assert!(!engine.undo());
        assert_eq!(engine.history().past_len(), 0);
    }

    #[test]
    fn kpi_widget_scenario_through_undo_and_redo() {
        let mut engine = seeded();

        assert!(engine.add_widget(WidgetKind::SimpleKpi));
        let dashboard = engine.active_dashboard().expect("active dashboard");
        assert_eq!(dashboard.widgets.len(), 1);
        let widget = &dashboard.widgets[0];
        assert_eq!(widget.kind, WidgetKind::SimpleKpi);
        assert_eq!(widget.config.title(), "New Users");
        assert_eq!(widget.config.text("metric"), Some("newUsers"));
        assert_eq!(widget.config.text("description"), Some("Last 30 days"));
        assert_eq!(widget.placement.w, 3);
        assert_eq!(widget.placement.h, 4);
        assert_eq!(engine.history().past_len(), 1);

        assert!(engine.undo());
        assert_eq!(
            engine.active_dashboard().expect("active").widgets.len(),
            0
        );
        assert_eq!(engine.history().past_len(), 0);
        assert_eq!(engine.history().future_len(), 1);

        assert!(engine.redo());
        assert_eq!(
            engine.active_dashboard().expect("active").widgets.len(),
            1
        );
        assert_eq!(engine.history().future_len(), 0);
        assert_placement_identity(&engine);
    }

    #[test]
    fn removing_the_first_of_two_notes_keeps_the_second() {
        let mut engine = seeded();
        engine.add_widget(WidgetKind::Notes);
        engine.add_widget(WidgetKind::Notes);

        let ids = active_widget_ids(&engine);
        assert_eq!(ids.len(), 2);
        assert!(engine.remove_widget(&ids[0]));

        let dashboard = engine.active_dashboard().expect("active dashboard");
        assert_eq!(dashboard.widgets.len(), 1);
        assert_eq!(dashboard.widgets[0].id, ids[1]);
        assert_eq!(dashboard.widgets[0].config.title(), "My Notes");
        assert_eq!(
            dashboard.widgets[0].config.text("content"),
            Some("# Hello World\n\nThis is a *markdown* note.")
        );
    }

    #[test]
    fn undo_restores_the_state_before_each_operation() {
        let mut engine = seeded();
        engine.add_widget(WidgetKind::LineChart);
        let before = engine.dashboards().clone();

        let ids = active_widget_ids(&engine);
        engine.duplicate_widget(&ids[0]);
        assert_ne!(engine.dashboards(), &before);

        assert!(engine.undo());
        assert_eq!(engine.dashboards(), &before);

        assert!(engine.redo());
        assert_eq!(engine.active_dashboard().expect("active").widgets.len(), 2);
    }

    #[test]
    fn fifteen_mutations_leave_ten_past_entries() {
        let mut engine = seeded();
        for _ in 0..15 {
            assert!(engine.add_widget(WidgetKind::Notes));
        }
        assert_eq!(engine.history().past_len(), 10);

        // Only the ten most recent prior states are reachable.
        let mut undos = 0;
        while engine.undo() {
            undos += 1;
        }
        assert_eq!(undos, 10);
        assert_eq!(engine.active_dashboard().expect("active").widgets.len(), 5);
    }

    #[test]
    fn a_real_mutation_after_undo_invalidates_redo() {
        let mut engine = seeded();
        engine.add_widget(WidgetKind::Notes);
        engine.add_widget(WidgetKind::SimpleKpi);
        engine.undo();
        assert!(engine.can_redo());

        assert!(engine.add_widget(WidgetKind::LineChart));
        assert!(!engine.can_redo());
        assert!(!engine.redo());
    }

    #[test]
    fn noop_edits_never_touch_present_or_history() {
        let mut engine = seeded();
        engine.add_widget(WidgetKind::Notes);
        let before = engine.dashboards().clone();
        let past_before = engine.history().past_len();

        assert!(!engine.remove_widget(&WidgetId::new("no-such-widget")));
        assert!(!engine.update_layout(&[]));
        assert!(!engine.duplicate_widget(&WidgetId::new("no-such-widget")));
        assert!(!engine.update_widget_config(&WidgetId::new("no-such-widget"), WidgetConfig::new()));

        assert_eq!(engine.dashboards(), &before);
        assert_eq!(engine.history().past_len(), past_before);
    }

    #[test]
    fn duplicated_widget_config_is_independent_of_the_original() {
        let mut engine = seeded();
        engine.add_widget(WidgetKind::Notes);
        let original_id = active_widget_ids(&engine)[0].clone();
        engine.duplicate_widget(&original_id);
        let copy_id = active_widget_ids(&engine)[1].clone();
        assert_ne!(original_id, copy_id);

        let mut renamed = WidgetConfig::new();
        renamed.insert("title", "Renamed");
        assert!(engine.update_widget_config(&original_id, renamed));

        let dashboard = engine.active_dashboard().expect("active dashboard");
        assert_eq!(
            dashboard.widget(&original_id).expect("original").config.title(),
            "Renamed"
        );
        assert_eq!(
            dashboard.widget(&copy_id).expect("copy").config.title(),
            "My Notes"
        );

        let mut reversed = WidgetConfig::new();
        reversed.insert("title", "Copy Renamed");
        assert!(engine.update_widget_config(&copy_id, reversed));
        let dashboard = engine.active_dashboard().expect("active dashboard");
        assert_eq!(
            dashboard.widget(&original_id).expect("original").config.title(),
            "Renamed"
        );
    }

    #[test]
    fn update_layout_reconciles_only_matching_entries() {
        let mut engine = seeded();
        engine.add_widget(WidgetKind::SimpleKpi);
        engine.add_widget(WidgetKind::Notes);
        let ids = active_widget_ids(&engine);

        let moved = GridPlacement {
            i: ids[0].clone(),
            x: 6,
            y: RowAnchor::Row(2),
            w: 4,
            h: 5,
        };
        let stranger = GridPlacement {
            i: WidgetId::new("not-a-widget"),
            x: 0,
            y: RowAnchor::Row(0),
            w: 1,
            h: 1,
        };
        assert!(engine.update_layout(&[moved.clone(), stranger]));

        let dashboard = engine.active_dashboard().expect("active dashboard");
        assert_eq!(dashboard.widgets.len(), 2, "layout never removes widgets");
        assert_eq!(dashboard.widget(&ids[0]).expect("moved").placement, moved);
        assert_eq!(
            dashboard.widget(&ids[1]).expect("untouched").placement.y,
            RowAnchor::Append
        );
        assert_placement_identity(&engine);

        // Re-applying the settled layout is a true no-op.
        let settled: Vec<GridPlacement> = dashboard.resolved_placements();
        let past_before = engine.history().past_len();
        engine.update_layout(&settled);
        let past_after_first = engine.history().past_len();
        assert!(!engine.update_layout(&settled));
        assert_eq!(engine.history().past_len(), past_after_first);
        assert!(past_after_first >= past_before);
    }

    #[test]
    fn switching_dashboards_bypasses_history() {
        let mut engine = seeded();
        let marketing = DashboardId::new("marketing");

        assert!(engine.set_active_dashboard(&marketing));
        assert_eq!(engine.active_dashboard_id(), Some(&marketing));
        assert_eq!(engine.history().past_len(), 0);

        assert!(!engine.set_active_dashboard(&marketing));
        assert!(!engine.set_active_dashboard(&DashboardId::new("missing")));
        assert_eq!(engine.active_dashboard_id(), Some(&marketing));
    }

    #[test]
    fn mutations_follow_the_active_dashboard() {
        let mut engine = seeded();
        engine.set_active_dashboard(&DashboardId::new("marketing"));
        engine.add_widget(WidgetKind::Notes);

        let default = engine
            .dashboards()
            .get(&DashboardId::new("default"))
            .expect("default dashboard");
        let marketing = engine
            .dashboards()
            .get(&DashboardId::new("marketing"))
            .expect("marketing dashboard");
        assert_eq!(default.widgets.len(), 0);
        assert_eq!(marketing.widgets.len(), 1);
    }

    #[test]
    fn undo_and_redo_keep_the_selection_when_it_still_resolves() {
        let mut engine = seeded();
        let marketing = DashboardId::new("marketing");
        engine.set_active_dashboard(&marketing);
        engine.add_widget(WidgetKind::Notes);

        engine.undo();
        assert_eq!(engine.active_dashboard_id(), Some(&marketing));
        engine.redo();
        assert_eq!(engine.active_dashboard_id(), Some(&marketing));
    }

    #[test]
    fn restore_keeps_a_resolvable_active_id_and_starts_history_empty() {
        let mut engine = DashboardEngine::new();
        let collection = DashboardCollection::new(vec![
            Dashboard::new(DashboardId::new("a"), "A"),
            Dashboard::new(DashboardId::new("b"), "B"),
        ]);

        engine.restore(collection.clone(), Some(DashboardId::new("b")));
        assert!(engine.is_initialized());
        assert_eq!(engine.active_dashboard_id(), Some(&DashboardId::new("b")));
        assert!(!engine.can_undo());
        assert!(!engine.can_redo());

        engine.restore(collection, Some(DashboardId::new("gone")));
        assert_eq!(engine.active_dashboard_id(), Some(&DashboardId::new("a")));
    }
}
