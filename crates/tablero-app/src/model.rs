// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::ids::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WidgetKind {
    LineChart,
    UsersTable,
    SimpleKpi,
    Notes,
}

impl WidgetKind {
    pub const ALL: [Self; 4] = [
        Self::LineChart,
        Self::UsersTable,
        Self::SimpleKpi,
        Self::Notes,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LineChart => "line_chart",
            Self::UsersTable => "users_table",
            Self::SimpleKpi => "simple_kpi",
            Self::Notes => "notes",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "line_chart" => Some(Self::LineChart),
            "users_table" => Some(Self::UsersTable),
            "simple_kpi" => Some(Self::SimpleKpi),
            "notes" => Some(Self::Notes),
            _ => None,
        }
    }
}

/// Session capability supplied by the caller. The engine itself never
/// checks this; key routing in the front end is the only gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Editor,
    Viewer,
}

impl Role {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Editor => "editor",
            Self::Viewer => "viewer",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "editor" => Some(Self::Editor),
            "viewer" => Some(Self::Viewer),
            _ => None,
        }
    }

    pub const fn is_editor(self) -> bool {
        matches!(self, Self::Editor)
    }
}

impl Default for Role {
    fn default() -> Self {
        Self::Viewer
    }
}

/// Open key/value configuration. Always carries at least `title`;
/// kind-specific keys (`metric`, `description`, `content`) are free-form
/// and never validated here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WidgetConfig(BTreeMap<String, Value>);

impl WidgetConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn title(&self) -> &str {
        self.text("title").unwrap_or("")
    }
}

/// Vertical anchor of a placement. `Append` marks a widget that has not
/// been through layout reconciliation yet and must land below every
/// concretely placed widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowAnchor {
    Row(u32),
    Append,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridPlacement {
    /// Identity of the owning widget. Must always equal `Widget::id`.
    pub i: WidgetId,
    pub x: u32,
    pub y: RowAnchor,
    pub w: u32,
    pub h: u32,
}

impl GridPlacement {
    pub fn at_bottom(i: WidgetId, w: u32, h: u32) -> Self {
        Self {
            i,
            x: 0,
            y: RowAnchor::Append,
            w,
            h,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Widget {
    pub id: WidgetId,
    pub kind: WidgetKind,
    pub config: WidgetConfig,
    pub placement: GridPlacement,
}

impl Widget {
    pub fn new(kind: WidgetKind, config: WidgetConfig, w: u32, h: u32) -> Self {
        let id = WidgetId::generate();
        let placement = GridPlacement::at_bottom(id.clone(), w, h);
        Self {
            id,
            kind,
            config,
            placement,
        }
    }

    /// Independent deep copy with a fresh id, anchored below everything.
    pub fn duplicate(&self) -> Self {
        let id = WidgetId::generate();
        Self {
            id: id.clone(),
            kind: self.kind,
            config: self.config.clone(),
            placement: GridPlacement {
                i: id,
                y: RowAnchor::Append,
                ..self.placement.clone()
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub id: DashboardId,
    pub name: String,
    pub widgets: Vec<Widget>,
}

impl Dashboard {
    pub fn new(id: DashboardId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            widgets: Vec::new(),
        }
    }

    pub fn widget(&self, id: &WidgetId) -> Option<&Widget> {
        self.widgets.iter().find(|widget| &widget.id == id)
    }

    pub fn widget_mut(&mut self, id: &WidgetId) -> Option<&mut Widget> {
        self.widgets.iter_mut().find(|widget| &widget.id == id)
    }

    /// Placements with every `Append` anchor resolved to a concrete row:
    /// appended widgets land below the lowest placed widget, stacking in
    /// sequence order when several are pending.
    pub fn resolved_placements(&self) -> Vec<GridPlacement> {
        let mut bottom = self
            .widgets
            .iter()
            .filter_map(|widget| match widget.placement.y {
                RowAnchor::Row(y) => Some(y + widget.placement.h),
                RowAnchor::Append => None,
            })
            .max()
            .unwrap_or(0);

        self.widgets
            .iter()
            .map(|widget| {
                let mut placement = widget.placement.clone();
                if placement.y == RowAnchor::Append {
                    placement.y = RowAnchor::Row(bottom);
                    bottom += placement.h;
                }
                placement
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DashboardCollection(Vec<Dashboard>);

impl DashboardCollection {
    pub fn new(dashboards: Vec<Dashboard>) -> Self {
        Self(dashboards)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Dashboard> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> Option<&Dashboard> {
        self.0.first()
    }

    pub fn get(&self, id: &DashboardId) -> Option<&Dashboard> {
        self.0.iter().find(|dashboard| &dashboard.id == id)
    }

    pub fn get_mut(&mut self, id: &DashboardId) -> Option<&mut Dashboard> {
        self.0.iter_mut().find(|dashboard| &dashboard.id == id)
    }

    pub fn contains(&self, id: &DashboardId) -> bool {
        self.get(id).is_some()
    }
}
