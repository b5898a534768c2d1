// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::model::{WidgetConfig, WidgetKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Footprint {
    pub w: u32,
    pub h: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WidgetDefinition {
    pub kind: WidgetKind,
    pub display_name: &'static str,
    pub description: &'static str,
    pub footprint: Footprint,
}

impl WidgetDefinition {
    pub fn default_config(&self) -> WidgetConfig {
        let mut config = WidgetConfig::new();
        match self.kind {
            WidgetKind::LineChart => {
                config.insert("title", "Revenue Over Time");
            }
            WidgetKind::UsersTable => {
                config.insert("title", "Users");
            }
            WidgetKind::SimpleKpi => {
                config.insert("title", "New Users");
                config.insert("metric", "newUsers");
                config.insert("description", "Last 30 days");
            }
            WidgetKind::Notes => {
                config.insert("title", "My Notes");
                config.insert("content", "# Hello World\n\nThis is a *markdown* note.");
            }
        }
        config
    }
}

pub const WIDGET_DEFINITIONS: [WidgetDefinition; 4] = [
    WidgetDefinition {
        kind: WidgetKind::LineChart,
        display_name: "Revenue Over Time",
        description: "Displays revenue trends over a selected period.",
        footprint: Footprint { w: 6, h: 8 },
    },
    WidgetDefinition {
        kind: WidgetKind::UsersTable,
        display_name: "Users Table",
        description: "A searchable and filterable table of users.",
        footprint: Footprint { w: 8, h: 9 },
    },
    WidgetDefinition {
        kind: WidgetKind::SimpleKpi,
        display_name: "Simple KPI",
        description: "A single key performance indicator.",
        footprint: Footprint { w: 3, h: 4 },
    },
    WidgetDefinition {
        kind: WidgetKind::Notes,
        display_name: "Notes",
        description: "A markdown-enabled text block for notes.",
        footprint: Footprint { w: 4, h: 6 },
    },
];

/// Total: `WidgetKind` is closed, so every kind has a definition.
pub fn lookup(kind: WidgetKind) -> &'static WidgetDefinition {
    match kind {
        WidgetKind::LineChart => &WIDGET_DEFINITIONS[0],
        WidgetKind::UsersTable => &WIDGET_DEFINITIONS[1],
        WidgetKind::SimpleKpi => &WIDGET_DEFINITIONS[2],
        WidgetKind::Notes => &WIDGET_DEFINITIONS[3],
    }
}

#[cfg(test)]
mod tests {
    use super::lookup;
    use crate::model::WidgetKind;

    #[test]
    fn lookup_returns_the_definition_for_every_kind() {
        for kind in WidgetKind::ALL {
            assert_eq!(lookup(kind).kind, kind);
        }
    }

    #[test]
    fn kpi_defaults_match_the_catalog() {
        let definition = lookup(WidgetKind::SimpleKpi);
        let config = definition.default_config();
        assert_eq!(config.title(), "New Users");
        assert_eq!(config.text("metric"), Some("newUsers"));
        assert_eq!(config.text("description"), Some("Last 30 days"));
        assert_eq!(definition.footprint.w, 3);
        assert_eq!(definition.footprint.h, 4);
    }
}
