// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use tablero_app::catalog;
use tablero_app::{
    Dashboard, DashboardCollection, DashboardId, GridPlacement, RowAnchor, Widget, WidgetId,
    WidgetKind,
};

const NOTE_TOPICS: [&str; 8] = [
    "Launch checklist",
    "Standup notes",
    "Retro actions",
    "Campaign ideas",
    "Follow-ups",
    "Reading list",
    "Q3 goals",
    "Meeting notes",
];

const NOTE_LINES: [&str; 8] = [
    "review the signup funnel numbers",
    "ask design about the new empty state",
    "ship the pricing experiment",
    "compare conversion against last month",
    "draft the release announcement",
    "clean up stale dashboards",
    "check the churn cohort",
    "schedule the metrics review",
];

const KPI_METRICS: [(&str, &str, &str); 3] = [
    ("New Users", "newUsers", "Last 30 days"),
    ("Total Revenue", "totalRevenue", "Last 30 days"),
    ("Conversion Rate", "conversionRate", "Last 30 days"),
];

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }
}

/// Deterministic widget/dashboard builder. Ids are stable for a given
/// seed, so fixtures can be asserted against by id.
#[derive(Debug, Clone)]
pub struct BoardFaker {
    rng: DeterministicRng,
    counter: u32,
}

impl BoardFaker {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: DeterministicRng::new(seed),
            counter: 0,
        }
    }

    fn next_id(&mut self) -> WidgetId {
        self.counter += 1;
        WidgetId::new(format!("demo-{:04}", self.counter))
    }

    fn pick<'a>(&mut self, values: &[&'a str]) -> &'a str {
        values[self.rng.int_n(values.len())]
    }

    /// Widget of the given kind with catalog defaults, concretely placed.
    pub fn widget(&mut self, kind: WidgetKind, x: u32, y: u32) -> Widget {
        let definition = catalog::lookup(kind);
        let id = self.next_id();
        Widget {
            id: id.clone(),
            kind,
            config: definition.default_config(),
            placement: GridPlacement {
                i: id,
                x,
                y: RowAnchor::Row(y),
                w: definition.footprint.w,
                h: definition.footprint.h,
            },
        }
    }

    pub fn notes_widget(&mut self, x: u32, y: u32) -> Widget {
        let mut widget = self.widget(WidgetKind::Notes, x, y);
        let topic = self.pick(&NOTE_TOPICS);
        let first = self.pick(&NOTE_LINES);
        let second = self.pick(&NOTE_LINES);
        widget.config.insert("title", topic);
        widget
            .config
            .insert("content", format!("# {topic}\n\n- {first}\n- {second}"));
        widget
    }

    pub fn kpi_widget(&mut self, x: u32, y: u32) -> Widget {
        let mut widget = self.widget(WidgetKind::SimpleKpi, x, y);
        let (title, metric, description) = KPI_METRICS[self.rng.int_n(KPI_METRICS.len())];
        widget.config.insert("title", title);
        widget.config.insert("metric", metric);
        widget.config.insert("description", description);
        widget
    }
}

/// Two seeded dashboards populated with every widget kind, in the same
/// shape a short editing session would leave behind.
pub fn demo_collection(seed: u64) -> DashboardCollection {
    let mut faker = BoardFaker::new(seed);

    let mut main = Dashboard::new(DashboardId::new("default"), "My Dashboard");
    main.widgets.push(faker.widget(WidgetKind::LineChart, 0, 0));
    main.widgets.push(faker.kpi_widget(6, 0));
    main.widgets.push(faker.kpi_widget(9, 0));
    main.widgets.push(faker.widget(WidgetKind::UsersTable, 0, 8));
    main.widgets.push(faker.notes_widget(8, 8));

    let mut marketing = Dashboard::new(DashboardId::new("marketing"), "Marketing");
    marketing.widgets.push(faker.kpi_widget(0, 0));
    marketing.widgets.push(faker.notes_widget(3, 0));

    DashboardCollection::new(vec![main, marketing])
}
