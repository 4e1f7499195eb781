//! Shared models and helpers for the integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::OnceLock;

use autostate_core::{
    self_describing, structured_state, Command, PolicyAnnotation, Rejected, ScopeId,
    SelfDescribing, StateModel, TypeDescriptor,
};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// Routes engine logs to the test output. Set `RUST_LOG=debug` to see them.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A self-describing point, flattened as `x|y|z`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Point {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

impl SelfDescribing for Point {
    fn serialize_state(&self) -> String {
        format!("{}|{}|{}", self.x, self.y, self.z)
    }

    fn restore_state(&mut self, text: &str) -> Result<(), Rejected> {
        let parts: Vec<&str> = text.split('|').collect();
        let [x, y, z] = parts.as_slice() else {
            return Err(Rejected::new(format!("expected x|y|z, got {:?}", text)));
        };
        let coord = |s: &str| s.parse::<i32>().map_err(|_| Rejected::new("bad coordinate"));
        self.x = coord(*x)?;
        self.y = coord(*y)?;
        self.z = coord(*z)?;
        Ok(())
    }
}

self_describing!(Point);

/// A custom value stored natively as structured data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowLayout {
    pub width: u32,
    pub height: u32,
    pub maximized: bool,
}

structured_state!(WindowLayout);

#[derive(Debug, Default)]
pub struct MainViewModel {
    pub title: String,
    pub count: i32,
    pub ratio: f64,
    pub weight: f32,
    pub enabled: bool,
    pub initial: char,
    pub small: i16,
    pub big: i64,
    pub opened_at: Option<DateTime<Utc>>,
    pub tags: Vec<String>,
    pub scores: Vec<i32>,
    pub levels: Vec<f32>,
    pub offsets: Vec<i16>,
    pub flags: Vec<bool>,
    pub position: Option<Point>,
    pub route: Vec<Point>,
    pub layout: Option<WindowLayout>,
    pub subtitle: Option<String>,
    pub nickname: Option<String>,
    pub grid: [i32; 3],
    pub lookup: BTreeMap<String, i32>,
    pub refresh: Command,
    pub scratch: String,
    pub theme: String,
}

impl StateModel for MainViewModel {
    fn descriptor() -> &'static TypeDescriptor<Self> {
        static DESCRIPTOR: OnceLock<TypeDescriptor<MainViewModel>> = OnceLock::new();
        DESCRIPTOR.get_or_init(|| {
            TypeDescriptor::builder("MainViewModel")
                .field("Title", |m: &MainViewModel| &m.title, |m| &mut m.title)
                .state(PolicyAnnotation::new())
                .field("Count", |m: &MainViewModel| &m.count, |m| &mut m.count)
                .state(PolicyAnnotation::new().with_default(-1))
                .field("Ratio", |m: &MainViewModel| &m.ratio, |m| &mut m.ratio)
                .state(PolicyAnnotation::new())
                .field("Weight", |m: &MainViewModel| &m.weight, |m| &mut m.weight)
                .state(PolicyAnnotation::new())
                .field("Enabled", |m: &MainViewModel| &m.enabled, |m| &mut m.enabled)
                .state(PolicyAnnotation::new())
                .field("Initial", |m: &MainViewModel| &m.initial, |m| &mut m.initial)
                .state(PolicyAnnotation::new())
                .field("Small", |m: &MainViewModel| &m.small, |m| &mut m.small)
                .state(PolicyAnnotation::new())
                .field("Big", |m: &MainViewModel| &m.big, |m| &mut m.big)
                .state(PolicyAnnotation::new())
                .field("OpenedAt", |m: &MainViewModel| &m.opened_at, |m| &mut m.opened_at)
                .state(PolicyAnnotation::new())
                .field("Tags", |m: &MainViewModel| &m.tags, |m| &mut m.tags)
                .state(PolicyAnnotation::new())
                .field("Scores", |m: &MainViewModel| &m.scores, |m| &mut m.scores)
                .state(PolicyAnnotation::new())
                .field("Levels", |m: &MainViewModel| &m.levels, |m| &mut m.levels)
                .state(PolicyAnnotation::new())
                .field("Offsets", |m: &MainViewModel| &m.offsets, |m| &mut m.offsets)
                .state(PolicyAnnotation::new())
                .field("Flags", |m: &MainViewModel| &m.flags, |m| &mut m.flags)
                .state(PolicyAnnotation::new())
                .field("Position", |m: &MainViewModel| &m.position, |m| &mut m.position)
                .state(PolicyAnnotation::new())
                .field("Route", |m: &MainViewModel| &m.route, |m| &mut m.route)
                .state(PolicyAnnotation::new())
                .field("Layout", |m: &MainViewModel| &m.layout, |m| &mut m.layout)
                .state(PolicyAnnotation::new())
                .field("Subtitle", |m: &MainViewModel| &m.subtitle, |m| &mut m.subtitle)
                .state(PolicyAnnotation::new().save_nulls().restore_nulls())
                .field("Nickname", |m: &MainViewModel| &m.nickname, |m| &mut m.nickname)
                .state(PolicyAnnotation::new().with_default("guest"))
                .field("Grid", |m: &MainViewModel| &m.grid, |m| &mut m.grid)
                .state(PolicyAnnotation::new())
                .field("Lookup", |m: &MainViewModel| &m.lookup, |m| &mut m.lookup)
                .state(PolicyAnnotation::new())
                .field("Refresh", |m: &MainViewModel| &m.refresh, |m| &mut m.refresh)
                .state(PolicyAnnotation::new())
                .field("Scratch", |m: &MainViewModel| &m.scratch, |m| &mut m.scratch)
                .state(PolicyAnnotation::new())
                .no_action()
                .field("Theme", |m: &MainViewModel| &m.theme, |m| &mut m.theme)
                .setting(PolicyAnnotation::new().with_default("light"))
                .build()
                .expect("MainViewModel descriptor")
        })
    }
}

/// A fully populated model.
pub fn sample() -> MainViewModel {
    MainViewModel {
        title: "Inbox".to_string(),
        count: 42,
        ratio: 0.25,
        weight: 1.5,
        enabled: true,
        initial: 'q',
        small: -7,
        big: 9_000_000_000,
        opened_at: Some(
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0)
                .single()
                .expect("valid timestamp"),
        ),
        tags: vec!["a".to_string(), "b".to_string(), "c".to_string()],
        scores: vec![1, 2, 3],
        levels: vec![0.5, -2.25],
        offsets: vec![-3, 0, 12],
        flags: vec![true, false, true],
        position: Some(Point::new(1, 2, 3)),
        route: vec![Point::new(1, 2, 3), Point::new(4, 5, 6)],
        layout: Some(WindowLayout {
            width: 1280,
            height: 720,
            maximized: false,
        }),
        subtitle: Some("unread".to_string()),
        nickname: Some("ada".to_string()),
        grid: [7, 8, 9],
        lookup: [("a".to_string(), 1), ("b".to_string(), 2)].into(),
        refresh: Command::new(|| {}),
        scratch: "draft".to_string(),
        theme: "dark".to_string(),
    }
}

pub fn main_scope() -> ScopeId {
    ScopeId::for_name("MainViewModel").expect("valid scope")
}

/// A small model with a second scope, used to share a store.
#[derive(Debug, Default)]
pub struct DetailViewModel {
    pub selected: i32,
    pub ids: Vec<i64>,
}

impl StateModel for DetailViewModel {
    fn descriptor() -> &'static TypeDescriptor<Self> {
        static DESCRIPTOR: OnceLock<TypeDescriptor<DetailViewModel>> = OnceLock::new();
        DESCRIPTOR.get_or_init(|| {
            TypeDescriptor::builder("DetailViewModel")
                .field("Selected", |m: &DetailViewModel| &m.selected, |m| &mut m.selected)
                .state(PolicyAnnotation::new().with_default(0))
                .field("Ids", |m: &DetailViewModel| &m.ids, |m| &mut m.ids)
                .state(PolicyAnnotation::new())
                .build()
                .expect("DetailViewModel descriptor")
        })
    }
}
