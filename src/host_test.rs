#![allow(clippy::float_cmp)]

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use super::*;
use crate::input::{Modifiers, MouseEvent};
use crate::surface::{DrawParams, Recorder, Surface, SurfaceError};
use crate::tool::NullSelection;
use crate::transform::{Point, Size, Transform, ViewState};

// =============================================================
// Probes
// =============================================================

type Log = Rc<RefCell<Vec<String>>>;

struct ProbeTool {
    id: ToolId,
    log: Log,
    result: InteractionResult,
}

impl Layer for ProbeTool {
    fn draw_world(&self, _surface: &mut dyn Surface, _params: &DrawParams) -> Result<(), SurfaceError> {
        self.log.borrow_mut().push(format!("world:{}", self.id));
        Ok(())
    }
}

impl Tool for ProbeTool {
    fn id(&self) -> ToolId {
        self.id
    }

    fn activate(&mut self) {
        self.log.borrow_mut().push(format!("activate:{}", self.id));
    }

    fn deactivate(&mut self) {
        self.log.borrow_mut().push(format!("deactivate:{}", self.id));
    }

    fn on_mouse(&mut self, _event: &MouseEvent, _ctx: &mut ToolContext<'_>) -> InteractionResult {
        self.log.borrow_mut().push(format!("mouse:{}", self.id));
        self.result
    }

    fn on_key(&mut self, event: &KeyEvent, _ctx: &mut ToolContext<'_>) -> InteractionResult {
        self.log.borrow_mut().push(format!("key:{}:{}", self.id, event.key.0));
        self.result
    }
}

struct ProbeElement {
    name: &'static str,
    log: Log,
    result: InteractionResult,
}

impl Layer for ProbeElement {
    fn draw_world(&self, _surface: &mut dyn Surface, _params: &DrawParams) -> Result<(), SurfaceError> {
        self.log.borrow_mut().push(format!("world:{}", self.name));
        Ok(())
    }
}

impl UiElement for ProbeElement {
    fn name(&self) -> &'static str {
        self.name
    }

    fn on_mouse(&mut self, _event: &MouseEvent, _ctx: &mut ToolContext<'_>) -> InteractionResult {
        self.log.borrow_mut().push(format!("mouse:{}", self.name));
        self.result
    }

    fn on_key(&mut self, event: &KeyEvent, _ctx: &mut ToolContext<'_>) -> InteractionResult {
        self.log.borrow_mut().push(format!("key:{}:{}", self.name, event.key.0));
        self.result
    }
}

// =============================================================
// Helpers
// =============================================================

fn probe_tools(ids: &[ToolId], log: &Log) -> Vec<Box<dyn Tool>> {
    ids.iter()
        .map(|&id| Box::new(ProbeTool { id, log: Rc::clone(log), result: InteractionResult::IGNORED }) as Box<dyn Tool>)
        .collect()
}

fn element(name: &'static str, log: &Log, result: InteractionResult) -> Box<dyn UiElement> {
    Box::new(ProbeElement { name, log: Rc::clone(log), result })
}

/// Host with tools `[PAN(active), ZOOM, SELECT]` and no elements.
fn standard_host(log: &Log) -> ToolHost {
    let host = ToolHost::new(probe_tools(&ToolId::ALL, log), Vec::new(), &CanvasConfig::default()).unwrap();
    log.borrow_mut().clear();
    host
}

fn host_with_elements(log: &Log, elements: Vec<Box<dyn UiElement>>) -> ToolHost {
    let host = ToolHost::new(probe_tools(&ToolId::ALL, log), elements, &CanvasConfig::default()).unwrap();
    log.borrow_mut().clear();
    host
}

fn changes(host: &mut ToolHost) -> Rc<RefCell<Vec<ToolChange>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    host.tool_changed.subscribe(move |c| sink.borrow_mut().push(*c));
    seen
}

fn live_tools(host: &ToolHost) -> Vec<ToolId> {
    ToolId::ALL.into_iter().filter(|&id| host.state(id) != ToolState::Off).collect()
}

fn mouse(host: &mut ToolHost, transform: &mut Transform, event: MouseEvent) -> InteractionResult {
    let mut selection = NullSelection;
    let mut ctx = ToolContext { transform, selection: &mut selection };
    host.on_mouse(&event, &mut ctx)
}

fn key(host: &mut ToolHost, event: KeyEvent) -> InteractionResult {
    let mut transform = Transform::default();
    let mut selection = NullSelection;
    let mut ctx = ToolContext { transform: &mut transform, selection: &mut selection };
    host.on_key(&event, &mut ctx)
}

/// Log output written while a test subscriber is installed.
#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn warnings_during(f: impl FnOnce()) -> String {
    let captured = Captured::default();
    let writer = captured.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_max_level(tracing::Level::WARN)
        .with_ansi(false)
        .finish();
    tracing::subscriber::with_default(subscriber, f);
    let bytes = captured.0.lock().unwrap().clone();
    String::from_utf8_lossy(&bytes).into_owned()
}

fn move_at(x: f64, y: f64) -> MouseEvent {
    MouseEvent::new(MouseEventKind::Move, Point::new(x, y))
}

// =============================================================
// Construction
// =============================================================

#[test]
fn new_activates_initial_tool_only() {
    let log = Log::default();
    let host = ToolHost::new(probe_tools(&ToolId::ALL, &log), Vec::new(), &CanvasConfig::default()).unwrap();
    assert_eq!(*log.borrow(), vec!["activate:pan"]);
    assert_eq!(host.active_tool(), ToolId::Pan);
    assert_eq!(host.state(ToolId::Pan), ToolState::Active);
    assert_eq!(host.state(ToolId::Zoom), ToolState::Off);
    assert!(host.sprung_override().is_none());
}

#[test]
fn new_rejects_empty_roster() {
    let err = ToolHost::new(Vec::new(), Vec::new(), &CanvasConfig::default()).unwrap_err();
    assert!(matches!(err, HostError::EmptyRoster));
}

#[test]
fn new_rejects_duplicate_ids() {
    let log = Log::default();
    let tools = probe_tools(&[ToolId::Pan, ToolId::Zoom, ToolId::Pan], &log);
    let err = ToolHost::new(tools, Vec::new(), &CanvasConfig::default()).unwrap_err();
    assert!(matches!(err, HostError::DuplicateTool(ToolId::Pan)));
}

#[test]
fn new_falls_back_to_first_tool() {
    let log = Log::default();
    let config = CanvasConfig { initial_tool: ToolId::RangeSelect, ..CanvasConfig::default() };
    let host = ToolHost::new(probe_tools(&[ToolId::Zoom, ToolId::Pan], &log), Vec::new(), &config).unwrap();
    assert_eq!(host.active_tool(), ToolId::Zoom);
}

#[test]
fn debug_lists_roster() {
    let log = Log::default();
    let host = host_with_elements(&log, vec![element("a", &log, InteractionResult::IGNORED)]);
    let s = format!("{host:?}");
    assert!(s.contains("RangeSelect"));
    assert!(s.contains("\"a\""));
}

// =============================================================
// set_tool
// =============================================================

#[test]
fn set_tool_swaps_activation_and_notifies() {
    let log = Log::default();
    let mut host = standard_host(&log);
    let seen = changes(&mut host);

    host.set_tool(ToolId::Zoom);

    assert_eq!(*log.borrow(), vec!["deactivate:pan", "activate:zoom"]);
    assert_eq!(host.state(ToolId::Zoom), ToolState::Active);
    assert_eq!(host.state(ToolId::Pan), ToolState::Off);
    assert_eq!(*seen.borrow(), vec![ToolChange { active: ToolId::Zoom, sprung_override: None }]);
}

#[test]
fn set_tool_to_current_is_silent() {
    let log = Log::default();
    let mut host = standard_host(&log);
    let seen = changes(&mut host);

    host.set_tool(ToolId::Pan);

    assert!(log.borrow().is_empty());
    assert!(seen.borrow().is_empty());
}

#[test]
fn set_tool_outside_roster_is_noop() {
    let log = Log::default();
    let mut host = ToolHost::new(probe_tools(&[ToolId::Pan, ToolId::Zoom], &log), Vec::new(), &CanvasConfig::default())
        .unwrap();
    let seen = changes(&mut host);

    host.set_tool(ToolId::RangeSelect);

    assert_eq!(host.active_tool(), ToolId::Pan);
    assert_eq!(host.state(ToolId::RangeSelect), ToolState::Off);
    assert!(seen.borrow().is_empty());
}

// =============================================================
// Spring activation
// =============================================================

#[test]
fn spring_and_release() {
    let log = Log::default();
    let mut host = standard_host(&log);
    let seen = changes(&mut host);

    host.spring_activate(Some(ToolId::Zoom));
    assert_eq!(host.active_tool(), ToolId::Zoom);
    assert_eq!(host.sprung_override(), Some(ToolId::Pan));
    assert_eq!(host.state(ToolId::Zoom), ToolState::Sprung);
    assert_eq!(host.state(ToolId::Pan), ToolState::Off);

    host.spring_activate(None);
    assert_eq!(host.active_tool(), ToolId::Pan);
    assert!(host.sprung_override().is_none());
    assert_eq!(host.state(ToolId::Pan), ToolState::Active);

    assert_eq!(*log.borrow(), vec!["deactivate:pan", "activate:zoom", "deactivate:zoom", "activate:pan"]);
    assert_eq!(
        *seen.borrow(),
        vec![
            ToolChange { active: ToolId::Zoom, sprung_override: Some(ToolId::Pan) },
            ToolChange { active: ToolId::Pan, sprung_override: None },
        ]
    );
}

#[test]
fn spring_twice_equals_once() {
    let log_once = Log::default();
    let mut once = standard_host(&log_once);
    once.spring_activate(Some(ToolId::Zoom));

    let log_twice = Log::default();
    let mut twice = standard_host(&log_twice);
    twice.spring_activate(Some(ToolId::Zoom));
    twice.spring_activate(Some(ToolId::Zoom));

    assert_eq!(once.active_tool(), twice.active_tool());
    assert_eq!(once.sprung_override(), twice.sprung_override());
    assert_eq!(*log_once.borrow(), *log_twice.borrow());
}

#[test]
fn spring_to_active_tool_is_noop() {
    let log = Log::default();
    let mut host = standard_host(&log);
    host.spring_activate(Some(ToolId::Pan));
    assert!(!host.is_sprung());
    assert!(log.borrow().is_empty());
}

#[test]
fn release_without_spring_is_ignored() {
    let log = Log::default();
    let mut host = standard_host(&log);
    let seen = changes(&mut host);

    host.spring_activate(None);

    assert_eq!(host.active_tool(), ToolId::Pan);
    assert!(log.borrow().is_empty());
    assert!(seen.borrow().is_empty());
}

#[test]
fn second_spring_while_sprung_is_ignored() {
    let log = Log::default();
    let mut host = standard_host(&log);
    host.spring_activate(Some(ToolId::Zoom));
    host.spring_activate(Some(ToolId::RangeSelect));

    assert_eq!(host.active_tool(), ToolId::Zoom);
    assert_eq!(host.sprung_override(), Some(ToolId::Pan));
}

#[test]
fn set_tool_during_spring_is_queued_until_release() {
    let log = Log::default();
    let mut host = standard_host(&log);
    let mut transform = Transform::default();

    host.spring_activate(Some(ToolId::Zoom));
    host.set_tool(ToolId::RangeSelect);
    assert_eq!(host.active_tool(), ToolId::Zoom);
    assert_eq!(host.sprung_override(), Some(ToolId::RangeSelect));
    assert_eq!(host.state(ToolId::RangeSelect), ToolState::Off);

    log.borrow_mut().clear();
    mouse(&mut host, &mut transform, move_at(1.0, 1.0));
    assert_eq!(*log.borrow(), vec!["mouse:zoom"]);

    log.borrow_mut().clear();
    host.spring_activate(None);
    assert_eq!(host.active_tool(), ToolId::RangeSelect);
    assert_eq!(host.state(ToolId::RangeSelect), ToolState::Active);
    assert_eq!(*log.borrow(), vec!["deactivate:zoom", "activate:range_select"]);
}

#[test]
fn set_tool_to_sprung_tool_ends_spring() {
    let log = Log::default();
    let mut host = standard_host(&log);
    host.spring_activate(Some(ToolId::Zoom));
    log.borrow_mut().clear();

    host.set_tool(ToolId::Zoom);

    assert_eq!(host.active_tool(), ToolId::Zoom);
    assert!(!host.is_sprung());
    assert_eq!(host.state(ToolId::Zoom), ToolState::Active);
    assert!(log.borrow().is_empty());
}

#[test]
fn release_spring_reports_whether_released() {
    let log = Log::default();
    let mut host = standard_host(&log);
    assert!(!host.release_spring());
    host.spring_activate(Some(ToolId::RangeSelect));
    assert!(host.release_spring());
    assert_eq!(host.active_tool(), ToolId::Pan);
}

#[test]
fn exactly_one_tool_live_after_any_sequence() {
    let log = Log::default();
    let mut host = standard_host(&log);
    let ops: [(&str, Option<ToolId>); 12] = [
        ("set", Some(ToolId::Zoom)),
        ("spring", Some(ToolId::Pan)),
        ("spring", Some(ToolId::Pan)),
        ("set", Some(ToolId::RangeSelect)),
        ("spring", Some(ToolId::Zoom)),
        ("spring", None),
        ("spring", None),
        ("spring", Some(ToolId::Zoom)),
        ("set", Some(ToolId::Zoom)),
        ("spring", None),
        ("spring", Some(ToolId::Pan)),
        ("set", Some(ToolId::Pan)),
    ];
    for (op, id) in ops {
        match (op, id) {
            ("set", Some(id)) => host.set_tool(id),
            (_, id) => host.spring_activate(id),
        }
        assert_eq!(live_tools(&host), vec![host.active_tool()], "after {op} {id:?}");
        if let Some(covered) = host.sprung_override() {
            assert_ne!(covered, host.active_tool());
        }
    }
}

// =============================================================
// Mouse dispatch
// =============================================================

#[test]
fn catching_element_short_circuits() {
    let log = Log::default();
    let mut host = host_with_elements(
        &log,
        vec![
            element("a", &log, InteractionResult::REDRAW),
            element("b", &log, InteractionResult::new(false, true)),
            element("c", &log, InteractionResult::IGNORED),
        ],
    );
    let mut transform = Transform::default();

    let r = mouse(&mut host, &mut transform, move_at(0.0, 0.0));

    assert_eq!(*log.borrow(), vec!["mouse:a", "mouse:b"]);
    assert_eq!(r, InteractionResult::new(true, true));
}

#[test]
fn tool_receives_uncaught_events_with_redraw_folded() {
    let log = Log::default();
    let mut host = host_with_elements(
        &log,
        vec![element("a", &log, InteractionResult::REDRAW), element("b", &log, InteractionResult::IGNORED)],
    );
    let mut transform = Transform::default();

    let r = mouse(&mut host, &mut transform, move_at(0.0, 0.0));

    assert_eq!(*log.borrow(), vec!["mouse:a", "mouse:b", "mouse:pan"]);
    assert_eq!(r, InteractionResult::REDRAW);
}

#[test]
fn wheel_zooms_around_pointer_before_elements() {
    let log = Log::default();
    let mut host = host_with_elements(&log, vec![element("a", &log, InteractionResult::IGNORED)]);
    let mut transform = Transform::default();
    let anchor = Point::new(30.0, 40.0);
    let mut e = MouseEvent::wheel(anchor, -1.0);
    e.world = Some(transform.canvas_to_world(anchor));

    let r = mouse(&mut host, &mut transform, e);

    assert_eq!(r, InteractionResult::CAUGHT);
    assert!(log.borrow().is_empty());
    assert!((transform.scale().x - 1.1).abs() < 1e-12);
    let c = transform.world_to_canvas(e.world.unwrap());
    assert!((c.x - anchor.x).abs() < 1e-9 && (c.y - anchor.y).abs() < 1e-9);
}

#[test]
fn wheel_without_world_point_anchors_under_pointer() {
    let log = Log::default();
    let mut host = standard_host(&log);
    let mut transform = Transform::default();
    transform.restore(ViewState { pan: Point::new(100.0, 50.0), scale: Point::new(2.0, 2.0) }, false);
    let pointer = Point::new(300.0, 250.0);
    let under = transform.canvas_to_world(pointer);

    mouse(&mut host, &mut transform, MouseEvent::wheel(pointer, -1.0));

    assert!((transform.scale().x - 2.2).abs() < 1e-12);
    let c = transform.world_to_canvas(under);
    assert!((c.x - pointer.x).abs() < 1e-9 && (c.y - pointer.y).abs() < 1e-9);
}

#[test]
fn wheel_down_zooms_out_on_unlocked_axes() {
    let log = Log::default();
    let config = CanvasConfig { zoom_axes: AxisLock::X_ONLY, ..CanvasConfig::default() };
    let mut host = ToolHost::new(probe_tools(&ToolId::ALL, &log), Vec::new(), &config).unwrap();
    let mut transform = Transform::default();

    mouse(&mut host, &mut transform, MouseEvent::wheel(Point::new(0.0, 0.0), 3.0));

    assert!((transform.scale().x - 1.0 / 1.1).abs() < 1e-12);
    assert_eq!(transform.scale().y, 1.0);
}

#[test]
fn zero_wheel_falls_through() {
    let log = Log::default();
    let mut host = standard_host(&log);
    let mut transform = Transform::default();
    mouse(&mut host, &mut transform, MouseEvent::wheel(Point::new(0.0, 0.0), 0.0));
    assert_eq!(*log.borrow(), vec!["mouse:pan"]);
    assert_eq!(transform.view(), ViewState::default());
}

// =============================================================
// Key dispatch
// =============================================================

#[test]
fn spring_key_press_and_release() {
    let log = Log::default();
    let mut host = standard_host(&log);

    let press = key(&mut host, KeyEvent::down("Control"));
    assert_eq!(press, InteractionResult::CAUGHT);
    assert_eq!(host.active_tool(), ToolId::Zoom);

    let repeat = key(&mut host, KeyEvent::down("Control"));
    assert_eq!(repeat, InteractionResult::new(false, true));

    let release = key(&mut host, KeyEvent::up("Control"));
    assert_eq!(release, InteractionResult::CAUGHT);
    assert_eq!(host.active_tool(), ToolId::Pan);
    assert!(!log.borrow().iter().any(|l| l.starts_with("key:")));
}

#[test]
fn releasing_unrelated_spring_key_keeps_spring() {
    let log = Log::default();
    let mut host = standard_host(&log);
    host.set_tool(ToolId::RangeSelect);

    key(&mut host, KeyEvent::down("Control"));
    key(&mut host, KeyEvent::down(" "));
    key(&mut host, KeyEvent::up(" "));

    assert_eq!(host.active_tool(), ToolId::Zoom);
    assert_eq!(host.sprung_override(), Some(ToolId::RangeSelect));
}

#[test]
fn stray_spring_key_release_is_caught_and_ignored() {
    let log = Log::default();
    let mut host = standard_host(&log);
    let r = key(&mut host, KeyEvent::up(" "));
    assert_eq!(r, InteractionResult::new(false, true));
    assert_eq!(host.active_tool(), ToolId::Pan);
}

#[test]
fn tapping_spring_key_of_active_tool_is_silent() {
    let log = Log::default();
    let mut host = standard_host(&log);
    let seen = changes(&mut host);

    let output = warnings_during(|| {
        assert_eq!(key(&mut host, KeyEvent::down(" ")), InteractionResult::new(false, true));
        assert_eq!(key(&mut host, KeyEvent::up(" ")), InteractionResult::new(false, true));
    });

    assert_eq!(output, "");
    assert!(seen.borrow().is_empty());
    assert_eq!(host.active_tool(), ToolId::Pan);
}

#[test]
fn orphan_release_call_still_warns() {
    let log = Log::default();
    let mut host = standard_host(&log);
    let output = warnings_during(|| host.spring_activate(None));
    assert!(output.contains("spring release with no pending override"), "{output}");
}

#[test]
fn hotkey_selects_tool_case_insensitively() {
    let log = Log::default();
    let mut host = standard_host(&log);

    assert_eq!(key(&mut host, KeyEvent::down("S")), InteractionResult::CAUGHT);
    assert_eq!(host.active_tool(), ToolId::RangeSelect);

    key(&mut host, KeyEvent::down("z"));
    assert_eq!(host.active_tool(), ToolId::Zoom);
}

#[test]
fn hotkey_with_command_modifier_goes_to_consumers() {
    let log = Log::default();
    let mut host = standard_host(&log);
    let mut e = KeyEvent::down("z");
    e.modifiers = Modifiers { ctrl: true, ..Default::default() };

    key(&mut host, e);

    assert_eq!(host.active_tool(), ToolId::Pan);
    assert_eq!(*log.borrow(), vec!["key:pan:z"]);
}

#[test]
fn hotkey_release_goes_to_consumers() {
    let log = Log::default();
    let mut host = standard_host(&log);
    key(&mut host, KeyEvent::up("z"));
    assert_eq!(host.active_tool(), ToolId::Pan);
    assert_eq!(*log.borrow(), vec!["key:pan:z"]);
}

#[test]
fn other_keys_reach_elements_then_tool() {
    let log = Log::default();
    let mut host = host_with_elements(&log, vec![element("a", &log, InteractionResult::IGNORED)]);
    key(&mut host, KeyEvent::down("Escape"));
    assert_eq!(*log.borrow(), vec!["key:a:Escape", "key:pan:Escape"]);
}

#[test]
fn catching_element_stops_key_dispatch() {
    let log = Log::default();
    let mut host = host_with_elements(&log, vec![element("a", &log, InteractionResult::CAUGHT)]);
    let r = key(&mut host, KeyEvent::down("Escape"));
    assert_eq!(r, InteractionResult::CAUGHT);
    assert_eq!(*log.borrow(), vec!["key:a:Escape"]);
}

// =============================================================
// Draw order
// =============================================================

#[test]
fn drawers_list_elements_then_effective_tool() {
    let log = Log::default();
    let mut host = host_with_elements(
        &log,
        vec![element("a", &log, InteractionResult::IGNORED), element("b", &log, InteractionResult::IGNORED)],
    );
    let params = DrawParams { viewport: Size::new(10.0, 10.0), view: ViewState::default(), dpr: 1.0 };
    let mut rec = Recorder::new();

    for layer in host.drawers() {
        layer.draw_world(&mut rec, &params).unwrap();
    }
    assert_eq!(*log.borrow(), vec!["world:a", "world:b", "world:pan"]);

    log.borrow_mut().clear();
    host.spring_activate(Some(ToolId::Zoom));
    log.borrow_mut().clear();
    for layer in host.drawers() {
        layer.draw_world(&mut rec, &params).unwrap();
    }
    assert_eq!(*log.borrow(), vec!["world:a", "world:b", "world:zoom"]);
}
