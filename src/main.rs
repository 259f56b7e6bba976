use std::cell::RefCell;
use std::f64::consts::PI;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use datacanvas::background::{BackgroundError, ImageBackground, SpectrumBackground};
use datacanvas::config::{CanvasConfig, ConfigError};
use datacanvas::engine::EngineCore;
use datacanvas::host::HostError;
use datacanvas::input::{InteractionResult, KeyEvent, MouseEvent};
use datacanvas::surface::{Recorder, SurfaceError};
use datacanvas::tool::{SelectionLog, SelectionService, ToolId};
use datacanvas::transform::{Point, Rect, Size, ViewState};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("failed to read script {path}: {source}")]
    ReadScript { path: String, source: std::io::Error },
    #[error("invalid script: {0}")]
    Script(#[from] serde_json::Error),
    #[error("engine construction failed: {0}")]
    Host(#[from] HostError),
    #[error("invalid demo content: {0}")]
    Background(#[from] BackgroundError),
    #[error("render failed: {0}")]
    Render(#[from] SurfaceError),
}

#[derive(Parser, Debug)]
#[command(name = "canvas-replay", about = "Replay an input script against a headless canvas engine")]
struct Cli {
    /// JSON config file. Falls back to $DATACANVAS_CONFIG, then defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Widget::Image)]
    widget: Widget,

    /// Viewport width in CSS pixels.
    #[arg(long, default_value_t = 800.0)]
    width: f64,

    /// Viewport height in CSS pixels.
    #[arg(long, default_value_t = 600.0)]
    height: f64,

    #[arg(long, default_value_t = 1.0)]
    dpr: f64,

    /// Render a frame after every step that requests a redraw and report its
    /// operation count.
    #[arg(long)]
    render: bool,

    /// JSON array of steps.
    script: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Widget {
    Image,
    Spectrum,
}

/// One scripted action.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Step {
    Mouse(MouseEvent),
    Key(KeyEvent),
    SetTool { tool: ToolId },
    Spring { tool: Option<ToolId> },
    Resize { width: f64, height: f64 },
    FocusLost,
    ResetView,
}

#[derive(Debug, Serialize)]
struct StepReport {
    step: usize,
    redraw: bool,
    catch: bool,
    active: ToolId,
    sprung_override: Option<ToolId>,
    view: ViewState,
    #[serde(skip_serializing_if = "Option::is_none")]
    ops: Option<usize>,
}

#[derive(Debug, Serialize)]
struct Summary {
    steps: usize,
    redraw_requests: usize,
    completed_gestures: usize,
    selections: Vec<Rect>,
    final_view: ViewState,
}

/// Selection service whose log outlives the engine that owns it.
#[derive(Clone, Default)]
struct SharedSelection(Rc<RefCell<SelectionLog>>);

impl SelectionService for SharedSelection {
    fn select_range(&mut self, world: Rect) {
        debug!(?world, "range selected");
        self.0.borrow_mut().select_range(world);
    }

    fn hover(&mut self, world: Option<Point>) {
        self.0.borrow_mut().hover(world);
    }
}

fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => CanvasConfig::from_path(path)?,
        None => CanvasConfig::from_env()?,
    };
    let steps = read_script(&cli.script)?;
    let selection = SharedSelection::default();
    let mut core = build_engine(cli.widget, config, selection.clone())?;
    core.set_viewport(Size::new(cli.width, cli.height), cli.dpr);
    core.reset_view();

    let redraws = counter();
    let sink = Rc::clone(&redraws);
    core.redraw.subscribe(move |_| *sink.borrow_mut() += 1);
    let completions = counter();
    let sink = Rc::clone(&completions);
    core.transform_mut().gesture_completed.subscribe(move |_| *sink.borrow_mut() += 1);

    info!(widget = ?cli.widget, steps = steps.len(), "replaying script");
    for (index, step) in steps.iter().enumerate() {
        let result = apply(&mut core, step);
        let ops = if cli.render && result.redraw { Some(render_ops(&mut core)?) } else { None };
        let report = StepReport {
            step: index,
            redraw: result.redraw,
            catch: result.catch,
            active: core.host().active_tool(),
            sprung_override: core.host().sprung_override(),
            view: core.transform().view(),
            ops,
        };
        println!("{}", serde_json::to_string(&report)?);
    }

    let summary = Summary {
        steps: steps.len(),
        redraw_requests: *redraws.borrow(),
        completed_gestures: *completions.borrow(),
        selections: selection.0.borrow().ranges.clone(),
        final_view: core.transform().view(),
    };
    println!("{}", serde_json::to_string(&summary)?);
    Ok(())
}

fn read_script(path: &Path) -> Result<Vec<Step>, CliError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|source| CliError::ReadScript { path: path.display().to_string(), source })?;
    Ok(serde_json::from_str(&raw)?)
}

fn build_engine(widget: Widget, config: CanvasConfig, selection: SharedSelection) -> Result<EngineCore, CliError> {
    let selection = Box::new(selection);
    let core = match widget {
        Widget::Image => EngineCore::image_viewer(config, demo_image()?, selection)?,
        Widget::Spectrum => EngineCore::spectrum_chart(config, demo_spectrum()?, selection)?,
    };
    Ok(core)
}

fn apply(core: &mut EngineCore, step: &Step) -> InteractionResult {
    match step {
        Step::Mouse(event) => core.on_mouse(event),
        Step::Key(event) => core.on_key(event),
        Step::SetTool { tool } => tool_step(core, |c| c.set_tool(*tool)),
        Step::Spring { tool } => tool_step(core, |c| c.spring_activate(*tool)),
        Step::Resize { width, height } => {
            let dpr = core.dpr();
            core.set_viewport(Size::new(*width, *height), dpr);
            InteractionResult::REDRAW
        }
        Step::FocusLost => core.on_focus_lost(),
        Step::ResetView => {
            core.reset_view();
            InteractionResult::REDRAW
        }
    }
}

/// Run a tool transition and report a redraw if the effective tool changed.
fn tool_step(core: &mut EngineCore, change: impl FnOnce(&mut EngineCore)) -> InteractionResult {
    let before = (core.host().active_tool(), core.host().sprung_override());
    change(core);
    let after = (core.host().active_tool(), core.host().sprung_override());
    InteractionResult::new(before != after, false)
}

fn render_ops(core: &mut EngineCore) -> Result<usize, CliError> {
    let mut recorder = Recorder::new();
    core.render(&mut recorder)?;
    Ok(recorder.ops.len())
}

fn counter() -> Rc<RefCell<usize>> {
    Rc::new(RefCell::new(0))
}

// =============================================================
// Demo content
// =============================================================

const DEMO_IMAGE_SIDE: usize = 128;
const DEMO_CHANNELS: u32 = 1024;

/// Concentric rings, brightest at the centre.
fn demo_image() -> Result<ImageBackground, BackgroundError> {
    let side = DEMO_IMAGE_SIDE;
    let centre = 64.0_f32;
    let mut pixels = Vec::with_capacity(side * side);
    let mut y = 0.0_f32;
    for _ in 0..side {
        let mut x = 0.0_f32;
        for _ in 0..side {
            let r = ((x - centre).powi(2) + (y - centre).powi(2)).sqrt();
            pixels.push((r * 0.3).cos() * (-r / 48.0).exp());
            x += 1.0;
        }
        y += 1.0;
    }
    ImageBackground::new(side, side, pixels)
}

/// Two Gaussian peaks on a falling background, one channel per keV.
fn demo_spectrum() -> Result<SpectrumBackground, BackgroundError> {
    let gaussian = |e: f64, mu: f64, sigma: f64, height: f64| height * (-(e - mu).powi(2) / (2.0 * sigma * sigma)).exp();
    let energies: Vec<f64> = (0..DEMO_CHANNELS).map(f64::from).collect();
    let counts = energies
        .iter()
        .map(|&e| {
            200.0 * (-e / 300.0).exp()
                + gaussian(e, 352.0, 6.0, 900.0)
                + gaussian(e, 662.0, 9.0, 1400.0)
                + 5.0 * (e * PI / 64.0).sin().abs()
        })
        .collect();
    SpectrumBackground::new(energies, counts)
}
