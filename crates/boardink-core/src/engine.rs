//! The board engine: routes input events through the viewport, tools,
//! drawing gestures, history and persistence.

use crate::config::EngineConfig;
use crate::dialog::{Dialog, DialogRequest};
use crate::document::BoardDocument;
use crate::elements::{Arrow, ElementKind, HitTarget, Stroke, StrokeKind, TextLabel};
use crate::input::{Event, Key, KeyEvent, PointerEvent, Timestamp};
use crate::persistence::{BoardPersistence, SharedStore};
use crate::scene::Scene;
use crate::scene_graph::{DragPreview, SceneGraph};
use crate::selection::{ClickResolution, ClickTracker, Selection};
use crate::shortcuts::{Command, ShortcutRegistry};
use crate::tools::{Brush, ToolKind, ToolManager};
use crate::viewport::Viewport;
use kurbo::{Point, Size, Vec2};

/// Device size used until the host reports one.
const DEFAULT_DEVICE_SIZE: Size = Size::new(800.0, 600.0);

/// What the host should do after an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// The scene graph changed.
    Repaint,
    OpenDialog(DialogRequest),
    CloseDialog,
    /// The active tool changed (update palette and cursor).
    ToolChanged(ToolKind),
}

/// Pointer gesture in progress.
#[derive(Debug, Clone, PartialEq)]
enum Gesture {
    Idle,
    /// Extending the newest stroke.
    Drawing,
    /// Sizing the newest arrow.
    Arrow,
    Panning { last: Point },
    /// Pressed on a text label; becomes a drag once the pointer travels.
    PressingText {
        id: String,
        origin: Point,
        origin_canvas: Point,
    },
    DraggingText {
        id: String,
        origin_canvas: Point,
        offset: Vec2,
    },
    /// Pressed under the default tool; a click if the pointer stays put.
    Clicking {
        target: Option<HitTarget>,
        origin: Point,
        moved: bool,
    },
}

/// Everything a board needs while it is open.
pub struct BoardEngine {
    config: EngineConfig,
    viewport: Viewport,
    tools: ToolManager,
    brush: Brush,
    scene: Scene,
    selection: Selection,
    clicks: ClickTracker,
    dialog: Option<Dialog>,
    gesture: Gesture,
    persistence: BoardPersistence,
    graph: SceneGraph,
    device_size: Size,
}

/// What an exporter needs from the engine.
pub struct ExportSurface<'a> {
    pub graph: &'a mut SceneGraph,
    pub viewport: Viewport,
    pub device_size: Size,
}

impl Default for BoardEngine {
    fn default() -> Self {
        Self::with_persistence(EngineConfig::default(), BoardPersistence::detached())
    }
}

impl BoardEngine {
    pub fn new(config: EngineConfig, store: SharedStore) -> Self {
        let persistence = BoardPersistence::new(store, config.save_policy);
        Self::with_persistence(config, persistence)
    }

    fn with_persistence(config: EngineConfig, persistence: BoardPersistence) -> Self {
        Self {
            viewport: Viewport::new(config.zoom),
            tools: ToolManager::new(config.key_debounce_ms),
            brush: config.brush.clone(),
            scene: Scene::new(),
            selection: Selection::None,
            clicks: ClickTracker::new(config.double_click_ms),
            dialog: None,
            gesture: Gesture::Idle,
            persistence,
            graph: SceneGraph::new(),
            device_size: DEFAULT_DEVICE_SIZE,
            config,
        }
    }

    /// Activate a board: load its elements and reset transient state.
    pub fn open_board(&mut self, board_id: Option<String>) -> Vec<Effect> {
        let document = self.persistence.activate(board_id);
        self.scene = Scene::from_document(document);
        self.selection = Selection::None;
        self.clicks.cancel();
        self.dialog = None;
        self.gesture = Gesture::Idle;
        self.rebuild_graph();
        vec![Effect::Repaint]
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn tool(&self) -> ToolKind {
        self.tools.current_tool
    }

    pub fn cursor(&self) -> &'static str {
        self.tools.current_tool.cursor()
    }

    pub fn brush(&self) -> &Brush {
        &self.brush
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn strokes(&self) -> &[Stroke] {
        self.scene.strokes.strokes()
    }

    pub fn redo_stack(&self) -> &[Stroke] {
        self.scene.strokes.redo_stack()
    }

    pub fn arrows(&self) -> &[Arrow] {
        &self.scene.arrows
    }

    pub fn texts(&self) -> &[TextLabel] {
        &self.scene.texts
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn dialog(&self) -> Option<&Dialog> {
        self.dialog.as_ref()
    }

    pub fn scene_graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn device_size(&self) -> Size {
        self.device_size
    }

    pub fn persistence(&self) -> &BoardPersistence {
        &self.persistence
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.gesture, Gesture::Drawing | Gesture::Arrow)
    }

    pub fn document(&self) -> BoardDocument {
        self.scene.to_document()
    }

    /// Borrow the live scene graph and view state for export.
    pub fn export_surface(&mut self) -> ExportSurface<'_> {
        ExportSurface {
            graph: &mut self.graph,
            viewport: self.viewport,
            device_size: self.device_size,
        }
    }

    /// Write unsaved changes now.
    pub fn flush(&mut self, now: Timestamp) -> bool {
        self.persistence.flush(self.scene.view(), now)
    }

    /// Handle one event to completion.
    pub fn dispatch(&mut self, event: Event, now: Timestamp) -> Vec<Effect> {
        let mut out = Outcome::default();

        if let Some(target) = self.clicks.take_due(now) {
            self.apply_single_click(target, &mut out);
        }

        match event {
            Event::Pointer(pointer) => self.handle_pointer(pointer, now, &mut out),
            Event::Wheel { position, delta } => {
                if let Some(position) = position {
                    let delta_scale = self.viewport.limits.wheel_delta(delta.y);
                    self.viewport.zoom_at(position, delta_scale);
                    out.repaint = true;
                }
            }
            Event::KeyDown(key) => self.handle_key_down(key, now, &mut out),
            Event::KeyUp(key) => {
                if key.key == Key::Space && self.tools.is_space_held() {
                    self.finish_gesture(now, &mut out);
                    if self.tools.release_hand() {
                        out.tool_changed(self.tools.current_tool);
                    }
                }
            }
            Event::Tick => {
                self.persistence.tick(self.scene.view(), now);
            }
            Event::Resize(size) => {
                self.device_size = size;
                out.repaint = true;
            }
            Event::SetTool(tool) => self.select_tool(tool, now, &mut out),
            Event::SetColor(color) => self.brush.color = color,
            Event::SetBrushSize(size) => self.brush.set_size(size),
            Event::ZoomIn => self.run(Command::ZoomIn, now, &mut out),
            Event::ZoomOut => self.run(Command::ZoomOut, now, &mut out),
            Event::SetZoom(scale) => {
                self.viewport.set_scale(scale);
                out.repaint = true;
            }
            Event::Undo => self.run(Command::Undo, now, &mut out),
            Event::Redo => self.run(Command::Redo, now, &mut out),
            Event::RequestClear => self.run(Command::RequestClear, now, &mut out),
            Event::DeleteSelection => self.run(Command::DeleteSelection, now, &mut out),
            Event::DialogDraft(text) => {
                if let Some(dialog) = self.dialog.as_mut() {
                    dialog.set_draft(text);
                }
            }
            Event::DialogConfirm => self.confirm_dialog(now, &mut out),
            Event::DialogCancel => self.cancel_dialog(&mut out),
        }

        if out.repaint {
            self.rebuild_graph();
        }
        out.into_effects()
    }

    fn rebuild_graph(&mut self) {
        let drag = match &self.gesture {
            Gesture::DraggingText { id, offset, .. } => Some(DragPreview {
                id: id.as_str(),
                offset: *offset,
            }),
            _ => None,
        };
        self.graph = SceneGraph::build(&self.scene, &self.selection, drag);
    }

    fn persist(&mut self, now: Timestamp) {
        self.persistence.mark_dirty(self.scene.view(), now);
    }

    fn handle_pointer(&mut self, pointer: PointerEvent, now: Timestamp, out: &mut Outcome) {
        match pointer {
            // Release always ends the gesture, even without a position.
            PointerEvent::Up { position } => self.pointer_up(position, now, out),
            PointerEvent::Down {
                position: Some(position),
            } => self.pointer_down(position, now, out),
            PointerEvent::Move {
                position: Some(position),
            } => self.pointer_move(position, out),
            PointerEvent::Down { position: None } | PointerEvent::Move { position: None } => {
                log::debug!("pointer event without position ignored");
            }
        }
    }

    fn pointer_down(&mut self, position: Point, now: Timestamp, out: &mut Outcome) {
        self.finish_gesture(now, out);
        let point = self.viewport.to_canvas_point(position);

        // Text labels are draggable under every tool.
        if let Some(label) = self.scene.text_at(point) {
            self.gesture = Gesture::PressingText {
                id: label.id.clone(),
                origin: position,
                origin_canvas: point,
            };
            return;
        }

        match self.tools.current_tool {
            tool @ (ToolKind::Pen | ToolKind::Eraser) => {
                let kind = if tool == ToolKind::Eraser {
                    StrokeKind::Eraser
                } else {
                    StrokeKind::Pen
                };
                let stroke = Stroke::new(kind, self.brush.color, self.brush.size, point);
                self.scene.strokes.commit(stroke);
                self.gesture = Gesture::Drawing;
                self.persist(now);
                out.repaint = true;
            }
            ToolKind::Line => {
                self.scene
                    .arrows
                    .push(Arrow::new(self.brush.color, self.brush.size, point));
                self.gesture = Gesture::Arrow;
                out.repaint = true;
            }
            ToolKind::Text => {
                let label = TextLabel::new(
                    point,
                    self.config.placeholder_text.clone(),
                    self.brush.size,
                    self.brush.color,
                );
                log::debug!("text {} created at {:?}", label.id, point);
                self.scene.texts.push(label);
                self.persist(now);
                out.repaint = true;
                if self.tools.complete_gesture() {
                    out.tool_changed(self.tools.current_tool);
                }
            }
            ToolKind::Hand => {
                self.gesture = Gesture::Panning { last: position };
            }
            ToolKind::Default => {
                let target = self.scene.hit_test(point, self.config.hit_tolerance);
                self.gesture = Gesture::Clicking {
                    target,
                    origin: position,
                    moved: false,
                };
            }
            ToolKind::Shapes | ToolKind::Image => {
                log::debug!("{} tool has no drawing gesture", self.tools.current_tool.name());
            }
        }
    }

    fn pointer_move(&mut self, position: Point, out: &mut Outcome) {
        let point = self.viewport.to_canvas_point(position);
        let threshold = self.config.drag_threshold;
        match &mut self.gesture {
            Gesture::Idle => {}
            Gesture::Drawing => {
                if let Some(stroke) = self.scene.strokes.last_mut() {
                    stroke.add_point(point);
                    out.repaint = true;
                }
            }
            Gesture::Arrow => {
                if let Some(arrow) = self.scene.arrows.last_mut() {
                    arrow.set_end(point);
                    out.repaint = true;
                }
            }
            Gesture::Panning { last } => {
                let delta = position - *last;
                *last = position;
                // Panning is honored only under the hand tool.
                if self.tools.current_tool == ToolKind::Hand {
                    self.viewport.pan(delta);
                    out.repaint = true;
                }
            }
            Gesture::PressingText {
                id,
                origin,
                origin_canvas,
            } => {
                if (position - *origin).hypot() > threshold {
                    self.gesture = Gesture::DraggingText {
                        id: std::mem::take(id),
                        origin_canvas: *origin_canvas,
                        offset: point - *origin_canvas,
                    };
                    out.repaint = true;
                }
            }
            Gesture::DraggingText {
                origin_canvas,
                offset,
                ..
            } => {
                *offset = point - *origin_canvas;
                out.repaint = true;
            }
            Gesture::Clicking { origin, moved, .. } => {
                if (position - *origin).hypot() > threshold {
                    *moved = true;
                }
            }
        }
    }

    fn pointer_up(&mut self, position: Option<Point>, now: Timestamp, out: &mut Outcome) {
        let threshold = self.config.drag_threshold;
        let stayed = |origin: Point| position.is_some_and(|p| (p - origin).hypot() <= threshold);
        match std::mem::replace(&mut self.gesture, Gesture::Idle) {
            Gesture::PressingText { id, .. } if position.is_some() => {
                self.register_click(HitTarget::new(id, ElementKind::Text), now, out);
            }
            Gesture::Clicking {
                target,
                origin,
                moved: false,
            } if stayed(origin) => match target {
                Some(target) => self.register_click(target, now, out),
                None => {
                    self.clicks.cancel();
                    if !self.selection.is_none() {
                        self.selection = Selection::None;
                        out.repaint = true;
                    }
                }
            },
            // Released somewhere unknown or after moving: not a click.
            Gesture::PressingText { .. } | Gesture::Clicking { .. } => {}
            other => {
                self.gesture = other;
                self.finish_gesture(now, out);
            }
        }
    }

    /// End whatever gesture is in progress, committing its result.
    fn finish_gesture(&mut self, now: Timestamp, out: &mut Outcome) {
        match std::mem::replace(&mut self.gesture, Gesture::Idle) {
            Gesture::Drawing => self.persist(now),
            Gesture::Arrow => {
                self.persist(now);
                if self.tools.complete_gesture() {
                    out.tool_changed(self.tools.current_tool);
                }
            }
            Gesture::DraggingText { id, offset, .. } => {
                if let Some(label) = self.scene.text_mut(&id) {
                    label.translate(offset);
                    self.persist(now);
                } else {
                    log::warn!("dragged text {id} no longer exists");
                }
                out.repaint = true;
            }
            Gesture::Idle
            | Gesture::Panning { .. }
            | Gesture::PressingText { .. }
            | Gesture::Clicking { .. } => {}
        }
    }

    fn register_click(&mut self, target: HitTarget, now: Timestamp, out: &mut Outcome) {
        match self.clicks.register(target, now) {
            ClickResolution::Scheduled { superseded } => {
                if let Some(previous) = superseded {
                    self.apply_single_click(previous, out);
                }
            }
            ClickResolution::Double(target) => self.apply_double_click(target, out),
        }
    }

    fn apply_single_click(&mut self, target: HitTarget, out: &mut Outcome) {
        if !self.scene.contains(&target.id, target.kind) {
            log::debug!("click target {} is gone", target.id);
            return;
        }
        let selection = Selection::from_target(target);
        if selection != self.selection {
            self.selection = selection;
            out.repaint = true;
        }
    }

    fn apply_double_click(&mut self, target: HitTarget, out: &mut Outcome) {
        let kind = target.kind;
        let id = target.id.clone();
        self.apply_single_click(target, out);
        if kind != ElementKind::Text {
            return;
        }
        if let Some(label) = self.scene.text(&id) {
            let dialog = Dialog::edit_text(id, &label.text);
            self.open_dialog(dialog, out);
        }
    }

    fn handle_key_down(&mut self, event: KeyEvent, now: Timestamp, out: &mut Outcome) {
        if self.dialog.is_some() {
            match event.key {
                Key::Escape => self.cancel_dialog(out),
                Key::Enter => self.confirm_dialog(now, out),
                _ => {}
            }
            return;
        }

        if event.key == Key::Space {
            if !self.tools.is_space_held() {
                self.finish_gesture(now, out);
            }
            if self.tools.hold_hand() {
                out.tool_changed(self.tools.current_tool);
            }
            return;
        }

        let Some(command) = ShortcutRegistry::lookup(&event) else {
            return;
        };
        if !self.tools.accept_key(event.key, now) {
            log::debug!("debounced key {:?}", event.key);
            return;
        }
        self.run(command, now, out);
    }

    fn run(&mut self, command: Command, now: Timestamp, out: &mut Outcome) {
        match command {
            Command::ToggleTool(tool) => self.select_tool(tool, now, out),
            // Space is handled on key down/up directly.
            Command::HoldHand => {}
            Command::Undo => {
                self.finish_gesture(now, out);
                if self.scene.strokes.undo().is_some() {
                    self.drop_stale_selection();
                    self.persist(now);
                    out.repaint = true;
                }
            }
            Command::Redo => {
                self.finish_gesture(now, out);
                if self.scene.strokes.redo().is_some() {
                    self.persist(now);
                    out.repaint = true;
                }
            }
            Command::RequestClear => self.open_dialog(Dialog::ConfirmClear, out),
            Command::ZoomIn => {
                self.viewport.zoom_in();
                out.repaint = true;
            }
            Command::ZoomOut => {
                self.viewport.zoom_out();
                out.repaint = true;
            }
            Command::DeleteSelection => self.delete_selection(now, out),
            Command::CancelDialog => self.cancel_dialog(out),
            Command::ConfirmDialog => self.confirm_dialog(now, out),
        }
    }

    fn select_tool(&mut self, tool: ToolKind, now: Timestamp, out: &mut Outcome) {
        self.finish_gesture(now, out);
        if self.tools.select(tool) {
            out.tool_changed(self.tools.current_tool);
        }
    }

    fn drop_stale_selection(&mut self) {
        if let Some(target) = self.selection.target() {
            if !self.scene.contains(&target.id, target.kind) {
                self.selection = Selection::None;
            }
        }
    }

    fn delete_selection(&mut self, now: Timestamp, out: &mut Outcome) {
        let Some(target) = self.selection.target() else {
            log::debug!("delete with nothing selected");
            return;
        };
        self.selection = Selection::None;
        out.repaint = true;
        if self.scene.remove(&target.id, target.kind) {
            log::debug!("deleted {:?} {}", target.kind, target.id);
            self.persist(now);
        } else {
            log::warn!("selected {:?} {} not found, nothing deleted", target.kind, target.id);
        }
    }

    fn open_dialog(&mut self, dialog: Dialog, out: &mut Outcome) {
        if self.dialog.is_some() {
            log::debug!("dialog already open");
            return;
        }
        out.effects.push(Effect::OpenDialog(dialog.request()));
        self.dialog = Some(dialog);
    }

    fn cancel_dialog(&mut self, out: &mut Outcome) {
        if self.dialog.take().is_some() {
            out.effects.push(Effect::CloseDialog);
        }
    }

    fn confirm_dialog(&mut self, now: Timestamp, out: &mut Outcome) {
        let Some(dialog) = self.dialog.take() else {
            return;
        };
        out.effects.push(Effect::CloseDialog);
        match dialog {
            Dialog::ConfirmClear => self.clear(now, out),
            Dialog::EditText { id, draft } => match self.scene.text_mut(&id) {
                Some(label) => {
                    label.text = draft;
                    self.persist(now);
                    out.repaint = true;
                }
                None => log::warn!("edited text {id} no longer exists"),
            },
        }
    }

    fn clear(&mut self, now: Timestamp, out: &mut Outcome) {
        self.gesture = Gesture::Idle;
        self.scene.clear();
        self.selection = Selection::None;
        self.clicks.cancel();
        self.persist(now);
        out.repaint = true;
        log::info!("canvas cleared");
    }
}

/// Effects collected while handling one event.
#[derive(Debug, Default)]
struct Outcome {
    effects: Vec<Effect>,
    repaint: bool,
}

impl Outcome {
    fn tool_changed(&mut self, tool: ToolKind) {
        self.effects.retain(|e| !matches!(e, Effect::ToolChanged(_)));
        self.effects.push(Effect::ToolChanged(tool));
        self.repaint = true;
    }

    fn into_effects(mut self) -> Vec<Effect> {
        if self.repaint {
            self.effects.insert(0, Effect::Repaint);
        }
        self.effects
    }
}
