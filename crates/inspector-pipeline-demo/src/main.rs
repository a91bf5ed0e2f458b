//! Inspector walkthrough over a small game scene.
//!
//! Loads enemies from JSON, draws them through a text canvas, then
//! exercises multi-target editing, host events, and redraw throughput.
//!
//! Usage: `inspector-demo [scene.json]`. Set `RUST_LOG=debug` to see the
//! pipeline's own tracing.

use std::fs;
use std::path::Path;
use std::time::Instant;

use inspector_pipeline::builtins::{
    EnableIf, Group, Help, InlineEditor, Multiline, Range, ReorderableList, ShowIf, Suffix, Title,
};
use inspector_pipeline::model::{
    EditingSession, MapObject, ObjectRef, SchemaBuilder, SchemaRegistry, TypeClass, TypeSchema,
    Value,
};
use inspector_pipeline::render::{
    Canvas, FieldView, LabelStyle, ListState, MessageKind, RecordingCanvas, Scope,
};
use inspector_pipeline::{CollectingSink, InspectorHost, InspectorOptions};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

// =============================================================================
// SCENE DATA
// =============================================================================

#[derive(Debug, Deserialize)]
struct Scene {
    enemies: Vec<Enemy>,
}

#[derive(Debug, Deserialize)]
struct Enemy {
    name: String,
    alive: bool,
    health: i64,
    speed: f64,
    notes: String,
    #[serde(default)]
    loot: Vec<String>,
    weapon: Option<Weapon>,
}

#[derive(Debug, Deserialize)]
struct Weapon {
    kind: String,
    damage: i64,
}

impl Enemy {
    fn to_object(&self) -> ObjectRef {
        let loot = self.loot.iter().map(|item| Value::from(item.as_str())).collect::<Vec<_>>();
        let weapon = match &self.weapon {
            Some(weapon) => Value::from(weapon.to_object()),
            None => Value::Object(None),
        };
        MapObject::new("Enemy")
            .with_field("name", self.name.as_str())
            .with_field("alive", self.alive)
            .with_field("health", self.health)
            .with_field("speed", self.speed)
            .with_field("notes", self.notes.as_str())
            .with_field("loot", loot)
            .with_field("weapon", weapon)
            .into_ref()
    }
}

impl Weapon {
    fn to_object(&self) -> ObjectRef {
        MapObject::new("Weapon")
            .with_field("kind", self.kind.as_str())
            .with_field("damage", self.damage)
            .into_ref()
    }
}

// =============================================================================
// SCHEMAS
// =============================================================================

fn enemy_schema() -> TypeSchema {
    SchemaBuilder::new("Enemy")
        .field("name", TypeClass::Text, |f| f.attribute(Title::new("Identity")))
        .field("alive", TypeClass::Bool, |f| f)
        .field("health", TypeClass::Int, |f| {
            f.attribute(Group::titled("Stats"))
                .attribute(Range::new(0.0, 100.0))
                .attribute(ShowIf::new("alive", true))
        })
        .field("speed", TypeClass::Float, |f| {
            f.attribute(Group::titled("Stats"))
                .attribute(Suffix::new("m/s"))
                .attribute(EnableIf::new("alive", true))
        })
        .field("notes", TypeClass::Text, |f| {
            f.attribute(Multiline::new(3))
                .attribute(Help::new("Designer notes, not shown in game."))
        })
        .sequence("loot", |f| f.attribute(ReorderableList::new().header("Drops")))
        .field("weapon", TypeClass::Object, |f| f.attribute(InlineEditor::new()))
        .build()
}

fn weapon_schema() -> TypeSchema {
    SchemaBuilder::new("Weapon")
        .field("kind", TypeClass::Text, |f| f)
        .field("damage", TypeClass::Int, |f| f.attribute(Range::new(0.0, 20.0)))
        .build()
}

// =============================================================================
// TEXT CANVAS
// =============================================================================

/// Renders canvas calls as indented text lines.
#[derive(Debug, Default)]
struct TextCanvas {
    lines: Vec<String>,
    depth: usize,
}

impl TextCanvas {
    fn push(&mut self, text: String) {
        self.lines.push(format!("{}{text}", "  ".repeat(self.depth)));
    }

    fn field_line(view: &FieldView) -> String {
        let marker = if view.interactive { "" } else { " (read-only)" };
        format!("{}: {}{marker}", view.label, view.display_value())
    }
}

impl Canvas for TextCanvas {
    fn begin_scope(&mut self, scope: &Scope) {
        match scope {
            Scope::Group { title: Some(title) } => self.push(format!("[{title}]")),
            Scope::Nested { type_name } => self.push(format!("<{type_name}>")),
            _ => {}
        }
        self.depth += 1;
    }

    fn end_scope(&mut self, _scope: &Scope) {
        self.depth = self.depth.saturating_sub(1);
    }

    fn space(&mut self, _amount: f32) {
        self.lines.push(String::new());
    }

    fn label(&mut self, text: &str, style: LabelStyle) {
        match style {
            LabelStyle::Bold => self.push(text.to_uppercase()),
            _ => self.push(text.to_string()),
        }
    }

    fn separator(&mut self, _thickness: f32, _padding: f32) {
        self.push("-".repeat(24));
    }

    fn help_box(&mut self, text: &str, kind: MessageKind) {
        self.push(format!("({kind:?}) {text}"));
    }

    fn value_field(&mut self, view: &FieldView) -> Option<Value> {
        self.push(Self::field_line(view));
        None
    }

    fn list_field(&mut self, view: &FieldView, state: &mut ListState) -> Option<Value> {
        let header = state.header.as_deref().unwrap_or(&view.label);
        let items = match &view.value {
            Some(Value::List(items)) if !view.mixed => {
                items.iter().map(Value::to_string).collect::<Vec<_>>().join(", ")
            }
            _ => view.display_value(),
        };
        self.push(format!("{header}: [{items}]"));
        None
    }

    fn invalid_drawer(&mut self, label: &str, message: &str) {
        self.push(format!("{label}: <invalid: {message}>"));
    }
}

fn draw_text(host: &InspectorHost, session: &EditingSession) -> String {
    let mut canvas = TextCanvas::default();
    host.draw(session, &mut canvas);
    canvas.lines.join("\n")
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    let scene_path = std::env::args().nth(1).unwrap_or_else(|| {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("data/scene.json")
            .to_string_lossy()
            .into_owned()
    });

    println!("Loading scene from: {scene_path}");
    let json = fs::read_to_string(&scene_path)?;
    let scene: Scene = serde_json::from_str(&json)?;
    println!("Loaded {} enemies", scene.enemies.len());

    let objects: Vec<ObjectRef> = scene.enemies.iter().map(Enemy::to_object).collect();

    let sink = CollectingSink::new();
    let registry = SchemaRegistry::new().with(enemy_schema()).with(weapon_schema());
    let host = InspectorHost::builder(registry)
        .options(InspectorOptions::new().max_depth(4))
        .sink(sink.clone())
        .build();

    // Single targets
    for (enemy, object) in scene.enemies.iter().zip(&objects) {
        println!("\n=== {} ===", enemy.name);
        println!("{}", draw_text(&host, &EditingSession::single(object.clone())));
    }

    // All targets at once
    let everyone = EditingSession::new(objects.iter().cloned());
    println!("\n=== All {} enemies ===", everyone.len());
    println!("{}", draw_text(&host, &everyone));

    // Redrawing must not change the output or the pipelines
    let first_enemy = objects.first().ok_or("scene has no enemies")?;
    let session = EditingSession::single(first_enemy.clone());
    let mut first = RecordingCanvas::new();
    let report = host.draw(&session, &mut first);
    let pipelines = host.pipeline_count();
    let mut second = RecordingCanvas::new();
    host.draw(&session, &mut second);
    assert_eq!(first.summaries(), second.summaries(), "Redraw should be idempotent");
    assert_eq!(pipelines, host.pipeline_count(), "Redraw should reuse pipelines");
    assert!(first.is_balanced(), "Scopes should be balanced");
    println!("\n=== Redraw ===");
    println!("Report: {report:?}");
    println!("Canvas calls per draw: {}", first.ops().len());
    println!("Cached pipelines: {pipelines}");

    // Scripted edit through the range drawer: out of range values clamp
    let mut editing = RecordingCanvas::new();
    editing.script_edit("health", 250);
    host.draw(&session, &mut editing);
    println!("\n=== Edit ===");
    println!("health after scripted edit of 250: {:?}", first_enemy.get().field("health"));

    // Host events
    println!("\n=== Events ===");
    for stats in host.stores().stats() {
        println!(
            "  {:<16} {:?}: {} live, {} created, {} disposed",
            stats.name, stats.key_kind, stats.len, stats.created, stats.disposed
        );
    }
    println!("Selection change cleared {} entries", host.selection_changed());
    println!("Reload cleared {} entries", host.reload());

    // Throughput
    const DRAW_ITERS: u32 = 1_000;
    for _ in 0..10 {
        host.draw(&everyone, &mut RecordingCanvas::new());
    }
    let start = Instant::now();
    for _ in 0..DRAW_ITERS {
        host.draw(&everyone, &mut RecordingCanvas::new());
    }
    let draw_time = start.elapsed() / DRAW_ITERS;
    println!("\n=== Timing ===");
    println!("Multi-target draw: {draw_time:?} (avg of {DRAW_ITERS} iterations)");

    // Summary
    println!("\n=== Summary ===");
    println!("Diagnostics reported: {}", sink.len());
    for diagnostic in sink.collected() {
        println!("  {diagnostic}");
    }
    println!("Diagnostics suppressed as repeats: {}", host.diagnostics().suppressed());
    Ok(())
}
