//! End-to-end drawing through `InspectorHost`.

use std::rc::Rc;

use inspector_pipeline::builtins::{
    DisableIf, EnableIf, Group, Highlight, HideIf, Indent, InlineEditor, Range, ReorderableList,
    ScrollArea, ShowIf, Space,
};
use inspector_pipeline::compare::ComparisonOperator;
use inspector_pipeline::model::{
    Attribute, Category, EditingSession, Inspectable, MapObject, ObjectRef, SchemaBuilder,
    SchemaRegistry, TypeClass, TypeSchema, Value,
};
use inspector_pipeline::pipeline::EXTRACT;
use inspector_pipeline::render::{Canvas, CanvasOp, RecordingCanvas, Scope};
use inspector_pipeline::{
    CollectingSink, DiagnosticCode, DrawContext, DrawerError, InspectorHost, InspectorOptions,
    MemberError, ScopeDrawer, ValueDrawer,
};

/// A property drawer that opens a scope and then fails.
#[derive(Debug)]
struct Faulty {
    panic: bool,
}

impl Attribute for Faulty {
    fn name(&self) -> &'static str {
        "Faulty"
    }

    fn category(&self) -> Category {
        Category::Property
    }
}

struct FaultyDrawer;

impl ValueDrawer<Faulty> for FaultyDrawer {
    fn render(
        &self,
        faulty: &Faulty,
        _: &mut DrawContext<'_>,
        canvas: &mut dyn Canvas,
    ) -> Result<(), DrawerError> {
        canvas.begin_scope(&Scope::Horizontal);
        if faulty.panic {
            panic!("faulty drawer");
        }
        Err(DrawerError::Failed("no luck".to_string()))
    }
}

/// A decorator whose begin opens a scope and then fails.
#[derive(Debug)]
struct Brittle;

impl Attribute for Brittle {
    fn name(&self) -> &'static str {
        "Brittle"
    }

    fn category(&self) -> Category {
        Category::Decorator
    }
}

struct BrittleDrawer;

impl ScopeDrawer<Brittle> for BrittleDrawer {
    fn begin(
        &self,
        _: &Brittle,
        _: &mut DrawContext<'_>,
        canvas: &mut dyn Canvas,
    ) -> Result<(), DrawerError> {
        canvas.begin_scope(&Scope::Highlight([0, 0, 0, 255]));
        Err(DrawerError::Failed("cracked".to_string()))
    }

    fn end(
        &self,
        _: &Brittle,
        _: &mut DrawContext<'_>,
        canvas: &mut dyn Canvas,
    ) -> Result<(), DrawerError> {
        canvas.label("unreachable", Default::default());
        Ok(())
    }
}

/// A host object whose `health` getter panics.
struct Cursed;

impl Inspectable for Cursed {
    fn type_name(&self) -> &str {
        "Enemy"
    }

    fn field(&self, name: &str) -> Result<Value, MemberError> {
        match name {
            "alive" => Ok(Value::Bool(true)),
            "health" => panic!("health getter exploded"),
            "armor" => Ok(Value::Int(5)),
            _ => Err(MemberError::Missing),
        }
    }
}

/// An attribute nobody registers a drawer for.
#[derive(Debug)]
struct Tooltip;

impl Attribute for Tooltip {
    fn name(&self) -> &'static str {
        "Tooltip"
    }

    fn category(&self) -> Category {
        Category::Decorator
    }
}

fn host_with(schemas: Vec<TypeSchema>, sink: &CollectingSink) -> InspectorHost {
    let registry = schemas
        .into_iter()
        .fold(SchemaRegistry::new(), |registry, schema| registry.with(schema));
    InspectorHost::builder(registry).sink(sink.clone()).build()
}

fn faulty_host(panic: bool, sink: &CollectingSink) -> InspectorHost {
    let schema = SchemaBuilder::new("Enemy")
        .field("health", TypeClass::Int, |f| {
            f.attribute(Highlight::new([255, 0, 0, 64]))
                .attribute(Faulty { panic })
                .attribute(Group::new())
                .attribute(Indent::new(1))
        })
        .build();
    let mut host = host_with(vec![schema], sink);
    host.register_drawers(|resolver, _| resolver.register_value::<Faulty, _>(FaultyDrawer))
        .unwrap();
    host
}

fn enemy(alive: bool, health: i64) -> ObjectRef {
    MapObject::new("Enemy")
        .with_field("alive", alive)
        .with_field("health", health)
        .into_ref()
}

#[test]
fn test_scopes_close_in_reverse_when_render_fails() {
    for panic in [false, true] {
        let sink = CollectingSink::new();
        let host = faulty_host(panic, &sink);
        let mut canvas = RecordingCanvas::new();
        let report = host.draw(&EditingSession::single(enemy(true, 3)), &mut canvas);

        assert_eq!(report.faulted, 1);
        assert!(canvas.is_balanced());
        assert_eq!(
            canvas.summaries(),
            vec![
                "begin group",
                "begin highlight",
                "begin indent(1)",
                "begin horizontal",
                "end horizontal",
                "invalid health",
                "end indent(1)",
                "end highlight",
                "end group",
            ]
        );
        assert_eq!(sink.codes(), vec![DiagnosticCode::DrawerFailed]);
        assert_eq!(sink.collected()[0].attribute(), "Faulty");
    }
}

#[test]
fn test_faulted_begin_is_not_closed() {
    let sink = CollectingSink::new();
    let schema = SchemaBuilder::new("Enemy")
        .field("health", TypeClass::Int, |f| {
            f.attribute_at(2, Brittle)
                .attribute_at(1, Indent::new(2))
                .attribute_at(0, Group::titled("Stats"))
        })
        .build();
    let mut host = host_with(vec![schema], &sink);
    host.register_drawers(|resolver, _| resolver.register_scope::<Brittle, _>(BrittleDrawer))
        .unwrap();

    let mut canvas = RecordingCanvas::new();
    let report = host.draw(&EditingSession::single(enemy(true, 3)), &mut canvas);

    assert_eq!(report.faulted, 1);
    assert!(canvas.is_balanced());
    assert_eq!(
        canvas.summaries(),
        vec![
            "begin group(Stats)",
            "begin indent(2)",
            "begin highlight",
            "end highlight",
            "value health=3",
            "end indent(2)",
            "end group(Stats)",
        ]
    );
    assert_eq!(sink.codes(), vec![DiagnosticCode::DrawerFailed]);
}

#[test]
fn test_and_conditions_short_circuit_to_hidden() {
    let sink = CollectingSink::new();
    let schema = SchemaBuilder::new("Enemy")
        .field("alive", TypeClass::Bool, |f| f)
        .field("health", TypeClass::Int, |f| {
            f.attribute(Space::new(2.0, 0.0))
                .attribute(ShowIf::new("alive", true))
                .attribute(ShowIf::new("ghost", true))
        })
        .build();
    let host = host_with(vec![schema], &sink);

    let mut canvas = RecordingCanvas::new();
    let report = host.draw(&EditingSession::single(enemy(false, 3)), &mut canvas);

    assert_eq!(report.hidden, 1);
    assert_eq!(canvas.summaries(), vec!["value alive=false"]);
    // The second condition never ran, so its missing member went unnoticed.
    assert!(sink.is_empty());
}

#[test]
fn test_or_conditions() {
    let schema = SchemaBuilder::new("Player")
        .field("level", TypeClass::Int, |f| f)
        .field("cheats", TypeClass::Bool, |f| f)
        .field("ultimate", TypeClass::Text, |f| {
            f.attribute(
                ShowIf::new("level", 10)
                    .operator(ComparisonOperator::GreaterEqual)
                    .or(),
            )
            .attribute(ShowIf::new("cheats", true).or())
        })
        .build();
    let host = InspectorHost::new(SchemaRegistry::new().with(schema));

    let player = |level: i64, cheats: bool| {
        MapObject::new("Player")
            .with_field("level", level)
            .with_field("cheats", cheats)
            .with_field("ultimate", "Meteor")
            .into_ref()
    };

    let cases = [((3, false), 1), ((3, true), 0), ((12, false), 0), ((12, true), 0)];
    for ((level, cheats), hidden) in cases {
        let mut canvas = RecordingCanvas::new();
        let report = host.draw(&EditingSession::single(player(level, cheats)), &mut canvas);
        assert_eq!(report.hidden, hidden, "level={level} cheats={cheats}");
    }
}

#[test]
fn test_disabled_field_ignores_edits() {
    let schema = SchemaBuilder::new("Enemy")
        .field("alive", TypeClass::Bool, |f| f)
        .field("health", TypeClass::Int, |f| f.attribute(EnableIf::new("alive", true)))
        .build();
    let host = InspectorHost::new(SchemaRegistry::new().with(schema));
    let target = enemy(false, 3);

    let mut canvas = RecordingCanvas::new();
    canvas.script_edit("health", 9);
    let report = host.draw(&EditingSession::single(target.clone()), &mut canvas);

    assert_eq!(report.disabled, 1);
    assert_eq!(canvas.scope_trace(), vec!["begin disabled", "end disabled"]);
    let views = canvas.value_fields();
    assert!(views[0].interactive);
    assert!(!views[1].interactive);
    assert_eq!(target.get().field("health").ok(), Some(Value::Int(3)));
}

#[test]
fn test_first_failing_and_condition_wins() {
    let schema = SchemaBuilder::new("Enemy")
        .field("alive", TypeClass::Bool, |f| f)
        .field("health", TypeClass::Int, |f| {
            f.attribute(DisableIf::new("alive", false))
                .attribute(HideIf::new("alive", false))
        })
        .build();
    let host = InspectorHost::new(SchemaRegistry::new().with(schema));

    let mut canvas = RecordingCanvas::new();
    let report = host.draw(&EditingSession::single(enemy(false, 3)), &mut canvas);
    // The AND group stops at the first non-valid verdict.
    assert_eq!((report.hidden, report.disabled), (0, 1));

    let schema = SchemaBuilder::new("Enemy")
        .field("alive", TypeClass::Bool, |f| f)
        .field("health", TypeClass::Int, |f| {
            f.attribute(HideIf::new("alive", false))
                .attribute(DisableIf::new("alive", false))
        })
        .build();
    let host = InspectorHost::new(SchemaRegistry::new().with(schema));
    let report = host.draw(&EditingSession::single(enemy(false, 3)), &mut canvas);
    assert_eq!((report.hidden, report.disabled), (1, 0));
}

#[test]
fn test_mask_condition() {
    let schema = SchemaBuilder::new("Door")
        .field("flags", TypeClass::Int, |f| f)
        .field("lock", TypeClass::Text, |f| {
            f.attribute(ShowIf::new("flags", 0b0100).operator(ComparisonOperator::Mask))
        })
        .build();
    let host = InspectorHost::new(SchemaRegistry::new().with(schema));
    let door = |flags: i64| {
        MapObject::new("Door")
            .with_field("flags", flags)
            .with_field("lock", "brass")
            .into_ref()
    };

    let mut canvas = RecordingCanvas::new();
    assert_eq!(host.draw(&EditingSession::single(door(0b0110)), &mut canvas).hidden, 0);
    assert_eq!(host.draw(&EditingSession::single(door(0b0011)), &mut canvas).hidden, 1);
}

#[test]
fn test_multi_target_mixed_values() {
    let schema = SchemaBuilder::new("Enemy")
        .field("alive", TypeClass::Bool, |f| f)
        .field("health", TypeClass::Int, |f| f)
        .build();
    let host = InspectorHost::new(SchemaRegistry::new().with(schema));
    let (a, b) = (enemy(true, 3), enemy(true, 4));
    let session = EditingSession::new([a.clone(), b.clone()]);

    let mut canvas = RecordingCanvas::new();
    host.draw(&session, &mut canvas);
    assert_eq!(canvas.summaries(), vec!["value alive=true", "value health=\u{2014}"]);

    // An edit on a mixed field writes every target.
    let mut canvas = RecordingCanvas::new();
    canvas.script_edit("health", 7);
    host.draw(&session, &mut canvas);
    assert_eq!(a.get().field("health").ok(), Some(Value::Int(7)));
    assert_eq!(b.get().field("health").ok(), Some(Value::Int(7)));

    let mut canvas = RecordingCanvas::new();
    host.draw(&session, &mut canvas);
    assert_eq!(canvas.summaries(), vec!["value alive=true", "value health=7"]);
}

#[test]
fn test_mixed_condition_operand_fails_the_comparison() {
    let schema = SchemaBuilder::new("Enemy")
        .field("alive", TypeClass::Bool, |f| f)
        .field("health", TypeClass::Int, |f| f.attribute(ShowIf::new("alive", true)))
        .build();
    let host = InspectorHost::new(SchemaRegistry::new().with(schema));
    let session = EditingSession::new([enemy(true, 3), enemy(false, 3)]);

    let report = host.draw(&session, &mut RecordingCanvas::new());
    assert_eq!(report.hidden, 1);
}

#[test]
fn test_extraction_precedence() {
    let schema = SchemaBuilder::new("Stats")
        .field("score", TypeClass::Int, |f| f)
        .field("bonus", TypeClass::Int, |f| f.attribute(ShowIf::new("eligible", true)))
        .build();
    let host = InspectorHost::new(SchemaRegistry::new().with(schema));
    let stats = MapObject::new("Stats")
        .with_field("score", 10)
        .with_accessor("score", |_| Value::Int(99))
        .with_field("bonus", 5)
        .with_method("eligible", |obj| {
            Ok(Value::Bool(obj.get("score").and_then(|v| v.as_i64()) > Some(5)))
        })
        .into_ref();

    let mut canvas = RecordingCanvas::new();
    let report = host.draw(&EditingSession::single(stats), &mut canvas);

    assert_eq!(report.hidden, 0);
    assert_eq!(canvas.summaries(), vec!["value score=10", "value bonus=5"]);
}

#[test]
fn test_missing_member_reported_once() {
    let sink = CollectingSink::new();
    let schema = SchemaBuilder::new("Enemy")
        .field("health", TypeClass::Int, |f| f.attribute(ShowIf::new("ghost", true)))
        .build();
    let host = host_with(vec![schema], &sink);
    let session = EditingSession::single(enemy(true, 3));

    for _ in 0..3 {
        let report = host.draw(&session, &mut RecordingCanvas::new());
        assert_eq!(report.drawn, 1);
    }
    assert_eq!(sink.codes(), vec![DiagnosticCode::MemberNotFound]);
    assert_eq!(host.diagnostics().suppressed(), 2);
}

#[test]
fn test_panicking_getter_draws_placeholder() {
    let sink = CollectingSink::new();
    let schema = SchemaBuilder::new("Enemy")
        .field("alive", TypeClass::Bool, |f| f)
        .field("health", TypeClass::Int, |f| f.attribute(Group::titled("Stats")))
        .field("armor", TypeClass::Int, |f| f)
        .build();
    let host = host_with(vec![schema], &sink);
    let cursed = ObjectRef::from(Rc::new(Cursed));

    let mut canvas = RecordingCanvas::new();
    let report = host.draw(&EditingSession::single(cursed), &mut canvas);

    assert_eq!(report.drawn, 3);
    assert_eq!(report.faulted, 1);
    assert!(canvas.is_balanced());
    assert_eq!(
        canvas.summaries(),
        vec!["value alive=true", "invalid health", "value armor=5"]
    );
    let collected = sink.collected();
    assert_eq!(collected.len(), 1);
    assert_eq!(collected[0].code(), DiagnosticCode::DrawerFailed);
    assert_eq!(collected[0].attribute(), EXTRACT);
    assert_eq!(collected[0].field(), "Enemy.health");
}

#[test]
fn test_faulted_condition_member_is_not_missing() {
    let sink = CollectingSink::new();
    let schema = SchemaBuilder::new("Enemy")
        .field("health", TypeClass::Int, |f| f.attribute(ShowIf::new("mood", true)))
        .build();
    let host = host_with(vec![schema], &sink);
    let moody = MapObject::new("Enemy")
        .with_field("health", 3)
        .with_method("mood", |_| Err(MemberError::Faulted("mood swing".to_string())))
        .into_ref();

    let mut canvas = RecordingCanvas::new();
    let report = host.draw(&EditingSession::single(moody), &mut canvas);

    assert_eq!(report.drawn, 1);
    assert_eq!(canvas.summaries(), vec!["value health=3"]);
    assert_eq!(sink.codes(), vec![DiagnosticCode::DrawerFailed]);
    assert_eq!(sink.collected()[0].attribute(), "ShowIf");
}

#[test]
fn test_unmapped_attribute_is_skipped() {
    let sink = CollectingSink::new();
    let schema = SchemaBuilder::new("Enemy")
        .field("health", TypeClass::Int, |f| {
            f.attribute(Tooltip).attribute(Space::new(1.0, 0.0))
        })
        .build();
    let host = host_with(vec![schema], &sink);

    let mut canvas = RecordingCanvas::new();
    host.draw(&EditingSession::single(enemy(true, 3)), &mut canvas);

    assert_eq!(canvas.summaries(), vec!["space 1", "value health=3"]);
    assert_eq!(sink.codes(), vec![DiagnosticCode::UnmappedAttribute]);
}

#[test]
fn test_range_clamps_edits() {
    let schema = SchemaBuilder::new("Enemy")
        .field("health", TypeClass::Int, |f| f.attribute(Range::new(0.0, 100.0)))
        .build();
    let host = InspectorHost::new(SchemaRegistry::new().with(schema));
    let target = enemy(true, 3);

    let mut canvas = RecordingCanvas::new();
    canvas.script_edit("health", 250);
    host.draw(&EditingSession::single(target.clone()), &mut canvas);
    assert_eq!(target.get().field("health").ok(), Some(Value::Int(100)));
}

#[test]
fn test_range_on_text_is_a_type_mismatch() {
    let sink = CollectingSink::new();
    let schema = SchemaBuilder::new("Enemy")
        .field("name", TypeClass::Text, |f| f.attribute(Range::new(0.0, 1.0)))
        .build();
    let host = host_with(vec![schema], &sink);
    let target = MapObject::new("Enemy").with_field("name", "Grunt").into_ref();

    let mut canvas = RecordingCanvas::new();
    let report = host.draw(&EditingSession::single(target), &mut canvas);

    assert_eq!(report.faulted, 1);
    assert_eq!(canvas.summaries(), vec!["invalid name"]);
    assert_eq!(sink.codes(), vec![DiagnosticCode::TypeMismatch]);
}

fn scrolling_list_schema() -> TypeSchema {
    SchemaBuilder::new("Bag")
        .field("title", TypeClass::Text, |f| f.attribute(ScrollArea::new(120.0)))
        .sequence("items", |f| f.attribute(ReorderableList::new()))
        .build()
}

fn bag() -> ObjectRef {
    MapObject::new("Bag")
        .with_field("title", "Loot")
        .with_field("items", vec![Value::from("coin")])
        .into_ref()
}

fn store_len(host: &InspectorHost, name: &str) -> usize {
    host.stores()
        .stats()
        .into_iter()
        .find(|s| s.name == name)
        .map(|s| s.len)
        .unwrap_or_default()
}

#[test]
fn test_cache_identity_scopes() {
    let host = InspectorHost::new(SchemaRegistry::new().with(scrolling_list_schema()));

    // Two sessions over two instances of the same type.
    host.draw(&EditingSession::single(bag()), &mut RecordingCanvas::new());
    host.draw(&EditingSession::single(bag()), &mut RecordingCanvas::new());

    assert_eq!(store_len(&host, "scroll-offsets"), 1);
    assert_eq!(store_len(&host, "list-states"), 2);

    assert_eq!(host.selection_changed(), 2);
    assert_eq!(store_len(&host, "scroll-offsets"), 1);
    assert_eq!(store_len(&host, "list-states"), 0);
}

#[test]
fn test_scroll_offset_survives_redraw() {
    let host = InspectorHost::new(SchemaRegistry::new().with(scrolling_list_schema()));
    let session = EditingSession::single(bag());

    let mut canvas = RecordingCanvas::new();
    canvas.script_scroll(40.0);
    host.draw(&session, &mut canvas);

    let mut canvas = RecordingCanvas::new();
    host.draw(&session, &mut canvas);
    assert!(canvas.ops().contains(&CanvasOp::Scroll(40.0)));
}

#[test]
fn test_reload_disposes_each_entry_once() {
    let host = InspectorHost::new(SchemaRegistry::new().with(scrolling_list_schema()));
    let session = EditingSession::single(bag());
    host.draw(&session, &mut RecordingCanvas::new());
    assert_eq!(host.pipeline_count(), 2);

    assert_eq!(host.reload(), 2);
    assert_eq!(host.reload(), 0);
    assert_eq!(host.pipeline_count(), 0);
    for stats in host.stores().stats() {
        assert_eq!(stats.created, stats.disposed, "{}", stats.name);
    }
}

#[test]
fn test_redraw_is_idempotent() {
    let host = InspectorHost::new(SchemaRegistry::new().with(scrolling_list_schema()));
    let session = EditingSession::single(bag());

    let mut first = RecordingCanvas::new();
    host.draw(&session, &mut first);
    let stats = host.stores().stats();
    let schema = scrolling_list_schema();
    let steps: Vec<_> = schema
        .fields
        .iter()
        .map(|field| host.pipeline(field, &field.name).step_names())
        .collect();

    let mut second = RecordingCanvas::new();
    host.draw(&session, &mut second);

    assert_eq!(first.ops(), second.ops());
    assert_eq!(stats, host.stores().stats());
    let again: Vec<_> = schema
        .fields
        .iter()
        .map(|field| host.pipeline(field, &field.name).step_names())
        .collect();
    assert_eq!(steps, again);
    assert_eq!(host.pipeline_count(), 2);
}

fn node_schema() -> TypeSchema {
    SchemaBuilder::new("Node")
        .field("id", TypeClass::Int, |f| f)
        .field("next", TypeClass::Object, |f| f.attribute(InlineEditor::new()))
        .build()
}

fn chain(len: i64) -> ObjectRef {
    let mut next = Value::Object(None);
    for id in (0..len).rev() {
        next = Value::from(
            MapObject::new("Node")
                .with_field("id", id)
                .with_field("next", next)
                .into_ref(),
        );
    }
    match next {
        Value::Object(Some(head)) => head,
        _ => unreachable!("chain of length zero"),
    }
}

#[test]
fn test_inline_editor_nests_fields() {
    let host = InspectorHost::new(SchemaRegistry::new().with(node_schema()));
    let mut canvas = RecordingCanvas::new();
    host.draw(&EditingSession::single(chain(2)), &mut canvas);

    assert!(canvas.is_balanced());
    assert_eq!(
        canvas.summaries(),
        vec![
            "value id=0",
            "label next",
            "begin nested(Node)",
            "value id=1",
            "value next=None",
            "end nested(Node)",
        ]
    );
    assert_eq!(store_len(&host, "nested-editors"), 1);
}

#[test]
fn test_nesting_limit() {
    let registry = SchemaRegistry::new().with(node_schema());
    let host = InspectorHost::builder(registry)
        .options(InspectorOptions::new().max_depth(1))
        .build();
    let mut canvas = RecordingCanvas::new();
    host.draw(&EditingSession::single(chain(5)), &mut canvas);

    assert!(canvas.is_balanced());
    let helps: Vec<_> = canvas
        .summaries()
        .into_iter()
        .filter(|s| s.starts_with("help"))
        .collect();
    assert_eq!(helps, vec!["help Node: nesting limit of 1 reached"]);
}

#[test]
fn test_session_with_mixed_types() {
    let sink = CollectingSink::new();
    let host = host_with(vec![node_schema()], &sink);
    let other = MapObject::new("Door").into_ref();

    let mut canvas = RecordingCanvas::new();
    let report = host.draw(&EditingSession::new([chain(1), other]), &mut canvas);

    assert_eq!(report.drawn, 0);
    assert_eq!(canvas.summaries(), vec!["help Cannot edit objects of different types"]);
    assert_eq!(sink.codes(), vec![DiagnosticCode::AttributeUsageInvalid]);
}
