//! Cell evaluation through `ComponentHost`.

use ellx_runtime::{
    ComponentHost, ComponentRegistry, Error, Evaluation, Node, RenderPolicy, RuntimeConfig,
};
use ellx_testing::TestWorld;
use ellx_testing::assertions::{assert_ended, assert_mounted_under, assert_next, assert_pending};
use ellx_testing::components;
use ellx_testing::fixtures::{hello, range_input, tagged, text_input};
use ellx_types::{ComponentSpec, Props};
use serde_json::json;

#[test]
fn test_evaluate_creates_then_updates_in_place() -> anyhow::Result<()> {
    let mut world = TestWorld::new();
    world.mount("greeting", hello("Ada"))?;
    let id = world.host().bridge("greeting")?.id();
    let mut out = world.host().output("greeting")?;
    assert_next(&mut out, &json!("Hello Ada! (updated 1 times)"))?;

    let outcome = world.evaluate("greeting", hello("Grace"))?;

    assert_eq!(outcome, Evaluation::Updated);
    assert_eq!(world.host().bridge("greeting")?.id(), id);
    assert_next(&mut out, &json!("Hello Grace! (updated 2 times)"))?;
    assert_eq!(world.body().text_content(), "Hello Grace! (updated 2 times)");
    Ok(())
}

#[test]
fn test_rebuild_carries_value_and_position() -> anyhow::Result<()> {
    let mut world = TestWorld::new();
    world.mount("cell", range_input(5))?;
    world.widget("cell")?.input(12);
    let old = world.widget("cell")?;
    let mut old_out = world.host().output("cell")?;

    let display = ComponentSpec::named(components::PRETTY)?;
    let outcome = world.evaluate("cell", display)?;

    assert_eq!(outcome, Evaluation::Rebuilt);
    assert!(old.is_destroyed());
    assert_ended(&mut old_out)?;

    assert_eq!(world.host().value("cell")?, json!(12));
    assert_mounted_under(world.host().bridge("cell")?, world.body())?;
    assert_eq!(world.body().child_count(), 1);
    assert_eq!(world.body().text_content(), "12");
    Ok(())
}

#[test]
fn test_rebuild_keeps_place_among_siblings() -> anyhow::Result<()> {
    let mut world = TestWorld::new();
    world.mount("a", hello("Ada"))?;
    world.mount("b", text_input("b"))?;
    let position = |world: &TestWorld| -> anyhow::Result<Option<usize>> {
        let surface = world.host().bridge("a")?.surface().clone();
        Ok(world.body().children().iter().position(|c| c.ptr_eq(&surface)))
    };
    assert_eq!(position(&world)?, Some(0));

    assert_eq!(world.evaluate("a", range_input(3))?, Evaluation::Rebuilt);

    assert_eq!(position(&world)?, Some(0));
    assert_eq!(world.body().child_count(), 2);
    assert_mounted_under(world.host().bridge("b")?, world.body())?;
    Ok(())
}

#[test]
fn test_remount_in_place_under_once_policy() -> anyhow::Result<()> {
    let config = RuntimeConfig::default().with_render_policy(RenderPolicy::Once);
    let mut world = TestWorld::with_config(config);
    let id = world.mount("s", range_input(5))?;

    assert_eq!(world.mount("s", range_input(6))?, id);
    assert_eq!(world.host().value("s")?, json!(6));

    let old = world.widget("s")?;
    let rebuilt = world.mount("s", hello("Ada"))?;
    assert_ne!(rebuilt, id);
    assert!(old.is_destroyed());
    assert_mounted_under(world.host().bridge("s")?, world.body())?;
    assert_eq!(world.body().child_count(), 1);

    // Moving elsewhere is refused before the new props land.
    let aside = Node::element("aside");
    let err = world.host_mut().mount("s", hello("Grace"), &aside).unwrap_err();
    assert!(matches!(err, Error::AlreadyMounted { .. }));
    assert_eq!(world.host().value("s")?, json!("Hello Ada! (updated 1 times)"));
    Ok(())
}

#[test]
fn test_rebuild_prefers_explicit_value() -> anyhow::Result<()> {
    let mut world = TestWorld::new();
    world.mount("cell", range_input(5))?;

    world.evaluate("cell", text_input("typed"))?;
    assert_eq!(world.host().value("cell")?, json!("typed"));
    Ok(())
}

#[test]
fn test_failed_rebuild_keeps_old_bridge() -> anyhow::Result<()> {
    let mut world = TestWorld::new();
    world.mount("cell", text_input("x"))?;
    let id = world.host().bridge("cell")?.id();

    let broken = range_input(5).with_prop("min", 10).with_prop("max", 0);
    let err = world.evaluate("cell", broken).unwrap_err();

    assert!(err.to_string().contains("exceeds max"));
    assert_eq!(world.host().bridge("cell")?.id(), id);
    assert_eq!(world.host().value("cell")?, json!("x"));
    assert!(!world.widget("cell")?.is_destroyed());
    Ok(())
}

#[test]
fn test_tagged_props_resolve_through_marker() -> anyhow::Result<()> {
    let mut host = ComponentHost::with_registry(components::default_registry()?);
    let props = tagged(range_input(5));
    assert!(props.contains_key("__EllxMeta__"));

    assert_eq!(host.evaluate_props("a", props)?, Evaluation::Created);
    assert_eq!(host.value("a")?, json!(5));

    let plain = Props::new().with("value", 1);
    assert!(matches!(
        host.evaluate_props("b", plain),
        Err(Error::NotAComponent(_))
    ));
    Ok(())
}

#[test]
fn test_unknown_component_and_cell() -> anyhow::Result<()> {
    let mut host = ComponentHost::with_registry(ComponentRegistry::new());

    let err = host.evaluate("a", range_input(1)).unwrap_err();
    assert!(matches!(err, Error::UnknownComponent(ref tag) if tag == "range_input"));
    assert!(host.is_empty());

    assert!(matches!(host.value("nope"), Err(Error::UnknownCell(_))));
    assert!(matches!(
        host.update("nope", &Props::new()),
        Err(Error::UnknownCell(_))
    ));
    assert!(matches!(host.remove("nope"), Err(Error::UnknownCell(_))));
    Ok(())
}

#[test]
fn test_update_through_host_reaches_widget() -> anyhow::Result<()> {
    let mut world = TestWorld::new();
    world.mount("slider", range_input(50))?;
    let mut out = world.host().output("slider")?;
    assert_next(&mut out, &json!(50))?;

    world
        .host_mut()
        .update("slider", &Props::new().with("value", 30))?;
    assert_next(&mut out, &json!(30))?;

    world.host_mut().update("slider", &Props::new())?;
    assert_pending(&mut out)?;
    Ok(())
}

#[test]
fn test_values_and_shutdown() -> anyhow::Result<()> {
    let mut world = TestWorld::new();
    world.mount("b", text_input("hi"))?;
    world.mount("a", range_input(3))?;

    assert_eq!(world.host().cells(), vec!["a", "b"]);
    assert_eq!(
        world.host().values().into_value(),
        json!({"a": 3, "b": "hi"})
    );

    let disposed = world.host_mut().shutdown();
    assert_eq!(disposed, 2);
    assert!(world.host().is_empty());
    assert_eq!(world.widgets().live(), 0);
    assert_eq!(world.body().child_count(), 0);
    Ok(())
}

#[test]
fn test_mount_into_own_surface_is_rejected() -> anyhow::Result<()> {
    let mut world = TestWorld::new();
    world.mount("slider", range_input(5))?;
    let inner: Node = world.host().bridge("slider")?.surface().children().remove(0);

    let err = world.host_mut().render("slider", &inner).unwrap_err();
    assert!(matches!(err, Error::InvalidMount { .. }));
    Ok(())
}
