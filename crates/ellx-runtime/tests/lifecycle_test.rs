//! Suspension, disposal and mounting across a bridge's lifetime.

use ellx_runtime::{
    BridgeState, Error, Node, RenderPolicy, RuntimeConfig, register_binding,
};
use ellx_testing::TestWorld;
use ellx_testing::assertions::{assert_ended, assert_mounted_under, assert_next, assert_released};
use ellx_testing::fixtures::{hello, range_input};
use ellx_types::Props;
use futures::StreamExt;
use serde_json::json;

#[tokio::test]
async fn test_suspended_pull_resumes_on_emission() -> anyhow::Result<()> {
    let mut world = TestWorld::new();
    world.mount("slider", range_input(5))?;
    let widget = world.widget("slider")?;
    let mut out = world.host().output("slider")?;

    assert_eq!(out.next().await, Some(json!(5)));

    let user = async {
        tokio::task::yield_now().await;
        widget.input(7);
    };
    let (value, ()) = tokio::join!(out.next(), user);

    assert_eq!(value, Some(json!(7)));
    Ok(())
}

#[tokio::test]
async fn test_dispose_ends_suspended_pull() -> anyhow::Result<()> {
    let mut world = TestWorld::new();
    world.mount("slider", range_input(5))?;
    let mut out = world.host().output("slider")?;
    assert_eq!(out.recv().await?, json!(5));

    let teardown = async {
        tokio::task::yield_now().await;
        world.remove("slider")
    };
    let (received, removed) = tokio::join!(out.recv(), teardown);

    assert!(matches!(received, Err(Error::StalledConsumer { .. })));
    assert_eq!(removed?, json!(5));
    assert_ended(&mut out)?;
    Ok(())
}

#[test]
fn test_dispose_releases_surface_and_component() -> anyhow::Result<()> {
    let mut world = TestWorld::new();
    world.mount("slider", range_input(5))?;
    let widget = world.widget("slider")?;
    let surface = world.host().bridge("slider")?.surface().clone();
    assert_eq!(surface.child_count(), 1);

    world.remove("slider")?;

    assert!(widget.is_destroyed());
    assert_released(&surface)?;
    assert_eq!(world.body().child_count(), 0);

    // The widget is gone; late input reaches nobody.
    assert_eq!(widget.props().live_bindings(), 0);
    Ok(())
}

#[test]
fn test_second_binding_on_live_bridge_is_rejected() -> anyhow::Result<()> {
    let mut world = TestWorld::new();
    world.mount("slider", range_input(5))?;
    let widget = world.widget("slider")?;

    let err = widget.props().bind("value", |_| {}).unwrap_err();
    assert!(matches!(err, Error::DoubleRegistration { ref property } if property == "value"));

    // Other properties are free.
    let _min = widget.props().bind("min", |_| {})?;
    Ok(())
}

#[test]
fn test_register_binding_on_standalone_widget() -> anyhow::Result<()> {
    use ellx_runtime::{Component, ComponentOptions};
    use ellx_testing::components::RangeInput;
    use std::cell::RefCell;
    use std::rc::Rc;

    let slider = RangeInput::new(ComponentOptions {
        target: Node::element("div"),
        props: Props::new().with("value", 1),
    })?;
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let registration = register_binding(&slider, "value", move |v| sink.borrow_mut().push(v))?;
    assert_eq!(registration.property(), "value");

    slider.props().set("value", 2);
    slider.props().set("value", 2);
    slider.props().set("value", 3);
    assert_eq!(*seen.borrow(), vec![json!(2), json!(3)]);

    drop(registration);
    slider.props().set("value", 4);
    assert_eq!(seen.borrow().len(), 2);
    Ok(())
}

#[test]
fn test_render_reparents_between_hosts() -> anyhow::Result<()> {
    let mut world = TestWorld::new();
    world.mount("slider", range_input(5))?;
    let sidebar = Node::element("aside");

    world.host_mut().render("slider", &sidebar)?;
    let bridge = world.host().bridge("slider")?;

    assert_mounted_under(bridge, &sidebar)?;
    assert_eq!(world.body().child_count(), 0);
    assert_eq!(bridge.state(), BridgeState::Mounted);

    // Same host again changes nothing.
    world.host_mut().render("slider", &sidebar)?;
    assert_eq!(sidebar.child_count(), 1);
    Ok(())
}

#[test]
fn test_render_once_policy_from_config_file() -> anyhow::Result<()> {
    let config = RuntimeConfig::default().with_render_policy(RenderPolicy::Once);
    let mut world = TestWorld::with_config(config);
    assert_eq!(world.host().config().render_policy, RenderPolicy::Once);

    world.mount("slider", range_input(5))?;
    let other = Node::element("aside");
    let err = world.host_mut().render("slider", &other).unwrap_err();

    assert!(matches!(err, Error::AlreadyMounted { .. }));
    assert_mounted_under(world.host().bridge("slider")?, world.body())?;
    Ok(())
}

#[test]
fn test_output_seat_is_exclusive() -> anyhow::Result<()> {
    let mut world = TestWorld::new();
    world.mount("greeting", hello("Ada"))?;

    let mut out = world.host().output("greeting")?;
    assert!(matches!(
        world.host().output("greeting"),
        Err(Error::OutputBusy { .. })
    ));

    assert_next(&mut out, &json!("Hello Ada! (updated 1 times)"))?;
    drop(out);
    assert!(world.host().output("greeting").is_ok());
    Ok(())
}
