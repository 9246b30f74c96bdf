//! Custom assertions for bridge tests.
//!
//! Provides high-level assertions that make tests more readable:
//! - Output stream state (next value, pending, ended)
//! - Surface mounting
//! - Widget lifecycle

use anyhow::{Context, Result, bail};
use ellx_runtime::{Bridge, Node, OutputStream};
use ellx_types::Value;
use futures::stream::FusedStream;

/// Assert that the stream yields `expected` without waiting.
pub fn assert_next(stream: &mut OutputStream, expected: &Value) -> Result<()> {
    let value = stream
        .try_next()
        .context("Expected a value ready on the output stream")?;

    if &value != expected {
        bail!("Expected output {}, got {}", expected, value);
    }

    Ok(())
}

/// Assert that a pull would suspend: nothing new, stream still open.
pub fn assert_pending(stream: &mut OutputStream) -> Result<()> {
    if let Some(value) = stream.try_next() {
        bail!("Expected the output to be pending, got {}", value);
    }
    if stream.is_terminated() {
        bail!("Expected the output to be pending, but it has ended");
    }

    Ok(())
}

/// Assert that the stream has ended.
pub fn assert_ended(stream: &mut OutputStream) -> Result<()> {
    if let Some(value) = stream.try_next() {
        bail!("Expected the output to have ended, got {}", value);
    }
    if !stream.is_terminated() {
        bail!("Expected the output to have ended, but it is still open");
    }

    Ok(())
}

/// Assert that the bridge's surface is a direct child of `host`.
pub fn assert_mounted_under(bridge: &Bridge, host: &Node) -> Result<()> {
    let parent = bridge
        .surface()
        .parent()
        .context("Expected the bridge surface to be attached")?;

    if !parent.ptr_eq(host) {
        bail!(
            "Bridge {} is mounted under <{}>, not the expected host",
            bridge.id().short(),
            parent.tag()
        );
    }

    let mounted = host
        .children()
        .iter()
        .filter(|c| c.ptr_eq(bridge.surface()))
        .count();
    if mounted != 1 {
        bail!("Expected the surface once under the host, found {} times", mounted);
    }

    Ok(())
}

/// Assert that `node` has been taken out of the tree and emptied.
pub fn assert_released(node: &Node) -> Result<()> {
    if node.is_attached() {
        bail!("Expected <{}> to be detached", node.tag());
    }
    if node.child_count() != 0 {
        bail!(
            "Expected <{}> to be empty, it still has {} children",
            node.tag(),
            node.child_count()
        );
    }

    Ok(())
}
