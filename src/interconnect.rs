//! Point-to-point wiring between two simulated models.
//!
//! Each [`Wire`] copies one output pin of one model onto the matching input
//! pin of the other. A testbench calls [`Interconnect::propagate`] at the
//! start of every tick, before any model's clock advances, so every model
//! sees the others' outputs from the previous edge.

use log::trace;

pub struct Wire<A, B> {
    name: &'static str,
    drive: fn(&mut A, &mut B),
}

impl<A, B> Wire<A, B> {
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<A, B> std::fmt::Debug for Wire<A, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Wire").field(&self.name).finish()
    }
}

#[derive(Debug)]
pub struct Interconnect<A, B> {
    wires: Vec<Wire<A, B>>,
}

impl<A, B> Default for Interconnect<A, B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A, B> Interconnect<A, B> {
    pub fn new() -> Self {
        Self { wires: Vec::new() }
    }

    /// Adds a named wire. Each input pin gets at most one driver, so names
    /// must be unique.
    pub fn wire(mut self, name: &'static str, drive: fn(&mut A, &mut B)) -> Self {
        debug_assert!(
            self.wires.iter().all(|w| w.name != name),
            "wire `{name}` driven twice"
        );
        self.wires.push(Wire { name, drive });
        self
    }

    pub fn wires(&self) -> &[Wire<A, B>] {
        &self.wires
    }

    pub fn len(&self) -> usize {
        self.wires.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wires.is_empty()
    }

    pub fn propagate(&self, a: &mut A, b: &mut B) {
        for wire in &self.wires {
            trace!("propagate {}", wire.name);
            (wire.drive)(a, b);
        }
    }
}
