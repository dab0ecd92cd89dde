//! Assemble the parser's record list into Bus / Node / Frame / Signal
//! containers.
//!
//! The fold is tolerant: comments and enumerations whose target was never
//! declared are ignored (hand-edited files reorder statements freely), and
//! signals without a frame link have no home and are skipped.

use crate::record::{Frame, Record, Signal};
use indexmap::IndexMap;

/// A CAN bus: nodes by name, frames by address, both in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bus {
    pub nodes: IndexMap<String, NodeDef>,
    pub frames: IndexMap<u32, FrameDef>,
}

/// An ECU connected to the bus.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDef {
    pub name: String,
    pub comment: Option<String>,
}

/// A frame together with its signals, keyed by signal name in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameDef {
    pub address: u32,
    pub name: String,
    pub dlc: u8,
    pub transmitter: Option<String>,
    pub comment: Option<String>,
    pub signals: IndexMap<String, SignalDef>,
}

/// A signal plus the comment and value enumeration attached to it.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalDef {
    pub signal: Signal,
    pub comment: Option<String>,
    pub enums: IndexMap<i64, String>,
}

impl From<Frame> for FrameDef {
    fn from(frame: Frame) -> Self {
        FrameDef {
            address: frame.address,
            name: frame.name,
            dlc: frame.dlc,
            transmitter: frame.transmitter,
            comment: None,
            signals: IndexMap::new(),
        }
    }
}

impl Bus {
    /// Fold an ordered record list into a bus graph.
    pub fn from_records(records: &[Record]) -> Bus {
        let mut bus = Bus::default();
        for record in records {
            match record {
                Record::NodeList(list) => {
                    for name in &list.nodes {
                        bus.nodes.entry(name.clone()).or_insert_with(|| NodeDef {
                            name: name.clone(),
                            comment: None,
                        });
                    }
                }
                Record::Frame(frame) => {
                    bus.frames
                        .insert(frame.address, FrameDef::from(frame.clone()));
                }
                Record::Signal(signal) => {
                    let Some(address) = signal.frame_address else {
                        continue;
                    };
                    if let Some(frame) = bus.frames.get_mut(&address) {
                        frame.signals.insert(
                            signal.name.clone(),
                            SignalDef {
                                signal: signal.clone(),
                                comment: None,
                                enums: IndexMap::new(),
                            },
                        );
                    }
                }
                Record::SignalComment(comment) => {
                    if let Some(def) = bus.signal_mut(comment.address, &comment.name) {
                        def.comment = Some(comment.comment.clone());
                    }
                }
                Record::FrameComment(comment) => {
                    if let Some(frame) = bus.frames.get_mut(&comment.address) {
                        frame.comment = Some(comment.comment.clone());
                    }
                }
                Record::NodeComment(comment) => {
                    if let Some(node) = bus.nodes.get_mut(&comment.node) {
                        node.comment = Some(comment.comment.clone());
                    }
                }
                Record::Enumeration(enumeration) => {
                    if let Some(def) = bus.signal_mut(enumeration.address, &enumeration.signal) {
                        def.enums = enumeration.entries.clone();
                    }
                }
                _ => {}
            }
        }
        bus
    }

    pub fn frame_by_name(&self, name: &str) -> Option<&FrameDef> {
        self.frames.values().find(|frame| frame.name == name)
    }

    fn signal_mut(&mut self, address: u32, name: &str) -> Option<&mut SignalDef> {
        self.frames.get_mut(&address)?.signals.get_mut(name)
    }
}
