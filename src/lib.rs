//! # dbcparser: Controller Area Network (CAN) DBC file parser
//!
//! Parses the line-oriented DBC grammar describing a CAN bus's nodes,
//! frames (messages), and signals (bit-fields within frames), along with
//! comments, value enumerations, and attribute definitions.
//!
//! ## Layers
//!
//! - **Tokenizer** ([`tokenizer::LineTokenizer`]): splits a seekable stream
//!   into logical lines. A quoted string may contain raw newlines, so a
//!   logical line can span several physical lines.
//! - **Records** ([`record::Record`]): one typed variant per statement
//!   (`BO_`, `SG_`, `CM_ ...`, `BU_:`, `VAL_`, `VAL_TABLE_`, `BA_DEF_*`,
//!   `BA_`, `BA_DEF_DEF_`, `NS_:`, `BS_:`), built from a logical line by
//!   the grammar in `grammar.pest`.
//! - **File parser** ([`parser::DbcParser`]): single forward pass that
//!   classifies lines, drops the tab-indented `NS_:`/`BS_:` continuation
//!   blocks, and links each signal to the most recently seen frame.
//! - **Containers** ([`bus::Bus`]): record list folded into a
//!   bus/node/frame/signal graph.
//!
//! ## Usage
//!
//! ```
//! let bus = dbcparser::load_str(concat!(
//!     "BU_: DCDC INV_1\n",
//!     "BO_ 263 Batt107: 4 DCDC\n",
//!     " SG_ Current : 0|16@1- (0.1,0) [-100|100] \"A\" INV_1\n",
//! )).expect("parse");
//! let frame = &bus.frames[&263];
//! assert_eq!(frame.name, "Batt107");
//! assert_eq!(frame.signals["Current"].signal.factor, 0.1);
//! ```
//!
//! Physical-value conversion, bus simulation, and DBC generation are out of
//! scope; consumers get typed records and containers only.

pub mod bus;
pub mod error;
pub mod parser;
pub mod record;
pub mod tokenizer;
pub mod value;

pub use bus::{Bus, FrameDef, NodeDef, SignalDef};
pub use error::DbcError;
pub use parser::DbcParser;
pub use record::{
    DefaultValue, Define, DefineType, Enumeration, Frame, FrameAttribute, FrameComment,
    GlobalAttribute, Multiplex, NodeAttribute, NodeComment, NodeList, Record, Signal,
    SignalAttribute, SignalComment, ValueTable, NULL_NODE,
};
pub use tokenizer::{LineTokenizer, DEFAULT_CHUNK_SIZE};
pub use value::AttrValue;

use std::io::{Cursor, Read, Seek};

/// Parse a DBC stream and assemble the bus graph in one call.
pub fn load<S: Read + Seek>(stream: S) -> Result<Bus, DbcError> {
    let records = DbcParser::new().parse(stream)?;
    Ok(Bus::from_records(&records))
}

/// [`load`] over in-memory source text.
pub fn load_str(source: &str) -> Result<Bus, DbcError> {
    load(Cursor::new(source))
}
