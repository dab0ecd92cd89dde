//! Typed records for each DBC statement, built from logical lines via the
//! grammar in `grammar.pest`.
//!
//! [`Record::from_line`] is the classification entry point: a line that no
//! grammar alternative recognizes is `Ok(None)` (never an error); a line
//! that matches but carries a field literal that cannot be coerced to its
//! declared type fails hard. Every field is fully typed after construction;
//! the only mutation a record ever sees is the Signal→Frame link, set once
//! by the file parser.

use crate::error::DbcError;
use crate::value::AttrValue;
use indexmap::IndexMap;
use pest::iterators::{Pair, Pairs};
use pest::Parser;
use pest_derive::Parser as PestParser;

#[derive(PestParser)]
#[grammar = "grammar.pest"]
struct LineGrammar;

/// Sentinel node name meaning "no sender" / "no specific receiver".
/// Coerces to `None` in transmitter position and is filtered out of
/// receiver and node lists.
pub const NULL_NODE: &str = "Vector__XXX";

/// One parsed DBC statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Frame(Frame),
    Signal(Signal),
    SignalComment(SignalComment),
    FrameComment(FrameComment),
    NodeComment(NodeComment),
    NodeList(NodeList),
    Enumeration(Enumeration),
    ValueTable(ValueTable),
    GlobalDefine(Define),
    SignalDefine(Define),
    FrameDefine(Define),
    NodeDefine(Define),
    GlobalAttribute(GlobalAttribute),
    SignalAttribute(SignalAttribute),
    FrameAttribute(FrameAttribute),
    NodeAttribute(NodeAttribute),
    DefaultValue(DefaultValue),
    /// `NS_:` marker; its tab-indented block carries no grammar.
    NewSymbols,
    /// `BS_:` marker; same continuation handling as `NS_:`.
    BitTiming,
}

/// A CAN message: `BO_ <address> <name>: <dlc> <transmitter>`.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub address: u32,
    pub name: String,
    /// Data length code (payload bytes).
    pub dlc: u8,
    /// `None` when the transmitter is the null-node sentinel.
    pub transmitter: Option<String>,
}

/// A bit-field within a frame's payload:
/// `SG_ <name> [mux] : <start>|<length>@<order><sign> (<factor>,<offset>) [<min>|<max>] "<unit>" <receivers>`.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub name: String,
    pub mux: Option<Multiplex>,
    pub start_bit: u8,
    pub length: u8,
    /// `@1` is little-endian (Intel), `@0` big-endian (Motorola). The raw
    /// flag decides the bit-numbering convention, so it is kept verbatim.
    pub little_endian: bool,
    /// `-` signed, `+` unsigned.
    pub signed: bool,
    pub factor: f64,
    pub offset: f64,
    pub minimum: f64,
    pub maximum: f64,
    pub unit: String,
    /// Receiver node names, null-node sentinel filtered out.
    pub receivers: Vec<String>,
    /// Address of the owning frame. `None` at construction; the file parser
    /// sets it once, to the most recently seen frame. A signal appearing
    /// before any frame stays unlinked.
    pub frame_address: Option<u32>,
}

/// Multiplexing role of a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Multiplex {
    /// `M`: this signal's value selects which multiplexed signals are active.
    Multiplexor,
    /// `m<n>`: active when the multiplexor's value equals `n`.
    Multiplexed(u32),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignalComment {
    pub address: u32,
    pub name: String,
    /// May contain raw newlines.
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameComment {
    pub address: u32,
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeComment {
    pub node: String,
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeList {
    pub nodes: Vec<String>,
}

/// `VAL_`: code→label mapping scoped to one signal.
#[derive(Debug, Clone, PartialEq)]
pub struct Enumeration {
    pub address: u32,
    pub signal: String,
    pub entries: IndexMap<i64, String>,
}

/// `VAL_TABLE_`: a named, reusable code→label mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueTable {
    pub table: String,
    pub entries: IndexMap<i64, String>,
}

/// `BA_DEF_`-family attribute definition.
#[derive(Debug, Clone, PartialEq)]
pub struct Define {
    pub name: String,
    pub kind: DefineType,
}

/// Coarse type of a defined attribute, with its type-specific parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum DefineType {
    /// `INT min max` and `HEX min max` (both plain integers).
    Int { min: i64, max: i64 },
    /// `FLOAT min max`.
    Float { min: f64, max: f64 },
    /// `STRING`: free text, no parameters.
    Str,
    /// `BOOL True False`: pair of boolean literals.
    Bool(bool, bool),
    /// `ENUM "a","b",...`: allowed labels, in declaration order.
    Enum(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct GlobalAttribute {
    pub name: String,
    pub value: AttrValue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignalAttribute {
    pub name: String,
    pub address: u32,
    pub signal: String,
    pub value: AttrValue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameAttribute {
    pub name: String,
    pub address: u32,
    pub value: AttrValue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeAttribute {
    pub name: String,
    pub node: String,
    pub value: AttrValue,
}

/// `BA_DEF_DEF_ "<name>" <value>;`
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultValue {
    pub name: String,
    pub value: AttrValue,
}

impl Record {
    /// Classify one logical line.
    ///
    /// `Ok(None)` when no statement grammar matches; `Err` only when a
    /// matched statement carries an uncoercible field literal.
    pub fn from_line(line: &str) -> Result<Option<Record>, DbcError> {
        let mut pairs = match LineGrammar::parse(Rule::dbc_line, line) {
            Ok(pairs) => pairs,
            Err(_) => return Ok(None),
        };
        let line_pair = match pairs.next() {
            Some(p) => p,
            None => return Ok(None),
        };
        let statement = match line_pair.into_inner().find(|p| p.as_rule() != Rule::EOI) {
            Some(p) => p,
            None => return Ok(None),
        };
        let record = match statement.as_rule() {
            Rule::frame => Record::Frame(build_frame(statement)?),
            Rule::signal => Record::Signal(build_signal(statement)?),
            Rule::signal_comment => Record::SignalComment(build_signal_comment(statement)?),
            Rule::frame_comment => Record::FrameComment(build_frame_comment(statement)?),
            Rule::node_comment => Record::NodeComment(build_node_comment(statement)?),
            Rule::node_list => Record::NodeList(NodeList {
                nodes: node_names(statement),
            }),
            Rule::enumeration => Record::Enumeration(build_enumeration(statement)?),
            Rule::value_table => Record::ValueTable(build_value_table(statement)?),
            Rule::global_define => Record::GlobalDefine(build_define(statement)?),
            Rule::signal_define => Record::SignalDefine(build_define(statement)?),
            Rule::frame_define => Record::FrameDefine(build_define(statement)?),
            Rule::node_define => Record::NodeDefine(build_define(statement)?),
            Rule::global_attribute => Record::GlobalAttribute(build_global_attribute(statement)?),
            Rule::signal_attribute => Record::SignalAttribute(build_signal_attribute(statement)?),
            Rule::frame_attribute => Record::FrameAttribute(build_frame_attribute(statement)?),
            Rule::node_attribute => Record::NodeAttribute(build_node_attribute(statement)?),
            Rule::default_value => Record::DefaultValue(build_default_value(statement)?),
            Rule::symbol_block => Record::NewSymbols,
            Rule::bit_timing => Record::BitTiming,
            _ => return Ok(None),
        };
        Ok(Some(record))
    }
}

// ==================== builders ====================

fn build_frame(pair: Pair<Rule>) -> Result<Frame, DbcError> {
    let mut it = pair.into_inner();
    let address = num_field(&mut it, "frame address")?;
    let name = text_field(&mut it, "frame name")?;
    let dlc = num_field(&mut it, "frame dlc")?;
    let transmitter = filter_null_node(&text_field(&mut it, "frame transmitter")?);
    Ok(Frame {
        address,
        name,
        dlc,
        transmitter,
    })
}

fn build_signal(pair: Pair<Rule>) -> Result<Signal, DbcError> {
    let mut it = pair.into_inner();
    let name = text_field(&mut it, "signal name")?;

    let mut next = next_field(&mut it, "signal start bit")?;
    let mux = if next.as_rule() == Rule::mux {
        let mux = build_mux(&next)?;
        next = next_field(&mut it, "signal start bit")?;
        Some(mux)
    } else {
        None
    };

    let start_bit = coerce_num(&next, "signal start bit")?;
    let length = num_field(&mut it, "signal length")?;

    let order = next_field(&mut it, "signal byte order")?;
    let little_endian = match order.as_str() {
        "1" => true,
        "0" => false,
        other => {
            return Err(DbcError::Field {
                field: "signal byte order",
                literal: other.to_string(),
            })
        }
    };
    // `+` unsigned, `-` signed; the grammar admits nothing else.
    let signed = next_field(&mut it, "signal sign")?.as_str() == "-";

    let factor = num_field(&mut it, "signal factor")?;
    let offset = num_field(&mut it, "signal offset")?;
    let minimum = num_field(&mut it, "signal minimum")?;
    let maximum = num_field(&mut it, "signal maximum")?;
    let unit = string_text(next_field(&mut it, "signal unit")?);
    let receivers = match it.next() {
        Some(list) => node_names(list),
        None => Vec::new(),
    };

    Ok(Signal {
        name,
        mux,
        start_bit,
        length,
        little_endian,
        signed,
        factor,
        offset,
        minimum,
        maximum,
        unit,
        receivers,
        frame_address: None,
    })
}

fn build_mux(pair: &Pair<Rule>) -> Result<Multiplex, DbcError> {
    let raw = pair.as_str();
    if raw == "M" {
        return Ok(Multiplex::Multiplexor);
    }
    raw[1..]
        .parse()
        .map(Multiplex::Multiplexed)
        .map_err(|_| DbcError::Field {
            field: "signal mux index",
            literal: raw.to_string(),
        })
}

fn build_signal_comment(pair: Pair<Rule>) -> Result<SignalComment, DbcError> {
    let mut it = pair.into_inner();
    Ok(SignalComment {
        address: num_field(&mut it, "comment address")?,
        name: text_field(&mut it, "comment signal name")?,
        comment: string_text(next_field(&mut it, "comment text")?),
    })
}

fn build_frame_comment(pair: Pair<Rule>) -> Result<FrameComment, DbcError> {
    let mut it = pair.into_inner();
    Ok(FrameComment {
        address: num_field(&mut it, "comment address")?,
        comment: string_text(next_field(&mut it, "comment text")?),
    })
}

fn build_node_comment(pair: Pair<Rule>) -> Result<NodeComment, DbcError> {
    let mut it = pair.into_inner();
    Ok(NodeComment {
        node: text_field(&mut it, "comment node")?,
        comment: string_text(next_field(&mut it, "comment text")?),
    })
}

fn build_enumeration(pair: Pair<Rule>) -> Result<Enumeration, DbcError> {
    let mut it = pair.into_inner();
    Ok(Enumeration {
        address: num_field(&mut it, "enumeration address")?,
        signal: text_field(&mut it, "enumeration signal")?,
        entries: enum_entries(it)?,
    })
}

fn build_value_table(pair: Pair<Rule>) -> Result<ValueTable, DbcError> {
    let mut it = pair.into_inner();
    Ok(ValueTable {
        table: text_field(&mut it, "value table name")?,
        entries: enum_entries(it)?,
    })
}

fn enum_entries(pairs: Pairs<Rule>) -> Result<IndexMap<i64, String>, DbcError> {
    let mut entries = IndexMap::new();
    for entry in pairs {
        if entry.as_rule() != Rule::enum_entry {
            continue;
        }
        let mut it = entry.into_inner();
        let code = num_field(&mut it, "enumeration code")?;
        let label = string_text(next_field(&mut it, "enumeration label")?);
        // Duplicate codes: last write wins, first-appearance order kept.
        entries.insert(code, label);
    }
    Ok(entries)
}

fn build_define(pair: Pair<Rule>) -> Result<Define, DbcError> {
    let mut it = pair.into_inner();
    let name = string_text(next_field(&mut it, "define name")?);
    let tag = text_field(&mut it, "define type")?;
    let params = it.next().map(|p| p.as_str()).unwrap_or_default();
    Ok(Define {
        name,
        kind: DefineType::from_tag(&tag, params)?,
    })
}

impl DefineType {
    /// Parse a definition's type tag plus its type-specific parameter text.
    /// An unknown tag on a matched line is a hard error, not a no-match.
    fn from_tag(tag: &str, params: &str) -> Result<DefineType, DbcError> {
        let params = params.trim();
        match tag {
            "INT" | "HEX" => {
                let (min, max) = num_pair(params, "define bound")?;
                Ok(DefineType::Int { min, max })
            }
            "FLOAT" => {
                let (min, max) = num_pair(params, "define bound")?;
                Ok(DefineType::Float { min, max })
            }
            "STRING" => Ok(DefineType::Str),
            "BOOL" => {
                let mut it = params.split_whitespace();
                let first = bool_token(it.next(), params)?;
                let second = bool_token(it.next(), params)?;
                Ok(DefineType::Bool(first, second))
            }
            "ENUM" => Ok(DefineType::Enum(quoted_labels(params))),
            other => Err(DbcError::UnknownDefineType(other.to_string())),
        }
    }
}

fn num_pair<T: std::str::FromStr>(
    params: &str,
    field: &'static str,
) -> Result<(T, T), DbcError> {
    let mut it = params.split_whitespace();
    let min = num_token(it.next(), field, params)?;
    let max = num_token(it.next(), field, params)?;
    Ok((min, max))
}

fn num_token<T: std::str::FromStr>(
    token: Option<&str>,
    field: &'static str,
    params: &str,
) -> Result<T, DbcError> {
    let token = token.ok_or_else(|| DbcError::Field {
        field,
        literal: params.to_string(),
    })?;
    token.parse().map_err(|_| DbcError::Field {
        field,
        literal: token.to_string(),
    })
}

fn bool_token(token: Option<&str>, params: &str) -> Result<bool, DbcError> {
    match token {
        Some("True") => Ok(true),
        Some("False") => Ok(false),
        other => Err(DbcError::Field {
            field: "define boolean",
            literal: other.unwrap_or(params).to_string(),
        }),
    }
}

// ENUM labels: quoted strings in declaration order. Strings contain no
// escaped quotes, so every odd split segment is a label.
fn quoted_labels(params: &str) -> Vec<String> {
    params
        .split('"')
        .skip(1)
        .step_by(2)
        .map(str::to_string)
        .collect()
}

fn build_global_attribute(pair: Pair<Rule>) -> Result<GlobalAttribute, DbcError> {
    let mut it = pair.into_inner();
    Ok(GlobalAttribute {
        name: string_text(next_field(&mut it, "attribute name")?),
        value: attr_value(&mut it)?,
    })
}

fn build_signal_attribute(pair: Pair<Rule>) -> Result<SignalAttribute, DbcError> {
    let mut it = pair.into_inner();
    Ok(SignalAttribute {
        name: string_text(next_field(&mut it, "attribute name")?),
        address: num_field(&mut it, "attribute address")?,
        signal: text_field(&mut it, "attribute signal")?,
        value: attr_value(&mut it)?,
    })
}

fn build_frame_attribute(pair: Pair<Rule>) -> Result<FrameAttribute, DbcError> {
    let mut it = pair.into_inner();
    Ok(FrameAttribute {
        name: string_text(next_field(&mut it, "attribute name")?),
        address: num_field(&mut it, "attribute address")?,
        value: attr_value(&mut it)?,
    })
}

fn build_node_attribute(pair: Pair<Rule>) -> Result<NodeAttribute, DbcError> {
    let mut it = pair.into_inner();
    Ok(NodeAttribute {
        name: string_text(next_field(&mut it, "attribute name")?),
        node: text_field(&mut it, "attribute node")?,
        value: attr_value(&mut it)?,
    })
}

fn build_default_value(pair: Pair<Rule>) -> Result<DefaultValue, DbcError> {
    let mut it = pair.into_inner();
    Ok(DefaultValue {
        name: string_text(next_field(&mut it, "default name")?),
        value: attr_value(&mut it)?,
    })
}

// ==================== field helpers ====================

fn next_field<'a>(
    it: &mut Pairs<'a, Rule>,
    field: &'static str,
) -> Result<Pair<'a, Rule>, DbcError> {
    it.next().ok_or(DbcError::Field {
        field,
        literal: String::new(),
    })
}

fn text_field(it: &mut Pairs<Rule>, field: &'static str) -> Result<String, DbcError> {
    Ok(next_field(it, field)?.as_str().to_string())
}

fn num_field<T: std::str::FromStr>(
    it: &mut Pairs<Rule>,
    field: &'static str,
) -> Result<T, DbcError> {
    let pair = next_field(it, field)?;
    coerce_num(&pair, field)
}

fn coerce_num<T: std::str::FromStr>(
    pair: &Pair<Rule>,
    field: &'static str,
) -> Result<T, DbcError> {
    pair.as_str().parse().map_err(|_| DbcError::Field {
        field,
        literal: pair.as_str().to_string(),
    })
}

fn attr_value(it: &mut Pairs<Rule>) -> Result<AttrValue, DbcError> {
    Ok(AttrValue::infer(
        next_field(it, "attribute value")?.as_str(),
    ))
}

fn string_text(pair: Pair<Rule>) -> String {
    pair.into_inner()
        .next()
        .map(|inner| inner.as_str().to_string())
        .unwrap_or_default()
}

fn filter_null_node(name: &str) -> Option<String> {
    (name != NULL_NODE).then(|| name.to_string())
}

fn node_names(pair: Pair<Rule>) -> Vec<String> {
    pair.into_inner()
        .filter(|p| p.as_rule() == Rule::ident)
        .map(|p| p.as_str())
        .filter(|s| !s.is_empty() && *s != NULL_NODE)
        .map(str::to_string)
        .collect()
}
