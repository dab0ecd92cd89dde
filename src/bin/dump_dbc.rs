//! Dump parsed DBC content.
//!
//! Usage:
//!   dump_dbc [OPTIONS] [FILE.dbc ...]
//!   dump_dbc < file.dbc
//!
//! Options:
//!   --records, -r  Print the raw record list instead of the bus summary
//!   --strict, -s   Fail on unrecognized lines
//!
//! If no files are given, reads from stdin.

use dbcparser::{Bus, DbcParser, Record};
use std::io::{self, Read};

fn print_records(records: &[Record]) {
    for record in records {
        println!("{:?}", record);
    }
}

fn print_bus(bus: &Bus) {
    if !bus.nodes.is_empty() {
        println!("nodes:");
        for node in bus.nodes.values() {
            match &node.comment {
                Some(comment) => println!("  {}  # {}", node.name, comment),
                None => println!("  {}", node.name),
            }
        }
    }
    for frame in bus.frames.values() {
        println!(
            "frame {} (0x{:x}) dlc={} tx={}",
            frame.name,
            frame.address,
            frame.dlc,
            frame.transmitter.as_deref().unwrap_or("-")
        );
        if let Some(comment) = &frame.comment {
            println!("  # {}", comment);
        }
        for def in frame.signals.values() {
            let s = &def.signal;
            println!(
                "  signal {} {}|{}@{}{} ({},{}) [{}|{}] {:?} -> {}",
                s.name,
                s.start_bit,
                s.length,
                if s.little_endian { "1" } else { "0" },
                if s.signed { "-" } else { "+" },
                s.factor,
                s.offset,
                s.minimum,
                s.maximum,
                s.unit,
                if s.receivers.is_empty() {
                    "-".to_string()
                } else {
                    s.receivers.join(",")
                },
            );
            for (code, label) in &def.enums {
                println!("    {} = {:?}", code, label);
            }
        }
    }
}

fn dump(parser: &DbcParser, source: &str, records_only: bool) -> anyhow::Result<()> {
    let records = parser.parse_str(source)?;
    if records_only {
        print_records(&records);
    } else {
        print_bus(&Bus::from_records(&records));
    }
    Ok(())
}

fn take_flag(args: &mut Vec<String>, long: &str, short: &str) -> bool {
    if let Some(pos) = args.iter().position(|a| a == long || a == short) {
        args.remove(pos);
        true
    } else {
        false
    }
}

fn main() -> anyhow::Result<()> {
    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let records_only = take_flag(&mut args, "--records", "-r");
    let strict = take_flag(&mut args, "--strict", "-s");
    let parser = if strict {
        DbcParser::strict()
    } else {
        DbcParser::new()
    };

    if args.is_empty() {
        let mut source = String::new();
        io::stdin().read_to_string(&mut source)?;
        return dump(&parser, &source, records_only);
    }

    for path in &args {
        let source = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("{}: {}", path, e))?;
        println!("# {}", path);
        dump(&parser, &source, records_only)
            .map_err(|e| anyhow::anyhow!("{}: {}", path, e))?;
    }
    Ok(())
}
