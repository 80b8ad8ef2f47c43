//! Produces the compressed lookup tables for every standard format and a `payloads.rs` that
//! embeds them, so that the runtime only ever inflates tables and never builds them.
//!
//! The table builders are the crate's own modules, compiled into the build script as well, so the
//! producer and the consumer cannot disagree on the layout.

use std::env;
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::PathBuf;

#[allow(dead_code)]
#[path = "src/format.rs"]
mod format;

#[allow(dead_code)]
#[path = "src/encode.rs"]
mod encode;

#[allow(dead_code)]
#[path = "src/table.rs"]
mod table;

use format::FormatDescriptor;

const SOURCES: [&str; 4] = ["build.rs", "src/format.rs", "src/encode.rs", "src/table.rs"];

fn main() -> io::Result<()> {
  for source in SOURCES {
    println!("cargo:rerun-if-changed={source}");
  }
  let out_dir = PathBuf::from(env::var_os("OUT_DIR").ok_or_else(|| io::Error::other("OUT_DIR not set"))?);

  let mut generated = String::from("// @generated by build.rs, do not edit.\n\n");
  generated.push_str("pub(crate) static PAYLOADS: &[Payload] = &[\n");
  for format in FormatDescriptor::STANDARD {
    let decode = table::compress(&table::decode_table_bytes(&table::build_decode_table(&format)))?;
    let encode = table::compress(&table::build_encode_table(&format))?;

    let decode_path = out_dir.join(format!("{}.decode.zlib", format.slug()));
    let encode_path = out_dir.join(format!("{}.encode.zlib", format.slug()));
    fs::write(&decode_path, decode)?;
    fs::write(&encode_path, encode)?;

    writeln!(
      generated,
      "  Payload {{\n    format: FormatDescriptor::new({}, {}, {}, OverflowPolicy::{:?}),\n    \
      decode: include_bytes!({:?}),\n    encode: include_bytes!({:?}),\n  }},",
      format.exp_bits(), format.mantissa_bits(), format.bias(), format.policy(),
      decode_path.display().to_string(), encode_path.display().to_string(),
    ).map_err(io::Error::other)?;
  }
  generated.push_str("];\n");

  fs::write(out_dir.join("payloads.rs"), generated)
}
