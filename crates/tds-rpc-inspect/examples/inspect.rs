//! Decode a framed RPC Request and print what it invokes.
//!
//! Pass the packet as hex (header included), or run without arguments to
//! decode a built-in `sp_executesql` call:
//!
//! ```bash
//! RUST_LOG=tds_rpc_inspect=trace cargo run -p tds-rpc-inspect --example inspect -- \
//!     0301001400000000040000000300610062006300
//! ```
//!
//! Set `RPC_DECODER` to a settings string such as `parameters=all` to change
//! how parameters are decoded.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use tds_rpc_inspect::{DecoderConfig, Packet, RpcDecoder};

const SAMPLE: &str = "0301002E0000000004000000FFFF0A0000000000E7401F0904D000341000530045004C0045004300540020003100";

fn parse_hex(hex: &str) -> Result<Vec<u8>, String> {
    let hex: String = hex.chars().filter(|c| !c.is_whitespace()).collect();
    if hex.len() % 2 != 0 {
        return Err("odd number of hex digits".into());
    }
    hex.as_bytes()
        .chunks(2)
        .map(|pair| {
            let digits = std::str::from_utf8(pair)
                .ok()
                .filter(|d| d.bytes().all(|b| b.is_ascii_hexdigit()))
                .ok_or_else(|| format!("invalid hex digits: {}", String::from_utf8_lossy(pair)))?;
            u8::from_str_radix(digits, 16).map_err(|e| e.to_string())
        })
        .collect()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = match std::env::var("RPC_DECODER") {
        Ok(settings) => DecoderConfig::from_settings_string(&settings)?,
        Err(_) => DecoderConfig::default(),
    };

    let hex = std::env::args().nth(1).unwrap_or_else(|| SAMPLE.to_string());
    let wire = parse_hex(&hex)?;
    let packet = Packet::from_wire(&wire)?;

    let decoder = RpcDecoder::new(config);
    match decoder.decode(&packet) {
        Ok(request) => {
            println!("procedure: {}", request.proc_name());
            if let Some(id) = request.proc_id() {
                println!("proc id:   {}", id.id());
                println!("options:   {:?}", request.options());
            }
            for (i, value) in request.parameters().iter().enumerate() {
                println!("param {i}:   {value}");
            }
        }
        Err(e) => {
            eprintln!("decode failed: {e}");
            std::process::exit(1);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("03 01 0a FF").unwrap(), [0x03, 0x01, 0x0A, 0xFF]);
        assert!(parse_hex("030").is_err());
        assert!(parse_hex("+1").is_err());
    }

    #[test]
    fn test_parse_hex_rejects_non_ascii() {
        assert!(parse_hex("é0").is_err());
        assert!(parse_hex("éé").is_err());
        assert!(parse_hex("日本").is_err());
    }

    #[test]
    fn test_sample_decodes() {
        let packet = Packet::from_wire(&parse_hex(SAMPLE).unwrap()).unwrap();
        let request = RpcDecoder::default().decode(&packet).unwrap();
        assert_eq!(request.proc_name(), "Sp_ExecuteSql");
    }
}
