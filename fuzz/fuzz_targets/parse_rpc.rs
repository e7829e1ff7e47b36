#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use tds_protocol::{Packet, PacketType};
use tds_rpc_inspect::{DecoderConfig, ParameterMode, RpcDecoder};

/// Arbitrary RPC payload, optionally steered into the catalog branch.
#[derive(Debug, Arbitrary)]
struct FuzzRpcInput {
    /// Prefix a minimal header block and the proc ID sentinel
    by_id: bool,
    /// Procedure ID used when `by_id` is set
    proc_id: u16,
    /// Decode every parameter instead of the first
    all_params: bool,
    /// Remaining payload bytes
    body: Vec<u8>,
}

fuzz_target!(|input: FuzzRpcInput| {
    let mut payload = Vec::with_capacity(input.body.len() + 8);
    if input.by_id {
        payload.extend_from_slice(&4u32.to_le_bytes());
        payload.extend_from_slice(&0xFFFFu16.to_le_bytes());
        payload.extend_from_slice(&input.proc_id.to_le_bytes());
    }
    payload.extend_from_slice(&input.body);

    let mode = if input.all_params {
        ParameterMode::All
    } else {
        ParameterMode::First
    };
    let decoder = RpcDecoder::new(DecoderConfig::new().parameter_mode(mode));
    let packet = Packet::new(PacketType::Rpc, payload);

    let first = decoder.decode(&packet);
    assert_eq!(first, decoder.decode(&packet));
    if let Ok(request) = first {
        assert!(!request.proc_name().is_empty());
    }
});
