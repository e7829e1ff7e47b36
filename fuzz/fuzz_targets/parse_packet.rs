#![no_main]

use libfuzzer_sys::fuzz_target;
use tds_protocol::{Packet, PacketType};

fuzz_target!(|data: &[u8]| {
    let Ok(packet) = Packet::from_wire(data) else {
        return;
    };
    if packet.packet_type() == PacketType::Rpc {
        let _ = tds_rpc_inspect::decode_rpc_request(&packet);
    }
});
