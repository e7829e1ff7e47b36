//! The decoded RPC request.

use tds_protocol::{Packet, ProcId, ProcName, RpcOptionFlags};

/// The procedure an RPC request invokes.
///
/// Either a name sent as UTF-16 or one of the well-known procedures
/// addressed by catalog ID.
pub type Procedure = ProcName;

/// A decoded RPC Request.
///
/// Created fresh per packet and immutable once built. The procedure name is
/// never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcRequest {
    packet: Packet,
    procedure: Procedure,
    options: RpcOptionFlags,
    parameters: Vec<String>,
}

impl RpcRequest {
    pub(crate) fn new(
        packet: Packet,
        procedure: Procedure,
        options: RpcOptionFlags,
        parameters: Vec<String>,
    ) -> Self {
        Self {
            packet,
            procedure,
            options,
            parameters,
        }
    }

    /// The packet this request was decoded from.
    #[must_use]
    pub fn packet(&self) -> &Packet {
        &self.packet
    }

    /// The procedure name, looked up from the catalog for ID-addressed calls.
    #[must_use]
    pub fn proc_name(&self) -> &str {
        self.procedure.name()
    }

    /// How the procedure was addressed.
    #[must_use]
    pub fn procedure(&self) -> &Procedure {
        &self.procedure
    }

    /// The catalog ID, for ID-addressed calls.
    #[must_use]
    pub fn proc_id(&self) -> Option<ProcId> {
        self.procedure.proc_id()
    }

    /// Option flags of the call. Empty for name-addressed calls.
    #[must_use]
    pub fn options(&self) -> RpcOptionFlags {
        self.options
    }

    /// Rendered parameter values, in call order.
    #[must_use]
    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    /// Consume the request, returning the rendered parameters.
    #[must_use]
    pub fn into_parameters(self) -> Vec<String> {
        self.parameters
    }
}
