//! RPC (Remote Procedure Call) request wire structures.
//!
//! An RPC request (packet type 0x03) names the procedure to run either by a
//! UTF-16 name or, for the built-in prepared-statement and cursor
//! procedures, by a small numeric ID.
//!
//! ## Wire Format
//!
//! ```text
//! RPC Request:
//! +-------------------+
//! | ALL_HEADERS       | (TDS 7.2+, u32 total length first)
//! +-------------------+
//! | NameLenProcID     | (u16 name length, or 0xFFFF + u16 ProcID)
//! +-------------------+
//! | Option Flags      | (2 bytes)
//! +-------------------+
//! | Parameters        | (repeated)
//! +-------------------+
//! ```

use core::fmt;

use bitflags::bitflags;
use bytes::BufMut;

use crate::codec::{ByteCursor, read_utf16_string, write_us_varchar};
use crate::error::ProtocolError;

/// Value of the name length field announcing that a ProcID follows.
pub const RPC_PROC_ID_SENTINEL: u16 = 0xFFFF;

/// Number of slots in the well-known procedure catalog (IDs `0..16`).
pub const CATALOG_SIZE: usize = 16;

/// Catalog names indexed by procedure ID. Slot 0 is reserved and empty.
const CATALOG: [&str; CATALOG_SIZE] = [
    "",
    "Sp_Cursor",
    "Sp_CursorOpen",
    "Sp_CursorPrepare",
    "Sp_CursorExecute",
    "Sp_CursorPrepExec",
    "Sp_CursorUnprepare",
    "Sp_CursorFetch",
    "Sp_CursorOption",
    "Sp_CursorClose",
    "Sp_ExecuteSql",
    "Sp_Prepare",
    "Sp_Execute",
    "Sp_PrepExec",
    "Sp_PrepExecRpc",
    "Sp_Unprepare",
];

// Every slot except the reserved one must carry a name.
const _: () = {
    let mut i = 1;
    while i < CATALOG_SIZE {
        assert!(!CATALOG[i].is_empty());
        i += 1;
    }
};

/// Well-known stored procedure IDs.
///
/// These are special procedure IDs that SQL Server recognizes
/// without requiring the procedure name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ProcId {
    /// sp_cursor (0x0001)
    Cursor = 0x0001,
    /// sp_cursoropen (0x0002)
    CursorOpen = 0x0002,
    /// sp_cursorprepare (0x0003)
    CursorPrepare = 0x0003,
    /// sp_cursorexecute (0x0004)
    CursorExecute = 0x0004,
    /// sp_cursorprepexec (0x0005)
    CursorPrepExec = 0x0005,
    /// sp_cursorunprepare (0x0006)
    CursorUnprepare = 0x0006,
    /// sp_cursorfetch (0x0007)
    CursorFetch = 0x0007,
    /// sp_cursoroption (0x0008)
    CursorOption = 0x0008,
    /// sp_cursorclose (0x0009)
    CursorClose = 0x0009,
    /// sp_executesql (0x000A) - Primary method for parameterized queries
    ExecuteSql = 0x000A,
    /// sp_prepare (0x000B)
    Prepare = 0x000B,
    /// sp_execute (0x000C)
    Execute = 0x000C,
    /// sp_prepexec (0x000D) - Prepare and execute in one call
    PrepExec = 0x000D,
    /// sp_prepexecrpc (0x000E)
    PrepExecRpc = 0x000E,
    /// sp_unprepare (0x000F)
    Unprepare = 0x000F,
}

impl ProcId {
    const ALL: [Self; CATALOG_SIZE - 1] = [
        Self::Cursor,
        Self::CursorOpen,
        Self::CursorPrepare,
        Self::CursorExecute,
        Self::CursorPrepExec,
        Self::CursorUnprepare,
        Self::CursorFetch,
        Self::CursorOption,
        Self::CursorClose,
        Self::ExecuteSql,
        Self::Prepare,
        Self::Execute,
        Self::PrepExec,
        Self::PrepExecRpc,
        Self::Unprepare,
    ];

    /// Resolve a wire ProcID against the catalog.
    ///
    /// IDs at or past [`CATALOG_SIZE`] are invalid; ID 0 is in range but
    /// names nothing.
    pub fn from_u16(id: u16) -> Result<Self, ProtocolError> {
        if id as usize >= CATALOG_SIZE {
            return Err(ProtocolError::InvalidProcId(id));
        }
        match id {
            0 => Err(ProtocolError::UnmappedProcId(id)),
            _ => Ok(Self::ALL[id as usize - 1]),
        }
    }

    /// Every catalog entry, in ID order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &Self::ALL
    }

    /// The wire ID.
    #[must_use]
    pub const fn id(self) -> u16 {
        self as u16
    }

    /// The canonical procedure name, e.g. `Sp_ExecuteSql`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        CATALOG[self as usize]
    }
}

impl fmt::Display for ProcId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The procedure an RPC request addresses.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProcName {
    /// Addressed by UTF-16 name.
    Named(String),
    /// Addressed by well-known ID.
    Catalog(ProcId),
}

impl ProcName {
    /// Read the NameLenProcID section.
    pub fn decode(src: &mut ByteCursor<'_>) -> Result<Self, ProtocolError> {
        let len = src.read_u16_le()?;
        if len == RPC_PROC_ID_SENTINEL {
            let id = src.read_u16_le()?;
            return ProcId::from_u16(id).map(Self::Catalog);
        }
        read_utf16_string(src, len as usize).map(Self::Named)
    }

    /// Write the NameLenProcID section.
    pub fn encode(&self, dst: &mut impl BufMut) {
        match self {
            Self::Named(name) => write_us_varchar(dst, name),
            Self::Catalog(id) => {
                dst.put_u16_le(RPC_PROC_ID_SENTINEL);
                dst.put_u16_le(id.id());
            }
        }
    }

    /// The procedure name, looked up from the catalog when addressed by ID.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Named(name) => name,
            Self::Catalog(id) => id.name(),
        }
    }

    /// The catalog ID, if addressed by ID.
    #[must_use]
    pub const fn proc_id(&self) -> Option<ProcId> {
        match self {
            Self::Named(_) => None,
            Self::Catalog(id) => Some(*id),
        }
    }
}

impl fmt::Display for ProcName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

bitflags! {
    /// RPC option flags.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct RpcOptionFlags: u16 {
        /// Recompile the procedure.
        const WITH_RECOMPILE = 0x0001;
        /// No metadata in response.
        const NO_METADATA = 0x0002;
        /// Reuse metadata from previous call.
        const REUSE_METADATA = 0x0004;
    }
}

bitflags! {
    /// RPC parameter status flags.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct ParamStatus: u8 {
        /// Parameter is passed by reference (OUTPUT parameter).
        const BY_REF = 0x01;
        /// Parameter takes its default value.
        const DEFAULT_VALUE = 0x02;
        /// Parameter is encrypted (Always Encrypted).
        const ENCRYPTED = 0x08;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    #[test]
    fn test_proc_id_values() {
        assert_eq!(ProcId::ExecuteSql.id(), 0x000A);
        assert_eq!(ProcId::Prepare.id(), 0x000B);
        assert_eq!(ProcId::Execute.id(), 0x000C);
        assert_eq!(ProcId::Unprepare.id(), 0x000F);
    }

    #[test]
    fn test_catalog_lookup_matches_ids() {
        for (index, proc_id) in ProcId::all().iter().enumerate() {
            assert_eq!(proc_id.id() as usize, index + 1);
            assert_eq!(ProcId::from_u16(proc_id.id()).unwrap(), *proc_id);
            assert!(!proc_id.name().is_empty());
        }
        assert_eq!(ProcId::from_u16(1).unwrap().name(), "Sp_Cursor");
        assert_eq!(ProcId::from_u16(10).unwrap().name(), "Sp_ExecuteSql");
    }

    #[test]
    fn test_catalog_rejects_out_of_range() {
        assert_eq!(ProcId::from_u16(0), Err(ProtocolError::UnmappedProcId(0)));
        assert_eq!(ProcId::from_u16(16), Err(ProtocolError::InvalidProcId(16)));
        assert_eq!(
            ProcId::from_u16(u16::MAX),
            Err(ProtocolError::InvalidProcId(u16::MAX))
        );
    }

    #[test]
    fn test_proc_name_decode_named() {
        let mut buf = BytesMut::new();
        ProcName::Named("dbo.usp_audit".into()).encode(&mut buf);

        let mut cursor = ByteCursor::new(&buf);
        let name = ProcName::decode(&mut cursor).unwrap();
        assert_eq!(name, ProcName::Named("dbo.usp_audit".into()));
        assert_eq!(name.proc_id(), None);
        assert_eq!(cursor.remaining(), 0);
    }

    #[test]
    fn test_proc_name_decode_catalog() {
        let data = [0xFF, 0xFF, 0x0D, 0x00];
        let mut cursor = ByteCursor::new(&data);
        let name = ProcName::decode(&mut cursor).unwrap();
        assert_eq!(name.proc_id(), Some(ProcId::PrepExec));
        assert_eq!(name.to_string(), "Sp_PrepExec");
    }

    #[test]
    fn test_proc_name_short_name() {
        // Claims three characters, carries two.
        let data = [0x03, 0x00, b'a', 0x00, b'b', 0x00];
        let mut cursor = ByteCursor::new(&data);
        assert!(matches!(
            ProcName::decode(&mut cursor),
            Err(ProtocolError::IncompletePacket {
                expected: 6,
                actual: 4
            })
        ));
    }

    #[test]
    fn test_option_flags_keep_unknown_bits() {
        let flags = RpcOptionFlags::from_bits_retain(0x8003);
        assert!(flags.contains(RpcOptionFlags::WITH_RECOMPILE | RpcOptionFlags::NO_METADATA));
        assert_eq!(flags.bits(), 0x8003);
    }
}
