//! Transaction envelope parsing.
//!
//! The wire layout: a compact-u16-prefixed list of 64-byte signatures,
//! followed by the message. A version-addressed message flags its version
//! in the high bit of the first byte and appends address-table lookups
//! after the instruction list; a legacy message starts directly with the
//! three-byte header.

use agora_types::AgentId;

use crate::error::DecodeError;
use crate::wire::ByteReader;

/// One instruction as carried on the wire: indices into the resolved
/// account-key list plus an opaque payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instruction {
    pub program_index: u8,
    pub account_indices: Vec<u8>,
    pub data: Vec<u8>,
}

/// A reference to an external address-lookup table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableLookup {
    pub table: AgentId,
    pub writable_indices: Vec<u8>,
    pub readonly_indices: Vec<u8>,
}

/// A parsed signed transaction, before account resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionEnvelope {
    /// 64-byte signatures, fee-payer's first.
    pub signatures: Vec<[u8; 64]>,
    /// Static account keys carried inline in the message.
    pub static_keys: Vec<AgentId>,
    pub instructions: Vec<Instruction>,
    /// Present only in version-addressed messages.
    pub table_lookups: Vec<TableLookup>,
}

impl TransactionEnvelope {
    /// Parse a raw signed transaction buffer.
    pub fn parse(buf: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = ByteReader::new(buf);

        let sig_count = reader.read_compact_u16()?;
        if sig_count == 0 {
            return Err(DecodeError::malformed("transaction has no signature"));
        }
        let mut signatures = Vec::with_capacity(sig_count);
        for _ in 0..sig_count {
            let bytes = reader.read_bytes(64)?;
            let mut sig = [0u8; 64];
            sig.copy_from_slice(bytes);
            signatures.push(sig);
        }

        // Version prefix: high bit set means a version-addressed message.
        let first = reader.peek_u8()?;
        let versioned = first & 0x80 != 0;
        if versioned {
            let version = first & 0x7f;
            if version != 0 {
                return Err(DecodeError::malformed(format!(
                    "unsupported message version {version}"
                )));
            }
            reader.read_u8()?;
        }

        // Header: required signatures, readonly signed, readonly unsigned.
        // Only structural here — account resolution does not need it beyond
        // the fee-payer-first ordering it implies.
        let _num_required = reader.read_u8()?;
        let _num_readonly_signed = reader.read_u8()?;
        let _num_readonly_unsigned = reader.read_u8()?;

        let key_count = reader.read_compact_u16()?;
        if key_count == 0 {
            return Err(DecodeError::malformed("message carries no account keys"));
        }
        let mut static_keys = Vec::with_capacity(key_count);
        for _ in 0..key_count {
            static_keys.push(AgentId::new(reader.read_array_32()?));
        }

        // Recent blockhash — not needed downstream.
        let _blockhash = reader.read_array_32()?;

        let ix_count = reader.read_compact_u16()?;
        let mut instructions = Vec::with_capacity(ix_count);
        for _ in 0..ix_count {
            let program_index = reader.read_u8()?;
            let acct_count = reader.read_compact_u16()?;
            let account_indices = reader.read_bytes(acct_count)?.to_vec();
            let data_len = reader.read_compact_u16()?;
            let data = reader.read_bytes(data_len)?.to_vec();
            instructions.push(Instruction {
                program_index,
                account_indices,
                data,
            });
        }

        let mut table_lookups = Vec::new();
        if versioned {
            let lookup_count = reader.read_compact_u16()?;
            for _ in 0..lookup_count {
                let table = AgentId::new(reader.read_array_32()?);
                let w_count = reader.read_compact_u16()?;
                let writable_indices = reader.read_bytes(w_count)?.to_vec();
                let r_count = reader.read_compact_u16()?;
                let readonly_indices = reader.read_bytes(r_count)?.to_vec();
                table_lookups.push(TableLookup {
                    table,
                    writable_indices,
                    readonly_indices,
                });
            }
        }

        Ok(Self {
            signatures,
            static_keys,
            instructions,
            table_lookups,
        })
    }

    /// Resolve the full ordered account-key list: static keys, then loaded
    /// writable keys from each table, then loaded readonly keys.
    pub fn resolve_keys(
        &self,
        tables: &std::collections::HashMap<AgentId, Vec<AgentId>>,
    ) -> Result<Vec<AgentId>, DecodeError> {
        let mut keys = self.static_keys.clone();

        for lookup in &self.table_lookups {
            let table = tables.get(&lookup.table).ok_or_else(|| {
                DecodeError::unresolvable(format!("lookup table {} not supplied", lookup.table))
            })?;
            for &idx in &lookup.writable_indices {
                keys.push(*table.get(idx as usize).ok_or_else(|| {
                    DecodeError::unresolvable(format!(
                        "index {} past end of table {}",
                        idx, lookup.table
                    ))
                })?);
            }
        }
        for lookup in &self.table_lookups {
            let table = tables.get(&lookup.table).ok_or_else(|| {
                DecodeError::unresolvable(format!("lookup table {} not supplied", lookup.table))
            })?;
            for &idx in &lookup.readonly_indices {
                keys.push(*table.get(idx as usize).ok_or_else(|| {
                    DecodeError::unresolvable(format!(
                        "index {} past end of table {}",
                        idx, lookup.table
                    ))
                })?);
            }
        }

        Ok(keys)
    }
}
