//! Compact variable-length integer encoding (§4.1): `x<0xFD` is one byte,
//! `x<2^16` is `0xFD` + u16 LE, `x<2^32` is `0xFE` + u32 LE, else `0xFF` +
//! u64 LE.

use std::io::{self, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{Error, ErrorKind};

/// Writes `n` in compact-varint form.
pub fn write_varint<W: Write>(w: &mut W, n: u64) -> io::Result<()> {
	if n < 0xFD {
		w.write_u8(n as u8)
	} else if n <= 0xFFFF {
		w.write_u8(0xFD)?;
		w.write_u16::<LittleEndian>(n as u16)
	} else if n <= 0xFFFF_FFFF {
		w.write_u8(0xFE)?;
		w.write_u32::<LittleEndian>(n as u32)
	} else {
		w.write_u8(0xFF)?;
		w.write_u64::<LittleEndian>(n)
	}
}

/// Reads a compact-varint encoded integer.
pub fn read_varint<R: Read>(r: &mut R) -> Result<u64, Error> {
	let prefix = r.read_u8().map_err(|e| ErrorKind::Encoding(format!("varint prefix: {}", e)))?;
	let value = match prefix {
		0xFD => r
			.read_u16::<LittleEndian>()
			.map(|v| v as u64)
			.map_err(|e| ErrorKind::Encoding(format!("varint u16: {}", e)))?,
		0xFE => r
			.read_u32::<LittleEndian>()
			.map(|v| v as u64)
			.map_err(|e| ErrorKind::Encoding(format!("varint u32: {}", e)))?,
		0xFF => r
			.read_u64::<LittleEndian>()
			.map_err(|e| ErrorKind::Encoding(format!("varint u64: {}", e)))?,
		n => n as u64,
	};
	Ok(value)
}

/// Serializes `n` to a standalone `Vec<u8>`.
pub fn encode_varint(n: u64) -> Vec<u8> {
	let mut buf = Vec::new();
	write_varint(&mut buf, n).expect("writing to a Vec never fails");
	buf
}
