// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Modbus RTU

use super::*;
use crate::SlaveId;
use byteorder::LittleEndian;
use core::fmt;

pub mod client;
pub mod server;
pub use crate::frame::rtu::*;

// [MODBUS over Serial Line Specification and Implementation Guide V1.02](http://modbus.org/docs/Modbus_over_serial_line_V1_02.pdf), page 13
// "The maximum size of a MODBUS RTU frame is 256 bytes."
pub const MAX_FRAME_LEN: usize = 256;

/// Slave id plus CRC
const OVERHEAD_LEN: usize = 3;

/// An extracted RTU PDU frame.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedFrame<'a> {
    pub slave: SlaveId,
    pub pdu: &'a [u8],
}

/// Split a complete RTU ADU into slave id and PDU.
///
/// The trailing CRC is verified first.
pub fn extract_frame(adu: &[u8]) -> Result<DecodedFrame<'_>> {
    if adu.is_empty() {
        return Err(Error::MissingSlaveId);
    }
    verify_crc(adu)?;
    let (slave_id, rest) = adu.split_at(1);
    let pdu = &rest[..rest.len() - 2];
    if pdu.is_empty() {
        return Err(Error::MissingFunctionCode);
    }
    Ok(DecodedFrame {
        slave: slave_id[0],
        pdu,
    })
}

/// Calculate the CRC (Cyclic Redundancy Check) sum.
///
/// Returns the CRC register; it goes on the wire low byte first.
#[must_use]
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc = 0xFFFF;
    for x in data {
        crc ^= u16::from(*x);
        for _ in 0..8 {
            // if we followed clippy's suggestion to move out the crc >>= 1, the condition may not be met any more
            // the recommended action therefore makes no sense and it is better to allow this lint
            #[allow(clippy::branches_sharing_code)]
            if (crc & 0x0001) != 0 {
                crc >>= 1;
                crc ^= 0xA001;
            } else {
                crc >>= 1;
            }
        }
    }
    crc
}

/// Append the CRC of `adu` in wire order.
pub(crate) fn append_crc(adu: &mut Vec<u8>) {
    let mut crc_buf = [0; 2];
    LittleEndian::write_u16(&mut crc_buf, crc16(adu));
    adu.extend_from_slice(&crc_buf);
}

/// Compare the trailing two bytes of an ADU with the CRC of the rest.
pub fn verify_crc(adu: &[u8]) -> Result<()> {
    if adu.len() < OVERHEAD_LEN {
        return Err(Error::MissingCrc);
    }
    let (data, crc_buf) = adu.split_at(adu.len() - 2);
    let received = LittleEndian::read_u16(crc_buf);
    let calculated = crc16(data);
    if received != calculated {
        return Err(Error::Crc(received, calculated));
    }
    Ok(())
}

/// A CRC-16/MODBUS result with both byte orders at hand.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checksum {
    pub value: u16,
}

impl Checksum {
    #[must_use]
    pub fn of(data: &[u8]) -> Self {
        Self {
            value: crc16(data),
        }
    }

    /// Wire order, as appended to an RTU frame.
    #[must_use]
    pub const fn low_first(self) -> [u8; 2] {
        self.value.to_le_bytes()
    }

    #[must_use]
    pub const fn high_first(self) -> [u8; 2] {
        self.value.to_be_bytes()
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [lo, hi] = self.low_first();
        write!(f, "{lo:02X} {hi:02X}")
    }
}

/// Calculate the checksum of hex text such as `"01 03 00 01 00 01"`.
pub fn checksum_of_hex(text: &str) -> Result<Checksum> {
    let bytes = parse_hex_bytes(text)?;
    if bytes.is_empty() {
        return Err(Error::EmptyInput);
    }
    Ok(Checksum::of(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::{string::ToString, vec};

    #[test]
    fn test_calc_crc16() {
        let msg = &[0x01, 0x03, 0x08, 0x2B, 0x00, 0x02];
        assert_eq!(crc16(msg), 0x63B6);

        let msg = &[0x01, 0x03, 0x04, 0x00, 0x20, 0x00, 0x00];
        assert_eq!(crc16(msg), 0xF9FB);

        let msg = &[0x01, 0x03, 0x00, 0x01, 0x00, 0x01];
        assert_eq!(crc16(msg), 0xCAD5);
    }

    #[test]
    fn crc16_of_nothing_is_the_initial_register() {
        assert_eq!(crc16(&[]), 0xFFFF);
    }

    #[test]
    fn append_crc_low_byte_first() {
        let mut adu = vec![0x01, 0x03, 0x00, 0x01, 0x00, 0x01];
        append_crc(&mut adu);
        assert_eq!(adu, &[0x01, 0x03, 0x00, 0x01, 0x00, 0x01, 0xD5, 0xCA]);
    }

    #[test]
    fn verify_trailing_crc() {
        assert!(verify_crc(&[0x12, 0x06, 0x22, 0x22, 0xAB, 0xCD, 0x9F, 0xBE]).is_ok());
        assert_eq!(
            verify_crc(&[0x12, 0x06, 0x22, 0x22, 0xAB, 0xCD, 0x5F, 0xBE])
                .err()
                .unwrap(),
            Error::Crc(0xBE5F, 0xBE9F)
        );
        assert_eq!(verify_crc(&[0x12, 0x06]).err().unwrap(), Error::MissingCrc);
    }

    #[test]
    fn checksum_byte_orders() {
        let crc = Checksum::of(&[0x01, 0x03, 0x00, 0x01, 0x00, 0x01]);
        assert_eq!(crc.low_first(), [0xD5, 0xCA]);
        assert_eq!(crc.high_first(), [0xCA, 0xD5]);
        assert_eq!(crc.to_string(), "D5 CA");
    }

    #[test]
    fn checksum_from_hex_text() {
        let crc = checksum_of_hex("01 03 00 01 00 01").unwrap();
        assert_eq!(crc.value, 0xCAD5);
        let crc = checksum_of_hex("0x01,0x03,0x00,0x01,0x00,0x01").unwrap();
        assert_eq!(crc.value, 0xCAD5);
        assert_eq!(checksum_of_hex("   ").err().unwrap(), Error::EmptyInput);
        assert_eq!(checksum_of_hex("01 0G").err().unwrap(), Error::InvalidHex);
    }

    mod frame_decoder {

        use super::*;
        use alloc::vec;

        #[test]
        fn extract_usual_rtu_frame() {
            let buf = &[
                0x12, // slave address
                0x06, // function code
                0x22, // addr
                0x22, // addr
                0xAB, // value
                0xCD, // value
                0x9F, // crc
                0xBE, // crc
            ];
            let DecodedFrame { slave, pdu } = extract_frame(buf).unwrap();
            assert_eq!(slave, 0x12);
            assert_eq!(pdu, &[0x06, 0x22, 0x22, 0xAB, 0xCD]);
        }

        #[test]
        fn extract_frame_with_bad_crc() {
            let buf = &[0x12, 0x06, 0x22, 0x22, 0xAB, 0xCD, 0x9F, 0xBF];
            assert!(matches!(extract_frame(buf), Err(Error::Crc(_, _))));
        }

        #[test]
        fn extract_frame_without_function_code() {
            let mut buf = vec![0x12];
            append_crc(&mut buf);
            assert_eq!(
                extract_frame(&buf).err().unwrap(),
                Error::MissingFunctionCode
            );
            assert_eq!(extract_frame(&[]).err().unwrap(), Error::MissingSlaveId);
        }
    }
}
