// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use alloc::vec::Vec;
use core::sync::atomic::{AtomicU16, Ordering};

use crate::{
    codec::{rtu, tcp},
    error::Error,
    frame::*,
    params::RequestParameters,
    validate::validate,
};

/// Encoding context that owns the MBAP transaction counter.
///
/// The counter is advanced atomically, so a shared `&Session` never hands
/// out the same id twice in a row.
#[derive(Debug)]
pub struct Session {
    transaction_id: AtomicU16,
}

impl Session {
    /// A session whose first transaction id is picked at random
    /// from `1..=0xFFFE`.
    #[cfg(feature = "std")]
    #[must_use]
    pub fn new() -> Self {
        use rand::Rng as _;

        Self::with_transaction_id(rand::thread_rng().gen_range(1..=0xFFFE))
    }

    /// A session starting at `transaction_id`; `0` starts at `1`.
    #[must_use]
    pub const fn with_transaction_id(transaction_id: TransactionId) -> Self {
        let transaction_id = if transaction_id == 0 {
            1
        } else {
            transaction_id
        };
        Self {
            transaction_id: AtomicU16::new(transaction_id),
        }
    }

    /// The id the next TCP frame will carry.
    #[must_use]
    pub fn peek_transaction_id(&self) -> TransactionId {
        self.transaction_id.load(Ordering::Relaxed)
    }

    /// Take the current id and advance the counter, wrapping `0xFFFF` to `1`.
    pub fn next_transaction_id(&self) -> TransactionId {
        let res = self
            .transaction_id
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |id| {
                Some(id.checked_add(1).unwrap_or(1))
            });
        match res {
            Ok(id) | Err(id) => id,
        }
    }

    /// Encode a typed message into a complete ADU.
    ///
    /// TCP frames draw a transaction id; a message that can't be encoded
    /// leaves the counter untouched.
    pub fn encode(&self, message: &Message) -> Result<Vec<u8>, Error> {
        let Message {
            transport,
            unit_id,
            request,
        } = message;
        let adu = match transport {
            Transport::Rtu => rtu::client::encode_request(&rtu::RequestAdu {
                hdr: rtu::Header { slave: *unit_id },
                pdu: RequestPdu(request.clone()),
            })?,
            Transport::Tcp(_) => {
                let pdu = request.encode()?;
                let hdr = tcp::Header {
                    transaction_id: self.next_transaction_id(),
                    unit_id: *unit_id,
                };
                tcp::client::prepend_header(hdr, &pdu)?
            }
        };
        #[cfg(feature = "log")]
        log::debug!(
            "Encoded {} frame: {}",
            transport.mode(),
            crate::util::format_bytes(&adu)
        );
        Ok(adu)
    }

    /// Validate, convert and encode user parameters in one go.
    pub fn encode_frame(&self, params: &RequestParameters) -> Result<Vec<u8>, Error> {
        validate(params).map_err(Error::Validation)?;
        let message = Message::try_from(params)?;
        self.encode(&message)
    }
}

impl Default for Session {
    fn default() -> Self {
        #[cfg(feature = "std")]
        {
            Self::new()
        }
        #[cfg(not(feature = "std"))]
        {
            Self::with_transaction_id(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{util::format_bytes, validate::Field};
    use alloc::{string::ToString, vec};

    fn read_coils_params() -> RequestParameters {
        RequestParameters {
            unit_id: "4".into(),
            function_code: "01".into(),
            start: "10".into(),
            quantity: "13".into(),
            ..Default::default()
        }
    }

    #[test]
    fn end_to_end_rtu_frame() {
        let session = Session::with_transaction_id(1);
        let adu = session.encode_frame(&read_coils_params()).unwrap();
        assert_eq!(adu, &[0x04, 0x01, 0x00, 0x0A, 0x00, 0x0D, 0xDD, 0x98]);
        assert_eq!(format_bytes(&adu), "04 01 00 0A 00 0D DD 98");
    }

    #[test]
    fn rtu_encode_is_idempotent() {
        let session = Session::with_transaction_id(100);
        let params = read_coils_params();
        let first = session.encode_frame(&params).unwrap();
        let second = session.encode_frame(&params).unwrap();
        assert_eq!(first, second);
        assert_eq!(session.peek_transaction_id(), 100);
    }

    #[test]
    fn tcp_encodes_differ_only_in_transaction_id() {
        let session = Session::with_transaction_id(0x0102);
        let params = RequestParameters {
            mode: Mode::Tcp,
            ..read_coils_params()
        };
        let first = session.encode_frame(&params).unwrap();
        let second = session.encode_frame(&params).unwrap();
        assert_eq!(
            first,
            &[0x01, 0x02, 0x00, 0x00, 0x00, 0x06, 0x04, 0x01, 0x00, 0x0A, 0x00, 0x0D]
        );
        assert_eq!(&second[..2], &[0x01, 0x03]);
        assert_eq!(first[2..], second[2..]);
    }

    #[test]
    fn transaction_id_wraps_to_one() {
        let session = Session::with_transaction_id(0xFFFE);
        assert_eq!(session.next_transaction_id(), 0xFFFE);
        assert_eq!(session.next_transaction_id(), 0xFFFF);
        assert_eq!(session.next_transaction_id(), 1);
        assert_eq!(session.next_transaction_id(), 2);
    }

    #[test]
    fn zero_seed_starts_at_one() {
        assert_eq!(Session::with_transaction_id(0).peek_transaction_id(), 1);
    }

    #[cfg(feature = "std")]
    #[test]
    fn random_seed_is_in_range() {
        for _ in 0..100 {
            let id = Session::new().peek_transaction_id();
            assert!((1..=0xFFFE).contains(&id));
        }
    }

    #[test]
    fn invalid_parameters_are_reported_together() {
        let session = Session::with_transaction_id(1);
        let params = RequestParameters {
            unit_id: "999".into(),
            quantity: "0".into(),
            ..read_coils_params()
        };
        let Err(Error::Validation(errors)) = session.encode_frame(&params) else {
            panic!("expected validation errors");
        };
        assert_eq!(errors.len(), 2);
        assert!(errors.contains(Field::UnitId));
        assert!(errors.contains(Field::Quantity));
    }

    #[test]
    fn unsupported_function_code_is_rejected_by_the_encoder() {
        let session = Session::with_transaction_id(7);
        let params = RequestParameters {
            mode: Mode::Tcp,
            function_code: "22".into(),
            ..Default::default()
        };
        let err = session.encode_frame(&params).unwrap_err();
        assert_eq!(err, Error::UnsupportedFunction(22));
        assert_eq!(
            err.to_string(),
            "Function code 22 construction not implemented"
        );
        assert_eq!(session.peek_transaction_id(), 7);
    }

    #[test]
    fn failed_tcp_encode_keeps_the_transaction_id() {
        let session = Session::with_transaction_id(7);
        let message = Message {
            transport: Transport::Tcp(core::net::SocketAddrV4::new(
                core::net::Ipv4Addr::LOCALHOST,
                502,
            )),
            unit_id: 1,
            request: Request::WriteMultipleRegisters(0, vec![]),
        };
        assert_eq!(session.encode(&message).unwrap_err(), Error::Quantity(0));
        assert_eq!(session.peek_transaction_id(), 7);
    }

    #[test]
    fn shared_session_hands_out_distinct_ids() {
        let session = Session::with_transaction_id(1);
        let ids: Vec<_> = (0..10).map(|_| session.next_transaction_id()).collect();
        assert_eq!(ids, (1..=10).collect::<Vec<TransactionId>>());
    }
}
