//! Codec for the customer <-> shop protocol.
//!
//! Every value on the wire is a signed 32 bit integer, little endian, with no framing:
//! - customer -> shop, once after connecting: `x` then `y`
//! - shop -> customer: one status code per transition
//! - customer -> shop, optionally later: `6` to cancel the order
use std::io::{self, Read, Write};

use thiserror::Error;

use crate::coordinates::Coordinates;
use crate::order_status::OrderStatus;

/// Bytes taken by every value on the wire
pub const CODE_WIDTH: usize = 4;

#[derive(Debug, Error)]
pub enum WireError {
    #[error("connection closed by peer")]
    Closed,
    #[error("unknown status code {0}")]
    UnknownStatus(i32),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// What a customer can send once its coordinates were accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomerRequest {
    Cancel,
    Unknown(i32),
}

pub fn encode_code(code: i32) -> [u8; CODE_WIDTH] {
    code.to_le_bytes()
}

pub fn decode_code(bytes: [u8; CODE_WIDTH]) -> i32 {
    i32::from_le_bytes(bytes)
}

pub fn write_code<W: Write + ?Sized>(writer: &mut W, code: i32) -> Result<(), WireError> {
    writer.write_all(&encode_code(code))?;
    writer.flush()?;
    Ok(())
}

/// Reads one code. A peer that closes before sending a full code yields `WireError::Closed`.
pub fn read_code<R: Read + ?Sized>(reader: &mut R) -> Result<i32, WireError> {
    let mut bytes = [0u8; CODE_WIDTH];
    match reader.read_exact(&mut bytes) {
        Ok(()) => Ok(decode_code(bytes)),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Err(WireError::Closed),
        Err(e) => Err(WireError::Io(e)),
    }
}

pub fn write_status<W: Write + ?Sized>(writer: &mut W, status: OrderStatus) -> Result<(), WireError> {
    write_code(writer, status.code())
}

pub fn read_status<R: Read + ?Sized>(reader: &mut R) -> Result<OrderStatus, WireError> {
    let code = read_code(reader)?;
    OrderStatus::from_code(code).ok_or(WireError::UnknownStatus(code))
}

pub fn write_coordinates<W: Write + ?Sized>(writer: &mut W, coordinates: Coordinates) -> Result<(), WireError> {
    let mut bytes = [0u8; 2 * CODE_WIDTH];
    bytes[..CODE_WIDTH].copy_from_slice(&encode_code(coordinates.x()));
    bytes[CODE_WIDTH..].copy_from_slice(&encode_code(coordinates.y()));
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

pub fn read_coordinates<R: Read + ?Sized>(reader: &mut R) -> Result<Coordinates, WireError> {
    let x = read_code(reader)?;
    let y = read_code(reader)?;
    Ok(Coordinates::new(x, y))
}

/// Reads what the customer sent after its coordinates
pub fn read_customer_request<R: Read + ?Sized>(reader: &mut R) -> Result<CustomerRequest, WireError> {
    let code = read_code(reader)?;
    if code == OrderStatus::Canceled.code() {
        Ok(CustomerRequest::Cancel)
    } else {
        Ok(CustomerRequest::Unknown(code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_codes_are_little_endian() {
        assert_eq!(encode_code(6), [6, 0, 0, 0]);
        assert_eq!(encode_code(-1), [0xff, 0xff, 0xff, 0xff]);
        assert_eq!(decode_code([1, 1, 0, 0]), 257);
    }

    #[test]
    fn test_coordinates_are_sent_x_then_y() {
        let mut buffer = Vec::new();
        write_coordinates(&mut buffer, Coordinates::new(3, -4)).unwrap();
        assert_eq!(buffer, vec![3, 0, 0, 0, 0xfc, 0xff, 0xff, 0xff]);
        assert_eq!(read_coordinates(&mut Cursor::new(buffer)).unwrap(), Coordinates::new(3, -4));
    }

    #[test]
    fn test_status_stream() {
        let mut buffer = Vec::new();
        for status in [OrderStatus::Received, OrderStatus::Preparing, OrderStatus::Canceled] {
            write_status(&mut buffer, status).unwrap();
        }
        let mut reader = Cursor::new(buffer);
        assert_eq!(read_status(&mut reader).unwrap(), OrderStatus::Received);
        assert_eq!(read_status(&mut reader).unwrap(), OrderStatus::Preparing);
        assert_eq!(read_status(&mut reader).unwrap(), OrderStatus::Canceled);
        assert!(matches!(read_status(&mut reader), Err(WireError::Closed)));
    }

    #[test]
    fn test_truncated_code_means_closed() {
        let mut reader = Cursor::new(vec![1, 0]);
        assert!(matches!(read_code(&mut reader), Err(WireError::Closed)));
    }

    #[test]
    fn test_unknown_status_code() {
        let mut reader = Cursor::new(encode_code(9).to_vec());
        assert!(matches!(read_status(&mut reader), Err(WireError::UnknownStatus(9))));
    }

    #[test]
    fn test_customer_requests() {
        let mut buffer = Vec::new();
        write_code(&mut buffer, 6).unwrap();
        write_code(&mut buffer, 42).unwrap();
        let mut reader = Cursor::new(buffer);
        assert_eq!(read_customer_request(&mut reader).unwrap(), CustomerRequest::Cancel);
        assert_eq!(read_customer_request(&mut reader).unwrap(), CustomerRequest::Unknown(42));
    }
}
