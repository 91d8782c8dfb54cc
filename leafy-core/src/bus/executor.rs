//! Bus side: performs submitted chains on an async I2C master

use embedded_hal_async::i2c::{Error as _, I2c};
use leafy_hal::BusError;

use super::transfer::{Direction, Transfer, MAX_CHAIN, TRANSFER_CAPACITY};

/// Perform every descriptor of a chain, completing each in order
///
/// Write payloads are copied out before the bus is touched and read data
/// is copied back after, so no lock is held across an await. A write
/// without stop followed by a read from the same address becomes one
/// write-then-read transaction with a repeated start.
///
/// Returns the number of descriptors that failed.
pub async fn execute<I: I2c>(i2c: &mut I, head: &'static Transfer) -> usize {
    let mut failed = 0;
    let mut walked = 0;
    let mut cursor = Some(head);

    while let Some(transfer) = cursor {
        if walked >= MAX_CHAIN {
            break;
        }
        let next = transfer.next();
        let address = transfer.address();

        let combined = match next {
            Some(read) if is_write_read_pair(transfer, read) => Some(read),
            _ => None,
        };

        if let Some(read) = combined {
            let mut out = [0u8; TRANSFER_CAPACITY];
            let out_len = transfer.copy_out(&mut out);
            let mut rx = [0u8; TRANSFER_CAPACITY];
            let rx_len = read.len();

            let result = i2c
                .write_read(address, &out[..out_len], &mut rx[..rx_len])
                .await
                .map_err(|e| BusError::from(e.kind()));
            if result.is_ok() {
                read.store_received(&rx[..rx_len]);
            } else {
                failed += 2;
            }
            transfer.complete(result);
            let after = read.next();
            read.complete(result);

            walked += 2;
            cursor = after;
            continue;
        }

        let result = match transfer.direction() {
            Direction::Write => {
                let mut out = [0u8; TRANSFER_CAPACITY];
                let len = transfer.copy_out(&mut out);
                i2c.write(address, &out[..len])
                    .await
                    .map_err(|e| BusError::from(e.kind()))
            }
            Direction::Read => {
                let mut rx = [0u8; TRANSFER_CAPACITY];
                let len = transfer.len();
                let result = i2c
                    .read(address, &mut rx[..len])
                    .await
                    .map_err(|e| BusError::from(e.kind()));
                if result.is_ok() {
                    transfer.store_received(&rx[..len]);
                }
                result
            }
        };
        if result.is_err() {
            failed += 1;
        }
        transfer.complete(result);

        walked += 1;
        cursor = next;
    }

    failed
}

fn is_write_read_pair(write: &Transfer, read: &Transfer) -> bool {
    write.direction() == Direction::Write
        && !write.stop()
        && read.direction() == Direction::Read
        && read.address() == write.address()
}

/// Fail every descriptor of a chain that is still in flight
///
/// Used when the bus side gives up on a chain (timeout) so busy always
/// clears.
pub fn abort_chain(head: &'static Transfer, error: BusError) -> usize {
    let mut aborted = 0;
    for transfer in head.chain().filter(|t| t.is_busy()) {
        transfer.complete(Err(error));
        aborted += 1;
    }
    aborted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::{I2cQueue, TransferStatus};
    use crate::mocks::{MockBus, MockI2c, MockOp};
    use embassy_futures::block_on;

    #[test]
    fn test_write_chain_in_order() {
        static RED: Transfer = Transfer::write(0x2D);
        static GREEN: Transfer = Transfer::write(0x2D);
        RED.link(&GREEN);
        RED.stage(&[0x01, 0xFF]);
        GREEN.stage(&[0x02, 0x80]);

        let mut queue = I2cQueue::new(MockBus::new());
        queue.submit(&RED).unwrap();

        let mut i2c = MockI2c::new();
        assert_eq!(block_on(execute(&mut i2c, &RED)), 0);

        assert_eq!(i2c.ops().len(), 2);
        assert_eq!(i2c.ops()[0], MockOp::write(0x2D, &[0x01, 0xFF]));
        assert_eq!(i2c.ops()[1], MockOp::write(0x2D, &[0x02, 0x80]));
        assert!(!RED.is_busy() && !GREEN.is_busy());
        assert_eq!(GREEN.status(), TransferStatus::Done);
    }

    #[test]
    fn test_read_stores_data() {
        static BUTTONS: Transfer = Transfer::read(0x39, 1);
        let mut i2c = MockI2c::new();
        i2c.set_read_data(&[0xFE]);

        BUTTONS.begin();
        block_on(execute(&mut i2c, &BUTTONS));
        BUTTONS.with_data(|d| assert_eq!(d, &[0xFE]));
        assert!(!BUTTONS.is_busy());
    }

    #[test]
    fn test_failed_read_keeps_last_data() {
        static BUTTONS: Transfer = Transfer::read(0x39, 1);
        let mut i2c = MockI2c::new();
        i2c.fail_next(embedded_hal::i2c::ErrorKind::ArbitrationLoss);

        BUTTONS.begin();
        assert_eq!(block_on(execute(&mut i2c, &BUTTONS)), 1);
        BUTTONS.with_data(|d| assert_eq!(d, &[0xFF]));
        assert!(!BUTTONS.is_busy());
        assert_eq!(BUTTONS.take_failure(), Some(BusError::ArbitrationLost));
    }

    #[test]
    fn test_write_without_stop_combines_with_read() {
        static SELECT: Transfer = Transfer::write_no_stop(0x50);
        static DATA: Transfer = Transfer::read(0x50, 2);
        SELECT.link(&DATA);
        SELECT.stage(&[0x10]);

        let mut i2c = MockI2c::new();
        i2c.set_read_data(&[0xAB, 0xCD]);
        SELECT.begin();
        DATA.begin();
        block_on(execute(&mut i2c, &SELECT));

        assert_eq!(i2c.ops().len(), 1);
        assert_eq!(i2c.ops()[0], MockOp::write_read(0x50, &[0x10], 2));
        DATA.with_data(|d| assert_eq!(d, &[0xAB, 0xCD]));
        assert!(!SELECT.is_busy() && !DATA.is_busy());
    }

    #[test]
    fn test_abort_clears_busy() {
        static A: Transfer = Transfer::write(0x2D);
        static B: Transfer = Transfer::write(0x2D);
        A.link(&B);
        A.begin();
        B.begin();
        B.complete(Ok(()));

        assert_eq!(abort_chain(&A, BusError::Timeout), 1);
        assert!(!A.is_busy());
        assert_eq!(A.status(), TransferStatus::Failed(BusError::Timeout));
        assert_eq!(B.status(), TransferStatus::Done);
    }
}
