//! Submission side of the transfer queue

use super::transfer::Transfer;

/// Why a submission was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SubmitError {
    /// A descriptor in the chain is still in flight
    Busy,
    /// The bus driver cannot accept another chain right now
    DriverFull,
}

/// Hand-off point to whatever actually clocks bytes
///
/// `begin_transfer` must not block. The driver takes ownership of the
/// chain and eventually calls [`Transfer::complete`] on every descriptor
/// in it, whatever the outcome.
pub trait BusDriver {
    fn begin_transfer(&mut self, head: &'static Transfer) -> Result<(), SubmitError>;
}

impl<D: BusDriver + ?Sized> BusDriver for &mut D {
    fn begin_transfer(&mut self, head: &'static Transfer) -> Result<(), SubmitError> {
        (**self).begin_transfer(head)
    }
}

/// Submission counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct QueueStats {
    /// Chains handed to the driver
    pub submitted: u32,
    /// Submissions refused as busy or by the driver
    pub rejected: u32,
}

/// Busy-gated front end of one physical bus
///
/// Only the poll loop owns this, so only the poll loop ever sets busy.
pub struct I2cQueue<D: BusDriver> {
    driver: D,
    stats: QueueStats,
}

impl<D: BusDriver> I2cQueue<D> {
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            stats: QueueStats::default(),
        }
    }

    /// Check if every descriptor of the chain is idle
    pub fn is_admissible(head: &'static Transfer) -> bool {
        head.chain().all(|t| !t.is_busy())
    }

    /// Submit a chain to the bus driver
    ///
    /// Marks every descriptor of the chain busy and hands the head over.
    /// A busy chain is refused and left untouched. If the driver refuses,
    /// busy is rolled back so the next tick can retry.
    pub fn submit(&mut self, head: &'static Transfer) -> Result<(), SubmitError> {
        if !Self::is_admissible(head) {
            self.stats.rejected = self.stats.rejected.wrapping_add(1);
            return Err(SubmitError::Busy);
        }

        head.chain().for_each(Transfer::begin);

        if let Err(e) = self.driver.begin_transfer(head) {
            head.chain().for_each(Transfer::abandon);
            self.stats.rejected = self.stats.rejected.wrapping_add(1);
            return Err(e);
        }

        self.stats.submitted = self.stats.submitted.wrapping_add(1);
        Ok(())
    }

    /// Submission counters since boot
    pub fn stats(&self) -> QueueStats {
        self.stats
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::TransferStatus;
    use crate::mocks::MockBus;
    use leafy_hal::BusError;

    #[test]
    fn test_submit_marks_busy() {
        static T: Transfer = Transfer::write(0x3E);
        let mut queue = I2cQueue::new(MockBus::new());

        assert!(queue.submit(&T).is_ok());
        assert!(T.is_busy());
        assert_eq!(T.status(), TransferStatus::InFlight);
        assert_eq!(queue.driver().submitted(), 1);
    }

    #[test]
    fn test_submit_while_busy_is_rejected() {
        static T: Transfer = Transfer::write(0x3E);
        let mut queue = I2cQueue::new(MockBus::new());

        queue.submit(&T).unwrap();
        assert_eq!(queue.submit(&T), Err(SubmitError::Busy));
        assert!(T.is_busy());
        assert_eq!(queue.driver().submitted(), 1);
        assert_eq!(queue.stats().rejected, 1);

        // Busy clears only on completion
        queue.driver_mut().complete_all(Ok(()));
        assert!(!T.is_busy());
        assert!(queue.submit(&T).is_ok());
    }

    #[test]
    fn test_failed_completion_still_clears_busy() {
        static T: Transfer = Transfer::write(0x2D);
        let mut queue = I2cQueue::new(MockBus::new());

        queue.submit(&T).unwrap();
        queue.driver_mut().complete_all(Err(BusError::Nack));
        assert!(!T.is_busy());
        assert!(queue.submit(&T).is_ok());
    }

    #[test]
    fn test_busy_tail_blocks_whole_chain() {
        static HEAD: Transfer = Transfer::write(0x2D);
        static TAIL: Transfer = Transfer::write(0x2D);
        HEAD.link(&TAIL);
        let mut queue = I2cQueue::new(MockBus::new());

        queue.submit(&TAIL).unwrap();
        assert_eq!(queue.submit(&HEAD), Err(SubmitError::Busy));
        assert!(!HEAD.is_busy());
    }

    #[test]
    fn test_driver_refusal_rolls_back() {
        static HEAD: Transfer = Transfer::write(0x2D);
        static TAIL: Transfer = Transfer::write(0x2D);
        HEAD.link(&TAIL);
        let mut queue = I2cQueue::new(MockBus::new());

        queue.driver_mut().set_full(true);
        assert_eq!(queue.submit(&HEAD), Err(SubmitError::DriverFull));
        assert!(!HEAD.is_busy());
        assert!(!TAIL.is_busy());
        assert_eq!(HEAD.status(), TransferStatus::Idle);

        queue.driver_mut().set_full(false);
        assert!(queue.submit(&HEAD).is_ok());
        assert!(HEAD.is_busy() && TAIL.is_busy());
        assert_eq!(queue.stats().submitted, 1);
    }
}
