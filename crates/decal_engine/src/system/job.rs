use tracing::warn;

use crate::DecalError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Idle,
    Scheduled,
}

/// At most one outstanding job per target buffer.
///
/// `schedule` is the only `Idle -> Scheduled` transition and `take` the only way back.
#[derive(Debug)]
pub(crate) struct JobSlot<T> {
    target: &'static str,
    pending: Option<T>,
}

impl<T> JobSlot<T> {
    pub(crate) fn new(target: &'static str) -> Self {
        Self {
            target,
            pending: None,
        }
    }

    pub(crate) fn state(&self) -> JobState {
        if self.pending.is_some() {
            JobState::Scheduled
        } else {
            JobState::Idle
        }
    }

    /// Fails with `JobPending` while a job is outstanding.
    pub(crate) fn ensure_idle(&self, operation: &'static str) -> Result<(), DecalError> {
        if self.pending.is_none() {
            return Ok(());
        }
        warn!(target_buffer = self.target, operation, "job_pending_rejected");
        Err(DecalError::JobPending {
            target: self.target,
        })
    }

    pub(crate) fn schedule(&mut self, operation: &'static str, job: T) -> Result<(), DecalError> {
        self.ensure_idle(operation)?;
        self.pending = Some(job);
        Ok(())
    }

    pub(crate) fn take(&mut self) -> Option<T> {
        self.pending.take()
    }
}
