//! Channel-backed capability adapters.
//!
//! Stock [`Source`] and [`Sink`] implementations over bounded crossbeam
//! channels, for feeding the engine from another thread and observing its
//! output. Both sides drop rather than block when the consumer falls
//! behind, so the real-time loop never stalls on them.

use crate::engine::{Sink, Source};
use crate::types::Pose;
use crate::{EngineError, Result};
use crossbeam_channel::{Receiver, Sender, TrySendError};

/// Producer half of a [`ChannelSource`].
#[derive(Clone)]
pub struct PoseSender {
    sender: Sender<Pose>,
}

impl PoseSender {
    /// Push a sample. Drops it if the buffer is full (the source only ever
    /// wants the newest value anyway).
    pub fn send(&self, pose: Pose) {
        match self.sender.try_send(pose) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                log::trace!("pose channel full, dropping sample");
            }
            Err(TrySendError::Disconnected(_)) => {
                log::trace!("pose channel disconnected, dropping sample");
            }
        }
    }
}

/// Source that drains a channel and keeps the newest value.
///
/// `sample` never blocks and never fails: before the first sample arrives
/// it reports the origin pose, afterwards it repeats the last received
/// value until a newer one shows up.
pub struct ChannelSource {
    receiver: Receiver<Pose>,
    last: Pose,
}

/// Create a connected sender/source pair with the given buffer capacity.
pub fn channel_source(capacity: usize) -> (PoseSender, ChannelSource) {
    let (sender, receiver) = crossbeam_channel::bounded(capacity);
    (
        PoseSender { sender },
        ChannelSource {
            receiver,
            last: Pose::ZERO,
        },
    )
}

impl Source for ChannelSource {
    fn sample(&mut self) -> Result<Pose> {
        while let Ok(pose) = self.receiver.try_recv() {
            self.last = pose;
        }
        Ok(self.last)
    }
}

/// Sink that forwards delivered poses into a channel.
///
/// A full buffer drops the pose; a vanished receiver is reported as a sink
/// error (the loop logs it and carries on).
pub struct ChannelSink {
    sender: Sender<Pose>,
}

/// Create a connected sink/receiver pair with the given buffer capacity.
pub fn channel_sink(capacity: usize) -> (ChannelSink, Receiver<Pose>) {
    let (sender, receiver) = crossbeam_channel::bounded(capacity);
    (ChannelSink { sender }, receiver)
}

impl Sink for ChannelSink {
    fn deliver(&mut self, pose: Pose) -> Result<()> {
        match self.sender.try_send(pose) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                log::trace!("output channel full, dropping pose");
                Ok(())
            }
            Err(TrySendError::Disconnected(_)) => {
                Err(EngineError::Sink("output channel disconnected".into()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pose_x(x: f64) -> Pose {
        Pose { x, ..Pose::ZERO }
    }

    #[test]
    fn test_source_repeats_latest_value() {
        let (sender, mut source) = channel_source(8);

        // nothing sent yet: origin
        assert_eq!(source.sample().unwrap(), Pose::ZERO);

        sender.send(pose_x(1.0));
        sender.send(pose_x(2.0));
        // drains to the newest, then repeats it
        assert_eq!(source.sample().unwrap(), pose_x(2.0));
        assert_eq!(source.sample().unwrap(), pose_x(2.0));
    }

    #[test]
    fn test_source_survives_sender_drop() {
        let (sender, mut source) = channel_source(8);
        sender.send(pose_x(3.0));
        drop(sender);
        assert_eq!(source.sample().unwrap(), pose_x(3.0));
        assert_eq!(source.sample().unwrap(), pose_x(3.0));
    }

    #[test]
    fn test_sender_drop_on_full() {
        let (sender, mut source) = channel_source(1);
        sender.send(pose_x(1.0));
        sender.send(pose_x(2.0)); // dropped, buffer full
        assert_eq!(source.sample().unwrap(), pose_x(1.0));
    }

    #[test]
    fn test_sink_delivery_and_disconnect() {
        let (mut sink, receiver) = channel_sink(8);
        sink.deliver(pose_x(5.0)).unwrap();
        assert_eq!(receiver.recv().unwrap(), pose_x(5.0));

        drop(receiver);
        assert!(sink.deliver(pose_x(6.0)).is_err());
    }
}
