use crossbeam_channel::{unbounded, Receiver, Sender};
use std::num::NonZeroUsize;
use tracing::{debug, trace};

use crate::aggregate::ScanTotals;
use crate::errors::{TallyError, TallyResult};
use crate::partition::ByteRange;

/// The rank that receives the reduced value
pub const ROOT_RANK: usize = 0;

/// What a rank hands to the reduction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Contribution {
    /// The rank finished its range
    Totals(ScanTotals),
    /// The rank could not finish its range; it still takes part in the
    /// collective so nobody waits forever
    Failed { range: ByteRange, reason: String },
}

#[derive(Debug)]
enum Packet {
    Contribute {
        rank: usize,
        contribution: Contribution,
    },
    /// A rank was dropped without ever calling the reduction
    Departed { rank: usize },
    Release,
}

/// A rank's handle on the world: its identity plus the channels of the
/// collective. Ranks share nothing else.
#[derive(Debug)]
pub struct Communicator {
    rank: usize,
    size: usize,
    inbox: Receiver<Packet>,
    root: Sender<Packet>,
    /// Senders to every rank's inbox, only held by the root
    peers: Vec<Sender<Packet>>,
    reduced: bool,
}

/// Creates one communicator per rank for a world of `size` ranks
pub fn world(size: NonZeroUsize) -> Vec<Communicator> {
    let size = size.get();
    let (senders, receivers): (Vec<_>, Vec<_>) = (0..size).map(|_| unbounded()).unzip();

    let root = senders[ROOT_RANK].clone();
    receivers
        .into_iter()
        .enumerate()
        .map(|(rank, inbox)| Communicator {
            rank,
            size,
            inbox,
            root: root.clone(),
            peers: if rank == ROOT_RANK {
                senders.clone()
            } else {
                Vec::new()
            },
            reduced: false,
        })
        .collect()
}

impl Communicator {
    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_root(&self) -> bool {
        self.rank == ROOT_RANK
    }

    /// Collective sum-reduction of every rank's contribution onto the root.
    ///
    /// Blocks until all ranks have contributed. The root gets `Some` grand
    /// total, every other rank gets `None`. If any rank contributed a
    /// failure the root gets the failure of the lowest such rank instead.
    /// Consuming the communicator makes the reduction one-shot.
    pub fn reduce_sum(mut self, contribution: Contribution) -> TallyResult<Option<ScanTotals>> {
        self.reduced = true;
        if self.is_root() {
            self.reduce_at_root(contribution).map(Some)
        } else {
            self.contribute(contribution).map(|_| None)
        }
    }

    fn contribute(&self, contribution: Contribution) -> TallyResult<()> {
        trace!("Rank {} contributing to reduction", self.rank);
        self.root
            .send(Packet::Contribute {
                rank: self.rank,
                contribution,
            })
            .map_err(|_| TallyError::communicator("root rank is gone"))?;

        match self.inbox.recv() {
            Ok(Packet::Release) => Ok(()),
            Ok(other) => Err(TallyError::communicator(format!(
                "rank {} expected a release, got {:?}",
                self.rank, other
            ))),
            Err(_) => Err(TallyError::communicator(format!(
                "root rank hung up before releasing rank {}",
                self.rank
            ))),
        }
    }

    fn reduce_at_root(&self, own: Contribution) -> TallyResult<ScanTotals> {
        let mut slots: Vec<Option<Packet>> = (0..self.size).map(|_| None).collect();
        slots[ROOT_RANK] = Some(Packet::Contribute {
            rank: ROOT_RANK,
            contribution: own,
        });

        let mut pending = self.size - 1;
        while pending > 0 {
            // The root holds a sender to its own inbox, so this only fails
            // if the world was torn down underneath us.
            let packet = self
                .inbox
                .recv()
                .map_err(|_| TallyError::communicator("root inbox closed"))?;
            let rank = match &packet {
                Packet::Contribute { rank, .. } | Packet::Departed { rank } => *rank,
                Packet::Release => continue,
            };
            if slots[rank].replace(packet).is_none() {
                pending -= 1;
            }
        }

        for peer in self.peers.iter().skip(1) {
            // A departed rank has no inbox left to release
            let _ = peer.send(Packet::Release);
        }
        debug!("Reduction complete across {} ranks", self.size);

        let mut grand = ScanTotals::new();
        for slot in slots.into_iter().flatten() {
            match slot {
                Packet::Contribute {
                    contribution: Contribution::Totals(totals),
                    ..
                } => grand += totals,
                Packet::Contribute {
                    rank,
                    contribution: Contribution::Failed { range, reason },
                } => return Err(TallyError::worker_failed(rank, range, reason)),
                Packet::Departed { rank } => {
                    return Err(TallyError::communicator(format!(
                        "rank {} left without contributing",
                        rank
                    )))
                }
                Packet::Release => {}
            }
        }
        Ok(grand)
    }
}

impl Drop for Communicator {
    fn drop(&mut self) {
        if !self.reduced && !self.is_root() {
            let _ = self.root.send(Packet::Departed { rank: self.rank });
        }
    }
}
