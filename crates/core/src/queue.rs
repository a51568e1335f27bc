//! Triage waiting queue held in a priority-ordered singly linked list.
//!
//! Records are kept sorted by ascending priority level (1 = Critical first). Records with the
//! same level are served in arrival order: a new arrival is placed after every queued record of
//! equal priority, never before.
//!
//! The queue stores its own copies of records. It never refers back into a
//! [`RecordStore`](crate::RecordStore), even when an entry was looked up there first.

use crate::arena::{Arena, NodeId};
use crate::error::{ClinicError, ClinicResult};
use crate::persistence;
use crate::record::Record;
use std::io::{BufRead, Write};
use std::iter::FusedIterator;
use std::path::Path;

#[derive(Debug)]
struct QueueNode {
    record: Record,
    next: Option<NodeId>,
}

/// Priority-ordered waiting queue.
#[derive(Debug, Default)]
pub struct WaitQueue {
    nodes: Arena<QueueNode>,
    front: Option<NodeId>,
    rear: Option<NodeId>,
}

impl WaitQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a queue from the records persisted at `path`.
    ///
    /// A missing file yields an empty queue.
    pub fn load(path: &Path) -> ClinicResult<Self> {
        let mut queue = Self::new();
        queue.restore(path)?;
        Ok(queue)
    }

    pub fn is_empty(&self) -> bool {
        self.front.is_none()
    }

    /// Number of queued records.
    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    pub fn len(&self) -> usize {
        self.size()
    }

    /// Inserts a record behind every queued record of equal or more urgent priority.
    pub fn enqueue(&mut self, record: Record) {
        let priority = record.priority;
        tracing::debug!(
            "patient {} added to queue (priority: {})",
            record.name,
            priority
        );

        let Some(front) = self.front else {
            let id = self.nodes.insert(QueueNode { record, next: None });
            self.front = Some(id);
            self.rear = Some(id);
            return;
        };

        if priority < self.nodes[front].record.priority {
            let id = self.nodes.insert(QueueNode {
                record,
                next: Some(front),
            });
            self.front = Some(id);
            return;
        }

        // Walk past every node with priority <= the new one, so equal priorities stay FIFO.
        let mut current = front;
        while let Some(next) = self.nodes[current].next {
            if self.nodes[next].record.priority > priority {
                break;
            }
            current = next;
        }

        let after = self.nodes[current].next;
        let id = self.nodes.insert(QueueNode {
            record,
            next: after,
        });
        self.nodes[current].next = Some(id);

        if after.is_none() {
            self.rear = Some(id);
        }
    }

    /// Removes and returns the front record.
    ///
    /// # Errors
    ///
    /// Returns [`ClinicError::EmptyQueue`] if nothing is queued; the queue is left untouched.
    /// Callers that want the placeholder record instead can use `unwrap_or_default()`.
    pub fn dequeue(&mut self) -> ClinicResult<Record> {
        let Some(front) = self.front else {
            tracing::error!("queue is empty");
            return Err(ClinicError::EmptyQueue);
        };

        let Some(node) = self.nodes.remove(front) else {
            return Err(ClinicError::EmptyQueue);
        };
        self.front = node.next;
        if self.front.is_none() {
            self.rear = None;
        }
        Ok(node.record)
    }

    /// The front record, without removing it.
    ///
    /// # Errors
    ///
    /// Returns [`ClinicError::EmptyQueue`] if nothing is queued.
    pub fn peek(&self) -> ClinicResult<&Record> {
        match self.front {
            Some(front) => Ok(&self.nodes[front].record),
            None => {
                tracing::error!("queue is empty");
                Err(ClinicError::EmptyQueue)
            }
        }
    }

    /// The rear record, if any.
    pub fn back(&self) -> Option<&Record> {
        self.rear.map(|id| &self.nodes[id].record)
    }

    /// Records from front to rear, paired with their 1-based position.
    pub fn display_order(&self) -> impl Iterator<Item = (usize, &Record)> + '_ {
        self.iter().enumerate().map(|(index, record)| (index + 1, record))
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter {
            nodes: &self.nodes,
            current: self.front,
            remaining: self.size(),
        }
    }

    /// Writes every record, front to rear, to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ClinicError::StorageWrite`] if the file cannot be opened or written.
    pub fn persist(&self, path: &Path) -> ClinicResult<usize> {
        let saved = persistence::save_records(path, self.iter())?;
        tracing::info!("queue of {} saved to {}", saved, path.display());
        Ok(saved)
    }

    /// Enqueues every record persisted at `path`.
    ///
    /// Each record goes through [`enqueue`](Self::enqueue), so a file that is out of priority
    /// order still produces a correctly ordered queue. A missing file is not an error.
    pub fn restore(&mut self, path: &Path) -> ClinicResult<usize> {
        let Some(records) = persistence::load_records(path)? else {
            tracing::info!("no existing queue data found, starting fresh");
            return Ok(0);
        };

        let loaded = records.len();
        self.extend(records);
        tracing::info!("loaded {} patients into queue from {}", loaded, path.display());
        Ok(loaded)
    }

    pub fn write_to<W: Write>(&self, writer: W) -> std::io::Result<usize> {
        persistence::write_records(writer, self.iter())
    }

    pub fn read_from<R: BufRead>(&mut self, reader: R) -> std::io::Result<usize> {
        let records = persistence::read_records(reader)?;
        let loaded = records.len();
        self.extend(records);
        Ok(loaded)
    }
}

impl Extend<Record> for WaitQueue {
    fn extend<T: IntoIterator<Item = Record>>(&mut self, iter: T) {
        for record in iter {
            self.enqueue(record);
        }
    }
}

impl FromIterator<Record> for WaitQueue {
    fn from_iter<T: IntoIterator<Item = Record>>(iter: T) -> Self {
        let mut queue = Self::new();
        queue.extend(iter);
        queue
    }
}

impl<'a> IntoIterator for &'a WaitQueue {
    type Item = &'a Record;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Front-to-rear iterator over a [`WaitQueue`].
pub struct Iter<'a> {
    nodes: &'a Arena<QueueNode>,
    current: Option<NodeId>,
    remaining: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Record;

    fn next(&mut self) -> Option<Self::Item> {
        let nodes = self.nodes;
        let node = &nodes[self.current?];
        self.current = node.next;
        self.remaining -= 1;
        Some(&node.record)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl FusedIterator for Iter<'_> {}
