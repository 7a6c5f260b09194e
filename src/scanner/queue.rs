//! The sealed queue of ports shared by all workers.
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{mpsc, Mutex};

/// Pre-loaded, closed channel of ports.
///
/// Every port is pushed before any worker starts and the sending half is
/// dropped straight after, so `next` yields each queued port to exactly one
/// caller and then `None` forever.
#[derive(Debug)]
pub struct WorkQueue {
    receiver: Mutex<mpsc::Receiver<u16>>,
    claimed: AtomicUsize,
}

impl WorkQueue {
    /// Loads `ports` into a channel sized to hold all of them and seals it.
    pub fn sealed(ports: &[u16]) -> Self {
        let (sender, receiver) = mpsc::channel(ports.len().max(1));
        for &port in ports {
            sender
                .try_send(port)
                .expect("channel capacity covers the whole port list");
        }
        drop(sender);

        Self {
            receiver: Mutex::new(receiver),
            claimed: AtomicUsize::new(0),
        }
    }

    /// Claims the next port, or returns `None` once the queue is drained.
    pub async fn next(&self) -> Option<u16> {
        let port = self.receiver.lock().await.recv().await;
        if port.is_some() {
            self.claimed.fetch_add(1, Ordering::Relaxed);
        }
        port
    }

    /// How many ports have been handed out so far.
    pub fn claimed(&self) -> usize {
        self.claimed.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::WorkQueue;
    use std::sync::Arc;

    #[tokio::test]
    async fn drains_in_input_order_then_ends() {
        let queue = WorkQueue::sealed(&[443, 22, 80]);

        assert_eq!(queue.next().await, Some(443));
        assert_eq!(queue.next().await, Some(22));
        assert_eq!(queue.next().await, Some(80));
        assert_eq!(queue.next().await, None);
        assert_eq!(queue.next().await, None);
        assert_eq!(queue.claimed(), 3);
    }

    #[tokio::test]
    async fn keeps_duplicates() {
        let queue = WorkQueue::sealed(&[80, 80]);

        assert_eq!(queue.next().await, Some(80));
        assert_eq!(queue.next().await, Some(80));
        assert_eq!(queue.next().await, None);
    }

    #[tokio::test]
    async fn empty_queue_ends_immediately() {
        let queue = WorkQueue::sealed(&[]);
        assert_eq!(queue.next().await, None);
        assert_eq!(queue.claimed(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_consumers_claim_each_port_once() {
        let ports: Vec<u16> = (1..=2_000).collect();
        let queue = Arc::new(WorkQueue::sealed(&ports));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let queue = Arc::clone(&queue);
            handles.push(tokio::spawn(async move {
                let mut taken = Vec::new();
                while let Some(port) = queue.next().await {
                    taken.push(port);
                }
                taken
            }));
        }

        let mut all = Vec::new();
        for handle in handles {
            all.extend(handle.await.unwrap());
        }
        all.sort_unstable();

        assert_eq!(all, ports);
        assert_eq!(queue.claimed(), ports.len());
    }
}
