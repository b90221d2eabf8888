//! Separate-chaining hash table from string keys to record slots

/// Polynomial rolling hash with multiplier 31 over the key's bytes
pub fn polynomial_hash(key: &str) -> u64 {
    key.bytes()
        .fold(0u64, |hash, byte| hash.wrapping_mul(31).wrapping_add(u64::from(byte)))
}

#[derive(Debug)]
struct ChainNode {
    key: String,
    slot: usize,
    next: Option<Box<ChainNode>>,
}

type Link = Option<Box<ChainNode>>;

/// Bucket array of singly linked chains. New entries go to the chain head.
#[derive(Debug)]
pub(super) struct ChainTable {
    buckets: Vec<Link>,
    len: usize,
}

impl ChainTable {
    pub(super) fn with_capacity(capacity: usize) -> Self {
        Self {
            buckets: empty_buckets(capacity.max(1)),
            len: 0,
        }
    }

    pub(super) fn capacity(&self) -> usize {
        self.buckets.len()
    }

    pub(super) fn len(&self) -> usize {
        self.len
    }

    pub(super) fn bucket_of(&self, key: &str) -> usize {
        (polynomial_hash(key) % self.buckets.len() as u64) as usize
    }

    pub(super) fn push(&mut self, key: String, slot: usize) {
        let bucket = self.bucket_of(&key);
        let next = self.buckets[bucket].take();
        self.buckets[bucket] = Some(Box::new(ChainNode { key, slot, next }));
        self.len += 1;
    }

    pub(super) fn get(&self, key: &str) -> Option<usize> {
        let mut current = self.buckets[self.bucket_of(key)].as_deref();
        while let Some(node) = current {
            if node.key == key {
                return Some(node.slot);
            }
            current = node.next.as_deref();
        }
        None
    }

    /// Remove the entry for `key`, returning its slot
    pub(super) fn unlink(&mut self, key: &str) -> Option<usize> {
        let bucket = self.bucket_of(key);
        let mut link = &mut self.buckets[bucket];
        while link.as_ref().is_some_and(|node| node.key != key) {
            link = &mut link.as_mut()?.next;
        }
        let mut removed = link.take()?;
        *link = removed.next.take();
        self.len -= 1;
        Some(removed.slot)
    }

    /// Move every entry into `capacity` fresh buckets, reusing the nodes
    pub(super) fn rehash(&mut self, capacity: usize) {
        let old = std::mem::replace(&mut self.buckets, empty_buckets(capacity.max(1)));
        for mut head in old {
            while let Some(mut node) = head {
                head = node.next.take();
                let bucket = self.bucket_of(&node.key);
                node.next = self.buckets[bucket].take();
                self.buckets[bucket] = Some(node);
            }
        }
    }

    pub(super) fn clear(&mut self) {
        let capacity = self.capacity();
        self.buckets = empty_buckets(capacity);
        self.len = 0;
    }

    /// Entries as (bucket, key, slot), bucket by bucket, chain order
    pub(super) fn entries(&self) -> impl Iterator<Item = (usize, &str, usize)> + '_ {
        self.buckets.iter().enumerate().flat_map(|(bucket, head)| {
            let mut current = head.as_deref();
            std::iter::from_fn(move || {
                let node = current?;
                current = node.next.as_deref();
                Some((bucket, node.key.as_str(), node.slot))
            })
        })
    }
}

impl Drop for ChainTable {
    // Unlink chains iteratively so long chains cannot overflow the stack
    fn drop(&mut self) {
        for head in &mut self.buckets {
            let mut current = head.take();
            while let Some(mut node) = current {
                current = node.next.take();
            }
        }
    }
}

fn empty_buckets(capacity: usize) -> Vec<Link> {
    std::iter::repeat_with(|| None).take(capacity).collect()
}
