//! The intrusive table core: buckets, links, and the operations that thread
//! caller-owned elements onto bucket chains.

use core::fmt::Debug;

use crate::scramble;

/// Chain terminator and "no element" marker for handles.
const NIL: usize = usize::MAX;

/// Returns how many [`Bucket`]s fit in a storage budget of `bytes` bytes.
///
/// This is the byte-budget form of capacity declaration: callers that size
/// their bucket array from a memory budget rather than a bucket count divide
/// here, then build storage of the resulting length. The result may be any
/// value, including zero — constructing a table over zero buckets panics, so
/// budgets smaller than one bucket must be rejected by the caller.
///
/// # Examples
///
/// ```rust
/// # use stitch_hash::{bucket_count_for_bytes, Bucket, HashTable};
/// let budget = 4096;
/// let count = bucket_count_for_bytes(budget);
/// assert_eq!(count, budget / size_of::<Bucket>());
///
/// let table = HashTable::new(vec![Bucket::EMPTY; count]);
/// assert_eq!(table.capacity(), count);
/// ```
#[inline]
pub const fn bucket_count_for_bytes(bytes: usize) -> usize {
    bytes / size_of::<Bucket>()
}

/// One bucket: the head of a chain of elements whose scrambled hash maps to
/// this bucket's index.
///
/// Buckets are plain data. The caller owns the bucket array and builds it
/// however it likes — `[Bucket::EMPTY; N]` on the stack, `vec![Bucket::EMPTY;
/// n]`, a boxed slice, a region carved out of an arena. The table asks
/// nothing of the storage beyond "a slice of buckets".
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    head: usize,
}

impl Bucket {
    /// A bucket with an empty chain. The initial state of every bucket.
    pub const EMPTY: Bucket = Bucket { head: NIL };
}

impl Default for Bucket {
    #[inline]
    fn default() -> Self {
        Bucket::EMPTY
    }
}

impl Debug for Bucket {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.head == NIL {
            f.write_str("Bucket(empty)")
        } else {
            write!(f, "Bucket(head = {})", self.head)
        }
    }
}

/// The per-element link field.
///
/// Embed exactly one `Link` in each element type that participates in a
/// table. The link carries the intra-bucket chain handles and the hash the
/// element was inserted with, so removal and search never recompute it.
///
/// The chain handles encode *membership* in a bucket's chain, nothing more:
/// the table never owns the element, and an element whose link is detached
/// can be freed, reused, or inserted into a different table.
///
/// In debug builds the link additionally tracks whether it is currently
/// threaded into a chain, so double insertion and removal of an unlinked
/// element are caught deterministically by `debug_assert!`. Release builds
/// carry no flag and perform no check.
pub struct Link {
    next: usize,
    prev: usize,
    hash: u64,
    #[cfg(debug_assertions)]
    linked: bool,
}

impl Link {
    /// Creates a fresh, unlinked link.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use stitch_hash::Link;
    /// struct Entry {
    ///     key: u32,
    ///     link: Link,
    /// }
    ///
    /// let entry = Entry {
    ///     key: 7,
    ///     link: Link::new(),
    /// };
    /// # let _ = entry.key;
    /// ```
    #[inline]
    pub const fn new() -> Self {
        Link {
            next: NIL,
            prev: NIL,
            hash: 0,
            #[cfg(debug_assertions)]
            linked: false,
        }
    }

    /// Returns the hash this element was last inserted with.
    ///
    /// Authoritative after insertion: [`HashTable::remove`] and
    /// [`HashTable::rehash_into`] rely on this value instead of recomputing
    /// anything. Before the first insertion it is zero.
    #[inline]
    pub const fn hash(&self) -> u64 {
        self.hash
    }
}

impl Default for Link {
    #[inline]
    fn default() -> Self {
        Link::new()
    }
}

/// Cloning a link yields a fresh, unlinked link.
///
/// A copied chain position would claim membership in a bucket that does not
/// reference the clone, so the linkage is deliberately not carried over.
/// This lets element types that embed a `Link` derive `Clone`.
impl Clone for Link {
    #[inline]
    fn clone(&self) -> Self {
        Link::new()
    }
}

impl Debug for Link {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        fn opt(handle: usize) -> Option<usize> {
            if handle == NIL { None } else { Some(handle) }
        }

        f.debug_struct("Link")
            .field("hash", &self.hash)
            .field("prev", &opt(self.prev))
            .field("next", &opt(self.next))
            .finish()
    }
}

/// Access to the [`Link`] embedded in an element.
///
/// This is the seam between the table and the caller's element type: instead
/// of the table storing wrapper nodes, the element exposes its own link
/// field and the table threads elements together through it.
///
/// # Examples
///
/// ```rust
/// # use stitch_hash::{Link, Linked};
/// struct Session {
///     token: u64,
///     link: Link,
/// }
///
/// impl Linked for Session {
///     fn link(&self) -> &Link {
///         &self.link
///     }
///
///     fn link_mut(&mut self) -> &mut Link {
///         &mut self.link
///     }
/// }
/// # let _ = Session { token: 0, link: Link::new() }.token;
/// ```
pub trait Linked {
    /// Borrows the embedded link.
    fn link(&self) -> &Link;

    /// Mutably borrows the embedded link.
    fn link_mut(&mut self) -> &mut Link;
}

/// How a scrambled hash becomes a bucket index. Fixed at construction.
#[derive(Clone, Copy)]
enum Indexing {
    /// Keep the top `shift` bits of the product. Capacity is a power of two.
    Shift { rshift: u32 },
    /// Reduce the product modulo the capacity. Any capacity works.
    Modulo,
}

/// An allocation-free intrusive hash table over caller-owned storage.
///
/// The table binds a bucket array (any `B` viewable as `[Bucket]` — a `Vec`,
/// a boxed slice, a plain array, a mutable slice) to a capacity and an
/// indexing policy. Elements live in a caller-owned slab and are addressed
/// by slot index; every operation that touches elements takes the slab as an
/// explicit parameter. The table itself never allocates, never frees, and
/// never inspects element payloads.
///
/// Two construction forms select the indexing policy:
///
/// - [`HashTable::new`] accepts any bucket count ≥ 1 and indexes by
///   multiply-then-modulo.
/// - [`HashTable::with_shift`] uses exactly `2^shift` buckets and indexes by
///   multiply-then-top-bits, trading the modulo for a shift.
///
/// Capacity never changes behind your back. There is no automatic growth and
/// no load-factor tracking; when a table gets crowded, build a bigger one
/// and [`rehash_into`](HashTable::rehash_into) it.
///
/// # Contract
///
/// An element may be linked into at most one table at a time. Inserting an
/// element that is already linked, or removing one that is not, corrupts the
/// affected chains; both are caught by `debug_assert!` in debug builds and
/// unchecked (though still memory-safe) in release builds.
///
/// # Examples
///
/// ```rust
/// # use stitch_hash::{Bucket, HashTable, Link, Linked};
/// # struct Node {
/// #     key: u64,
/// #     link: Link,
/// # }
/// # impl Linked for Node {
/// #     fn link(&self) -> &Link {
/// #         &self.link
/// #     }
/// #     fn link_mut(&mut self) -> &mut Link {
/// #         &mut self.link
/// #     }
/// # }
/// # fn node(key: u64) -> Node {
/// #     Node { key, link: Link::new() }
/// # }
/// let mut slots = vec![node(10), node(20)];
/// let mut table = HashTable::new(vec![Bucket::EMPTY; 8]);
///
/// // The caller hashes keys however it likes; here, identity.
/// table.insert(&mut slots, 0, 10);
/// table.insert(&mut slots, 1, 20);
///
/// let hit = table.search(&slots, 20).find(|(_, n)| n.key == 20);
/// assert_eq!(hit.map(|(handle, _)| handle), Some(1));
/// ```
pub struct HashTable<B> {
    buckets: B,
    capacity: usize,
    indexing: Indexing,
}

impl<B> HashTable<B>
where
    B: AsRef<[Bucket]> + AsMut<[Bucket]>,
{
    /// Creates a table over `storage`, using every bucket it holds.
    ///
    /// The capacity is `storage`'s bucket count and may be any value ≥ 1;
    /// indexing multiplies the hash by a Fibonacci constant and reduces the
    /// product modulo the capacity. Every bucket is emptied. No element is
    /// touched.
    ///
    /// # Panics
    ///
    /// Panics if `storage` holds no buckets. A zero-capacity table has no
    /// valid bucket index for any hash.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use stitch_hash::{Bucket, HashTable};
    /// // Capacity need not be a power of two.
    /// let table = HashTable::new(vec![Bucket::EMPTY; 12]);
    /// assert_eq!(table.capacity(), 12);
    /// assert!(table.is_empty());
    ///
    /// // Array-backed storage works too; nothing here allocates.
    /// let table = HashTable::new([Bucket::EMPTY; 4]);
    /// assert_eq!(table.capacity(), 4);
    /// ```
    pub fn new(storage: B) -> Self {
        let capacity = storage.as_ref().len();
        assert!(capacity >= 1, "hash table needs at least one bucket");

        let mut table = HashTable {
            buckets: storage,
            capacity,
            indexing: Indexing::Modulo,
        };
        table.reset_buckets();
        table
    }

    /// Creates a table of exactly `2^shift` buckets over `storage`.
    ///
    /// Indexing keeps the top `shift` bits of the scrambled hash instead of
    /// taking a modulo. Only the first `2^shift` buckets of `storage` are
    /// used (and emptied); any excess stays untouched and remains the
    /// caller's to use. Callers sizing from a byte budget round the bucket
    /// count *up* to the next power of two — rounding down would leave part
    /// of the index range pointing past the end of the table.
    ///
    /// # Panics
    ///
    /// Panics if `shift` is too large for `usize` or if `storage` holds
    /// fewer than `2^shift` buckets.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use stitch_hash::{Bucket, HashTable};
    /// let table = HashTable::with_shift(vec![Bucket::EMPTY; 8], 3);
    /// assert_eq!(table.capacity(), 8);
    ///
    /// // A shift of 0 is a legal single-bucket table.
    /// let table = HashTable::with_shift([Bucket::EMPTY; 1], 0);
    /// assert_eq!(table.capacity(), 1);
    /// ```
    pub fn with_shift(storage: B, shift: u32) -> Self {
        assert!(shift < usize::BITS, "shift {shift} overflows usize");
        let capacity = 1usize << shift;
        assert!(
            storage.as_ref().len() >= capacity,
            "storage holds {} buckets but shift {} needs {}",
            storage.as_ref().len(),
            shift,
            capacity,
        );

        // A shift of 0 would ask for all 64 product bits at once; clamp and
        // let the capacity mask in `bucket_of` reduce the index to 0.
        let rshift = (u64::BITS - shift).min(u64::BITS - 1);

        let mut table = HashTable {
            buckets: storage,
            capacity,
            indexing: Indexing::Shift { rshift },
        };
        table.reset_buckets();
        table
    }

    fn reset_buckets(&mut self) {
        for bucket in &mut self.buckets.as_mut()[..self.capacity] {
            *bucket = Bucket::EMPTY;
        }
    }

    /// Inserts the element in slot `handle`, caching `hash` in its link.
    ///
    /// The element is prepended to the chain of the bucket its scrambled
    /// hash maps to: O(1), no ordering guarantee beyond
    /// most-recently-inserted-first within a bucket, and no duplicate
    /// detection — inserting two elements with equal hashes simply chains
    /// both, and [`HashTable::search`] yields both for the caller's
    /// equality check to tell apart.
    ///
    /// Nothing resizes, ever; load factor is the caller's to watch.
    ///
    /// # Contract
    ///
    /// The element's link must not currently be threaded into any table.
    /// Violations are caught by `debug_assert!` in debug builds.
    ///
    /// # Panics
    ///
    /// Panics if `handle` is out of bounds for `slots`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use stitch_hash::{Bucket, HashTable, Link, Linked};
    /// # struct Node {
    /// #     key: u64,
    /// #     link: Link,
    /// # }
    /// # impl Linked for Node {
    /// #     fn link(&self) -> &Link {
    /// #         &self.link
    /// #     }
    /// #     fn link_mut(&mut self) -> &mut Link {
    /// #         &mut self.link
    /// #     }
    /// # }
    /// # fn node(key: u64) -> Node {
    /// #     Node { key, link: Link::new() }
    /// # }
    /// let mut slots = vec![node(42)];
    /// let mut table = HashTable::new(vec![Bucket::EMPTY; 8]);
    ///
    /// table.insert(&mut slots, 0, 42);
    /// assert!(!table.is_empty());
    /// assert_eq!(slots[0].link().hash(), 42);
    /// ```
    pub fn insert<T: Linked>(&mut self, slots: &mut [T], handle: usize, hash: u64) {
        let index = self.bucket_of(hash);
        let bucket = &mut self.buckets.as_mut()[index];
        let head = bucket.head;
        bucket.head = handle;

        let link = slots[handle].link_mut();
        #[cfg(debug_assertions)]
        {
            debug_assert!(!link.linked, "insert of an already-linked element");
            link.linked = true;
        }
        link.hash = hash;
        link.prev = NIL;
        link.next = head;

        if head != NIL {
            slots[head].link_mut().prev = handle;
        }
    }

    /// Unlinks the element in slot `handle` from the table.
    ///
    /// O(1): the chain is doubly linked, and when the element heads its
    /// chain the owning bucket is found from the cached hash — no
    /// recomputation, no walk. The element itself is untouched and its link
    /// comes out fresh, so the slot may be freed, reused, or inserted into
    /// another table immediately.
    ///
    /// # Contract
    ///
    /// The element must currently be a member of this table. Removing an
    /// unlinked element, or one linked into a different table, is a
    /// contract violation caught by `debug_assert!` in debug builds.
    ///
    /// # Panics
    ///
    /// Panics if `handle` is out of bounds for `slots`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use stitch_hash::{Bucket, HashTable, Link, Linked};
    /// # struct Node {
    /// #     key: u64,
    /// #     link: Link,
    /// # }
    /// # impl Linked for Node {
    /// #     fn link(&self) -> &Link {
    /// #         &self.link
    /// #     }
    /// #     fn link_mut(&mut self) -> &mut Link {
    /// #         &mut self.link
    /// #     }
    /// # }
    /// # fn node(key: u64) -> Node {
    /// #     Node { key, link: Link::new() }
    /// # }
    /// let mut slots = vec![node(42)];
    /// let mut table = HashTable::new(vec![Bucket::EMPTY; 8]);
    ///
    /// table.insert(&mut slots, 0, 42);
    /// table.remove(&mut slots, 0);
    /// assert!(table.is_empty());
    /// assert!(table.search(&slots, 42).next().is_none());
    /// ```
    pub fn remove<T: Linked>(&mut self, slots: &mut [T], handle: usize) {
        let link = slots[handle].link_mut();
        #[cfg(debug_assertions)]
        {
            debug_assert!(link.linked, "remove of an element that is not linked");
            link.linked = false;
        }
        let prev = link.prev;
        let next = link.next;
        let hash = link.hash;
        link.prev = NIL;
        link.next = NIL;

        if prev == NIL {
            // Head of its chain: the owning bucket is recovered from the
            // cached hash.
            let index = self.bucket_of(hash);
            debug_assert_eq!(
                self.buckets.as_ref()[index].head,
                handle,
                "cached hash does not lead back to the element's bucket",
            );
            self.buckets.as_mut()[index].head = next;
        } else {
            slots[prev].link_mut().next = next;
        }

        if next != NIL {
            slots[next].link_mut().prev = prev;
        }
    }

    /// Drains every element of this table into `dst`, rehashing by cached
    /// hash.
    ///
    /// This is the only capacity-change mechanism: to grow or shrink, build
    /// a table over differently-sized storage and move everything across.
    /// `dst` may use either indexing policy and any capacity; elements
    /// already in `dst` stay put. Afterwards this table is empty.
    ///
    /// O(capacity + elements). No hash is recomputed — each element's
    /// cached hash is re-scrambled against `dst`'s capacity.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use stitch_hash::{Bucket, HashTable, Link, Linked};
    /// # struct Node {
    /// #     key: u64,
    /// #     link: Link,
    /// # }
    /// # impl Linked for Node {
    /// #     fn link(&self) -> &Link {
    /// #         &self.link
    /// #     }
    /// #     fn link_mut(&mut self) -> &mut Link {
    /// #         &mut self.link
    /// #     }
    /// # }
    /// # fn node(key: u64) -> Node {
    /// #     Node { key, link: Link::new() }
    /// # }
    /// let mut slots: Vec<Node> = (0..32).map(node).collect();
    /// let mut small = HashTable::new(vec![Bucket::EMPTY; 4]);
    /// for handle in 0..slots.len() {
    ///     let hash = slots[handle].key;
    ///     small.insert(&mut slots, handle, hash);
    /// }
    ///
    /// // Grown storage, different policy — membership carries over.
    /// let mut big = HashTable::with_shift(vec![Bucket::EMPTY; 64], 6);
    /// small.rehash_into(&mut big, &mut slots);
    ///
    /// assert!(small.is_empty());
    /// assert_eq!(big.iter(&slots).count(), 32);
    /// ```
    pub fn rehash_into<T, B2>(&mut self, dst: &mut HashTable<B2>, slots: &mut [T])
    where
        T: Linked,
        B2: AsRef<[Bucket]> + AsMut<[Bucket]>,
    {
        for index in 0..self.capacity {
            loop {
                let head = self.buckets.as_ref()[index].head;
                if head == NIL {
                    break;
                }

                // Pop the chain head and reinsert it under dst's policy.
                let link = slots[head].link_mut();
                #[cfg(debug_assertions)]
                {
                    link.linked = false;
                }
                let next = link.next;
                let hash = link.hash;
                link.prev = NIL;
                link.next = NIL;

                self.buckets.as_mut()[index].head = next;
                if next != NIL {
                    slots[next].link_mut().prev = NIL;
                }

                dst.insert(slots, head, hash);
            }
        }
    }

    /// Consumes the table and returns its backing bucket storage.
    ///
    /// The storage comes back as-is: if the table still holds elements,
    /// their links keep referring to chains threaded through the returned
    /// buckets. Callers tearing a table down remove or
    /// [rehash](HashTable::rehash_into) the elements first — or abandon the
    /// linkage deliberately and reset each link by hand.
    #[inline]
    pub fn into_storage(self) -> B {
        self.buckets
    }
}

impl<B> HashTable<B>
where
    B: AsRef<[Bucket]>,
{
    /// Maps a raw hash to a bucket index.
    ///
    /// Pure and deterministic: the hash is scrambled with
    /// [`mix64`](crate::scramble::mix64) and truncated under this table's indexing
    /// policy. The result is in `[0, capacity)` for every hash and every
    /// legal capacity.
    ///
    /// Exposed for instrumentation and testing; no operation requires the
    /// caller to compute bucket indices.
    #[inline]
    pub fn bucket_of(&self, hash: u64) -> usize {
        let mixed = scramble::mix64(hash);
        match self.indexing {
            // The mask is a no-op for any shift >= 1; it reduces the
            // clamped single-bucket case (see `with_shift`) to index 0.
            Indexing::Shift { rshift } => (mixed >> rshift) as usize & (self.capacity - 1),
            Indexing::Modulo => (mixed % self.capacity as u64) as usize,
        }
    }

    /// Returns the bucket count.
    ///
    /// This is the table's one size metric. The table tracks no element
    /// count — counting elements means traversing.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns `true` if no bucket has a chain.
    ///
    /// O(capacity): with no cached element count, emptiness is a scan of
    /// the bucket heads.
    pub fn is_empty(&self) -> bool {
        self.buckets.as_ref()[..self.capacity]
            .iter()
            .all(|bucket| bucket.head == NIL)
    }

    /// Returns a lazy iterator over the elements inserted with exactly
    /// `hash`.
    ///
    /// Walks the one bucket `hash` scrambles to and filters out chain
    /// neighbors that landed there with a *different* hash, so the caller
    /// only ever sees true hash matches. Distinguishing equal-hash keys is
    /// the caller's job, applied to the yielded elements.
    ///
    /// The iterator borrows the slab, so the borrow checker rules out
    /// structural mutation while it is alive. To remove elements mid-walk,
    /// use [`HashTable::search_walk`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use stitch_hash::{Bucket, HashTable, Link, Linked};
    /// # struct Node {
    /// #     key: u64,
    /// #     link: Link,
    /// # }
    /// # impl Linked for Node {
    /// #     fn link(&self) -> &Link {
    /// #         &self.link
    /// #     }
    /// #     fn link_mut(&mut self) -> &mut Link {
    /// #         &mut self.link
    /// #     }
    /// # }
    /// # fn node(key: u64) -> Node {
    /// #     Node { key, link: Link::new() }
    /// # }
    /// let mut slots = vec![node(1), node(2), node(3)];
    /// let mut table = HashTable::new(vec![Bucket::EMPTY; 8]);
    /// table.insert(&mut slots, 0, 100);
    /// table.insert(&mut slots, 1, 100);
    /// table.insert(&mut slots, 2, 200);
    ///
    /// // Both hash-100 elements, newest first; the hash-200 element is
    /// // filtered out even if it shares the bucket.
    /// let hits: Vec<usize> = table.search(&slots, 100).map(|(h, _)| h).collect();
    /// assert_eq!(hits, vec![1, 0]);
    /// ```
    pub fn search<'a, T: Linked>(&'a self, slots: &'a [T], hash: u64) -> Search<'a, T> {
        let index = self.bucket_of(hash);
        Search {
            slots,
            cursor: self.buckets.as_ref()[index].head,
            hash,
        }
    }

    /// Returns a lazy iterator over every element in the table.
    ///
    /// Visits buckets in index order and each chain head-first, i.e.
    /// most-recently-inserted-first within a bucket; no other order is
    /// guaranteed. Yields each element exactly once.
    ///
    /// The iterator borrows the slab; for removal during traversal use
    /// [`HashTable::walk`].
    pub fn iter<'a, T: Linked>(&'a self, slots: &'a [T]) -> Iter<'a, T> {
        Iter {
            buckets: &self.buckets.as_ref()[..self.capacity],
            slots,
            bucket_index: 0,
            cursor: NIL,
        }
    }

    /// Begins a removal-tolerant full traversal.
    ///
    /// A [`Walk`] holds no borrow between steps: each call to [`Walk::next`]
    /// reads the successor *before* yielding a handle, so the yielded
    /// element may be removed from the table (and its slot reused) inside
    /// the loop body without corrupting the walk. Removing any *other*
    /// element during the walk is a contract violation — the pre-read
    /// successor may then be stale.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use stitch_hash::{Bucket, HashTable, Link, Linked};
    /// # struct Node {
    /// #     key: u64,
    /// #     link: Link,
    /// # }
    /// # impl Linked for Node {
    /// #     fn link(&self) -> &Link {
    /// #         &self.link
    /// #     }
    /// #     fn link_mut(&mut self) -> &mut Link {
    /// #         &mut self.link
    /// #     }
    /// # }
    /// # fn node(key: u64) -> Node {
    /// #     Node { key, link: Link::new() }
    /// # }
    /// let mut slots: Vec<Node> = (0..10).map(node).collect();
    /// let mut table = HashTable::with_shift(vec![Bucket::EMPTY; 8], 3);
    /// for handle in 0..slots.len() {
    ///     let hash = slots[handle].key * 7;
    ///     table.insert(&mut slots, handle, hash);
    /// }
    ///
    /// // Empty the table, element by element, mid-walk.
    /// let mut walk = table.walk();
    /// while let Some(handle) = walk.next(&table, &slots) {
    ///     table.remove(&mut slots, handle);
    /// }
    /// assert!(table.is_empty());
    /// ```
    pub fn walk(&self) -> Walk {
        Walk {
            bucket_index: 0,
            cursor: NIL,
        }
    }

    /// Begins a removal-tolerant point search for `hash`.
    ///
    /// The search analogue of [`HashTable::walk`]: yields handles of
    /// elements inserted with exactly `hash`, pre-reading each successor so
    /// the current element may be removed inside the loop body.
    pub fn search_walk(&self, hash: u64) -> SearchWalk {
        let index = self.bucket_of(hash);
        SearchWalk {
            cursor: self.buckets.as_ref()[index].head,
            hash,
        }
    }
}

impl<B> Debug for HashTable<B>
where
    B: AsRef<[Bucket]>,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let occupied = self.buckets.as_ref()[..self.capacity]
            .iter()
            .filter(|bucket| bucket.head != NIL)
            .count();
        let policy = match self.indexing {
            Indexing::Shift { .. } => "shift",
            Indexing::Modulo => "modulo",
        };

        f.debug_struct("HashTable")
            .field("capacity", &self.capacity)
            .field("indexing", &policy)
            .field("occupied_buckets", &occupied)
            .finish()
    }
}

/// Lazy point-search iterator, see [`HashTable::search`].
pub struct Search<'a, T> {
    slots: &'a [T],
    cursor: usize,
    hash: u64,
}

impl<'a, T: Linked> Iterator for Search<'a, T> {
    type Item = (usize, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let slots = self.slots;
        while self.cursor != NIL {
            let handle = self.cursor;
            let link = slots[handle].link();
            self.cursor = link.next;
            if link.hash == self.hash {
                return Some((handle, &slots[handle]));
            }
        }
        None
    }
}

impl<T: Linked> core::iter::FusedIterator for Search<'_, T> {}

/// Lazy full-traversal iterator, see [`HashTable::iter`].
pub struct Iter<'a, T> {
    buckets: &'a [Bucket],
    slots: &'a [T],
    bucket_index: usize,
    cursor: usize,
}

impl<'a, T: Linked> Iterator for Iter<'a, T> {
    type Item = (usize, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let slots = self.slots;
        loop {
            if self.cursor != NIL {
                let handle = self.cursor;
                self.cursor = slots[handle].link().next;
                return Some((handle, &slots[handle]));
            }

            if self.bucket_index == self.buckets.len() {
                return None;
            }
            self.cursor = self.buckets[self.bucket_index].head;
            self.bucket_index += 1;
        }
    }
}

impl<T: Linked> core::iter::FusedIterator for Iter<'_, T> {}

/// Removal-tolerant full-traversal cursor, see [`HashTable::walk`].
///
/// Holds no borrow of the table or slab; both are passed to each
/// [`Walk::next`] call, leaving them free to be mutated between steps.
#[derive(Clone, Debug)]
pub struct Walk {
    bucket_index: usize,
    cursor: usize,
}

impl Walk {
    /// Yields the next element's handle, or `None` when the walk is done.
    ///
    /// The successor of the yielded element is read before returning, so
    /// removing the yielded element does not disturb the walk.
    pub fn next<T, B>(&mut self, table: &HashTable<B>, slots: &[T]) -> Option<usize>
    where
        T: Linked,
        B: AsRef<[Bucket]>,
    {
        loop {
            if self.cursor != NIL {
                let handle = self.cursor;
                self.cursor = slots[handle].link().next;
                return Some(handle);
            }

            if self.bucket_index >= table.capacity {
                return None;
            }
            self.cursor = table.buckets.as_ref()[self.bucket_index].head;
            self.bucket_index += 1;
        }
    }
}

/// Removal-tolerant point-search cursor, see [`HashTable::search_walk`].
#[derive(Clone, Debug)]
pub struct SearchWalk {
    cursor: usize,
    hash: u64,
}

impl SearchWalk {
    /// Yields the next hash-matching handle, or `None` when the chain is
    /// exhausted.
    ///
    /// As with [`Walk::next`], the successor is read before yielding, so
    /// the current element may be removed inside the loop body.
    pub fn next<T: Linked>(&mut self, slots: &[T]) -> Option<usize> {
        while self.cursor != NIL {
            let handle = self.cursor;
            let link = slots[handle].link();
            self.cursor = link.next;
            if link.hash == self.hash {
                return Some(handle);
            }
        }
        None
    }
}
