/// Marker trait for byte-oriented buffers with incremental append operations
///
/// In most ways, it is convenient to think of `Target` as an analogous trait to
/// [`std::io::Write`]. The principal difference between the two is the fact
/// that the `push_XXX` methods on `Target` are infallible and total (as opposed
/// to partial) by design; while they return a `usize` value representing the
/// number of bytes written, this is used only for summary book-keeping on the
/// caller side, rather than a feedback mechanism that may indicate failure or
/// partial success, as is the case for `std::io::Write::write`.
///
/// `Target` is object-safe, so that type-erased message bodies can be written
/// through a `&mut dyn Target` (see [`DynMessage`](crate::object::DynMessage)).
///
/// All implementors of `Target` must define these methods as infallible and total.
pub trait Target {
    /// Performs any necessary operations that amortize the cost incurred by
    /// writing a certain number of additional bytes to the end of the `Target`,
    /// over the course of an unknown number of push operations.
    ///
    /// For many implementors, this may simply be a no-op. For underlying structures
    /// with a notion of capacity, such as `Vec<u8>`, this would reserve the
    /// additional capacity up front.
    fn anticipate(&mut self, extra: usize);

    /// Appends a single byte to a Target object.
    ///
    /// This method should never panic under normal conditions, and the return value must be `1`.
    fn push_one(&mut self, b: u8) -> usize;

    /// Appends the bytes in an arbitrary-length byte-slice to a Target object.
    ///
    /// The operational semantics of this method should be indistinguishable
    /// from repeated calls to `push_one` over every element of the slice in
    /// order, intercalated with binary addition:
    ///
    /// ```ignore
    /// x.push_all(b"Rust") === x.push_one(b'R') + x.push_one(b'u') + x.push_one(b's') + x.push_one(b't')
    /// ```
    ///
    /// This method should never panic under normal conditions, and the return
    /// value must be the total length of the slice.
    fn push_all(&mut self, buf: &[u8]) -> usize;

    /// Book-ends a sequence of `push_XXX` operations that form one logical value.
    ///
    /// Must not alter the byte contents of the target. The default is a no-op.
    #[inline(always)]
    fn resolve(&mut self) {}

    /// Perform the associated `Target::resolve` call and return `0usize`
    ///
    /// No matter how it is implemented, the return value should always be `0`.
    #[inline]
    fn resolve_zero(&mut self) -> usize {
        self.resolve();
        0
    }
}

#[macro_export]
macro_rules! resolve_zero {
    ( $buf:expr ) => {{
        $crate::conv::target::Target::resolve($buf);
        0
    }};
}

/// Useful alias for `std::io::Sink` that is used to count the number of
/// bytes required to serialize an arbitrary-typed object, without
/// performing any memory operations.
pub type ByteCounter = std::io::Sink;

impl Target for ByteCounter {
    #[inline(always)]
    fn anticipate(&mut self, _: usize) {}

    #[inline(always)]
    fn push_one(&mut self, _: u8) -> usize {
        1
    }

    #[inline(always)]
    fn push_all(&mut self, buf: &[u8]) -> usize {
        buf.len()
    }
}

impl Target for Vec<u8> {
    #[inline]
    fn anticipate(&mut self, extra: usize) {
        self.reserve(extra)
    }

    #[inline]
    fn push_one(&mut self, b: u8) -> usize {
        self.push(b);
        1
    }

    #[inline]
    fn push_all(&mut self, buf: &[u8]) -> usize {
        self.extend_from_slice(buf);
        buf.len()
    }
}

/// Forwarding implementation, used to turn a `&mut U` with `U: ?Sized` into
/// a `&mut dyn Target`.
impl<T: Target + ?Sized> Target for &mut T {
    #[inline]
    fn anticipate(&mut self, extra: usize) {
        (**self).anticipate(extra)
    }

    #[inline]
    fn push_one(&mut self, b: u8) -> usize {
        (**self).push_one(b)
    }

    #[inline]
    fn push_all(&mut self, buf: &[u8]) -> usize {
        (**self).push_all(buf)
    }

    #[inline]
    fn resolve(&mut self) {
        (**self).resolve()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn counter_counts() {
        let mut sink: ByteCounter = std::io::sink();
        assert_eq!(sink.push_one(7) + sink.push_all(&[1, 2, 3]), 4);
    }

    #[test]
    fn dyn_target_forwards() {
        let mut buf: Vec<u8> = Vec::new();
        {
            let mut fwd = &mut buf;
            let erased: &mut dyn Target = &mut fwd;
            erased.push_one(0xac);
            erased.push_all(&[0x02]);
        }
        assert_eq!(buf, vec![0xac, 0x02]);
    }
}
