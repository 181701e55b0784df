//! Connection policy bits.

use bitflags::bitflags;

bitflags! {
    /// How a node may be connected to its upstream.
    ///
    /// Carried by the downstream node of a connection. The empty set means
    /// a direct connection only.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ConnectPolicy: u32 {
        /// A converter may be inserted.
        const ALLOW_CONVERTER = 0b0001;
        /// A decoder may be inserted (implies converters).
        const ALLOW_DECODER = 0b0011;
        /// Try every upstream format in turn instead of only the current one.
        const ENUMERATE_UPSTREAM_FORMATS = 0b0100;
    }
}

impl ConnectPolicy {
    /// Direct connection only.
    pub const DIRECT: Self = Self::empty();

    /// Whether converter insertion is allowed.
    pub fn allows_converter(&self) -> bool {
        self.contains(Self::ALLOW_CONVERTER)
    }

    /// Whether decoder insertion is allowed.
    pub fn allows_decoder(&self) -> bool {
        self.contains(Self::ALLOW_DECODER)
    }

    /// Whether every upstream format is tried.
    pub fn enumerates_upstream(&self) -> bool {
        self.contains(Self::ENUMERATE_UPSTREAM_FORMATS)
    }
}

impl Default for ConnectPolicy {
    fn default() -> Self {
        Self::ALLOW_DECODER
    }
}
