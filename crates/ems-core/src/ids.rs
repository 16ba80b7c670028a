//! Strongly typed identifier wrappers.
//!
//! All IDs are `Copy + Ord + Hash` so they can be used as map keys and sorted
//! collection elements without ceremony.  The inner integer is the record
//! store's primary key and is `pub` so adapters can map rows directly.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// The raw key, e.g. for SQL parameters or CSV columns.
            #[inline(always)]
            pub fn get(self) -> $inner {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$inner> for $name {
            #[inline(always)]
            fn from(raw: $inner) -> $name {
                $name(raw)
            }
        }
    };
}

typed_id! {
    /// A neighbourhood / road-graph node.
    pub struct LocationId(u64);
}

typed_id! {
    /// An undirected road segment between two locations.
    pub struct SegmentId(u64);
}

typed_id! {
    pub struct VehicleId(u64);
}

typed_id! {
    pub struct CrewId(u64);
}

typed_id! {
    pub struct StaffId(u64);
}

typed_id! {
    pub struct IncidentId(u64);
}

typed_id! {
    /// One dispatch of one vehicle to one incident.
    pub struct ServiceRecordId(u64);
}
