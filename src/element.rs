use core::{cmp::Ordering, fmt, hash::Hasher};

mod private {
    pub trait Sealed {}
}

macro_rules! element_trait {
    ($($bound:tt)*) => {
        /// Fixed-width primitive stored in a [`ViewList`](crate::ViewList).
        ///
        /// This trait is sealed, it is implemented for the integer primitives,
        /// `f32` and `f64`.
        pub trait Element:
            private::Sealed + Copy + Default + PartialEq + PartialOrd + fmt::Debug + Send + Sync + 'static $($bound)*
        {
            /// Total ordering, used by sorting.
            ///
            /// Floats are ordered with `total_cmp`, so `-0.0 < 0.0` and NaN sorts last.
            fn total_cmp(&self, other: &Self) -> Ordering;

            /// Feeds the element into a hasher, consistently with `==`.
            fn hash_into<H: Hasher>(&self, state: &mut H);
        }
    };
}

cfg_if::cfg_if! {
    if #[cfg(feature = "bytemuck")] {
        element_trait!(+ bytemuck::Pod);
    } else {
        element_trait!();
    }
}

macro_rules! impl_integer {
    ($($ty:ty),* $(,)?) => {$(
        impl private::Sealed for $ty {}
        impl Element for $ty {
            #[inline]
            fn total_cmp(&self, other: &Self) -> Ordering {
                Ord::cmp(self, other)
            }

            #[inline]
            fn hash_into<H: Hasher>(&self, state: &mut H) {
                core::hash::Hash::hash(self, state);
            }
        }
    )*};
}

macro_rules! impl_float {
    ($($ty:ty),* $(,)?) => {$(
        impl private::Sealed for $ty {}
        impl Element for $ty {
            #[inline]
            fn total_cmp(&self, other: &Self) -> Ordering {
                <$ty>::total_cmp(self, other)
            }

            #[inline]
            fn hash_into<H: Hasher>(&self, state: &mut H) {
                // `-0.0 == 0.0`, so both hash the same
                let value = if *self == 0.0 { 0.0 } else { *self };
                core::hash::Hash::hash(&value.to_bits(), state);
            }
        }
    )*};
}

impl_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);
impl_float!(f32, f64);
