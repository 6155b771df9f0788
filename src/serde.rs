use alloc::vec::Vec;
use core::{cmp, fmt, marker::PhantomData};

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::{element::Element, ViewList};

const MAX_PREALLOCATED_SIZE: usize = 1 << 12;

/// A view serializes as the sequence of its elements; the graph it belongs
/// to is not serialized.
impl<T: Element + Serialize> Serialize for ViewList<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.with_slice(|slice| serializer.collect_seq(slice))
    }
}

struct ViewListVisitor<T>(PhantomData<T>);

impl<'de, T: Element + Deserialize<'de>> de::Visitor<'de> for ViewListVisitor<T> {
    type Value = ViewList<T>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a sequence")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: de::SeqAccess<'de>,
    {
        let capacity = cmp::min(seq.size_hint().unwrap_or(0), MAX_PREALLOCATED_SIZE);
        let mut values = Vec::with_capacity(capacity);
        while let Some(value) = seq.next_element()? {
            values.push(value);
        }
        Ok(values.into())
    }
}

/// Deserializes into a new root list.
impl<'de, T: Element + Deserialize<'de>> Deserialize<'de> for ViewList<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(ViewListVisitor(PhantomData))
    }
}
