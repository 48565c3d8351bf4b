//! Element budget for length-prefixed sequences and maps.
//!
//! The format reads a length and then loops over elements. Elements of a
//! zero-sized type consume no input, so a forged length could keep that loop
//! running long after the bytes ran out. Every element of a length-prefixed
//! sequence and every map entry is charged against a budget equal to the
//! input length. Well-formed input never exceeds it: each charged element
//! owns at least one byte, except values that encode to nothing.
//!
//! Tuples, structs and arrays have a fixed size known to the type and are
//! not charged.

use std::cell::Cell;
use std::fmt;

use serde::de::{
    self, DeserializeSeed, Deserializer, EnumAccess, MapAccess, SeqAccess, VariantAccess,
    Visitor,
};

use crate::DecodeError;

pub(crate) struct Budget {
    limit: usize,
    remaining: Cell<usize>,
    exceeded: Cell<bool>,
}

impl Budget {
    pub(crate) fn new(limit: usize) -> Self {
        Self {
            limit,
            remaining: Cell::new(limit),
            exceeded: Cell::new(false),
        }
    }

    /// Replace the format's error when the budget was the cause.
    pub(crate) fn classify(&self, err: DecodeError) -> DecodeError {
        if self.exceeded.get() {
            DecodeError::TooManyElements { limit: self.limit }
        } else {
            err
        }
    }

    fn check_len<E: de::Error>(&self, len: Option<usize>) -> Result<(), E> {
        match len {
            Some(len) if len > self.remaining.get() => Err(self.exceed()),
            _ => Ok(()),
        }
    }

    fn charge<E: de::Error>(&self) -> Result<(), E> {
        match self.remaining.get().checked_sub(1) {
            Some(left) => {
                self.remaining.set(left);
                Ok(())
            }
            None => Err(self.exceed()),
        }
    }

    fn exceed<E: de::Error>(&self) -> E {
        self.exceeded.set(true);
        E::custom("sequence longer than remaining input")
    }
}

/// Deserializer adapter that threads a [`Budget`] through every nested
/// value.
pub(crate) struct Bounded<'b, D> {
    inner: D,
    budget: &'b Budget,
}

impl<'b, D> Bounded<'b, D> {
    pub(crate) fn new(inner: D, budget: &'b Budget) -> Self {
        Self { inner, budget }
    }
}

struct BoundedVisitor<'b, V> {
    inner: V,
    budget: &'b Budget,
    charged: bool,
}

impl<'b, V> BoundedVisitor<'b, V> {
    fn new(inner: V, budget: &'b Budget, charged: bool) -> Self {
        Self {
            inner,
            budget,
            charged,
        }
    }
}

struct BoundedSeed<'b, S> {
    inner: S,
    budget: &'b Budget,
}

struct BoundedSeq<'b, A> {
    inner: A,
    budget: &'b Budget,
    charged: bool,
}

struct BoundedMap<'b, A> {
    inner: A,
    budget: &'b Budget,
    charged: bool,
}

struct BoundedEnum<'b, A> {
    inner: A,
    budget: &'b Budget,
}

macro_rules! forward_deserialize {
    ($charged:literal => $($method:ident)*) => {
        $(
            fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
                self.inner
                    .$method(BoundedVisitor::new(visitor, self.budget, $charged))
            }
        )*
    };
}

impl<'de, 'b, D: Deserializer<'de>> Deserializer<'de> for Bounded<'b, D> {
    type Error = D::Error;

    forward_deserialize! { false =>
        deserialize_bool
        deserialize_i8 deserialize_i16 deserialize_i32 deserialize_i64 deserialize_i128
        deserialize_u8 deserialize_u16 deserialize_u32 deserialize_u64 deserialize_u128
        deserialize_f32 deserialize_f64 deserialize_char
        deserialize_str deserialize_string deserialize_bytes deserialize_byte_buf
        deserialize_option deserialize_unit deserialize_identifier deserialize_ignored_any
    }

    forward_deserialize! { true =>
        deserialize_any deserialize_seq deserialize_map
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        self.inner
            .deserialize_unit_struct(name, BoundedVisitor::new(visitor, self.budget, false))
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        self.inner
            .deserialize_newtype_struct(name, BoundedVisitor::new(visitor, self.budget, false))
    }

    fn deserialize_tuple<V: Visitor<'de>>(
        self,
        len: usize,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        self.inner
            .deserialize_tuple(len, BoundedVisitor::new(visitor, self.budget, false))
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        len: usize,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        self.inner.deserialize_tuple_struct(
            name,
            len,
            BoundedVisitor::new(visitor, self.budget, false),
        )
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        self.inner.deserialize_struct(
            name,
            fields,
            BoundedVisitor::new(visitor, self.budget, false),
        )
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        self.inner.deserialize_enum(
            name,
            variants,
            BoundedVisitor::new(visitor, self.budget, false),
        )
    }

    fn is_human_readable(&self) -> bool {
        self.inner.is_human_readable()
    }
}

macro_rules! forward_visit {
    ($($method:ident($ty:ty))*) => {
        $(
            fn $method<E: de::Error>(self, v: $ty) -> Result<Self::Value, E> {
                self.inner.$method(v)
            }
        )*
    };
}

impl<'de, 'b, V: Visitor<'de>> Visitor<'de> for BoundedVisitor<'b, V> {
    type Value = V::Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.expecting(f)
    }

    forward_visit! {
        visit_bool(bool)
        visit_i8(i8) visit_i16(i16) visit_i32(i32) visit_i64(i64) visit_i128(i128)
        visit_u8(u8) visit_u16(u16) visit_u32(u32) visit_u64(u64) visit_u128(u128)
        visit_f32(f32) visit_f64(f64) visit_char(char)
        visit_str(&str) visit_borrowed_str(&'de str) visit_string(String)
        visit_bytes(&[u8]) visit_borrowed_bytes(&'de [u8]) visit_byte_buf(Vec<u8>)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        self.inner.visit_none()
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        self.inner.visit_unit()
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        self.inner.visit_some(Bounded::new(deserializer, self.budget))
    }

    fn visit_newtype_struct<D: Deserializer<'de>>(
        self,
        deserializer: D,
    ) -> Result<Self::Value, D::Error> {
        self.inner
            .visit_newtype_struct(Bounded::new(deserializer, self.budget))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, seq: A) -> Result<Self::Value, A::Error> {
        if self.charged {
            self.budget.check_len::<A::Error>(seq.size_hint())?;
        }
        self.inner.visit_seq(BoundedSeq {
            inner: seq,
            budget: self.budget,
            charged: self.charged,
        })
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
        if self.charged {
            self.budget.check_len::<A::Error>(map.size_hint())?;
        }
        self.inner.visit_map(BoundedMap {
            inner: map,
            budget: self.budget,
            charged: self.charged,
        })
    }

    fn visit_enum<A: EnumAccess<'de>>(self, data: A) -> Result<Self::Value, A::Error> {
        self.inner.visit_enum(BoundedEnum {
            inner: data,
            budget: self.budget,
        })
    }
}

impl<'de, 'b, S: DeserializeSeed<'de>> DeserializeSeed<'de> for BoundedSeed<'b, S> {
    type Value = S::Value;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<S::Value, D::Error> {
        self.inner.deserialize(Bounded::new(deserializer, self.budget))
    }
}

impl<'de, 'b, A: SeqAccess<'de>> SeqAccess<'de> for BoundedSeq<'b, A> {
    type Error = A::Error;

    fn next_element_seed<T: DeserializeSeed<'de>>(
        &mut self,
        seed: T,
    ) -> Result<Option<T::Value>, A::Error> {
        let element = self.inner.next_element_seed(BoundedSeed {
            inner: seed,
            budget: self.budget,
        })?;
        if self.charged && element.is_some() {
            self.budget.charge::<A::Error>()?;
        }
        Ok(element)
    }

    fn size_hint(&self) -> Option<usize> {
        self.inner.size_hint()
    }
}

impl<'de, 'b, A: MapAccess<'de>> MapAccess<'de> for BoundedMap<'b, A> {
    type Error = A::Error;

    fn next_key_seed<K: DeserializeSeed<'de>>(
        &mut self,
        seed: K,
    ) -> Result<Option<K::Value>, A::Error> {
        let key = self.inner.next_key_seed(BoundedSeed {
            inner: seed,
            budget: self.budget,
        })?;
        if self.charged && key.is_some() {
            self.budget.charge::<A::Error>()?;
        }
        Ok(key)
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value, A::Error> {
        self.inner.next_value_seed(BoundedSeed {
            inner: seed,
            budget: self.budget,
        })
    }

    fn size_hint(&self) -> Option<usize> {
        self.inner.size_hint()
    }
}

impl<'de, 'b, A: EnumAccess<'de>> EnumAccess<'de> for BoundedEnum<'b, A> {
    type Error = A::Error;
    type Variant = BoundedEnum<'b, A::Variant>;

    fn variant_seed<V: DeserializeSeed<'de>>(
        self,
        seed: V,
    ) -> Result<(V::Value, Self::Variant), A::Error> {
        let (tag, variant) = self.inner.variant_seed(seed)?;
        Ok((
            tag,
            BoundedEnum {
                inner: variant,
                budget: self.budget,
            },
        ))
    }
}

impl<'de, 'b, A: VariantAccess<'de>> VariantAccess<'de> for BoundedEnum<'b, A> {
    type Error = A::Error;

    fn unit_variant(self) -> Result<(), A::Error> {
        self.inner.unit_variant()
    }

    fn newtype_variant_seed<T: DeserializeSeed<'de>>(self, seed: T) -> Result<T::Value, A::Error> {
        self.inner.newtype_variant_seed(BoundedSeed {
            inner: seed,
            budget: self.budget,
        })
    }

    fn tuple_variant<V: Visitor<'de>>(self, len: usize, visitor: V) -> Result<V::Value, A::Error> {
        self.inner
            .tuple_variant(len, BoundedVisitor::new(visitor, self.budget, false))
    }

    fn struct_variant<V: Visitor<'de>>(
        self,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, A::Error> {
        self.inner
            .struct_variant(fields, BoundedVisitor::new(visitor, self.budget, false))
    }
}
