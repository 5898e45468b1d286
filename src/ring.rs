//! Wraparound arithmetic over Z/2^W.
//!
//! Every transform in this crate is written against [`Ring`], so the same code
//! runs on native machine words and on composite element types such as
//! [`Nibble`]. Only odd elements are units; `inverse` reports `None` for the
//! rest instead of producing garbage.

use std::fmt;

/// A commutative ring of W-bit words with silent wraparound.
pub trait Ring: Copy + Eq + Default + fmt::Debug + Send + Sync + 'static {
    /// Bit width W of the ring.
    const BITS: u32;
    /// Number of bytes one symbol occupies in the little-endian byte codec.
    const BYTES: usize;
    const ZERO: Self;
    const ONE: Self;

    fn add(self, rhs: Self) -> Self;
    fn sub(self, rhs: Self) -> Self;
    fn mul(self, rhs: Self) -> Self;

    fn neg(self) -> Self {
        Self::ZERO.sub(self)
    }

    /// Fused `self + a * b`.
    fn mul_add(self, a: Self, b: Self) -> Self {
        self.add(a.mul(b))
    }

    fn is_odd(self) -> bool;

    fn is_zero(self) -> bool {
        self == Self::ZERO
    }

    /// Multiplicative inverse modulo 2^W, `None` for even elements.
    fn inverse(self) -> Option<Self>;

    /// Truncating conversion from a 64-bit value.
    fn from_u64(value: u64) -> Self;

    fn to_u64(self) -> u64;

    /// Decode one symbol from the first `BYTES` bytes of `bytes`.
    fn read_le(bytes: &[u8]) -> Self;

    /// Encode one symbol into the first `BYTES` bytes of `out`.
    fn write_le(self, out: &mut [u8]);
}

/// Extended Euclid, returns `(gcd, x, y)` with `a*x + b*y = gcd`.
///
/// Runs in `i128` so that the modulus 2^64 is representable; all Bezout
/// coefficients stay below 2^65 in magnitude.
fn extended_gcd(a: i128, b: i128) -> (i128, i128, i128) {
    let (mut old_r, mut r) = (a, b);
    let (mut old_s, mut s) = (1i128, 0i128);
    let (mut old_t, mut t) = (0i128, 1i128);

    while r != 0 {
        let q = old_r / r;
        (old_r, r) = (r, old_r - q * r);
        (old_s, s) = (s, old_s - q * s);
        (old_t, t) = (t, old_t - q * t);
    }

    (old_r, old_s, old_t)
}

/// Inverse of `value` modulo 2^bits via extended Euclid, for bits <= 64.
fn inverse_mod_pow2(value: u64, bits: u32) -> Option<u64> {
    if value & 1 == 0 {
        return None;
    }
    let modulus = 1i128 << bits;
    let (gcd, x, _) = extended_gcd(value as i128, modulus);
    if gcd != 1 {
        return None;
    }
    Some(x.rem_euclid(modulus) as u64)
}

macro_rules! native_ring {
    ($($t:ty),*) => {
        $(
            impl Ring for $t {
                const BITS: u32 = <$t>::BITS;
                const BYTES: usize = std::mem::size_of::<$t>();
                const ZERO: Self = 0;
                const ONE: Self = 1;

                #[inline]
                fn add(self, rhs: Self) -> Self {
                    self.wrapping_add(rhs)
                }

                #[inline]
                fn sub(self, rhs: Self) -> Self {
                    self.wrapping_sub(rhs)
                }

                #[inline]
                fn mul(self, rhs: Self) -> Self {
                    self.wrapping_mul(rhs)
                }

                #[inline]
                fn is_odd(self) -> bool {
                    self & 1 == 1
                }

                fn inverse(self) -> Option<Self> {
                    inverse_mod_pow2(self as u64, <$t>::BITS).map(|x| x as $t)
                }

                #[inline]
                fn from_u64(value: u64) -> Self {
                    value as $t
                }

                #[inline]
                fn to_u64(self) -> u64 {
                    self as u64
                }

                fn read_le(bytes: &[u8]) -> Self {
                    let mut buf = [0u8; std::mem::size_of::<$t>()];
                    buf.copy_from_slice(&bytes[..std::mem::size_of::<$t>()]);
                    <$t>::from_le_bytes(buf)
                }

                fn write_le(self, out: &mut [u8]) {
                    out[..std::mem::size_of::<$t>()].copy_from_slice(&self.to_le_bytes());
                }
            }
        )*
    };
}

native_ring!(u8, u16, u32, u64);

/// A 4-bit ring element (arithmetic modulo 16).
///
/// Composite element type: it carries its own reduction, fused
/// multiply-add and inverse routine rather than leaning on a machine word.
/// The byte codec stores one nibble per byte (low four bits).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Nibble(u8);

impl Nibble {
    const MASK: u8 = 0x0F;

    pub fn new(value: u8) -> Self {
        Self(value & Self::MASK)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Debug for Nibble {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Nibble({})", self.0)
    }
}

impl Ring for Nibble {
    const BITS: u32 = 4;
    const BYTES: usize = 1;
    const ZERO: Self = Nibble(0);
    const ONE: Self = Nibble(1);

    fn add(self, rhs: Self) -> Self {
        Nibble::new(self.0.wrapping_add(rhs.0))
    }

    fn sub(self, rhs: Self) -> Self {
        Nibble::new(self.0.wrapping_sub(rhs.0))
    }

    fn mul(self, rhs: Self) -> Self {
        Nibble::new(self.0.wrapping_mul(rhs.0))
    }

    fn mul_add(self, a: Self, b: Self) -> Self {
        // a*b <= 225 and self <= 15, one reduction covers both steps
        Nibble::new((self.0 as u16 + a.0 as u16 * b.0 as u16) as u8)
    }

    fn is_odd(self) -> bool {
        self.0 & 1 == 1
    }

    /// Hensel lifting: an odd `a` is its own inverse modulo 8, one Newton
    /// step `x <- x * (2 - a*x)` doubles the precision past 4 bits.
    fn inverse(self) -> Option<Self> {
        if !self.is_odd() {
            return None;
        }
        let x = self;
        Some(x.mul(Nibble::new(2).sub(self.mul(x))))
    }

    fn from_u64(value: u64) -> Self {
        Nibble::new(value as u8)
    }

    fn to_u64(self) -> u64 {
        self.0 as u64
    }

    fn read_le(bytes: &[u8]) -> Self {
        Nibble::new(bytes[0])
    }

    fn write_le(self, out: &mut [u8]) {
        out[0] = self.0;
    }
}

/// Decode a byte buffer into symbols; `bytes.len()` must be a multiple of `T::BYTES`.
pub fn symbols_from_bytes<T: Ring>(bytes: &[u8]) -> Vec<T> {
    bytes.chunks_exact(T::BYTES).map(T::read_le).collect()
}

/// Decode into an existing buffer of `bytes.len() / T::BYTES` symbols.
pub fn symbols_from_bytes_into<T: Ring>(bytes: &[u8], out: &mut [T]) {
    for (symbol, chunk) in out.iter_mut().zip(bytes.chunks_exact(T::BYTES)) {
        *symbol = T::read_le(chunk);
    }
}

/// Encode symbols into `out`, which must hold `symbols.len() * T::BYTES` bytes.
pub fn symbols_to_bytes<T: Ring>(symbols: &[T], out: &mut [u8]) {
    for (symbol, chunk) in symbols.iter().zip(out.chunks_exact_mut(T::BYTES)) {
        symbol.write_le(chunk);
    }
}
