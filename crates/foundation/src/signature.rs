use std::fmt;

/// Cheap structural digest of a layer's volatile inputs.
///
/// Two signatures compare equal iff every value fed to the builder was equal
/// (modulo blake3 collisions). Field boundaries are length/tag prefixed so
/// `("ab", "c")` and `("a", "bc")` never collide.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Signature(blake3::Hash);

impl Signature {
    pub fn as_bytes(&self) -> &[u8; 32] {
        self.0.as_bytes()
    }

    pub fn to_hex(&self) -> String {
        self.0.to_hex().to_string()
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short prefix is plenty for logs.
        write!(f, "Signature({})", &self.0.to_hex()[..12])
    }
}

#[derive(Clone)]
pub struct SignatureBuilder {
    hasher: blake3::Hasher,
}

impl SignatureBuilder {
    pub fn new(domain: &str) -> Self {
        let mut b = Self {
            hasher: blake3::Hasher::new(),
        };
        b.tag(b'D').bytes(domain.as_bytes());
        b
    }

    fn tag(&mut self, tag: u8) -> &mut Self {
        self.hasher.update(&[tag]);
        self
    }

    fn bytes(&mut self, v: &[u8]) -> &mut Self {
        self.hasher.update(&(v.len() as u64).to_le_bytes());
        self.hasher.update(v);
        self
    }

    pub fn str(mut self, v: &str) -> Self {
        self.tag(b's').bytes(v.as_bytes());
        self
    }

    pub fn u64(mut self, v: u64) -> Self {
        self.tag(b'u');
        self.hasher.update(&v.to_le_bytes());
        self
    }

    pub fn i64(mut self, v: i64) -> Self {
        self.tag(b'i');
        self.hasher.update(&v.to_le_bytes());
        self
    }

    pub fn bool(mut self, v: bool) -> Self {
        self.tag(b'b');
        self.hasher.update(&[v as u8]);
        self
    }

    pub fn opt_u64(self, v: Option<u64>) -> Self {
        match v {
            Some(v) => self.bool(true).u64(v),
            None => self.bool(false),
        }
    }

    /// Order-insensitive id set: ids are sorted before hashing.
    pub fn id_set<'a, I>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut sorted: Vec<&str> = ids.into_iter().collect();
        sorted.sort_unstable();
        sorted.dedup();
        self.tag(b'S');
        self.hasher.update(&(sorted.len() as u64).to_le_bytes());
        for id in sorted {
            self.bytes(id.as_bytes());
        }
        self
    }

    pub fn finish(self) -> Signature {
        Signature(self.hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::SignatureBuilder;
    use pretty_assertions::assert_eq;

    #[test]
    fn id_sets_ignore_order_and_duplicates() {
        let a = SignatureBuilder::new("x").id_set(["b", "a", "a"]).finish();
        let b = SignatureBuilder::new("x").id_set(["a", "b"]).finish();
        assert_eq!(a, b);
    }

    #[test]
    fn field_boundaries_are_unambiguous() {
        let a = SignatureBuilder::new("x").str("ab").str("c").finish();
        let b = SignatureBuilder::new("x").str("a").str("bc").finish();
        assert_ne!(a, b);
    }

    #[test]
    fn domain_separates_layers() {
        let a = SignatureBuilder::new("bases").u64(1).finish();
        let b = SignatureBuilder::new("nuclear").u64(1).finish();
        assert_ne!(a, b);
        assert_eq!(a.to_hex().len(), 64);
    }
}
