/// Two values where order does not matter: `(a, b)` and `(b, a)` are the same pair.
///
/// The members are stored sorted, so derived `Eq` and `Hash` agree with that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnorderedPair<T>(T, T);

impl<T: Ord + Copy> UnorderedPair<T> {
    #[inline]
    pub fn new(a: T, b: T) -> UnorderedPair<T> {
        if a <= b {
            UnorderedPair(a, b)
        } else {
            UnorderedPair(b, a)
        }
    }

    #[inline]
    pub fn first(&self) -> T {
        self.0
    }
    #[inline]
    pub fn second(&self) -> T {
        self.1
    }
    #[inline]
    pub fn contains(&self, v: T) -> bool {
        self.0 == v || self.1 == v
    }
    #[inline]
    pub fn other(&self, v: T) -> Option<T> {
        //! Returns the member paired with `v`, if `v` is a member.
        if self.0 == v {
            Some(self.1)
        } else if self.1 == v {
            Some(self.0)
        } else {
            None
        }
    }
}
