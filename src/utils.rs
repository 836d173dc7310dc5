use crate::Scalar;

/// A trait to replace all elements in a container with zeros.
pub trait ZeroOut {
    fn zero_out(&mut self);
}

impl ZeroOut for Scalar {
    fn zero_out(&mut self) {
        *self = 0.0;
    }
}

impl<T> ZeroOut for [T]
where
    T: ZeroOut,
{
    fn zero_out(&mut self) {
        for elem in self {
            elem.zero_out();
        }
    }
}

/// Borrows two distinct elements of `items` mutably at once.
///
/// Panics if `first == second` or either index is out of bounds.
pub fn pair_mut<T>(items: &mut [T], first: usize, second: usize) -> (&mut T, &mut T) {
    assert_ne!(first, second, "cannot borrow the same element twice");
    if first < second {
        let (before, after) = items.split_at_mut(second);
        (&mut before[first], &mut after[0])
    } else {
        let (before, after) = items.split_at_mut(first);
        (&mut after[0], &mut before[second])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_out_slice() {
        let mut v = [1.0, -2.0, 3.0];
        v.zero_out();
        assert_eq!(v, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn pair_mut_either_order() {
        let mut v = [1, 2, 3];
        {
            let (a, b) = pair_mut(&mut v, 0, 2);
            *a += 10;
            *b += 20;
        }
        let (a, b) = pair_mut(&mut v, 2, 1);
        assert_eq!((*a, *b), (23, 2));
        assert_eq!(v, [11, 2, 23]);
    }

    #[test]
    #[should_panic]
    fn pair_mut_same_index() {
        let mut v = [1, 2];
        let _ = pair_mut(&mut v, 1, 1);
    }
}
