//! Mid/Side Matrix
//!
//! Sum/difference encode and decode between left/right and mid/side domains.
//! Mono lives in the mid, the stereo image lives in the side; everything the
//! rest of the chain does to the image goes through this matrix. Stateless and
//! exactly invertible.

#[derive(Clone, Copy, Debug, Default)]
pub struct MsMatrix;

impl MsMatrix {
    /// `(l, r) -> (mid, side)` with `mid = 0.5(l + r)`, `side = 0.5(l - r)`.
    #[inline]
    pub fn encode(&self, l: f32, r: f32) -> (f32, f32) {
        (0.5 * (l + r), 0.5 * (l - r))
    }

    /// `(mid, side) -> (l, r)` with `l = mid + side`, `r = mid - side`.
    #[inline]
    pub fn decode(&self, m: f32, s: f32) -> (f32, f32) {
        (m + s, m - s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_is_exact() {
        let ms = MsMatrix;
        for &(l, r) in &[
            (0.0f32, 0.0f32),
            (1.0, -1.0),
            (0.25, 0.75),
            (-0.5, -0.5),
            (0.125, -0.625),
        ] {
            let (m, s) = ms.encode(l, r);
            let (l2, r2) = ms.decode(m, s);
            assert_eq!(l2, l);
            assert_eq!(r2, r);
        }
    }

    #[test]
    fn mono_has_no_side() {
        let ms = MsMatrix;
        let (m, s) = ms.encode(0.8, 0.8);
        assert_eq!(m, 0.8);
        assert_eq!(s, 0.0);
    }
}
