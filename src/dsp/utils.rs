//! Shared DSP math: dB conversions, one-pole coefficients, epsilons.

/// Linear floor used before any division or log so levels never go non-finite.
pub const DB_EPS: f32 = 1e-9;

#[inline]
pub fn db_to_lin(db: f32) -> f32 {
    10.0f32.powf(db / 20.0)
}

#[inline]
pub fn lin_to_db(lin: f32) -> f32 {
    20.0 * lin.max(DB_EPS).log10()
}

/// One-pole retain coefficient for a millisecond time constant:
/// `state = coeff * state + (1 - coeff) * input`.
/// Degenerate inputs collapse to 0.0 (instant tracking).
#[inline]
pub fn time_constant_coeff(ms: f32, sample_rate: f32) -> f32 {
    if ms <= 0.0 || sample_rate <= 0.0 {
        return 0.0;
    }
    (-1.0 / (ms * 0.001 * sample_rate)).exp()
}

/// One-pole low-pass blend factor for a corner frequency:
/// `low += alpha * (x - low)`.
#[inline]
pub fn one_pole_alpha(freq_hz: f32, sample_rate: f32) -> f32 {
    if freq_hz <= 0.0 || sample_rate <= 0.0 {
        return 1.0;
    }
    let omega = core::f32::consts::TAU * freq_hz / sample_rate;
    1.0 - (-omega).exp()
}

/// Asymmetric envelope step: attack coefficient when rising, release when falling.
/// Coefficients are retain factors from [`time_constant_coeff`].
#[inline]
pub fn update_env(env: f32, x: f32, attack: f32, release: f32) -> f32 {
    let coeff = if x > env { attack } else { release };
    coeff * env + (1.0 - coeff) * x
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_round_trip() {
        for db in [-24.0f32, -6.0, -1.0, 0.0, 3.0] {
            assert!((lin_to_db(db_to_lin(db)) - db).abs() < 1e-3);
        }
    }

    #[test]
    fn lin_to_db_floors_zero() {
        assert!(lin_to_db(0.0).is_finite());
        assert!(lin_to_db(-1.0).is_finite());
    }

    #[test]
    fn degenerate_time_constant_is_instant() {
        assert_eq!(time_constant_coeff(0.0, 44100.0), 0.0);
        assert_eq!(time_constant_coeff(10.0, 0.0), 0.0);
        assert_eq!(one_pole_alpha(0.0, 44100.0), 1.0);
    }

    #[test]
    fn env_attacks_and_releases() {
        let atk = time_constant_coeff(1.0, 44100.0);
        let rel = time_constant_coeff(100.0, 44100.0);
        let mut env = 0.0;
        env = update_env(env, 1.0, atk, rel);
        assert!(env > 0.0);
        let after_attack = env;
        env = update_env(env, 0.0, atk, rel);
        assert!(env < after_attack);
        assert!(env > 0.0);
    }
}
