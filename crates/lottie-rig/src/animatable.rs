use glam::{Vec2, Vec3};
use lottie_data::model::{Property, Value};

pub trait Interpolatable: Sized + Clone {
    fn lerp(&self, other: &Self, t: f32) -> Self;
}

impl Interpolatable for f32 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t
    }
}

impl Interpolatable for Vec2 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Vec2::lerp(*self, *other, t)
    }
}

impl Interpolatable for Vec3 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Vec3::lerp(*self, *other, t)
    }
}

pub struct Animator;

impl Animator {
    /// Evaluates `prop` at `frame`.
    ///
    /// Constant tracks return their value; keyframed tracks interpolate linearly
    /// between the bracketing pair and clamp at both ends of the track. A track with
    /// no usable sample yields `default`.
    pub fn resolve<T, U>(
        prop: &Property<T>,
        frame: f32,
        converter: impl Fn(&T) -> U,
        default: U,
    ) -> U
    where
        U: Interpolatable,
    {
        match &prop.k {
            Value::Default => default,
            Value::Static(v) => converter(v),
            Value::Animated(keyframes) => {
                let len = keyframes.len();
                if len == 0 {
                    return default;
                }
                if len == 1 {
                    return keyframes[0].s.as_ref().map(&converter).unwrap_or(default);
                }

                // First keyframe with t > frame; the segment is [idx-1, idx], pinned to
                // the first/last segment outside the track's domain.
                let idx = keyframes
                    .partition_point(|kf| kf.frame <= frame)
                    .clamp(1, len - 1);
                let kf_start = &keyframes[idx - 1];
                let kf_end = &keyframes[idx];

                let start_val = kf_start.s.as_ref().map(&converter).unwrap_or(default);
                // Legacy `e` only stands in for a missing next value.
                let end_val = kf_end
                    .s
                    .as_ref()
                    .or(kf_start.e.as_ref())
                    .map(&converter)
                    .unwrap_or_else(|| start_val.clone());

                let duration = kf_end.frame - kf_start.frame;
                let u = if duration > 0.0 {
                    ((frame - kf_start.frame) / duration).clamp(0.0, 1.0)
                } else {
                    0.0
                };

                if u <= 0.0 {
                    start_val
                } else if u >= 1.0 {
                    end_val
                } else {
                    start_val.lerp(&end_val, u)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lottie_data::model::Keyframe;

    fn scalar_track(samples: &[(f32, f32)]) -> Property<f32> {
        Property::animated(samples.iter().map(|&(t, v)| Keyframe::new(t, v)).collect())
    }

    #[test]
    fn test_animator_resolve_binary_search() {
        let prop = scalar_track(&[(0.0, 0.0), (10.0, 10.0), (20.0, 30.0)]);
        let conv = |v: &f32| *v;

        assert_eq!(Animator::resolve(&prop, 0.0, conv, -1.0), 0.0);
        assert_eq!(Animator::resolve(&prop, 10.0, conv, -1.0), 10.0);
        assert_eq!(Animator::resolve(&prop, 20.0, conv, -1.0), 30.0);
        assert_eq!(Animator::resolve(&prop, -5.0, conv, -1.0), 0.0);
        assert_eq!(Animator::resolve(&prop, 25.0, conv, -1.0), 30.0);
        assert_eq!(Animator::resolve(&prop, 5.0, conv, -1.0), 5.0);
        assert_eq!(Animator::resolve(&prop, 15.0, conv, -1.0), 20.0);
    }

    #[test]
    fn between_keyframes_stays_within_range() {
        let prop = Property::animated(vec![
            Keyframe::new(3.0, Vec3::new(10.0, -4.0, 0.0)),
            Keyframe::new(17.0, Vec3::new(-2.0, 8.0, 5.0)),
        ]);

        for step in 1..100 {
            let frame = 3.0 + 14.0 * step as f32 / 100.0;
            let v = Animator::resolve(&prop, frame, |v: &Vec3| *v, Vec3::ZERO);
            assert!((-2.0..=10.0).contains(&v.x), "x overshoot at {frame}: {v}");
            assert!((-4.0..=8.0).contains(&v.y), "y overshoot at {frame}: {v}");
            assert!((0.0..=5.0).contains(&v.z), "z overshoot at {frame}: {v}");
        }
    }

    #[test]
    fn single_keyframe_and_constant_tracks() {
        let single = scalar_track(&[(12.0, 7.5)]);
        assert_eq!(Animator::resolve(&single, 0.0, |v| *v, 0.0), 7.5);
        assert_eq!(Animator::resolve(&single, 99.0, |v| *v, 0.0), 7.5);

        let constant = Property::constant(42.0f32);
        assert_eq!(Animator::resolve(&constant, 3.0, |v| *v, 0.0), 42.0);
    }

    #[test]
    fn coincident_keyframes_use_the_segment_start() {
        let prop = scalar_track(&[(5.0, 1.0), (5.0, 9.0), (10.0, 19.0)]);
        assert_eq!(Animator::resolve(&prop, 5.0, |v| *v, 0.0), 9.0);
        assert_eq!(Animator::resolve(&prop, 7.5, |v| *v, 0.0), 14.0);
    }

    #[test]
    fn legacy_end_value_fills_missing_next_start() {
        let mut first = Keyframe::new(0.0, 0.0f32);
        first.e = Some(100.0);
        let last = Keyframe {
            frame: 10.0,
            s: None,
            e: None,
        };
        let prop = Property::animated(vec![first, last]);
        assert_eq!(Animator::resolve(&prop, 5.0, |v| *v, 0.0), 50.0);
        assert_eq!(Animator::resolve(&prop, 10.0, |v| *v, 0.0), 100.0);
    }

    #[test]
    fn next_start_wins_over_legacy_end_value() {
        let mut first = Keyframe::new(0.0, 0.0f32);
        first.e = Some(100.0);
        let prop = Property::animated(vec![first, Keyframe::new(10.0, 50.0)]);
        assert_eq!(Animator::resolve(&prop, 5.0, |v| *v, 0.0), 25.0);
        assert_eq!(Animator::resolve(&prop, 10.0, |v| *v, 0.0), 50.0);
        assert_eq!(Animator::resolve(&prop, 20.0, |v| *v, 0.0), 50.0);
    }

    #[test]
    fn malformed_track_uses_default() {
        let empty: Property<f32> = Property::animated(Vec::new());
        assert_eq!(Animator::resolve(&empty, 4.0, |v| *v, 100.0), 100.0);
        assert_eq!(Animator::resolve(&Property::<f32>::default(), 4.0, |v| *v, 0.0), 0.0);
    }
}
