use crate::logger::ansi;

/// How the scalar training target is formed from a sample's score and
/// game result.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetBlend {
    /// Weight of the sigmoid-squashed score.
    pub eval_percent: f32,
    /// Weight of the game result.
    pub wdl_percent: f32,
    /// Scales the score before the sigmoid.
    pub sigmoid_coeff: f32,
}

impl Default for TargetBlend {
    fn default() -> Self {
        Self { eval_percent: 0.0, wdl_percent: 1.0, sigmoid_coeff: 2.315 / 400.0 }
    }
}

impl TargetBlend {
    pub fn wdl_only() -> Self {
        Self::default()
    }

    pub fn eval_only(sigmoid_coeff: f32) -> Self {
        Self { eval_percent: 1.0, wdl_percent: 0.0, sigmoid_coeff }
    }

    pub fn assert_valid(&self) {
        assert!((0.0..=1.0).contains(&self.eval_percent), "Eval proportion must be in [0, 1]");
        assert!((0.0..=1.0).contains(&self.wdl_percent), "WDL proportion must be in [0, 1]");
        assert!(self.eval_percent + self.wdl_percent <= 1.0 + 1e-6, "Target weights must not sum above 1");
    }

    /// `wdl` is `-1`, `0` or `1`, mapped onto `0.0`, `0.5` and `1.0`.
    pub fn target(&self, score: i16, wdl: i8) -> f32 {
        let eval_target = sigmoid(f32::from(score) * self.sigmoid_coeff);
        let wdl_target = f32::from(wdl + 1) / 2.0;

        self.eval_percent * eval_target + self.wdl_percent * wdl_target
    }

    pub fn colourful(&self) -> String {
        format!(
            "eval {} wdl {} sigmoid {}",
            ansi(self.eval_percent, 31),
            ansi(self.wdl_percent, 31),
            ansi(format!("{:.6}", self.sigmoid_coeff), 31),
        )
    }
}

pub fn sigmoid(x: f32) -> f32 {
    1. / (1. + (-x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wdl_targets() {
        let blend = TargetBlend::wdl_only();

        for score in [-3000, -50, 0, 50, 3000] {
            assert_eq!(blend.target(score, 1), 1.0);
            assert_eq!(blend.target(score, 0), 0.5);
            assert_eq!(blend.target(score, -1), 0.0);
        }
    }

    #[test]
    fn eval_targets() {
        let blend = TargetBlend::eval_only(2.315 / 400.0);

        assert_eq!(blend.target(0, 1), 0.5);
        assert!(blend.target(400, -1) > 0.9);
        assert!(blend.target(-400, 1) < 0.1);
        assert!((blend.target(123, 0) + blend.target(-123, 0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn blended_targets() {
        let blend = TargetBlend { eval_percent: 0.25, wdl_percent: 0.75, sigmoid_coeff: 1.0 / 400.0 };
        blend.assert_valid();

        let expected = 0.25 * sigmoid(1.0) + 0.75;
        assert!((blend.target(400, 1) - expected).abs() < 1e-6);

        for score in [-1000, 0, 1000] {
            for wdl in -1..=1 {
                assert!((0.0..=1.0).contains(&blend.target(score, wdl)));
            }
        }
    }

    #[test]
    #[should_panic]
    fn rejects_overweight_blend() {
        TargetBlend { eval_percent: 0.8, wdl_percent: 0.8, sigmoid_coeff: 1.0 }.assert_valid();
    }
}
