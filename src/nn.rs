/// Reading trained weights, collapsing virtual features and writing
/// the quantised network.
pub mod export;

use crate::{game::inputs::SparseInputType, logger::ansi};

/// Adam with a linear learning rate warmup.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AdamConfig {
    pub beta1: f32,
    pub beta2: f32,
    pub eps: f32,
    /// Number of samples over which the learning rate is warmed up.
    pub warmup: usize,
}

impl Default for AdamConfig {
    fn default() -> Self {
        Self { beta1: 0.95, beta2: 0.999, eps: 1e-8, warmup: 5 * 16384 }
    }
}

/// One optimiser parameter group, optionally clamped after each step.
#[derive(Clone, Debug, PartialEq)]
pub struct ParamGroup {
    pub id: &'static str,
    pub clamp: Option<(f32, f32)>,
}

impl ParamGroup {
    fn new(id: &'static str) -> Self {
        Self { id, clamp: None }
    }

    fn clamp(mut self, min: f32, max: f32) -> Self {
        self.clamp = Some((min, max));
        self
    }
}

/// Shape, quantisation and optimiser settings of the network trained on
/// these inputs. The trainer itself lives elsewhere, this only describes it.
#[derive(Clone, Debug, PartialEq)]
pub struct NetworkConfig {
    /// Feature transformer width, per perspective.
    pub l0: usize,
    pub l1: usize,
    pub l2: usize,
    pub l3: usize,

    pub ft_regularisation: f32,
    /// Upper bound of the clipped ReLU after the feature transformer.
    pub ft_activation_max: f32,

    pub quant_ft: i32,
    pub quant_l1: i32,
    pub quant_l2: i32,
    pub quant_l3: i32,

    pub adam: AdamConfig,
    /// Checkpoint every `save_rate` epochs.
    pub save_rate: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            l0: 768,
            l1: 8,
            l2: 32,
            l3: 1,
            ft_regularisation: 1.0 / 16384.0 / 4194304.0,
            ft_activation_max: 127.0,
            quant_ft: 64,
            quant_l1: 32,
            quant_l2: 1,
            quant_l3: 1,
            adam: AdamConfig::default(),
            save_rate: 50,
        }
    }
}

impl NetworkConfig {
    /// Bound on the l1 weights so that they survive quantisation into `i8`.
    pub fn clip_l1(&self) -> f32 {
        127.0 / self.quant_l1 as f32
    }

    pub fn feature_space_size<I: SparseInputType>(&self, inputs: &I) -> usize {
        inputs.num_inputs()
    }

    pub fn param_groups(&self) -> Vec<ParamGroup> {
        let clip = self.clip_l1();

        vec![
            ParamGroup::new("ftw"),
            ParamGroup::new("ftb"),
            ParamGroup::new("l1w").clamp(-clip, clip),
            ParamGroup::new("l1b"),
            ParamGroup::new("l2w"),
            ParamGroup::new("l2b"),
            ParamGroup::new("l3w"),
            ParamGroup::new("l3b"),
        ]
    }

    pub fn display<I: SparseInputType>(&self, inputs: &I) {
        let inputs_desc = format!("{} ({})", inputs.shorthand(), inputs.description());

        println!("Inputs                 : {}", ansi(inputs_desc, "32;1"));
        println!("Feature space          : {}", ansi(self.feature_space_size(inputs), 31));
        let arch = format!(
            "({} -> {})x2 -> {} -> {} -> {}",
            self.feature_space_size(inputs),
            self.l0,
            self.l1,
            self.l2,
            self.l3
        );
        println!("Architecture           : {}", ansi(arch, 31));
        println!(
            "Quantisation           : ft {} l1 {} l2 {} l3 {}",
            ansi(self.quant_ft, 31),
            ansi(self.quant_l1, 31),
            ansi(self.quant_l2, 31),
            ansi(self.quant_l3, 31),
        );
        println!(
            "Adam                   : beta1 {} beta2 {} eps {} warmup {}",
            ansi(self.adam.beta1, 31),
            ansi(self.adam.beta2, 31),
            ansi(self.adam.eps, 31),
            ansi(self.adam.warmup, 31),
        );

        for group in self.param_groups() {
            if let Some((min, max)) = group.clamp {
                println!("Clamped parameters     : {} in [{}, {}]", ansi(group.id, 36), ansi(min, 31), ansi(max, 31));
            }
        }
    }
}
