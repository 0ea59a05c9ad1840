use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Read, Write},
};

use crate::game::inputs::SparseInputType;

use super::NetworkConfig;

/// Unquantised weights as written by the trainer: little-endian `f32`
/// arrays, weights before biases, each layer's weights stored input-major.
#[derive(Clone, Debug, PartialEq)]
pub struct RawNetwork {
    pub ft_weights: Vec<f32>,
    pub ft_biases: Vec<f32>,
    pub l1_weights: Vec<f32>,
    pub l1_biases: Vec<f32>,
    pub l2_weights: Vec<f32>,
    pub l2_biases: Vec<f32>,
    pub l3_weights: Vec<f32>,
    pub l3_biases: Vec<f32>,
}

fn read_f32s<R: Read>(reader: &mut R, len: usize) -> io::Result<Vec<f32>> {
    let mut buf = vec![0u8; 4 * len];
    reader.read_exact(&mut buf)?;

    Ok(buf.chunks_exact(4).map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]])).collect())
}

fn quant(weights: &[f32], q: i32) -> impl Iterator<Item = f32> + '_ {
    weights.iter().map(move |&x| (x * q as f32).round_ties_even())
}

impl RawNetwork {
    pub fn read_from<R: Read, I: SparseInputType>(
        reader: &mut R,
        config: &NetworkConfig,
        inputs: &I,
    ) -> io::Result<Self> {
        let features = config.feature_space_size(inputs);

        let ft_weights = read_f32s(reader, features * config.l0)?;
        let ft_biases = read_f32s(reader, config.l0)?;
        let l1_weights = read_f32s(reader, 2 * config.l0 * config.l1)?;
        let l1_biases = read_f32s(reader, config.l1)?;
        let l2_weights = read_f32s(reader, config.l1 * config.l2)?;
        let l2_biases = read_f32s(reader, config.l2)?;
        let l3_weights = read_f32s(reader, config.l2 * config.l3)?;
        let l3_biases = read_f32s(reader, config.l3)?;

        Ok(Self { ft_weights, ft_biases, l1_weights, l1_biases, l2_weights, l2_biases, l3_weights, l3_biases })
    }

    pub fn read_from_file<I: SparseInputType>(path: &str, config: &NetworkConfig, inputs: &I) -> io::Result<Self> {
        let mut reader = BufReader::new(File::open(path)?);
        Self::read_from(&mut reader, config, inputs)
    }

    /// Adds the factoriser weights into every feature they were derived
    /// from, leaving only the real features. A no-op for inputs that are
    /// not factorised.
    pub fn collapse<I: SparseInputType>(mut self, inputs: &I) -> Self {
        if inputs.is_factorised() {
            self.ft_weights = inputs.merge_factoriser(self.ft_weights);
        }

        self
    }

    pub fn quantise(&self, config: &NetworkConfig) -> QuantisedNetwork {
        QuantisedNetwork {
            ft_biases: quant(&self.ft_biases, config.quant_ft).map(|x| x as i16).collect(),
            ft_weights: quant(&self.ft_weights, config.quant_ft).map(|x| x as i16).collect(),
            l1_biases: quant(&self.l1_biases, config.quant_l1).map(|x| x as i32).collect(),
            l1_weights: quant(&self.l1_weights, config.quant_l1).map(|x| x as i8).collect(),
            l2_biases: self.l2_biases.iter().map(|&x| x * config.quant_l2 as f32).collect(),
            l2_weights: self.l2_weights.iter().map(|&x| x * config.quant_l2 as f32).collect(),
            l3_biases: self.l3_biases.iter().map(|&x| x * config.quant_l3 as f32).collect(),
            l3_weights: self.l3_weights.iter().map(|&x| x * config.quant_l3 as f32).collect(),
        }
    }
}

/// The network in the layout the engine loads, biases before weights.
#[derive(Clone, Debug, PartialEq)]
pub struct QuantisedNetwork {
    pub ft_biases: Vec<i16>,
    pub ft_weights: Vec<i16>,
    pub l1_biases: Vec<i32>,
    pub l1_weights: Vec<i8>,
    pub l2_biases: Vec<f32>,
    pub l2_weights: Vec<f32>,
    pub l3_biases: Vec<f32>,
    pub l3_weights: Vec<f32>,
}

impl QuantisedNetwork {
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        for x in self.ft_biases.iter().chain(&self.ft_weights) {
            writer.write_all(&x.to_le_bytes())?;
        }

        for x in &self.l1_biases {
            writer.write_all(&x.to_le_bytes())?;
        }

        for x in &self.l1_weights {
            writer.write_all(&x.to_le_bytes())?;
        }

        for x in self.l2_biases.iter().chain(&self.l2_weights).chain(&self.l3_biases).chain(&self.l3_weights) {
            writer.write_all(&x.to_le_bytes())?;
        }

        Ok(())
    }

    pub fn write_to_file(&self, path: &str) -> io::Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)?;
        writer.flush()
    }

    pub fn size_in_bytes(&self) -> usize {
        2 * (self.ft_biases.len() + self.ft_weights.len())
            + 4 * self.l1_biases.len()
            + self.l1_weights.len()
            + 4 * (self.l2_biases.len() + self.l2_weights.len() + self.l3_biases.len() + self.l3_weights.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::inputs::HalfKp;

    fn small_config() -> NetworkConfig {
        NetworkConfig { l0: 2, l1: 2, l2: 2, l3: 1, ..Default::default() }
    }

    fn write_raw(config: &NetworkConfig, features: usize) -> Vec<u8> {
        let sizes = [
            features * config.l0,
            config.l0,
            2 * config.l0 * config.l1,
            config.l1,
            config.l1 * config.l2,
            config.l2,
            config.l2 * config.l3,
            config.l3,
        ];

        let mut bytes = Vec::new();
        for (layer, size) in sizes.into_iter().enumerate() {
            for i in 0..size {
                let is_virtual = layer == 0 && i >= HalfKp.virtual_offset() * config.l0;
                let value = if is_virtual { 0.5 } else { layer as f32 / 64.0 };
                bytes.extend_from_slice(&value.to_le_bytes());
            }
        }

        bytes
    }

    #[test]
    fn read_collapse_quantise() {
        let config = small_config();
        let bytes = write_raw(&config, HalfKp.num_inputs());

        let raw = RawNetwork::read_from(&mut bytes.as_slice(), &config, &HalfKp).unwrap();
        assert_eq!(raw.ft_weights.len(), 21120 * 2);
        assert_eq!(raw.l1_weights, vec![2.0 / 64.0; 8]);
        assert_eq!(raw.l3_biases, [7.0 / 64.0]);

        let collapsed = raw.collapse(&HalfKp);
        assert_eq!(collapsed.ft_weights.len(), 20480 * 2);
        assert!(collapsed.ft_weights.iter().all(|&x| x == 0.5));

        let quantised = collapsed.quantise(&config);
        assert!(quantised.ft_weights.iter().all(|&x| x == 32));
        assert_eq!(quantised.ft_biases, [1, 1]);
        assert_eq!(quantised.l1_weights, vec![1; 8]);
        assert_eq!(quantised.l1_biases, [2, 2]);
        assert_eq!(quantised.l2_weights, vec![4.0 / 64.0; 4]);

        let mut out = Vec::new();
        quantised.write_to(&mut out).unwrap();
        assert_eq!(out.len(), quantised.size_in_bytes());
        assert_eq!(&out[..4], &[1, 0, 1, 0]);
        assert_eq!(&out[4..6], &32i16.to_le_bytes());
    }

    #[test]
    fn truncated_weights_are_an_error() {
        let config = small_config();
        let bytes = write_raw(&config, HalfKp.num_inputs());

        assert!(RawNetwork::read_from(&mut &bytes[..bytes.len() - 1], &config, &HalfKp).is_err());
    }

    #[test]
    fn rounds_half_to_even() {
        let config = NetworkConfig { quant_ft: 2, ..small_config() };
        let raw = RawNetwork {
            ft_weights: vec![0.25, 0.75, -0.25, 1.0],
            ft_biases: vec![0.25],
            l1_weights: vec![],
            l1_biases: vec![],
            l2_weights: vec![],
            l2_biases: vec![],
            l3_weights: vec![],
            l3_biases: vec![],
        };

        let quantised = raw.quantise(&config);
        assert_eq!(quantised.ft_weights, [0, 2, 0, 2]);
        assert_eq!(quantised.ft_biases, [0]);
    }
}
