//! EC2 instance type classification
//!
//! Instance types are classified by their family prefix (the part before the
//! first `.`). Accelerator classes drive the AMI-family compatibility matrix
//! and the AMI type chosen for a node group.

/// Accelerator class of an EC2 instance type
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InstanceClass {
    /// General purpose, compute, memory or storage optimized
    Standard,
    /// NVIDIA (and other GPU) accelerated instances: p2-p6, g3-g6, gr6
    Nvidia,
    /// AWS Inferentia accelerators: inf1, inf2
    Inferentia,
    /// AWS Trainium accelerators: trn1, trn2
    Trainium,
}

const NVIDIA_PREFIXES: &[&str] = &[
    "p2", "p3", "p4", "p5", "p6", "g3", "g4", "g5", "g6", "gr6",
];
const INFERENTIA_PREFIXES: &[&str] = &["inf1", "inf2"];
const TRAINIUM_PREFIXES: &[&str] = &["trn1", "trn2"];

impl InstanceClass {
    /// Classify an instance type such as "g4dn.xlarge" or "trn1.2xlarge"
    pub fn of(instance_type: &str) -> Self {
        let family = instance_family(instance_type);
        let has_prefix = |prefixes: &[&str]| prefixes.iter().any(|p| family.starts_with(p));

        if has_prefix(INFERENTIA_PREFIXES) {
            Self::Inferentia
        } else if has_prefix(TRAINIUM_PREFIXES) {
            Self::Trainium
        } else if has_prefix(NVIDIA_PREFIXES) {
            Self::Nvidia
        } else {
            Self::Standard
        }
    }

    /// Returns true for any accelerator class (GPU or Neuron)
    pub fn is_accelerated(&self) -> bool {
        !matches!(self, Self::Standard)
    }

    /// Returns true for the AWS Neuron classes (Inferentia, Trainium)
    pub fn is_neuron(&self) -> bool {
        matches!(self, Self::Inferentia | Self::Trainium)
    }

    /// Human-readable class name used in compatibility errors
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Standard => "Standard",
            Self::Nvidia => "GPU",
            Self::Inferentia => "Inferentia",
            Self::Trainium => "Trainium",
        }
    }
}

impl std::fmt::Display for InstanceClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Returns true if the instance type names any accelerator class
pub fn is_accelerated_instance_type(instance_type: &str) -> bool {
    InstanceClass::of(instance_type).is_accelerated()
}

/// Returns true if the instance type is an NVIDIA GPU type
pub fn is_gpu_instance_type(instance_type: &str) -> bool {
    InstanceClass::of(instance_type) == InstanceClass::Nvidia
}

/// Returns true if the instance type runs on AWS Graviton (arm64)
///
/// Graviton families carry a `g` directly after the generation digits
/// (`m6g`, `c7gn`, `g5g`, `im4gn`), except `a1` which predates the scheme.
pub fn is_arm_instance_type(instance_type: &str) -> bool {
    let family = instance_family(instance_type);
    if family == "a1" {
        return true;
    }

    let after_letters = family.trim_start_matches(|c: char| c.is_ascii_lowercase());
    let after_digits = after_letters.trim_start_matches(|c: char| c.is_ascii_digit());
    after_letters.len() != after_digits.len() && after_digits.starts_with('g')
}

fn instance_family(instance_type: &str) -> &str {
    instance_type
        .split('.')
        .next()
        .unwrap_or(instance_type)
}
