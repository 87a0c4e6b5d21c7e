//! AMI families and EKS AMI types

use serde::{Deserialize, Serialize};

use super::instance::{is_arm_instance_type, InstanceClass};

/// Operating-system image family for node hosts
///
/// Config values are matched case-insensitively through [`FromStr`](std::str::FromStr).
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String")]
pub enum AmiFamily {
    /// Amazon Linux 2023
    AmazonLinux2023,
    /// Amazon Linux 2 (legacy)
    AmazonLinux2,
    /// Ubuntu 18.04
    Ubuntu1804,
    /// Ubuntu 20.04
    Ubuntu2004,
    /// Ubuntu Pro 20.04
    UbuntuPro2004,
    /// Ubuntu 22.04
    Ubuntu2204,
    /// Ubuntu Pro 22.04
    UbuntuPro2204,
    /// Ubuntu 24.04
    Ubuntu2404,
    /// Ubuntu Pro 24.04
    UbuntuPro2404,
    /// Bottlerocket container OS
    Bottlerocket,
    /// Windows Server 2019 Core
    WindowsServer2019CoreContainer,
    /// Windows Server 2019 Full
    WindowsServer2019FullContainer,
    /// Windows Server 2022 Core
    WindowsServer2022CoreContainer,
    /// Windows Server 2022 Full
    WindowsServer2022FullContainer,
}

/// Image lineage shared by related AMI families
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AmiLineage {
    /// Amazon Linux 2023
    AmazonLinux2023,
    /// Amazon Linux 2
    AmazonLinux2,
    /// Every Ubuntu and Ubuntu Pro release
    Ubuntu,
    /// Bottlerocket
    Bottlerocket,
    /// Every Windows Server release
    Windows,
}

impl AmiFamily {
    /// Family assumed when a node group does not set one
    pub const DEFAULT: AmiFamily = AmiFamily::AmazonLinux2;

    /// All supported families
    pub const ALL: [AmiFamily; 14] = [
        Self::AmazonLinux2023,
        Self::AmazonLinux2,
        Self::Ubuntu1804,
        Self::Ubuntu2004,
        Self::UbuntuPro2004,
        Self::Ubuntu2204,
        Self::UbuntuPro2204,
        Self::Ubuntu2404,
        Self::UbuntuPro2404,
        Self::Bottlerocket,
        Self::WindowsServer2019CoreContainer,
        Self::WindowsServer2019FullContainer,
        Self::WindowsServer2022CoreContainer,
        Self::WindowsServer2022FullContainer,
    ];

    /// Name as written in node group configuration
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AmazonLinux2023 => "AmazonLinux2023",
            Self::AmazonLinux2 => "AmazonLinux2",
            Self::Ubuntu1804 => "Ubuntu1804",
            Self::Ubuntu2004 => "Ubuntu2004",
            Self::UbuntuPro2004 => "UbuntuPro2004",
            Self::Ubuntu2204 => "Ubuntu2204",
            Self::UbuntuPro2204 => "UbuntuPro2204",
            Self::Ubuntu2404 => "Ubuntu2404",
            Self::UbuntuPro2404 => "UbuntuPro2404",
            Self::Bottlerocket => "Bottlerocket",
            Self::WindowsServer2019CoreContainer => "WindowsServer2019CoreContainer",
            Self::WindowsServer2019FullContainer => "WindowsServer2019FullContainer",
            Self::WindowsServer2022CoreContainer => "WindowsServer2022CoreContainer",
            Self::WindowsServer2022FullContainer => "WindowsServer2022FullContainer",
        }
    }

    /// Lineage this family belongs to
    pub fn lineage(&self) -> AmiLineage {
        match self {
            Self::AmazonLinux2023 => AmiLineage::AmazonLinux2023,
            Self::AmazonLinux2 => AmiLineage::AmazonLinux2,
            Self::Ubuntu1804
            | Self::Ubuntu2004
            | Self::UbuntuPro2004
            | Self::Ubuntu2204
            | Self::UbuntuPro2204
            | Self::Ubuntu2404
            | Self::UbuntuPro2404 => AmiLineage::Ubuntu,
            Self::Bottlerocket => AmiLineage::Bottlerocket,
            Self::WindowsServer2019CoreContainer
            | Self::WindowsServer2019FullContainer
            | Self::WindowsServer2022CoreContainer
            | Self::WindowsServer2022FullContainer => AmiLineage::Windows,
        }
    }

    /// Returns true if the image ships NVIDIA drivers out of the box
    ///
    /// Ubuntu and Windows base images need drivers installed by the operator.
    pub fn ships_gpu_drivers(&self) -> bool {
        match self.lineage() {
            AmiLineage::AmazonLinux2023 | AmiLineage::AmazonLinux2 | AmiLineage::Bottlerocket => {
                true
            }
            AmiLineage::Ubuntu | AmiLineage::Windows => false,
        }
    }

    /// Returns true for Windows Server families
    pub fn is_windows(&self) -> bool {
        self.lineage() == AmiLineage::Windows
    }
}

impl std::str::FromStr for AmiFamily {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|family| family.as_str().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| crate::Error::validation(format!("invalid amiFamily: {s}")))
    }
}

impl TryFrom<String> for AmiFamily {
    type Error = crate::Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl std::fmt::Display for AmiFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// EKS managed node group AMI type
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub enum AmiType {
    /// Amazon Linux 2 x86_64
    AL2_x86_64,
    /// Amazon Linux 2 x86_64 with GPU/Neuron drivers
    AL2_x86_64_GPU,
    /// Amazon Linux 2 arm64
    AL2_ARM_64,
    /// Amazon Linux 2023 x86_64
    AL2023_x86_64_STANDARD,
    /// Amazon Linux 2023 arm64
    AL2023_ARM_64_STANDARD,
    /// Amazon Linux 2023 x86_64 with NVIDIA drivers
    AL2023_x86_64_NVIDIA,
    /// Amazon Linux 2023 arm64 with NVIDIA drivers
    AL2023_ARM_64_NVIDIA,
    /// Amazon Linux 2023 x86_64 with Neuron drivers
    AL2023_x86_64_NEURON,
    /// Bottlerocket x86_64
    BOTTLEROCKET_x86_64,
    /// Bottlerocket arm64
    BOTTLEROCKET_ARM_64,
    /// Bottlerocket x86_64 with NVIDIA drivers
    BOTTLEROCKET_x86_64_NVIDIA,
    /// Bottlerocket arm64 with NVIDIA drivers
    BOTTLEROCKET_ARM_64_NVIDIA,
    /// Windows Server 2019 Core
    WINDOWS_CORE_2019_x86_64,
    /// Windows Server 2019 Full
    WINDOWS_FULL_2019_x86_64,
    /// Windows Server 2022 Core
    WINDOWS_CORE_2022_x86_64,
    /// Windows Server 2022 Full
    WINDOWS_FULL_2022_x86_64,
    /// Image supplied by the operator (no EKS-optimized variant)
    CUSTOM,
}

impl AmiType {
    /// Resolve the AMI type for a family and a representative instance type
    ///
    /// With no instance type the standard x86_64 variant is chosen.
    pub fn resolve(family: AmiFamily, instance_type: Option<&str>) -> Self {
        let class = instance_type
            .map(InstanceClass::of)
            .unwrap_or(InstanceClass::Standard);
        let arm = instance_type.is_some_and(is_arm_instance_type);

        match family {
            AmiFamily::AmazonLinux2023 => match (class, arm) {
                (InstanceClass::Nvidia, true) => Self::AL2023_ARM_64_NVIDIA,
                (InstanceClass::Nvidia, false) => Self::AL2023_x86_64_NVIDIA,
                (InstanceClass::Inferentia | InstanceClass::Trainium, _) => {
                    Self::AL2023_x86_64_NEURON
                }
                (InstanceClass::Standard, true) => Self::AL2023_ARM_64_STANDARD,
                (InstanceClass::Standard, false) => Self::AL2023_x86_64_STANDARD,
            },
            AmiFamily::AmazonLinux2 => match (class.is_accelerated(), arm) {
                (_, true) => Self::AL2_ARM_64,
                (true, false) => Self::AL2_x86_64_GPU,
                (false, false) => Self::AL2_x86_64,
            },
            AmiFamily::Bottlerocket => match (class, arm) {
                (InstanceClass::Nvidia, true) => Self::BOTTLEROCKET_ARM_64_NVIDIA,
                (InstanceClass::Nvidia, false) => Self::BOTTLEROCKET_x86_64_NVIDIA,
                (_, true) => Self::BOTTLEROCKET_ARM_64,
                (_, false) => Self::BOTTLEROCKET_x86_64,
            },
            AmiFamily::WindowsServer2019CoreContainer => Self::WINDOWS_CORE_2019_x86_64,
            AmiFamily::WindowsServer2019FullContainer => Self::WINDOWS_FULL_2019_x86_64,
            AmiFamily::WindowsServer2022CoreContainer => Self::WINDOWS_CORE_2022_x86_64,
            AmiFamily::WindowsServer2022FullContainer => Self::WINDOWS_FULL_2022_x86_64,
            AmiFamily::Ubuntu1804
            | AmiFamily::Ubuntu2004
            | AmiFamily::UbuntuPro2004
            | AmiFamily::Ubuntu2204
            | AmiFamily::UbuntuPro2204
            | AmiFamily::Ubuntu2404
            | AmiFamily::UbuntuPro2404 => Self::CUSTOM,
        }
    }

    /// Returns true if this variant carries accelerator drivers
    pub fn is_accelerated(&self) -> bool {
        matches!(
            self,
            Self::AL2_x86_64_GPU
                | Self::AL2023_x86_64_NVIDIA
                | Self::AL2023_ARM_64_NVIDIA
                | Self::AL2023_x86_64_NEURON
                | Self::BOTTLEROCKET_x86_64_NVIDIA
                | Self::BOTTLEROCKET_ARM_64_NVIDIA
        )
    }
}

impl std::fmt::Display for AmiType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_family_round_trips_through_its_name() {
        for family in AmiFamily::ALL {
            let parsed: AmiFamily = family.as_str().parse().expect("family name should parse");
            assert_eq!(parsed, family);
        }
        assert!("CentOS7".parse::<AmiFamily>().is_err());
    }

    #[test]
    fn family_names_deserialize_from_config_strings() {
        let family: AmiFamily = serde_json::from_str("\"WindowsServer2022CoreContainer\"")
            .expect("family should deserialize");
        assert_eq!(family, AmiFamily::WindowsServer2022CoreContainer);
    }

    #[test]
    fn deserialization_accepts_what_parsing_accepts() {
        for raw in ["ubuntu2004", "BOTTLEROCKET", "amazonLinux2023"] {
            let parsed: AmiFamily = raw.parse().expect("family name should parse");
            let deserialized: AmiFamily =
                serde_json::from_value(serde_json::json!(raw)).expect("family should deserialize");
            assert_eq!(deserialized, parsed, "{raw}");
        }

        let err = serde_json::from_value::<AmiFamily>(serde_json::json!("CentOS7"))
            .expect_err("unknown family");
        assert!(err.to_string().contains("invalid amiFamily: CentOS7"));
        assert_eq!(
            serde_json::to_string(&AmiFamily::Ubuntu2004).expect("serialize"),
            "\"Ubuntu2004\""
        );
    }

    #[test]
    fn only_ubuntu_and_windows_lack_gpu_drivers() {
        assert!(AmiFamily::AmazonLinux2023.ships_gpu_drivers());
        assert!(AmiFamily::AmazonLinux2.ships_gpu_drivers());
        assert!(AmiFamily::Bottlerocket.ships_gpu_drivers());
        assert!(!AmiFamily::Ubuntu2004.ships_gpu_drivers());
        assert!(!AmiFamily::UbuntuPro2404.ships_gpu_drivers());
        assert!(!AmiFamily::WindowsServer2019FullContainer.ships_gpu_drivers());
    }

    #[test]
    fn al2023_ami_types_follow_accelerator_and_arch() {
        let resolve = |it| AmiType::resolve(AmiFamily::AmazonLinux2023, Some(it));
        assert_eq!(resolve("g4dn.xlarge"), AmiType::AL2023_x86_64_NVIDIA);
        assert_eq!(resolve("g5g.2xlarge"), AmiType::AL2023_ARM_64_NVIDIA);
        assert_eq!(resolve("inf2.xlarge"), AmiType::AL2023_x86_64_NEURON);
        assert_eq!(resolve("trn1.2xlarge"), AmiType::AL2023_x86_64_NEURON);
        assert_eq!(resolve("m6g.large"), AmiType::AL2023_ARM_64_STANDARD);
        assert_eq!(resolve("m5.large"), AmiType::AL2023_x86_64_STANDARD);
        assert_eq!(
            AmiType::resolve(AmiFamily::AmazonLinux2023, None),
            AmiType::AL2023_x86_64_STANDARD
        );
    }

    #[test]
    fn legacy_and_bottlerocket_ami_types() {
        assert_eq!(
            AmiType::resolve(AmiFamily::AmazonLinux2, Some("p3.2xlarge")),
            AmiType::AL2_x86_64_GPU
        );
        assert_eq!(
            AmiType::resolve(AmiFamily::AmazonLinux2, Some("c7g.large")),
            AmiType::AL2_ARM_64
        );
        assert_eq!(
            AmiType::resolve(AmiFamily::Bottlerocket, Some("g5g.xlarge")),
            AmiType::BOTTLEROCKET_ARM_64_NVIDIA
        );
        assert_eq!(
            AmiType::resolve(AmiFamily::Bottlerocket, Some("m5.large")),
            AmiType::BOTTLEROCKET_x86_64
        );
    }

    #[test]
    fn windows_and_ubuntu_ami_types() {
        assert_eq!(
            AmiType::resolve(AmiFamily::WindowsServer2022FullContainer, Some("g4dn.xlarge")),
            AmiType::WINDOWS_FULL_2022_x86_64
        );
        assert_eq!(
            AmiType::resolve(AmiFamily::Ubuntu2204, Some("m5.large")),
            AmiType::CUSTOM
        );
    }

    #[test]
    fn ami_type_serializes_as_eks_constant() {
        let json = serde_json::to_string(&AmiType::AL2023_x86_64_NVIDIA).expect("serialize");
        assert_eq!(json, "\"AL2023_x86_64_NVIDIA\"");
        assert_eq!(AmiType::BOTTLEROCKET_ARM_64.to_string(), "BOTTLEROCKET_ARM_64");
    }
}
