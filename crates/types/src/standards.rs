//! Reference catalog of the environmental test standards in scope.
//!
//! Informational only: the standards bound parameter ranges and name test
//! methods, but no normative logic lives here.

use serde::Serialize;

/// A test standard and the methods referenced from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Standard {
    pub name: &'static str,
    pub description: &'static str,
    /// (method id, description)
    pub methods: &'static [(&'static str, &'static str)],
}

/// MIL-STD-810, ISO 16750, IEC 60068.
pub const STANDARDS: [Standard; 3] = [
    Standard {
        name: "MIL-STD-810",
        description: "Environmental engineering tests for military equipment",
        methods: &[
            ("501.7", "High temperature"),
            ("502.7", "Low temperature"),
            ("507.7", "Humidity"),
            ("514.8", "Mechanical vibration"),
            ("515.8", "Acoustic noise"),
        ],
    },
    Standard {
        name: "ISO 16750",
        description: "Environmental conditions and testing for road vehicle electronics",
        methods: &[
            ("ISO 16750-4", "Climatic loads, humidity and water"),
            ("ISO 16750-5", "Chemical loads"),
        ],
    },
    Standard {
        name: "IEC 60068",
        description: "General environmental testing procedures",
        methods: &[
            ("IEC 60068-2-14", "Change of temperature (thermal shock)"),
            ("IEC 60068-2-27", "Shock"),
            ("IEC 60529", "Ingress protection (water splash)"),
        ],
    },
];

/// Look up a standard by name, case-insensitively.
pub fn find_standard(name: &str) -> Option<&'static Standard> {
    STANDARDS.iter().find(|s| s.name.eq_ignore_ascii_case(name))
}
